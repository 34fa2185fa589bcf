//! Domain model and contracts for the Landuse scenario client.
//!
//! # Module Structure
//!
//! - `error`: shared error taxonomy (`LanduseError`)
//! - `id`: typed identifiers and the `IdRegistry`
//! - `geometry`: parcel polygons and the WKT codec
//! - `lulc`: LULC code registry and tables
//! - `session`, `scenario`, `pattern`, `job`: entity models
//! - `transport`: the request/response seam implemented by backends
//! - `config`: explicit client configuration

pub mod config;
pub mod error;
pub mod geometry;
pub mod id;
pub mod job;
pub mod lulc;
pub mod pattern;
pub mod scenario;
pub mod session;
pub mod transport;

pub use config::ClientConfig;
pub use error::{LanduseError, Result, TransportErrorKind};
pub use geometry::{Coordinate, Polygon};
pub use id::{EntityId, IdKind, IdRegistry, JobId, PatternId, ScenarioId, SessionId};
pub use job::{Job, JobStatus};
pub use lulc::{LulcCode, LulcRegistry, LulcTable};
pub use pattern::Pattern;
pub use scenario::{NewScenario, Scenario};
pub use session::Session;
pub use transport::{Route, Transport};
