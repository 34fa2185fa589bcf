//! Client for the land-use scenario backend.
//!
//! Each component talks to the backend through a [`landuse_core::Transport`]:
//! [`ReqwestTransport`] for a real server, [`InMemoryBackend`] for tests and
//! offline use. [`LanduseClient`] wires them together.

pub mod client;
pub mod config_service;
pub mod dto;
pub mod http_transport;
pub mod job_tracker;
pub mod lulc_service;
pub mod memory_backend;
pub mod pattern_catalog;
pub mod routes;
pub mod scenario_store;
pub mod session_manager;
pub mod wallpaper;

pub use client::LanduseClient;
pub use config_service::ConfigService;
pub use http_transport::ReqwestTransport;
pub use job_tracker::{JobTracker, PollPolicy};
pub use lulc_service::LulcService;
pub use memory_backend::InMemoryBackend;
pub use pattern_catalog::PatternCatalog;
pub use scenario_store::ScenarioStore;
pub use session_manager::SessionManager;
pub use wallpaper::WallpaperOperation;
