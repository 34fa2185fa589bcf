use anyhow::Result;
use landuse_core::{Pattern, SessionId};
use serde_json::{json, Value};

use super::geometry::parse_coordinates;
use super::{print_json, Context};

fn view(pattern: &Pattern) -> Value {
    json!({
        "pattern_id": pattern.id,
        "session_id": pattern.session_id,
        "name": pattern.name,
        "wkt": pattern.geometry.to_wkt(),
        "area": pattern.geometry.area(),
    })
}

pub async fn list(ctx: &Context, session_id: &str) -> Result<()> {
    let patterns = ctx
        .client
        .patterns()
        .list_patterns(&SessionId::new(session_id))
        .await?;
    let views: Vec<Value> = patterns.iter().map(view).collect();
    print_json(&views)
}

pub async fn create(ctx: &Context, session_id: &str, name: &str, geometry: &str) -> Result<()> {
    let points = parse_coordinates(geometry)?;
    let pattern_id = ctx
        .client
        .patterns()
        .create_pattern(&SessionId::new(session_id), &points, name)
        .await?;
    print_json(&json!({ "pattern_id": pattern_id }))
}
