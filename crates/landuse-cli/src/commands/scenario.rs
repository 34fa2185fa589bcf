use anyhow::Result;
use landuse_core::{ScenarioId, SessionId};
use serde_json::json;

use super::{print_json, Context};

pub async fn list(ctx: &Context, session_id: &str) -> Result<()> {
    let scenarios = ctx
        .client
        .scenarios()
        .list_scenarios(&SessionId::new(session_id))
        .await?;
    print_json(&scenarios)
}

pub async fn get(ctx: &Context, scenario_id: &str) -> Result<()> {
    let scenario = ctx
        .client
        .scenarios()
        .get_scenario(&ScenarioId::new(scenario_id))
        .await?;
    print_json(&scenario)
}

pub async fn create(
    ctx: &Context,
    session_id: &str,
    name: &str,
    description: Option<&str>,
) -> Result<()> {
    let scenario_id = ctx
        .client
        .scenarios()
        .create_scenario(&SessionId::new(session_id), name, description)
        .await?;
    print_json(&json!({ "scenario_id": scenario_id }))
}
