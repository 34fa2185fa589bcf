use anyhow::Result;
use landuse_core::{JobId, PatternId, ScenarioId, SessionId};
use serde_json::json;

use super::geometry::parse_coordinates;
use super::{print_json, Context};

/// Lists the session's scenarios and patterns so their ids count as issued.
async fn load_session(ctx: &Context, session_id: &str) -> Result<()> {
    let session_id = SessionId::new(session_id);
    ctx.client.scenarios().list_scenarios(&session_id).await?;
    ctx.client.patterns().list_patterns(&session_id).await?;
    Ok(())
}

pub async fn submit_wallpaper(
    ctx: &Context,
    session_id: &str,
    scenario_id: &str,
    pattern_id: &str,
    target: &str,
    wait: bool,
) -> Result<()> {
    let points = parse_coordinates(target)?;
    load_session(ctx, session_id).await?;
    let job_id = ctx
        .client
        .wallpaper()
        .submit(
            &points,
            &PatternId::new(pattern_id),
            &ScenarioId::new(scenario_id),
        )
        .await?;
    finish_submission(ctx, job_id, wait).await
}

pub async fn submit_fill(
    ctx: &Context,
    session_id: &str,
    scenario_id: &str,
    lulc_class: &str,
    target: &str,
    wait: bool,
) -> Result<()> {
    let points = parse_coordinates(target)?;
    load_session(ctx, session_id).await?;
    let job_id = ctx
        .client
        .wallpaper()
        .fill(&points, lulc_class, &ScenarioId::new(scenario_id))
        .await?;
    finish_submission(ctx, job_id, wait).await
}

pub async fn submit_crop(
    ctx: &Context,
    session_id: &str,
    scenario_id: &str,
    wait: bool,
) -> Result<()> {
    load_session(ctx, session_id).await?;
    let job_id = ctx
        .client
        .wallpaper()
        .crop(&ScenarioId::new(scenario_id))
        .await?;
    finish_submission(ctx, job_id, wait).await
}

async fn finish_submission(ctx: &Context, job_id: JobId, wait: bool) -> Result<()> {
    if !wait {
        return print_json(&json!({ "job_id": job_id }));
    }
    let table = ctx
        .client
        .jobs()
        .wait_for_result(&job_id, ctx.client.poll_policy())
        .await?;
    print_json(&json!({ "job_id": job_id, "lulc_stats": table }))
}

pub async fn list(ctx: &Context) -> Result<()> {
    let jobs = ctx.client.jobs().list().await?;
    print_json(&jobs)
}

pub async fn status(ctx: &Context, job_id: &str) -> Result<()> {
    let job = ctx.client.jobs().job(&JobId::new(job_id)).await?;
    print_json(&job)
}

pub async fn result(ctx: &Context, job_id: &str) -> Result<()> {
    let job_id = JobId::new(job_id);
    let table = ctx.client.jobs().result(&job_id).await?;
    print_json(&json!({ "job_id": job_id, "lulc_stats": table }))
}

pub async fn wait(ctx: &Context, job_id: &str) -> Result<()> {
    let job_id = JobId::new(job_id);
    let status = ctx
        .client
        .jobs()
        .wait(&job_id, ctx.client.poll_policy())
        .await?;
    print_json(&json!({ "job_id": job_id, "status": status }))
}
