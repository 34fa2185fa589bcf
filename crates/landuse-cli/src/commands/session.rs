use anyhow::Result;
use landuse_core::SessionId;

use super::{print_json, Context};

pub async fn create(ctx: &Context) -> Result<()> {
    let session = ctx.client.sessions().create_session().await?;
    print_json(&session)
}

pub async fn get(ctx: &Context, session_id: &str) -> Result<()> {
    let session = ctx
        .client
        .sessions()
        .get_session(&SessionId::new(session_id))
        .await?;
    print_json(&session)
}
