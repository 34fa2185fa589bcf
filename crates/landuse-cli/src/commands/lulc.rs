use anyhow::Result;

use super::geometry::parse_coordinates;
use super::{print_json, Context};

pub async fn codes(ctx: &Context) -> Result<()> {
    let registry = ctx.client.lulc().codes().await?;
    print_json(&registry.entries())
}

pub async fn parcel(ctx: &Context, geometry: &str) -> Result<()> {
    let points = parse_coordinates(geometry)?;
    let table = ctx.client.lulc().table_for_parcel(&points).await?;
    print_json(&table)
}
