//! Channel command - generate and store the channel creation transaction.

use super::Context;
use anyhow::Result;
use hlfp::ArtifactMaterializer;
use tracing::info;

pub async fn execute(ctx: &Context) -> Result<()> {
    info!("Materializing channel creation transaction");

    let materializer =
        ArtifactMaterializer::new(ctx.config.clone(), ctx.store.clone(), ctx.runner.clone());
    materializer.channel_tx().await?;

    info!("Channel transaction is in place");
    Ok(())
}
