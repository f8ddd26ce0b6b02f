//! Genesis command - generate and store the genesis block.

use super::Context;
use anyhow::Result;
use hlfp::ArtifactMaterializer;
use tracing::info;

pub async fn execute(ctx: &Context) -> Result<()> {
    info!("Materializing genesis block");

    let materializer =
        ArtifactMaterializer::new(ctx.config.clone(), ctx.store.clone(), ctx.runner.clone());
    materializer.genesis_block().await?;

    info!("Genesis block is in place");
    Ok(())
}
