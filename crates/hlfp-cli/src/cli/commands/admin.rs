//! Admin command - bootstrap an organization's administrative identity.

use super::Context;
use crate::cli::args::AdminArgs;
use anyhow::Result;
use hlfp::AdminBootstrapper;
use tracing::info;

pub async fn execute(ctx: &Context, args: AdminArgs) -> Result<()> {
    info!("Bootstrapping admin identity for MSP {}", args.msp);

    let ca = ctx.ca_for_msp(&args.msp).await?;
    let bootstrapper =
        AdminBootstrapper::new(ctx.config.clone(), ctx.store.clone(), ca, ctx.policy);
    bootstrapper.bootstrap(&args.msp).await?;

    info!("Admin identity for MSP {} is in place", args.msp);
    Ok(())
}
