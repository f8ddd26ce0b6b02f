//! hlfp - Fabric network identity provisioning CLI

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    hlfp_cli::run().await
}
