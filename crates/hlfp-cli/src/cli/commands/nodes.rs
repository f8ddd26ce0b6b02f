//! Nodes command - provision identities for a group of nodes.

use super::Context;
use crate::cli::args::NodesArgs;
use anyhow::Result;
use hlfp::{NodeProvisioner, NodeType};
use tracing::info;

pub async fn execute(ctx: &Context, args: NodesArgs) -> Result<()> {
    let node_type: NodeType = args.node_type.into();
    let msp_name = ctx.config.nodes(node_type)?.msp.clone();
    info!("Provisioning {node_type} identities for MSP {msp_name}");

    let ca = ctx.ca_for_msp(&msp_name).await?;
    let provisioner =
        NodeProvisioner::new(ctx.config.clone(), ctx.store.clone(), ca, ctx.policy);
    provisioner.provision_all(node_type).await?;

    info!("All {node_type} identities are in place");
    Ok(())
}
