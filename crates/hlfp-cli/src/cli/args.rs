//! Command-line argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Provision Fabric network identities into a Kubernetes cluster
///
/// Registers identities with the network's CA, enrolls them for signed
/// certificate/key material, and materializes everything as cluster
/// secrets. Every command is idempotent: re-running skips work already done.
#[derive(Parser, Debug)]
#[command(name = "hlfp")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the network configuration file
    #[arg(short, long, env = "HLFP_CONFIG", default_value = "network.yaml", global = true)]
    pub config: PathBuf,

    /// Bound total CA wait time in seconds (default: wait forever)
    #[arg(long, global = true)]
    pub deadline_secs: Option<u64>,

    /// Increase verbosity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stand up an organization's administrative identity
    Admin(AdminArgs),

    /// Provision identities for all configured nodes of a type
    Nodes(NodesArgs),

    /// Generate and store the genesis block
    Genesis,

    /// Generate and store the channel creation transaction
    Channel,
}

/// Arguments for the admin command
#[derive(Args, Debug)]
pub struct AdminArgs {
    /// Name of the MSP to bootstrap
    pub msp: String,
}

/// Arguments for the nodes command
#[derive(Args, Debug)]
pub struct NodesArgs {
    /// Type of nodes to provision
    #[arg(value_enum)]
    pub node_type: NodeTypeArg,
}

/// Node types that have configured groups
#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum NodeTypeArg {
    /// Ordering-service nodes
    Orderer,
    /// Peer nodes
    Peer,
}

impl From<NodeTypeArg> for hlfp::NodeType {
    fn from(arg: NodeTypeArg) -> Self {
        match arg {
            NodeTypeArg::Orderer => Self::Orderer,
            NodeTypeArg::Peer => Self::Peer,
        }
    }
}
