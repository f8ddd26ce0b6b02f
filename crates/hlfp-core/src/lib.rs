//! Core types and configuration for the hlf-provision toolkit.
//!
//! Everything here is shared by the adapter crates (`hlfp-ca`, `hlfp-k8s`)
//! and the provisioning pipeline (`hlfp-pipeline`): the error taxonomy that
//! drives retry/abort decisions, the identity and crypto-material types, and
//! the YAML network configuration.

pub mod config;
pub mod error;
pub mod types;

pub use config::{CaSpec, CoreDirs, MspSpec, NetworkConfig, NodeGroup};
pub use error::{ProvisionError, Result};
pub use types::{
    CryptoFile, Identity, NodeType, CA_FILES, CRED_PASSWORD_KEY, CRED_USERNAME_KEY, IDENTITY_FILES,
};
