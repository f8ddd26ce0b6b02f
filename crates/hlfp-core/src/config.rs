//! Network topology configuration.
//!
//! Deserialized from a YAML file describing which MSPs, CAs, and nodes make
//! up the network, plus the local directories used for config and crypto
//! material. The pipeline never mutates this; it is read-only topology.

use crate::error::{ProvisionError, Result};
use crate::types::NodeType;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Full network configuration for a provisioning run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Local directory layout
    pub core: CoreDirs,

    /// Certificate authorities, keyed by release name.
    ///
    /// An empty map means the network runs in cryptogen mode: MSP material
    /// is pre-generated out-of-band and no registration/enrollment happens.
    #[serde(default)]
    pub cas: BTreeMap<String, CaSpec>,

    /// Membership service providers, keyed by MSP name
    pub msps: BTreeMap<String, MspSpec>,

    /// Ordering-service nodes
    pub orderers: NodeGroup,

    /// Peer nodes
    pub peers: NodeGroup,
}

/// Local directories the pipeline works in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreDirs {
    /// Directory holding configtx profiles and other static config
    pub dir_config: PathBuf,
    /// Material store root: MSP output and generated artifacts land here
    pub dir_crypto: PathBuf,
}

/// A certificate-authority release
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaSpec {
    /// Cluster namespace the CA runs in
    pub namespace: String,
    /// Pinned TLS trust anchor for the CA's ingress
    pub tls_cert: PathBuf,
}

/// A membership service provider (organization)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MspSpec {
    /// Cluster namespace this organization's secrets live in
    pub namespace: String,
    /// CA release used by this organization (absent in cryptogen mode)
    #[serde(default)]
    pub ca: Option<String>,
    /// Username of the organization administrator
    pub org_admin: String,
    /// Operator-chosen admin enrollment password; generated when absent
    #[serde(default)]
    pub org_adminpw: Option<String>,
}

/// A group of like-typed nodes (orderers or peers)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeGroup {
    /// MSP the nodes belong to
    pub msp: String,
    /// Release names, one per node
    pub names: Vec<String>,
    /// Secret name for the genesis block (orderers only)
    #[serde(default)]
    pub secret_genesis: Option<String>,
    /// Secret name for the channel transaction (peers only)
    #[serde(default)]
    pub secret_channel: Option<String>,
    /// Channel id (peers only)
    #[serde(default)]
    pub channel_name: Option<String>,
    /// configtx profile used to create the channel (peers only)
    #[serde(default)]
    pub channel_profile: Option<String>,
}

impl NetworkConfig {
    /// Load config from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// True when the network uses a live CA rather than pre-generated material
    #[must_use]
    pub fn uses_ca(&self) -> bool {
        !self.cas.is_empty()
    }

    /// Look up an MSP by name
    pub fn msp(&self, msp_name: &str) -> Result<&MspSpec> {
        self.msps
            .get(msp_name)
            .ok_or_else(|| ProvisionError::Config(format!("unknown MSP: {msp_name}")))
    }

    /// Look up a CA by release name
    pub fn ca(&self, ca_name: &str) -> Result<&CaSpec> {
        self.cas
            .get(ca_name)
            .ok_or_else(|| ProvisionError::Config(format!("unknown CA: {ca_name}")))
    }

    /// The CA used by an MSP, if the network runs one
    pub fn ca_for_msp(&self, msp_name: &str) -> Result<Option<(&str, &CaSpec)>> {
        let msp = self.msp(msp_name)?;
        match (&msp.ca, self.uses_ca()) {
            (Some(ca_name), true) => Ok(Some((ca_name.as_str(), self.ca(ca_name)?))),
            _ => Ok(None),
        }
    }

    /// The node group for a node type; only orderers and peers have groups
    pub fn nodes(&self, node_type: NodeType) -> Result<&NodeGroup> {
        match node_type {
            NodeType::Orderer => Ok(&self.orderers),
            NodeType::Peer => Ok(&self.peers),
            other => Err(ProvisionError::Config(format!(
                "no node group for type {other}"
            ))),
        }
    }

    fn validate(&self) -> Result<()> {
        for group in [&self.orderers, &self.peers] {
            if !self.msps.contains_key(&group.msp) {
                return Err(ProvisionError::Config(format!(
                    "node group references unknown MSP: {}",
                    group.msp
                )));
            }
        }
        for (name, msp) in &self.msps {
            if let Some(ca) = &msp.ca {
                if !self.cas.is_empty() && !self.cas.contains_key(ca) {
                    return Err(ProvisionError::Config(format!(
                        "MSP {name} references unknown CA: {ca}"
                    )));
                }
            }
        }
        Ok(())
    }
}
