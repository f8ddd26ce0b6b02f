//! Node identity provisioner.
//!
//! One pass per node: credentials, registration, enrollment, secret
//! synchronization — or, without a CA, discovery of pre-generated material.
//! Nodes are processed independently; one node's failure never aborts the
//! remaining nodes' provisioning.

use crate::enrollment::Enroller;
use crate::paths::{node_msp_pattern, resolve_unique};
use crate::registration::Registrar;
use crate::secrets::{sync_ca_secrets, sync_identity_secrets};
use hlfp_ca::{CaClient, RetryPolicy};
use hlfp_core::types::credentials_secret_name;
use hlfp_core::{Identity, NetworkConfig, NodeType, ProvisionError, Result};
use hlfp_k8s::{credentials_secret, SecretStore};
use std::sync::Arc;
use tracing::{error, info};

/// Provisions identities for network nodes
pub struct NodeProvisioner {
    config: Arc<NetworkConfig>,
    store: Arc<dyn SecretStore>,
    ca: Option<Arc<dyn CaClient>>,
    policy: RetryPolicy,
}

impl NodeProvisioner {
    /// `ca` is `None` when the network runs on pre-generated material
    pub fn new(
        config: Arc<NetworkConfig>,
        store: Arc<dyn SecretStore>,
        ca: Option<Arc<dyn CaClient>>,
        policy: RetryPolicy,
    ) -> Self {
        Self {
            config,
            store,
            ca,
            policy,
        }
    }

    /// Provision a single node's identity and secrets
    pub async fn provision(&self, msp_name: &str, release: &str, node_type: NodeType) -> Result<()> {
        let msp = self.config.msp(msp_name)?;
        let namespace = msp.namespace.clone();

        let msp_path = if let Some(ca) = &self.ca {
            let creds = credentials_secret(
                self.store.as_ref(),
                &credentials_secret_name(release),
                &namespace,
                release,
                None,
            )
            .await?;

            let identity = Identity::new(&creds.username, &creds.password, node_type);
            Registrar::new(ca.clone(), self.policy).register(&identity).await?;
            Enroller::new(ca.clone(), self.policy)
                .enroll(&self.config.core.dir_crypto, &creds.username, &creds.password)
                .await?
        } else {
            let pattern =
                node_msp_pattern(&self.config.core.dir_crypto, node_type, &namespace, release);
            resolve_unique(&pattern)?
        };

        sync_identity_secrets(self.store.as_ref(), &namespace, &msp_path, release).await?;
        sync_ca_secrets(self.store.as_ref(), &namespace, &msp_path, release).await?;
        info!(release, node_type = %node_type, "node identity provisioned");
        Ok(())
    }

    /// Provision every configured node of a type.
    ///
    /// Failures are isolated per node; after the pass, the names of failed
    /// nodes are surfaced together.
    pub async fn provision_all(&self, node_type: NodeType) -> Result<()> {
        let group = self.config.nodes(node_type)?;
        let mut failed = Vec::new();

        for release in &group.names {
            if let Err(err) = self.provision(&group.msp, release, node_type).await {
                error!(release, error = %err, "node provisioning failed");
                failed.push(release.clone());
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(ProvisionError::NodesFailed(failed))
        }
    }
}
