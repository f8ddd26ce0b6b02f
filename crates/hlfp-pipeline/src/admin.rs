//! MSP admin bootstrapper.
//!
//! Stands up the administrative identity for an organization: namespace,
//! credentials, registration, enrollment, and secret synchronization. With
//! no CA configured, pre-generated material is discovered instead and the
//! credential steps are skipped entirely.

use crate::enrollment::Enroller;
use crate::paths::{admin_msp_pattern, resolve_unique};
use crate::registration::Registrar;
use crate::secrets::{copy_admin_cert, sync_ca_secrets, sync_identity_secrets};
use hlfp_ca::{CaClient, RetryPolicy};
use hlfp_core::types::admin_credentials_secret_name;
use hlfp_core::{Identity, NetworkConfig, NodeType, Result};
use hlfp_k8s::{credentials_secret, SecretStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Bootstraps organization admin identities
pub struct AdminBootstrapper {
    config: Arc<NetworkConfig>,
    store: Arc<dyn SecretStore>,
    ca: Option<Arc<dyn CaClient>>,
    policy: RetryPolicy,
}

impl AdminBootstrapper {
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

    /// Stand up the admin identity for `msp_name`
    pub async fn bootstrap(&self, msp_name: &str) -> Result<()> {
        let msp = self.config.msp(msp_name)?;
        let namespace = msp.namespace.clone();
        let org_admin = msp.org_admin.clone();
        let org_adminpw = msp.org_adminpw.clone();

        self.store.ensure_namespace(&namespace).await?;

        let msp_path = if let Some(ca) = &self.ca {
            self.enroll_admin_via_ca(ca.clone(), msp_name, &namespace, &org_admin, org_adminpw)
                .await?
        } else {
            info!(msp_name, "no CAs configured, using pre-generated admin material");
            let pattern = admin_msp_pattern(&self.config.core.dir_crypto, &namespace);
            resolve_unique(&pattern)?
        };

        copy_admin_cert(&msp_path)?;
        sync_identity_secrets(self.store.as_ref(), &namespace, &msp_path, &org_admin).await?;
        sync_ca_secrets(self.store.as_ref(), &namespace, &msp_path, &org_admin).await?;
        info!(msp_name, "admin MSP ready");
        Ok(())
    }

    async fn enroll_admin_via_ca(
        &self,
        ca: Arc<dyn CaClient>,
        msp_name: &str,
        namespace: &str,
        org_admin: &str,
        org_adminpw: Option<String>,
    ) -> Result<PathBuf> {
        let creds = credentials_secret(
            self.store.as_ref(),
            &admin_credentials_secret_name(org_admin),
            namespace,
            org_admin,
            org_adminpw,
        )
        .await?;

        // Org admins register as clients carrying the ecert admin attribute.
        let identity = Identity::new(&creds.username, &creds.password, NodeType::Client).admin();
        Registrar::new(ca.clone(), self.policy).register(&identity).await?;

        Enroller::new(ca, self.policy)
            .enroll_admin(
                &self.config.core.dir_crypto,
                msp_name,
                &creds.username,
                &creds.password,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{write_msp_tree, MemoryStore, ScriptedCa};
    use hlfp_core::config::{CaSpec, CoreDirs, MspSpec, NodeGroup};
    use std::collections::BTreeMap;
    use std::path::Path;
    use std::time::Duration;

    fn test_config(dir_crypto: &Path, with_ca: bool) -> Arc<NetworkConfig> {
        let mut cas = BTreeMap::new();
        if with_ca {
            cas.insert(
                "ca".to_string(),
                CaSpec {
                    namespace: "cas".to_string(),
                    tls_cert: PathBuf::from("/config/ca.pem"),
                },
            );
        }
        let mut msps = BTreeMap::new();
        msps.insert(
            "orderer-msp".to_string(),
            MspSpec {
                namespace: "orderers".to_string(),
                ca: with_ca.then(|| "ca".to_string()),
                org_admin: "ord-admin".to_string(),
                org_adminpw: None,
            },
        );
        Arc::new(NetworkConfig {
            core: CoreDirs {
                dir_config: PathBuf::from("/config"),
                dir_crypto: dir_crypto.to_path_buf(),
            },
            cas,
            msps,
            orderers: NodeGroup {
                msp: "orderer-msp".to_string(),
                names: vec!["orderer0".to_string()],
                secret_genesis: Some("hlf--genesis".to_string()),
                secret_channel: None,
                channel_name: None,
                channel_profile: None,
            },
            peers: NodeGroup {
                msp: "orderer-msp".to_string(),
                names: vec![],
                secret_genesis: None,
                secret_channel: Some("hlf--channel".to_string()),
                channel_name: Some("mychannel".to_string()),
                channel_profile: Some("MyChannel".to_string()),
            },
        })
    }

    fn policy() -> RetryPolicy {
        RetryPolicy::fixed(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn test_bootstrap_with_ca() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), true);
        let store = MemoryStore::new();
        let ca = ScriptedCa::new();

        let bootstrapper =
            AdminBootstrapper::new(config, store.clone(), Some(ca.clone()), policy());
        bootstrapper.bootstrap("orderer-msp").await.unwrap();

        assert_eq!(store.namespaces(), vec!["orderers"]);
        assert!(store.contains("hlf--ord-admin-admincred", "orderers"));
        assert_eq!(ca.register_calls(), 1);
        assert_eq!(ca.enroll_calls(), 1);
        assert!(store.contains("hlf--ord-admin-idcert", "orderers"));
        assert!(store.contains("hlf--ord-admin-idkey", "orderers"));
        assert!(store.contains("hlf--ord-admin-cacert", "orderers"));
        // Admin cert copied alongside the enrollment output.
        assert!(dir
            .path()
            .join("orderer-msp")
            .join("admincerts")
            .join("cert.pem")
            .is_file());
    }

    #[tokio::test]
    async fn test_bootstrap_uses_configured_admin_password() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = (*test_config(dir.path(), true)).clone();
        cfg.msps.get_mut("orderer-msp").unwrap().org_adminpw = Some("chosen-pw".to_string());
        let store = MemoryStore::new();
        let ca = ScriptedCa::new();

        let bootstrapper =
            AdminBootstrapper::new(Arc::new(cfg), store.clone(), Some(ca), policy());
        bootstrapper.bootstrap("orderer-msp").await.unwrap();

        let fields = store
            .get("hlf--ord-admin-admincred", "orderers")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fields["CA_USERNAME"], "ord-admin");
        assert_eq!(fields["CA_PASSWORD"], "chosen-pw");
    }

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), true);
        let store = MemoryStore::new();
        let ca = ScriptedCa::new();

        let bootstrapper =
            AdminBootstrapper::new(config, store.clone(), Some(ca.clone()), policy());
        bootstrapper.bootstrap("orderer-msp").await.unwrap();
        let created_after_first = store.created_count();

        bootstrapper.bootstrap("orderer-msp").await.unwrap();
        assert_eq!(store.created_count(), created_after_first);
        // Registered once, enrolled once across both runs.
        assert_eq!(ca.register_calls(), 1);
        assert_eq!(ca.enroll_calls(), 1);
    }

    #[tokio::test]
    async fn test_bootstrap_without_ca_uses_pregenerated_material() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), false);
        write_msp_tree(
            &dir.path()
                .join("crypto-config/ordererOrganizations/orderers.example.com/users/Admin@orderers/msp"),
            &[],
        );
        let store = MemoryStore::new();

        let bootstrapper = AdminBootstrapper::new(config, store.clone(), None, policy());
        bootstrapper.bootstrap("orderer-msp").await.unwrap();

        assert!(store.contains("hlf--ord-admin-idcert", "orderers"));
        assert!(store.contains("hlf--ord-admin-cacert", "orderers"));
        // No CA: no credentials secret was minted.
        assert!(!store.contains("hlf--ord-admin-admincred", "orderers"));
    }

    #[tokio::test]
    async fn test_bootstrap_without_ca_and_without_material_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path(), false);
        let store = MemoryStore::new();

        let bootstrapper = AdminBootstrapper::new(config, store, None, policy());
        let err = bootstrapper.bootstrap("orderer-msp").await.unwrap_err();
        assert!(err.is_ambiguity());
    }
}
