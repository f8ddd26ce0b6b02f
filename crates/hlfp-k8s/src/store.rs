//! Secret store adapter.
//!
//! The pipeline only ever creates secrets that do not yet exist. The
//! create-if-absent contract lives here: an AlreadyExists answer from the
//! cluster is success, so concurrent provisioning runs racing on the same
//! secret name converge to a single record. Nothing in this crate deletes
//! or mutates an existing secret.

use async_trait::async_trait;
use base64::Engine;
use hlfp_ca::{CommandRunner, CommandSpec};
use hlfp_core::{ProvisionError, Result};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Named, namespaced key-value records in the cluster
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Create the namespace if it does not exist
    async fn ensure_namespace(&self, namespace: &str) -> Result<()>;

    /// Fetch a secret's fields, or `None` if it does not exist
    async fn get(&self, name: &str, namespace: &str) -> Result<Option<BTreeMap<String, String>>>;

    /// Create a secret from literal fields if absent.
    ///
    /// Returns `true` when this call created the secret, `false` when a
    /// record already existed. Never overwrites.
    async fn create_from_fields(
        &self,
        name: &str,
        namespace: &str,
        fields: &BTreeMap<String, String>,
    ) -> Result<bool>;

    /// Create a secret holding one file's contents under `key` if absent.
    ///
    /// Same create-if-absent semantics as [`Self::create_from_fields`].
    async fn create_from_file(
        &self,
        name: &str,
        namespace: &str,
        key: &str,
        path: &Path,
    ) -> Result<bool>;
}

/// [`SecretStore`] backed by kubectl
pub struct KubectlStore {
    runner: Arc<dyn CommandRunner>,
}

impl KubectlStore {
    /// Drive kubectl through the given runner
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    async fn create(&self, name: &str, namespace: &str, source_args: &[String]) -> Result<bool> {
        let spec = CommandSpec::new("kubectl")
            .args(["create", "secret", "generic", name, "-n", namespace])
            .args(source_args.iter().cloned());
        let output = self.runner.run(&spec).await?;

        if output.success {
            info!(name, namespace, "created secret");
            Ok(true)
        } else if output.stderr.contains("AlreadyExists") {
            debug!(name, namespace, "secret already exists");
            Ok(false)
        } else {
            Err(ProvisionError::SecretStore(output.stderr))
        }
    }
}

#[async_trait]
impl SecretStore for KubectlStore {
    async fn ensure_namespace(&self, namespace: &str) -> Result<()> {
        let spec = CommandSpec::new("kubectl").args(["create", "namespace", namespace]);
        let output = self.runner.run(&spec).await?;

        if output.success || output.stderr.contains("AlreadyExists") {
            Ok(())
        } else {
            Err(ProvisionError::SecretStore(output.stderr))
        }
    }

    async fn get(&self, name: &str, namespace: &str) -> Result<Option<BTreeMap<String, String>>> {
        let spec =
            CommandSpec::new("kubectl").args(["get", "secret", name, "-n", namespace, "-o", "json"]);
        let output = self.runner.run(&spec).await?;

        if !output.success {
            if output.stderr.contains("NotFound") {
                return Ok(None);
            }
            return Err(ProvisionError::SecretStore(output.stderr));
        }

        let value: serde_json::Value = serde_json::from_str(&output.stdout)?;
        let mut fields = BTreeMap::new();
        if let Some(data) = value.get("data").and_then(|d| d.as_object()) {
            for (key, encoded) in data {
                let encoded = encoded.as_str().unwrap_or_default();
                let bytes = base64::engine::general_purpose::STANDARD
                    .decode(encoded)
                    .map_err(|e| {
                        ProvisionError::SecretStore(format!("undecodable field {key}: {e}"))
                    })?;
                let text = String::from_utf8(bytes).map_err(|e| {
                    ProvisionError::SecretStore(format!("non-utf8 field {key}: {e}"))
                })?;
                fields.insert(key.clone(), text);
            }
        }
        Ok(Some(fields))
    }

    async fn create_from_fields(
        &self,
        name: &str,
        namespace: &str,
        fields: &BTreeMap<String, String>,
    ) -> Result<bool> {
        let args: Vec<String> = fields
            .iter()
            .map(|(key, value)| format!("--from-literal={key}={value}"))
            .collect();
        self.create(name, namespace, &args).await
    }

    async fn create_from_file(
        &self,
        name: &str,
        namespace: &str,
        key: &str,
        path: &Path,
    ) -> Result<bool> {
        if !path.is_file() {
            return Err(ProvisionError::MissingMaterial(path.to_path_buf()));
        }
        let args = vec![format!("--from-file={key}={}", path.display())];
        self.create(name, namespace, &args).await
    }
}
