//! CA endpoint discovery via cluster ingress.

use async_trait::async_trait;
use hlfp_ca::{CommandRunner, CommandSpec};
use hlfp_core::{ProvisionError, Result};
use std::sync::Arc;

/// Resolves the URLs a service release answers on.
///
/// The first entry of the returned list is used as the CA endpoint.
#[async_trait]
pub trait EndpointResolver: Send + Sync {
    /// Hosts configured on the release's ingress, in rule order
    async fn resolve(&self, release: &str, namespace: &str) -> Result<Vec<String>>;
}

/// [`EndpointResolver`] reading ingress rules via kubectl
pub struct KubectlIngressResolver {
    runner: Arc<dyn CommandRunner>,
}

impl KubectlIngressResolver {
    /// Drive kubectl through the given runner
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

#[async_trait]
impl EndpointResolver for KubectlIngressResolver {
    async fn resolve(&self, release: &str, namespace: &str) -> Result<Vec<String>> {
        let spec = CommandSpec::new("kubectl")
            .args(["get", "ingress", release, "-n", namespace, "-o", "json"]);
        let output = self.runner.run(&spec).await?;
        if !output.success {
            return Err(ProvisionError::Endpoint(output.stderr));
        }

        let value: serde_json::Value = serde_json::from_str(&output.stdout)?;
        let hosts: Vec<String> = value
            .pointer("/spec/rules")
            .and_then(|rules| rules.as_array())
            .map(|rules| {
                rules
                    .iter()
                    .filter_map(|rule| rule.get("host").and_then(|h| h.as_str()))
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        if hosts.is_empty() {
            return Err(ProvisionError::Endpoint(format!(
                "ingress {release} in {namespace} exposes no hosts"
            )));
        }
        Ok(hosts)
    }
}
