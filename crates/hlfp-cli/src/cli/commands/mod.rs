//! Command implementations.

pub mod admin;
pub mod channel;
pub mod genesis;
pub mod nodes;

use anyhow::Result;
use hlfp::{
    find_pod, CaClient, CaEndpoint, CommandRunner, EndpointResolver, FabricCaClient,
    KubectlIngressResolver, NetworkConfig, PodRunner, RetryPolicy, SecretStore,
};
use std::sync::Arc;

/// Shared context for command execution
pub struct Context {
    pub config: Arc<NetworkConfig>,
    pub store: Arc<dyn SecretStore>,
    pub runner: Arc<dyn CommandRunner>,
    pub policy: RetryPolicy,
}

impl Context {
    /// Build a CA client for the MSP, if the network runs a CA.
    ///
    /// Registration commands exec inside the CA pod; enrollment runs
    /// locally against the CA's ingress host.
    pub async fn ca_for_msp(&self, msp_name: &str) -> Result<Option<Arc<dyn CaClient>>> {
        let Some((ca_name, ca_spec)) = self.config.ca_for_msp(msp_name)? else {
            return Ok(None);
        };

        let release = format!("{ca_name}-hlf-ca");
        let resolver = KubectlIngressResolver::new(self.runner.clone());
        let hosts = resolver.resolve(&release, &ca_spec.namespace).await?;
        let url = hosts
            .first()
            .ok_or_else(|| anyhow::anyhow!("no ingress host for CA {ca_name}"))?;

        let pod = find_pod(&self.runner, &ca_spec.namespace, "hlf-ca", ca_name).await?;
        let pod_runner = Arc::new(PodRunner::new(
            self.runner.clone(),
            ca_spec.namespace.as_str(),
            pod,
        ));

        let endpoint = CaEndpoint::new(url.as_str(), ca_spec.tls_cert.clone());
        Ok(Some(Arc::new(FabricCaClient::new(
            pod_runner,
            self.runner.clone(),
            endpoint,
        ))))
    }
}
