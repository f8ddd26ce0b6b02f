//! Provisions cryptographic identities for a permissioned ledger network and
//! materializes the resulting key material into a cluster secret store.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use hlfp::{AdminBootstrapper, NodeProvisioner, NetworkConfig, RetryPolicy};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> hlfp::Result<()> {
//!     let config = Arc::new(NetworkConfig::load("network.yaml".as_ref())?);
//!
//!     // Wire the kubectl-backed adapters, then stand up the org admin
//!     // and every configured orderer and peer.
//!     let bootstrapper = AdminBootstrapper::new(config.clone(), store, ca, RetryPolicy::default());
//!     bootstrapper.bootstrap("orderer-msp").await?;
//!
//!     Ok(())
//! }
//! ```

// Re-export core types
pub use hlfp_core::*;

// Re-export the adapters
pub use hlfp_ca::{
    CaClient, CaEndpoint, CommandRunner, CommandSpec, EnrollRequest, FabricCaClient,
    IdentityStatus, LocalRunner, PodRunner, RegisterOutcome, RetryPolicy,
};
pub use hlfp_k8s::{
    credentials_secret, find_pod, Credentials, EndpointResolver, KubectlIngressResolver,
    KubectlStore, SecretStore,
};

// Re-export the pipeline
pub use hlfp_pipeline::{
    AdminBootstrapper, ArtifactMaterializer, Enroller, NodeProvisioner, Registrar,
};

// Re-export runtime for convenience
pub use tokio;
