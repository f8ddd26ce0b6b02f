//! Cluster adapters for hlf-provision: secret store and ingress discovery.
//!
//! The [`SecretStore`] trait carries the create-if-absent contract the
//! provisioning pipeline relies on; [`KubectlStore`] implements it on top of
//! kubectl through the shared [`hlfp_ca::CommandRunner`] seam.

pub mod credentials;
pub mod ingress;
pub mod pods;
pub mod store;

pub use credentials::{credentials_secret, Credentials};
pub use ingress::{EndpointResolver, KubectlIngressResolver};
pub use pods::find_pod;
pub use store::{KubectlStore, SecretStore};
