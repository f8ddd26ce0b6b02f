//! Identity provisioning and credential materialization pipeline.
//!
//! The sequence that takes a network identity from nothing to usable:
//! register it with the CA, enroll it to obtain signed certificate and key
//! material, and convert that material into durable secret-store entries —
//! idempotently, against a CA that converges slowly and a secret store that
//! may already hold partial state from a previous run.
//!
//! # Ordering
//!
//! Within one identity's lifecycle, registration strictly precedes
//! enrollment, which strictly precedes secret synchronization. Across
//! identities there is no ordering; independent runs racing on the same CA
//! and store converge thanks to at-most-one-effective-registration and the
//! store's create-if-absent contract.

pub mod admin;
pub mod artifacts;
pub mod enrollment;
pub mod nodes;
pub mod paths;
pub mod registration;
pub mod secrets;

#[cfg(test)]
pub(crate) mod testutil;

pub use admin::AdminBootstrapper;
pub use artifacts::ArtifactMaterializer;
pub use enrollment::Enroller;
pub use nodes::NodeProvisioner;
pub use registration::Registrar;
pub use secrets::{copy_admin_cert, sync_ca_secrets, sync_identity_secrets, sync_material};
