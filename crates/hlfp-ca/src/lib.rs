//! Certificate-authority client adapter for hlf-provision.
//!
//! Wraps the external fabric-ca-client binary behind the structured
//! [`CaClient`] trait: identity queries, registrations, and enrollments with
//! a tagged transient/fatal error distinction instead of raw command output.
//! Also home to the [`CommandRunner`] execution seam shared by the other
//! adapters and the [`RetryPolicy`] governing waits on a slow-to-converge CA.

pub mod client;
pub mod exec;
pub mod retry;

pub use client::{CaClient, CaEndpoint, EnrollRequest, FabricCaClient, IdentityStatus, RegisterOutcome};
pub use exec::{CommandOutput, CommandRunner, CommandSpec, LocalRunner, PodRunner};
pub use retry::{retry_transient, Backoff, RetryPolicy};
