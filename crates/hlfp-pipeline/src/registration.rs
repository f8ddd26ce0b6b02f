//! Registration coordinator: idempotent register-if-absent against the CA.
//!
//! Registration state is never persisted locally; the CA is queried on every
//! run and the absent→present transition happens at most once per identity,
//! tolerant of other coordinators racing on the same name.

use hlfp_ca::{retry_transient, CaClient, IdentityStatus, RegisterOutcome, RetryPolicy};
use hlfp_core::{Identity, Result};
use std::sync::Arc;
use tracing::{debug, info};

/// Registers identities with the CA, retrying through unavailability
pub struct Registrar {
    ca: Arc<dyn CaClient>,
    policy: RetryPolicy,
}

impl Registrar {
    /// Coordinate registrations against `ca` under `policy`
    pub fn new(ca: Arc<dyn CaClient>, policy: RetryPolicy) -> Self {
        Self { ca, policy }
    }

    /// Register `identity` unless the CA already holds a record for it.
    ///
    /// Both the query and the register command are retried on transient
    /// failure. Losing a registration race to another coordinator is the
    /// same success as finding the record already present.
    pub async fn register(&self, identity: &Identity) -> Result<()> {
        let status = retry_transient(&self.policy, "identity query", || {
            self.ca.query_identity(&identity.username)
        })
        .await?;

        if status == IdentityStatus::Present {
            debug!(username = %identity.username, "already registered, skipping");
            return Ok(());
        }

        let outcome =
            retry_transient(&self.policy, "register", || self.ca.register(identity)).await?;
        match outcome {
            RegisterOutcome::Registered => {
                info!(username = %identity.username, node_type = %identity.node_type, "registered identity");
            }
            RegisterOutcome::AlreadyRegistered => {
                debug!(username = %identity.username, "registered concurrently elsewhere");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::ScriptedCa;
    use hlfp_core::NodeType;
    use std::time::Duration;

    fn policy() -> RetryPolicy {
        RetryPolicy::fixed(Duration::from_millis(1))
    }

    fn identity() -> Identity {
        Identity::new("orderer0", "pw", NodeType::Orderer)
    }

    #[tokio::test]
    async fn test_present_identity_skips_register() {
        let ca = ScriptedCa::new().present();
        let registrar = Registrar::new(ca.clone(), policy());
        registrar.register(&identity()).await.unwrap();

        assert_eq!(ca.query_calls(), 1);
        assert_eq!(ca.register_calls(), 0);
    }

    #[tokio::test]
    async fn test_absent_identity_registers_once() {
        let ca = ScriptedCa::new();
        let registrar = Registrar::new(ca.clone(), policy());
        registrar.register(&identity()).await.unwrap();

        assert_eq!(ca.query_calls(), 1);
        assert_eq!(ca.register_calls(), 1);
    }

    #[tokio::test]
    async fn test_query_retries_through_unavailability() {
        let ca = ScriptedCa::new().query_failures(3);
        let registrar = Registrar::new(ca.clone(), policy());
        registrar.register(&identity()).await.unwrap();

        // 3 transient failures, then the successful query
        assert_eq!(ca.query_calls(), 4);
        assert_eq!(ca.register_calls(), 1);
    }

    #[tokio::test]
    async fn test_lost_race_is_success() {
        let ca = ScriptedCa::new().register_race();
        let registrar = Registrar::new(ca.clone(), policy());
        registrar.register(&identity()).await.unwrap();
        assert_eq!(ca.register_calls(), 1);
    }

    #[tokio::test]
    async fn test_register_retries_through_unavailability() {
        let ca = ScriptedCa::new().register_failures(2);
        let registrar = Registrar::new(ca.clone(), policy());
        registrar.register(&identity()).await.unwrap();
        assert_eq!(ca.register_calls(), 3);
    }
}
