//! CA client adapter.
//!
//! [`CaClient`] is the structured seam the pipeline talks to: queries return
//! a tagged [`IdentityStatus`], registrations a tagged [`RegisterOutcome`],
//! and transient unavailability is a distinct error class. The
//! fabric-ca-client implementation is the only place that inspects command
//! output text; nothing above this layer matches substrings.

use crate::exec::{CommandRunner, CommandSpec};
use async_trait::async_trait;
use hlfp_core::{Identity, ProvisionError, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// fabric-ca-client's signal that an identity query matched nothing
const NO_ROWS: &str = "no rows in result set";

/// fabric-ca-client's signal that a concurrent actor won the registration race
const ALREADY_REGISTERED: &str = "already registered";

/// Result of querying the CA for an identity record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityStatus {
    /// The CA holds a record for this identity
    Present,
    /// No record exists yet
    Absent,
}

/// Result of issuing a register command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// This call created the identity record
    Registered,
    /// Another actor created it first; equivalent success
    AlreadyRegistered,
}

/// Parameters for one enrollment invocation
#[derive(Debug, Clone)]
pub struct EnrollRequest {
    /// Enrollment ID
    pub username: String,
    /// Enrollment secret
    pub password: String,
    /// MSP directory name, relative to `home`
    pub msp_dir: String,
    /// fabric-ca-client home; enrollment output lands at `{home}/{msp_dir}`
    pub home: PathBuf,
}

/// A reachable CA endpoint with its pinned trust anchor
#[derive(Debug, Clone)]
pub struct CaEndpoint {
    /// Host the CA's ingress answers on
    pub url: String,
    /// TLS trust anchor for that ingress
    pub tls_cert: PathBuf,
}

impl CaEndpoint {
    /// Pin an endpoint to a trust anchor
    #[must_use]
    pub fn new(url: impl Into<String>, tls_cert: impl Into<PathBuf>) -> Self {
        Self {
            url: url.into(),
            tls_cert: tls_cert.into(),
        }
    }
}

/// Registration and enrollment operations against a CA
#[async_trait]
pub trait CaClient: Send + Sync {
    /// Check whether an identity record exists at the CA
    async fn query_identity(&self, username: &str) -> Result<IdentityStatus>;

    /// Create an identity record at the CA
    async fn register(&self, identity: &Identity) -> Result<RegisterOutcome>;

    /// Exchange credentials for signed certificate/key material
    async fn enroll(&self, request: &EnrollRequest) -> Result<()>;
}

/// [`CaClient`] backed by the fabric-ca-client binary.
///
/// Admin commands (query, register) run through `ca_runner`, which should
/// execute inside the CA pod where the client is already enrolled as the CA
/// admin. Enrollment runs through `enroll_runner` on the provisioning host
/// so the MSP directory materializes in the local material store.
pub struct FabricCaClient {
    ca_runner: Arc<dyn CommandRunner>,
    enroll_runner: Arc<dyn CommandRunner>,
    endpoint: CaEndpoint,
}

impl FabricCaClient {
    /// Build a client for one CA endpoint
    pub fn new(
        ca_runner: Arc<dyn CommandRunner>,
        enroll_runner: Arc<dyn CommandRunner>,
        endpoint: CaEndpoint,
    ) -> Self {
        Self {
            ca_runner,
            enroll_runner,
            endpoint,
        }
    }

    fn enroll_url(&self, username: &str, password: &str) -> String {
        format!("https://{username}:{password}@{}", self.endpoint.url)
    }
}

#[async_trait]
impl CaClient for FabricCaClient {
    async fn query_identity(&self, username: &str) -> Result<IdentityStatus> {
        let spec = CommandSpec::new("fabric-ca-client").args(["identity", "list", "--id", username]);
        let output = self.ca_runner.run(&spec).await?;

        if output.success {
            // An empty listing means the query succeeded but matched nothing.
            if output.stdout.trim().is_empty() {
                Ok(IdentityStatus::Absent)
            } else {
                Ok(IdentityStatus::Present)
            }
        } else if output.stderr.contains(NO_ROWS) {
            debug!(username, "identity not yet registered");
            Ok(IdentityStatus::Absent)
        } else {
            Err(ProvisionError::CaUnavailable(output.stderr))
        }
    }

    async fn register(&self, identity: &Identity) -> Result<RegisterOutcome> {
        let mut spec = CommandSpec::new("fabric-ca-client").args([
            "register",
            "--id.name",
            &identity.username,
            "--id.secret",
            &identity.password,
            "--id.type",
            identity.node_type.as_str(),
        ]);
        if identity.is_admin {
            spec = spec.args(["--id.attrs", "admin=true:ecert"]);
        }

        let output = self.ca_runner.run(&spec).await?;
        if output.success {
            Ok(RegisterOutcome::Registered)
        } else if output.stderr.to_lowercase().contains(ALREADY_REGISTERED) {
            debug!(username = %identity.username, "lost registration race, record already exists");
            Ok(RegisterOutcome::AlreadyRegistered)
        } else {
            Err(ProvisionError::CaUnavailable(output.stderr))
        }
    }

    async fn enroll(&self, request: &EnrollRequest) -> Result<()> {
        let spec = CommandSpec::new("fabric-ca-client")
            .args([
                "enroll",
                "-u",
                &self.enroll_url(&request.username, &request.password),
                "-M",
                &request.msp_dir,
                "--tls.certfiles",
            ])
            .arg(path_arg(&self.endpoint.tls_cert))
            .env("FABRIC_CA_CLIENT_HOME", path_arg(&request.home));

        let output = self.enroll_runner.run(&spec).await?;
        if output.success {
            Ok(())
        } else {
            // The enroll command is retry-safe at the CA; any failure here is
            // treated as transient and retried by the caller's policy.
            Err(ProvisionError::CaUnavailable(output.stderr))
        }
    }
}

fn path_arg(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exec::CommandOutput;
    use hlfp_core::NodeType;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Runner that replays queued outputs and records every invocation
    struct Scripted {
        outputs: Mutex<VecDeque<CommandOutput>>,
        seen: Mutex<Vec<CommandSpec>>,
    }

    impl Scripted {
        fn new(outputs: Vec<CommandOutput>) -> Arc<Self> {
            Arc::new(Self {
                outputs: Mutex::new(outputs.into()),
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CommandRunner for Scripted {
        async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
            self.seen.lock().unwrap().push(spec.clone());
            Ok(self.outputs.lock().unwrap().pop_front().expect("unscripted call"))
        }
    }

    fn ok(stdout: &str) -> CommandOutput {
        CommandOutput {
            stdout: stdout.into(),
            stderr: String::new(),
            success: true,
        }
    }

    fn fail(stderr: &str) -> CommandOutput {
        CommandOutput {
            stdout: String::new(),
            stderr: stderr.into(),
            success: false,
        }
    }

    fn client(ca: Arc<Scripted>, local: Arc<Scripted>) -> FabricCaClient {
        FabricCaClient::new(
            ca,
            local,
            CaEndpoint::new("ca.example.com", "/config/ca.pem"),
        )
    }

    #[tokio::test]
    async fn test_query_present() {
        let ca = Scripted::new(vec![ok("Name: orderer0, Type: orderer")]);
        let c = client(ca.clone(), Scripted::new(vec![]));
        assert_eq!(c.query_identity("orderer0").await.unwrap(), IdentityStatus::Present);

        let seen = ca.seen.lock().unwrap();
        assert_eq!(seen[0].args, vec!["identity", "list", "--id", "orderer0"]);
    }

    #[tokio::test]
    async fn test_query_absent_via_no_rows() {
        let ca = Scripted::new(vec![fail("Error: no rows in result set")]);
        let c = client(ca, Scripted::new(vec![]));
        assert_eq!(c.query_identity("orderer0").await.unwrap(), IdentityStatus::Absent);
    }

    #[tokio::test]
    async fn test_query_absent_via_empty_listing() {
        let ca = Scripted::new(vec![ok("")]);
        let c = client(ca, Scripted::new(vec![]));
        assert_eq!(c.query_identity("orderer0").await.unwrap(), IdentityStatus::Absent);
    }

    #[tokio::test]
    async fn test_query_other_failure_is_transient() {
        let ca = Scripted::new(vec![fail("connection refused")]);
        let c = client(ca, Scripted::new(vec![]));
        let err = c.query_identity("orderer0").await.unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_register_admin_adds_ecert_attribute() {
        let ca = Scripted::new(vec![ok("")]);
        let c = client(ca.clone(), Scripted::new(vec![]));
        let identity = Identity::new("an-admin", "pw", NodeType::Admin).admin();
        assert_eq!(c.register(&identity).await.unwrap(), RegisterOutcome::Registered);

        let seen = ca.seen.lock().unwrap();
        let args = &seen[0].args;
        assert!(args.contains(&"--id.attrs".to_string()));
        assert!(args.contains(&"admin=true:ecert".to_string()));
    }

    #[tokio::test]
    async fn test_register_lost_race_is_success() {
        let ca = Scripted::new(vec![fail("Error: Identity 'orderer0' is already registered")]);
        let c = client(ca, Scripted::new(vec![]));
        let identity = Identity::new("orderer0", "pw", NodeType::Orderer);
        assert_eq!(
            c.register(&identity).await.unwrap(),
            RegisterOutcome::AlreadyRegistered
        );
    }

    #[tokio::test]
    async fn test_enroll_command_shape() {
        let local = Scripted::new(vec![ok("")]);
        let c = client(Scripted::new(vec![]), local.clone());
        let request = EnrollRequest {
            username: "orderer0".into(),
            password: "pw".into(),
            msp_dir: "orderer0_MSP".into(),
            home: PathBuf::from("/crypto"),
        };
        c.enroll(&request).await.unwrap();

        let seen = local.seen.lock().unwrap();
        let spec = &seen[0];
        assert!(spec.args.contains(&"https://orderer0:pw@ca.example.com".to_string()));
        assert!(spec.args.contains(&"orderer0_MSP".to_string()));
        assert!(spec.args.contains(&"/config/ca.pem".to_string()));
        assert!(spec
            .envs
            .contains(&("FABRIC_CA_CLIENT_HOME".to_string(), "/crypto".to_string())));
    }

    #[tokio::test]
    async fn test_enroll_failure_is_transient() {
        let local = Scripted::new(vec![fail("dial tcp: connect: connection refused")]);
        let c = client(Scripted::new(vec![]), local);
        let request = EnrollRequest {
            username: "orderer0".into(),
            password: "pw".into(),
            msp_dir: "orderer0_MSP".into(),
            home: PathBuf::from("/crypto"),
        };
        assert!(c.enroll(&request).await.unwrap_err().is_transient());
    }
}
