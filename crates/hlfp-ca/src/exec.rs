//! External command execution seam.
//!
//! Everything that shells out (fabric-ca-client, kubectl, configtxgen) goes
//! through the [`CommandRunner`] trait so adapters can be exercised against
//! scripted doubles in tests. Non-zero exit is not an error at this layer;
//! classification of failures belongs to the caller, which knows what the
//! command's output means.

use async_trait::async_trait;
use hlfp_core::{ProvisionError, Result};
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use tracing::debug;

/// A fully-specified command invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    /// Program to execute
    pub program: String,
    /// Arguments, unquoted
    pub args: Vec<String>,
    /// Extra environment variables
    pub envs: Vec<(String, String)>,
    /// Working directory; inherited when `None`
    pub cwd: Option<PathBuf>,
}

impl CommandSpec {
    /// Start building a command
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            envs: Vec::new(),
            cwd: None,
        }
    }

    /// Append one argument
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set an environment variable for the invocation
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.push((key.into(), value.into()));
        self
    }

    /// Run the command in an explicit working directory
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

/// Captured output of a finished command
#[derive(Debug, Clone)]
pub struct CommandOutput {
    /// Captured stdout
    pub stdout: String,
    /// Captured stderr
    pub stderr: String,
    /// Whether the process exited with status zero
    pub success: bool,
}

/// Executes commands and captures their output
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Run the command to completion
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput>;
}

/// Runs commands as local child processes via tokio
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalRunner;

#[async_trait]
impl CommandRunner for LocalRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        debug!(program = %spec.program, args = ?spec.args, "running command");

        let mut command = tokio::process::Command::new(&spec.program);
        command
            .args(&spec.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in &spec.envs {
            command.env(key, value);
        }
        if let Some(cwd) = &spec.cwd {
            command.current_dir(cwd);
        }

        let output = command
            .output()
            .await
            .map_err(|e| ProvisionError::Exec(format!("failed to spawn {}: {e}", spec.program)))?;

        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            success: output.status.success(),
        })
    }
}

/// Runs commands inside a cluster pod via `kubectl exec`.
///
/// Used for CA admin commands, which must run where the fabric-ca-client
/// home of the CA itself lives. Wraps an inner runner so the kubectl
/// invocation remains testable. Environment variables are forwarded with
/// an `env` wrapper; `cwd` is not supported — the command runs in the
/// container's default working directory.
pub struct PodRunner {
    inner: Arc<dyn CommandRunner>,
    namespace: String,
    pod: String,
}

impl PodRunner {
    /// Target a pod in a namespace, delegating actual execution to `inner`
    pub fn new(inner: Arc<dyn CommandRunner>, namespace: impl Into<String>, pod: impl Into<String>) -> Self {
        Self {
            inner,
            namespace: namespace.into(),
            pod: pod.into(),
        }
    }
}

#[async_trait]
impl CommandRunner for PodRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
        if let Some(cwd) = &spec.cwd {
            return Err(ProvisionError::Exec(format!(
                "cannot set working directory {} for a pod-executed command",
                cwd.display()
            )));
        }

        let mut wrapped =
            CommandSpec::new("kubectl").args(["exec", "-n", &self.namespace, &self.pod, "--"]);
        if !spec.envs.is_empty() {
            wrapped = wrapped.arg("env");
            for (key, value) in &spec.envs {
                wrapped = wrapped.arg(format!("{key}={value}"));
            }
        }
        let wrapped = wrapped.arg(&spec.program).args(spec.args.iter().cloned());
        self.inner.run(&wrapped).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct Recorder {
        seen: Mutex<Vec<CommandSpec>>,
    }

    #[async_trait]
    impl CommandRunner for Recorder {
        async fn run(&self, spec: &CommandSpec) -> Result<CommandOutput> {
            self.seen.lock().unwrap().push(spec.clone());
            Ok(CommandOutput {
                stdout: String::new(),
                stderr: String::new(),
                success: true,
            })
        }
    }

    #[test]
    fn test_spec_builder() {
        let spec = CommandSpec::new("configtxgen")
            .arg("-profile")
            .arg("OrdererGenesis")
            .env("FABRIC_CFG_PATH", "/config")
            .current_dir("/config");
        assert_eq!(spec.args, vec!["-profile", "OrdererGenesis"]);
        assert_eq!(spec.envs.len(), 1);
        assert_eq!(spec.cwd.as_deref(), Some(std::path::Path::new("/config")));
    }

    #[tokio::test]
    async fn test_pod_runner_wraps_kubectl_exec() {
        let recorder = Arc::new(Recorder {
            seen: Mutex::new(Vec::new()),
        });
        let pod = PodRunner::new(recorder.clone(), "cas", "ca-pod-0");
        let spec = CommandSpec::new("fabric-ca-client").args(["identity", "list"]);
        pod.run(&spec).await.unwrap();

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(seen[0].program, "kubectl");
        assert_eq!(
            seen[0].args,
            vec!["exec", "-n", "cas", "ca-pod-0", "--", "fabric-ca-client", "identity", "list"]
        );
    }

    #[tokio::test]
    async fn test_pod_runner_forwards_envs() {
        let recorder = Arc::new(Recorder {
            seen: Mutex::new(Vec::new()),
        });
        let pod = PodRunner::new(recorder.clone(), "cas", "ca-pod-0");
        let spec = CommandSpec::new("fabric-ca-client")
            .arg("enroll")
            .env("FABRIC_CA_CLIENT_HOME", "/crypto");
        pod.run(&spec).await.unwrap();

        let seen = recorder.seen.lock().unwrap();
        assert_eq!(
            seen[0].args,
            vec![
                "exec",
                "-n",
                "cas",
                "ca-pod-0",
                "--",
                "env",
                "FABRIC_CA_CLIENT_HOME=/crypto",
                "fabric-ca-client",
                "enroll"
            ]
        );
    }

    #[tokio::test]
    async fn test_pod_runner_rejects_cwd() {
        let recorder = Arc::new(Recorder {
            seen: Mutex::new(Vec::new()),
        });
        let pod = PodRunner::new(recorder, "cas", "ca-pod-0");
        let spec = CommandSpec::new("configtxgen").current_dir("/config");
        let err = pod.run(&spec).await.unwrap_err();
        assert!(matches!(err, ProvisionError::Exec(_)));
    }

    #[tokio::test]
    async fn test_local_runner_captures_output() {
        let output = LocalRunner
            .run(&CommandSpec::new("sh").args(["-c", "echo out; echo err >&2"]))
            .await
            .unwrap();
        assert!(output.success);
        assert_eq!(output.stdout.trim(), "out");
        assert_eq!(output.stderr.trim(), "err");
    }

    #[tokio::test]
    async fn test_local_runner_nonzero_exit_is_not_an_error() {
        let output = LocalRunner
            .run(&CommandSpec::new("sh").args(["-c", "exit 3"]))
            .await
            .unwrap();
        assert!(!output.success);
    }
}
