//! Pod discovery for exec-style adapters.

use hlfp_ca::{CommandRunner, CommandSpec};
use hlfp_core::{ProvisionError, Result};
use std::sync::Arc;

/// Find the pod backing a release by label selection.
///
/// Returns the first matching pod's name; CA releases run a single replica,
/// so the first entry is the only one.
pub async fn find_pod(
    runner: &Arc<dyn CommandRunner>,
    namespace: &str,
    app: &str,
    release: &str,
) -> Result<String> {
    let selector = format!("app={app},release={release}");
    let spec = CommandSpec::new("kubectl").args([
        "get",
        "pods",
        "-n",
        namespace,
        "-l",
        &selector,
        "-o",
        "json",
    ]);
    let output = runner.run(&spec).await?;
    if !output.success {
        return Err(ProvisionError::Endpoint(output.stderr));
    }

    let value: serde_json::Value = serde_json::from_str(&output.stdout)?;
    value
        .pointer("/items/0/metadata/name")
        .and_then(|name| name.as_str())
        .map(String::from)
        .ok_or_else(|| {
            ProvisionError::Endpoint(format!(
                "no pod matching {selector} in namespace {namespace}"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use hlfp_ca::CommandOutput;
    use std::sync::Mutex;

    struct OneShot {
        output: Mutex<Option<CommandOutput>>,
    }

    #[async_trait]
    impl CommandRunner for OneShot {
        async fn run(&self, _spec: &CommandSpec) -> Result<CommandOutput> {
            Ok(self.output.lock().unwrap().take().expect("single call"))
        }
    }

    fn runner(stdout: &str, success: bool) -> Arc<dyn CommandRunner> {
        Arc::new(OneShot {
            output: Mutex::new(Some(CommandOutput {
                stdout: stdout.into(),
                stderr: String::new(),
                success,
            })),
        })
    }

    #[tokio::test]
    async fn test_find_pod_returns_first_match() {
        let r = runner(r#"{"items":[{"metadata":{"name":"ca-hlf-ca-0"}}]}"#, true);
        let pod = find_pod(&r, "cas", "hlf-ca", "ca").await.unwrap();
        assert_eq!(pod, "ca-hlf-ca-0");
    }

    #[tokio::test]
    async fn test_find_pod_no_match_is_error() {
        let r = runner(r#"{"items":[]}"#, true);
        let err = find_pod(&r, "cas", "hlf-ca", "ca").await.unwrap_err();
        assert!(matches!(err, ProvisionError::Endpoint(_)));
    }
}
