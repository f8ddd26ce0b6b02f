use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for provisioning operations
pub type Result<T> = std::result::Result<T, ProvisionError>;

/// Errors that can occur while provisioning network identities
#[derive(Error, Debug)]
pub enum ProvisionError {
    /// The CA could not be reached or is not ready yet.
    ///
    /// Always retryable: during cluster bring-up the CA is expected to take
    /// an unbounded-but-finite time to converge.
    #[error("CA unavailable: {0}")]
    CaUnavailable(String),

    /// Required crypto-material file is absent from the MSP directory
    #[error("missing required material in {0}")]
    MissingMaterial(PathBuf),

    /// A typed MSP subdirectory holds more than one candidate file
    #[error("ambiguous material in {dir}: found {found} files, expected exactly one")]
    AmbiguousMaterial {
        /// Directory that was inspected
        dir: PathBuf,
        /// Number of files found
        found: usize,
    },

    /// A material-tree pattern matched zero or several paths where exactly one is valid
    #[error("pattern {pattern} matched {} paths, expected exactly one: {matches:?}", matches.len())]
    AmbiguousPath {
        /// Glob pattern that was evaluated
        pattern: String,
        /// Every path it matched
        matches: Vec<PathBuf>,
    },

    /// Secret store operation failed
    #[error("secret store error: {0}")]
    SecretStore(String),

    /// No usable CA endpoint could be resolved
    #[error("endpoint resolution failed: {0}")]
    Endpoint(String),

    /// External command could not be spawned or produced unusable output
    #[error("command execution failed: {0}")]
    Exec(String),

    /// Artifact generation tool failed
    #[error("artifact generation failed: {0}")]
    Artifact(String),

    /// Configuration is invalid or missing required fields
    #[error("config error: {0}")]
    Config(String),

    /// One or more node identities failed to provision; unrelated nodes completed
    #[error("provisioning failed for {count} node(s): {names:?}", count = .0.len(), names = .0)]
    NodesFailed(Vec<String>),

    /// Retry deadline elapsed before the operation succeeded
    #[error("deadline exceeded after {attempts} attempts: {last_error}")]
    DeadlineExceeded {
        /// Attempts made before giving up
        attempts: u32,
        /// Last transient error observed
        last_error: String,
    },

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ProvisionError {
    /// Returns true if the error is transient and the operation may be retried
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::CaUnavailable(_))
    }

    /// Returns true if the error signals ambiguous local state (never auto-resolved)
    #[must_use]
    pub const fn is_ambiguity(&self) -> bool {
        matches!(
            self,
            Self::AmbiguousMaterial { .. } | Self::AmbiguousPath { .. }
        )
    }
}
