//! Enrollment materializer: enroll-if-not-materialized.
//!
//! Enrollment deposits the MSP directory structure into the material store.
//! Idempotency is a directory-existence check: an existing target directory
//! short-circuits without re-validating its contents (a deliberate
//! simplifying policy; corrupt prior state surfaces later as a
//! missing-material failure in the synchronizer).

use hlfp_ca::{retry_transient, CaClient, EnrollRequest, RetryPolicy};
use hlfp_core::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Enrolls identities and materializes their MSP directories
pub struct Enroller {
    ca: Arc<dyn CaClient>,
    policy: RetryPolicy,
}

impl Enroller {
    /// Enroll against `ca` under `policy`
    pub fn new(ca: Arc<dyn CaClient>, policy: RetryPolicy) -> Self {
        Self { ca, policy }
    }

    /// Enroll an identity, materializing `{dir_crypto}/{username}_MSP`.
    ///
    /// Returns the MSP path unconditionally; if the directory already
    /// exists enrollment is treated as already materialized.
    pub async fn enroll(&self, dir_crypto: &Path, username: &str, password: &str) -> Result<PathBuf> {
        let msp_dir = format!("{username}_MSP");
        let msp_path = dir_crypto.join(&msp_dir);
        if msp_path.is_dir() {
            debug!(path = %msp_path.display(), "MSP already materialized, skipping enrollment");
            return Ok(msp_path);
        }

        let request = EnrollRequest {
            username: username.to_string(),
            password: password.to_string(),
            msp_dir,
            home: dir_crypto.to_path_buf(),
        };
        retry_transient(&self.policy, "enroll", || self.ca.enroll(&request)).await?;
        info!(username, path = %msp_path.display(), "enrolled identity");
        Ok(msp_path)
    }

    /// Enroll an organization admin, materializing `{dir_crypto}/{msp_name}`.
    ///
    /// This call shape is reached independently of [`Self::enroll`], so it
    /// carries its own idempotency check: a non-empty keystore under the
    /// admin's MSP path means the material is already there.
    pub async fn enroll_admin(
        &self,
        dir_crypto: &Path,
        msp_name: &str,
        username: &str,
        password: &str,
    ) -> Result<PathBuf> {
        let msp_path = dir_crypto.join(msp_name);
        if dir_non_empty(&msp_path.join("keystore")) {
            debug!(path = %msp_path.display(), "admin keystore present, skipping enrollment");
            return Ok(msp_path);
        }

        let request = EnrollRequest {
            username: username.to_string(),
            password: password.to_string(),
            msp_dir: msp_name.to_string(),
            home: dir_crypto.to_path_buf(),
        };
        retry_transient(&self.policy, "admin enroll", || self.ca.enroll(&request)).await?;
        info!(username, path = %msp_path.display(), "enrolled admin");
        Ok(msp_path)
    }
}

fn dir_non_empty(path: &Path) -> bool {
    std::fs::read_dir(path).is_ok_and(|mut entries| entries.next().is_some())
}
