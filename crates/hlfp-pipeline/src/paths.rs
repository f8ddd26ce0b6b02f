//! Pre-generated material discovery (cryptogen fallback).
//!
//! When the network runs without a CA, MSP material is produced out-of-band
//! under `{dir_crypto}/crypto-config` and located by pattern. Exactly one
//! match is valid; any other cardinality is a fatal configuration error,
//! never resolved by picking the first.

use hlfp_core::{NodeType, ProvisionError, Result};
use std::path::{Path, PathBuf};

/// Resolve a pattern that must match exactly one path
pub fn resolve_unique(pattern: &str) -> Result<PathBuf> {
    let paths = glob::glob(pattern)
        .map_err(|e| ProvisionError::Config(format!("invalid pattern {pattern}: {e}")))?;
    let mut matches: Vec<PathBuf> = paths.filter_map(std::result::Result::ok).collect();

    if matches.len() == 1 {
        Ok(matches.remove(0))
    } else {
        Err(ProvisionError::AmbiguousPath {
            pattern: pattern.to_string(),
            matches,
        })
    }
}

/// Pattern locating an organization admin's pre-generated MSP
#[must_use]
pub fn admin_msp_pattern(dir_crypto: &Path, namespace: &str) -> String {
    format!(
        "{}/crypto-config/*Organizations/{namespace}*/users/Admin*/msp",
        dir_crypto.display()
    )
}

/// Pattern locating a node's pre-generated MSP
#[must_use]
pub fn node_msp_pattern(
    dir_crypto: &Path,
    node_type: NodeType,
    namespace: &str,
    release: &str,
) -> String {
    format!(
        "{dir}/crypto-config/{node_type}Organizations/{namespace}*/{node_type}s/{release}*/msp",
        dir = dir_crypto.display(),
    )
}
