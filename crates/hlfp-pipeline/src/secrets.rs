//! Secret synchronizer: converts MSP material files into secret-store entries.
//!
//! Driven by the static [`CryptoFile`] catalogues. Creation is delegated to
//! the store's create-if-absent primitive; existence is never pre-checked
//! here. Missing required material aborts the identity's provisioning,
//! missing optional material is logged and skipped, and an ambiguous
//! subdirectory (more than one candidate file) always aborts.

use hlfp_core::types::material_secret_name;
use hlfp_core::{CryptoFile, ProvisionError, Result, CA_FILES, IDENTITY_FILES};
use hlfp_k8s::SecretStore;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Sync one catalogue of MSP material into the secret store
pub async fn sync_material(
    store: &dyn SecretStore,
    namespace: &str,
    msp_path: &Path,
    username: &str,
    catalogue: &[CryptoFile],
) -> Result<()> {
    for item in catalogue {
        let secret_name = material_secret_name(username, item.secret_kind);
        let dir = msp_path.join(item.subfolder);

        let outcome = match single_file(&dir) {
            Ok(file) => {
                store
                    .create_from_file(&secret_name, namespace, item.expected_filename, &file)
                    .await
            }
            Err(err) => Err(err),
        };

        match outcome {
            Ok(_) => debug!(secret_name, namespace, "synchronized material"),
            Err(err) if err.is_ambiguity() => return Err(err),
            Err(err) if item.required => return Err(err),
            Err(err) => {
                warn!(secret_name, dir = %dir.display(), error = %err, "optional material absent, secret not created");
            }
        }
    }
    Ok(())
}

/// Sync the identity catalogue (certificate + private key, both required)
pub async fn sync_identity_secrets(
    store: &dyn SecretStore,
    namespace: &str,
    msp_path: &Path,
    username: &str,
) -> Result<()> {
    sync_material(store, namespace, msp_path, username, &IDENTITY_FILES).await
}

/// Sync the CA catalogue (root cert required, intermediate optional)
pub async fn sync_ca_secrets(
    store: &dyn SecretStore,
    namespace: &str,
    msp_path: &Path,
    username: &str,
) -> Result<()> {
    sync_material(store, namespace, msp_path, username, &CA_FILES).await
}

/// Copy the administrator certificate from `signcerts` into `admincerts`.
///
/// The source directory must contain exactly one file; anything else is a
/// data-integrity error. The copy is skipped when the destination file
/// already exists, and the `admincerts` directory is created on demand.
pub fn copy_admin_cert(msp_path: &Path) -> Result<()> {
    let source = single_file(&msp_path.join("signcerts"))?;
    let filename = source
        .file_name()
        .ok_or_else(|| ProvisionError::MissingMaterial(source.clone()))?;

    let dest_dir = msp_path.join("admincerts");
    let dest = dest_dir.join(filename);
    if dest.is_file() {
        debug!(dest = %dest.display(), "admin certificate already in place");
        return Ok(());
    }

    std::fs::create_dir_all(&dest_dir)?;
    std::fs::copy(&source, &dest)?;
    debug!(source = %source.display(), dest = %dest.display(), "copied admin certificate");
    Ok(())
}

/// The single file inside `dir`.
///
/// Zero files (or no directory) is missing material; more than one is
/// ambiguous and never auto-resolved.
fn single_file(dir: &Path) -> Result<PathBuf> {
    if !dir.is_dir() {
        return Err(ProvisionError::MissingMaterial(dir.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();

    match files.len() {
        0 => Err(ProvisionError::MissingMaterial(dir.to_path_buf())),
        1 => Ok(files.remove(0)),
        found => Err(ProvisionError::AmbiguousMaterial {
            dir: dir.to_path_buf(),
            found,
        }),
    }
}
