//! CA credential secrets.
//!
//! Each identity's enrollment credentials live in a secret so re-runs pick
//! up the same password instead of minting a new one. Get-or-create: an
//! existing record always wins, and a supplied password is only used when
//! no record exists yet.

use crate::store::SecretStore;
use hlfp_core::{ProvisionError, Result, CRED_PASSWORD_KEY, CRED_USERNAME_KEY};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Length of generated enrollment passwords
const PASSWORD_LEN: usize = 24;

/// Username/password pair for CA enrollment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Enrollment ID
    pub username: String,
    /// Enrollment secret
    pub password: String,
}

/// Resolve or create the credentials secret for an identity.
///
/// If the secret exists its stored values are returned (the stored username
/// must match `username`; a mismatch means two identities collided on one
/// secret name and is a configuration error). Otherwise the secret is
/// created with `password`, or a generated one when `None`. A concurrent
/// run may create the secret between the read and the create; the stored
/// record always wins over the locally generated one.
pub async fn credentials_secret(
    store: &dyn SecretStore,
    name: &str,
    namespace: &str,
    username: &str,
    password: Option<String>,
) -> Result<Credentials> {
    if let Some(fields) = store.get(name, namespace).await? {
        return stored_credentials(&fields, name, username);
    }

    let password = password.unwrap_or_else(|| generate_password(PASSWORD_LEN));
    let mut fields = BTreeMap::new();
    fields.insert(CRED_USERNAME_KEY.to_string(), username.to_string());
    fields.insert(CRED_PASSWORD_KEY.to_string(), password.clone());
    if !store.create_from_fields(name, namespace, &fields).await? {
        debug!(name, namespace, "lost creation race, reading stored credentials");
        let fields = store.get(name, namespace).await?.ok_or_else(|| {
            ProvisionError::SecretStore(format!(
                "credentials secret {name} reported existing but could not be read"
            ))
        })?;
        return stored_credentials(&fields, name, username);
    }
    info!(name, namespace, username, "created credentials secret");

    Ok(Credentials {
        username: username.to_string(),
        password,
    })
}

fn stored_credentials(
    fields: &BTreeMap<String, String>,
    name: &str,
    username: &str,
) -> Result<Credentials> {
    let stored_username = fields.get(CRED_USERNAME_KEY).cloned().unwrap_or_default();
    let stored_password = fields.get(CRED_PASSWORD_KEY).cloned().unwrap_or_default();
    if stored_username != username {
        return Err(ProvisionError::Config(format!(
            "credentials secret {name} holds username {stored_username}, expected {username}"
        )));
    }
    if stored_password.is_empty() {
        return Err(ProvisionError::SecretStore(format!(
            "credentials secret {name} has no {CRED_PASSWORD_KEY} field"
        )));
    }
    Ok(Credentials {
        username: stored_username,
        password: stored_password,
    })
}

fn generate_password(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
