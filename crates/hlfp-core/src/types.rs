//! Identity and crypto-material types shared across the pipeline.

use serde::{Deserialize, Serialize};

/// Role a registered identity plays in the network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    /// Generic client identity
    Client,
    /// Peer node
    Peer,
    /// Ordering-service node
    Orderer,
    /// Organization administrator
    Admin,
}

impl NodeType {
    /// The `--id.type` value fabric-ca-client expects
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Client => "client",
            Self::Peer => "peer",
            Self::Orderer => "orderer",
            Self::Admin => "admin",
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An identity to be registered with (and enrolled against) the CA.
///
/// Immutable once registered; re-running the pipeline with the same
/// identity is an idempotent no-op at the CA.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Enrollment ID
    pub username: String,
    /// Enrollment secret
    pub password: String,
    /// Role registered at the CA
    pub node_type: NodeType,
    /// Whether to grant enrollment-certificate admin rights
    pub is_admin: bool,
}

impl Identity {
    /// Create a non-admin identity
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            node_type,
            is_admin: false,
        }
    }

    /// Mark the identity as an organization admin
    #[must_use]
    pub fn admin(mut self) -> Self {
        self.is_admin = true;
        self
    }
}

/// Describes one crypto-material file within an MSP directory and how it
/// maps to a secret-store entry.
///
/// The catalogues below are static configuration, not runtime state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CryptoFile {
    /// Suffix used when building the secret name (`hlf--{user}-{kind}`)
    pub secret_kind: &'static str,
    /// MSP subdirectory holding the file
    pub subfolder: &'static str,
    /// Key the file is stored under inside the secret
    pub expected_filename: &'static str,
    /// Whether provisioning must abort if the file is absent
    pub required: bool,
}

/// Identity material: signed certificate and private key, both required.
pub const IDENTITY_FILES: [CryptoFile; 2] = [
    CryptoFile {
        secret_kind: "idcert",
        subfolder: "signcerts",
        expected_filename: "cert.pem",
        required: true,
    },
    CryptoFile {
        secret_kind: "idkey",
        subfolder: "keystore",
        expected_filename: "key.pem",
        required: true,
    },
];

/// CA trust material: root cert required, intermediate cert optional.
pub const CA_FILES: [CryptoFile; 2] = [
    CryptoFile {
        secret_kind: "cacert",
        subfolder: "cacerts",
        expected_filename: "cacert.pem",
        required: true,
    },
    CryptoFile {
        secret_kind: "caintcert",
        subfolder: "intermediatecerts",
        expected_filename: "intermediatecacert.pem",
        required: false,
    },
];

/// Secret name for a piece of identity/CA material
#[must_use]
pub fn material_secret_name(username: &str, secret_kind: &str) -> String {
    format!("hlf--{username}-{secret_kind}")
}

/// Secret name for a node's CA credentials
#[must_use]
pub fn credentials_secret_name(release: &str) -> String {
    format!("hlf--{release}-cred")
}

/// Secret name for an org admin's CA credentials
#[must_use]
pub fn admin_credentials_secret_name(org_admin: &str) -> String {
    format!("hlf--{org_admin}-admincred")
}

/// Field name holding the username inside a credentials secret
pub const CRED_USERNAME_KEY: &str = "CA_USERNAME";

/// Field name holding the password inside a credentials secret
pub const CRED_PASSWORD_KEY: &str = "CA_PASSWORD";
