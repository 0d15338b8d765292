//! Service-account credential loading.

use std::fmt;
use std::path::Path;

use jsonwebtoken::EncodingKey;
use serde::Deserialize;

use crate::errors::CredentialError;

/// Token endpoint used when the key file does not name one.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const SERVICE_ACCOUNT_TYPE: &str = "service_account";

/// Key file as downloaded from the Firebase console. Every field is optional
/// here so that a missing one is reported by name rather than as a parse error.
#[derive(Debug, Deserialize)]
struct RawKeyFile {
    #[serde(rename = "type")]
    key_type: Option<String>,
    project_id: Option<String>,
    private_key_id: Option<String>,
    private_key: Option<String>,
    client_email: Option<String>,
    token_uri: Option<String>,
}

/// A validated service-account credential.
#[derive(Clone)]
pub struct ServiceAccountKey {
    pub project_id: String,
    pub private_key_id: String,
    pub client_email: String,
    pub token_uri: String,
    private_key: String,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    /// Reads and validates a key file from disk.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CredentialError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| CredentialError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    /// Parses and validates key file contents.
    pub fn from_json(json: &str) -> Result<Self, CredentialError> {
        let raw: RawKeyFile = serde_json::from_str(json)?;

        let key_type = required(raw.key_type, "type")?;
        if key_type != SERVICE_ACCOUNT_TYPE {
            return Err(CredentialError::WrongType(key_type));
        }

        Ok(Self {
            project_id: required(raw.project_id, "project_id")?,
            private_key_id: required(raw.private_key_id, "private_key_id")?,
            private_key: required(raw.private_key, "private_key")?,
            client_email: required(raw.client_email, "client_email")?,
            token_uri: raw
                .token_uri
                .filter(|uri| !uri.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TOKEN_URI.to_string()),
        })
    }

    /// Parses the PEM private key into a signing key.
    pub fn encoding_key(&self) -> Result<EncodingKey, CredentialError> {
        Ok(EncodingKey::from_rsa_pem(self.private_key.as_bytes())?)
    }
}

/// Treats absent and blank values alike.
fn required(value: Option<String>, field: &'static str) -> Result<String, CredentialError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(CredentialError::MissingField(field))
}
