use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading or validating a service-account credential.
///
/// Any of these means no authenticated client can be built, so nothing may be
/// written to the store.
#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("Failed to read credential file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid credential JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Unsupported credential type '{0}', expected 'service_account'")]
    WrongType(String),

    #[error("Credential is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("Invalid private key: {0}")]
    InvalidKey(#[from] jsonwebtoken::errors::Error),

    #[error("A project id is required when no credential file is used")]
    MissingProject,
}

/// Failures while writing a document.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Failed to sign token assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    #[error("Store rejected write (status {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Unexpected store response: {0}")]
    InvalidResponse(String),
}
