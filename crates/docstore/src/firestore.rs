//! Firestore REST writer.
//!
//! Documents are created with `POST .../documents/{collection}` and no
//! `documentId`, so Firestore assigns the id and every call creates a new
//! document.

use std::path::Path;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::auth::TokenProvider;
use crate::credentials::ServiceAccountKey;
use crate::errors::{CredentialError, StoreError};
use crate::models::{Document, DocumentHandle};
use crate::writer::DocumentWriter;

const FIRESTORE_BASE_URL: &str = "https://firestore.googleapis.com/v1";
const DEFAULT_DATABASE: &str = "(default)";
/// Bearer token the emulator accepts as an administrative caller.
const EMULATOR_TOKEN: &str = "owner";

/// Response body of a successful create.
#[derive(Debug, Deserialize)]
struct CreatedDocument {
    name: String,
}

#[derive(Debug, Deserialize)]
struct GoogleErrorEnvelope {
    error: GoogleError,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Writes documents into a Firestore database over HTTP.
pub struct FirestoreClient {
    client: Client,
    base_url: String,
    project_id: String,
    tokens: TokenProvider,
}

impl FirestoreClient {
    /// Creates an authenticated client for the key's project.
    pub fn new(key: ServiceAccountKey) -> Result<Self, CredentialError> {
        let client = Client::new();
        let project_id = key.project_id.clone();
        let tokens = TokenProvider::service_account(client.clone(), key)?;

        Ok(Self {
            client,
            base_url: FIRESTORE_BASE_URL.to_string(),
            project_id,
            tokens,
        })
    }

    /// Loads a service-account key file and creates a client from it.
    pub fn from_key_file(path: impl AsRef<Path>) -> Result<Self, CredentialError> {
        Self::new(ServiceAccountKey::from_file(path)?)
    }

    /// Creates a client for a local Firestore emulator at `host` (`host:port`).
    pub fn emulator(host: &str, project_id: impl Into<String>) -> Result<Self, CredentialError> {
        let project_id = project_id.into();
        if project_id.trim().is_empty() {
            return Err(CredentialError::MissingProject);
        }

        Ok(Self {
            client: Client::new(),
            base_url: format!("http://{}/v1", host.trim_end_matches('/')),
            project_id,
            tokens: TokenProvider::fixed(EMULATOR_TOKEN),
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/projects/{}/databases/{}/documents/{}",
            self.base_url, self.project_id, DEFAULT_DATABASE, collection
        )
    }
}

#[async_trait]
impl DocumentWriter for FirestoreClient {
    async fn insert(
        &self,
        collection: &str,
        document: &Document,
    ) -> Result<DocumentHandle, StoreError> {
        let url = self.collection_url(collection);
        let token = self.tokens.access_token().await?;
        let body = json!({ "fields": encode_fields(document) });

        debug!("Creating document in {}", url);

        let resp = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                message: rejection_message(&body),
            });
        }

        let created: CreatedDocument = resp.json().await?;
        let id = document_id(&created.name).ok_or_else(|| {
            StoreError::InvalidResponse(format!("bad document name '{}'", created.name))
        })?;

        Ok(DocumentHandle::new(id, created.name.clone()))
    }
}

/// Converts a JSON object into Firestore's typed `fields` map.
pub fn encode_fields(document: &Document) -> Map<String, Value> {
    document
        .iter()
        .map(|(key, value)| (key.clone(), encode_value(value)))
        .collect()
}

/// Converts a JSON value into a Firestore typed value.
///
/// Integers are sent as decimal strings, which is how the REST API carries
/// 64-bit values. Unsigned values above `i64::MAX` have no integer encoding
/// and become doubles; callers that need exact integers must stay in range.
pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
    }
}

/// Extracts the id (last path segment) from a document resource name.
fn document_id(name: &str) -> Option<&str> {
    name.rsplit('/').next().filter(|id| !id.is_empty())
}

/// Pulls the human-readable message out of a Google error envelope.
fn rejection_message(body: &str) -> String {
    match serde_json::from_str::<GoogleErrorEnvelope>(body) {
        Ok(GoogleErrorEnvelope {
            error: GoogleError {
                message,
                status: Some(status),
            },
        }) => format!("{status}: {message}"),
        Ok(envelope) => envelope.error.message,
        Err(_) => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_product_fields() {
        let document = json!({
            "name": "Roti Tawar Premium",
            "price": 15000,
            "stock": 50,
        });

        let fields = encode_fields(document.as_object().unwrap());

        assert_eq!(fields["name"], json!({ "stringValue": "Roti Tawar Premium" }));
        assert_eq!(fields["price"], json!({ "integerValue": "15000" }));
        assert_eq!(fields["stock"], json!({ "integerValue": "50" }));
    }

    #[test]
    fn test_encode_nested_values() {
        let value = json!({
            "tags": ["fresh", true],
            "rating": 4.5,
            "meta": { "origin": null },
        });

        let encoded = encode_value(&value);
        let fields = &encoded["mapValue"]["fields"];

        assert_eq!(
            fields["tags"],
            json!({ "arrayValue": { "values": [
                { "stringValue": "fresh" },
                { "booleanValue": true }
            ] } })
        );
        assert_eq!(fields["rating"], json!({ "doubleValue": 4.5 }));
        assert_eq!(
            fields["meta"],
            json!({ "mapValue": { "fields": { "origin": { "nullValue": null } } } })
        );
    }

    #[test]
    fn test_integer_encoding_at_i64_limit() {
        assert_eq!(
            encode_value(&Value::from(i64::MAX as u64)),
            json!({ "integerValue": "9223372036854775807" })
        );
        assert!(encode_value(&Value::from(i64::MAX as u64 + 1)).get("doubleValue").is_some());
    }

    #[test]
    fn test_document_id_from_name() {
        let name = "projects/rotiku/databases/(default)/documents/products/Xy12AbCdEf";
        assert_eq!(document_id(name), Some("Xy12AbCdEf"));
        assert_eq!(document_id("products/"), None);
    }

    #[test]
    fn test_rejection_message_from_envelope() {
        let body = r#"{"error":{"code":403,"message":"Missing or insufficient permissions.","status":"PERMISSION_DENIED"}}"#;
        assert_eq!(
            rejection_message(body),
            "PERMISSION_DENIED: Missing or insufficient permissions."
        );
    }

    #[test]
    fn test_rejection_message_falls_back_to_body() {
        assert_eq!(rejection_message("upstream timeout"), "upstream timeout");
    }

    #[test]
    fn test_emulator_collection_url() {
        let client = FirestoreClient::emulator("localhost:8080/", "demo-rotiku").unwrap();
        assert_eq!(
            client.collection_url("products"),
            "http://localhost:8080/v1/projects/demo-rotiku/databases/(default)/documents/products"
        );
        assert_eq!(client.project_id(), "demo-rotiku");
    }

    #[test]
    fn test_emulator_requires_project() {
        let result = FirestoreClient::emulator("localhost:8080", " ");
        assert!(matches!(result, Err(CredentialError::MissingProject)));
    }
}
