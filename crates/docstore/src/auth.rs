//! OAuth access tokens for the document store.
//!
//! A service account authenticates by signing a short-lived RS256 assertion
//! and exchanging it at the key's token endpoint for a bearer token. Tokens
//! are cached and refreshed shortly before they expire.

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;
use tracing::debug;

use crate::credentials::ServiceAccountKey;
use crate::errors::{CredentialError, StoreError};

/// Scope granting read/write access to Firestore.
pub const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    /// Builds the assertion claims for a key at the given instant.
    pub fn for_key(key: &ServiceAccountKey, now: OffsetDateTime) -> Self {
        let iat = now.unix_timestamp();
        Self {
            iss: key.client_email.clone(),
            scope: DATASTORE_SCOPE.to_string(),
            aud: key.token_uri.clone(),
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Deserialize)]
struct OAuthErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
}

struct CachedToken {
    value: String,
    expires_at: OffsetDateTime,
}

impl CachedToken {
    fn is_fresh(&self, now: OffsetDateTime) -> bool {
        now + Duration::seconds(REFRESH_MARGIN_SECS) < self.expires_at
    }
}

enum TokenSource {
    ServiceAccount {
        key: ServiceAccountKey,
        encoding_key: EncodingKey,
    },
    Fixed(String),
}

/// Supplies bearer tokens for store requests.
pub struct TokenProvider {
    client: Client,
    source: TokenSource,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    /// Creates a provider backed by a service account.
    ///
    /// The private key is parsed here so an unusable credential is rejected
    /// before any request is made.
    pub fn service_account(
        client: Client,
        key: ServiceAccountKey,
    ) -> Result<Self, CredentialError> {
        let encoding_key = key.encoding_key()?;
        Ok(Self {
            client,
            source: TokenSource::ServiceAccount { key, encoding_key },
            cached: Mutex::new(None),
        })
    }

    /// Creates a provider that always hands out the same token.
    pub fn fixed(token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            source: TokenSource::Fixed(token.into()),
            cached: Mutex::new(None),
        }
    }

    /// Returns a valid access token, exchanging a new assertion if needed.
    pub async fn access_token(&self) -> Result<String, StoreError> {
        let (key, encoding_key) = match &self.source {
            TokenSource::Fixed(token) => return Ok(token.clone()),
            TokenSource::ServiceAccount { key, encoding_key } => (key, encoding_key),
        };

        let mut cached = self.cached.lock().await;
        let now = OffsetDateTime::now_utc();
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.value.clone());
        }

        let assertion = sign_assertion(key, encoding_key, now)?;
        let response = self.exchange(&key.token_uri, &assertion).await?;

        debug!(
            "Obtained access token for {} (expires in {}s)",
            key.client_email, response.expires_in
        );

        let token = CachedToken {
            value: response.access_token,
            expires_at: now + Duration::seconds(response.expires_in),
        };
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    async fn exchange(
        &self,
        token_uri: &str,
        assertion: &str,
    ) -> Result<TokenResponse, StoreError> {
        let form = [("grant_type", JWT_BEARER_GRANT), ("assertion", assertion)];
        let resp = self.client.post(token_uri).form(&form).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(StoreError::Auth(format_token_error(status.as_u16(), &body)));
        }

        Ok(resp.json::<TokenResponse>().await?)
    }
}

/// Signs the RS256 assertion exchanged for an access token.
pub fn sign_assertion(
    key: &ServiceAccountKey,
    encoding_key: &EncodingKey,
    now: OffsetDateTime,
) -> Result<String, StoreError> {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(key.private_key_id.clone());

    let claims = Claims::for_key(key, now);
    Ok(encode(&header, &claims, encoding_key)?)
}

/// Renders the OAuth error envelope, falling back to the raw body.
fn format_token_error(status_code: u16, body: &str) -> String {
    let parsed: Option<OAuthErrorResponse> = serde_json::from_str(body).ok();
    match parsed {
        Some(OAuthErrorResponse {
            error: Some(error),
            error_description,
        }) => match error_description {
            Some(desc) => format!("token endpoint error {status_code}: {error} ({desc})"),
            None => format!("token endpoint error {status_code}: {error}"),
        },
        _ => format!("token endpoint error {status_code}: {body}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> ServiceAccountKey {
        let json = serde_json::json!({
            "type": "service_account",
            "project_id": "rotiku-test",
            "private_key_id": "kid-1",
            "private_key": "unused",
            "client_email": "seeder@rotiku-test.iam.gserviceaccount.com",
            "token_uri": "https://oauth2.example.test/token"
        });
        ServiceAccountKey::from_json(&json.to_string()).unwrap()
    }

    #[test]
    fn test_claims_for_key() {
        let now = OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap();
        let claims = Claims::for_key(&test_key(), now);

        assert_eq!(claims.iss, "seeder@rotiku-test.iam.gserviceaccount.com");
        assert_eq!(claims.aud, "https://oauth2.example.test/token");
        assert_eq!(claims.scope, DATASTORE_SCOPE);
        assert_eq!(claims.iat, 1_700_000_000);
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_cached_token_freshness() {
        let now = OffsetDateTime::now_utc();
        let fresh = CachedToken {
            value: "a".into(),
            expires_at: now + Duration::minutes(30),
        };
        let stale = CachedToken {
            value: "b".into(),
            expires_at: now + Duration::seconds(30),
        };

        assert!(fresh.is_fresh(now));
        assert!(!stale.is_fresh(now));
    }

    #[test]
    fn test_format_token_error_with_envelope() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid JWT Signature."}"#;
        let msg = format_token_error(400, body);
        assert_eq!(
            msg,
            "token endpoint error 400: invalid_grant (Invalid JWT Signature.)"
        );
    }

    #[test]
    fn test_format_token_error_raw_body() {
        let msg = format_token_error(502, "Bad Gateway");
        assert_eq!(msg, "token endpoint error 502: Bad Gateway");
    }

    #[test]
    fn test_service_account_rejects_unusable_key() {
        let result = TokenProvider::service_account(Client::new(), test_key());
        assert!(matches!(result, Err(CredentialError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_fixed_token() {
        let provider = TokenProvider::fixed("owner");
        assert_eq!(provider.access_token().await.unwrap(), "owner");
    }
}
