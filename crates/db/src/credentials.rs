//! Google service-account credentials and OAuth2 access tokens.
//!
//! Credentials arrive base64-encoded in the environment. Access tokens are
//! obtained with the JWT-bearer grant: an RS256 assertion signed with the
//! service-account private key is exchanged at the token endpoint. Tokens
//! are fetched per operation and not cached.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

use crate::error::HistoryError;

/// OAuth scope granting Firestore access.
pub const DATASTORE_SCOPE: &str = "https://www.googleapis.com/auth/datastore";

/// Default Google OAuth2 token endpoint.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// Assertion lifetime in seconds (Google caps it at one hour).
const ASSERTION_LIFETIME_SECS: i64 = 3600;

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// The fields of a service-account key file that token exchange needs.
#[derive(Clone, Deserialize)]
pub struct ServiceAccountCredentials {
    #[serde(default)]
    pub project_id: Option<String>,
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

// The private key must never reach logs.
impl std::fmt::Debug for ServiceAccountCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountCredentials")
            .field("project_id", &self.project_id)
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: String,
}

impl ServiceAccountCredentials {
    /// Decode base64-encoded service-account JSON.
    pub fn from_base64(encoded: &str) -> Result<Self, HistoryError> {
        let encoded = encoded.trim();
        if encoded.is_empty() {
            return Err(HistoryError::Credentials("credentials are empty".into()));
        }
        let json = STANDARD
            .decode(encoded)
            .map_err(|_| HistoryError::Credentials("invalid base64".into()))?;
        serde_json::from_slice(&json)
            .map_err(|e| HistoryError::Credentials(format!("invalid credentials JSON: {e}")))
    }

    /// Build the signed RS256 assertion for `scope`.
    pub fn signed_assertion(&self, scope: &str) -> Result<String, HistoryError> {
        let now = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope,
            aud: &self.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.private_key_id.clone();

        let key = EncodingKey::from_rsa_pem(self.private_key.as_bytes())?;
        Ok(encode(&header, &claims, &key)?)
    }

    /// Exchange a fresh assertion for an access token.
    pub async fn fetch_access_token(
        &self,
        client: &reqwest::Client,
        scope: &str,
    ) -> Result<String, HistoryError> {
        let assertion = self.signed_assertion(scope)?;

        let response = client
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(HistoryError::TokenExchange(status.as_u16()));
        }

        let token: TokenResponse = response.json().await?;
        if token.access_token.is_empty() {
            return Err(HistoryError::TokenExchange(status.as_u16()));
        }
        Ok(token.access_token)
    }
}
