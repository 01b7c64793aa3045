//! Firebase ID-token verification.
//!
//! ID tokens are RS256 JWTs signed with keys Google publishes as a JWK set.
//! Keys are cached for as long as the endpoint's `Cache-Control: max-age`
//! allows. A token naming a key the cache lacks triggers a refetch, but at
//! most once per [`MIN_REFETCH_INTERVAL`].

use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::{Jwk, JwkSet};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use scrollstop_core::types::UserId;
use serde::Deserialize;
use tokio::sync::RwLock;

use super::{AuthError, TokenVerifier};

/// Google's JWK set for Firebase ID-token signing keys.
pub const FIREBASE_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// Issuer prefix; the project id is appended.
pub const FIREBASE_ISSUER_PREFIX: &str = "https://securetoken.google.com/";

/// Key lifetime when the endpoint sends no usable `max-age`.
pub const DEFAULT_KEY_TTL: Duration = Duration::from_secs(3600);

/// Minimum age of the cached key set before an unknown `kid` may refetch it.
pub const MIN_REFETCH_INTERVAL: Duration = Duration::from_secs(60);

/// Timeout for the key fetch.
const KEY_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct FirebaseClaims {
    #[serde(default)]
    sub: String,
}

struct CachedKeys {
    keys: JwkSet,
    fetched_at: Instant,
    expires_at: Instant,
}

/// [`TokenVerifier`] for one Firebase project.
pub struct FirebaseTokenVerifier {
    client: reqwest::Client,
    project_id: String,
    jwks_url: String,
    cache: RwLock<Option<CachedKeys>>,
}

impl FirebaseTokenVerifier {
    pub fn new(project_id: impl Into<String>) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(KEY_FETCH_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            project_id: project_id.into(),
            jwks_url: FIREBASE_JWKS_URL.to_string(),
            cache: RwLock::new(None),
        })
    }

    /// Point key fetches at another JWK endpoint.
    pub fn with_jwks_url(mut self, url: impl Into<String>) -> Self {
        self.jwks_url = url.into();
        self
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Validation rules for this project's tokens.
    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[&self.project_id]);
        validation.set_issuer(&[format!("{FIREBASE_ISSUER_PREFIX}{}", self.project_id)]);
        validation.set_required_spec_claims(&["exp", "sub", "aud", "iss"]);
        validation
    }

    /// Signing key `kid`, from cache when fresh.
    async fn signing_key(&self, kid: &str) -> Result<Jwk, AuthError> {
        {
            let cache = self.cache.read().await;
            if let Some(cached) = cache.as_ref().filter(|c| c.expires_at > Instant::now()) {
                if let Some(jwk) = cached.keys.find(kid) {
                    return Ok(jwk.clone());
                }
                if cached.fetched_at.elapsed() < MIN_REFETCH_INTERVAL {
                    return Err(AuthError::UnknownKey(kid.to_string()));
                }
            }
        }

        let fresh = self.fetch_keys().await?;
        let jwk = fresh.keys.find(kid).cloned();
        *self.cache.write().await = Some(fresh);
        jwk.ok_or_else(|| AuthError::UnknownKey(kid.to_string()))
    }

    async fn fetch_keys(&self) -> Result<CachedKeys, AuthError> {
        let response = self.client.get(&self.jwks_url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::KeyEndpoint(status.as_u16()));
        }

        let ttl = response
            .headers()
            .get(reqwest::header::CACHE_CONTROL)
            .and_then(|v| v.to_str().ok())
            .and_then(max_age)
            .unwrap_or(DEFAULT_KEY_TTL);

        let keys: JwkSet = response.json().await?;
        tracing::debug!(count = keys.keys.len(), ttl_secs = ttl.as_secs(), "Fetched token signing keys");

        let fetched_at = Instant::now();
        Ok(CachedKeys {
            keys,
            fetched_at,
            expires_at: fetched_at + ttl,
        })
    }
}

#[async_trait]
impl TokenVerifier for FirebaseTokenVerifier {
    async fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        let header = decode_header(token)?;
        if header.alg != Algorithm::RS256 {
            return Err(AuthError::UnsupportedAlgorithm(header.alg));
        }
        let kid = header.kid.ok_or(AuthError::MissingKeyId)?;

        let jwk = self.signing_key(&kid).await?;
        let key = DecodingKey::from_jwk(&jwk)?;
        let data = decode::<FirebaseClaims>(token, &key, &self.validation())?;

        let sub = data.claims.sub.trim();
        if sub.is_empty() {
            return Err(AuthError::MissingSubject);
        }
        Ok(sub.to_string())
    }
}

/// `max-age` of a `Cache-Control` header value.
fn max_age(cache_control: &str) -> Option<Duration> {
    cache_control.split(',').find_map(|directive| {
        let (name, value) = directive.trim().split_once('=')?;
        if !name.trim().eq_ignore_ascii_case("max-age") {
            return None;
        }
        value.trim().parse().ok().map(Duration::from_secs)
    })
}
