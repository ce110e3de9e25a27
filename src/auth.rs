use anyhow::{anyhow, bail, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::Utc;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::{debug, warn};

/// Claims the client actually inspects. The token is minted and signed by
/// the backend; the client only reads the expiry to decide when to refresh,
/// it never verifies the signature.
#[derive(Debug, Deserialize)]
pub struct TokenClaims {
    pub exp: i64,
}

/// Caches the short-lived access token and refreshes it transparently from
/// the backend token endpoint once the expiry claim has passed.
///
/// The cache lives in memory only; nothing is persisted across runs.
pub struct TokenManager {
    endpoint: String,
    client: reqwest::Client,
    cached: Mutex<Option<String>>,
}

impl TokenManager {
    pub fn new(endpoint: String) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
            cached: Mutex::new(None),
        }
    }

    /// Seed the cache with a known token, used when a token was obtained
    /// out of band.
    pub fn with_token(endpoint: String, token: String) -> Self {
        Self {
            endpoint,
            client: reqwest::Client::new(),
            cached: Mutex::new(Some(token)),
        }
    }

    pub fn decode_claims(token: &str) -> Result<TokenClaims> {
        let payload = token
            .split('.')
            .nth(1)
            .ok_or_else(|| anyhow!("malformed access token"))?;
        let decoded = URL_SAFE_NO_PAD.decode(payload)?;
        Ok(serde_json::from_slice(&decoded)?)
    }

    pub fn is_token_valid(token: &str) -> bool {
        match Self::decode_claims(token) {
            Ok(claims) => Utc::now().timestamp() < claims.exp,
            Err(_) => false,
        }
    }

    /// Return the cached token while it is still valid, otherwise fetch a
    /// fresh one and cache it.
    pub async fn get_valid_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref() {
            if Self::is_token_valid(token) {
                return Ok(token.clone());
            }
        }
        debug!("access token missing or expired, fetching a new one");
        let token = self.fetch_new_token().await?;
        if !Self::is_token_valid(&token) {
            warn!("token endpoint returned a token that is already expired");
        }
        *cached = Some(token.clone());
        Ok(token)
    }

    async fn fetch_new_token(&self) -> Result<String> {
        let response = self.client.get(&self.endpoint).send().await?;
        if !response.status().is_success() {
            bail!(
                "token endpoint returned {} for {}",
                response.status(),
                self.endpoint
            );
        }
        Ok(response.text().await?.trim().to_string())
    }
}

/// Unsigned token with the given expiry, for tests that need a plausible
/// JWT without a backend.
#[cfg(test)]
pub(crate) fn make_token(exp: i64) -> String {
    use serde_json::json;
    let header = URL_SAFE_NO_PAD.encode(json!({"alg": "HS256", "typ": "JWT"}).to_string());
    let payload = URL_SAFE_NO_PAD.encode(json!({ "exp": exp }).to_string());
    format!("{}.{}.unsigned", header, payload)
}
