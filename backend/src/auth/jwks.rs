use std::collections::HashMap;
use std::sync::Arc;

use axum::http::{header, HeaderMap};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

/// Cookie the identity provider's browser SDK stores the session token in.
pub const SESSION_COOKIE: &str = "__session";

/// Display name used when the token carries none.
pub const DEFAULT_DISPLAY_NAME: &str = "User";

/// Signed-in identity extracted from a verified session token.
#[derive(Clone)]
pub struct Identity {
    /// Subject id; also the profile id
    pub sub: String,
    pub email: Option<String>,
    /// Full name, else given + family name, else [`DEFAULT_DISPLAY_NAME`]
    pub name: String,
    pub avatar: Option<String>,
    /// Raw session token, forwarded as bearer to the data store
    pub token: String,
}

impl std::fmt::Debug for Identity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Identity")
            .field("sub", &self.sub)
            .field("email", &self.email)
            .field("name", &self.name)
            .field("avatar", &self.avatar)
            .field("token", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Missing session token")]
    MissingToken,
    #[error("Invalid Authorization header format")]
    InvalidFormat,
    #[error("Invalid token: {0}")]
    InvalidToken(String),
    #[error("JWKS fetch error: {0}")]
    JwksFetchError(String),
    #[error("Key not found for kid: {0}")]
    KeyNotFound(String),
}

/// JWKS key set response.
#[derive(Debug, Deserialize)]
struct JwksResponse {
    keys: Vec<Jwk>,
}

#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    n: Option<String>,
    e: Option<String>,
}

/// Session token claims.
#[derive(Debug, Deserialize, Serialize)]
struct Claims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    given_name: Option<String>,
    #[serde(default)]
    family_name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
    exp: u64,
}

impl Claims {
    fn display_name(&self) -> String {
        display_name(
            self.name.as_deref(),
            self.given_name.as_deref(),
            self.family_name.as_deref(),
        )
    }
}

/// Full name if present, else `given family` trimmed, else "User".
pub fn display_name(full: Option<&str>, given: Option<&str>, family: Option<&str>) -> String {
    if let Some(full) = full.map(str::trim).filter(|n| !n.is_empty()) {
        return full.to_string();
    }
    let joined = format!("{} {}", given.unwrap_or_default(), family.unwrap_or_default());
    let joined = joined.trim();
    if joined.is_empty() {
        DEFAULT_DISPLAY_NAME.to_string()
    } else {
        joined.to_string()
    }
}

/// Extract the session token from `Authorization: Bearer` or the session cookie.
pub fn session_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    if let Some(value) = headers.get(header::AUTHORIZATION) {
        let value = value.to_str().map_err(|_| AuthError::InvalidFormat)?;
        return value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::InvalidFormat);
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value)
        .ok_or(AuthError::MissingToken)
}

/// Client for fetching and caching JWKS keys.
pub struct JwksClient {
    http_client: Client,
    jwks_uri: String,
    keys: Arc<RwLock<HashMap<String, DecodingKey>>>,
    issuer: String,
    audience: Option<String>,
}

impl JwksClient {
    pub async fn new(issuer: &str, audience: &str) -> Result<Self, AuthError> {
        let http_client = Client::new();
        let issuer = issuer.trim_end_matches('/').to_string();

        // Fetch OIDC configuration to get JWKS URI
        let config_url = format!("{}/.well-known/openid-configuration", issuer);
        let config: OidcConfig = http_client
            .get(&config_url)
            .send()
            .await
            .map_err(|e| AuthError::JwksFetchError(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::JwksFetchError(e.to_string()))?;

        let client = Self {
            http_client,
            jwks_uri: config.jwks_uri,
            keys: Arc::new(RwLock::new(HashMap::new())),
            issuer,
            audience: Some(audience.to_string()).filter(|a| !a.is_empty()),
        };

        client.refresh_keys().await?;

        Ok(client)
    }

    async fn refresh_keys(&self) -> Result<(), AuthError> {
        tracing::info!("Fetching JWKS from {}", self.jwks_uri);

        let response: JwksResponse = self
            .http_client
            .get(&self.jwks_uri)
            .send()
            .await
            .map_err(|e| AuthError::JwksFetchError(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::JwksFetchError(e.to_string()))?;

        let mut keys = self.keys.write().await;
        keys.clear();

        for jwk in response.keys {
            if jwk.kty != "RSA" {
                continue;
            }
            if let (Some(n), Some(e)) = (&jwk.n, &jwk.e) {
                match DecodingKey::from_rsa_components(n, e) {
                    Ok(key) => {
                        keys.insert(jwk.kid.clone(), key);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse RSA key {}: {}", jwk.kid, e);
                    }
                }
            }
        }

        tracing::info!("Loaded {} JWKS keys", keys.len());
        Ok(())
    }

    /// Authenticate a request by validating its session token.
    pub async fn authenticate(&self, headers: &HeaderMap) -> Result<Identity, AuthError> {
        let token = session_token(headers)?;
        self.verify(token).await
    }

    /// Verify a raw session token.
    pub async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let header = decode_header(token).map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        let kid = header
            .kid
            .ok_or_else(|| AuthError::InvalidToken("Missing kid in token header".to_string()))?;

        // Keys rotate; refetch once before giving up on an unknown kid
        if !self.keys.read().await.contains_key(&kid) {
            tracing::debug!("Unknown kid {}, refreshing JWKS", kid);
            self.refresh_keys().await?;
        }

        let keys = self.keys.read().await;
        let key = keys.get(&kid).ok_or_else(|| AuthError::KeyNotFound(kid.clone()))?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[&self.issuer]);
        match &self.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        let token_data = decode::<Claims>(token, key, &validation)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        let claims = token_data.claims;

        Ok(Identity {
            name: claims.display_name(),
            sub: claims.sub,
            email: claims.email.filter(|e| !e.is_empty()),
            avatar: claims.picture.filter(|p| !p.is_empty()),
            token: token.to_string(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct OidcConfig {
    jwks_uri: String,
}
