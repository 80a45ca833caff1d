//! Configuration for the backend-for-frontend.

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub oidc: OidcConfig,
    pub data_store: DataStoreConfig,
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub cors: CorsConfig,
}

/// Identity provider settings.
#[derive(Debug, Clone, Deserialize)]
pub struct OidcConfig {
    /// Issuer URL; discovery lives at `{issuer}/.well-known/openid-configuration`
    pub issuer: String,
    /// Expected `aud` claim. Empty disables audience validation.
    #[serde(default)]
    pub audience: String,
}

/// PostgREST-style data store reached over HTTPS.
#[derive(Debug, Clone, Deserialize)]
pub struct DataStoreConfig {
    /// Project URL; tables live under `{url}/rest/v1/`
    pub url: String,
    /// Public anon key sent as the `apikey` header
    pub anon_key: String,
}

/// External AI service.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    #[serde(default = "default_ai_base_url")]
    pub base_url: String,
    /// Per-call timeout in milliseconds
    #[serde(default = "default_ai_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            base_url: default_ai_base_url(),
            timeout_ms: default_ai_timeout_ms(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated origins, `*` for any
    #[serde(default = "default_cors_origins")]
    pub origins: String,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            origins: default_cors_origins(),
        }
    }
}

impl CorsConfig {
    /// Explicit origins, or `None` when any origin is allowed.
    pub fn origin_list(&self) -> Option<Vec<String>> {
        let origins: Vec<String> = self
            .origins
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(String::from)
            .collect();
        if origins.is_empty() || origins.iter().any(|o| o == "*") {
            None
        } else {
            Some(origins)
        }
    }
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_ai_base_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}
fn default_ai_timeout_ms() -> u64 {
    30_000
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_cors_origins() -> String {
    "*".to_string()
}

impl Config {
    /// Load configuration from file and environment variables.
    ///
    /// Configuration sources (in order of precedence):
    /// 1. Environment variables (AXENT__SECTION__KEY format)
    /// 2. config.toml file (if present)
    /// 3. Built-in defaults
    pub fn load() -> Result<Self, ConfigError> {
        let config = ConfigLoader::builder()
            .set_default("host", default_host())?
            .set_default("port", default_port() as i64)?
            .set_default("ai.base_url", default_ai_base_url())?
            .set_default("ai.timeout_ms", default_ai_timeout_ms() as i64)?
            .add_source(File::with_name("config").required(false))
            .add_source(
                Environment::with_prefix("AXENT")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ai_config() {
        let ai = AiConfig::default();
        assert_eq!(ai.base_url, "http://localhost:8000/api/v1");
        assert_eq!(ai.timeout_ms, 30_000);
    }

    #[test]
    fn test_cors_wildcard_allows_any() {
        let cors = CorsConfig::default();
        assert!(cors.origin_list().is_none());
    }

    #[test]
    fn test_cors_origin_list() {
        let cors = CorsConfig {
            origins: "http://localhost:5173, http://localhost:3000".to_string(),
        };
        assert_eq!(
            cors.origin_list(),
            Some(vec![
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string()
            ])
        );
    }

    #[test]
    fn test_deserialize_minimal_config() {
        let config: Config = ConfigLoader::builder()
            .set_override("oidc.issuer", "https://clerk.example.com")
            .unwrap()
            .set_override("data_store.url", "https://proj.supabase.co")
            .unwrap()
            .set_override("data_store.anon_key", "anon")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8080);
        assert_eq!(config.ai.timeout_ms, 30_000);
        assert_eq!(config.logging.level, "info");
        assert!(config.oidc.audience.is_empty());
    }
}
