pub mod access;
pub mod ai;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod marketplace;
pub mod routes;
pub mod store;
#[cfg(any(test, feature = "test-util"))]
pub mod test_util;

pub use access::PermissionTable;
pub use ai::AiClient;
pub use auth::{JwksClient, Session, SessionBridge};
pub use config::Config;
pub use error::AppError;
pub use store::{CatalogStore, ProfileStore, RestStore};

use std::sync::Arc;
use std::time::Duration;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub jwks_client: JwksClient,
    /// Builds a request's session from its verified identity
    pub sessions: SessionBridge,
    /// Equipment, projects, bids and deliveries
    pub catalog: Arc<dyn CatalogStore>,
    pub ai_client: AiClient,
    /// Route permission table, built once at startup
    pub permissions: PermissionTable,
}

impl AppState {
    /// Wire up the REST data store, JWKS client and AI client from config.
    pub async fn from_config(config: Config) -> Result<Self, Box<dyn std::error::Error>> {
        let jwks_client = JwksClient::new(&config.oidc.issuer, &config.oidc.audience).await?;
        let store = Arc::new(RestStore::new(&config.data_store.url, &config.data_store.anon_key));
        let ai_client = AiClient::new(&config.ai.base_url, Duration::from_millis(config.ai.timeout_ms))?;

        Ok(Self::new(config, jwks_client, store.clone(), store, ai_client))
    }

    pub fn new(
        config: Config,
        jwks_client: JwksClient,
        profiles: Arc<dyn ProfileStore>,
        catalog: Arc<dyn CatalogStore>,
        ai_client: AiClient,
    ) -> Self {
        Self {
            config,
            jwks_client,
            sessions: SessionBridge::new(profiles),
            catalog,
            ai_client,
            permissions: PermissionTable::standard(),
        }
    }
}
