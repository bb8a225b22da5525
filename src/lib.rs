pub mod config;
pub mod errors;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod store;

use tokio_util::sync::CancellationToken;

use store::{AuthClient, StoreClient};

/// Shared application state passed to all Axum handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: StoreClient,
    pub auth: AuthClient,
    pub config: config::AppConfig,
    /// Cancelled on shutdown; every request scope is a child of it.
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(config: config::AppConfig) -> Self {
        let store = StoreClient::new(&config.store_url, &config.store_api_key);
        let auth = AuthClient::new(&store);
        Self {
            store,
            auth,
            config,
            shutdown: CancellationToken::new(),
        }
    }
}
