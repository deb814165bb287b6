use std::sync::Arc;

use crate::auth::{google::GoogleClient, AuthService};
use crate::config::AppConfig;
use crate::session::Sessions;
use crate::store::{Store, StoreError};

/// Shared application services, constructed once in `main` and injected
/// into the router. Everything here is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Store,
    pub sessions: Sessions,
    pub auth: AuthService,
    pub google: GoogleClient,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self, StoreError> {
        let store = Store::connect(&config.store).await?;
        let sessions = Sessions::new(&config.session);
        let auth = AuthService::new(store.clone());
        let google = GoogleClient::new(config.google.clone());

        Ok(Self {
            config: Arc::new(config),
            store,
            sessions,
            auth,
            google,
        })
    }
}
