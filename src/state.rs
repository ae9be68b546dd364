use crate::provider::{AuthClient, ProviderConfig, ProviderError, StoreClient};

/// Shared application state: read-only handles to the provider's two
/// planes, built once at startup over a single HTTP transport and
/// injected into every repository call. Nothing in here mutates at
/// runtime.
#[derive(Clone)]
pub struct AppState {
    pub store: StoreClient,
    pub auth: AuthClient,
}

impl AppState {
    pub fn from_provider(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let http = config.build_http()?;

        Ok(Self {
            store: StoreClient::new(http.clone(), config)?,
            auth: AuthClient::new(http, config)?,
        })
    }
}
