use reqwest::{RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

use super::error::ProviderError;
use super::query::SelectQuery;

/// Connection settings for the external provider, read once at startup.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub url: Url,
    pub service_key: String,
    pub timeout_secs: u64,
}

impl ProviderConfig {
    pub fn from_env() -> Result<Self, ProviderError> {
        let raw_url = std::env::var("SUPABASE_URL")
            .map_err(|_| ProviderError::MissingConfig("SUPABASE_URL"))?;
        let url = Url::parse(&raw_url).map_err(|_| ProviderError::InvalidUrl(raw_url))?;

        let service_key = std::env::var("SUPABASE_SERVICE_KEY")
            .map_err(|_| ProviderError::MissingConfig("SUPABASE_SERVICE_KEY"))?;

        let timeout_secs = std::env::var("PROVIDER_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10);

        Ok(Self {
            url,
            service_key,
            timeout_secs,
        })
    }

    /// Shared HTTP transport for both provider planes.
    pub fn build_http(&self) -> Result<reqwest::Client, ProviderError> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .connect_timeout(Duration::from_secs(self.timeout_secs))
            .build()
            .map_err(ProviderError::from)
    }
}

/// Handle to the provider's data plane. Table-scoped CRUD, each call one
/// HTTP round trip. Built once at startup and injected read-only; it holds
/// no mutable state of its own.
#[derive(Debug, Clone)]
pub struct StoreClient {
    http: reqwest::Client,
    rest_base: Url,
    service_key: String,
}

impl StoreClient {
    pub fn new(http: reqwest::Client, config: &ProviderConfig) -> Result<Self, ProviderError> {
        let rest_base = config
            .url
            .join("rest/v1/")
            .map_err(|e| ProviderError::InvalidUrl(e.to_string()))?;

        Ok(Self {
            http,
            rest_base,
            service_key: config.service_key.clone(),
        })
    }

    fn table_url(&self, table: &str) -> Result<Url, ProviderError> {
        self.rest_base
            .join(table)
            .map_err(|e| ProviderError::InvalidUrl(e.to_string()))
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
    }

    /// Filtered select returning all matching rows.
    pub async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: SelectQuery,
    ) -> Result<Vec<T>, ProviderError> {
        let params = query.to_params();
        tracing::debug!(table, ?params, "store select");

        let response = self
            .authed(self.http.get(self.table_url(table)?).query(&params))
            .send()
            .await?;
        Self::decode_rows(response).await
    }

    /// Filtered select returning at most one row.
    pub async fn select_one<T: DeserializeOwned>(
        &self,
        table: &str,
        query: SelectQuery,
    ) -> Result<Option<T>, ProviderError> {
        let rows = self.select(table, query.limit(1)).await?;
        Ok(rows.into_iter().next())
    }

    /// Insert a single row, returning the stored representation.
    pub async fn insert<T: DeserializeOwned, B: Serialize>(
        &self,
        table: &str,
        row: &B,
    ) -> Result<T, ProviderError> {
        tracing::debug!(table, "store insert");

        let response = self
            .authed(self.http.post(self.table_url(table)?))
            .header("Prefer", "return=representation")
            .json(row)
            .send()
            .await?;

        let rows: Vec<T> = Self::decode_rows(response).await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| ProviderError::Decode("empty insert representation".to_string()))
    }

    /// Filtered partial update. Returns the updated rows; an empty result
    /// means no row matched the predicates (missing, or a conditional
    /// write whose precondition no longer holds).
    pub async fn update<T: DeserializeOwned, B: Serialize>(
        &self,
        table: &str,
        query: SelectQuery,
        changes: &B,
    ) -> Result<Vec<T>, ProviderError> {
        let params = query.to_params();
        tracing::debug!(table, ?params, "store update");

        let response = self
            .authed(self.http.patch(self.table_url(table)?).query(&params))
            .header("Prefer", "return=representation")
            .json(changes)
            .send()
            .await?;
        Self::decode_rows(response).await
    }

    /// Filtered hard delete. Returns the deleted rows so callers can map
    /// "nothing matched" to a not-found.
    pub async fn delete<T: DeserializeOwned>(
        &self,
        table: &str,
        query: SelectQuery,
    ) -> Result<Vec<T>, ProviderError> {
        let params = query.to_params();
        tracing::debug!(table, ?params, "store delete");

        let response = self
            .authed(self.http.delete(self.table_url(table)?).query(&params))
            .header("Prefer", "return=representation")
            .send()
            .await?;
        Self::decode_rows(response).await
    }

    /// Pings the data plane to ensure connectivity.
    pub async fn health(&self) -> Result<(), ProviderError> {
        let response = self
            .authed(self.http.get(self.rest_base.clone()))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from_response(response).await)
        }
    }

    async fn decode_rows<T: DeserializeOwned>(response: Response) -> Result<Vec<T>, ProviderError> {
        if !response.status().is_success() {
            return Err(Self::error_from_response(response).await);
        }
        response.json::<Vec<T>>().await.map_err(ProviderError::from)
    }

    /// Map a non-success data-plane response onto the error taxonomy.
    /// Constraint violations (unique, FK) surface as 409 with a `message`
    /// body; everything else keeps its status and detail for the log.
    async fn error_from_response(response: Response) -> ProviderError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
            .unwrap_or(body);

        match status.as_u16() {
            401 | 403 => ProviderError::Unauthorized(message),
            404 => ProviderError::NotFound,
            409 => ProviderError::Constraint(message),
            status => ProviderError::Api { status, message },
        }
    }
}
