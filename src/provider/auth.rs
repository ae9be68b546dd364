use reqwest::{RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;
use uuid::Uuid;

use super::error::ProviderError;
use super::store::ProviderConfig;

/// Application metadata attached to an identity at sign-up. The provider
/// stores it opaquely; role and display name are immutable after creation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rol: Option<String>,
}

/// The subset of the provider's user object this service reads.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderUser {
    pub id: Uuid,
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

/// A session as issued by the provider. The token is opaque here; only the
/// provider can mint or verify it.
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSession {
    pub access_token: String,
    pub user: ProviderUser,
}

/// Handle to the provider's auth plane: sign-up, password login, token
/// verification, session invalidation and administrative user removal.
#[derive(Debug, Clone)]
pub struct AuthClient {
    http: reqwest::Client,
    auth_base: Url,
    service_key: String,
}

impl AuthClient {
    pub fn new(http: reqwest::Client, config: &ProviderConfig) -> Result<Self, ProviderError> {
        let auth_base = config
            .url
            .join("auth/v1/")
            .map_err(|e| ProviderError::InvalidUrl(e.to_string()))?;

        Ok(Self {
            http,
            auth_base,
            service_key: config.service_key.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ProviderError> {
        self.auth_base
            .join(path)
            .map_err(|e| ProviderError::InvalidUrl(e.to_string()))
    }

    fn with_key(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("apikey", &self.service_key)
    }

    /// Create an identity. Assumes the provider auto-confirms emails (the
    /// project's setting), so a usable session comes back directly.
    /// A duplicate email surfaces as [`ProviderError::Constraint`].
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: &UserMetadata,
    ) -> Result<ProviderSession, ProviderError> {
        tracing::debug!(email, "auth sign_up");

        let response = self
            .with_key(self.http.post(self.endpoint("signup")?))
            .json(&json!({
                "email": email,
                "password": password,
                "data": metadata,
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = Self::error_message(response).await;
            return Err(match status.as_u16() {
                400 | 422 => ProviderError::Constraint(message),
                status => ProviderError::Api { status, message },
            });
        }

        response
            .json::<ProviderSession>()
            .await
            .map_err(ProviderError::from)
    }

    /// Password grant. Bad credentials surface as
    /// [`ProviderError::Unauthorized`].
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<ProviderSession, ProviderError> {
        tracing::debug!(email, "auth sign_in");

        let response = self
            .with_key(self.http.post(self.endpoint("token")?))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = Self::error_message(response).await;
            // The provider reports a failed grant as 400
            return Err(match status.as_u16() {
                400 | 401 | 403 => ProviderError::Unauthorized(message),
                status => ProviderError::Api { status, message },
            });
        }

        response
            .json::<ProviderSession>()
            .await
            .map_err(ProviderError::from)
    }

    /// Resolve a bearer token to its identity.
    pub async fn get_user(&self, token: &str) -> Result<ProviderUser, ProviderError> {
        let response = self
            .with_key(self.http.get(self.endpoint("user")?))
            .bearer_auth(token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = Self::error_message(response).await;
            return Err(match status.as_u16() {
                400 | 401 | 403 => ProviderError::Unauthorized(message),
                status => ProviderError::Api { status, message },
            });
        }

        response
            .json::<ProviderUser>()
            .await
            .map_err(ProviderError::from)
    }

    /// Invalidate the session behind a bearer token. Best-effort: an
    /// already-dead token is not an error worth surfacing.
    pub async fn sign_out(&self, token: &str) -> Result<(), ProviderError> {
        let response = self
            .with_key(self.http.post(self.endpoint("logout")?))
            .bearer_auth(token)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() || matches!(status.as_u16(), 401 | 403) {
            return Ok(());
        }
        Err(ProviderError::Api {
            status: status.as_u16(),
            message: Self::error_message(response).await,
        })
    }

    /// Administrative removal of an identity (service key). Used by the
    /// registration compensation path.
    pub async fn delete_user(&self, id: Uuid) -> Result<(), ProviderError> {
        tracing::debug!(%id, "auth delete_user");

        let response = self
            .with_key(self.http.delete(self.endpoint(&format!("admin/users/{}", id))?))
            .bearer_auth(&self.service_key)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            Err(ProviderError::Api {
                status: status.as_u16(),
                message: Self::error_message(response).await,
            })
        }
    }

    /// Pings the auth plane.
    pub async fn health(&self) -> Result<(), ProviderError> {
        let response = self
            .with_key(self.http.get(self.endpoint("health")?))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(ProviderError::Api {
                status: response.status().as_u16(),
                message: Self::error_message(response).await,
            })
        }
    }

    /// The auth plane is inconsistent about its error key.
    async fn error_message(response: Response) -> String {
        let body = response.text().await.unwrap_or_default();
        serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| {
                ["msg", "message", "error_description", "error"]
                    .iter()
                    .find_map(|key| v.get(key).and_then(|m| m.as_str()).map(String::from))
            })
            .unwrap_or(body)
    }
}
