use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::models::Identity;
use crate::provider::ProviderError;
use crate::state::AppState;

/// The raw bearer token, kept alongside the resolved identity so logout
/// can relay it back to the provider.
#[derive(Clone, Debug)]
pub struct BearerToken(pub String);

/// Identity-gateway middleware: extracts the bearer token, verifies it
/// against the auth provider and injects the resolved [`Identity`] into
/// the request. Invalid credentials and an unreachable provider are kept
/// apart (401 vs 503).
pub async fn provider_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_from_headers(&headers).map_err(ApiError::unauthorized)?;

    let user = state.auth.get_user(&token).await.map_err(|err| match err {
        ProviderError::Unauthorized(_) => ApiError::unauthorized("Token inválido o expirado"),
        ProviderError::Unreachable(msg) => {
            tracing::error!("Auth provider unreachable: {}", msg);
            ApiError::service_unavailable("Servicio de autenticación no disponible")
        }
        other => other.into(),
    })?;

    let identity = Identity::from_provider(user)?;
    request.extensions_mut().insert(identity);
    request.extensions_mut().insert(BearerToken(token));

    Ok(next.run(request).await)
}

/// Extract the token from the Authorization header
fn extract_bearer_from_headers(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .ok_or_else(|| "No autorizado, falta token".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Cabecera Authorization inválida".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("No autorizado, falta token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("La cabecera Authorization debe usar el formato Bearer".to_string())
    }
}
