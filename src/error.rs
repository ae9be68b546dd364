// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::provider::ProviderError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    Validation(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden (authenticated, wrong role)
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    /// 404, but the *identity* is fine - it just has no linked business
    /// profile (clientes/tecnicos row). Distinct code so the frontend can
    /// route the user to support instead of a generic not-found page.
    ProfileNotFound(String),

    // 409 Conflict (stale lifecycle write, duplicate registration)
    Conflict(String),

    // 500 Internal Server Error
    Internal(String),

    // 503 Service Unavailable (provider unreachable)
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::ProfileNotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::Internal(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::Validation(msg)
            | ApiError::Unauthorized(msg)
            | ApiError::Forbidden(msg)
            | ApiError::NotFound(msg)
            | ApiError::ProfileNotFound(msg)
            | ApiError::Conflict(msg)
            | ApiError::Internal(msg)
            | ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::ProfileNotFound(_) => "PROFILE_NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Internal(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        json!({
            "success": false,
            "message": self.message(),
            "code": self.error_code(),
        })
    }
}

// Static constructor methods
impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn profile_not_found(message: impl Into<String>) -> Self {
        ApiError::ProfileNotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Unreachable(msg) => {
                tracing::error!("Provider unreachable: {}", msg);
                ApiError::service_unavailable("Servicio de datos no disponible")
            }
            ProviderError::Unauthorized(msg) => {
                // The *service* key was rejected, not the end user's token.
                tracing::error!("Provider rejected service credentials: {}", msg);
                ApiError::internal("Error de configuración del servicio")
            }
            ProviderError::NotFound => ApiError::not_found("Registro no encontrado"),
            ProviderError::Constraint(msg) => {
                // Unique/FK violations come from bad input (duplicate email,
                // dangling reference), so they map to 400 as the store's
                // own validation verdict.
                ApiError::validation(msg)
            }
            ProviderError::MissingConfig(var) => {
                ApiError::internal(format!("Falta configuración: {}", var))
            }
            ProviderError::InvalidUrl(url) => {
                ApiError::internal(format!("URL de proveedor inválida: {}", url))
            }
            ProviderError::Api { status, message } => {
                tracing::error!("Provider API error ({}): {}", status, message);
                ApiError::internal("Error al procesar la solicitud")
            }
            ProviderError::Decode(msg) => {
                tracing::error!("Provider response decode error: {}", msg);
                ApiError::internal("Respuesta inválida del servicio de datos")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
