//! Handlers for `/api/auth`: registration, login, token verification and
//! logout, all relayed to the external identity provider.

use axum::extract::State;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, BearerToken};
use crate::models::{Identity, NewClient, NewTechnician, Role, TechnicianStatus};
use crate::provider::{ProviderError, UserMetadata};
use crate::repository::{ClientRepo, TechnicianRepo};
use crate::state::AppState;

/// Request body for `POST /api/auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub nombre: Option<String>,
    pub rol: Option<String>,
    pub telefono: Option<String>,
    pub empresa: Option<String>,
    pub direccion: Option<String>,
    pub especialidad: Option<String>,
}

/// Request body for `POST /api/auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Successful authentication payload: the resolved identity plus the
/// provider-issued bearer token.
#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub user: Identity,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct VerifyPayload {
    pub user: Identity,
}

fn required(value: Option<String>, message: &str) -> Result<String, ApiError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::validation(message))
}

/// POST /api/auth/register
///
/// Creates the identity at the provider, then the linked business profile
/// in the store. If the profile insert fails the identity is deleted so a
/// half-registered account cannot log in (best-effort; see DESIGN notes).
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> ApiResult<AuthPayload> {
    let email = required(input.email, "El correo es requerido")?;
    let password = required(input.password, "La contraseña es requerida")?;
    let nombre = required(input.nombre, "El nombre es requerido")?;

    let rol = match input.rol.as_deref() {
        None => Role::Cliente,
        Some(value) => Role::parse(value)
            .ok_or_else(|| ApiError::validation(format!("Rol desconocido: {}", value)))?,
    };
    // Admin identities are provisioned at the provider, never self-served.
    if rol == Role::Admin {
        return Err(ApiError::forbidden(
            "No es posible registrar administradores",
        ));
    }

    let metadata = UserMetadata {
        nombre: Some(nombre.clone()),
        rol: Some(rol.as_str().to_string()),
    };

    let session = state
        .auth
        .sign_up(&email, &password, &metadata)
        .await
        .map_err(|err| match err {
            ProviderError::Constraint(_) => {
                ApiError::conflict("El correo ya está registrado")
            }
            other => other.into(),
        })?;

    let usuario_id = session.user.id;
    let profile_result = match rol {
        Role::Cliente => ClientRepo::create(
            &state.store,
            &NewClient {
                usuario_id: Some(usuario_id),
                nombre: nombre.clone(),
                email: email.clone(),
                empresa: input.empresa,
                telefono: input.telefono,
                direccion: input.direccion,
            },
        )
        .await
        .map(|_| ()),
        Role::Tecnico => TechnicianRepo::create(
            &state.store,
            &NewTechnician {
                usuario_id: Some(usuario_id),
                nombre: nombre.clone(),
                email: email.clone(),
                telefono: input.telefono,
                especialidad: input.especialidad,
                estado: TechnicianStatus::Disponible,
            },
        )
        .await
        .map(|_| ()),
        Role::Admin => Ok(()),
    };

    if let Err(err) = profile_result {
        tracing::warn!(%usuario_id, "profile insert failed, rolling back identity");
        if let Err(cleanup) = state.auth.delete_user(usuario_id).await {
            // Orphaned identity; nothing more we can do from here.
            tracing::error!(%usuario_id, "identity rollback failed: {}", cleanup);
        }
        return Err(err);
    }

    let user = Identity::from_provider(session.user)?;
    tracing::info!(%usuario_id, rol = %user.rol, "identity registered");

    Ok(ApiResponse::created(AuthPayload {
        user,
        token: session.access_token,
    }))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> ApiResult<AuthPayload> {
    let email = required(input.email, "El correo es requerido")?;
    let password = required(input.password, "La contraseña es requerida")?;

    let session = state
        .auth
        .sign_in(&email, &password)
        .await
        .map_err(|err| match err {
            ProviderError::Unauthorized(_) => ApiError::unauthorized("Credenciales inválidas"),
            ProviderError::Unreachable(msg) => {
                tracing::error!("Auth provider unreachable: {}", msg);
                ApiError::service_unavailable("Servicio de autenticación no disponible")
            }
            other => other.into(),
        })?;

    let user = Identity::from_provider(session.user)?;

    Ok(ApiResponse::success(AuthPayload {
        user,
        token: session.access_token,
    }))
}

/// GET /api/auth/verify
///
/// The middleware already resolved the token; echo the identity back.
pub async fn verify(Extension(identity): Extension<Identity>) -> ApiResult<VerifyPayload> {
    Ok(ApiResponse::success(VerifyPayload { user: identity }))
}

/// POST /api/auth/logout
pub async fn logout(
    State(state): State<AppState>,
    Extension(BearerToken(token)): Extension<BearerToken>,
) -> ApiResult<()> {
    state.auth.sign_out(&token).await?;
    Ok(ApiResponse::message("Sesión cerrada correctamente"))
}
