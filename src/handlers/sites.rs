//! CRUD handlers for `/api/sedes`, plus the per-client views.

use axum::extract::{Path, State};
use axum::{Extension, Json};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{Identity, NewSite, Site, SiteUpdate};
use crate::repository::{ClientRepo, SiteRepo};
use crate::state::AppState;

/// GET /api/sedes
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Site>> {
    let sites = SiteRepo::list(&state.store).await?;
    Ok(ApiResponse::success(sites))
}

/// GET /api/sedes/mias
///
/// The authenticated client's own sites, resolved through their profile.
pub async fn list_mine(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Vec<Site>> {
    let cliente = ClientRepo::find_by_usuario(&state.store, identity.id)
        .await?
        .ok_or_else(|| ApiError::profile_not_found("Perfil de cliente no encontrado"))?;

    let sites = SiteRepo::list_by_client(&state.store, cliente.id).await?;
    Ok(ApiResponse::success(sites))
}

/// GET /api/sedes/cliente/:cliente_id
pub async fn list_by_client(
    State(state): State<AppState>,
    Path(cliente_id): Path<i64>,
) -> ApiResult<Vec<Site>> {
    let sites = SiteRepo::list_by_client(&state.store, cliente_id).await?;
    Ok(ApiResponse::success(sites))
}

/// GET /api/sedes/:id
pub async fn get_by_id(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Site> {
    let site = SiteRepo::get_by_id(&state.store, id).await?;
    Ok(ApiResponse::success(site))
}

/// POST /api/sedes
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(input): Json<NewSite>,
) -> ApiResult<Site> {
    identity.require_admin()?;
    let site = SiteRepo::create(&state.store, &input).await?;
    Ok(ApiResponse::created(site))
}

/// PUT /api/sedes/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(identity): Extension<Identity>,
    Json(changes): Json<SiteUpdate>,
) -> ApiResult<Site> {
    identity.require_admin()?;
    let site = SiteRepo::update(&state.store, id, &changes).await?;
    Ok(ApiResponse::success(site))
}

/// DELETE /api/sedes/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<()> {
    identity.require_admin()?;
    SiteRepo::delete(&state.store, id).await?;
    Ok(ApiResponse::message("Sede eliminada correctamente"))
}
