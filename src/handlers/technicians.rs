//! CRUD handlers for `/api/tecnicos`.

use axum::extract::{Path, State};
use axum::{Extension, Json};

use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{Identity, NewTechnician, Technician, TechnicianUpdate};
use crate::repository::TechnicianRepo;
use crate::state::AppState;

/// GET /api/tecnicos
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Technician>> {
    let technicians = TechnicianRepo::list(&state.store).await?;
    Ok(ApiResponse::success(technicians))
}

/// GET /api/tecnicos/disponibles/lista
pub async fn list_available(State(state): State<AppState>) -> ApiResult<Vec<Technician>> {
    let technicians = TechnicianRepo::list_available(&state.store).await?;
    Ok(ApiResponse::success(technicians))
}

/// GET /api/tecnicos/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Technician> {
    let technician = TechnicianRepo::get_by_id(&state.store, id).await?;
    Ok(ApiResponse::success(technician))
}

/// POST /api/tecnicos
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(input): Json<NewTechnician>,
) -> ApiResult<Technician> {
    identity.require_admin()?;
    let technician = TechnicianRepo::create(&state.store, &input).await?;
    Ok(ApiResponse::created(technician))
}

/// PUT /api/tecnicos/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(identity): Extension<Identity>,
    Json(changes): Json<TechnicianUpdate>,
) -> ApiResult<Technician> {
    identity.require_admin()?;
    let technician = TechnicianRepo::update(&state.store, id, &changes).await?;
    Ok(ApiResponse::success(technician))
}

/// DELETE /api/tecnicos/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<()> {
    identity.require_admin()?;
    TechnicianRepo::delete(&state.store, id).await?;
    Ok(ApiResponse::message("Técnico eliminado correctamente"))
}
