//! Handlers for `/api/servicios`: role-scoped views plus the lifecycle
//! operations (submission, assignment, status transitions). All state
//! changes go through the coordinator.

use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::Deserialize;

use crate::error::ApiError;
use crate::lifecycle::{self, CreateRequest, SubmitRequest};
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{Identity, ServiceRequest, ServiceUpdate};
use crate::repository::ServiceRepo;
use crate::state::AppState;

/// Request body for `PATCH /api/servicios/:id/asignar-tecnico`.
#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub tecnico_id: Option<i64>,
}

/// Request body for `PATCH /api/servicios/:id/estado`.
#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub estado: Option<String>,
}

/// GET /api/servicios - admin board of requests already in flight.
pub async fn list_active(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Vec<ServiceRequest>> {
    let requests = lifecycle::list_active(&state.store, &identity).await?;
    Ok(ApiResponse::success(requests))
}

/// GET /api/servicios/mis-servicios - the authenticated client's requests.
pub async fn list_mine(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Vec<ServiceRequest>> {
    let requests = lifecycle::list_for_client(&state.store, &identity).await?;
    Ok(ApiResponse::success(requests))
}

/// GET /api/servicios/trabajos - the authenticated technician's workload.
pub async fn list_jobs(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Vec<ServiceRequest>> {
    let requests = lifecycle::list_for_technician(&state.store, &identity).await?;
    Ok(ApiResponse::success(requests))
}

/// GET /api/servicios/solicitudes/pendientes - admin intake queue.
pub async fn list_pending(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<Vec<ServiceRequest>> {
    let requests = lifecycle::list_pending(&state.store, &identity).await?;
    Ok(ApiResponse::success(requests))
}

/// GET /api/servicios/:id - scoped to what the caller may observe.
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<ServiceRequest> {
    let request = lifecycle::get_request(&state.store, &identity, id).await?;
    Ok(ApiResponse::success(request))
}

/// POST /api/servicios/solicitar - a client submits a new request.
pub async fn submit(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(input): Json<SubmitRequest>,
) -> ApiResult<ServiceRequest> {
    let created = lifecycle::submit_request(&state.store, &identity, input).await?;
    Ok(ApiResponse::created(created))
}

/// POST /api/servicios - admin creates a request on behalf of a client.
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(input): Json<CreateRequest>,
) -> ApiResult<ServiceRequest> {
    let created = lifecycle::create_request(&state.store, &identity, input).await?;
    Ok(ApiResponse::created(created))
}

/// PUT /api/servicios/:id - descriptive fields only.
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(identity): Extension<Identity>,
    Json(changes): Json<ServiceUpdate>,
) -> ApiResult<ServiceRequest> {
    identity.require_admin()?;
    let updated = ServiceRepo::update_fields(&state.store, id, &changes).await?;
    Ok(ApiResponse::success(updated))
}

/// PATCH /api/servicios/:id/asignar-tecnico
pub async fn assign_technician(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(identity): Extension<Identity>,
    Json(input): Json<AssignRequest>,
) -> ApiResult<ServiceRequest> {
    let updated =
        lifecycle::assign_technician(&state.store, &identity, id, input.tecnico_id).await?;
    Ok(ApiResponse::success(updated))
}

/// PATCH /api/servicios/:id/estado
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(identity): Extension<Identity>,
    Json(input): Json<StatusRequest>,
) -> ApiResult<ServiceRequest> {
    let estado = input
        .estado
        .ok_or_else(|| ApiError::validation("El estado es requerido"))?;
    let updated = lifecycle::update_status(&state.store, &identity, id, &estado).await?;
    Ok(ApiResponse::success(updated))
}

/// DELETE /api/servicios/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<()> {
    identity.require_admin()?;
    ServiceRepo::delete(&state.store, id).await?;
    Ok(ApiResponse::message("Servicio eliminado correctamente"))
}
