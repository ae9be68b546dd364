//! CRUD handlers for `/api/clientes`.

use axum::extract::{Path, State};
use axum::{Extension, Json};

use crate::middleware::{ApiResponse, ApiResult};
use crate::models::{Client, ClientUpdate, Identity, NewClient};
use crate::repository::ClientRepo;
use crate::state::AppState;

/// GET /api/clientes
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Client>> {
    let clients = ClientRepo::list(&state.store).await?;
    Ok(ApiResponse::success(clients))
}

/// GET /api/clientes/:id
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Client> {
    let client = ClientRepo::get_by_id(&state.store, id).await?;
    Ok(ApiResponse::success(client))
}

/// POST /api/clientes
pub async fn create(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    Json(input): Json<NewClient>,
) -> ApiResult<Client> {
    identity.require_admin()?;
    let client = ClientRepo::create(&state.store, &input).await?;
    Ok(ApiResponse::created(client))
}

/// PUT /api/clientes/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(identity): Extension<Identity>,
    Json(changes): Json<ClientUpdate>,
) -> ApiResult<Client> {
    identity.require_admin()?;
    let client = ClientRepo::update(&state.store, id, &changes).await?;
    Ok(ApiResponse::success(client))
}

/// DELETE /api/clientes/:id
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<()> {
    identity.require_admin()?;
    ClientRepo::delete(&state.store, id).await?;
    Ok(ApiResponse::message("Cliente eliminado correctamente"))
}
