use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{NewTechnician, Technician, TechnicianStatus, TechnicianUpdate};
use crate::provider::{SelectQuery, SortDirection, StoreClient};

const TABLE: &str = "tecnicos";

pub struct TechnicianRepo;

impl TechnicianRepo {
    /// All technicians, newest first.
    pub async fn list(store: &StoreClient) -> Result<Vec<Technician>, ApiError> {
        let rows = store
            .select(
                TABLE,
                SelectQuery::new().order("created_at", SortDirection::Desc),
            )
            .await?;
        Ok(rows)
    }

    /// Technicians free to take work, best rated first.
    pub async fn list_available(store: &StoreClient) -> Result<Vec<Technician>, ApiError> {
        let rows = store
            .select(
                TABLE,
                SelectQuery::new()
                    .eq("estado", TechnicianStatus::Disponible.as_str())
                    .order("calificacion", SortDirection::Desc),
            )
            .await?;
        Ok(rows)
    }

    pub async fn get_by_id(store: &StoreClient, id: i64) -> Result<Technician, ApiError> {
        store
            .select_one(TABLE, SelectQuery::new().eq("id", id))
            .await?
            .ok_or_else(|| ApiError::not_found("Técnico no encontrado"))
    }

    /// Resolve an identity to its technician profile, if it has one.
    pub async fn find_by_usuario(
        store: &StoreClient,
        usuario_id: Uuid,
    ) -> Result<Option<Technician>, ApiError> {
        let row = store
            .select_one(TABLE, SelectQuery::new().eq("usuario_id", usuario_id))
            .await?;
        Ok(row)
    }

    pub async fn create(store: &StoreClient, row: &NewTechnician) -> Result<Technician, ApiError> {
        Ok(store.insert(TABLE, row).await?)
    }

    pub async fn update(
        store: &StoreClient,
        id: i64,
        changes: &TechnicianUpdate,
    ) -> Result<Technician, ApiError> {
        if changes.is_empty() {
            return Err(ApiError::validation("Sin campos para actualizar"));
        }

        store
            .update(TABLE, SelectQuery::new().eq("id", id), changes)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::not_found("Técnico no encontrado"))
    }

    pub async fn delete(store: &StoreClient, id: i64) -> Result<(), ApiError> {
        let deleted: Vec<Technician> =
            store.delete(TABLE, SelectQuery::new().eq("id", id)).await?;
        if deleted.is_empty() {
            return Err(ApiError::not_found("Técnico no encontrado"));
        }
        Ok(())
    }
}
