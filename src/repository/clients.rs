use uuid::Uuid;

use crate::error::ApiError;
use crate::models::{Client, ClientUpdate, NewClient};
use crate::provider::{SelectQuery, SortDirection, StoreClient};

const TABLE: &str = "clientes";

pub struct ClientRepo;

impl ClientRepo {
    /// All clients, newest first.
    pub async fn list(store: &StoreClient) -> Result<Vec<Client>, ApiError> {
        let rows = store
            .select(
                TABLE,
                SelectQuery::new().order("created_at", SortDirection::Desc),
            )
            .await?;
        Ok(rows)
    }

    pub async fn get_by_id(store: &StoreClient, id: i64) -> Result<Client, ApiError> {
        store
            .select_one(TABLE, SelectQuery::new().eq("id", id))
            .await?
            .ok_or_else(|| ApiError::not_found("Cliente no encontrado"))
    }

    /// Resolve an identity to its client profile, if it has one.
    pub async fn find_by_usuario(
        store: &StoreClient,
        usuario_id: Uuid,
    ) -> Result<Option<Client>, ApiError> {
        let row = store
            .select_one(TABLE, SelectQuery::new().eq("usuario_id", usuario_id))
            .await?;
        Ok(row)
    }

    pub async fn create(store: &StoreClient, row: &NewClient) -> Result<Client, ApiError> {
        Ok(store.insert(TABLE, row).await?)
    }

    pub async fn update(
        store: &StoreClient,
        id: i64,
        changes: &ClientUpdate,
    ) -> Result<Client, ApiError> {
        if changes.is_empty() {
            return Err(ApiError::validation("Sin campos para actualizar"));
        }

        store
            .update(TABLE, SelectQuery::new().eq("id", id), changes)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::not_found("Cliente no encontrado"))
    }

    pub async fn delete(store: &StoreClient, id: i64) -> Result<(), ApiError> {
        let deleted: Vec<Client> = store.delete(TABLE, SelectQuery::new().eq("id", id)).await?;
        if deleted.is_empty() {
            return Err(ApiError::not_found("Cliente no encontrado"));
        }
        Ok(())
    }
}
