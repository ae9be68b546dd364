use crate::error::ApiError;
use crate::models::{NewSite, Site, SiteUpdate};
use crate::provider::{SelectQuery, SortDirection, StoreClient};

const TABLE: &str = "sedes";

/// Owner display name comes along on reads.
const OWNER_EMBED: &str = "*,clientes:cliente_id(nombre)";

pub struct SiteRepo;

impl SiteRepo {
    /// All sites, newest first, with the owning client's name.
    pub async fn list(store: &StoreClient) -> Result<Vec<Site>, ApiError> {
        let rows = store
            .select(
                TABLE,
                SelectQuery::new()
                    .select(OWNER_EMBED)
                    .order("created_at", SortDirection::Desc),
            )
            .await?;
        Ok(rows)
    }

    pub async fn get_by_id(store: &StoreClient, id: i64) -> Result<Site, ApiError> {
        store
            .select_one(TABLE, SelectQuery::new().select(OWNER_EMBED).eq("id", id))
            .await?
            .ok_or_else(|| ApiError::not_found("Sede no encontrada"))
    }

    /// All sites belonging to one client.
    pub async fn list_by_client(
        store: &StoreClient,
        cliente_id: i64,
    ) -> Result<Vec<Site>, ApiError> {
        let rows = store
            .select(TABLE, SelectQuery::new().eq("cliente_id", cliente_id))
            .await?;
        Ok(rows)
    }

    pub async fn create(store: &StoreClient, row: &NewSite) -> Result<Site, ApiError> {
        Ok(store.insert(TABLE, row).await?)
    }

    pub async fn update(
        store: &StoreClient,
        id: i64,
        changes: &SiteUpdate,
    ) -> Result<Site, ApiError> {
        if changes.is_empty() {
            return Err(ApiError::validation("Sin campos para actualizar"));
        }

        store
            .update(TABLE, SelectQuery::new().eq("id", id), changes)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::not_found("Sede no encontrada"))
    }

    pub async fn delete(store: &StoreClient, id: i64) -> Result<(), ApiError> {
        let deleted: Vec<Site> = store.delete(TABLE, SelectQuery::new().eq("id", id)).await?;
        if deleted.is_empty() {
            return Err(ApiError::not_found("Sede no encontrada"));
        }
        Ok(())
    }
}
