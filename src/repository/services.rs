use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::ApiError;
use crate::models::{NewServiceRequest, RequestStatus, ServiceRequest, ServiceUpdate};
use crate::provider::{SelectQuery, SortDirection, StoreClient};

const TABLE: &str = "servicios";

// The provider's select dialect rejects whitespace, so these stay compact.

/// Full display embeds for the admin board and detail reads.
const DETAIL_EMBED: &str = "*,clientes:cliente_id(nombre,email,telefono,direccion),sedes:sede_id(nombre,direccion,ciudad),tecnicos:tecnico_id(nombre,email)";

/// What a client sees about their own requests.
const CLIENT_VIEW_EMBED: &str =
    "*,tecnicos:tecnico_id(nombre,email),sedes:sede_id(nombre,direccion,ciudad)";

/// What a technician needs to do the job: who and where.
const TECHNICIAN_VIEW_EMBED: &str =
    "*,clientes:cliente_id(nombre,email,telefono,direccion),sedes:sede_id(nombre,direccion,ciudad)";

/// Partial update stamped with the write time.
#[derive(Serialize)]
struct Stamped<'a, T: Serialize> {
    #[serde(flatten)]
    changes: &'a T,
    updated_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct AssignChanges {
    tecnico_id: i64,
    estado: RequestStatus,
    updated_at: DateTime<Utc>,
}

#[derive(Serialize)]
struct StatusChanges {
    estado: RequestStatus,
    updated_at: DateTime<Utc>,
}

pub struct ServiceRepo;

impl ServiceRepo {
    /// The admin board: everything already in flight (not pending),
    /// newest first.
    pub async fn list_active(store: &StoreClient) -> Result<Vec<ServiceRequest>, ApiError> {
        let rows = store
            .select(
                TABLE,
                SelectQuery::new()
                    .select(DETAIL_EMBED)
                    .neq("estado", RequestStatus::Pendiente.as_str())
                    .order("created_at", SortDirection::Desc),
            )
            .await?;
        Ok(rows)
    }

    /// The intake queue: pending requests awaiting assignment.
    pub async fn list_pending(store: &StoreClient) -> Result<Vec<ServiceRequest>, ApiError> {
        let rows = store
            .select(
                TABLE,
                SelectQuery::new()
                    .select(DETAIL_EMBED)
                    .eq("estado", RequestStatus::Pendiente.as_str())
                    .order("created_at", SortDirection::Desc),
            )
            .await?;
        Ok(rows)
    }

    pub async fn get_by_id(store: &StoreClient, id: i64) -> Result<ServiceRequest, ApiError> {
        store
            .select_one(TABLE, SelectQuery::new().select(DETAIL_EMBED).eq("id", id))
            .await?
            .ok_or_else(|| ApiError::not_found("Servicio no encontrado"))
    }

    /// One client's requests, newest first.
    pub async fn list_by_client(
        store: &StoreClient,
        cliente_id: i64,
    ) -> Result<Vec<ServiceRequest>, ApiError> {
        let rows = store
            .select(
                TABLE,
                SelectQuery::new()
                    .select(CLIENT_VIEW_EMBED)
                    .eq("cliente_id", cliente_id)
                    .order("created_at", SortDirection::Desc),
            )
            .await?;
        Ok(rows)
    }

    /// One technician's workload: everything assigned to them that was not
    /// cancelled, soonest visit first.
    pub async fn list_by_technician(
        store: &StoreClient,
        tecnico_id: i64,
    ) -> Result<Vec<ServiceRequest>, ApiError> {
        let rows = store
            .select(
                TABLE,
                SelectQuery::new()
                    .select(TECHNICIAN_VIEW_EMBED)
                    .eq("tecnico_id", tecnico_id)
                    .neq("estado", RequestStatus::Cancelada.as_str())
                    .order("fecha", SortDirection::Asc),
            )
            .await?;
        Ok(rows)
    }

    pub async fn insert(
        store: &StoreClient,
        row: &NewServiceRequest,
    ) -> Result<ServiceRequest, ApiError> {
        Ok(store.insert(TABLE, row).await?)
    }

    /// Update descriptive fields only; lifecycle columns go through the
    /// conditional writes below.
    pub async fn update_fields(
        store: &StoreClient,
        id: i64,
        changes: &ServiceUpdate,
    ) -> Result<ServiceRequest, ApiError> {
        if changes.is_empty() {
            return Err(ApiError::validation("Sin campos para actualizar"));
        }

        let stamped = Stamped {
            changes,
            updated_at: Utc::now(),
        };
        store
            .update(TABLE, SelectQuery::new().eq("id", id), &stamped)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::not_found("Servicio no encontrado"))
    }

    /// Conditional assignment: the store only applies the write while the
    /// row is still pending, so a concurrent assignment loses cleanly
    /// (returns `None`) instead of overwriting.
    pub async fn assign_if_pending(
        store: &StoreClient,
        id: i64,
        tecnico_id: i64,
    ) -> Result<Option<ServiceRequest>, ApiError> {
        let changes = AssignChanges {
            tecnico_id,
            estado: RequestStatus::Asignada,
            updated_at: Utc::now(),
        };
        let rows = store
            .update(
                TABLE,
                SelectQuery::new()
                    .eq("id", id)
                    .eq("estado", RequestStatus::Pendiente.as_str()),
                &changes,
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Conditional status write predicated on the status the caller
    /// observed. `None` means the row moved underneath them.
    pub async fn update_status_if(
        store: &StoreClient,
        id: i64,
        observed: RequestStatus,
        next: RequestStatus,
    ) -> Result<Option<ServiceRequest>, ApiError> {
        let changes = StatusChanges {
            estado: next,
            updated_at: Utc::now(),
        };
        let rows = store
            .update(
                TABLE,
                SelectQuery::new()
                    .eq("id", id)
                    .eq("estado", observed.as_str()),
                &changes,
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    pub async fn delete(store: &StoreClient, id: i64) -> Result<(), ApiError> {
        let deleted: Vec<ServiceRequest> =
            store.delete(TABLE, SelectQuery::new().eq("id", id)).await?;
        if deleted.is_empty() {
            return Err(ApiError::not_found("Servicio no encontrado"));
        }
        Ok(())
    }
}
