//! Service-request lifecycle coordinator: the one place that creates
//! requests, moves them through `pendiente → asignada → (completada |
//! cancelada)` and scopes what each role gets to see. Handlers never
//! write lifecycle columns directly.

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;

use crate::error::ApiError;
use crate::models::{
    Identity, NewServiceRequest, RequestStatus, Role, ServiceRequest,
};
use crate::provider::StoreClient;
use crate::repository::{ClientRepo, ServiceRepo, TechnicianRepo};

/// Submission form for a client's service request. Dates and times arrive
/// as strings so a malformed value gets a proper validation error instead
/// of a bare deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitRequest {
    pub sede_id: Option<i64>,
    pub tipo: Option<String>,
    pub descripcion: Option<String>,
    pub equipo: Option<String>,
    pub marca: Option<String>,
    pub modelo: Option<String>,
    pub fecha: Option<String>,
    pub hora: Option<String>,
}

/// Admin-side creation form: like [`SubmitRequest`] but the admin names
/// the client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateRequest {
    pub cliente_id: Option<i64>,
    #[serde(flatten)]
    pub fields: SubmitRequest,
}

pub(crate) fn parse_fecha(value: &str) -> Result<NaiveDate, ApiError> {
    value
        .parse()
        .map_err(|_| ApiError::validation(format!("Fecha inválida: {} (use AAAA-MM-DD)", value)))
}

pub(crate) fn parse_hora(value: &str) -> Result<NaiveTime, ApiError> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| ApiError::validation(format!("Hora inválida: {} (use HH:MM)", value)))
}

/// Validate the required submission fields and build the insert payload.
/// Every request starts pending with no technician.
fn build_new_request(cliente_id: i64, fields: SubmitRequest) -> Result<NewServiceRequest, ApiError> {
    let tipo = fields
        .tipo
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    let mut missing = Vec::new();
    if fields.sede_id.is_none() {
        missing.push("sede");
    }
    if tipo.is_none() {
        missing.push("tipo");
    }
    if fields.fecha.is_none() {
        missing.push("fecha");
    }
    if fields.hora.is_none() {
        missing.push("hora");
    }

    let (Some(sede_id), Some(tipo), Some(fecha), Some(hora)) =
        (fields.sede_id, tipo, fields.fecha, fields.hora)
    else {
        return Err(ApiError::validation(format!(
            "Faltan datos obligatorios ({})",
            missing.join(", ")
        )));
    };

    Ok(NewServiceRequest {
        cliente_id,
        sede_id,
        tipo,
        descripcion: fields.descripcion,
        equipo: fields.equipo,
        marca: fields.marca,
        modelo: fields.modelo,
        fecha: parse_fecha(&fecha)?,
        hora: parse_hora(&hora)?,
        estado: RequestStatus::Pendiente,
    })
}

/// A client submits a new request for one of their sites.
pub async fn submit_request(
    store: &StoreClient,
    identity: &Identity,
    fields: SubmitRequest,
) -> Result<ServiceRequest, ApiError> {
    identity.require(Role::Cliente)?;

    let cliente = ClientRepo::find_by_usuario(store, identity.id)
        .await?
        .ok_or_else(|| {
            ApiError::profile_not_found("Perfil de cliente no encontrado. Contacte soporte.")
        })?;

    let row = build_new_request(cliente.id, fields)?;
    let created = ServiceRepo::insert(store, &row).await?;
    tracing::info!(id = created.id, cliente_id = cliente.id, "service request submitted");
    Ok(created)
}

/// Admin creates a request directly on behalf of a client.
pub async fn create_request(
    store: &StoreClient,
    identity: &Identity,
    input: CreateRequest,
) -> Result<ServiceRequest, ApiError> {
    identity.require_admin()?;

    let cliente_id = input
        .cliente_id
        .ok_or_else(|| ApiError::validation("El cliente es requerido"))?;

    let row = build_new_request(cliente_id, input.fields)?;
    Ok(ServiceRepo::insert(store, &row).await?)
}

/// Admin board: everything already in flight.
pub async fn list_active(
    store: &StoreClient,
    identity: &Identity,
) -> Result<Vec<ServiceRequest>, ApiError> {
    identity.require_admin()?;
    ServiceRepo::list_active(store).await
}

/// Admin intake queue: pending requests awaiting a technician.
pub async fn list_pending(
    store: &StoreClient,
    identity: &Identity,
) -> Result<Vec<ServiceRequest>, ApiError> {
    identity.require_admin()?;
    ServiceRepo::list_pending(store).await
}

/// A client's own requests, newest first.
pub async fn list_for_client(
    store: &StoreClient,
    identity: &Identity,
) -> Result<Vec<ServiceRequest>, ApiError> {
    let cliente = ClientRepo::find_by_usuario(store, identity.id)
        .await?
        .ok_or_else(|| {
            ApiError::profile_not_found("Perfil de cliente no encontrado. Contacte soporte.")
        })?;

    ServiceRepo::list_by_client(store, cliente.id).await
}

/// A technician's assigned, non-cancelled work, soonest visit first.
pub async fn list_for_technician(
    store: &StoreClient,
    identity: &Identity,
) -> Result<Vec<ServiceRequest>, ApiError> {
    let tecnico = TechnicianRepo::find_by_usuario(store, identity.id)
        .await?
        .ok_or_else(|| ApiError::profile_not_found("Perfil de técnico no encontrado."))?;

    ServiceRepo::list_by_technician(store, tecnico.id).await
}

/// Detail view, scoped by role: the admin sees any request, a client only
/// their own, a technician only what is assigned to them. Requests outside
/// the caller's scope read as absent rather than forbidden.
pub async fn get_request(
    store: &StoreClient,
    identity: &Identity,
    request_id: i64,
) -> Result<ServiceRequest, ApiError> {
    let request = ServiceRepo::get_by_id(store, request_id).await?;

    let visible = match identity.rol {
        Role::Admin => true,
        Role::Cliente => ClientRepo::find_by_usuario(store, identity.id)
            .await?
            .map_or(false, |cliente| request.cliente_id == cliente.id),
        Role::Tecnico => TechnicianRepo::find_by_usuario(store, identity.id)
            .await?
            .map_or(false, |tecnico| request.tecnico_id == Some(tecnico.id)),
    };

    if !visible {
        return Err(ApiError::not_found("Servicio no encontrado"));
    }
    Ok(request)
}

/// Admin assigns a technician to a pending request. The write is
/// conditional on the request still being pending; a concurrent
/// assignment surfaces as a conflict instead of silently overwriting.
pub async fn assign_technician(
    store: &StoreClient,
    identity: &Identity,
    request_id: i64,
    tecnico_id: Option<i64>,
) -> Result<ServiceRequest, ApiError> {
    identity.require_admin()?;

    let tecnico_id =
        tecnico_id.ok_or_else(|| ApiError::validation("El ID del técnico es requerido"))?;

    match ServiceRepo::assign_if_pending(store, request_id, tecnico_id).await? {
        Some(updated) => {
            tracing::info!(id = request_id, tecnico_id, "technician assigned");
            Ok(updated)
        }
        None => {
            // Distinguish a missing request from one that moved on.
            let current = ServiceRepo::get_by_id(store, request_id).await?;
            Err(ApiError::conflict(format!(
                "La solicitud ya no está pendiente (estado actual: {})",
                current.estado
            )))
        }
    }
}

/// Move a request through the state machine. Allowed to the admin or to
/// the technician the request is assigned to; the transition table has
/// the final word, and the write is conditional on the status observed
/// here.
pub async fn update_status(
    store: &StoreClient,
    identity: &Identity,
    request_id: i64,
    estado: &str,
) -> Result<ServiceRequest, ApiError> {
    let next = RequestStatus::parse(estado)
        .ok_or_else(|| ApiError::validation(format!("Estado desconocido: {}", estado)))?;

    // Entering "asignada" requires a technician; only the assignment
    // endpoint can supply one.
    if next == RequestStatus::Asignada {
        return Err(ApiError::conflict(
            "La asignación se realiza con el endpoint de asignar técnico",
        ));
    }

    let current = ServiceRepo::get_by_id(store, request_id).await?;

    match identity.rol {
        Role::Admin => {}
        Role::Tecnico => {
            let tecnico = TechnicianRepo::find_by_usuario(store, identity.id)
                .await?
                .ok_or_else(|| ApiError::profile_not_found("Perfil de técnico no encontrado."))?;
            if current.tecnico_id != Some(tecnico.id) {
                return Err(ApiError::forbidden(
                    "Solo el técnico asignado puede actualizar este servicio",
                ));
            }
        }
        Role::Cliente => {
            return Err(ApiError::forbidden(
                "No tiene permisos para esta operación",
            ));
        }
    }

    if !current.estado.can_transition_to(next) {
        return Err(ApiError::conflict(format!(
            "Transición de estado no permitida: de {} a {}",
            current.estado, next
        )));
    }

    match ServiceRepo::update_status_if(store, request_id, current.estado, next).await? {
        Some(updated) => {
            tracing::info!(id = request_id, estado = %next, "service status updated");
            Ok(updated)
        }
        None => Err(ApiError::conflict(
            "La solicitud cambió de estado, vuelva a intentarlo",
        )),
    }
}
