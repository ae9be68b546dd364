use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a service request. One enumerated type everywhere;
/// the store never sees a status string that didn't come from here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pendiente,
    Asignada,
    Completada,
    Cancelada,
}

impl RequestStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            RequestStatus::Pendiente => "pendiente",
            RequestStatus::Asignada => "asignada",
            RequestStatus::Completada => "completada",
            RequestStatus::Cancelada => "cancelada",
        }
    }

    pub fn parse(value: &str) -> Option<RequestStatus> {
        match value {
            "pendiente" => Some(RequestStatus::Pendiente),
            "asignada" => Some(RequestStatus::Asignada),
            "completada" => Some(RequestStatus::Completada),
            "cancelada" => Some(RequestStatus::Cancelada),
            _ => None,
        }
    }

    /// The allowed-transition table. Assignment is the only way into
    /// `asignada` (it supplies the technician, keeping the
    /// technician-null-iff-pending invariant); a pending request is
    /// withdrawn by deletion, not cancellation.
    pub fn can_transition_to(self, next: RequestStatus) -> bool {
        use RequestStatus::*;
        matches!(
            (self, next),
            (Pendiente, Asignada) | (Asignada, Completada) | (Asignada, Cancelada)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, RequestStatus::Completada | RequestStatus::Cancelada)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client contact fields embedded in request reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientSummary {
    pub nombre: String,
    pub email: Option<String>,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
}

/// Site display fields embedded in request reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteSummary {
    pub nombre: String,
    pub direccion: Option<String>,
    pub ciudad: Option<String>,
}

/// Technician display fields embedded in request reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TechnicianSummary {
    pub nombre: String,
    pub email: Option<String>,
}

/// A `servicios` row: the unit of work tracked from submission to
/// completion. Embeds are present only on queries that ask for them;
/// different views select different summary columns, so summary fields
/// beyond the name are optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: i64,
    pub cliente_id: i64,
    pub sede_id: i64,
    pub tecnico_id: Option<i64>,
    pub tipo: String,
    pub descripcion: Option<String>,
    pub equipo: Option<String>,
    pub marca: Option<String>,
    pub modelo: Option<String>,
    pub fecha: NaiveDate,
    pub hora: NaiveTime,
    pub estado: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clientes: Option<ClientSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sedes: Option<SiteSummary>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tecnicos: Option<TechnicianSummary>,
}

/// Insert payload for `servicios`. Every insert goes through the
/// coordinator, which fixes the initial state: pendiente, no technician.
#[derive(Debug, Clone, Serialize)]
pub struct NewServiceRequest {
    pub cliente_id: i64,
    pub sede_id: i64,
    pub tipo: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marca: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modelo: Option<String>,
    pub fecha: NaiveDate,
    pub hora: NaiveTime,
    pub estado: RequestStatus,
}

/// Partial update for `servicios` descriptive fields. Lifecycle fields
/// (`estado`, `tecnico_id`) are owned by the coordinator and not writable
/// here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sede_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub descripcion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equipo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub marca: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modelo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fecha: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hora: Option<NaiveTime>,
}

impl ServiceUpdate {
    pub fn is_empty(&self) -> bool {
        self.sede_id.is_none()
            && self.tipo.is_none()
            && self.descripcion.is_none()
            && self.equipo.is_none()
            && self.marca.is_none()
            && self.modelo.is_none()
            && self.fecha.is_none()
            && self.hora.is_none()
    }
}
