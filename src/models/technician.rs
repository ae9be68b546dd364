use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Availability of a technician, as stored in `tecnicos.estado`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TechnicianStatus {
    #[default]
    Disponible,
    Ocupado,
    #[serde(rename = "no-disponible")]
    NoDisponible,
}

impl TechnicianStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TechnicianStatus::Disponible => "disponible",
            TechnicianStatus::Ocupado => "ocupado",
            TechnicianStatus::NoDisponible => "no-disponible",
        }
    }
}

/// A `tecnicos` row. Linked 1:1 to an identity via `usuario_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Technician {
    pub id: i64,
    pub usuario_id: Option<Uuid>,
    pub nombre: String,
    pub email: String,
    pub telefono: Option<String>,
    pub especialidad: Option<String>,
    pub estado: TechnicianStatus,
    /// Average rating, kept as the store's numeric type.
    pub calificacion: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for `tecnicos`. New technicians start available unless
/// stated otherwise.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTechnician {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usuario_id: Option<Uuid>,
    pub nombre: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub especialidad: Option<String>,
    #[serde(default)]
    pub estado: TechnicianStatus,
}

/// Partial update for `tecnicos`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TechnicianUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub especialidad: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estado: Option<TechnicianStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calificacion: Option<Decimal>,
}

impl TechnicianUpdate {
    pub fn is_empty(&self) -> bool {
        self.nombre.is_none()
            && self.email.is_none()
            && self.telefono.is_none()
            && self.especialidad.is_none()
            && self.estado.is_none()
            && self.calificacion.is_none()
    }
}
