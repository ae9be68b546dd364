use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A `clientes` row. One per client identity, linked via `usuario_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: i64,
    pub usuario_id: Option<Uuid>,
    pub nombre: String,
    pub empresa: Option<String>,
    pub email: String,
    pub telefono: Option<String>,
    pub direccion: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insert payload for `clientes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewClient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usuario_id: Option<Uuid>,
    pub nombre: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empresa: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
}

/// Partial update for `clientes`. `id`, `usuario_id` and `created_at` are
/// not writable through the API.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClientUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empresa: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
}

impl ClientUpdate {
    pub fn is_empty(&self) -> bool {
        self.nombre.is_none()
            && self.empresa.is_none()
            && self.email.is_none()
            && self.telefono.is_none()
            && self.direccion.is_none()
    }
}
