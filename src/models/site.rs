use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Client display name embedded in site reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientName {
    pub nombre: String,
}

/// A `sedes` row: a client's physical location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Site {
    pub id: i64,
    pub cliente_id: i64,
    pub nombre: String,
    pub direccion: Option<String>,
    pub ciudad: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Present only on queries that ask for the owner embed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clientes: Option<ClientName>,
}

/// Insert payload for `sedes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewSite {
    pub cliente_id: i64,
    pub nombre: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ciudad: Option<String>,
}

/// Partial update for `sedes`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cliente_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ciudad: Option<String>,
}

impl SiteUpdate {
    pub fn is_empty(&self) -> bool {
        self.cliente_id.is_none()
            && self.nombre.is_none()
            && self.direccion.is_none()
            && self.ciudad.is_none()
    }
}
