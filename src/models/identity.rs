use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::provider::ProviderUser;

/// Role of an authenticated principal. Set in the provider's user metadata
/// at registration and immutable afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Cliente,
    Tecnico,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Cliente => "cliente",
            Role::Tecnico => "tecnico",
            Role::Admin => "admin",
        }
    }

    pub fn parse(value: &str) -> Option<Role> {
        match value {
            "cliente" => Some(Role::Cliente),
            "tecnico" => Some(Role::Tecnico),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An authenticated principal, resolved from a bearer token by the
/// identity gateway and attached to the request.
#[derive(Debug, Clone, Serialize)]
pub struct Identity {
    pub id: Uuid,
    pub email: String,
    pub nombre: Option<String>,
    pub rol: Role,
}

impl Identity {
    /// Strict mapping from the provider's user object. An identity whose
    /// metadata carries no parseable role is rejected outright - the old
    /// backend treated "no role" as admin-equivalent, which was a hole.
    pub fn from_provider(user: ProviderUser) -> Result<Self, ApiError> {
        let rol = user
            .user_metadata
            .rol
            .as_deref()
            .and_then(Role::parse)
            .ok_or_else(|| ApiError::unauthorized("Identidad sin rol asignado"))?;

        Ok(Self {
            id: user.id,
            email: user.email.unwrap_or_default(),
            nombre: user.user_metadata.nombre,
            rol,
        })
    }

    pub fn require(&self, rol: Role) -> Result<(), ApiError> {
        if self.rol == rol {
            Ok(())
        } else {
            Err(ApiError::forbidden(
                "No tiene permisos para esta operación",
            ))
        }
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        self.require(Role::Admin)
    }
}
