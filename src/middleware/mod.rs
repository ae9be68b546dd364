pub mod auth;
pub mod response;

pub use auth::{provider_auth_middleware, BearerToken};
pub use response::{ApiResponse, ApiResult};
