//! Client layer for the external managed backend (Supabase): a PostgREST
//! data plane under `/rest/v1` and a GoTrue auth plane under `/auth/v1`.
//! Everything the service knows about the outside world goes through here.

pub mod auth;
pub mod error;
pub mod query;
pub mod store;

pub use auth::{AuthClient, ProviderSession, ProviderUser, UserMetadata};
pub use error::ProviderError;
pub use query::{SelectQuery, SortDirection};
pub use store::{ProviderConfig, StoreClient};
