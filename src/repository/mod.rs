//! Entity repositories: one per business entity, each operation a single
//! round trip to the external store. No caching, no local state.

pub mod clients;
pub mod services;
pub mod sites;
pub mod technicians;

pub use clients::ClientRepo;
pub use services::ServiceRepo;
pub use sites::SiteRepo;
pub use technicians::TechnicianRepo;
