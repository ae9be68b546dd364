pub mod auth;
pub mod clients;
pub mod services;
pub mod sites;
pub mod technicians;
