pub mod client;
pub mod identity;
pub mod service_request;
pub mod site;
pub mod technician;

pub use client::{Client, ClientUpdate, NewClient};
pub use identity::{Identity, Role};
pub use service_request::{
    ClientSummary, NewServiceRequest, RequestStatus, ServiceRequest, ServiceUpdate, SiteSummary,
    TechnicianSummary,
};
pub use site::{NewSite, Site, SiteUpdate};
pub use technician::{NewTechnician, Technician, TechnicianStatus, TechnicianUpdate};
