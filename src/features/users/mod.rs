pub mod models;
pub mod services;

pub use models::CatalogUser;
pub use services::IdentityService;
