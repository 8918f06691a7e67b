mod user;

pub use user::CatalogUser;
