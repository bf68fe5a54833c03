//! Products

pub mod errors;
pub mod repository;
pub mod service;

pub use errors::CatalogError;
pub use repository::*;
pub use service::Catalog;
