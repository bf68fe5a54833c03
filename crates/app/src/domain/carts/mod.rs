//! Carts

pub mod errors;
pub mod records;
pub mod repository;
pub mod service;

pub use errors::CartError;
pub use records::CartRecord;
pub use repository::*;
pub use service::CartSync;
