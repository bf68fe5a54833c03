//! Orders

pub mod errors;
pub mod models;
pub mod repository;
pub mod service;

pub use errors::OrdersError;
pub use repository::*;
pub use service::OrderHistory;
