//! Remote data service access.

mod client;
mod errors;
mod query;

pub use client::{RestClient, RestConfig};
pub use errors::StoreError;
pub use query::{Direction, Query};
