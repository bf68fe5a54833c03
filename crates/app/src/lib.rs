//! Storefront session services: cart synchronisation, checkout, order
//! history and the catalog, backed by a hosted REST data service.

pub mod config;
pub mod context;
pub mod domain;
pub mod guards;
pub mod observability;
pub mod session;
pub mod store;
pub mod ui;

#[cfg(test)]
mod test;

mod uuids;

pub use uuids::TypedUuid;
