//! Checkout

pub mod address;
pub mod errors;
pub mod service;

pub use address::Address;
pub use errors::CheckoutError;
pub use service::{AddressPolicy, Checkout};
