//! Profiles

pub mod repository;

pub use repository::*;
