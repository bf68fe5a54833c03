//! Fixtures
//!
//! Static catalogs described in YAML, used for demos and offline browsing.

use std::{fs, path::Path};

use rustc_hash::FxHashSet;
use serde::Deserialize;
use thiserror::Error;

use crate::products::Product;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// The same product id appears twice
    #[error("Duplicate product id: {0}")]
    DuplicateProduct(String),
}

/// A catalog of products in listing order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogFixture {
    products: Vec<Product>,
}

impl CatalogFixture {
    /// Parse a catalog from a YAML document with a top-level `products` list.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if the YAML is malformed or a product id is
    /// repeated.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, FixtureError> {
        let fixture: Self = serde_norway::from_str(yaml)?;

        let mut seen = FxHashSet::default();

        for product in &fixture.products {
            if !seen.insert(product.id.as_str()) {
                return Err(FixtureError::DuplicateProduct(product.id.to_string()));
            }
        }

        Ok(fixture)
    }

    /// Load a catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns a [`FixtureError`] if the file cannot be read or parsed.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, FixtureError> {
        Self::from_yaml_str(&fs::read_to_string(path)?)
    }

    /// Products in listing order.
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Take ownership of the products.
    pub fn into_products(self) -> Vec<Product> {
        self.products
    }
}
