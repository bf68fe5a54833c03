//! Catalog Errors

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("product not found")]
    NotFound,

    #[error("catalog request was rejected by the store")]
    RemoteRejected(#[from] StoreError),
}
