//! Cart Errors

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CartError {
    #[error("sign in to manage your cart")]
    AuthRequired,

    #[error("product is not in the cart")]
    NotFound,

    #[error("quantity {0} is too large")]
    QuantityTooLarge(i64),

    #[error("this product is already being added")]
    Busy,

    #[error("cart change was rejected by the store")]
    RemoteRejected(#[from] StoreError),
}
