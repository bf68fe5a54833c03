//! Checkout Errors

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("sign in to check out")]
    AuthRequired,

    #[error("the cart is empty")]
    EmptyCart,

    #[error("a shipping address is required")]
    AddressRequired,

    #[error("an order is already being placed")]
    Busy,

    #[error("order was rejected by the store")]
    RemoteRejected(#[from] StoreError),
}
