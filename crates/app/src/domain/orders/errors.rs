//! Order Errors

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum OrdersError {
    #[error("sign in to see your orders")]
    AuthRequired,

    #[error("this order is already being updated")]
    Busy,

    #[error("order request was rejected by the store")]
    RemoteRejected(#[from] StoreError),
}
