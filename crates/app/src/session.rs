//! Signed-in shopper identity.

use crate::uuids::TypedUuid;

/// User UUID
pub type UserUuid = TypedUuid<CurrentUser>;

/// The authenticated user, as handed over by the auth provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserUuid,
    pub email: Option<String>,
}

impl CurrentUser {
    pub fn new(id: UserUuid) -> Self {
        Self { id, email: None }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}
