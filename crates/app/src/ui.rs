//! Notification and navigation collaborators.

use std::fmt::{Display, Formatter, Result as FmtResult};

use mockall::automock;
use tracing::{error, info};

/// Whether a notification reports success or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

/// A toast-style message for the shopper.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub title: String,
    pub description: Option<String>,
}

impl Notification {
    pub fn success(title: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            title: title.into(),
            description: None,
        }
    }

    pub fn error(title: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            title: title.into(),
            description: None,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl Display for Notification {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match &self.description {
            Some(description) => write!(f, "{}: {description}", self.title),
            None => f.write_str(&self.title),
        }
    }
}

/// Shows notifications to the shopper.
#[automock]
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Destinations the core can send the shopper to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Sign-in page
    Auth,

    /// Confirmation page for a freshly placed order
    OrderConfirmation(String),

    /// Product listing
    Products,
}

impl Display for Route {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            Self::Auth => f.write_str("/auth"),
            Self::OrderConfirmation(number) => write!(f, "/order-success/{number}"),
            Self::Products => f.write_str("/products"),
        }
    }
}

/// Moves the shopper between views.
#[automock]
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Notifier that writes every notification to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        let description = notification.description.as_deref().unwrap_or_default();

        match notification.severity {
            Severity::Success => info!(title = %notification.title, description, "notification"),
            Severity::Error => error!(title = %notification.title, description, "notification"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_title_with_optional_description() {
        assert_eq!(Notification::success("Cart cleared").to_string(), "Cart cleared");
        assert_eq!(
            Notification::error("Checkout Failed")
                .with_description("out of stock")
                .to_string(),
            "Checkout Failed: out of stock"
        );
    }

    #[test]
    fn routes_render_as_paths() {
        assert_eq!(
            Route::OrderConfirmation("1042".into()).to_string(),
            "/order-success/1042"
        );
        assert_eq!(Route::Auth.to_string(), "/auth");
    }
}
