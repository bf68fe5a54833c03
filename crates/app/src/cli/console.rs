use boutique_app::ui::{Navigator, Notification, Notifier, Route, TracingNotifier};

/// Prints notifications to stderr and keeps them in the log.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        let marker = if notification.is_error() { "✗" } else { "✓" };
        eprintln!("{marker} {notification}");

        TracingNotifier.notify(notification);
    }
}

/// Reports where a browser session would go next.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&self, route: Route) {
        eprintln!("→ {route}");
    }
}
