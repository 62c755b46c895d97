//! User-facing notification boundary
//!
//! The storefront surfaces API failures as toasts. The client does not know
//! how toasts are rendered; it only promises to call the injected
//! [`Notifier`] exactly once per failed request, and never on success.

/// Sink for user-visible error notifications
pub trait Notifier: Send + Sync {
    /// Show an error notification to the user
    fn error(&self, message: &str);
}

/// Notifier that logs instead of rendering
///
/// The default wiring for headless contexts (demos, tests, background jobs)
/// where there is no toast surface.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, message: &str) {
        tracing::warn!(notification = message, "API error notification");
    }
}
