//! Operator notifications.

use tracing::warn;

/// Fire-and-forget delivery of an operator message to a channel.
///
/// Delivery failures are the implementation's concern; callers never wait
/// on or react to them.
pub trait Notifier: Send + Sync {
    /// Sends `message` to `channel`.
    fn send(&self, channel: &str, message: &str);
}

/// A [`Notifier`] that writes messages to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send(&self, channel: &str, message: &str) {
        warn!(channel = %channel, alert = %message, "Operator alert");
    }
}
