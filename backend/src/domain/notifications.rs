//! User-facing notifications (toast messages).

use shared::Severity;
use tracing::{error, info, warn};

/// Receives (severity, message) pairs for validation failures and mutations.
/// The domain never depends on what the sink does with them.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, severity: Severity, message: &str);
}

/// Sink that only writes to the log
#[derive(Clone, Copy, Debug, Default)]
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn notify(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Success | Severity::Info => info!(?severity, "{}", message),
            Severity::Warning => warn!("{}", message),
            Severity::Error => error!("{}", message),
        }
    }
}
