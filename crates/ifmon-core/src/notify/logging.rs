// # Logging Notifier
//
// Logs every notification. `ifmond` runs with it when no other consumer
// is embedded.

use tracing::{debug, info, warn};

use crate::engine::ResyncReport;
use crate::traits::{InterfaceState, Notifier};

/// Notifier that only logs
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingNotifier;

impl Notifier for LoggingNotifier {
    fn on_state_change(&mut self, name: &str, state: InterfaceState) {
        info!(iface = name, %state, "Interface state changed");
    }

    fn on_addresses_change(&mut self, name: &str, addresses: &[String]) {
        info!(iface = name, ?addresses, "Interface addresses changed");
    }

    fn on_resync_complete(&mut self, report: &ResyncReport) {
        debug!(
            interfaces = report.interfaces_seen,
            removed = ?report.removed,
            finished_at = %report.finished_at,
            "Resync complete"
        );
    }

    fn on_started(&mut self) {
        info!("Monitor running");
    }

    fn on_stopped(&mut self, reason: &str) {
        warn!(reason, "Monitor stopped");
    }
}
