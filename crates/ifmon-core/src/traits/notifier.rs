// # Notifier Trait
//
// Defines the consumer-facing side of the monitor: edge-triggered
// interface state notifications and full address-list notifications.
//
// ## Implementations
//
// - `CallbackNotifier`: two closures, one per notification kind
// - `ChannelNotifier`: forwards `MonitorEvent`s over a bounded channel
// - `LoggingNotifier`: logs every notification (used by `ifmond`)

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::engine::ResyncReport;

/// Operational state of an interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterfaceState {
    Up,
    Down,
}

impl fmt::Display for InterfaceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterfaceState::Up => f.write_str("up"),
            InterfaceState::Down => f.write_str("down"),
        }
    }
}

/// Trait for notification consumers
///
/// # Blocking
///
/// Every method is called synchronously on the monitor's dispatch task.
/// A slow or blocking implementation stalls all further event processing,
/// so implementations must return quickly and hand off any real work.
pub trait Notifier: Send {
    /// An interface went up or down
    ///
    /// Only called on an actual edge, never for a repeated state.
    fn on_state_change(&mut self, name: &str, state: InterfaceState);

    /// The address set of an interface was touched
    ///
    /// `addresses` is always the complete current list, not a delta.
    fn on_addresses_change(&mut self, name: &str, addresses: &[String]);

    /// A resync finished
    fn on_resync_complete(&mut self, _report: &ResyncReport) {}

    /// The monitor finished its initial resync and entered its event loop
    fn on_started(&mut self) {}

    /// The monitor's event loop ended
    fn on_stopped(&mut self, _reason: &str) {}
}
