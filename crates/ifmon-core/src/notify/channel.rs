// # Channel Notifier
//
// Forwards every notification as a `MonitorEvent` over a bounded channel,
// so a consumer can process them on its own task without ever stalling
// the monitor.
//
// ## Backpressure
//
// Sends never wait. When the channel is full the event is dropped with a
// warning; the next resync re-announces every interface's addresses, but
// a dropped state edge is lost until the state changes again.

use tokio::sync::mpsc;
use tracing::warn;

use crate::config::MonitorConfig;
use crate::engine::{MonitorEvent, ResyncReport};
use crate::traits::{InterfaceState, Notifier};

/// Notifier that publishes `MonitorEvent`s on a bounded channel
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    event_tx: mpsc::Sender<MonitorEvent>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiver its events arrive on
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<MonitorEvent>) {
        let (event_tx, event_rx) = mpsc::channel(capacity);
        (Self { event_tx }, event_rx)
    }

    /// Create a notifier sized by `event_channel_capacity`
    pub fn from_config(config: &MonitorConfig) -> (Self, mpsc::Receiver<MonitorEvent>) {
        Self::new(config.event_channel_capacity)
    }

    fn emit_event(&self, event: MonitorEvent) {
        if self.event_tx.try_send(event).is_err() {
            warn!("Event channel full or closed, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}

impl Notifier for ChannelNotifier {
    fn on_state_change(&mut self, name: &str, state: InterfaceState) {
        self.emit_event(MonitorEvent::StateChanged {
            name: name.to_string(),
            state,
        });
    }

    fn on_addresses_change(&mut self, name: &str, addresses: &[String]) {
        self.emit_event(MonitorEvent::AddressesChanged {
            name: name.to_string(),
            addresses: addresses.to_vec(),
        });
    }

    fn on_resync_complete(&mut self, report: &ResyncReport) {
        self.emit_event(MonitorEvent::ResyncCompleted(report.clone()));
    }

    fn on_started(&mut self) {
        self.emit_event(MonitorEvent::Started);
    }

    fn on_stopped(&mut self, reason: &str) {
        self.emit_event(MonitorEvent::Stopped {
            reason: reason.to_string(),
        });
    }
}
