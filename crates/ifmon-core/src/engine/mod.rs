//! Interface monitor engine
//!
//! The InterfaceMonitor is responsible for:
//! - Subscribing to kernel link and address updates via EventSource
//! - Resyncing against a full listing via ListingSource, at start and
//!   periodically after that
//! - Reducing every update into edge-triggered notifications
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   LinkUpdate / AddrUpdate
//! │ EventSource │──────────────────────────┐
//! └─────────────┘                          │
//!                                          ▼
//! ┌───────────────┐  resync   ┌──────────────────────┐
//! │ ListingSource │──────────▶│  InterfaceMonitor    │
//! └───────────────┘  (timer)  │  (single dispatcher) │
//!                             └──────────────────────┘
//!                                          │
//!                     ┌────────────────────┼────────────────────┐
//!                     ▼                    ▼                    ▼
//!             ┌───────────────┐   ┌────────────────┐   ┌──────────────┐
//!             │ Update reducer│   │ Resync         │   │  Notifier    │
//!             │               │   │ reconciler     │   │  (callbacks) │
//!             └───────────────┘   └────────────────┘   └──────────────┘
//! ```
//!
//! ## Event Flow
//!
//! 1. Subscribe (failure is fatal)
//! 2. Initial resync (failure is fatal)
//! 3. Wait for a link update, an address update or the resync timer
//! 4. Process it to completion, then go back to 3
//! 5. A closed update stream or a failed resync is fatal

pub mod reducer;
pub mod resync;

pub use reducer::InterfaceTracker;
pub use resync::ResyncReport;

use crate::config::MonitorConfig;
use crate::error::{Error, Result};
use crate::state::InterfaceStore;
use crate::traits::{EventSource, InterfaceState, ListingSource, Notifier, Subscription};
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_stream::StreamExt;
use tracing::{error, info};

/// Events published by `ChannelNotifier`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MonitorEvent {
    /// Initial resync done, event loop running
    Started,

    /// An interface went up or down
    StateChanged {
        name: String,
        state: InterfaceState,
    },

    /// An interface's address set was touched
    AddressesChanged {
        name: String,
        addresses: Vec<String>,
    },

    /// A resync finished
    ResyncCompleted(ResyncReport),

    /// Event loop ended
    Stopped {
        reason: String,
    },
}

/// Interface monitor
///
/// Owns the subscription, the resync timer and all interface state.
/// Every update is processed to completion on a single task before the
/// next one is awaited, so the state needs no locking.
///
/// ## Lifecycle
///
/// 1. Create with [`InterfaceMonitor::new()`]
/// 2. Start with [`InterfaceMonitor::run()`]
/// 3. The monitor runs until an unrecoverable error, which it returns
///
/// There is no retry and no degraded mode: the owner is expected to treat
/// an error from `run()` as fatal.
pub struct InterfaceMonitor {
    /// Kernel event subscription
    events: Box<dyn EventSource>,

    /// Full listings for resyncs
    listing: Box<dyn ListingSource>,

    /// Reconciled state and the notifier it reports to
    tracker: InterfaceTracker,

    /// Interval between periodic resyncs
    resync_interval: Duration,
}

impl InterfaceMonitor {
    /// Create a new interface monitor
    ///
    /// # Parameters
    ///
    /// - `events`: Event source implementation
    /// - `listing`: Listing source implementation
    /// - `notifier`: Receiver of state and address notifications
    /// - `config`: Monitor configuration
    pub fn new(
        events: Box<dyn EventSource>,
        listing: Box<dyn ListingSource>,
        notifier: Box<dyn Notifier>,
        config: MonitorConfig,
    ) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            events,
            listing,
            tracker: InterfaceTracker::new(notifier, config.removal_policy),
            resync_interval: config.resync_interval(),
        })
    }

    /// The current reconciled state
    pub fn store(&self) -> &InterfaceStore {
        self.tracker.store()
    }

    /// Run the monitor
    ///
    /// Only returns on an unrecoverable error: a failed subscription, a
    /// failed resync, or a closed update stream.
    pub async fn run(&mut self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Run the monitor with a controlled shutdown signal
    ///
    /// **TESTING ONLY**: production owners should use `run()`, which never
    /// stops on its own. Returns `Ok(())` when the signal fires (or its
    /// sender is dropped).
    pub async fn run_with_shutdown(&mut self, shutdown_rx: Option<oneshot::Receiver<()>>) -> Result<()> {
        self.run_internal(shutdown_rx).await
    }

    async fn run_internal(&mut self, shutdown_rx: Option<oneshot::Receiver<()>>) -> Result<()> {
        info!("Interface monitoring started");

        let Subscription { mut links, mut addrs } = match self.events.subscribe().await {
            Ok(subscription) => subscription,
            Err(e) => return Err(self.fatal(e, "Failed to subscribe to netlink updates")),
        };
        info!("Subscribed to link and address updates");

        // Start of day resync announces every existing interface. Later
        // resyncs cover whatever the subscription and a listing disagree on.
        if let Err(e) = self.tracker.resync(self.listing.as_ref()).await {
            return Err(self.fatal(e, "Failed to read link states"));
        }

        let mut ticker = tokio::time::interval_at(
            Instant::now() + self.resync_interval,
            self.resync_interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let shutdown = async move {
            match shutdown_rx {
                Some(rx) => {
                    let _ = rx.await;
                }
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(shutdown);

        self.tracker.notifier_mut().on_started();

        loop {
            tokio::select! {
                update = links.next() => match update {
                    Some(update) => self.tracker.handle_link_update(update),
                    None => return Err(self.fatal(Error::ChannelClosed("link updates"), "Failed to read events")),
                },

                update = addrs.next() => match update {
                    Some(update) => self.tracker.handle_addr_update(update),
                    None => return Err(self.fatal(Error::ChannelClosed("address updates"), "Failed to read events")),
                },

                _ = ticker.tick() => {
                    if let Err(e) = self.tracker.resync(self.listing.as_ref()).await {
                        return Err(self.fatal(e, "Failed to read link states"));
                    }
                }

                _ = &mut shutdown => {
                    info!("Shutdown signal received");
                    self.tracker.notifier_mut().on_stopped("Shutdown signal");
                    return Ok(());
                }
            }
        }
    }

    fn fatal(&mut self, err: Error, context: &str) -> Error {
        error!(error = %err, "{}", context);
        self.tracker.notifier_mut().on_stopped(&err.to_string());
        err
    }
}
