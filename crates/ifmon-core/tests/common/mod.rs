//! Test doubles and common utilities for monitor contract tests
//!
//! This module provides minimal test doubles for the monitor's
//! collaborators: an event source the test drives by hand and a listing
//! source whose contents the test can change while the monitor runs.

#![allow(dead_code)]

use ifmon_core::engine::MonitorEvent;
use ifmon_core::error::{Error, Result};
use ifmon_core::traits::{
    AddrUpdate, AddressFamily, EventSource, IFF_RUNNING, IFF_UP, LinkAttrs, LinkUpdate,
    ListedLink, ListingSource, Subscription,
};
use ifmon_core::{ChannelNotifier, InterfaceMonitor, MonitorConfig};
use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

/// An EventSource whose updates are sent by the test
pub struct ControlledEventSource {
    receivers: Mutex<Option<(mpsc::UnboundedReceiver<LinkUpdate>, mpsc::UnboundedReceiver<AddrUpdate>)>>,
    fail_subscribe: bool,
    subscribe_call_count: Arc<AtomicUsize>,
}

/// Test-side handles of a ControlledEventSource
pub struct EventSenders {
    pub links: mpsc::UnboundedSender<LinkUpdate>,
    pub addrs: mpsc::UnboundedSender<AddrUpdate>,
}

impl EventSenders {
    pub fn link(&self, update: LinkUpdate) {
        self.links.send(update).expect("monitor holds the link stream");
    }

    pub fn addr(&self, update: AddrUpdate) {
        self.addrs.send(update).expect("monitor holds the address stream");
    }
}

impl ControlledEventSource {
    /// Create a new controlled event source
    pub fn new() -> (Self, EventSenders) {
        let (link_tx, link_rx) = mpsc::unbounded_channel();
        let (addr_tx, addr_rx) = mpsc::unbounded_channel();

        let source = Self {
            receivers: Mutex::new(Some((link_rx, addr_rx))),
            fail_subscribe: false,
            subscribe_call_count: Arc::new(AtomicUsize::new(0)),
        };

        (source, EventSenders { links: link_tx, addrs: addr_tx })
    }

    /// A source whose subscribe() always fails
    pub fn failing() -> Self {
        Self {
            receivers: Mutex::new(None),
            fail_subscribe: true,
            subscribe_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait::async_trait]
impl EventSource for ControlledEventSource {
    async fn subscribe(&self) -> Result<Subscription> {
        self.subscribe_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_subscribe {
            return Err(Error::subscription("netlink socket refused"));
        }

        let (link_rx, addr_rx) = self
            .receivers
            .lock()
            .unwrap()
            .take()
            .expect("subscribe() can only be called once");

        Ok(Subscription {
            links: Box::pin(tokio_stream::wrappers::UnboundedReceiverStream::new(link_rx)),
            addrs: Box::pin(tokio_stream::wrappers::UnboundedReceiverStream::new(addr_rx)),
        })
    }
}

#[derive(Default)]
struct ListingState {
    links: Vec<ListedLink>,
    addrs: HashMap<(u32, AddressFamily), Vec<IpAddr>>,
    fail: bool,
}

/// A ListingSource whose contents the test can change at any time
#[derive(Clone, Default)]
pub struct ScriptedListing {
    state: Arc<Mutex<ListingState>>,
    list_call_count: Arc<AtomicUsize>,
}

impl ScriptedListing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a link to the listing
    pub fn with_link(self, attrs: LinkAttrs) -> Self {
        self.state.lock().unwrap().links.push(attrs.into());
        self
    }

    /// Add an address to the listing
    pub fn with_addr(self, index: u32, family: AddressFamily, addr: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .addrs
            .entry((index, family))
            .or_default()
            .push(addr.parse().expect("valid address"));
        self
    }

    /// Replace the listed links
    pub fn set_links(&self, links: Vec<LinkAttrs>) {
        self.state.lock().unwrap().links = links.into_iter().map(ListedLink::from).collect();
    }

    /// Make every subsequent listing fail
    pub fn set_failing(&self, fail: bool) {
        self.state.lock().unwrap().fail = fail;
    }

    /// Number of times list_links() was called
    pub fn list_call_count(&self) -> usize {
        self.list_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ListingSource for ScriptedListing {
    async fn list_links(&self) -> Result<Vec<ListedLink>> {
        self.list_call_count.fetch_add(1, Ordering::SeqCst);
        let state = self.state.lock().unwrap();
        if state.fail {
            return Err(Error::listing("dump interrupted"));
        }
        Ok(state.links.clone())
    }

    async fn list_addresses(&self, link: &LinkAttrs, family: AddressFamily) -> Result<Vec<IpAddr>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .addrs
            .get(&(link.index, family))
            .cloned()
            .unwrap_or_default())
    }
}

/// Link attributes for a running interface
pub fn running(index: u32, name: &str) -> LinkAttrs {
    LinkAttrs::new(index, name, IFF_UP | IFF_RUNNING)
}

/// Link attributes for an admin-up interface without carrier
pub fn no_carrier(index: u32, name: &str) -> LinkAttrs {
    LinkAttrs::new(index, name, IFF_UP)
}

/// Parse an address literal
pub fn ip(addr: &str) -> IpAddr {
    addr.parse().expect("valid address")
}

/// A running monitor and everything a test needs to drive and observe it
pub struct Harness {
    pub events: EventSenders,
    pub rx: mpsc::Receiver<MonitorEvent>,
    pub shutdown: Option<oneshot::Sender<()>>,
    pub handle: JoinHandle<(InterfaceMonitor, ifmon_core::Result<()>)>,
}

impl Harness {
    /// Start a monitor with a controlled event source and the given listing
    pub fn start(listing: ScriptedListing, config: MonitorConfig) -> Self {
        let (source, events) = ControlledEventSource::new();
        let (notifier, rx) = ChannelNotifier::from_config(&config);
        let mut monitor = InterfaceMonitor::new(
            Box::new(source),
            Box::new(listing),
            Box::new(notifier),
            config,
        )
        .expect("monitor construction succeeds");

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            let result = monitor.run_with_shutdown(Some(shutdown_rx)).await;
            (monitor, result)
        });

        Self {
            events,
            rx,
            shutdown: Some(shutdown_tx),
            handle,
        }
    }

    /// Wait for the next monitor event
    pub async fn next_event(&mut self) -> MonitorEvent {
        self.next_event_within(Duration::from_secs(2)).await
    }

    /// Wait for the next monitor event, up to `limit`
    pub async fn next_event_within(&mut self, limit: Duration) -> MonitorEvent {
        tokio::time::timeout(limit, self.rx.recv())
            .await
            .expect("monitor event within the time limit")
            .expect("monitor event channel open")
    }

    /// Wait for the next event that isn't a resync report
    pub async fn next_notification(&mut self) -> MonitorEvent {
        loop {
            match self.next_event().await {
                MonitorEvent::ResyncCompleted(_) => continue,
                event => return event,
            }
        }
    }

    /// Skip events up to and including `Started`
    pub async fn wait_started(&mut self) {
        while self.next_event().await != MonitorEvent::Started {}
    }

    /// Stop the monitor and return it with its result
    pub async fn stop(mut self) -> (InterfaceMonitor, ifmon_core::Result<()>) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("monitor stops within 5 seconds")
            .expect("monitor task completes")
    }
}
