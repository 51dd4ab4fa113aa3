//! Contract Test: Resync Convergence
//!
//! This test verifies that the periodic full listing corrects whatever the
//! event stream missed.
//!
//! Constraints verified:
//! - The initial resync announces every existing interface before the
//!   event loop starts
//! - The periodic resync evicts interfaces that vanished without a
//!   removal event, silently or with Down depending on policy
//! - The periodic resync picks up state changes the event stream missed
//! - Every resync re-announces every listed interface's addresses
//! - Updates queued while the initial resync runs are applied after it,
//!   on top of the listed state
//!
//! Time is paused: the resync timer fires as soon as the monitor is idle.

mod common;

use common::*;
use ifmon_core::engine::MonitorEvent;
use ifmon_core::traits::{AddrUpdate, AddressFamily, InterfaceState, LinkAttrs, LinkUpdate};
use ifmon_core::{MonitorConfig, ResyncRemovalPolicy};
use std::collections::HashSet;
use std::time::Duration;

const RESYNC_WAIT: Duration = Duration::from_secs(60);

fn state(name: &str, state: InterfaceState) -> MonitorEvent {
    MonitorEvent::StateChanged {
        name: name.to_string(),
        state,
    }
}

fn addrs(name: &str, list: &[&str]) -> MonitorEvent {
    MonitorEvent::AddressesChanged {
        name: name.to_string(),
        addresses: list.iter().map(|a| a.to_string()).collect(),
    }
}

async fn next_resync_events(harness: &mut Harness) -> Vec<MonitorEvent> {
    let mut events = Vec::new();
    loop {
        match harness.next_event_within(RESYNC_WAIT).await {
            MonitorEvent::ResyncCompleted(report) => {
                events.push(MonitorEvent::ResyncCompleted(report));
                return events;
            }
            event => events.push(event),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn initial_resync_announces_existing_interfaces() {
    let listing = ScriptedListing::new()
        .with_link(running(1, "lo"))
        .with_addr(1, AddressFamily::V4, "127.0.0.1")
        .with_addr(1, AddressFamily::V6, "::1")
        .with_link(no_carrier(2, "eth0"));
    let mut harness = Harness::start(listing.clone(), MonitorConfig::default());

    assert_eq!(harness.next_event().await, state("lo", InterfaceState::Up));
    assert_eq!(harness.next_event().await, addrs("lo", &["127.0.0.1", "::1"]));
    assert_eq!(harness.next_event().await, addrs("eth0", &[]));
    assert!(matches!(
        harness.next_event().await,
        MonitorEvent::ResyncCompleted(ref report) if report.interfaces_seen == 2
    ));
    assert_eq!(harness.next_event().await, MonitorEvent::Started);
    assert_eq!(listing.list_call_count(), 1);

    let (_, result) = harness.stop().await;
    assert!(result.is_ok());
}

#[tokio::test(start_paused = true)]
async fn updates_queued_during_initial_resync_apply_after_it() {
    let listing = ScriptedListing::new().with_link(running(5, "eth0"));
    let mut harness = Harness::start(listing, MonitorConfig::default());

    // Queued before the monitor task has run at all.
    harness.events.addr(AddrUpdate::added(5, ip("10.0.0.1")));
    harness.events.link(LinkUpdate::removed_link(LinkAttrs::new(5, "eth0", 0)));

    assert_eq!(harness.next_event().await, state("eth0", InterfaceState::Up));
    assert_eq!(harness.next_event().await, addrs("eth0", &[]));
    assert!(matches!(harness.next_event().await, MonitorEvent::ResyncCompleted(_)));
    assert_eq!(harness.next_event().await, MonitorEvent::Started);

    // The two streams are not ordered against each other, so the address
    // may or may not land before the removal.
    let mut event = harness.next_event().await;
    if event == addrs("eth0", &["10.0.0.1"]) {
        event = harness.next_event().await;
    }
    assert_eq!(event, state("eth0", InterfaceState::Down));

    let (monitor, result) = harness.stop().await;
    assert!(result.is_ok());
    assert!(!monitor.store().knows_index(5));
    assert!(monitor.store().up_set().is_empty());
}

async fn vanished_interface_scenario(policy: ResyncRemovalPolicy) -> (Vec<MonitorEvent>, HashSet<String>) {
    let listing = ScriptedListing::new()
        .with_link(running(1, "eth0"))
        .with_link(running(7, "ppp0"));
    let config = MonitorConfig::default().with_removal_policy(policy);
    let mut harness = Harness::start(listing.clone(), config);
    harness.wait_started().await;

    // ppp0 goes away without a removal event; eth1 appears without carrier.
    listing.set_links(vec![running(1, "eth0"), no_carrier(2, "eth1")]);
    let events = next_resync_events(&mut harness).await;

    let (monitor, result) = harness.stop().await;
    assert!(result.is_ok());
    (events, monitor.store().up_set())
}

#[tokio::test(start_paused = true)]
async fn periodic_resync_evicts_vanished_interface_silently() {
    let (events, up_set) = vanished_interface_scenario(ResyncRemovalPolicy::Silent).await;

    assert_eq!(up_set, HashSet::from(["eth0".to_string()]));
    assert_eq!(events.len(), 3);
    assert_eq!(events[0], addrs("eth0", &[]));
    assert_eq!(events[1], addrs("eth1", &[]));
    assert!(matches!(
        events[2],
        MonitorEvent::ResyncCompleted(ref report) if report.removed == vec!["ppp0".to_string()]
    ));
}

#[tokio::test(start_paused = true)]
async fn periodic_resync_evicts_vanished_interface_with_down() {
    let (events, up_set) = vanished_interface_scenario(ResyncRemovalPolicy::NotifyDown).await;

    assert_eq!(up_set, HashSet::from(["eth0".to_string()]));
    assert_eq!(events.len(), 4);
    assert_eq!(events[2], state("ppp0", InterfaceState::Down));
    assert!(matches!(events[3], MonitorEvent::ResyncCompleted(_)));
}

#[tokio::test(start_paused = true)]
async fn periodic_resync_recovers_missed_up() {
    let listing = ScriptedListing::new().with_link(no_carrier(4, "eth0"));
    let mut harness = Harness::start(listing.clone(), MonitorConfig::default());
    harness.wait_started().await;

    // Carrier came up, but the event stream never said so.
    listing.set_links(vec![running(4, "eth0")]);
    let events = next_resync_events(&mut harness).await;

    assert_eq!(events[0], state("eth0", InterfaceState::Up));
    assert_eq!(events[1], addrs("eth0", &[]));
    assert_eq!(listing.list_call_count(), 2);

    let (monitor, result) = harness.stop().await;
    assert!(result.is_ok());
    assert!(monitor.store().is_up("eth0"));
}

#[tokio::test(start_paused = true)]
async fn resync_interval_is_configurable() {
    let listing = ScriptedListing::new();
    let config = MonitorConfig::default().with_resync_interval_secs(30);
    let mut harness = Harness::start(listing.clone(), config);
    harness.wait_started().await;

    let started = tokio::time::Instant::now();
    next_resync_events(&mut harness).await;
    assert!(started.elapsed() >= Duration::from_secs(30));
    assert_eq!(listing.list_call_count(), 2);

    let (_, result) = harness.stop().await;
    assert!(result.is_ok());
}
