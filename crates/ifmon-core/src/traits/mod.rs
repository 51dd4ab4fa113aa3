//! Core traits for the interface monitor
//!
//! This module defines the narrow interfaces to the monitor's collaborators.
//!
//! - [`EventSource`]: Subscribe to kernel link and address changes
//! - [`ListingSource`]: List interfaces and addresses on demand
//! - [`Notifier`]: Receive edge-triggered notifications

pub mod event_source;
pub mod listing_source;
pub mod notifier;

pub use event_source::{
    AddrChange, AddrUpdate, AddrUpdateStream, EventSource, IFF_RUNNING, IFF_UP, LinkAttrs,
    LinkChange, LinkUpdate, LinkUpdateStream, Subscription,
};
pub use listing_source::{AddressFamily, ListedLink, ListingSource};
pub use notifier::{InterfaceState, Notifier};
