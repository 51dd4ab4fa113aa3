// # ifmon-core
//
// Core library for the ifmon network interface monitor.
//
// ## Architecture Overview
//
// This library tracks the host's interfaces and their addresses and emits
// edge-triggered notifications:
// - **EventSource**: Trait for subscribing to kernel link/address updates
// - **ListingSource**: Trait for full on-demand listings (resync)
// - **Notifier**: Trait for consumers of up/down and address notifications
// - **InterfaceStore**: The in-memory reconciled state
// - **InterfaceMonitor**: Event loop that merges updates and resyncs
//
// ## Design Principles
//
// 1. **Edge-Triggered**: Consumers hear about transitions, never repeats
// 2. **Single Owner**: All state lives on one dispatch task, no locks
// 3. **Resync Backstop**: Periodic full listings correct missed events
// 4. **Fail-Fast**: Setup, listing and channel failures are fatal
// 5. **Library-First**: The daemon is a thin wrapper over this crate

pub mod config;
pub mod engine;
pub mod error;
pub mod notify;
pub mod state;
pub mod traits;

// Re-export core types for convenience
pub use config::{MonitorConfig, ResyncRemovalPolicy};
pub use engine::{InterfaceMonitor, InterfaceTracker, MonitorEvent, ResyncReport};
pub use error::{Error, Result};
pub use notify::{CallbackNotifier, ChannelNotifier, LoggingNotifier};
pub use state::InterfaceStore;
pub use traits::{EventSource, InterfaceState, ListingSource, Notifier};
