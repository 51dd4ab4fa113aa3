// # Interface State
//
// This module provides the monitor's state store. Only the in-memory
// implementation exists: the monitor never persists state across restarts.

pub mod memory;

pub use memory::InterfaceStore;
