// # Notifier Implementations
//
// This module provides implementations of the Notifier trait for
// different kinds of consumers.

pub mod callback;
pub mod channel;
pub mod logging;

pub use callback::CallbackNotifier;
pub use channel::ChannelNotifier;
pub use logging::LoggingNotifier;
