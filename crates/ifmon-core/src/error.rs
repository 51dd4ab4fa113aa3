//! Error types for the interface monitor
//!
//! Every error here is unrecoverable from the monitor's point of view:
//! the event loop stops and reports it to its owner. Per-record anomalies
//! (missing attributes, addresses for an unknown interface) are not errors;
//! they are logged and dropped by the reducer.

use thiserror::Error;

use crate::traits::AddressFamily;

/// Result type alias for monitor operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the interface monitor
#[derive(Error, Debug)]
pub enum Error {
    /// The kernel event subscription could not be established
    #[error("Subscription error: {0}")]
    Subscription(String),

    /// Listing all interfaces failed
    #[error("Listing error: {0}")]
    Listing(String),

    /// Listing the addresses of one interface failed
    #[error("Address query failed for ifindex {index} ({family}): {message}")]
    AddressQuery {
        /// Interface index being queried
        index: u32,
        /// Address family being queried
        family: AddressFamily,
        /// Error message
        message: String,
    },

    /// An update stream ended; no further events can be observed
    #[error("Update channel closed: {0}")]
    ChannelClosed(&'static str),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a subscription error
    pub fn subscription(msg: impl Into<String>) -> Self {
        Self::Subscription(msg.into())
    }

    /// Create a listing error
    pub fn listing(msg: impl Into<String>) -> Self {
        Self::Listing(msg.into())
    }

    /// Create an address query error
    pub fn address_query(index: u32, family: AddressFamily, message: impl Into<String>) -> Self {
        Self::AddressQuery {
            index,
            family,
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
