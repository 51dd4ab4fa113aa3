//! Configuration types for the interface monitor
//!
//! This module defines all configuration structures used throughout the crate.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Main monitor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Interval between periodic resyncs (in seconds)
    ///
    /// The ordering of the event subscription relative to listing calls is
    /// not guaranteed, so the periodic resync is what makes the monitor
    /// correct, not just fresh.
    #[serde(default = "default_resync_interval_secs")]
    pub resync_interval_secs: u64,

    /// What to do when a resync finds that an up interface has vanished
    #[serde(default)]
    pub removal_policy: ResyncRemovalPolicy,

    /// Capacity of the channel used by `ChannelNotifier`
    ///
    /// When full, new events are dropped (with a warning log).
    ///
    /// Default: 1000 events
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl MonitorConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self {
            resync_interval_secs: default_resync_interval_secs(),
            removal_policy: ResyncRemovalPolicy::default(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }

    /// Parse a configuration from JSON, filling in defaults
    pub fn from_json_str(json: &str) -> Result<Self, crate::Error> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Set the resync interval
    pub fn with_resync_interval_secs(mut self, secs: u64) -> Self {
        self.resync_interval_secs = secs;
        self
    }

    /// Set the resync removal policy
    pub fn with_removal_policy(mut self, policy: ResyncRemovalPolicy) -> Self {
        self.removal_policy = policy;
        self
    }

    /// Resync interval as a `Duration`
    pub fn resync_interval(&self) -> Duration {
        Duration::from_secs(self.resync_interval_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.resync_interval_secs == 0 {
            return Err(crate::Error::config("Resync interval must be > 0"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Notification behavior for interfaces that vanish between resyncs
///
/// An interface can disappear without the kernel event stream ever
/// reporting its removal. The next resync evicts its name from the up-set;
/// this policy decides whether the consumer hears about it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResyncRemovalPolicy {
    /// Evict silently
    #[default]
    Silent,
    /// Evict and emit a `Down` notification
    NotifyDown,
}

impl std::str::FromStr for ResyncRemovalPolicy {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "silent" => Ok(ResyncRemovalPolicy::Silent),
            "notify_down" | "down" => Ok(ResyncRemovalPolicy::NotifyDown),
            other => Err(crate::Error::config(format!(
                "Unknown removal policy '{}'. Valid: silent, notify_down",
                other
            ))),
        }
    }
}

fn default_resync_interval_secs() -> u64 {
    10
}

fn default_event_channel_capacity() -> usize {
    1000
}
