//! Resync reconciler
//!
//! A resync lists every interface and its addresses, feeds the listing
//! through the reducer as if each listed interface had just been reported
//! to exist, and then evicts up-set names that the listing no longer shows.
//! The eviction covers interfaces that vanished without the event stream
//! ever reporting a removal.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::reducer::InterfaceTracker;
use crate::config::ResyncRemovalPolicy;
use crate::error::Result;
use crate::traits::{AddressFamily, InterfaceState, ListingSource};

/// Outcome of one resync
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResyncReport {
    /// Listed interfaces that were reconciled
    pub interfaces_seen: usize,
    /// Listed entries skipped for missing attributes
    pub skipped: usize,
    /// Up-set names evicted because the listing no longer showed them
    pub removed: Vec<String>,
    /// When the resync finished
    pub finished_at: DateTime<Utc>,
}

impl InterfaceTracker {
    /// Reconcile the store against a full listing
    ///
    /// Every listed interface's address list is replaced wholesale and
    /// re-announced, whether or not it changed.
    ///
    /// # Failure
    ///
    /// A failed listing or address query aborts the resync and returns the
    /// error. Entries processed before the failure keep their updates.
    pub async fn resync(&mut self, listing: &dyn ListingSource) -> Result<ResyncReport> {
        debug!("Resyncing interface state");
        let links = listing
            .list_links()
            .await
            .inspect_err(|e| warn!(error = %e, "Interface list operation failed"))?;

        let mut current: HashSet<String> = HashSet::with_capacity(links.len());
        let mut interfaces_seen = 0;
        let mut skipped = 0;

        for link in links {
            let Some(attrs) = link.attrs else {
                warn!("Missing attributes on listed interface");
                skipped += 1;
                continue;
            };
            current.insert(attrs.name.clone());
            self.apply_link_observation(true, &attrs);

            let mut addrs: Vec<String> = Vec::new();
            for family in AddressFamily::ALL {
                let listed = listing
                    .list_addresses(&attrs, family)
                    .await
                    .inspect_err(|e| warn!(error = %e, iface = %attrs.name, "Address list operation failed"))?;
                for ip in listed {
                    let addr = ip.to_string();
                    if !addrs.contains(&addr) {
                        addrs.push(addr);
                    }
                }
            }
            self.store.replace_addresses(attrs.index, addrs);
            self.notify_addresses(attrs.index);
            interfaces_seen += 1;
        }

        let mut removed = Vec::new();
        self.store.retain_up(|name| {
            if current.contains(name) {
                return true;
            }
            info!(iface = name, "Spotted interface removal on resync");
            removed.push(name.to_string());
            false
        });
        removed.sort();

        if self.removal_policy == ResyncRemovalPolicy::NotifyDown {
            for name in &removed {
                self.notifier.on_state_change(name, InterfaceState::Down);
            }
        }

        let report = ResyncReport {
            interfaces_seen,
            skipped,
            removed,
            finished_at: Utc::now(),
        };
        debug!(
            interfaces = report.interfaces_seen,
            skipped = report.skipped,
            removed = report.removed.len(),
            "Resync complete"
        );
        self.notifier.on_resync_complete(&report);
        Ok(report)
    }
}
