//! Update reducer
//!
//! Turns single raw link and address observations into store updates and,
//! only when something user-visible changed, exactly one notification.

use tracing::{debug, info, warn};

use crate::config::ResyncRemovalPolicy;
use crate::state::InterfaceStore;
use crate::traits::{AddrUpdate, InterfaceState, LinkAttrs, LinkUpdate, Notifier};

/// Reconciled interface state plus the notifier it reports to
///
/// The reducer operations live here; the resync reconciler is implemented
/// on the same type in [`super::resync`].
pub struct InterfaceTracker {
    pub(super) store: InterfaceStore,
    pub(super) notifier: Box<dyn Notifier>,
    pub(super) removal_policy: ResyncRemovalPolicy,
}

impl InterfaceTracker {
    /// Create a tracker with an empty store
    pub fn new(notifier: Box<dyn Notifier>, removal_policy: ResyncRemovalPolicy) -> Self {
        Self {
            store: InterfaceStore::new(),
            notifier,
            removal_policy,
        }
    }

    /// The current reconciled state
    pub fn store(&self) -> &InterfaceStore {
        &self.store
    }

    /// The notifier, for lifecycle notifications
    pub fn notifier_mut(&mut self) -> &mut dyn Notifier {
        self.notifier.as_mut()
    }

    /// Handle a raw link update from the event stream
    ///
    /// Records without identifying attributes are logged and dropped.
    pub fn handle_link_update(&mut self, update: LinkUpdate) {
        let exists = update.exists();
        match update.attrs {
            Some(attrs) => self.apply_link_observation(exists, &attrs),
            None => warn!(change = ?update.change, "Missing attributes on link update"),
        }
    }

    /// Handle a raw address update from the event stream
    pub fn handle_addr_update(&mut self, update: AddrUpdate) {
        let addr = update.address.to_string();
        let exists = update.exists();
        info!(ifindex = update.index, addr = %addr, exists, "Address update");
        self.apply_address_observation(update.index, &addr, exists);
    }

    /// Store a link observation and notify on an up/down edge
    pub fn apply_link_observation(&mut self, exists: bool, attrs: &LinkAttrs) {
        if exists {
            self.store.set_name(attrs.index, attrs.name.as_str());
        } else {
            self.store.clear_name(attrs.index);
        }

        let is_up = exists && attrs.is_running();
        let was_up = self.store.is_up(&attrs.name);

        if is_up && !was_up {
            debug!(iface = %attrs.name, "Interface now up");
            self.store.mark_up(attrs.name.as_str());
            self.notifier.on_state_change(&attrs.name, InterfaceState::Up);
        } else if was_up && !is_up {
            debug!(iface = %attrs.name, "Interface now down");
            self.store.mark_down(&attrs.name);
            self.notifier.on_state_change(&attrs.name, InterfaceState::Down);
        }
    }

    /// Store an address observation and notify if the address set changed
    pub fn apply_address_observation(&mut self, index: u32, addr: &str, now_exists: bool) {
        if !self.store.knows_index(index) {
            warn!(ifindex = index, addr, "No known interface with this index");
            return;
        }

        let known = self.store.has_address(index, addr);
        if now_exists && !known {
            self.store.add_address(index, addr);
            self.notify_addresses(index);
        } else if !now_exists && known {
            self.store.remove_address(index, addr);
            self.notify_addresses(index);
        }
    }

    pub(super) fn notify_addresses(&mut self, index: u32) {
        if let Some(name) = self.store.name_of(index) {
            self.notifier
                .on_addresses_change(name, self.store.addresses_of(index));
        }
    }
}
