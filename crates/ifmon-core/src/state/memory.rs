// # Memory Interface Store
//
// In-memory store of the monitor's view of the host's interfaces.
//
// ## Purpose
//
// Holds three maps and nothing else:
// - interface index → name
// - interface index → address list
// - the set of interface names currently believed to be up
//
// ## Crash Behavior
//
// - All state is lost on restart
// - The first resync after a restart re-announces every interface, so
//   consumers converge without any persisted state
//
// ## Ownership
//
// The store has exactly one owner, the monitor's dispatch task. It takes
// no locks; if mutations ever come from more than one task they must be
// funneled through a single channel rather than wrapped in a lock, or the
// edge detection in the reducer stops being sound.

use std::collections::{HashMap, HashSet};

/// In-memory interface store
///
/// A passive data holder: it performs no validation beyond what its
/// callers already guarantee.
#[derive(Debug, Clone, Default)]
pub struct InterfaceStore {
    names: HashMap<u32, String>,
    addrs: HashMap<u32, Vec<String>>,
    up: HashSet<String>,
}

impl InterfaceStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Name recorded for an index, if the interface exists
    pub fn name_of(&self, index: u32) -> Option<&str> {
        self.names.get(&index).map(String::as_str)
    }

    /// Whether an index is present in the name map
    pub fn knows_index(&self, index: u32) -> bool {
        self.names.contains_key(&index)
    }

    /// Record the name for an index
    pub fn set_name(&mut self, index: u32, name: impl Into<String>) {
        self.names.insert(index, name.into());
    }

    /// Forget the name for an index
    ///
    /// The index's address list is left in place.
    pub fn clear_name(&mut self, index: u32) {
        self.names.remove(&index);
    }

    /// Number of interfaces in the name map
    pub fn interface_count(&self) -> usize {
        self.names.len()
    }

    /// Addresses recorded for an index (empty if none)
    pub fn addresses_of(&self, index: u32) -> &[String] {
        self.addrs.get(&index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether an address is recorded for an index
    pub fn has_address(&self, index: u32, addr: &str) -> bool {
        self.addresses_of(index).iter().any(|known| known == addr)
    }

    /// Append an address to an index's list
    ///
    /// Callers check `has_address` first; this does not deduplicate.
    pub fn add_address(&mut self, index: u32, addr: impl Into<String>) {
        self.addrs.entry(index).or_default().push(addr.into());
    }

    /// Remove an address from an index's list
    ///
    /// The last address takes the removed one's slot, so the order of the
    /// remaining addresses is not preserved. Returns whether it was present.
    pub fn remove_address(&mut self, index: u32, addr: &str) -> bool {
        let Some(list) = self.addrs.get_mut(&index) else {
            return false;
        };
        match list.iter().position(|known| known == addr) {
            Some(pos) => {
                list.swap_remove(pos);
                true
            }
            None => false,
        }
    }

    /// Replace an index's whole address list
    pub fn replace_addresses(&mut self, index: u32, addrs: Vec<String>) {
        self.addrs.insert(index, addrs);
    }

    /// Whether a name is in the up-set
    pub fn is_up(&self, name: &str) -> bool {
        self.up.contains(name)
    }

    /// Add a name to the up-set
    pub fn mark_up(&mut self, name: impl Into<String>) {
        self.up.insert(name.into());
    }

    /// Discard a name from the up-set
    pub fn mark_down(&mut self, name: &str) {
        self.up.remove(name);
    }

    /// Names currently in the up-set
    pub fn up_names(&self) -> impl Iterator<Item = &str> {
        self.up.iter().map(String::as_str)
    }

    /// Snapshot of the up-set
    pub fn up_set(&self) -> HashSet<String> {
        self.up.clone()
    }

    /// Keep only the up-set members for which `keep` returns true
    pub fn retain_up(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.up.retain(|name| keep(name));
    }
}
