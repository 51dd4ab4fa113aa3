// # Callback Notifier
//
// Adapts two plain closures, one for state changes and one for address
// changes, to the `Notifier` trait.

use crate::traits::{InterfaceState, Notifier};

/// Notifier backed by two closures
///
/// # Example
///
/// ```rust
/// use ifmon_core::notify::CallbackNotifier;
/// use ifmon_core::traits::{InterfaceState, Notifier};
///
/// let mut notifier = CallbackNotifier::new(
///     |name: &str, state: InterfaceState| println!("{name} is {state}"),
///     |name: &str, addrs: &[String]| println!("{name} has {addrs:?}"),
/// );
/// notifier.on_state_change("eth0", InterfaceState::Up);
/// ```
pub struct CallbackNotifier<S, A> {
    on_state: S,
    on_addrs: A,
}

impl<S, A> CallbackNotifier<S, A>
where
    S: FnMut(&str, InterfaceState) + Send,
    A: FnMut(&str, &[String]) + Send,
{
    /// Create a notifier from a state callback and an address callback
    pub fn new(on_state: S, on_addrs: A) -> Self {
        Self { on_state, on_addrs }
    }
}

impl<S, A> Notifier for CallbackNotifier<S, A>
where
    S: FnMut(&str, InterfaceState) + Send,
    A: FnMut(&str, &[String]) + Send,
{
    fn on_state_change(&mut self, name: &str, state: InterfaceState) {
        (self.on_state)(name, state)
    }

    fn on_addresses_change(&mut self, name: &str, addresses: &[String]) {
        (self.on_addrs)(name, addresses)
    }
}
