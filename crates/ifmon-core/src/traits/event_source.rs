// # Event Source Trait
//
// Defines the interface for subscribing to kernel link and address changes.
//
// ## Implementations
//
// - Netlink-based (Linux): `ifmon-netlink` crate
//
// ## Usage
//
// ```rust,ignore
// use ifmon_core::EventSource;
// use tokio_stream::StreamExt;
//
// #[tokio::main]
// async fn main() -> ifmon_core::Result<()> {
//     let source = /* EventSource implementation */;
//
//     let mut subscription = source.subscribe().await?;
//     while let Some(update) = subscription.links.next().await {
//         println!("link changed: {:?}", update);
//     }
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::IpAddr;
use std::pin::Pin;
use tokio_stream::Stream;

/// Kernel `IFF_RUNNING` flag: the interface is operationally up
pub const IFF_RUNNING: u32 = 0x40;

/// Kernel `IFF_UP` flag: the interface is administratively enabled
pub const IFF_UP: u32 = 0x1;

/// Identifying attributes of a link, as reported by the kernel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkAttrs {
    /// Kernel interface index
    pub index: u32,
    /// Interface name (e.g. "eth0"); may be reused after deletion
    pub name: String,
    /// Raw `IFF_*` flags
    pub raw_flags: u32,
}

impl LinkAttrs {
    /// Create a new set of link attributes
    pub fn new(index: u32, name: impl Into<String>, raw_flags: u32) -> Self {
        Self {
            index,
            name: name.into(),
            raw_flags,
        }
    }

    /// Whether the interface is operationally up (carrying traffic)
    ///
    /// This is the `IFF_RUNNING` flag. `IFF_UP` only carries the admin
    /// state, which doesn't tell us whether the interface can be used.
    pub fn is_running(&self) -> bool {
        self.raw_flags & IFF_RUNNING != 0
    }
}

/// Whether a link update reports the link as present or gone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkChange {
    /// `RTM_NEWLINK`: the link exists (new or changed)
    New,
    /// `RTM_DELLINK`: the link was removed
    Removed,
}

/// A link change record from the event stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkUpdate {
    /// New or removed
    pub change: LinkChange,
    /// Identifying attributes, `None` when the record couldn't be decoded
    pub attrs: Option<LinkAttrs>,
}

impl LinkUpdate {
    /// A link that exists with the given attributes
    pub fn new_link(attrs: LinkAttrs) -> Self {
        Self {
            change: LinkChange::New,
            attrs: Some(attrs),
        }
    }

    /// A link that was removed
    pub fn removed_link(attrs: LinkAttrs) -> Self {
        Self {
            change: LinkChange::Removed,
            attrs: Some(attrs),
        }
    }

    /// Whether this update reports the link as existing
    pub fn exists(&self) -> bool {
        self.change == LinkChange::New
    }
}

/// Whether an address update reports the address as added or removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddrChange {
    /// `RTM_NEWADDR`
    New,
    /// `RTM_DELADDR`
    Removed,
}

/// An address change record from the event stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddrUpdate {
    /// Index of the interface the address belongs to
    pub index: u32,
    /// The address itself
    pub address: IpAddr,
    /// Added or removed
    pub change: AddrChange,
}

impl AddrUpdate {
    /// An address that was added to an interface
    pub fn added(index: u32, address: IpAddr) -> Self {
        Self {
            index,
            address,
            change: AddrChange::New,
        }
    }

    /// An address that was removed from an interface
    pub fn removed(index: u32, address: IpAddr) -> Self {
        Self {
            index,
            address,
            change: AddrChange::Removed,
        }
    }

    /// Whether the address now exists on the interface
    pub fn exists(&self) -> bool {
        self.change == AddrChange::New
    }
}

/// Boxed stream of link updates
pub type LinkUpdateStream = Pin<Box<dyn Stream<Item = LinkUpdate> + Send + 'static>>;

/// Boxed stream of address updates
pub type AddrUpdateStream = Pin<Box<dyn Stream<Item = AddrUpdate> + Send + 'static>>;

/// The two live update streams produced by a subscription
///
/// Both streams are unbounded and non-restartable. Either one ending means
/// no further events can ever be observed.
pub struct Subscription {
    /// Link change records
    pub links: LinkUpdateStream,
    /// Address change records
    pub addrs: AddrUpdateStream,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").finish_non_exhaustive()
    }
}

/// Trait for kernel event source implementations
///
/// An event source is an **observer** only: it decodes kernel messages
/// into typed records and forwards them. It must not keep interface state
/// or decide what is a transition; that belongs to the monitor.
///
/// # Failure
///
/// `subscribe()` must fail fast if the underlying mechanism can't be set up.
/// The monitor treats that as fatal and never retries.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Establish the link and address subscriptions
    ///
    /// # Returns
    ///
    /// - `Ok(Subscription)`: both streams are live
    /// - `Err(Error)`: the subscription couldn't be established
    async fn subscribe(&self) -> Result<Subscription, crate::Error>;
}
