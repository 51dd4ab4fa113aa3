// # Listing Source Trait
//
// Defines the interface for on-demand full listings of interfaces and
// their addresses. The monitor uses it for resyncs.

use async_trait::async_trait;
use std::fmt;
use std::net::IpAddr;

use super::event_source::LinkAttrs;

/// Address family for address queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    V4,
    V6,
}

impl AddressFamily {
    /// Both families, in the order resync queries them
    pub const ALL: [AddressFamily; 2] = [AddressFamily::V4, AddressFamily::V6];
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::V4 => f.write_str("v4"),
            AddressFamily::V6 => f.write_str("v6"),
        }
    }
}

/// One entry of a full interface listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListedLink {
    /// Identifying attributes, `None` when the entry couldn't be decoded
    pub attrs: Option<LinkAttrs>,
}

impl From<LinkAttrs> for ListedLink {
    fn from(attrs: LinkAttrs) -> Self {
        Self { attrs: Some(attrs) }
    }
}

/// Trait for listing source implementations
///
/// # Failure
///
/// Any error aborts the resync in progress. The monitor treats it as fatal.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// List every interface currently known to the kernel
    async fn list_links(&self) -> Result<Vec<ListedLink>, crate::Error>;

    /// List the addresses of one interface for one family
    async fn list_addresses(
        &self,
        link: &LinkAttrs,
        family: AddressFamily,
    ) -> Result<Vec<IpAddr>, crate::Error>;
}
