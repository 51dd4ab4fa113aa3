// Fallback sources for targets without netlink.

use async_trait::async_trait;
use ifmon_core::traits::{AddressFamily, EventSource, LinkAttrs, ListedLink, ListingSource, Subscription};
use ifmon_core::{Error, Result};
use std::net::IpAddr;

const UNSUPPORTED: &str = "Netlink is only supported on Linux";

/// Netlink event source (unavailable on this platform)
#[derive(Debug, Default)]
pub struct NetlinkEventSource;

impl NetlinkEventSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl EventSource for NetlinkEventSource {
    async fn subscribe(&self) -> Result<Subscription> {
        Err(Error::subscription(UNSUPPORTED))
    }
}

/// Netlink listing source (unavailable on this platform)
#[derive(Debug, Default)]
pub struct NetlinkListingSource;

impl NetlinkListingSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ListingSource for NetlinkListingSource {
    async fn list_links(&self) -> Result<Vec<ListedLink>> {
        Err(Error::listing(UNSUPPORTED))
    }

    async fn list_addresses(&self, link: &LinkAttrs, family: AddressFamily) -> Result<Vec<IpAddr>> {
        Err(Error::address_query(link.index, family, UNSUPPORTED))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sources_unsupported() {
        assert!(matches!(
            NetlinkEventSource::new().subscribe().await,
            Err(Error::Subscription(_))
        ));
        assert!(matches!(
            NetlinkListingSource::new().list_links().await,
            Err(Error::Listing(_))
        ));
    }
}
