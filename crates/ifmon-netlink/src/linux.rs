use async_trait::async_trait;
use ifmon_core::traits::{
    AddrUpdate, AddressFamily, EventSource, LinkAttrs, LinkUpdate, ListedLink, ListingSource,
    Subscription,
};
use ifmon_core::{Error, Result};
use netlink_packet_core::NetlinkPayload;
use netlink_packet_route::RtnlMessage;
use netlink_packet_route::constants::{RTNLGRP_IPV4_IFADDR, RTNLGRP_IPV6_IFADDR, RTNLGRP_LINK};
use netlink_sys::protocols::NETLINK_ROUTE;
use netlink_sys::{AsyncSocket, AsyncSocketExt, SocketAddr, TokioSocket};
use std::io;
use std::net::IpAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, error, warn};

use crate::codec::{self, KernelUpdate};

/// Multicast groups the event source joins
const UPDATE_GROUPS: [u32; 3] = [RTNLGRP_LINK, RTNLGRP_IPV4_IFADDR, RTNLGRP_IPV6_IFADDR];

/// EventSource backed by rtnetlink multicast groups
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
        let socket = multicast_socket()
            .map_err(|e| Error::subscription(format!("Failed to open netlink socket: {}", e)))?;

        let (link_tx, link_rx) = mpsc::unbounded_channel();
        let (addr_tx, addr_rx) = mpsc::unbounded_channel();
        tokio::spawn(read_updates(socket, link_tx, addr_tx));

        Ok(Subscription {
            links: Box::pin(UnboundedReceiverStream::new(link_rx)),
            addrs: Box::pin(UnboundedReceiverStream::new(addr_rx)),
        })
    }
}

fn multicast_socket() -> io::Result<TokioSocket> {
    let mut socket = TokioSocket::new(NETLINK_ROUTE)?;
    socket.socket_mut().bind_auto()?;
    for group in UPDATE_GROUPS {
        socket.socket_mut().add_membership(group)?;
    }
    Ok(socket)
}

/// Forward decoded updates until the socket fails or nobody listens
async fn read_updates(
    socket: TokioSocket,
    links: mpsc::UnboundedSender<LinkUpdate>,
    addrs: mpsc::UnboundedSender<AddrUpdate>,
) {
    loop {
        let received = tokio::select! {
            received = socket.recv_from_full() => received,
            _ = links.closed() => break,
            _ = addrs.closed() => break,
        };

        let datagram = match received {
            Ok((datagram, _)) => datagram,
            Err(e) => {
                error!(error = %e, "Netlink socket failed, closing update streams");
                break;
            }
        };

        let messages = match codec::parse_datagram(&datagram) {
            Ok(messages) => messages,
            Err(e) => {
                warn!(error = %e, "Skipping undecodable netlink datagram");
                continue;
            }
        };

        for message in messages {
            let NetlinkPayload::InnerMessage(inner) = message.payload else {
                continue;
            };
            let sent = match codec::decode_update(inner) {
                Some(KernelUpdate::Link(update)) => links.send(update).is_ok(),
                Some(KernelUpdate::Addr(update)) => addrs.send(update).is_ok(),
                None => true,
            };
            if !sent {
                debug!("Update stream receiver dropped");
                return;
            }
        }
    }

    debug!("Netlink reader stopped");
}

/// ListingSource backed by rtnetlink dumps
#[derive(Debug, Default)]
pub struct NetlinkListingSource {
    sequence: AtomicU32,
}

impl NetlinkListingSource {
    pub fn new() -> Self {
        Self::default()
    }

    async fn dump(&self, request: RtnlMessage) -> io::Result<Vec<RtnlMessage>> {
        let mut socket = TokioSocket::new(NETLINK_ROUTE)?;
        socket.socket_mut().bind_auto()?;
        socket.socket_ref().connect(&SocketAddr::new(0, 0))?;

        let sequence_number = self.sequence.fetch_add(1, Ordering::Relaxed).wrapping_add(1);
        socket.send(&codec::dump_request(request, sequence_number)).await?;

        let mut replies = Vec::new();
        loop {
            let (datagram, _) = socket.recv_from_full().await?;
            if codec::collect_dump(&datagram, &mut replies)? {
                return Ok(replies);
            }
        }
    }
}

#[async_trait]
impl ListingSource for NetlinkListingSource {
    async fn list_links(&self) -> Result<Vec<ListedLink>> {
        let replies = self
            .dump(codec::link_dump())
            .await
            .map_err(|e| Error::listing(format!("Link dump failed: {}", e)))?;

        Ok(replies
            .into_iter()
            .filter_map(|reply| match reply {
                RtnlMessage::NewLink(link) => Some(ListedLink {
                    attrs: codec::decode_link(&link),
                }),
                _ => None,
            })
            .collect())
    }

    async fn list_addresses(&self, link: &LinkAttrs, family: AddressFamily) -> Result<Vec<IpAddr>> {
        let replies = self
            .dump(codec::address_dump(family))
            .await
            .map_err(|e| Error::address_query(link.index, family, e.to_string()))?;

        // Dumps ignore the index filter, and older kernels ignore the family.
        let family_code = codec::family_code(family);
        Ok(replies
            .into_iter()
            .filter_map(|reply| match reply {
                RtnlMessage::NewAddress(addr)
                    if addr.header.index == link.index && addr.header.family == family_code =>
                {
                    codec::decode_address(&addr)
                }
                _ => None,
            })
            .collect())
    }
}
