//! rtnetlink message codec
//!
//! Turns kernel link and address messages into the monitor's update
//! types, and builds the dump requests used for listings. Nothing in here
//! touches a socket.

use ifmon_core::traits::{
    AddrChange, AddrUpdate, AddressFamily, LinkAttrs, LinkChange, LinkUpdate,
};
use netlink_packet_core::{NLM_F_DUMP, NLM_F_REQUEST, NetlinkMessage, NetlinkPayload};
use netlink_packet_route::address::nlas::Nla as AddressNla;
use netlink_packet_route::constants::{AF_INET, AF_INET6};
use netlink_packet_route::link::nlas::Nla as LinkNla;
use netlink_packet_route::{AddressMessage, LinkMessage, RtnlMessage};
use std::io;
use std::net::IpAddr;
use tracing::debug;

/// A decoded multicast update
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum KernelUpdate {
    Link(LinkUpdate),
    Addr(AddrUpdate),
}

/// Decode the identifying attributes of a link message
///
/// Returns `None` when the message carries no interface name.
pub fn decode_link(msg: &LinkMessage) -> Option<LinkAttrs> {
    let name = msg.nlas.iter().find_map(|nla| match nla {
        LinkNla::IfName(name) => Some(name.clone()),
        _ => None,
    })?;

    Some(LinkAttrs::new(msg.header.index, name, msg.header.flags))
}

/// Decode the address carried by an address message
///
/// `IFA_LOCAL` wins over `IFA_ADDRESS`: on point-to-point links the latter
/// is the peer's address.
pub fn decode_address(msg: &AddressMessage) -> Option<IpAddr> {
    let mut address = None;
    let mut local = None;
    for nla in &msg.nlas {
        match nla {
            AddressNla::Address(bytes) => address = Some(bytes),
            AddressNla::Local(bytes) => local = Some(bytes),
            _ => {}
        }
    }

    ip_from_bytes(msg.header.family, local.or(address)?)
}

fn ip_from_bytes(family: u8, bytes: &[u8]) -> Option<IpAddr> {
    match u16::from(family) {
        AF_INET => <[u8; 4]>::try_from(bytes).ok().map(IpAddr::from),
        AF_INET6 => <[u8; 16]>::try_from(bytes).ok().map(IpAddr::from),
        _ => None,
    }
}

/// Kernel address family code for a query family
pub fn family_code(family: AddressFamily) -> u8 {
    match family {
        AddressFamily::V4 => AF_INET as u8,
        AddressFamily::V6 => AF_INET6 as u8,
    }
}

/// Map a multicast message to an update, if it is one we track
pub(crate) fn decode_update(msg: RtnlMessage) -> Option<KernelUpdate> {
    match msg {
        RtnlMessage::NewLink(link) => Some(KernelUpdate::Link(LinkUpdate {
            change: LinkChange::New,
            attrs: decode_link(&link),
        })),
        RtnlMessage::DelLink(link) => Some(KernelUpdate::Link(LinkUpdate {
            change: LinkChange::Removed,
            attrs: decode_link(&link),
        })),
        RtnlMessage::NewAddress(addr) => address_update(&addr, AddrChange::New),
        RtnlMessage::DelAddress(addr) => address_update(&addr, AddrChange::Removed),
        _ => None,
    }
}

fn address_update(msg: &AddressMessage, change: AddrChange) -> Option<KernelUpdate> {
    match decode_address(msg) {
        Some(address) => Some(KernelUpdate::Addr(AddrUpdate {
            index: msg.header.index,
            address,
            change,
        })),
        None => {
            debug!(ifindex = msg.header.index, "Dropping address message without a usable address");
            None
        }
    }
}

/// Split one datagram into its netlink messages
pub(crate) fn parse_datagram(buf: &[u8]) -> io::Result<Vec<NetlinkMessage<RtnlMessage>>> {
    let mut messages = Vec::new();
    let mut offset = 0;

    while offset < buf.len() {
        let msg = NetlinkMessage::<RtnlMessage>::deserialize(&buf[offset..]).map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Failed to deserialize netlink message: {:?}", e),
            )
        })?;
        let len = msg.header.length as usize;
        messages.push(msg);
        if len == 0 {
            break;
        }
        offset += (len + 3) & !3;
    }

    Ok(messages)
}

/// Collect the replies of a dump from one datagram
///
/// Returns `true` once the end-of-dump marker is seen. A kernel error
/// reply becomes an `io::Error` carrying its errno.
pub(crate) fn collect_dump(buf: &[u8], replies: &mut Vec<RtnlMessage>) -> io::Result<bool> {
    for msg in parse_datagram(buf)? {
        match msg.payload {
            NetlinkPayload::InnerMessage(inner) => replies.push(inner),
            NetlinkPayload::Done(_) => return Ok(true),
            NetlinkPayload::Error(err) => {
                // A zero code is an ack.
                if let Some(code) = err.code {
                    return Err(io::Error::from_raw_os_error(-code.get()));
                }
            }
            _ => {}
        }
    }
    Ok(false)
}

/// Serialize a dump request
pub(crate) fn dump_request(request: RtnlMessage, sequence_number: u32) -> Vec<u8> {
    let mut packet = NetlinkMessage::from(request);
    packet.header.flags = NLM_F_REQUEST | NLM_F_DUMP;
    packet.header.sequence_number = sequence_number;
    packet.finalize();

    let mut buf = vec![0; packet.buffer_len()];
    packet.serialize(&mut buf[..]);
    buf
}

/// A request for every link
pub(crate) fn link_dump() -> RtnlMessage {
    RtnlMessage::GetLink(LinkMessage::default())
}

/// A request for every address of one family
pub(crate) fn address_dump(family: AddressFamily) -> RtnlMessage {
    let mut msg = AddressMessage::default();
    msg.header.family = family_code(family);
    RtnlMessage::GetAddress(msg)
}
