// # Netlink Sources
//
// This crate provides the rtnetlink-backed EventSource and ListingSource
// for the interface monitor.
//
// ## Event Source
//
// `NetlinkEventSource` binds one NETLINK_ROUTE socket to the link, IPv4
// address and IPv6 address multicast groups. A reader task decodes every
// datagram and forwards link and address updates on two unbounded
// channels. When the socket fails the task exits, both channels close and
// the monitor treats that as fatal.
//
// ## Listing Source
//
// `NetlinkListingSource` opens a short-lived socket per request and runs
// an RTM_GETLINK or RTM_GETADDR dump, collecting replies until the
// end-of-dump marker.
//
// ## Platform Support
//
// Netlink is Linux-only. On other targets both sources exist but every
// call fails, so the daemon still builds and reports a clear error.

#[cfg(target_os = "linux")]
pub mod codec;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(target_os = "linux")]
pub use linux::{NetlinkEventSource, NetlinkListingSource};

#[cfg(not(target_os = "linux"))]
mod unsupported;

#[cfg(not(target_os = "linux"))]
pub use unsupported::{NetlinkEventSource, NetlinkListingSource};
