//! Network module - CIDR enumeration, reverse DNS, ARP MAC resolution, vendor lookup

pub mod arp;
pub mod cidr;
pub mod dns;
pub mod vendor;

pub use arp::resolve_mac;
pub use cidr::{enumerate_hosts, is_special_address};
pub use dns::resolve_hostname;
pub use vendor::{OuiVendorResolver, VendorResolver, normalize_mac, oui_prefix};
