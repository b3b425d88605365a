//! CIDR parsing and host enumeration

use ipnetwork::Ipv4Network;
use std::net::Ipv4Addr;

use crate::error::ScanError;

/// Checks if an IP address is a network or broadcast address
pub fn is_special_address(ip: Ipv4Addr, subnet: &Ipv4Network) -> bool {
    ip == subnet.network() || ip == subnet.broadcast()
}

/// Parses CIDR text and returns the scannable host addresses in ascending
/// order.
///
/// Prefixes below /31 yield every usable host, excluding the network and
/// broadcast addresses. A /31 yields both addresses, a /32 the address
/// itself (host semantics, not interface semantics). Input with host bits
/// set is accepted and re-based on its network address. Anything that does
/// not parse as IPv4 CIDR — including a bare address without a prefix —
/// fails with [`ScanError::InvalidCidr`].
pub fn enumerate_hosts(cidr: &str) -> Result<Vec<Ipv4Addr>, ScanError> {
    let text = cidr.trim();

    // A bare address would parse as an implicit /32; the protocol requires
    // an explicit prefix.
    if !text.contains('/') {
        return Err(ScanError::InvalidCidr(text.to_string()));
    }

    let network: Ipv4Network = text
        .parse()
        .map_err(|_| ScanError::InvalidCidr(text.to_string()))?;

    let subnet = Ipv4Network::new(network.network(), network.prefix())
        .map_err(|_| ScanError::InvalidCidr(text.to_string()))?;

    let hosts = match subnet.prefix() {
        32 => vec![subnet.network()],
        31 => vec![subnet.network(), subnet.broadcast()],
        _ => subnet
            .iter()
            .filter(|ip| !is_special_address(*ip, &subnet))
            .collect(),
    };

    Ok(hosts)
}

#[cfg(test)]
#[path = "cidr_tests.rs"]
mod cidr_tests;
