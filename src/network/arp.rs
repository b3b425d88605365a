//! Single-host ARP resolution against the local neighbor segment.
//!
//! Sends one ARP request on the interface whose subnet contains the target
//! and waits briefly for the reply. Hosts on routed (non-adjacent) subnets
//! have no layer-2 address here and resolve to absence, as does any
//! privilege or channel failure.

use anyhow::{Result, anyhow};
use pnet::datalink::{self, Channel, NetworkInterface};
use pnet::packet::Packet;
use pnet::packet::arp::{ArpHardwareTypes, ArpOperations, ArpPacket, MutableArpPacket};
use pnet::packet::ethernet::{EtherTypes, EthernetPacket, MutableEthernetPacket};
use pnet::util::MacAddr;
use std::net::{IpAddr, Ipv4Addr};
use std::time::{Duration, Instant};

use crate::config::{ARP_READ_TIMEOUT_MS, ARP_TIMEOUT};
use crate::{log_debug, log_warn};

/// Broadcast MAC address for ARP requests
const BROADCAST_MAC: MacAddr = MacAddr(0xff, 0xff, 0xff, 0xff, 0xff, 0xff);

/// Resolves the interface-adjacent MAC of `ip`; absence on any failure.
///
/// The pnet channel blocks, so the query runs on the blocking pool.
pub async fn resolve_mac(ip: Ipv4Addr) -> Option<MacAddr> {
    match tokio::task::spawn_blocking(move || query_neighbor(ip)).await {
        Ok(mac) => mac,
        Err(e) => {
            log_warn!("ARP worker join failed for {}: {}", ip, e);
            None
        }
    }
}

fn query_neighbor(target: Ipv4Addr) -> Option<MacAddr> {
    let (interface, source_mac, source_ip) = find_adjacent_interface(target)?;

    let channel_config = datalink::Config {
        read_timeout: Some(Duration::from_millis(ARP_READ_TIMEOUT_MS)),
        ..Default::default()
    };
    let (mut tx, mut rx) = match datalink::channel(&interface, channel_config) {
        Ok(Channel::Ethernet(tx, rx)) => (tx, rx),
        Ok(_) => {
            log_warn!("Unsupported channel type on {}", interface.name);
            return None;
        }
        Err(e) => {
            log_debug!(
                "Cannot open datalink channel on {} for {}: {}",
                interface.name,
                target,
                e
            );
            return None;
        }
    };

    let request = match create_arp_request(source_mac, source_ip, target) {
        Ok(request) => request,
        Err(e) => {
            log_warn!("Failed to build ARP request for {}: {}", target, e);
            return None;
        }
    };
    tx.send_to(&request, None);

    let deadline = Instant::now() + ARP_TIMEOUT;
    while Instant::now() < deadline {
        match rx.next() {
            Ok(frame) => {
                if let Some(mac) = extract_arp_reply(frame, target) {
                    return Some(mac);
                }
            }
            // Read timeouts just tick the deadline check; other errors end the wait.
            Err(e)
                if matches!(
                    e.kind(),
                    std::io::ErrorKind::TimedOut | std::io::ErrorKind::WouldBlock
                ) =>
            {
                continue;
            }
            Err(_) => break,
        }
    }
    None
}

/// Finds the up, non-loopback interface whose IPv4 subnet contains `target`.
fn find_adjacent_interface(target: Ipv4Addr) -> Option<(NetworkInterface, MacAddr, Ipv4Addr)> {
    for interface in datalink::interfaces() {
        if interface.is_loopback() || !interface.is_up() {
            continue;
        }
        let Some(mac) = interface.mac.filter(|m| *m != MacAddr::zero()) else {
            continue;
        };
        let source_ip = interface.ips.iter().find_map(|net| match net.ip() {
            IpAddr::V4(v4) if net.contains(IpAddr::V4(target)) => Some(v4),
            _ => None,
        });
        if let Some(source_ip) = source_ip {
            return Some((interface, mac, source_ip));
        }
    }
    log_debug!("No interface-adjacent subnet for {}", target);
    None
}

/// Creates an ARP request packet
fn create_arp_request(
    source_mac: MacAddr,
    source_ip: Ipv4Addr,
    target_ip: Ipv4Addr,
) -> Result<Vec<u8>> {
    let mut buffer = vec![0u8; 42];

    // Build Ethernet frame
    {
        let mut ethernet_packet = MutableEthernetPacket::new(&mut buffer[..14])
            .ok_or_else(|| anyhow!("Failed to construct Ethernet packet buffer"))?;
        ethernet_packet.set_destination(BROADCAST_MAC);
        ethernet_packet.set_source(source_mac);
        ethernet_packet.set_ethertype(EtherTypes::Arp);
    }

    // Build ARP packet
    {
        let mut arp_packet = MutableArpPacket::new(&mut buffer[14..42])
            .ok_or_else(|| anyhow!("Failed to construct ARP packet buffer"))?;
        arp_packet.set_hardware_type(ArpHardwareTypes::Ethernet);
        arp_packet.set_protocol_type(EtherTypes::Ipv4);
        arp_packet.set_hw_addr_len(6);
        arp_packet.set_proto_addr_len(4);
        arp_packet.set_operation(ArpOperations::Request);
        arp_packet.set_sender_hw_addr(source_mac);
        arp_packet.set_sender_proto_addr(source_ip);
        arp_packet.set_target_hw_addr(MacAddr::zero());
        arp_packet.set_target_proto_addr(target_ip);
    }

    Ok(buffer)
}

/// Returns the sender MAC when `frame` is an ARP reply from `target`.
fn extract_arp_reply(frame: &[u8], target: Ipv4Addr) -> Option<MacAddr> {
    let ethernet = EthernetPacket::new(frame)?;
    if ethernet.get_ethertype() != EtherTypes::Arp {
        return None;
    }
    let arp = ArpPacket::new(ethernet.payload())?;
    if arp.get_operation() == ArpOperations::Reply && arp.get_sender_proto_addr() == target {
        Some(arp.get_sender_hw_addr())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply_frame(sender_mac: MacAddr, sender_ip: Ipv4Addr) -> Vec<u8> {
        let mut buffer = create_arp_request(sender_mac, sender_ip, Ipv4Addr::new(10, 0, 0, 1))
            .expect("request frame");
        let mut arp_packet = MutableArpPacket::new(&mut buffer[14..42]).expect("arp view");
        arp_packet.set_operation(ArpOperations::Reply);
        buffer
    }

    #[test]
    fn test_extract_arp_reply_matches_sender() {
        let mac = MacAddr(0x00, 0x1b, 0x63, 0x01, 0x02, 0x03);
        let ip = Ipv4Addr::new(192, 168, 1, 20);
        let frame = reply_frame(mac, ip);

        assert_eq!(extract_arp_reply(&frame, ip), Some(mac));
    }

    #[test]
    fn test_extract_arp_reply_ignores_other_senders() {
        let mac = MacAddr(0x00, 0x1b, 0x63, 0x01, 0x02, 0x03);
        let frame = reply_frame(mac, Ipv4Addr::new(192, 168, 1, 20));

        assert_eq!(
            extract_arp_reply(&frame, Ipv4Addr::new(192, 168, 1, 21)),
            None
        );
    }

    #[test]
    fn test_extract_arp_reply_ignores_requests() {
        let mac = MacAddr(0x00, 0x1b, 0x63, 0x01, 0x02, 0x03);
        let ip = Ipv4Addr::new(192, 168, 1, 20);
        let frame = create_arp_request(mac, ip, Ipv4Addr::new(10, 0, 0, 1)).expect("request");

        assert_eq!(extract_arp_reply(&frame, ip), None);
    }
}
