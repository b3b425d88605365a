//! Reverse DNS lookup for hostname enrichment.

use dns_lookup::lookup_addr;
use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use crate::config::DNS_TIMEOUT_MS;
use crate::log_warn;

/// Perform a single reverse DNS (PTR) lookup.
///
/// Any failure is absence, not an error; results that merely echo the IP
/// back are discarded.
pub fn reverse_lookup(ip: Ipv4Addr) -> Option<String> {
    let ip_addr = IpAddr::V4(ip);
    match lookup_addr(&ip_addr) {
        Ok(hostname) => {
            if hostname != ip.to_string() {
                Some(hostname)
            } else {
                None
            }
        }
        Err(_) => None,
    }
}

/// Async wrapper around [`reverse_lookup`].
///
/// The lookup is synchronous, so it runs on the blocking pool with an
/// upper bound to keep a stuck resolver from pinning a worker.
pub async fn resolve_hostname(ip: Ipv4Addr) -> Option<String> {
    let lookup_result = tokio::time::timeout(
        Duration::from_millis(DNS_TIMEOUT_MS),
        tokio::task::spawn_blocking(move || reverse_lookup(ip)),
    )
    .await;

    match lookup_result {
        Ok(Ok(hostname)) => hostname,
        Ok(Err(e)) => {
            log_warn!("DNS worker join failed for {}: {}", ip, e);
            None
        }
        Err(_) => None,
    }
}
