//! Enrichment of live hosts: reverse DNS, MAC address, vendor.

use std::net::Ipv4Addr;
use std::sync::Arc;

use crate::network::vendor::VendorResolver;
use crate::network::{arp, dns};
use crate::scanner::probe::BoxFuture;

/// Enrichment record for one live host; every field degrades to absence
/// independently.
#[derive(Debug, Clone, Default)]
pub struct Enrichment {
    pub name: Option<String>,
    pub mac: Option<String>,
    pub vendor: Option<String>,
}

/// Resolves name, MAC and vendor for a host already judged live.
pub trait Enricher: Send + Sync {
    fn enrich<'a>(&'a self, ip: Ipv4Addr) -> BoxFuture<'a, Enrichment>;
}

/// Production enricher: PTR lookup, neighbor ARP query, vendor resolution.
///
/// Vendor resolution only runs when a MAC was found; a host without a MAC
/// has no vendor either.
pub struct HostEnricher {
    vendors: Arc<dyn VendorResolver>,
}

impl HostEnricher {
    pub fn new(vendors: Arc<dyn VendorResolver>) -> Self {
        Self { vendors }
    }
}

impl Enricher for HostEnricher {
    fn enrich<'a>(&'a self, ip: Ipv4Addr) -> BoxFuture<'a, Enrichment> {
        Box::pin(async move {
            let name = dns::resolve_hostname(ip).await;
            let mac = arp::resolve_mac(ip).await.map(|mac| mac.to_string());
            let vendor = match &mac {
                Some(mac) => Some(self.vendors.resolve(mac).await),
                None => None,
            };
            Enrichment { name, mac, vendor }
        })
    }
}
