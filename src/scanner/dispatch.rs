//! Bounded fan-out of probe+enrich units across a host list.

use std::net::Ipv4Addr;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::models::{HostInfo, ProbeOutcome, ScanReport};
use crate::scanner::enrich::Enricher;
use crate::scanner::probe::Prober;
use crate::{log_debug, log_warn};

/// Fans a host list out across the shared worker pool and assembles the
/// report in the original enumeration order.
///
/// The semaphore is the only state shared between sessions; excess units
/// queue on it instead of spawning unbounded concurrent probes. Every unit
/// is isolated: a panic or unexpected failure in one host's probe or
/// enrichment drops that host from the report and nothing else.
pub struct ScanDispatcher {
    prober: Arc<dyn Prober>,
    enricher: Arc<dyn Enricher>,
    workers: Arc<Semaphore>,
}

impl ScanDispatcher {
    pub fn new(prober: Arc<dyn Prober>, enricher: Arc<dyn Enricher>, workers: Arc<Semaphore>) -> Self {
        Self {
            prober,
            enricher,
            workers,
        }
    }

    /// Probes and enriches every host, returning only the live ones.
    ///
    /// Waits for every unit to reach a terminal outcome before returning;
    /// no partial reports. Handles are awaited in submission order, which
    /// pins the report to the enumeration order regardless of completion
    /// order.
    pub async fn dispatch(&self, hosts: &[Ipv4Addr], community: &str) -> ScanReport {
        let mut handles = Vec::with_capacity(hosts.len());

        for &ip in hosts {
            let prober = Arc::clone(&self.prober);
            let enricher = Arc::clone(&self.enricher);
            let workers = Arc::clone(&self.workers);
            let community = community.to_string();

            handles.push(tokio::spawn(async move {
                let _permit = match workers.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        log_warn!("Worker pool closed while scanning {}: {}", ip, e);
                        return None;
                    }
                };
                scan_host(prober.as_ref(), enricher.as_ref(), ip, &community).await
            }));
        }

        let mut live_hosts = Vec::new();
        for (handle, &ip) in handles.into_iter().zip(hosts) {
            match handle.await {
                Ok(Some(host)) => live_hosts.push(host),
                Ok(None) => {}
                Err(e) => {
                    log_warn!("Scan unit for {} failed: {}", ip, e);
                }
            }
        }

        ScanReport { hosts: live_hosts }
    }
}

/// One unit of work: probe chain, then enrichment for live hosts.
async fn scan_host(
    prober: &dyn Prober,
    enricher: &dyn Enricher,
    ip: Ipv4Addr,
    community: &str,
) -> Option<HostInfo> {
    let snmp_attributes = match prober.probe(ip, community).await {
        ProbeOutcome::Snmp(attributes) => Some(attributes),
        ProbeOutcome::Icmp(rtt) => {
            log_debug!("{} answered echo in {:?}", ip, rtt);
            None
        }
        ProbeOutcome::Absent => return None,
        ProbeOutcome::PermissionDenied => {
            log_warn!("Scanning {} failed: no privilege for the ICMP transport", ip);
            return None;
        }
    };

    let enrichment = enricher.enrich(ip).await;

    let mut host = HostInfo::new(ip.to_string());
    host.name = enrichment.name;
    host.mac = enrichment.mac;
    host.vendor = enrichment.vendor;
    host.snmp_attributes = snmp_attributes;
    Some(host)
}
