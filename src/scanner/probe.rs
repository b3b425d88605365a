//! Per-host probe chain and capability seams.
//!
//! The chain tries the detailed SNMP query first; any resolved attribute
//! marks the host live and the echo probe is skipped entirely. Hosts
//! silent on SNMP get one ICMP echo. The transports sit behind object-safe
//! traits so the dispatcher and the tests can swap them.

use std::future::Future;
use std::net::Ipv4Addr;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use crate::models::ProbeOutcome;

/// Boxed future returned by the capability traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Detailed SNMP probe: the resolved attributes in fixed object order, or
/// nothing when no object answered.
pub trait SnmpProber: Send + Sync {
    fn query<'a>(
        &'a self,
        ip: Ipv4Addr,
        community: &'a str,
    ) -> BoxFuture<'a, Option<Vec<(String, String)>>>;
}

/// Result of one ICMP echo attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IcmpReply {
    Reply(Duration),
    Absent,
    PermissionDenied,
}

/// Single ICMP echo probe.
pub trait IcmpProber: Send + Sync {
    fn ping<'a>(&'a self, ip: Ipv4Addr) -> BoxFuture<'a, IcmpReply>;
}

/// Full per-host liveness probe, invoked once per host by the dispatcher.
pub trait Prober: Send + Sync {
    fn probe<'a>(&'a self, ip: Ipv4Addr, community: &'a str) -> BoxFuture<'a, ProbeOutcome>;
}

/// SNMP-first probe chain with ICMP fallback.
pub struct ChainProber {
    snmp: Arc<dyn SnmpProber>,
    icmp: Arc<dyn IcmpProber>,
}

impl ChainProber {
    pub fn new(snmp: Arc<dyn SnmpProber>, icmp: Arc<dyn IcmpProber>) -> Self {
        Self { snmp, icmp }
    }
}

impl Prober for ChainProber {
    fn probe<'a>(&'a self, ip: Ipv4Addr, community: &'a str) -> BoxFuture<'a, ProbeOutcome> {
        Box::pin(async move {
            if let Some(attributes) = self.snmp.query(ip, community).await {
                return ProbeOutcome::Snmp(attributes);
            }
            match self.icmp.ping(ip).await {
                IcmpReply::Reply(rtt) => ProbeOutcome::Icmp(rtt),
                IcmpReply::Absent => ProbeOutcome::Absent,
                IcmpReply::PermissionDenied => ProbeOutcome::PermissionDenied,
            }
        })
    }
}
