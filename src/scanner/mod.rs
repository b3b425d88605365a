//! Scanner module - probe chain, SNMP and ICMP probes, enrichment, dispatch

mod dispatch;
mod enrich;
mod icmp;
mod probe;
mod snmp;

pub use dispatch::ScanDispatcher;
pub use enrich::{Enricher, Enrichment, HostEnricher};
pub use icmp::IcmpClient;
pub use probe::{BoxFuture, ChainProber, IcmpProber, IcmpReply, Prober, SnmpProber};
pub use snmp::{SNMP_OBJECTS, SnmpClient};
