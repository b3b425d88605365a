//! netsonda — network discovery and enrichment service
//!
//! A TCP service that accepts a CIDR block and an SNMP community string,
//! probes every host in the range and returns a plain-text report:
//! - CIDR host enumeration
//! - per-host probe chain: detailed SNMP query, ICMP echo fallback
//! - enrichment of live hosts: reverse DNS, MAC address, vendor
//! - bounded worker pool shared across concurrent sessions

pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod network;
pub mod report;
pub mod scanner;
pub mod server;

pub use config::ServerConfig;
pub use error::ScanError;
pub use models::{HostInfo, ProbeOutcome, ScanReport, ScanRequest};
pub use network::{OuiVendorResolver, VendorResolver, enumerate_hosts};
pub use report::{INVALID_CIDR_MESSAGE, NO_ACTIVE_HOSTS_MESSAGE, render_report};
pub use scanner::{
    BoxFuture, ChainProber, Enricher, Enrichment, HostEnricher, IcmpClient, IcmpProber, IcmpReply,
    Prober, ScanDispatcher, SnmpClient, SnmpProber,
};
pub use server::ScanServer;

// Re-export logging macros for use across crate
pub use crate::logging::macros;
