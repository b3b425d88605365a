//! Configuration for the scan service.
//!
//! Compile-time defaults live here as constants; the operational knobs are
//! additionally overridable through `NETSONDA_*` environment variables via
//! the accessor functions, clamped to sane ranges.

use std::time::Duration;

/// Default TCP bind address for the server.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";

/// Default TCP port for the scan protocol.
pub const DEFAULT_PORT: u16 = 35640;

/// Default SNMP community used when a request omits one.
pub const DEFAULT_COMMUNITY: &str = "public";

/// Worker-pool capacity for probe+enrich units, shared across sessions.
pub const MAX_WORKERS: usize = 50;

// ====== SNMP Configuration ======

/// SNMP agent port.
pub const SNMP_PORT: u16 = 161;

/// Timeout for each SNMP request (session setup and per-OID get).
pub const SNMP_TIMEOUT: Duration = Duration::from_secs(1);

/// Retries per SNMP object after the first timed-out attempt.
pub const SNMP_RETRIES: usize = 1;

// ====== ICMP / ARP Configuration ======

/// Timeout for the single ICMP echo request.
pub const PING_TIMEOUT: Duration = Duration::from_secs(1);

/// Total wait for an ARP reply when resolving a host MAC.
pub const ARP_TIMEOUT: Duration = Duration::from_secs(1);

/// Poll interval for the ARP receive loop (ms).
pub const ARP_READ_TIMEOUT_MS: u64 = 200;

// ====== Enrichment Configuration ======

/// Upper bound on one reverse DNS lookup (synchronous, so we use spawn_blocking).
pub const DNS_TIMEOUT_MS: u64 = 2000;

/// Timeout for the remote OUI vendor lookup.
pub const VENDOR_LOOKUP_TIMEOUT: Duration = Duration::from_secs(2);

/// Public MAC vendor lookup service queried on a local table miss.
pub const VENDOR_LOOKUP_ENDPOINT: &str = "https://api.macvendors.com";

// ====== Session Configuration ======

/// Upper bound on the inbound request payload.
pub const MAX_REQUEST_BYTES: usize = 64 * 1024;

/// Idle window after the first request chunk before the request is
/// considered complete for clients that do not half-close.
pub const REQUEST_IDLE_TIMEOUT: Duration = Duration::from_millis(250);

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse_u64(name: &str, default: u64, min: u64, max: u64) -> u64 {
    match env_var(name).and_then(|v| v.parse::<u64>().ok()) {
        Some(v) => v.clamp(min, max),
        None => default,
    }
}

fn env_parse_usize(name: &str, default: usize, min: usize, max: usize) -> usize {
    match env_var(name).and_then(|v| v.parse::<usize>().ok()) {
        Some(v) => v.clamp(min, max),
        None => default,
    }
}

fn env_parse_u16(name: &str, default: u16, min: u16, max: u16) -> u16 {
    match env_var(name).and_then(|v| v.parse::<u16>().ok()) {
        Some(v) => v.clamp(min, max),
        None => default,
    }
}

/// Runtime-tunable worker-pool capacity.
/// Env: `NETSONDA_MAX_WORKERS`
pub fn max_workers() -> usize {
    env_parse_usize("NETSONDA_MAX_WORKERS", MAX_WORKERS, 1, 1024)
}

/// Runtime-tunable SNMP timeout.
/// Env: `NETSONDA_SNMP_TIMEOUT_MS`
pub fn snmp_timeout() -> Duration {
    Duration::from_millis(env_parse_u64(
        "NETSONDA_SNMP_TIMEOUT_MS",
        SNMP_TIMEOUT.as_millis() as u64,
        100,
        10_000,
    ))
}

/// Runtime-tunable SNMP port.
/// Env: `NETSONDA_SNMP_PORT`
pub fn snmp_port() -> u16 {
    env_parse_u16("NETSONDA_SNMP_PORT", SNMP_PORT, 1, u16::MAX)
}

/// Runtime-tunable ICMP timeout.
/// Env: `NETSONDA_PING_TIMEOUT_MS`
pub fn ping_timeout() -> Duration {
    Duration::from_millis(env_parse_u64(
        "NETSONDA_PING_TIMEOUT_MS",
        PING_TIMEOUT.as_millis() as u64,
        50,
        10_000,
    ))
}

/// Runtime-tunable vendor lookup endpoint.
/// Env: `NETSONDA_VENDOR_ENDPOINT`
pub fn vendor_endpoint() -> String {
    env_var("NETSONDA_VENDOR_ENDPOINT").unwrap_or_else(|| VENDOR_LOOKUP_ENDPOINT.to_string())
}

/// Startup parameters threaded through the server and dispatcher.
///
/// Immutable once constructed; the CLI layer builds one from flags and
/// environment defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    /// SNMP community applied when a request carries none.
    pub community: String,
    pub max_workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
            community: DEFAULT_COMMUNITY.to_string(),
            max_workers: max_workers(),
        }
    }
}

impl ServerConfig {
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}
