//! Data models for the scan service.

use serde::Serialize;
use std::time::Duration;

/// One scan request, decoded from the inbound wire message.
///
/// Wire format: `"<cidr>[;<community>]"`, UTF-8, whitespace-trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub cidr: String,
    pub community: String,
}

impl ScanRequest {
    /// Splits the raw message on the first `;` into CIDR text and community,
    /// falling back to `default_community` when the community part is absent
    /// or blank.
    pub fn parse(raw: &str, default_community: &str) -> Self {
        let message = raw.trim();
        let (cidr, community) = match message.split_once(';') {
            Some((cidr, community)) => (cidr.trim(), community.trim()),
            None => (message, ""),
        };
        Self {
            cidr: cidr.to_string(),
            community: if community.is_empty() {
                default_community.to_string()
            } else {
                community.to_string()
            },
        }
    }
}

/// Terminal result of the per-host probe chain.
///
/// Consumed exactly once by the dispatcher; a host yields at most one
/// outcome per scan.
#[derive(Debug, Clone)]
pub enum ProbeOutcome {
    /// SNMP answered: the resolved attributes, in the fixed object order.
    Snmp(Vec<(String, String)>),
    /// SNMP yielded nothing but the host answered an echo request.
    Icmp(Duration),
    /// Neither probe got an answer; a normal negative result.
    Absent,
    /// The ICMP transport could not be created for lack of privilege.
    /// Fatal for this host's probe only.
    PermissionDenied,
}

/// Enrichment record for one live host.
#[derive(Debug, Clone, Serialize)]
pub struct HostInfo {
    pub ip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    /// Present only for hosts whose SNMP probe resolved attributes;
    /// preserves the probe's fixed object order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snmp_attributes: Option<Vec<(String, String)>>,
}

impl HostInfo {
    /// Canonical minimal constructor to avoid field drift across call-sites.
    pub fn new(ip: String) -> Self {
        Self {
            ip,
            name: None,
            mac: None,
            vendor: None,
            snmp_attributes: None,
        }
    }
}

/// Aggregated scan result, ordered by the original host enumeration
/// (never by probe completion order).
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    pub hosts: Vec<HostInfo>,
}

impl ScanReport {
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}
