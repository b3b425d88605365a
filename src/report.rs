//! Wire-text rendering of scan results.
//!
//! One block per live host, blank-line separated, closed by the server
//! closing the connection (EOF marks the end of the response). The fixed
//! messages are part of the wire protocol and must not change.

use crate::models::{HostInfo, ScanReport};

/// Fixed response when the range holds no scannable or no live hosts.
pub const NO_ACTIVE_HOSTS_MESSAGE: &str = "Nenhum host ativo encontrado na faixa especificada.\n";

/// Fixed response for a request whose CIDR text does not parse.
pub const INVALID_CIDR_MESSAGE: &str =
    "ERRO: Notação CIDR inválida. Use o formato '192.168.1.0/24'.\n";

/// Renders one host block: DNS name (the IP when unresolved), IP, MAC and
/// vendor lines (empty when absent), then one `description: value` line
/// per resolved SNMP attribute in probe order.
pub fn render_host(host: &HostInfo) -> String {
    let mut lines = Vec::new();
    lines.push(host.name.clone().unwrap_or_else(|| host.ip.clone()));
    lines.push(host.ip.clone());
    lines.push(host.mac.clone().unwrap_or_default());
    lines.push(host.vendor.clone().unwrap_or_default());
    if let Some(attributes) = &host.snmp_attributes {
        for (description, value) in attributes {
            lines.push(format!("{}: {}", description, value));
        }
    }
    let mut block = lines.join("\n");
    block.push('\n');
    block
}

/// Renders the full report, or the fixed no-hosts message for an empty one.
pub fn render_report(report: &ScanReport) -> String {
    if report.is_empty() {
        return NO_ACTIVE_HOSTS_MESSAGE.to_string();
    }
    let blocks: Vec<String> = report.hosts.iter().map(render_host).collect();
    blocks.join("\n")
}
