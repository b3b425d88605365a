//! Detailed SNMP probing.
//!
//! Issues an SNMPv2c GET per object in a fixed enumeration and collects
//! every value that resolves. A timeout, wrong community or protocol error
//! excludes that object only; one resolved attribute is enough to mark the
//! host live.

use snmp2::{AsyncSession, Oid, Value};
use std::net::Ipv4Addr;
use std::time::Duration;
use tokio::time::timeout;

use crate::config::{SNMP_RETRIES, snmp_port, snmp_timeout};
use crate::scanner::probe::{BoxFuture, SnmpProber};

/// Queried objects, in report order.
pub const SNMP_OBJECTS: &[(&str, &[u64])] = &[
    ("Descrição do Sistema", &[1, 3, 6, 1, 2, 1, 1, 1, 0]),
    ("ID do Objeto", &[1, 3, 6, 1, 2, 1, 1, 2, 0]),
    ("Tempo de Atividade", &[1, 3, 6, 1, 2, 1, 1, 3, 0]),
    ("Nome do Sistema", &[1, 3, 6, 1, 2, 1, 1, 5, 0]),
    ("Contato", &[1, 3, 6, 1, 2, 1, 1, 4, 0]),
    ("Serviços", &[1, 3, 6, 1, 2, 1, 1, 7, 0]),
    ("Número de Interfaces", &[1, 3, 6, 1, 2, 1, 2, 1, 0]),
    ("CPU Ociosa (%)", &[1, 3, 6, 1, 4, 1, 2021, 11, 11, 0]),
    ("Memória Total (KB)", &[1, 3, 6, 1, 4, 1, 2021, 4, 5, 0]),
    ("Memória Livre (KB)", &[1, 3, 6, 1, 4, 1, 2021, 4, 6, 0]),
];

/// SNMPv2c prober for the fixed object enumeration.
pub struct SnmpClient {
    port: u16,
    timeout: Duration,
    retries: usize,
}

impl SnmpClient {
    pub fn new() -> Self {
        Self {
            port: snmp_port(),
            timeout: snmp_timeout(),
            retries: SNMP_RETRIES,
        }
    }

    /// One GET with a per-attempt timeout and a single retry after a
    /// timed-out attempt. Protocol errors exclude the object outright.
    async fn get_rendered(&self, session: &mut AsyncSession, oid: &Oid<'_>) -> Option<String> {
        for _attempt in 0..=self.retries {
            match timeout(self.timeout, session.get(oid)).await {
                Ok(Ok(mut response)) => {
                    let (_, value) = response.varbinds.next()?;
                    return render_value(&value);
                }
                Ok(Err(_)) => return None,
                Err(_) => continue,
            }
        }
        None
    }
}

impl Default for SnmpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl SnmpProber for SnmpClient {
    fn query<'a>(
        &'a self,
        ip: Ipv4Addr,
        community: &'a str,
    ) -> BoxFuture<'a, Option<Vec<(String, String)>>> {
        Box::pin(async move {
            let addr = format!("{}:{}", ip, self.port);

            // The session owns the UDP socket; dropping it on any exit path
            // below releases the descriptor.
            let mut session = match timeout(
                self.timeout,
                AsyncSession::new_v2c(&addr, community.as_bytes(), 0),
            )
            .await
            {
                Ok(Ok(session)) => session,
                _ => return None,
            };

            let mut attributes = Vec::new();
            for (description, numbers) in SNMP_OBJECTS {
                let Ok(oid) = Oid::from(*numbers) else { continue };
                if let Some(value) = self.get_rendered(&mut session, &oid).await {
                    attributes.push((description.to_string(), value));
                }
            }

            if attributes.is_empty() {
                None
            } else {
                Some(attributes)
            }
        })
    }
}

/// Renders a varbind value for the report; unrenderable values are treated
/// like unanswered objects.
fn render_value(value: &Value) -> Option<String> {
    match value {
        Value::OctetString(bytes) => {
            let text = String::from_utf8_lossy(bytes).trim().to_string();
            if text.is_empty() { None } else { Some(text) }
        }
        Value::Integer(n) => Some(n.to_string()),
        Value::Counter32(n) | Value::Unsigned32(n) => Some(n.to_string()),
        Value::Counter64(n) => Some(n.to_string()),
        Value::Timeticks(ticks) => Some(format_timeticks(*ticks)),
        Value::IpAddress(octets) => Some(Ipv4Addr::from(*octets).to_string()),
        Value::ObjectIdentifier(oid) => Some(oid.to_string()),
        _ => None,
    }
}

/// Timeticks are centiseconds; render as days and wall-clock time.
fn format_timeticks(ticks: u32) -> String {
    let total_secs = u64::from(ticks) / 100;
    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;
    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}
