//! ICMP echo probing.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;
use std::time::Duration;
use surge_ping::{Client, Config, PingIdentifier, PingSequence};

use crate::config::ping_timeout;
use crate::log_warn;
use crate::scanner::probe::{BoxFuture, IcmpProber, IcmpReply};

/// Generates a random ping identifier
fn rand_id() -> u16 {
    use std::time::SystemTime;
    let duration = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();
    ((duration.as_nanos() % 0xFFFF) as u16).wrapping_add(1)
}

/// Echo prober backed by one shared raw-socket client.
///
/// Client creation needs raw-socket privilege. When that fails the prober
/// stays usable and reports `PermissionDenied` per probed host, so hosts
/// whose SNMP probe already succeeded are unaffected.
pub struct IcmpClient {
    client: Option<Arc<Client>>,
    timeout: Duration,
}

impl IcmpClient {
    pub fn new() -> Self {
        let client = match Client::new(&Config::default()) {
            Ok(client) => Some(Arc::new(client)),
            Err(e) => {
                log_warn!(
                    "ICMP transport unavailable ({}); echo probes will report permission denied",
                    e
                );
                None
            }
        };
        Self {
            client,
            timeout: ping_timeout(),
        }
    }
}

impl Default for IcmpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl IcmpProber for IcmpClient {
    fn ping<'a>(&'a self, ip: Ipv4Addr) -> BoxFuture<'a, IcmpReply> {
        Box::pin(async move {
            let Some(client) = &self.client else {
                return IcmpReply::PermissionDenied;
            };
            let payload = [0u8; 56];
            match client
                .pinger(IpAddr::V4(ip), PingIdentifier(rand_id()))
                .await
                .timeout(self.timeout)
                .ping(PingSequence(0), &payload)
                .await
            {
                Ok((_packet, rtt)) => IcmpReply::Reply(rtt),
                Err(_) => IcmpReply::Absent,
            }
        })
    }
}
