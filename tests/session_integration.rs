//! End-to-end session tests: a real server on loopback with injected
//! probers, exercised through the wire protocol.

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::sync::Semaphore;

use netsonda::{
    BoxFuture, Enricher, Enrichment, INVALID_CIDR_MESSAGE, NO_ACTIVE_HOSTS_MESSAGE, ProbeOutcome,
    Prober, ScanDispatcher, ScanServer, ServerConfig,
};

/// Fixed enrichment so response bytes are predictable.
struct StubEnricher;

impl Enricher for StubEnricher {
    fn enrich<'a>(&'a self, _ip: Ipv4Addr) -> BoxFuture<'a, Enrichment> {
        Box::pin(async {
            Enrichment {
                name: None,
                mac: Some("00:1b:63:aa:bb:cc".to_string()),
                vendor: Some("Apple".to_string()),
            }
        })
    }
}

/// Scripted outcomes by last octet; records every invocation.
struct ScriptedProber {
    probes: AtomicUsize,
    communities: Mutex<Vec<String>>,
}

impl ScriptedProber {
    fn new() -> Self {
        Self {
            probes: AtomicUsize::new(0),
            communities: Mutex::new(Vec::new()),
        }
    }
}

impl Prober for ScriptedProber {
    fn probe<'a>(&'a self, ip: Ipv4Addr, community: &'a str) -> BoxFuture<'a, ProbeOutcome> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.communities
            .lock()
            .expect("communities lock")
            .push(community.to_string());
        Box::pin(async move {
            match ip.octets()[3] {
                1 => ProbeOutcome::Snmp(vec![("Nome do Sistema".to_string(), "gw".to_string())]),
                2 => ProbeOutcome::Icmp(Duration::from_millis(2)),
                _ => ProbeOutcome::Absent,
            }
        })
    }
}

async fn start_server(prober: Arc<dyn Prober>) -> SocketAddr {
    let config = ServerConfig {
        bind_addr: "127.0.0.1".to_string(),
        port: 0,
        community: "public".to_string(),
        max_workers: 8,
    };
    let dispatcher = Arc::new(ScanDispatcher::new(
        prober,
        Arc::new(StubEnricher),
        Arc::new(Semaphore::new(config.max_workers)),
    ));
    let server = ScanServer::bind(&config, dispatcher).await.expect("bind");
    let addr = server.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = server.run().await;
    });
    addr
}

async fn request(addr: SocketAddr, payload: &str, half_close: bool) -> String {
    let mut stream = TcpStream::connect(addr).await.expect("connect");
    stream.write_all(payload.as_bytes()).await.expect("send");
    if half_close {
        stream.shutdown().await.expect("half-close");
    }
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    response
}

#[tokio::test]
async fn malformed_cidr_returns_fixed_error_and_skips_dispatch() {
    let prober = Arc::new(ScriptedProber::new());
    let addr = start_server(Arc::clone(&prober) as Arc<dyn Prober>).await;

    let response = request(addr, "not-a-cidr", true).await;

    assert_eq!(response, INVALID_CIDR_MESSAGE);
    assert_eq!(prober.probes.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn live_hosts_render_in_enumeration_order() {
    let prober = Arc::new(ScriptedProber::new());
    let addr = start_server(Arc::clone(&prober) as Arc<dyn Prober>).await;

    let response = request(addr, "192.168.7.0/29;secret", true).await;

    let expected = concat!(
        "192.168.7.1\n192.168.7.1\n00:1b:63:aa:bb:cc\nApple\nNome do Sistema: gw\n",
        "\n",
        "192.168.7.2\n192.168.7.2\n00:1b:63:aa:bb:cc\nApple\n",
    );
    assert_eq!(response, expected);

    // every host in the /29 was probed, all with the requested community
    assert_eq!(prober.probes.load(Ordering::SeqCst), 6);
    let communities = prober.communities.lock().expect("communities lock");
    assert!(communities.iter().all(|c| c == "secret"));
}

#[tokio::test]
async fn community_defaults_to_public() {
    let prober = Arc::new(ScriptedProber::new());
    let addr = start_server(Arc::clone(&prober) as Arc<dyn Prober>).await;

    let response = request(addr, "10.1.2.3/32", true).await;

    assert_eq!(response, NO_ACTIVE_HOSTS_MESSAGE);
    assert_eq!(prober.probes.load(Ordering::SeqCst), 1);
    let communities = prober.communities.lock().expect("communities lock");
    assert_eq!(communities.as_slice(), ["public"]);
}

#[tokio::test]
async fn range_with_no_live_hosts_yields_the_fixed_message() {
    let prober = Arc::new(ScriptedProber::new());
    let addr = start_server(Arc::clone(&prober) as Arc<dyn Prober>).await;

    // .9 and .10 both script to Absent
    let response = request(addr, "10.9.9.8/30", true).await;

    assert_eq!(response, NO_ACTIVE_HOSTS_MESSAGE);
}

#[tokio::test]
async fn client_without_half_close_still_gets_a_response() {
    let prober = Arc::new(ScriptedProber::new());
    let addr = start_server(Arc::clone(&prober) as Arc<dyn Prober>).await;

    // One-shot client that just waits for the reply after sending.
    let response = request(addr, "10.1.2.2/32", false).await;

    assert!(response.starts_with("10.1.2.2\n10.1.2.2\n"));
}

#[tokio::test]
async fn sessions_are_independent() {
    let prober = Arc::new(ScriptedProber::new());
    let addr = start_server(Arc::clone(&prober) as Arc<dyn Prober>).await;

    let (bad, good) = tokio::join!(
        request(addr, "garbage", true),
        request(addr, "10.1.2.1/32", true),
    );

    assert_eq!(bad, INVALID_CIDR_MESSAGE);
    assert!(good.contains("Nome do Sistema: gw"));
}
