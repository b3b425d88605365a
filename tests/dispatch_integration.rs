//! Integration tests for the scan dispatcher's concurrency contract:
//! bounded fan-out, input-order assembly, per-unit isolation.

use std::net::Ipv4Addr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Semaphore;

use netsonda::{BoxFuture, Enricher, Enrichment, ProbeOutcome, Prober, ScanDispatcher};

struct NullEnricher;

impl Enricher for NullEnricher {
    fn enrich<'a>(&'a self, _ip: Ipv4Addr) -> BoxFuture<'a, Enrichment> {
        Box::pin(async { Enrichment::default() })
    }
}

/// Tracks how many probes run at once.
struct CountingProber {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    delay: Duration,
}

impl CountingProber {
    fn new(delay: Duration) -> Self {
        Self {
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            delay,
        }
    }
}

impl Prober for CountingProber {
    fn probe<'a>(&'a self, _ip: Ipv4Addr, _community: &'a str) -> BoxFuture<'a, ProbeOutcome> {
        Box::pin(async move {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            ProbeOutcome::Icmp(Duration::from_millis(1))
        })
    }
}

/// Finishes faster for later hosts to scramble completion order.
struct ReverseDelayProber;

impl Prober for ReverseDelayProber {
    fn probe<'a>(&'a self, ip: Ipv4Addr, _community: &'a str) -> BoxFuture<'a, ProbeOutcome> {
        Box::pin(async move {
            let slot = u64::from(40 - ip.octets()[3].min(40));
            tokio::time::sleep(Duration::from_millis(slot * 5)).await;
            ProbeOutcome::Icmp(Duration::from_millis(1))
        })
    }
}

/// Panics for one host, answers for the rest.
struct FaultyProber {
    victim: Ipv4Addr,
}

impl Prober for FaultyProber {
    fn probe<'a>(&'a self, ip: Ipv4Addr, _community: &'a str) -> BoxFuture<'a, ProbeOutcome> {
        Box::pin(async move {
            if ip == self.victim {
                panic!("probe blew up");
            }
            ProbeOutcome::Icmp(Duration::from_millis(1))
        })
    }
}

/// Yields a different terminal outcome per last octet.
struct SelectiveProber;

impl Prober for SelectiveProber {
    fn probe<'a>(&'a self, ip: Ipv4Addr, _community: &'a str) -> BoxFuture<'a, ProbeOutcome> {
        Box::pin(async move {
            match ip.octets()[3] {
                1 => ProbeOutcome::Snmp(vec![(
                    "Nome do Sistema".to_string(),
                    "core-sw".to_string(),
                )]),
                2 => ProbeOutcome::Icmp(Duration::from_millis(2)),
                3 => ProbeOutcome::Absent,
                _ => ProbeOutcome::PermissionDenied,
            }
        })
    }
}

fn targets(last: std::ops::RangeInclusive<u8>) -> Vec<Ipv4Addr> {
    last.map(|n| Ipv4Addr::new(10, 0, 0, n)).collect()
}

fn dispatcher(prober: Arc<dyn Prober>, pool: usize) -> ScanDispatcher {
    ScanDispatcher::new(prober, Arc::new(NullEnricher), Arc::new(Semaphore::new(pool)))
}

#[tokio::test]
async fn pool_bounds_concurrent_units() {
    let prober = Arc::new(CountingProber::new(Duration::from_millis(20)));
    let dispatcher = dispatcher(Arc::clone(&prober) as Arc<dyn Prober>, 4);

    let report = dispatcher.dispatch(&targets(1..=40), "public").await;

    assert_eq!(report.hosts.len(), 40, "every unit must reach a terminal outcome");
    let peak = prober.max_in_flight.load(Ordering::SeqCst);
    assert!(peak <= 4, "peak concurrency {} exceeded the pool of 4", peak);
}

#[tokio::test]
async fn report_preserves_enumeration_order() {
    let dispatcher = dispatcher(Arc::new(ReverseDelayProber), 16);
    let hosts = targets(1..=12);

    let report = dispatcher.dispatch(&hosts, "public").await;

    let got: Vec<String> = report.hosts.iter().map(|h| h.ip.clone()).collect();
    let expected: Vec<String> = hosts.iter().map(|ip| ip.to_string()).collect();
    assert_eq!(got, expected);
}

#[tokio::test]
async fn panicking_unit_is_isolated() {
    let victim = Ipv4Addr::new(10, 0, 0, 3);
    let dispatcher = dispatcher(Arc::new(FaultyProber { victim }), 8);

    let report = dispatcher.dispatch(&targets(1..=6), "public").await;

    assert_eq!(report.hosts.len(), 5);
    assert!(!report.hosts.iter().any(|h| h.ip == "10.0.0.3"));
}

#[tokio::test]
async fn only_live_hosts_reach_the_report() {
    let dispatcher = dispatcher(Arc::new(SelectiveProber), 8);

    let report = dispatcher.dispatch(&targets(1..=4), "public").await;

    assert_eq!(report.hosts.len(), 2);
    assert_eq!(report.hosts[0].ip, "10.0.0.1");
    assert_eq!(
        report.hosts[0].snmp_attributes.as_deref(),
        Some(&[("Nome do Sistema".to_string(), "core-sw".to_string())][..])
    );
    assert_eq!(report.hosts[1].ip, "10.0.0.2");
    assert!(report.hosts[1].snmp_attributes.is_none());
}

#[tokio::test]
async fn empty_host_list_yields_an_empty_report() {
    let dispatcher = dispatcher(Arc::new(SelectiveProber), 8);
    let report = dispatcher.dispatch(&[], "public").await;
    assert!(report.is_empty());
}
