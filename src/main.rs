//! netsonda — network discovery service entry point.
//!
//! Binds the TCP front end and wires the production probe chain:
//! SNMP detail query, ICMP echo fallback, DNS/ARP/vendor enrichment.

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::Semaphore;

use netsonda::cli::{CliCommand, parse_cli_args, usage_text, version_text};
use netsonda::log_error;
use netsonda::network::OuiVendorResolver;
use netsonda::scanner::{ChainProber, HostEnricher, IcmpClient, ScanDispatcher, SnmpClient};
use netsonda::server::ScanServer;

#[tokio::main]
async fn main() {
    if let Err(e) = netsonda::logging::init_logging() {
        eprintln!("[WARN] Failed to initialize structured logging: {}", e);
    }

    match run(std::env::args().skip(1)).await {
        Ok(()) => {}
        Err(e) => {
            log_error!("{:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run<I, S>(args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    match parse_cli_args(args)? {
        CliCommand::Help => {
            println!("{}", usage_text());
            Ok(())
        }
        CliCommand::Version => {
            println!("{}", version_text());
            Ok(())
        }
        CliCommand::Serve(config) => {
            let vendors = Arc::new(OuiVendorResolver::new()?);
            let enricher = Arc::new(HostEnricher::new(vendors));
            let prober = Arc::new(ChainProber::new(
                Arc::new(SnmpClient::new()),
                Arc::new(IcmpClient::new()),
            ));
            let workers = Arc::new(Semaphore::new(config.max_workers));
            let dispatcher = Arc::new(ScanDispatcher::new(prober, enricher, workers));

            let server = ScanServer::bind(&config, dispatcher).await?;
            server.run().await
        }
    }
}
