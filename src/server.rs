//! One-shot TCP session handling.
//!
//! Each accepted connection carries exactly one request and one response:
//! the session reads the request, dispatches the scan, writes the report
//! and closes. Sessions are independent tasks sharing nothing but the
//! dispatcher's worker pool, and no session failure reaches the accept
//! loop.

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

use crate::config::{MAX_REQUEST_BYTES, REQUEST_IDLE_TIMEOUT, ServerConfig};
use crate::error::ScanError;
use crate::models::ScanRequest;
use crate::network::enumerate_hosts;
use crate::report::{INVALID_CIDR_MESSAGE, NO_ACTIVE_HOSTS_MESSAGE, render_report};
use crate::scanner::ScanDispatcher;
use crate::{log_stderr, log_warn};

/// The scan service's TCP front end.
pub struct ScanServer {
    listener: TcpListener,
    default_community: Arc<str>,
    dispatcher: Arc<ScanDispatcher>,
}

impl ScanServer {
    pub async fn bind(config: &ServerConfig, dispatcher: Arc<ScanDispatcher>) -> Result<Self> {
        let listener = TcpListener::bind(config.listen_addr())
            .await
            .with_context(|| format!("Failed to bind {}", config.listen_addr()))?;
        Ok(Self {
            listener,
            default_community: Arc::from(config.community.as_str()),
            dispatcher,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener
            .local_addr()
            .context("Listener has no local address")
    }

    /// Accept loop. Runs until the process exits.
    pub async fn run(self) -> Result<()> {
        log_stderr!("Listening on {}", self.local_addr()?);

        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    log_stderr!("[{}] connected", peer);
                    let dispatcher = Arc::clone(&self.dispatcher);
                    let default_community = Arc::clone(&self.default_community);
                    tokio::spawn(async move {
                        if let Err(e) =
                            handle_session(stream, peer, dispatcher, default_community).await
                        {
                            log_warn!("[{}] session ended with error: {}", peer, e);
                        }
                        log_stderr!("[{}] disconnected", peer);
                    });
                }
                Err(e) => log_warn!("Failed to accept connection: {}", e),
            }
        }
    }
}

/// One session: read request, dispatch, write response, close.
async fn handle_session(
    mut stream: TcpStream,
    peer: SocketAddr,
    dispatcher: Arc<ScanDispatcher>,
    default_community: Arc<str>,
) -> Result<()> {
    let raw = read_request(&mut stream).await.context("reading request")?;
    let message = String::from_utf8_lossy(&raw);
    let message = message.trim();
    if message.is_empty() {
        log_stderr!("[{}] closed without sending data", peer);
        return Ok(());
    }

    let request = ScanRequest::parse(message, &default_community);

    let response = match enumerate_hosts(&request.cidr) {
        Err(ScanError::InvalidCidr(_)) => {
            log_warn!("[{}] invalid CIDR received: '{}'", peer, request.cidr);
            INVALID_CIDR_MESSAGE.to_string()
        }
        Ok(hosts) if hosts.is_empty() => NO_ACTIVE_HOSTS_MESSAGE.to_string(),
        Ok(hosts) => {
            log_stderr!(
                "[{}] scanning {} hosts in {} with community '{}'",
                peer,
                hosts.len(),
                request.cidr,
                request.community
            );
            let report = dispatcher.dispatch(&hosts, &request.community).await;
            render_report(&report)
        }
    };

    stream
        .write_all(response.as_bytes())
        .await
        .context("writing response")?;
    stream.shutdown().await.context("closing connection")?;
    Ok(())
}

/// Reads the one-shot request: awaits the first chunk, then drains further
/// chunks until the peer half-closes or goes idle, bounded in size.
///
/// This serves both conforming client styles — those that half-close their
/// write side and those that send a single buffered payload and wait.
async fn read_request(stream: &mut TcpStream) -> Result<Vec<u8>> {
    let mut request = Vec::new();
    let mut chunk = [0u8; 1024];

    let n = stream.read(&mut chunk).await?;
    if n == 0 {
        return Ok(request);
    }
    request.extend_from_slice(&chunk[..n]);

    while request.len() < MAX_REQUEST_BYTES {
        match timeout(REQUEST_IDLE_TIMEOUT, stream.read(&mut chunk)).await {
            Ok(Ok(0)) => break,
            Ok(Ok(n)) => request.extend_from_slice(&chunk[..n]),
            Ok(Err(e)) => return Err(e.into()),
            Err(_) => break,
        }
    }

    Ok(request)
}
