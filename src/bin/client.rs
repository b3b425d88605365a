//! Protocol client for the scan service.
//!
//! Sends one `"<cidr>;<community>"` request, half-closes the write side to
//! signal the end of the request, and prints the EOF-terminated response.

use anyhow::{Context, Result, anyhow};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use netsonda::config::{DEFAULT_COMMUNITY, DEFAULT_PORT};

#[derive(Debug, PartialEq, Eq)]
struct ClientArgs {
    cidr: String,
    host: String,
    port: u16,
    community: String,
}

fn usage_text() -> String {
    format!(
        "netsonda-client {version}

Usage:
  netsonda-client <CIDR> [--host <ADDR>] [--port <N>] [--community <NAME>]

Options:
      --host <ADDR>       Server address (default: 127.0.0.1)
  -p, --port <N>          Server port (default: {default_port})
  -c, --community <NAME>  SNMP community sent with the request (default: {default_community})
  -h, --help              Show this help text",
        version = env!("CARGO_PKG_VERSION"),
        default_port = DEFAULT_PORT,
        default_community = DEFAULT_COMMUNITY,
    )
}

fn required_value<S: AsRef<str>>(flag: &str, value: Option<S>) -> Result<String> {
    value
        .map(|v| v.as_ref().to_string())
        .ok_or_else(|| anyhow!("Missing value for {}.\n\n{}", flag, usage_text()))
}

/// Returns `None` when the invocation only asked for help.
fn parse_args<I, S>(args: I) -> Result<Option<ClientArgs>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut cidr: Option<String> = None;
    let mut host = "127.0.0.1".to_string();
    let mut port = DEFAULT_PORT;
    let mut community = DEFAULT_COMMUNITY.to_string();
    let mut iter = args.into_iter();

    while let Some(arg) = iter.next() {
        let arg = arg.as_ref();
        match arg {
            "-h" | "--help" => return Ok(None),
            "--host" => host = required_value(arg, iter.next())?,
            "-p" | "--port" => {
                let raw = required_value(arg, iter.next())?;
                port = raw.parse::<u16>().ok().filter(|v| *v > 0).ok_or_else(|| {
                    anyhow!("Invalid value for {}: '{}'.\n\n{}", arg, raw, usage_text())
                })?;
            }
            "-c" | "--community" => community = required_value(arg, iter.next())?,
            positional if cidr.is_none() && !positional.starts_with('-') => {
                cidr = Some(positional.to_string());
            }
            other => return Err(anyhow!("Unknown argument '{}'.\n\n{}", other, usage_text())),
        }
    }

    let cidr = cidr.ok_or_else(|| anyhow!("Missing <CIDR> argument.\n\n{}", usage_text()))?;
    Ok(Some(ClientArgs {
        cidr,
        host,
        port,
        community,
    }))
}

#[tokio::main]
async fn main() {
    match run(std::env::args().skip(1)).await {
        Ok(()) => {}
        Err(e) => {
            eprintln!("{:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run<I, S>(args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let Some(args) = parse_args(args)? else {
        println!("{}", usage_text());
        return Ok(());
    };

    let addr = format!("{}:{}", args.host, args.port);
    let mut stream = TcpStream::connect(&addr)
        .await
        .with_context(|| format!("Connection to {} refused; is the server running?", addr))?;

    let request = format!("{};{}", args.cidr, args.community);
    stream
        .write_all(request.as_bytes())
        .await
        .context("sending request")?;
    // Half-close the write side so the server sees the end of the request.
    stream.shutdown().await.context("half-closing connection")?;

    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .context("reading response")?;
    print!("{}", response);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_cidr_with_defaults() {
        let args = parse_args(["192.168.1.0/24"]).unwrap().unwrap();
        assert_eq!(args.cidr, "192.168.1.0/24");
        assert_eq!(args.host, "127.0.0.1");
        assert_eq!(args.port, DEFAULT_PORT);
        assert_eq!(args.community, DEFAULT_COMMUNITY);
    }

    #[test]
    fn parse_full_flags() {
        let args = parse_args(["10.0.0.0/30", "--host", "scanner.lan", "-p", "9000", "-c", "lab"])
            .unwrap()
            .unwrap();
        assert_eq!(args.host, "scanner.lan");
        assert_eq!(args.port, 9000);
        assert_eq!(args.community, "lab");
    }

    #[test]
    fn missing_cidr_is_rejected() {
        assert!(parse_args(["--host", "scanner.lan"]).is_err());
    }

    #[test]
    fn help_short_circuits() {
        assert!(parse_args(["-h"]).unwrap().is_none());
    }
}
