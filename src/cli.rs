//! Command-line interface for the scan server.

use anyhow::{Result, anyhow};

use crate::config::{DEFAULT_BIND_ADDR, DEFAULT_COMMUNITY, DEFAULT_PORT, ServerConfig, max_workers};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Serve(ServerConfig),
    Help,
    Version,
}

pub fn version_text() -> String {
    format!("netsonda {}", env!("CARGO_PKG_VERSION"))
}

pub fn usage_text() -> String {
    format!(
        "{version}
netsonda — network discovery and enrichment service

Usage:
  netsonda [serve] [--bind <ADDR>] [--port <N>] [--community <NAME>] [--workers <N>]
  netsonda --help
  netsonda --version

Options:
  -b, --bind <ADDR>       Bind address (default: {default_bind})
  -p, --port <N>          TCP port (default: {default_port})
  -c, --community <NAME>  Default SNMP community for requests that omit one (default: {default_community})
  -w, --workers <N>       Worker-pool capacity shared across sessions (default: {default_workers})
  -h, --help              Show this help text
  -V, --version           Show version",
        version = version_text(),
        default_bind = DEFAULT_BIND_ADDR,
        default_port = DEFAULT_PORT,
        default_community = DEFAULT_COMMUNITY,
        default_workers = max_workers(),
    )
}

fn parse_u16_arg(flag: &str, raw: &str) -> Result<u16> {
    raw.parse::<u16>().ok().filter(|v| *v > 0).ok_or_else(|| {
        anyhow!(
            "Invalid value for {}: '{}'. Expected a positive integer.\n\n{}",
            flag,
            raw,
            usage_text()
        )
    })
}

fn parse_usize_arg(flag: &str, raw: &str) -> Result<usize> {
    raw.parse::<usize>().ok().filter(|v| *v > 0).ok_or_else(|| {
        anyhow!(
            "Invalid value for {}: '{}'. Expected a positive integer.\n\n{}",
            flag,
            raw,
            usage_text()
        )
    })
}

fn required_value<S: AsRef<str>>(flag: &str, value: Option<S>) -> Result<String> {
    value.map(|v| v.as_ref().to_string()).ok_or_else(|| {
        anyhow!("Missing value for {}.\n\n{}", flag, usage_text())
    })
}

pub fn parse_cli_args<I, S>(args: I) -> Result<CliCommand>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut config = ServerConfig::default();
    let mut saw_serve = false;
    let mut iter = args.into_iter();

    while let Some(arg) = iter.next() {
        let arg = arg.as_ref();
        match arg {
            "-h" | "--help" => return Ok(CliCommand::Help),
            "-V" | "--version" => return Ok(CliCommand::Version),
            "serve" if !saw_serve => saw_serve = true,
            "-b" | "--bind" => config.bind_addr = required_value(arg, iter.next())?,
            "-p" | "--port" => config.port = parse_u16_arg(arg, &required_value(arg, iter.next())?)?,
            "-c" | "--community" => config.community = required_value(arg, iter.next())?,
            "-w" | "--workers" => {
                config.max_workers = parse_usize_arg(arg, &required_value(arg, iter.next())?)?
            }
            other => return Err(anyhow!("Unknown argument '{}'.\n\n{}", other, usage_text())),
        }
    }

    Ok(CliCommand::Serve(config))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliCommand> {
        parse_cli_args(args.iter().copied())
    }

    #[test]
    fn no_args_serves_with_defaults() {
        let command = parse(&[]).unwrap();
        assert_eq!(command, CliCommand::Serve(ServerConfig::default()));
    }

    #[test]
    fn explicit_serve_with_overrides() {
        let command = parse(&[
            "serve",
            "--bind",
            "127.0.0.1",
            "-p",
            "9000",
            "--community",
            "lab",
            "-w",
            "8",
        ])
        .unwrap();
        match command {
            CliCommand::Serve(config) => {
                assert_eq!(config.bind_addr, "127.0.0.1");
                assert_eq!(config.port, 9000);
                assert_eq!(config.community, "lab");
                assert_eq!(config.max_workers, 8);
            }
            other => panic!("expected serve, got {:?}", other),
        }
    }

    #[test]
    fn help_and_version_win() {
        assert_eq!(parse(&["--help"]).unwrap(), CliCommand::Help);
        assert_eq!(parse(&["-V"]).unwrap(), CliCommand::Version);
    }

    #[test]
    fn unknown_argument_is_rejected() {
        assert!(parse(&["--frobnicate"]).is_err());
    }

    #[test]
    fn missing_flag_value_is_rejected() {
        assert!(parse(&["--port"]).is_err());
        assert!(parse(&["--port", "zero"]).is_err());
    }
}
