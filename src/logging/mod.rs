//! Structured logging for the scan service.
//!
//! Console output goes to stderr; a daily-rolling JSON log file is kept
//! under the per-user data directory.

pub mod macros;

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the logging system.
///
/// Set `RUST_LOG` to control the level (`info` by default):
/// - `RUST_LOG=debug` for debug level
/// - `RUST_LOG=trace` for trace level
pub fn init_logging() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "netsonda.log");

    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact();

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .json();

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new("info"))?;

    let init_result = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();

    if let Err(e) = init_result {
        // Avoid panicking when another subsystem/test already installed a global subscriber.
        if e.to_string().contains("already been set") {
            return Ok(log_dir);
        }
        return Err(Box::new(e));
    }

    tracing::info!("Logging initialized. Log directory: {}", log_dir.display());

    Ok(log_dir)
}

/// Returns `%APPDATA%/netsonda/logs` on Windows, `~/.config/netsonda/logs`
/// on Linux/macOS.
fn get_log_directory() -> Result<PathBuf, Box<dyn std::error::Error>> {
    let base_dir = if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .ok_or("Could not find APPDATA directory")?
            .join("netsonda")
    } else {
        dirs::config_dir()
            .ok_or("Could not find config directory")?
            .join("netsonda")
    };

    Ok(base_dir.join("logs"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_directory_path() {
        let log_dir = get_log_directory().expect("Should get log directory");
        assert!(log_dir.to_string_lossy().contains("netsonda"));
        assert!(log_dir.to_string_lossy().contains("logs"));
    }
}
