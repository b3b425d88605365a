//! Error types for the scan service.

use thiserror::Error;

/// Errors that are surfaced to the client over the wire.
///
/// Expected negative results (probe timeouts, hosts that do not answer,
/// missing enrichment data) are modelled as values, not errors; see
/// [`crate::models::ProbeOutcome`].
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("invalid CIDR notation: '{0}'")]
    InvalidCidr(String),
}
