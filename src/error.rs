use std::io;
use thiserror::Error;

/// Failures surfaced to the process driver; each one ends the process
/// with a non-zero exit code.
#[derive(Debug, Error)]
pub enum Error {
    /// Missing or malformed command line flags.
    #[error("invalid arguments: {0}")]
    Config(String),

    /// The host could not be turned into an address.
    #[error("failed to resolve {host}: {source}")]
    Resolve {
        host: String,
        #[source]
        source: io::Error,
    },

    /// Echo session could not be started. Not fatal to a run.
    #[error("probe setup failed: {0}")]
    Setup(String),

    #[error("io error: {0}")]
    Io(#[from] io::Error),
}
