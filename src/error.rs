use std::io;
use thiserror::Error;

/// Errors surfaced by the server lifecycle
///
/// Per-request failures never appear here: the protocol deliberately
/// degrades malformed commands to empty success responses (an AirPlay
/// client has no defined handling for error payloads, and a failed
/// response breaks the session). Only startup/shutdown and transport
/// problems are worth reporting to the host process.
#[derive(Debug, Error)]
pub enum AirPlayerError {
    /// Server already running
    #[error("server already running")]
    AlreadyRunning,

    /// Service advertisement error
    #[error("advertisement error: {0}")]
    Advertisement(String),

    /// Network error
    #[error("network error: {0}")]
    Network(String),

    /// No backend factory registered under the given identifier
    #[error("unknown media backend: {id} (available: {available})")]
    UnknownBackend {
        /// The identifier that was requested
        id: String,
        /// Comma-separated list of registered identifiers
        available: String,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type alias for server operations
pub type Result<T> = std::result::Result<T, AirPlayerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AirPlayerError::UnknownBackend {
            id: "vlc".to_string(),
            available: "null".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unknown media backend: vlc (available: null)"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::AddrInUse, "in use");
        let err: AirPlayerError = io_err.into();
        assert!(matches!(err, AirPlayerError::Io(_)));
    }

    #[test]
    fn test_error_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AirPlayerError>();
    }
}
