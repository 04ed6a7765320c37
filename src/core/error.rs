/*!
Error handling for the QKD protocol.

Every failure is local to one session; nothing here propagates across
connections. Eavesdrop detection is deliberately an error value rather than
a process exit so the listener decides how to tear the session down.
*/

use std::io;
use thiserror::Error;

/// Result type for the QKD protocol
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the QKD protocol
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Peer disconnected mid-frame
    #[error("transport closed by peer")]
    TransportClosed,

    /// Subset hash mismatch during validation
    #[error("eavesdropper detected on the quantum channel")]
    EavesdropDetected,

    /// Sifted key stayed under the minimum across the allowed rounds
    #[error("sifted key below {minimum} bits after {rounds} rounds")]
    TooManyRetries {
        /// Rounds attempted before giving up
        rounds: u32,
        /// Minimum sifted-key length that was never reached
        minimum: usize,
    },

    /// Registration endpoint rejected the key or was unreachable
    #[error("key registration failed")]
    RegistrationFailed,

    /// Registration HTTP client could not be constructed
    #[error("registration client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Malformed wire message
    #[error("invalid message format: {0}")]
    InvalidFormat(String),
}

impl Error {
    /// Shorthand for an [`Error::InvalidFormat`]
    pub fn format(msg: impl Into<String>) -> Self {
        Error::InvalidFormat(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::TransportClosed;
        assert_eq!(format!("{}", err), "transport closed by peer");

        let err = Error::TooManyRetries {
            rounds: 64,
            minimum: 128,
        };
        assert_eq!(
            format!("{}", err),
            "sifted key below 128 bits after 64 rounds"
        );

        let err = Error::format("bad basis token");
        assert_eq!(format!("{}", err), "invalid message format: bad basis token");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::ConnectionReset, "reset");
        let err = Error::from(io_err);
        assert!(matches!(err, Error::Io(_)));
    }
}
