//! Error types for basic-mcp-server.
//!
//! Only [`ConfigError`], [`TransportError`] and [`ServerError`] are fatal. Protocol-level
//! failures live in [`crate::mcp::dispatcher::DispatchError`] and are turned
//! into JSON-RPC error responses; tool failures live in
//! [`crate::tools::ToolFault`] and are reported as `isError` results.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },
}

/// Errors raised by the message transport.
///
/// Every variant is unrecoverable: a single-session stdio stream cannot be
/// resynchronised once a frame has been lost or mangled.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Reading from the inbound stream failed.
    #[error("failed to read from transport")]
    Read(#[source] io::Error),

    /// Writing to the outbound stream failed.
    #[error("failed to write to transport")]
    Write(#[source] io::Error),

    /// The stream ended in the middle of a message.
    #[error("stream closed mid-message ({bytes} bytes without terminating newline)")]
    Truncated {
        /// Number of bytes of the incomplete frame.
        bytes: usize,
    },

    /// A frame exceeded the configured size limit.
    #[error("frame of {bytes} bytes exceeds limit of {limit} bytes")]
    FrameTooLarge {
        /// Size of the offending frame.
        bytes: usize,
        /// Configured limit.
        limit: usize,
    },

    /// A frame could not be decoded as JSON.
    #[error("frame is not valid JSON")]
    Decode(#[source] serde_json::Error),

    /// An outgoing message could not be encoded.
    #[error("failed to encode outgoing message")]
    Encode(#[source] serde_json::Error),
}

/// Errors that end a server session.
#[derive(Error, Debug)]
pub enum ServerError {
    /// Shutdown signal handlers could not be installed.
    #[error("failed to install signal handler")]
    Signal(#[source] io::Error),

    /// The transport failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let error = ConfigError::NotFound {
            path: PathBuf::from("/path/to/config.json"),
        };
        let msg = error.to_string();
        assert!(msg.contains("not found"));
        assert!(msg.contains("config.json"));
    }

    #[test]
    fn validation_error_display() {
        let error = ConfigError::ValidationError {
            message: "invalid setting".to_string(),
        };
        let msg = error.to_string();
        assert!(msg.contains("invalid setting"));
    }

    #[test]
    fn truncated_display_mentions_size() {
        let msg = TransportError::Truncated { bytes: 17 }.to_string();
        assert!(msg.contains("mid-message"));
        assert!(msg.contains("17"));
    }

    #[test]
    fn decode_error_keeps_source() {
        use std::error::Error as _;

        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = TransportError::Decode(json_err);
        assert!(error.source().is_some());
    }

    #[test]
    fn server_error_is_transparent_over_transport() {
        let error = ServerError::from(TransportError::FrameTooLarge {
            bytes: 2048,
            limit: 1024,
        });
        assert_eq!(error.to_string(), "frame of 2048 bytes exceeds limit of 1024 bytes");
    }
}
