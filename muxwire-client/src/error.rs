//! Error types for client operations.

use muxwire_core::{ConfigError, ProtocolError};
use muxwire_transport::TransportError;
use thiserror::Error;

/// Error type for client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Transport error.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Config loading error.
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// Malformed or undeliverable envelope.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Server name has no loaded ServerInfo.
    #[error("unknown server {name:?}")]
    UnknownServer {
        /// The unrecognized server name.
        name: String,
    },

    /// Server name is configured but has no live session.
    #[error("server {name:?} is not connected")]
    NotConnected {
        /// The server name without a live session.
        name: String,
    },
}
