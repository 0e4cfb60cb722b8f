//! Error types for transport operations.

use thiserror::Error;

/// Error type for transport operations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection establishment failed.
    #[error("connection failed: {0}")]
    Connect(#[source] std::io::Error),

    /// Connection establishment timed out.
    #[error("connection timeout")]
    ConnectTimeout,

    /// IO error on an established stream.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Connection is closed.
    #[error("connection closed")]
    Closed,
}
