//! Error types for envelope and configuration handling.

use thiserror::Error;

/// Error type for malformed or undeliverable envelopes.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Received bytes were not valid UTF-8.
    #[error("received chunk is not valid UTF-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// Received text was not valid JSON.
    #[error("invalid JSON envelope: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// Envelope has no `on` field.
    #[error("envelope is missing the \"on\" topic field")]
    MissingTopic,

    /// Envelope `on` field is not a string.
    #[error("envelope \"on\" field is not a string")]
    InvalidTopic,

    /// No listener is registered for the envelope's topic.
    #[error("no listener registered for topic {topic:?}")]
    NoListener {
        /// Topic carried by the undeliverable envelope.
        topic: String,
    },
}

/// Error type for server-info configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// Config file was not a valid JSON array of server records.
    #[error("invalid config JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A record carries port 0, which is not a connectable port.
    #[error("server {name:?} has invalid port 0")]
    InvalidPort {
        /// Name of the offending record.
        name: String,
    },

    /// A record carries an empty name, which cannot key the registry.
    #[error("server record at index {index} has an empty name")]
    EmptyName {
        /// Position of the offending record in the config array.
        index: usize,
    },
}
