//! Prelude module for convenient imports.
//!
//! This module re-exports the most commonly used types and traits.
//!
//! ```ignore
//! use muxwire::prelude::*;
//! ```

// Core types
pub use muxwire_core::{
    ConfigError, Envelope, ProtocolError, ServerInfo, load_server_info, parse_server_info,
};

// Transport types
pub use muxwire_transport::{ChunkReceiver, Connection, FnReceiver, TransportError};

// Client types
pub use muxwire_client::{
    ClientError, ConnectionRegistry, ErrorListener, FnErrorListener, FnListener, ServerSession,
    TopicListener,
};
