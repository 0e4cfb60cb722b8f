//! # Muxwire Transport
//!
//! TCP connection primitive for muxwire.
//!
//! This crate provides:
//! - [`tcp`] - the persistent client connection with its receive task
//! - [`ChunkReceiver`] - the byte-receiver callback installed at connect time
//! - Error types for connect and stream failures

pub mod error;
pub mod tcp;

pub use error::TransportError;
pub use tcp::{ChunkReceiver, Connection, DEFAULT_CONNECT_TIMEOUT, FnReceiver, RECV_BUFFER_SIZE};
