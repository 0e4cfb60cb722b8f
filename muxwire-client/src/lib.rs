//! # Muxwire Client
//!
//! Client-side multiplexer for muxwire.
//!
//! This crate provides:
//! - [`ServerSession`] - one connection's send buffer and per-topic dispatch
//! - [`ConnectionRegistry`] - the name-keyed directory of server info and
//!   live sessions
//! - Listener traits for topic payloads and receive-path errors

pub mod error;
pub mod listener;
pub mod registry;
pub mod session;

pub use error::ClientError;
pub use listener::{ErrorListener, FnErrorListener, FnListener, TopicListener};
pub use registry::ConnectionRegistry;
pub use session::ServerSession;
