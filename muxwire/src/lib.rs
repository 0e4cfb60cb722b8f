//! # Muxwire
//!
//! Keyed JSON publish/receive multiplexer over persistent TCP connections.
//!
//! Muxwire opens one persistent socket per named remote server, batches
//! outgoing key/value pairs into a single JSON envelope per send, and
//! routes incoming envelopes by their `"on"` topic to registered
//! listeners.
//!
//! ## Quick Start
//!
//! ```ignore
//! use muxwire::prelude::*;
//!
//! let registry = ConnectionRegistry::new();
//! registry.load_server_info("./conf.json")?;
//!
//! if registry.create_connection("gmsv").await? {
//!     registry.set_receive_listener("gmsv", "test", FnListener::new(|contents| {
//!         println!("got: {contents}");
//!     }))?;
//!
//!     registry.add_send_data("gmsv", "hp", serde_json::json!(100))?;
//!     registry.send("gmsv", "state").await?;
//! }
//! ```
//!
//! ## Crate Organization
//!
//! - [`core`] - Envelope and server-info types, config loading
//! - [`transport`] - the TCP connection primitive and its receive task
//! - [`client`] - per-server sessions and the named-connection registry

pub mod prelude;

/// Envelope and server-info types, config loading.
pub mod core {
    pub use muxwire_core::*;
}

/// TCP connection primitive.
pub mod transport {
    pub use muxwire_transport::*;
}

/// Per-server sessions and the named-connection registry.
pub mod client {
    pub use muxwire_client::*;
}

// Re-export commonly used items at the crate root
pub use muxwire_core::{Envelope, ServerInfo};
pub use muxwire_transport::{Connection, TransportError};

pub use muxwire_client::{ClientError, ConnectionRegistry, ServerSession};
