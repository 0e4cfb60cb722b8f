//! # Muxwire Core
//!
//! Core types shared by the muxwire transport and client crates.
//!
//! This crate provides:
//! - The [`Envelope`] wire object (`{"on": topic, "contents": value}`)
//! - [`ServerInfo`] connection records and JSON config loading
//! - Error types for protocol and configuration failures

pub mod config;
pub mod envelope;
pub mod error;

pub use config::{ServerInfo, load_server_info, parse_server_info};
pub use envelope::Envelope;
pub use error::{ConfigError, ProtocolError};
