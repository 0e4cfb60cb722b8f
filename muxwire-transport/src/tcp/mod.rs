//! TCP client connection.

mod connection;

pub use connection::{
    ChunkReceiver, Connection, DEFAULT_CONNECT_TIMEOUT, FnReceiver, RECV_BUFFER_SIZE,
};
