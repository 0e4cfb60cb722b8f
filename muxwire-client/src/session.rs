//! Per-server session: outgoing buffer, listener table, envelope dispatch.

use crate::error::ClientError;
use crate::listener::{ErrorListener, TopicListener};
use muxwire_core::{Envelope, ProtocolError};
use muxwire_transport::{ChunkReceiver, Connection, TransportError};
use parking_lot::{Mutex, RwLock};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Shared session state, installed as the connection's byte receiver.
///
/// Lives behind an `Arc` so the receive task and caller threads share it.
/// Listener callbacks run on the receive task and may run concurrently
/// with buffer mutation from caller threads; both maps are lock-guarded.
struct SessionState {
    send_buf: Mutex<Map<String, Value>>,
    listeners: RwLock<HashMap<String, Arc<dyn TopicListener>>>,
    error_listener: RwLock<Option<Arc<dyn ErrorListener>>>,
}

impl SessionState {
    fn new() -> Self {
        Self {
            send_buf: Mutex::new(Map::new()),
            listeners: RwLock::new(HashMap::new()),
            error_listener: RwLock::new(None),
        }
    }

    /// Parses one chunk as an envelope and invokes the matching listener.
    fn dispatch(&self, chunk: &[u8]) -> Result<(), ProtocolError> {
        let text = std::str::from_utf8(chunk)?;
        let envelope = Envelope::parse(text)?;

        // Clone out of the table so the callback runs without the lock.
        let listener = self.listeners.read().get(&envelope.on).cloned();
        match listener {
            Some(listener) => {
                listener.on_receive(&envelope.contents);
                Ok(())
            }
            None => Err(ProtocolError::NoListener { topic: envelope.on }),
        }
    }

    fn report(&self, error: ClientError) {
        let hook = self.error_listener.read().clone();
        match hook {
            Some(hook) => hook.on_error(&error),
            None => tracing::warn!(error = %error, "receive error with no error listener"),
        }
    }
}

impl ChunkReceiver for SessionState {
    fn on_chunk(&self, chunk: &[u8]) {
        // One bad envelope is reported and dropped; the loop continues.
        if let Err(e) = self.dispatch(chunk) {
            tracing::warn!(error = %e, "dropping undeliverable envelope");
            self.report(e.into());
        }
    }

    fn on_closed(&self, reason: TransportError) {
        self.report(reason.into());
    }
}

/// One server connection with keyed send batching and per-topic dispatch.
///
/// Outgoing key/value pairs accumulate in a buffer until an explicit
/// [`flush`](Self::flush) wraps them in one [`Envelope`] and sends it.
/// Incoming envelopes are routed by their `on` topic to the registered
/// listener.
pub struct ServerSession {
    conn: Connection,
    state: Arc<SessionState>,
}

impl ServerSession {
    /// Connects to `host:port` and installs the session as the
    /// connection's receiver.
    ///
    /// # Errors
    /// Returns `ClientError::Transport` if the connection cannot be
    /// established.
    pub async fn connect(host: &str, port: u16) -> Result<Self, ClientError> {
        let state = Arc::new(SessionState::new());
        let conn = Connection::connect(host, port, state.clone()).await?;
        Ok(Self { conn, state })
    }

    /// Upserts `key -> value` into the outgoing buffer. No I/O.
    pub fn add_send_data(&self, key: impl Into<String>, value: Value) {
        self.state.send_buf.lock().insert(key.into(), value);
    }

    /// Returns the number of buffered key/value pairs.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.state.send_buf.lock().len()
    }

    /// Drains the outgoing buffer and sends it as one envelope under
    /// `topic`.
    ///
    /// An empty buffer still sends an envelope with empty contents; every
    /// flush emits exactly one envelope. The buffer is drained before the
    /// write, so a failed send discards the drained batch.
    ///
    /// # Errors
    /// Returns `ClientError::Transport` if the send fails.
    pub async fn flush(&self, topic: &str) -> Result<(), ClientError> {
        let contents = std::mem::take(&mut *self.state.send_buf.lock());
        let text = Envelope::new(topic, Value::Object(contents)).to_wire()?;
        self.conn.send(&text).await?;
        Ok(())
    }

    /// Registers the listener for `topic`, silently replacing any
    /// previous one.
    pub fn set_receive_listener<L: TopicListener + 'static>(&self, topic: impl Into<String>, listener: L) {
        self.state
            .listeners
            .write()
            .insert(topic.into(), Arc::new(listener));
    }

    /// Installs the receive-path error channel, replacing any previous
    /// one. Without one, receive errors are logged and dropped.
    pub fn set_error_listener<L: ErrorListener + 'static>(&self, listener: L) {
        *self.state.error_listener.write() = Some(Arc::new(listener));
    }

    /// Closes the underlying connection. Idempotent.
    pub fn close(&self) {
        self.conn.close();
    }

    /// Returns true once the session is closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.conn.is_closed()
    }

    /// Waits for the session's receive task to terminate.
    pub async fn closed(&self) {
        self.conn.closed().await;
    }
}
