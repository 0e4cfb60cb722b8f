//! Name-keyed directory of server info and live sessions.

use crate::error::ClientError;
use crate::listener::{ErrorListener, TopicListener};
use crate::session::ServerSession;
use muxwire_core::{ServerInfo, load_server_info};
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Directory of named servers: static connection info plus live sessions.
///
/// An explicit context object, constructed once by the entry point and
/// passed by reference; independent registries can coexist (there is no
/// process-wide instance). Both maps are lock-guarded, so the registry
/// may be shared across threads.
pub struct ConnectionRegistry {
    infos: RwLock<HashMap<String, ServerInfo>>,
    sessions: RwLock<HashMap<String, Arc<ServerSession>>>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            infos: RwLock::new(HashMap::new()),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Loads server records from a JSON config file into the info map.
    ///
    /// Records are applied in file order; the last record for a given name
    /// wins. Returns the number of records read.
    ///
    /// # Errors
    /// Returns `ClientError::Config` if the file cannot be read or a
    /// record fails validation.
    pub fn load_server_info(&self, path: impl AsRef<Path>) -> Result<usize, ClientError> {
        let records = load_server_info(path)?;
        let count = records.len();

        let mut infos = self.infos.write();
        for record in records {
            infos.insert(record.name.clone(), record);
        }

        Ok(count)
    }

    /// Upserts one server record directly, bypassing the config file.
    pub fn insert_server_info(&self, info: ServerInfo) {
        self.infos.write().insert(info.name.clone(), info);
    }

    /// Returns the stored info for `name`, if any.
    #[must_use]
    pub fn server_info(&self, name: &str) -> Option<ServerInfo> {
        self.infos.read().get(name).cloned()
    }

    /// Returns the names of all configured servers.
    #[must_use]
    pub fn server_names(&self) -> Vec<String> {
        self.infos.read().keys().cloned().collect()
    }

    /// Returns true if `name` has a live session.
    #[must_use]
    pub fn is_connected(&self, name: &str) -> bool {
        self.sessions.read().contains_key(name)
    }

    /// Connects a session for the named server.
    ///
    /// Returns `Ok(false)` without side effects when `name` has no loaded
    /// info. When a live session already exists for `name`, it is closed
    /// before the new one replaces it.
    ///
    /// # Errors
    /// Returns `ClientError::Transport` if the connection attempt fails;
    /// the prior session (if any) is left in place in that case.
    pub async fn create_connection(&self, name: &str) -> Result<bool, ClientError> {
        let info = self.infos.read().get(name).cloned();
        let Some(info) = info else {
            return Ok(false);
        };

        let session = Arc::new(ServerSession::connect(&info.host, info.port).await?);

        let mut sessions = self.sessions.write();
        if let Some(old) = sessions.get(name) {
            tracing::info!(server = name, "closing replaced session");
            old.close();
        }
        sessions.insert(name.to_string(), session);

        Ok(true)
    }

    /// Registers `listener` for `topic` on the named server's session.
    ///
    /// # Errors
    /// Returns a not-found error if `name` has no live session.
    pub fn set_receive_listener<L: TopicListener + 'static>(
        &self,
        name: &str,
        topic: impl Into<String>,
        listener: L,
    ) -> Result<(), ClientError> {
        self.session(name)?.set_receive_listener(topic, listener);
        Ok(())
    }

    /// Installs the receive-path error channel on the named session.
    ///
    /// # Errors
    /// Returns a not-found error if `name` has no live session.
    pub fn set_error_listener<L: ErrorListener + 'static>(
        &self,
        name: &str,
        listener: L,
    ) -> Result<(), ClientError> {
        self.session(name)?.set_error_listener(listener);
        Ok(())
    }

    /// Buffers `key -> value` for the named server. No I/O.
    ///
    /// # Errors
    /// Returns a not-found error if `name` has no live session.
    pub fn add_send_data(
        &self,
        name: &str,
        key: impl Into<String>,
        value: Value,
    ) -> Result<(), ClientError> {
        self.session(name)?.add_send_data(key, value);
        Ok(())
    }

    /// Flushes the named server's buffer as one envelope under `topic`.
    ///
    /// # Errors
    /// Returns a not-found error if `name` has no live session, and
    /// `ClientError::Transport` if the send fails.
    pub async fn send(&self, name: &str, topic: &str) -> Result<(), ClientError> {
        self.session(name)?.flush(topic).await
    }

    /// Closes the named server's session and removes it from the registry.
    ///
    /// After this, operations on `name` report not-connected until a new
    /// `create_connection`.
    ///
    /// # Errors
    /// Returns a not-found error if `name` has no live session.
    pub fn close(&self, name: &str) -> Result<(), ClientError> {
        let session = self
            .sessions
            .write()
            .remove(name)
            .ok_or_else(|| self.missing(name))?;
        session.close();
        Ok(())
    }

    fn session(&self, name: &str) -> Result<Arc<ServerSession>, ClientError> {
        self.sessions
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| self.missing(name))
    }

    /// Distinguishes a name that was never configured from one that is
    /// configured but not currently connected.
    fn missing(&self, name: &str) -> ClientError {
        if self.infos.read().contains_key(name) {
            ClientError::NotConnected {
                name: name.to_string(),
            }
        } else {
            ClientError::UnknownServer {
                name: name.to_string(),
            }
        }
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
