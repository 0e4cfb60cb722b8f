//! Server connection records and config loading.
//!
//! The config source is a JSON array of objects, each
//! `{"name": string, "host": string, "port": integer}`. Records are
//! returned in file order; the registry applies last-one-wins per name.

use crate::error::ConfigError;
use serde::Deserialize;
use std::path::Path;

/// Static connection info for one named server.
///
/// Immutable once loaded. `name` keys the registry; `host`/`port` are used
/// verbatim when a connection is created.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerInfo {
    /// Unique, non-empty registry key.
    pub name: String,
    /// Host name or address.
    pub host: String,
    /// TCP port, 1-65535.
    pub port: u16,
}

/// Loads server records from a JSON config file.
///
/// # Errors
/// Returns `ConfigError::Io` if the file cannot be read, and any error
/// [`parse_server_info`] reports for its content.
pub fn load_server_info(path: impl AsRef<Path>) -> Result<Vec<ServerInfo>, ConfigError> {
    let text = std::fs::read_to_string(path)?;
    parse_server_info(&text)
}

/// Parses server records from JSON text and validates them.
///
/// # Errors
/// Returns `ConfigError::InvalidJson` for malformed JSON or a non-array
/// top level, `EmptyName` for a record with an empty name, and
/// `InvalidPort` for port 0. Ports above 65535 are rejected by the JSON
/// deserializer itself.
pub fn parse_server_info(text: &str) -> Result<Vec<ServerInfo>, ConfigError> {
    let records: Vec<ServerInfo> = serde_json::from_str(text)?;

    for (index, record) in records.iter().enumerate() {
        if record.name.is_empty() {
            return Err(ConfigError::EmptyName { index });
        }
        if record.port == 0 {
            return Err(ConfigError::InvalidPort {
                name: record.name.clone(),
            });
        }
    }

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_server_info() {
        let records = parse_server_info(
            r#"[
                {"name": "gmsv", "host": "127.0.0.1", "port": 9000},
                {"name": "chat", "host": "chat.example.com", "port": 9001}
            ]"#,
        )
        .unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "gmsv");
        assert_eq!(records[0].host, "127.0.0.1");
        assert_eq!(records[0].port, 9000);
        assert_eq!(records[1].name, "chat");
    }

    #[test]
    fn test_parse_preserves_order_with_duplicates() {
        let records = parse_server_info(
            r#"[
                {"name": "gmsv", "host": "old.example.com", "port": 1},
                {"name": "gmsv", "host": "new.example.com", "port": 2}
            ]"#,
        )
        .unwrap();

        // Last-wins is applied by the registry; the loader keeps file order.
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].host, "new.example.com");
    }

    #[test]
    fn test_parse_rejects_port_zero() {
        let err = parse_server_info(r#"[{"name": "gmsv", "host": "h", "port": 0}]"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort { name } if name == "gmsv"));
    }

    #[test]
    fn test_parse_rejects_empty_name() {
        let err = parse_server_info(r#"[{"name": "", "host": "h", "port": 1}]"#).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyName { index: 0 }));
    }

    #[test]
    fn test_parse_rejects_port_out_of_range() {
        let err =
            parse_server_info(r#"[{"name": "gmsv", "host": "h", "port": 70000}]"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidJson(_)));
    }

    #[test]
    fn test_parse_rejects_non_array() {
        let err = parse_server_info(r#"{"name": "gmsv"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidJson(_)));
    }

    #[test]
    fn test_load_server_info_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"name": "gmsv", "host": "127.0.0.1", "port": 9000}}]"#
        )
        .unwrap();

        let records = load_server_info(file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "gmsv");
    }

    #[test]
    fn test_load_server_info_missing_file() {
        let err = load_server_info("/nonexistent/conf.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
