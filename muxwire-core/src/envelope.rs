//! The wire-level JSON envelope.
//!
//! Every message on the wire is one JSON object of the shape
//! `{"on": "<topic>", "contents": <value>}`. The `on` field selects the
//! listener on the receiving side; `contents` is an arbitrary JSON value.
//! The shape is symmetric: the send path wraps the batched key/value buffer
//! the same way the receive path unwraps it.

use crate::error::ProtocolError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One wire message: a topic and an arbitrary JSON payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Topic the payload is addressed to.
    pub on: String,
    /// Payload value.
    pub contents: Value,
}

impl Envelope {
    /// Creates an envelope for the given topic and payload.
    #[must_use]
    pub fn new(topic: impl Into<String>, contents: Value) -> Self {
        Self {
            on: topic.into(),
            contents,
        }
    }

    /// Parses an envelope from wire text.
    ///
    /// Parsing goes through a generic `Value` first so that a missing or
    /// mistyped `on` field is reported distinctly from malformed JSON.
    /// An absent `contents` field is treated as `null`.
    ///
    /// # Errors
    /// Returns `ProtocolError::InvalidJson` if `text` is not JSON,
    /// `MissingTopic` if the object has no `on` field, and `InvalidTopic`
    /// if `on` is not a string.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let value: Value = serde_json::from_str(text)?;

        let topic = match value.get("on") {
            None => return Err(ProtocolError::MissingTopic),
            Some(Value::String(s)) => s.clone(),
            Some(_) => return Err(ProtocolError::InvalidTopic),
        };

        let contents = value.get("contents").cloned().unwrap_or(Value::Null);

        Ok(Self {
            on: topic,
            contents,
        })
    }

    /// Serializes the envelope to wire text.
    ///
    /// # Errors
    /// Returns `ProtocolError::InvalidJson` if the payload cannot be
    /// serialized (non-string map keys and similar).
    pub fn to_wire(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_valid_envelope() {
        let env = Envelope::parse(r#"{"on":"chat","contents":{"text":"hi"}}"#).unwrap();
        assert_eq!(env.on, "chat");
        assert_eq!(env.contents, json!({"text": "hi"}));
    }

    #[test]
    fn test_parse_missing_contents_is_null() {
        let env = Envelope::parse(r#"{"on":"ping"}"#).unwrap();
        assert_eq!(env.on, "ping");
        assert_eq!(env.contents, Value::Null);
    }

    #[test]
    fn test_parse_missing_topic() {
        let err = Envelope::parse(r#"{"contents":1}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::MissingTopic));
    }

    #[test]
    fn test_parse_non_string_topic() {
        let err = Envelope::parse(r#"{"on":42,"contents":1}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidTopic));
    }

    #[test]
    fn test_parse_invalid_json() {
        let err = Envelope::parse("not json at all").unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidJson(_)));
    }

    #[test]
    fn test_wire_shape() {
        let env = Envelope::new("state", json!({"x": 1}));
        let text = env.to_wire().unwrap();
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["on"], "state");
        assert_eq!(value["contents"]["x"], 1);
    }

    #[test]
    fn test_wire_round_trip() {
        let env = Envelope::new("move", json!({"dx": 3, "dy": -1}));
        let parsed = Envelope::parse(&env.to_wire().unwrap()).unwrap();
        assert_eq!(parsed, env);
    }
}
