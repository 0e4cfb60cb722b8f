//! Listener traits for received payloads and receive-path errors.

use crate::error::ClientError;
use serde_json::Value;

/// Trait for handling payloads delivered to one topic.
pub trait TopicListener: Send + Sync {
    /// Called with the `contents` of an envelope addressed to this
    /// listener's topic, on the session's receive task.
    fn on_receive(&self, contents: &Value);
}

/// Wrapper to convert a closure into a TopicListener.
pub struct FnListener<F> {
    listener: F,
}

impl<F> FnListener<F>
where
    F: Fn(&Value) + Send + Sync,
{
    /// Creates a new function listener.
    pub fn new(listener: F) -> Self {
        Self { listener }
    }
}

impl<F> TopicListener for FnListener<F>
where
    F: Fn(&Value) + Send + Sync,
{
    fn on_receive(&self, contents: &Value) {
        (self.listener)(contents);
    }
}

/// Trait for the receive task's error channel.
///
/// Receive-path failures have no caller to return to; they are reported
/// here instead of terminating the session. The receive loop continues
/// after every reported protocol error.
pub trait ErrorListener: Send + Sync {
    /// Called once per undeliverable envelope or terminal stream failure.
    fn on_error(&self, error: &ClientError);
}

/// Wrapper to convert a closure into an ErrorListener.
pub struct FnErrorListener<F> {
    listener: F,
}

impl<F> FnErrorListener<F>
where
    F: Fn(&ClientError) + Send + Sync,
{
    /// Creates a new function error listener.
    pub fn new(listener: F) -> Self {
        Self { listener }
    }
}

impl<F> ErrorListener for FnErrorListener<F>
where
    F: Fn(&ClientError) + Send + Sync,
{
    fn on_error(&self, error: &ClientError) {
        (self.listener)(error);
    }
}
