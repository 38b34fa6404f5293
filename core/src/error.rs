//! Error types for the query client.
//!
//! # Design
//! The query service reports failures as `{ "error": "..." }` but does not
//! guarantee the body is present or even JSON, so `Server` keeps the message
//! optional and an unreadable body gets its own variant. Requests that never
//! complete land in `Transport`. `notification_text` turns any of these into
//! the one-line message shown to the user.

use std::fmt;

use thiserror::Error;

/// Fallback text when an error response body cannot be parsed at all.
pub const UNKNOWN_ERROR: &str = "Unknown error";

/// The user-facing operation a failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Fetch,
    Add,
    Update,
    Delete,
}

impl Action {
    /// Prefix used when the request never completed.
    fn transport_prefix(self) -> &'static str {
        match self {
            Action::Fetch => "Error fetching todos",
            Action::Add => "Error adding todo",
            Action::Update => "Error updating todo",
            Action::Delete => "Error deleting todo",
        }
    }

    /// Fallback when the server failed without naming an error.
    fn server_fallback(self) -> &'static str {
        match self {
            Action::Fetch => "Failed to fetch todos",
            Action::Add => "Failed to insert todo",
            Action::Update => "Failed to update todo",
            Action::Delete => "Failed to delete todo",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::Fetch => "fetch",
            Action::Add => "add",
            Action::Update => "update",
            Action::Delete => "delete",
        };
        f.write_str(name)
    }
}

/// Errors returned by `QueryClient` build and parse methods.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never completed.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status and a JSON body.
    #[error("HTTP {status}: {}", .message.as_deref().unwrap_or("no error message"))]
    Server {
        status: u16,
        message: Option<String>,
    },

    /// The server answered with a non-2xx status and a body that is not JSON.
    #[error("HTTP {status}: unparsable error body")]
    UnparsableError { status: u16 },

    /// A 2xx body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}

impl ApiError {
    /// Text for the transient notification raised when `action` fails.
    pub fn notification_text(&self, action: Action) -> String {
        match self {
            ApiError::Transport(msg)
            | ApiError::Deserialization(msg)
            | ApiError::Serialization(msg) => {
                format!("{}: {msg}", action.transport_prefix())
            }
            ApiError::Server {
                message: Some(message),
                ..
            } => message.clone(),
            ApiError::Server { message: None, .. } => action.server_fallback().to_string(),
            ApiError::UnparsableError { .. } => UNKNOWN_ERROR.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_is_shown_verbatim() {
        let err = ApiError::Server {
            status: 400,
            message: Some("bad sql".to_string()),
        };
        assert_eq!(err.notification_text(Action::Fetch), "bad sql");
    }

    #[test]
    fn missing_server_message_uses_action_fallback() {
        let err = ApiError::Server {
            status: 500,
            message: None,
        };
        assert_eq!(err.notification_text(Action::Fetch), "Failed to fetch todos");
        assert_eq!(err.notification_text(Action::Add), "Failed to insert todo");
        assert_eq!(err.notification_text(Action::Update), "Failed to update todo");
        assert_eq!(err.notification_text(Action::Delete), "Failed to delete todo");
    }

    #[test]
    fn unparsable_body_uses_fixed_text() {
        let err = ApiError::UnparsableError { status: 502 };
        assert_eq!(err.notification_text(Action::Delete), UNKNOWN_ERROR);
    }

    #[test]
    fn transport_failure_is_prefixed_by_action() {
        let err = ApiError::Transport("connection refused".to_string());
        assert_eq!(
            err.notification_text(Action::Add),
            "Error adding todo: connection refused"
        );
        assert_eq!(
            err.notification_text(Action::Fetch),
            "Error fetching todos: connection refused"
        );
    }
}
