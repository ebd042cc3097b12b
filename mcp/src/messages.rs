//! UI message collaborator.
//!
//! The invocation core never touches a message log directly. Every preview,
//! retraction and side message goes through a [`MessageSink`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Whether a message asks the user something or just reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Ask,
    Say,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    /// Tool call preview or approval request; payload is an approval envelope.
    UseMcpServer,
    McpServerRequestStarted,
    McpNotification,
    McpServerResponse,
    UserFeedback,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::UseMcpServer => "use_mcp_server",
            MessageType::McpServerRequestStarted => "mcp_server_request_started",
            MessageType::McpNotification => "mcp_notification",
            MessageType::McpServerResponse => "mcp_server_response",
            MessageType::UserFeedback => "user_feedback",
        }
    }
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait]
pub trait MessageSink: Send + Sync {
    /// Retract the most recent partial message of this kind and type, if any.
    async fn remove_last_partial(&self, kind: MessageKind, message_type: MessageType);

    /// Append a message. A partial message is only replaced through
    /// [`remove_last_partial`](Self::remove_last_partial); implementations
    /// need not update it in place.
    async fn say(&self, message_type: MessageType, text: Option<&str>, partial: bool);

    /// Show a partial ask. Nothing is awaited from the user. Same append-only
    /// contract as [`say`](Self::say).
    async fn ask_partial(&self, message_type: MessageType, text: &str);

    /// OS-level notification shown before a manual approval.
    fn show_notification(&self, message: &str);

    async fn update_task_progress(&self, progress: &str);
}
