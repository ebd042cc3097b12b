//! Out-of-band server notifications.

use std::{collections::VecDeque, sync::Arc};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::ToolRegistry;
use crate::messages::{MessageSink, MessageType};

/// A message a server emitted outside the request/response path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub server_name: String,
    pub message: String,
}

impl Notification {
    pub fn new(server_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            server_name: server_name.into(),
            message: message.into(),
        }
    }

    /// Text shown to the user, tagged with the originating server.
    pub fn display_text(&self) -> String {
        format!("[{}] {}", self.server_name, self.message)
    }
}

/// FIFO buffer a registry can use to hold notifications until drained.
#[derive(Debug, Default)]
pub struct NotificationQueue {
    pending: Mutex<VecDeque<Notification>>,
}

impl NotificationQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, notification: Notification) {
        self.pending.lock().push_back(notification);
    }

    /// Take everything queued so far. Read and clear happen under one lock,
    /// so a concurrent `push` lands either in this batch or the next.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.pending.lock()).into()
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }
}

/// Pulls pending notifications from the registry and forwards each one as a
/// separate side message, in arrival order.
#[derive(Clone)]
pub struct NotificationDrain {
    messages: Arc<dyn MessageSink>,
}

impl NotificationDrain {
    pub fn new(messages: Arc<dyn MessageSink>) -> Self {
        Self { messages }
    }

    /// Returns the number of notifications forwarded.
    pub async fn forward(&self, registry: &dyn ToolRegistry) -> usize {
        let notifications = registry.drain_notifications();
        for notification in &notifications {
            debug!(
                server_name = %notification.server_name,
                "Forwarding server notification"
            );
            self.messages
                .say(
                    MessageType::McpNotification,
                    Some(&notification.display_text()),
                    false,
                )
                .await;
        }
        notifications.len()
    }
}
