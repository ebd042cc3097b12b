//! Interactive approval of tool calls.
//!
//! [`ApprovalManager`] publishes each approval request on a channel the UI
//! listens to, then waits for [`ApprovalManager::resolve`] to be called with
//! the user's answer. Anything that prevents an answer (closed channels,
//! timeout) counts as a denial.

use std::{fmt, time::Duration};

use async_trait::async_trait;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::{
    sync::{mpsc, oneshot},
    time::Instant,
};
use tracing::{debug, warn};

use crate::{
    core::config::ApprovalConfig,
    error::{ApprovalError, McpResult},
    messages::MessageType,
};

/// The user's answer to an approval request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalResponse {
    pub approved: bool,
    /// Free text the user attached to the answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

impl ApprovalResponse {
    pub fn approved() -> Self {
        Self {
            approved: true,
            feedback: None,
        }
    }

    pub fn denied() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        self.feedback = Some(feedback.into());
        self
    }
}

/// Asks the user to approve a tool call and waits for the answer.
///
/// Infallible by contract: implementations map their own failures to a
/// denial.
#[async_trait]
pub trait ApprovalPrompt: Send + Sync {
    async fn ask_approval(&self, message_type: MessageType, text: &str) -> ApprovalResponse;
}

/// Key for tracking pending approvals.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ApprovalKey(String);

impl ApprovalKey {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ApprovalKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ApprovalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Approval request published to the UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalRequest {
    pub key: ApprovalKey,
    pub message_type: MessageType,
    /// Approval envelope JSON.
    pub text: String,
}

#[derive(Debug)]
struct PendingApproval {
    created_at: Instant,
    response_tx: oneshot::Sender<ApprovalResponse>,
}

pub struct ApprovalManager {
    pending: DashMap<ApprovalKey, PendingApproval>,
    requests_tx: mpsc::UnboundedSender<ApprovalRequest>,
    approval_timeout: Option<Duration>,
}

impl ApprovalManager {
    /// Create a manager and the receiver the UI reads approval requests from.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ApprovalRequest>) {
        let (requests_tx, requests_rx) = mpsc::unbounded_channel();
        let manager = Self {
            pending: DashMap::new(),
            requests_tx,
            approval_timeout: None,
        };
        (manager, requests_rx)
    }

    /// Create a manager with the timeout from `approval.timeout_secs`.
    pub fn from_config(
        config: &ApprovalConfig,
    ) -> (Self, mpsc::UnboundedReceiver<ApprovalRequest>) {
        let (manager, requests_rx) = Self::new();
        let timeout = config.timeout_secs.map(Duration::from_secs);
        (manager.with_timeout(timeout), requests_rx)
    }

    /// Set the approval timeout. `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.approval_timeout = timeout;
        self
    }

    /// Register a pending approval and publish it to the UI.
    pub fn request(
        &self,
        message_type: MessageType,
        text: &str,
    ) -> McpResult<(ApprovalKey, oneshot::Receiver<ApprovalResponse>)> {
        let key = ApprovalKey::new();
        if self.pending.contains_key(&key) {
            return Err(ApprovalError::AlreadyPending(key.to_string()).into());
        }

        let (tx, rx) = oneshot::channel();
        self.pending.insert(
            key.clone(),
            PendingApproval {
                created_at: Instant::now(),
                response_tx: tx,
            },
        );

        let request = ApprovalRequest {
            key: key.clone(),
            message_type,
            text: text.to_string(),
        };
        if self.requests_tx.send(request).is_err() {
            self.pending.remove(&key);
            return Err(ApprovalError::ChannelClosed.into());
        }

        debug!(approval_key = %key, "Approval requested");
        Ok((key, rx))
    }

    /// Resolve a pending approval with the user's response.
    pub fn resolve(&self, key: &ApprovalKey, response: ApprovalResponse) -> McpResult<()> {
        let (_, pending) = self
            .pending
            .remove(key)
            .ok_or_else(|| ApprovalError::NotFound(key.to_string()))?;

        debug!(
            approval_key = %key,
            approved = response.approved,
            waited_ms = pending.created_at.elapsed().as_millis() as u64,
            "Approval resolved"
        );

        pending
            .response_tx
            .send(response)
            .map_err(|_| ApprovalError::ChannelClosed)?;

        Ok(())
    }

    pub fn has_pending(&self, key: &ApprovalKey) -> bool {
        self.pending.contains_key(key)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Drop every pending approval. Waiting callers see a denial.
    pub fn cancel_all(&self) {
        self.pending.clear();
    }

    async fn wait(
        &self,
        key: &ApprovalKey,
        rx: oneshot::Receiver<ApprovalResponse>,
    ) -> Result<ApprovalResponse, ApprovalError> {
        let Some(timeout) = self.approval_timeout else {
            return rx.await.map_err(|_| ApprovalError::ChannelClosed);
        };

        match tokio::time::timeout(timeout, rx).await {
            Ok(response) => response.map_err(|_| ApprovalError::ChannelClosed),
            Err(_) => {
                self.pending.remove(key);
                Err(ApprovalError::Timeout(key.to_string()))
            }
        }
    }
}

/// Removes a pending approval when its waiter goes away.
struct PendingGuard<'a> {
    pending: &'a DashMap<ApprovalKey, PendingApproval>,
    key: &'a ApprovalKey,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        if self.pending.remove(self.key).is_some() {
            debug!(approval_key = %self.key, "Approval waiter dropped");
        }
    }
}

#[async_trait]
impl ApprovalPrompt for ApprovalManager {
    async fn ask_approval(&self, message_type: MessageType, text: &str) -> ApprovalResponse {
        let (key, rx) = match self.request(message_type, text) {
            Ok(pending) => pending,
            Err(e) => {
                warn!(error = %e, "Could not request approval, treating as denied");
                return ApprovalResponse::denied();
            }
        };

        // Dropping this future mid-wait must not leave the entry behind.
        let _guard = PendingGuard {
            pending: &self.pending,
            key: &key,
        };

        match self.wait(&key, rx).await {
            Ok(response) => response,
            Err(e) => {
                warn!(approval_key = %key, error = %e, "Approval not answered, treating as denied");
                ApprovalResponse::denied()
            }
        }
    }
}
