//! Approval gate for a single tool call.
//!
//! The gate owns the preview/ask message lifecycle around one call and makes
//! the binding approval decision. A call is auto-approved when any of these
//! holds: the injected policy accepts the tool name, the tool carries its own
//! `autoApprove` flag, or the call resolved to the trusted server.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use super::{
    audit::{AuditLog, DecisionResult, DecisionSource},
    manager::ApprovalPrompt,
    policy::AutoApprovePolicy,
};
use crate::{
    messages::{MessageKind, MessageSink, MessageType},
    registry::{JsonObject, QualifiedToolName, RegisteredTool},
    telemetry::{TelemetrySink, ToolUsageEvent},
};

/// Envelope kind for MCP tool calls.
pub const USE_MCP_TOOL: &str = "use_mcp_tool";

/// Wire form of a tool call shown to the user, both as preview and as the
/// final approval request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalEnvelope {
    #[serde(rename = "type")]
    pub kind: String,
    pub server_name: String,
    pub tool_name: String,
    /// JSON-encoded argument object. Always a string, never a nested object.
    pub arguments: String,
}

impl ApprovalEnvelope {
    pub fn new(
        server_name: impl Into<String>,
        tool_name: impl Into<String>,
        arguments: &JsonObject,
    ) -> Self {
        Self {
            kind: USE_MCP_TOOL.to_string(),
            server_name: server_name.into(),
            tool_name: tool_name.into(),
            arguments: Value::Object(arguments.clone()).to_string(),
        }
    }

    pub fn to_json(&self) -> String {
        json!({
            "type": self.kind,
            "serverName": self.server_name,
            "toolName": self.tool_name,
            "arguments": self.arguments,
        })
        .to_string()
    }
}

/// Everything the gate needs to know about the call being decided.
#[derive(Debug, Clone)]
pub struct ApprovalSubject<'a> {
    pub task_id: &'a str,
    pub qualified_name: &'a QualifiedToolName,
    /// Resolved tool entry, if the server advertises it.
    pub tool: Option<&'a RegisteredTool>,
    pub envelope: &'a ApprovalEnvelope,
    pub model_id: &'a str,
    pub provider: &'a str,
    pub is_native_call: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApprovalVerdict {
    AutoApproved(DecisionSource),
    Approved,
    Denied,
}

impl ApprovalVerdict {
    pub fn is_approved(&self) -> bool {
        !matches!(self, ApprovalVerdict::Denied)
    }
}

pub struct ApprovalGate {
    policy: Arc<dyn AutoApprovePolicy>,
    prompt: Arc<dyn ApprovalPrompt>,
    messages: Arc<dyn MessageSink>,
    telemetry: Arc<dyn TelemetrySink>,
    audit_log: Arc<AuditLog>,
    trusted_server: Option<String>,
    enable_notifications: bool,
}

impl ApprovalGate {
    pub fn new(
        policy: Arc<dyn AutoApprovePolicy>,
        prompt: Arc<dyn ApprovalPrompt>,
        messages: Arc<dyn MessageSink>,
        telemetry: Arc<dyn TelemetrySink>,
    ) -> Self {
        Self {
            policy,
            prompt,
            messages,
            telemetry,
            audit_log: Arc::new(AuditLog::new()),
            trusted_server: None,
            enable_notifications: true,
        }
    }

    #[must_use]
    pub fn with_trusted_server(mut self, server_name: Option<String>) -> Self {
        self.trusted_server = server_name;
        self
    }

    #[must_use]
    pub fn with_notifications(mut self, enabled: bool) -> Self {
        self.enable_notifications = enabled;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: Arc<dyn AutoApprovePolicy>) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_telemetry(mut self, telemetry: Arc<dyn TelemetrySink>) -> Self {
        self.telemetry = telemetry;
        self
    }

    #[must_use]
    pub fn with_audit_log(mut self, audit_log: Arc<AuditLog>) -> Self {
        self.audit_log = audit_log;
        self
    }

    pub fn audit_log(&self) -> &Arc<AuditLog> {
        &self.audit_log
    }

    /// Show a streaming preview of the call, replacing the previous one.
    ///
    /// Any partial preview of either kind is retracted first, so repeated
    /// previews of the same call never stack up. Only the injected policy is
    /// consulted here; the binding decision happens in [`decide`](Self::decide).
    pub async fn preview(&self, envelope: &ApprovalEnvelope) {
        let text = envelope.to_json();
        let (stale, current) = if self.policy.is_auto_approved(&envelope.tool_name) {
            (MessageKind::Ask, MessageKind::Say)
        } else {
            (MessageKind::Say, MessageKind::Ask)
        };

        for kind in [stale, current] {
            self.messages
                .remove_last_partial(kind, MessageType::UseMcpServer)
                .await;
        }
        match current {
            MessageKind::Say => {
                self.messages
                    .say(MessageType::UseMcpServer, Some(&text), true)
                    .await
            }
            MessageKind::Ask => {
                self.messages
                    .ask_partial(MessageType::UseMcpServer, &text)
                    .await
            }
        }
    }

    /// Which signal, if any, auto-approves the call. Checked in a fixed order
    /// only to label the audit entry; any single signal is sufficient.
    pub fn auto_approval_source(
        &self,
        qualified_name: &QualifiedToolName,
        tool: Option<&RegisteredTool>,
    ) -> Option<DecisionSource> {
        if self.policy.is_auto_approved(&qualified_name.tool_name) {
            Some(DecisionSource::AutoApprovePolicy)
        } else if tool.is_some_and(|t| t.auto_approve) {
            Some(DecisionSource::ToolFlag)
        } else if self.trusted_server.as_deref() == Some(qualified_name.server_name.as_str()) {
            Some(DecisionSource::TrustedServer)
        } else {
            None
        }
    }

    /// Make the binding approval decision for a finalized call.
    pub async fn decide(&self, subject: &ApprovalSubject<'_>) -> ApprovalVerdict {
        let text = subject.envelope.to_json();
        let name = subject.qualified_name;

        if let Some(source) = self.auto_approval_source(name, subject.tool) {
            self.messages
                .remove_last_partial(MessageKind::Ask, MessageType::UseMcpServer)
                .await;
            self.messages
                .say(MessageType::UseMcpServer, Some(&text), false)
                .await;
            self.capture(subject, true, true);
            self.audit_log.record_decision(
                name,
                subject.task_id,
                DecisionResult::Approved,
                source,
            );
            info!(
                task_id = %subject.task_id,
                server_name = %name.server_name,
                tool_name = %name.tool_name,
                source = ?source,
                "Tool call auto-approved"
            );
            return ApprovalVerdict::AutoApproved(source);
        }

        if self.enable_notifications {
            self.messages.show_notification(&format!(
                "Assistant wants to use {} on {}",
                name.tool_name, name.server_name
            ));
        }
        self.messages
            .remove_last_partial(MessageKind::Say, MessageType::UseMcpServer)
            .await;

        debug!(
            task_id = %subject.task_id,
            server_name = %name.server_name,
            tool_name = %name.tool_name,
            "Waiting for manual approval"
        );
        let response = self
            .prompt
            .ask_approval(MessageType::UseMcpServer, &text)
            .await;

        if let Some(feedback) = response.feedback.as_deref() {
            self.messages
                .say(MessageType::UserFeedback, Some(feedback), false)
                .await;
        }

        self.capture(subject, false, response.approved);

        if response.approved {
            self.audit_log.record_decision(
                name,
                subject.task_id,
                DecisionResult::Approved,
                DecisionSource::UserInteractive,
            );
            info!(
                task_id = %subject.task_id,
                server_name = %name.server_name,
                tool_name = %name.tool_name,
                "Tool call approved"
            );
            ApprovalVerdict::Approved
        } else {
            self.audit_log.record_decision(
                name,
                subject.task_id,
                DecisionResult::Denied {
                    reason: "denied by user".to_string(),
                },
                DecisionSource::UserInteractive,
            );
            warn!(
                task_id = %subject.task_id,
                server_name = %name.server_name,
                tool_name = %name.tool_name,
                "Tool call denied"
            );
            ApprovalVerdict::Denied
        }
    }

    fn capture(&self, subject: &ApprovalSubject<'_>, auto_approved: bool, approved: bool) {
        self.telemetry.capture_tool_usage(ToolUsageEvent {
            task_id: subject.task_id.to_string(),
            tool_name: subject.qualified_name.tool_name.clone(),
            model_id: subject.model_id.to_string(),
            provider: subject.provider.to_string(),
            auto_approved,
            approved,
            error: None,
            is_native_call: subject.is_native_call,
        });
    }
}
