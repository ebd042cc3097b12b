//! Tool invocation orchestrator - the entry point for the agent loop.
//!
//! `ToolInvocationOrchestrator` takes one tool call from the agent and runs it
//! through a fixed pipeline:
//!
//! 1. Resolve the target server against a fresh registry snapshot
//! 2. Strip the progress side channel and coerce arguments against the schema
//! 3. Approval (auto or manual) via [`ApprovalGate`]
//! 4. Optional pre-tool-use hook, which may cancel
//! 5. Drain notifications, execute, drain notifications again
//! 6. Assemble the result for the user and the model
//!
//! ## Usage
//!
//! ```ignore
//! let orchestrator = ToolInvocationOrchestrator::new(config, registry, messages, prompt)
//!     .with_telemetry(telemetry);
//!
//! // While the call streams in
//! orchestrator.on_partial_fragment(&partial).await;
//!
//! // Once it is complete
//! let outcome = orchestrator.execute(&ctx, fragment).await?;
//! agent.push_tool_result(outcome.model_text());
//! ```

use std::{sync::Arc, time::Instant};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use super::{config::InvocationConfig, metrics::InvocationMetrics};
use crate::{
    approval::{
        ApprovalEnvelope, ApprovalGate, ApprovalPrompt, ApprovalSubject, ApprovalVerdict,
        AuditLog, AutoApprovePolicy, DecisionResult, DecisionSource, ToolAllowList,
    },
    coerce::ArgumentCoercer,
    error::InvocationError,
    hooks::{HookContext, HookOutcome, HookRunner, PreToolUseHook},
    messages::{MessageSink, MessageType},
    registry::{
        find_tool, JsonObject, KeywordServerResolver, NotificationDrain, QualifiedToolName,
        ServerResolver, ToolRegistry,
    },
    telemetry::{TelemetrySink, TracingTelemetry},
    transform::ResultAssembler,
};

/// Text handed to the model when a call is denied or cancelled.
pub const DENIED_TEXT: &str = "The user denied this operation.";

/// A tool call as streamed by the agent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallFragment {
    pub name: String,
    #[serde(default)]
    pub params: JsonObject,
    /// Still streaming; more tokens may arrive.
    #[serde(default)]
    pub partial: bool,
    /// Issued through the model's native tool-calling interface.
    #[serde(default)]
    pub is_native_call: bool,
}

impl ToolCallFragment {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_partial(mut self, partial: bool) -> Self {
        self.partial = partial;
        self
    }

    #[must_use]
    pub fn with_native_call(mut self, is_native_call: bool) -> Self {
        self.is_native_call = is_native_call;
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Plan,
    #[default]
    Act,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub id: String,
    #[serde(default)]
    pub supports_images: bool,
}

/// Per-call context supplied by the agent loop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationContext {
    pub task_id: String,
    pub model: ModelInfo,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub plan_provider: String,
    #[serde(default)]
    pub act_provider: String,
}

impl InvocationContext {
    pub fn new(task_id: impl Into<String>, model_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            model: ModelInfo {
                id: model_id.into(),
                supports_images: false,
            },
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_image_support(mut self, supports_images: bool) -> Self {
        self.model.supports_images = supports_images;
        self
    }

    #[must_use]
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_providers(
        mut self,
        plan_provider: impl Into<String>,
        act_provider: impl Into<String>,
    ) -> Self {
        self.plan_provider = plan_provider.into();
        self.act_provider = act_provider.into();
        self
    }

    /// Provider serving the active mode.
    pub fn provider(&self) -> &str {
        match self.mode {
            Mode::Plan => &self.plan_provider,
            Mode::Act => &self.act_provider,
        }
    }
}

/// How an invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationOutcome {
    /// Denied by the user or cancelled by a hook.
    Denied,
    /// The tool ran. `images` holds data URIs, empty when the model cannot
    /// view images.
    Completed { text: String, images: Vec<String> },
    /// The registry failed to execute the tool.
    ExecutionError(String),
}

impl InvocationOutcome {
    /// Text to hand back to the model.
    pub fn model_text(&self) -> String {
        match self {
            InvocationOutcome::Denied => DENIED_TEXT.to_string(),
            InvocationOutcome::Completed { text, .. } => text.clone(),
            InvocationOutcome::ExecutionError(message) => {
                format!("Error executing MCP tool: {message}")
            }
        }
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, InvocationOutcome::Denied)
    }
}

pub struct ToolInvocationOrchestrator {
    config: InvocationConfig,
    registry: Arc<dyn ToolRegistry>,
    messages: Arc<dyn MessageSink>,
    resolver: Arc<dyn ServerResolver>,
    coercer: ArgumentCoercer,
    gate: ApprovalGate,
    hooks: HookRunner,
    drain: NotificationDrain,
    metrics: Arc<InvocationMetrics>,
}

impl ToolInvocationOrchestrator {
    /// Build an orchestrator from configuration.
    ///
    /// The auto-approve policy defaults to the allow list in
    /// `approval.auto_approve_tools` / `auto_approve_patterns`, and telemetry
    /// goes to `tracing` until [`with_telemetry`](Self::with_telemetry) is
    /// called.
    pub fn new(
        config: InvocationConfig,
        registry: Arc<dyn ToolRegistry>,
        messages: Arc<dyn MessageSink>,
        prompt: Arc<dyn ApprovalPrompt>,
    ) -> Self {
        let resolver = KeywordServerResolver::from_config(&config.resolver);
        let policy = ToolAllowList::from_config(&config.approval);
        let gate = ApprovalGate::new(
            Arc::new(policy),
            prompt,
            Arc::clone(&messages),
            Arc::new(TracingTelemetry),
        )
        .with_trusted_server(config.approval.trusted_server.clone())
        .with_notifications(config.approval.enable_notifications);

        Self {
            drain: NotificationDrain::new(Arc::clone(&messages)),
            resolver: Arc::new(resolver),
            coercer: ArgumentCoercer::new(),
            hooks: HookRunner::default(),
            metrics: Arc::new(InvocationMetrics::new()),
            config,
            registry,
            messages,
            gate,
        }
    }

    /// Replace the configured allow list with an external policy.
    #[must_use]
    pub fn with_auto_approve_policy(mut self, policy: Arc<dyn AutoApprovePolicy>) -> Self {
        self.gate = self.gate.with_policy(policy);
        self
    }

    /// Install the pre-tool-use hook. Ignored when `hooks.enabled` is false.
    #[must_use]
    pub fn with_hook(mut self, hook: Arc<dyn PreToolUseHook>) -> Self {
        if self.config.hooks.enabled {
            self.hooks = HookRunner::new(Some(hook));
        } else {
            debug!("Hooks disabled, pre-tool-use hook not installed");
        }
        self
    }

    #[must_use]
    pub fn with_telemetry(mut self, telemetry: Arc<dyn TelemetrySink>) -> Self {
        self.gate = self.gate.with_telemetry(telemetry);
        self
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn ServerResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    #[must_use]
    pub fn with_audit_log(mut self, audit_log: Arc<AuditLog>) -> Self {
        self.gate = self.gate.with_audit_log(audit_log);
        self
    }

    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<InvocationMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn config(&self) -> &InvocationConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<InvocationMetrics> {
        &self.metrics
    }

    pub fn audit_log(&self) -> &Arc<AuditLog> {
        self.gate.audit_log()
    }

    /// Short label for the call, shown while it runs.
    pub fn describe(&self, fragment: &ToolCallFragment) -> String {
        format!("[Executing {}...]", fragment.name)
    }

    /// Refresh the streaming preview for a call that is still arriving.
    ///
    /// Shows raw, uncoerced arguments and never executes anything.
    pub async fn on_partial_fragment(&self, fragment: &ToolCallFragment) {
        let servers = self.registry.servers();
        let server_name = self.resolver.resolve(&servers);

        let mut params = fragment.params.clone();
        params.remove(&self.config.progress.field);

        debug!(
            server_name = %server_name,
            tool_name = %fragment.name,
            "Updating tool call preview"
        );
        let envelope = ApprovalEnvelope::new(server_name, &fragment.name, &params);
        self.gate.preview(&envelope).await;
    }

    /// Run a finalized tool call to completion.
    ///
    /// Denials, hook cancellations and execution failures all come back as an
    /// [`InvocationOutcome`]. Only a partial fragment or a failing hook is an
    /// error.
    pub async fn execute(
        &self,
        ctx: &InvocationContext,
        fragment: ToolCallFragment,
    ) -> Result<InvocationOutcome, InvocationError> {
        if fragment.partial {
            return Err(InvocationError::NotFinalized(fragment.name));
        }
        self.metrics.record_invocation();

        // Registry contents may have changed since the last preview.
        let servers = self.registry.servers();
        let server_name = self.resolver.resolve(&servers);
        let tool = find_tool(&servers, &server_name, &fragment.name);
        let qualified_name = QualifiedToolName::new(server_name, fragment.name);

        let mut arguments = fragment.params;
        if let Some(progress) = arguments.remove(&self.config.progress.field) {
            if self.config.progress.enabled {
                let progress = match progress {
                    Value::String(text) => text,
                    other => other.to_string(),
                };
                self.messages.update_task_progress(&progress).await;
            }
        }
        self.coercer.coerce(&mut arguments, tool);

        let envelope = ApprovalEnvelope::new(
            &qualified_name.server_name,
            &qualified_name.tool_name,
            &arguments,
        );
        let subject = ApprovalSubject {
            task_id: &ctx.task_id,
            qualified_name: &qualified_name,
            tool,
            envelope: &envelope,
            model_id: &ctx.model.id,
            provider: ctx.provider(),
            is_native_call: fragment.is_native_call,
        };

        match self.gate.decide(&subject).await {
            ApprovalVerdict::Denied => {
                self.metrics.record_denied();
                return Ok(InvocationOutcome::Denied);
            }
            ApprovalVerdict::AutoApproved(_) => self.metrics.record_approval(true),
            ApprovalVerdict::Approved => self.metrics.record_approval(false),
        }

        let hook_ctx = HookContext {
            task_id: ctx.task_id.clone(),
            server_name: qualified_name.server_name.clone(),
            tool_name: qualified_name.tool_name.clone(),
            arguments: arguments.clone(),
            is_native_call: fragment.is_native_call,
        };
        if let HookOutcome::Cancel { reason } = self.hooks.run(&hook_ctx).await? {
            warn!(
                task_id = %ctx.task_id,
                server_name = %qualified_name.server_name,
                tool_name = %qualified_name.tool_name,
                reason = %reason,
                "Tool call cancelled by hook"
            );
            self.gate.audit_log().record_decision(
                &qualified_name,
                &ctx.task_id,
                DecisionResult::Denied { reason },
                DecisionSource::HookCancelled,
            );
            self.metrics.record_hook_cancelled();
            return Ok(InvocationOutcome::Denied);
        }

        self.messages
            .say(MessageType::McpServerRequestStarted, None, false)
            .await;

        let forwarded = self.drain.forward(self.registry.as_ref()).await;
        self.metrics.record_notifications(forwarded);

        let start = Instant::now();
        let result = self
            .registry
            .call_tool(
                &qualified_name.server_name,
                &qualified_name.tool_name,
                arguments,
                &ctx.task_id,
            )
            .await;
        let duration_ms = start.elapsed().as_millis() as u64;

        let forwarded = self.drain.forward(self.registry.as_ref()).await;
        self.metrics.record_notifications(forwarded);

        match result {
            Ok(output) => {
                self.metrics
                    .record_execution(&qualified_name, true, duration_ms);
                let assembled = ResultAssembler::assemble(&output, ctx.model.supports_images);
                self.messages
                    .say(
                        MessageType::McpServerResponse,
                        Some(&assembled.display_text),
                        false,
                    )
                    .await;

                info!(
                    task_id = %ctx.task_id,
                    server_name = %qualified_name.server_name,
                    tool_name = %qualified_name.tool_name,
                    is_error = output.is_error,
                    images = assembled.images.len(),
                    duration_ms,
                    "Tool call completed"
                );
                Ok(InvocationOutcome::Completed {
                    text: assembled.model_text,
                    images: assembled.images,
                })
            }
            Err(e) => {
                self.metrics
                    .record_execution(&qualified_name, false, duration_ms);
                warn!(
                    task_id = %ctx.task_id,
                    server_name = %qualified_name.server_name,
                    tool_name = %qualified_name.tool_name,
                    error = %e,
                    "Tool execution failed"
                );
                Ok(InvocationOutcome::ExecutionError(e.message()))
            }
        }
    }
}
