//! Approval-gated invocation of tools exposed by MCP servers.
//!
//! ## Modules
//!
//! - [`core`]: the [`ToolInvocationOrchestrator`], its configuration and metrics
//! - [`registry`]: server registry view, server resolution, notifications
//! - [`approval`]: approval gate, interactive approvals, policies, audit log
//! - [`transform`]: tool result assembly
//!
//! ## Collaborators
//!
//! The crate owns no connections and renders no UI. Callers plug in:
//!
//! - [`ToolRegistry`]: lists servers, executes tools, queues notifications
//! - [`MessageSink`]: preview, ask and side messages
//! - [`ApprovalPrompt`]: waits for the user's decision ([`ApprovalManager`] is
//!   a channel-based implementation)
//! - [`TelemetrySink`], [`PreToolUseHook`], [`AutoApprovePolicy`] (optional)

// Shared types
pub mod coerce;
pub mod error;
pub mod hooks;
pub mod messages;
pub mod telemetry;
pub mod transform;

// Subsystems
pub mod approval;
pub mod core;
pub mod registry;

pub use approval::{
    ApprovalEnvelope, ApprovalGate, ApprovalKey, ApprovalManager, ApprovalPrompt,
    ApprovalRequest, ApprovalResponse, ApprovalVerdict, AuditEntry, AuditLog, AutoApprovePolicy,
    DecisionResult, DecisionSource, ToolAllowList,
};
pub use coerce::ArgumentCoercer;
pub use core::{
    InvocationConfig, InvocationContext, InvocationMetrics, InvocationOutcome, MetricsSnapshot,
    Mode, ModelInfo, ToolCallFragment, ToolInvocationOrchestrator,
};
pub use error::{ApprovalError, HookError, InvocationError, McpError, McpResult};
pub use hooks::{HookContext, HookOutcome, HookRunner, PreToolUseHook};
pub use messages::{MessageKind, MessageSink, MessageType};
pub use registry::{
    JsonObject, KeywordServerResolver, Notification, NotificationDrain, NotificationQueue,
    QualifiedToolName, RegisteredServer, RegisteredTool, ServerResolver, ToolRegistry,
};
pub use telemetry::{ChannelTelemetry, TelemetrySink, ToolUsageEvent, TracingTelemetry};
pub use transform::{AssembledResult, ResultAssembler, ToolCallOutput, ToolResultContent};
