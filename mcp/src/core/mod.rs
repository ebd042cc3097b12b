//! Invocation core: configuration, the orchestrator and its metrics.

pub mod config;
pub mod metrics;
pub mod orchestrator;

pub use config::{
    ApprovalConfig, HookConfig, InvocationConfig, ProgressConfig, ResolverConfig,
    DEFAULT_SERVER_KEYWORD,
};
pub use metrics::{InvocationMetrics, LatencySnapshot, MetricsSnapshot};
pub use orchestrator::{
    InvocationContext, InvocationOutcome, Mode, ModelInfo, ToolCallFragment,
    ToolInvocationOrchestrator, DENIED_TEXT,
};
