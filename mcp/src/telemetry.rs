//! Tool usage telemetry.
//!
//! Capturing an event is synchronous and must return immediately. The
//! orchestrator calls it inline and never waits on delivery.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// One approval decision for one tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolUsageEvent {
    pub task_id: String,
    pub tool_name: String,
    pub model_id: String,
    pub provider: String,
    pub auto_approved: bool,
    pub approved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub is_native_call: bool,
}

pub trait TelemetrySink: Send + Sync {
    fn capture_tool_usage(&self, event: ToolUsageEvent);
}

/// Writes events to the `tracing` pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingTelemetry;

impl TelemetrySink for TracingTelemetry {
    fn capture_tool_usage(&self, event: ToolUsageEvent) {
        info!(
            task_id = %event.task_id,
            tool_name = %event.tool_name,
            model_id = %event.model_id,
            provider = %event.provider,
            auto_approved = event.auto_approved,
            approved = event.approved,
            is_native_call = event.is_native_call,
            error = event.error.as_deref().unwrap_or(""),
            "Tool usage"
        );
    }
}

/// Forwards events to a background consumer.
#[derive(Debug, Clone)]
pub struct ChannelTelemetry {
    tx: mpsc::UnboundedSender<ToolUsageEvent>,
}

impl ChannelTelemetry {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ToolUsageEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl TelemetrySink for ChannelTelemetry {
    fn capture_tool_usage(&self, event: ToolUsageEvent) {
        if self.tx.send(event).is_err() {
            debug!("Telemetry receiver dropped, event discarded");
        }
    }
}
