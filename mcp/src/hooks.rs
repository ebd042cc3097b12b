//! Pre-tool-use hooks.
//!
//! A hook runs after approval and before the tool executes. It can let the
//! call proceed or cancel it. Cancellation is an ordinary outcome; only a
//! [`HookError`] aborts the invocation.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{error::HookError, registry::JsonObject};

/// What a hook sees about the call it is guarding.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HookContext {
    pub task_id: String,
    pub server_name: String,
    pub tool_name: String,
    /// Coerced arguments, exactly as they will be sent to the tool.
    pub arguments: JsonObject,
    pub is_native_call: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum HookOutcome {
    Proceed,
    Cancel { reason: String },
}

impl HookOutcome {
    pub fn cancel(reason: impl Into<String>) -> Self {
        HookOutcome::Cancel {
            reason: reason.into(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, HookOutcome::Cancel { .. })
    }
}

#[async_trait]
pub trait PreToolUseHook: Send + Sync {
    async fn run(&self, ctx: &HookContext) -> Result<HookOutcome, HookError>;
}

/// Runs the optional hook. Without one, every call proceeds.
#[derive(Clone, Default)]
pub struct HookRunner {
    hook: Option<Arc<dyn PreToolUseHook>>,
}

impl HookRunner {
    pub fn new(hook: Option<Arc<dyn PreToolUseHook>>) -> Self {
        Self { hook }
    }

    pub fn is_enabled(&self) -> bool {
        self.hook.is_some()
    }

    pub async fn run(&self, ctx: &HookContext) -> Result<HookOutcome, HookError> {
        let Some(hook) = &self.hook else {
            return Ok(HookOutcome::Proceed);
        };

        debug!(
            task_id = %ctx.task_id,
            server_name = %ctx.server_name,
            tool_name = %ctx.tool_name,
            "Running pre-tool-use hook"
        );
        hook.run(ctx).await
    }
}

impl std::fmt::Debug for HookRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HookRunner")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}
