//! Error types for tool invocation.
//!
//! Only [`InvocationError`] ever leaves the orchestrator. Registry and
//! approval failures are folded into an [`InvocationOutcome`] before that.
//!
//! [`InvocationOutcome`]: crate::core::InvocationOutcome

use thiserror::Error;

pub type McpResult<T> = Result<T, McpError>;

/// Errors raised by a tool registry or its transport.
#[derive(Debug, Error)]
pub enum McpError {
    #[error("Server not found: {0}")]
    ServerNotFound(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Tool execution failed: {0}")]
    ToolExecution(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Approval error: {0}")]
    Approval(#[from] ApprovalError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl McpError {
    /// The underlying failure message, without the variant prefix.
    ///
    /// Lookup failures keep their full text, since the bare payload is only a
    /// name.
    pub fn message(&self) -> String {
        match self {
            McpError::Transport(message)
            | McpError::ToolExecution(message)
            | McpError::Config(message) => message.clone(),
            McpError::Io(e) => e.to_string(),
            other => other.to_string(),
        }
    }
}

/// Approval-specific errors.
#[derive(Debug, Error)]
pub enum ApprovalError {
    /// Approval request not found (already resolved or expired).
    #[error("Approval not found: {0}")]
    NotFound(String),

    /// Approval request already pending.
    #[error("Approval already pending: {0}")]
    AlreadyPending(String),

    /// Response channel was closed.
    #[error("Approval channel closed")]
    ChannelClosed,

    /// Approval request timed out.
    #[error("Approval timed out: {0}")]
    Timeout(String),
}

/// A pre-tool-use hook failed for a reason other than cancellation.
#[derive(Debug, Error)]
pub enum HookError {
    #[error("Pre-tool-use hook failed: {0}")]
    Failed(String),
}

/// Errors that abort an invocation instead of producing an outcome.
#[derive(Debug, Error)]
pub enum InvocationError {
    /// `execute` was handed a fragment that is still streaming.
    #[error("Tool call '{0}' is still partial")]
    NotFinalized(String),

    #[error(transparent)]
    Hook(#[from] HookError),
}
