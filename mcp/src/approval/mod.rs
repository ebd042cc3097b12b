//! Approval system for tool execution.

pub mod audit;
pub mod gate;
pub mod manager;
pub mod policy;

pub use audit::{AuditEntry, AuditLog, DecisionResult, DecisionSource};
pub use gate::{ApprovalEnvelope, ApprovalGate, ApprovalSubject, ApprovalVerdict, USE_MCP_TOOL};
pub use manager::{ApprovalKey, ApprovalManager, ApprovalPrompt, ApprovalRequest, ApprovalResponse};
pub use policy::{AutoApprovePolicy, ToolAllowList};
