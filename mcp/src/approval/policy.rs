//! Auto-approval policies keyed on tool name.

use std::collections::HashSet;

use regex::Regex;
use tracing::warn;

use crate::core::config::ApprovalConfig;

/// Decides whether a tool may run without asking the user.
pub trait AutoApprovePolicy: Send + Sync {
    fn is_auto_approved(&self, tool_name: &str) -> bool;
}

impl<F> AutoApprovePolicy for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn is_auto_approved(&self, tool_name: &str) -> bool {
        self(tool_name)
    }
}

/// Auto-approves exact tool names and tool names matching any pattern.
#[derive(Debug, Clone, Default)]
pub struct ToolAllowList {
    tools: HashSet<String>,
    patterns: Vec<Regex>,
}

impl ToolAllowList {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_tool(mut self, tool_name: impl Into<String>) -> Self {
        self.tools.insert(tool_name.into());
        self
    }

    #[must_use]
    pub fn with_pattern(mut self, pattern: Regex) -> Self {
        self.patterns.push(pattern);
        self
    }

    /// Build from configuration. Patterns that fail to compile are skipped.
    pub fn from_config(config: &ApprovalConfig) -> Self {
        let mut list = config
            .auto_approve_tools
            .iter()
            .fold(Self::new(), |list, tool| list.with_tool(tool.clone()));

        for pattern in &config.auto_approve_patterns {
            match Regex::new(pattern) {
                Ok(re) => list.patterns.push(re),
                Err(e) => warn!(
                    "Invalid auto-approve pattern '{}': {}. Ignoring.",
                    pattern, e
                ),
            }
        }

        list
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty() && self.patterns.is_empty()
    }
}

impl AutoApprovePolicy for ToolAllowList {
    fn is_auto_approved(&self, tool_name: &str) -> bool {
        self.tools.contains(tool_name) || self.patterns.iter().any(|re| re.is_match(tool_name))
    }
}
