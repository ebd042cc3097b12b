//! Invocation configuration.
//!
//! Every section is optional in YAML and falls back to the defaults below.

use serde::{Deserialize, Serialize};

use crate::error::{McpError, McpResult};

/// Keyword and fallback name of the server tool calls are routed to.
pub const DEFAULT_SERVER_KEYWORD: &str = "tooluniverse";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct InvocationConfig {
    #[serde(default)]
    pub resolver: ResolverConfig,

    #[serde(default)]
    pub approval: ApprovalConfig,

    #[serde(default)]
    pub hooks: HookConfig,

    #[serde(default)]
    pub progress: ProgressConfig,
}

/// Server resolution settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResolverConfig {
    /// Case-insensitive keyword matched against server names and configs.
    #[serde(default = "default_keyword")]
    pub keyword: String,

    /// Server name used when no registered server matches.
    #[serde(default = "default_keyword")]
    pub fallback_server: String,
}

/// Approval settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ApprovalConfig {
    /// Calls resolved to this server are always auto-approved.
    /// Set to `null` in YAML to disable the shortcut.
    #[serde(default = "default_trusted_server")]
    pub trusted_server: Option<String>,

    /// Show a user-facing notification before waiting for manual approval.
    #[serde(default = "default_true")]
    pub enable_notifications: bool,

    /// Give up waiting for a manual decision after this many seconds.
    /// Expiry counts as a denial. Unset waits indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Tool names that never need manual approval.
    #[serde(default)]
    pub auto_approve_tools: Vec<String>,

    /// Regexes over tool names that never need manual approval.
    #[serde(default)]
    pub auto_approve_patterns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct HookConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Side-channel progress reporting.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProgressConfig {
    /// Forward the progress field to the UI before approval.
    #[serde(default)]
    pub enabled: bool,

    /// Argument carrying progress. Always stripped before execution.
    #[serde(default = "default_progress_field")]
    pub field: String,
}

fn default_keyword() -> String {
    DEFAULT_SERVER_KEYWORD.to_string()
}

fn default_trusted_server() -> Option<String> {
    Some(DEFAULT_SERVER_KEYWORD.to_string())
}

fn default_true() -> bool {
    true
}

fn default_progress_field() -> String {
    "task_progress".to_string()
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            keyword: default_keyword(),
            fallback_server: default_keyword(),
        }
    }
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self {
            trusted_server: default_trusted_server(),
            enable_notifications: true,
            timeout_secs: None,
            auto_approve_tools: Vec::new(),
            auto_approve_patterns: Vec::new(),
        }
    }
}

impl Default for HookConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            field: default_progress_field(),
        }
    }
}

impl InvocationConfig {
    /// Load configuration from a YAML file.
    pub async fn from_file(path: &str) -> McpResult<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_yaml_str(&content)
    }

    pub fn from_yaml_str(content: &str) -> McpResult<Self> {
        serde_yaml::from_str(content).map_err(|e| McpError::Config(e.to_string()))
    }
}
