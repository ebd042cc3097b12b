//! Core types for registered servers and tools.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::notifications::Notification;
use crate::{error::McpResult, transform::ToolCallOutput};

pub type JsonObject = serde_json::Map<String, serde_json::Value>;

/// Unique tool identifier: `server_name:tool_name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualifiedToolName {
    pub server_name: String,
    pub tool_name: String,
}

impl QualifiedToolName {
    pub fn new(server_name: impl Into<String>, tool_name: impl Into<String>) -> Self {
        Self {
            server_name: server_name.into(),
            tool_name: tool_name.into(),
        }
    }

    /// Parse from "server:tool" format.
    pub fn parse(s: &str) -> Option<Self> {
        let (server, tool) = s.split_once(':')?;
        Some(Self::new(server, tool))
    }
}

impl fmt::Display for QualifiedToolName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.server_name, self.tool_name)
    }
}

/// A tool exposed by a registered server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredTool {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_schema: Option<JsonObject>,
    #[serde(default)]
    pub auto_approve: bool,
}

impl RegisteredTool {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Build from an rmcp tool listing. Auto-approval is a client-side
    /// setting, so it is supplied separately.
    pub fn from_rmcp(tool: &rmcp::model::Tool, auto_approve: bool) -> Self {
        Self {
            name: tool.name.to_string(),
            input_schema: Some(tool.input_schema.as_ref().clone()),
            auto_approve,
        }
    }

    #[must_use]
    pub fn with_input_schema(mut self, schema: JsonObject) -> Self {
        self.input_schema = Some(schema);
        self
    }

    #[must_use]
    pub fn with_auto_approve(mut self, auto_approve: bool) -> Self {
        self.auto_approve = auto_approve;
        self
    }

    /// Declared JSON type of one input property, if the schema names one.
    pub fn property_type(&self, key: &str) -> Option<&str> {
        self.input_schema
            .as_ref()?
            .get("properties")?
            .get(key)?
            .get("type")?
            .as_str()
    }
}

/// A server entry as seen by the invocation core.
///
/// `config` is the server's raw configuration blob. It is opaque JSON and may
/// be malformed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredServer {
    pub name: String,
    #[serde(default)]
    pub config: String,
    #[serde(default)]
    pub tools: Vec<RegisteredTool>,
}

impl RegisteredServer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: impl Into<String>) -> Self {
        self.config = config.into();
        self
    }

    #[must_use]
    pub fn with_tool(mut self, tool: RegisteredTool) -> Self {
        self.tools.push(tool);
        self
    }

    pub fn tool(&self, tool_name: &str) -> Option<&RegisteredTool> {
        self.tools.iter().find(|t| t.name == tool_name)
    }
}

/// Find a tool by exact server name and tool name.
pub fn find_tool<'a>(
    servers: &'a [RegisteredServer],
    server_name: &str,
    tool_name: &str,
) -> Option<&'a RegisteredTool> {
    servers
        .iter()
        .find(|s| s.name == server_name)
        .and_then(|s| s.tool(tool_name))
}

/// The registry and transport that own server connections.
///
/// Server listings may change at any time, so callers take a fresh snapshot
/// per phase instead of caching one.
#[async_trait]
pub trait ToolRegistry: Send + Sync {
    /// Snapshot of registered servers in registration order.
    fn servers(&self) -> Vec<RegisteredServer>;

    /// Take every queued notification across all servers, oldest first.
    /// Must not block.
    fn drain_notifications(&self) -> Vec<Notification>;

    /// Execute a tool on a server.
    async fn call_tool(
        &self,
        server_name: &str,
        tool_name: &str,
        arguments: JsonObject,
        task_id: &str,
    ) -> McpResult<ToolCallOutput>;
}
