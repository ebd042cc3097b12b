//! Tool result content types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::registry::JsonObject;

/// One content item of a tool result, in MCP wire shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolResultContent {
    Text {
        text: String,
    },
    Image {
        #[serde(rename = "mimeType")]
        mime_type: String,
        data: String,
    },
    /// Embedded resource. May carry a base64 `blob` payload.
    Resource {
        resource: JsonObject,
    },
}

impl ToolResultContent {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn image(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self::Image {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }

    pub fn resource(resource: JsonObject) -> Self {
        Self::Resource { resource }
    }

    /// `data:` URI for image items.
    pub fn data_uri(&self) -> Option<String> {
        match self {
            Self::Image { mime_type, data } => Some(format!("data:{mime_type};base64,{data}")),
            _ => None,
        }
    }
}

/// Result of one tool execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallOutput {
    #[serde(default)]
    pub content: Vec<ToolResultContent>,
    #[serde(default)]
    pub is_error: bool,
}

impl ToolCallOutput {
    pub fn new(content: Vec<ToolResultContent>) -> Self {
        Self {
            content,
            is_error: false,
        }
    }

    #[must_use]
    pub fn with_error(mut self, is_error: bool) -> Self {
        self.is_error = is_error;
        self
    }

    /// Read a result in MCP wire format (`{"content": [...], "isError": ...}`).
    ///
    /// Content types this crate does not render (audio, resource links) are
    /// skipped.
    pub fn from_mcp_value(value: &Value) -> Self {
        let content = value
            .get("content")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| {
                        serde_json::from_value::<ToolResultContent>(item.clone())
                            .map_err(|e| debug!(error = %e, "Skipping unsupported content item"))
                            .ok()
                    })
                    .collect()
            })
            .unwrap_or_default();

        let is_error = value
            .get("isError")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Self { content, is_error }
    }
}

impl From<rmcp::model::CallToolResult> for ToolCallOutput {
    fn from(result: rmcp::model::CallToolResult) -> Self {
        match serde_json::to_value(&result) {
            Ok(value) => Self::from_mcp_value(&value),
            Err(e) => {
                warn!("Failed to serialize CallToolResult: {}. Treating as empty.", e);
                Self::default().with_error(result.is_error.unwrap_or(false))
            }
        }
    }
}
