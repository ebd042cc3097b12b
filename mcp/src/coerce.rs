//! Schema-aware coercion of string-typed tool arguments.
//!
//! Models frequently send arrays and objects as JSON text. Coercion turns
//! that text back into structured values, guided by the tool's input schema
//! when one is registered. It is best-effort: a value that fails to parse is
//! left exactly as it was.

use serde_json::Value;
use tracing::debug;

use crate::registry::{JsonObject, RegisteredTool};

#[derive(Debug, Clone, Copy, Default)]
pub struct ArgumentCoercer;

impl ArgumentCoercer {
    pub fn new() -> Self {
        Self
    }

    /// Coerce every string value in `args` in place. Returns how many values
    /// were replaced.
    pub fn coerce(&self, args: &mut JsonObject, tool: Option<&RegisteredTool>) -> usize {
        let mut coerced = 0;
        for (key, value) in args.iter_mut() {
            let Value::String(text) = value else {
                continue;
            };
            let expected = tool.and_then(|t| t.property_type(key));
            if let Some(parsed) = Self::coerce_str(text, expected) {
                debug!(key = %key, expected = ?expected, "Coerced string argument");
                *value = parsed;
                coerced += 1;
            }
        }
        coerced
    }

    /// Decide what a single string value becomes. `None` means keep the string.
    pub fn coerce_str(text: &str, expected_type: Option<&str>) -> Option<Value> {
        match expected_type {
            Some("array" | "object") => serde_json::from_str(text).ok(),
            // Declared strings stay literal, even "[Draft] Title" or "{}".
            Some("string") => None,
            _ => {
                if Self::looks_structured(text.trim()) {
                    serde_json::from_str(text).ok()
                } else {
                    None
                }
            }
        }
    }

    fn looks_structured(trimmed: &str) -> bool {
        (trimmed.starts_with('[') && trimmed.ends_with(']'))
            || (trimmed.starts_with('{') && trimmed.ends_with('}'))
    }
}
