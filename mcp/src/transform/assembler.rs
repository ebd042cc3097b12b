//! Assembly of a tool result into display and model texts.

use tracing::warn;

use super::types::{ToolCallOutput, ToolResultContent};

/// Body used when a result has neither text nor images.
pub const NO_RESPONSE: &str = "(No response)";

const ERROR_PREFIX: &str = "Error:\n";
const PARAGRAPH: &str = "\n\n";

/// A tool result ready for the user and the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledResult {
    /// Text for the user: the body followed by every image URI as a paragraph.
    pub display_text: String,
    /// Text for the model. Never embeds image data.
    pub model_text: String,
    /// Image data URIs for the model; empty if it cannot view images.
    pub images: Vec<String>,
}

pub struct ResultAssembler;

impl ResultAssembler {
    pub fn assemble(output: &ToolCallOutput, supports_images: bool) -> AssembledResult {
        let images: Vec<String> = output
            .content
            .iter()
            .filter_map(ToolResultContent::data_uri)
            .collect();

        let parts: Vec<String> = output
            .content
            .iter()
            .filter_map(Self::text_part)
            .filter(|part| !part.is_empty())
            .collect();

        let mut body = parts.join(PARAGRAPH);
        if body.is_empty() && images.is_empty() {
            body = NO_RESPONSE.to_string();
        }
        if output.is_error {
            body.insert_str(0, ERROR_PREFIX);
        }

        let mut display_text = body.clone();
        for image in &images {
            push_paragraph(&mut display_text, image);
        }

        let mut model_text = body;
        if supports_images {
            return AssembledResult {
                display_text,
                model_text,
                images,
            };
        }

        if !images.is_empty() {
            push_paragraph(&mut model_text, &Self::omitted_images_note(images.len()));
        }
        AssembledResult {
            display_text,
            model_text,
            images: Vec::new(),
        }
    }

    pub fn omitted_images_note(count: usize) -> String {
        let provided = if count == 1 {
            "1 image was".to_string()
        } else {
            format!("{count} images were")
        };
        format!(
            "[{provided} provided in the response, and while they are displayed to the user, you do not have the ability to view them.]"
        )
    }

    fn text_part(item: &ToolResultContent) -> Option<String> {
        match item {
            ToolResultContent::Text { text } => Some(text.clone()),
            ToolResultContent::Resource { resource } => {
                let mut resource = resource.clone();
                resource.remove("blob");
                match serde_json::to_string_pretty(&resource) {
                    Ok(text) => Some(text),
                    Err(e) => {
                        warn!("Failed to render resource content: {}", e);
                        None
                    }
                }
            }
            ToolResultContent::Image { .. } => None,
        }
    }
}

fn push_paragraph(text: &mut String, paragraph: &str) {
    if !text.is_empty() {
        text.push_str(PARAGRAPH);
    }
    text.push_str(paragraph);
}
