//! Conversion of tool results into responses for the agent loop.
//!
//! A tool result is a list of heterogeneous content items (text, images,
//! embedded resources). [`ResultAssembler`] folds them into one textual body
//! for the user and one for the model, honoring whether the model can view
//! images.

mod assembler;
mod types;

pub use assembler::{AssembledResult, ResultAssembler, NO_RESPONSE};
pub use types::{ToolCallOutput, ToolResultContent};
