//! Read-only view of the externally owned tool server registry.

pub mod notifications;
pub mod resolver;
pub mod types;

pub use notifications::{Notification, NotificationDrain, NotificationQueue};
pub use resolver::{KeywordServerResolver, ServerResolver};
pub use types::{
    find_tool, JsonObject, QualifiedToolName, RegisteredServer, RegisteredTool, ToolRegistry,
};
