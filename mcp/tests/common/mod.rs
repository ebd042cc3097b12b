//! Recording test doubles for the invocation collaborators.

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use mcp_invocation::{
    ApprovalPrompt, ApprovalResponse, HookContext, HookError, HookOutcome, JsonObject,
    McpError, McpResult, MessageKind, MessageSink, MessageType, Notification, NotificationQueue,
    PreToolUseHook, RegisteredServer, TelemetrySink, ToolCallOutput, ToolRegistry, ToolUsageEvent,
};
use parking_lot::Mutex;

/// One call made on [`RecordingMessages`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    RemovePartial(MessageKind, MessageType),
    Say {
        message_type: MessageType,
        text: Option<String>,
        partial: bool,
    },
    AskPartial {
        message_type: MessageType,
        text: String,
    },
    Notification(String),
    Progress(String),
}

/// A message as it would currently appear in the UI log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleMessage {
    pub kind: MessageKind,
    pub message_type: MessageType,
    pub text: String,
    pub partial: bool,
}

#[derive(Default)]
pub struct RecordingMessages {
    events: Mutex<Vec<UiEvent>>,
    visible: Mutex<Vec<VisibleMessage>>,
}

impl RecordingMessages {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<UiEvent> {
        self.events.lock().clone()
    }

    /// Texts of every `say` of the given type, in order.
    pub fn said(&self, message_type: MessageType) -> Vec<String> {
        self.events
            .lock()
            .iter()
            .filter_map(|event| match event {
                UiEvent::Say {
                    message_type: ty,
                    text,
                    ..
                } if *ty == message_type => Some(text.clone().unwrap_or_default()),
                _ => None,
            })
            .collect()
    }

    /// The message log after applying every append and retraction.
    pub fn visible(&self) -> Vec<VisibleMessage> {
        self.visible.lock().clone()
    }

    fn append(&self, kind: MessageKind, message_type: MessageType, text: &str, partial: bool) {
        self.visible.lock().push(VisibleMessage {
            kind,
            message_type,
            text: text.to_string(),
            partial,
        });
    }

    /// Position of the first event matching `pred`.
    pub fn position(&self, pred: impl Fn(&UiEvent) -> bool) -> Option<usize> {
        self.events.lock().iter().position(pred)
    }
}

#[async_trait]
impl MessageSink for RecordingMessages {
    async fn remove_last_partial(&self, kind: MessageKind, message_type: MessageType) {
        self.events
            .lock()
            .push(UiEvent::RemovePartial(kind, message_type));

        let mut visible = self.visible.lock();
        let last = visible
            .iter()
            .rposition(|m| m.kind == kind && m.message_type == message_type);
        if let Some(index) = last.filter(|&i| visible[i].partial) {
            visible.remove(index);
        }
    }

    async fn say(&self, message_type: MessageType, text: Option<&str>, partial: bool) {
        self.events.lock().push(UiEvent::Say {
            message_type,
            text: text.map(str::to_string),
            partial,
        });
        self.append(MessageKind::Say, message_type, text.unwrap_or_default(), partial);
    }

    async fn ask_partial(&self, message_type: MessageType, text: &str) {
        self.events.lock().push(UiEvent::AskPartial {
            message_type,
            text: text.to_string(),
        });
        self.append(MessageKind::Ask, message_type, text, true);
    }

    fn show_notification(&self, message: &str) {
        self.events
            .lock()
            .push(UiEvent::Notification(message.to_string()));
    }

    async fn update_task_progress(&self, progress: &str) {
        self.events
            .lock()
            .push(UiEvent::Progress(progress.to_string()));
    }
}

/// What the mock registry answers to `call_tool`.
#[derive(Debug, Clone)]
pub enum MockResponse {
    Output(ToolCallOutput),
    Fail(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub server_name: String,
    pub tool_name: String,
    pub arguments: JsonObject,
    pub task_id: String,
}

pub struct MockRegistry {
    servers: Mutex<Vec<RegisteredServer>>,
    queue: NotificationQueue,
    during_call: Mutex<Vec<Notification>>,
    response: Mutex<MockResponse>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockRegistry {
    pub fn new(servers: Vec<RegisteredServer>) -> Arc<Self> {
        Arc::new(Self {
            servers: Mutex::new(servers),
            queue: NotificationQueue::new(),
            during_call: Mutex::new(Vec::new()),
            response: Mutex::new(MockResponse::Output(ToolCallOutput::default())),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn set_servers(&self, servers: Vec<RegisteredServer>) {
        *self.servers.lock() = servers;
    }

    pub fn respond_with(&self, response: MockResponse) {
        *self.response.lock() = response;
    }

    /// Queue a notification right now.
    pub fn notify(&self, server_name: &str, message: &str) {
        self.queue.push(Notification::new(server_name, message));
    }

    /// Queue a notification while the tool is executing.
    pub fn notify_during_call(&self, server_name: &str, message: &str) {
        self.during_call
            .lock()
            .push(Notification::new(server_name, message));
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn pending_notifications(&self) -> usize {
        self.queue.len()
    }
}

#[async_trait]
impl ToolRegistry for MockRegistry {
    fn servers(&self) -> Vec<RegisteredServer> {
        self.servers.lock().clone()
    }

    fn drain_notifications(&self) -> Vec<Notification> {
        self.queue.drain()
    }

    async fn call_tool(
        &self,
        server_name: &str,
        tool_name: &str,
        arguments: JsonObject,
        task_id: &str,
    ) -> McpResult<ToolCallOutput> {
        self.calls.lock().push(RecordedCall {
            server_name: server_name.to_string(),
            tool_name: tool_name.to_string(),
            arguments,
            task_id: task_id.to_string(),
        });

        let during: Vec<Notification> = std::mem::take(&mut *self.during_call.lock());
        for notification in during {
            self.queue.push(notification);
        }

        match self.response.lock().clone() {
            MockResponse::Output(output) => Ok(output),
            MockResponse::Fail(message) => Err(McpError::Transport(message)),
        }
    }
}

/// Answers every approval request the same way and records what it saw.
pub struct ScriptedPrompt {
    response: ApprovalResponse,
    asked: Mutex<Vec<String>>,
}

impl ScriptedPrompt {
    pub fn new(response: ApprovalResponse) -> Arc<Self> {
        Arc::new(Self {
            response,
            asked: Mutex::new(Vec::new()),
        })
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.lock().clone()
    }
}

#[async_trait]
impl ApprovalPrompt for ScriptedPrompt {
    async fn ask_approval(&self, _message_type: MessageType, text: &str) -> ApprovalResponse {
        self.asked.lock().push(text.to_string());
        self.response.clone()
    }
}

#[derive(Default)]
pub struct RecordingTelemetry {
    events: Mutex<Vec<ToolUsageEvent>>,
}

impl RecordingTelemetry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<ToolUsageEvent> {
        self.events.lock().clone()
    }
}

impl TelemetrySink for RecordingTelemetry {
    fn capture_tool_usage(&self, event: ToolUsageEvent) {
        self.events.lock().push(event);
    }
}

pub struct ScriptedHook {
    outcome: Result<HookOutcome, String>,
    seen: Mutex<Vec<HookContext>>,
}

impl ScriptedHook {
    pub fn proceed() -> Arc<Self> {
        Self::with(Ok(HookOutcome::Proceed))
    }

    pub fn cancel(reason: &str) -> Arc<Self> {
        Self::with(Ok(HookOutcome::cancel(reason)))
    }

    pub fn fail(message: &str) -> Arc<Self> {
        Self::with(Err(message.to_string()))
    }

    fn with(outcome: Result<HookOutcome, String>) -> Arc<Self> {
        Arc::new(Self {
            outcome,
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn seen(&self) -> Vec<HookContext> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl PreToolUseHook for ScriptedHook {
    async fn run(&self, ctx: &HookContext) -> Result<HookOutcome, HookError> {
        self.seen.lock().push(ctx.clone());
        self.outcome.clone().map_err(HookError::Failed)
    }
}
