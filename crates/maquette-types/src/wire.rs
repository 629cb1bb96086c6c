//! Wire shapes exchanged with the transport and display collaborators.
//!
//! Incoming: [`ToolCall`], the `{toolName, args}` pair the agent stream
//! delivers. Outgoing: [`InvocationView`], the exact shape the progress
//! display consumes. Both serialize camelCase to match the surrounding
//! JavaScript world.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An agent-issued tool call as it arrives off the stream.
///
/// `args` is left as raw JSON here; validation into a typed
/// [`Command`](crate::Command) happens exactly once, at ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    /// Tool identifier: `str_replace_editor` or `file_manager`.
    pub tool_name: String,
    /// Raw argument object, including the `command` discriminator.
    pub args: Value,
}

impl ToolCall {
    /// Create a tool call.
    pub fn new(tool_name: impl Into<String>, args: Value) -> Self {
        Self {
            tool_name: tool_name.into(),
            args,
        }
    }
}

/// Invocation state as observed externally.
///
/// The engine's four internal states collapse to two here: pending and
/// running are both `call` (in flight), and both terminal states are
/// `result`, with the payload distinguishing success from error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireState {
    /// The invocation has not reached a terminal state yet.
    Call,
    /// The invocation settled; `result` carries the payload.
    Result,
}

/// The shape the progress display consumes, one per invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvocationView {
    /// Tool identifier, echoed from the originating call.
    pub tool_name: String,
    /// Argument object, echoed from the originating call.
    pub args: Value,
    /// Collapsed lifecycle state.
    pub state: WireState,
    /// Human-readable description, e.g. `Created /App.jsx`. Derived from
    /// the command alone, so it is available while still in flight.
    pub summary: String,
    /// Terminal payload: the success value, or `{"error": {...}}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
}
