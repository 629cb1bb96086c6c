//! Invocation lifecycle tracking.
//!
//! One [`Invocation`] per agent-issued command. The lifecycle is an
//! explicit state machine:
//!
//! ```text
//! Pending --(dispatch begins)--> Running --(handler returns)--> Result
//!                                        --(handler fails)----> Error
//! ```
//!
//! That is the only legal path: nothing skips `Running`, and an invocation
//! reaches a terminal state exactly once, after which it is immutable. The
//! summary is derived from the command alone, so it is available for
//! display while still pending.

use std::time::SystemTime;

use serde_json::json;

use maquette_types::{Command, InvocationView, ToolCall, ToolError, WireState};

/// Lifecycle state of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationState {
    /// Received, not yet dispatched.
    Pending,
    /// The dispatcher is executing the handler.
    Running,
    /// Terminal: the handler succeeded.
    Result,
    /// Terminal: the handler failed with a taxonomy error.
    Error,
}

impl InvocationState {
    /// True for `Result` and `Error`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, InvocationState::Result | InvocationState::Error)
    }
}

/// The tracked execution of one command.
#[derive(Debug, Clone)]
pub struct Invocation {
    id: u64,
    call: ToolCall,
    state: InvocationState,
    summary: String,
    outcome: Option<Result<String, ToolError>>,
    created_at: SystemTime,
    finished_at: Option<SystemTime>,
}

impl Invocation {
    /// Create a pending invocation.
    ///
    /// When the call failed validation there is no command; the summary
    /// falls back to the bare tool name, which is what the display shows
    /// for anything it can't label.
    pub(crate) fn pending(id: u64, call: ToolCall, command: Option<&Command>) -> Self {
        let summary = command
            .map(Command::summary)
            .unwrap_or_else(|| call.tool_name.clone());
        Self {
            id,
            call,
            state: InvocationState::Pending,
            summary,
            outcome: None,
            created_at: SystemTime::now(),
            finished_at: None,
        }
    }

    /// Transition `Pending → Running`.
    pub(crate) fn begin(&mut self) {
        if self.state != InvocationState::Pending {
            tracing::warn!(id = self.id, state = ?self.state, "begin on non-pending invocation");
            return;
        }
        self.state = InvocationState::Running;
    }

    /// Transition `Running → Result|Error`, recording the outcome.
    ///
    /// A second terminal transition is an engine bug; the first outcome is
    /// preserved.
    pub(crate) fn finish(&mut self, outcome: Result<String, ToolError>) {
        if self.state != InvocationState::Running {
            tracing::warn!(id = self.id, state = ?self.state, "finish on non-running invocation");
            return;
        }
        self.state = if outcome.is_ok() {
            InvocationState::Result
        } else {
            InvocationState::Error
        };
        self.outcome = Some(outcome);
        self.finished_at = Some(SystemTime::now());
    }

    /// Monotonically increasing id within the session.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The originating wire call.
    pub fn call(&self) -> &ToolCall {
        &self.call
    }

    /// Current lifecycle state.
    pub fn state(&self) -> InvocationState {
        self.state
    }

    /// Human-readable description, available in every state.
    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Terminal outcome, if the invocation has settled.
    pub fn outcome(&self) -> Option<&Result<String, ToolError>> {
        self.outcome.as_ref()
    }

    /// True if the invocation settled successfully.
    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, Some(Ok(_)))
    }

    /// The taxonomy error, if the invocation settled with one.
    pub fn error(&self) -> Option<&ToolError> {
        match &self.outcome {
            Some(Err(e)) => Some(e),
            _ => None,
        }
    }

    /// When the invocation was received.
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// When the invocation settled, if it has.
    pub fn finished_at(&self) -> Option<SystemTime> {
        self.finished_at
    }

    /// Export the shape the progress display consumes.
    ///
    /// Pending and running collapse to `call`; both terminal states export
    /// as `result`, with the payload distinguishing success from error.
    pub fn view(&self) -> InvocationView {
        let (state, result) = match &self.outcome {
            None => (WireState::Call, None),
            Some(Ok(message)) => (WireState::Result, Some(json!(message))),
            Some(Err(err)) => (
                WireState::Result,
                Some(json!({
                    "error": {"kind": err.kind, "message": err.message}
                })),
            ),
        };
        InvocationView {
            tool_name: self.call.tool_name.clone(),
            args: self.call.args.clone(),
            state,
            summary: self.summary.clone(),
            result,
        }
    }
}
