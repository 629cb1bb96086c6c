//! maquette-engine: the tool invocation engine behind agent-driven UI
//! generation.
//!
//! An AI agent streams file operations at a per-session in-memory project
//! tree. The engine applies them safely, deterministically, and reversibly,
//! tracks each invocation through an explicit lifecycle, and hands
//! consistent snapshots to the live preview after each completed turn.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Session                             │
//! │  ┌─────────────────────────────────────────┐  ┌───────────┐  │
//! │  │              Dispatcher                 │  │ Invocation│  │
//! │  │  validate → route → contain failures    │  │    log    │  │
//! │  │  ┌────────────┐     ┌───────────────┐   │  └───────────┘  │
//! │  │  │ EditEngine │     │  FileManager  │   │  ┌───────────┐  │
//! │  │  └─────┬──────┘     └───────┬───────┘   │  │  Preview  │  │
//! │  └────────┼────────────────────┼───────────┘  │   sinks   │  │
//! │           └────────┬───────────┘              └───────────┘  │
//! │                ┌───┴───────┐                                 │
//! │                │ VirtualFs │  path → content + history       │
//! │                └───────────┘                                 │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! Control flow: the agent emits a command → the dispatcher validates and
//! executes it → the VFS mutates (or rejects) → the invocation records the
//! terminal state → once the turn completes, preview sinks receive the
//! current snapshot. A malformed or logically-wrong command degrades to a
//! reported error the agent can read and recover from; it never aborts the
//! session.

pub mod dispatcher;
pub mod invocation;
pub mod preview;
pub mod session;
pub mod tools;
pub mod vfs;

pub use dispatcher::Dispatcher;
pub use invocation::{Invocation, InvocationState};
pub use maquette_types::{
    Command, ErrorKind, InvocationView, LineRange, ToolCall, ToolError, WireState,
};
pub use preview::{LatestPreview, NullPreview, PreviewSink};
pub use session::{Session, SessionConfig, SessionRegistry, TurnReport};
pub use vfs::{Snapshot, VirtualFs};
