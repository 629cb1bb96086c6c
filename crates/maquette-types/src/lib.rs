//! maquette-types: pure data types for maquette.
//!
//! This crate is the boundary the external collaborators compile against:
//!
//! - **wire**: tool calls as they arrive off the agent stream, and the
//!   invocation view the progress display consumes
//! - **command**: the closed, validated command model
//! - **error**: the recoverable error taxonomy
//!
//! It carries no engine logic and no async machinery, only shapes.

pub mod command;
pub mod error;
pub mod wire;

pub use command::{Command, LineRange, EDITOR_TOOL, FILE_MANAGER_TOOL};
pub use error::{ErrorKind, ToolError};
pub use wire::{InvocationView, ToolCall, WireState};
