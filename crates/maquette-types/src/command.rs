//! The closed command model.
//!
//! Agent tool calls arrive stringly-typed (`{toolName, args}` with a
//! `command` discriminator inside `args`). They are validated exactly once,
//! here, into a closed enum. Downstream routing is then an exhaustive
//! match, so an unhandled combination is a compile error rather than a
//! silent fallback.

use serde_json::{Map, Value, json};

use crate::error::ToolError;
use crate::wire::ToolCall;

/// Tool name for content-mutating commands.
pub const EDITOR_TOOL: &str = "str_replace_editor";
/// Tool name for structural commands.
pub const FILE_MANAGER_TOOL: &str = "file_manager";

/// A 1-indexed inclusive line range for `view`.
///
/// `end` of `None` reads through end of file (wire form `-1`). Out-of-range
/// values are clamped by the engine, not rejected: a view is diagnostic,
/// not authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    /// First line, 1-indexed.
    pub start: u32,
    /// Last line, inclusive. `None` means end of file.
    pub end: Option<u32>,
}

/// One validated agent command targeting the virtual file tree.
///
/// Each variant is immutable once issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Write `content` at `path`. Overwrites with history if the path
    /// exists; agents routinely recreate the entrypoint file.
    Create { path: String, content: String },
    /// Read content, optionally sliced to a line range. Never mutates.
    View {
        path: String,
        range: Option<LineRange>,
    },
    /// Replace exactly one occurrence of `old` with `new`.
    Replace {
        path: String,
        old: String,
        new: String,
    },
    /// Insert `text` immediately after 0-indexed line `after_line`
    /// (0 prepends; positions past end-of-file append).
    Insert {
        path: String,
        after_line: u32,
        text: String,
    },
    /// Restore the most recent history snapshot of `path`.
    UndoEdit { path: String },
    /// Re-key a file under `new_path`, preserving content and history.
    Rename { path: String, new_path: String },
    /// Remove a file outright. History is discarded.
    Delete { path: String },
}

impl Command {
    /// Validate a wire-level tool call into a command.
    ///
    /// This is the single ingestion point: anything that gets past here has
    /// a known tool, a known command, and all required arguments with the
    /// right types. Failures are `Validation` errors.
    pub fn parse(call: &ToolCall) -> Result<Self, ToolError> {
        let args = call
            .args
            .as_object()
            .ok_or_else(|| ToolError::validation("args must be a JSON object"))?;
        let command = require_str(args, "command")?;

        match call.tool_name.as_str() {
            EDITOR_TOOL => Self::parse_editor(command, args),
            FILE_MANAGER_TOOL => Self::parse_file_manager(command, args),
            other => Err(ToolError::validation(format!("unknown tool: {other}"))),
        }
    }

    fn parse_editor(command: &str, args: &Map<String, Value>) -> Result<Self, ToolError> {
        let path = require_str(args, "path")?.to_string();
        match command {
            "create" => Ok(Command::Create {
                path,
                content: require_str(args, "file_text")?.to_string(),
            }),
            "view" => Ok(Command::View {
                path,
                range: optional_range(args, "view_range")?,
            }),
            "str_replace" => Ok(Command::Replace {
                path,
                old: require_str(args, "old_str")?.to_string(),
                new: require_str(args, "new_str")?.to_string(),
            }),
            "insert" => Ok(Command::Insert {
                path,
                after_line: require_line(args, "insert_line")?,
                text: require_str(args, "new_str")?.to_string(),
            }),
            "undo_edit" => Ok(Command::UndoEdit { path }),
            other => Err(ToolError::validation(format!(
                "unknown editor command: {other}"
            ))),
        }
    }

    fn parse_file_manager(command: &str, args: &Map<String, Value>) -> Result<Self, ToolError> {
        let path = require_str(args, "path")?.to_string();
        match command {
            "rename" => Ok(Command::Rename {
                path,
                new_path: require_str(args, "new_path")?.to_string(),
            }),
            "delete" => Ok(Command::Delete { path }),
            other => Err(ToolError::validation(format!(
                "unknown file_manager command: {other}"
            ))),
        }
    }

    /// The tool this command belongs to.
    pub fn tool_name(&self) -> &'static str {
        match self {
            Command::Create { .. }
            | Command::View { .. }
            | Command::Replace { .. }
            | Command::Insert { .. }
            | Command::UndoEdit { .. } => EDITOR_TOOL,
            Command::Rename { .. } | Command::Delete { .. } => FILE_MANAGER_TOOL,
        }
    }

    /// The primary path this command targets.
    pub fn path(&self) -> &str {
        match self {
            Command::Create { path, .. }
            | Command::View { path, .. }
            | Command::Replace { path, .. }
            | Command::Insert { path, .. }
            | Command::UndoEdit { path }
            | Command::Rename { path, .. }
            | Command::Delete { path } => path,
        }
    }

    /// Human-readable description for progress display.
    ///
    /// A pure function of the command's variant and arguments, with no
    /// dependency on the outcome, so the summary is available while the
    /// invocation is still in flight.
    pub fn summary(&self) -> String {
        match self {
            Command::Create { path, .. } => format!("Created {path}"),
            Command::View { path, .. } => format!("Viewed {path}"),
            Command::Replace { path, .. } | Command::Insert { path, .. } => {
                format!("Edited {path}")
            }
            Command::UndoEdit { path } => format!("Reverted {path}"),
            Command::Rename { path, new_path } => format!("Renamed {path} → {new_path}"),
            Command::Delete { path } => format!("Deleted {path}"),
        }
    }

    /// Reconstruct the canonical wire form of this command.
    ///
    /// `parse(cmd.to_call())` always round-trips.
    pub fn to_call(&self) -> ToolCall {
        let args = match self {
            Command::Create { path, content } => json!({
                "command": "create", "path": path, "file_text": content
            }),
            Command::View { path, range } => match range {
                Some(r) => json!({
                    "command": "view", "path": path,
                    "view_range": [r.start, r.end.map(i64::from).unwrap_or(-1)]
                }),
                None => json!({"command": "view", "path": path}),
            },
            Command::Replace { path, old, new } => json!({
                "command": "str_replace", "path": path, "old_str": old, "new_str": new
            }),
            Command::Insert {
                path,
                after_line,
                text,
            } => json!({
                "command": "insert", "path": path, "insert_line": after_line, "new_str": text
            }),
            Command::UndoEdit { path } => json!({"command": "undo_edit", "path": path}),
            Command::Rename { path, new_path } => json!({
                "command": "rename", "path": path, "new_path": new_path
            }),
            Command::Delete { path } => json!({"command": "delete", "path": path}),
        };
        ToolCall::new(self.tool_name(), args)
    }
}

fn require_str<'a>(args: &'a Map<String, Value>, key: &str) -> Result<&'a str, ToolError> {
    match args.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(ToolError::validation(format!("{key} must be a string"))),
        None => Err(ToolError::validation(format!("missing required arg: {key}"))),
    }
}

fn require_line(args: &Map<String, Value>, key: &str) -> Result<u32, ToolError> {
    let value = args
        .get(key)
        .ok_or_else(|| ToolError::validation(format!("missing required arg: {key}")))?;
    value
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(|| ToolError::validation(format!("{key} must be a non-negative integer")))
}

fn optional_range(args: &Map<String, Value>, key: &str) -> Result<Option<LineRange>, ToolError> {
    let Some(value) = args.get(key) else {
        return Ok(None);
    };
    if value.is_null() {
        return Ok(None);
    }
    let invalid =
        || ToolError::validation(format!("{key} must be [start, end] with end -1 for EOF"));
    let pair = value.as_array().filter(|a| a.len() == 2).ok_or_else(invalid)?;
    let start = pair[0]
        .as_u64()
        .and_then(|n| u32::try_from(n).ok())
        .ok_or_else(invalid)?;
    let end = match pair[1].as_i64() {
        Some(-1) => None,
        Some(n) if n >= 0 => Some(u32::try_from(n).map_err(|_| invalid())?),
        _ => return Err(invalid()),
    };
    Ok(Some(LineRange { start, end }))
}
