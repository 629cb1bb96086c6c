//! The edit engine: content-mutating commands.

use maquette_types::{LineRange, ToolError};

use crate::vfs::VirtualFs;

use super::excerpt;

/// Executes `create`, `view`, `str_replace`, `insert`, and `undo_edit`.
///
/// Stateless apart from configuration; the tree it operates on is passed
/// in per call, so one engine serves however many sessions share its
/// policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct EditEngine {
    strict_create: bool,
}

impl EditEngine {
    /// Engine with default policy: create is an upsert.
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine where `create` on an existing path fails with `Conflict`
    /// instead of overwriting.
    pub fn strict_create() -> Self {
        Self {
            strict_create: true,
        }
    }

    /// Write `content` at `path`.
    ///
    /// By default this is an upsert: an existing file's content is pushed
    /// to history and overwritten, matching the agent habit of re-creating
    /// the entrypoint file at the start of a project.
    pub async fn create(
        &self,
        vfs: &VirtualFs,
        path: &str,
        content: &str,
    ) -> Result<String, ToolError> {
        if self.strict_create && vfs.exists(path).await {
            return Err(ToolError::conflict(format!("file exists: {path}")));
        }
        let replaced = vfs.write(path, content).await?;
        if replaced {
            Ok(format!("Updated file: {path}"))
        } else {
            Ok(format!("Created file: {path}"))
        }
    }

    /// Return content, optionally sliced to a 1-indexed inclusive line
    /// range. Out-of-range line numbers are clamped, never errors; an
    /// inverted range after clamping selects nothing. Never touches
    /// history.
    pub async fn view(
        &self,
        vfs: &VirtualFs,
        path: &str,
        range: Option<LineRange>,
    ) -> Result<String, ToolError> {
        let content = vfs.read(path).await?;
        let Some(range) = range else {
            return Ok(content);
        };

        let lines: Vec<&str> = content.split('\n').collect();
        let start = (range.start.max(1) as usize - 1).min(lines.len());
        let end = range
            .end
            .map(|e| (e as usize).min(lines.len()))
            .unwrap_or(lines.len());
        if start >= end {
            return Ok(String::new());
        }
        Ok(lines[start..end].join("\n"))
    }

    /// Replace exactly one occurrence of `old` with `new`.
    ///
    /// Occurrences are exact, case-sensitive, and non-overlapping. Zero
    /// occurrences fail `NotFound`; more than one fails `AmbiguousMatch`
    /// with the count. The engine never guesses which one was intended.
    pub async fn replace(
        &self,
        vfs: &VirtualFs,
        path: &str,
        old: &str,
        new: &str,
    ) -> Result<String, ToolError> {
        if old.is_empty() {
            return Err(ToolError::validation(
                "old_str must not be empty: an empty match occurs everywhere",
            ));
        }

        let content = vfs.read(path).await?;
        match content.matches(old).count() {
            0 => Err(ToolError::not_found(format!(
                "no occurrence of \"{}\" in {path}",
                excerpt(old)
            ))),
            1 => {
                vfs.write(path, &content.replacen(old, new, 1)).await?;
                Ok(format!("Replaced one occurrence in {path}"))
            }
            n => Err(ToolError::ambiguous_match(format!(
                "{n} occurrences of \"{}\" in {path}; narrow the match",
                excerpt(old)
            ))),
        }
    }

    /// Insert `text` immediately after 0-indexed line `after_line`.
    ///
    /// 0 prepends before the first line; positions past end-of-file append.
    /// Position is clamped like `view`, since agents often miscount lines
    /// by one. `text` may itself span multiple lines.
    pub async fn insert(
        &self,
        vfs: &VirtualFs,
        path: &str,
        after_line: u32,
        text: &str,
    ) -> Result<String, ToolError> {
        let content = vfs.read(path).await?;
        let mut lines: Vec<&str> = content.split('\n').collect();
        let at = (after_line as usize).min(lines.len());
        lines.splice(at..at, text.split('\n'));
        vfs.write(path, &lines.join("\n")).await?;
        Ok(format!("Inserted text after line {after_line} in {path}"))
    }

    /// Restore the most recent history snapshot of `path`.
    pub async fn undo_edit(&self, vfs: &VirtualFs, path: &str) -> Result<String, ToolError> {
        vfs.pop_history(path).await?;
        Ok(format!("Reverted last edit to {path}"))
    }
}
