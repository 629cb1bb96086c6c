//! Command dispatch: validation, routing, failure containment.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use maquette_types::{Command, ToolCall, ToolError};

use crate::invocation::Invocation;
use crate::tools::{EditEngine, FileManager};
use crate::vfs::VirtualFs;

/// Validates incoming commands, routes them to the right engine, and
/// guarantees every execution path produces a terminal [`Invocation`].
///
/// This is the failure-containment boundary: a malformed or
/// logically-wrong agent command degrades to a reported error the agent
/// can read and recover from. Nothing that happens in here aborts the
/// session.
#[derive(Debug)]
pub struct Dispatcher {
    vfs: Arc<VirtualFs>,
    editor: EditEngine,
    manager: FileManager,
    next_id: AtomicU64,
}

impl Dispatcher {
    /// Create a dispatcher over a tree, with the default edit policy.
    pub fn new(vfs: Arc<VirtualFs>) -> Self {
        Self::with_editor(vfs, EditEngine::new())
    }

    /// Create a dispatcher with a specific edit engine (e.g. strict
    /// create).
    pub fn with_editor(vfs: Arc<VirtualFs>, editor: EditEngine) -> Self {
        Self {
            vfs,
            editor,
            manager: FileManager::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// The tree this dispatcher mutates.
    pub fn vfs(&self) -> &Arc<VirtualFs> {
        &self.vfs
    }

    /// Execute a wire-level tool call to a terminal invocation.
    ///
    /// Validation happens here, once; a call that fails it becomes a
    /// terminal `Error` invocation rather than an `Err`, so the agent sees
    /// the same shape for a typo'd command as for a missing file.
    pub async fn execute_call(&self, call: ToolCall) -> Invocation {
        match Command::parse(&call) {
            Ok(command) => self.run(call, command).await,
            Err(err) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(id, tool = %call.tool_name, error = %err, "rejected tool call");
                let mut invocation = Invocation::pending(id, call, None);
                invocation.begin();
                invocation.finish(Err(err));
                invocation
            }
        }
    }

    /// Execute an already-validated command to a terminal invocation.
    pub async fn execute(&self, command: Command) -> Invocation {
        self.run(command.to_call(), command).await
    }

    async fn run(&self, call: ToolCall, command: Command) -> Invocation {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let mut invocation = Invocation::pending(id, call, Some(&command));
        invocation.begin();

        let outcome = self.route(&command).await;
        match &outcome {
            Ok(_) => tracing::debug!(id, summary = %invocation.summary(), "command ok"),
            Err(err) => {
                tracing::debug!(id, summary = %invocation.summary(), error = %err, "command failed")
            }
        }

        invocation.finish(outcome);
        invocation
    }

    /// Route a command to its engine. Exhaustive over the closed command
    /// set: an unhandled variant is a compile error, not a fallback.
    async fn route(&self, command: &Command) -> Result<String, ToolError> {
        let vfs = self.vfs.as_ref();
        match command {
            Command::Create { path, content } => self.editor.create(vfs, path, content).await,
            Command::View { path, range } => self.editor.view(vfs, path, *range).await,
            Command::Replace { path, old, new } => self.editor.replace(vfs, path, old, new).await,
            Command::Insert {
                path,
                after_line,
                text,
            } => self.editor.insert(vfs, path, *after_line, text).await,
            Command::UndoEdit { path } => self.editor.undo_edit(vfs, path).await,
            Command::Rename { path, new_path } => self.manager.rename(vfs, path, new_path).await,
            Command::Delete { path } => self.manager.delete(vfs, path).await,
        }
    }
}
