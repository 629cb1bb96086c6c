//! The file manager: structural commands.

use maquette_types::ToolError;

use crate::vfs::VirtualFs;

/// Executes `rename` and `delete`.
///
/// Structural operations re-key or drop whole entries; they never look at
/// content.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileManager;

impl FileManager {
    /// Create a file manager.
    pub fn new() -> Self {
        Self
    }

    /// Re-key a file under `new_path`, preserving content and history.
    /// The old path becomes unresolvable.
    pub async fn rename(
        &self,
        vfs: &VirtualFs,
        path: &str,
        new_path: &str,
    ) -> Result<String, ToolError> {
        vfs.rename(path, new_path).await?;
        Ok(format!("Renamed {path} to {new_path}"))
    }

    /// Remove a file entirely. History is discarded; deletion is not
    /// undoable through this engine.
    pub async fn delete(&self, vfs: &VirtualFs, path: &str) -> Result<String, ToolError> {
        vfs.remove(path).await?;
        Ok(format!("Deleted {path}"))
    }
}
