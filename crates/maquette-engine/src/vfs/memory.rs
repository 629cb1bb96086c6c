//! The in-memory project tree.

use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap};

use tokio::sync::RwLock;

use maquette_types::ToolError;

use super::file::{VirtualFile, DEFAULT_HISTORY_LIMIT};

/// Full `path → content` mapping at a point in time.
///
/// Ordered so two snapshots of the same tree always serialize identically,
/// which keeps preview renders deterministic.
pub type Snapshot = BTreeMap<String, String>;

/// The virtual filesystem: normalized absolute path → file.
///
/// Thread-safe via interior `RwLock`, though each session is single-writer
/// by contract; the lock exists so sessions can be shared behind `Arc`
/// with readers (snapshot export, preview). All data is lost on drop; the
/// tree is ephemeral.
///
/// Every failure is a taxonomy error and leaves the mapping untouched.
#[derive(Debug)]
pub struct VirtualFs {
    files: RwLock<HashMap<String, VirtualFile>>,
    history_limit: usize,
}

impl Default for VirtualFs {
    fn default() -> Self {
        Self::new()
    }
}

impl VirtualFs {
    /// Create an empty tree with the default history limit.
    pub fn new() -> Self {
        Self::with_history_limit(DEFAULT_HISTORY_LIMIT)
    }

    /// Create an empty tree with a specific per-file history limit.
    pub fn with_history_limit(history_limit: usize) -> Self {
        Self {
            files: RwLock::new(HashMap::new()),
            history_limit,
        }
    }

    /// Normalize a path to its canonical absolute form: single leading `/`,
    /// `.`/`..`/empty segments resolved. `..` above the root stays at the
    /// root, matching POSIX resolution.
    ///
    /// A path that resolves to the root itself (`/`, `""`, `"."`) names no
    /// file and fails with `Validation`.
    pub fn normalize(path: &str) -> Result<String, ToolError> {
        let mut segments: Vec<&str> = Vec::new();
        for segment in path.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop();
                }
                s => segments.push(s),
            }
        }
        if segments.is_empty() {
            return Err(ToolError::validation(format!(
                "path does not name a file: {path:?}"
            )));
        }
        Ok(format!("/{}", segments.join("/")))
    }

    /// Read the current content of a file.
    pub async fn read(&self, path: &str) -> Result<String, ToolError> {
        let key = Self::normalize(path)?;
        let files = self.files.read().await;
        files
            .get(&key)
            .map(|f| f.content().to_string())
            .ok_or_else(|| ToolError::not_found(format!("no such file: {key}")))
    }

    /// Write content at a path, creating the file or overwriting it.
    ///
    /// Overwriting pushes the prior content onto the file's history.
    /// Returns `true` if an existing file was overwritten.
    pub async fn write(&self, path: &str, content: &str) -> Result<bool, ToolError> {
        let key = Self::normalize(path)?;
        let mut files = self.files.write().await;
        match files.entry(key) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().commit(content.to_string());
                Ok(true)
            }
            Entry::Vacant(entry) => {
                entry.insert(VirtualFile::new(content.to_string(), self.history_limit));
                Ok(false)
            }
        }
    }

    /// Insert a file without recording history, replacing any existing
    /// entry. Used to seed a session's initial tree; the first agent edit
    /// of a seeded file is still undoable back to the seed.
    pub async fn seed(&self, path: &str, content: &str) -> Result<(), ToolError> {
        let key = Self::normalize(path)?;
        let mut files = self.files.write().await;
        files.insert(key, VirtualFile::new(content.to_string(), self.history_limit));
        Ok(())
    }

    /// Remove a file entirely. History is discarded.
    pub async fn remove(&self, path: &str) -> Result<(), ToolError> {
        let key = Self::normalize(path)?;
        let mut files = self.files.write().await;
        files
            .remove(&key)
            .map(|_| ())
            .ok_or_else(|| ToolError::not_found(format!("no such file: {key}")))
    }

    /// Re-key a file under a new path, preserving content and history.
    ///
    /// Fails with `Conflict` if the target exists and `NotFound` if the
    /// source doesn't; neither path is mutated on failure.
    pub async fn rename(&self, from: &str, to: &str) -> Result<(), ToolError> {
        let from_key = Self::normalize(from)?;
        let to_key = Self::normalize(to)?;
        let mut files = self.files.write().await;
        if from_key != to_key && files.contains_key(&to_key) {
            return Err(ToolError::conflict(format!("target exists: {to_key}")));
        }
        let file = files
            .remove(&from_key)
            .ok_or_else(|| ToolError::not_found(format!("no such file: {from_key}")))?;
        files.insert(to_key, file);
        Ok(())
    }

    /// Pop the most recent history snapshot of a file and restore it as
    /// current content. Returns the restored content.
    pub async fn pop_history(&self, path: &str) -> Result<String, ToolError> {
        let key = Self::normalize(path)?;
        let mut files = self.files.write().await;
        let file = files
            .get_mut(&key)
            .ok_or_else(|| ToolError::not_found(format!("no such file: {key}")))?;
        file.undo()
            .map(str::to_string)
            .ok_or_else(|| ToolError::empty_history(format!("no edits to undo for {key}")))
    }

    /// Check whether a path resolves to a file.
    pub async fn exists(&self, path: &str) -> bool {
        match Self::normalize(path) {
            Ok(key) => self.files.read().await.contains_key(&key),
            Err(_) => false,
        }
    }

    /// Number of undo snapshots currently held for a file.
    pub async fn history_len(&self, path: &str) -> Result<usize, ToolError> {
        let key = Self::normalize(path)?;
        let files = self.files.read().await;
        files
            .get(&key)
            .map(VirtualFile::history_len)
            .ok_or_else(|| ToolError::not_found(format!("no such file: {key}")))
    }

    /// Number of files in the tree.
    pub async fn len(&self) -> usize {
        self.files.read().await.len()
    }

    /// Check if the tree is empty.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// All paths, sorted.
    pub async fn paths(&self) -> Vec<String> {
        let files = self.files.read().await;
        let mut paths: Vec<String> = files.keys().cloned().collect();
        paths.sort();
        paths
    }

    /// Export the full `path → content` mapping.
    pub async fn snapshot(&self) -> Snapshot {
        let files = self.files.read().await;
        files
            .iter()
            .map(|(path, file)| (path.clone(), file.content().to_string()))
            .collect()
    }
}
