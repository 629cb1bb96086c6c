//! A single file in the virtual tree: current content plus undo history.

/// Default cap on per-file history snapshots.
///
/// When a file accumulates more, the oldest snapshot is evicted: the undo
/// window slides rather than erroring, the same way bounded output buffers
/// evict their oldest data.
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// One file: current text and a bounded stack of prior contents, most
/// recent last.
///
/// The stack is only touched by [`VirtualFs`](super::VirtualFs): overwrites
/// push, undo pops. Undo itself is never pushed, so it is not undoable;
/// re-doing requires the agent to reissue the edit.
#[derive(Debug, Clone)]
pub struct VirtualFile {
    content: String,
    history: Vec<String>,
    history_limit: usize,
}

impl VirtualFile {
    /// Create a file with empty history.
    pub(crate) fn new(content: String, history_limit: usize) -> Self {
        Self {
            content,
            history: Vec::new(),
            history_limit,
        }
    }

    /// Current content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Number of undo snapshots currently held.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Replace content, pushing the prior content onto the history stack.
    pub(crate) fn commit(&mut self, new_content: String) {
        if self.history.len() >= self.history_limit.max(1) {
            self.history.remove(0);
        }
        self.history
            .push(std::mem::replace(&mut self.content, new_content));
    }

    /// Pop the most recent snapshot and restore it as current content.
    ///
    /// Returns `None` when there is nothing to undo.
    pub(crate) fn undo(&mut self) -> Option<&str> {
        let restored = self.history.pop()?;
        self.content = restored;
        Some(&self.content)
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commit_pushes_prior_content() {
        let mut file = VirtualFile::new("v1".into(), DEFAULT_HISTORY_LIMIT);
        file.commit("v2".into());
        assert_eq!(file.content(), "v2");
        assert_eq!(file.history_len(), 1);
    }

    #[test]
    fn undo_restores_exact_prior_content() {
        let mut file = VirtualFile::new("v1".into(), DEFAULT_HISTORY_LIMIT);
        file.commit("v2".into());
        file.commit("v3".into());
        assert_eq!(file.undo(), Some("v2"));
        assert_eq!(file.undo(), Some("v1"));
        assert_eq!(file.undo(), None);
        assert_eq!(file.content(), "v1");
    }

    #[test]
    fn history_evicts_oldest_at_limit() {
        let mut file = VirtualFile::new("v0".into(), 3);
        for i in 1..=5 {
            file.commit(format!("v{i}"));
        }
        assert_eq!(file.history_len(), 3);
        // Oldest snapshots (v0, v1) were evicted; undo bottoms out at v2.
        assert_eq!(file.undo(), Some("v4"));
        assert_eq!(file.undo(), Some("v3"));
        assert_eq!(file.undo(), Some("v2"));
        assert_eq!(file.undo(), None);
    }

    #[test]
    fn zero_limit_still_keeps_one_snapshot() {
        let mut file = VirtualFile::new("v0".into(), 0);
        file.commit("v1".into());
        file.commit("v2".into());
        assert_eq!(file.history_len(), 1);
        assert_eq!(file.undo(), Some("v1"));
    }
}
