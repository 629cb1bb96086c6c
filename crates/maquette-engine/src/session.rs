//! Sessions: one agent, one tree, one dispatcher.
//!
//! A [`Session`] owns everything scoped to one agent conversation: the
//! virtual tree, the dispatcher, the invocation log, and the preview
//! sinks. Sessions are fully independent (isolation is per-session, not
//! per-file), so any number may execute in parallel without shared state.
//!
//! Commands arrive in turns: the ordered batch a single agent response
//! produced. Within a turn they execute strictly in issuance order, one at
//! a time, and the preview is only notified after the last command reaches
//! a terminal state, so the previewed snapshot is never mid-edit.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;

use maquette_types::{InvocationView, ToolCall};

use crate::dispatcher::Dispatcher;
use crate::invocation::Invocation;
use crate::preview::PreviewSink;
use crate::tools::EditEngine;
use crate::vfs::{Snapshot, VirtualFs, DEFAULT_HISTORY_LIMIT};

/// Configuration for session creation.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Per-file cap on undo snapshots.
    pub history_limit: usize,
    /// When set, `create` on an existing path fails with `Conflict`
    /// instead of overwriting with history.
    pub strict_create: bool,
    /// Files written into the tree before the first turn, without history
    /// entries.
    pub seeds: Vec<(String, String)>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            strict_create: false,
            seeds: Vec::new(),
        }
    }
}

impl SessionConfig {
    /// Add a seed file.
    pub fn seed(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.seeds.push((path.into(), content.into()));
        self
    }
}

/// Everything the turn produced: the invocations that ran, in order, and
/// whether the turn was cut short.
#[derive(Debug)]
pub struct TurnReport {
    /// Terminal invocations, one per executed command.
    pub invocations: Vec<Invocation>,
    /// True when cancellation discarded remaining queued commands.
    pub cancelled: bool,
}

impl TurnReport {
    /// True if every executed command succeeded and none were discarded.
    pub fn all_ok(&self) -> bool {
        !self.cancelled && self.invocations.iter().all(Invocation::is_ok)
    }
}

/// One agent's workspace: tree, dispatcher, log, preview sinks.
pub struct Session {
    id: String,
    dispatcher: Dispatcher,
    log: RwLock<Vec<Invocation>>,
    sinks: RwLock<Vec<Arc<dyn PreviewSink>>>,
}

impl Session {
    /// Create a session and apply the configured seeds.
    ///
    /// `id` is the opaque identity the external auth collaborator issued;
    /// the engine only uses it as a lookup key and a log field.
    pub async fn new(id: impl Into<String>, config: SessionConfig) -> Self {
        let id = id.into();
        let vfs = Arc::new(VirtualFs::with_history_limit(config.history_limit));
        for (path, content) in &config.seeds {
            if let Err(err) = vfs.seed(path, content).await {
                tracing::warn!(session = %id, path = %path, error = %err, "skipping invalid seed");
            }
        }
        let editor = if config.strict_create {
            EditEngine::strict_create()
        } else {
            EditEngine::new()
        };
        tracing::debug!(session = %id, seeds = config.seeds.len(), "session opened");
        Self {
            id,
            dispatcher: Dispatcher::with_editor(vfs, editor),
            log: RwLock::new(Vec::new()),
            sinks: RwLock::new(Vec::new()),
        }
    }

    /// The opaque session identity.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The session's tree.
    pub fn vfs(&self) -> Arc<VirtualFs> {
        self.dispatcher.vfs().clone()
    }

    /// Register a preview sink. Every sink receives the snapshot after
    /// each completed turn.
    pub async fn add_preview_sink(&self, sink: Arc<dyn PreviewSink>) {
        self.sinks.write().await.push(sink);
    }

    /// Execute one turn: the calls run strictly in order, then the preview
    /// is notified with the resulting snapshot.
    pub async fn run_turn(&self, calls: Vec<ToolCall>) -> TurnReport {
        self.run_turn_with_cancel(calls, &CancellationToken::new())
            .await
    }

    /// Execute one turn under a cancellation token.
    ///
    /// Cancellation is checked between commands: remaining queued calls
    /// are discarded, the tree stays at whatever the last completed
    /// command produced (there is no partial-command rollback), and the
    /// preview is not notified.
    pub async fn run_turn_with_cancel(
        &self,
        calls: Vec<ToolCall>,
        cancel: &CancellationToken,
    ) -> TurnReport {
        let mut invocations = Vec::with_capacity(calls.len());
        let mut cancelled = false;

        for call in calls {
            if cancel.is_cancelled() {
                cancelled = true;
                break;
            }
            let invocation = self.dispatcher.execute_call(call).await;
            self.log.write().await.push(invocation.clone());
            invocations.push(invocation);
        }

        if cancelled {
            tracing::debug!(session = %self.id, ran = invocations.len(), "turn cancelled");
        } else {
            self.publish_preview().await;
        }

        TurnReport {
            invocations,
            cancelled,
        }
    }

    /// Export the current `path → content` mapping.
    pub async fn snapshot(&self) -> Snapshot {
        self.dispatcher.vfs().snapshot().await
    }

    /// Export the full invocation log in display form.
    pub async fn invocation_views(&self) -> Vec<InvocationView> {
        self.log.read().await.iter().map(Invocation::view).collect()
    }

    async fn publish_preview(&self) {
        let sinks = self.sinks.read().await;
        if sinks.is_empty() {
            return;
        }
        let snapshot = self.dispatcher.vfs().snapshot().await;
        for sink in sinks.iter() {
            if let Err(err) = sink.publish(snapshot.clone()).await {
                tracing::warn!(session = %self.id, error = %err, "preview sink failed");
            }
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("id", &self.id).finish()
    }
}

/// Session lookup keyed by the externally issued identity.
///
/// Trees are ephemeral: closing a session drops its VFS, so `close`
/// returns the final snapshot for callers that want to export first.
pub struct SessionRegistry {
    config: SessionConfig,
    sessions: RwLock<HashMap<String, Arc<Session>>>,
}

impl SessionRegistry {
    /// Create a registry; every session it opens uses `config`.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Get the session for an identity, creating it on first use.
    pub async fn open(&self, id: &str) -> Arc<Session> {
        if let Some(session) = self.sessions.read().await.get(id) {
            return session.clone();
        }
        let mut sessions = self.sessions.write().await;
        // Re-check under the write lock; another caller may have won.
        if let Some(session) = sessions.get(id) {
            return session.clone();
        }
        let session = Arc::new(Session::new(id, self.config.clone()).await);
        sessions.insert(id.to_string(), session.clone());
        session
    }

    /// Look up an existing session without creating one.
    pub async fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Close a session, returning its final snapshot.
    pub async fn close(&self, id: &str) -> Option<Snapshot> {
        let session = self.sessions.write().await.remove(id)?;
        let snapshot = session.snapshot().await;
        tracing::debug!(session = %id, files = snapshot.len(), "session closed");
        Some(snapshot)
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Check if no sessions are live.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preview::LatestPreview;
    use maquette_types::{ErrorKind, WireState};
    use serde_json::json;

    fn create_call(path: &str, content: &str) -> ToolCall {
        ToolCall::new(
            "str_replace_editor",
            json!({"command": "create", "path": path, "file_text": content}),
        )
    }

    #[tokio::test]
    async fn test_turn_executes_in_order() {
        let session = Session::new("s1", SessionConfig::default()).await;
        let report = session
            .run_turn(vec![
                create_call("/App.jsx", "v1"),
                ToolCall::new(
                    "str_replace_editor",
                    json!({"command": "str_replace", "path": "/App.jsx",
                           "old_str": "v1", "new_str": "v2"}),
                ),
            ])
            .await;

        assert!(report.all_ok());
        assert_eq!(report.invocations.len(), 2);
        assert!(report.invocations[0].id() < report.invocations[1].id());
        assert_eq!(session.vfs().read("/App.jsx").await.unwrap(), "v2");
    }

    #[tokio::test]
    async fn test_turn_continues_past_failures() {
        let session = Session::new("s1", SessionConfig::default()).await;
        let report = session
            .run_turn(vec![
                ToolCall::new(
                    "str_replace_editor",
                    json!({"command": "view", "path": "/missing.jsx"}),
                ),
                create_call("/App.jsx", "body"),
            ])
            .await;

        assert!(!report.all_ok());
        assert_eq!(
            report.invocations[0].error().map(|e| e.kind),
            Some(ErrorKind::NotFound)
        );
        assert!(report.invocations[1].is_ok());
        assert!(session.vfs().exists("/App.jsx").await);
    }

    #[tokio::test]
    async fn test_preview_notified_after_turn_completes() {
        let session = Session::new("s1", SessionConfig::default()).await;
        let preview = Arc::new(LatestPreview::new());
        session.add_preview_sink(preview.clone()).await;

        session
            .run_turn(vec![
                create_call("/App.jsx", "app"),
                create_call("/components/B.jsx", "b"),
            ])
            .await;

        // The snapshot reflects the whole turn, not an intermediate state.
        let snapshot = preview.latest().await.unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot["/App.jsx"], "app");
        assert_eq!(snapshot["/components/B.jsx"], "b");
    }

    #[tokio::test]
    async fn test_failing_sink_does_not_fail_turn() {
        struct FailingSink;

        #[async_trait::async_trait]
        impl PreviewSink for FailingSink {
            async fn publish(&self, _snapshot: Snapshot) -> anyhow::Result<()> {
                anyhow::bail!("renderer is down")
            }
        }

        let session = Session::new("s1", SessionConfig::default()).await;
        session.add_preview_sink(Arc::new(FailingSink)).await;

        let report = session.run_turn(vec![create_call("/App.jsx", "x")]).await;
        assert!(report.all_ok());
    }

    #[tokio::test]
    async fn test_cancelled_turn_discards_remaining_commands() {
        let session = Session::new("s1", SessionConfig::default()).await;
        let preview = Arc::new(LatestPreview::new());
        session.add_preview_sink(preview.clone()).await;

        let cancel = CancellationToken::new();
        cancel.cancel();
        let report = session
            .run_turn_with_cancel(vec![create_call("/App.jsx", "x")], &cancel)
            .await;

        assert!(report.cancelled);
        assert!(report.invocations.is_empty());
        assert!(!session.vfs().exists("/App.jsx").await);
        // Preview is not notified for a cancelled turn.
        assert!(preview.latest().await.is_none());
    }

    #[tokio::test]
    async fn test_seeded_session() {
        let config = SessionConfig::default().seed("/App.jsx", "seeded");
        let session = Session::new("s1", config).await;

        assert_eq!(session.vfs().read("/App.jsx").await.unwrap(), "seeded");
        // Seeds carry no history; undo has nothing to pop.
        let report = session
            .run_turn(vec![ToolCall::new(
                "str_replace_editor",
                json!({"command": "undo_edit", "path": "/App.jsx"}),
            )])
            .await;
        assert_eq!(
            report.invocations[0].error().map(|e| e.kind),
            Some(ErrorKind::EmptyHistory)
        );
    }

    #[tokio::test]
    async fn test_invocation_views_cover_whole_session() {
        let session = Session::new("s1", SessionConfig::default()).await;
        session.run_turn(vec![create_call("/App.jsx", "v1")]).await;
        session
            .run_turn(vec![ToolCall::new("unknown", json!({"command": "x"}))])
            .await;

        let views = session.invocation_views().await;
        assert_eq!(views.len(), 2);
        assert!(views.iter().all(|v| v.state == WireState::Result));
        assert_eq!(views[0].summary, "Created /App.jsx");
        assert_eq!(views[1].summary, "unknown");
    }

    #[tokio::test]
    async fn test_registry_open_is_idempotent() {
        let registry = SessionRegistry::new(SessionConfig::default());
        let a = registry.open("alice").await;
        let b = registry.open("alice").await;
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(registry.len().await, 1);
    }

    #[tokio::test]
    async fn test_registry_isolates_sessions() {
        let registry = SessionRegistry::new(SessionConfig::default());
        let alice = registry.open("alice").await;
        let bob = registry.open("bob").await;

        alice.run_turn(vec![create_call("/App.jsx", "alice's")]).await;

        assert!(!bob.vfs().exists("/App.jsx").await);
        assert_eq!(alice.vfs().read("/App.jsx").await.unwrap(), "alice's");
    }

    #[tokio::test]
    async fn test_registry_close_returns_final_snapshot() {
        let registry = SessionRegistry::new(SessionConfig::default());
        let session = registry.open("alice").await;
        session.run_turn(vec![create_call("/App.jsx", "final")]).await;

        let snapshot = registry.close("alice").await.unwrap();
        assert_eq!(snapshot["/App.jsx"], "final");
        assert!(registry.get("alice").await.is_none());
        assert!(registry.close("alice").await.is_none());
    }
}
