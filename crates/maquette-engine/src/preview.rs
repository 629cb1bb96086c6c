//! Preview bridge: hands consistent snapshots to the live preview.
//!
//! The bundler/renderer behind the preview is an external collaborator.
//! The engine's only obligations are timing and consistency: sinks are
//! notified once per completed turn, with the full `path → content`
//! mapping, never mid-edit. Whether the project resolves a root component
//! at `/App.jsx` is the bundler's concern; the engine neither checks nor
//! enforces it.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::vfs::Snapshot;

/// Receives the tree snapshot after each completed turn.
///
/// Publishing is advisory: a sink failure is logged by the session and
/// never fails the turn.
#[async_trait]
pub trait PreviewSink: Send + Sync {
    /// Hand a consistent snapshot to the renderer.
    async fn publish(&self, snapshot: Snapshot) -> anyhow::Result<()>;
}

/// Discards every snapshot. Useful as a placeholder while wiring a host.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPreview;

#[async_trait]
impl PreviewSink for NullPreview {
    async fn publish(&self, _snapshot: Snapshot) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Retains the most recent snapshot for polling.
///
/// The shape an embedding bundler (or a test harness) wants: it re-renders
/// from whatever the latest consistent tree is, not from a backlog.
#[derive(Debug, Default)]
pub struct LatestPreview {
    latest: RwLock<Option<Snapshot>>,
}

impl LatestPreview {
    /// Create an empty holder.
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently published snapshot, if any turn has completed.
    pub async fn latest(&self) -> Option<Snapshot> {
        self.latest.read().await.clone()
    }

    /// Number of files in the latest snapshot.
    pub async fn file_count(&self) -> usize {
        self.latest.read().await.as_ref().map_or(0, Snapshot::len)
    }
}

#[async_trait]
impl PreviewSink for LatestPreview {
    async fn publish(&self, snapshot: Snapshot) -> anyhow::Result<()> {
        *self.latest.write().await = Some(snapshot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_of(pairs: &[(&str, &str)]) -> Snapshot {
        pairs
            .iter()
            .map(|(p, c)| (p.to_string(), c.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_latest_starts_empty() {
        let preview = LatestPreview::new();
        assert!(preview.latest().await.is_none());
        assert_eq!(preview.file_count().await, 0);
    }

    #[tokio::test]
    async fn test_latest_retains_most_recent() {
        let preview = LatestPreview::new();
        preview
            .publish(snapshot_of(&[("/App.jsx", "v1")]))
            .await
            .unwrap();
        preview
            .publish(snapshot_of(&[("/App.jsx", "v2"), ("/B.jsx", "b")]))
            .await
            .unwrap();

        let latest = preview.latest().await.unwrap();
        assert_eq!(latest.len(), 2);
        assert_eq!(latest["/App.jsx"], "v2");
    }

    #[tokio::test]
    async fn test_null_preview_accepts_anything() {
        NullPreview
            .publish(snapshot_of(&[("/App.jsx", "x")]))
            .await
            .unwrap();
    }
}
