//! The watcher seam feeding snapshots into a stream's session.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;

use xds_core::XdsResult;
use xds_types::envoy::config::core::v3::Node;

use crate::ProxySnapshot;

/// Receiving half of a snapshot watch.
///
/// The session owns the receiver for the lifetime of its stream. Dropping it
/// cancels the watch. If the *watcher* closes the channel instead, the
/// session treats it as an irrecoverable upstream error and terminates the
/// stream with `Aborted`.
pub type SnapshotReceiver = mpsc::Receiver<Arc<dyn ProxySnapshot>>;

/// Emits desired-state snapshots for a proxy as its configuration changes.
///
/// Implementations resolve the proxy from the node the client announced on
/// its first request and must send an initial snapshot once one is
/// available; the session sends nothing to the proxy until then.
#[async_trait]
pub trait ProxyWatcher: Send + Sync {
    /// Begin watching the proxy identified by `node`.
    async fn watch(&self, node: &Node) -> XdsResult<SnapshotReceiver>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SnapshotKind;

    #[derive(Debug)]
    struct StubSnapshot;

    impl ProxySnapshot for StubSnapshot {
        fn kind(&self) -> SnapshotKind {
            SnapshotKind::Config
        }

        fn as_any(&self) -> &dyn std::any::Any {
            self
        }
    }

    struct OneShotWatcher;

    #[async_trait]
    impl ProxyWatcher for OneShotWatcher {
        async fn watch(&self, _node: &Node) -> XdsResult<SnapshotReceiver> {
            let (tx, rx) = mpsc::channel(4);
            tx.send(Arc::new(StubSnapshot) as Arc<dyn ProxySnapshot>)
                .await
                .expect("receiver alive");
            Ok(rx)
        }
    }

    #[tokio::test]
    async fn watch_delivers_snapshots_then_closes() {
        let watcher = OneShotWatcher;
        let node = Node {
            id: "sidecar-1".into(),
            ..Default::default()
        };

        let mut rx = watcher.watch(&node).await.unwrap();
        let snapshot = rx.recv().await.expect("initial snapshot");
        assert_eq!(snapshot.kind(), SnapshotKind::Config);

        // The watcher dropped its sender, so the channel reports closure.
        assert!(rx.recv().await.is_none());
    }
}
