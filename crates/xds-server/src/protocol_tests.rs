//! Protocol compliance tests for the delta xDS server.
//!
//! These drive whole streams through [`DeltaServer::run_delta_stream`] with
//! stub collaborators, covering the end-to-end scenarios of the incremental
//! protocol: initial wildcard sync, ACK/NACK handling, reconnect recovery,
//! drain, auth revocation, and watcher failure. The `invariants` module
//! checks the state-machine invariants with property tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use prost::Message;
use prost_types::Any;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tonic::metadata::MetadataMap;
use tonic::Status;

use xds_core::{TypeUrl, XdsError, XdsResult};
use xds_snapshot::{
    hash_resource, GeneratorSet, ProxyFeatures, ProxySnapshot, ProxyWatcher, ResourceGenerator,
    ResourceIndex, SnapshotKind, SnapshotReceiver,
};
use xds_types::envoy::config::core::v3::Node;
use xds_types::envoy::service::discovery::v3::{DeltaDiscoveryRequest, DeltaDiscoveryResponse};

use crate::auth::{AllowAllAuthenticator, Authenticator, Identity};
use crate::config::ServerConfig;
use crate::server::DeltaServer;

// ---------------------------------------------------------------------------
// Stub collaborators
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct TestSnapshot {
    resources: HashMap<String, HashMap<String, Any>>,
}

impl TestSnapshot {
    fn new(entries: &[(&str, &str, Vec<u8>)]) -> Arc<dyn ProxySnapshot> {
        let mut resources: HashMap<String, HashMap<String, Any>> = HashMap::new();
        for (type_url, name, payload) in entries {
            resources.entry(type_url.to_string()).or_default().insert(
                name.to_string(),
                Any {
                    type_url: type_url.to_string(),
                    value: payload.clone(),
                },
            );
        }
        Arc::new(Self { resources })
    }
}

impl ProxySnapshot for TestSnapshot {
    fn kind(&self) -> SnapshotKind {
        SnapshotKind::Config
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

struct TestGenerator;

impl ResourceGenerator for TestGenerator {
    fn generate(
        &self,
        snapshot: &dyn ProxySnapshot,
        _features: &ProxyFeatures,
    ) -> XdsResult<ResourceIndex> {
        let snapshot = snapshot
            .as_any()
            .downcast_ref::<TestSnapshot>()
            .ok_or(XdsError::InvalidSnapshot {
                reason: "unsupported snapshot payload".to_string(),
            })?;
        Ok(ResourceIndex::from_resources(snapshot.resources.clone()))
    }
}

/// A watcher handing out one pre-built channel; the test side keeps the
/// sender and plays the part of the config pipeline.
struct ChannelWatcher {
    receiver: Mutex<Option<SnapshotReceiver>>,
}

impl ChannelWatcher {
    fn new() -> (Self, mpsc::Sender<Arc<dyn ProxySnapshot>>) {
        let (tx, rx) = mpsc::channel(8);
        (
            Self {
                receiver: Mutex::new(Some(rx)),
            },
            tx,
        )
    }
}

#[async_trait]
impl ProxyWatcher for ChannelWatcher {
    async fn watch(&self, _node: &Node) -> XdsResult<SnapshotReceiver> {
        Ok(self
            .receiver
            .lock()
            .unwrap()
            .take()
            .expect("one watch per test stream"))
    }
}

/// Grants a fixed number of ACL checks, then revokes.
struct CountdownAuthenticator {
    remaining_checks: AtomicI64,
}

impl CountdownAuthenticator {
    fn allowing(checks: i64) -> Self {
        Self {
            remaining_checks: AtomicI64::new(checks),
        }
    }
}

#[async_trait]
impl Authenticator for CountdownAuthenticator {
    async fn authenticate(&self, _metadata: &MetadataMap) -> XdsResult<Identity> {
        Ok(Identity::new("countdown"))
    }

    fn check_stream_acls(&self, _identity: &Identity) -> XdsResult<()> {
        if self.remaining_checks.fetch_sub(1, Ordering::SeqCst) <= 0 {
            return Err(XdsError::PermissionDenied {
                reason: "token deleted".to_string(),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct StreamHarness {
    requests: mpsc::Sender<DeltaDiscoveryRequest>,
    responses: mpsc::Receiver<Result<DeltaDiscoveryResponse, Status>>,
    snapshots: mpsc::Sender<Arc<dyn ProxySnapshot>>,
    handle: tokio::task::JoinHandle<XdsResult<()>>,
    server: DeltaServer,
}

fn start_stream(authenticator: Arc<dyn Authenticator>, config: ServerConfig) -> StreamHarness {
    let (watcher, snapshots) = ChannelWatcher::new();
    let server = DeltaServer::builder()
        .authenticator(authenticator)
        .watcher(Arc::new(watcher))
        .generators(Arc::new(GeneratorSet::uniform(Arc::new(TestGenerator))))
        .config(config)
        .build()
        .unwrap();

    let (request_tx, request_rx) = mpsc::channel(16);
    let (response_tx, response_rx) = mpsc::channel(16);
    let stream_server = server.clone();
    let handle = tokio::spawn(async move {
        stream_server
            .run_delta_stream(MetadataMap::new(), request_rx, response_tx)
            .await
    });

    StreamHarness {
        requests: request_tx,
        responses: response_rx,
        snapshots,
        handle,
        server,
    }
}

fn harness() -> StreamHarness {
    start_stream(
        Arc::new(AllowAllAuthenticator),
        ServerConfig {
            legacy_child_resend: false,
            ..Default::default()
        },
    )
}

impl StreamHarness {
    async fn send(&self, request: DeltaDiscoveryRequest) {
        self.requests.send(request).await.expect("stream loop alive");
    }

    async fn push_snapshot(&self, snapshot: Arc<dyn ProxySnapshot>) {
        self.snapshots.send(snapshot).await.expect("watch alive");
    }

    async fn next_response(&mut self) -> DeltaDiscoveryResponse {
        timeout(Duration::from_secs(2), self.responses.recv())
            .await
            .expect("timed out waiting for a response")
            .expect("stream ended unexpectedly")
            .expect("terminal status instead of a response")
    }

    async fn expect_silence(&mut self) {
        let outcome = timeout(Duration::from_millis(150), self.responses.recv()).await;
        assert!(outcome.is_err(), "expected no response, got {outcome:?}");
    }
}

fn wildcard_request(type_url: &str, node_id: &str) -> DeltaDiscoveryRequest {
    DeltaDiscoveryRequest {
        type_url: type_url.to_string(),
        node: Some(Node {
            id: node_id.to_string(),
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn ack(type_url: &str, nonce: &str) -> DeltaDiscoveryRequest {
    DeltaDiscoveryRequest {
        type_url: type_url.to_string(),
        response_nonce: nonce.to_string(),
        ..Default::default()
    }
}

fn nack(type_url: &str, nonce: &str) -> DeltaDiscoveryRequest {
    DeltaDiscoveryRequest {
        type_url: type_url.to_string(),
        response_nonce: nonce.to_string(),
        error_detail: Some(xds_types::google::rpc::Status {
            code: 3,
            message: "failed to apply".to_string(),
            details: vec![],
        }),
        ..Default::default()
    }
}

fn listener_payload(name: &str) -> Vec<u8> {
    xds_types::envoy::config::listener::v3::Listener {
        name: name.to_string(),
        filter_chains: vec![],
        default_filter_chain: None,
    }
    .encode_to_vec()
}

fn listener_version(payload: &[u8]) -> String {
    hash_resource(&Any {
        type_url: TypeUrl::LISTENER.to_string(),
        value: payload.to_vec(),
    })
}

// ---------------------------------------------------------------------------
// End-to-end scenarios
// ---------------------------------------------------------------------------

#[tokio::test]
async fn initial_wildcard_lds_sync_and_ack() {
    let mut stream = harness();
    stream
        .send(wildcard_request(TypeUrl::LISTENER, "sidecar-1"))
        .await;

    let l1 = listener_payload("l1");
    let l2 = listener_payload("l2");
    stream
        .push_snapshot(TestSnapshot::new(&[
            (TypeUrl::LISTENER, "l1", l1.clone()),
            (TypeUrl::LISTENER, "l2", l2.clone()),
        ]))
        .await;

    let response = stream.next_response().await;
    assert_eq!(response.type_url, TypeUrl::LISTENER);
    assert_eq!(response.nonce, "00000001");
    assert!(response.removed_resources.is_empty());
    assert_eq!(response.resources.len(), 2);

    let mut names: Vec<&str> = response.resources.iter().map(|r| r.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["l1", "l2"]);
    for resource in &response.resources {
        let expected = if resource.name == "l1" { &l1 } else { &l2 };
        assert_eq!(resource.version, listener_version(expected));
    }

    // ACK path: same inputs produce no further response.
    stream.send(ack(TypeUrl::LISTENER, "00000001")).await;
    stream.expect_silence().await;
}

#[tokio::test]
async fn nack_retains_confirmed_versions() {
    let mut stream = harness();
    stream
        .send(wildcard_request(TypeUrl::LISTENER, "sidecar-1"))
        .await;

    let l1 = listener_payload("l1");
    let l2 = listener_payload("l2");
    stream
        .push_snapshot(TestSnapshot::new(&[
            (TypeUrl::LISTENER, "l1", l1.clone()),
            (TypeUrl::LISTENER, "l2", l2.clone()),
        ]))
        .await;
    let first = stream.next_response().await;
    stream.send(ack(TypeUrl::LISTENER, &first.nonce)).await;

    // l1 changes; the proxy rejects the update.
    let l1_changed = listener_payload("l1-changed");
    let changed = &[
        (TypeUrl::LISTENER, "l1", l1_changed.clone()),
        (TypeUrl::LISTENER, "l2", l2.clone()),
    ];
    stream.push_snapshot(TestSnapshot::new(changed)).await;
    let second = stream.next_response().await;
    assert_eq!(second.resources.len(), 1);
    assert_eq!(second.resources[0].name, "l1");
    stream.send(nack(TypeUrl::LISTENER, &second.nonce)).await;

    // Confirmed state is untouched, so re-installing the same desired state
    // re-proposes exactly the rejected resource.
    stream.push_snapshot(TestSnapshot::new(changed)).await;
    let third = stream.next_response().await;
    assert_eq!(third.resources.len(), 1);
    assert_eq!(third.resources[0].name, "l1");
    assert_eq!(third.resources[0].version, listener_version(&l1_changed));
}

#[tokio::test]
async fn reconnect_with_initial_versions_skips_held_resources() {
    let mut stream = harness();

    let l1 = listener_payload("l1");
    let l2 = listener_payload("l2");

    // First request of the new stream declares what the proxy already has.
    let mut request = wildcard_request(TypeUrl::LISTENER, "sidecar-1");
    request
        .initial_resource_versions
        .insert("l1".to_string(), listener_version(&l1));
    stream.send(request).await;

    stream
        .push_snapshot(TestSnapshot::new(&[
            (TypeUrl::LISTENER, "l1", l1),
            (TypeUrl::LISTENER, "l2", l2),
        ]))
        .await;

    let response = stream.next_response().await;
    assert_eq!(response.resources.len(), 1);
    assert_eq!(response.resources[0].name, "l2");
    assert!(response.removed_resources.is_empty());
}

#[tokio::test]
async fn drain_terminates_with_resource_exhausted() {
    let mut stream = harness();
    stream
        .send(wildcard_request(TypeUrl::CLUSTER, "sidecar-1"))
        .await;
    stream
        .push_snapshot(TestSnapshot::new(&[(
            TypeUrl::CLUSTER,
            "web",
            b"web-v1".to_vec(),
        )]))
        .await;
    let _first = stream.next_response().await;
    assert_eq!(stream.server.active_streams().active(), 1);

    stream.server.active_streams().drain_all();

    let err = timeout(Duration::from_secs(2), stream.handle)
        .await
        .expect("stream should terminate")
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, XdsError::Overwhelmed));
    let status: Status = err.into();
    assert_eq!(status.code(), tonic::Code::ResourceExhausted);
    assert_eq!(stream.server.active_streams().active(), 0);

    // No further sends after the drain.
    assert!(stream.responses.recv().await.is_none());
}

#[tokio::test]
async fn revoked_acls_terminate_the_stream() {
    let mut stream = start_stream(
        Arc::new(CountdownAuthenticator::allowing(1)),
        ServerConfig {
            legacy_child_resend: false,
            ..Default::default()
        },
    );
    stream
        .send(wildcard_request(TypeUrl::CLUSTER, "sidecar-1"))
        .await;
    stream
        .push_snapshot(TestSnapshot::new(&[(
            TypeUrl::CLUSTER,
            "web",
            b"web-v1".to_vec(),
        )]))
        .await;
    let first = stream.next_response().await;

    // The next pulse re-checks ACLs and finds the credential revoked.
    stream.send(ack(TypeUrl::CLUSTER, &first.nonce)).await;
    let err = timeout(Duration::from_secs(2), stream.handle)
        .await
        .expect("stream should terminate")
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, XdsError::PermissionDenied { .. }));
}

#[tokio::test]
async fn watcher_failure_terminates_with_aborted() {
    let mut stream = harness();
    stream
        .send(wildcard_request(TypeUrl::CLUSTER, "sidecar-1"))
        .await;
    stream
        .push_snapshot(TestSnapshot::new(&[(
            TypeUrl::CLUSTER,
            "web",
            b"web-v1".to_vec(),
        )]))
        .await;
    let _first = stream.next_response().await;

    // The watcher closing its channel signals an irrecoverable error.
    drop(stream.snapshots);

    let err = timeout(Duration::from_secs(2), stream.handle)
        .await
        .expect("stream should terminate")
        .unwrap()
        .unwrap_err();
    assert!(matches!(err, XdsError::SnapshotChannelClosed));
    let status: Status = err.into();
    assert_eq!(status.code(), tonic::Code::Aborted);
}

#[tokio::test]
async fn peer_disconnect_is_a_clean_exit() {
    let stream = harness();
    stream
        .send(wildcard_request(TypeUrl::CLUSTER, "sidecar-1"))
        .await;

    // Dropping the request sender models the reader task winding down after
    // the peer went away.
    drop(stream.requests);

    let result = timeout(Duration::from_secs(2), stream.handle)
        .await
        .expect("stream should terminate")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn listener_removal_ordering_respects_cluster_references() {
    let mut stream = harness();
    for type_url in [TypeUrl::CLUSTER, TypeUrl::LISTENER] {
        stream.send(wildcard_request(type_url, "sidecar-1")).await;
    }

    let old_listener = listener_payload("old");
    stream
        .push_snapshot(TestSnapshot::new(&[
            (TypeUrl::CLUSTER, "stale", b"stale-v1".to_vec()),
            (TypeUrl::LISTENER, "old", old_listener.clone()),
        ]))
        .await;
    let first_cds = stream.next_response().await;
    assert_eq!(first_cds.type_url, TypeUrl::CLUSTER);
    let first_lds = stream.next_response().await;
    assert_eq!(first_lds.type_url, TypeUrl::LISTENER);
    stream.send(ack(TypeUrl::CLUSTER, &first_cds.nonce)).await;
    stream.send(ack(TypeUrl::LISTENER, &first_lds.nonce)).await;

    // New desired state: fresh cluster + listener, stale cluster gone. The
    // cluster upsert must precede the listener upsert, and the stale
    // cluster's removal must trail it.
    let new_listener = listener_payload("new");
    stream
        .push_snapshot(TestSnapshot::new(&[
            (TypeUrl::CLUSTER, "fresh", b"fresh-v1".to_vec()),
            (TypeUrl::LISTENER, "new", new_listener),
        ]))
        .await;

    let cds_upsert = stream.next_response().await;
    assert_eq!(cds_upsert.type_url, TypeUrl::CLUSTER);
    assert_eq!(cds_upsert.resources.len(), 1);
    assert_eq!(cds_upsert.resources[0].name, "fresh");
    assert!(cds_upsert.removed_resources.is_empty());
    stream.send(ack(TypeUrl::CLUSTER, &cds_upsert.nonce)).await;

    let lds = stream.next_response().await;
    assert_eq!(lds.type_url, TypeUrl::LISTENER);
    assert_eq!(lds.resources.len(), 1);
    assert_eq!(lds.resources[0].name, "new");
    assert_eq!(lds.removed_resources, vec!["old".to_string()]);
    stream.send(ack(TypeUrl::LISTENER, &lds.nonce)).await;

    let cds_remove = stream.next_response().await;
    assert_eq!(cds_remove.type_url, TypeUrl::CLUSTER);
    assert!(cds_remove.resources.is_empty());
    assert_eq!(cds_remove.removed_resources, vec!["stale".to_string()]);

    assert!(cds_upsert.nonce < lds.nonce);
    assert!(lds.nonce < cds_remove.nonce);
}

// ---------------------------------------------------------------------------
// State-machine invariants
// ---------------------------------------------------------------------------

mod invariants {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    use crate::delta::{DeltaType, ResponseSender};

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap()
    }

    fn index_for(current: &HashMap<String, String>) -> ResourceIndex {
        let mut index = ResourceIndex::new();
        for name in current.keys() {
            index.insert(
                TypeUrl::CLUSTER,
                name.clone(),
                Any {
                    type_url: TypeUrl::CLUSTER.to_string(),
                    value: name.as_bytes().to_vec(),
                },
            );
        }
        index
    }

    fn wildcard_type() -> (
        DeltaType,
        mpsc::Receiver<Result<DeltaDiscoveryResponse, Status>>,
    ) {
        let (tx, rx) = mpsc::channel(64);
        let mut t = DeltaType::new(TypeUrl::new(TypeUrl::CLUSTER), ResponseSender::new(tx), false, false);
        t.recv(
            &DeltaDiscoveryRequest {
                type_url: TypeUrl::CLUSTER.to_string(),
                ..Default::default()
            },
            None,
        );
        (t, rx)
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// At most one response is ever in flight, and nonces strictly
        /// increase across a stream.
        #[test]
        fn in_flight_and_nonce_invariants(
            rounds in prop::collection::vec(
                (
                    prop::collection::btree_map("[a-d]", "[v-z]{1,3}", 0..4usize),
                    prop::bool::ANY,
                ),
                1..10,
            ),
        ) {
            runtime().block_on(async move {
                let (mut t, mut rx) = wildcard_type();
                let mut nonce = 0u64;
                let mut last_nonce = String::new();

                for (current, ack_it) in rounds {
                    let current: HashMap<String, String> = current.into_iter().collect();
                    let index = index_for(&current);
                    let sent = t
                        .send_if_new(Some(&current), &index, &mut nonce, true, true, None)
                        .await
                        .unwrap();
                    prop_assert!(t.pending_len() <= 1);
                    if !sent {
                        continue;
                    }

                    let response = rx.recv().await.unwrap().unwrap();
                    prop_assert!(response.nonce > last_nonce, "nonces must increase");
                    last_nonce = response.nonce.clone();

                    // A second send while un-ACKed must be refused.
                    let again = t
                        .send_if_new(Some(&current), &index, &mut nonce, true, true, None)
                        .await
                        .unwrap();
                    prop_assert!(!again);

                    let reply = DeltaDiscoveryRequest {
                        type_url: TypeUrl::CLUSTER.to_string(),
                        response_nonce: response.nonce.clone(),
                        error_detail: (!ack_it).then(|| xds_types::google::rpc::Status {
                            code: 13,
                            message: "rejected".to_string(),
                            details: vec![],
                        }),
                        ..Default::default()
                    };
                    t.recv(&reply, None);
                    prop_assert_eq!(t.pending_len(), 0);
                }
                Ok(())
            })?;
        }

        /// Once the proxy has confirmed everything, re-running the diff with
        /// unchanged versions emits nothing.
        #[test]
        fn steady_state_is_quiescent(
            current in prop::collection::btree_map("[a-d]", "[v-z]{1,3}", 1..5usize),
        ) {
            runtime().block_on(async move {
                let (mut t, mut rx) = wildcard_type();
                let current: HashMap<String, String> = current.into_iter().collect();
                let index = index_for(&current);
                let mut nonce = 0u64;

                let sent = t
                    .send_if_new(Some(&current), &index, &mut nonce, true, true, None)
                    .await
                    .unwrap();
                prop_assert!(sent);
                let response = rx.recv().await.unwrap().unwrap();
                t.recv(
                    &DeltaDiscoveryRequest {
                        type_url: TypeUrl::CLUSTER.to_string(),
                        response_nonce: response.nonce,
                        ..Default::default()
                    },
                    None,
                );

                let again = t
                    .send_if_new(Some(&current), &index, &mut nonce, true, true, None)
                    .await
                    .unwrap();
                prop_assert!(!again, "steady state must not re-send");
                prop_assert_eq!(nonce, 1);
                Ok(())
            })?;
        }

        /// Re-subscribing already-confirmed names forces exactly those names
        /// to be re-sent.
        #[test]
        fn subscribe_reset_resends_exactly_the_subset(
            names in prop::collection::btree_set("[a-f]", 1..6usize),
            picks in prop::collection::vec(prop::bool::ANY, 6),
        ) {
            runtime().block_on(async move {
                let (tx, mut rx) = mpsc::channel(64);
                let mut t = DeltaType::new(
                    TypeUrl::new(TypeUrl::CLUSTER),
                    ResponseSender::new(tx),
                    false,
                    false,
                );

                let names: Vec<String> = names.into_iter().collect();
                t.recv(
                    &DeltaDiscoveryRequest {
                        type_url: TypeUrl::CLUSTER.to_string(),
                        resource_names_subscribe: names.clone(),
                        ..Default::default()
                    },
                    None,
                );

                let current: HashMap<String, String> = names
                    .iter()
                    .map(|name| (name.clone(), format!("v-{name}")))
                    .collect();
                let index = index_for(&current);
                let mut nonce = 0u64;
                t.send_if_new(Some(&current), &index, &mut nonce, true, true, None)
                    .await
                    .unwrap();
                let response = rx.recv().await.unwrap().unwrap();
                t.recv(
                    &DeltaDiscoveryRequest {
                        type_url: TypeUrl::CLUSTER.to_string(),
                        response_nonce: response.nonce,
                        ..Default::default()
                    },
                    None,
                );

                let resubscribed: BTreeSet<String> = names
                    .iter()
                    .zip(picks.iter())
                    .filter(|(_, pick)| **pick)
                    .map(|(name, _)| name.clone())
                    .collect();
                t.recv(
                    &DeltaDiscoveryRequest {
                        type_url: TypeUrl::CLUSTER.to_string(),
                        resource_names_subscribe: resubscribed.iter().cloned().collect(),
                        ..Default::default()
                    },
                    None,
                );

                let sent = t
                    .send_if_new(Some(&current), &index, &mut nonce, true, true, None)
                    .await
                    .unwrap();
                if resubscribed.is_empty() {
                    prop_assert!(!sent);
                } else {
                    prop_assert!(sent);
                    let response = rx.recv().await.unwrap().unwrap();
                    let got: BTreeSet<String> = response
                        .resources
                        .iter()
                        .map(|r| r.name.clone())
                        .collect();
                    prop_assert_eq!(got, resubscribed);
                }
                Ok(())
            })?;
        }
    }
}
