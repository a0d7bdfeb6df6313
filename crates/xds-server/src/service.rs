//! The gRPC surface and per-stream select loop.
//!
//! Each accepted delta stream runs two tasks: a reader that forwards
//! inbound requests into a channel, and the session loop that owns every
//! piece of per-stream state. The loop multiplexes four inputs - drain
//! signal, auth timer, requests, snapshots - and runs one ordered send
//! pulse after any input that could change the diff.

use std::future;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, Notify};
use tokio::time::{self, Instant};
use tokio_stream::wrappers::ReceiverStream;
use tonic::metadata::MetadataMap;
use tonic::{Request, Response, Status, Streaming};
use tracing::{debug, error, info};

use xds_core::{XdsError, XdsResult};
use xds_snapshot::{ProxySnapshot, SnapshotReceiver};
use xds_types::envoy::service::discovery::v3::aggregated_discovery_service_server::AggregatedDiscoveryService;
use xds_types::envoy::service::discovery::v3::{
    DeltaDiscoveryRequest, DeltaDiscoveryResponse, DiscoveryRequest, DiscoveryResponse,
};

use crate::auth::Identity;
use crate::delta::ResponseSender;
use crate::server::DeltaServer;
use crate::session::DeltaSession;
use crate::stream::StreamContext;

/// Response stream type for the unsupported state-of-the-world method.
pub type SotwResponseStream = ReceiverStream<Result<DiscoveryResponse, Status>>;

/// Response stream type for the delta method.
pub type DeltaResponseStream = ReceiverStream<Result<DeltaDiscoveryResponse, Status>>;

#[async_trait]
impl AggregatedDiscoveryService for DeltaServer {
    type StreamAggregatedResourcesStream = SotwResponseStream;

    async fn stream_aggregated_resources(
        &self,
        _request: Request<Streaming<DiscoveryRequest>>,
    ) -> Result<Response<Self::StreamAggregatedResourcesStream>, Status> {
        Err(Status::unimplemented(
            "state-of-the-world xDS is not supported; use the incremental protocol",
        ))
    }

    type DeltaAggregatedResourcesStream = DeltaResponseStream;

    async fn delta_aggregated_resources(
        &self,
        request: Request<Streaming<DeltaDiscoveryRequest>>,
    ) -> Result<Response<Self::DeltaAggregatedResourcesStream>, Status> {
        let metadata = request.metadata().clone();
        let mut requests = request.into_inner();

        let (response_tx, response_rx) = mpsc::channel(self.config().response_buffer_size);
        let (request_tx, request_rx) = mpsc::channel(self.config().request_buffer_size);

        // Reader task. Once the session loop drops its receiver, the
        // forwarding send fails and the task winds down; the gRPC receive is
        // abandoned with it, so nothing is ever pushed at a dead session.
        tokio::spawn(async move {
            loop {
                match requests.message().await {
                    Ok(Some(request)) => {
                        if request_tx.send(request).await.is_err() {
                            return;
                        }
                    }
                    Ok(None) => {
                        // The peer half-closed cleanly.
                        return;
                    }
                    Err(err) => {
                        error!(error = %err,
                            "error receiving delta discovery request; closing request channel");
                        return;
                    }
                }
            }
        });

        let server = self.clone();
        let error_tx = response_tx.clone();
        tokio::spawn(async move {
            if let Err(err) = server
                .run_delta_stream(metadata, request_rx, response_tx)
                .await
            {
                let _ = error_tx.send(Err(err.into())).await;
            }
        });

        Ok(Response::new(ReceiverStream::new(response_rx)))
    }
}

impl DeltaServer {
    /// Authenticate and run the session loop for one stream.
    ///
    /// This is the whole life of a stream: the returned error (if any)
    /// becomes its terminal gRPC status.
    pub(crate) async fn run_delta_stream(
        &self,
        metadata: MetadataMap,
        mut requests: mpsc::Receiver<DeltaDiscoveryRequest>,
        responses: mpsc::Sender<Result<DeltaDiscoveryResponse, Status>>,
    ) -> XdsResult<()> {
        // Reject invalid credentials up-front.
        let identity = self.authenticator.authenticate(&metadata).await?;

        let ctx = StreamContext::new();
        let guard = self.active_streams.register(ctx.id());
        let drain = guard.drain_signal();
        self.metrics.stream_opened();
        info!(stream = %ctx.id(), active = self.active_streams.active(),
            "delta xDS stream started");

        let mut session = DeltaSession::new(
            ctx,
            ResponseSender::new(responses),
            Arc::clone(&self.generators),
            self.extensions.clone(),
            self.metrics.clone(),
            self.config.legacy_child_resend,
        );

        let result = self
            .stream_loop(&identity, &drain, &mut requests, &mut session)
            .await;

        let ctx = session.context();
        match &result {
            Ok(()) => info!(
                stream = %ctx.id(),
                duration = ?ctx.duration(),
                requests = ctx.request_count(),
                responses = ctx.response_count(),
                "delta xDS stream ended"
            ),
            Err(err) => error!(stream = %ctx.id(), error = %err, "delta xDS stream ended"),
        }
        self.metrics.stream_closed(ctx.duration());
        result
    }

    /// The per-stream select loop.
    async fn stream_loop(
        &self,
        identity: &Identity,
        drain: &Notify,
        requests: &mut mpsc::Receiver<DeltaDiscoveryRequest>,
        session: &mut DeltaSession,
    ) -> XdsResult<()> {
        let mut snapshots: Option<SnapshotReceiver> = None;
        let mut auth_deadline = Instant::now() + self.config.auth_check_period;

        loop {
            tokio::select! {
                _ = drain.notified() => {
                    debug!(stream = %session.context().id(),
                        "draining stream to rebalance load");
                    self.metrics.stream_drained();
                    return Err(XdsError::Overwhelmed);
                }

                _ = time::sleep_until(auth_deadline) => {
                    // Too long since the last exchange; re-check ACLs anyway.
                    self.authenticator.check_stream_acls(identity)?;
                    auth_deadline = Instant::now() + self.config.auth_check_period;
                    continue;
                }

                request = requests.recv() => {
                    let Some(request) = request else {
                        // The reader closed the channel: the peer went away.
                        return Ok(());
                    };

                    if !session.accept_discovery_request(&request)? {
                        continue;
                    }

                    if !session.ready() && snapshots.is_none() {
                        let node = session.node().cloned().ok_or(XdsError::MissingNode)?;
                        snapshots = Some(self.watcher.watch(&node).await?);
                        // Nothing to send until the first snapshot lands.
                        continue;
                    }
                }

                snapshot = recv_snapshot(&mut snapshots) => {
                    let Some(snapshot) = snapshot else {
                        // We did not cancel this watch, so the watcher hit an
                        // irrecoverable error.
                        return Err(XdsError::SnapshotChannelClosed);
                    };
                    session.install_snapshot(snapshot)?;
                }
            }

            // An input landed: re-check ACLs, restart the auth timer, and
            // give every type its ordered chance to send.
            self.authenticator.check_stream_acls(identity)?;
            auth_deadline = Instant::now() + self.config.auth_check_period;
            session.update_proxy_if_necessary().await?;
        }
    }
}

/// Await the next snapshot, or park forever while no watch is installed.
async fn recv_snapshot(
    snapshots: &mut Option<SnapshotReceiver>,
) -> Option<Arc<dyn ProxySnapshot>> {
    match snapshots {
        Some(rx) => rx.recv().await,
        None => future::pending().await,
    }
}
