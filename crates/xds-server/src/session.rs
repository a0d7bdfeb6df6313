//! Per-stream session state and the ordered send discipline.
//!
//! A [`DeltaSession`] owns one [`DeltaType`] per recognized type URL plus
//! the current resource index and version maps. Every input that could
//! change the diff (a request from the proxy, a new snapshot) triggers one
//! *pulse*: a pass over [`DELTA_UPDATE_ORDER`] that gives each type a
//! chance to send, gated by its own pending-update invariant.

use std::sync::Arc;

use tracing::{error, trace, warn};

use xds_core::{TypeUrl, XdsError, XdsResult};
use xds_snapshot::{GeneratorSet, ProxyFeatures, ProxySnapshot, ResourceIndex, VersionMap};
use xds_types::envoy::config::core::v3::Node;
use xds_types::envoy::service::discovery::v3::DeltaDiscoveryRequest;

use crate::delta::{DeltaRecv, DeltaType, ResponseSender};
use crate::extensions::{apply_extensions, Extension, ExtensionContext};
use crate::metrics::XdsMetrics;
use crate::stream::StreamContext;

/// One pass of the ordered send discipline.
#[derive(Debug, Clone, Copy)]
struct UpdateOp {
    type_url: &'static str,
    upsert: bool,
    remove: bool,
}

/// The xDS eventual-consistency ordering.
///
/// Envoy warms listeners against the clusters and endpoints they reference,
/// so upserts flow secret -> cluster -> endpoint -> listener -> route, and
/// removals of clusters, endpoints, and secrets trail everything that might
/// still reference them. Listener and route removals ride along with their
/// upserts.
const DELTA_UPDATE_ORDER: [UpdateOp; 8] = [
    UpdateOp {
        type_url: TypeUrl::SECRET,
        upsert: true,
        remove: false,
    },
    UpdateOp {
        type_url: TypeUrl::CLUSTER,
        upsert: true,
        remove: false,
    },
    UpdateOp {
        type_url: TypeUrl::ENDPOINT,
        upsert: true,
        remove: false,
    },
    UpdateOp {
        type_url: TypeUrl::LISTENER,
        upsert: true,
        remove: true,
    },
    UpdateOp {
        type_url: TypeUrl::ROUTE,
        upsert: true,
        remove: true,
    },
    UpdateOp {
        type_url: TypeUrl::CLUSTER,
        upsert: false,
        remove: true,
    },
    UpdateOp {
        type_url: TypeUrl::ENDPOINT,
        upsert: false,
        remove: true,
    },
    UpdateOp {
        type_url: TypeUrl::SECRET,
        upsert: false,
        remove: true,
    },
];

/// The five per-type state machines of one stream.
///
/// Held as named fields so parent and child can be borrowed disjointly;
/// Envoy's parent->child invalidation needs both at once.
#[derive(Debug)]
struct DeltaTypes {
    listeners: DeltaType,
    routes: DeltaType,
    clusters: DeltaType,
    endpoints: DeltaType,
    secrets: DeltaType,
}

impl DeltaTypes {
    fn new(stream: &ResponseSender, legacy_child_resend: bool) -> Self {
        let make = |url: &'static str, allow_empty: bool| {
            DeltaType::new(
                TypeUrl::new(url),
                stream.clone(),
                allow_empty,
                legacy_child_resend,
            )
        };
        Self {
            listeners: make(TypeUrl::LISTENER, false),
            routes: make(TypeUrl::ROUTE, false),
            clusters: make(TypeUrl::CLUSTER, false),
            // A cluster with zero endpoints still needs an explicit empty
            // load assignment, or Envoy hangs waiting on EDS.
            endpoints: make(TypeUrl::ENDPOINT, true),
            secrets: make(TypeUrl::SECRET, false),
        }
    }

    /// The machine for `type_url` plus, for parent types, its child machine
    /// as a second disjoint borrow.
    fn pair_mut(&mut self, type_url: &str) -> Option<(&mut DeltaType, Option<&mut DeltaType>)> {
        let Self {
            listeners,
            routes,
            clusters,
            endpoints,
            secrets,
        } = self;
        if type_url == TypeUrl::LISTENER {
            Some((listeners, Some(routes)))
        } else if type_url == TypeUrl::ROUTE {
            Some((routes, None))
        } else if type_url == TypeUrl::CLUSTER {
            Some((clusters, Some(endpoints)))
        } else if type_url == TypeUrl::ENDPOINT {
            Some((endpoints, None))
        } else if type_url == TypeUrl::SECRET {
            Some((secrets, None))
        } else {
            None
        }
    }
}

/// Per-stream coordinator for the delta protocol.
///
/// All session state lives on the stream's select-loop task; there is no
/// locking because nothing else ever touches it.
pub struct DeltaSession {
    ctx: StreamContext,
    types: DeltaTypes,
    generators: Arc<GeneratorSet>,
    extensions: Vec<Arc<dyn Extension>>,
    metrics: XdsMetrics,
    node: Option<Node>,
    features: ProxyFeatures,
    /// True once an initial snapshot has been installed.
    ready: bool,
    index: ResourceIndex,
    current_versions: VersionMap,
    /// Stream-wide response counter; rendered as a zero-padded 8-hex-digit
    /// nonce.
    nonce: u64,
}

impl DeltaSession {
    /// Create the session for one stream.
    pub fn new(
        ctx: StreamContext,
        stream: ResponseSender,
        generators: Arc<GeneratorSet>,
        extensions: Vec<Arc<dyn Extension>>,
        metrics: XdsMetrics,
        legacy_child_resend: bool,
    ) -> Self {
        Self {
            ctx,
            types: DeltaTypes::new(&stream, legacy_child_resend),
            generators,
            extensions,
            metrics,
            node: None,
            features: ProxyFeatures::default(),
            ready: false,
            index: ResourceIndex::new(),
            current_versions: VersionMap::new(),
            nonce: 0,
        }
    }

    /// This stream's context.
    #[must_use]
    pub fn context(&self) -> &StreamContext {
        &self.ctx
    }

    /// The node the proxy announced, once seen.
    #[must_use]
    pub fn node(&self) -> Option<&Node> {
        self.node.as_ref()
    }

    /// Whether an initial snapshot has been installed.
    #[must_use]
    pub fn ready(&self) -> bool {
        self.ready
    }

    /// Route an inbound request to its type's state machine.
    ///
    /// Returns whether the caller should run a send pulse. A NACK suppresses
    /// the pulse: regenerating from the same snapshot would only re-propose
    /// the operations the proxy just rejected.
    pub fn accept_discovery_request(&mut self, req: &DeltaDiscoveryRequest) -> XdsResult<bool> {
        self.ctx.record_request();

        if req.type_url.is_empty() {
            return Err(XdsError::InvalidTypeUrl {
                type_url: String::new(),
                reason: "type URL is required for ADS".to_string(),
            });
        }

        if self.node.is_none() {
            if let Some(node) = &req.node {
                self.features = ProxyFeatures::from_node(node)?;
                self.ctx.set_node_id(node.id.clone());
                self.node = Some(node.clone());
                trace!(stream = %self.ctx.id(), node_id = %node.id, "node identified");
            }
        }

        let Some((delta_type, child)) = self.types.pair_mut(&req.type_url) else {
            // Per-request protocol error: log and carry on.
            warn!(stream = %self.ctx.id(), type_url = %req.type_url,
                "ignoring delta discovery request for unknown type URL");
            return Ok(false);
        };

        match delta_type.recv(req, child) {
            DeltaRecv::NewSubscription => {
                trace!(stream = %self.ctx.id(), type_url = %req.type_url,
                    "subscribing to type");
                Ok(true)
            }
            DeltaRecv::Ack => {
                if !req.response_nonce.is_empty() {
                    self.metrics.record_ack(&req.type_url);
                }
                Ok(true)
            }
            DeltaRecv::Nack => {
                self.metrics.record_nack(&req.type_url);
                Ok(false)
            }
        }
    }

    /// Install a freshly generated view of the proxy's desired state.
    ///
    /// Generation and required-extension failures propagate and end the
    /// stream. Indexing failures (hashing, listener decode) only spoil this
    /// snapshot: the previous index stays installed and the next snapshot
    /// retries.
    pub fn install_snapshot(&mut self, snapshot: Arc<dyn ProxySnapshot>) -> XdsResult<()> {
        let index = self.generators.generate(snapshot.as_ref(), &self.features)?;

        let ext_ctx = ExtensionContext {
            node: self.node.as_ref(),
            features: &self.features,
        };
        let mut index = apply_extensions(
            &self.extensions,
            index,
            snapshot.as_ref(),
            &ext_ctx,
        )?;

        let indexed = index
            .populate_child_index()
            .and_then(|()| index.compute_versions());
        match indexed {
            Ok(versions) => {
                trace!(stream = %self.ctx.id(), resources = index.len(),
                    "installed new proxy snapshot");
                self.index = index;
                self.current_versions = versions;
                self.ready = true;
                Ok(())
            }
            Err(err) => {
                // The previous snapshot keeps serving; the next one retries.
                error!(stream = %self.ctx.id(), error = %err,
                    "failed to index proxy snapshot; keeping previous state");
                Ok(())
            }
        }
    }

    /// Run one pulse of the ordered send discipline.
    ///
    /// Each pass is opportunistic: a type with an un-ACKed response in
    /// flight skips its turn and is retried on the next pulse, when the
    /// proxy has caught up.
    pub async fn update_proxy_if_necessary(&mut self) -> XdsResult<()> {
        if !self.ready {
            return Ok(());
        }

        for op in DELTA_UPDATE_ORDER {
            let versions = self.current_versions.get(op.type_url);
            let Some((delta_type, child)) = self.types.pair_mut(op.type_url) else {
                continue;
            };
            let sent = delta_type
                .send_if_new(
                    versions,
                    &self.index,
                    &mut self.nonce,
                    op.upsert,
                    op.remove,
                    child,
                )
                .await?;
            if sent {
                self.ctx.record_response();
                self.metrics.record_response(op.type_url);
            }
        }
        Ok(())
    }
}
