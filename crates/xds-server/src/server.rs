//! The delta xDS server and its active-stream registry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Notify;
use tracing::debug;

use xds_core::{XdsError, XdsResult};
use xds_snapshot::{GeneratorSet, ProxyWatcher};
use xds_types::envoy::service::discovery::v3::aggregated_discovery_service_server::AggregatedDiscoveryServiceServer;

use crate::auth::Authenticator;
use crate::config::ServerConfig;
use crate::extensions::Extension;
use crate::metrics::XdsMetrics;
use crate::stream::StreamId;

/// Registry of the streams currently open on this server.
///
/// The atomic counter is the only process-wide mutable state the protocol
/// core keeps. Each stream also parks a drain signal here so higher-level
/// load balancing can ask individual streams (or all of them) to reconnect
/// elsewhere.
#[derive(Debug, Default)]
pub struct ActiveStreams {
    count: AtomicU64,
    drains: DashMap<StreamId, Arc<Notify>>,
}

impl ActiveStreams {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of currently active streams.
    pub fn active(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Register a stream, returning a guard that deregisters on drop.
    pub(crate) fn register(self: &Arc<Self>, id: StreamId) -> StreamGuard {
        self.count.fetch_add(1, Ordering::Relaxed);
        let drain = Arc::new(Notify::new());
        self.drains.insert(id, Arc::clone(&drain));
        StreamGuard {
            registry: Arc::clone(self),
            id,
            drain,
        }
    }

    /// Ask one stream to disconnect so its proxy rebalances elsewhere.
    ///
    /// Returns false when the stream is no longer active.
    pub fn drain(&self, id: StreamId) -> bool {
        match self.drains.get(&id) {
            Some(drain) => {
                debug!(stream = %id, "requesting stream drain");
                drain.notify_one();
                true
            }
            None => false,
        }
    }

    /// Ask every active stream to disconnect.
    pub fn drain_all(&self) {
        for entry in self.drains.iter() {
            entry.value().notify_one();
        }
    }

    fn release(&self, id: StreamId) {
        self.count.fetch_sub(1, Ordering::Relaxed);
        self.drains.remove(&id);
    }
}

/// Guard for one registered stream; deregisters on drop.
#[derive(Debug)]
pub(crate) struct StreamGuard {
    registry: Arc<ActiveStreams>,
    id: StreamId,
    drain: Arc<Notify>,
}

impl StreamGuard {
    /// The drain signal load balancing can fire for this stream.
    pub(crate) fn drain_signal(&self) -> Arc<Notify> {
        Arc::clone(&self.drain)
    }
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.registry.release(self.id);
    }
}

/// The delta xDS control-plane server.
///
/// Implements `AggregatedDiscoveryService` over the incremental protocol:
/// each accepted stream gets its own session task owning all per-stream
/// state, fed by an external watcher and generator set. Cloning is cheap;
/// clones share the stream registry and collaborators.
#[derive(Clone)]
pub struct DeltaServer {
    pub(crate) authenticator: Arc<dyn Authenticator>,
    pub(crate) watcher: Arc<dyn ProxyWatcher>,
    pub(crate) generators: Arc<GeneratorSet>,
    pub(crate) extensions: Vec<Arc<dyn Extension>>,
    pub(crate) config: ServerConfig,
    pub(crate) active_streams: Arc<ActiveStreams>,
    pub(crate) metrics: XdsMetrics,
}

impl DeltaServer {
    /// Create a builder for configuring the server.
    pub fn builder() -> DeltaServerBuilder {
        DeltaServerBuilder::default()
    }

    /// The server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// The stream registry, for load-shedding integration.
    #[must_use]
    pub fn active_streams(&self) -> &Arc<ActiveStreams> {
        &self.active_streams
    }

    /// The metrics instance.
    #[must_use]
    pub fn metrics(&self) -> &XdsMetrics {
        &self.metrics
    }

    /// Convert into a tonic service for `Server::add_service`.
    pub fn into_service(self) -> AggregatedDiscoveryServiceServer<Self> {
        AggregatedDiscoveryServiceServer::new(self)
    }
}

impl std::fmt::Debug for DeltaServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeltaServer")
            .field("config", &self.config)
            .field("active_streams", &self.active_streams.active())
            .finish_non_exhaustive()
    }
}

/// Builder for [`DeltaServer`].
///
/// # Example
///
/// ```rust,ignore
/// let server = DeltaServer::builder()
///     .authenticator(auth)
///     .watcher(watcher)
///     .generators(generators)
///     .build()?;
///
/// tonic::transport::Server::builder()
///     .add_service(server.into_service())
///     .serve(addr)
///     .await?;
/// ```
#[derive(Default)]
pub struct DeltaServerBuilder {
    authenticator: Option<Arc<dyn Authenticator>>,
    watcher: Option<Arc<dyn ProxyWatcher>>,
    generators: Option<Arc<GeneratorSet>>,
    extensions: Vec<Arc<dyn Extension>>,
    config: Option<ServerConfig>,
}

impl DeltaServerBuilder {
    /// Set the authenticator. Required.
    pub fn authenticator(mut self, authenticator: Arc<dyn Authenticator>) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    /// Set the proxy watcher. Required.
    pub fn watcher(mut self, watcher: Arc<dyn ProxyWatcher>) -> Self {
        self.watcher = Some(watcher);
        self
    }

    /// Set the resource generators. Required.
    pub fn generators(mut self, generators: Arc<GeneratorSet>) -> Self {
        self.generators = Some(generators);
        self
    }

    /// Append an extension to the chain.
    pub fn extension(mut self, extension: Arc<dyn Extension>) -> Self {
        self.extensions.push(extension);
        self
    }

    /// Override the server configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the server.
    ///
    /// # Errors
    ///
    /// Returns an error when a required collaborator is missing.
    pub fn build(self) -> XdsResult<DeltaServer> {
        let authenticator = self
            .authenticator
            .ok_or_else(|| XdsError::Configuration("authenticator is required".into()))?;
        let watcher = self
            .watcher
            .ok_or_else(|| XdsError::Configuration("watcher is required".into()))?;
        let generators = self
            .generators
            .ok_or_else(|| XdsError::Configuration("generators are required".into()))?;

        Ok(DeltaServer {
            authenticator,
            watcher,
            generators,
            extensions: self.extensions,
            config: self.config.unwrap_or_default(),
            active_streams: Arc::new(ActiveStreams::new()),
            metrics: XdsMetrics::new(),
        })
    }
}
