//! Opaque proxy snapshots and the generators that interpret them.
//!
//! Desired state for a proxy arrives in one of two shapes: the legacy
//! per-service config snapshot, or the newer proxy-state template. The
//! protocol core treats both as opaque; it only dispatches the matching
//! generator by kind and consumes the resulting [`ResourceIndex`].

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use xds_core::XdsResult;

use crate::{ProxyFeatures, ResourceIndex};

/// The two shapes a proxy snapshot can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    /// Legacy per-service config snapshot.
    Config,
    /// Newer proxy-state template.
    ProxyState,
}

impl fmt::Display for SnapshotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config => write!(f, "config"),
            Self::ProxyState => write!(f, "proxy-state"),
        }
    }
}

/// Desired-state snapshot for one proxy.
///
/// The payload is opaque to the protocol core; the generator registered for
/// the snapshot's [`SnapshotKind`] recovers its concrete input through
/// [`as_any`](ProxySnapshot::as_any).
pub trait ProxySnapshot: Send + Sync + fmt::Debug {
    /// Which generator understands this snapshot.
    fn kind(&self) -> SnapshotKind;

    /// Downcast hook for the matching generator.
    fn as_any(&self) -> &dyn Any;
}

/// Turns a proxy snapshot into the indexed Envoy resources to serve.
///
/// A generator downcasts the snapshot to its concrete input; a payload of
/// the wrong concrete type is an `XdsError::InvalidSnapshot`, which
/// terminates the stream as `InvalidArgument`.
pub trait ResourceGenerator: Send + Sync {
    /// Generate all resources for the proxy described by `snapshot`.
    fn generate(
        &self,
        snapshot: &dyn ProxySnapshot,
        features: &ProxyFeatures,
    ) -> XdsResult<ResourceIndex>;
}

/// One generator per snapshot kind.
#[derive(Clone)]
pub struct GeneratorSet {
    config: Arc<dyn ResourceGenerator>,
    proxy_state: Arc<dyn ResourceGenerator>,
}

impl GeneratorSet {
    /// Create a generator set from the two per-kind generators.
    pub fn new(
        config: Arc<dyn ResourceGenerator>,
        proxy_state: Arc<dyn ResourceGenerator>,
    ) -> Self {
        Self {
            config,
            proxy_state,
        }
    }

    /// Create a generator set that serves both kinds with one generator.
    pub fn uniform(generator: Arc<dyn ResourceGenerator>) -> Self {
        Self {
            config: Arc::clone(&generator),
            proxy_state: generator,
        }
    }

    /// Dispatch to the generator matching the snapshot's kind.
    pub fn generate(
        &self,
        snapshot: &dyn ProxySnapshot,
        features: &ProxyFeatures,
    ) -> XdsResult<ResourceIndex> {
        trace!(kind = %snapshot.kind(), "generating resources from proxy snapshot");
        match snapshot.kind() {
            SnapshotKind::Config => self.config.generate(snapshot, features),
            SnapshotKind::ProxyState => self.proxy_state.generate(snapshot, features),
        }
    }
}

impl fmt::Debug for GeneratorSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratorSet").finish_non_exhaustive()
    }
}
