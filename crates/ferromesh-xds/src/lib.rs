//! # ferromesh-xds
//!
//! Delta xDS control plane for pushing Envoy configuration (clusters,
//! endpoints, listeners, routes, secrets) to large fleets of sidecar
//! proxies over long-lived bidirectional gRPC streams.
//!
//! The server speaks the **incremental** (delta) variant of the xDS v3
//! protocol: every response carries only changed resources plus explicit
//! removals, each stream tracks per-resource acknowledged versions, and
//! updates follow Envoy's eventual-consistency ordering so traffic never
//! flows through a listener whose clusters and endpoints are missing.
//!
//! ## Architecture
//!
//! The implementation is organized into several crates:
//!
//! - `xds-core` - type URLs, resource versions, error handling
//! - `xds-types` - Envoy xDS wire types and the ADS gRPC service
//! - `xds-snapshot` - per-proxy resource indexing, hashing, and the
//!   watcher/generator seams
//! - `xds-server` - the delta state machines, per-stream sessions, and the
//!   gRPC server
//!
//! This crate re-exports the public APIs for convenience.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use ferromesh_xds::prelude::*;
//!
//! let server = DeltaServer::builder()
//!     .authenticator(Arc::new(AllowAllAuthenticator))
//!     .watcher(my_watcher)
//!     .generators(Arc::new(GeneratorSet::new(config_gen, proxy_state_gen)))
//!     .build()?;
//!
//! tonic::transport::Server::builder()
//!     .add_service(server.into_service())
//!     .serve("[::]:15010".parse()?)
//!     .await?;
//! ```
//!
//! Desired state enters through the `ProxyWatcher` seam; the protocol core
//! keeps no state across stream reconnects. A reconnecting proxy declares
//! the resources it already holds in `initial_resource_versions`, and the
//! server rebuilds its bookkeeping from that.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub use xds_core::{ResourceVersion, TypeUrl, XdsError, XdsResult};
pub use xds_server::{
    ActiveStreams, AllowAllAuthenticator, Authenticator, DeltaServer, DeltaServerBuilder,
    Extension, ExtensionContext, Identity, ServerConfig, StreamId, XdsMetrics,
};
pub use xds_snapshot::{
    GeneratorSet, ProxyFeatures, ProxySnapshot, ProxyVersion, ProxyWatcher, ResourceGenerator,
    ResourceIndex, SnapshotKind, SnapshotReceiver,
};

/// The Envoy wire types, for implementing generators and watchers.
pub mod types {
    pub use xds_types::envoy;
    pub use xds_types::google;
    pub use xds_types::{Any, Message};
}

/// Commonly used items, importable in one line.
pub mod prelude {
    pub use xds_core::{ResourceVersion, TypeUrl, XdsError, XdsResult};
    pub use xds_server::{
        AllowAllAuthenticator, Authenticator, DeltaServer, Extension, Identity, ServerConfig,
    };
    pub use xds_snapshot::{
        GeneratorSet, ProxySnapshot, ProxyWatcher, ResourceGenerator, ResourceIndex, SnapshotKind,
    };
}
