//! # xds-server
//!
//! The delta (incremental) xDS server for the ferromesh control plane.
//!
//! This crate implements the server side of Envoy's delta xDS protocol over
//! long-lived bidirectional gRPC streams:
//!
//! - [`DeltaServer`] - accepts streams, tracks them, and load-sheds
//! - [`DeltaSession`] - per-stream coordinator driving the xDS
//!   eventual-consistency send order
//! - [`DeltaType`] - per-(stream, type) state machine: subscriptions,
//!   acknowledged versions, pending updates, diffing
//! - [`Authenticator`] / [`Extension`] - pluggable seams for stream auth
//!   and resource post-processing
//!
//! Desired state arrives from an external `ProxyWatcher`; nothing survives
//! a stream reconnect on the server side. A reconnecting proxy re-declares
//! its state through `initial_resource_versions`, and the session rebuilds
//! its bookkeeping from that.
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use xds_server::{AllowAllAuthenticator, DeltaServer};
//!
//! let server = DeltaServer::builder()
//!     .authenticator(Arc::new(AllowAllAuthenticator))
//!     .watcher(watcher)
//!     .generators(generators)
//!     .build()?;
//!
//! tonic::transport::Server::builder()
//!     .add_service(server.into_service())
//!     .serve("[::]:15010".parse()?)
//!     .await?;
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod auth;
mod config;
mod delta;
mod extensions;
mod metrics;
mod server;
mod service;
mod session;
mod stream;

#[cfg(test)]
mod protocol_tests;

pub use auth::{AllowAllAuthenticator, Authenticator, Identity};
pub use config::{legacy_child_resend_from_env, ServerConfig, LEGACY_CHILD_RESEND_ENV};
pub use delta::{DeltaRecv, DeltaType, PendingUpdate, ResponseSender};
pub use extensions::{Extension, ExtensionContext};
pub use metrics::XdsMetrics;
pub use server::{ActiveStreams, DeltaServer, DeltaServerBuilder};
pub use service::{DeltaResponseStream, SotwResponseStream};
pub use session::DeltaSession;
pub use stream::{StreamContext, StreamId};
