//! # xds-snapshot
//!
//! Per-proxy resource indexing and the collaborator seams the delta protocol
//! core consumes.
//!
//! The delta protocol never interprets resource payloads beyond two needs:
//! hashing them into per-resource versions and extracting the route
//! configuration names a listener references. Everything else about a
//! proxy's desired state stays behind three seams:
//!
//! - [`ProxySnapshot`] - an opaque desired-state snapshot, tagged by
//!   [`SnapshotKind`] so the matching generator can be dispatched
//! - [`ResourceGenerator`] / [`GeneratorSet`] - turns a snapshot into a
//!   [`ResourceIndex`]
//! - [`ProxyWatcher`] - emits snapshots for a proxy as its desired config
//!   changes

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod features;
mod index;
mod snapshot;
mod watch;

pub use features::{ProxyFeatures, ProxyVersion};
pub use index::{hash_resource, ResourceIndex, VersionMap};
pub use snapshot::{GeneratorSet, ProxySnapshot, ResourceGenerator, SnapshotKind};
pub use watch::{ProxyWatcher, SnapshotReceiver};
