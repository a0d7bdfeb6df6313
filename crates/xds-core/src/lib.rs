//! # xds-core
//!
//! Core types and error handling for the ferromesh delta xDS control plane.
//!
//! This crate provides the foundational types used across the other xds
//! crates:
//!
//! - [`XdsError`] - Error type with proper gRPC status code mapping
//! - [`ResourceVersion`] - Per-resource version tracking for the delta protocol
//! - [`TypeUrl`] - Type URL handling, constants, and parent/child edges
//!
//! ## Example
//!
//! ```rust
//! use xds_core::{ResourceVersion, TypeUrl};
//!
//! let clusters = TypeUrl::new(TypeUrl::CLUSTER);
//! assert_eq!(clusters.short_name(), "Cluster");
//! assert_eq!(clusters.child_type(), Some(TypeUrl::ENDPOINT));
//!
//! // An empty version marks a resource the proxy tracks but must be re-sent.
//! let version = ResourceVersion::empty();
//! assert!(version.is_empty());
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod type_url;
mod version;

pub use error::XdsError;
pub use type_url::TypeUrl;
pub use version::ResourceVersion;

/// Result type alias using [`XdsError`].
pub type Result<T> = std::result::Result<T, XdsError>;

/// Alias for [`Result`] used throughout the workspace.
pub type XdsResult<T> = Result<T>;
