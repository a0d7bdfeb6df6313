//! Resource version tracking for the delta protocol.
//!
//! This module provides [`ResourceVersion`], a type for tracking the
//! per-resource versions the proxy has acknowledged. Versions are opaque
//! hashes; the only structure the protocol relies on is emptiness.

use std::fmt;

/// Version identifier for xDS resources.
///
/// `ResourceVersion` wraps an opaque version string. An empty version has a
/// specific meaning in the delta bookkeeping: the proxy is assumed to track
/// the resource but no longer hold valid data for it, so the next diff must
/// re-send it regardless of whether the content changed.
///
/// # Example
///
/// ```rust
/// use xds_core::ResourceVersion;
///
/// let v1 = ResourceVersion::new("a6c4f2");
/// let forgotten = ResourceVersion::empty();
///
/// assert!(!v1.is_empty());
/// assert!(forgotten.is_empty());
/// assert_ne!(v1, forgotten);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ResourceVersion(String);

impl ResourceVersion {
    /// Create a new resource version from a string.
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self(version.into())
    }

    /// Create an empty resource version.
    #[must_use]
    pub fn empty() -> Self {
        Self(String::new())
    }

    /// Check if the version is empty (resource must be re-sent).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the version as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Clear the version in place, forcing the next diff to re-send.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Consume and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ResourceVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ResourceVersion {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ResourceVersion {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<ResourceVersion> for String {
    fn from(v: ResourceVersion) -> Self {
        v.0
    }
}

impl AsRef<str> for ResourceVersion {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for ResourceVersion {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}
