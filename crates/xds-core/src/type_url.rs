//! Type URL handling for xDS resources.
//!
//! This module provides type URL constants for the resource categories the
//! delta protocol core recognizes, plus the parent/child edges between them.

use std::fmt;

/// Type URL wrapper for xDS resource types.
///
/// Type URLs identify the protobuf message type of xDS resources. This type
/// provides validation, comparison, and the parent/child relationships the
/// delta protocol must preserve when resending resources.
///
/// # Example
///
/// ```rust
/// use xds_core::TypeUrl;
///
/// let cluster_type = TypeUrl::new(TypeUrl::CLUSTER);
/// assert_eq!(cluster_type.short_name(), "Cluster");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TypeUrl(String);

impl TypeUrl {
    /// Type URL for Cluster (CDS).
    pub const CLUSTER: &'static str = "type.googleapis.com/envoy.config.cluster.v3.Cluster";

    /// Type URL for ClusterLoadAssignment (EDS).
    pub const ENDPOINT: &'static str =
        "type.googleapis.com/envoy.config.endpoint.v3.ClusterLoadAssignment";

    /// Type URL for Listener (LDS).
    pub const LISTENER: &'static str = "type.googleapis.com/envoy.config.listener.v3.Listener";

    /// Type URL for RouteConfiguration (RDS).
    pub const ROUTE: &'static str =
        "type.googleapis.com/envoy.config.route.v3.RouteConfiguration";

    /// Type URL for Secret (SDS).
    pub const SECRET: &'static str =
        "type.googleapis.com/envoy.extensions.transport_sockets.tls.v3.Secret";

    /// The type URLs served over the delta protocol.
    pub const RECOGNIZED: [&'static str; 5] = [
        Self::LISTENER,
        Self::ROUTE,
        Self::CLUSTER,
        Self::ENDPOINT,
        Self::SECRET,
    ];

    /// Create a new type URL from a string.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Get the type URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extract the short name from the type URL.
    ///
    /// For example, `type.googleapis.com/envoy.config.cluster.v3.Cluster`
    /// returns `Cluster`.
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.0
            .rsplit('/')
            .next()
            .and_then(|s| s.rsplit('.').next())
            .unwrap_or(&self.0)
    }

    /// Check if this is one of the recognized xDS type URLs.
    #[must_use]
    pub fn is_recognized(&self) -> bool {
        Self::RECOGNIZED.contains(&self.0.as_str())
    }

    /// The child type whose resources Envoy stores inside resources of this
    /// type, if any.
    ///
    /// Endpoints live inside their cluster and routes inside the listener
    /// that references them. An update to the parent means Envoy may have
    /// dropped its data for the children, so the server has to resend them.
    #[must_use]
    pub fn child_type(&self) -> Option<&'static str> {
        match self.0.as_str() {
            url if url == Self::CLUSTER => Some(Self::ENDPOINT),
            url if url == Self::LISTENER => Some(Self::ROUTE),
            _ => None,
        }
    }

    /// Consume and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for TypeUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TypeUrl {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TypeUrl {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<TypeUrl> for String {
    fn from(t: TypeUrl) -> Self {
        t.0
    }
}

impl AsRef<str> for TypeUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl PartialEq<str> for TypeUrl {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for TypeUrl {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_url_creation() {
        let t = TypeUrl::new(TypeUrl::CLUSTER);
        assert_eq!(t.as_str(), TypeUrl::CLUSTER);
    }

    #[test]
    fn test_short_name() {
        let t = TypeUrl::new(TypeUrl::CLUSTER);
        assert_eq!(t.short_name(), "Cluster");

        let t = TypeUrl::new(TypeUrl::ENDPOINT);
        assert_eq!(t.short_name(), "ClusterLoadAssignment");
    }

    #[test]
    fn test_is_recognized() {
        for url in TypeUrl::RECOGNIZED {
            assert!(TypeUrl::new(url).is_recognized());
        }
        assert!(!TypeUrl::new("type.googleapis.com/some.other.Type").is_recognized());
    }

    #[test]
    fn test_child_edges() {
        assert_eq!(
            TypeUrl::new(TypeUrl::CLUSTER).child_type(),
            Some(TypeUrl::ENDPOINT)
        );
        assert_eq!(
            TypeUrl::new(TypeUrl::LISTENER).child_type(),
            Some(TypeUrl::ROUTE)
        );
        assert_eq!(TypeUrl::new(TypeUrl::ENDPOINT).child_type(), None);
        assert_eq!(TypeUrl::new(TypeUrl::ROUTE).child_type(), None);
        assert_eq!(TypeUrl::new(TypeUrl::SECRET).child_type(), None);
    }

    #[test]
    fn test_from_string() {
        let t: TypeUrl = TypeUrl::CLUSTER.into();
        assert_eq!(t.as_str(), TypeUrl::CLUSTER);
    }
}
