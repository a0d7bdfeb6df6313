//! Proxy capability detection from the Envoy node.
//!
//! The first request on a stream carries the proxy's identity and version.
//! The version feeds resource generation and extension gating; a proxy that
//! reports a malformed version is rejected up-front rather than sent
//! configuration it may not understand.

use std::fmt;

use xds_core::{XdsError, XdsResult};
use xds_types::envoy::config::core::v3::{node::UserAgentVersionType, Node};

/// A parsed proxy (Envoy) version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ProxyVersion {
    /// Major version.
    pub major: u64,
    /// Minor version.
    pub minor: u64,
    /// Patch version.
    pub patch: u64,
}

impl ProxyVersion {
    /// Parse a `major.minor.patch` version string.
    ///
    /// Build metadata after a `-` or `+` separator is ignored, matching the
    /// free-form versions Envoy reports in `user_agent_version`.
    pub fn parse(version: &str) -> XdsResult<Self> {
        let core = version
            .split(['-', '+'])
            .next()
            .unwrap_or(version);
        let mut parts = core.split('.');

        let mut next_part = |what: &str| -> XdsResult<u64> {
            parts
                .next()
                .ok_or_else(|| XdsError::VersionParse {
                    version: version.to_string(),
                    reason: format!("missing {what} component"),
                })?
                .parse()
                .map_err(|_| XdsError::VersionParse {
                    version: version.to_string(),
                    reason: format!("non-numeric {what} component"),
                })
        };

        let major = next_part("major")?;
        let minor = next_part("minor")?;
        let patch = next_part("patch")?;
        Ok(Self {
            major,
            minor,
            patch,
        })
    }
}

impl fmt::Display for ProxyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Capabilities and identity details extracted from a proxy's [`Node`].
///
/// Built once from the first request of a stream and held immutable for the
/// stream's lifetime.
#[derive(Debug, Clone, Default)]
pub struct ProxyFeatures {
    proxy_version: Option<ProxyVersion>,
}

impl ProxyFeatures {
    /// Extract features from the node the proxy announced.
    ///
    /// A missing version is tolerated (test clients often omit it); a
    /// present but malformed one is an [`XdsError::VersionParse`].
    pub fn from_node(node: &Node) -> XdsResult<Self> {
        let proxy_version = match &node.user_agent_version_type {
            Some(UserAgentVersionType::UserAgentVersion(v)) if !v.is_empty() => {
                Some(ProxyVersion::parse(v)?)
            }
            Some(UserAgentVersionType::UserAgentBuildVersion(build)) => {
                build.version.map(|v| ProxyVersion {
                    major: u64::from(v.major_number),
                    minor: u64::from(v.minor_number),
                    patch: u64::from(v.patch),
                })
            }
            _ => None,
        };
        Ok(Self { proxy_version })
    }

    /// The proxy's reported version, if it announced one.
    #[must_use]
    pub fn proxy_version(&self) -> Option<ProxyVersion> {
        self.proxy_version
    }
}
