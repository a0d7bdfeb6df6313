//! The authentication seam for delta streams.

use async_trait::async_trait;
use tonic::metadata::MetadataMap;

use xds_core::XdsResult;

/// The authenticated identity behind one stream.
///
/// Opaque to the protocol core; only the [`Authenticator`] interprets it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    subject: String,
}

impl Identity {
    /// Create an identity for `subject`.
    #[must_use]
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
        }
    }

    /// The identity's subject name.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

/// Authenticates new streams and re-authorizes established ones.
///
/// [`authenticate`](Authenticator::authenticate) runs once when a stream is
/// accepted. [`check_stream_acls`](Authenticator::check_stream_acls) runs on
/// every request/response pulse and again on a periodic timer, so a
/// credential revoked mid-stream tears the stream down within one auth-check
/// period even if the proxy stays silent.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Authenticate a new stream from its request metadata.
    async fn authenticate(&self, metadata: &MetadataMap) -> XdsResult<Identity>;

    /// Verify the identity is still allowed to hold this stream open.
    fn check_stream_acls(&self, identity: &Identity) -> XdsResult<()>;
}

/// An authenticator that admits every stream.
///
/// Useful for tests and for deployments that terminate authentication in
/// front of the control plane.
#[derive(Debug, Clone, Default)]
pub struct AllowAllAuthenticator;

#[async_trait]
impl Authenticator for AllowAllAuthenticator {
    async fn authenticate(&self, _metadata: &MetadataMap) -> XdsResult<Identity> {
        Ok(Identity::new("anonymous"))
    }

    fn check_stream_acls(&self, _identity: &Identity) -> XdsResult<()> {
        Ok(())
    }
}
