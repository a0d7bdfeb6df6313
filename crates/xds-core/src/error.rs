//! Error types for xDS operations.
//!
//! This module provides [`XdsError`], the error type shared by the delta
//! protocol core, with conversions to the gRPC status codes the stream loop
//! terminates with.

/// Error type for xDS operations.
///
/// The variants fall into three propagation classes:
///
/// - **stream-fatal**: auth failures, transport failures, load-shed drain,
///   snapshot channel closure, required-extension failures. These propagate
///   out of the stream loop and become the stream's terminal status.
/// - **snapshot-local**: hashing / decoding failures while indexing a new
///   snapshot. The session logs them, keeps the previous snapshot, and
///   retries when the next one arrives.
/// - **per-request**: unknown type URLs and similar protocol slips, logged
///   without ending the stream.
///
/// # Example
///
/// ```rust
/// use xds_core::XdsError;
///
/// let err = XdsError::Overwhelmed;
/// let status: tonic::Status = err.into();
/// assert_eq!(status.code(), tonic::Code::ResourceExhausted);
/// ```
#[derive(Debug, thiserror::Error)]
pub enum XdsError {
    /// The server is load-shedding and asked this stream to reconnect
    /// elsewhere.
    #[error("this server has too many xDS streams open, please try another")]
    Overwhelmed,

    /// The snapshot channel closed without the session cancelling it, which
    /// means the upstream watcher hit an irrecoverable error.
    #[error("xDS stream terminated due to an irrecoverable error, please try again")]
    SnapshotChannelClosed,

    /// The first request of a stream did not identify the proxy.
    #[error("first request must include node information")]
    MissingNode,

    /// Malformed or missing type URL.
    #[error("invalid type URL: {type_url:?} - {reason}")]
    InvalidTypeUrl {
        /// The offending type URL.
        type_url: String,
        /// Reason why the type URL is invalid.
        reason: String,
    },

    /// The snapshot payload could not be handed to any generator.
    #[error("invalid proxy snapshot: {reason}")]
    InvalidSnapshot {
        /// Reason the snapshot was rejected.
        reason: String,
    },

    /// A proxy version string could not be parsed.
    #[error("failed to parse proxy version {version:?}: {reason}")]
    VersionParse {
        /// The unparseable version string.
        version: String,
        /// Reason parsing failed.
        reason: String,
    },

    /// A resource payload could not be hashed or encoded for the wire.
    #[error("encoding error for {type_url}/{name}: {message}")]
    Encoding {
        /// Type URL of the resource.
        type_url: String,
        /// Name of the resource.
        name: String,
        /// Error message.
        message: String,
    },

    /// A resource payload could not be decoded.
    #[error("decoding error for {type_url}: {message}")]
    Decoding {
        /// Type URL of the resource.
        type_url: String,
        /// Error message.
        message: String,
    },

    /// An extension failed while transforming the resource index.
    #[error("extension {name:?} failed: {message}")]
    Extension {
        /// Extension name.
        name: String,
        /// Whether the extension was required.
        required: bool,
        /// Error message.
        message: String,
    },

    /// The stream could not be authenticated.
    #[error("unauthenticated: {reason}")]
    Unauthenticated {
        /// Reason authentication failed.
        reason: String,
    },

    /// The authenticated identity is no longer authorized for this stream.
    #[error("permission denied: {reason}")]
    PermissionDenied {
        /// Reason authorization failed.
        reason: String,
    },

    /// The response stream is gone; the peer hung up or the transport died.
    #[error("stream closed: {reason}")]
    StreamClosed {
        /// Reason for stream closure.
        reason: String,
    },

    /// gRPC transport error.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// Optional underlying error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Invalid server configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Unexpected internal error.
    #[error("internal error: {message}")]
    Internal {
        /// Error message.
        message: String,
        /// Optional underlying error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl XdsError {
    /// Create an internal error from any error type.
    pub fn internal<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Internal {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a transport error from any error type.
    pub fn transport<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Whether this error should end the stream when it surfaces in the
    /// session loop.
    #[must_use]
    pub fn is_stream_fatal(&self) -> bool {
        !matches!(self, Self::Encoding { .. } | Self::Decoding { .. })
    }
}

/// Convert to [`tonic::Status`] for gRPC responses.
///
/// Each variant maps to the status code the delta stream terminates with.
impl From<XdsError> for tonic::Status {
    fn from(err: XdsError) -> Self {
        match &err {
            XdsError::Overwhelmed => tonic::Status::resource_exhausted(err.to_string()),
            XdsError::SnapshotChannelClosed => tonic::Status::aborted(err.to_string()),
            XdsError::MissingNode
            | XdsError::InvalidTypeUrl { .. }
            | XdsError::InvalidSnapshot { .. }
            | XdsError::VersionParse { .. }
            | XdsError::Encoding { .. }
            | XdsError::Decoding { .. }
            | XdsError::Configuration(_) => tonic::Status::invalid_argument(err.to_string()),
            XdsError::Extension { required, .. } => {
                if *required {
                    tonic::Status::invalid_argument(err.to_string())
                } else {
                    tonic::Status::internal(err.to_string())
                }
            }
            XdsError::Unauthenticated { .. } => tonic::Status::unauthenticated(err.to_string()),
            XdsError::PermissionDenied { .. } => tonic::Status::permission_denied(err.to_string()),
            XdsError::StreamClosed { .. } | XdsError::Transport { .. } => {
                tonic::Status::unavailable(err.to_string())
            }
            XdsError::Internal { .. } => tonic::Status::internal(err.to_string()),
        }
    }
}
