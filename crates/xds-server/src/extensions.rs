//! Pluggable post-processing of generated resources.
//!
//! Extensions transform the resource index after generation and before
//! indexing. They only understand the legacy config snapshot; proxy-state
//! snapshots pass through untouched. Each extension runs on a deep copy
//! behind a panic barrier, so a misbehaving extension can neither corrupt
//! the index nor take the stream down unless it is marked required.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

use tracing::{error, warn};

use xds_core::{XdsError, XdsResult};
use xds_snapshot::{ProxyFeatures, ProxySnapshot, ResourceIndex, SnapshotKind};
use xds_types::envoy::config::core::v3::Node;

/// Context handed to every extension invocation.
#[derive(Debug, Clone, Copy)]
pub struct ExtensionContext<'a> {
    /// The node the proxy announced, when known.
    pub node: Option<&'a Node>,
    /// The proxy's detected capabilities.
    pub features: &'a ProxyFeatures,
}

/// A user-pluggable transformation of the resource index.
pub trait Extension: Send + Sync {
    /// Name used in logs and error messages.
    fn name(&self) -> &str;

    /// Required extensions abort the stream on failure; optional ones log
    /// and leave the index unmodified.
    fn required(&self) -> bool {
        false
    }

    /// Whether this extension applies in the given context, e.g. gated on
    /// the proxy version.
    fn can_apply(&self, ctx: &ExtensionContext<'_>) -> bool {
        let _ = ctx;
        true
    }

    /// Transform the index, returning the replacement.
    fn extend(&self, index: ResourceIndex, ctx: &ExtensionContext<'_>) -> XdsResult<ResourceIndex>;
}

/// Run the extension chain over `index`.
///
/// Returns the transformed index, or the original wherever a non-required
/// extension failed. A required extension's failure propagates and ends the
/// stream as `InvalidArgument`.
pub(crate) fn apply_extensions(
    extensions: &[Arc<dyn Extension>],
    mut index: ResourceIndex,
    snapshot: &dyn ProxySnapshot,
    ctx: &ExtensionContext<'_>,
) -> XdsResult<ResourceIndex> {
    if snapshot.kind() != SnapshotKind::Config {
        // Extensions only understand the legacy config snapshot.
        return Ok(index);
    }

    for ext in extensions {
        match apply_one(ext.as_ref(), &index, ctx) {
            Ok(Some(extended)) => index = extended,
            Ok(None) => {}
            Err(err) if ext.required() => {
                error!(extension = ext.name(), error = %err, "required extension failed");
                return Err(XdsError::Extension {
                    name: ext.name().to_string(),
                    required: true,
                    message: err.to_string(),
                });
            }
            Err(err) => {
                warn!(extension = ext.name(), error = %err,
                    "extension failed; continuing with unmodified resources");
            }
        }
    }
    Ok(index)
}

/// Apply one extension to a copy of the index.
///
/// The copy guards against partial mutation: if the extension fails midway
/// (or panics), the caller keeps the untouched original.
fn apply_one(
    ext: &dyn Extension,
    index: &ResourceIndex,
    ctx: &ExtensionContext<'_>,
) -> XdsResult<Option<ResourceIndex>> {
    if !ext.can_apply(ctx) {
        return Ok(None);
    }

    let scratch = index.clone();
    match catch_unwind(AssertUnwindSafe(|| ext.extend(scratch, ctx))) {
        Ok(Ok(extended)) => Ok(Some(extended)),
        Ok(Err(err)) => Err(err),
        Err(_) => Err(XdsError::Internal {
            message: format!("extension {:?} panicked", ext.name()),
            source: None,
        }),
    }
}
