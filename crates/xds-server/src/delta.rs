//! Per-(stream, type) delta protocol state machines.
//!
//! Each stream owns one [`DeltaType`] per recognized type URL. A
//! `DeltaType` tracks which named resources the proxy believes it has and at
//! what version, diffs that view against the control plane's latest
//! versions, and emits minimal upsert/remove responses. All state is touched
//! only by the stream's session task; nothing here is shared.

use std::collections::{HashMap, HashSet};

use tokio::sync::mpsc;
use tonic::Status;
use tracing::{error, trace};

use xds_core::{ResourceVersion, TypeUrl, XdsError, XdsResult};
use xds_snapshot::ResourceIndex;
use xds_types::envoy::service::discovery::v3::{
    DeltaDiscoveryRequest, DeltaDiscoveryResponse, Resource,
};

/// Outcome of feeding one discovery request into a delta type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeltaRecv {
    /// The request NACKed an earlier response.
    Nack,
    /// ACK and/or subscription bookkeeping was applied.
    Ack,
    /// First request ever seen for this type on this stream.
    NewSubscription,
}

/// One un-ACKed operation, keyed under its response nonce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpdate {
    /// True when the operation removes the resource.
    pub remove: bool,
    /// Version sent with an upsert; unused for removals.
    pub version: ResourceVersion,
}

impl PendingUpdate {
    fn upsert(version: impl Into<ResourceVersion>) -> Self {
        Self {
            remove: false,
            version: version.into(),
        }
    }

    fn removal() -> Self {
        Self {
            remove: true,
            version: ResourceVersion::empty(),
        }
    }
}

/// Sender half of a stream's response channel, shared by its delta types.
#[derive(Debug, Clone)]
pub struct ResponseSender {
    tx: mpsc::Sender<Result<DeltaDiscoveryResponse, Status>>,
}

impl ResponseSender {
    /// Wrap the stream's mpsc sender.
    pub fn new(tx: mpsc::Sender<Result<DeltaDiscoveryResponse, Status>>) -> Self {
        Self { tx }
    }

    /// Send a response toward the proxy.
    ///
    /// Fails with [`XdsError::StreamClosed`] once the transport side has
    /// gone away.
    pub async fn send(&self, response: DeltaDiscoveryResponse) -> XdsResult<()> {
        self.tx
            .send(Ok(response))
            .await
            .map_err(|_| XdsError::StreamClosed {
                reason: "response channel closed".to_string(),
            })
    }
}

/// Per-(stream, type URL) delta state machine.
#[derive(Debug)]
pub struct DeltaType {
    type_url: TypeUrl,
    stream: ResponseSender,
    /// Send an explicit empty response even when no resources exist yet.
    /// Set for endpoints so a cluster with zero healthy endpoints gets an
    /// empty load assignment instead of leaving Envoy waiting forever.
    allow_empty: bool,
    legacy_child_resend: bool,
    /// True once the proxy has requested this type at least once.
    registered: bool,
    /// True when the first request carried no subscribe names; wildcard
    /// streams ignore subscribe/unsubscribe and track every name.
    wildcard: bool,
    /// True after the proxy has ACKed at least one response.
    sent_at_least_once: bool,
    /// Names the proxy is currently interested in; empty in wildcard mode.
    subscriptions: HashSet<String>,
    /// The proxy's CONFIRMED view: name -> last ACKed version. An empty
    /// version means the name is tracked but must be re-sent.
    acked_versions: HashMap<String, ResourceVersion>,
    /// In-flight responses: nonce -> name -> staged operation. Invariant: at
    /// most one entry between a send and its ACK/NACK.
    pending_updates: HashMap<String, HashMap<String, PendingUpdate>>,
    /// For parent types: parent name -> child names sent alongside it, kept
    /// so a later re-subscribe of the parent invalidates the same children.
    children_names: HashMap<String, Vec<String>>,
}

impl DeltaType {
    /// Create the state machine for `type_url` on one stream.
    pub fn new(
        type_url: TypeUrl,
        stream: ResponseSender,
        allow_empty: bool,
        legacy_child_resend: bool,
    ) -> Self {
        Self {
            type_url,
            stream,
            allow_empty,
            legacy_child_resend,
            registered: false,
            wildcard: false,
            sent_at_least_once: false,
            subscriptions: HashSet::new(),
            acked_versions: HashMap::new(),
            pending_updates: HashMap::new(),
            children_names: HashMap::new(),
        }
    }

    /// The type URL this machine serves.
    #[must_use]
    pub fn type_url(&self) -> &TypeUrl {
        &self.type_url
    }

    /// Whether the proxy has requested this type yet.
    #[must_use]
    pub fn registered(&self) -> bool {
        self.registered
    }

    /// Whether this type runs in wildcard mode.
    #[must_use]
    pub fn wildcard(&self) -> bool {
        self.wildcard
    }

    /// Number of in-flight (sent, un-ACKed) responses.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending_updates.len()
    }

    /// The proxy's confirmed version of `name`, if tracked.
    #[must_use]
    pub fn acked_version(&self, name: &str) -> Option<&ResourceVersion> {
        self.acked_versions.get(name)
    }

    fn subscribed(&self, name: &str) -> bool {
        self.wildcard || self.subscriptions.contains(name)
    }

    /// Handle an inbound discovery request for this type.
    ///
    /// A request plays up to three roles at once: registering the type (and
    /// electing wildcard mode), (N)ACKing the previous response, and - on
    /// the registering request of a reconnected stream - declaring the
    /// versions the proxy already holds. Non-wildcard streams additionally
    /// adjust their subscription set.
    ///
    /// `child` is the registered state machine for this type's child type,
    /// when one exists: re-subscribing a parent implies Envoy dropped the
    /// children it had for it.
    pub fn recv(
        &mut self,
        req: &DeltaDiscoveryRequest,
        mut child: Option<&mut DeltaType>,
    ) -> DeltaRecv {
        let registered_this_time = if self.registered {
            false
        } else {
            // Wildcard mode is elected by the very first request of a type
            // carrying no subscribe names, and is permanent for the stream.
            self.wildcard = req.resource_names_subscribe.is_empty();
            self.registered = true;
            true
        };

        if !req.response_nonce.is_empty() {
            match &req.error_detail {
                None => {
                    trace!(type_url = %self.type_url, nonce = %req.response_nonce,
                        "got ok response from proxy");
                    self.ack(&req.response_nonce);
                }
                Some(detail) => {
                    error!(type_url = %self.type_url, nonce = %req.response_nonce,
                        code = detail.code, error = %detail.message,
                        "got error response from proxy");
                    self.nack(&req.response_nonce);
                    return DeltaRecv::Nack;
                }
            }
        }

        if registered_this_time && !req.initial_resource_versions.is_empty() {
            // A reconnected proxy re-declares its state here; this is the
            // only bookkeeping that survives a stream reconnect.
            trace!(type_url = %self.type_url,
                resources = req.initial_resource_versions.len(),
                "seeding resource versions declared by the proxy");
            self.acked_versions = req
                .initial_resource_versions
                .iter()
                .map(|(name, version)| (name.clone(), ResourceVersion::new(version.clone())))
                .collect();
            if !self.wildcard {
                self.subscriptions
                    .extend(req.initial_resource_versions.keys().cloned());
            }
        }

        if !self.wildcard {
            for name in &req.resource_names_subscribe {
                let already_subscribed = !self.subscriptions.insert(name.clone());

                // The proxy may have dropped this resource and regained
                // interest before unsubscribing, so a subscribe always wipes
                // the tracked version to force a re-send.
                if let Some(version) = self.acked_versions.get_mut(name) {
                    version.clear();
                }

                // If Envoy ever held data for this parent's children, assume
                // that data is gone now.
                if let Some(child) = child.as_deref_mut() {
                    if child.registered {
                        if let Some(children) = self.children_names.get(name) {
                            for child_name in children {
                                child.ensure_resend(name, child_name);
                            }
                        }
                    }
                }

                if already_subscribed {
                    trace!(type_url = %self.type_url, resource = %name,
                        "re-subscribing resource for stream");
                } else {
                    trace!(type_url = %self.type_url, resource = %name,
                        "subscribing resource for stream");
                }
            }

            for name in &req.resource_names_unsubscribe {
                if self.subscriptions.remove(name) {
                    // Acked versions stay; the next diff issues the removal.
                    trace!(type_url = %self.type_url, resource = %name,
                        "unsubscribing resource for stream");
                }
            }
        }

        if registered_this_time {
            DeltaRecv::NewSubscription
        } else {
            DeltaRecv::Ack
        }
    }

    fn ack(&mut self, nonce: &str) {
        let Some(pending) = self.pending_updates.remove(nonce) else {
            return;
        };
        for (name, op) in pending {
            if op.remove {
                self.acked_versions.remove(&name);
            } else {
                self.acked_versions.insert(name, op.version);
            }
        }
        self.sent_at_least_once = true;
    }

    fn nack(&mut self, nonce: &str) {
        // Dropping the pending entry without touching acked versions makes
        // the next diff re-propose the same operations.
        self.pending_updates.remove(nonce);
    }

    /// Mark `child_name` as implicitly forgotten by Envoy because its parent
    /// `parent_name` changed or was re-subscribed.
    ///
    /// Called on the *child* type. No-op when the child is not subscribed
    /// here.
    pub(crate) fn ensure_resend(&mut self, parent_name: &str, child_name: &str) {
        if !self.subscribed(child_name) {
            return;
        }
        trace!(
            type_url = %self.type_url,
            parent = %parent_name,
            resource = %child_name,
            "triggering implicit update of child resource"
        );

        // An empty version reads as "Envoy holds no data for this name",
        // which forces the next diff to re-send it.
        if let Some(version) = self.acked_versions.get_mut(child_name) {
            version.clear();
        }

        if self.legacy_child_resend {
            // Legacy escape hatch: skip the pending-update scrub below. This
            // reintroduces a race where send(child), send(parent),
            // ack(child), ack(parent) leaves Envoy with the new parent and
            // no child data, because the child hash never changed.
            return;
        }

        // In-flight updates may carry versions Envoy has not ACKed; strike
        // the name so a late ACK cannot re-record them.
        for pending in self.pending_updates.values_mut() {
            pending.remove(child_name);
        }
    }

    /// Diff the proxy's confirmed view against `current_versions` and send a
    /// delta response if this pass has anything to say.
    ///
    /// Refuses while unregistered, while a previous response is un-ACKed,
    /// and when there is nothing to serve yet (unless this type elects
    /// `allow_empty`). Only operations permitted by `upsert` / `remove` are
    /// carried and recorded; the rest are reconsidered on a later pass.
    ///
    /// Returns whether a response was sent.
    pub async fn send_if_new(
        &mut self,
        current_versions: Option<&HashMap<String, String>>,
        index: &ResourceIndex,
        nonce: &mut u64,
        upsert: bool,
        remove: bool,
        mut child: Option<&mut DeltaType>,
    ) -> XdsResult<bool> {
        if !self.registered {
            return Ok(false);
        }
        // Wait for the proxy to catch up on this type before sending more.
        if !self.pending_updates.is_empty() {
            return Ok(false);
        }

        let empty = HashMap::new();
        let current_versions = current_versions.unwrap_or(&empty);
        if current_versions.is_empty() && !self.allow_empty {
            // Nothing to serve yet.
            return Ok(false);
        }

        let Some((mut response, updates)) =
            self.create_response(current_versions, index, upsert, remove)?
        else {
            return Ok(false);
        };

        *nonce += 1;
        response.nonce = format!("{:08x}", *nonce);
        let response_nonce = response.nonce.clone();

        trace!(
            type_url = %self.type_url,
            nonce = %response_nonce,
            upserts = response.resources.len(),
            removals = response.removed_resources.len(),
            "sending delta response"
        );
        self.stream.send(response).await?;

        // An upserted parent invalidates Envoy's data for its children, and
        // Envoy will not re-subscribe to them on its own. Record the linkage
        // and force the children out on their own type. The child type may
        // not be registered yet (parents are sent first); ensure_resend
        // no-ops in that case.
        if self.type_url.child_type().is_some() {
            for name in updates.keys() {
                if let Some(children) = index.children_of(self.type_url.as_str(), name) {
                    self.children_names.insert(name.clone(), children.clone());
                    if let Some(child) = child.as_deref_mut() {
                        for child_name in children {
                            child.ensure_resend(name, child_name);
                        }
                    }
                }
            }
        }

        self.pending_updates.insert(response_nonce, updates);
        Ok(true)
    }

    /// Compute the staged diff and assemble the wire response.
    ///
    /// Returns `None` when no operation survives the pass flags and a
    /// response has already been ACKed at least once. Before that first
    /// ACK an empty response is still produced, so a wildcard subscription
    /// with no data gets an answer instead of a stall.
    fn create_response(
        &self,
        current_versions: &HashMap<String, String>,
        index: &ResourceIndex,
        upsert: bool,
        remove: bool,
    ) -> XdsResult<Option<(DeltaDiscoveryResponse, HashMap<String, PendingUpdate>)>> {
        let mut has_relevant_updates = false;
        let mut updates: HashMap<String, PendingUpdate> = HashMap::new();

        if self.wildcard {
            // Walk what Envoy holds: stale names become removals, changed
            // versions become upserts.
            for (name, acked) in &self.acked_versions {
                match current_versions.get(name) {
                    None => {
                        if remove {
                            has_relevant_updates = true;
                        }
                        updates.insert(name.clone(), PendingUpdate::removal());
                    }
                    Some(current) if acked != current.as_str() => {
                        if upsert {
                            has_relevant_updates = true;
                        }
                        updates.insert(name.clone(), PendingUpdate::upsert(current.clone()));
                    }
                    Some(_) => {}
                }
            }
            // Then everything Envoy has never seen.
            for (name, current) in current_versions {
                if self.acked_versions.contains_key(name) {
                    continue;
                }
                if upsert {
                    has_relevant_updates = true;
                }
                updates.insert(name.clone(), PendingUpdate::upsert(current.clone()));
            }
        } else {
            for (name, acked) in &self.acked_versions {
                if !self.subscribed(name) {
                    // Unsubscribed but still tracked: tell Envoy to drop it.
                    if remove {
                        has_relevant_updates = true;
                    }
                    updates.insert(name.clone(), PendingUpdate::removal());
                    continue;
                }
                match current_versions.get(name) {
                    None => {
                        if remove {
                            has_relevant_updates = true;
                        }
                        updates.insert(name.clone(), PendingUpdate::removal());
                    }
                    Some(current) if acked != current.as_str() => {
                        if upsert {
                            has_relevant_updates = true;
                        }
                        updates.insert(name.clone(), PendingUpdate::upsert(current.clone()));
                    }
                    Some(_) => {}
                }
            }
            // Subscribed names Envoy has never seen.
            for name in &self.subscriptions {
                if self.acked_versions.contains_key(name) {
                    continue;
                }
                if let Some(current) = current_versions.get(name) {
                    if upsert {
                        has_relevant_updates = true;
                    }
                    updates.insert(name.clone(), PendingUpdate::upsert(current.clone()));
                }
            }
        }

        if !has_relevant_updates && self.sent_at_least_once {
            return Ok(None);
        }

        let mut response = DeltaDiscoveryResponse {
            type_url: self.type_url.to_string(),
            ..Default::default()
        };
        // Only operations this pass may carry are recorded as pending; the
        // rest stay unstaged and get reconsidered on the next pass.
        let mut carried: HashMap<String, PendingUpdate> = HashMap::new();
        for (name, op) in updates {
            if op.remove {
                if remove {
                    response.removed_resources.push(name.clone());
                    carried.insert(name, op);
                }
            } else if upsert {
                let payload = index.get(self.type_url.as_str(), &name).ok_or_else(|| {
                    XdsError::Internal {
                        message: format!(
                            "resource {}/{} has a version but no payload",
                            self.type_url, name
                        ),
                        source: None,
                    }
                })?;
                response.resources.push(Resource {
                    name: name.clone(),
                    version: op.version.as_str().to_string(),
                    resource: Some(payload.clone()),
                    ..Default::default()
                });
                carried.insert(name, op);
            }
        }

        Ok(Some((response, carried)))
    }
}
