//! Indexed view of one proxy's generated resources.
//!
//! A [`ResourceIndex`] is rebuilt wholesale for every snapshot the watcher
//! emits. It groups resources by type URL, records the parent/child edges
//! the delta protocol needs for resend bookkeeping, and computes the
//! per-resource version hashes the diff runs against.

use std::collections::HashMap;

use prost::Message;
use prost_types::Any;
use sha2::{Digest, Sha256};

use xds_core::{TypeUrl, XdsError, XdsResult};
use xds_types::envoy::config::listener::v3::{FilterChain, Listener};
use xds_types::envoy::extensions::filters::network::http_connection_manager::v3::{
    HttpConnectionManager, HTTP_CONNECTION_MANAGER_TYPE,
};

/// Per-type version maps: type URL -> name -> version hash.
pub type VersionMap = HashMap<String, HashMap<String, String>>;

/// In-memory index of all resources generated for one proxy from one
/// snapshot, grouped by type URL, with parent->child links.
///
/// The index is immutable once installed into a session; a new snapshot
/// always produces a fresh index.
#[derive(Debug, Clone, Default)]
pub struct ResourceIndex {
    /// type URL -> name -> serialized resource.
    index: HashMap<String, HashMap<String, Any>>,
    /// type URL -> parent name -> child names.
    child_index: HashMap<String, HashMap<String, Vec<String>>>,
}

impl ResourceIndex {
    /// Create an empty index with maps for every recognized type.
    #[must_use]
    pub fn new() -> Self {
        let mut index = HashMap::new();
        let mut child_index = HashMap::new();
        for url in TypeUrl::RECOGNIZED {
            index.insert(url.to_string(), HashMap::new());
            child_index.insert(url.to_string(), HashMap::new());
        }
        Self { index, child_index }
    }

    /// Build an index from pre-grouped resources.
    #[must_use]
    pub fn from_resources(resources: HashMap<String, HashMap<String, Any>>) -> Self {
        let mut out = Self::new();
        for (type_url, named) in resources {
            out.index.entry(type_url).or_default().extend(named);
        }
        out
    }

    /// Insert a single resource.
    pub fn insert(&mut self, type_url: impl Into<String>, name: impl Into<String>, resource: Any) {
        self.index
            .entry(type_url.into())
            .or_default()
            .insert(name.into(), resource);
    }

    /// Get a resource by type and name.
    #[must_use]
    pub fn get(&self, type_url: &str, name: &str) -> Option<&Any> {
        self.index.get(type_url)?.get(name)
    }

    /// All resources of one type.
    #[must_use]
    pub fn resources_of(&self, type_url: &str) -> Option<&HashMap<String, Any>> {
        self.index.get(type_url)
    }

    /// The recorded children of `parent` under `type_url`, if any.
    #[must_use]
    pub fn children_of(&self, type_url: &str, parent: &str) -> Option<&Vec<String>> {
        self.child_index.get(type_url)?.get(parent)
    }

    /// Total number of resources across all types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.values().map(HashMap::len).sum()
    }

    /// Whether the index holds no resources.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record the parent->child edges for the types Envoy nests.
    ///
    /// Endpoints share their cluster's name, so every cluster gets a
    /// single-entry child list. Listeners reference route configurations by
    /// name inside their HTTP connection manager filters, so each listener
    /// payload is decoded far enough to pull those names out.
    pub fn populate_child_index(&mut self) -> XdsResult<()> {
        let mut listener_children: HashMap<String, Vec<String>> = HashMap::new();
        if let Some(listeners) = self.index.get(TypeUrl::LISTENER) {
            for (name, res) in listeners {
                listener_children.insert(name.clone(), extract_rds_route_names(res)?);
            }
        }
        self.child_index
            .entry(TypeUrl::LISTENER.to_string())
            .or_default()
            .extend(listener_children);

        let cluster_children: HashMap<String, Vec<String>> = self
            .index
            .get(TypeUrl::CLUSTER)
            .map(|clusters| {
                clusters
                    .keys()
                    .map(|name| (name.clone(), vec![name.clone()]))
                    .collect()
            })
            .unwrap_or_default();
        self.child_index
            .entry(TypeUrl::CLUSTER.to_string())
            .or_default()
            .extend(cluster_children);

        Ok(())
    }

    /// Hash every resource into its version string.
    ///
    /// The version is the hex-encoded SHA-256 of the resource's canonical
    /// serialized form (the `Any` type URL and payload bytes), so equal
    /// canonical bytes always hash identically. A resource that was never
    /// serialized into an `Any` cannot be delivered to the proxy, and fails
    /// the whole snapshot.
    pub fn compute_versions(&self) -> XdsResult<VersionMap> {
        let mut out = VersionMap::new();
        for (type_url, resources) in &self.index {
            let mut versions = HashMap::new();
            for (name, res) in resources {
                if res.type_url.is_empty() {
                    return Err(XdsError::Encoding {
                        type_url: type_url.clone(),
                        name: name.clone(),
                        message: "resource payload has no type URL".to_string(),
                    });
                }
                versions.insert(name.clone(), hash_resource(res));
            }
            out.insert(type_url.clone(), versions);
        }
        Ok(out)
    }
}

/// SHA-256 over the resource's canonical bytes, hex-encoded.
pub fn hash_resource(res: &Any) -> String {
    let mut hasher = Sha256::new();
    hasher.update(res.type_url.as_bytes());
    hasher.update(&res.value);
    hex::encode(hasher.finalize())
}

/// Decode a listener payload far enough to collect the RDS route
/// configuration names referenced by its HTTP connection managers.
fn extract_rds_route_names(res: &Any) -> XdsResult<Vec<String>> {
    let listener = Listener::decode(res.value.as_slice()).map_err(|err| XdsError::Decoding {
        type_url: TypeUrl::LISTENER.to_string(),
        message: err.to_string(),
    })?;

    let mut names = Vec::new();
    let chains = listener
        .filter_chains
        .iter()
        .chain(listener.default_filter_chain.iter());
    for chain in chains {
        collect_chain_route_names(chain, &mut names)?;
    }
    Ok(names)
}

fn collect_chain_route_names(chain: &FilterChain, names: &mut Vec<String>) -> XdsResult<()> {
    for filter in &chain.filters {
        let Some(typed_config) = &filter.typed_config else {
            continue;
        };
        if typed_config.type_url != HTTP_CONNECTION_MANAGER_TYPE {
            continue;
        }
        let hcm = HttpConnectionManager::decode(typed_config.value.as_slice()).map_err(|err| {
            XdsError::Decoding {
                type_url: HTTP_CONNECTION_MANAGER_TYPE.to_string(),
                message: err.to_string(),
            }
        })?;
        if let Some(rds) = hcm.rds {
            if !rds.route_config_name.is_empty() {
                names.push(rds.route_config_name);
            }
        }
    }
    Ok(())
}
