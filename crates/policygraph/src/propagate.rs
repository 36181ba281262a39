//! Enabled-state propagation.
//!
//! A node is *enabled* when traffic is permitted to reach it. Propagation
//! runs in two passes over a [`Topology`]:
//!
//! 1. Every enabled rule edge marks its target. A bidirectional rule edge
//!    also marks its source, since traffic flows both ways.
//! 2. Every peer or resource that is a member of a group marked in the
//!    first pass is marked too.
//!
//! Groups cannot contain groups, so one level of membership is the whole
//! closure. The result is an [`EnabledMap`] keyed by the snapshot revision
//! it was computed from; [`EnabledCache`] memoizes it per revision.

use std::sync::{Arc, PoisonError, RwLock};

use indexmap::IndexSet;
use log::{debug, trace};
use petgraph::graph::NodeIndex;

use crate::{
    snapshot::Revision,
    topology::{EdgeCategory, NodeId, NodeKind, Topology},
};

/// Per-node enabled flags for one snapshot revision.
#[derive(Debug, Clone, PartialEq)]
pub struct EnabledMap {
    revision: Revision,
    ids: IndexSet<NodeId>,
    flags: Vec<bool>,
}

impl EnabledMap {
    pub fn revision(&self) -> Revision {
        self.revision
    }

    /// Returns whether a node is enabled. Unknown nodes are disabled.
    pub fn is_enabled(&self, id: NodeId) -> bool {
        self.ids
            .get_index_of(&id)
            .is_some_and(|position| self.flags[position])
    }

    /// Returns whether the node at a topology index is enabled.
    pub fn is_enabled_at(&self, idx: NodeIndex) -> bool {
        self.flags.get(idx.index()).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn enabled_count(&self) -> usize {
        self.flags.iter().filter(|&&flag| flag).count()
    }

    /// Iterates over `(node, enabled)` in topology index order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, bool)> + '_ {
        self.ids.iter().copied().zip(self.flags.iter().copied())
    }
}

/// Computes the enabled map of a topology.
pub fn compute_enabled_map(topology: &Topology<'_>) -> EnabledMap {
    let node_count = topology.node_count();
    let mut direct = vec![false; node_count];

    for (_, source, target, edge) in topology.edges() {
        if edge.rule_enabled() != Some(true) {
            continue;
        }
        direct[target.index()] = true;
        if edge.category() == EdgeCategory::Bidirectional {
            direct[source.index()] = true;
        }
    }

    let mut flags = direct.clone();
    for (idx, node) in topology.nodes() {
        if flags[idx.index()] || !matches!(node.kind(), NodeKind::Peer | NodeKind::Resource) {
            continue;
        }
        let inherited = topology.incoming(idx).any(|(group, edge)| {
            edge.is_membership() && direct[group.index()]
        });
        if inherited {
            trace!(node:% = topology.node_id(idx); "Enabled through group membership");
            flags[idx.index()] = true;
        }
    }

    let map = EnabledMap {
        revision: topology.revision(),
        ids: topology.node_ids().clone(),
        flags,
    };
    debug!(
        revision = map.revision.value(),
        enabled = map.enabled_count(),
        total = map.len();
        "Computed enabled map"
    );
    map
}

/// Memoizes the latest [`EnabledMap`] by snapshot revision.
///
/// The cache holds one map. Readers get a shared handle; a result computed
/// for an older revision than the one already cached is discarded.
#[derive(Debug, Default)]
pub struct EnabledCache {
    current: RwLock<Option<Arc<EnabledMap>>>,
}

impl EnabledCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached map if it belongs to `revision`.
    pub fn get(&self, revision: Revision) -> Option<Arc<EnabledMap>> {
        let current = self.current.read().unwrap_or_else(PoisonError::into_inner);
        current
            .as_ref()
            .filter(|map| map.revision() == revision)
            .cloned()
    }

    /// Stores a map unless a newer revision is already cached.
    ///
    /// Returns true if the map was stored.
    pub fn store(&self, map: Arc<EnabledMap>) -> bool {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(existing) = current.as_ref() {
            if existing.revision() > map.revision() {
                debug!(
                    cached = existing.revision().value(),
                    discarded = map.revision().value();
                    "Discarding stale enabled map"
                );
                return false;
            }
        }
        *current = Some(map);
        true
    }

    /// Returns the map for the topology's revision, computing it on a miss.
    ///
    /// The computation runs without holding the lock, so concurrent callers
    /// may compute the same revision twice; both get an equal map.
    pub fn get_or_compute(&self, topology: &Topology<'_>) -> Arc<EnabledMap> {
        if let Some(map) = self.get(topology.revision()) {
            trace!(revision = topology.revision().value(); "Enabled map cache hit");
            return map;
        }
        let map = Arc::new(compute_enabled_map(topology));
        self.store(Arc::clone(&map));
        map
    }

    pub fn clear(&self) {
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = None;
    }
}
