//! Revisioned entity snapshots.
//!
//! A [`Snapshot`] is the immutable input of one rendering pass: every peer,
//! group, resource, network, and policy the data layer has fetched. Each
//! snapshot receives a fresh [`Revision`] when it is constructed, and that
//! revision is its identity. Two snapshots built from identical data are
//! still different snapshots; derived state cached against one is never
//! served for the other.

use std::{
    collections::HashMap,
    sync::atomic::{AtomicU64, Ordering},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use policygraph_core::{
    entity::{Group, Network, NetworkResource, Peer, Policy},
    identifier::Id,
};

static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

/// Monotonically increasing snapshot identity.
///
/// Later snapshots always carry a larger revision than earlier ones within
/// the same process, which is what lets caches discard stale results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Revision(u64);

impl Revision {
    fn next() -> Self {
        Self(NEXT_REVISION.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw counter value.
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Raw entity arrays as delivered by the data layer.
///
/// This is the deserializable form; convert it into a [`Snapshot`] to use it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotData {
    #[serde(default)]
    pub peers: Vec<Peer>,
    #[serde(default)]
    pub groups: Vec<Group>,
    #[serde(default)]
    pub resources: Vec<NetworkResource>,
    #[serde(default)]
    pub networks: Vec<Network>,
    #[serde(default)]
    pub policies: Vec<Policy>,
}

impl SnapshotData {
    /// Decodes the JSON form of a snapshot.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] pointing at the offending line and column.
    pub fn from_json(source: &str) -> Result<Self, ParseError> {
        serde_json::from_str(source).map_err(|err| ParseError {
            message: err.to_string(),
            line: err.line(),
            column: err.column(),
        })
    }
}

/// A snapshot document that could not be decoded.
///
/// `line` and `column` are 1-based as reported by the decoder; `line` is 0
/// when the failure has no position (for example an I/O failure mid-read).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    message: String,
    line: usize,
    column: usize,
}

impl ParseError {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn column(&self) -> usize {
        self.column
    }

    /// Byte offset of the reported position in `source`, clamped to the
    /// source length. `None` if the error carries no position.
    pub fn offset_in(&self, source: &str) -> Option<usize> {
        if self.line == 0 {
            return None;
        }

        let line_start: usize = source
            .split_inclusive('\n')
            .take(self.line - 1)
            .map(str::len)
            .sum();
        let offset = line_start + self.column.saturating_sub(1);
        Some(offset.min(source.len()))
    }
}

/// Immutable entity snapshot for one rendering pass.
#[derive(Debug)]
pub struct Snapshot {
    revision: Revision,
    peers: Vec<Peer>,
    groups: Vec<Group>,
    resources: Vec<NetworkResource>,
    networks: Vec<Network>,
    policies: Vec<Policy>,
    peer_index: HashMap<Id, usize>,
    group_index: HashMap<Id, usize>,
    resource_index: HashMap<Id, usize>,
    resource_network: HashMap<Id, usize>,
    group_resources: HashMap<Id, Vec<usize>>,
}

impl Snapshot {
    /// Creates a snapshot and assigns it a new revision.
    ///
    /// When an id appears more than once in the same array, the first
    /// occurrence wins lookups.
    pub fn new(
        peers: Vec<Peer>,
        groups: Vec<Group>,
        resources: Vec<NetworkResource>,
        networks: Vec<Network>,
        policies: Vec<Policy>,
    ) -> Self {
        let peer_index = index_by_id(peers.iter().map(|peer| peer.id));
        let group_index = index_by_id(groups.iter().map(|group| group.id));
        let resource_index = index_by_id(resources.iter().map(|resource| resource.id));

        let mut resource_network = HashMap::new();
        for (network_idx, network) in networks.iter().enumerate() {
            for &resource_id in &network.resources {
                resource_network.entry(resource_id).or_insert(network_idx);
            }
        }

        // Membership can be declared on either side: the group lists the
        // resource, or the resource lists the group.
        let mut group_resources: HashMap<Id, Vec<usize>> = HashMap::new();
        for group in &groups {
            for resource_id in &group.resources {
                if let Some(&idx) = resource_index.get(resource_id) {
                    group_resources.entry(group.id).or_default().push(idx);
                }
            }
        }
        for (idx, resource) in resources.iter().enumerate() {
            for &group_id in &resource.groups {
                group_resources.entry(group_id).or_default().push(idx);
            }
        }
        for members in group_resources.values_mut() {
            members.sort_unstable();
            members.dedup();
        }

        Self {
            revision: Revision::next(),
            peers,
            groups,
            resources,
            networks,
            policies,
            peer_index,
            group_index,
            resource_index,
            resource_network,
            group_resources,
        }
    }

    /// Returns the identity of this snapshot.
    pub fn revision(&self) -> Revision {
        self.revision
    }

    pub fn peers(&self) -> &[Peer] {
        &self.peers
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn resources(&self) -> &[NetworkResource] {
        &self.resources
    }

    pub fn networks(&self) -> &[Network] {
        &self.networks
    }

    pub fn policies(&self) -> &[Policy] {
        &self.policies
    }

    /// Looks up a peer by id.
    pub fn peer(&self, id: Id) -> Option<&Peer> {
        self.peer_index.get(&id).map(|&idx| &self.peers[idx])
    }

    /// Looks up a group by id.
    pub fn group(&self, id: Id) -> Option<&Group> {
        self.group_index.get(&id).map(|&idx| &self.groups[idx])
    }

    /// Looks up a network resource by id.
    pub fn resource(&self, id: Id) -> Option<&NetworkResource> {
        self.resource_index.get(&id).map(|&idx| &self.resources[idx])
    }

    /// Returns the network that owns the given resource, if any.
    pub fn network_of(&self, resource_id: Id) -> Option<&Network> {
        self.resource_network
            .get(&resource_id)
            .map(|&idx| &self.networks[idx])
    }

    /// Returns the peers that belong to a group.
    ///
    /// The synthetic `All` group without an explicit list yields every peer.
    /// Ids that do not resolve to a peer in this snapshot are skipped.
    pub fn peers_in_group<'s>(&'s self, group: &'s Group) -> Box<dyn Iterator<Item = &'s Peer> + 's> {
        if group.matches_every_peer() {
            Box::new(self.peers.iter())
        } else {
            Box::new(group.peers.iter().filter_map(|&id| self.peer(id)))
        }
    }

    /// Returns the resources that belong to a group.
    pub fn resources_in_group(&self, group: &Group) -> impl Iterator<Item = &NetworkResource> {
        self.group_resources
            .get(&group.id)
            .into_iter()
            .flatten()
            .map(|&idx| &self.resources[idx])
    }
}

impl From<SnapshotData> for Snapshot {
    fn from(data: SnapshotData) -> Self {
        Self::new(
            data.peers,
            data.groups,
            data.resources,
            data.networks,
            data.policies,
        )
    }
}

fn index_by_id(ids: impl Iterator<Item = Id>) -> HashMap<Id, usize> {
    let mut index = HashMap::new();
    for (idx, id) in ids.enumerate() {
        index.entry(id).or_insert(idx);
    }
    index
}
