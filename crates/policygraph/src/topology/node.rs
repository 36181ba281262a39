//! Graph nodes.

use std::{fmt, str::FromStr};

use serde::{Serialize, Serializer};

use policygraph_core::{
    entity::{Group, Network, NetworkResource, Peer, Policy},
    identifier::Id,
};

/// The kind of entity a node stands for.
///
/// The declaration order is the left-to-right column order used by the
/// fallback layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Policy,
    Group,
    Peer,
    Resource,
    Network,
}

impl NodeKind {
    /// Every kind, in column order.
    pub const ALL: [NodeKind; 5] = [
        NodeKind::Policy,
        NodeKind::Group,
        NodeKind::Peer,
        NodeKind::Resource,
        NodeKind::Network,
    ];

    fn as_str(self) -> &'static str {
        match self {
            Self::Policy => "policy",
            Self::Group => "group",
            Self::Peer => "peer",
            Self::Resource => "resource",
            Self::Network => "network",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of a node within a topology.
///
/// Entity ids are only unique per entity type, so the kind is part of the
/// identity. The textual form is `kind:id`, e.g. `group:devs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    kind: NodeKind,
    id: Id,
}

impl NodeId {
    pub fn new(kind: NodeKind, id: impl Into<Id>) -> Self {
        Self {
            kind,
            id: id.into(),
        }
    }

    pub fn peer(id: impl Into<Id>) -> Self {
        Self::new(NodeKind::Peer, id)
    }

    pub fn group(id: impl Into<Id>) -> Self {
        Self::new(NodeKind::Group, id)
    }

    pub fn resource(id: impl Into<Id>) -> Self {
        Self::new(NodeKind::Resource, id)
    }

    pub fn network(id: impl Into<Id>) -> Self {
        Self::new(NodeKind::Network, id)
    }

    pub fn policy(id: impl Into<Id>) -> Self {
        Self::new(NodeKind::Policy, id)
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn id(&self) -> Id {
        self.id
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Failure to parse a `kind:id` node identity.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid node id `{0}`, expected `<policy|group|peer|resource|network>:<id>`")]
pub struct ParseNodeIdError(String);

impl FromStr for NodeId {
    type Err = ParseNodeIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, id) = s
            .split_once(':')
            .filter(|(_, id)| !id.is_empty())
            .ok_or_else(|| ParseNodeIdError(s.to_string()))?;
        let kind = NodeKind::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == kind)
            .ok_or_else(|| ParseNodeIdError(s.to_string()))?;
        Ok(Self::new(kind, id))
    }
}

/// A node of the topology graph, borrowing the entity it stands for from
/// the snapshot.
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Policy(&'a Policy),
    Group(&'a Group),
    Peer(&'a Peer),
    Resource(&'a NetworkResource),
    Network(&'a Network),
}

impl Node<'_> {
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Policy(_) => NodeKind::Policy,
            Self::Group(_) => NodeKind::Group,
            Self::Peer(_) => NodeKind::Peer,
            Self::Resource(_) => NodeKind::Resource,
            Self::Network(_) => NodeKind::Network,
        }
    }

    pub fn node_id(&self) -> NodeId {
        let id = match self {
            Self::Policy(policy) => policy.id,
            Self::Group(group) => group.id,
            Self::Peer(peer) => peer.id,
            Self::Resource(resource) => resource.id,
            Self::Network(network) => network.id,
        };
        NodeId::new(self.kind(), id)
    }

    /// Live status of the entity: connection state for peers, the enabled
    /// flag for resources. Other kinds have no status and report `true`.
    pub fn is_online(&self) -> bool {
        match self {
            Self::Peer(peer) => peer.connected,
            Self::Resource(resource) => resource.enabled,
            Self::Policy(_) | Self::Group(_) | Self::Network(_) => true,
        }
    }

    /// Display name of the entity, falling back to its id when unnamed.
    pub fn label(&self) -> String {
        let name = match self {
            Self::Policy(policy) => &policy.name,
            Self::Group(group) => &group.name,
            Self::Peer(peer) => &peer.name,
            Self::Resource(resource) => &resource.name,
            Self::Network(network) => &network.name,
        };
        if name.is_empty() {
            self.node_id().id().to_string()
        } else {
            name.clone()
        }
    }
}

impl PartialEq for Node<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.node_id() == other.node_id()
    }
}

impl Eq for Node<'_> {}
