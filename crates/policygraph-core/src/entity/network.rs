//! Peers, groups, network resources, and networks.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identifier::Id;

/// Name of the synthetic group that matches every peer.
pub const ALL_GROUP_NAME: &str = "All";

/// An enrolled device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Peer {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub connected: bool,
}

/// A named set of peers and resources.
///
/// Groups are the unit policies are written against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub peers: Vec<Id>,
    #[serde(default)]
    pub resources: Vec<Id>,
    #[serde(default)]
    pub peers_count: u32,
    #[serde(default)]
    pub resources_count: u32,
}

impl Group {
    /// Returns true for the synthetic `All` group.
    pub fn is_all(&self) -> bool {
        self.name == ALL_GROUP_NAME
    }

    /// Returns true if membership is implicit, i.e. the group is `All` and
    /// carries no explicit peer list.
    pub fn matches_every_peer(&self) -> bool {
        self.is_all() && self.peers.is_empty()
    }
}

/// Kind of a network resource, or of a single rule reference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    #[default]
    Host,
    Subnet,
    Domain,
    /// A rule reference pointing at a peer rather than a network resource.
    Peer,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Host => "host",
            Self::Subnet => "subnet",
            Self::Domain => "domain",
            Self::Peer => "peer",
        };
        f.write_str(name)
    }
}

/// A single-entity reference used by a rule side instead of a group list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceRef {
    pub id: Id,
    #[serde(rename = "type", default)]
    pub kind: ResourceKind,
}

impl ResourceRef {
    /// Creates a reference to an entity of the given kind.
    pub fn new(id: impl Into<Id>, kind: ResourceKind) -> Self {
        Self {
            id: id.into(),
            kind,
        }
    }

    /// Returns true if the reference targets a peer.
    pub fn is_peer(&self) -> bool {
        self.kind == ResourceKind::Peer
    }
}

/// A named reachable target: a host, a subnet, or a domain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkResource {
    pub id: Id,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: ResourceKind,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub groups: Vec<Id>,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

/// A network: the container that owns a set of resources.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub resources: Vec<Id>,
    #[serde(default)]
    pub routers: Vec<Id>,
}

pub(crate) fn default_enabled() -> bool {
    true
}
