//! Topology construction.
//!
//! [`Topology::build`] turns a [`Snapshot`] into a directed graph whose nodes
//! borrow the snapshot's entities. Rule edges come first, one per
//! source/destination pair of every well-formed rule. Structural edges
//! (group membership, network ownership, optional policy links) are added
//! afterwards according to [`TopologyConfig`].
//!
//! Node indices are dense and equal to the node's position in
//! [`Topology::node_ids`], so per-node data can live in plain vectors.

mod edge;
mod node;

use std::collections::HashSet;

use indexmap::IndexSet;
use log::{debug, trace, warn};
use petgraph::{
    Direction,
    graph::{DiGraph, EdgeIndex, NodeIndex},
    visit::EdgeRef,
};

use policygraph_core::{
    entity::{Group, MalformedRule, Policy, PolicyRule, RuleEnd, RuleSide},
    identifier::Id,
};

pub use edge::{Edge, EdgeCategory, EdgeOrigin};
pub use node::{Node, NodeId, NodeKind, ParseNodeIdError};

use crate::{config::TopologyConfig, policy, snapshot::{Revision, Snapshot}};

/// A rule that produced no edges because one of its sides was malformed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRule {
    pub policy: Id,
    pub rule: Id,
    pub reason: MalformedRule,
}

/// The connectivity graph of one snapshot.
#[derive(Debug)]
pub struct Topology<'a> {
    snapshot: &'a Snapshot,
    graph: DiGraph<Node<'a>, Edge>,
    node_ids: IndexSet<NodeId>,
    skipped: Vec<SkippedRule>,
}

impl<'a> Topology<'a> {
    /// Builds the topology of a snapshot.
    ///
    /// Building never fails: malformed rules and dangling references are
    /// logged and skipped.
    pub fn build(snapshot: &'a Snapshot, config: &TopologyConfig) -> Self {
        let mut builder = Builder::new(snapshot, config);

        for policy in snapshot.policies() {
            for rule in &policy.rules {
                builder.add_rule(policy, rule);
            }
        }
        if config.expand_members() {
            builder.expand_members();
        }
        builder.connect_members();
        if config.show_networks() {
            builder.attach_networks();
        }

        let topology = builder.finish();
        debug!(
            revision = topology.revision().value(),
            nodes_count = topology.node_count(),
            edges_count = topology.edge_count(),
            skipped_rules = topology.skipped.len();
            "Topology built"
        );
        topology
    }

    /// The snapshot this topology was built from.
    pub fn snapshot(&self) -> &'a Snapshot {
        self.snapshot
    }

    pub fn revision(&self) -> Revision {
        self.snapshot.revision()
    }

    pub fn graph(&self) -> &DiGraph<Node<'a>, Edge> {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Node identities in index order.
    pub fn node_ids(&self) -> &IndexSet<NodeId> {
        &self.node_ids
    }

    pub fn index_of(&self, id: NodeId) -> Option<NodeIndex> {
        self.node_ids.get_index_of(&id).map(NodeIndex::new)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node_ids.contains(&id)
    }

    /// Returns the node at an index.
    ///
    /// # Panics
    ///
    /// Panics if the index does not belong to this topology.
    pub fn node(&self, idx: NodeIndex) -> Node<'a> {
        self.graph[idx]
    }

    pub fn node_id(&self, idx: NodeIndex) -> NodeId {
        self.node_ids[idx.index()]
    }

    /// Iterates over all nodes with their indices.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, Node<'a>)> + '_ {
        self.graph
            .node_indices()
            .map(|idx| (idx, self.graph[idx]))
    }

    /// Iterates over all edges as `(edge, source, target, data)`.
    pub fn edges(&self) -> impl Iterator<Item = (EdgeIndex, NodeIndex, NodeIndex, &Edge)> {
        self.graph
            .edge_references()
            .map(|edge| (edge.id(), edge.source(), edge.target(), edge.weight()))
    }

    /// Iterates over the edges entering a node as `(source, data)`.
    pub fn incoming(&self, idx: NodeIndex) -> impl Iterator<Item = (NodeIndex, &Edge)> {
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .map(|edge| (edge.source(), edge.weight()))
    }

    /// Rules that were skipped as malformed, in snapshot order.
    pub fn skipped_rules(&self) -> &[SkippedRule] {
        &self.skipped
    }
}

struct Builder<'a, 'c> {
    snapshot: &'a Snapshot,
    config: &'c TopologyConfig,
    graph: DiGraph<Node<'a>, Edge>,
    node_ids: IndexSet<NodeId>,
    skipped: Vec<SkippedRule>,
    edge_keys: HashSet<(NodeIndex, NodeIndex, String)>,
}

impl<'a, 'c> Builder<'a, 'c> {
    fn new(snapshot: &'a Snapshot, config: &'c TopologyConfig) -> Self {
        Self {
            snapshot,
            config,
            graph: DiGraph::new(),
            node_ids: IndexSet::new(),
            skipped: Vec::new(),
            edge_keys: HashSet::new(),
        }
    }

    fn finish(self) -> Topology<'a> {
        Topology {
            snapshot: self.snapshot,
            graph: self.graph,
            node_ids: self.node_ids,
            skipped: self.skipped,
        }
    }

    /// Returns the index of a node, inserting it on first sight.
    fn ensure_node(&mut self, node: Node<'a>) -> NodeIndex {
        let (position, inserted) = self.node_ids.insert_full(node.node_id());
        if inserted {
            let idx = self.graph.add_node(node);
            debug_assert_eq!(idx.index(), position);
            idx
        } else {
            NodeIndex::new(position)
        }
    }

    /// Adds an edge unless one with the same key already connects the pair.
    fn add_edge(&mut self, source: NodeIndex, target: NodeIndex, key: String, edge: impl FnOnce() -> Edge) {
        if self.edge_keys.insert((source, target, key)) {
            self.graph.add_edge(source, target, edge());
        }
    }

    fn add_rule(&mut self, policy: &'a Policy, rule: &'a PolicyRule) {
        let Some(sources) = self.resolve_side(policy, rule, RuleEnd::Source) else {
            return;
        };
        let Some(destinations) = self.resolve_side(policy, rule, RuleEnd::Destination) else {
            return;
        };
        if sources.is_empty() || destinations.is_empty() {
            debug!(policy_id:% = policy.id, rule_id:% = rule.id; "Rule references nothing present in the snapshot");
            return;
        }
        let sources: Vec<NodeIndex> = sources
            .into_iter()
            .map(|node| self.ensure_node(node))
            .collect();
        let destinations: Vec<NodeIndex> = destinations
            .into_iter()
            .map(|node| self.ensure_node(node))
            .collect();

        let classification = policy::classify(policy, rule);
        let key = format!("rule:{}:{}", policy.id, rule.id);
        for &source in &sources {
            for &target in &destinations {
                let edge_id = format!(
                    "{key}:{}->{}",
                    self.node_ids[source.index()],
                    self.node_ids[target.index()]
                );
                self.add_edge(source, target, key.clone(), || {
                    Edge::new(
                        edge_id,
                        classification.category,
                        EdgeOrigin::Rule {
                            policy: policy.id,
                            rule: rule.id,
                            enabled: classification.enabled,
                            traffic: rule.traffic_label(),
                        },
                    )
                });
            }
        }

        if self.config.policy_nodes() {
            let policy_idx = self.ensure_node(Node::Policy(policy));
            for &source in &sources {
                let edge_id = format!(
                    "policy:{}->{}",
                    policy.id,
                    self.node_ids[source.index()]
                );
                self.add_edge(policy_idx, source, "policy".to_string(), || {
                    Edge::new(
                        edge_id,
                        EdgeCategory::Simple,
                        EdgeOrigin::Policy { policy: policy.id },
                    )
                });
            }
        }
    }

    /// Resolves one rule side to the nodes it names, without inserting them.
    ///
    /// Returns `None` when the rule must be skipped. An empty vector means
    /// the side was well-formed but every id it named is dangling.
    fn resolve_side(
        &mut self,
        policy: &'a Policy,
        rule: &'a PolicyRule,
        end: RuleEnd,
    ) -> Option<Vec<Node<'a>>> {
        let side = match rule.side(end) {
            Ok(side) => side,
            Err(err @ MalformedRule::Ambiguous { .. }) if !self.config.strict_rules() => {
                warn!(
                    policy_id:% = policy.id,
                    rule_id:% = rule.id,
                    err:err;
                    "Rule side has a group list and a single reference, using the reference"
                );
                RuleSide::Resource(rule.reference(end)?)
            }
            Err(err) => {
                warn!(policy_id:% = policy.id, rule_id:% = rule.id, err:err; "Skipping malformed rule");
                self.skipped.push(SkippedRule {
                    policy: policy.id,
                    rule: rule.id,
                    reason: err,
                });
                return None;
            }
        };

        let snapshot = self.snapshot;
        let mut nodes = Vec::new();
        match side {
            RuleSide::Groups(groups) => {
                for &group_id in groups {
                    match snapshot.group(group_id) {
                        Some(group) => nodes.push(Node::Group(group)),
                        None => {
                            debug!(rule_id:% = rule.id, group_id:%; "Dropping dangling group reference")
                        }
                    }
                }
            }
            RuleSide::Resource(reference) => {
                let node = if reference.is_peer() {
                    snapshot.peer(reference.id).map(Node::Peer)
                } else {
                    snapshot.resource(reference.id).map(Node::Resource)
                };
                match node {
                    Some(node) => nodes.push(node),
                    None => debug!(
                        rule_id:% = rule.id,
                        reference_id:% = reference.id,
                        kind:% = reference.kind;
                        "Dropping dangling resource reference"
                    ),
                }
            }
        }
        Some(nodes)
    }

    fn group_nodes(&self) -> Vec<(NodeIndex, &'a Group)> {
        self.graph
            .node_indices()
            .filter_map(|idx| match self.graph[idx] {
                Node::Group(group) => Some((idx, group)),
                _ => None,
            })
            .collect()
    }

    /// Adds every member of every group node as a node of its own.
    fn expand_members(&mut self) {
        let snapshot = self.snapshot;
        for (_, group) in self.group_nodes() {
            for peer in snapshot.peers_in_group(group) {
                self.ensure_node(Node::Peer(peer));
            }
            for resource in snapshot.resources_in_group(group) {
                self.ensure_node(Node::Resource(resource));
            }
            trace!(group_id:% = group.id; "Expanded group members");
        }
    }

    /// Links each group node to those of its members that are present.
    fn connect_members(&mut self) {
        let snapshot = self.snapshot;
        for (group_idx, group) in self.group_nodes() {

            let members: Vec<(NodeId, EdgeCategory)> = snapshot
                .peers_in_group(group)
                .map(|peer| (NodeId::peer(peer.id), EdgeCategory::Simple))
                .chain(
                    snapshot
                        .resources_in_group(group)
                        .map(|resource| (NodeId::resource(resource.id), EdgeCategory::Floating)),
                )
                .collect();

            for (member, category) in members {
                let Some(position) = self.node_ids.get_index_of(&member) else {
                    continue;
                };
                let member_idx = NodeIndex::new(position);
                let edge_id = format!("member:{}->{member}", NodeId::group(group.id));
                self.add_edge(group_idx, member_idx, "member".to_string(), || {
                    Edge::new(edge_id, category, EdgeOrigin::Membership)
                });
            }
        }
    }

    /// Adds the owning network of every resource node.
    fn attach_networks(&mut self) {
        let snapshot = self.snapshot;
        let resources: Vec<_> = self
            .graph
            .node_indices()
            .filter_map(|idx| match self.graph[idx] {
                Node::Resource(resource) => Some((idx, resource)),
                _ => None,
            })
            .collect();

        for (resource_idx, resource) in resources {
            let Some(network) = snapshot.network_of(resource.id) else {
                continue;
            };
            let network_idx = self.ensure_node(Node::Network(network));
            let edge_id = format!(
                "network:{}->{}",
                network.id,
                NodeId::resource(resource.id)
            );
            self.add_edge(network_idx, resource_idx, "network".to_string(), || {
                Edge::new(edge_id, EdgeCategory::FloatingStraight, EdgeOrigin::Network)
            });
        }
    }
}
