//! Renderable scenes.
//!
//! A [`Scene`] is what a renderer consumes: every node with its bounds and
//! enabled flag, and every edge with its anchors, sides, and built path
//! data. It serializes to the JSON shape a canvas front end expects.

use log::debug;
use serde::Serialize;

use policygraph_core::geometry::{Bounds, Point, Size};

use crate::{
    config::GeometryConfig,
    floating::{Anchors, Side, anchor_points, offset_anchors},
    layout::Placements,
    path::{PathStyle, build_path},
    propagate::EnabledMap,
    topology::{EdgeCategory, NodeId, NodeKind, Topology},
};

/// A serializable point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScenePoint {
    pub x: f32,
    pub y: f32,
}

impl From<Point> for ScenePoint {
    fn from(point: Point) -> Self {
        Self {
            x: point.x(),
            y: point.y(),
        }
    }
}

/// A placed node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneNode {
    pub id: NodeId,
    pub kind: NodeKind,
    pub label: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub enabled: bool,
    /// Peer connection or resource enabled state; `true` for other kinds.
    pub online: bool,
}

impl SceneNode {
    pub fn bounds(&self) -> Bounds {
        Bounds::new_from_top_left(
            Point::new(self.x, self.y),
            Size::new(self.width, self.height),
        )
    }
}

/// An edge with resolved geometry.
///
/// `paths` holds one path, or two for a bidirectional edge: the forward arc
/// first, then the return arc on the opposite side of the center line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutedEdge {
    pub id: String,
    pub source: NodeId,
    pub target: NodeId,
    pub category: EdgeCategory,
    pub enabled: bool,
    pub anchor_a: ScenePoint,
    pub side_a: Side,
    pub anchor_b: ScenePoint,
    pub side_b: Side,
    pub style: PathStyle,
    pub paths: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub label_position: ScenePoint,
}

/// A rule skipped while building the topology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRuleView {
    pub policy: String,
    pub rule: String,
    pub reason: String,
}

/// Everything needed to draw one snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scene {
    pub revision: u64,
    pub nodes: Vec<SceneNode>,
    pub edges: Vec<RoutedEdge>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedRuleView>,
}

impl Scene {
    /// Assembles a scene.
    ///
    /// Nodes without a placement are left out, along with their edges.
    pub fn build(
        topology: &Topology<'_>,
        placements: &Placements,
        enabled: &EnabledMap,
        config: &GeometryConfig,
    ) -> Self {
        let nodes = topology
            .nodes()
            .filter_map(|(idx, node)| {
                let id = node.node_id();
                let bounds = placements.get(&id)?;
                Some(SceneNode {
                    id,
                    kind: id.kind(),
                    label: node.label(),
                    x: bounds.min_x(),
                    y: bounds.min_y(),
                    width: bounds.width(),
                    height: bounds.height(),
                    enabled: enabled.is_enabled_at(idx),
                    online: node.is_online(),
                })
            })
            .collect();

        let skipped = topology
            .skipped_rules()
            .iter()
            .map(|skipped| SkippedRuleView {
                policy: skipped.policy.to_string(),
                rule: skipped.rule.to_string(),
                reason: skipped.reason.to_string(),
            })
            .collect();

        Self {
            revision: topology.revision().value(),
            nodes,
            edges: route_edges(topology, placements, enabled, config),
            skipped,
        }
    }
}

/// Resolves anchors and paths for every edge whose endpoints are placed.
///
/// A rule edge is enabled when its rule is. A structural edge is enabled
/// when the node it points at is.
pub fn route_edges(
    topology: &Topology<'_>,
    placements: &Placements,
    enabled: &EnabledMap,
    config: &GeometryConfig,
) -> Vec<RoutedEdge> {
    let mut routed = Vec::with_capacity(topology.edge_count());
    let mut unplaced = 0usize;

    for (_, source_idx, target_idx, edge) in topology.edges() {
        let source = topology.node_id(source_idx);
        let target = topology.node_id(target_idx);
        let (Some(&source_bounds), Some(&target_bounds)) =
            (placements.get(&source), placements.get(&target))
        else {
            unplaced += 1;
            continue;
        };

        let anchors = anchor_points(source_bounds, target_bounds);
        let style = edge.category().path_style();
        let (paths, label_position) = edge_paths(edge.category(), style, anchors, config);

        routed.push(RoutedEdge {
            id: edge.id().to_string(),
            source,
            target,
            category: edge.category(),
            enabled: edge
                .rule_enabled()
                .unwrap_or_else(|| enabled.is_enabled_at(target_idx)),
            anchor_a: anchors.source.point.into(),
            side_a: anchors.source.side,
            anchor_b: anchors.target.point.into(),
            side_b: anchors.target.side,
            style,
            paths,
            label: edge.label().map(str::to_string),
            label_position: label_position.into(),
        });
    }

    if unplaced > 0 {
        debug!(unplaced; "Skipped edges with unplaced endpoints");
    }
    routed
}

fn edge_paths(
    category: EdgeCategory,
    style: PathStyle,
    anchors: Anchors,
    config: &GeometryConfig,
) -> (Vec<String>, Point) {
    match category {
        EdgeCategory::Bidirectional => {
            let offset = config.bidirectional_offset();
            let forward = build_path(style, &offset_anchors(anchors, offset), config);
            let backward = build_path(style, &offset_anchors(anchors.reversed(), offset), config);
            let label = forward.label().midpoint(backward.label());
            (vec![forward.data().to_string(), backward.data().to_string()], label)
        }
        EdgeCategory::DirectionalIn
        | EdgeCategory::Floating
        | EdgeCategory::FloatingStraight
        | EdgeCategory::Simple => {
            let path = build_path(style, &anchors, config);
            (vec![path.data().to_string()], path.label())
        }
    }
}

#[cfg(test)]
mod tests {
    use policygraph_core::{
        entity::{Group, Peer, Policy, PolicyRule},
        identifier::Id,
    };

    use super::*;
    use crate::{
        config::TopologyConfig, propagate::compute_enabled_map, snapshot::Snapshot,
    };

    fn group(id: &str, peers: &[&str]) -> Group {
        Group {
            id: Id::new(id),
            name: id.to_string(),
            peers: peers.iter().map(|p| Id::new(p)).collect(),
            resources: Vec::new(),
            peers_count: peers.len() as u32,
            resources_count: 0,
        }
    }

    fn snapshot(bidirectional: bool, enabled: bool) -> Snapshot {
        let mut rule = PolicyRule::new("r");
        rule.sources = Some(vec![Id::new("a")]);
        rule.destinations = Some(vec![Id::new("b")]);
        rule.bidirectional = bidirectional;
        rule.enabled = enabled;

        Snapshot::new(
            vec![Peer {
                id: Id::new("p1"),
                name: "laptop".to_string(),
                ip: Some("100.64.0.1".to_string()),
                connected: true,
            }],
            vec![group("a", &[]), group("b", &["p1"])],
            Vec::new(),
            Vec::new(),
            vec![Policy {
                id: Id::new("pol"),
                name: String::new(),
                enabled: true,
                rules: vec![rule],
            }],
        )
    }

    fn placements() -> Placements {
        let size = Size::new(100.0, 40.0);
        Placements::from([
            (NodeId::group("a"), Bounds::new_from_center(Point::new(0.0, 0.0), size)),
            (NodeId::group("b"), Bounds::new_from_center(Point::new(200.0, 0.0), size)),
            (NodeId::peer("p1"), Bounds::new_from_center(Point::new(400.0, 0.0), size)),
        ])
    }

    #[test]
    fn test_directional_edge_geometry() {
        let snapshot = snapshot(false, true);
        let topology = Topology::build(&snapshot, &TopologyConfig::default());
        let enabled = compute_enabled_map(&topology);
        let edges = route_edges(&topology, &placements(), &enabled, &GeometryConfig::default());

        let rule_edge = edges
            .iter()
            .find(|edge| edge.category == EdgeCategory::DirectionalIn)
            .unwrap();
        assert_eq!(rule_edge.anchor_a, ScenePoint { x: 50.0, y: 0.0 });
        assert_eq!(rule_edge.side_a, Side::Right);
        assert_eq!(rule_edge.anchor_b, ScenePoint { x: 150.0, y: 0.0 });
        assert_eq!(rule_edge.side_b, Side::Left);
        assert_eq!(rule_edge.style, PathStyle::SmoothStep);
        assert_eq!(rule_edge.paths.len(), 1);
        assert!(rule_edge.enabled);
        assert_eq!(rule_edge.label.as_deref(), Some("all"));
    }

    #[test]
    fn test_bidirectional_edge_has_two_opposed_paths() {
        let snapshot = snapshot(true, true);
        let topology = Topology::build(&snapshot, &TopologyConfig::default());
        let enabled = compute_enabled_map(&topology);
        let edges = route_edges(&topology, &placements(), &enabled, &GeometryConfig::default());

        let rule_edge = edges
            .iter()
            .find(|edge| edge.category == EdgeCategory::Bidirectional)
            .unwrap();
        assert_eq!(rule_edge.paths.len(), 2);
        assert!(rule_edge.paths[0].starts_with("M 50 6 "));
        assert!(rule_edge.paths[1].starts_with("M 150 -6 "));
        // Unshifted anchors are reported.
        assert_eq!(rule_edge.anchor_a, ScenePoint { x: 50.0, y: 0.0 });
        assert_eq!(rule_edge.label_position, ScenePoint { x: 100.0, y: 0.0 });
    }

    #[test]
    fn test_structural_edge_follows_target_state() {
        let topology_snapshot = snapshot(false, false);
        let topology = Topology::build(&topology_snapshot, &TopologyConfig::default());
        let enabled = compute_enabled_map(&topology);
        let edges = route_edges(&topology, &placements(), &enabled, &GeometryConfig::default());

        let membership = edges
            .iter()
            .find(|edge| edge.target == NodeId::peer("p1"))
            .unwrap();
        assert_eq!(membership.category, EdgeCategory::Simple);
        assert!(!membership.enabled);

        let on_snapshot = snapshot(false, true);
        let on_topology = Topology::build(&on_snapshot, &TopologyConfig::default());
        let on_enabled = compute_enabled_map(&on_topology);
        let on_edges = route_edges(&on_topology, &placements(), &on_enabled, &GeometryConfig::default());
        let membership = on_edges
            .iter()
            .find(|edge| edge.target == NodeId::peer("p1"))
            .unwrap();
        assert!(membership.enabled);
    }

    #[test]
    fn test_unplaced_nodes_are_left_out() {
        let snapshot = snapshot(false, true);
        let topology = Topology::build(&snapshot, &TopologyConfig::default());
        let enabled = compute_enabled_map(&topology);
        let mut partial = placements();
        partial.remove(&NodeId::peer("p1"));

        let scene = Scene::build(&topology, &partial, &enabled, &GeometryConfig::default());
        assert_eq!(scene.nodes.len(), 2);
        assert_eq!(scene.edges.len(), 1);
    }

    #[test]
    fn test_scene_json_shape() {
        let snapshot = snapshot(false, true);
        let topology = Topology::build(&snapshot, &TopologyConfig::default());
        let enabled = compute_enabled_map(&topology);
        let scene = Scene::build(&topology, &placements(), &enabled, &GeometryConfig::default());

        let json = serde_json::to_value(&scene).unwrap();
        let edge = json["edges"]
            .as_array()
            .unwrap()
            .iter()
            .find(|edge| edge["category"] == "directionalIn")
            .unwrap();
        assert_eq!(edge["source"], "group:a");
        assert_eq!(edge["target"], "group:b");
        assert_eq!(edge["sideA"], "right");
        assert_eq!(edge["anchorB"]["x"], 150.0);
        assert!(json.get("skipped").is_none());

        let peer = json["nodes"]
            .as_array()
            .unwrap()
            .iter()
            .find(|node| node["id"] == "peer:p1")
            .unwrap();
        assert_eq!(peer["label"], "laptop");
        assert_eq!(peer["enabled"], true);
        assert_eq!(peer["online"], true);
    }
}
