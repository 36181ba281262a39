//! SVG export.
//!
//! Nodes are drawn as rounded rectangles colored by kind and outlined by
//! enabled state. Edges are drawn from their prebuilt path data; enabled
//! rule edges carry a dash animation so permitted traffic visibly flows,
//! while disabled rule edges keep the same dash, muted and static.

mod markers;

use log::{debug, info};
use svg::{
    Document,
    node::element::{Animate, Group, Path, Rectangle, Text},
};

use policygraph_core::{
    color::Color,
    geometry::{Bounds, Insets},
};

use super::{Error, Exporter};
use crate::{
    config::StyleConfig,
    scene::{RoutedEdge, Scene, SceneNode},
    topology::{EdgeCategory, NodeKind},
};

const MARGIN: f32 = 40.0;
const DISABLED_EDGE_ALPHA: f32 = 0.6;
const RULE_DASH: &str = "6 6";
const STRUCTURE_DASH: &str = "4 4";
const OFFLINE_DASH: &str = "2 3";

/// Builder for [`Svg`].
#[derive(Debug, Default)]
pub struct SvgBuilder<'a> {
    style: Option<&'a StyleConfig>,
}

impl<'a> SvgBuilder<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_style(mut self, style: &'a StyleConfig) -> Self {
        self.style = Some(style);
        self
    }

    /// Resolves the configured colors.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Style`] if a configured color does not parse.
    pub fn build(self) -> Result<Svg, Error> {
        let default_style = StyleConfig::default();
        let style = self.style.unwrap_or(&default_style);

        Ok(Svg {
            background: style.background_color().map_err(Error::Style)?,
            enabled: style.enabled_color().map_err(Error::Style)?,
            disabled: style.disabled_color().map_err(Error::Style)?,
        })
    }
}

/// SVG exporter.
#[derive(Debug, Clone)]
pub struct Svg {
    background: Option<Color>,
    enabled: Color,
    disabled: Color,
}

impl Svg {
    fn state_color(&self, enabled: bool) -> &Color {
        if enabled { &self.enabled } else { &self.disabled }
    }

    /// Bounds of every node, or an empty box for an empty scene.
    fn scene_bounds(scene: &Scene) -> Bounds {
        scene
            .nodes
            .iter()
            .map(SceneNode::bounds)
            .reduce(|acc, bounds| acc.merge(&bounds))
            .unwrap_or_default()
            .add_padding(Insets::uniform(MARGIN))
    }

    fn render_scene(&self, scene: &Scene) -> Document {
        let bounds = Self::scene_bounds(scene);
        debug!(
            width = bounds.width(),
            height = bounds.height();
            "SVG canvas size"
        );

        let mut doc = Document::new()
            .set(
                "viewBox",
                format!(
                    "{} {} {} {}",
                    bounds.min_x(),
                    bounds.min_y(),
                    bounds.width(),
                    bounds.height()
                ),
            )
            .set("width", bounds.width())
            .set("height", bounds.height());

        if let Some(background) = &self.background {
            doc = doc.add(
                Rectangle::new()
                    .set("x", bounds.min_x())
                    .set("y", bounds.min_y())
                    .set("width", bounds.width())
                    .set("height", bounds.height())
                    .set("fill", background),
            );
        }

        doc = doc.add(markers::create_marker_definitions(&self.enabled, &self.disabled));

        // Edges first so nodes cover their ends.
        let mut edges = Group::new().set("class", "edges");
        for edge in &scene.edges {
            edges = edges.add(self.render_edge(edge));
        }
        let mut nodes = Group::new().set("class", "nodes");
        for node in &scene.nodes {
            nodes = nodes.add(self.render_node(node));
        }

        doc.add(edges).add(nodes)
    }

    fn render_node(&self, node: &SceneNode) -> Group {
        let fill = match node.kind {
            NodeKind::Policy => "#ede9fe",
            NodeKind::Group => "#dbeafe",
            NodeKind::Peer => "#f1f5f9",
            NodeKind::Resource => "#fef3c7",
            NodeKind::Network => "#e0f2fe",
        };

        let shape = Rectangle::new()
            .set("x", node.x)
            .set("y", node.y)
            .set("width", node.width)
            .set("height", node.height)
            .set("rx", 8)
            .set("fill", fill)
            .set("stroke", self.state_color(node.enabled))
            .set("stroke-width", 1.5);
        // Offline peers and disabled resources get a broken outline.
        let shape = if node.online {
            shape
        } else {
            shape.set("stroke-dasharray", OFFLINE_DASH)
        };

        let label = Text::new(node.label.as_str())
            .set("x", node.x + node.width / 2.0)
            .set("y", node.y + node.height / 2.0)
            .set("text-anchor", "middle")
            .set("dominant-baseline", "middle")
            .set("font-family", "sans-serif")
            .set("font-size", 13);

        Group::new()
            .set("id", node.id.to_string())
            .add(shape)
            .add(label)
    }

    fn render_edge(&self, edge: &RoutedEdge) -> Group {
        let color = self.state_color(edge.enabled);
        let opacity = if edge.enabled {
            color.alpha()
        } else {
            color.alpha() * DISABLED_EDGE_ALPHA
        };
        let directed = matches!(
            edge.category,
            EdgeCategory::Bidirectional | EdgeCategory::DirectionalIn
        );
        let dash = match edge.category {
            EdgeCategory::Bidirectional | EdgeCategory::DirectionalIn => Some(RULE_DASH),
            EdgeCategory::Floating | EdgeCategory::FloatingStraight => Some(STRUCTURE_DASH),
            EdgeCategory::Simple => None,
        };
        let animated = directed && edge.enabled;

        let mut group = Group::new().set("id", edge.id.as_str());
        for data in &edge.paths {
            let mut path = Path::new()
                .set("d", data.as_str())
                .set("fill", "none")
                .set("stroke", color)
                .set("stroke-opacity", opacity)
                .set("stroke-width", if directed { 2 } else { 1 });
            if directed {
                path = path.set("marker-end", markers::marker_url(edge.enabled));
            }
            if let Some(dash) = dash {
                path = path.set("stroke-dasharray", dash);
            }
            if animated {
                path = path.add(
                    Animate::new()
                        .set("attributeName", "stroke-dashoffset")
                        .set("from", 24)
                        .set("to", 0)
                        .set("dur", "1s")
                        .set("repeatCount", "indefinite"),
                );
            }
            group = group.add(path);
        }

        if let Some(label) = &edge.label {
            group = group.add(
                Text::new(label.as_str())
                    .set("x", edge.label_position.x)
                    .set("y", edge.label_position.y)
                    .set("text-anchor", "middle")
                    .set("font-family", "sans-serif")
                    .set("font-size", 11)
                    .set("fill", color)
                    .set("fill-opacity", opacity),
            );
        }
        group
    }
}

impl Exporter for Svg {
    fn export_scene(&mut self, scene: &Scene) -> Result<String, Error> {
        info!(
            nodes_count = scene.nodes.len(),
            edges_count = scene.edges.len();
            "Rendering SVG"
        );
        let doc = self.render_scene(scene);
        debug!("SVG document rendered");
        Ok(doc.to_string())
    }
}
