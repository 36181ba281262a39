//! Configuration types for policy graph rendering.
//!
//! All sections implement [`serde::Deserialize`] and fall back to their
//! defaults field by field, so a partial TOML file is always valid.
//!
//! - [`AppConfig`] - Root combining every section.
//! - [`TopologyConfig`] - Which structural nodes and edges the builder adds.
//! - [`GeometryConfig`] - Path builder tuning.
//! - [`LayoutConfig`] - Fallback column layout dimensions.
//! - [`StyleConfig`] - Colors used by the SVG exporter.
//!
//! # Example
//!
//! ```
//! # use policygraph::config::AppConfig;
//! let config = AppConfig::default();
//! assert!(config.topology().expand_members());
//! assert!(config.style().enabled_color().is_ok());
//! ```

use serde::Deserialize;

use policygraph_core::color::Color;

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    topology: TopologyConfig,

    #[serde(default)]
    geometry: GeometryConfig,

    #[serde(default)]
    layout: LayoutConfig,

    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(
        topology: TopologyConfig,
        geometry: GeometryConfig,
        layout: LayoutConfig,
        style: StyleConfig,
    ) -> Self {
        Self {
            topology,
            geometry,
            layout,
            style,
        }
    }

    pub fn topology(&self) -> &TopologyConfig {
        &self.topology
    }

    pub fn geometry(&self) -> &GeometryConfig {
        &self.geometry
    }

    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

/// Controls which structural nodes and edges the topology builder adds on
/// top of rule edges.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    /// Add every member of a referenced group as a node, even when no rule
    /// names the member directly.
    expand_members: bool,

    /// Add the owning network of each resource node, with an edge to it.
    show_networks: bool,

    /// Add one node per policy, linked to the sources of its rules.
    policy_nodes: bool,

    /// Skip rule sides that carry both a group list and a single reference
    /// instead of letting the reference win.
    strict_rules: bool,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            expand_members: true,
            show_networks: true,
            policy_nodes: false,
            strict_rules: false,
        }
    }
}

impl TopologyConfig {
    pub fn new(
        expand_members: bool,
        show_networks: bool,
        policy_nodes: bool,
        strict_rules: bool,
    ) -> Self {
        Self {
            expand_members,
            show_networks,
            policy_nodes,
            strict_rules,
        }
    }

    pub fn expand_members(&self) -> bool {
        self.expand_members
    }

    pub fn show_networks(&self) -> bool {
        self.show_networks
    }

    pub fn policy_nodes(&self) -> bool {
        self.policy_nodes
    }

    pub fn strict_rules(&self) -> bool {
        self.strict_rules
    }
}

/// Tuning for the edge path builders.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// Bezier control point strength used when the control would point
    /// away from the other endpoint.
    bezier_curvature: f32,

    /// Distance an orthogonal path travels straight out of its anchor
    /// before its first turn.
    smooth_step_offset: f32,

    /// Corner radius of orthogonal paths.
    smooth_step_radius: f32,

    /// Perpendicular separation of the two arcs of a bidirectional edge.
    bidirectional_offset: f32,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            bezier_curvature: 0.25,
            smooth_step_offset: 20.0,
            smooth_step_radius: 5.0,
            bidirectional_offset: 6.0,
        }
    }
}

impl GeometryConfig {
    pub fn new(
        bezier_curvature: f32,
        smooth_step_offset: f32,
        smooth_step_radius: f32,
        bidirectional_offset: f32,
    ) -> Self {
        Self {
            bezier_curvature,
            smooth_step_offset,
            smooth_step_radius,
            bidirectional_offset,
        }
    }

    pub fn bezier_curvature(&self) -> f32 {
        self.bezier_curvature
    }

    pub fn smooth_step_offset(&self) -> f32 {
        self.smooth_step_offset
    }

    pub fn smooth_step_radius(&self) -> f32 {
        self.smooth_step_radius
    }

    pub fn bidirectional_offset(&self) -> f32 {
        self.bidirectional_offset
    }
}

/// Dimensions of the fallback column layout, used for nodes that have no
/// caller-supplied placement.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    node_width: f32,
    node_height: f32,
    column_gap: f32,
    row_gap: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 180.0,
            node_height: 48.0,
            column_gap: 160.0,
            row_gap: 32.0,
        }
    }
}

impl LayoutConfig {
    pub fn new(node_width: f32, node_height: f32, column_gap: f32, row_gap: f32) -> Self {
        Self {
            node_width,
            node_height,
            column_gap,
            row_gap,
        }
    }

    pub fn node_width(&self) -> f32 {
        self.node_width
    }

    pub fn node_height(&self) -> f32 {
        self.node_height
    }

    pub fn column_gap(&self) -> f32 {
        self.column_gap
    }

    pub fn row_gap(&self) -> f32 {
        self.row_gap
    }
}

/// Visual styling for exported scenes.
///
/// Colors are kept as strings until use so that a bad value is reported
/// with the field it came from.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StyleConfig {
    #[serde(default)]
    background_color: Option<String>,

    #[serde(default)]
    enabled_color: Option<String>,

    #[serde(default)]
    disabled_color: Option<String>,
}

impl StyleConfig {
    /// Returns the parsed background [`Color`], or `None` for a transparent
    /// background.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured string is not a valid color.
    pub fn background_color(&self) -> Result<Option<Color>, String> {
        self.background_color
            .as_ref()
            .map(|color| Color::new(color))
            .transpose()
            .map_err(|err| format!("Invalid background color in config: {err}"))
    }

    /// Returns the stroke [`Color`] of enabled edges.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured string is not a valid color.
    pub fn enabled_color(&self) -> Result<Color, String> {
        parse_or(self.enabled_color.as_deref(), "#16a34a")
            .map_err(|err| format!("Invalid enabled color in config: {err}"))
    }

    /// Returns the stroke [`Color`] of disabled edges.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured string is not a valid color.
    pub fn disabled_color(&self) -> Result<Color, String> {
        parse_or(self.disabled_color.as_deref(), "#9ca3af")
            .map_err(|err| format!("Invalid disabled color in config: {err}"))
    }
}

fn parse_or(value: Option<&str>, fallback: &str) -> Result<Color, String> {
    Color::new(value.unwrap_or(fallback))
}
