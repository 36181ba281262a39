//! Policygraph - the connectivity graph engine behind a network access
//! control dashboard.
//!
//! Given a [`Snapshot`] of peers, groups, resources, networks, and policies,
//! the engine builds a [`Topology`] of who may reach whom, works out which
//! nodes are reachable by an enabled rule, and resolves floating edge
//! geometry against caller-supplied node placements.
//!
//! # Pipeline
//!
//! 1. [`Topology::build`] derives nodes and classified edges.
//! 2. [`propagate::compute_enabled_map`] computes the enabled flag of every
//!    node, memoized per snapshot revision by [`propagate::EnabledCache`].
//! 3. [`Scene::build`] resolves anchors and paths for every placed edge.
//! 4. An [`export::Exporter`] renders the scene.
//!
//! [`ControlCenter`] runs the whole pipeline with one configuration.

pub mod config;
pub mod export;
pub mod floating;
pub mod layout;
pub mod path;
pub mod policy;
pub mod propagate;
pub mod scene;
pub mod snapshot;
pub mod topology;

mod error;

pub use policygraph_core::{color, entity, geometry, identifier};

pub use error::PolicyGraphError;
pub use scene::Scene;
pub use snapshot::{Revision, Snapshot, SnapshotData};
pub use topology::Topology;

use std::sync::Arc;

use log::{debug, info};

use config::AppConfig;
use export::Exporter;
use layout::{ColumnLayout, Placements};
use propagate::{EnabledCache, EnabledMap};

/// Entry point for turning snapshots into scenes.
///
/// A control center owns the configuration and the enabled-map cache, so
/// rendering the same snapshot twice only propagates once. It is cheap to
/// share behind an [`Arc`]; the cache is internally synchronized.
///
/// # Examples
///
/// ```
/// use policygraph::{ControlCenter, Snapshot, SnapshotData, layout::Placements};
///
/// let snapshot = Snapshot::from(SnapshotData::default());
/// let center = ControlCenter::default();
///
/// let scene = center.scene(&snapshot, &Placements::new());
/// assert!(scene.nodes.is_empty());
/// ```
#[derive(Debug, Default)]
pub struct ControlCenter {
    config: AppConfig,
    cache: EnabledCache,
}

impl ControlCenter {
    /// Creates a control center with the given configuration.
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            cache: EnabledCache::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Decodes a JSON snapshot document.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyGraphError::Snapshot`] carrying `source` if the
    /// document does not decode.
    pub fn parse(&self, source: &str) -> Result<Snapshot, PolicyGraphError> {
        let data = SnapshotData::from_json(source)
            .map_err(|err| PolicyGraphError::new_snapshot_error(err, source))?;
        let snapshot = Snapshot::from(data);
        debug!(
            revision = snapshot.revision().value(),
            peers_count = snapshot.peers().len(),
            policies_count = snapshot.policies().len();
            "Snapshot decoded"
        );
        Ok(snapshot)
    }

    /// Builds the topology of a snapshot.
    pub fn topology<'a>(&self, snapshot: &'a Snapshot) -> Topology<'a> {
        Topology::build(snapshot, self.config.topology())
    }

    /// Returns the enabled map of a topology, reusing the cached one when
    /// it belongs to the same snapshot revision.
    pub fn enabled_map(&self, topology: &Topology<'_>) -> Arc<EnabledMap> {
        self.cache.get_or_compute(topology)
    }

    /// Builds the scene of a snapshot.
    ///
    /// Nodes missing from `placements` are laid out by [`ColumnLayout`].
    pub fn scene(&self, snapshot: &Snapshot, placements: &Placements) -> Scene {
        info!(revision = snapshot.revision().value(); "Building scene");
        let topology = self.topology(snapshot);
        let enabled = self.enabled_map(&topology);

        let placements = ColumnLayout::new(self.config.layout()).complete(&topology, placements);
        let scene = Scene::build(&topology, &placements, &enabled, self.config.geometry());
        debug!(
            nodes_count = scene.nodes.len(),
            edges_count = scene.edges.len();
            "Scene built"
        );
        scene
    }

    /// Renders a snapshot to an SVG document.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyGraphError::Style`] for an invalid configured color
    /// and [`PolicyGraphError::Export`] if rendering fails.
    pub fn render_svg(
        &self,
        snapshot: &Snapshot,
        placements: &Placements,
    ) -> Result<String, PolicyGraphError> {
        let scene = self.scene(snapshot, placements);

        let mut exporter = export::svg::SvgBuilder::new()
            .with_style(self.config.style())
            .build()
            .map_err(|err| match err {
                export::Error::Style(message) => PolicyGraphError::Style(message),
                other => other.into(),
            })?;
        let svg = exporter.export_scene(&scene)?;

        info!("SVG rendered successfully");
        Ok(svg)
    }
}
