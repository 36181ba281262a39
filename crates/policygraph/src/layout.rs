//! Node placement.
//!
//! The engine does not own layout: callers normally hand in a
//! [`Placements`] map of node bounds. [`ColumnLayout`] fills in whatever is
//! missing with a simple deterministic arrangement, one column per
//! [`NodeKind`], so a scene can always be rendered.

use std::collections::HashMap;

use log::debug;

use policygraph_core::geometry::{Bounds, Point, Size};

use crate::{
    config::LayoutConfig,
    topology::{NodeId, NodeKind, Topology},
};

/// Bounds of each placed node.
pub type Placements = HashMap<NodeId, Bounds>;

/// Column-per-kind fallback layout.
#[derive(Debug, Clone)]
pub struct ColumnLayout {
    node_size: Size,
    column_gap: f32,
    row_gap: f32,
}

impl ColumnLayout {
    pub fn new(config: &LayoutConfig) -> Self {
        Self {
            node_size: Size::new(config.node_width(), config.node_height()),
            column_gap: config.column_gap(),
            row_gap: config.row_gap(),
        }
    }

    /// Returns placements for every node of the topology.
    ///
    /// Nodes present in `given` keep their bounds. The rest are stacked in
    /// their kind's column, ordered by label and then id, below any given
    /// node of the same kind. Columns run left to right in [`NodeKind`]
    /// order.
    pub fn complete(&self, topology: &Topology<'_>, given: &Placements) -> Placements {
        let mut placements = Placements::with_capacity(topology.node_count());
        let mut missing: HashMap<NodeKind, Vec<(String, NodeId)>> = HashMap::new();

        for (_, node) in topology.nodes() {
            let id = node.node_id();
            match given.get(&id) {
                Some(&bounds) => {
                    placements.insert(id, bounds);
                }
                None => missing.entry(id.kind()).or_default().push((node.label(), id)),
            }
        }

        // Kinds with no node at all do not take up a column.
        let kinds = NodeKind::ALL
            .into_iter()
            .filter(|&kind| topology.node_ids().iter().any(|id| id.kind() == kind));

        let mut placed = 0;
        for (column, kind) in kinds.enumerate() {
            let Some(mut column_nodes) = missing.remove(&kind) else {
                continue;
            };
            column_nodes.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.to_string().cmp(&b.1.to_string())));

            let x = column as f32 * (self.node_size.width() + self.column_gap);
            let start_y = placements
                .iter()
                .filter(|(id, _)| id.kind() == kind)
                .map(|(_, bounds)| bounds.max_y() + self.row_gap)
                .fold(0.0_f32, f32::max);

            for (row, (_, id)) in column_nodes.into_iter().enumerate() {
                let y = start_y + row as f32 * (self.node_size.height() + self.row_gap);
                placements.insert(id, Bounds::new_from_top_left(Point::new(x, y), self.node_size));
                placed += 1;
            }
        }

        if placed > 0 {
            debug!(placed, given = given.len(); "Filled in missing placements");
        }
        placements
    }
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self::new(&LayoutConfig::default())
    }
}
