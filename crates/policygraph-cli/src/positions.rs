//! Node positions saved by a renderer.
//!
//! The positions file is a JSON object keyed by node id (`group:engineering`,
//! `peer:ch8i4ug6`) whose values hold the top-left corner and size of the
//! node. Nodes absent from the file are placed by the engine's default
//! layout.

use std::{collections::HashMap, fs, path::Path, str::FromStr};

use log::{debug, warn};
use serde::Deserialize;

use policygraph::{
    PolicyGraphError,
    geometry::{Bounds, Point, Size},
    layout::Placements,
    topology::NodeId,
};

#[derive(Debug, Clone, Copy, Deserialize)]
struct Placement {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

/// Load node placements from a positions file.
///
/// Keys that are not valid node ids are skipped with a warning.
///
/// # Errors
///
/// Returns [`PolicyGraphError::Io`] if the file cannot be read and
/// [`PolicyGraphError::Config`] if it is not a positions object.
pub fn load_positions(path: impl AsRef<Path>) -> Result<Placements, PolicyGraphError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let raw: HashMap<String, Placement> = serde_json::from_str(&content).map_err(|err| {
        PolicyGraphError::Config(format!("Invalid positions file {}: {err}", path.display()))
    })?;

    let mut placements = Placements::with_capacity(raw.len());
    for (key, placement) in raw {
        match NodeId::from_str(&key) {
            Ok(id) => {
                let bounds = Bounds::new_from_top_left(
                    Point::new(placement.x, placement.y),
                    Size::new(placement.width, placement.height),
                );
                placements.insert(id, bounds);
            }
            Err(err) => warn!(key, err:err; "Skipping position with an invalid node id"),
        }
    }

    debug!(placements_count = placements.len(); "Positions loaded");
    Ok(placements)
}
