//! Scene exporters.

pub mod svg;

use thiserror::Error;

use crate::scene::Scene;

/// Turns a [`Scene`] into an output document.
pub trait Exporter {
    /// Renders the scene and returns the document text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the scene cannot be rendered.
    fn export_scene(&mut self, scene: &Scene) -> Result<String, Error>;
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Render error: {0}")]
    Render(String),

    #[error("Style error: {0}")]
    Style(String),
}
