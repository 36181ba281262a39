//! Policygraph CLI library
//!
//! Reads a snapshot, runs it through the engine, and writes an SVG document
//! or the routed scene as JSON.

pub mod error_adapter;

mod args;
mod config;
mod positions;

pub use args::{Args, OutputFormat};

use std::fs;

use log::info;

use policygraph::{ControlCenter, PolicyGraphError, layout::Placements};

/// Run the policygraph CLI application
///
/// # Errors
///
/// Returns `PolicyGraphError` for:
/// - File I/O errors
/// - Configuration and positions loading errors
/// - Snapshot decoding errors
/// - Rendering errors
pub fn run(args: &Args) -> Result<(), PolicyGraphError> {
    info!(
        input_path = args.input,
        output_path = args.output,
        format:? = args.format;
        "Processing snapshot"
    );

    let app_config = config::load_config(args.config.as_ref())?;
    let center = ControlCenter::new(app_config);

    let source = fs::read_to_string(&args.input)?;
    let snapshot = center.parse(&source)?;

    let placements = match &args.positions {
        Some(path) => positions::load_positions(path)?,
        None => Placements::new(),
    };

    let output = match args.format {
        OutputFormat::Svg => center.render_svg(&snapshot, &placements)?,
        OutputFormat::Json => {
            let scene = center.scene(&snapshot, &placements);
            serde_json::to_string_pretty(&scene).map_err(|err| PolicyGraphError::Export(Box::new(err)))?
        }
    };

    fs::write(&args.output, output)?;

    info!(output_file = args.output; "Output written successfully");

    Ok(())
}
