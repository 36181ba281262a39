//! Command-line argument definitions for the policygraph CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, the output format,
//! optional node positions, configuration file selection, and logging
//! verbosity.

use clap::{Parser, ValueEnum};

/// What the CLI writes to the output file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// A rendered SVG document
    #[default]
    Svg,
    /// The routed scene as JSON, for a renderer of your own
    Json,
}

/// Command-line arguments for the policy graph renderer
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the input snapshot (JSON)
    #[arg(help = "Path to the input snapshot")]
    pub input: String,

    /// Path to the output file
    #[arg(short, long, default_value = "out.svg")]
    pub output: String,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Svg)]
    pub format: OutputFormat,

    /// Node positions (JSON object mapping `kind:id` to `{x, y, width, height}`)
    #[arg(short, long)]
    pub positions: Option<String>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}
