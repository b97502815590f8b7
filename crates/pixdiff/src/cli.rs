use std::path::PathBuf;

use clap::{Parser, Subcommand};
use image::Rgba;
use pixdiff::{Fit, SizePolicy};

use crate::config;

fn parse_max_ratio(s: &str) -> Result<f64, String> {
    let v: f64 = s.parse().map_err(|e| format!("{e}"))?;
    config::validate_max_ratio(v)
}

fn parse_flag_color(s: &str) -> Result<Rgba<u8>, String> {
    pixdiff::parse_color(s)
}

fn parse_size_policy(s: &str) -> Result<SizePolicy, String> {
    s.parse()
}

fn parse_fit(s: &str) -> Result<Fit, String> {
    s.parse()
}

#[derive(Parser)]
#[command(
    name = "pixdiff",
    about = "Highlight the pixels that changed between a before and an after image"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create .pixdiff/config.toml with commented defaults
    Init {
        /// Overwrite an existing config
        #[arg(long, short = 'f')]
        force: bool,
    },

    /// Compare two images and report the changed-pixel ratio (exit 0/1)
    Compare {
        /// "Before" image
        before: PathBuf,
        /// "After" image
        after: PathBuf,
        /// Write the overlay image (PNG) to this path
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// Per-channel difference (0-255) a pixel must exceed to count as changed
        #[arg(long, short = 't')]
        threshold: Option<u8>,
        /// Overlay color for changed pixels: #rrggbb or #rrggbbaa
        #[arg(long, value_parser = parse_flag_color)]
        flag_color: Option<Rgba<u8>>,
        /// require-equal | resize-to-before | resize-to-smaller
        #[arg(long, value_parser = parse_size_policy)]
        size_policy: Option<SizePolicy>,
        /// crop | stretch
        #[arg(long, value_parser = parse_fit)]
        fit: Option<Fit>,
        /// Max allowed change ratio (0.0–1.0). Comparisons within it exit 0.
        #[arg(long, value_parser = parse_max_ratio)]
        max_ratio: Option<f64>,
        /// Scan rows on all cores
        #[arg(long, short = 'p')]
        parallel: bool,
        /// Print a JSON report instead of the terminal summary
        #[arg(long)]
        json: bool,
    },
}
