use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use pixdiff::{DiffEngine, ParallelEngine, PixelEngine};
use tracing::{debug, info};

use crate::config::ResolvedRunConfig;
use crate::report::{Comparison, json, terminal};
use crate::store;

fn engine_for(config: &ResolvedRunConfig) -> Box<dyn DiffEngine> {
    if config.parallel {
        Box::new(ParallelEngine::new(config.options))
    } else {
        Box::new(PixelEngine::new(config.options))
    }
}

/// `pixdiff compare` — decode, diff, write overlay, report.
/// Returns exit code: 0 = change ratio within `max_ratio`, 1 = above it.
pub fn compare(
    config: ResolvedRunConfig,
    before: &Path,
    after: &Path,
    output: Option<&Path>,
    as_json: bool,
) -> Result<i32> {
    let before_img = store::read_image(before)?;
    let after_img = store::read_image(after)?;

    let engine = engine_for(&config);
    debug!(engine = engine.name(), options = ?config.options, "comparing");

    let start = Instant::now();
    let result = engine.diff(&before_img, &after_img).with_context(|| {
        format!(
            "Failed to compare {} with {}",
            before.display(),
            after.display()
        )
    })?;
    let elapsed = start.elapsed();

    if let Some(path) = output {
        store::write_overlay(path, &result.overlay)?;
        info!(path = %path.display(), "overlay written");
    }

    let comparison = Comparison {
        before,
        after,
        engine: engine.name(),
        config: &config,
        result: &result,
        overlay_path: output,
        elapsed,
    };

    if as_json {
        println!("{}", json::render(&comparison)?);
    } else {
        terminal::print(&comparison);
    }

    Ok(if comparison.passed() { 0 } else { 1 })
}
