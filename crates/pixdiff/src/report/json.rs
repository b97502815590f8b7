use anyhow::{Context, Result};
use pixdiff::{Bounds, format_color};
use serde::Serialize;

use super::Comparison;

#[derive(Debug, Serialize)]
struct Size {
    width: u32,
    height: u32,
}

#[derive(Debug, Serialize)]
struct DimensionChange {
    before: Size,
    after: Size,
}

#[derive(Debug, Serialize)]
struct Settings<'a> {
    threshold: u8,
    flag_color: String,
    size_policy: &'a str,
    fit: &'a str,
    max_ratio: f64,
    engine: &'a str,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    before: String,
    after: String,
    passed: bool,
    grid: Size,
    changed_pixels: u64,
    total_pixels: u64,
    change_ratio: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    changed_bounds: Option<Bounds>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimension_change: Option<DimensionChange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    overlay: Option<String>,
    elapsed_ms: f64,
    settings: Settings<'a>,
}

pub fn render(c: &Comparison<'_>) -> Result<String> {
    let r = c.result;
    let opts = &c.config.options;
    let (width, height) = r.overlay.dimensions();

    let report = JsonReport {
        before: c.before.display().to_string(),
        after: c.after.display().to_string(),
        passed: c.passed(),
        grid: Size { width, height },
        changed_pixels: r.changed_pixels,
        total_pixels: r.total_pixels,
        change_ratio: r.change_ratio,
        changed_bounds: r.changed_bounds,
        dimension_change: r.dimension_mismatch.map(|(bw, bh, aw, ah)| DimensionChange {
            before: Size {
                width: bw,
                height: bh,
            },
            after: Size {
                width: aw,
                height: ah,
            },
        }),
        overlay: c.overlay_path.map(|p| p.display().to_string()),
        elapsed_ms: c.elapsed.as_secs_f64() * 1000.0,
        settings: Settings {
            threshold: opts.threshold,
            flag_color: format_color(opts.flag_color),
            size_policy: opts.size_policy.as_str(),
            fit: opts.fit.as_str(),
            max_ratio: c.config.max_ratio,
            engine: c.engine,
        },
    };

    serde_json::to_string_pretty(&report).context("Failed to serialize report")
}
