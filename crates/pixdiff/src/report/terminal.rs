use std::time::Duration;

use pixdiff::format_color;

use super::Comparison;

pub fn format_duration(d: Duration) -> String {
    let ms = d.as_millis();
    if ms < 1000 {
        format!("{ms}ms")
    } else {
        format!("{:.1}s", d.as_secs_f64())
    }
}

/// Ratio as a percentage. Tiny non-zero ratios never round down to "0.00%".
pub fn format_percent(ratio: f64) -> String {
    let pct = ratio * 100.0;
    if ratio > 0.0 && pct < 0.01 {
        "<0.01%".to_string()
    } else {
        format!("{pct:.2}%")
    }
}

/// The colored PASS/FAIL headline.
pub fn status_line(c: &Comparison<'_>) -> String {
    let r = c.result;
    let time_suffix = format!("  \x1b[2m{}\x1b[0m", format_duration(c.elapsed));
    let name = c.after.display();

    if r.is_identical() {
        format!("  \x1b[32mSAME\x1b[0m  {name}{time_suffix}")
    } else if c.passed() {
        format!(
            "  \x1b[32mPASS\x1b[0m  {name}  ({} pixels, {}){time_suffix}",
            r.changed_pixels,
            format_percent(r.change_ratio)
        )
    } else {
        format!(
            "  \x1b[31mFAIL\x1b[0m  {name}  ({} pixels, {} > {}){time_suffix}",
            r.changed_pixels,
            format_percent(r.change_ratio),
            format_percent(c.config.max_ratio)
        )
    }
}

pub fn render(c: &Comparison<'_>) -> String {
    let r = c.result;
    let opts = &c.config.options;
    let (w, h) = r.overlay.dimensions();

    let mut lines = vec![
        status_line(c),
        String::new(),
        format!("Before:     {}", c.before.display()),
        format!("After:      {}", c.after.display()),
    ];
    lines.push(match r.dimension_mismatch {
        Some((bw, bh, aw, ah)) => format!(
            "Size:       \x1b[33m{bw}x{bh} -> {aw}x{ah}\x1b[0m, compared on {w}x{h} ({})",
            opts.size_policy.as_str()
        ),
        None => format!("Size:       {w}x{h}"),
    });
    lines.push(format!(
        "Changed:    {} of {} pixels ({})",
        r.changed_pixels,
        r.total_pixels,
        format_percent(r.change_ratio)
    ));
    if let Some(b) = r.changed_bounds {
        lines.push(format!(
            "Region:     {}x{} at ({}, {})",
            b.width(),
            b.height(),
            b.x0,
            b.y0
        ));
    }
    lines.push(format!(
        "Settings:   threshold {}, flag {}, fit {}, engine {}",
        opts.threshold,
        format_color(opts.flag_color),
        opts.fit.as_str(),
        c.engine
    ));
    if let Some(path) = c.overlay_path {
        lines.push(format!("Overlay:    {}", path.display()));
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

pub fn print(c: &Comparison<'_>) {
    print!("{}", render(c));
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use image::{Rgba, RgbaImage};
    use pixdiff::{DiffOptions, compare};

    use super::*;
    use crate::config::ResolvedRunConfig;

    fn config(max_ratio: f64) -> ResolvedRunConfig {
        ResolvedRunConfig {
            options: DiffOptions::default(),
            max_ratio,
            parallel: false,
        }
    }

    #[test]
    fn durations() {
        assert_eq!(format_duration(Duration::from_millis(12)), "12ms");
        assert_eq!(format_duration(Duration::from_millis(1500)), "1.5s");
    }

    #[test]
    fn percentages() {
        assert_eq!(format_percent(0.0), "0.00%");
        assert_eq!(format_percent(0.25), "25.00%");
        assert_eq!(format_percent(1.0), "100.00%");
        assert_eq!(format_percent(0.00001), "<0.01%");
    }

    #[test]
    fn report_mentions_mismatch_and_region() {
        let before = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        let after = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 255]));
        let result = compare(&before, &after, &DiffOptions::default()).unwrap();
        let cfg = config(0.5);
        let c = Comparison {
            before: Path::new("a.png"),
            after: Path::new("b.png"),
            engine: "pixel",
            config: &cfg,
            result: &result,
            overlay_path: Some(Path::new("out.png")),
            elapsed: Duration::from_millis(3),
        };
        let text = render(&c);
        // Out-of-bounds pixels are transparent black, and black vs black is unchanged.
        assert!(text.contains("SAME"));
        assert!(text.contains("4x4 -> 2x2"));
        assert!(text.contains("Overlay:    out.png"));
        assert!(text.contains("#ff000080"));
        assert!(text.ends_with("Overlay:    out.png\n"));
        assert_eq!(text.lines().nth(1), Some(""));
    }

    #[test]
    fn fail_line_when_ratio_exceeds_limit() {
        let before = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 255]));
        let mut after = before.clone();
        after.put_pixel(0, 0, Rgba([255, 0, 0, 255]));
        let result = compare(&before, &after, &DiffOptions::default()).unwrap();

        let strict = config(0.1);
        let c = Comparison {
            before: Path::new("a.png"),
            after: Path::new("b.png"),
            engine: "pixel",
            config: &strict,
            result: &result,
            overlay_path: None,
            elapsed: Duration::ZERO,
        };
        let line = status_line(&c);
        assert!(line.contains("FAIL"));
        assert!(line.contains("1 pixels, 50.00% > 10.00%"));
        assert!(render(&c).contains("Region:     1x1 at (0, 0)"));

        let lenient = config(1.0);
        let c = Comparison {
            config: &lenient,
            ..c
        };
        assert!(status_line(&c).contains("PASS"));
    }
}
