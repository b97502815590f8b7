use std::path::Path;

use anyhow::{Context, Result};

use super::CONFIG_FILE;

/// Config template written by `pixdiff init`. Every key is commented out so
/// the file documents the available knobs and their defaults.
const CONFIG_TEMPLATE: &str = r##"# ─────────────────────────────────────────────────────────
# Comparison — all fields optional.
# ─────────────────────────────────────────────────────────
[diff]
# threshold = 30                    # per-channel delta (0-255) a pixel must exceed
# flag_color = "#ff000080"          # overlay color for changed pixels (#rrggbb[aa])
# size_policy = "resize-to-before"  # "require-equal" | "resize-to-before" | "resize-to-smaller"
# fit = "crop"                      # "crop" | "stretch"
# max_ratio = 1.0                   # largest change ratio that still exits 0

# ─────────────────────────────────────────────────────────
# Execution
# ─────────────────────────────────────────────────────────
[run]
# parallel = false                  # scan rows on all cores
"##;

/// Whether `dir` already holds a `config.toml`.
pub fn config_file_exists(dir: &Path) -> bool {
    dir.join(CONFIG_FILE).exists()
}

/// Write the config template into `dir`, creating it if needed.
pub fn write_template(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    let path = dir.join(CONFIG_FILE);
    std::fs::write(&path, CONFIG_TEMPLATE)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
