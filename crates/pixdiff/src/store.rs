use std::path::Path;

use anyhow::{Context, Result};
use image::{ImageFormat, ImageReader, RgbaImage};
use tracing::debug;

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}

/// Decode any format the `image` crate recognises into RGBA8.
pub fn read_image(path: &Path) -> Result<RgbaImage> {
    let img = ImageReader::open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?
        .with_guessed_format()
        .with_context(|| format!("Failed to read {}", path.display()))?
        .decode()
        .with_context(|| format!("Failed to decode {}", path.display()))?
        .to_rgba8();
    debug!(path = %path.display(), width = img.width(), height = img.height(), "decoded image");
    Ok(img)
}

/// Write the overlay as PNG, creating parent directories as needed.
pub fn write_overlay(path: &Path, overlay: &RgbaImage) -> Result<()> {
    ensure_parent(path)?;
    overlay
        .save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
