//! Thresholded pixel difference between a "before" and an "after" image.
//!
//! The engine resolves a common pixel grid for the two inputs, flags every
//! position whose R, G or B channel moved by more than the threshold, and
//! returns an overlay image together with the changed-pixel ratio.

use image::RgbaImage;
use serde::Serialize;
use thiserror::Error;

pub mod engine_parallel;
pub mod engine_pixel;
mod grid;
pub mod options;

pub use self::engine_parallel::ParallelEngine;
pub use self::engine_pixel::{PixelEngine, RowProgress, compare_with_progress};
pub use self::options::{DiffOptions, Fit, SizePolicy, format_color, parse_color};

/// Which input a [`DiffError`] refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Before,
    After,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Before => f.write_str("before"),
            Side::After => f.write_str("after"),
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiffError {
    #[error("dimension mismatch: {before_w}x{before_h} vs {after_w}x{after_h}")]
    DimensionMismatch {
        before_w: u32,
        before_h: u32,
        after_w: u32,
        after_h: u32,
    },

    #[error("{side} image is empty")]
    EmptyImage { side: Side },

    #[error("comparison cancelled after {rows_done} rows")]
    Cancelled { rows_done: u32 },
}

/// Smallest rectangle containing every changed pixel.
/// `x0`/`y0` are inclusive, `x1`/`y1` exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Bounds {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl Bounds {
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }

    pub fn union(self, other: Bounds) -> Bounds {
        Bounds {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DiffResult {
    /// "After" pixels with changed positions painted in the flag color.
    pub overlay: RgbaImage,
    /// Number of pixels that differ above the threshold.
    pub changed_pixels: u64,
    /// Number of pixels in the common grid. Always > 0.
    pub total_pixels: u64,
    /// 0.0 = identical, 1.0 = every pixel changed.
    pub change_ratio: f64,
    pub changed_bounds: Option<Bounds>,
    /// `Some((before_w, before_h, after_w, after_h))` when the inputs had
    /// different dimensions and the size policy accepted them.
    pub dimension_mismatch: Option<(u32, u32, u32, u32)>,
}

impl DiffResult {
    pub fn is_identical(&self) -> bool {
        self.changed_pixels == 0
    }
}

pub trait DiffEngine {
    fn name(&self) -> &str;
    fn diff(&self, before: &RgbaImage, after: &RgbaImage) -> Result<DiffResult, DiffError>;
}

/// Compare `before` against `after` with a sequential scan.
///
/// Pure: the inputs are only read and the same inputs always produce the
/// same result.
pub fn compare(
    before: &RgbaImage,
    after: &RgbaImage,
    options: &DiffOptions,
) -> Result<DiffResult, DiffError> {
    PixelEngine::new(*options).diff(before, after)
}
