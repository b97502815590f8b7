use std::borrow::Cow;

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use tracing::debug;

use crate::options::{DiffOptions, Fit, SizePolicy};
use crate::{Bounds, DiffError, DiffResult, Side};

/// Read value for positions outside an image.
pub(crate) const TRANSPARENT_BLACK: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Both inputs placed on the common comparison grid.
pub(crate) struct Grid<'a> {
    pub before: Cow<'a, RgbaImage>,
    pub after: Cow<'a, RgbaImage>,
    pub width: u32,
    pub height: u32,
    pub dimension_mismatch: Option<(u32, u32, u32, u32)>,
}

impl<'a> Grid<'a> {
    pub fn resolve(
        before: &'a RgbaImage,
        after: &'a RgbaImage,
        options: &DiffOptions,
    ) -> Result<Self, DiffError> {
        for (side, img) in [(Side::Before, before), (Side::After, after)] {
            if img.width() == 0 || img.height() == 0 {
                return Err(DiffError::EmptyImage { side });
            }
        }

        let dimension_mismatch = if before.dimensions() != after.dimensions() {
            Some((before.width(), before.height(), after.width(), after.height()))
        } else {
            None
        };

        let (width, height) = match options.size_policy {
            SizePolicy::RequireEqual => {
                if let Some((before_w, before_h, after_w, after_h)) = dimension_mismatch {
                    return Err(DiffError::DimensionMismatch {
                        before_w,
                        before_h,
                        after_w,
                        after_h,
                    });
                }
                before.dimensions()
            }
            SizePolicy::ResizeToBefore => before.dimensions(),
            SizePolicy::ResizeToSmaller => (
                before.width().min(after.width()),
                before.height().min(after.height()),
            ),
        };

        debug!(
            width,
            height,
            policy = options.size_policy.as_str(),
            fit = options.fit.as_str(),
            mismatch = dimension_mismatch.is_some(),
            "resolved comparison grid"
        );

        let (before, after) = match options.fit {
            Fit::Crop => (Cow::Borrowed(before), Cow::Borrowed(after)),
            Fit::Stretch => (
                stretch_to(before, width, height),
                stretch_to(after, width, height),
            ),
        };

        Ok(Self {
            before,
            after,
            width,
            height,
            dimension_mismatch,
        })
    }

    pub fn total_pixels(&self) -> u64 {
        (self.width as u64) * (self.height as u64)
    }

    /// Byte length of one overlay row.
    pub fn row_len(&self) -> usize {
        self.width as usize * 4
    }

    /// Classify row `y`, writing the overlay pixels into `row`.
    pub fn classify_row(&self, y: u32, row: &mut [u8], options: &DiffOptions) -> Tally {
        let mut tally = Tally::default();
        let mut first_x = None;
        let mut last_x = 0;

        for (x, out) in (0..self.width).zip(row.chunks_exact_mut(4)) {
            let b = sample(&self.before, x, y);
            let a = sample(&self.after, x, y);

            let pixel = if is_changed(&b, &a, options.threshold) {
                tally.changed += 1;
                first_x.get_or_insert(x);
                last_x = x;
                options.flag_color
            } else {
                a
            };
            out.copy_from_slice(&pixel.0);
        }

        tally.bounds = first_x.map(|x0| Bounds {
            x0,
            y0: y,
            x1: last_x + 1,
            y1: y + 1,
        });
        tally
    }
}

/// Changed-pixel count and extent for a set of rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Tally {
    pub changed: u64,
    pub bounds: Option<Bounds>,
}

impl Tally {
    /// Order-independent merge, so shards can be combined in any order.
    pub fn merged(self, other: Tally) -> Tally {
        let bounds = match (self.bounds, other.bounds) {
            (Some(a), Some(b)) => Some(a.union(b)),
            (a, b) => a.or(b),
        };
        Tally {
            changed: self.changed + other.changed,
            bounds,
        }
    }

    pub fn finish(self, overlay: RgbaImage, grid: &Grid<'_>) -> DiffResult {
        let total_pixels = grid.total_pixels();
        DiffResult {
            overlay,
            changed_pixels: self.changed,
            total_pixels,
            change_ratio: self.changed as f64 / total_pixels as f64,
            changed_bounds: self.bounds,
            dimension_mismatch: grid.dimension_mismatch,
        }
    }
}

fn stretch_to(img: &RgbaImage, width: u32, height: u32) -> Cow<'_, RgbaImage> {
    if img.dimensions() == (width, height) {
        Cow::Borrowed(img)
    } else {
        Cow::Owned(imageops::resize(img, width, height, FilterType::Nearest))
    }
}

fn sample(img: &RgbaImage, x: u32, y: u32) -> Rgba<u8> {
    img.get_pixel_checked(x, y)
        .copied()
        .unwrap_or(TRANSPARENT_BLACK)
}

/// Alpha is not compared.
fn is_changed(before: &Rgba<u8>, after: &Rgba<u8>, threshold: u8) -> bool {
    before.0[..3]
        .iter()
        .zip(&after.0[..3])
        .any(|(&b, &a)| b.abs_diff(a) > threshold)
}
