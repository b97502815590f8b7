use std::ops::ControlFlow;

use image::RgbaImage;
use tracing::debug;

use crate::grid::{Grid, Tally};
use crate::{DiffEngine, DiffError, DiffOptions, DiffResult};

/// Sequential row-by-row scan.
#[derive(Clone, Copy, Debug, Default)]
pub struct PixelEngine {
    pub options: DiffOptions,
}

impl PixelEngine {
    pub fn new(options: DiffOptions) -> Self {
        Self { options }
    }
}

impl DiffEngine for PixelEngine {
    fn name(&self) -> &str {
        "pixel"
    }

    fn diff(&self, before: &RgbaImage, after: &RgbaImage) -> Result<DiffResult, DiffError> {
        compare_with_progress(before, after, &self.options, u32::MAX, |_| {
            ControlFlow::Continue(())
        })
    }
}

/// Passed to the progress callback of [`compare_with_progress`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowProgress {
    pub rows_done: u32,
    pub total_rows: u32,
}

/// Sequential comparison that hands control to `check` after every
/// `rows_per_check` rows. Returning `ControlFlow::Break` stops the scan with
/// [`DiffError::Cancelled`].
///
/// `check` is not called once the last row is done.
pub fn compare_with_progress<F>(
    before: &RgbaImage,
    after: &RgbaImage,
    options: &DiffOptions,
    rows_per_check: u32,
    mut check: F,
) -> Result<DiffResult, DiffError>
where
    F: FnMut(RowProgress) -> ControlFlow<()>,
{
    let grid = Grid::resolve(before, after, options)?;
    let rows_per_check = rows_per_check.max(1);

    let mut overlay = RgbaImage::new(grid.width, grid.height);
    let row_len = grid.row_len();
    let buf: &mut [u8] = &mut overlay;

    let mut tally = Tally::default();
    for (y, row) in buf.chunks_exact_mut(row_len).enumerate() {
        let y = y as u32;
        tally = tally.merged(grid.classify_row(y, row, options));

        let rows_done = y + 1;
        if rows_done % rows_per_check == 0 && rows_done < grid.height {
            let progress = RowProgress {
                rows_done,
                total_rows: grid.height,
            };
            if check(progress).is_break() {
                debug!(rows_done, total_rows = grid.height, "comparison cancelled");
                return Err(DiffError::Cancelled { rows_done });
            }
        }
    }

    debug!(
        changed = tally.changed,
        total = grid.total_pixels(),
        "pixel scan finished"
    );
    Ok(tally.finish(overlay, &grid))
}
