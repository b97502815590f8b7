use image::RgbaImage;
use rayon::prelude::*;
use tracing::debug;

use crate::grid::{Grid, Tally};
use crate::{DiffEngine, DiffError, DiffOptions, DiffResult};

/// Rows are classified independently on the rayon pool and the per-row
/// tallies summed. Produces the same result as [`crate::PixelEngine`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ParallelEngine {
    pub options: DiffOptions,
}

impl ParallelEngine {
    pub fn new(options: DiffOptions) -> Self {
        Self { options }
    }
}

impl DiffEngine for ParallelEngine {
    fn name(&self) -> &str {
        "parallel"
    }

    fn diff(&self, before: &RgbaImage, after: &RgbaImage) -> Result<DiffResult, DiffError> {
        let grid = Grid::resolve(before, after, &self.options)?;

        let mut overlay = RgbaImage::new(grid.width, grid.height);
        let row_len = grid.row_len();
        let buf: &mut [u8] = &mut overlay;

        debug!(
            rows = grid.height,
            threads = rayon::current_num_threads(),
            "parallel scan started"
        );

        let tally = buf
            .par_chunks_exact_mut(row_len)
            .enumerate()
            .map(|(y, row)| grid.classify_row(y as u32, row, &self.options))
            .reduce(Tally::default, Tally::merged);

        Ok(tally.finish(overlay, &grid))
    }
}
