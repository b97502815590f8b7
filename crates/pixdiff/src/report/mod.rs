pub mod json;
pub mod terminal;

use std::path::Path;
use std::time::Duration;

use pixdiff::DiffResult;

use crate::config::ResolvedRunConfig;

/// Everything a report needs about one finished comparison.
pub struct Comparison<'a> {
    pub before: &'a Path,
    pub after: &'a Path,
    pub engine: &'a str,
    pub config: &'a ResolvedRunConfig,
    pub result: &'a DiffResult,
    pub overlay_path: Option<&'a Path>,
    pub elapsed: Duration,
}

impl Comparison<'_> {
    pub fn passed(&self) -> bool {
        self.result.change_ratio <= self.config.max_ratio
    }
}
