// Parallel aggregation using rayon

use super::{FileFacts, GlobalGraphs};
use rayon::prelude::*;
use tracing::info;

/// Aggregate per-file facts as a rayon tree reduction.
///
/// Union merging makes the result identical to [`super::Aggregator::from_files`].
pub fn aggregate_parallel(files: &[FileFacts]) -> GlobalGraphs {
    info!("Aggregating facts from {} files in parallel...", files.len());

    files
        .par_iter()
        .fold(GlobalGraphs::new, |mut graphs, file| {
            graphs.add_file(&file.path, &file.facts);
            graphs
        })
        .reduce(GlobalGraphs::new, |mut left, right| {
            left.merge(right);
            left
        })
}
