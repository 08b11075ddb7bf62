//! Bounded-concurrency batch scheduling

use futures::future::join_all;
use sift_domain::WorkBatch;
use std::future::Future;
use tracing::{debug, info};

/// Run `process` over every batch, at most `concurrency` at a time
///
/// Batches are taken in groups of `concurrency`. A group runs concurrently
/// and is awaited as a whole before the next group starts. Outputs are
/// flattened in batch order. If any batch in a group fails, the first
/// failure is returned once the group has settled and later groups are not
/// started. A concurrency of 0 is treated as 1.
pub async fn run_batches<'a, T, E, F, Fut>(
    batches: &'a [WorkBatch],
    concurrency: usize,
    process: F,
) -> Result<Vec<T>, E>
where
    F: Fn(&'a WorkBatch) -> Fut,
    Fut: Future<Output = Result<Vec<T>, E>>,
{
    let concurrency = concurrency.max(1);
    let group_count = batches.len().div_ceil(concurrency);
    let mut results = Vec::new();

    for (index, group) in batches.chunks(concurrency).enumerate() {
        debug!(group = index + 1, of = group_count, batches = group.len(), "Starting batch group");

        let futures: Vec<_> = group.iter().map(&process).collect();
        let group_results = join_all(futures).await;

        for result in group_results {
            results.extend(result?);
        }
    }

    info!(
        batches = batches.len(),
        groups = group_count,
        outputs = results.len(),
        "Batch scheduling complete"
    );

    Ok(results)
}
