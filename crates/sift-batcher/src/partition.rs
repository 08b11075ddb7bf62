//! Batch partitioning

use crate::error::BatchError;
use sift_domain::{ExtractedDocument, WorkBatch};
use tracing::debug;

/// Split documents into contiguous batches of at most `batch_size`
///
/// Input order is preserved and nothing is split or dropped. Every batch
/// gets a fresh id. An empty input yields no batches.
///
/// # Examples
///
/// ```
/// use sift_batcher::partition;
/// use sift_domain::ExtractedDocument;
///
/// let docs: Vec<_> = (0..45)
///     .map(|i| ExtractedDocument::new(format!("doc{}.txt", i), "text"))
///     .collect();
/// let batches = partition(docs, 20).unwrap();
/// let sizes: Vec<_> = batches.iter().map(|b| b.len()).collect();
/// assert_eq!(sizes, vec![20, 20, 5]);
/// ```
pub fn partition(
    documents: Vec<ExtractedDocument>,
    batch_size: usize,
) -> Result<Vec<WorkBatch>, BatchError> {
    if batch_size == 0 {
        return Err(BatchError::Config(
            "batch_size must be greater than 0".to_string(),
        ));
    }

    let total = documents.len();
    let mut batches = Vec::with_capacity(total.div_ceil(batch_size));
    let mut current = Vec::with_capacity(batch_size.min(total));

    for document in documents {
        current.push(document);
        if current.len() == batch_size {
            batches.push(WorkBatch::new(std::mem::take(&mut current)));
        }
    }
    if !current.is_empty() {
        batches.push(WorkBatch::new(current));
    }

    debug!(documents = total, batches = batches.len(), batch_size, "Partitioned documents");
    Ok(batches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn docs(n: usize) -> Vec<ExtractedDocument> {
        (0..n)
            .map(|i| ExtractedDocument::new(format!("doc{}.md", i), format!("content {}", i)))
            .collect()
    }

    #[test]
    fn test_fewer_than_batch_size_gives_one_batch() {
        let batches = partition(docs(3), 20).unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 3);
    }

    #[test]
    fn test_empty_input_gives_no_batches() {
        assert!(partition(Vec::new(), 20).unwrap().is_empty());
    }

    #[test]
    fn test_zero_batch_size_is_config_error() {
        assert!(matches!(partition(docs(2), 0), Err(BatchError::Config(_))));
    }

    #[test]
    fn test_exact_multiple() {
        let batches = partition(docs(40), 20).unwrap();
        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|b| b.len() == 20));
    }

    #[test]
    fn test_batch_ids_are_distinct() {
        let batches = partition(docs(10), 3).unwrap();
        for (i, a) in batches.iter().enumerate() {
            for b in batches.iter().skip(i + 1) {
                assert_ne!(a.id, b.id);
            }
        }
    }

    proptest! {
        #[test]
        fn prop_partition_preserves_order_and_bounds(n in 0usize..200, b in 1usize..40) {
            let input = docs(n);
            let expected: Vec<String> = input.iter().map(|d| d.path.clone()).collect();
            let batches = partition(input, b).unwrap();

            prop_assert_eq!(batches.len(), n.div_ceil(b));
            prop_assert!(batches.iter().all(|batch| batch.len() <= b && !batch.is_empty()));

            let flattened: Vec<String> = batches
                .iter()
                .flat_map(|batch| batch.documents.iter().map(|d| d.path.clone()))
                .collect();
            prop_assert_eq!(flattened, expected);
        }
    }
}
