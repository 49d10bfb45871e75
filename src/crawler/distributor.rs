//! Work distribution
//!
//! Shuffles the enumerated combinations and cuts them into more chunks than
//! there are workers. Scrape time per combination varies a lot, so many
//! small chunks keep every worker busy until the end of the run.

use crate::record::{Chunk, Combination};
use rand::seq::SliceRandom;
use rand::Rng;

/// Chunk size for a combination count and worker layout
///
/// `len / (workers * multiplier)`, floored at 1 so small sets still split.
pub fn chunk_size(len: usize, worker_count: usize, multiplier: usize) -> usize {
    let divisor = worker_count.max(1).saturating_mul(multiplier.max(1));
    (len / divisor).max(1)
}

/// Shuffles and partitions combinations using the thread RNG
///
/// # Example
///
/// ```
/// use offer_sweep::crawler::distribute;
/// use offer_sweep::Combination;
///
/// let combinations = vec![Combination::new("Audi", "A4"), Combination::new("Audi", "A6")];
/// let chunks = distribute(combinations, 8, 10);
/// assert_eq!(chunks.len(), 2);
/// ```
pub fn distribute(
    combinations: Vec<Combination>,
    worker_count: usize,
    multiplier: usize,
) -> Vec<Chunk> {
    distribute_with_rng(combinations, worker_count, multiplier, &mut rand::thread_rng())
}

/// Shuffles and partitions combinations with the given RNG
pub fn distribute_with_rng<R: Rng + ?Sized>(
    mut combinations: Vec<Combination>,
    worker_count: usize,
    multiplier: usize,
    rng: &mut R,
) -> Vec<Chunk> {
    combinations.shuffle(rng);

    let size = chunk_size(combinations.len(), worker_count, multiplier);
    let chunks: Vec<Chunk> = combinations.chunks(size).map(<[Combination]>::to_vec).collect();

    tracing::info!(
        "Distributed {} combinations into {} chunks of up to {}",
        combinations.len(),
        chunks.len(),
        size
    );

    chunks
}
