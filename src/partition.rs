use std::ops::Range;

/// Range of indices in `0..total` owned by `rank` out of `workers`.
///
/// The first `total % workers` ranks take one extra index each, so slice sizes never differ
/// by more than one and the ranges tile `0..total` in rank order.
pub fn slice_range(total: usize, workers: usize, rank: usize) -> Range<usize> {
    assert!(workers > 0, "slice_range needs at least one worker");
    let chunk = total / workers;
    let remainder = total % workers;
    let start = rank * chunk + std::cmp::min(rank, remainder);
    let end = start + chunk + if rank < remainder { 1 } else { 0 };
    start..end
}

pub fn slice_sizes(total: usize, workers: usize) -> Vec<usize> {
    (0..workers)
        .map(|rank| slice_range(total, workers, rank).len())
        .collect()
}
