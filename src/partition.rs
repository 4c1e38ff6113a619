//! Contiguous work partitioning of a flat index space across threads.
//!
//! Every operation splits `[0, len)` into exactly `nthreads` half-open ranges.
//! The base chunk is `len / nthreads`; the first `len % nthreads` ranges
//! (in thread-index order) take one extra element each.

use smallvec::SmallVec;
use std::ops::Range;

/// Stack-allocated list of ranges. 16 covers typical core counts.
pub type Ranges = SmallVec<[Range<usize>; 16]>;

/// Split `[0, len)` into `nthreads` disjoint, covering, contiguous ranges.
///
/// When `nthreads > len` the trailing ranges are empty (`start == end`).
/// The result depends only on `(len, nthreads)`, so order-dependent reductions
/// are reproducible for a fixed thread count.
///
/// `nthreads == 0` yields no ranges; callers validate the thread count first.
pub fn partition(len: usize, nthreads: usize) -> Ranges {
    let mut ranges = Ranges::with_capacity(nthreads);
    if nthreads == 0 {
        return ranges;
    }

    let base = len / nthreads;
    let remainder = len % nthreads;

    let mut start = 0usize;
    for i in 0..nthreads {
        let size = base + usize::from(i < remainder);
        ranges.push(start..start + size);
        start += size;
    }
    debug_assert_eq!(start, len);
    ranges
}
