//! Combination of per-thread partial results.
//!
//! Partials are combined on the calling thread, after the join, in
//! thread-index order. For a fixed thread count the result is therefore
//! deterministic; a different thread count may change the last bits of a sum.

/// Rule for merging scalar partials across threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Combine {
    Sum,
    Max,
    Min,
}

impl Combine {
    /// Neutral element; also what a thread with an empty range reports.
    pub(crate) fn identity(self) -> f64 {
        match self {
            Combine::Sum => 0.0,
            Combine::Max => f64::NEG_INFINITY,
            Combine::Min => f64::INFINITY,
        }
    }

    pub(crate) fn apply(self, acc: f64, partial: f64) -> f64 {
        match self {
            Combine::Sum => acc + partial,
            Combine::Max => acc.max(partial),
            Combine::Min => acc.min(partial),
        }
    }

    pub(crate) fn fold(self, partials: &[f64]) -> f64 {
        partials
            .iter()
            .fold(self.identity(), |acc, &p| self.apply(acc, p))
    }
}

/// Logical AND across per-thread boolean accumulators.
pub(crate) fn all(partials: &[bool]) -> bool {
    partials.iter().all(|&p| p)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_in_thread_order() {
        assert_eq!(Combine::Sum.fold(&[1.0, 2.5, -0.5]), 3.0);
        assert_eq!(Combine::Sum.fold(&[]), 0.0);
    }

    #[test]
    fn test_max_and_min() {
        assert_eq!(Combine::Max.fold(&[1.0, 7.0, 3.0]), 7.0);
        assert_eq!(Combine::Min.fold(&[1.0, -7.0, 3.0]), -7.0);
    }

    #[test]
    fn test_min_sentinel_from_empty_ranges() {
        let inf = Combine::Min.identity();
        assert_eq!(Combine::Min.fold(&[inf, 2.0, inf]), 2.0);
        assert_eq!(Combine::Min.fold(&[inf, inf]), f64::INFINITY);
    }

    #[test]
    fn test_all() {
        assert!(all(&[true, true, true]));
        assert!(!all(&[true, false, true]));
        assert!(all(&[]));
    }
}
