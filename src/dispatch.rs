//! Per-call work dispatch.
//!
//! Each operation builds one [`WorkItem`] per thread from the partition of
//! `[0, len)`, runs its kernel over every item, and joins before returning.
//! With the `parallel` feature the items are spawned on the rayon pool inside
//! a `rayon::scope`; otherwise they run in thread-index order on the caller.
//!
//! Destination storage is handed out with `split_at_mut`, so every item owns
//! a disjoint sub-slice of the output and no locking is involved.

use smallvec::SmallVec;
use std::ops::Range;

use crate::maybe_sync::{MaybeSend, MaybeSync};
use crate::partition::partition;

/// Up to four operands participate in any kernel.
pub(crate) type Inputs<'a> = SmallVec<[&'a [f64]; 4]>;

/// Partial results, one per thread, in thread-index order.
pub(crate) type Partials<P> = SmallVec<[P; 16]>;

/// Thread-local data for one worker in one call.
///
/// `inputs` and `output` are already narrowed to `range`, so kernels index
/// from zero. `partial` starts at the reduction identity and is read back by
/// the caller after the join.
pub(crate) struct WorkItem<'a, P> {
    pub(crate) range: Range<usize>,
    pub(crate) inputs: Inputs<'a>,
    pub(crate) output: &'a mut [f64],
    pub(crate) partial: P,
}

/// Partition `[0, len)` over `nthreads` items and run `kernel` on each.
///
/// Every slice in `inputs` and `output` (when present) must have length `len`;
/// operand validation happens in the caller before this is reached.
pub(crate) fn dispatch<'a, P, K>(
    op: &'static str,
    len: usize,
    nthreads: usize,
    inputs: &[&'a [f64]],
    output: Option<&'a mut [f64]>,
    init: P,
    kernel: K,
) -> Partials<P>
where
    P: Clone + MaybeSend,
    K: Fn(&mut WorkItem<'_, P>) + MaybeSync,
{
    debug_assert!(inputs.iter().all(|x| x.len() == len));
    debug_assert!(output.as_ref().map_or(true, |z| z.len() == len));
    log::trace!("{op}: len={len} nthreads={nthreads}");

    let ranges = partition(len, nthreads);
    let mut items: Vec<WorkItem<'a, P>> = Vec::with_capacity(ranges.len());
    let mut rest = output;

    for range in ranges {
        let out: &'a mut [f64] = match rest.take() {
            Some(buf) => {
                let (head, tail) = buf.split_at_mut(range.len());
                rest = Some(tail);
                head
            }
            None => Default::default(),
        };
        let sub: Inputs<'a> = inputs.iter().map(|&x| &x[range.clone()]).collect();
        items.push(WorkItem {
            range,
            inputs: sub,
            output: out,
            partial: init.clone(),
        });
    }

    run_items(&mut items, &kernel);

    items
        .into_iter()
        .map(|item| {
            debug_assert!(item.output.is_empty() || item.output.len() == item.range.len());
            item.partial
        })
        .collect()
}

#[cfg(feature = "parallel")]
fn run_items<P, K>(items: &mut [WorkItem<'_, P>], kernel: &K)
where
    P: MaybeSend,
    K: Fn(&mut WorkItem<'_, P>) + MaybeSync,
{
    if items.len() <= 1 {
        items.iter_mut().for_each(kernel);
        return;
    }

    // One task per work item; the scope joins all of them before returning.
    rayon::scope(|s| {
        for item in items.iter_mut() {
            s.spawn(move |_| kernel(item));
        }
    });
}

#[cfg(not(feature = "parallel"))]
fn run_items<P, K>(items: &mut [WorkItem<'_, P>], kernel: &K)
where
    K: Fn(&mut WorkItem<'_, P>),
{
    items.iter_mut().for_each(kernel);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_dispatch_one_item_per_thread() {
        let x = vec![1.0; 10];
        let calls = AtomicUsize::new(0);
        let partials = dispatch("count", 10, 3, &[x.as_slice()], None, 0usize, |item| {
            calls.fetch_add(1, Ordering::Relaxed);
            item.partial = item.inputs[0].len();
        });
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(partials.as_slice(), &[4, 3, 3]);
    }

    #[test]
    fn test_dispatch_items_see_their_range() {
        let x: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let partials = dispatch("first", 10, 3, &[x.as_slice()], None, (0usize, 0.0), |item| {
            let first = item.inputs[0].first().copied().unwrap_or(f64::NAN);
            item.partial = (item.range.start, first);
            assert_eq!(item.inputs[0].len(), item.range.len());
        });
        assert_eq!(partials.as_slice(), &[(0, 0.0), (4, 4.0), (7, 7.0)]);
    }

    #[test]
    fn test_dispatch_writes_disjoint_output() {
        let mut z = vec![0.0; 11];
        dispatch("tag", 11, 4, &[], Some(z.as_mut_slice()), (), |item| {
            let tag = item.range.start as f64;
            item.output.iter_mut().for_each(|v| *v = tag);
        });
        assert_eq!(z, vec![0.0, 0.0, 0.0, 3.0, 3.0, 3.0, 6.0, 6.0, 6.0, 9.0, 9.0]);
    }

    #[test]
    fn test_dispatch_empty_ranges_are_noops() {
        let x = vec![2.0; 2];
        let mut z = vec![0.0; 2];
        let inputs = [x.as_slice()];
        let partials = dispatch("double", 2, 5, &inputs, Some(z.as_mut_slice()), false, |item| {
            item.partial = item.range.is_empty();
            for (o, &v) in item.output.iter_mut().zip(item.inputs[0]) {
                *o = 2.0 * v;
            }
        });
        assert_eq!(z, vec![4.0, 4.0]);
        assert_eq!(partials.as_slice(), &[false, false, true, true, true]);
    }
}
