//! Vector kernels.
//!
//! Every operation validates all of its operands (matching length and thread
//! count, storage attached) before any work is dispatched, so a failing call
//! leaves every vector untouched. Elementwise kernels write straight into the
//! destination's per-thread sub-slice; reductions leave one partial per thread
//! which is combined on the calling thread after the join.

use smallvec::SmallVec;

use crate::dispatch::dispatch;
use crate::maybe_sync::MaybeSync;
use crate::reduce::{all, Combine};
use crate::vector::NVector;
use crate::Result;

type Operands<'v> = SmallVec<[&'v [f64]; 4]>;

fn borrow_all<'v>(sources: &[&'v NVector<'_>]) -> Result<Operands<'v>> {
    sources.iter().map(|v| v.data()).collect()
}

/// Elementwise kernel writing into `z`. `z` may also be read by the kernel.
fn map_into<K>(
    op: &'static str,
    sources: &[&NVector<'_>],
    z: &mut NVector<'_>,
    kernel: K,
) -> Result<()>
where
    K: Fn(&[&[f64]], &mut [f64]) + MaybeSync,
{
    for x in sources {
        z.check_conforms(x)?;
    }
    let inputs = borrow_all(sources)?;
    let (len, nthreads) = (z.length(), z.num_threads());
    let out = z.data_mut()?;

    dispatch(op, len, nthreads, &inputs, Some(out), (), |item| {
        kernel(item.inputs.as_slice(), &mut *item.output)
    });
    Ok(())
}

/// Elementwise kernel that also reports a per-element predicate, ANDed over `z`.
fn map_test_into<K>(
    op: &'static str,
    sources: &[&NVector<'_>],
    z: &mut NVector<'_>,
    kernel: K,
) -> Result<bool>
where
    K: Fn(&[&[f64]], &mut [f64]) -> bool + MaybeSync,
{
    for x in sources {
        z.check_conforms(x)?;
    }
    let inputs = borrow_all(sources)?;
    let (len, nthreads) = (z.length(), z.num_threads());
    let out = z.data_mut()?;

    let partials = dispatch(op, len, nthreads, &inputs, Some(out), true, |item| {
        item.partial = kernel(item.inputs.as_slice(), &mut *item.output);
    });
    Ok(all(&partials))
}

fn reduce_over<K>(
    op: &'static str,
    sources: &[&NVector<'_>],
    combine: Combine,
    kernel: K,
) -> Result<f64>
where
    K: Fn(&[&[f64]]) -> f64 + MaybeSync,
{
    let (first, rest) = match sources.split_first() {
        Some(split) => split,
        None => return Ok(combine.identity()),
    };
    for x in rest {
        first.check_conforms(x)?;
    }
    let inputs = borrow_all(sources)?;

    let partials = dispatch(
        op,
        first.length(),
        first.num_threads(),
        &inputs,
        None,
        combine.identity(),
        |item| item.partial = kernel(item.inputs.as_slice()),
    );
    Ok(combine.fold(&partials))
}

// ============================================================================
// Elementwise operations
// ============================================================================

/// `z = a*x + b*y`.
pub fn linear_sum(
    a: f64,
    x: &NVector<'_>,
    b: f64,
    y: &NVector<'_>,
    z: &mut NVector<'_>,
) -> Result<()> {
    map_into("linear_sum", &[x, y], z, move |s, out| {
        for ((o, &xi), &yi) in out.iter_mut().zip(s[0]).zip(s[1]) {
            *o = a * xi + b * yi;
        }
    })
}

/// `y = a*x + b*y`, updating `y` in place.
pub fn linear_sum_in_place(a: f64, x: &NVector<'_>, b: f64, y: &mut NVector<'_>) -> Result<()> {
    map_into("linear_sum_in_place", &[x], y, move |s, out| {
        for (o, &xi) in out.iter_mut().zip(s[0]) {
            *o = a * xi + b * *o;
        }
    })
}

/// Set every element of `z` to `c`.
pub fn const_fill(c: f64, z: &mut NVector<'_>) -> Result<()> {
    map_into("const_fill", &[], z, move |_, out| out.fill(c))
}

/// Componentwise product `z[i] = x[i]*y[i]`.
pub fn prod(x: &NVector<'_>, y: &NVector<'_>, z: &mut NVector<'_>) -> Result<()> {
    map_into("prod", &[x, y], z, |s, out| {
        for ((o, &xi), &yi) in out.iter_mut().zip(s[0]).zip(s[1]) {
            *o = xi * yi;
        }
    })
}

/// Componentwise quotient `z[i] = x[i]/y[i]`.
///
/// Zero denominators are not checked; the element follows IEEE-754 division.
pub fn div(x: &NVector<'_>, y: &NVector<'_>, z: &mut NVector<'_>) -> Result<()> {
    map_into("div", &[x, y], z, |s, out| {
        for ((o, &xi), &yi) in out.iter_mut().zip(s[0]).zip(s[1]) {
            *o = xi / yi;
        }
    })
}

/// `z = c*x`.
pub fn scale(c: f64, x: &NVector<'_>, z: &mut NVector<'_>) -> Result<()> {
    map_into("scale", &[x], z, move |s, out| {
        for (o, &xi) in out.iter_mut().zip(s[0]) {
            *o = c * xi;
        }
    })
}

pub fn scale_in_place(c: f64, x: &mut NVector<'_>) -> Result<()> {
    map_into("scale_in_place", &[], x, move |_, out| {
        out.iter_mut().for_each(|o| *o *= c);
    })
}

/// `z[i] = |x[i]|`.
pub fn abs(x: &NVector<'_>, z: &mut NVector<'_>) -> Result<()> {
    map_into("abs", &[x], z, |s, out| {
        for (o, &xi) in out.iter_mut().zip(s[0]) {
            *o = xi.abs();
        }
    })
}

pub fn abs_in_place(x: &mut NVector<'_>) -> Result<()> {
    map_into("abs_in_place", &[], x, |_, out| {
        out.iter_mut().for_each(|o| *o = o.abs());
    })
}

/// `z[i] = 1/x[i]`, without testing for zero. See [`inv_test`].
pub fn inv(x: &NVector<'_>, z: &mut NVector<'_>) -> Result<()> {
    map_into("inv", &[x], z, |s, out| {
        for (o, &xi) in out.iter_mut().zip(s[0]) {
            *o = 1.0 / xi;
        }
    })
}

pub fn inv_in_place(x: &mut NVector<'_>) -> Result<()> {
    map_into("inv_in_place", &[], x, |_, out| {
        out.iter_mut().for_each(|o| *o = 1.0 / *o);
    })
}

/// `z[i] = x[i] + b`.
pub fn add_const(x: &NVector<'_>, b: f64, z: &mut NVector<'_>) -> Result<()> {
    map_into("add_const", &[x], z, move |s, out| {
        for (o, &xi) in out.iter_mut().zip(s[0]) {
            *o = xi + b;
        }
    })
}

pub fn add_const_in_place(x: &mut NVector<'_>, b: f64) -> Result<()> {
    map_into("add_const_in_place", &[], x, move |_, out| {
        out.iter_mut().for_each(|o| *o += b);
    })
}

/// `z[i] = 1.0` if `|x[i]| >= c`, `0.0` otherwise.
pub fn compare(c: f64, x: &NVector<'_>, z: &mut NVector<'_>) -> Result<()> {
    map_into("compare", &[x], z, move |s, out| {
        for (o, &xi) in out.iter_mut().zip(s[0]) {
            *o = if xi.abs() >= c { 1.0 } else { 0.0 };
        }
    })
}

/// `z[i] = 1/x[i]` where `x[i] != 0`, `z[i] = 0.0` where `x[i] == 0`.
///
/// Returns `false` if any element of `x` was zero.
pub fn inv_test(x: &NVector<'_>, z: &mut NVector<'_>) -> Result<bool> {
    map_test_into("inv_test", &[x], z, |s, out| {
        let mut ok = true;
        for (o, &xi) in out.iter_mut().zip(s[0]) {
            if xi == 0.0 {
                *o = 0.0;
                ok = false;
            } else {
                *o = 1.0 / xi;
            }
        }
        ok
    })
}

/// Check `x` against the constraints encoded in `c` and flag violations in `m`.
///
/// - `c[i] = 2`: `x[i] > 0`
/// - `c[i] = 1`: `x[i] >= 0`
/// - `c[i] = -1`: `x[i] <= 0`
/// - `c[i] = -2`: `x[i] < 0`
/// - `c[i] = 0`: unconstrained
///
/// `m[i]` is `1.0` where the test failed and `0.0` where it passed. Returns
/// `false` if any element failed.
pub fn constr_mask(c: &NVector<'_>, x: &NVector<'_>, m: &mut NVector<'_>) -> Result<bool> {
    map_test_into("constr_mask", &[c, x], m, |s, out| {
        let mut ok = true;
        for ((o, &ci), &xi) in out.iter_mut().zip(s[0]).zip(s[1]) {
            let strict = ci.abs() > 1.5;
            let violated = if strict {
                xi * ci <= 0.0
            } else if ci.abs() > 0.5 {
                xi * ci < 0.0
            } else {
                false
            };
            *o = if violated { 1.0 } else { 0.0 };
            ok &= !violated;
        }
        ok
    })
}

// ============================================================================
// Reductions
// ============================================================================

/// Dot product `sum x[i]*y[i]`.
pub fn dot_prod(x: &NVector<'_>, y: &NVector<'_>) -> Result<f64> {
    reduce_over("dot_prod", &[x, y], Combine::Sum, |s| {
        s[0].iter().zip(s[1]).map(|(&xi, &yi)| xi * yi).sum()
    })
}

/// `max |x[i]|`.
pub fn max_norm(x: &NVector<'_>) -> Result<f64> {
    reduce_over("max_norm", &[x], Combine::Max, |s| {
        s[0].iter().fold(0.0, |acc: f64, &xi| acc.max(xi.abs()))
    })
}

fn weighted_square_sum(s: &[&[f64]]) -> f64 {
    s[0].iter()
        .zip(s[1])
        .map(|(&xi, &wi)| {
            let p = xi * wi;
            p * p
        })
        .sum()
}

/// Weighted root-mean-square norm `sqrt(sum (x[i]*w[i])^2 / n)`.
pub fn wrms_norm(x: &NVector<'_>, w: &NVector<'_>) -> Result<f64> {
    let sum = reduce_over("wrms_norm", &[x, w], Combine::Sum, weighted_square_sum)?;
    Ok((sum / x.length() as f64).sqrt())
}

/// Weighted RMS norm over the elements where `id[i] > 0`.
///
/// The divisor is the full length `n`, not the number of selected elements.
pub fn wrms_norm_mask(x: &NVector<'_>, w: &NVector<'_>, id: &NVector<'_>) -> Result<f64> {
    let sum = reduce_over("wrms_norm_mask", &[x, w, id], Combine::Sum, |s| {
        s[0].iter()
            .zip(s[1])
            .zip(s[2])
            .filter(|(_, &idi)| idi > 0.0)
            .map(|((&xi, &wi), _)| {
                let p = xi * wi;
                p * p
            })
            .sum()
    })?;
    Ok((sum / x.length() as f64).sqrt())
}

/// Smallest element of `x`.
pub fn min(x: &NVector<'_>) -> Result<f64> {
    reduce_over("min", &[x], Combine::Min, |s| {
        s[0].iter().copied().fold(f64::INFINITY, f64::min)
    })
}

/// Weighted Euclidean norm `sqrt(sum (x[i]*w[i])^2)`.
pub fn wl2_norm(x: &NVector<'_>, w: &NVector<'_>) -> Result<f64> {
    let sum = reduce_over("wl2_norm", &[x, w], Combine::Sum, weighted_square_sum)?;
    Ok(sum.sqrt())
}

/// `sum |x[i]|`.
pub fn l1_norm(x: &NVector<'_>) -> Result<f64> {
    reduce_over("l1_norm", &[x], Combine::Sum, |s| {
        s[0].iter().map(|xi| xi.abs()).sum()
    })
}

/// Weighted L1 norm `sum |x[i]|*w[i]`.
pub fn wl1_norm(x: &NVector<'_>, w: &NVector<'_>) -> Result<f64> {
    reduce_over("wl1_norm", &[x, w], Combine::Sum, |s| {
        s[0].iter().zip(s[1]).map(|(&xi, &wi)| xi.abs() * wi).sum()
    })
}

/// `min num[i]/denom[i]` over the elements with `denom[i] != 0`.
///
/// Returns `f64::INFINITY` if every denominator is zero.
pub fn min_quotient(num: &NVector<'_>, denom: &NVector<'_>) -> Result<f64> {
    reduce_over("min_quotient", &[num, denom], Combine::Min, |s| {
        s[0].iter()
            .zip(s[1])
            .filter(|(_, &di)| di != 0.0)
            .fold(f64::INFINITY, |acc, (&ni, &di)| acc.min(ni / di))
    })
}
