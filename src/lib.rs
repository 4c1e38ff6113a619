//! Thread-parallel dense vector kernels for ODE/DAE time integrators.
//!
//! An [`NVector`] is a flat array of `f64` together with the number of worker
//! threads its operations are split across. Every operation partitions
//! `[0, length)` into `num_threads` contiguous ranges, runs the kernel on each
//! range in parallel, and joins before returning.
//!
//! # Core Types
//!
//! - [`NVector`]: vector handle with owned, borrowed, or no storage
//! - [`partition`]: the deterministic work split used by every operation
//!
//! # Operations
//!
//! ## Elementwise
//!
//! - [`linear_sum`], [`linear_sum_in_place`]: `z = a*x + b*y`
//! - [`const_fill`], [`scale`], [`abs`], [`inv`], [`add_const`] (and in-place forms)
//! - [`prod`], [`div`]: componentwise product and quotient
//! - [`compare`]: `1.0` where `|x| >= c`
//! - [`inv_test`], [`constr_mask`]: elementwise with a vector-wide predicate
//!
//! ## Reductions
//!
//! - [`dot_prod`], [`max_norm`], [`min`], [`min_quotient`]
//! - [`wrms_norm`], [`wrms_norm_mask`], [`wl2_norm`], [`l1_norm`], [`wl1_norm`]
//!
//! Partial results are combined on the calling thread in thread-index order,
//! so a reduction is reproducible for a fixed thread count. Sums computed with
//! different thread counts may differ in the last bits.
//!
//! # Example
//!
//! ```rust
//! use nvector_parallel::{const_fill, dot_prod, NVector};
//!
//! let mut x = NVector::new(10, 3).unwrap();
//! const_fill(1.0, &mut x).unwrap();
//! assert_eq!(dot_prod(&x, &x).unwrap(), 10.0);
//! ```
//!
//! # Wrapping an existing buffer
//!
//! ```rust
//! use nvector_parallel::{scale_in_place, NVector};
//!
//! let mut buf = vec![1.0, 2.0, 3.0];
//! let mut v = NVector::make(&mut buf, 2).unwrap();
//! scale_in_place(2.0, &mut v).unwrap();
//! v.destroy();
//! assert_eq!(buf, vec![2.0, 4.0, 6.0]);
//! ```

mod dispatch;
mod maybe_sync;
mod ops;
mod partition;
mod reduce;
mod vector;

pub use partition::{partition, Ranges};

// ============================================================================
// Vector handle
// ============================================================================
pub use vector::{clone_empty_vector_array, clone_vector_array, destroy_vector_array, NVector};

// ============================================================================
// Operations
// ============================================================================
pub use ops::{
    abs, abs_in_place, add_const, add_const_in_place, compare, const_fill, constr_mask, div,
    dot_prod, inv, inv_in_place, inv_test, l1_norm, linear_sum, linear_sum_in_place, max_norm,
    min, min_quotient, prod, scale, scale_in_place, wl1_norm, wl2_norm, wrms_norm,
    wrms_norm_mask,
};

// ============================================================================
// Error types
// ============================================================================

/// Errors reported by vector construction and operations.
///
/// All errors are detected on the calling thread before any work is
/// dispatched; a failed operation never leaves a vector partially written.
#[derive(Debug, thiserror::Error)]
pub enum NVectorError {
    /// Vector length must be positive.
    #[error("vector length must be positive")]
    ZeroLength,

    /// Thread count must be at least one.
    #[error("number of threads must be at least 1")]
    ZeroThreads,

    /// Vector array clones need a positive count.
    #[error("vector array count must be positive")]
    ZeroCount,

    /// Operand lengths differ.
    #[error("length mismatch: expected {expected}, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    /// Operand thread counts differ.
    #[error("thread count mismatch: expected {expected}, found {found}")]
    ThreadCountMismatch { expected: usize, found: usize },

    /// Storage for `length` elements could not be allocated.
    #[error("failed to allocate storage for {length} elements")]
    AllocationFailure { length: usize },

    /// The vector has no storage attached.
    #[error("vector has no storage attached")]
    EmptyStorage,
}

/// Result type for vector operations.
pub type Result<T> = std::result::Result<T, NVectorError>;
