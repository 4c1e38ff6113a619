//! The vector handle: length, thread count and backing storage.

use crate::{NVectorError, Result};

/// Backing storage of an [`NVector`].
#[derive(Debug)]
enum Storage<'a> {
    /// No storage attached yet; arithmetic is rejected.
    Empty,
    /// Buffer allocated by and released with the handle.
    Owned(Vec<f64>),
    /// Caller-owned buffer; releasing the handle leaves it untouched.
    Borrowed(&'a mut [f64]),
}

/// A dense `f64` vector whose operations are split across `num_threads` workers.
///
/// `length` and `num_threads` are fixed at construction. Storage is either
/// owned by the handle, borrowed from the caller for `'a`, or absent (see
/// [`NVector::new_empty`]).
#[derive(Debug)]
pub struct NVector<'a> {
    length: usize,
    num_threads: usize,
    storage: Storage<'a>,
}

fn check_layout(length: usize, num_threads: usize) -> Result<()> {
    if length == 0 {
        return Err(NVectorError::ZeroLength);
    }
    if num_threads == 0 {
        return Err(NVectorError::ZeroThreads);
    }
    Ok(())
}

fn alloc_zeroed(length: usize) -> Result<Vec<f64>> {
    let mut data = Vec::new();
    data.try_reserve_exact(length)
        .map_err(|_| NVectorError::AllocationFailure { length })?;
    data.resize(length, 0.0);
    Ok(data)
}

impl<'a> NVector<'a> {
    /// Handle without storage. Attach a buffer with [`NVector::set_array`].
    pub fn new_empty(length: usize, num_threads: usize) -> Result<Self> {
        check_layout(length, num_threads)?;
        Ok(Self {
            length,
            num_threads,
            storage: Storage::Empty,
        })
    }

    /// Handle owning a zero-initialised buffer of `length` elements.
    pub fn new(length: usize, num_threads: usize) -> Result<Self> {
        check_layout(length, num_threads)?;
        let data = alloc_zeroed(length)?;
        log::debug!("new vector: length={length} num_threads={num_threads}");
        Ok(Self {
            length,
            num_threads,
            storage: Storage::Owned(data),
        })
    }

    /// Handle over an existing caller-owned buffer. The length is `data.len()`.
    pub fn make(data: &'a mut [f64], num_threads: usize) -> Result<Self> {
        let length = data.len();
        check_layout(length, num_threads)?;
        Ok(Self {
            length,
            num_threads,
            storage: Storage::Borrowed(data),
        })
    }

    /// New owning handle with the same length and thread count.
    ///
    /// Storage is freshly allocated and zeroed; the contents of `self` are
    /// not copied.
    pub fn clone_vector(&self) -> Result<NVector<'static>> {
        let data = alloc_zeroed(self.length)?;
        Ok(NVector {
            length: self.length,
            num_threads: self.num_threads,
            storage: Storage::Owned(data),
        })
    }

    /// New handle with the same length and thread count but no storage.
    pub fn clone_empty(&self) -> NVector<'static> {
        NVector {
            length: self.length,
            num_threads: self.num_threads,
            storage: Storage::Empty,
        }
    }

    /// Release the handle and, if owned, its storage.
    pub fn destroy(self) {
        match self.storage {
            Storage::Owned(data) => {
                log::debug!("destroy vector: releasing {} owned elements", data.len());
                drop(data);
            }
            Storage::Borrowed(_) | Storage::Empty => {
                log::debug!("destroy vector: no owned storage");
            }
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }

    pub fn has_storage(&self) -> bool {
        !matches!(self.storage, Storage::Empty)
    }

    pub fn owns_data(&self) -> bool {
        matches!(self.storage, Storage::Owned(_))
    }

    /// Storage requirement as `(real words, integer words)`. Advisory only.
    pub fn space(&self) -> (usize, usize) {
        (self.length, 1)
    }

    /// Backing storage, or `None` for a handle without storage.
    pub fn as_slice(&self) -> Option<&[f64]> {
        match &self.storage {
            Storage::Empty => None,
            Storage::Owned(data) => Some(data.as_slice()),
            Storage::Borrowed(data) => Some(&**data),
        }
    }

    pub fn as_mut_slice(&mut self) -> Option<&mut [f64]> {
        match &mut self.storage {
            Storage::Empty => None,
            Storage::Owned(data) => Some(data.as_mut_slice()),
            Storage::Borrowed(data) => Some(&mut **data),
        }
    }

    /// Raw pointer to the first element, for handing the buffer to foreign code.
    pub fn as_mut_ptr(&mut self) -> Option<*mut f64> {
        self.as_mut_slice().map(|data| data.as_mut_ptr())
    }

    /// Point the handle at a caller-owned buffer.
    ///
    /// The handle does not take ownership. Previously owned storage is released.
    pub fn set_array(&mut self, data: &'a mut [f64]) -> Result<()> {
        if data.len() != self.length {
            return Err(NVectorError::LengthMismatch {
                expected: self.length,
                found: data.len(),
            });
        }
        self.storage = Storage::Borrowed(data);
        Ok(())
    }

    pub(crate) fn data(&self) -> Result<&[f64]> {
        self.as_slice().ok_or(NVectorError::EmptyStorage)
    }

    pub(crate) fn data_mut(&mut self) -> Result<&mut [f64]> {
        self.as_mut_slice().ok_or(NVectorError::EmptyStorage)
    }

    /// Fails unless `other` has the same length and thread count as `self`.
    pub(crate) fn check_conforms(&self, other: &NVector<'_>) -> Result<()> {
        if other.length != self.length {
            return Err(NVectorError::LengthMismatch {
                expected: self.length,
                found: other.length,
            });
        }
        if other.num_threads != self.num_threads {
            return Err(NVectorError::ThreadCountMismatch {
                expected: self.num_threads,
                found: other.num_threads,
            });
        }
        Ok(())
    }
}

fn clone_array_with<F>(count: usize, mut clone_one: F) -> Result<Vec<NVector<'static>>>
where
    F: FnMut() -> Result<NVector<'static>>,
{
    if count == 0 {
        return Err(NVectorError::ZeroCount);
    }
    let mut vectors = Vec::new();
    vectors
        .try_reserve_exact(count)
        .map_err(|_| NVectorError::AllocationFailure { length: count })?;
    for _ in 0..count {
        // On error `vectors` is dropped here, releasing every clone made so far.
        vectors.push(clone_one()?);
    }
    Ok(vectors)
}

/// `count` independent owning clones of `template`, in order.
pub fn clone_vector_array(count: usize, template: &NVector<'_>) -> Result<Vec<NVector<'static>>> {
    let vectors = clone_array_with(count, || template.clone_vector())?;
    log::debug!(
        "cloned {count} vectors: length={} num_threads={}",
        template.length,
        template.num_threads
    );
    Ok(vectors)
}

/// `count` clones of `template` without storage.
pub fn clone_empty_vector_array(
    count: usize,
    template: &NVector<'_>,
) -> Result<Vec<NVector<'static>>> {
    clone_array_with(count, || Ok(template.clone_empty()))
}

/// Release every handle in `vectors`.
pub fn destroy_vector_array(vectors: Vec<NVector<'_>>) {
    log::debug!("destroy {} vectors", vectors.len());
    vectors.into_iter().for_each(NVector::destroy);
}
