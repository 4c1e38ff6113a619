//! Feature-gated `Send`/`Sync` bounds for kernels and partial results.
//!
//! With the `parallel` feature, [`MaybeSend`] is [`Send`] and [`MaybeSync`] is
//! [`Sync`], since work items run on rayon worker threads. Without it, work items
//! run on the calling thread and the traits are implemented for every type.

#[cfg(feature = "parallel")]
pub trait MaybeSend: Send {}
#[cfg(feature = "parallel")]
impl<T: Send> MaybeSend for T {}

#[cfg(feature = "parallel")]
pub trait MaybeSync: Sync {}
#[cfg(feature = "parallel")]
impl<T: Sync> MaybeSync for T {}

#[cfg(not(feature = "parallel"))]
pub trait MaybeSend {}
#[cfg(not(feature = "parallel"))]
impl<T> MaybeSend for T {}

#[cfg(not(feature = "parallel"))]
pub trait MaybeSync {}
#[cfg(not(feature = "parallel"))]
impl<T> MaybeSync for T {}
