//! Helpers for working with arrays of [`MaybeUninit`].

use core::mem::MaybeUninit;

/// Builds an array of uninitialized slots.
#[inline(always)]
pub const fn uninit_array<T, const N: usize>() -> [MaybeUninit<T>; N] {
    // SAFETY: an uninitialized `[MaybeUninit<_>; N]` is itself valid.
    unsafe { MaybeUninit::uninit().assume_init() }
}
