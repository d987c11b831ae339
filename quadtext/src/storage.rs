// Copyright 2025 the Quadtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Storage budgets for fonts and layouts.
//!
//! Every long-lived buffer owned by a [`Font`](crate::Font) or a [`Layout`](crate::Layout) is
//! charged to a [`StorageBudget`] before it is reserved. The budget is told the old and the new
//! size of a buffer in bytes; a new size of zero releases the buffer. A budget may refuse a
//! request, in which case the constructor that asked for the storage fails with
//! [`StorageError`]. The memory itself always comes from the global allocator, through
//! fallible reservations, so running out of it is reported the same way.
//!
//! [`Unlimited`] accepts every request.

use std::collections::TryReserveError;
use std::mem::size_of;
use std::sync::Arc;

use thiserror::Error;

/// Approves and accounts for the buffers of fonts and layouts.
///
/// Budgets are shared between threads when the font they back is, hence the `Send + Sync` bound.
pub trait StorageBudget: Send + Sync {
    /// Called when a buffer of `old_size` bytes is about to become `new_size` bytes.
    ///
    /// `old_size == 0` is a new buffer, `new_size == 0` a release. Releases must not fail;
    /// their result is ignored.
    fn resize(&self, old_size: usize, new_size: usize) -> Result<(), StorageError>;
}

impl<B: StorageBudget + ?Sized> StorageBudget for Arc<B> {
    fn resize(&self, old_size: usize, new_size: usize) -> Result<(), StorageError> {
        (**self).resize(old_size, new_size)
    }
}

impl<B: StorageBudget + ?Sized> StorageBudget for &B {
    fn resize(&self, old_size: usize, new_size: usize) -> Result<(), StorageError> {
        (**self).resize(old_size, new_size)
    }
}

/// The default budget: every request is approved.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unlimited;

impl StorageBudget for Unlimited {
    fn resize(&self, _old_size: usize, _new_size: usize) -> Result<(), StorageError> {
        Ok(())
    }
}

/// A budget refused a request, or the global allocator could not satisfy it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// The budget declined a buffer of `requested` bytes.
    #[error("storage budget refused a request for {requested} bytes")]
    Refused {
        /// The size of the refused buffer in bytes.
        requested: usize,
    },
    /// The global allocator could not reserve the storage.
    #[error("out of memory: {0}")]
    OutOfMemory(TryReserveError),
}

impl From<TryReserveError> for StorageError {
    fn from(err: TryReserveError) -> Self {
        Self::OutOfMemory(err)
    }
}

/// Obtain an empty vector able to hold exactly `len` elements, charged to `budget`.
pub(crate) fn reserve_vec<T>(
    budget: &dyn StorageBudget,
    len: usize,
) -> Result<Vec<T>, StorageError> {
    if len == 0 {
        return Ok(Vec::new());
    }
    budget.resize(0, bytes_of::<T>(len))?;
    let mut buf = Vec::new();
    if let Err(err) = buf.try_reserve_exact(len) {
        // Already charged; give the bytes back.
        let _ = budget.resize(bytes_of::<T>(len), 0);
        return Err(err.into());
    }
    Ok(buf)
}

/// Copy `items` into storage charged to `budget`.
pub(crate) fn reserve_copy<T: Clone>(
    budget: &dyn StorageBudget,
    items: &[T],
) -> Result<Vec<T>, StorageError> {
    let mut buf = reserve_vec(budget, items.len())?;
    buf.extend_from_slice(items);
    Ok(buf)
}

/// Release a vector obtained from [`reserve_vec`] with room for `len` elements.
pub(crate) fn release_vec<T>(budget: &dyn StorageBudget, buf: &mut Vec<T>, len: usize) {
    *buf = Vec::new();
    if len != 0 {
        let _ = budget.resize(bytes_of::<T>(len), 0);
    }
}

fn bytes_of<T>(len: usize) -> usize {
    size_of::<T>().saturating_mul(len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct Capped {
        limit: usize,
        live: AtomicUsize,
    }

    impl StorageBudget for Capped {
        fn resize(&self, old_size: usize, new_size: usize) -> Result<(), StorageError> {
            let live = self.live.load(Ordering::Relaxed) - old_size;
            if live + new_size > self.limit {
                return Err(StorageError::Refused {
                    requested: new_size,
                });
            }
            self.live.store(live + new_size, Ordering::Relaxed);
            Ok(())
        }
    }

    #[test]
    fn reserve_and_release_balance() {
        let budget = Capped {
            limit: 1024,
            ..Capped::default()
        };
        let mut buf = reserve_vec::<u32>(&budget, 16).unwrap();
        assert!(buf.capacity() >= 16);
        assert_eq!(budget.live.load(Ordering::Relaxed), 64);
        release_vec(&budget, &mut buf, 16);
        assert_eq!(budget.live.load(Ordering::Relaxed), 0);
        assert_eq!(buf.capacity(), 0);
    }

    #[test]
    fn refusal_propagates() {
        let budget = Capped {
            limit: 8,
            ..Capped::default()
        };
        let err = reserve_vec::<u64>(&budget, 2).unwrap_err();
        assert_eq!(err, StorageError::Refused { requested: 16 });
        assert_eq!(budget.live.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn zero_length_never_asks() {
        let budget = Capped::default();
        let buf = reserve_vec::<u8>(&budget, 0).unwrap();
        assert!(buf.is_empty());
    }

    #[test]
    fn copy_keeps_contents() {
        let buf = reserve_copy(&Unlimited, &[1_u8, 2, 3]).unwrap();
        assert_eq!(buf, [1, 2, 3]);
    }
}
