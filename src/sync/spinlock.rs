// Copyright 2016 The futures-then Developers.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A small spinlock for the outcome slot of a future

use std::cell::UnsafeCell;
use std::fmt;
use std::hint;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};

const BACKOFF_BASE: u32 = 1 << 2;
const BACKOFF_CEILING: u32 = 1 << 10;

/// An unfair spinlock.
///
/// Critical sections guarded by this lock must stay short. Listeners are
/// never called while it is held, though stored outcomes are cloned under it.
pub struct Spinlock<T: ?Sized> {
    locked: AtomicBool,
    data: UnsafeCell<T>,
}

unsafe impl<T: ?Sized + Send> Send for Spinlock<T> {}
unsafe impl<T: ?Sized + Send> Sync for Spinlock<T> {}

impl<T> Spinlock<T> {
    pub fn new(data: T) -> Spinlock<T> {
        Spinlock {
            locked: AtomicBool::new(false),
            data: UnsafeCell::new(data),
        }
    }
}

impl<T: ?Sized> Spinlock<T> {
    /// Access the data through a unique borrow, no locking needed
    pub fn get_mut(&mut self) -> &mut T {
        self.data.get_mut()
    }

    pub fn try_lock(&self) -> Option<SpinlockGuard<T>> {
        if self.locked
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_ok()
        {
            Some(SpinlockGuard { lock: self })
        } else {
            None
        }
    }

    pub fn lock(&self) -> SpinlockGuard<T> {
        let mut backoff = BACKOFF_BASE;

        loop {
            if let Some(guard) = self.try_lock() {
                return guard;
            }

            // Wait on a plain load so the cache line is not bounced by CAS attempts
            while self.locked.load(Ordering::Relaxed) {
                for _ in 0..backoff {
                    hint::spin_loop();
                }

                if backoff < BACKOFF_CEILING {
                    backoff <<= 1;
                }
            }
        }
    }
}

impl<T: ?Sized + fmt::Debug> fmt::Debug for Spinlock<T> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.try_lock() {
            Some(guard) => write!(f, "Spinlock {{ data: {:?} }}", &*guard),
            None => write!(f, "Spinlock {{ <locked> }}"),
        }
    }
}

pub struct SpinlockGuard<'a, T: ?Sized + 'a> {
    lock: &'a Spinlock<T>,
}

impl<'a, T: ?Sized> Drop for SpinlockGuard<'a, T> {
    fn drop(&mut self) {
        self.lock.locked.store(false, Ordering::Release);
    }
}

impl<'a, T: ?Sized> Deref for SpinlockGuard<'a, T> {
    type Target = T;

    fn deref(&self) -> &T {
        unsafe { &*self.lock.data.get() }
    }
}

impl<'a, T: ?Sized> DerefMut for SpinlockGuard<'a, T> {
    fn deref_mut(&mut self) -> &mut T {
        unsafe { &mut *self.lock.data.get() }
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn test_spinlock_try_lock() {
        let mut lock = Spinlock::new(1);

        let guard = lock.lock();
        assert!(lock.try_lock().is_none());
        drop(guard);

        assert_eq!(*lock.try_lock().unwrap(), 1);

        *lock.get_mut() = 2;
        assert_eq!(*lock.lock(), 2);
    }

    #[test]
    fn test_spinlock_counter() {
        const THREADS: usize = 4;
        const ITERS: usize = 10_000;

        let lock = Arc::new(Spinlock::new(0usize));

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let lock = lock.clone();
                thread::spawn(move || {
                    for _ in 0..ITERS {
                        *lock.lock() += 1;
                    }
                })
            })
            .collect();

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(*lock.lock(), THREADS * ITERS);
    }
}
