use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

use crate::exclusive_box::ExclusiveBox;
use crate::raw_cell::RawCell;
use crate::raw_lock::RawMutex;

/// A mutual exclusion primitive useful for protecting shared data
///
/// This mutex will block threads waiting for the lock to become available.
/// The payload is reachable only through the guard returned by `lock`.
/// The OS lock lives in its own heap allocation, so its address never changes
/// even when the Mutex itself is moved.
pub struct Mutex<T> {
    value: RawCell<T>,
    raw: ExclusiveBox<RawMutex>,
}

// The lock supplies the sharing, so T only has to be transferable.
unsafe impl<T: Send> Send for Mutex<T> {}
unsafe impl<T: Send> Sync for Mutex<T> {}

impl<T> Mutex<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: RawCell::new(value),
            raw: ExclusiveBox::new(RawMutex::new()),
        }
    }

    /// Blocks until the lock is free. There is no timeout and no try variant.
    pub fn lock(&self) -> MutexGuard<'_, T> {
        self.raw.lock();
        MutexGuard {
            mutex: self,
            _not_send: PhantomData,
        }
    }

    /// &mut self already proves nobody holds a guard.
    pub fn get_mut(&mut self) -> &mut T {
        self.value.get_mut()
    }

    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }
}

impl<T: Default> Default for Mutex<T> {
    fn default() -> Self {
        Mutex::new(T::default())
    }
}

impl<T> std::fmt::Debug for Mutex<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mutex")
            .field("locked", &self.raw.is_locked())
            .finish_non_exhaustive()
    }
}

/// Exclusive access to a Mutex's payload; unlocks when dropped.
///
/// The guard stays on the thread that locked.
pub struct MutexGuard<'a, T> {
    mutex: &'a Mutex<T>,
    _not_send: PhantomData<*const ()>,
}

unsafe impl<T: Sync> Sync for MutexGuard<'_, T> {}

impl<'a, T> Deref for MutexGuard<'a, T> {
    type Target = T;
    fn deref(&self) -> &T {
        // SAFETY: the guard holds the lock.
        unsafe { &*self.mutex.value.get() }
    }
}

impl<'a, T> DerefMut for MutexGuard<'a, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: the guard holds the lock.
        unsafe { &mut *self.mutex.value.get() }
    }
}

impl<T> Drop for MutexGuard<'_, T> {
    fn drop(&mut self) {
        // SAFETY: this guard acquired the lock in Mutex::lock.
        unsafe { self.mutex.raw.unlock() };
    }
}

/// Mutex<T> is only Sync when T can be sent to the thread that locks next.
/// ```compile_fail
///  use ownership::{Arc, Mutex, Rc};
///  let m = Arc::new(Mutex::new(Rc::new(0)));
///  std::thread::spawn(move || { let _g = m.lock(); });
/// ```
///
/// A guard can't leave the locking thread.
/// ```compile_fail
///  use ownership::Mutex;
///  let m = Mutex::new(0);
///  std::thread::scope(|s| {
///      let g = m.lock();
///      s.spawn(move || drop(g));
///  });
/// ```
#[allow(dead_code)]
struct ThreadUnsafeTest {}
