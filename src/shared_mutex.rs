use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

use crate::exclusive_box::ExclusiveBox;
use crate::raw_cell::RawCell;
use crate::raw_lock::RawSharedMutex;

/// This type of lock allows a number of readers or at most one writer at any point in time.
/// The exclusive guard from `lock` allows modification of the underlying data,
/// and the shared guard from `lock_shared` allows read-only access.
/// Both guards release the lock on drop, each through its own unlock path.
pub struct SharedMutex<T> {
    value: RawCell<T>,
    raw: ExclusiveBox<RawSharedMutex>,
}

// Readers on several threads see &T at once, so sharing also needs T: Sync.
unsafe impl<T: Send> Send for SharedMutex<T> {}
unsafe impl<T: Send + Sync> Sync for SharedMutex<T> {}

impl<T> SharedMutex<T> {
    pub fn new(value: T) -> SharedMutex<T> {
        SharedMutex {
            value: RawCell::new(value),
            raw: ExclusiveBox::new(RawSharedMutex::new()),
        }
    }

    pub fn lock_shared(&self) -> SharedMutexReadGuard<'_, T> {
        self.raw.lock_shared();
        SharedMutexReadGuard {
            lock: self,
            _not_send: PhantomData,
        }
    }

    pub fn lock(&self) -> SharedMutexGuard<'_, T> {
        self.raw.lock();
        SharedMutexGuard {
            lock: self,
            _not_send: PhantomData,
        }
    }

    pub fn get_mut(&mut self) -> &mut T {
        self.value.get_mut()
    }

    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }
}

impl<T: Default> Default for SharedMutex<T> {
    fn default() -> Self {
        SharedMutex::new(T::default())
    }
}

impl<T> std::fmt::Debug for SharedMutex<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedMutex")
            .field("readers", &self.raw.readers())
            .field("locked", &self.raw.is_locked_exclusive())
            .finish_non_exhaustive()
    }
}

pub struct SharedMutexReadGuard<'a, T> {
    lock: &'a SharedMutex<T>,
    _not_send: PhantomData<*const ()>,
}

unsafe impl<T: Sync> Sync for SharedMutexReadGuard<'_, T> {}

impl<T> Deref for SharedMutexReadGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        // SAFETY: a shared lock is held, so no writer exists.
        unsafe { &*self.lock.value.get() }
    }
}

impl<T> Drop for SharedMutexReadGuard<'_, T> {
    fn drop(&mut self) {
        // SAFETY: acquired with lock_shared, released with the matching call.
        unsafe { self.lock.raw.unlock_shared() };
    }
}

pub struct SharedMutexGuard<'a, T> {
    lock: &'a SharedMutex<T>,
    _not_send: PhantomData<*const ()>,
}

unsafe impl<T: Sync> Sync for SharedMutexGuard<'_, T> {}

impl<T> Deref for SharedMutexGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        // SAFETY: the exclusive lock is held.
        unsafe { &*self.lock.value.get() }
    }
}

impl<T> DerefMut for SharedMutexGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: the exclusive lock is held.
        unsafe { &mut *self.lock.value.get() }
    }
}

impl<T> Drop for SharedMutexGuard<'_, T> {
    fn drop(&mut self) {
        // SAFETY: acquired with lock, released with the matching call.
        unsafe { self.lock.raw.unlock() };
    }
}

/// A shared guard only ever hands out &T.
/// ```compile_fail
///  use ownership::SharedMutex;
///  let m = SharedMutex::new(0);
///  *m.lock_shared() += 1;
/// ```
#[allow(dead_code)]
struct ReadOnlyTest {}

#[cfg(test)]
mod tests {
    use super::SharedMutex;
    use crate::arc::Arc;

    #[test]
    fn test_shared_mutex() {
        let lock = SharedMutex::new(5);

        // many reader locks can be held at once
        {
            let r1 = lock.lock_shared();
            let r2 = lock.lock_shared();
            assert_eq!(*r1, 5);
            assert_eq!(*r2, 5);
            assert_eq!(lock.raw.readers(), 2);
        } // read locks are dropped at this point

        // only one write lock may be held, however
        {
            let mut w = lock.lock();
            *w += 1;
            assert_eq!(*w, 6);
            assert!(lock.raw.is_locked_exclusive());
        }
        assert_eq!(lock.raw.readers(), 0);
        assert!(!lock.raw.is_locked_exclusive());
    }

    #[test]
    fn test_shared_guards_held_together() {
        use std::sync::Barrier;
        use std::thread;

        let lock = SharedMutex::new(123);
        let barrier = Barrier::new(6);

        // every thread holds its shared guard across the barrier, so all six
        // must be inside at once
        thread::scope(|s| {
            for _ in 0..6 {
                s.spawn(|| {
                    let r = lock.lock_shared();
                    barrier.wait();
                    assert_eq!(*r, 123);
                });
            }
        });
        assert_eq!(lock.raw.readers(), 0);
    }

    #[test]
    fn test_waiting_writer_holds_back_new_readers() {
        use crate::mutex::Mutex;
        use std::thread;
        use std::time::Duration;

        let lock = SharedMutex::new(0);
        let order = Mutex::new(Vec::new());

        let first = lock.lock_shared();
        thread::scope(|s| {
            s.spawn(|| {
                let mut w = lock.lock();
                *w += 1;
                order.lock().push("writer");
            });
            thread::sleep(Duration::from_millis(100));

            s.spawn(|| {
                let r = lock.lock_shared();
                assert_eq!(*r, 1);
                order.lock().push("reader");
            });
            thread::sleep(Duration::from_millis(100));

            assert!(order.lock().is_empty());
            drop(first);
        });
        assert_eq!(*order.lock(), vec!["writer", "reader"]);
    }

    #[test]
    fn test_readers_never_see_writer() {
        use std::sync::atomic::{AtomicIsize, Ordering};
        use std::thread;

        // > 0: readers inside, -1: a writer inside
        let inside = Arc::new(AtomicIsize::new(0));
        let lock = Arc::new(SharedMutex::new(()));
        let mut threads = vec![];

        for i in 0..6 {
            let lk = lock.clone();
            let inside = inside.clone();
            threads.push(thread::spawn(move || {
                for _ in 0..500 {
                    if i % 2 == 0 {
                        let _w = lk.lock();
                        assert_eq!(inside.swap(-1, Ordering::SeqCst), 0);
                        std::thread::yield_now();
                        assert_eq!(inside.swap(0, Ordering::SeqCst), -1);
                    } else {
                        let _r = lk.lock_shared();
                        assert!(inside.fetch_add(1, Ordering::SeqCst) >= 0);
                        std::thread::yield_now();
                        inside.fetch_sub(1, Ordering::SeqCst);
                    }
                }
            }));
        }

        for t in threads {
            t.join().unwrap();
        }
    }
}
