use std::hint::spin_loop;
use std::marker::PhantomData;
use std::ptr::NonNull;
use std::sync::atomic::{Ordering, fence};

use crate::atomic::AtomicCounter;
use crate::exclusive_box::ExclusiveBox;
use crate::optional::Optional;
use crate::suppressed_drop::SuppressedDrop;

// Past this the count is one increment away from wrapping.
const MAX_REFCOUNT: usize = isize::MAX as usize;

// Weak count while get_mut checks uniqueness; downgrade waits it out.
const WEAK_LOCKED: usize = usize::MAX;

/// A thread-safe reference-counting pointer. ‘Arc’ stands for ‘Atomically Reference Counted’.
///
/// Same shape as [`crate::Rc`], but both counters are atomic, so clones and
/// drops may happen on any thread. Arc<T> crosses threads only when T is both
/// Send and Sync: every clone hands out &T, and the last one drops T.
pub struct Arc<T> {
    ptr: NonNull<ArcInner<T>>,
    _marker: PhantomData<ArcInner<T>>,
}

unsafe impl<T: Send + Sync> Send for Arc<T> {}
unsafe impl<T: Sync + Send> Sync for Arc<T> {}

struct ArcInner<T> {
    data: SuppressedDrop<T>,
    strong: AtomicCounter<usize>,
    weak: AtomicCounter<usize>,
}

/// Releases one weak reference and frees the block when it was the last.
///
/// # Safety
/// `ptr` must point to a live block and the caller must own one weak reference.
unsafe fn release_weak<T>(ptr: NonNull<ArcInner<T>>) {
    // SAFETY: the block is alive while we hold a weak reference.
    let inner = unsafe { ptr.as_ref() };
    if inner.weak.fetch_sub_explicit(1, Ordering::Release) == 1 {
        fence(Ordering::Acquire);
        // SAFETY: last reference of any kind; the payload is already gone.
        drop(unsafe { ExclusiveBox::from_raw(ptr.as_ptr()) });
    }
}

impl<T> Clone for Arc<T> {
    fn clone(&self) -> Self {
        let inner = self.inner();
        if inner.strong.fetch_add_explicit(1, Ordering::Relaxed) > MAX_REFCOUNT {
            std::process::abort();
        }
        Self {
            ptr: self.ptr,
            _marker: PhantomData,
        }
    }
}

impl<T> std::ops::Deref for Arc<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        self.inner().data.get()
    }
}

impl<T> Arc<T> {
    pub fn new(data: T) -> Arc<T> {
        let inner = ExclusiveBox::new(ArcInner {
            data: SuppressedDrop::new(data),
            strong: AtomicCounter::new(1),
            weak: AtomicCounter::new(1),
        });
        Self {
            // SAFETY: leak never returns null.
            ptr: unsafe { NonNull::new_unchecked(inner.leak()) },
            _marker: PhantomData,
        }
    }

    fn inner(&self) -> &ArcInner<T> {
        // SAFETY: the block outlives every strong owner.
        unsafe { self.ptr.as_ref() }
    }

    pub fn strong_count(this: &Self) -> usize {
        this.inner().strong.load_explicit(Ordering::Relaxed)
    }

    pub fn weak_count(this: &Self) -> usize {
        match this.inner().weak.load_explicit(Ordering::Relaxed) {
            WEAK_LOCKED => 0,
            n => n - 1,
        }
    }

    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        this.ptr == other.ptr
    }

    pub fn downgrade(this: &Self) -> Weak<T> {
        let inner = this.inner();
        loop {
            match inner
                .weak
                .fetch_update(Ordering::Acquire, Ordering::Relaxed, |w| {
                    (w != WEAK_LOCKED).then(|| w + 1)
                }) {
                Ok(prev) => {
                    if prev > MAX_REFCOUNT {
                        std::process::abort();
                    }
                    break;
                }
                Err(_) => spin_loop(),
            }
        }
        Weak {
            ptr: this.ptr,
            _marker: PhantomData,
        }
    }

    /// True when this is the only Arc and no Weak exists.
    ///
    /// The weak count is locked first, so no Weak can appear and none can be
    /// upgraded while the strong count is read.
    fn is_unique(&mut self) -> bool {
        let inner = self.inner();
        if inner
            .weak
            .compare_exchange(1, WEAK_LOCKED, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            return false;
        }
        let unique = inner.strong.load_explicit(Ordering::Acquire) == 1;
        inner.weak.store_explicit(1, Ordering::Release);
        unique
    }

    /// Mutable access, only granted while no other Arc or Weak exists.
    pub fn get_mut(this: &mut Self) -> Optional<&mut T> {
        if !this.is_unique() {
            return Optional::None;
        }
        // SAFETY: we are the only handle to the block.
        Optional::Some(unsafe { (*this.ptr.as_ptr()).data.get_mut() })
    }

    /// Moves the value out when this is the last strong owner.
    pub fn try_unwrap(this: Self) -> Result<T, Self> {
        if this
            .inner()
            .strong
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |s| (s == 1).then_some(0))
            .is_err()
        {
            return Err(this);
        }
        fence(Ordering::Acquire);

        let ptr = this.ptr;
        std::mem::forget(this);
        // SAFETY: the strong count went 1 -> 0 here, so the payload is ours and
        // so is the strong owners' weak reference.
        unsafe {
            let data = (*ptr.as_ptr()).data.take();
            release_weak(ptr);
            Ok(data)
        }
    }
}

impl<T> Drop for Arc<T> {
    fn drop(&mut self) {
        let inner = self.inner();
        if inner.strong.fetch_sub_explicit(1, Ordering::Release) != 1 {
            return;
        }
        fence(Ordering::Acquire);
        // SAFETY: the strong count went 1 -> 0 on this thread, so no other
        // thread can reach the payload; it is destroyed exactly once here.
        unsafe {
            (*self.ptr.as_ptr()).data.destroy();
            release_weak(self.ptr);
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for Arc<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&**self, f)
    }
}

/// A non-owning handle to an Arc allocation, usable from any thread.
#[derive(Debug)]
pub struct Weak<T> {
    ptr: NonNull<ArcInner<T>>,
    _marker: PhantomData<ArcInner<T>>,
}

unsafe impl<T: Send + Sync> Send for Weak<T> {}
unsafe impl<T: Send + Sync> Sync for Weak<T> {}

impl<T> Weak<T> {
    fn inner(&self) -> &ArcInner<T> {
        // SAFETY: the block outlives every weak owner.
        unsafe { self.ptr.as_ref() }
    }

    pub fn upgrade(&self) -> Optional<Arc<T>> {
        let upgraded = self
            .inner()
            .strong
            .fetch_update(Ordering::Acquire, Ordering::Relaxed, |s| {
                if s == 0 || s > MAX_REFCOUNT { None } else { Some(s + 1) }
            });
        match upgraded {
            Ok(_) => Optional::Some(Arc {
                ptr: self.ptr,
                _marker: PhantomData,
            }),
            Err(0) => Optional::None,
            Err(_) => std::process::abort(),
        }
    }

    pub fn strong_count(&self) -> usize {
        self.inner().strong.load_explicit(Ordering::Relaxed)
    }
}

impl<T> Clone for Weak<T> {
    fn clone(&self) -> Self {
        // A live Weak keeps the count at 2 or more, so it is never WEAK_LOCKED here.
        if self.inner().weak.fetch_add_explicit(1, Ordering::Relaxed) > MAX_REFCOUNT {
            std::process::abort();
        }
        Weak {
            ptr: self.ptr,
            _marker: PhantomData,
        }
    }
}

impl<T> Drop for Weak<T> {
    fn drop(&mut self) {
        // SAFETY: this handle owns one weak reference.
        unsafe { release_weak(self.ptr) };
    }
}

#[cfg(test)]
mod tests {
    use super::Arc;
    use crate::optional::Optional;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_arc() {
        use std::thread;

        let five = Arc::new(5);
        let mut handles = vec![];

        for _ in 0..10 {
            let current = five.clone();
            handles.push(thread::spawn(move || {
                assert_eq!(*current, 5);
            }));
        }

        for h in handles {
            h.join().unwrap();
        }
    }

    struct Counter<'a>(&'a AtomicUsize);
    impl<'a> Drop for Counter<'a> {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn drop_once() {
        let d = AtomicUsize::new(0);

        {
            let a = Arc::new(Counter(&d));
            let b = a.clone();
            let c = b.clone();
            drop(a);
            drop(b);
            assert_eq!(d.load(Ordering::SeqCst), 0);
            drop(c);
        }

        assert_eq!(d.load(Ordering::SeqCst), 1, "Drop must happen exactly once");
    }

    #[test]
    fn drop_once_across_threads() {
        use std::thread;

        let d = AtomicUsize::new(0);
        thread::scope(|s| {
            let a = Arc::new(Counter(&d));
            for _ in 0..16 {
                let x = a.clone();
                s.spawn(move || {
                    let y = x.clone();
                    drop(x);
                    let _z = y.clone();
                });
            }
        });
        assert_eq!(d.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn clone_increments_count() {
        let a = Arc::new(10);
        let b = a.clone();
        let _c = b.clone();

        let inner = unsafe { a.ptr.as_ref() };
        assert_eq!(inner.strong.load_explicit(Ordering::Relaxed), 3);
        assert_eq!(Arc::strong_count(&a), 3);
    }

    #[test]
    fn concurrent_clones_and_drops() {
        use std::thread;

        let a = Arc::new(123);
        let mut handles = vec![];

        for _ in 0..100 {
            let x = a.clone();
            handles.push(thread::spawn(move || {
                let _y = x.clone();
                let _z = x.clone();
            }));
        }

        for h in handles {
            h.join().unwrap();
        }

        // only the original Arc should remain
        assert_eq!(Arc::strong_count(&a), 1);
    }

    #[test]
    fn upgrade_races_last_drop() {
        use std::thread;

        for _ in 0..200 {
            let d = AtomicUsize::new(0);
            let a = Arc::new(Counter(&d));
            let w = Arc::downgrade(&a);
            thread::scope(|s| {
                s.spawn(move || drop(a));
                s.spawn(move || {
                    while let Optional::Some(up) = w.upgrade() {
                        assert_eq!(up.0.load(Ordering::SeqCst), 0);
                    }
                    assert!(w.upgrade().is_none());
                });
            });
            assert_eq!(d.load(Ordering::SeqCst), 1, "Drop must happen exactly once");
        }
    }

    #[test]
    fn get_mut_refused_while_upgraded_elsewhere() {
        use std::sync::atomic::AtomicBool;
        use std::thread;

        for _ in 0..100 {
            let mut a = Arc::new(0usize);
            let w = Arc::downgrade(&a);
            let holding = AtomicBool::new(false);
            let release = AtomicBool::new(false);

            thread::scope(|s| {
                let (holding, release) = (&holding, &release);
                s.spawn(move || {
                    let up = w.upgrade().unwrap();
                    drop(w);
                    holding.store(true, Ordering::SeqCst);
                    let seen = *up;
                    while !release.load(Ordering::SeqCst) {
                        assert_eq!(*up, seen);
                        std::hint::spin_loop();
                    }
                    holding.store(false, Ordering::SeqCst);
                });

                for _ in 0..1000 {
                    if let Optional::Some(v) = Arc::get_mut(&mut a) {
                        assert!(!holding.load(Ordering::SeqCst));
                        *v += 1;
                    }
                }
                release.store(true, Ordering::SeqCst);
                while Arc::get_mut(&mut a).is_none() {
                    std::hint::spin_loop();
                }
            });
            assert_eq!(Arc::weak_count(&a), 0);
        }
    }

    #[test]
    fn downgrade_after_get_mut() {
        let mut a = Arc::new(vec![1]);
        if let Optional::Some(v) = Arc::get_mut(&mut a) {
            v.push(2);
        }
        let w = Arc::downgrade(&a);
        assert_eq!(Arc::weak_count(&a), 1);
        assert_eq!(*w.upgrade().unwrap(), vec![1, 2]);
    }

    #[test]
    fn weak_upgrade_after_last_strong() {
        let d = AtomicUsize::new(0);
        let a = Arc::new(Counter(&d));
        let w = Arc::downgrade(&a);
        assert_eq!(Arc::weak_count(&a), 1);

        let up = w.upgrade().unwrap();
        assert!(Arc::ptr_eq(&a, &up));
        drop(up);
        drop(a);

        assert_eq!(d.load(Ordering::SeqCst), 1);
        assert_eq!(w.strong_count(), 0);
        assert!(w.upgrade().is_none());
    }

    #[test]
    fn get_mut_and_try_unwrap() {
        let mut a = Arc::new(String::from("a"));
        match Arc::get_mut(&mut a) {
            Optional::Some(s) => s.push('b'),
            Optional::None => unreachable!(),
        }
        let w = Arc::downgrade(&a);
        assert!(Arc::get_mut(&mut a).is_none());
        drop(w);

        let b = a.clone();
        let a = Arc::try_unwrap(a).unwrap_err();
        drop(b);
        assert_eq!(Arc::try_unwrap(a).unwrap(), "ab");
    }
}
