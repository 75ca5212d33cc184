use crate::cell::Cell;
use crate::exclusive_box::ExclusiveBox;
use crate::optional::Optional;
use crate::suppressed_drop::SuppressedDrop;
use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

/// Single-threaded reference-counting pointers. ‘Rc’ stands for ‘Reference Counted’.
/// The type Rc<T> provides shared ownership of a value of type T, allocated in the heap.
/// Invoking clone on Rc produces a new pointer to the same allocation in the heap.
/// When the last Rc pointer to a given allocation is destroyed, the value stored
/// in that allocation (often referred to as “inner value”) is also dropped.
/// The allocation itself lives on until the last Weak pointer is gone too.
///
/// Rc is neither Send nor Sync: its counters are plain cells.
pub struct Rc<T> {
    inner: NonNull<RcInner<T>>,
    _marker: PhantomData<RcInner<T>>,
}

struct RcInner<T> {
    value: SuppressedDrop<T>,
    strong: Cell<usize>,
    // every strong owner together hold one weak reference
    weak: Cell<usize>,
}

impl<T> RcInner<T> {
    fn inc_strong(&self) {
        let s = self.strong.get();
        if s == usize::MAX {
            std::process::abort();
        }
        self.strong.set(s + 1);
    }

    fn inc_weak(&self) {
        let w = self.weak.get();
        if w == usize::MAX {
            std::process::abort();
        }
        self.weak.set(w + 1);
    }
}

/// Releases one weak reference and frees the block when it was the last.
///
/// # Safety
/// `inner` must point to a live block and the caller must own one weak reference.
unsafe fn release_weak<T>(inner: NonNull<RcInner<T>>) {
    let w = {
        // SAFETY: the block is alive while we hold a weak reference.
        let block = unsafe { inner.as_ref() };
        let w = block.weak.get() - 1;
        block.weak.set(w);
        w
    };
    if w == 0 {
        // SAFETY: the payload is already gone and nobody else refers to the block.
        drop(unsafe { ExclusiveBox::from_raw(inner.as_ptr()) });
    }
}

impl<T> Rc<T> {
    pub fn new(value: T) -> Self {
        let inner = ExclusiveBox::new(RcInner {
            value: SuppressedDrop::new(value),
            strong: Cell::new(1),
            weak: Cell::new(1),
        });

        Self {
            // SAFETY: leak never returns null.
            inner: unsafe { NonNull::new_unchecked(inner.leak()) },
            _marker: PhantomData,
        }
    }

    fn inner(&self) -> &RcInner<T> {
        // SAFETY: the block outlives every strong owner.
        unsafe { self.inner.as_ref() }
    }

    pub fn strong_count(this: &Self) -> usize {
        this.inner().strong.get()
    }

    pub fn weak_count(this: &Self) -> usize {
        this.inner().weak.get() - 1
    }

    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        this.inner == other.inner
    }

    pub fn downgrade(this: &Self) -> Weak<T> {
        this.inner().inc_weak();
        Weak {
            inner: this.inner,
            _marker: PhantomData,
        }
    }

    /// Mutable access, only granted while no other Rc or Weak exists.
    pub fn get_mut(this: &mut Self) -> Optional<&mut T> {
        let inner = this.inner();
        if inner.strong.get() != 1 || inner.weak.get() != 1 {
            return Optional::None;
        }
        // SAFETY: we are the only handle to the block.
        Optional::Some(unsafe { (*this.inner.as_ptr()).value.get_mut() })
    }

    /// Moves the value out when this is the last strong owner.
    pub fn try_unwrap(this: Self) -> Result<T, Self> {
        if Rc::strong_count(&this) != 1 {
            return Err(this);
        }
        let inner = this.inner;
        std::mem::forget(this);
        // SAFETY: we were the last strong owner, so the payload is ours to move
        // and the implicit weak reference is ours to release.
        unsafe {
            (*inner.as_ptr()).strong.set(0);
            let value = (*inner.as_ptr()).value.take();
            release_weak(inner);
            Ok(value)
        }
    }
}

impl<T> Clone for Rc<T> {
    fn clone(&self) -> Self {
        self.inner().inc_strong();
        Rc {
            inner: self.inner,
            _marker: PhantomData,
        }
    }
}

impl<T> std::ops::Deref for Rc<T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        self.inner().value.get()
    }
}

impl<T> Drop for Rc<T> {
    fn drop(&mut self) {
        let inner = self.inner();
        let s = inner.strong.get() - 1;
        inner.strong.set(s);

        if s == 0 {
            // SAFETY: the strong count just went 1 -> 0, so this is the one
            // destruction of the payload, then the strong owners' weak reference goes.
            unsafe {
                (*self.inner.as_ptr()).value.destroy();
                release_weak(self.inner);
            }
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Rc<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

impl<T: fmt::Display> fmt::Display for Rc<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&**self, f)
    }
}

/// A non-owning handle to an Rc allocation.
///
/// It keeps the control block alive but not the value; `upgrade` hands out a
/// new Rc only while some strong owner still exists.
pub struct Weak<T> {
    inner: NonNull<RcInner<T>>,
    _marker: PhantomData<RcInner<T>>,
}

impl<T> Weak<T> {
    fn inner(&self) -> &RcInner<T> {
        // SAFETY: the block outlives every weak owner.
        unsafe { self.inner.as_ref() }
    }

    pub fn upgrade(&self) -> Optional<Rc<T>> {
        let inner = self.inner();
        if inner.strong.get() == 0 {
            return Optional::None;
        }
        inner.inc_strong();
        Optional::Some(Rc {
            inner: self.inner,
            _marker: PhantomData,
        })
    }

    pub fn strong_count(&self) -> usize {
        self.inner().strong.get()
    }
}

impl<T> Clone for Weak<T> {
    fn clone(&self) -> Self {
        self.inner().inc_weak();
        Weak {
            inner: self.inner,
            _marker: PhantomData,
        }
    }
}

impl<T> Drop for Weak<T> {
    fn drop(&mut self) {
        // SAFETY: this handle owns one weak reference.
        unsafe { release_weak(self.inner) };
    }
}

/*
# Strong (Rc<T>)

## Owns the data:
Increases the strong reference count and keeps the value alive.

## Controls deallocation:
The value is dropped only when the strong count becomes zero.

# Weak (Weak<T>)

## Does NOT own the data:
Does not keep the value alive; increases only the weak count.

## Must be upgraded:
Access requires upgrade() → Optional<Rc<T>>, which is None if all strong pointers are gone.
*/

/// Rc<T> never crosses threads, whatever T is.
/// ```compile_fail
///  use ownership::Rc;
///  let a = Rc::new(1);
///  std::thread::spawn(move || { let _ = *a; });
/// ```
#[allow(dead_code)]
struct ThreadUnsafeTest {}
