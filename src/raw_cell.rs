use std::cell::UnsafeCell;

/// The primitive every interior-mutability type in this crate is built on.
///
/// A `RawCell<T>` hands out a `*mut T` through `&self`. It enforces nothing:
/// callers that touch the pointer must serialize themselves, through a borrow
/// counter ([`crate::RefCell`]), a lock ([`crate::Mutex`]) or by never giving
/// references out ([`crate::Cell`]).
///
/// `RawCell` is never `Sync`, so every wrapper has to opt back into sharing
/// explicitly.
#[repr(transparent)]
pub struct RawCell<T: ?Sized> {
    value: UnsafeCell<T>,
}

impl<T> RawCell<T> {
    pub const fn new(value: T) -> Self {
        Self {
            value: UnsafeCell::new(value),
        }
    }

    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }
}

impl<T: ?Sized> RawCell<T> {
    pub const fn get(&self) -> *mut T {
        self.value.get()
    }

    /// Unique access needs no bookkeeping, the borrow checker already proves it.
    pub fn get_mut(&mut self) -> &mut T {
        self.value.get_mut()
    }
}

impl<T: Default> Default for RawCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// ```compile_fail
/// use ownership::RawCell;
/// fn shareable<T: Sync>(_: &T) {}
/// shareable(&RawCell::new(0));
/// ```
#[allow(dead_code)]
struct RawCellIsNotSync;
