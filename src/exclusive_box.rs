use std::alloc::{self, Layout};
use std::fmt;
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};
use std::ptr::{self, NonNull};

use crate::optional::Optional;

/// Sole ownership of one heap allocation.
///
/// The value is constructed in place on creation and destroyed, then freed,
/// when the box goes out of scope. Moving the box moves ownership; the moved
/// from binding can no longer be named. Running out of memory aborts the
/// process through `std::alloc::handle_alloc_error`.
pub struct ExclusiveBox<T> {
    ptr: NonNull<T>,
    _marker: PhantomData<T>,
}

/// An owning pointer that may also be empty.
pub type UniquePtr<T> = Optional<ExclusiveBox<T>>;

unsafe impl<T: Send> Send for ExclusiveBox<T> {}
unsafe impl<T: Sync> Sync for ExclusiveBox<T> {}

impl<T> ExclusiveBox<T> {
    pub fn new(value: T) -> Self {
        let ptr = allocate::<T>();
        // SAFETY: fresh allocation, sized and aligned for T.
        unsafe { ptr.as_ptr().write(value) };
        Self {
            ptr,
            _marker: PhantomData,
        }
    }

    pub fn make_default() -> Self
    where
        T: Default,
    {
        Self::new(T::default())
    }

    /// Takes back ownership of a pointer produced by [`ExclusiveBox::leak`].
    ///
    /// # Safety
    /// `raw` must come from `leak` and must not be owned by anything else.
    pub unsafe fn from_raw(raw: *mut T) -> Self {
        let ptr = match NonNull::new(raw) {
            Some(ptr) => ptr,
            None => crate::panic::panic("ExclusiveBox::from_raw on a null pointer"),
        };
        Self {
            ptr,
            _marker: PhantomData,
        }
    }

    /// The raw pointer, ownership stays with the box.
    pub fn get(&self) -> *mut T {
        self.ptr.as_ptr()
    }

    pub fn borrow(&self) -> &T {
        // SAFETY: the allocation lives as long as the box and holds a valid T.
        unsafe { self.ptr.as_ref() }
    }

    pub fn borrow_mut(&mut self) -> &mut T {
        // SAFETY: &mut self proves no other borrow of the payload is alive.
        unsafe { self.ptr.as_mut() }
    }

    /// Gives up ownership. The caller is now responsible for the value and
    /// the allocation, usually via [`ExclusiveBox::from_raw`].
    pub fn leak(self) -> *mut T {
        ManuallyDrop::new(self).ptr.as_ptr()
    }

    /// Moves the payload out and frees the allocation without dropping the
    /// payload a second time.
    pub fn into_inner(self) -> T {
        let this = ManuallyDrop::new(self);
        // SAFETY: the payload is read exactly once, then only the memory is freed.
        unsafe {
            let value = ptr::read(this.ptr.as_ptr());
            deallocate(this.ptr);
            value
        }
    }
}

fn allocate<T>() -> NonNull<T> {
    let layout = Layout::new::<T>();
    if layout.size() == 0 {
        return NonNull::dangling();
    }
    // SAFETY: layout has a non-zero size.
    let raw = unsafe { alloc::alloc(layout) } as *mut T;
    match NonNull::new(raw) {
        Some(ptr) => ptr,
        None => alloc::handle_alloc_error(layout),
    }
}

/// # Safety
/// `ptr` must come from `allocate::<T>` and its payload must already be gone.
unsafe fn deallocate<T>(ptr: NonNull<T>) {
    let layout = Layout::new::<T>();
    if layout.size() != 0 {
        unsafe { alloc::dealloc(ptr.as_ptr() as *mut u8, layout) };
    }
}

impl<T> Drop for ExclusiveBox<T> {
    fn drop(&mut self) {
        // SAFETY: the box owns a live payload; after this nothing refers to it.
        unsafe {
            ptr::drop_in_place(self.ptr.as_ptr());
            deallocate(self.ptr);
        }
    }
}

impl<T> Deref for ExclusiveBox<T> {
    type Target = T;
    fn deref(&self) -> &T {
        self.borrow()
    }
}

impl<T> DerefMut for ExclusiveBox<T> {
    fn deref_mut(&mut self) -> &mut T {
        self.borrow_mut()
    }
}

/// Duplicating a box clones the payload into a fresh allocation.
impl<T: Clone> Clone for ExclusiveBox<T> {
    fn clone(&self) -> Self {
        Self::new(self.borrow().clone())
    }
}

impl<T: Default> Default for ExclusiveBox<T> {
    fn default() -> Self {
        Self::make_default()
    }
}

impl<T: PartialEq> PartialEq for ExclusiveBox<T> {
    fn eq(&self, other: &Self) -> bool {
        self.borrow() == other.borrow()
    }
}

impl<T: fmt::Debug> fmt::Debug for ExclusiveBox<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.borrow(), f)
    }
}
