use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

use crate::cell::Cell;
use crate::error::Error;
use crate::optional::Optional;
use crate::panic::panic;
use crate::raw_cell::RawCell;

/// A view of a RefCell's borrow counter.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BorrowState {
    Shared(usize),
    Exclusive,
    Unshared,
}

/// A mutable memory location with dynamically checked borrow rules.
/// RefCell<T> uses a signed counter to implement “dynamic borrowing”,
/// a process whereby one can claim temporary, exclusive, mutable access to the inner value.
/// Borrows for RefCell<T>s are tracked at runtime by the Ref and RefMut guards,
/// unlike Rust’s native reference types which are entirely tracked statically, at compile time.
pub struct RefCell<T> {
    value: RawCell<T>,
    // n > 0 -> n Ref alive, -1 -> one RefMut alive, 0 -> unborrowed
    borrow: Cell<isize>,
}

impl<T> RefCell<T> {
    pub const fn new(value: T) -> RefCell<T> {
        Self {
            value: RawCell::new(value),
            borrow: Cell::new(0),
        }
    }

    pub fn state(&self) -> BorrowState {
        match self.borrow.get() {
            0 => BorrowState::Unshared,
            -1 => BorrowState::Exclusive,
            n => BorrowState::Shared(n as usize),
        }
    }

    pub fn try_borrow(&self) -> Optional<Ref<'_, T>> {
        if self.borrow.get() < 0 {
            return Optional::None;
        }
        Optional::Some(Ref::new(self))
    }

    pub fn try_borrow_mut(&self) -> Optional<RefMut<'_, T>> {
        if self.borrow.get() != 0 {
            return Optional::None;
        }
        Optional::Some(RefMut::new(self))
    }

    #[track_caller]
    pub fn borrow(&self) -> Ref<'_, T> {
        match self.try_borrow() {
            Optional::Some(r) => r,
            Optional::None => {
                tracing::debug!(state = ?self.state(), "shared borrow refused");
                panic(Error::AlreadyMutablyBorrowed)
            }
        }
    }

    #[track_caller]
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        match self.try_borrow_mut() {
            Optional::Some(r) => r,
            Optional::None => {
                let state = self.state();
                tracing::debug!(state = ?state, "exclusive borrow refused");
                match state {
                    BorrowState::Exclusive => panic(Error::AlreadyMutablyBorrowed),
                    BorrowState::Shared(_) | BorrowState::Unshared => {
                        panic(Error::AlreadyBorrowed)
                    }
                }
            }
        }
    }

    /// Swaps in `value` under an exclusive borrow and returns the old value.
    #[track_caller]
    pub fn replace(&self, value: T) -> T {
        std::mem::replace(&mut *self.borrow_mut(), value)
    }

    /// Unique access through &mut self skips the counter entirely.
    pub fn get_mut(&mut self) -> &mut T {
        self.value.get_mut()
    }

    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }
}

impl<T: Default> Default for RefCell<T> {
    fn default() -> Self {
        RefCell::new(T::default())
    }
}

/// A shared borrow of a RefCell. Cloning it adds another shared borrow.
pub struct Ref<'refcell, T> {
    cell: &'refcell RefCell<T>,
}

impl<'refcell, T> Ref<'refcell, T> {
    #[track_caller]
    fn new(cell: &'refcell RefCell<T>) -> Self {
        let b = cell.borrow.get();
        debug_assert!(b >= 0);
        if b == isize::MAX {
            panic("too many shared borrows");
        }
        cell.borrow.set(b + 1);
        Ref { cell }
    }
}

impl<T> Clone for Ref<'_, T> {
    fn clone(&self) -> Self {
        Ref::new(self.cell)
    }
}

impl<T> Drop for Ref<'_, T> {
    fn drop(&mut self) {
        let b = self.cell.borrow.get();
        debug_assert!(b > 0);
        self.cell.borrow.set(b - 1);
    }
}

impl<T> Deref for Ref<'_, T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        // SAFETY: the counter is positive while we live, so no RefMut exists.
        unsafe { &*self.cell.value.get() }
    }
}

/// The exclusive borrow of a RefCell.
pub struct RefMut<'refcell, T> {
    cell: &'refcell RefCell<T>,
    _marker: PhantomData<&'refcell mut T>,
}

impl<'refcell, T> RefMut<'refcell, T> {
    fn new(cell: &'refcell RefCell<T>) -> Self {
        debug_assert_eq!(cell.borrow.get(), 0);
        cell.borrow.set(-1);
        RefMut {
            cell,
            _marker: PhantomData,
        }
    }
}

impl<T> Drop for RefMut<'_, T> {
    fn drop(&mut self) {
        let b = self.cell.borrow.get();
        debug_assert_eq!(b, -1);
        self.cell.borrow.set(b + 1);
    }
}

impl<T> Deref for RefMut<'_, T> {
    type Target = T;
    fn deref(&self) -> &Self::Target {
        // SAFETY: the counter is -1 while we live, so we are the only borrow.
        unsafe { &*self.cell.value.get() }
    }
}

impl<T> DerefMut for RefMut<'_, T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        // SAFETY: as above.
        unsafe { &mut *self.cell.value.get() }
    }
}

/// RefCell<T> is !Sync, so it can't be shared between threads.
/// ```compile_fail
///  use ownership::{Arc, RefCell};
///  let cell = Arc::new(RefCell::new(0));
///  std::thread::spawn(move || { *cell.borrow_mut() = 1; });
/// ```
#[allow(dead_code)]
struct ThreadUnsafeTest {}
