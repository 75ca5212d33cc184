use std::sync::atomic::{self, Ordering};

mod sealed {
    pub trait Sealed {}
}

/// Integer types that have a lock-free atomic counterpart.
pub trait AtomicInteger: sealed::Sealed + Copy {
    #[doc(hidden)]
    type Repr: Send + Sync;

    #[doc(hidden)]
    fn new_repr(value: Self) -> Self::Repr;
    #[doc(hidden)]
    fn fetch_add(repr: &Self::Repr, value: Self, order: Ordering) -> Self;
    #[doc(hidden)]
    fn fetch_sub(repr: &Self::Repr, value: Self, order: Ordering) -> Self;
    #[doc(hidden)]
    fn load(repr: &Self::Repr, order: Ordering) -> Self;
    #[doc(hidden)]
    fn store(repr: &Self::Repr, value: Self, order: Ordering);
    #[doc(hidden)]
    fn compare_exchange(
        repr: &Self::Repr,
        current: Self,
        new: Self,
        success: Ordering,
        failure: Ordering,
    ) -> Result<Self, Self>;
    #[doc(hidden)]
    fn compare_exchange_weak(
        repr: &Self::Repr,
        current: Self,
        new: Self,
        success: Ordering,
        failure: Ordering,
    ) -> Result<Self, Self>;
    #[doc(hidden)]
    fn wrapping_add(self, rhs: Self) -> Self;
    #[doc(hidden)]
    fn wrapping_sub(self, rhs: Self) -> Self;
    #[doc(hidden)]
    fn one() -> Self;
}

macro_rules! atomic_integer {
    ($($int:ty => $atomic:ty),* $(,)?) => {$(
        impl sealed::Sealed for $int {}

        impl AtomicInteger for $int {
            type Repr = $atomic;

            fn new_repr(value: Self) -> Self::Repr {
                <$atomic>::new(value)
            }
            fn fetch_add(repr: &Self::Repr, value: Self, order: Ordering) -> Self {
                repr.fetch_add(value, order)
            }
            fn fetch_sub(repr: &Self::Repr, value: Self, order: Ordering) -> Self {
                repr.fetch_sub(value, order)
            }
            fn load(repr: &Self::Repr, order: Ordering) -> Self {
                repr.load(order)
            }
            fn store(repr: &Self::Repr, value: Self, order: Ordering) {
                repr.store(value, order)
            }
            fn compare_exchange(
                repr: &Self::Repr,
                current: Self,
                new: Self,
                success: Ordering,
                failure: Ordering,
            ) -> Result<Self, Self> {
                repr.compare_exchange(current, new, success, failure)
            }
            fn compare_exchange_weak(
                repr: &Self::Repr,
                current: Self,
                new: Self,
                success: Ordering,
                failure: Ordering,
            ) -> Result<Self, Self> {
                repr.compare_exchange_weak(current, new, success, failure)
            }
            fn wrapping_add(self, rhs: Self) -> Self {
                <$int>::wrapping_add(self, rhs)
            }
            fn wrapping_sub(self, rhs: Self) -> Self {
                <$int>::wrapping_sub(self, rhs)
            }
            fn one() -> Self {
                1
            }
        }
    )*};
}

atomic_integer! {
    i8 => atomic::AtomicI8,
    u8 => atomic::AtomicU8,
    i16 => atomic::AtomicI16,
    u16 => atomic::AtomicU16,
    i32 => atomic::AtomicI32,
    u32 => atomic::AtomicU32,
    i64 => atomic::AtomicI64,
    u64 => atomic::AtomicU64,
    isize => atomic::AtomicIsize,
    usize => atomic::AtomicUsize,
}

/// An integer with atomic read-modify-write operations.
///
/// The plain methods use `Ordering::SeqCst`; the `_explicit` variants take the
/// ordering from the caller. Arithmetic wraps on overflow. There is no
/// `Clone`: two handles to one counter are made by sharing a reference.
pub struct AtomicCounter<T: AtomicInteger> {
    repr: T::Repr,
}

impl<T: AtomicInteger> AtomicCounter<T> {
    pub fn new(value: T) -> Self {
        Self {
            repr: T::new_repr(value),
        }
    }

    pub fn fetch_add(&self, value: T) -> T {
        self.fetch_add_explicit(value, Ordering::SeqCst)
    }

    pub fn fetch_add_explicit(&self, value: T, order: Ordering) -> T {
        T::fetch_add(&self.repr, value, order)
    }

    pub fn add_fetch(&self, value: T) -> T {
        self.add_fetch_explicit(value, Ordering::SeqCst)
    }

    pub fn add_fetch_explicit(&self, value: T, order: Ordering) -> T {
        T::fetch_add(&self.repr, value, order).wrapping_add(value)
    }

    pub fn fetch_sub(&self, value: T) -> T {
        self.fetch_sub_explicit(value, Ordering::SeqCst)
    }

    pub fn fetch_sub_explicit(&self, value: T, order: Ordering) -> T {
        T::fetch_sub(&self.repr, value, order)
    }

    pub fn sub_fetch(&self, value: T) -> T {
        self.sub_fetch_explicit(value, Ordering::SeqCst)
    }

    pub fn sub_fetch_explicit(&self, value: T, order: Ordering) -> T {
        T::fetch_sub(&self.repr, value, order).wrapping_sub(value)
    }

    pub fn load(&self) -> T {
        self.load_explicit(Ordering::SeqCst)
    }

    pub fn load_explicit(&self, order: Ordering) -> T {
        T::load(&self.repr, order)
    }

    pub fn store(&self, value: T) {
        self.store_explicit(value, Ordering::SeqCst)
    }

    pub fn store_explicit(&self, value: T, order: Ordering) {
        T::store(&self.repr, value, order)
    }

    /// Stores `new` if the value is still `current`. Returns the previous
    /// value, `Err` when it did not match.
    pub fn compare_exchange(
        &self,
        current: T,
        new: T,
        success: Ordering,
        failure: Ordering,
    ) -> Result<T, T> {
        T::compare_exchange(&self.repr, current, new, success, failure)
    }

    /// Applies `f` until it either declines (returns `None`) or the value was
    /// swapped in without interference. Returns the previous value.
    pub fn fetch_update<F>(&self, set_order: Ordering, fetch_order: Ordering, mut f: F) -> Result<T, T>
    where
        F: FnMut(T) -> Option<T>,
    {
        let mut prev = self.load_explicit(fetch_order);
        while let Some(next) = f(prev) {
            match T::compare_exchange_weak(&self.repr, prev, next, set_order, fetch_order) {
                Ok(x) => return Ok(x),
                Err(actual) => prev = actual,
            }
        }
        Err(prev)
    }

    /// `++counter`
    pub fn increment(&self) -> T {
        self.add_fetch(T::one())
    }

    /// `counter++`
    pub fn post_increment(&self) -> T {
        self.fetch_add(T::one())
    }

    /// `--counter`
    pub fn decrement(&self) -> T {
        self.sub_fetch(T::one())
    }

    /// `counter--`
    pub fn post_decrement(&self) -> T {
        self.fetch_sub(T::one())
    }
}

impl<T: AtomicInteger + Default> Default for AtomicCounter<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: AtomicInteger + std::fmt::Debug> std::fmt::Debug for AtomicCounter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("AtomicCounter").field(&self.load()).finish()
    }
}
