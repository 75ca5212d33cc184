use std::mem::ManuallyDrop;
use std::ops::Deref;

/// Holds a value whose destructor never runs on its own.
///
/// Reference-counted control blocks keep their payload in a `SuppressedDrop`
/// so the payload is destroyed exactly once, when the strong count reaches
/// zero, and not again when the block itself is freed.
pub struct SuppressedDrop<T> {
    value: ManuallyDrop<T>,
    #[cfg(debug_assertions)]
    destroyed: bool,
}

impl<T> SuppressedDrop<T> {
    pub const fn new(value: T) -> Self {
        Self {
            value: ManuallyDrop::new(value),
            #[cfg(debug_assertions)]
            destroyed: false,
        }
    }

    pub fn get(&self) -> &T {
        self.check_alive();
        &self.value
    }

    pub fn get_mut(&mut self) -> &mut T {
        self.check_alive();
        &mut self.value
    }

    /// Runs the payload's destructor now.
    ///
    /// # Safety
    /// Must be called at most once, and the payload must not be touched
    /// afterwards. Debug builds panic on a second call.
    pub unsafe fn destroy(&mut self) {
        self.check_alive();
        #[cfg(debug_assertions)]
        {
            self.destroyed = true;
        }
        // SAFETY: the caller guarantees this is the only destruction.
        unsafe { ManuallyDrop::drop(&mut self.value) };
    }

    /// Moves the payload out in place, leaving the wrapper in the destroyed
    /// state.
    ///
    /// # Safety
    /// Same contract as [`SuppressedDrop::destroy`]: the payload must not be
    /// destroyed, taken or touched afterwards.
    pub unsafe fn take(&mut self) -> T {
        self.check_alive();
        #[cfg(debug_assertions)]
        {
            self.destroyed = true;
        }
        // SAFETY: the caller guarantees the slot is never read again.
        unsafe { ManuallyDrop::take(&mut self.value) }
    }

    /// Moves the payload out. The wrapper is consumed, so nothing can destroy
    /// it a second time.
    pub fn into_inner(self) -> T {
        self.check_alive();
        ManuallyDrop::into_inner(self.value)
    }

    #[inline]
    fn check_alive(&self) {
        #[cfg(debug_assertions)]
        if self.destroyed {
            crate::panic::panic_lifetime("use of a destroyed value");
        }
    }
}

impl<T> Deref for SuppressedDrop<T> {
    type Target = T;
    fn deref(&self) -> &T {
        self.get()
    }
}
