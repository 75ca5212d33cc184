use crate::raw_cell::RawCell;

/// Cell<T> implements interior mutability by copying values in and out of the cell.
/// An &T or &mut T to the inner value is never handed out through &self, so the
/// whole value is read with get and overwritten with set or replace.
///
/// Only `Copy` payloads are accepted: a `Copy` type has no user-defined clone
/// or destructor that could observe a half-written value and re-enter the cell.
/// Cell is not Sync, so it can't be shared across threads.
pub struct Cell<T: Copy> {
    value: RawCell<T>,
}

impl<T: Copy> Cell<T> {
    pub const fn new(value: T) -> Self {
        Self {
            value: RawCell::new(value),
        }
    }

    pub fn get(&self) -> T {
        // SAFETY: only this thread can reach the cell (!Sync), and no reference
        // into it is ever given out, so the read can't race a write.
        unsafe { *self.value.get() }
    }

    pub fn set(&self, value: T) {
        // SAFETY: same as get; T: Copy means overwriting runs no destructor.
        unsafe { *self.value.get() = value };
    }

    /// Swaps `value` in and returns what was stored, in one step.
    pub fn replace(&self, value: T) -> T {
        // SAFETY: same as get; no code runs between the read and the write.
        unsafe { std::ptr::replace(self.value.get(), value) }
    }

    pub fn get_mut(&mut self) -> &mut T {
        self.value.get_mut()
    }

    pub fn into_inner(self) -> T {
        self.value.into_inner()
    }
}

impl<T: Copy> Clone for Cell<T> {
    fn clone(&self) -> Self {
        Cell::new(self.get())
    }
}

impl<T: Copy + Default> Default for Cell<T> {
    fn default() -> Self {
        Cell::new(T::default())
    }
}

impl<T: Copy + std::fmt::Debug> std::fmt::Debug for Cell<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cell").field("value", &self.get()).finish()
    }
}

/// Implied by RawCell: Cell<T> is !Sync.
/// ```compile_fail
///  use ownership::{Arc, Cell};
///  let cell1 = Arc::new(Cell::new(0));
///  std::thread::spawn(move || { cell1.set(1); });
/// ```
#[allow(dead_code)]
struct ThreadUnsafeTest {}

#[cfg(test)]
mod tests {
    use super::Cell;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Copyable {
        x: i32,
    }

    #[test]
    fn test_cell() {
        struct SomeStruct {
            regular_field: u8,
            special_field: Cell<u8>,
        }

        let my_struct = SomeStruct {
            regular_field: 0,
            special_field: Cell::new(1),
        };

        let new_value = 100;
        my_struct.special_field.set(new_value);
        assert_eq!(my_struct.special_field.get(), new_value);
        assert_eq!(my_struct.regular_field, 0);
    }

    #[test]
    fn test_cell_mutate() {
        let x = Cell::new(Copyable { x: 42 });
        x.set(Copyable { x: 24 });
        assert_eq!(x.get().x, 24);

        let old = x.replace(Copyable { x: 1337 });
        assert_eq!(old.x, 24);
        assert_eq!(x.get().x, 1337);
    }

    #[test]
    fn test_replace_with_current_is_noop() {
        let c = Cell::new(-1);
        assert_eq!(c.replace(c.get()), -1);
        assert_eq!(c.get(), -1);
    }

    #[test]
    fn test_get_mut_and_into_inner() {
        let mut c = Cell::new(5u64);
        *c.get_mut() += 1;
        assert_eq!(c.clone().into_inner(), 6);
        assert_eq!(c.into_inner(), 6);
    }
}
