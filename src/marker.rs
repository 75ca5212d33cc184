//! Thread capabilities.
//!
//! "Transferable across threads" is `Send`, "shareable across threads" is
//! `Sync`. Both are auto traits: a struct, tuple or enum has them exactly when
//! every field does. The types in this crate adjust them where their
//! bookkeeping demands it:
//!
//! | type                  | Send                | Sync                |
//! | --------------------- | ------------------- | ------------------- |
//! | `RawCell<T>`          | `T: Send`           | never               |
//! | `Cell<T>`, `RefCell<T>` | `T: Send`         | never               |
//! | `Rc<T>`               | never               | never               |
//! | `Arc<T>`              | `T: Send + Sync`    | `T: Send + Sync`    |
//! | `Mutex<T>`            | `T: Send`           | `T: Send`           |
//! | `SharedMutex<T>`      | `T: Send`           | `T: Send + Sync`    |
//! | guards                | never               | `T: Sync`           |
//!
//! The functions here turn a capability into a compile-time check:
//!
//! ```
//! use ownership::marker::{assert_shareable, assert_transferable};
//! use ownership::{Arc, Cell, Mutex};
//!
//! assert_transferable::<Arc<Mutex<Cell<i32>>>>();
//! assert_shareable::<Mutex<Cell<i32>>>();
//! ```
//!
//! ```compile_fail
//! use ownership::marker::assert_shareable;
//! use ownership::Cell;
//!
//! assert_shareable::<Cell<i32>>();
//! ```
//!
//! ```compile_fail
//! use ownership::marker::assert_transferable;
//! use ownership::{Arc, Cell};
//!
//! assert_transferable::<Arc<Cell<i32>>>();
//! ```

/// A type that may be moved to another thread.
pub trait Transferable: Send {}
impl<T: ?Sized + Send> Transferable for T {}

/// A type that may be referenced from several threads at once.
pub trait Shareable: Sync {}
impl<T: ?Sized + Sync> Shareable for T {}

pub const fn assert_transferable<T: ?Sized + Transferable>() {}

pub const fn assert_shareable<T: ?Sized + Shareable>() {}
