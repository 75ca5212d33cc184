pub mod arc;
mod atomic;
mod cell;
mod error;
mod exclusive_box;
pub mod marker;
mod mutex;
mod optional;
pub mod panic;
mod raw_cell;
pub mod raw_lock;
pub mod rc;
mod refcell;
mod shared_mutex;
mod suppressed_drop;
mod thread;

pub use arc::Arc;
pub use atomic::{AtomicCounter, AtomicInteger};
pub use cell::Cell;
pub use error::{Error, Result};
pub use exclusive_box::{ExclusiveBox, UniquePtr};
pub use mutex::{Mutex, MutexGuard};
pub use optional::{Expected, Optional, replace};
pub use raw_cell::RawCell;
pub use rc::Rc;
pub use refcell::{BorrowState, Ref, RefCell, RefMut};
pub use shared_mutex::{SharedMutex, SharedMutexGuard, SharedMutexReadGuard};
pub use suppressed_drop::SuppressedDrop;
pub use thread::{Thread, ThreadBuilder};

/*
# RawCell / SuppressedDrop

## The two unsafe building blocks:
RawCell hands out *mut T through &self and enforces nothing. SuppressedDrop holds a value
whose destructor only runs when destroy() is called, exactly once.

# ExclusiveBox

## Sole Ownership:
One heap allocation, one owner. leak() gives the pointer away, into_inner() gives the value back.

# Rc / Arc

## Multiple Ownership:
Allows multiple parts of the program to own the same value using reference counting.
The value is destroyed when the strong count goes 1 -> 0, the block when the weak count does.

## Immutable Only:
Does not allow mutation of the inner value unless combined with interior mutability types (e.g., Rc<RefCell<T>>).

# Cell

## Copy-by-Value Interior Mutability:
Allows mutation by replacing or copying the entire value (get, set, replace), only for Copy types.

## No References Given Out:
Cannot borrow &T or &mut T from a Cell<T> through &self; you only read/write the whole value.

# RefCell

## Interior Mutability via Runtime Borrow Checking:
Allows mutable or immutable borrows even through &T, with borrow rules enforced at runtime
by a signed counter: n > 0 readers, -1 one writer.

## Works for Complex / Non-Copy Types:
Supports borrowing references into the inner value (e.g., RefMut), enabling mutation of complex data structures like Vec<T>, HashMap, etc.

# Mutex / SharedMutex

## Interior Mutability across Threads:
The lock makes a Send payload Sync. Guards release on drop; the shared guard through its own unlock.
*/
