//! The OS lock objects behind [`crate::Mutex`] and [`crate::SharedMutex`].
//!
//! On Linux both wait on a futex. Elsewhere the same state machines run on a
//! plain atomic and waiting degrades to spinning and yielding the thread.

use std::hint::spin_loop;
use std::sync::atomic::Ordering;

#[cfg(target_os = "linux")]
type Futex = linux_futex::Futex<linux_futex::Private>;

#[cfg(not(target_os = "linux"))]
use fallback::Futex;

#[cfg(not(target_os = "linux"))]
mod fallback {
    use std::sync::atomic::{AtomicU32, Ordering};

    pub struct Futex {
        pub value: AtomicU32,
    }

    impl Futex {
        pub const fn new(value: u32) -> Self {
            Self {
                value: AtomicU32::new(value),
            }
        }

        pub fn wait(&self, expected: u32) -> Result<(), ()> {
            if self.value.load(Ordering::Relaxed) == expected {
                std::thread::yield_now();
            }
            Ok(())
        }

        pub fn wake(&self, _n: i32) -> i32 {
            0
        }
    }
}

const SPIN_LIMIT: u32 = 100;

const UNLOCKED: u32 = 0;
const LOCKED: u32 = 1;
// locked, and somebody may be sleeping on the futex
const CONTENDED: u32 = 2;

/// An exclusive lock with no payload. Blocks, never times out.
pub struct RawMutex {
    futex: Futex,
}

impl RawMutex {
    pub fn new() -> Self {
        Self {
            futex: Futex::new(UNLOCKED),
        }
    }

    pub fn lock(&self) {
        if self
            .futex
            .value
            .compare_exchange(UNLOCKED, LOCKED, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            self.lock_contended();
        }
    }

    #[cold]
    fn lock_contended(&self) {
        for _ in 0..SPIN_LIMIT {
            if self.futex.value.load(Ordering::Relaxed) == UNLOCKED
                && self
                    .futex
                    .value
                    .compare_exchange(UNLOCKED, LOCKED, Ordering::Acquire, Ordering::Relaxed)
                    .is_ok()
            {
                return;
            }
            spin_loop();
        }

        // From here on we may sleep, so the lock must stay marked contended
        // for whoever unlocks it.
        while self.futex.value.swap(CONTENDED, Ordering::Acquire) != UNLOCKED {
            let _ = self.futex.wait(CONTENDED);
        }
    }

    /// # Safety
    /// The calling context must hold the lock.
    pub unsafe fn unlock(&self) {
        if self.futex.value.swap(UNLOCKED, Ordering::Release) == CONTENDED {
            self.futex.wake(1);
        }
    }

    pub fn is_locked(&self) -> bool {
        self.futex.value.load(Ordering::Relaxed) != UNLOCKED
    }
}

impl Default for RawMutex {
    fn default() -> Self {
        Self::new()
    }
}

// Low 30 bits: reader count, or all ones when write locked.
const READ_MASK: u32 = (1 << 30) - 1;
const WRITE_LOCKED: u32 = READ_MASK;
const MAX_READERS: u32 = READ_MASK - 1;
const WRITERS_WAITING: u32 = 1 << 30;
const READERS_WAITING: u32 = 1 << 31;
const WAITING: u32 = WRITERS_WAITING | READERS_WAITING;

/// A readers-writer lock with no payload.
///
/// A waiting writer holds new readers back, so a steady stream of readers
/// can't starve it.
pub struct RawSharedMutex {
    futex: Futex,
}

impl RawSharedMutex {
    pub fn new() -> Self {
        Self {
            futex: Futex::new(0),
        }
    }

    pub fn lock_shared(&self) {
        let state = &self.futex.value;
        loop {
            let s = state.load(Ordering::Relaxed);
            if s & WRITERS_WAITING == 0 && s & READ_MASK < MAX_READERS {
                if state
                    .compare_exchange_weak(s, s + 1, Ordering::Acquire, Ordering::Relaxed)
                    .is_ok()
                {
                    return;
                }
                spin_loop();
                continue;
            }
            if s & READERS_WAITING == 0
                && state
                    .compare_exchange(s, s | READERS_WAITING, Ordering::Relaxed, Ordering::Relaxed)
                    .is_err()
            {
                continue;
            }
            let _ = self.futex.wait(s | READERS_WAITING);
        }
    }

    /// # Safety
    /// The calling context must hold a shared lock.
    pub unsafe fn unlock_shared(&self) {
        let prev = self.futex.value.fetch_sub(1, Ordering::Release);
        let readers = prev & READ_MASK;
        debug_assert!(readers > 0 && readers != WRITE_LOCKED);
        if (readers == 1 && prev & WRITERS_WAITING != 0) || readers == MAX_READERS {
            self.futex.wake(i32::MAX);
        }
    }

    pub fn lock(&self) {
        let state = &self.futex.value;
        loop {
            let s = state.load(Ordering::Relaxed);
            if s & READ_MASK == 0 {
                // Waiting bits are kept: other sleepers still need the wake on unlock.
                if state
                    .compare_exchange(s, s | WRITE_LOCKED, Ordering::Acquire, Ordering::Relaxed)
                    .is_ok()
                {
                    return;
                }
                continue;
            }
            if s & WRITERS_WAITING == 0
                && state
                    .compare_exchange(s, s | WRITERS_WAITING, Ordering::Relaxed, Ordering::Relaxed)
                    .is_err()
            {
                continue;
            }
            let _ = self.futex.wait(s | WRITERS_WAITING);
        }
    }

    /// # Safety
    /// The calling context must hold the exclusive lock.
    pub unsafe fn unlock(&self) {
        let prev = self.futex.value.swap(0, Ordering::Release);
        debug_assert_eq!(prev & READ_MASK, WRITE_LOCKED);
        if prev & WAITING != 0 {
            self.futex.wake(i32::MAX);
        }
    }

    pub fn is_locked_exclusive(&self) -> bool {
        self.futex.value.load(Ordering::Relaxed) & READ_MASK == WRITE_LOCKED
    }

    pub fn readers(&self) -> u32 {
        match self.futex.value.load(Ordering::Relaxed) & READ_MASK {
            WRITE_LOCKED => 0,
            n => n,
        }
    }
}

impl Default for RawSharedMutex {
    fn default() -> Self {
        Self::new()
    }
}
