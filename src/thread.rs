use std::any::Any;
use std::thread::JoinHandle;

use crate::error::{Error, Result};

/// A native OS thread.
///
/// `join` blocks until the thread finishes. Dropping a `Thread` that was
/// never joined detaches it: the thread keeps running on its own.
/// Everything the thread runs must be `Send`, which is how the capability
/// traits gate what may cross to it.
pub struct Thread<R = ()> {
    handle: Option<JoinHandle<R>>,
}

/// Options for spawning a [`Thread`].
#[derive(Debug, Default)]
pub struct ThreadBuilder {
    name: Option<String>,
    stack_size: Option<usize>,
}

impl ThreadBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn stack_size(mut self, size: usize) -> Self {
        self.stack_size = Some(size);
        self
    }

    pub fn spawn<F, R>(self, f: F) -> Result<Thread<R>>
    where
        F: FnOnce() -> R + Send + 'static,
        R: Send + 'static,
    {
        let mut builder = std::thread::Builder::new();
        if let Some(name) = &self.name {
            builder = builder.name(name.clone());
        }
        if let Some(size) = self.stack_size {
            builder = builder.stack_size(size);
        }

        let handle = builder.spawn(f)?;
        tracing::trace!(thread = ?handle.thread().id(), name = ?self.name, "spawned thread");
        Ok(Thread {
            handle: Some(handle),
        })
    }
}

impl Thread {
    pub fn builder() -> ThreadBuilder {
        ThreadBuilder::default()
    }
}

impl<R: Send + 'static> Thread<R> {
    /// Spawns `f` on a new thread. Failing to create the thread is fatal.
    #[track_caller]
    pub fn spawn<F>(f: F) -> Self
    where
        F: FnOnce() -> R + Send + 'static,
    {
        match Self::try_spawn(f) {
            Ok(thread) => thread,
            Err(err) => crate::panic::panic(err),
        }
    }

    pub fn try_spawn<F>(f: F) -> Result<Self>
    where
        F: FnOnce() -> R + Send + 'static,
    {
        ThreadBuilder::default().spawn(f)
    }

    /// Runs `f(args)` on a new thread; `args` crosses over with it.
    #[track_caller]
    pub fn spawn_with<F, A>(f: F, args: A) -> Self
    where
        F: FnOnce(A) -> R + Send + 'static,
        A: Send + 'static,
    {
        Self::spawn(move || f(args))
    }

    pub fn is_finished(&self) -> bool {
        match &self.handle {
            Some(handle) => handle.is_finished(),
            None => true,
        }
    }

    /// Waits for the thread and returns what it produced. A panic inside the
    /// thread comes back as [`Error::Panicked`].
    pub fn join(mut self) -> Result<R> {
        // Only Drop takes the handle otherwise, and join consumes self.
        let Some(handle) = self.handle.take() else {
            unreachable!("thread handle taken before join")
        };
        let id = handle.thread().id();
        let joined = handle.join();
        tracing::trace!(thread = ?id, ok = joined.is_ok(), "joined thread");
        joined.map_err(|payload| Error::Panicked(panic_message(payload.as_ref())))
    }
}

impl<R> Drop for Thread<R> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            tracing::trace!(thread = ?handle.thread().id(), "detaching thread");
            drop(handle);
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        String::from("non-string panic payload")
    }
}

/// Only Send values can be moved into a thread.
/// ```compile_fail
///  use ownership::{Rc, Thread};
///  let rc = Rc::new(1);
///  Thread::spawn(move || *rc).join().unwrap();
/// ```
#[allow(dead_code)]
struct ThreadUnsafeTest {}

/// A thread is joined at most once.
/// ```compile_fail
///  use ownership::Thread;
///  let t = Thread::spawn(|| 1);
///  let _ = t.join();
///  let _ = t.join();
/// ```
#[allow(dead_code)]
struct JoinOnceTest {}
