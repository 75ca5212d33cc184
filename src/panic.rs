use std::fmt;
use std::panic::Location;

/// Category of a panic raised by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanicCode {
    Generic,
    Bounds,
    /// A value was used after its lifetime ended.
    Lifetime,
}

/// What happens once a panic has been reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Unwind the calling thread, like `std::panic!`.
    Unwind,
    /// Terminate the process. Selected with the `abort-on-panic` feature.
    Abort,
}

pub const fn strategy() -> Strategy {
    if cfg!(feature = "abort-on-panic") {
        Strategy::Abort
    } else {
        Strategy::Unwind
    }
}

/// Reports a contract violation at the caller's location. Never returns.
#[track_caller]
pub fn panic(msg: impl fmt::Display) -> ! {
    raise(PanicCode::Generic, &msg)
}

/// Reports an out-of-bounds access at the caller's location. Never returns.
#[track_caller]
pub fn panic_bounds(msg: impl fmt::Display) -> ! {
    raise(PanicCode::Bounds, &msg)
}

/// Reports use of a value that was already destroyed. Never returns.
#[track_caller]
pub fn panic_lifetime(msg: impl fmt::Display) -> ! {
    raise(PanicCode::Lifetime, &msg)
}

#[cold]
#[track_caller]
fn raise(code: PanicCode, msg: &dyn fmt::Display) -> ! {
    let location = Location::caller();
    tracing::error!(
        code = ?code,
        file = location.file(),
        line = location.line(),
        column = location.column(),
        "{msg}"
    );

    match strategy() {
        Strategy::Abort => {
            eprintln!("panicked at {location}\n{msg}");
            std::process::abort()
        }
        // The payload is the message as a String; the code only goes to the log.
        Strategy::Unwind => panic!("{msg}"),
    }
}
