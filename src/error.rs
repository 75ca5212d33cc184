use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Everything the primitives in this crate can report.
///
/// Contract violations are still fatal: the non-try paths hand these values to
/// [`crate::panic::panic`] as the message. Only thread spawning and joining
/// return them to the caller.
#[derive(Debug, Error)]
pub enum Error {
    #[error("already mutably borrowed")]
    AlreadyMutablyBorrowed,

    #[error("already borrowed")]
    AlreadyBorrowed,

    #[error("{0} is none")]
    NoneUnwrapped(&'static str),

    #[error("{0} is err")]
    ErrUnwrapped(&'static str),

    #[error("failed to spawn thread: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("thread panicked: {0}")]
    Panicked(String),
}
