use crate::error::Error;
use crate::panic::panic;

/// A value that may be absent.
///
/// Every fallible lookup in this crate (`RefCell::try_borrow`,
/// `Weak::upgrade`, ...) returns one. Reading the payload always goes through
/// an exhaustive `match`, or through one of the consuming accessors below.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[must_use]
pub enum Optional<T> {
    #[default]
    None,
    Some(T),
}

/// The two-case ok/err union produced by [`Optional::ok_or`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[must_use]
pub enum Expected<T, E> {
    Ok(T),
    Err(E),
}

/// Moves `src` into `dst` and returns what `dst` held before.
pub fn replace<T>(dst: &mut T, src: T) -> T {
    std::mem::replace(dst, src)
}

impl<T> Optional<T> {
    pub const fn some(value: T) -> Self {
        Optional::Some(value)
    }

    pub const fn none() -> Self {
        Optional::None
    }

    pub const fn is_some(&self) -> bool {
        match self {
            Optional::Some(_) => true,
            Optional::None => false,
        }
    }

    pub const fn is_none(&self) -> bool {
        !self.is_some()
    }

    pub const fn as_ref(&self) -> Optional<&T> {
        match self {
            Optional::Some(value) => Optional::Some(value),
            Optional::None => Optional::None,
        }
    }

    pub fn as_mut(&mut self) -> Optional<&mut T> {
        match self {
            Optional::Some(value) => Optional::Some(value),
            Optional::None => Optional::None,
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Optional<U> {
        match self {
            Optional::Some(value) => Optional::Some(f(value)),
            Optional::None => Optional::None,
        }
    }

    #[track_caller]
    pub fn unwrap(self) -> T {
        match self {
            Optional::Some(value) => value,
            Optional::None => panic(Error::NoneUnwrapped(std::any::type_name::<Self>())),
        }
    }

    #[track_caller]
    pub fn expect(self, msg: &str) -> T {
        match self {
            Optional::Some(value) => value,
            Optional::None => panic(msg),
        }
    }

    pub fn ok_or<E>(self, err: E) -> Expected<T, E> {
        match self {
            Optional::Some(value) => Expected::Ok(value),
            Optional::None => Expected::Err(err),
        }
    }

    /// Leaves `None` behind and returns the previous contents.
    pub fn take(&mut self) -> Optional<T> {
        replace(self, Optional::None)
    }

    /// Takes the payload only when `predicate` accepts it; otherwise the
    /// optional is left untouched and `None` is returned.
    pub fn take_if<P>(&mut self, predicate: P) -> Optional<T>
    where
        P: FnOnce(&mut T) -> bool,
    {
        let taken = match self {
            Optional::Some(value) => predicate(value),
            Optional::None => false,
        };
        if taken { self.take() } else { Optional::None }
    }
}

impl<T> From<Option<T>> for Optional<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Optional::Some(value),
            None => Optional::None,
        }
    }
}

impl<T> From<Optional<T>> for Option<T> {
    fn from(value: Optional<T>) -> Self {
        match value {
            Optional::Some(value) => Some(value),
            Optional::None => None,
        }
    }
}

impl<T, E> Expected<T, E> {
    pub const fn is_ok(&self) -> bool {
        match self {
            Expected::Ok(_) => true,
            Expected::Err(_) => false,
        }
    }

    pub const fn is_err(&self) -> bool {
        !self.is_ok()
    }

    #[track_caller]
    pub fn unwrap(self) -> T {
        match self {
            Expected::Ok(value) => value,
            Expected::Err(_) => panic(Error::ErrUnwrapped(std::any::type_name::<Self>())),
        }
    }

    #[track_caller]
    pub fn unwrap_err(self) -> E {
        match self {
            Expected::Ok(_) => panic(format_args!("{} is ok", std::any::type_name::<Self>())),
            Expected::Err(err) => err,
        }
    }
}

impl<T, E> From<Result<T, E>> for Expected<T, E> {
    fn from(value: Result<T, E>) -> Self {
        match value {
            Ok(value) => Expected::Ok(value),
            Err(err) => Expected::Err(err),
        }
    }
}

impl<T, E> From<Expected<T, E>> for Result<T, E> {
    fn from(value: Expected<T, E>) -> Self {
        match value {
            Expected::Ok(value) => Ok(value),
            Expected::Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct ErrorCode;

    #[test]
    fn test_unwrap_and_expect() {
        assert_eq!(Optional::some(-1).unwrap(), -1);
        assert_eq!(Optional::some(-1).expect("invalid optional used"), -1);
    }

    #[test]
    #[cfg(not(feature = "abort-on-panic"))]
    #[should_panic(expected = "is none")]
    fn test_unwrap_none_panics() {
        Optional::<i32>::none().unwrap();
    }

    #[test]
    #[cfg(not(feature = "abort-on-panic"))]
    #[should_panic(expected = "invalid optional used")]
    fn test_expect_none_panics() {
        Optional::<i32>::none().expect("invalid optional used");
    }

    #[test]
    fn test_ok_or() {
        let ok = Optional::some(-1).ok_or(ErrorCode);
        assert!(ok.is_ok());
        assert_eq!(ok.unwrap(), -1);

        let err = Optional::<i32>::none().ok_or(ErrorCode);
        assert_eq!(err, Expected::Err(ErrorCode));
        assert_eq!(err.unwrap_err(), ErrorCode);
    }

    #[test]
    #[cfg(not(feature = "abort-on-panic"))]
    #[should_panic(expected = "is err")]
    fn test_unwrap_err_panics() {
        Optional::<i32>::none().ok_or(ErrorCode).unwrap();
    }

    #[test]
    fn test_take() {
        let mut x = Optional::some(String::from("payload"));
        let taken = x.take();
        assert_eq!(taken, Optional::some(String::from("payload")));
        assert!(x.is_none());
        assert!(x.take().is_none());
    }

    #[test]
    fn test_take_if() {
        let mut x = Optional::some(4);
        assert!(x.take_if(|v| *v % 2 == 1).is_none());
        assert_eq!(x, Optional::some(4));

        assert_eq!(
            x.take_if(|v| {
                *v += 1;
                true
            }),
            Optional::some(5)
        );
        assert!(x.is_none());
    }

    #[test]
    fn test_option_conversions() {
        let o: Optional<u8> = Some(3).into();
        assert_eq!(o, Optional::Some(3));
        assert_eq!(Option::from(o.map(|v| v * 2)), Some(6));
        assert_eq!(Optional::<u8>::default(), Optional::None);

        let r: Result<u8, ErrorCode> = Expected::Err(ErrorCode).into();
        assert_eq!(r, Err(ErrorCode));
    }
}
