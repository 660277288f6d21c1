//! Unified error type.

use std::fmt;

/// Boxed error returned by user callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The error type surfaced by trellis's fallible operations.
///
/// A request that matches nothing is not an error — it produces the default
/// not-found response. Malformed templates are not errors either;
/// registration never fails. What remains: a middleware driving its
/// continuation twice (a programming defect, reported fatally instead of
/// executing the downstream chain again), a user callback failing
/// (propagated through [`Router::handle`](crate::Router::handle) unmodified
/// — the serving layer decides how to surface it), and the server failing to
/// bind or accept.
#[derive(Debug)]
pub enum Error {
    /// A middleware invoked its continuation more than once within a single
    /// invocation.
    DoubleContinuation,
    /// A handler or middleware callback failed.
    Callback(BoxError),
    /// Binding the listener or accepting a connection failed.
    Io(std::io::Error),
}

impl Error {
    /// Wraps a user-side failure for propagation out of a callback.
    pub fn callback(err: impl Into<BoxError>) -> Self {
        Self::Callback(err.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DoubleContinuation => f.write_str("continuation invoked more than once"),
            Self::Callback(err) => write!(f, "callback: {err}"),
            Self::Io(err) => write!(f, "io: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::DoubleContinuation => None,
            Self::Callback(err) => Some(&**err as &(dyn std::error::Error + 'static)),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
