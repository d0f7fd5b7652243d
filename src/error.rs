use std::fmt;
use std::io;

/// Crate-level error type.
///
/// The connection state machine itself never returns `Result`. A failure
/// there is the latched `ERROR` lifecycle bit, per the error handling
/// design. `Result` only appears at the genuine I/O boundary: the
/// [`EventFacility`] trait methods and the session-completion shim.
///
/// [`EventFacility`]: crate::facility::EventFacility
#[derive(Debug)]
pub enum Error {
    /// A syscall made on behalf of the event facility failed (e.g.
    /// `epoll_ctl`, `epoll_create1`, `epoll_wait`).
    Io(io::Error),
    /// The upper-layer session constructor invoked by the session-completion
    /// shim failed. The connection has already been destroyed by the time
    /// this is returned.
    SessionFailed,
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(fmt, "event facility I/O error: {}", err),
            Error::SessionFailed => fmt.write_str("embryonic session construction failed"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::SessionFailed => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
