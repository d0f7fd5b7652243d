//! The event facility capability injected into the core.
//!
//! The core never talks to epoll/kqueue/IOCP directly; it calls these six
//! primitives on whatever [`EventFacility`] it was handed. Production code
//! injects [`crate::selector::EpollFacility`]; the core's own tests inject
//! [`crate::testing::RecordingFacility`].

use std::io;

use crate::token::Token;

/// The six registration primitives the reconciler issues.
///
/// Implementors take `&self`, not `&mut self`: the facility is shared across
/// every connection's owning thread and serializes access per descriptor
/// internally (see the concurrency model).
pub trait EventFacility {
    fn want_recv(&self, token: Token) -> io::Result<()>;
    fn stop_recv(&self, token: Token) -> io::Result<()>;
    fn poll_recv(&self, token: Token) -> io::Result<()>;

    fn want_send(&self, token: Token) -> io::Result<()>;
    fn stop_send(&self, token: Token) -> io::Result<()>;
    fn poll_send(&self, token: Token) -> io::Result<()>;
}
