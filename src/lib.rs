//! Per-connection I/O state machine and poll-intent reconciliation core.
//!
//! This crate models one connection's flags, the pluggable handshake
//! sub-protocol dispatch it goes through before data can flow, the
//! recv/send data-phase dispatcher, and the reconciler that turns a
//! connection's desired interest into the minimal set of calls on an
//! injected [`EventFacility`]. It does not open sockets, run an event loop,
//! or implement any particular wire protocol on its own; those are
//! supplied by the surrounding proxy through the traits in
//! [`connection`], [`facility`], [`session`] and [`notify`].
//!
//! # Example
//!
//! ```
//! use connio::edge::EdgeFlags;
//! use connio::handshake::HandshakeRegistry;
//! use connio::readiness::on_readiness;
//! use connio::sources::Sources;
//! use connio::testing::RecordingFacility;
//! use connio::token::Token;
//!
//! # use connio::connection::{AppCallbacks, Connection, ConnectProbe, SockOps};
//! # use connio::notify::Notifier;
//! # use connio::session::SessionBuilder;
//! # use std::sync::Arc;
//! # struct Cb;
//! # impl AppCallbacks for Cb {
//! #     fn recv(&mut self, _conn: &mut Connection) {}
//! #     fn send(&mut self, _conn: &mut Connection) {}
//! # }
//! # struct Ops;
//! # impl SockOps for Ops {
//! #     fn tcp_connect_probe(&self, _token: Token) -> ConnectProbe { ConnectProbe::Established }
//! # }
//! # struct NoSession;
//! # impl SessionBuilder for NoSession {
//! #     fn build(&self, _conn: &Connection) -> bool { true }
//! # }
//! # struct NoNotify;
//! # impl Notifier for NoNotify {
//! #     fn notify(&self, _conn: &Connection) {}
//! # }
//! let mut sources = Sources::new();
//! sources.insert(Connection::new(Token(1), Box::new(Cb), Arc::new(Ops)));
//!
//! let facility = RecordingFacility::new();
//! let registry = HandshakeRegistry::new(&[]);
//! let mut edge = EdgeFlags::POLL_IN | EdgeFlags::POLL_OUT;
//!
//! on_readiness(&mut sources, Token(1), &mut edge, &registry, &facility, &NoSession, &NoNotify)
//!     .expect("recording facility never fails");
//! ```

#[macro_use]
mod macros;

pub mod connection;
pub mod data_phase;
pub mod edge;
pub mod error;
pub mod facility;
pub mod handshake;
pub mod interest;
pub mod lifecycle;
pub mod notify;
pub mod readiness;
pub mod reconcile;
pub mod session;
pub mod sources;
pub mod testing;
pub mod token;

cfg_epoll_selector! {
    pub mod selector;
}

pub use connection::{AppCallbacks, Connection, ConnectProbe, SockOps};
pub use data_phase::{run_data_phase, DataPhaseOutcome};
pub use edge::EdgeFlags;
pub use error::{Error, Result};
pub use facility::EventFacility;
pub use handshake::{
    run_handshake, HandshakeBit, HandshakeFlags, HandshakeHandler, HandshakeOutcome, HandshakeRegistry,
};
pub use interest::{DirInterest, Interest};
pub use lifecycle::LifecycleFlags;
pub use notify::Notifier;
pub use readiness::{on_readiness, ReadinessOutcome};
pub use reconcile::reconcile;
pub use session::{complete_session, fail_session, SessionBuilder};
pub use sources::Sources;
pub use token::Token;

cfg_epoll_selector! {
    pub use selector::EpollFacility;
}
