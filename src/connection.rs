//! The central entity: one connection's flags, callbacks and transport
//! handle.

use std::sync::Arc;

use crate::handshake::HandshakeFlags;
use crate::interest::Interest;
use crate::lifecycle::LifecycleFlags;
use crate::token::Token;

/// Outcome of [`SockOps::tcp_connect_probe`].
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ConnectProbe {
    /// The L4 connection is confirmed established.
    Established,
    /// Still waiting; no error observed.
    Pending,
    /// The probe observed an error on the descriptor. Latches `ERROR` on
    /// the connection rather than leaving that to the caller.
    Errored,
}

/// Lower-layer transport operations, provided by the surrounding proxy.
/// Held as an `Arc` rather than a boxed callback because, unlike the
/// application callbacks, probing a connect is read-only with respect to
/// the `Connection` and carries no per-call state to hand back.
pub trait SockOps: Send + Sync {
    fn tcp_connect_probe(&self, token: Token) -> ConnectProbe;
}

/// Application-layer recv/send callbacks.
///
/// Methods take the whole [`Connection`] (minus the callback object itself,
/// see [`Connection::call_recv`]/[`Connection::call_send`]) because they may
/// latch `ERROR` or re-raise `HANDSHAKE` on it. They must return promptly
/// and must not free the connection.
pub trait AppCallbacks {
    fn recv(&mut self, conn: &mut Connection);
    fn send(&mut self, conn: &mut Connection);
}

/// One connection's full state as seen by the core.
pub struct Connection {
    /// Opaque descriptor key into the event facility and the descriptor
    /// table.
    pub token: Token,
    /// Phase/lifecycle bits (`WAIT_L4_CONN`, `CONNECTED`, `ERROR`, ...).
    pub lifecycle: LifecycleFlags,
    /// Pending handshake-kind bits.
    pub handshake: HandshakeFlags,
    /// Currently-registered interest at the event facility, as last
    /// committed by the reconciler.
    pub interest: Interest,
    /// The interest upper layers currently want registered. Handshake
    /// sub-handlers and application callbacks adjust this directly while
    /// running; the readiness handler passes it to the reconciler as the
    /// cycle's target once the rest of the cycle has run.
    pub desired: Interest,
    app_cb: Option<Box<dyn AppCallbacks>>,
    sock_ops: Arc<dyn SockOps>,
}

impl Connection {
    pub fn new(token: Token, app_cb: Box<dyn AppCallbacks>, sock_ops: Arc<dyn SockOps>) -> Connection {
        Connection {
            token,
            lifecycle: LifecycleFlags::empty(),
            handshake: HandshakeFlags::empty(),
            interest: Interest::NONE,
            desired: Interest::NONE,
            app_cb: Some(app_cb),
            sock_ops,
        }
    }

    /// Invoke the application `recv` callback.
    ///
    /// The callback is temporarily taken out of `self` so it can be handed
    /// `&mut self` without a self-referential borrow, then put back; this is
    /// the "thin bridge" the data-phase dispatcher calls through.
    pub fn call_recv(&mut self) {
        let mut cb = self.app_cb.take().expect("app_cb missing mid-cycle");
        cb.recv(self);
        self.app_cb = Some(cb);
    }

    /// Invoke the application `send` callback. See [`Connection::call_recv`].
    pub fn call_send(&mut self) {
        let mut cb = self.app_cb.take().expect("app_cb missing mid-cycle");
        cb.send(self);
        self.app_cb = Some(cb);
    }

    pub fn tcp_connect_probe(&self) -> ConnectProbe {
        self.sock_ops.tcp_connect_probe(self.token)
    }
}
