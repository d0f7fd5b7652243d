//! Pluggable handshake sub-protocols.
//!
//! Each kind is a single bit in [`HandshakeFlags`] paired with a
//! [`HandshakeHandler`] in a [`HandshakeRegistry`], scanned in declaration
//! order by [`run_handshake`]. Adding a new kind means appending to the
//! registry; the dispatcher itself never hard-codes a kind.

use std::fmt;

use log::trace;

use crate::connection::Connection;
use crate::facility::EventFacility;

/// A single pending-handshake-kind bit.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct HandshakeBit(u16);

impl HandshakeBit {
    /// Inbound PROXY-protocol header must be parsed before anything else
    /// runs on this connection.
    pub const ACCEPT_PROXY: HandshakeBit = HandshakeBit(1 << 0);
    /// Outbound PROXY-protocol header must be emitted toward the server.
    pub const SI_SEND_PROXY: HandshakeBit = HandshakeBit(1 << 1);

    /// Construct a caller-defined kind for a handshake sub-protocol beyond
    /// the two built in (e.g. a TLS engine's renegotiation kind). Callers
    /// are responsible for keeping bit values distinct and for appending,
    /// never reordering, entries already in production use.
    pub const fn new(bit_index: u32) -> HandshakeBit {
        HandshakeBit(1 << bit_index)
    }
}

impl fmt::Debug for HandshakeBit {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "HandshakeBit({:#06b})", self.0)
    }
}

/// The set of pending handshake-kind bits on a connection.
///
/// `is_empty()` is exactly the negation of the connection's derived
/// `HANDSHAKE` condition: handshake is not pending iff no handshake-kind bit
/// is set.
#[derive(Copy, Clone, Eq, PartialEq, Default)]
pub struct HandshakeFlags(u16);

impl HandshakeFlags {
    pub const fn empty() -> HandshakeFlags {
        HandshakeFlags(0)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn contains(self, bit: HandshakeBit) -> bool {
        self.0 & bit.0 != 0
    }

    #[inline]
    pub fn insert(&mut self, bit: HandshakeBit) {
        self.0 |= bit.0;
    }

    #[inline]
    pub fn remove(&mut self, bit: HandshakeBit) {
        self.0 &= !bit.0;
    }
}

impl fmt::Debug for HandshakeFlags {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(fmt, "HandshakeFlags({:#06b})", self.0)
    }
}

/// A handshake sub-handler: `(conn, kind_bit) -> done?`.
///
/// Returns `true` iff the handler has cleared its bit from
/// `conn.handshake` and taken responsibility for any further polling it
/// needs; `false` otherwise, in which case it must have left exactly the
/// interest bits on `conn` it requires before the next edge.
pub trait HandshakeHandler {
    fn handle(&self, conn: &mut Connection, bit: HandshakeBit, facility: &dyn EventFacility) -> bool;
}

/// Ordered `(bit, handler)` pairs, scanned front-to-back by
/// [`run_handshake`]. Order is significant, see module docs.
pub struct HandshakeRegistry<'a> {
    entries: &'a [(HandshakeBit, &'a dyn HandshakeHandler)],
}

impl<'a> HandshakeRegistry<'a> {
    pub const fn new(entries: &'a [(HandshakeBit, &'a dyn HandshakeHandler)]) -> Self {
        HandshakeRegistry { entries }
    }
}

/// Result of one dispatcher scan.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum HandshakeOutcome {
    /// No pending handshake-kind bit remains; `conn.lifecycle.is_error()` is
    /// false.
    Done,
    /// A sub-handler reported "needs more I/O"; the cycle must be abandoned.
    Pending,
    /// A sub-handler latched `ERROR`.
    Failed,
}

/// Scan `registry` in declaration order, invoking the sub-handler for each
/// pending bit present on `conn`. See module docs for semantics.
pub fn run_handshake(
    conn: &mut Connection,
    registry: &HandshakeRegistry<'_>,
    facility: &dyn EventFacility,
) -> HandshakeOutcome {
    for &(bit, handler) in registry.entries {
        if !conn.handshake.contains(bit) {
            continue;
        }

        let done = handler.handle(conn, bit, facility);

        if conn.lifecycle.is_error() {
            trace!("{:?}: handshake bit {:?} failed", conn.token, bit);
            return HandshakeOutcome::Failed;
        }

        if !done {
            trace!("{:?}: handshake bit {:?} still pending", conn.token, bit);
            return HandshakeOutcome::Pending;
        }
    }

    if conn.handshake.is_empty() {
        HandshakeOutcome::Done
    } else {
        // A handler cleared its own bit but left others pending without
        // reporting `false`; treat as still in progress rather than panic.
        HandshakeOutcome::Pending
    }
}
