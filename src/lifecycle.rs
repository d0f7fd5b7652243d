use std::fmt;

/// Phase/lifecycle bits of a connection, excluding the pending-handshake-kind
/// bits (see [`crate::handshake::HandshakeSet`]) and the current-interest
/// bits (see [`crate::interest::Interest`]), which are modelled as their own
/// typed groups rather than folded into one opaque integer.
#[derive(Copy, Clone, Eq, PartialEq, Default)]
pub struct LifecycleFlags(u16);

const WAIT_L4_CONN: u16 = 0b000_0001;
const WAIT_L6_CONN: u16 = 0b000_0010;
const CONNECTED: u16 = 0b000_0100;
const ERROR: u16 = 0b000_1000;
const INIT_SESS: u16 = 0b001_0000;
const NOTIFY_SI: u16 = 0b010_0000;
const POLL_SOCK: u16 = 0b100_0000;

macro_rules! flag_accessors {
    ($is:ident, $set:ident, $clear:ident, $bit:expr) => {
        #[inline]
        pub const fn $is(self) -> bool {
            self.0 & $bit != 0
        }

        #[inline]
        pub fn $set(&mut self) {
            self.0 |= $bit;
        }

        #[inline]
        pub fn $clear(&mut self) {
            self.0 &= !$bit;
        }
    };
}

impl LifecycleFlags {
    pub const fn empty() -> LifecycleFlags {
        LifecycleFlags(0)
    }

    flag_accessors!(is_wait_l4_conn, set_wait_l4_conn, clear_wait_l4_conn, WAIT_L4_CONN);
    flag_accessors!(is_wait_l6_conn, set_wait_l6_conn, clear_wait_l6_conn, WAIT_L6_CONN);
    flag_accessors!(is_connected, set_connected, clear_connected, CONNECTED);
    flag_accessors!(is_init_sess, set_init_sess, clear_init_sess, INIT_SESS);
    flag_accessors!(is_notify_si, set_notify_si, clear_notify_si, NOTIFY_SI);
    flag_accessors!(is_poll_sock, set_poll_sock, clear_poll_sock, POLL_SOCK);

    /// `ERROR` is latched: there is no `clear_error`. It is monotonic for a
    /// connection's lifetime.
    #[inline]
    pub const fn is_error(self) -> bool {
        self.0 & ERROR != 0
    }

    #[inline]
    pub fn set_error(&mut self) {
        self.0 |= ERROR;
    }

    /// The established edge: no connection-wait bit is set and `CONNECTED`
    /// has not already been latched.
    #[inline]
    pub const fn is_establishing(self) -> bool {
        !self.is_wait_l4_conn() && !self.is_wait_l6_conn() && !self.is_connected()
    }
}

impl fmt::Debug for LifecycleFlags {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut dbg = fmt.debug_set();
        if self.is_wait_l4_conn() {
            dbg.entry(&"WAIT_L4_CONN");
        }
        if self.is_wait_l6_conn() {
            dbg.entry(&"WAIT_L6_CONN");
        }
        if self.is_connected() {
            dbg.entry(&"CONNECTED");
        }
        if self.is_error() {
            dbg.entry(&"ERROR");
        }
        if self.is_init_sess() {
            dbg.entry(&"INIT_SESS");
        }
        if self.is_notify_si() {
            dbg.entry(&"NOTIFY_SI");
        }
        if self.is_poll_sock() {
            dbg.entry(&"POLL_SOCK");
        }
        dbg.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_has_no_clear_method_and_starts_unset() {
        let flags = LifecycleFlags::empty();
        assert!(!flags.is_error());
    }

    #[test]
    fn establishing_iff_both_wait_bits_clear_and_not_yet_connected() {
        let mut flags = LifecycleFlags::empty();
        assert!(flags.is_establishing());

        flags.set_wait_l4_conn();
        assert!(!flags.is_establishing());

        flags.clear_wait_l4_conn();
        assert!(flags.is_establishing());

        flags.set_connected();
        assert!(!flags.is_establishing());
    }
}
