use std::fmt;

/// The registered interest for one direction (recv or send) at the event
/// facility, as a `(ENA, POL)` pair.
///
/// `ENA` alone ("want") asks the facility for a level-style notification on
/// every edge. `ENA | POL` ("poll") additionally asks for one explicit poll
/// edge; see [`crate::reconcile::reconcile`] for how the distinction drives
/// which of `want_*` / `poll_*` / `stop_*` gets called. The all-zero state
/// means the direction is not registered at all.
#[derive(Copy, Clone, Eq, PartialEq, Default)]
pub struct DirInterest(u8);

const ENA: u8 = 0b01;
const POL: u8 = 0b10;

impl DirInterest {
    /// Not registered.
    pub const NONE: DirInterest = DirInterest(0);
    /// Registered, level-style ("want").
    pub const WANT: DirInterest = DirInterest(ENA);
    /// Registered, with an explicit poll edge requested ("poll").
    pub const POLL: DirInterest = DirInterest(ENA | POL);

    #[inline]
    pub const fn is_enabled(self) -> bool {
        self.0 & ENA != 0
    }

    #[inline]
    pub const fn is_poll(self) -> bool {
        self.0 & POL != 0
    }
}

impl fmt::Debug for DirInterest {
    fn fmt(&self, fmt: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            DirInterest::NONE => fmt.write_str("NONE"),
            DirInterest::WANT => fmt.write_str("WANT"),
            DirInterest::POLL => fmt.write_str("POLL"),
            DirInterest(other) => write!(fmt, "DirInterest({:#04b})", other),
        }
    }
}

/// The full currently-registered (or desired) interest for a connection:
/// one [`DirInterest`] per direction.
///
/// This is both the shape of `conn.flags`'s current-interest bits and the
/// shape of the `new_bits` argument passed to [`reconcile`]; the reconciler
/// diffs one against the other.
///
/// [`reconcile`]: crate::reconcile::reconcile
#[derive(Copy, Clone, Eq, PartialEq, Default, Debug)]
pub struct Interest {
    pub recv: DirInterest,
    pub send: DirInterest,
}

impl Interest {
    pub const NONE: Interest = Interest {
        recv: DirInterest::NONE,
        send: DirInterest::NONE,
    };

    pub const fn new(recv: DirInterest, send: DirInterest) -> Interest {
        Interest { recv, send }
    }
}
