//! Poll-intent reconciliation: the pure function from `(current, new)` to
//! the minimal sequence of event-facility operations, committing `new` into
//! the connection afterward.

use std::io;

use log::trace;

use crate::connection::Connection;
use crate::facility::EventFacility;
use crate::interest::{DirInterest, Interest};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum DirOp {
    Want,
    Stop,
    Poll,
}

/// Which, if any, of `want_*`/`stop_*`/`poll_*` the transition from
/// `current` to `new` requires. The three cases are mutually exclusive
/// given `DirInterest` has exactly three valid states.
fn diff(current: DirInterest, new: DirInterest) -> Option<DirOp> {
    if new.is_poll() && current != new {
        Some(DirOp::Poll)
    } else if !current.is_enabled() && new.is_enabled() && !new.is_poll() {
        Some(DirOp::Want)
    } else if current.is_enabled() && !new.is_enabled() {
        Some(DirOp::Stop)
    } else {
        None
    }
}

/// Reconcile `conn`'s currently-registered interest with `new`, issuing the
/// minimal set of calls on `facility` and then committing `new` into
/// `conn.interest`. No other field of `conn` is touched.
pub fn reconcile(conn: &mut Connection, new: Interest, facility: &dyn EventFacility) -> io::Result<()> {
    let token = conn.token;

    if let Some(op) = diff(conn.interest.recv, new.recv) {
        trace!("{:?}: recv {:?} -> {:?}, issuing {:?}", token, conn.interest.recv, new.recv, op);
        match op {
            DirOp::Want => facility.want_recv(token)?,
            DirOp::Stop => facility.stop_recv(token)?,
            DirOp::Poll => facility.poll_recv(token)?,
        }
    }

    if let Some(op) = diff(conn.interest.send, new.send) {
        trace!("{:?}: send {:?} -> {:?}, issuing {:?}", token, conn.interest.send, new.send, op);
        match op {
            DirOp::Want => facility.want_send(token)?,
            DirOp::Stop => facility.stop_send(token)?,
            DirOp::Poll => facility.poll_send(token)?,
        }
    }

    conn.interest = new;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::{AppCallbacks, Connection, ConnectProbe, SockOps};
    use crate::testing::{RecordingFacility, Call};
    use crate::token::Token;
    use std::sync::Arc;

    struct NoopCallbacks;
    impl AppCallbacks for NoopCallbacks {
        fn recv(&mut self, _conn: &mut Connection) {}
        fn send(&mut self, _conn: &mut Connection) {}
    }

    struct NoopSockOps;
    impl SockOps for NoopSockOps {
        fn tcp_connect_probe(&self, _token: Token) -> ConnectProbe {
            ConnectProbe::Pending
        }
    }

    fn new_conn() -> Connection {
        Connection::new(Token(7), Box::new(NoopCallbacks), Arc::new(NoopSockOps))
    }

    #[test]
    fn reconcile_with_unchanged_interest_issues_nothing() {
        let mut conn = new_conn();
        conn.interest = Interest::new(DirInterest::WANT, DirInterest::NONE);
        let facility = RecordingFacility::new();

        reconcile(&mut conn, conn.interest, &facility).unwrap();

        assert!(facility.calls_for(conn.token).is_empty());
    }

    #[test]
    fn back_to_back_reconcile_calls_issue_the_same_set_as_one() {
        let mut conn = new_conn();
        let facility = RecordingFacility::new();
        let target = Interest::new(DirInterest::POLL, DirInterest::NONE);

        reconcile(&mut conn, target, &facility).unwrap();
        let after_first = facility.calls_for(conn.token);

        reconcile(&mut conn, target, &facility).unwrap();
        let after_second = facility.calls_for(conn.token);

        assert_eq!(after_first, vec![Call::PollRecv]);
        assert_eq!(after_second, after_first);
    }

    #[test]
    fn minimal_edge_poll_recv_only_on_transition_to_poll() {
        let mut conn = new_conn();
        conn.interest = Interest::new(DirInterest::WANT, DirInterest::NONE);
        let facility = RecordingFacility::new();

        let new = Interest::new(DirInterest::POLL, DirInterest::NONE);
        reconcile(&mut conn, new, &facility).unwrap();

        assert_eq!(facility.calls_for(conn.token), vec![Call::PollRecv]);
        assert_eq!(conn.interest.recv, DirInterest::POLL);
    }

    #[test]
    fn want_then_stop_round_trips() {
        let mut conn = new_conn();
        let facility = RecordingFacility::new();

        reconcile(&mut conn, Interest::new(DirInterest::WANT, DirInterest::NONE), &facility).unwrap();
        reconcile(&mut conn, Interest::new(DirInterest::NONE, DirInterest::NONE), &facility).unwrap();

        assert_eq!(
            facility.calls_for(conn.token),
            vec![Call::WantRecv, Call::StopRecv]
        );
    }

    #[test]
    fn downgrade_from_poll_to_want_issues_nothing() {
        let mut conn = new_conn();
        conn.interest = Interest::new(DirInterest::POLL, DirInterest::NONE);
        let facility = RecordingFacility::new();

        reconcile(&mut conn, Interest::new(DirInterest::WANT, DirInterest::NONE), &facility).unwrap();

        assert!(facility.calls_for(conn.token).is_empty());
    }
}
