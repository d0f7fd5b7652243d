use std::sync::Arc;

use connio::connection::{AppCallbacks, ConnectProbe, Connection, SockOps};
use connio::edge::EdgeFlags;
use connio::handshake::{HandshakeBit, HandshakeHandler, HandshakeRegistry};
use connio::interest::{DirInterest, Interest};
use connio::notify::Notifier;
use connio::readiness::{on_readiness, ReadinessOutcome};
use connio::session::SessionBuilder;
use connio::sources::Sources;
use connio::testing::{Call, RecordingFacility};
use connio::token::Token;

struct NoopCallbacks;
impl AppCallbacks for NoopCallbacks {
    fn recv(&mut self, _conn: &mut Connection) {}
    fn send(&mut self, _conn: &mut Connection) {}
}

struct PendingConnect;
impl SockOps for PendingConnect {
    fn tcp_connect_probe(&self, _token: Token) -> ConnectProbe {
        ConnectProbe::Pending
    }
}

struct EstablishedConnect;
impl SockOps for EstablishedConnect {
    fn tcp_connect_probe(&self, _token: Token) -> ConnectProbe {
        ConnectProbe::Established
    }
}

struct AlwaysSucceeds;
impl SessionBuilder for AlwaysSucceeds {
    fn build(&self, _conn: &Connection) -> bool {
        true
    }
}

struct RecordingNotifier {
    notified: std::sync::atomic::AtomicBool,
}

impl RecordingNotifier {
    fn new() -> RecordingNotifier {
        RecordingNotifier {
            notified: std::sync::atomic::AtomicBool::new(false),
        }
    }

    fn was_notified(&self) -> bool {
        self.notified.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, _conn: &Connection) {
        self.notified.store(true, std::sync::atomic::Ordering::SeqCst);
    }
}

/// A handler that consumes its bit on the first call and reports success.
struct ConsumesImmediately;
impl HandshakeHandler for ConsumesImmediately {
    fn handle(&self, conn: &mut Connection, bit: HandshakeBit, _facility: &dyn connio::facility::EventFacility) -> bool {
        conn.handshake.remove(bit);
        true
    }
}

/// A handler that always latches `ERROR` and leaves its bit set.
struct AlwaysFails;
impl HandshakeHandler for AlwaysFails {
    fn handle(&self, conn: &mut Connection, _bit: HandshakeBit, _facility: &dyn connio::facility::EventFacility) -> bool {
        conn.lifecycle.set_error();
        false
    }
}

#[test]
fn fresh_accept_with_proxy_header_reaches_data_phase_connected() {
    let mut sources = Sources::new();
    let mut conn = Connection::new(Token(1), Box::new(NoopCallbacks), Arc::new(EstablishedConnect));
    conn.handshake.insert(HandshakeBit::ACCEPT_PROXY);
    conn.lifecycle.set_init_sess();
    conn.desired = Interest::new(DirInterest::WANT, DirInterest::NONE);
    sources.insert(conn);

    let handler = ConsumesImmediately;
    let entries: [(HandshakeBit, &dyn HandshakeHandler); 1] = [(HandshakeBit::ACCEPT_PROXY, &handler)];
    let registry = HandshakeRegistry::new(&entries);
    let facility = RecordingFacility::new();
    let session_builder = AlwaysSucceeds;
    let notifier = RecordingNotifier::new();
    let mut edge = EdgeFlags::POLL_IN;

    let outcome = on_readiness(
        &mut sources,
        Token(1),
        &mut edge,
        &registry,
        &facility,
        &session_builder,
        &notifier,
    )
    .unwrap();

    assert_eq!(outcome, ReadinessOutcome::Handled);
    let conn = sources.get_mut(Token(1)).unwrap();
    assert!(conn.handshake.is_empty());
    assert!(!conn.lifecycle.is_init_sess());
    assert!(conn.lifecycle.is_connected());
    assert!(!conn.lifecycle.is_error());
    assert_eq!(edge, EdgeFlags::EMPTY);
}

#[test]
fn proxy_parse_failure_destroys_the_embryonic_connection() {
    let mut sources = Sources::new();
    let mut conn = Connection::new(Token(2), Box::new(NoopCallbacks), Arc::new(PendingConnect));
    conn.handshake.insert(HandshakeBit::ACCEPT_PROXY);
    conn.lifecycle.set_init_sess();
    sources.insert(conn);

    let handler = AlwaysFails;
    let entries: [(HandshakeBit, &dyn HandshakeHandler); 1] = [(HandshakeBit::ACCEPT_PROXY, &handler)];
    let registry = HandshakeRegistry::new(&entries);
    let facility = RecordingFacility::new();
    let session_builder = AlwaysSucceeds;
    let notifier = RecordingNotifier::new();
    let mut edge = EdgeFlags::POLL_IN;

    let outcome = on_readiness(
        &mut sources,
        Token(2),
        &mut edge,
        &registry,
        &facility,
        &session_builder,
        &notifier,
    )
    .unwrap();

    assert_eq!(outcome, ReadinessOutcome::ConnectionDestroyed);
    assert!(!sources.contains(Token(2)));
    assert!(!notifier.was_notified());
}

#[test]
fn outgoing_connect_establishes_and_lets_reconciler_retire_write_interest() {
    let mut sources = Sources::new();
    let mut conn = Connection::new(Token(3), Box::new(NoopCallbacks), Arc::new(EstablishedConnect));
    conn.lifecycle.set_wait_l4_conn();
    conn.interest = Interest::new(DirInterest::NONE, DirInterest::WANT);
    conn.desired = Interest::NONE;
    sources.insert(conn);

    let registry = HandshakeRegistry::new(&[]);
    let facility = RecordingFacility::new();
    let session_builder = AlwaysSucceeds;
    let notifier = RecordingNotifier::new();
    let mut edge = EdgeFlags::POLL_OUT;

    on_readiness(
        &mut sources,
        Token(3),
        &mut edge,
        &registry,
        &facility,
        &session_builder,
        &notifier,
    )
    .unwrap();

    let conn = sources.get_mut(Token(3)).unwrap();
    assert!(!conn.lifecycle.is_wait_l4_conn());
    assert!(conn.lifecycle.is_connected());
    assert_eq!(facility.calls_for(Token(3)), vec![Call::StopSend]);
}

#[test]
fn renegotiation_mid_stream_completes_within_one_cycle() {
    struct RenegotiatesThenSucceeds;
    impl AppCallbacks for RenegotiatesThenSucceeds {
        fn recv(&mut self, conn: &mut Connection) {
            conn.handshake.insert(HandshakeBit::SI_SEND_PROXY);
        }
        fn send(&mut self, _conn: &mut Connection) {}
    }

    let mut sources = Sources::new();
    let conn = Connection::new(Token(5), Box::new(RenegotiatesThenSucceeds), Arc::new(EstablishedConnect));
    sources.insert(conn);

    let handler = ConsumesImmediately;
    let entries: [(HandshakeBit, &dyn HandshakeHandler); 1] = [(HandshakeBit::SI_SEND_PROXY, &handler)];
    let registry = HandshakeRegistry::new(&entries);
    let facility = RecordingFacility::new();
    let session_builder = AlwaysSucceeds;
    let notifier = RecordingNotifier::new();
    let mut edge = EdgeFlags::POLL_IN | EdgeFlags::POLL_OUT;

    let outcome = on_readiness(
        &mut sources,
        Token(5),
        &mut edge,
        &registry,
        &facility,
        &session_builder,
        &notifier,
    )
    .unwrap();

    assert_eq!(outcome, ReadinessOutcome::Handled);
    assert!(sources.get_mut(Token(5)).unwrap().handshake.is_empty());
}

#[test]
fn unowned_descriptor_is_a_no_op() {
    let mut sources = Sources::new();
    let registry = HandshakeRegistry::new(&[]);
    let facility = RecordingFacility::new();
    let session_builder = AlwaysSucceeds;
    let notifier = RecordingNotifier::new();
    let mut edge = EdgeFlags::POLL_IN;

    let outcome = on_readiness(
        &mut sources,
        Token(99),
        &mut edge,
        &registry,
        &facility,
        &session_builder,
        &notifier,
    )
    .unwrap();

    assert_eq!(outcome, ReadinessOutcome::Unowned);
    assert_eq!(edge, EdgeFlags::POLL_IN);
    assert!(facility.calls_for(Token(99)).is_empty());
}

#[test]
fn interest_edge_minimality_issues_exactly_one_poll_recv() {
    let mut sources = Sources::new();
    let mut conn = Connection::new(Token(4), Box::new(NoopCallbacks), Arc::new(EstablishedConnect));
    conn.interest = Interest::new(DirInterest::WANT, DirInterest::NONE);
    conn.desired = Interest::new(DirInterest::POLL, DirInterest::NONE);
    sources.insert(conn);

    let registry = HandshakeRegistry::new(&[]);
    let facility = RecordingFacility::new();
    let session_builder = AlwaysSucceeds;
    let notifier = RecordingNotifier::new();
    let mut edge = EdgeFlags::EMPTY;

    on_readiness(
        &mut sources,
        Token(4),
        &mut edge,
        &registry,
        &facility,
        &session_builder,
        &notifier,
    )
    .unwrap();

    assert_eq!(facility.calls_for(Token(4)), vec![Call::PollRecv]);
    assert_eq!(sources.get_mut(Token(4)).unwrap().interest.recv, DirInterest::POLL);
}
