//! The readiness handler: the entry point called by the event loop with a
//! descriptor. Composes the handshake dispatcher, the data-phase dispatcher,
//! post-I/O notification, established-edge detection and the reconciler.

use std::io;

use log::trace;

use crate::data_phase::{run_data_phase, DataPhaseOutcome};
use crate::edge::EdgeFlags;
use crate::facility::EventFacility;
use crate::handshake::{run_handshake, HandshakeOutcome, HandshakeRegistry};
use crate::notify::Notifier;
use crate::reconcile::reconcile;
use crate::session::{complete_session, fail_session, SessionBuilder};
use crate::sources::Sources;
use crate::token::Token;

/// What happened to the connection over the course of one call to
/// [`on_readiness`].
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ReadinessOutcome {
    /// The cycle ran to completion (possibly suspended awaiting more I/O);
    /// the connection is still alive in `sources`.
    Handled,
    /// `fdtab[fd].owner` resolved to nothing; the descriptor was closed
    /// between the kernel reporting the edge and user-space picking it up.
    /// No event-facility call was made and `edge` was left untouched.
    Unowned,
    /// The connection was destroyed this cycle, either by the
    /// session-completion shim or by the forced embryonic-abort path.
    ConnectionDestroyed,
}

/// Entry point for one readiness edge on `token`: dispatches any pending
/// handshake, runs the data phase, performs post-I/O notification and
/// established-edge detection, then reconciles the connection's desired
/// interest against what is currently registered.
pub fn on_readiness(
    sources: &mut Sources,
    token: Token,
    edge: &mut EdgeFlags,
    registry: &HandshakeRegistry<'_>,
    facility: &dyn EventFacility,
    session_builder: &dyn SessionBuilder,
    notifier: &dyn Notifier,
) -> io::Result<ReadinessOutcome> {
    // Step 1: owner_of(fd).
    if !sources.contains(token) {
        trace!("{:?}: readiness edge for an unowned descriptor, ignoring", token);
        return Ok(ReadinessOutcome::Unowned);
    }

    // Step 2: handshake dispatch, if pending.
    let mut suspended_in_handshake = false;
    let mut handshake_just_completed = false;
    {
        let conn = sources.get_mut(token).expect("checked above");
        if !conn.handshake.is_empty() {
            match run_handshake(conn, registry, facility) {
                HandshakeOutcome::Done => handshake_just_completed = true,
                HandshakeOutcome::Pending | HandshakeOutcome::Failed => {
                    suspended_in_handshake = true;
                }
            }
        }
    }

    if !suspended_in_handshake {
        // Step 3: a handshake that just finished and isn't keeping
        // POLL_SOCK set hands socket-layer polling over to whatever takes
        // over next (e.g. an upper mux), so the core stops it here. Only
        // directions actually registered are stopped, and only those;
        // bookkeeping is updated to match so step 9's reconcile call sees a
        // consistent `conn.interest` and doesn't reissue the same stop.
        {
            let conn = sources.get_mut(token).expect("checked above");
            if handshake_just_completed && !conn.lifecycle.is_poll_sock() {
                if conn.interest.recv.is_enabled() {
                    facility.stop_recv(token)?;
                }
                if conn.interest.send.is_enabled() {
                    facility.stop_send(token)?;
                }
                conn.interest = crate::interest::Interest::NONE;
            }
        }

        // Step 4: finish the embryonic session, if one is pending.
        let init_sess_pending = sources.get_mut(token).expect("checked above").lifecycle.is_init_sess();
        if init_sess_pending && complete_session(sources, token, session_builder).is_err() {
            return Ok(ReadinessOutcome::ConnectionDestroyed);
        }

        // Step 5: data phase.
        {
            let conn = sources.get_mut(token).expect("checked above");
            let _: DataPhaseOutcome = run_data_phase(conn, *edge, registry, facility);
        }
    }

    // Step 6: post-I/O notification.
    {
        let conn = sources.get_mut(token).expect("checked above");
        let embryonic_failure = conn.lifecycle.is_error() && conn.lifecycle.is_init_sess();
        let should_notify = !embryonic_failure && conn.lifecycle.is_notify_si();

        if embryonic_failure {
            let _ = fail_session(sources, token);
            return Ok(ReadinessOutcome::ConnectionDestroyed);
        }
        if should_notify {
            notifier.notify(conn);
        }
    }

    // Step 7: established edge.
    {
        let conn = sources.get_mut(token).expect("checked above");
        if conn.lifecycle.is_establishing() {
            conn.lifecycle.set_connected();
        }
    }

    // Step 8: clear the four consumed edge bits.
    edge.clear();

    // Step 9: reconcile desired interest against what is currently
    // registered.
    {
        let conn = sources.get_mut(token).expect("checked above");
        let desired = conn.desired;
        reconcile(conn, desired, facility)?;
    }

    Ok(ReadinessOutcome::Handled)
}
