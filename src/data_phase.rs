//! The data-phase dispatcher: recv, then send, then the connect probe,
//! re-checking `ERROR` and `HANDSHAKE` after each half-step and returning to
//! the handshake dispatcher if a callback re-raised it.

use crate::connection::{Connection, ConnectProbe};
use crate::edge::EdgeFlags;
use crate::facility::EventFacility;
use crate::handshake::{run_handshake, HandshakeOutcome, HandshakeRegistry};

/// Where the full data phase stopped.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum DataPhaseOutcome {
    /// Ran every applicable step (including the connect probe, if one was
    /// needed) with no error.
    Completed,
    /// A callback, or a re-entered handshake sub-handler, latched `ERROR`;
    /// exit to the notify/leave path.
    ErrorLatched,
    /// The cycle ends here awaiting the next edge: either a re-entered
    /// handshake reported "needs more I/O", or `WAIT_L4_CONN` is still set
    /// after probing.
    Suspended,
}

#[derive(Copy, Clone, Eq, PartialEq)]
enum HalfOutcome {
    Continue,
    ErrorLatched,
    HandshakeReraised,
}

fn run_recv_half(conn: &mut Connection, edge: EdgeFlags) -> HalfOutcome {
    if edge.triggers_recv() {
        conn.call_recv();
    }
    half_outcome(conn)
}

fn run_send_half(conn: &mut Connection, edge: EdgeFlags) -> HalfOutcome {
    if edge.triggers_send() {
        conn.call_send();
    }
    half_outcome(conn)
}

fn half_outcome(conn: &Connection) -> HalfOutcome {
    if conn.lifecycle.is_error() {
        HalfOutcome::ErrorLatched
    } else if !conn.handshake.is_empty() {
        HalfOutcome::HandshakeReraised
    } else {
        HalfOutcome::Continue
    }
}

/// Re-enter the handshake dispatcher after a callback re-raised
/// `HANDSHAKE` mid-data-phase. Unlike the top-level entry point, the result
/// here never sends control back to an earlier data-phase step: a re-raise
/// during recv resumes at send; a re-raise during send resumes at the
/// connect probe.
fn resume_after_reraise(
    conn: &mut Connection,
    registry: &HandshakeRegistry<'_>,
    facility: &dyn EventFacility,
) -> Option<DataPhaseOutcome> {
    match run_handshake(conn, registry, facility) {
        HandshakeOutcome::Done => None,
        HandshakeOutcome::Pending => Some(DataPhaseOutcome::Suspended),
        HandshakeOutcome::Failed => Some(DataPhaseOutcome::ErrorLatched),
    }
}

fn run_connect_probe(conn: &mut Connection) -> DataPhaseOutcome {
    if !conn.lifecycle.is_wait_l4_conn() {
        return DataPhaseOutcome::Completed;
    }

    match conn.tcp_connect_probe() {
        ConnectProbe::Established => {
            conn.lifecycle.clear_wait_l4_conn();
            DataPhaseOutcome::Completed
        }
        ConnectProbe::Pending => DataPhaseOutcome::Suspended,
        ConnectProbe::Errored => {
            conn.lifecycle.set_error();
            DataPhaseOutcome::ErrorLatched
        }
    }
}

/// Run the full data phase for the given latched `edge`: recv, then send,
/// then the connect probe if still waiting on one, handling handshake
/// re-entry in between as described above.
pub fn run_data_phase(
    conn: &mut Connection,
    edge: EdgeFlags,
    registry: &HandshakeRegistry<'_>,
    facility: &dyn EventFacility,
) -> DataPhaseOutcome {
    match run_recv_half(conn, edge) {
        HalfOutcome::ErrorLatched => return DataPhaseOutcome::ErrorLatched,
        HalfOutcome::HandshakeReraised => {
            if let Some(outcome) = resume_after_reraise(conn, registry, facility) {
                return outcome;
            }
        }
        HalfOutcome::Continue => {}
    }

    match run_send_half(conn, edge) {
        HalfOutcome::ErrorLatched => return DataPhaseOutcome::ErrorLatched,
        HalfOutcome::HandshakeReraised => {
            if let Some(outcome) = resume_after_reraise(conn, registry, facility) {
                return outcome;
            }
        }
        HalfOutcome::Continue => {}
    }

    run_connect_probe(conn)
}
