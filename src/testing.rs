//! An in-memory [`EventFacility`] double that records the exact call
//! sequence made per descriptor, so tests can assert against it directly
//! rather than inferring behaviour from side effects.

use std::collections::HashMap;
use std::io;
use std::sync::Mutex;

use crate::facility::EventFacility;
use crate::token::Token;

/// One recorded call to the facility.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Call {
    WantRecv,
    StopRecv,
    PollRecv,
    WantSend,
    StopSend,
    PollSend,
}

/// Records every call made to it, keyed by [`Token`], in order.
#[derive(Default)]
pub struct RecordingFacility {
    calls: Mutex<HashMap<Token, Vec<Call>>>,
}

impl RecordingFacility {
    pub fn new() -> RecordingFacility {
        RecordingFacility {
            calls: Mutex::new(HashMap::new()),
        }
    }

    /// The calls recorded for `token`, in call order. Empty if none were
    /// made.
    pub fn calls_for(&self, token: Token) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap()
            .get(&token)
            .cloned()
            .unwrap_or_default()
    }

    /// Net count of enabling minus disabling calls for the recv direction:
    /// 1 if recv is currently registered enabled, 0 otherwise.
    pub fn recv_enable_count(&self, token: Token) -> i64 {
        count_enables(&self.calls_for(token), Call::WantRecv, Call::PollRecv, Call::StopRecv)
    }

    /// Symmetric for send.
    pub fn send_enable_count(&self, token: Token) -> i64 {
        count_enables(&self.calls_for(token), Call::WantSend, Call::PollSend, Call::StopSend)
    }

    fn record(&self, token: Token, call: Call) {
        self.calls.lock().unwrap().entry(token).or_default().push(call);
    }
}

fn count_enables(calls: &[Call], want: Call, poll: Call, stop: Call) -> i64 {
    calls.iter().fold(0i64, |acc, &c| {
        if c == want || c == poll {
            acc + 1
        } else if c == stop {
            acc - 1
        } else {
            acc
        }
    })
}

impl EventFacility for RecordingFacility {
    fn want_recv(&self, token: Token) -> io::Result<()> {
        self.record(token, Call::WantRecv);
        Ok(())
    }

    fn stop_recv(&self, token: Token) -> io::Result<()> {
        self.record(token, Call::StopRecv);
        Ok(())
    }

    fn poll_recv(&self, token: Token) -> io::Result<()> {
        self.record(token, Call::PollRecv);
        Ok(())
    }

    fn want_send(&self, token: Token) -> io::Result<()> {
        self.record(token, Call::WantSend);
        Ok(())
    }

    fn stop_send(&self, token: Token) -> io::Result<()> {
        self.record(token, Call::StopSend);
        Ok(())
    }

    fn poll_send(&self, token: Token) -> io::Result<()> {
        self.record(token, Call::PollSend);
        Ok(())
    }
}
