//! The production [`EventFacility`]: epoll, always edge-triggered.
//!
//! `want_*` and `poll_*` issue the same `epoll_ctl` call for a given
//! direction. The distinction between a level-style want and a one-shot
//! poll lives entirely in the connection's own interest bookkeeping, not in
//! different epoll flags. The only two states epoll itself ever sees per
//! direction are "this bit is part of the registered mask" and "it isn't".

use std::collections::HashMap;
use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::sync::Mutex;

use libc::{EPOLLET, EPOLLIN, EPOLLOUT};
use log::trace;

use crate::facility::EventFacility;
use crate::token::Token;

fn cvt(ret: libc::c_int) -> io::Result<()> {
    if ret == -1 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

struct Registration {
    fd: RawFd,
    recv: bool,
    send: bool,
}

/// Tracks, per token, whether the descriptor is currently added to the
/// epoll instance and which directions are part of its registered mask.
pub struct EpollFacility {
    ep: OwnedFd,
    registrations: Mutex<HashMap<Token, Registration>>,
}

impl EpollFacility {
    pub fn new() -> io::Result<EpollFacility> {
        // SAFETY: `epoll_create1` returns either a valid fd or -1.
        let raw = unsafe { libc::epoll_create1(libc::EPOLL_CLOEXEC) };
        if raw == -1 {
            return Err(io::Error::last_os_error());
        }
        // SAFETY: `raw` was just checked to be a valid owned descriptor.
        let ep = unsafe { OwnedFd::from_raw_fd(raw) };
        Ok(EpollFacility {
            ep,
            registrations: Mutex::new(HashMap::new()),
        })
    }

    /// Add `fd` under `token` with both directions initially disabled. Must
    /// be called once before any of the [`EventFacility`] methods are used
    /// for `token`.
    pub fn register(&self, fd: RawFd, token: Token) -> io::Result<()> {
        trace!("{:?}: registering fd {} with epoll", token, fd);
        let mut event = libc::epoll_event {
            events: EPOLLET as u32,
            u64: usize::from(token) as u64,
        };
        cvt(unsafe { libc::epoll_ctl(self.ep.as_raw_fd(), libc::EPOLL_CTL_ADD, fd, &mut event) })?;

        self.registrations.lock().unwrap().insert(
            token,
            Registration {
                fd,
                recv: false,
                send: false,
            },
        );
        Ok(())
    }

    /// Remove `token` from the epoll instance and forget its bookkeeping.
    /// Called as part of connection teardown, never by the reconciler
    /// itself.
    pub fn deregister(&self, token: Token) -> io::Result<()> {
        trace!("{:?}: deregistering from epoll", token);
        let mut registrations = self.registrations.lock().unwrap();
        if let Some(reg) = registrations.remove(&token) {
            cvt(unsafe {
                libc::epoll_ctl(self.ep.as_raw_fd(), libc::EPOLL_CTL_DEL, reg.fd, std::ptr::null_mut())
            })?;
        }
        Ok(())
    }

    fn set_direction(&self, token: Token, recv: Option<bool>, send: Option<bool>) -> io::Result<()> {
        let mut registrations = self.registrations.lock().unwrap();
        let reg = registrations
            .get_mut(&token)
            .expect("direction changed on a token never registered with EpollFacility");

        if let Some(recv) = recv {
            reg.recv = recv;
        }
        if let Some(send) = send {
            reg.send = send;
        }

        let mut events = EPOLLET as u32;
        if reg.recv {
            events |= EPOLLIN as u32;
        }
        if reg.send {
            events |= EPOLLOUT as u32;
        }

        let mut event = libc::epoll_event {
            events,
            u64: usize::from(token) as u64,
        };
        cvt(unsafe { libc::epoll_ctl(self.ep.as_raw_fd(), libc::EPOLL_CTL_MOD, reg.fd, &mut event) })
    }
}

impl AsRawFd for EpollFacility {
    fn as_raw_fd(&self) -> RawFd {
        self.ep.as_raw_fd()
    }
}

impl EventFacility for EpollFacility {
    fn want_recv(&self, token: Token) -> io::Result<()> {
        self.set_direction(token, Some(true), None)
    }

    fn stop_recv(&self, token: Token) -> io::Result<()> {
        self.set_direction(token, Some(false), None)
    }

    fn poll_recv(&self, token: Token) -> io::Result<()> {
        self.set_direction(token, Some(true), None)
    }

    fn want_send(&self, token: Token) -> io::Result<()> {
        self.set_direction(token, None, Some(true))
    }

    fn stop_send(&self, token: Token) -> io::Result<()> {
        self.set_direction(token, None, Some(false))
    }

    fn poll_send(&self, token: Token) -> io::Result<()> {
        self.set_direction(token, None, Some(true))
    }
}

/// One descriptor's worth of readiness, as delivered by `epoll_wait`.
pub fn token_of(event: &libc::epoll_event) -> Token {
    Token(event.u64 as usize)
}

/// Translate a raw epoll event into the crate's own edge representation.
pub fn edge_of(event: &libc::epoll_event) -> crate::edge::EdgeFlags {
    use crate::edge::EdgeFlags;

    let bits = event.events as libc::c_int;
    let mut edge = EdgeFlags::EMPTY;
    if bits & libc::EPOLLIN != 0 {
        edge = edge | EdgeFlags::POLL_IN;
    }
    if bits & libc::EPOLLOUT != 0 {
        edge = edge | EdgeFlags::POLL_OUT;
    }
    if bits & libc::EPOLLHUP != 0 || bits & libc::EPOLLRDHUP != 0 {
        edge = edge | EdgeFlags::POLL_HUP;
    }
    if bits & libc::EPOLLERR != 0 {
        edge = edge | EdgeFlags::POLL_ERR;
    }
    edge
}

/// Block for up to one readiness batch. `capacity` bounds how many events
/// are drained in one call.
pub fn wait(
    facility: &EpollFacility,
    capacity: usize,
    timeout_ms: libc::c_int,
) -> io::Result<Vec<libc::epoll_event>> {
    let mut events = vec![
        libc::epoll_event { events: 0, u64: 0 };
        capacity
    ];

    let n = unsafe {
        libc::epoll_wait(
            facility.as_raw_fd(),
            events.as_mut_ptr(),
            events.len() as libc::c_int,
            timeout_ms,
        )
    };
    if n == -1 {
        return Err(io::Error::last_os_error());
    }
    events.truncate(n as usize);
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_of_roundtrips_through_the_event_slot() {
        let event = libc::epoll_event { events: 0, u64: 42 };
        assert_eq!(token_of(&event), Token(42));
    }

    #[test]
    fn edge_of_maps_epoll_bits_to_edge_flags() {
        use crate::edge::EdgeFlags;

        let event = libc::epoll_event {
            events: (libc::EPOLLIN | libc::EPOLLERR) as u32,
            u64: 0,
        };
        let edge = edge_of(&event);
        assert!(edge.contains(EdgeFlags::POLL_IN));
        assert!(edge.contains(EdgeFlags::POLL_ERR));
        assert!(!edge.contains(EdgeFlags::POLL_OUT));
    }
}
