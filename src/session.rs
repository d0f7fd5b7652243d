//! The session-completion shim: finishes creating an incoming session when
//! `INIT_SESS` is pending, and deletes the connection on failure.

use log::{debug, warn};

use crate::connection::Connection;
use crate::error::{Error, Result};
use crate::sources::Sources;
use crate::token::Token;

/// Constructs the upper-layer session object for an embryonic connection.
/// Out of scope beyond this callback boundary: session construction itself
/// is an external collaborator.
pub trait SessionBuilder {
    fn build(&self, conn: &Connection) -> bool;
}

/// `session_complete(conn, bit)`.
///
/// Clears `INIT_SESS` unconditionally. If `builder` fails, destroys the
/// connection in `sources` and returns [`Error::SessionFailed`]; callers
/// must not touch the connection again after that. On success returns
/// `Ok(())` with the connection left in place.
pub fn complete_session(sources: &mut Sources, token: Token, builder: &dyn SessionBuilder) -> Result<()> {
    let conn = sources
        .get_mut(token)
        .expect("complete_session called on a token with no owner");

    conn.lifecycle.clear_init_sess();

    let ok = builder.build(conn);

    if ok {
        debug!("{:?}: session constructed", token);
        Ok(())
    } else {
        warn!("{:?}: session construction failed, destroying connection", token);
        sources.remove(token);
        Err(Error::SessionFailed)
    }
}

/// Force-complete an embryonic session as a failure, used by the post-I/O
/// notification step when `ERROR` and `INIT_SESS` both hold: unlike
/// [`complete_session`] this never calls `builder`, the connection has
/// already failed for a reason unrelated to session construction, so there
/// is nothing left to build.
pub fn fail_session(sources: &mut Sources, token: Token) -> Result<()> {
    let conn = sources
        .get_mut(token)
        .expect("fail_session called on a token with no owner");

    conn.lifecycle.clear_init_sess();
    warn!("{:?}: forcing embryonic session abort", token);
    sources.remove(token);
    Err(Error::SessionFailed)
}
