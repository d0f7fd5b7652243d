//! Pokes the upstream stream interface after I/O, when `NOTIFY_SI` is set.
//! Out of scope beyond this callback boundary: the stream interface itself
//! is an external collaborator.

use crate::connection::Connection;

pub trait Notifier {
    fn notify(&self, conn: &Connection);
}
