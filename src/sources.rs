//! The descriptor table. Resolves a [`Token`] to the [`Connection`] that
//! owns it, read-only during a readiness cycle; insertion and removal
//! happen only at well-defined lifecycle points: acceptor/connector
//! construction, and the two destruction paths.

use std::collections::HashMap;

use crate::connection::Connection;
use crate::token::Token;

/// Owns every live connection, keyed by its descriptor token.
#[derive(Default)]
pub struct Sources {
    table: HashMap<Token, Connection>,
}

impl Sources {
    pub fn new() -> Sources {
        Sources {
            table: HashMap::new(),
        }
    }

    pub fn insert(&mut self, conn: Connection) {
        self.table.insert(conn.token, conn);
    }

    /// `owner_of(fd)`: resolves a token to its connection, or `None` if the
    /// descriptor was closed between the kernel reporting the edge and
    /// user-space picking it up.
    pub fn get_mut(&mut self, token: Token) -> Option<&mut Connection> {
        self.table.get_mut(&token)
    }

    pub fn contains(&self, token: Token) -> bool {
        self.table.contains_key(&token)
    }

    /// Remove and drop the connection. The one place besides normal session
    /// handoff that the core destroys a connection: the embryonic-abort
    /// path.
    pub fn remove(&mut self, token: Token) -> Option<Connection> {
        self.table.remove(&token)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
