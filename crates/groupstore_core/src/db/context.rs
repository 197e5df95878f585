//! Per-call execution context.
//!
//! A store operation runs against the store's default connection unless the
//! caller hands in an open transaction, in which case every statement the
//! operation issues goes through that transaction instead.

use rusqlite::{Connection, Transaction};

/// Selects the connection a single store call executes on.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExecContext<'a> {
    tx: Option<&'a Connection>,
}

impl<'a> ExecContext<'a> {
    /// Context that uses the store's default connection.
    pub fn new() -> Self {
        Self { tx: None }
    }

    /// Context that routes every statement through `tx`.
    ///
    /// Writes stay invisible to other connections until the caller commits.
    pub fn with_transaction(tx: &'a Transaction<'_>) -> Self {
        let conn: &'a Connection = tx;
        Self { tx: Some(conn) }
    }

    /// Returns whether this context carries a caller transaction.
    pub fn is_transactional(&self) -> bool {
        self.tx.is_some()
    }

    pub(crate) fn resolve<'c>(&self, default: &'c Connection) -> &'c Connection
    where
        'a: 'c,
    {
        self.tx.unwrap_or(default)
    }
}
