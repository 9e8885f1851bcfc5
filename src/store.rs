// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! SQLite-backed wallet store and transaction log.
//!
//! The [`Store`] owns the single datastore of the service: a `wallets`
//! table (address -> balance) and an append-only `transfers` table. The
//! schema is embedded and applied on every open, so a fresh file path
//! becomes a working database on first run. WAL mode keeps reads cheap
//! while writes are in progress.
//!
//! Single-row operations take the connection lock themselves. Multi-row
//! atomic units (the transfer engine's debit/credit/append) run inside one
//! SQLite transaction on the locked connection, composed from the `*_in`
//! helpers; an early return before `commit` rolls the whole unit back.
//!
//! Balances and amounts are stored as decimal TEXT columns and all
//! arithmetic happens in [`Decimal`], so no binary floating point ever
//! touches a money value.

use crate::address::Address;
use crate::base::TransferId;
use crate::error::LedgerError;
use crate::transfer::Transfer;
use crate::wallet::Wallet;
use chrono::{DateTime, Utc};
use parking_lot::{Mutex, MutexGuard};
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row, params};
use rust_decimal::Decimal;
use std::path::Path;
use std::str::FromStr;

/// Schema SQL embedded at compile time.
const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Durable storage context for wallets and transfers.
///
/// Constructed once at startup and passed explicitly to every collaborator
/// that needs persistence; there is no process-global handle.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Opens or creates the database at the given path and applies the
    /// schema.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or initialized.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, LedgerError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Self::initialize(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory store, mainly for tests and benchmarks.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    pub fn in_memory() -> Result<Self, LedgerError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize(conn: &Connection) -> Result<(), LedgerError> {
        // Schema includes the PRAGMA statements; everything is idempotent.
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    /// Locks the underlying connection for a composed atomic unit.
    pub(crate) fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock()
    }

    // === Wallets ===

    /// Point lookup of one wallet.
    pub fn wallet(&self, address: &Address) -> Result<Option<Wallet>, LedgerError> {
        let conn = self.conn.lock();
        Self::wallet_in(&conn, address)
    }

    /// Lookup against an already-locked connection or open transaction.
    pub(crate) fn wallet_in(
        conn: &Connection,
        address: &Address,
    ) -> Result<Option<Wallet>, LedgerError> {
        conn.query_row(
            "SELECT address, balance FROM wallets WHERE address = ?1",
            params![address.as_str()],
            Self::row_to_wallet,
        )
        .optional()
        .map_err(Into::into)
    }

    /// Inserts a new wallet with a starting balance.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::WalletExists`] if the address is taken, which
    /// callers generating random addresses treat as the retry signal.
    pub fn create_wallet(
        &self,
        address: &Address,
        balance: Decimal,
    ) -> Result<Wallet, LedgerError> {
        let conn = self.conn.lock();
        match conn.execute(
            "INSERT INTO wallets (address, balance) VALUES (?1, ?2)",
            params![address.as_str(), balance.to_string()],
        ) {
            Ok(_) => Ok(Wallet::new(address.clone(), balance)),
            Err(e) if is_unique_violation(&e) => Err(LedgerError::WalletExists),
            Err(e) => Err(e.into()),
        }
    }

    /// Atomically applies `balance += delta` to one wallet.
    ///
    /// Runs in its own transaction: the read, the non-negativity check and
    /// the write cannot be interleaved with another update of the same row.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::WalletNotFound`] if the address is absent.
    /// - [`LedgerError::InsufficientFunds`] if the result would be negative;
    ///   the balance is untouched.
    pub fn adjust_balance(
        &self,
        address: &Address,
        delta: Decimal,
    ) -> Result<Wallet, LedgerError> {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let wallet = Self::wallet_in(&tx, address)?.ok_or(LedgerError::WalletNotFound)?;
        let next = wallet.balance + delta;
        if next < Decimal::ZERO {
            return Err(LedgerError::InsufficientFunds);
        }
        Self::write_balance_in(&tx, address, next)?;

        tx.commit()?;
        Ok(Wallet::new(address.clone(), next))
    }

    /// Overwrites one wallet balance inside an open transaction. The caller
    /// has already read the row and checked the non-negativity invariant.
    pub(crate) fn write_balance_in(
        conn: &Connection,
        address: &Address,
        balance: Decimal,
    ) -> Result<(), LedgerError> {
        debug_assert!(
            balance >= Decimal::ZERO,
            "balance write would go negative: {balance}"
        );
        let updated = conn.execute(
            "UPDATE wallets SET balance = ?1 WHERE address = ?2",
            params![balance.to_string(), address.as_str()],
        )?;
        debug_assert_eq!(updated, 1, "balance write touched {updated} rows");
        Ok(())
    }

    /// Number of wallets in the store.
    pub fn wallet_count(&self) -> Result<u64, LedgerError> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM wallets", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    // === Transfers ===

    /// Appends one transfer record and returns it with the assigned id.
    pub fn record_transfer(
        &self,
        from: &Address,
        to: &Address,
        amount: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Result<Transfer, LedgerError> {
        let conn = self.conn.lock();
        Self::record_transfer_in(&conn, from, to, amount, timestamp)
    }

    /// Append against an already-locked connection or open transaction.
    pub(crate) fn record_transfer_in(
        conn: &Connection,
        from: &Address,
        to: &Address,
        amount: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Result<Transfer, LedgerError> {
        conn.execute(
            "INSERT INTO transfers (from_address, to_address, amount, timestamp)
             VALUES (?1, ?2, ?3, ?4)",
            params![from.as_str(), to.as_str(), amount.to_string(), timestamp],
        )?;

        Ok(Transfer {
            id: TransferId(conn.last_insert_rowid()),
            from: from.clone(),
            to: to.clone(),
            amount,
            timestamp,
        })
    }

    /// Returns up to `limit` transfers, most recent first.
    ///
    /// Recency is the commit order (`id DESC`); timestamps are attached for
    /// display but play no part in the ordering, so equal clock readings
    /// cannot reorder history.
    pub fn recent_transfers(&self, limit: i64) -> Result<Vec<Transfer>, LedgerError> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT id, from_address, to_address, amount, timestamp
             FROM transfers
             ORDER BY id DESC
             LIMIT ?1",
        )?;

        let transfers = stmt
            .query_map(params![limit], Self::row_to_transfer)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(transfers)
    }

    // === Row mapping ===

    fn row_to_wallet(row: &Row<'_>) -> rusqlite::Result<Wallet> {
        Ok(Wallet {
            address: Address(row.get(0)?),
            balance: decimal_column(row, 1)?,
        })
    }

    fn row_to_transfer(row: &Row<'_>) -> rusqlite::Result<Transfer> {
        Ok(Transfer {
            id: TransferId(row.get(0)?),
            from: Address(row.get(1)?),
            to: Address(row.get(2)?),
            amount: decimal_column(row, 3)?,
            timestamp: row.get(4)?,
        })
    }
}

/// Parses a decimal TEXT column, surfacing corruption as a conversion error.
fn decimal_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Decimal> {
    let text: String = row.get(idx)?;
    Decimal::from_str(&text).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(inner, _)
            if inner.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn addr(fill: char) -> Address {
        Address::parse(&fill.to_string().repeat(64)).unwrap()
    }

    #[test]
    fn create_and_lookup_wallet() {
        let store = Store::in_memory().unwrap();
        let address = addr('a');

        let wallet = store.create_wallet(&address, dec!(100.0)).unwrap();
        assert_eq!(wallet.balance, dec!(100.0));

        let found = store.wallet(&address).unwrap().unwrap();
        assert_eq!(found, wallet);
    }

    #[test]
    fn lookup_missing_wallet_is_none() {
        let store = Store::in_memory().unwrap();
        assert_eq!(store.wallet(&addr('a')).unwrap(), None);
    }

    #[test]
    fn duplicate_create_signals_collision() {
        let store = Store::in_memory().unwrap();
        let address = addr('a');

        store.create_wallet(&address, dec!(100.0)).unwrap();
        let result = store.create_wallet(&address, dec!(50.0));
        assert_eq!(result, Err(LedgerError::WalletExists));

        // Original balance untouched by the failed insert.
        assert_eq!(store.wallet(&address).unwrap().unwrap().balance, dec!(100.0));
    }

    #[test]
    fn adjust_balance_applies_credits_and_debits() {
        let store = Store::in_memory().unwrap();
        let address = addr('a');
        store.create_wallet(&address, dec!(100.0)).unwrap();

        let wallet = store.adjust_balance(&address, dec!(25.5)).unwrap();
        assert_eq!(wallet.balance, dec!(125.5));

        let wallet = store.adjust_balance(&address, dec!(-125.5)).unwrap();
        assert_eq!(wallet.balance, dec!(0.0));
    }

    #[test]
    fn adjust_balance_never_goes_negative() {
        let store = Store::in_memory().unwrap();
        let address = addr('a');
        store.create_wallet(&address, dec!(10.0)).unwrap();

        let result = store.adjust_balance(&address, dec!(-10.01));
        assert_eq!(result, Err(LedgerError::InsufficientFunds));
        assert_eq!(store.wallet(&address).unwrap().unwrap().balance, dec!(10.0));
    }

    #[test]
    fn adjust_balance_of_missing_wallet_fails() {
        let store = Store::in_memory().unwrap();
        let result = store.adjust_balance(&addr('a'), dec!(1.0));
        assert_eq!(result, Err(LedgerError::WalletNotFound));
    }

    #[test]
    fn wallet_count_tracks_inserts() {
        let store = Store::in_memory().unwrap();
        assert_eq!(store.wallet_count().unwrap(), 0);

        store.create_wallet(&addr('a'), dec!(1.0)).unwrap();
        store.create_wallet(&addr('b'), dec!(2.0)).unwrap();
        assert_eq!(store.wallet_count().unwrap(), 2);
    }

    #[test]
    fn recorded_transfers_come_back_most_recent_first() {
        let store = Store::in_memory().unwrap();
        let a = addr('a');
        let b = addr('b');

        for i in 1..=3 {
            store
                .record_transfer(&a, &b, Decimal::from(i), Utc::now())
                .unwrap();
        }

        let recent = store.recent_transfers(10).unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent[0].amount, dec!(3));
        assert_eq!(recent[1].amount, dec!(2));
        assert_eq!(recent[2].amount, dec!(1));
        assert!(recent[0].id > recent[1].id);
    }

    #[test]
    fn recent_transfers_respects_limit() {
        let store = Store::in_memory().unwrap();
        let a = addr('a');
        let b = addr('b');

        for i in 1..=8 {
            store
                .record_transfer(&a, &b, Decimal::from(i), Utc::now())
                .unwrap();
        }

        let recent = store.recent_transfers(5).unwrap();
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].amount, dec!(8));
        assert_eq!(recent[4].amount, dec!(4));
    }

    #[test]
    fn transfer_amounts_round_trip_exactly() {
        let store = Store::in_memory().unwrap();
        let a = addr('a');
        let b = addr('b');

        let recorded = store
            .record_transfer(&a, &b, dec!(0.0001), Utc::now())
            .unwrap();
        let read_back = store.recent_transfers(1).unwrap().remove(0);
        assert_eq!(read_back.amount, dec!(0.0001));
        assert_eq!(read_back, recorded);
    }
}
