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

//! Transfer processing engine.
//!
//! The [`Engine`] is the central component: it validates a candidate
//! transfer, then debits the sender, credits the receiver and appends the
//! transaction record as one all-or-nothing unit against the [`Store`].
//!
//! # Transfer Stages
//!
//! 1. Both addresses must be well formed.
//! 2. Source and destination must differ.
//! 3. The amount must be positive.
//! 4. Atomic unit: sender lookup, sufficiency check, receiver lookup,
//!    debit + credit, log append, commit. Any failure before commit rolls
//!    the whole unit back.
//!
//! # Concurrency
//!
//! The engine owns no state of its own, only the atomic-unit boundary.
//! Each unit runs inside one SQLite transaction on the store's guarded
//! connection, so a sufficiency check and its debit can never be split by
//! a conflicting commit. Balance and recency queries read through the same
//! store without participating in any unit.

use crate::address::Address;
use crate::config;
use crate::error::LedgerError;
use crate::store::Store;
use crate::transfer::Transfer;
use crate::wallet::Wallet;
use chrono::Utc;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Transfer engine over an injected storage context.
pub struct Engine {
    store: Arc<Store>,
}

impl Engine {
    pub fn new(store: Arc<Store>) -> Self {
        Engine { store }
    }

    /// Applies one transfer from `from` to `to`.
    ///
    /// Returns the committed [`Transfer`] record. Rejections are detected
    /// before any mutation; a failure inside the atomic unit rolls back all
    /// of it, so no caller ever observes a partial transfer. Nothing is
    /// retried here; resubmitting after a [`LedgerError::Storage`] failure
    /// is safe and simply produces a new, distinct transfer.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAddress`] - either address is malformed.
    /// - [`LedgerError::SelfTransfer`] - source equals destination.
    /// - [`LedgerError::InvalidAmount`] - amount is zero or negative.
    /// - [`LedgerError::SenderNotFound`] / [`LedgerError::ReceiverNotFound`].
    /// - [`LedgerError::InsufficientFunds`] - sender balance below the
    ///   amount at the start of the atomic unit.
    /// - [`LedgerError::Storage`] - datastore fault; unit rolled back.
    pub fn transfer(
        &self,
        from: &str,
        to: &str,
        amount: Decimal,
    ) -> Result<Transfer, LedgerError> {
        let (Ok(from), Ok(to)) = (Address::parse(from), Address::parse(to)) else {
            warn!(
                from = %crate::address::mask(from),
                to = %crate::address::mask(to),
                "invalid wallet address format"
            );
            return Err(LedgerError::InvalidAddress);
        };

        if from == to {
            warn!(from = %from.masked(), "transfer to the same wallet rejected");
            return Err(LedgerError::SelfTransfer);
        }

        if amount <= Decimal::ZERO {
            warn!(%amount, "non-positive transfer amount rejected");
            return Err(LedgerError::InvalidAmount);
        }

        match self.commit_transfer(&from, &to, amount) {
            Ok(transfer) => {
                info!(
                    id = %transfer.id,
                    from = %from.masked(),
                    to = %to.masked(),
                    %amount,
                    "transfer completed"
                );
                Ok(transfer)
            }
            Err(e @ LedgerError::Storage(_)) => {
                error!(
                    from = %from.masked(),
                    to = %to.masked(),
                    %amount,
                    error = %e,
                    "transfer aborted by storage failure"
                );
                Err(e)
            }
            Err(e) => {
                warn!(
                    from = %from.masked(),
                    to = %to.masked(),
                    %amount,
                    error = %e,
                    "transfer rejected"
                );
                Err(e)
            }
        }
    }

    /// The atomic unit: everything here commits together or not at all.
    fn commit_transfer(
        &self,
        from: &Address,
        to: &Address,
        amount: Decimal,
    ) -> Result<Transfer, LedgerError> {
        let mut conn = self.store.lock();
        let tx = conn.transaction()?;

        let sender = Store::wallet_in(&tx, from)?.ok_or(LedgerError::SenderNotFound)?;
        if sender.balance < amount {
            return Err(LedgerError::InsufficientFunds);
        }
        let receiver = Store::wallet_in(&tx, to)?.ok_or(LedgerError::ReceiverNotFound)?;

        Store::write_balance_in(&tx, from, sender.balance - amount)?;
        Store::write_balance_in(&tx, to, receiver.balance + amount)?;
        let transfer = Store::record_transfer_in(&tx, from, to, amount, Utc::now())?;

        tx.commit()?;
        Ok(transfer)
    }

    /// Looks up one wallet by raw address.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAddress`] - malformed address.
    /// - [`LedgerError::WalletNotFound`] - no wallet at that address.
    pub fn wallet_balance(&self, address: &str) -> Result<Wallet, LedgerError> {
        let address = Address::parse(address)?;
        self.store.wallet(&address)?.ok_or_else(|| {
            warn!(address = %address.masked(), "wallet not found");
            LedgerError::WalletNotFound
        })
    }

    /// Lists recent transfers, most recent first.
    ///
    /// An explicit count must be positive and is clamped to
    /// [`config::MAX_RECENT_COUNT`]; an absent count falls back to
    /// [`config::DEFAULT_RECENT_COUNT`].
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidCount`] for a zero or negative count.
    pub fn recent(&self, count: Option<i64>) -> Result<Vec<Transfer>, LedgerError> {
        let limit = match count {
            None => config::DEFAULT_RECENT_COUNT,
            Some(n) if n <= 0 => {
                warn!(count = n, "invalid transaction count parameter");
                return Err(LedgerError::InvalidCount);
            }
            Some(n) => n.min(config::MAX_RECENT_COUNT),
        };

        self.store.recent_transfers(limit)
    }
}
