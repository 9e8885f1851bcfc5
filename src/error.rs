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

//! Error types for ledger operations.

use thiserror::Error;

/// Ledger operation errors.
///
/// Every rejection the engine or store can produce is one of these kinds;
/// callers receive them synchronously and nothing is retried internally.
/// [`LedgerError::Storage`] always means the surrounding atomic unit was
/// rolled back, so resubmitting the request is safe.
#[derive(Error, Debug, PartialEq)]
pub enum LedgerError {
    /// Request payload could not be decoded
    #[error("invalid request body")]
    InvalidRequest,

    /// Address is not 64 lowercase hex characters
    #[error("invalid wallet address format")]
    InvalidAddress,

    /// Source and destination are the same wallet
    #[error("cannot send funds to the same wallet")]
    SelfTransfer,

    /// Amount is zero or negative
    #[error("amount must be greater than zero")]
    InvalidAmount,

    /// Source wallet does not exist
    #[error("sender wallet not found")]
    SenderNotFound,

    /// Destination wallet does not exist
    #[error("receiver wallet not found")]
    ReceiverNotFound,

    /// Debit would take the sender balance below zero
    #[error("insufficient funds")]
    InsufficientFunds,

    /// Balance query for a nonexistent wallet
    #[error("wallet not found")]
    WalletNotFound,

    /// Wallet creation hit an existing address
    #[error("wallet address already exists")]
    WalletExists,

    /// Recency count parameter is zero or negative
    #[error("invalid count parameter")]
    InvalidCount,

    /// Datastore failure; the enclosing atomic unit was rolled back
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),
}

#[cfg(test)]
mod tests {
    use super::LedgerError;

    #[test]
    fn error_display_messages() {
        assert_eq!(
            LedgerError::InvalidRequest.to_string(),
            "invalid request body"
        );
        assert_eq!(
            LedgerError::InvalidAddress.to_string(),
            "invalid wallet address format"
        );
        assert_eq!(
            LedgerError::SelfTransfer.to_string(),
            "cannot send funds to the same wallet"
        );
        assert_eq!(
            LedgerError::InvalidAmount.to_string(),
            "amount must be greater than zero"
        );
        assert_eq!(LedgerError::SenderNotFound.to_string(), "sender wallet not found");
        assert_eq!(
            LedgerError::ReceiverNotFound.to_string(),
            "receiver wallet not found"
        );
        assert_eq!(LedgerError::InsufficientFunds.to_string(), "insufficient funds");
        assert_eq!(LedgerError::WalletNotFound.to_string(), "wallet not found");
        assert_eq!(LedgerError::WalletExists.to_string(), "wallet address already exists");
        assert_eq!(LedgerError::InvalidCount.to_string(), "invalid count parameter");
    }

    #[test]
    fn storage_errors_wrap_the_cause() {
        let cause = rusqlite::Error::InvalidQuery;
        let error = LedgerError::from(cause);
        assert!(error.to_string().starts_with("storage error:"));
    }
}
