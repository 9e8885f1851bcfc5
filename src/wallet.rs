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

//! Wallet records.

use crate::address::Address;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A wallet row: an immutable address and its current balance.
///
/// # Invariants
///
/// - `balance >= 0` at all times, including inside uncommitted updates.
/// - The address never changes once the wallet is created.
/// - Balances only move through the transfer engine's atomic unit or the
///   store's guarded [`adjust_balance`](crate::Store::adjust_balance).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub address: Address,
    pub balance: Decimal,
}

impl Wallet {
    pub fn new(address: Address, balance: Decimal) -> Self {
        debug_assert!(
            balance >= Decimal::ZERO,
            "wallet created with negative balance: {balance}"
        );
        Self { address, balance }
    }
}
