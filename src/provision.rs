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

//! Startup wallet provisioning.
//!
//! Runs once before the service accepts requests and never on the request
//! path. A store that already holds wallets is left untouched.

use crate::address::Address;
use crate::error::LedgerError;
use crate::store::Store;
use rust_decimal::Decimal;
use tracing::{debug, info};

/// Seeds an empty store with `count` wallets, each holding `balance`.
///
/// Addresses are drawn at random; a collision surfaces as
/// [`LedgerError::WalletExists`] from the store and the draw is repeated.
/// The loop is unbounded in form only: with 16^64 possible addresses a
/// retry is already an extraordinary event.
///
/// Returns the created addresses, empty when the store was already
/// populated.
pub fn seed_wallets(
    store: &Store,
    count: u32,
    balance: Decimal,
) -> Result<Vec<Address>, LedgerError> {
    if store.wallet_count()? > 0 {
        debug!("store already provisioned, skipping seed");
        return Ok(Vec::new());
    }

    let mut created = Vec::with_capacity(count as usize);
    for _ in 0..count {
        loop {
            let address = Address::random();
            match store.create_wallet(&address, balance) {
                Ok(wallet) => {
                    created.push(wallet.address);
                    break;
                }
                Err(LedgerError::WalletExists) => continue,
                Err(e) => return Err(e),
            }
        }
    }

    info!(count = created.len(), %balance, "seeded wallets");
    Ok(created)
}
