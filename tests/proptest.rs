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

//! Property-based tests for the address validator and the transfer engine.
//!
//! These verify invariants that should hold for any input, not just the
//! handpicked cases in the unit tests.

use proptest::prelude::*;
use rust_decimal::Decimal;
use std::sync::Arc;
use wallet_ledger_rs::{Address, Engine, LedgerError, Store, provision};

// =============================================================================
// Arbitrary Strategies
// =============================================================================

/// A positive amount between 0.01 and 100.00 in cent steps.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (1i64..=10_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// A sequence of (sender index, receiver index, amount) candidate transfers.
fn arb_transfer_ops() -> impl Strategy<Value = Vec<(usize, usize, Decimal)>> {
    prop::collection::vec((0usize..4, 0usize..4, arb_amount()), 1..40)
}

// =============================================================================
// Address Validator Properties
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(1000))]

    /// Every 64-character lowercase-hex string is a valid address.
    #[test]
    fn validator_accepts_all_lowercase_hex_64(addr in "[a-f0-9]{64}") {
        prop_assert!(Address::is_valid(&addr));
        prop_assert!(Address::parse(&addr).is_ok());
    }

    /// No string of any other length is valid, whatever its characters.
    #[test]
    fn validator_rejects_wrong_lengths(addr in "[a-f0-9]{0,63}") {
        prop_assert!(!Address::is_valid(&addr));
    }

    #[test]
    fn validator_rejects_overlong(addr in "[a-f0-9]{65,80}") {
        prop_assert!(!Address::is_valid(&addr));
    }

    /// One character outside `[a-f0-9]` poisons an otherwise valid address.
    #[test]
    fn validator_rejects_foreign_characters(
        prefix in "[a-f0-9]{0,63}",
        bad in "[g-zA-Z!@# ]",
    ) {
        let mut addr = prefix;
        addr.push_str(&bad);
        while addr.len() < 64 {
            addr.push('a');
        }
        let addr: String = addr.chars().take(64).collect();
        prop_assert!(!Address::is_valid(&addr));
    }
}

// =============================================================================
// Engine Invariant Properties
// =============================================================================

proptest! {
    // Each case builds a real store, so keep the case count moderate.
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Any sequence of transfer attempts conserves the total balance and
    /// never drives any wallet negative.
    #[test]
    fn transfers_conserve_total_and_nonnegativity(ops in arb_transfer_ops()) {
        let store = Arc::new(Store::in_memory().unwrap());
        let wallets = provision::seed_wallets(&store, 4, Decimal::new(10_000, 2)).unwrap();
        let engine = Engine::new(store);

        for (from, to, amount) in ops {
            match engine.transfer(wallets[from].as_str(), wallets[to].as_str(), amount) {
                Ok(_)
                | Err(LedgerError::SelfTransfer)
                | Err(LedgerError::InsufficientFunds) => {}
                Err(e) => prop_assert!(false, "unexpected error: {e}"),
            }
        }

        let mut total = Decimal::ZERO;
        for wallet in &wallets {
            let balance = engine.wallet_balance(wallet.as_str()).unwrap().balance;
            prop_assert!(balance >= Decimal::ZERO, "negative balance: {balance}");
            total += balance;
        }
        prop_assert_eq!(total, Decimal::new(40_000, 2));
    }

    /// The log only ever grows by the committed transfers, in order.
    #[test]
    fn log_matches_committed_transfers(ops in arb_transfer_ops()) {
        let store = Arc::new(Store::in_memory().unwrap());
        let wallets = provision::seed_wallets(&store, 4, Decimal::new(10_000, 2)).unwrap();
        let engine = Engine::new(store);

        let mut committed = Vec::new();
        for (from, to, amount) in ops {
            if let Ok(transfer) =
                engine.transfer(wallets[from].as_str(), wallets[to].as_str(), amount)
            {
                committed.push(transfer);
            }
        }

        let mut logged = engine.recent(Some(1000)).unwrap();
        logged.reverse(); // oldest first, like the commit order
        prop_assert_eq!(logged, committed);
    }
}
