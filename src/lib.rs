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

//! # Wallet Ledger
//!
//! This library provides a small ledger service: wallets identified by
//! 64-character lowercase-hex addresses, decimal balances, and atomic value
//! transfers between them, persisted in SQLite.
//!
//! ## Core Components
//!
//! - [`Engine`]: Transfer processor owning the atomic-unit boundary
//! - [`Store`]: Durable wallet store and append-only transaction log
//! - [`Address`]: Validated wallet address with random generation
//! - [`LedgerError`]: Error taxonomy for every caller-visible failure
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use rust_decimal_macros::dec;
//! use wallet_ledger_rs::{Engine, Store, provision};
//!
//! let store = Arc::new(Store::in_memory().unwrap());
//! let wallets = provision::seed_wallets(&store, 2, dec!(100.0)).unwrap();
//!
//! let engine = Engine::new(Arc::clone(&store));
//! let transfer = engine
//!     .transfer(wallets[0].as_str(), wallets[1].as_str(), dec!(30.0))
//!     .unwrap();
//! assert_eq!(transfer.amount, dec!(30.0));
//!
//! let sender = engine.wallet_balance(wallets[0].as_str()).unwrap();
//! assert_eq!(sender.balance, dec!(70.0));
//! ```
//!
//! ## Consistency
//!
//! Every transfer runs as one SQLite transaction: sender check, debit,
//! credit and log append commit together or roll back together, so
//! concurrent transfers never corrupt a balance or expose a partial state.

pub mod address;
mod base;
pub mod config;
mod engine;
pub mod error;
pub mod http;
pub mod provision;
mod rate_limit;
mod store;
mod transfer;
mod wallet;

pub use address::Address;
pub use base::TransferId;
pub use engine::Engine;
pub use error::LedgerError;
pub use rate_limit::RateLimiter;
pub use store::Store;
pub use transfer::Transfer;
pub use wallet::Wallet;
