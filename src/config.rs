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

//! Service configuration defaults.
//!
//! Every tunable of the service lives here; the binary exposes the runtime
//! ones as CLI flags with these values as defaults.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Default path of the SQLite database file. The parent directory is
/// created on startup if missing, and the schema is applied on first open.
pub const DEFAULT_DB_PATH: &str = "storage/storage.db";

/// Default listen address for the HTTP API.
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";

/// Number of wallets the provisioner creates into an empty store.
pub const SEED_WALLET_COUNT: u32 = 10;

/// Starting balance of each provisioned wallet.
pub const SEED_WALLET_BALANCE: Decimal = dec!(100.0);

/// Transactions returned by a recency query with no explicit count.
pub const DEFAULT_RECENT_COUNT: i64 = 10;

/// Hard cap on the recency query count. Requests above this are clamped,
/// bounding response size.
pub const MAX_RECENT_COUNT: i64 = 1000;

/// Sustained transfer submissions allowed per client IP, per second.
pub const RATE_LIMIT_PER_SEC: f64 = 1.0;

/// Burst capacity of the per-IP token bucket.
pub const RATE_LIMIT_BURST: f64 = 1.0;
