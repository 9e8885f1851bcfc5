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

//! Committed transfer records.

use crate::address::Address;
use crate::base::TransferId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One committed transfer in the transaction log.
///
/// Created exactly once, atomically with the balance mutation it describes,
/// and immutable thereafter. The `id` is assigned by the datastore at commit
/// and is monotonically increasing; `timestamp` is the commit-time UTC clock
/// reading, used for display while `id` provides the recency ordering.
///
/// # Invariants
///
/// - `amount > 0`
/// - `from != to`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    pub id: TransferId,
    pub from: Address,
    pub to: Address,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn serializes_to_wire_shape() {
        let transfer = Transfer {
            id: TransferId(7),
            from: Address::parse(&"a".repeat(64)).unwrap(),
            to: Address::parse(&"b".repeat(64)).unwrap(),
            amount: dec!(30.00),
            timestamp: DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        };

        let json = serde_json::to_value(&transfer).unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["from"], "a".repeat(64));
        assert_eq!(json["to"], "b".repeat(64));
        assert_eq!(json["amount"], "30.00");
        assert_eq!(json["timestamp"], "2024-05-01T12:00:00Z");
    }
}
