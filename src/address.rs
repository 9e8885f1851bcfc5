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

//! Wallet addresses.
//!
//! An address is exactly 64 lowercase hexadecimal characters. Validation is
//! pure and total: any string either is or is not an address, there is no
//! error channel. Once parsed, an [`Address`] is known-valid everywhere
//! downstream.

use crate::LedgerError;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

const HEX_ALPHABET: &[u8; 16] = b"0123456789abcdef";

/// A validated wallet address.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Address(pub(crate) String);

impl Address {
    /// Address length in characters.
    pub const LEN: usize = 64;

    /// Returns whether `s` is a well-formed address: exactly 64 characters,
    /// each drawn from `[a-f0-9]`.
    pub fn is_valid(s: &str) -> bool {
        s.len() == Self::LEN && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }

    /// Parses a string into a validated address.
    ///
    /// # Errors
    ///
    /// Returns [`LedgerError::InvalidAddress`] if the string is malformed.
    pub fn parse(s: &str) -> Result<Self, LedgerError> {
        if Self::is_valid(s) {
            Ok(Self(s.to_owned()))
        } else {
            Err(LedgerError::InvalidAddress)
        }
    }

    /// Generates a uniformly random valid address.
    ///
    /// The address space is 16^64, so callers relying on uniqueness retry on
    /// collision rather than checking beforehand.
    pub fn random() -> Self {
        let mut rng = rand::thread_rng();
        let raw = (0..Self::LEN)
            .map(|_| HEX_ALPHABET[rng.gen_range(0..HEX_ALPHABET.len())] as char)
            .collect();
        Self(raw)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Masked rendition for log output: first five and last five characters
    /// with the middle elided.
    pub fn masked(&self) -> String {
        mask(&self.0)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Masks an address-like string for log output.
///
/// Shows the first five and last five characters, eliding the middle.
/// Strings shorter than ten characters are fully redacted.
pub fn mask(addr: &str) -> String {
    if addr.len() < 10 {
        return "******".to_string();
    }
    format!("{}...{}", &addr[..5], &addr[addr.len() - 5..])
}
