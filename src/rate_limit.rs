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

//! Per-client admission control for transfer submissions.
//!
//! A token bucket per client IP, checked before a request ever reaches the
//! transfer engine. Buckets live in a [`DashMap`], so concurrent clients
//! never contend on each other's state.

use dashmap::DashMap;
use std::net::IpAddr;
use std::time::Instant;

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl Bucket {
    fn new(capacity: f64) -> Self {
        Self {
            tokens: capacity,
            last_refill: Instant::now(),
        }
    }

    fn try_consume(&mut self, capacity: f64, refill_rate: f64) -> bool {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_refill = now;

        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Token-bucket rate limiter keyed by client IP.
pub struct RateLimiter {
    buckets: DashMap<IpAddr, Bucket>,
    refill_rate: f64,
    capacity: f64,
}

impl RateLimiter {
    /// Creates a limiter allowing `per_second` sustained requests per IP
    /// with bursts of up to `burst`.
    pub fn new(per_second: f64, burst: f64) -> Self {
        Self {
            buckets: DashMap::new(),
            refill_rate: per_second,
            capacity: burst.max(1.0),
        }
    }

    /// Returns whether a request from `ip` is admitted right now.
    pub fn allow(&self, ip: IpAddr) -> bool {
        let mut bucket = self
            .buckets
            .entry(ip)
            .or_insert_with(|| Bucket::new(self.capacity));
        bucket.try_consume(self.capacity, self.refill_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ip(last: u8) -> IpAddr {
        format!("10.0.0.{last}").parse().unwrap()
    }

    #[test]
    fn burst_is_admitted_then_throttled() {
        let limiter = RateLimiter::new(1.0, 3.0);
        let client = ip(1);

        assert!(limiter.allow(client));
        assert!(limiter.allow(client));
        assert!(limiter.allow(client));
        assert!(!limiter.allow(client));
    }

    #[test]
    fn clients_are_limited_independently() {
        let limiter = RateLimiter::new(1.0, 1.0);

        assert!(limiter.allow(ip(1)));
        assert!(!limiter.allow(ip(1)));
        assert!(limiter.allow(ip(2)));
    }

    #[test]
    fn tokens_refill_over_time() {
        let limiter = RateLimiter::new(20.0, 1.0);
        let client = ip(1);

        assert!(limiter.allow(client));
        assert!(!limiter.allow(client));

        std::thread::sleep(Duration::from_millis(100));
        assert!(limiter.allow(client));
    }
}
