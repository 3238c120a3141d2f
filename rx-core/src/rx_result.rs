// Copyright 2026 Rx Runtime Contributors
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! Downstream demand reported after every `Next`.

/// Sentinel used for "unbounded" demand; never decremented.
pub const UNBOUNDED: u64 = u64::MAX;

/// Demand signal an observer hands back to the runner after each `Next`.
///
/// `demand` is only meaningful while `should_continue` is `true`; a stopped
/// subscription always carries zero demand. `UNBOUNDED` (`u64::MAX`) means
/// "no limit".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RxResult {
    should_continue: bool,
    demand: u64,
}

impl RxResult {
    /// Continue, with unbounded demand. The common case for sinks that don't
    /// implement backpressure themselves.
    pub const CONTINUE: Self = Self {
        should_continue: true,
        demand: UNBOUNDED,
    };

    /// Tear the subscription down; no further `Next`s are wanted.
    pub const STOP: Self = Self {
        should_continue: false,
        demand: 0,
    };

    /// Stay subscribed but request zero further items until demand is
    /// replenished (see [`RxResult::is_paused`]).
    pub const PAUSED: Self = Self {
        should_continue: true,
        demand: 0,
    };

    /// Request exactly `n` more items.
    #[must_use]
    pub const fn request(n: u64) -> Self {
        Self {
            should_continue: true,
            demand: n,
        }
    }

    /// `shouldContinue && demand == 0`: subscribed but not currently asking
    /// for more.
    #[must_use]
    pub const fn is_paused(self) -> bool {
        self.should_continue && self.demand == 0
    }

    /// `true` once the subscription should be torn down.
    #[must_use]
    pub const fn should_continue(self) -> bool {
        self.should_continue
    }

    /// Remaining demand; `UNBOUNDED` means unlimited.
    #[must_use]
    pub const fn demand(self) -> u64 {
        self.demand
    }

    /// Combine two demand signals the way a combinator aggregates the
    /// results of its several downstream paths: `Stop` dominates, otherwise
    /// the tighter (smaller) demand wins, treating `UNBOUNDED` as infinity.
    #[must_use]
    pub fn combine(self, other: Self) -> Self {
        if !self.should_continue || !other.should_continue {
            return Self::STOP;
        }
        let demand = match (self.demand, other.demand) {
            (UNBOUNDED, d) | (d, UNBOUNDED) => d,
            (a, b) => a.min(b),
        };
        Self {
            should_continue: true,
            demand,
        }
    }

    /// Consume one unit of demand after delivering a `Next`. Unbounded stays
    /// unbounded; a positive count decreases by one; zero becomes `Paused`;
    /// `Stop` stays `Stop`.
    #[must_use]
    pub const fn decrement(self) -> Self {
        if !self.should_continue {
            return Self::STOP;
        }
        match self.demand {
            UNBOUNDED => self,
            0 => Self::PAUSED,
            n => Self {
                should_continue: true,
                demand: n - 1,
            },
        }
    }

    /// Saturating-add `n` more units of demand (capped at `UNBOUNDED - 1` so
    /// the sentinel stays distinguishable). `Stop` stays `Stop`.
    #[must_use]
    pub fn add_demand(self, n: u64) -> Self {
        if !self.should_continue {
            return Self::STOP;
        }
        if self.demand == UNBOUNDED {
            return self;
        }
        Self {
            should_continue: true,
            demand: self.demand.saturating_add(n).min(UNBOUNDED - 1),
        }
    }
}

impl Default for RxResult {
    fn default() -> Self {
        Self::CONTINUE
    }
}

impl std::ops::BitAnd for RxResult {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.combine(rhs)
    }
}
