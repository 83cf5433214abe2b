//! Jetpack fuel: discrete consumption while thrusting, discrete recovery while idle.
//!
//! Both directions move in fixed quanta per fixed interval, so the amount
//! drained over a span of time does not depend on the frame rate. Recovery
//! is driven by a repeating timer owned by the agent (see
//! [`TimerQueue`](crate::TimerQueue)); consumption accrues inside the jetpack
//! physics step.

use serde::{Deserialize, Serialize};
use strider_config::FuelConfig;

/// Slack applied when comparing accumulated time against an interval.
const INTERVAL_EPSILON: f32 = 1e-5;

/// Outcome of one [`FuelPool::consume`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuelDrain {
    /// The interval has not elapsed yet; nothing was removed.
    Pending,
    /// One quantum was removed and fuel remains.
    Drained,
    /// The pool is empty: the jetpack must shut off.
    Exhausted,
}

/// Outcome of one [`FuelPool::recover_tick`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FuelRecovery {
    /// Still below capacity.
    Partial,
    /// Back at capacity; the recovery timer can stop.
    Full,
}

/// Depletable, rechargeable fuel gating the jetpack.
///
/// Invariant: `0 <= current <= capacity` after every mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelPool {
    current: f32,
    capacity: f32,
    consume_per_interval: f32,
    consume_interval: f32,
    recover_per_interval: f32,
    recover_interval: f32,
    fuel_over: bool,
    consume_elapsed: f32,
}

impl FuelPool {
    /// Creates a full pool from tuning values.
    pub fn new(config: &FuelConfig) -> Self {
        let capacity = config.capacity.max(0.0);
        Self {
            current: capacity,
            capacity,
            consume_per_interval: config.consume_per_interval.max(0.0),
            consume_interval: config.consume_interval_secs,
            recover_per_interval: config.recover_per_interval.max(0.0),
            recover_interval: config.recover_interval_secs,
            fuel_over: false,
            consume_elapsed: 0.0,
        }
    }

    /// Remaining fuel.
    pub fn current(&self) -> f32 {
        self.current
    }

    /// Maximum fuel.
    pub fn capacity(&self) -> f32 {
        self.capacity
    }

    /// `true` from exhaustion until the pool is full again.
    pub fn fuel_over(&self) -> bool {
        self.fuel_over
    }

    /// Returns `true` once the pool is back at capacity.
    pub fn is_full(&self) -> bool {
        self.current >= self.capacity
    }

    /// Seconds between recovery quanta.
    pub fn recover_interval(&self) -> f32 {
        self.recover_interval
    }

    /// Accrues `dt` seconds of thrust, removing one quantum per full interval.
    pub fn consume(&mut self, dt: f32) -> FuelDrain {
        if self.current <= 0.0 {
            self.exhaust();
            return FuelDrain::Exhausted;
        }

        self.consume_elapsed += dt.max(0.0);
        if self.consume_elapsed + INTERVAL_EPSILON < self.consume_interval {
            return FuelDrain::Pending;
        }
        self.consume_elapsed = 0.0;

        self.current = (self.current - self.consume_per_interval).clamp(0.0, self.capacity);
        if self.current <= 0.0 {
            self.exhaust();
            FuelDrain::Exhausted
        } else {
            FuelDrain::Drained
        }
    }

    /// Adds one recovery quantum. Clears `fuel_over` once full.
    pub fn recover_tick(&mut self) -> FuelRecovery {
        self.current = (self.current + self.recover_per_interval).clamp(0.0, self.capacity);
        if self.is_full() {
            self.fuel_over = false;
            FuelRecovery::Full
        } else {
            FuelRecovery::Partial
        }
    }

    /// Restarts the consumption interval (new thrust burst).
    pub fn reset_consumption(&mut self) {
        self.consume_elapsed = 0.0;
    }

    fn exhaust(&mut self) {
        self.current = 0.0;
        self.consume_elapsed = 0.0;
        self.fuel_over = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_config() -> FuelConfig {
        FuelConfig {
            capacity: 100.0,
            consume_per_interval: 20.0,
            consume_interval_secs: 0.5,
            recover_per_interval: 20.0,
            recover_interval_secs: 0.5,
        }
    }

    #[test]
    fn test_new_pool_is_full() {
        let pool = FuelPool::new(&scenario_config());
        assert_eq!(pool.current(), 100.0);
        assert!(pool.is_full());
        assert!(!pool.fuel_over());
    }

    #[test]
    fn test_consume_is_quantized_per_interval() {
        let mut pool = FuelPool::new(&scenario_config());
        assert_eq!(pool.consume(0.25), FuelDrain::Pending);
        assert_eq!(pool.current(), 100.0);
        assert_eq!(pool.consume(0.25), FuelDrain::Drained);
        assert_eq!(pool.current(), 80.0);
    }

    #[test]
    fn test_two_and_a_half_seconds_exhaust_the_pool() {
        let mut pool = FuelPool::new(&scenario_config());
        let dt = 0.125;
        let mut last = FuelDrain::Pending;
        for _ in 0..20 {
            last = pool.consume(dt);
        }
        assert_eq!(last, FuelDrain::Exhausted);
        assert_eq!(pool.current(), 0.0);
        assert!(pool.fuel_over());
    }

    #[test]
    fn test_consumption_is_frame_rate_independent() {
        let mut coarse = FuelPool::new(&scenario_config());
        let mut fine = FuelPool::new(&scenario_config());
        for _ in 0..3 {
            coarse.consume(0.5);
        }
        for _ in 0..96 {
            fine.consume(1.0 / 64.0);
        }
        assert_eq!(coarse.current(), fine.current());
    }

    #[test]
    fn test_fuel_over_clears_only_when_full() {
        let mut pool = FuelPool::new(&scenario_config());
        while pool.consume(0.5) != FuelDrain::Exhausted {}
        assert!(pool.fuel_over());

        for _ in 0..4 {
            assert_eq!(pool.recover_tick(), FuelRecovery::Partial);
            assert!(pool.fuel_over());
        }
        assert_eq!(pool.recover_tick(), FuelRecovery::Full);
        assert!(!pool.fuel_over());
        assert_eq!(pool.current(), 100.0);
    }

    #[test]
    fn test_bounds_hold_for_oversized_quanta() {
        let mut pool = FuelPool::new(&FuelConfig {
            capacity: 30.0,
            consume_per_interval: 45.0,
            consume_interval_secs: 0.1,
            recover_per_interval: 50.0,
            recover_interval_secs: 0.1,
        });
        assert_eq!(pool.consume(0.1), FuelDrain::Exhausted);
        assert_eq!(pool.current(), 0.0);
        assert_eq!(pool.recover_tick(), FuelRecovery::Full);
        assert_eq!(pool.current(), 30.0);
        assert_eq!(pool.recover_tick(), FuelRecovery::Full);
        assert_eq!(pool.current(), 30.0);
    }

    #[test]
    fn test_consume_on_empty_pool_reports_exhausted() {
        let mut pool = FuelPool::new(&scenario_config());
        while pool.consume(0.5) != FuelDrain::Exhausted {}
        assert_eq!(pool.consume(0.01), FuelDrain::Exhausted);
        assert_eq!(pool.current(), 0.0);
    }

    #[test]
    fn test_reset_consumption_restarts_interval() {
        let mut pool = FuelPool::new(&scenario_config());
        pool.consume(0.4);
        pool.reset_consumption();
        assert_eq!(pool.consume(0.4), FuelDrain::Pending);
        assert_eq!(pool.current(), 100.0);
    }
}
