//! Engine clock — owns tick state and the simulated timeline.
//!
//! Timestamps are derived, never sampled: the clock maps tick N to
//! `start + N * tick_period`, so two runs with the same seed and the
//! same start instant produce byte-identical snapshots.

use crate::types::Tick;
use chrono::{DateTime, Duration, Timelike, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimClock {
    pub start:          DateTime<Utc>,
    pub tick_period_ms: u64,
    pub current_tick:   Tick,
}

impl SimClock {
    pub fn new(start: DateTime<Utc>, tick_period_ms: u64) -> Self {
        Self {
            start,
            tick_period_ms,
            current_tick: 0,
        }
    }

    /// Advance one tick. Returns the new tick number.
    pub fn advance(&mut self) -> Tick {
        self.current_tick += 1;
        self.current_tick
    }

    /// The simulated instant of an arbitrary tick.
    pub fn timestamp_at(&self, tick: Tick) -> DateTime<Utc> {
        self.start + Duration::milliseconds(self.tick_period_ms as i64 * tick as i64)
    }

    /// The simulated instant of the current tick.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp_at(self.current_tick)
    }

    /// Hour of the simulated day, 0..=23. Drives the diurnal profiles.
    pub fn hour_of_day(&self) -> u32 {
        self.timestamp().hour()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn timestamps_step_by_tick_period() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let mut clock = SimClock::new(start, 2_000);
        assert_eq!(clock.timestamp(), start);
        clock.advance();
        assert_eq!(clock.timestamp(), start + Duration::seconds(2));
        for _ in 0..29 {
            clock.advance();
        }
        assert_eq!(clock.current_tick, 30);
        assert_eq!(clock.timestamp(), start + Duration::seconds(60));
    }

    #[test]
    fn hour_of_day_crosses_midnight() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 0).unwrap();
        let mut clock = SimClock::new(start, 60_000);
        assert_eq!(clock.hour_of_day(), 23);
        clock.advance();
        assert_eq!(clock.hour_of_day(), 0);
    }
}
