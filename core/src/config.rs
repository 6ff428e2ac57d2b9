//! Engine configuration — every tunable lives here, in code.
//!
//! There is no config file: the engine is embedded in demo hosts that
//! construct an `EngineConfig`, adjust what they need, and hand it to
//! `SimEngine::new`. Validation happens once, at engine construction.

use crate::error::{EngineError, SimResult};
use crate::types::GeoPoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Master seed. Every random draw in a run derives from this.
    pub seed: u64,
    /// Wall-clock interval between scheduled ticks, and the simulated
    /// time that passes per tick.
    pub tick_period_ms: u64,
    /// Simulated instant of tick 0. `None` means "now at construction".
    pub start_time: Option<DateTime<Utc>>,
    /// Per-tick probability that an alert is raised.
    pub alert_probability: f64,
    /// Per-tick probability that an incident opens.
    pub incident_probability: f64,
    /// Retained alerts, newest first.
    pub alert_history_cap: usize,
    /// Retained incidents, newest first.
    pub incident_history_cap: usize,
    /// Nodes in the network topology. Fixed for the life of a run.
    pub node_count: usize,
    /// Centre of the simulated city.
    pub center: GeoPoint,
    /// Radius around the centre inside which events are placed.
    pub jitter_radius_km: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            tick_period_ms: 2_000,
            start_time: None,
            alert_probability: 0.25,
            incident_probability: 0.05,
            alert_history_cap: 50,
            incident_history_cap: 20,
            node_count: 25,
            center: GeoPoint::new(40.7128, -74.0060),
            jitter_radius_km: 15.0,
        }
    }
}

impl EngineConfig {
    pub fn validate(&self) -> SimResult<()> {
        if self.tick_period_ms == 0 {
            return Err(EngineError::InvalidConfig {
                field: "tick_period_ms",
                reason: "must be at least 1".into(),
            });
        }
        for (field, p) in [
            ("alert_probability", self.alert_probability),
            ("incident_probability", self.incident_probability),
        ] {
            if !(0.0..=1.0).contains(&p) || !p.is_finite() {
                return Err(EngineError::InvalidConfig {
                    field,
                    reason: format!("must be in [0, 1], got {p}"),
                });
            }
        }
        if self.alert_history_cap == 0 {
            return Err(EngineError::InvalidConfig {
                field: "alert_history_cap",
                reason: "must be at least 1".into(),
            });
        }
        if self.incident_history_cap == 0 {
            return Err(EngineError::InvalidConfig {
                field: "incident_history_cap",
                reason: "must be at least 1".into(),
            });
        }
        // Edge targets redraw until they differ from the source, so a
        // one-node graph would never terminate.
        if self.node_count < 2 {
            return Err(EngineError::InvalidConfig {
                field: "node_count",
                reason: format!("must be at least 2, got {}", self.node_count),
            });
        }
        if !self.jitter_radius_km.is_finite() || self.jitter_radius_km < 0.0 {
            return Err(EngineError::InvalidConfig {
                field: "jitter_radius_km",
                reason: format!("must be finite and non-negative, got {}", self.jitter_radius_km),
            });
        }
        if !(-90.0..=90.0).contains(&self.center.lat)
            || !(-180.0..=180.0).contains(&self.center.lon)
        {
            return Err(EngineError::InvalidConfig {
                field: "center",
                reason: format!("({}, {}) is not a valid coordinate", self.center.lat, self.center.lon),
            });
        }
        Ok(())
    }

    /// Config with hardcoded defaults for use in unit tests: a fixed
    /// seed and start instant, and a small topology.
    pub fn default_test() -> Self {
        use chrono::TimeZone;
        Self {
            seed: 0xDEAD_BEEF,
            start_time: Some(Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()),
            node_count: 8,
            ..Self::default()
        }
    }
}
