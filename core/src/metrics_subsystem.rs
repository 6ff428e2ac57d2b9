//! City metrics subsystem — the periodic health snapshot.
//!
//! Every tick produces one fresh CityMetrics sample:
//!   1. Classify the simulated hour into the two diurnal factors
//!      (business hours, rush hour).
//!   2. Look up each field's base value for those factors.
//!   3. Add bounded uniform noise and a slow per-field sinusoidal
//!      drift keyed by tick index.
//!   4. Clamp into the field's documented domain.
//!
//! No state is retained between ticks; the sample is a pure function
//! of (tick, simulated hour, RNG stream).
//!
//! Execution: every tick.
//! Depends on: none.

use crate::clock::SimClock;
use crate::rng::StreamRng;
use crate::types::clamp_finite;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One periodic sample of city-wide operational metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityMetrics {
    pub timestamp: DateTime<Utc>,
    /// Grid draw in megawatts. Never negative.
    pub energy_consumption_mw: f64,
    /// Share of road capacity in use, 0..=1.
    pub traffic_flow: f64,
    /// EPA-style air quality index, 0..=500.
    pub air_quality_index: f64,
    /// Composite asset condition, 0..=1.
    pub infrastructure_health: f64,
    /// Median municipal network latency, at least 1 ms.
    pub network_latency_ms: f64,
    /// Physical-and-cyber posture score, 0..=100.
    pub security_score: f64,
    /// Rolling survey aggregate, 0..=1.
    pub citizen_satisfaction: f64,
    /// Fraction of annual budget consumed, 0..=1.
    pub budget_utilization: f64,
}

/// The two diurnal shaping factors, derived from simulated hour-of-day.
/// Both windows are inclusive: business is 8..=18, rush is 7..=9 or 17..=19.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayShape {
    pub business: bool,
    pub rush:     bool,
}

impl DayShape {
    pub fn of_hour(hour: u32) -> Self {
        Self {
            business: (8..=18).contains(&hour),
            rush: (7..=9).contains(&hour) || (17..=19).contains(&hour),
        }
    }
}

/// Slow sinusoidal drift, keyed by tick. Per-field periods are chosen
/// not to share obvious common multiples, so the combined series does
/// not visibly repeat within a demo run.
fn drift(tick: u64, period_ticks: f64, amplitude: f64) -> f64 {
    (tick as f64 * std::f64::consts::TAU / period_ticks).sin() * amplitude
}

pub struct MetricsSubsystem;

impl MetricsSubsystem {
    pub fn new() -> Self {
        Self
    }

    /// Base value per field under the given diurnal factors. Pure, so
    /// tests can assert bases with noise and drift excluded.
    /// Rush hour only shapes the traffic and air-quality fields.
    pub fn base_energy_mw(shape: DayShape) -> f64 {
        if shape.business { 75.0 } else { 45.0 }
    }

    pub fn base_traffic_flow(shape: DayShape) -> f64 {
        if shape.rush {
            0.85
        } else if shape.business {
            0.65
        } else {
            0.35
        }
    }

    pub fn base_air_quality(shape: DayShape) -> f64 {
        if shape.rush {
            68.0
        } else if shape.business {
            52.0
        } else {
            40.0
        }
    }

    pub fn base_latency_ms(shape: DayShape) -> f64 {
        if shape.business { 30.0 } else { 18.0 }
    }

    pub fn base_satisfaction(shape: DayShape) -> f64 {
        if shape.business { 0.76 } else { 0.72 }
    }

    pub fn generate(&self, clock: &SimClock, rng: &mut StreamRng) -> CityMetrics {
        let tick = clock.current_tick;
        let shape = DayShape::of_hour(clock.hour_of_day());

        let energy = Self::base_energy_mw(shape) + rng.noise(6.0) + drift(tick, 840.0, 5.0);
        let traffic = Self::base_traffic_flow(shape) + rng.noise(0.10) + drift(tick, 630.0, 0.05);
        let aqi = Self::base_air_quality(shape) + rng.noise(12.0) + drift(tick, 1170.0, 9.0);
        let infra = 0.92 + rng.noise(0.04) + drift(tick, 990.0, 0.02);
        let latency = Self::base_latency_ms(shape) + rng.noise(8.0) + drift(tick, 730.0, 4.0);
        let security = 94.0 + rng.noise(3.0) + drift(tick, 1080.0, 1.5);
        let satisfaction =
            Self::base_satisfaction(shape) + rng.noise(0.06) + drift(tick, 860.0, 0.03);
        let budget = 0.67 + rng.noise(0.05) + drift(tick, 1440.0, 0.04);

        let metrics = CityMetrics {
            timestamp: clock.timestamp(),
            energy_consumption_mw: clamp_finite(energy, 0.0, f64::MAX),
            traffic_flow: clamp_finite(traffic, 0.0, 1.0),
            air_quality_index: clamp_finite(aqi, 0.0, 500.0),
            infrastructure_health: clamp_finite(infra, 0.0, 1.0),
            network_latency_ms: clamp_finite(latency, 1.0, f64::MAX),
            security_score: clamp_finite(security, 0.0, 100.0),
            citizen_satisfaction: clamp_finite(satisfaction, 0.0, 1.0),
            budget_utilization: clamp_finite(budget, 0.0, 1.0),
        };

        log::debug!(
            "tick={tick} metrics: energy={:.1}MW traffic={:.2} aqi={:.0} latency={:.1}ms",
            metrics.energy_consumption_mw,
            metrics.traffic_flow,
            metrics.air_quality_index,
            metrics.network_latency_ms
        );

        metrics
    }
}

impl Default for MetricsSubsystem {
    fn default() -> Self {
        Self::new()
    }
}
