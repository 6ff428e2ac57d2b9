//! Shared primitive types used across the entire engine.

use crate::rng::StreamRng;
use serde::{Deserialize, Serialize};

/// An engine tick. One tick = one generation cycle.
pub type Tick = u64;

/// A stable, unique identifier for any entity the engine emits.
pub type EntityId = String;

/// Kilometres covered by one degree of arc, the flat-earth constant the
/// whole placement model runs on. Good enough at demo scale.
pub const KM_PER_DEGREE: f64 = 111.0;

/// Shared severity scale for alerts and incidents.
/// Ordering is semantic: `Info < Low < Medium < High < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Severity; 5] = [
        Severity::Info,
        Severity::Low,
        Severity::Medium,
        Severity::High,
        Severity::Critical,
    ];

    /// Escalation tier attached to alerts: 1 for routine severities,
    /// 2 for high, 3 for critical.
    pub fn escalation_level(&self) -> u8 {
        match self {
            Self::Critical => 3,
            Self::High => 2,
            _ => 1,
        }
    }

    /// Response-deadline offset from the moment an alert is raised.
    /// Critical 15 minutes, high 1 hour, everything else 4 hours.
    pub fn sla_offset(&self) -> chrono::Duration {
        match self {
            Self::Critical => chrono::Duration::minutes(15),
            Self::High => chrono::Duration::hours(1),
            _ => chrono::Duration::hours(4),
        }
    }

    /// Estimated-cost band for incidents, in dollars. Half-open:
    /// draws land in [lo, hi).
    pub fn cost_range(&self) -> (f64, f64) {
        match self {
            Self::Critical => (50_000.0, 500_000.0),
            Self::High => (10_000.0, 100_000.0),
            _ => (1_000.0, 25_000.0),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// A point displaced from `self` by a uniform angle and a uniform
    /// distance in [0, radius_km), converted to degrees at 111 km per
    /// degree. Uniform in distance, not in area, so placements cluster
    /// toward the centre; that reads naturally on a city map.
    pub fn jittered(&self, radius_km: f64, rng: &mut StreamRng) -> GeoPoint {
        let angle = rng.next_f64() * std::f64::consts::TAU;
        let distance_deg = rng.next_f64() * radius_km / KM_PER_DEGREE;
        GeoPoint::new(
            self.lat + distance_deg * angle.sin(),
            self.lon + distance_deg * angle.cos(),
        )
    }
}

/// Clamp `value` into [lo, hi], collapsing NaN and infinities to `lo`.
/// Every generated numeric field passes through here so a bad noise
/// draw can never leak a non-finite value into a snapshot.
pub fn clamp_finite(value: f64, lo: f64, hi: f64) -> f64 {
    if !value.is_finite() {
        return lo;
    }
    value.clamp(lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::StreamRng;

    #[test]
    fn severity_orders_from_info_to_critical() {
        assert!(Severity::Info < Severity::Low);
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn sla_offsets_match_policy() {
        assert_eq!(Severity::Critical.sla_offset(), chrono::Duration::minutes(15));
        assert_eq!(Severity::High.sla_offset(), chrono::Duration::hours(1));
        assert_eq!(Severity::Medium.sla_offset(), chrono::Duration::hours(4));
        assert_eq!(Severity::Info.sla_offset(), chrono::Duration::hours(4));
    }

    #[test]
    fn escalation_levels_match_policy() {
        assert_eq!(Severity::Critical.escalation_level(), 3);
        assert_eq!(Severity::High.escalation_level(), 2);
        assert_eq!(Severity::Medium.escalation_level(), 1);
        assert_eq!(Severity::Info.escalation_level(), 1);
    }

    #[test]
    fn jittered_point_stays_within_radius() {
        let centre = GeoPoint::new(40.7128, -74.0060);
        let mut rng = StreamRng::new(77, 0, 0);
        for _ in 0..500 {
            let p = centre.jittered(15.0, &mut rng);
            let dlat = p.lat - centre.lat;
            let dlon = p.lon - centre.lon;
            let distance_km = (dlat * dlat + dlon * dlon).sqrt() * KM_PER_DEGREE;
            assert!(distance_km <= 15.0 + 1e-6, "point {distance_km:.3} km out");
        }
    }

    #[test]
    fn clamp_finite_handles_nan_and_infinities() {
        assert_eq!(clamp_finite(f64::NAN, 0.0, 1.0), 0.0);
        assert_eq!(clamp_finite(f64::INFINITY, 0.0, 1.0), 0.0);
        assert_eq!(clamp_finite(f64::NEG_INFINITY, 0.0, 1.0), 0.0);
        assert_eq!(clamp_finite(1.5, 0.0, 1.0), 1.0);
        assert_eq!(clamp_finite(-0.5, 0.0, 1.0), 0.0);
        assert_eq!(clamp_finite(0.5, 0.0, 1.0), 0.5);
    }
}
