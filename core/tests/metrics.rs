//! City metrics tests — domain bounds and diurnal shaping.

use chrono::{TimeZone, Utc};
use citypulse_core::{
    config::EngineConfig,
    engine::SimEngine,
    metrics_subsystem::{DayShape, MetricsSubsystem},
};

fn build_at_hour(hour: u32, seed: u64) -> SimEngine {
    let config = EngineConfig {
        seed,
        start_time: Some(Utc.with_ymd_and_hms(2024, 3, 1, hour, 0, 0).unwrap()),
        ..EngineConfig::default_test()
    };
    SimEngine::new(config).expect("engine builds")
}

/// Every field stays inside its documented domain, for a run long
/// enough to cross several simulated days.
#[test]
fn fields_stay_in_domain_over_long_run() {
    let config = EngineConfig {
        // One simulated hour per tick: 500 ticks cross 20+ days.
        tick_period_ms: 3_600_000,
        ..EngineConfig::default_test()
    };
    let mut engine = SimEngine::new(config).unwrap();

    for tick in 0..500u64 {
        let m = engine.latest_metrics();
        assert!(m.energy_consumption_mw.is_finite() && m.energy_consumption_mw >= 0.0);
        assert!((0.0..=1.0).contains(&m.traffic_flow), "tick {tick}: traffic {}", m.traffic_flow);
        assert!((0.0..=500.0).contains(&m.air_quality_index));
        assert!((0.0..=1.0).contains(&m.infrastructure_health));
        assert!(m.network_latency_ms >= 1.0, "tick {tick}: latency {}", m.network_latency_ms);
        assert!((0.0..=100.0).contains(&m.security_score));
        assert!((0.0..=1.0).contains(&m.citizen_satisfaction));
        assert!((0.0..=1.0).contains(&m.budget_utilization));
        engine.tick();
    }
}

/// Hour 8 is both rush hour and business hours; hour 7 is rush only;
/// hour 2 is neither. These windows drive every base value.
#[test]
fn day_shape_windows_are_inclusive() {
    let shape = DayShape::of_hour(8);
    assert!(shape.business && shape.rush);

    let shape = DayShape::of_hour(7);
    assert!(!shape.business && shape.rush);

    let shape = DayShape::of_hour(19);
    assert!(!shape.business && shape.rush);

    let shape = DayShape::of_hour(18);
    assert!(shape.business && !shape.rush);

    let shape = DayShape::of_hour(10);
    assert!(shape.business && !shape.rush);

    let shape = DayShape::of_hour(2);
    assert!(!shape.business && !shape.rush);
}

/// The base table with noise and drift excluded.
#[test]
fn base_values_match_the_documented_table() {
    let business = DayShape { business: true, rush: false };
    let rush = DayShape { business: true, rush: true };
    let night = DayShape { business: false, rush: false };

    assert_eq!(MetricsSubsystem::base_energy_mw(business), 75.0);
    assert_eq!(MetricsSubsystem::base_energy_mw(night), 45.0);

    assert_eq!(MetricsSubsystem::base_traffic_flow(rush), 0.85);
    assert_eq!(MetricsSubsystem::base_traffic_flow(business), 0.65);
    assert_eq!(MetricsSubsystem::base_traffic_flow(night), 0.35);

    assert_eq!(MetricsSubsystem::base_air_quality(rush), 68.0);
    assert_eq!(MetricsSubsystem::base_air_quality(business), 52.0);
    assert_eq!(MetricsSubsystem::base_air_quality(night), 40.0);

    assert_eq!(MetricsSubsystem::base_latency_ms(business), 30.0);
    assert_eq!(MetricsSubsystem::base_latency_ms(night), 18.0);

    assert_eq!(MetricsSubsystem::base_satisfaction(business), 0.76);
    assert_eq!(MetricsSubsystem::base_satisfaction(night), 0.72);
}

/// Business-hours energy (base 75) and overnight energy (base 45) are
/// separated by more than the combined noise and drift envelopes, so a
/// single sample from each regime is enough to tell them apart.
#[test]
fn energy_tracks_business_hours() {
    let midday = build_at_hour(12, 7).latest_metrics();
    let night = build_at_hour(2, 7).latest_metrics();
    assert!(
        midday.energy_consumption_mw > 60.0,
        "midday energy {:.1} below business envelope",
        midday.energy_consumption_mw
    );
    assert!(
        night.energy_consumption_mw < 60.0,
        "overnight energy {:.1} above overnight envelope",
        night.energy_consumption_mw
    );
}

/// Rush-hour traffic (base 0.85) stays above 0.70 even at full
/// negative noise and drift; overnight (base 0.35) stays below 0.50.
#[test]
fn traffic_peaks_in_rush_hour() {
    let rush = build_at_hour(8, 11).latest_metrics();
    let night = build_at_hour(2, 11).latest_metrics();
    assert!(rush.traffic_flow >= 0.70, "rush traffic {:.2}", rush.traffic_flow);
    assert!(night.traffic_flow <= 0.50, "overnight traffic {:.2}", night.traffic_flow);
}

/// Snapshot timestamps are derived from the epoch, one period per tick.
#[test]
fn timestamps_advance_by_tick_period() {
    let epoch = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
    let config = EngineConfig {
        start_time: Some(epoch),
        tick_period_ms: 2_000,
        ..EngineConfig::default_test()
    };
    let mut engine = SimEngine::new(config).unwrap();

    assert_eq!(engine.latest_metrics().timestamp, epoch);
    let snap = engine.run_ticks(30);
    assert_eq!(snap.tick, 30);
    assert_eq!(snap.generated_at, epoch + chrono::Duration::seconds(60));
    assert_eq!(snap.metrics.timestamp, snap.generated_at);
}
