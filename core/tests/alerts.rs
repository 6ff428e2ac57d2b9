//! Alert stream tests — emission rate, payload shape, and history bounds.

use chrono::Duration;
use citypulse_core::{
    config::EngineConfig,
    engine::SimEngine,
    types::{Severity, KM_PER_DEGREE},
};

fn build(alert_probability: f64) -> SimEngine {
    let config = EngineConfig {
        alert_probability,
        incident_probability: 0.0,
        ..EngineConfig::default_test()
    };
    SimEngine::new(config).expect("engine builds")
}

#[test]
fn history_is_bounded_and_newest_first() {
    let mut engine = build(1.0);
    engine.run_ticks(60);

    let alerts = engine.alert_history();
    assert_eq!(alerts.len(), 50, "cap evicts beyond the configured bound");
    assert_eq!(engine.alerts_emitted(), 60);

    for pair in alerts.windows(2) {
        assert!(
            pair[0].timestamp >= pair[1].timestamp,
            "history must be ordered newest first"
        );
    }
}

#[test]
fn zero_probability_emits_nothing() {
    let mut engine = build(0.0);
    engine.run_ticks(500);
    assert!(engine.alert_history().is_empty());
    assert_eq!(engine.alerts_emitted(), 0);
}

/// Over a long run the observed emission rate converges on the
/// configured probability. 10k trials put 0.25 well inside ±0.02.
#[test]
fn emission_rate_tracks_configured_probability() {
    let mut engine = build(0.25);
    engine.run_ticks(10_000);

    let rate = engine.alerts_emitted() as f64 / 10_000.0;
    assert!(
        (0.23..=0.27).contains(&rate),
        "observed alert rate {rate:.3} outside expected band"
    );
}

/// Escalation level and SLA deadline are pure functions of severity.
#[test]
fn escalation_and_sla_follow_severity() {
    let mut engine = build(1.0);
    engine.run_ticks(60);

    for alert in engine.alert_history() {
        let expected_offset = match alert.severity {
            Severity::Critical => Duration::minutes(15),
            Severity::High => Duration::minutes(60),
            _ => Duration::minutes(240),
        };
        assert_eq!(alert.sla_deadline - alert.timestamp, expected_offset);
        assert_eq!(alert.escalation_level, alert.severity.escalation_level());
    }
}

#[test]
fn payload_carries_two_assets_and_a_location_near_center() {
    let config = EngineConfig {
        alert_probability: 1.0,
        incident_probability: 0.0,
        ..EngineConfig::default_test()
    };
    let center = config.center;
    let radius_km = config.jitter_radius_km;
    let mut engine = SimEngine::new(config).unwrap();
    engine.run_ticks(100);

    for alert in engine.alert_history() {
        assert_eq!(alert.affected_assets.len(), 2);
        for asset in &alert.affected_assets {
            assert!(
                asset.rsplit_once('-').is_some_and(|(_, n)| n.len() == 3),
                "asset id {asset} not in prefix-NNN form"
            );
        }

        let location = alert.location.expect("alerts are always placed");
        let d_lat = location.lat - center.lat;
        let d_lon = location.lon - center.lon;
        let distance_km = (d_lat * d_lat + d_lon * d_lon).sqrt() * KM_PER_DEGREE;
        assert!(
            distance_km <= radius_km + 1e-9,
            "alert placed {distance_km:.2} km out, radius is {radius_km} km"
        );
    }
}

/// Roughly 15% of alerts carry a correlation id. 2000 emitted alerts
/// put the observed share far inside [0.10, 0.20].
#[test]
fn correlation_ids_appear_at_the_documented_share() {
    let config = EngineConfig {
        alert_probability: 1.0,
        incident_probability: 0.0,
        alert_history_cap: 2_048,
        ..EngineConfig::default_test()
    };
    let mut engine = SimEngine::new(config).unwrap();
    engine.run_ticks(2_000);

    let alerts = engine.alert_history();
    assert_eq!(alerts.len(), 2_000);
    let correlated = alerts.iter().filter(|a| a.correlation_id.is_some()).count();
    let share = correlated as f64 / alerts.len() as f64;
    assert!(
        (0.10..=0.20).contains(&share),
        "correlation share {share:.3} outside expected band"
    );
}

/// All five severities and all seven categories show up in a run long
/// enough that missing one is astronomically unlikely.
#[test]
fn severity_and_category_draws_cover_the_full_range() {
    let config = EngineConfig {
        alert_probability: 1.0,
        incident_probability: 0.0,
        alert_history_cap: 512,
        ..EngineConfig::default_test()
    };
    let mut engine = SimEngine::new(config).unwrap();
    engine.run_ticks(500);

    let alerts = engine.alert_history();
    for severity in Severity::ALL {
        assert!(
            alerts.iter().any(|a| a.severity == severity),
            "severity {} never drawn",
            severity.name()
        );
    }
    let categories: std::collections::HashSet<&str> =
        alerts.iter().map(|a| a.category.name()).collect();
    assert_eq!(categories.len(), 7, "expected all categories, saw {categories:?}");
}
