//! Alert subsystem — the probabilistic operational alert stream.
//!
//! This subsystem:
//!   1. Runs one Bernoulli trial per tick against the configured
//!      emission probability.
//!   2. On success, draws severity, category, and a per-category
//!      template, places the alert near the city centre, and derives
//!      escalation level and SLA deadline from severity.
//!   3. Appends to a bounded, newest-first history (oldest evicted).
//!
//! Alerts are immutable once emitted — nothing here revisits or
//! acknowledges them.
//!
//! Execution: every tick.
//! Depends on: none.

use crate::clock::SimClock;
use crate::config::EngineConfig;
use crate::history::BoundedHistory;
use crate::rng::StreamRng;
use crate::types::{EntityId, GeoPoint, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Chance that an emitted alert carries a correlation identifier
/// linking it to a related event.
pub const CORRELATION_PROBABILITY: f64 = 0.15;

/// Synthetic affected-asset identifiers attached to each alert.
pub const ASSETS_PER_ALERT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertCategory {
    Traffic,
    Infrastructure,
    Environment,
    Security,
    Energy,
    Water,
    Network,
}

impl AlertCategory {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Traffic => "traffic",
            Self::Infrastructure => "infrastructure",
            Self::Environment => "environment",
            Self::Security => "security",
            Self::Energy => "energy",
            Self::Water => "water",
            Self::Network => "network",
        }
    }
}

/// An immutable operational alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alert {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub category: AlertCategory,
    pub severity: Severity,
    pub title: String,
    pub description: String,
    /// The monitoring system that raised the alert.
    pub source: String,
    pub location: Option<GeoPoint>,
    pub affected_assets: Vec<EntityId>,
    /// 3 for critical, 2 for high, else 1. Consumed by notification routing.
    pub escalation_level: u8,
    /// `timestamp` + 15 min (critical), 60 min (high), 240 min otherwise.
    pub sla_deadline: DateTime<Utc>,
    pub correlation_id: Option<Uuid>,
}

// ── Category profiles ────────────────────────────────────────────────────────

struct CategoryProfile {
    category: AlertCategory,
    source: &'static str,
    asset_prefix: &'static str,
    templates: &'static [(&'static str, &'static str)],
}

const CATEGORY_PROFILES: &[CategoryProfile] = &[
    CategoryProfile {
        category: AlertCategory::Traffic,
        source: "traffic-management-system",
        asset_prefix: "intersection",
        templates: &[
            ("Congestion threshold exceeded", "Average vehicle speed dropped below 12 km/h across the monitored corridor"),
            ("Signal controller offline", "Intersection signal controller stopped reporting; fallback timing plan active"),
            ("Transit lane obstruction", "Camera analytics flagged a stationary obstruction in a dedicated transit lane"),
        ],
    },
    CategoryProfile {
        category: AlertCategory::Infrastructure,
        source: "scada-gateway",
        asset_prefix: "asset",
        templates: &[
            ("Pump station pressure anomaly", "Discharge pressure outside the operating band at a monitored pump station"),
            ("Bridge sensor vibration spike", "Accelerometer cluster reported vibration above the inspection threshold"),
            ("Streetlight circuit fault", "Feeder circuit serving a streetlight group reports intermittent load drops"),
        ],
    },
    CategoryProfile {
        category: AlertCategory::Environment,
        source: "air-quality-network",
        asset_prefix: "station",
        templates: &[
            ("Particulate matter elevated", "PM2.5 rolling average exceeded the advisory level at a monitoring station"),
            ("Noise ordinance exceedance", "Sustained noise above the permitted level recorded in a mixed-use zone"),
            ("Ozone advisory threshold", "Ground-level ozone approaching the advisory threshold for sensitive groups"),
        ],
    },
    CategoryProfile {
        category: AlertCategory::Security,
        source: "soc-siem",
        asset_prefix: "sensor",
        templates: &[
            ("Perimeter badge anomaly", "Repeated failed badge attempts at a controlled facility entrance"),
            ("CCTV feed loss", "Multiple camera feeds dropped from the same switch segment"),
            ("Unusual login pattern", "Operator account login from an unrecognized network observed"),
        ],
    },
    CategoryProfile {
        category: AlertCategory::Energy,
        source: "grid-ems",
        asset_prefix: "feeder",
        templates: &[
            ("Feeder load imbalance", "Phase imbalance beyond tolerance on a distribution feeder"),
            ("Transformer temperature high", "Top-oil temperature trending above the seasonal envelope"),
            ("Demand spike detected", "District demand rose faster than the forecast ramp rate"),
        ],
    },
    CategoryProfile {
        category: AlertCategory::Water,
        source: "water-telemetry",
        asset_prefix: "main",
        templates: &[
            ("Reservoir level low", "Reservoir level below the seasonal minimum operating curve"),
            ("Flow meter discrepancy", "District meter net flow suggests a possible distribution loss"),
            ("Chlorine residual low", "Residual disinfectant below target at a sampling point"),
        ],
    },
    CategoryProfile {
        category: AlertCategory::Network,
        source: "noc-monitor",
        asset_prefix: "node",
        templates: &[
            ("Packet loss elevated", "Sustained packet loss on a backbone segment above the alerting threshold"),
            ("Uplink flapping", "Repeated link state transitions on an aggregation uplink"),
            ("Latency budget exceeded", "Round-trip latency to a district PoP exceeded the service budget"),
        ],
    },
];

// ── Subsystem ────────────────────────────────────────────────────────────────

pub struct AlertSubsystem {
    probability: f64,
    center: GeoPoint,
    jitter_radius_km: f64,
    history: BoundedHistory<Alert>,
    emitted: u64,
}

impl AlertSubsystem {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            probability: config.alert_probability,
            center: config.center,
            jitter_radius_km: config.jitter_radius_km,
            history: BoundedHistory::new(config.alert_history_cap),
            emitted: 0,
        }
    }

    /// Run the per-tick trial. Returns the alert if one was emitted.
    pub fn update(&mut self, clock: &SimClock, rng: &mut StreamRng) -> Option<Alert> {
        if !rng.chance(self.probability) {
            return None;
        }

        let severity = *rng.pick(&Severity::ALL);
        let profile = rng.pick(CATEGORY_PROFILES);
        let (title, description) = *rng.pick(profile.templates);
        let location = self.center.jittered(self.jitter_radius_km, rng);
        let affected_assets = (0..ASSETS_PER_ALERT)
            .map(|_| format!("{}-{:03}", profile.asset_prefix, rng.next_u64_below(1000)))
            .collect();
        let correlation = rng.chance(CORRELATION_PROBABILITY);
        let correlation_id = if correlation { Some(rng.uuid()) } else { None };

        let now = clock.timestamp();
        let alert = Alert {
            id: rng.uuid(),
            timestamp: now,
            category: profile.category,
            severity,
            title: title.into(),
            description: description.into(),
            source: profile.source.into(),
            location: Some(location),
            affected_assets,
            escalation_level: severity.escalation_level(),
            sla_deadline: now + severity.sla_offset(),
            correlation_id,
        };

        log::info!(
            "tick={} alert: {} {} — {}",
            clock.current_tick,
            severity.name(),
            profile.category.name(),
            alert.title
        );

        self.history.push(alert.clone());
        self.emitted += 1;
        Some(alert)
    }

    /// Newest-first copy of the retained alerts.
    pub fn history(&self) -> Vec<Alert> {
        self.history.to_vec()
    }

    pub fn latest(&self) -> Option<&Alert> {
        self.history.latest()
    }

    /// Total alerts emitted over the run, including evicted ones.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}
