//! Incident subsystem — the rarer, richer event stream.
//!
//! This subsystem:
//!   1. Runs one Bernoulli trial per tick against the configured
//!      (low) emission probability.
//!   2. On success, draws an incident kind, severity, and in-progress
//!      status, attaches affected systems and responders from per-kind
//!      pools, and synthesizes a two-entry timeline (detection, then
//!      dispatch) with timestamps inside the last 30 minutes.
//!   3. Estimates cost uniformly within the severity's band and appends
//!      to a bounded, newest-first history.
//!
//! The generator only ever emits in-progress statuses; `resolved` and
//! `closed` exist for external operator workflows that update records
//! downstream of this engine.
//!
//! Execution: every tick.
//! Depends on: none.

use crate::clock::SimClock;
use crate::config::EngineConfig;
use crate::history::BoundedHistory;
use crate::rng::StreamRng;
use crate::types::{EntityId, GeoPoint, Severity};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Timeline entries are jittered inside this window before "now".
const TIMELINE_WINDOW_SECS: u64 = 1_800;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentKind {
    TrafficAccident,
    PowerOutage,
    WaterMainBreak,
    NetworkBreach,
    EquipmentFailure,
    Flooding,
    HazmatSpill,
}

impl IncidentKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::TrafficAccident => "traffic_accident",
            Self::PowerOutage => "power_outage",
            Self::WaterMainBreak => "water_main_break",
            Self::NetworkBreach => "network_breach",
            Self::EquipmentFailure => "equipment_failure",
            Self::Flooding => "flooding",
            Self::HazmatSpill => "hazmat_spill",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IncidentStatus {
    Reported,
    Investigating,
    Responding,
    Mitigating,
    Resolved,
    Closed,
}

impl IncidentStatus {
    /// The statuses the generator draws from. Terminal statuses are
    /// reachable only through external updates.
    pub const DRAWN: [IncidentStatus; 4] = [
        IncidentStatus::Reported,
        IncidentStatus::Investigating,
        IncidentStatus::Responding,
        IncidentStatus::Mitigating,
    ];
}

/// One step in an incident's embedded sub-event timeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub timestamp: DateTime<Utc>,
    pub description: String,
}

/// An immutable incident record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Incident {
    pub id: Uuid,
    pub kind: IncidentKind,
    pub severity: Severity,
    pub status: IncidentStatus,
    pub location: GeoPoint,
    pub started_at: DateTime<Utc>,
    pub summary: String,
    pub description: String,
    pub affected_systems: Vec<EntityId>,
    pub responders: Vec<EntityId>,
    /// Ordered sub-events: detection first, then dispatch.
    pub timeline: Vec<TimelineEntry>,
    /// Always empty at emission; populated by external collaborators.
    pub evidence: Vec<String>,
    /// Dollars, uniform within the severity's band.
    pub estimated_cost: f64,
}

// ── Per-kind profiles ────────────────────────────────────────────────────────

struct KindProfile {
    kind: IncidentKind,
    summary: &'static str,
    description: &'static str,
    systems: &'static [&'static str],
    responders: &'static [&'static str],
}

const KIND_PROFILES: &[KindProfile] = &[
    KindProfile {
        kind: IncidentKind::TrafficAccident,
        summary: "Multi-vehicle collision blocking lanes",
        description: "Collision reported on an arterial road; lanes blocked and signal timing adjusted while crews clear the scene",
        systems: &["signal-grid", "transit-ops", "ems-dispatch"],
        responders: &["traffic-unit-1", "ems-12", "tow-04", "patrol-7"],
    },
    KindProfile {
        kind: IncidentKind::PowerOutage,
        summary: "Distribution feeder outage",
        description: "Protective relay tripped a distribution feeder; affected blocks are without power pending fault isolation",
        systems: &["feeder-12", "substation-north", "scada-core"],
        responders: &["line-crew-2", "grid-ops-1", "field-eng-5", "dispatch-3"],
    },
    KindProfile {
        kind: IncidentKind::WaterMainBreak,
        summary: "Water main rupture",
        description: "Pressure-zone telemetry indicates a main rupture; isolation valves being closed and surface flooding reported",
        systems: &["pressure-zone-4", "pump-station-2", "water-scada"],
        responders: &["water-crew-1", "valve-team-3", "inspector-9", "dispatch-3"],
    },
    KindProfile {
        kind: IncidentKind::NetworkBreach,
        summary: "Suspected network intrusion",
        description: "Intrusion detection raised a high-confidence signature match; affected segment quarantined for forensics",
        systems: &["core-router-1", "idp-cluster", "auth-gateway"],
        responders: &["soc-analyst-2", "net-eng-4", "ir-lead-1", "forensics-2"],
    },
    KindProfile {
        kind: IncidentKind::EquipmentFailure,
        summary: "Critical equipment failure",
        description: "Monitored plant equipment failed self-test and dropped offline; standby capacity engaged",
        systems: &["hvac-plant", "elevator-bank-b", "backup-genset"],
        responders: &["facilities-1", "vendor-tech-6", "electrician-2", "ops-super-1"],
    },
    KindProfile {
        kind: IncidentKind::Flooding,
        summary: "Localized street flooding",
        description: "Storm drainage capacity exceeded; roadway flooding at low-lying intersections with closures in effect",
        systems: &["storm-drain-7", "pump-station-2", "road-sensors"],
        responders: &["flood-crew-1", "public-works-4", "ems-12", "patrol-7"],
    },
    KindProfile {
        kind: IncidentKind::HazmatSpill,
        summary: "Hazardous material release",
        description: "Spill reported near a storm drain inlet; containment deployed and air monitoring under way",
        systems: &["containment-unit", "air-quality-net", "drain-guard"],
        responders: &["hazmat-team-1", "fire-station-6", "env-officer-2", "ems-12"],
    },
];

/// Draw `count` distinct entries from a pool via partial Fisher-Yates.
fn sample_pool(pool: &[&'static str], count: usize, rng: &mut StreamRng) -> Vec<EntityId> {
    debug_assert!(count <= pool.len());
    let mut idx: Vec<usize> = (0..pool.len()).collect();
    for i in 0..count {
        let j = i + rng.next_u64_below((idx.len() - i) as u64) as usize;
        idx.swap(i, j);
    }
    idx[..count].iter().map(|&i| pool[i].to_string()).collect()
}

// ── Subsystem ────────────────────────────────────────────────────────────────

pub struct IncidentSubsystem {
    probability: f64,
    center: GeoPoint,
    jitter_radius_km: f64,
    history: BoundedHistory<Incident>,
    emitted: u64,
}

impl IncidentSubsystem {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            probability: config.incident_probability,
            center: config.center,
            jitter_radius_km: config.jitter_radius_km,
            history: BoundedHistory::new(config.incident_history_cap),
            emitted: 0,
        }
    }

    /// Run the per-tick trial. Returns the incident if one opened.
    pub fn update(&mut self, clock: &SimClock, rng: &mut StreamRng) -> Option<Incident> {
        if !rng.chance(self.probability) {
            return None;
        }

        let profile = rng.pick(KIND_PROFILES);
        let severity = *rng.pick(&Severity::ALL);
        let status = *rng.pick(&IncidentStatus::DRAWN);
        let location = self.center.jittered(self.jitter_radius_km, rng);

        let system_count = rng.range_u64(1, 3) as usize;
        let affected_systems = sample_pool(profile.systems, system_count, rng);
        let responder_count = rng.range_u64(2, 4) as usize;
        let responders = sample_pool(profile.responders, responder_count, rng);

        let now = clock.timestamp();
        let detected_at = now - Duration::seconds(rng.next_u64_below(TIMELINE_WINDOW_SECS) as i64);
        let dispatched_at =
            now - Duration::seconds(rng.next_u64_below(TIMELINE_WINDOW_SECS) as i64);
        let timeline = vec![
            TimelineEntry {
                timestamp: detected_at,
                description: "Event detected by automated monitoring".into(),
            },
            TimelineEntry {
                timestamp: dispatched_at,
                description: "Response units dispatched".into(),
            },
        ];

        let (cost_lo, cost_hi) = severity.cost_range();
        let incident = Incident {
            id: rng.uuid(),
            kind: profile.kind,
            severity,
            status,
            location,
            started_at: detected_at,
            summary: profile.summary.into(),
            description: profile.description.into(),
            affected_systems,
            responders,
            timeline,
            evidence: Vec::new(),
            estimated_cost: rng.range_f64(cost_lo, cost_hi),
        };

        log::info!(
            "tick={} incident: {} {} — {} (est ${:.0})",
            clock.current_tick,
            severity.name(),
            profile.kind.name(),
            incident.summary,
            incident.estimated_cost
        );

        self.history.push(incident.clone());
        self.emitted += 1;
        Some(incident)
    }

    /// Newest-first copy of the retained incidents.
    pub fn history(&self) -> Vec<Incident> {
        self.history.to_vec()
    }

    pub fn latest(&self) -> Option<&Incident> {
        self.history.latest()
    }

    /// Total incidents emitted over the run, including evicted ones.
    pub fn emitted(&self) -> u64 {
        self.emitted
    }
}
