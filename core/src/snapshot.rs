//! Snapshot assembly — one tick's published output.
//!
//! A snapshot is produced every tick. It is a plain owned value: the
//! engine clones its state into it, so a snapshot never aliases
//! engine-owned mutable data and stays valid after the engine moves on.

use crate::{
    alert_subsystem::Alert,
    incident_subsystem::Incident,
    metrics_subsystem::CityMetrics,
    topology_subsystem::NetworkTopology,
    types::Tick,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSnapshot {
    pub tick: Tick,
    /// Simulated instant of the tick that produced this snapshot.
    pub generated_at: DateTime<Utc>,
    pub metrics: CityMetrics,
    /// Newest first, length bounded by the alert history cap.
    pub alerts: Vec<Alert>,
    /// Newest first, length bounded by the incident history cap.
    pub incidents: Vec<Incident>,
    pub topology: NetworkTopology,
}
