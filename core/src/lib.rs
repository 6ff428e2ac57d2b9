//! CityPulse core — a deterministic synthetic-telemetry engine for
//! municipal operations dashboards.
//!
//! The engine fabricates four coordinated data products per tick: a
//! city-wide metrics sample, a probabilistic alert stream, a rarer
//! incident stream, and an evolving network topology. Every random
//! draw derives from one master seed, so two runs with the same seed
//! and simulation epoch publish identical snapshot sequences.

pub mod alert_subsystem;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod incident_subsystem;
pub mod metrics_subsystem;
pub mod rng;
pub mod scheduler;
pub mod snapshot;
pub mod topology_subsystem;
pub mod types;
