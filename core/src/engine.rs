//! The simulation engine — the heart of CityPulse.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. Metrics synthesizer
//!   2. Alert emitter
//!   3. Incident emitter
//!   4. Topology simulator
//!
//! RULES:
//!   - Subsystems execute in the documented order, every tick.
//!   - No subsystem reads another subsystem's state.
//!   - All randomness flows through the RngBank, one stream per
//!     (subsystem, tick).
//!   - Consumers only ever see cloned values or Arc-shared snapshots,
//!     never references into engine-owned mutable state.
//!
//! Construction counts as tick 0: the topology is built and an initial
//! metrics sample is generated from the tick-0 streams, so every
//! accessor is total from the moment `new` returns. Event trials start
//! at tick 1.

use crate::{
    alert_subsystem::{Alert, AlertSubsystem},
    clock::SimClock,
    config::EngineConfig,
    error::SimResult,
    incident_subsystem::{Incident, IncidentSubsystem},
    metrics_subsystem::{CityMetrics, MetricsSubsystem},
    rng::{RngBank, StreamSlot},
    snapshot::EngineSnapshot,
    topology_subsystem::{NetworkTopology, TopologySubsystem},
    types::Tick,
};
use chrono::Utc;

pub struct SimEngine {
    config:         EngineConfig,
    clock:          SimClock,
    rng_bank:       RngBank,
    metrics:        MetricsSubsystem,
    alerts:         AlertSubsystem,
    incidents:      IncidentSubsystem,
    topology:       TopologySubsystem,
    latest_metrics: CityMetrics,
}

impl SimEngine {
    /// Build a fully wired engine. Fails fast on invalid config;
    /// nothing else in the engine can fail after this returns.
    pub fn new(config: EngineConfig) -> SimResult<Self> {
        config.validate()?;

        let start = config.start_time.unwrap_or_else(Utc::now);
        let clock = SimClock::new(start, config.tick_period_ms);
        let rng_bank = RngBank::new(config.seed);

        let metrics = MetricsSubsystem::new();
        let alerts = AlertSubsystem::new(&config);
        let incidents = IncidentSubsystem::new(&config);
        let mut topology_rng = rng_bank.for_subsystem_at_tick(StreamSlot::Topology, 0);
        let topology = TopologySubsystem::new(&config, &clock, &mut topology_rng);

        let mut metrics_rng = rng_bank.for_subsystem_at_tick(StreamSlot::Metrics, 0);
        let latest_metrics = metrics.generate(&clock, &mut metrics_rng);

        log::info!(
            "engine initialized: seed={} nodes={} epoch={}",
            config.seed,
            config.node_count,
            start
        );

        Ok(Self {
            config,
            clock,
            rng_bank,
            metrics,
            alerts,
            incidents,
            topology,
            latest_metrics,
        })
    }

    /// Advance one tick. Generation is total over a validly constructed
    /// engine, so the fresh snapshot is returned directly.
    pub fn tick(&mut self) -> EngineSnapshot {
        let tick = self.clock.advance();

        let mut rng = self.rng_bank.for_subsystem_at_tick(StreamSlot::Metrics, tick);
        self.latest_metrics = self.metrics.generate(&self.clock, &mut rng);

        let mut rng = self.rng_bank.for_subsystem_at_tick(StreamSlot::Alerts, tick);
        self.alerts.update(&self.clock, &mut rng);

        let mut rng = self.rng_bank.for_subsystem_at_tick(StreamSlot::Incidents, tick);
        self.incidents.update(&self.clock, &mut rng);

        let mut rng = self.rng_bank.for_subsystem_at_tick(StreamSlot::Topology, tick);
        self.topology.update(&self.clock, &mut rng);

        log::debug!(
            "tick={tick} complete: alerts_total={} incidents_total={}",
            self.alerts.emitted(),
            self.incidents.emitted()
        );

        self.snapshot()
    }

    /// Run n ticks back to back with no wall-clock pacing. Used for
    /// testing and fast-forward. Returns the final snapshot.
    pub fn run_ticks(&mut self, n: u64) -> EngineSnapshot {
        for _ in 0..n {
            self.tick();
        }
        self.snapshot()
    }

    /// Assemble the current state into an owned snapshot.
    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            tick: self.clock.current_tick,
            generated_at: self.clock.timestamp(),
            metrics: self.latest_metrics.clone(),
            alerts: self.alerts.history(),
            incidents: self.incidents.history(),
            topology: self.topology.topology(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn current_tick(&self) -> Tick {
        self.clock.current_tick
    }

    pub fn latest_metrics(&self) -> CityMetrics {
        self.latest_metrics.clone()
    }

    /// Newest-first, length bounded by the alert history cap.
    pub fn alert_history(&self) -> Vec<Alert> {
        self.alerts.history()
    }

    /// Newest-first, length bounded by the incident history cap.
    pub fn incident_history(&self) -> Vec<Incident> {
        self.incidents.history()
    }

    pub fn topology(&self) -> NetworkTopology {
        self.topology.topology()
    }

    /// Total alerts emitted over the run, including evicted ones.
    pub fn alerts_emitted(&self) -> u64 {
        self.alerts.emitted()
    }

    /// Total incidents emitted over the run, including evicted ones.
    pub fn incidents_emitted(&self) -> u64 {
        self.incidents.emitted()
    }
}
