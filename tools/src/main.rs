//! pulse-runner: headless runner for the CityPulse engine.
//!
//! Usage:
//!   pulse-runner --seed 12345 --ticks 500
//!   pulse-runner --seed 12345 --ticks 200 --json
//!   pulse-runner --realtime-secs 30 --period-ms 1000

use anyhow::Result;
use citypulse_core::{
    config::EngineConfig, engine::SimEngine, scheduler::EngineScheduler, snapshot::EngineSnapshot,
};
use std::env;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let seed = parse_arg(&args, "--seed", 42u64);
    let ticks = parse_arg(&args, "--ticks", 120u64);
    let period_ms = parse_arg(&args, "--period-ms", 2_000u64);
    let nodes = parse_arg(&args, "--nodes", 25usize);
    let realtime_secs = parse_arg(&args, "--realtime-secs", 0u64);
    let json = args.iter().any(|a| a == "--json");

    if !json {
        println!("CityPulse pulse-runner");
        println!("  seed:      {seed}");
        println!("  ticks:     {ticks}");
        println!("  period_ms: {period_ms}");
        println!("  nodes:     {nodes}");
        if realtime_secs > 0 {
            println!("  realtime:  {realtime_secs}s (wall clock)");
        }
        println!();
    }

    let config = EngineConfig {
        seed,
        tick_period_ms: period_ms,
        node_count: nodes,
        ..EngineConfig::default()
    };
    let engine = SimEngine::new(config)?;

    let (engine, snapshot) = if realtime_secs > 0 {
        run_realtime(engine, realtime_secs, json)?
    } else {
        run_batch(engine, ticks)
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print_summary(&engine, &snapshot);
    }

    Ok(())
}

/// Drive the engine synchronously for a fixed number of ticks.
fn run_batch(mut engine: SimEngine, ticks: u64) -> (SimEngine, EngineSnapshot) {
    let snapshot = engine.run_ticks(ticks);
    (engine, snapshot)
}

/// Run the scheduler against the wall clock for `secs`, then recover
/// the engine for the final report.
fn run_realtime(engine: SimEngine, secs: u64, json: bool) -> Result<(SimEngine, EngineSnapshot)> {
    let mut scheduler = EngineScheduler::new(engine);

    let published = Arc::new(AtomicU64::new(0));
    {
        let published = Arc::clone(&published);
        scheduler.on_tick(move |snapshot| {
            published.fetch_add(1, Ordering::Relaxed);
            log::info!(
                "published tick={} alerts={} incidents={}",
                snapshot.tick,
                snapshot.alerts.len(),
                snapshot.incidents.len()
            );
        });
    }

    scheduler.start()?;
    thread::sleep(Duration::from_secs(secs));
    let engine = scheduler.stop()?;

    if !json {
        println!(
            "  published {} snapshots over {secs}s",
            published.load(Ordering::Relaxed)
        );
        println!();
    }

    let snapshot = engine.snapshot();
    Ok((engine, snapshot))
}

fn print_summary(engine: &SimEngine, snapshot: &EngineSnapshot) {
    let topology = &snapshot.topology;
    let critical_alerts = snapshot
        .alerts
        .iter()
        .filter(|a| a.severity == citypulse_core::types::Severity::Critical)
        .count();

    println!("=== RUN SUMMARY ===");
    println!("  final tick:       {}", snapshot.tick);
    println!("  sim time:         {}", snapshot.generated_at);
    println!("  alerts emitted:   {}", engine.alerts_emitted());
    println!("  alerts retained:  {critical_alerts} critical of {}", snapshot.alerts.len());
    println!("  incidents:        {} emitted, {} retained", engine.incidents_emitted(), snapshot.incidents.len());
    println!("  topology:         {} nodes, {} edges", topology.nodes.len(), topology.edges.len());

    println!();
    println!("=== LATEST METRICS ===");
    let m = &snapshot.metrics;
    println!("  energy:        {:.1} MW", m.energy_consumption_mw);
    println!("  traffic:       {:.0}%", m.traffic_flow * 100.0);
    println!("  air quality:   {:.0} AQI", m.air_quality_index);
    println!("  infra health:  {:.0}%", m.infrastructure_health * 100.0);
    println!("  latency:       {:.1} ms", m.network_latency_ms);
    println!("  security:      {:.0}/100", m.security_score);
    println!("  satisfaction:  {:.0}%", m.citizen_satisfaction * 100.0);
    println!("  budget used:   {:.0}%", m.budget_utilization * 100.0);
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}
