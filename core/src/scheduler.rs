//! Wall-clock scheduler — drives the engine on a dedicated thread.
//!
//! The scheduler owns the SimEngine exclusively while running (moved
//! into the thread via `spawn`). Each loop iteration runs one tick,
//! publishes the snapshot (latest-wins slot plus subscriber callbacks),
//! then sleeps out the remaining tick budget in short slices so `stop`
//! is honored promptly even under long tick periods.
//!
//! `stop` never interrupts a tick in progress: the flag is checked at
//! the loop boundary, the in-flight tick completes and publishes, and
//! the engine is recovered through the thread's join handle.

use crate::engine::SimEngine;
use crate::error::{EngineError, SimResult};
use crate::snapshot::EngineSnapshot;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Longest single sleep while waiting out a tick budget. `stop` is
/// observed within roughly this bound once the current tick finishes.
const SLEEP_SLICE: Duration = Duration::from_millis(25);

/// Fired once per completed tick, on the scheduler thread. Keep these
/// brief — a slow callback delays the next tick.
pub type TickCallback = Box<dyn Fn(&EngineSnapshot) + Send + 'static>;

pub struct EngineScheduler {
    engine:      Option<SimEngine>,
    handle:      Option<JoinHandle<SimEngine>>,
    shutdown:    Arc<AtomicBool>,
    latest:      Arc<Mutex<Option<Arc<EngineSnapshot>>>>,
    subscribers: Arc<Mutex<Vec<TickCallback>>>,
    tick_period: Duration,
}

impl EngineScheduler {
    pub fn new(engine: SimEngine) -> Self {
        let tick_period = Duration::from_millis(engine.config().tick_period_ms);
        Self {
            engine: Some(engine),
            handle: None,
            shutdown: Arc::new(AtomicBool::new(false)),
            latest: Arc::new(Mutex::new(None)),
            subscribers: Arc::new(Mutex::new(Vec::new())),
            tick_period,
        }
    }

    /// Register a per-tick callback. Accepted before or after `start`.
    pub fn on_tick(&self, callback: impl Fn(&EngineSnapshot) + Send + 'static) {
        self.subscribers.lock().unwrap().push(Box::new(callback));
    }

    /// Spawn the tick thread. Errors if already running, or if the
    /// engine was recovered by a previous `stop`.
    pub fn start(&mut self) -> SimResult<()> {
        if self.handle.is_some() {
            return Err(EngineError::AlreadyRunning);
        }
        let engine = self.engine.take().ok_or(EngineError::SchedulerLost)?;

        self.shutdown.store(false, Ordering::Release);
        let tick_loop = TickLoop {
            engine,
            shutdown: Arc::clone(&self.shutdown),
            latest: Arc::clone(&self.latest),
            subscribers: Arc::clone(&self.subscribers),
            period: self.tick_period,
        };
        let handle = thread::Builder::new()
            .name("citypulse-tick".into())
            .spawn(move || tick_loop.run())
            .expect("failed to spawn tick thread");
        self.handle = Some(handle);

        log::info!("scheduler started: period={:?}", self.tick_period);
        Ok(())
    }

    /// Signal shutdown, join the tick thread, and return the engine so
    /// the caller can inspect final state or restart with it. The
    /// in-flight tick, if any, completes and publishes first.
    pub fn stop(&mut self) -> SimResult<SimEngine> {
        let handle = self.handle.take().ok_or(EngineError::NotRunning)?;
        self.shutdown.store(true, Ordering::Release);
        let engine = handle.join().map_err(|_| EngineError::SchedulerLost)?;
        log::info!("scheduler stopped at tick {}", engine.current_tick());
        Ok(engine)
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// The most recently published snapshot, if any tick has completed.
    /// Latest-wins: slow readers simply see the newest snapshot at read
    /// time, never a backlog.
    pub fn latest(&self) -> Option<Arc<EngineSnapshot>> {
        self.latest.lock().unwrap().clone()
    }
}

/// State moved onto the scheduler thread.
struct TickLoop {
    engine:      SimEngine,
    shutdown:    Arc<AtomicBool>,
    latest:      Arc<Mutex<Option<Arc<EngineSnapshot>>>>,
    subscribers: Arc<Mutex<Vec<TickCallback>>>,
    period:      Duration,
}

impl TickLoop {
    /// Main loop. Runs until the shutdown flag is set. Consumes self
    /// and returns the engine so the caller can recover it through the
    /// join handle.
    fn run(mut self) -> SimEngine {
        loop {
            if self.shutdown.load(Ordering::Acquire) {
                break;
            }
            let tick_start = Instant::now();

            let snapshot = Arc::new(self.engine.tick());
            *self.latest.lock().unwrap() = Some(Arc::clone(&snapshot));
            for callback in self.subscribers.lock().unwrap().iter() {
                callback(&snapshot);
            }

            self.sleep_remaining(tick_start);
        }
        self.engine
    }

    /// Sleep out the rest of the tick budget in slices, re-checking the
    /// shutdown flag between slices.
    fn sleep_remaining(&self, tick_start: Instant) {
        let Some(mut remaining) = self.period.checked_sub(tick_start.elapsed()) else {
            return;
        };
        while !remaining.is_zero() && !self.shutdown.load(Ordering::Acquire) {
            let slice = remaining.min(SLEEP_SLICE);
            thread::sleep(slice);
            remaining = remaining.saturating_sub(slice);
        }
    }
}
