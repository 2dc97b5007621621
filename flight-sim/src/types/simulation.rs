use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use logger::{Color, Logger};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use threadpool::ThreadPool;

use super::active_flight::FlightContext;
use super::airport::{catalog, AirportLookup};
use super::board::{FlightBoard, FlightStats, LoadSummary, TickReport};
use super::clock::{Clock, SystemClock};
use super::config::SimConfig;
use super::flight::FlightRecord;
use super::sim_error::SimError;
use super::sinks::{NotificationSink, NullNotifier, NullStore, SnapshotStore};
use super::timer::Timer;

/// Called on the timer thread after every scheduled tick.
pub type TickObserver = Box<dyn FnMut(&TickReport) + Send>;

struct EngineState {
    board: FlightBoard,
    rng: Box<dyn RngCore + Send>,
    ticks: usize,
}

struct Shared {
    state: Mutex<EngineState>,
    airports: Arc<dyn AirportLookup>,
    store: Arc<dyn SnapshotStore>,
    notifier: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
    logger: Logger,
    config: SimConfig,
    publisher: ThreadPool,
}

/// Manages the flight simulation: owns the flight board, runs the tick on a
/// timer and publishes every tick's outcome to the injected sinks.
///
/// All mutation of the board happens under one lock, so readers always see the
/// state either before or after a whole tick.
pub struct Simulation {
    shared: Arc<Shared>,
    timer: Timer,
}

/// Collects the collaborators of a [`Simulation`].
pub struct SimulationBuilder {
    airports: Arc<dyn AirportLookup>,
    store: Arc<dyn SnapshotStore>,
    notifier: Arc<dyn NotificationSink>,
    clock: Arc<dyn Clock>,
    rng: Option<Box<dyn RngCore + Send>>,
    logger: Logger,
    config: SimConfig,
}

impl SimulationBuilder {
    pub fn new(logger: Logger) -> Self {
        SimulationBuilder {
            airports: Arc::new(catalog()),
            store: Arc::new(NullStore),
            notifier: Arc::new(NullNotifier),
            clock: Arc::new(SystemClock),
            rng: None,
            logger,
            config: SimConfig::default(),
        }
    }

    pub fn airports(mut self, airports: Arc<dyn AirportLookup>) -> Self {
        self.airports = airports;
        self
    }

    pub fn snapshot_store(mut self, store: Arc<dyn SnapshotStore>) -> Self {
        self.store = store;
        self
    }

    pub fn notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn rng(mut self, rng: Box<dyn RngCore + Send>) -> Self {
        self.rng = Some(rng);
        self
    }

    /// Seeds the jitter source so runs are reproducible.
    pub fn seed(self, seed: u64) -> Self {
        self.rng(Box::new(StdRng::seed_from_u64(seed)))
    }

    pub fn config(mut self, config: SimConfig) -> Self {
        self.config = config;
        self
    }

    pub fn build(self) -> Simulation {
        let rng = self
            .rng
            .unwrap_or_else(|| Box::new(StdRng::from_entropy()));
        let publisher = ThreadPool::with_name("publisher".to_string(), 1);

        Simulation {
            shared: Arc::new(Shared {
                state: Mutex::new(EngineState {
                    board: FlightBoard::new(),
                    rng,
                    ticks: 0,
                }),
                airports: self.airports,
                store: self.store,
                notifier: self.notifier,
                clock: self.clock,
                logger: self.logger,
                config: self.config,
                publisher,
            }),
            timer: Timer::new(),
        }
    }
}

impl Shared {
    fn lock_state(&self) -> MutexGuard<'_, EngineState> {
        // A panic in a previous tick must not stop the simulation.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn load(&self, records: Vec<FlightRecord>) -> LoadSummary {
        let now = self.clock.now();
        let _ = self.logger.info(
            &format!("Loading {} flights into the simulator", records.len()),
            Color::Cyan,
        );

        let mut guard = self.lock_state();
        let state = &mut *guard;
        let mut ctx = FlightContext {
            airports: self.airports.as_ref(),
            rng: state.rng.as_mut(),
            logger: &self.logger,
            config: &self.config,
        };
        state.board.load(records, now, &mut ctx)
    }

    fn tick(&self) -> TickReport {
        self.clock.on_tick();
        self.advance(self.clock.now())
    }

    fn advance(&self, now: DateTime<Utc>) -> TickReport {
        let mut guard = self.lock_state();
        let state = &mut *guard;
        let mut ctx = FlightContext {
            airports: self.airports.as_ref(),
            rng: state.rng.as_mut(),
            logger: &self.logger,
            config: &self.config,
        };
        let report = state.board.advance(now, &mut ctx);

        state.ticks += 1;
        let every = self.config.status_report_every;
        if every > 0 && state.ticks % every == 0 {
            for line in state.board.status_report(now) {
                let _ = self.logger.info(&line, Color::White);
            }
        }

        // Queued under the board lock so the store receives ticks in order.
        self.publish(&report);
        report
    }

    /// Hands the snapshot and the tick's notifications to the publisher, a
    /// single worker that runs jobs in the order they were queued.
    fn publish(&self, report: &TickReport) {
        let store = Arc::clone(&self.store);
        let notifier = Arc::clone(&self.notifier);
        let logger = self.logger.clone();
        let snapshot = report.snapshot.clone();
        let notifications = report.notifications.clone();

        self.publisher.execute(move || {
            if let Err(e) = store.store(&snapshot) {
                let _ = logger.error(&format!(
                    "Could not mirror flights to the snapshot store: {}",
                    SimError::from(e)
                ));
            }
            for notification in &notifications {
                if let Err(e) = notifier.notify(notification) {
                    let _ = logger.warn(&format!(
                        "Could not publish notification '{}': {}",
                        notification.title,
                        SimError::from(e)
                    ));
                }
            }
        });
    }
}

impl Simulation {
    pub fn builder(logger: Logger) -> SimulationBuilder {
        SimulationBuilder::new(logger)
    }

    /// Classifies and stores `records`. Additive; call `clear` first for a reset.
    pub fn load_snapshot(&self, records: Vec<FlightRecord>) -> LoadSummary {
        self.shared.load(records)
    }

    /// Runs one tick at `now`: promote, advance, demote, publish.
    pub fn advance(&self, now: DateTime<Utc>) -> TickReport {
        self.shared.advance(now)
    }

    /// Runs one tick at the clock's time, exactly as the timer does.
    pub fn tick(&self) -> TickReport {
        self.shared.tick()
    }

    /// Starts ticking every `interval`. Calling it while running only logs a warning.
    pub fn start(&self, on_tick: Option<TickObserver>, interval: Duration) -> Result<(), SimError> {
        let shared = Arc::downgrade(&self.shared);
        let mut observer = on_tick;

        let started = self.timer.start(interval, move |_tick_count| {
            let Some(shared) = shared.upgrade() else {
                return;
            };
            let report = shared.tick();
            if let Some(observer) = observer.as_mut() {
                observer(&report);
            }
        });

        match started {
            Ok(()) => {
                let _ = self.shared.logger.info(
                    &format!(
                        "Simulator started (update every {:.1} seconds)",
                        interval.as_secs_f64()
                    ),
                    Color::Green,
                );
                Ok(())
            }
            Err(SimError::DoubleStart) => {
                let _ = self
                    .shared
                    .logger
                    .warn(&SimError::DoubleStart.to_string());
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Starts with the configured interval and no observer.
    pub fn start_default(&self) -> Result<(), SimError> {
        self.start(None, self.shared.config.tick_interval)
    }

    /// Cancels the scheduler. No tick runs after this returns.
    pub fn stop(&self) {
        if self.timer.stop() {
            let _ = self.shared.logger.info("Simulator stopped", Color::Yellow);
        }
    }

    pub fn pause(&self) {
        self.timer.pause();
    }

    pub fn resume(&self) {
        self.timer.resume();
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn is_paused(&self) -> bool {
        self.timer.is_paused()
    }

    /// Empties every collection, optionally stopping the scheduler first.
    pub fn clear(&self, stop_first: bool) {
        if stop_first {
            self.stop();
        }
        self.shared.lock_state().board.clear();
        let _ = self.shared.logger.info(
            if stop_first {
                "Simulator cleared and stopped"
            } else {
                "Simulator cleared (still running)"
            },
            Color::Yellow,
        );
    }

    /// Waits until every queued publication reached its sinks.
    pub fn flush(&self) {
        self.shared.publisher.join();
    }

    /// Stops the scheduler and drains pending publications.
    pub fn dispose(self) {
        drop(self);
    }

    pub fn list_all(&self) -> Vec<FlightRecord> {
        self.shared.lock_state().board.list_all()
    }

    pub fn list_active(&self) -> Vec<FlightRecord> {
        self.shared.lock_state().board.list_active()
    }

    pub fn list_scheduled(&self) -> Vec<FlightRecord> {
        self.shared.lock_state().board.list_scheduled()
    }

    pub fn list_landed(&self) -> Vec<FlightRecord> {
        self.shared.lock_state().board.list_landed()
    }

    pub fn find_by_identity(&self, id: &str) -> Option<FlightRecord> {
        self.shared.lock_state().board.find(id)
    }

    /// Progress in [0, 1] of an active flight.
    pub fn progress(&self, id: &str) -> Option<f64> {
        self.shared
            .lock_state()
            .board
            .active_flight(id)
            .map(|flight| flight.sim.progress)
    }

    pub fn stats(&self) -> FlightStats {
        let is_running = self.is_running();
        self.shared.lock_state().board.stats(is_running)
    }

    pub fn status_report(&self) -> Vec<String> {
        let now = self.shared.clock.now();
        self.shared.lock_state().board.status_report(now)
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.shared.clock.now()
    }

    pub fn logger(&self) -> &Logger {
        &self.shared.logger
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        self.timer.stop();
        self.shared.publisher.join();
    }
}
