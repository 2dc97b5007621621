use std::sync::{Mutex, RwLock};

use chrono::{DateTime, Duration, Utc};

use super::sim_error::SimError;

/// Source of "now" for the engine.
///
/// The timer calls [`Clock::on_tick`] once before every tick, which lets a
/// simulated clock move forward at its own rate.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn on_tick(&self) {}
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    current_time: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start_time: DateTime<Utc>) -> Self {
        ManualClock {
            current_time: Mutex::new(start_time),
        }
    }

    pub fn set(&self, time: DateTime<Utc>) {
        if let Ok(mut current) = self.current_time.lock() {
            *current = time;
        }
    }

    pub fn advance(&self, by: Duration) {
        if let Ok(mut current) = self.current_time.lock() {
            *current += by;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        match self.current_time.lock() {
            Ok(current) => *current,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

/// Simulated time that advances a fixed number of minutes per tick.
#[derive(Debug)]
pub struct SteppedClock {
    current_time: Mutex<DateTime<Utc>>,
    tick_advance: RwLock<Duration>,
}

impl SteppedClock {
    pub fn new(start_time: DateTime<Utc>, tick_advance_minutes: i64) -> Result<Self, SimError> {
        validate_minutes(tick_advance_minutes)?;
        Ok(SteppedClock {
            current_time: Mutex::new(start_time),
            tick_advance: RwLock::new(Duration::minutes(tick_advance_minutes)),
        })
    }

    /// Changes the value of time advanced per tick
    pub fn set_tick_advance(&self, new_tick_advance_minutes: i64) -> Result<(), SimError> {
        validate_minutes(new_tick_advance_minutes)?;

        let mut tick_advance_lock = self.tick_advance.write().map_err(|_| {
            SimError::Lock("Failed to acquire write lock for tick_advance.".to_string())
        })?;
        *tick_advance_lock = Duration::minutes(new_tick_advance_minutes);
        Ok(())
    }

    pub fn tick_advance(&self) -> Duration {
        self.tick_advance
            .read()
            .map(|advance| *advance)
            .unwrap_or_else(|poisoned| *poisoned.into_inner())
    }
}

impl Clock for SteppedClock {
    fn now(&self) -> DateTime<Utc> {
        match self.current_time.lock() {
            Ok(current) => *current,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }

    fn on_tick(&self) {
        let advance = self.tick_advance();
        if let Ok(mut current) = self.current_time.lock() {
            *current += advance;
        }
    }
}

fn validate_minutes(minutes: i64) -> Result<(), SimError> {
    if minutes <= 0 || minutes > 10000 {
        return Err(SimError::InvalidDuration(minutes.to_string()));
    }
    Ok(())
}
