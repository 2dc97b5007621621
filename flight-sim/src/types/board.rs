use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use logger::Color;

use super::active_flight::{takeoff_telemetry, Activation, ActiveFlight, FlightContext, Route};
use super::flight::FlightRecord;
use super::flight_status::FlightStatus;
use super::sinks::{FlightSnapshot, Notification};

/// The collections of flight records, one per lifecycle state.
///
/// A given identity lives in exactly one of them. Maps are ordered so that a
/// seeded random source yields the same trajectories on every run.
#[derive(Debug, Default, Clone)]
pub struct FlightBoard {
    scheduled: BTreeMap<String, FlightRecord>,
    active: BTreeMap<String, ActiveFlight>,
    landed: BTreeMap<String, FlightRecord>,
    cancelled: BTreeMap<String, FlightRecord>,
}

/// Everything a single tick produced, ready to be published.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub now: DateTime<Utc>,
    pub departed: Vec<String>,
    pub landed: Vec<String>,
    /// Active flights left in place because their schedule is unusable.
    pub held: Vec<String>,
    pub notifications: Vec<Notification>,
    pub snapshot: FlightSnapshot,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub scheduled: usize,
    pub active: usize,
    pub landed: usize,
    pub cancelled: usize,
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightStats {
    pub total_flights: usize,
    pub active_flights: usize,
    pub scheduled_flights: usize,
    pub landed_flights: usize,
    pub cancelled_flights: usize,
    pub is_running: bool,
    /// km/h, rounded; 0 with no active flights.
    pub avg_speed: f64,
    /// Feet, rounded; 0 with no active flights.
    pub avg_altitude: f64,
}

impl FlightBoard {
    pub fn new() -> Self {
        FlightBoard::default()
    }

    /// Classifies `records` by their declared state. Additive: an identity
    /// that is already known is replaced wherever it lives.
    pub fn load(
        &mut self,
        records: Vec<FlightRecord>,
        now: DateTime<Utc>,
        ctx: &mut FlightContext,
    ) -> LoadSummary {
        let mut summary = LoadSummary::default();

        for mut record in records {
            let Some(id) = record.identity().map(str::to_string) else {
                let _ = ctx
                    .logger
                    .warn("Skipping a flight record without id or flight number");
                summary.skipped += 1;
                continue;
            };
            self.remove(&id);

            match record.status {
                FlightStatus::Scheduled => {
                    record.live = None;
                    self.scheduled.insert(id, record);
                    summary.scheduled += 1;
                }
                FlightStatus::Landed => {
                    record.live = None;
                    self.landed.insert(id, record);
                    summary.landed += 1;
                }
                FlightStatus::Cancelled => {
                    record.live = None;
                    self.cancelled.insert(id, record);
                    summary.cancelled += 1;
                }
                FlightStatus::Active => {
                    let route = Route::resolve(&record, ctx);
                    let flight =
                        ActiveFlight::activate(record, route, Activation::Resume, now, ctx);
                    let _ = ctx.logger.info(
                        &format!(
                            "{}: {} -> {} | progress {:.0}%",
                            id,
                            flight.record.departure.iata,
                            flight.record.arrival.iata,
                            flight.sim.progress * 100.0
                        ),
                        Color::Cyan,
                    );
                    self.active.insert(id, flight);
                    summary.active += 1;
                }
            }
        }

        let _ = ctx.logger.info(
            &format!(
                "Loaded snapshot: {} active, {} scheduled, {} landed, {} cancelled, {} skipped",
                summary.active,
                summary.scheduled,
                summary.landed,
                summary.cancelled,
                summary.skipped
            ),
            Color::Green,
        );
        summary
    }

    /// Runs one tick: promote, advance, demote, then build the snapshot.
    pub fn advance(&mut self, now: DateTime<Utc>, ctx: &mut FlightContext) -> TickReport {
        let now_ms = now.timestamp_millis();
        let mut notifications = Vec::new();

        let departing: Vec<String> = self
            .scheduled
            .iter()
            .filter(|(_, record)| {
                record
                    .schedule()
                    .departure_ms
                    .is_some_and(|departure| departure <= now_ms)
            })
            .map(|(id, _)| id.clone())
            .collect();

        for id in &departing {
            let Some(mut record) = self.scheduled.remove(id) else {
                continue;
            };
            let route = Route::resolve(&record, ctx);
            record.live = Some(takeoff_telemetry(&route, now, ctx.config));
            record.set_status(FlightStatus::Active);

            let flight = ActiveFlight::activate(record, route, Activation::Departure, now, ctx);
            let _ = ctx.logger.info(
                &format!(
                    "{}: departing now ({} -> {})",
                    id, flight.record.departure.iata, flight.record.arrival.iata
                ),
                Color::Blue,
            );
            notifications.push(Notification::departed(&flight.record));
            self.active.insert(id.clone(), flight);
        }

        let mut held = Vec::new();
        for (id, flight) in self.active.iter_mut() {
            if !flight.advance(now, ctx) {
                held.push(id.clone());
            }
        }

        let arriving: Vec<String> = self
            .active
            .iter()
            .filter(|(_, flight)| flight.should_land(now))
            .map(|(id, _)| id.clone())
            .collect();

        for id in &arriving {
            let Some(flight) = self.active.remove(id) else {
                continue;
            };
            let record = flight.land(now);
            let _ = ctx.logger.info(
                &format!("{}: landed at {}", id, record.arrival.iata),
                Color::Green,
            );
            notifications.push(Notification::landed(&record));
            self.landed.insert(id.clone(), record);
        }

        TickReport {
            now,
            departed: departing,
            landed: arriving,
            held,
            notifications,
            snapshot: FlightSnapshot {
                data: self.list_all(),
            },
        }
    }

    /// Active, then scheduled, then landed, then cancelled records.
    pub fn list_all(&self) -> Vec<FlightRecord> {
        self.active
            .values()
            .map(|flight| flight.record.clone())
            .chain(self.scheduled.values().cloned())
            .chain(self.landed.values().cloned())
            .chain(self.cancelled.values().cloned())
            .collect()
    }

    pub fn list_active(&self) -> Vec<FlightRecord> {
        self.active
            .values()
            .map(|flight| flight.record.clone())
            .collect()
    }

    pub fn list_scheduled(&self) -> Vec<FlightRecord> {
        self.scheduled.values().cloned().collect()
    }

    pub fn list_landed(&self) -> Vec<FlightRecord> {
        self.landed.values().cloned().collect()
    }

    pub fn find(&self, id: &str) -> Option<FlightRecord> {
        self.active
            .get(id)
            .map(|flight| flight.record.clone())
            .or_else(|| self.scheduled.get(id).cloned())
            .or_else(|| self.landed.get(id).cloned())
            .or_else(|| self.cancelled.get(id).cloned())
    }

    pub fn active_flight(&self, id: &str) -> Option<&ActiveFlight> {
        self.active.get(id)
    }

    pub fn active_flights(&self) -> impl Iterator<Item = (&String, &ActiveFlight)> {
        self.active.iter()
    }

    pub fn stats(&self, is_running: bool) -> FlightStats {
        let active = self.active.len();
        let mean = |value: fn(&ActiveFlight) -> f64| {
            if active == 0 {
                0.0
            } else {
                (self.active.values().map(value).sum::<f64>() / active as f64).round()
            }
        };

        FlightStats {
            total_flights: active + self.scheduled.len() + self.landed.len() + self.cancelled.len(),
            active_flights: active,
            scheduled_flights: self.scheduled.len(),
            landed_flights: self.landed.len(),
            cancelled_flights: self.cancelled.len(),
            is_running,
            avg_speed: mean(|flight| flight.sim.speed_kmh),
            avg_altitude: mean(|flight| flight.sim.altitude),
        }
    }

    /// One line with the counts, then one per active flight.
    pub fn status_report(&self, now: DateTime<Utc>) -> Vec<String> {
        let mut lines = vec![format!(
            "Simulator [{}]: {} active | {} scheduled | {} landed",
            now.format("%H:%M:%S"),
            self.active.len(),
            self.scheduled.len(),
            self.landed.len()
        )];
        for (id, flight) in &self.active {
            let arrival = match flight.minutes_to_arrival(now) {
                Some(minutes) => format!("arrives in {}min", minutes),
                None => "arrival unknown".to_string(),
            };
            lines.push(format!(
                "  {}: {:.1}% | {}",
                id,
                flight.sim.progress * 100.0,
                arrival
            ));
        }
        lines
    }

    pub fn is_empty(&self) -> bool {
        self.scheduled.is_empty()
            && self.active.is_empty()
            && self.landed.is_empty()
            && self.cancelled.is_empty()
    }

    pub fn clear(&mut self) {
        self.scheduled.clear();
        self.active.clear();
        self.landed.clear();
        self.cancelled.clear();
    }

    fn remove(&mut self, id: &str) {
        self.scheduled.remove(id);
        self.active.remove(id);
        self.landed.remove(id);
        self.cancelled.remove(id);
    }
}
