use chrono::{DateTime, Utc};
use logger::Logger;
use rand::{Rng, RngCore};

use super::airport::AirportLookup;
use super::config::SimConfig;
use super::flight::{format_instant, FlightRecord, Schedule, Telemetry};
use super::flight_status::FlightStatus;
use super::geo::Coordinates;
use super::sim_error::SimError;

/// Kilometers per degree of latitude.
const KM_PER_DEGREE: f64 = 111.19;

const CLIMB_END: f64 = 0.1;
const DESCENT_START: f64 = 0.9;
const VERTICAL_SPEED: f64 = 25.0;
const TAKEOFF_VERTICAL_SPEED: f64 = 30.0;

/// What the engine needs from its surroundings to put a flight in the air or
/// move it along.
pub struct FlightContext<'a> {
    pub airports: &'a dyn AirportLookup,
    pub rng: &'a mut dyn RngCore,
    pub logger: &'a Logger,
    pub config: &'a SimConfig,
}

/// How progress is seeded when a flight becomes active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// Loaded as already active; progress follows the clock.
    Resume,
    /// Promoted from scheduled on this tick; progress starts at zero.
    Departure,
}

/// Origin and destination actually used for interpolation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Route {
    pub origin: Coordinates,
    pub destination: Coordinates,
    pub synthesized: bool,
}

/// Engine-internal state kept next to an active record.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationState {
    pub origin: Coordinates,
    pub destination: Coordinates,
    pub current: Coordinates,
    pub speed_kmh: f64,
    pub altitude: f64,
    pub heading: f64,
    pub schedule: Schedule,
    pub progress: f64,
    pub last_update: DateTime<Utc>,
}

/// An active record together with its simulation state.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveFlight {
    pub record: FlightRecord,
    pub sim: SimulationState,
}

impl Route {
    /// Looks both airports up, synthesizing whatever is missing.
    pub fn resolve(record: &FlightRecord, ctx: &mut FlightContext) -> Route {
        let origin = ctx.airports.lookup(&record.departure.iata);
        let destination = ctx.airports.lookup(&record.arrival.iata);

        match (origin, destination) {
            (Some(origin), Some(destination)) => Route {
                origin,
                destination,
                synthesized: false,
            },
            (origin, destination) => {
                for (code, found) in [
                    (&record.departure.iata, origin.is_some()),
                    (&record.arrival.iata, destination.is_some()),
                ] {
                    if !found {
                        let _ = ctx.logger.warn(&format!(
                            "{}: {}, using a simulated route",
                            record.flight_number,
                            SimError::UnknownAirport(code.clone())
                        ));
                    }
                }
                synthesize(origin, destination, ctx)
            }
        }
    }
}

fn random_coordinates(rng: &mut dyn RngCore) -> Coordinates {
    Coordinates::new(rng.gen_range(-60.0..60.0), rng.gen_range(-180.0..180.0))
}

/// Moves `anchor` north or south, toward the equator, far enough to clear
/// `min_km`.
fn offset_from(anchor: &Coordinates, min_km: f64) -> Coordinates {
    let offset = (min_km / KM_PER_DEGREE).ceil() + 1.0;
    let lat = if anchor.lat >= 0.0 {
        anchor.lat - offset
    } else {
        anchor.lat + offset
    };
    Coordinates::new(lat, anchor.lng)
}

fn synthesize(
    origin: Option<Coordinates>,
    destination: Option<Coordinates>,
    ctx: &mut FlightContext,
) -> Route {
    let min_km = ctx.config.min_fallback_separation_km;
    let origin_found = origin.is_some();
    let destination_found = destination.is_some();

    let mut origin = origin.unwrap_or_else(|| random_coordinates(ctx.rng));
    let mut destination = destination.unwrap_or_else(|| random_coordinates(ctx.rng));

    if origin.distance_km(&destination) < min_km {
        if !destination_found {
            destination = offset_from(&origin, min_km);
        } else if !origin_found {
            origin = offset_from(&destination, min_km);
        }
    }

    Route {
        origin,
        destination,
        synthesized: true,
    }
}

/// Telemetry of an aircraft that has just left the ground at `origin`.
pub fn takeoff_telemetry(route: &Route, now: DateTime<Utc>, config: &SimConfig) -> Telemetry {
    Telemetry {
        latitude: route.origin.lat,
        longitude: route.origin.lng,
        altitude: config.ground_altitude,
        speed_horizontal: config.takeoff_speed,
        speed_vertical: TAKEOFF_VERTICAL_SPEED,
        direction: route.origin.heading_to(&route.destination),
        is_ground: false,
        updated: Some(now),
    }
}

impl ActiveFlight {
    /// Puts `record` in the air along `route`.
    pub fn activate(
        mut record: FlightRecord,
        route: Route,
        activation: Activation,
        now: DateTime<Utc>,
        ctx: &mut FlightContext,
    ) -> ActiveFlight {
        let schedule = record.schedule();

        let progress = match (activation, schedule.elapsed_fraction(now.timestamp_millis())) {
            (Activation::Departure, _) => 0.0,
            (Activation::Resume, Some(fraction)) => fraction.clamp(0.01, 0.99),
            (Activation::Resume, None) => 0.0,
        };
        if schedule.duration_ms().is_none() {
            let _ = ctx.logger.warn(&format!(
                "{}, holding position",
                SimError::MalformedSchedule(record.flight_number.clone())
            ));
        }

        let current = route.origin.lerp(&route.destination, progress);
        let heading = current.heading_to(&route.destination);

        let previous = record.live.take();
        let altitude = previous
            .as_ref()
            .map(|live| live.altitude)
            .filter(|altitude| *altitude > 0.0)
            .unwrap_or(ctx.config.cruise_altitude);
        let speed_kmh = previous
            .as_ref()
            .map(|live| live.speed_horizontal)
            .filter(|speed| *speed > 0.0)
            .unwrap_or(ctx.config.default_speed);
        let speed_vertical = previous.map(|live| live.speed_vertical).unwrap_or(0.0);

        record.live = Some(Telemetry {
            latitude: current.lat,
            longitude: current.lng,
            altitude,
            speed_horizontal: speed_kmh,
            speed_vertical,
            direction: heading,
            is_ground: false,
            updated: Some(now),
        });
        record.set_status(FlightStatus::Active);

        ActiveFlight {
            record,
            sim: SimulationState {
                origin: route.origin,
                destination: route.destination,
                current,
                speed_kmh,
                altitude,
                heading,
                schedule,
                progress,
                last_update: now,
            },
        }
    }

    /// Recomputes progress from absolute elapsed time and moves the aircraft.
    ///
    /// Returns `false`, leaving the flight untouched, when its schedule has no
    /// usable duration.
    pub fn advance(&mut self, now: DateTime<Utc>, ctx: &mut FlightContext) -> bool {
        let Some(fraction) = self.sim.schedule.elapsed_fraction(now.timestamp_millis()) else {
            return false;
        };
        let config = ctx.config;
        let sim = &mut self.sim;

        sim.progress = fraction.clamp(0.01, 1.0);
        sim.current = sim.origin.lerp(&sim.destination, sim.progress);
        sim.heading = sim.current.heading_to(&sim.destination);

        let span = config.cruise_altitude - config.ground_altitude;
        let speed_vertical = if sim.progress < CLIMB_END {
            sim.altitude = config.ground_altitude + span * sim.progress / CLIMB_END;
            VERTICAL_SPEED
        } else if sim.progress > DESCENT_START {
            sim.altitude = config.cruise_altitude
                - span * (sim.progress - DESCENT_START) / (1.0 - DESCENT_START);
            -VERTICAL_SPEED
        } else {
            sim.altitude += (ctx.rng.gen::<f64>() - 0.5) * 100.0;
            sim.altitude = sim
                .altitude
                .clamp(config.min_cruise_altitude, config.max_cruise_altitude);
            (ctx.rng.gen::<f64>() - 0.5) * 5.0
        };

        sim.speed_kmh += (ctx.rng.gen::<f64>() - 0.5) * 10.0;
        sim.speed_kmh = sim.speed_kmh.clamp(config.min_speed, config.max_speed);
        sim.last_update = now;

        if let Some(live) = self.record.live.as_mut() {
            live.latitude = sim.current.lat;
            live.longitude = sim.current.lng;
            live.direction = sim.heading;
            live.altitude = sim.altitude;
            live.speed_horizontal = sim.speed_kmh;
            live.speed_vertical = speed_vertical;
            live.updated = Some(now);
        }
        true
    }

    /// Reached the destination, or overdue and nearly there.
    pub fn should_land(&self, now: DateTime<Utc>) -> bool {
        let overdue = self
            .sim
            .schedule
            .arrival_ms
            .is_some_and(|arrival| now.timestamp_millis() >= arrival);
        self.sim.progress >= 1.0 || (overdue && self.sim.progress >= 0.95)
    }

    /// Turns the flight into a landed record.
    pub fn land(self, now: DateTime<Utc>) -> FlightRecord {
        let mut record = self.record;
        record.live = None;
        record.set_status(FlightStatus::Landed);
        record.arrival.actual = Some(format_instant(now));
        record
    }

    pub fn minutes_to_arrival(&self, now: DateTime<Utc>) -> Option<i64> {
        self.sim
            .schedule
            .arrival_ms
            .map(|arrival| ((arrival - now.timestamp_millis()) as f64 / 60_000.0).round() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::airport::catalog;
    use chrono::{Duration, TimeZone};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
    }

    fn madrid_barcelona() -> FlightRecord {
        FlightRecord::scheduled("AB100", "MAD", "BCN", t0(), t0() + Duration::hours(2))
    }

    struct Fixture {
        airports: HashMap<String, crate::types::airport::Airport>,
        rng: StdRng,
        logger: Logger,
        config: SimConfig,
    }

    impl Fixture {
        fn new() -> Self {
            Fixture {
                airports: catalog(),
                rng: StdRng::seed_from_u64(7),
                logger: Logger::in_memory(false),
                config: SimConfig::default(),
            }
        }

        fn ctx(&mut self) -> FlightContext<'_> {
            FlightContext {
                airports: &self.airports,
                rng: &mut self.rng,
                logger: &self.logger,
                config: &self.config,
            }
        }
    }

    #[test]
    fn test_departure_starts_at_origin() {
        let mut fixture = Fixture::new();
        let mut ctx = fixture.ctx();
        let record = madrid_barcelona();
        let route = Route::resolve(&record, &mut ctx);
        assert!(!route.synthesized);

        let flight = ActiveFlight::activate(record, route, Activation::Departure, t0(), &mut ctx);
        assert_eq!(flight.sim.progress, 0.0);
        assert_eq!(flight.sim.current, route.origin);
        assert_eq!(flight.record.status, FlightStatus::Active);
        assert_eq!(flight.record.flight_status_label.as_deref(), Some("In Flight"));
        let live = flight.record.live.as_ref().unwrap();
        assert_eq!(live.altitude, 35_000.0);
        assert_eq!(live.speed_horizontal, 500.0);
    }

    #[test]
    fn test_resume_seeds_progress_from_clock() {
        let mut fixture = Fixture::new();
        let mut ctx = fixture.ctx();
        let record = madrid_barcelona();
        let route = Route::resolve(&record, &mut ctx);

        let halfway = t0() + Duration::hours(1);
        let flight = ActiveFlight::activate(record.clone(), route, Activation::Resume, halfway, &mut ctx);
        assert!((flight.sim.progress - 0.5).abs() < 1e-9);

        let early = ActiveFlight::activate(record.clone(), route, Activation::Resume, t0(), &mut ctx);
        assert_eq!(early.sim.progress, 0.01);

        let late = ActiveFlight::activate(
            record,
            route,
            Activation::Resume,
            t0() + Duration::hours(5),
            &mut ctx,
        );
        assert_eq!(late.sim.progress, 0.99);
    }

    #[test]
    fn test_resume_keeps_source_telemetry() {
        let mut fixture = Fixture::new();
        let mut ctx = fixture.ctx();
        let mut record = madrid_barcelona();
        record.live = Some(Telemetry {
            latitude: 0.0,
            longitude: 0.0,
            altitude: 31_000.0,
            speed_horizontal: 455.0,
            speed_vertical: 0.0,
            direction: 0.0,
            is_ground: false,
            updated: None,
        });
        let route = Route::resolve(&record, &mut ctx);
        let flight = ActiveFlight::activate(
            record,
            route,
            Activation::Resume,
            t0() + Duration::hours(1),
            &mut ctx,
        );
        assert_eq!(flight.sim.altitude, 31_000.0);
        assert_eq!(flight.sim.speed_kmh, 455.0);
        // Position comes from the route, not from the stale payload.
        let live = flight.record.live.unwrap();
        assert!((live.latitude - flight.sim.current.lat).abs() < 1e-12);
    }

    #[test]
    fn test_unknown_airports_are_synthesized_apart() {
        let mut fixture = Fixture::new();
        for seed in 0..200 {
            fixture.rng = StdRng::seed_from_u64(seed);
            let mut ctx = fixture.ctx();
            let record =
                FlightRecord::scheduled("ZZ1", "QQQ", "WWW", t0(), t0() + Duration::hours(2));
            let route = Route::resolve(&record, &mut ctx);
            assert!(route.synthesized);
            assert!(route.origin.distance_km(&route.destination) >= 500.0);
        }
        let lines = fixture.logger.lines().unwrap();
        assert!(lines.iter().any(|l| l.contains("Airport not found: QQQ")));
        assert!(lines.iter().any(|l| l.contains("Airport not found: WWW")));
    }

    #[test]
    fn test_offset_clears_min_separation() {
        for anchor in [
            Coordinates::new(40.4719, -3.5626),
            Coordinates::new(-33.9399, 151.1753),
            Coordinates::new(0.0, 0.0),
        ] {
            let moved = offset_from(&anchor, 500.0);
            assert!(anchor.distance_km(&moved) >= 500.0);
        }
    }

    #[test]
    fn test_one_known_airport_is_kept() {
        let mut fixture = Fixture::new();
        let mut ctx = fixture.ctx();
        let record = FlightRecord::scheduled("ZZ2", "MAD", "QQQ", t0(), t0() + Duration::hours(2));
        let route = Route::resolve(&record, &mut ctx);
        assert_eq!(route.origin, Coordinates::new(40.4719, -3.5626));
        assert!(route.origin.distance_km(&route.destination) >= 500.0);
    }

    #[test]
    fn test_advance_follows_three_phase_profile() {
        let mut fixture = Fixture::new();
        let mut ctx = fixture.ctx();
        let record = madrid_barcelona();
        let route = Route::resolve(&record, &mut ctx);
        let mut flight = ActiveFlight::activate(record, route, Activation::Departure, t0(), &mut ctx);

        // 6 minutes into 2 hours: 5%, climbing.
        assert!(flight.advance(t0() + Duration::minutes(6), &mut ctx));
        assert!((flight.sim.progress - 0.05).abs() < 1e-9);
        assert!((flight.sim.altitude - 18_000.0).abs() < 1e-6);
        assert_eq!(flight.record.live.as_ref().unwrap().speed_vertical, 25.0);

        assert!(flight.advance(t0() + Duration::hours(1), &mut ctx));
        assert!(flight.sim.altitude >= 30_000.0 && flight.sim.altitude <= 42_000.0);

        // 114 minutes: 95%, descending halfway down.
        assert!(flight.advance(t0() + Duration::minutes(114), &mut ctx));
        assert!((flight.sim.altitude - 18_000.0).abs() < 1e-6);
        assert_eq!(flight.record.live.as_ref().unwrap().speed_vertical, -25.0);

        assert!(flight.sim.speed_kmh >= 400.0 && flight.sim.speed_kmh <= 600.0);
    }

    #[test]
    fn test_advance_interpolates_from_route_not_last_position() {
        let mut fixture = Fixture::new();
        let mut ctx = fixture.ctx();
        let record = madrid_barcelona();
        let route = Route::resolve(&record, &mut ctx);
        let mut flight = ActiveFlight::activate(record, route, Activation::Departure, t0(), &mut ctx);

        flight.sim.current = Coordinates::new(0.0, 0.0);
        flight.advance(t0() + Duration::hours(1), &mut ctx);
        let expected = route.origin.lerp(&route.destination, 0.5);
        assert!((flight.sim.current.lat - expected.lat).abs() < 1e-9);
        assert!((flight.sim.current.lng - expected.lng).abs() < 1e-9);
        assert!((flight.sim.heading - expected.heading_to(&route.destination)).abs() < 1e-9);
    }

    #[test]
    fn test_malformed_schedule_is_held() {
        let mut fixture = Fixture::new();
        let mut ctx = fixture.ctx();
        let mut record = madrid_barcelona();
        record.arrival.scheduled = None;
        let route = Route::resolve(&record, &mut ctx);
        let mut flight = ActiveFlight::activate(record, route, Activation::Resume, t0(), &mut ctx);
        let before = flight.clone();

        assert!(!flight.advance(t0() + Duration::hours(1), &mut ctx));
        assert_eq!(flight, before);
        assert!(!flight.should_land(t0() + Duration::hours(10)));
        assert!(fixture
            .logger
            .lines()
            .unwrap()
            .iter()
            .any(|l| l.contains("Malformed schedule for flight AB100")));
    }

    #[test]
    fn test_should_land_rules() {
        let mut fixture = Fixture::new();
        let mut ctx = fixture.ctx();
        let record = madrid_barcelona();
        let arrival = t0() + Duration::hours(2);
        let route = Route::resolve(&record, &mut ctx);
        let mut flight = ActiveFlight::activate(record, route, Activation::Departure, t0(), &mut ctx);

        flight.sim.progress = 0.96;
        assert!(!flight.should_land(arrival - Duration::seconds(1)));
        assert!(flight.should_land(arrival));

        flight.sim.progress = 0.9;
        assert!(!flight.should_land(arrival + Duration::minutes(5)));

        flight.sim.progress = 1.0;
        assert!(flight.should_land(t0()));
    }

    #[test]
    fn test_land_clears_telemetry() {
        let mut fixture = Fixture::new();
        let mut ctx = fixture.ctx();
        let record = madrid_barcelona();
        let route = Route::resolve(&record, &mut ctx);
        let flight = ActiveFlight::activate(record, route, Activation::Departure, t0(), &mut ctx);

        let arrival = t0() + Duration::hours(2);
        let landed = flight.land(arrival);
        assert_eq!(landed.status, FlightStatus::Landed);
        assert!(landed.live.is_none());
        assert_eq!(landed.arrival.actual, Some(format_instant(arrival)));
    }

    #[test]
    fn test_takeoff_telemetry_is_at_origin() {
        let config = SimConfig::default();
        let route = Route {
            origin: Coordinates::new(40.4719, -3.5626),
            destination: Coordinates::new(41.2974, 2.0833),
            synthesized: false,
        };
        let live = takeoff_telemetry(&route, t0(), &config);
        assert_eq!(live.latitude, 40.4719);
        assert_eq!(live.altitude, 1_000.0);
        assert_eq!(live.speed_horizontal, 250.0);
        assert!(live.direction > 0.0 && live.direction < 90.0);
    }
}
