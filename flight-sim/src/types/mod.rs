/// Reference cadence of the simulation tick.
pub const TICK_FREQUENCY_MILLIS: u64 = 2000;

pub mod active_flight;

pub mod airport;

pub mod board;

pub mod clock;

pub mod config;

pub mod flight;

pub mod flight_status;

pub mod geo;

pub mod sim_error;

pub mod simulation;

pub mod sinks;

pub mod timer;
