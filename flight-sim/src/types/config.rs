use std::time::Duration;

use super::TICK_FREQUENCY_MILLIS;

/// Tunables of the simulation. `Default` gives the reference behavior.
#[derive(Debug, Clone, PartialEq)]
pub struct SimConfig {
    pub tick_interval: Duration,
    /// Feet.
    pub cruise_altitude: f64,
    pub ground_altitude: f64,
    pub min_cruise_altitude: f64,
    pub max_cruise_altitude: f64,
    /// km/h.
    pub default_speed: f64,
    pub takeoff_speed: f64,
    pub min_speed: f64,
    pub max_speed: f64,
    /// Synthesized routes are never shorter than this.
    pub min_fallback_separation_km: f64,
    /// Every how many ticks the status report is logged; 0 disables it.
    pub status_report_every: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            tick_interval: Duration::from_millis(TICK_FREQUENCY_MILLIS),
            cruise_altitude: 35_000.0,
            ground_altitude: 1_000.0,
            min_cruise_altitude: 30_000.0,
            max_cruise_altitude: 42_000.0,
            default_speed: 500.0,
            takeoff_speed: 250.0,
            min_speed: 400.0,
            max_speed: 600.0,
            min_fallback_separation_km: 500.0,
            status_report_every: 15,
        }
    }
}
