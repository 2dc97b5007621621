use serde::{Deserialize, Serialize};

use super::sim_error::SimError;

/// Represents the lifecycle state a flight record can be in.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlightStatus {
    Scheduled,
    Active,
    Landed,
    #[serde(alias = "canceled")]
    Cancelled,
}

impl FlightStatus {
    /// Converts the `FlightStatus` variant to its wire representation.
    pub fn as_str(&self) -> &str {
        match self {
            FlightStatus::Scheduled => "scheduled",
            FlightStatus::Active => "active",
            FlightStatus::Landed => "landed",
            FlightStatus::Cancelled => "cancelled",
        }
    }

    /// Human readable label shown next to the flight.
    pub fn label(&self) -> &str {
        match self {
            FlightStatus::Scheduled => "Scheduled",
            FlightStatus::Active => "In Flight",
            FlightStatus::Landed => "Landed",
            FlightStatus::Cancelled => "Cancelled",
        }
    }

    /// Creates a `FlightStatus` variant from a string slice.
    pub fn from_str(status: &str) -> Result<FlightStatus, SimError> {
        match status.trim().to_lowercase().as_str() {
            "scheduled" => Ok(FlightStatus::Scheduled),
            "active" | "en-route" => Ok(FlightStatus::Active),
            "landed" => Ok(FlightStatus::Landed),
            "cancelled" | "canceled" => Ok(FlightStatus::Cancelled),
            other => Err(SimError::InvalidStatus(other.to_string())),
        }
    }
}
