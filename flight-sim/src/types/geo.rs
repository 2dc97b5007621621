use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Coordinates { lat, lng }
    }

    /// Straight-line interpolation in degree space, `progress` in [0, 1].
    pub fn lerp(&self, destination: &Coordinates, progress: f64) -> Coordinates {
        Coordinates {
            lat: self.lat + (destination.lat - self.lat) * progress,
            lng: self.lng + (destination.lng - self.lng) * progress,
        }
    }

    /// Heading from `self` toward `destination`, in [0, 360).
    ///
    /// Computed on the flat lat/lng plane, matching the straight-line route
    /// the position is interpolated along.
    pub fn heading_to(&self, destination: &Coordinates) -> f64 {
        let delta_lat = destination.lat - self.lat;
        let delta_lng = destination.lng - self.lng;
        (delta_lng.atan2(delta_lat).to_degrees() + 360.0) % 360.0
    }

    /// Great-circle distance in kilometers.
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        haversine_distance(self.lat, self.lng, other.lat, other.lng)
    }
}

fn haversine_distance(origin_lat: f64, origin_lon: f64, dest_lat: f64, dest_lon: f64) -> f64 {
    let origin_lat_rad = origin_lat * PI / 180.0;
    let origin_lon_rad = origin_lon * PI / 180.0;
    let dest_lat_rad = dest_lat * PI / 180.0;
    let dest_lon_rad = dest_lon * PI / 180.0;

    let delta_lat = dest_lat_rad - origin_lat_rad;
    let delta_lon = dest_lon_rad - origin_lon_rad;

    let a = (delta_lat / 2.0).sin().powi(2)
        + origin_lat_rad.cos() * dest_lat_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAD: Coordinates = Coordinates {
        lat: 40.4719,
        lng: -3.5626,
    };
    const BCN: Coordinates = Coordinates {
        lat: 41.2974,
        lng: 2.0833,
    };

    #[test]
    fn test_lerp_endpoints_and_midpoint() {
        assert_eq!(MAD.lerp(&BCN, 0.0), MAD);
        let end = MAD.lerp(&BCN, 1.0);
        assert!((end.lat - BCN.lat).abs() < 1e-9);
        assert!((end.lng - BCN.lng).abs() < 1e-9);

        let mid = MAD.lerp(&BCN, 0.5);
        assert!((mid.lat - (MAD.lat + BCN.lat) / 2.0).abs() < 1e-9);
        assert!((mid.lng - (MAD.lng + BCN.lng) / 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_heading_cardinal_directions() {
        let origin = Coordinates::new(0.0, 0.0);
        assert!((origin.heading_to(&Coordinates::new(1.0, 0.0)) - 0.0).abs() < 1e-9);
        assert!((origin.heading_to(&Coordinates::new(0.0, 1.0)) - 90.0).abs() < 1e-9);
        assert!((origin.heading_to(&Coordinates::new(-1.0, 0.0)) - 180.0).abs() < 1e-9);
        assert!((origin.heading_to(&Coordinates::new(0.0, -1.0)) - 270.0).abs() < 1e-9);
    }

    #[test]
    fn test_heading_is_normalized() {
        let heading = BCN.heading_to(&MAD);
        assert!((0.0..360.0).contains(&heading));
        // Same point: atan2(0, 0) is 0.
        assert_eq!(MAD.heading_to(&MAD), 0.0);
    }

    #[test]
    fn test_distance_madrid_barcelona() {
        let distance = MAD.distance_km(&BCN);
        assert!(distance > 470.0 && distance < 500.0, "got {}", distance);
    }
}
