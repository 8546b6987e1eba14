//! Great-circle distance between campus coordinates.

use crate::error::{CoreError, CoreResult};
use crate::models::BuildingState;

/// Mean Earth radius used by the Haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Average walking speed used for walk-time estimates.
pub const WALKING_SPEED_KMH: f64 = 5.0;

fn check_coordinate(lat: f64, lon: f64) -> CoreResult<()> {
    let lat_ok = lat.is_finite() && (-90.0..=90.0).contains(&lat);
    let lon_ok = lon.is_finite() && (-180.0..=180.0).contains(&lon);
    if lat_ok && lon_ok {
        Ok(())
    } else {
        Err(CoreError::InvalidCoordinate { lat, lon })
    }
}

/// Validate the coordinates of a snapshot building.
pub fn check_building(building: &BuildingState) -> CoreResult<()> {
    check_coordinate(building.lat, building.lon)
}

/// Haversine distance in kilometers between two latitude/longitude pairs.
///
/// Symmetric in its two points and zero for identical points. Fails with
/// [`CoreError::InvalidCoordinate`] when either point is out of range.
pub fn distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> CoreResult<f64> {
    check_coordinate(lat1, lon1)?;
    check_coordinate(lat2, lon2)?;

    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    // Swapping the points only negates dlat/dlon, so the result is bit-identical.
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().min(1.0).asin();

    Ok(EARTH_RADIUS_KM * c)
}

/// Distance between two buildings.
pub fn building_distance(a: &BuildingState, b: &BuildingState) -> CoreResult<f64> {
    distance(a.lat, a.lon, b.lat, b.lon)
}

/// Walking time in whole minutes at [`WALKING_SPEED_KMH`].
pub fn walk_time_minutes(distance_km: f64) -> u32 {
    (distance_km / WALKING_SPEED_KMH * 60.0).round().max(0.0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_distance_same_point_is_zero() {
        assert_eq!(distance(49.2606, -123.2460, 49.2606, -123.2460).unwrap(), 0.0);
    }

    #[test]
    fn test_distance_known_value() {
        // One degree of latitude along a meridian.
        let d = distance(0.0, 0.0, 1.0, 0.0).unwrap();
        assert!((d - 111.195).abs() < 0.01, "got {}", d);
    }

    #[test]
    fn test_distance_rejects_out_of_range() {
        assert!(matches!(
            distance(91.0, 0.0, 0.0, 0.0),
            Err(CoreError::InvalidCoordinate { .. })
        ));
        assert!(matches!(
            distance(0.0, 0.0, 0.0, -180.5),
            Err(CoreError::InvalidCoordinate { .. })
        ));
        assert!(distance(f64::NAN, 0.0, 0.0, 0.0).is_err());
    }

    #[test]
    fn test_distance_accepts_bounds() {
        assert!(distance(-90.0, -180.0, 90.0, 180.0).is_ok());
    }

    #[test]
    fn test_walk_time_minutes() {
        assert_eq!(walk_time_minutes(0.0), 0);
        assert_eq!(walk_time_minutes(0.8), 10);
        assert_eq!(walk_time_minutes(1.2), 14);
        assert_eq!(walk_time_minutes(0.05), 1);
    }

    proptest! {
        #[test]
        fn prop_distance_is_symmetric(
            lat1 in -90.0f64..=90.0, lon1 in -180.0f64..=180.0,
            lat2 in -90.0f64..=90.0, lon2 in -180.0f64..=180.0,
        ) {
            let ab = distance(lat1, lon1, lat2, lon2).unwrap();
            let ba = distance(lat2, lon2, lat1, lon1).unwrap();
            prop_assert_eq!(ab, ba);
            prop_assert!(ab >= 0.0);
        }

        #[test]
        fn prop_distance_to_self_is_zero(lat in -90.0f64..=90.0, lon in -180.0f64..=180.0) {
            prop_assert_eq!(distance(lat, lon, lat, lon).unwrap(), 0.0);
        }
    }
}
