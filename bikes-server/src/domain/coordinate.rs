//! Geographic coordinate type.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Mean Earth radius used for great-circle distances.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Error returned when constructing a coordinate outside the valid range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid coordinate: {reason}")]
pub struct InvalidCoordinate {
    reason: &'static str,
}

/// A WGS84 latitude/longitude pair in decimal degrees.
///
/// Values are always finite and within range; see [`Coordinate::new`].
///
/// # Examples
///
/// ```
/// use bikes_server::domain::Coordinate;
///
/// let williamsburg = Coordinate::new(40.72, -73.95).unwrap();
/// assert_eq!(williamsburg.latitude(), 40.72);
///
/// assert!(Coordinate::new(91.0, 0.0).is_err());
/// assert!(Coordinate::new(0.0, f64::NAN).is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate", into = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Create a coordinate, validating both components.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinate> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(InvalidCoordinate {
                reason: "components must be finite",
            });
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(InvalidCoordinate {
                reason: "latitude must be within [-90, 90]",
            });
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(InvalidCoordinate {
                reason: "longitude must be within [-180, 180]",
            });
        }

        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Great-circle distance to `other` in metres (haversine formula).
    pub fn distance_m(&self, other: &Coordinate) -> f64 {
        let (lat1, lat2) = (self.latitude.to_radians(), other.latitude.to_radians());
        let d_lat = lat2 - lat1;
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_M * a.sqrt().min(1.0).asin()
    }
}

impl fmt::Debug for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coordinate({}, {})", self.latitude, self.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.latitude, self.longitude)
    }
}

/// Wire form of [`Coordinate`], validated on the way in.
#[derive(Serialize, Deserialize)]
struct RawCoordinate {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = InvalidCoordinate;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.latitude, raw.longitude)
    }
}

impl From<Coordinate> for RawCoordinate {
    fn from(c: Coordinate) -> Self {
        RawCoordinate {
            latitude: c.latitude,
            longitude: c.longitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lon: f64) -> Coordinate {
        Coordinate::new(lat, lon).unwrap()
    }

    #[test]
    fn accepts_bounds() {
        assert!(Coordinate::new(90.0, 180.0).is_ok());
        assert!(Coordinate::new(-90.0, -180.0).is_ok());
        assert!(Coordinate::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(Coordinate::new(90.01, 0.0).is_err());
        assert!(Coordinate::new(-90.01, 0.0).is_err());
        assert!(Coordinate::new(0.0, 180.5).is_err());
        assert!(Coordinate::new(0.0, -181.0).is_err());
    }

    #[test]
    fn rejects_non_finite() {
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn distance_to_self_is_zero() {
        let c = coord(40.72, -73.95);
        assert_eq!(c.distance_m(&c), 0.0);
    }

    #[test]
    fn distance_one_degree_latitude() {
        // One degree of latitude is ~111.2 km everywhere
        let d = coord(40.0, -74.0).distance_m(&coord(41.0, -74.0));
        assert!((d - 111_195.0).abs() < 100.0, "got {d}");
    }

    #[test]
    fn distance_short_city_hop() {
        // Bedford Ave L to Union Sq, roughly 4.4 km
        let d = coord(40.7171, -73.9565).distance_m(&coord(40.7359, -73.9906));
        assert!((3_500.0..4_500.0).contains(&d), "got {d}");
    }

    #[test]
    fn serde_validates() {
        let ok: Coordinate = serde_json::from_str(r#"{"latitude":40.72,"longitude":-73.95}"#).unwrap();
        assert_eq!(ok, coord(40.72, -73.95));

        let bad = serde_json::from_str::<Coordinate>(r#"{"latitude":140.0,"longitude":0.0}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn display() {
        assert_eq!(coord(40.72, -73.95).to_string(), "40.72000,-73.95000");
    }
}
