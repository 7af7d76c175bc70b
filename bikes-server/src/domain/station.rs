//! Bikeshare station and bike types.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Coordinate;

/// Error returned when parsing an invalid station id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid station id: {reason}")]
pub struct InvalidStationId {
    reason: &'static str,
}

/// Identifier of a station as issued by the station directory.
///
/// Ids are opaque to us; the only requirement is that they are non-blank.
///
/// # Examples
///
/// ```
/// use bikes_server::domain::StationId;
///
/// let id = StationId::parse("66dc0e99-0aca-11e7-82f6-3863bb44ef7c").unwrap();
/// assert_eq!(id.as_str(), "66dc0e99-0aca-11e7-82f6-3863bb44ef7c");
///
/// assert!(StationId::parse("").is_err());
/// assert!(StationId::parse("   ").is_err());
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StationId(String);

impl StationId {
    /// Parse a station id, rejecting blank input.
    pub fn parse(s: &str) -> Result<Self, InvalidStationId> {
        Self::try_from(s.to_string())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for StationId {
    type Error = InvalidStationId;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s.trim().is_empty() {
            return Err(InvalidStationId {
                reason: "must not be blank",
            });
        }
        Ok(StationId(s))
    }
}

impl From<StationId> for String {
    fn from(id: StationId) -> Self {
        id.0
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Coarse battery charge bucket for an e-bike.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatteryLevel {
    Low,
    Mid,
    Full,
}

/// A bike docked at a station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bike {
    pub battery_level: BatteryLevel,

    /// Human-readable remaining range, e.g. "24 mi".
    pub range_description: String,
}

/// A station as reported by the most recent directory snapshot.
///
/// Identity is [`Station::id`]; every other field is replaced wholesale
/// when a new snapshot arrives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub id: StationId,
    pub name: String,
    pub coordinate: Coordinate,

    /// Bikes currently docked, in the order the directory lists them.
    #[serde(default)]
    pub bike_inventory: Vec<Bike>,
}

impl Station {
    /// Create a station with an empty inventory.
    pub fn new(id: StationId, name: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            id,
            name: name.into(),
            coordinate,
            bike_inventory: Vec::new(),
        }
    }

    /// Add a bike to the inventory.
    pub fn with_bike(mut self, battery_level: BatteryLevel, range: impl Into<String>) -> Self {
        self.bike_inventory.push(Bike {
            battery_level,
            range_description: range.into(),
        });
        self
    }

    /// Number of bikes docked.
    pub fn bike_count(&self) -> usize {
        self.bike_inventory.len()
    }

    /// The first `n` bikes in inventory order.
    pub fn leading_bikes(&self, n: usize) -> &[Bike] {
        &self.bike_inventory[..n.min(self.bike_inventory.len())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station() -> Station {
        Station::new(
            StationId::parse("s1").unwrap(),
            "Bedford Ave & N 7 St",
            Coordinate::new(40.72, -73.95).unwrap(),
        )
    }

    #[test]
    fn parse_rejects_blank() {
        assert!(StationId::parse("").is_err());
        assert!(StationId::parse(" \t").is_err());
        assert!(StationId::parse("a").is_ok());
    }

    #[test]
    fn id_display_and_debug() {
        let id = StationId::parse("abc").unwrap();
        assert_eq!(id.to_string(), "abc");
        assert_eq!(format!("{id:?}"), "StationId(abc)");
    }

    #[test]
    fn bike_count_and_leading() {
        let s = station()
            .with_bike(BatteryLevel::Full, "40 mi")
            .with_bike(BatteryLevel::Low, "3 mi")
            .with_bike(BatteryLevel::Mid, "18 mi");

        assert_eq!(s.bike_count(), 3);
        assert_eq!(s.leading_bikes(2).len(), 2);
        assert_eq!(s.leading_bikes(2)[1].battery_level, BatteryLevel::Low);
        assert_eq!(s.leading_bikes(10).len(), 3);
        assert!(station().leading_bikes(5).is_empty());
    }

    #[test]
    fn deserialize_directory_payload() {
        let json = r#"{
            "id": "66dc0e99",
            "name": "Kent Ave & S 11 St",
            "coordinate": {"latitude": 40.7079, "longitude": -73.9683},
            "bikeInventory": [
                {"batteryLevel": "full", "rangeDescription": "38 mi"},
                {"batteryLevel": "low", "rangeDescription": "4 mi"}
            ]
        }"#;

        let s: Station = serde_json::from_str(json).unwrap();
        assert_eq!(s.id.as_str(), "66dc0e99");
        assert_eq!(s.bike_count(), 2);
        assert_eq!(s.bike_inventory[0].battery_level, BatteryLevel::Full);
        assert_eq!(s.bike_inventory[1].range_description, "4 mi");
    }

    #[test]
    fn deserialize_missing_inventory_defaults_empty() {
        let json = r#"{"id":"x","name":"X","coordinate":{"latitude":0.0,"longitude":0.0}}"#;
        let s: Station = serde_json::from_str(json).unwrap();
        assert_eq!(s.bike_count(), 0);
    }

    #[test]
    fn deserialize_rejects_blank_id() {
        let json = r#"{"id":"","name":"X","coordinate":{"latitude":0.0,"longitude":0.0}}"#;
        assert!(serde_json::from_str::<Station>(json).is_err());
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any string with a non-whitespace character parses and round-trips
        #[test]
        fn non_blank_roundtrip(s in "[ ]{0,2}[a-zA-Z0-9-]{1,36}[ ]{0,2}") {
            let id = StationId::parse(&s).unwrap();
            prop_assert_eq!(id.as_str(), s.as_str());
        }

        /// Whitespace-only strings are always rejected
        #[test]
        fn blank_rejected(s in "[ \t\n]{0,8}") {
            prop_assert!(StationId::parse(&s).is_err());
        }

        /// Parsing and deserializing accept exactly the same ids
        #[test]
        fn parse_agrees_with_deserialize(s in "[ \t]{0,2}[a-z0-9]{0,4}[ \t]{0,2}") {
            let json = serde_json::to_string(&s).unwrap();
            let parsed = StationId::parse(&s);
            let decoded = serde_json::from_str::<StationId>(&json);
            prop_assert_eq!(parsed.is_ok(), decoded.is_ok());
            if let (Ok(a), Ok(b)) = (parsed, decoded) {
                prop_assert_eq!(a, b);
            }
        }
    }
}
