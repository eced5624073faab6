use crate::types::SpotId;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const LONGITUDE_RANGE: RangeInclusive<f64> = -180.0..=180.0;
pub const LATITUDE_RANGE: RangeInclusive<f64> = -90.0..=90.0;

/// Decimal places kept when deriving an identifier from a position.
pub const ID_PRECISION: usize = 6;

/// A `[longitude, latitude]` pair. Extra members (altitude) are accepted on
/// input and dropped.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(try_from = "Vec<f64>", into = "[f64; 2]")]
pub struct Position {
    pub lon: f64,
    pub lat: f64,
}

impl Position {
    #[must_use]
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Checks the longitude/latitude bounds.
    ///
    /// # Errors
    /// Returns a human readable reason when a member is out of range.
    pub fn validate(&self) -> Result<(), String> {
        if !self.lon.is_finite() || !self.lat.is_finite() {
            return Err("coordinates must be finite numbers".into());
        }
        if !LONGITUDE_RANGE.contains(&self.lon) {
            return Err(format!("longitude {} is outside [-180, 180]", self.lon));
        }
        if !LATITUDE_RANGE.contains(&self.lat) {
            return Err(format!("latitude {} is outside [-90, 90]", self.lat));
        }
        Ok(())
    }

    /// Identifier of whatever sits at this position: both members rounded to
    /// six decimals and joined as `"{lon}_{lat}"`.
    #[must_use]
    pub fn spot_id(&self) -> SpotId {
        format!(
            "{}_{}",
            fixed(self.lon, ID_PRECISION),
            fixed(self.lat, ID_PRECISION)
        )
    }
}

/// Decimal rendering with `places` digits where exact ties round away from
/// zero. Only `-0.0` itself drops its sign; `-0.0000001` keeps it.
fn fixed(value: f64, places: usize) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let magnitude = value.abs();
    let digits = if is_tie(magnitude, places) {
        // step off the tie toward the larger magnitude
        let nudge = 10f64.powi(-i32::try_from(places + 2).unwrap_or(i32::MAX));
        format!("{:.places$}", magnitude + nudge)
    } else {
        format!("{magnitude:.places$}")
    };
    format!("{sign}{digits}")
}

/// Whether `magnitude` lies exactly halfway between two `places`-digit
/// decimals. Formatting is exact, so a tie shows as `5` followed by zeros.
fn is_tie(magnitude: f64, places: usize) -> bool {
    let wide = format!("{:.*}", places + 24, magnitude);
    wide.split_once('.')
        .and_then(|(_, frac)| frac.get(places..))
        .and_then(|tail| tail.strip_prefix('5'))
        .is_some_and(|rest| rest.bytes().all(|b| b == b'0'))
}

impl TryFrom<Vec<f64>> for Position {
    type Error = String;

    fn try_from(members: Vec<f64>) -> Result<Self, Self::Error> {
        match members.as_slice() {
            [lon, lat, ..] => Ok(Self::new(*lon, *lat)),
            _ => Err(format!(
                "a position needs a longitude and a latitude, got {} value(s)",
                members.len()
            )),
        }
    }
}

impl From<Position> for [f64; 2] {
    fn from(p: Position) -> Self {
        [p.lon, p.lat]
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    Polygon { coordinates: Vec<Vec<Position>> },
}

impl Geometry {
    #[must_use]
    pub const fn point(lon: f64, lat: f64) -> Self {
        Self::Point { coordinates: Position::new(lon, lat) }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Point { .. } => "Point",
            Self::Polygon { .. } => "Polygon",
        }
    }

    /// Position an identifier is derived from: the point itself, or the first
    /// vertex of a polygon's outer ring.
    #[must_use]
    pub fn anchor(&self) -> Option<Position> {
        match self {
            Self::Point { coordinates } => Some(*coordinates),
            Self::Polygon { coordinates } => coordinates.first().and_then(|r| r.first()).copied(),
        }
    }

    /// Validates bounds of every position and, for polygons, that each ring
    /// is closed and has at least four positions.
    ///
    /// # Errors
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Point { coordinates } => coordinates.validate(),
            Self::Polygon { coordinates } => {
                if coordinates.is_empty() {
                    return Err("polygon has no rings".into());
                }
                for (i, ring) in coordinates.iter().enumerate() {
                    if ring.len() < 4 {
                        return Err(format!("polygon ring {i} has fewer than 4 positions"));
                    }
                    if ring.first() != ring.last() {
                        return Err(format!("polygon ring {i} is not closed"));
                    }
                    for p in ring {
                        p.validate()?;
                    }
                }
                Ok(())
            }
        }
    }
}
