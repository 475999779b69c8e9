use geo::{Distance, Geodesic, Point};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinate {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self { longitude, latitude }
    }

    /// Length in metres of the shortest path on the WGS84 ellipsoid (inverse geodesic problem).
    pub fn geodesic_distance(&self, other: &Coordinate) -> f64 {
        Geodesic.distance(Point::from(*self), Point::from(*other))
    }
}

impl From<Coordinate> for Point<f64> {
    fn from(coord: Coordinate) -> Self {
        Point::new(coord.longitude, coord.latitude)
    }
}

/// Formats as the `lon,lat` string used on the wire.
impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.longitude, self.latitude)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCoordinateError(pub String);

impl fmt::Display for ParseCoordinateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected \"longitude,latitude\", got \"{}\"", self.0)
    }
}

impl std::error::Error for ParseCoordinateError {}

impl FromStr for Coordinate {
    type Err = ParseCoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseCoordinateError(s.to_string());
        let (lon, lat) = s.split_once(',').ok_or_else(invalid)?;
        let longitude = lon.trim().parse::<f64>().map_err(|_| invalid())?;
        let latitude = lat.trim().parse::<f64>().map_err(|_| invalid())?;
        if !longitude.is_finite() || !latitude.is_finite() {
            return Err(invalid());
        }
        Ok(Self { longitude, latitude })
    }
}
