//! Resolved geographic position.
//!
//! A [`LocationEstimate`] is what a successful resolution produces: a point
//! and the uncertainty radius declared by the source record. Once resolved it
//! keeps no link back to the cell identity it came from.

use std::fmt;

use thiserror::Error;

/// Minimum valid latitude in degrees.
pub const MIN_LAT: f64 = -90.0;
/// Maximum valid latitude in degrees.
pub const MAX_LAT: f64 = 90.0;
/// Minimum valid longitude in degrees.
pub const MIN_LON: f64 = -180.0;
/// Maximum valid longitude in degrees.
pub const MAX_LON: f64 = 180.0;

/// Errors raised when a record does not describe a valid position.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LocationError {
    #[error("invalid latitude: {0}")]
    InvalidLatitude(f64),

    #[error("invalid longitude: {0}")]
    InvalidLongitude(f64),

    #[error("invalid accuracy: {0}")]
    InvalidAccuracy(f64),
}

/// A resolved position with its declared accuracy radius in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocationEstimate {
    latitude: f64,
    longitude: f64,
    accuracy: f64,
}

impl LocationEstimate {
    /// Creates an estimate, rejecting coordinates outside the WGS84 ranges
    /// and negative or non-finite accuracy.
    pub fn new(latitude: f64, longitude: f64, accuracy: f64) -> Result<Self, LocationError> {
        if !(MIN_LAT..=MAX_LAT).contains(&latitude) {
            return Err(LocationError::InvalidLatitude(latitude));
        }
        if !(MIN_LON..=MAX_LON).contains(&longitude) {
            return Err(LocationError::InvalidLongitude(longitude));
        }
        if !accuracy.is_finite() || accuracy < 0.0 {
            return Err(LocationError::InvalidAccuracy(accuracy));
        }

        Ok(Self {
            latitude,
            longitude,
            accuracy,
        })
    }

    /// Latitude in degrees.
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Uncertainty radius in meters.
    pub fn accuracy(&self) -> f64 {
        self.accuracy
    }
}

impl fmt::Display for LocationEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Latitude: {:.6}", self.latitude)?;
        writeln!(f, "Longitude: {:.6}", self.longitude)?;
        write!(f, "Accuracy: ±{} meters", self.accuracy)
    }
}
