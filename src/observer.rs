//! Observer location on the WGS-84 ellipsoid.

use serde::Serialize;

use crate::error::{Error, Result};

pub const EARTH_RADIUS_KM: f64 = 6378.137; // WGS-84 equatorial
pub const EARTH_FLATTENING: f64 = 1.0 / 298.257_223_563; // WGS-84

/// Geodetic position of the observer. Longitude is east-positive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Observer {
    latitude: f64,
    longitude: f64,
    elevation_m: f64,
}

impl Observer {
    /// Validates latitude in [-90, 90], longitude in [-180, 180] and a finite
    /// elevation.
    pub fn new(latitude: f64, longitude: f64, elevation_m: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(Error::InvalidLatitude(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(Error::InvalidLongitude(longitude));
        }
        if !elevation_m.is_finite() {
            return Err(Error::InvalidElevation(elevation_m));
        }
        Ok(Self {
            latitude,
            longitude,
            elevation_m,
        })
    }

    /// For coordinates known to be in range at compile time.
    pub(crate) const fn from_validated(latitude: f64, longitude: f64, elevation_m: f64) -> Self {
        Self {
            latitude,
            longitude,
            elevation_m,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn elevation_m(&self) -> f64 {
        self.elevation_m
    }

    /// Geocentric terms `(rho * sin(phi'), rho * cos(phi'))` in Earth radii,
    /// used for the topocentric parallax correction.
    pub fn geocentric_terms(&self) -> (f64, f64) {
        let f = EARTH_FLATTENING;
        let lat = self.latitude.to_radians();
        let h = self.elevation_m / 1000.0 / EARTH_RADIUS_KM;

        let u = ((1.0 - f) * lat.tan()).atan();
        let rho_sin = (1.0 - f) * u.sin() + h * lat.sin();
        let rho_cos = u.cos() + h * lat.cos();
        (rho_sin, rho_cos)
    }
}
