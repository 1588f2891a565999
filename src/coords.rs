//! Time scales and coordinate transforms: Julian date, sidereal time,
//! topocentric parallax and equatorial -> horizontal conversion.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ephemeris::EquatorialPosition;
use crate::observer::{Observer, EARTH_RADIUS_KM};

const UNIX_EPOCH_JD: f64 = 2_440_587.5;
const J2000_JD: f64 = 2_451_545.0;

/// Apparent direction of a body as seen by the observer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HorizontalPosition {
    pub altitude: f64,
    pub azimuth: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

impl HorizontalPosition {
    pub fn is_above_horizon(&self) -> bool {
        self.altitude > 0.0
    }

    /// Polar radius on the chart: 0 at the zenith, 90 at the horizon.
    pub fn radius(&self) -> f64 {
        radius_from_altitude(self.altitude)
    }
}

pub fn radius_from_altitude(altitude: f64) -> f64 {
    90.0 - altitude
}

pub fn altitude_from_radius(radius: f64) -> f64 {
    90.0 - radius
}

pub fn julian_date(t: DateTime<Utc>) -> f64 {
    let seconds = t.timestamp() as f64 + f64::from(t.timestamp_subsec_nanos()) / 1.0e9;
    UNIX_EPOCH_JD + seconds / 86_400.0
}

/// Greenwich mean sidereal time in degrees (IAU 1982 polynomial).
pub fn gmst_deg(t: DateTime<Utc>) -> f64 {
    let d = julian_date(t) - J2000_JD;
    let c = d / 36525.0;
    let gmst = 280.460_618_37 + 360.985_647_366_29 * d + 0.000_387_933 * c * c
        - c * c * c / 38_710_000.0;
    unwind_deg(gmst)
}

pub fn unwind_deg(mut x: f64) -> f64 {
    x %= 360.0;
    if x < 0.0 {
        x += 360.0;
    }
    // -1e-15 % 360 + 360 rounds to exactly 360
    if x >= 360.0 {
        x -= 360.0;
    }
    x
}

/// Shifts a geocentric position to the observer's location.
///
/// Needs the body distance; positions without one are returned unchanged.
pub fn topocentric(
    geo: &EquatorialPosition,
    observer: &Observer,
    t: DateTime<Utc>,
) -> EquatorialPosition {
    let Some(distance_km) = geo.distance_km else {
        return *geo;
    };

    let (rho_sin, rho_cos) = observer.geocentric_terms();
    let sin_pi = EARTH_RADIUS_KM / distance_km;

    let lst = unwind_deg(gmst_deg(t) + observer.longitude());
    let h = (lst - geo.ra).to_radians();
    let dec = geo.dec.to_radians();

    let denom = dec.cos() - rho_cos * sin_pi * h.cos();
    let delta_ra = (-rho_cos * sin_pi * h.sin()).atan2(denom);
    let dec_topo = ((dec.sin() - rho_sin * sin_pi) * delta_ra.cos()).atan2(denom);

    EquatorialPosition {
        ra: unwind_deg(geo.ra + delta_ra.to_degrees()),
        dec: dec_topo.to_degrees(),
        distance_km: Some(distance_km),
    }
}

/// Equatorial -> horizontal for the observer at `t`. Azimuth is measured
/// from North through East.
pub fn to_horizontal(
    eq: &EquatorialPosition,
    observer: &Observer,
    t: DateTime<Utc>,
) -> HorizontalPosition {
    let lst = unwind_deg(gmst_deg(t) + observer.longitude());
    let h = unwind_deg(lst - eq.ra).to_radians();
    let lat = observer.latitude().to_radians();
    let dec = eq.dec.to_radians();

    let sin_alt = (lat.sin() * dec.sin() + lat.cos() * dec.cos() * h.cos()).clamp(-1.0, 1.0);
    let altitude = sin_alt.asin().to_degrees();

    let y = -dec.cos() * h.sin();
    let x = dec.sin() * lat.cos() - dec.cos() * lat.sin() * h.cos();
    let azimuth = unwind_deg(y.atan2(x).to_degrees());

    HorizontalPosition {
        altitude: altitude.clamp(-90.0, 90.0),
        azimuth,
        distance_km: eq.distance_km,
    }
}

pub fn hms_to_deg(h: f64, m: f64, s: f64) -> f64 {
    (h + m / 60.0 + s / 3600.0) * 15.0
}

/// Degrees/minutes/seconds to decimal degrees. The sign may be carried by
/// any component, including a negative zero in the degrees field.
pub fn dms_to_deg(d: f64, m: f64, s: f64) -> f64 {
    let negative = d.is_sign_negative() || m < 0.0 || s < 0.0;
    let value = d.abs() + m.abs() / 60.0 + s.abs() / 3600.0;
    if negative {
        -value
    } else {
        value
    }
}
