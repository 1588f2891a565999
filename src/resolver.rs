use chrono::{DateTime, Utc};
use log::debug;

use crate::body::CelestialBody;
use crate::coords::{self, HorizontalPosition};
use crate::ephemeris::{Ephemeris, PracticalAstronomy};
use crate::error::Result;
use crate::observer::Observer;

/// Resolves bodies to topocentric altitude/azimuth. Owns the ephemeris for
/// the whole run.
pub struct Resolver<E = PracticalAstronomy> {
    ephemeris: E,
}

impl Resolver<PracticalAstronomy> {
    pub fn practical_astronomy() -> Self {
        Self::new(PracticalAstronomy::new())
    }
}

impl<E: Ephemeris> Resolver<E> {
    pub fn new(ephemeris: E) -> Self {
        Self { ephemeris }
    }

    pub fn ephemeris(&self) -> &E {
        &self.ephemeris
    }

    pub fn resolve(
        &self,
        body: CelestialBody,
        observer: &Observer,
        t: DateTime<Utc>,
    ) -> Result<HorizontalPosition> {
        let geo = self.ephemeris.geocentric(body, t)?;
        let topo = coords::topocentric(&geo, observer, t);
        let pos = coords::to_horizontal(&topo, observer, t);
        debug!(
            "[resolve] {body} at {t}: alt={:.3}, az={:.3}",
            pos.altitude, pos.azimuth
        );
        Ok(pos)
    }

    /// Resolves every body in `bodies` at the same instant, in order.
    pub fn resolve_all(
        &self,
        bodies: &[CelestialBody],
        observer: &Observer,
        t: DateTime<Utc>,
    ) -> Result<Vec<(CelestialBody, HorizontalPosition)>> {
        bodies
            .iter()
            .map(|&body| Ok((body, self.resolve(body, observer, t)?)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn turin() -> Observer {
        Observer::new(45.0703, 7.6869, 0.0).unwrap()
    }

    #[test]
    fn positions_stay_in_range() {
        let resolver = Resolver::practical_astronomy();
        let observers = [
            turin(),
            Observer::new(0.0, 0.0, 0.0).unwrap(),
            Observer::new(-33.87, 151.21, 50.0).unwrap(),
            Observer::new(89.9, -120.0, 0.0).unwrap(),
        ];
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        for observer in &observers {
            for step in 0..12 {
                let t = start + Duration::hours(step * 731);
                for (body, pos) in resolver
                    .resolve_all(&CelestialBody::ALL, observer, t)
                    .unwrap()
                {
                    assert!((-90.0..=90.0).contains(&pos.altitude), "{body}: {pos:?}");
                    assert!((0.0..360.0).contains(&pos.azimuth), "{body}: {pos:?}");
                }
            }
        }
    }

    #[test]
    fn summer_noon_sun_is_high_over_turin() {
        let resolver = Resolver::practical_astronomy();
        let t = Utc.with_ymd_and_hms(2024, 6, 21, 12, 0, 0).unwrap();
        let sun = resolver.resolve(CelestialBody::Sun, &turin(), t).unwrap();
        assert!(sun.altitude > 60.0, "{sun:?}");
        assert!(sun.azimuth > 150.0 && sun.azimuth < 230.0, "{sun:?}");
    }

    #[test]
    fn equinox_noon_altitude_is_colatitude() {
        let resolver = Resolver::practical_astronomy();
        let observer = Observer::new(45.0703, 0.0, 0.0).unwrap();
        // solar noon on Greenwich meridian (equation of time ~ -7.5 min)
        let t = Utc.with_ymd_and_hms(2024, 3, 20, 12, 7, 0).unwrap();
        let sun = resolver.resolve(CelestialBody::Sun, &observer, t).unwrap();
        assert!((sun.altitude - (90.0 - 45.0703)).abs() < 1.0, "{sun:?}");
    }

    #[test]
    fn equinox_sunrise_on_equator_is_near_horizon() {
        let resolver = Resolver::practical_astronomy();
        let observer = Observer::new(0.0, 0.0, 0.0).unwrap();
        let t = Utc.with_ymd_and_hms(2024, 3, 20, 6, 0, 0).unwrap();
        let sun = resolver.resolve(CelestialBody::Sun, &observer, t).unwrap();
        assert!(sun.altitude.abs() < 3.0, "{sun:?}");
        assert!((sun.azimuth - 90.0).abs() < 3.0, "{sun:?}");
    }

    #[test]
    fn midnight_sun_is_below_horizon() {
        let resolver = Resolver::practical_astronomy();
        let t = Utc.with_ymd_and_hms(2024, 6, 21, 23, 30, 0).unwrap();
        let sun = resolver.resolve(CelestialBody::Sun, &turin(), t).unwrap();
        assert!(sun.altitude < 0.0, "{sun:?}");
        assert!(!sun.is_above_horizon());
        assert!(sun.radius() > 90.0);
    }
}
