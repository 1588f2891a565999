//! Geocentric apparent positions of the Sun, Moon and planets.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use log::debug;
// Sun/Moon/planet positions & distances
use practical_astronomy_rust::{moon as pa_moon, planet as pa_planet, sun as pa_sun};
use serde::Serialize;

use crate::body::CelestialBody;
use crate::coords::dms_to_deg;
use crate::error::{Error, Result};

pub const MIN_YEAR: i32 = 1900;
pub const MAX_YEAR: i32 = 2100;

/// Right ascension / declination in degrees, geocentric unless stated otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EquatorialPosition {
    pub ra: f64,
    pub dec: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

/// Source of apparent geocentric positions.
pub trait Ephemeris {
    fn geocentric(&self, body: CelestialBody, t: DateTime<Utc>) -> Result<EquatorialPosition>;
}

/// Analytic ephemeris from Duffett-Smith's "Practical Astronomy" routines.
/// Positions are apparent (nutation, aberration and light time applied).
#[derive(Debug, Default, Clone, Copy)]
pub struct PracticalAstronomy;

struct CivilTime {
    hh: f64,
    mm: f64,
    ss: f64,
    day: f64,
    month: u32,
    year: u32,
}

impl PracticalAstronomy {
    pub fn new() -> Self {
        Self
    }

    fn civil(t: DateTime<Utc>) -> Result<CivilTime> {
        if !(MIN_YEAR..=MAX_YEAR).contains(&t.year()) {
            return Err(Error::InstantOutOfRange(t.to_rfc3339(), MIN_YEAR, MAX_YEAR));
        }
        Ok(CivilTime {
            hh: f64::from(t.hour()),
            mm: f64::from(t.minute()),
            ss: f64::from(t.second()) + f64::from(t.timestamp_subsec_micros()) / 1.0e6,
            day: f64::from(t.day()),
            month: t.month(),
            year: t.year() as u32,
        })
    }
}

// practical-astronomy-rust drops the carry into the whole part when the
// seconds of a sexagesimal result round up to 60: 12°27'59.996" comes back
// as 0°28'00". Minutes and seconds stay right, so such triples always read
// zero whole units and zero seconds.
type Sexagesimal = (f64, f64, f64);

struct RawPosition {
    ra: Sexagesimal,  // hours
    dec: Sexagesimal, // degrees
    distance_km: Option<f64>,
}

impl RawPosition {
    fn may_have_lost_carry(&self) -> bool {
        lost_carry(self.ra) || lost_carry(self.dec)
    }
}

fn lost_carry((whole, _, seconds): Sexagesimal) -> bool {
    whole == 0.0 && seconds == 0.0
}

fn decimal((whole, minutes, seconds): Sexagesimal) -> f64 {
    dms_to_deg(whole, minutes, seconds)
}

/// Rebuilds the whole part of `value` from `reference`, the same quantity a
/// minute away. Only the minutes and seconds of `value` are trusted.
fn restore_carry((_, minutes, seconds): Sexagesimal, reference: f64) -> f64 {
    let fraction = minutes.abs() / 60.0 + seconds.abs() / 3600.0;
    let whole = (reference.abs() - fraction).round().max(0.0);
    (whole + fraction).copysign(reference)
}

impl PracticalAstronomy {
    fn raw(body: CelestialBody, t: DateTime<Utc>) -> Result<RawPosition> {
        let c = Self::civil(t)?;

        Ok(match body {
            CelestialBody::Sun => {
                let (ra_h, ra_m, ra_s, dec_d, dec_m, dec_s) = pa_sun::precise_position_of_sun(
                    c.hh, c.mm, c.ss, c.day, c.month, c.year, false, 0,
                );
                let (dist_km, _ang_deg, _ang_min, _ang_sec) = pa_sun::sun_distance_and_angular_size(
                    c.hh, c.mm, c.ss, c.day, c.month, c.year, false, 0,
                );
                RawPosition {
                    ra: (ra_h, ra_m, ra_s),
                    dec: (dec_d, dec_m, dec_s),
                    distance_km: Some(dist_km),
                }
            }
            CelestialBody::Moon => {
                let (ra_h, ra_m, ra_s, dec_d, dec_m, dec_s, _el, _par) =
                    pa_moon::precise_position_of_moon(
                        c.hh, c.mm, c.ss, false, 0, c.day, c.month, c.year,
                    );
                let (dist_km, _ang_deg, _ang_min, _ang_sec, _hp_deg, _hp_min) =
                    pa_moon::moon_dist_ang_diam_hor_parallax(
                        c.hh, c.mm, c.ss, false, 0, c.day, c.month, c.year,
                    );
                RawPosition {
                    ra: (ra_h, ra_m, ra_s),
                    dec: (dec_d, dec_m, dec_s),
                    distance_km: Some(dist_km),
                }
            }
            planet => {
                let (ra_h, ra_m, ra_s, dec_d, dec_m, dec_s) = pa_planet::precise_position_of_planet(
                    c.hh,
                    c.mm,
                    c.ss,
                    false,
                    0,
                    c.day,
                    c.month,
                    c.year,
                    planet.name().to_string(),
                );
                RawPosition {
                    ra: (ra_h, ra_m, ra_s),
                    dec: (dec_d, dec_m, dec_s),
                    distance_km: None,
                }
            }
        })
    }

    /// Decimal RA (hours) and Dec (degrees) a minute before or after `t`,
    /// whichever reads with intact whole parts.
    fn reference(body: CelestialBody, t: DateTime<Utc>) -> Result<(f64, f64)> {
        for offset in [-60, 60] {
            if let Ok(raw) = Self::raw(body, t + Duration::seconds(offset)) {
                if !raw.may_have_lost_carry() {
                    return Ok((decimal(raw.ra), decimal(raw.dec)));
                }
            }
        }
        Err(Error::Ephemeris(format!(
            "cannot recover the whole part of the position of {body} at {t}"
        )))
    }
}

impl Ephemeris for PracticalAstronomy {
    fn geocentric(&self, body: CelestialBody, t: DateTime<Utc>) -> Result<EquatorialPosition> {
        let raw = Self::raw(body, t)?;

        let (ra_h, dec) = if raw.may_have_lost_carry() {
            let (ref_ra_h, ref_dec) = Self::reference(body, t)?;
            let ra_h = if lost_carry(raw.ra) {
                restore_carry(raw.ra, ref_ra_h)
            } else {
                decimal(raw.ra)
            };
            let dec = if lost_carry(raw.dec) {
                restore_carry(raw.dec, ref_dec)
            } else {
                decimal(raw.dec)
            };
            debug!(
                "[ephemeris] {body} at {t}: whole part rebuilt from {ref_ra_h:.4}h/{ref_dec:.4}° -> {ra_h:.4}h/{dec:.4}°"
            );
            (ra_h, dec)
        } else {
            (decimal(raw.ra), decimal(raw.dec))
        };
        let pos = EquatorialPosition {
            ra: ra_h * 15.0,
            dec,
            distance_km: raw.distance_km,
        };

        if !pos.ra.is_finite() || !pos.dec.is_finite() || !(-90.0..=90.0).contains(&pos.dec) {
            return Err(Error::Ephemeris(format!(
                "degenerate position for {body} at {t}: ra={}, dec={}",
                pos.ra, pos.dec
            )));
        }

        debug!(
            "[ephemeris] {body} at {t}: ra={:.4}, dec={:.4}, dist_km={:?}",
            pos.ra, pos.dec, pos.distance_km
        );
        Ok(EquatorialPosition {
            ra: crate::coords::unwind_deg(pos.ra),
            ..pos
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::unwind_deg;
    use chrono::TimeZone;

    #[test]
    fn rejects_instants_outside_model_range() {
        let eph = PracticalAstronomy::new();
        let t = Utc.with_ymd_and_hms(1850, 1, 1, 0, 0, 0).unwrap();
        assert!(matches!(
            eph.geocentric(CelestialBody::Sun, t),
            Err(Error::InstantOutOfRange(_, MIN_YEAR, MAX_YEAR))
        ));
    }

    #[test]
    fn sun_declination_tracks_the_seasons() {
        let eph = PracticalAstronomy::new();
        let june = Utc.with_ymd_and_hms(2024, 6, 21, 12, 0, 0).unwrap();
        let dec = eph.geocentric(CelestialBody::Sun, june).unwrap().dec;
        assert!((dec - 23.44).abs() < 0.1, "{dec}");

        let december = Utc.with_ymd_and_hms(2024, 12, 21, 12, 0, 0).unwrap();
        let dec = eph.geocentric(CelestialBody::Sun, december).unwrap().dec;
        assert!((dec + 23.44).abs() < 0.1, "{dec}");
    }

    #[test]
    fn sun_and_moon_carry_distances() {
        let eph = PracticalAstronomy::new();
        let t = Utc.with_ymd_and_hms(2024, 6, 21, 12, 0, 0).unwrap();

        let sun = eph.geocentric(CelestialBody::Sun, t).unwrap();
        let au = sun.distance_km.unwrap() / 149_597_870.7;
        assert!((0.98..1.02).contains(&au), "{au}");

        let moon = eph.geocentric(CelestialBody::Moon, t).unwrap();
        let km = moon.distance_km.unwrap();
        assert!((356_000.0..407_000.0).contains(&km), "{km}");
    }

    #[test]
    fn planets_stay_near_the_ecliptic() {
        let eph = PracticalAstronomy::new();
        let t = Utc.with_ymd_and_hms(2024, 6, 21, 12, 0, 0).unwrap();
        for body in CelestialBody::ALL.into_iter().filter(CelestialBody::is_planet) {
            let pos = eph.geocentric(body, t).unwrap();
            assert!((0.0..360.0).contains(&pos.ra), "{body}: {}", pos.ra);
            assert!(pos.dec.abs() < 30.0, "{body}: {}", pos.dec);
            assert!(pos.distance_km.is_none());
        }
    }

    #[test]
    fn restore_carry_rebuilds_the_whole_part() {
        // -12°27'59.996" read back as -0°28'00"
        let dec = restore_carry((-0.0, 28.0, 0.0), -12.4669);
        assert!((dec + (12.0 + 28.0 / 60.0)).abs() < 1e-9, "{dec}");

        let dec = restore_carry((0.0, 0.0, 0.0), 12.999_99);
        assert!((dec - 13.0).abs() < 1e-9, "{dec}");

        // genuinely small values are left alone
        let dec = restore_carry((0.0, 28.0, 0.0), 0.4665);
        assert!((dec - 28.0 / 60.0).abs() < 1e-9, "{dec}");

        // right ascension rolling over midnight
        let ra_h = restore_carry((0.0, 0.0, 0.0), 23.999_98);
        assert_eq!(unwind_deg(ra_h * 15.0), 0.0);
        assert!(lost_carry((-0.0, 28.0, 0.0)));
        assert!(!lost_carry((12.0, 28.0, 0.0)));
    }

    #[test]
    fn whole_degrees_survive_seconds_rounding_up() {
        let eph = PracticalAstronomy::new();
        for (body, t, expected) in [
            (CelestialBody::Sun, Utc.with_ymd_and_hms(2024, 2, 16, 7, 50, 0).unwrap(), -12.47),
            (CelestialBody::Moon, Utc.with_ymd_and_hms(2024, 5, 9, 18, 40, 0).unwrap(), 26.40),
            (CelestialBody::Venus, Utc.with_ymd_and_hms(2024, 3, 29, 7, 20, 0).unwrap(), -4.69),
        ] {
            let dec = eph.geocentric(body, t).unwrap().dec;
            assert!((dec - expected).abs() < 0.1, "{body} at {t}: {dec}");
        }
    }

    #[test]
    fn declination_has_no_jumps_over_a_year() {
        let eph = PracticalAstronomy::new();
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let steps = 366 * 24 * 6;
        for body in [CelestialBody::Sun, CelestialBody::Moon, CelestialBody::Venus] {
            let mut prev = eph.geocentric(body, start).unwrap();
            for i in 1..=steps {
                let t = start + Duration::minutes(10 * i);
                let pos = eph.geocentric(body, t).unwrap();
                assert!(
                    (pos.dec - prev.dec).abs() < 0.5,
                    "{body} dec jump at {t}: {} -> {}",
                    prev.dec,
                    pos.dec
                );
                let d_ra = (pos.ra - prev.ra).abs();
                assert!(d_ra.min(360.0 - d_ra) < 1.0, "{body} ra jump at {t}: {} -> {}", prev.ra, pos.ra);
                prev = pos;
            }
        }
    }
}
