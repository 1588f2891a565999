//! Reference sun paths: one body sampled across a UTC day.

use chrono::{Duration, NaiveDate};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::body::CelestialBody;
use crate::coords::HorizontalPosition;
use crate::ephemeris::Ephemeris;
use crate::error::{Error, Result};
use crate::observer::Observer;
use crate::resolver::Resolver;

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Sampling/plotting policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Variant {
    /// Keep only samples and bodies above the horizon.
    #[default]
    AboveHorizon,
    /// Keep every sample, below-horizon ones included.
    FullDay,
}

impl Variant {
    pub fn keeps(&self, pos: &HorizontalPosition) -> bool {
        match self {
            Variant::AboveHorizon => pos.is_above_horizon(),
            Variant::FullDay => true,
        }
    }

    pub fn default_step_minutes(&self) -> u32 {
        match self {
            Variant::AboveHorizon => 10,
            Variant::FullDay => 60,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrackSample {
    pub minute_of_day: u32,
    #[serde(flatten)]
    pub position: HorizontalPosition,
}

/// Calendar day of a reference track, resolved against the observation year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceDate {
    pub label: String,
    pub month: u32,
    pub day: u32,
    pub color: String,
}

impl ReferenceDate {
    pub fn new(label: &str, month: u32, day: u32, color: &str) -> Self {
        Self {
            label: label.to_string(),
            month,
            day,
            color: color.to_string(),
        }
    }

    /// Summer solstice, winter solstice and March equinox.
    pub fn defaults() -> Vec<ReferenceDate> {
        vec![
            ReferenceDate::new("Summer Solstice", 6, 21, "red"),
            ReferenceDate::new("Winter Solstice", 12, 21, "blue"),
            ReferenceDate::new("Equinox", 3, 20, "green"),
        ]
    }

    pub fn in_year(&self, year: i32) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day).ok_or_else(|| {
            Error::InvalidDate(format!("{year}-{:02}-{:02} ({})", self.month, self.day, self.label))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceTrack {
    pub label: String,
    pub date: NaiveDate,
    pub color: String,
    pub samples: Vec<TrackSample>,
}

impl ReferenceTrack {
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

pub fn check_step(step_minutes: u32) -> Result<()> {
    if step_minutes == 0 || step_minutes > MINUTES_PER_DAY || MINUTES_PER_DAY % step_minutes != 0 {
        return Err(Error::InvalidStep(step_minutes));
    }
    Ok(())
}

/// Samples `body` from 00:00 UTC on `date` up to (not including) the next
/// midnight every `step_minutes`, filtered by `variant`.
pub fn sample_track<E: Ephemeris>(
    resolver: &Resolver<E>,
    body: CelestialBody,
    observer: &Observer,
    date: NaiveDate,
    step_minutes: u32,
    variant: Variant,
) -> Result<Vec<TrackSample>> {
    check_step(step_minutes)?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| Error::InvalidDate(date.to_string()))?
        .and_utc();

    let mut samples = Vec::with_capacity((MINUTES_PER_DAY / step_minutes) as usize);
    for minute_of_day in (0..MINUTES_PER_DAY).step_by(step_minutes as usize) {
        let t = midnight + Duration::minutes(i64::from(minute_of_day));
        let position = resolver.resolve(body, observer, t)?;
        if variant.keeps(&position) {
            samples.push(TrackSample {
                minute_of_day,
                position,
            });
        }
    }
    debug!(
        "[sample_track] {body} on {date}: kept {} samples (step {step_minutes} min, {variant:?})",
        samples.len()
    );
    Ok(samples)
}

/// Sun paths for each reference date in `year`.
pub fn reference_tracks<E: Ephemeris>(
    resolver: &Resolver<E>,
    observer: &Observer,
    year: i32,
    dates: &[ReferenceDate],
    step_minutes: u32,
    variant: Variant,
) -> Result<Vec<ReferenceTrack>> {
    let mut tracks = Vec::with_capacity(dates.len());
    for reference in dates {
        let date = reference.in_year(year)?;
        let samples = sample_track(
            resolver,
            CelestialBody::Sun,
            observer,
            date,
            step_minutes,
            variant,
        )?;
        if samples.is_empty() {
            warn!(
                "[reference_tracks] {} ({date}) never rises; track omitted",
                reference.label
            );
        }
        tracks.push(ReferenceTrack {
            label: reference.label.clone(),
            date,
            color: reference.color.clone(),
            samples,
        });
    }
    Ok(tracks)
}
