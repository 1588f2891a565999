use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Datelike, FixedOffset, Local};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};

use crate::body::CelestialBody;
use crate::error::{Error, Result};
use crate::observer::Observer;
use crate::render::{check_color, ChartStyle, Compass};
use crate::sampler::{check_step, ReferenceDate, Variant};

pub const DEFAULT_LATITUDE: f64 = 45.0703; // Turin
pub const DEFAULT_LONGITUDE: f64 = 7.6869;
pub const DEFAULT_OUTPUT: &str = "sky_map.svg";
// Year used to check track dates while the observation time is still open.
const LEAP_YEAR: i32 = 2024;

/// Settings for one sky map run. Loaded from JSON and/or built from CLI flags.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    observer: Observer,
    time: Option<DateTime<FixedOffset>>,
    variant: Variant,
    step_minutes: Option<u32>,
    compass: Option<Compass>,
    bodies: Vec<CelestialBody>,
    tracks: Vec<ReferenceDate>,
    output: PathBuf,
    json: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            observer: Observer::from_validated(DEFAULT_LATITUDE, DEFAULT_LONGITUDE, 0.0),
            time: None,
            variant: Variant::default(),
            step_minutes: None,
            compass: None,
            bodies: CelestialBody::ALL.to_vec(),
            tracks: ReferenceDate::defaults(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            json: None,
        }
    }
}

// Deserializes a Config, validating coordinates, step, body names and
// track dates/colors before anything is computed.
impl<'de> Deserialize<'de> for Config {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(deny_unknown_fields)]
        struct ConfigHelper {
            latitude: Option<f64>,
            longitude: Option<f64>,
            elevation_m: Option<f64>,
            time: Option<DateTime<FixedOffset>>,
            variant: Option<Variant>,
            step_minutes: Option<u32>,
            compass: Option<Compass>,
            bodies: Option<Vec<String>>,
            tracks: Option<Vec<ReferenceDate>>,
            output: Option<PathBuf>,
            json: Option<PathBuf>,
        }

        let helper = ConfigHelper::deserialize(deserializer)?;
        let defaults = Config::default();

        let observer = Observer::new(
            helper.latitude.unwrap_or(defaults.observer.latitude()),
            helper.longitude.unwrap_or(defaults.observer.longitude()),
            helper.elevation_m.unwrap_or(0.0),
        )
        .map_err(D::Error::custom)?;

        let bodies = match helper.bodies {
            Some(names) => names
                .iter()
                .map(|name| name.parse::<CelestialBody>())
                .collect::<Result<Vec<_>>>()
                .map_err(D::Error::custom)?,
            None => defaults.bodies,
        };

        let config = Config {
            observer,
            time: helper.time,
            variant: helper.variant.unwrap_or_default(),
            step_minutes: helper.step_minutes,
            compass: helper.compass,
            bodies,
            tracks: helper.tracks.unwrap_or(defaults.tracks),
            output: helper.output.unwrap_or(defaults.output),
            json: helper.json,
        };
        config.validate().map_err(D::Error::custom)?;
        Ok(config)
    }
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Config> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let config: Config = serde_json::from_reader(reader)?;
        Ok(config)
    }

    /// Checks cross-field constraints. Track dates must exist in the year of
    /// the observation time; with no time set yet they are checked against a
    /// leap year, and `plot_sky_map` checks again once the time is pinned.
    pub fn validate(&self) -> Result<()> {
        if let Some(step) = self.step_minutes {
            check_step(step)?;
        }
        let year = self.time.map_or(LEAP_YEAR, |t| t.year());
        for track in &self.tracks {
            track.in_year(year)?;
            check_color(&track.color)?;
        }
        if self.bodies.is_empty() && self.tracks.is_empty() {
            return Err(Error::Config("nothing to plot: no bodies and no tracks".to_string()));
        }
        Ok(())
    }

    pub fn observer(&self) -> &Observer {
        &self.observer
    }

    /// Observation instant; the current local time when none was given.
    pub fn time(&self) -> DateTime<FixedOffset> {
        self.time.unwrap_or_else(|| Local::now().fixed_offset())
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn step_minutes(&self) -> u32 {
        self.step_minutes
            .unwrap_or_else(|| self.variant.default_step_minutes())
    }

    pub fn style(&self) -> ChartStyle {
        let mut style = ChartStyle::for_variant(self.variant);
        if let Some(compass) = self.compass {
            style.compass = compass;
        }
        style
    }

    pub fn bodies(&self) -> &[CelestialBody] {
        &self.bodies
    }

    pub fn tracks(&self) -> &[ReferenceDate] {
        &self.tracks
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn json(&self) -> Option<&Path> {
        self.json.as_deref()
    }

    pub fn with_observer(mut self, observer: Observer) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_time(mut self, time: DateTime<FixedOffset>) -> Self {
        self.time = Some(time);
        self
    }

    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    pub fn with_step_minutes(mut self, step_minutes: u32) -> Self {
        self.step_minutes = Some(step_minutes);
        self
    }

    pub fn with_compass(mut self, compass: Compass) -> Self {
        self.compass = Some(compass);
        self
    }

    pub fn with_output<P: Into<PathBuf>>(mut self, output: P) -> Self {
        self.output = output.into();
        self
    }

    pub fn with_json<P: Into<PathBuf>>(mut self, json: P) -> Self {
        self.json = Some(json.into());
        self
    }
}
