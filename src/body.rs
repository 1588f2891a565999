use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::Error;

/// Bodies the sky map knows how to place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CelestialBody {
    Sun,
    Moon,
    Venus,
    Mars,
    Jupiter,
    Saturn,
}

impl CelestialBody {
    pub const ALL: [CelestialBody; 6] = [
        CelestialBody::Sun,
        CelestialBody::Moon,
        CelestialBody::Venus,
        CelestialBody::Mars,
        CelestialBody::Jupiter,
        CelestialBody::Saturn,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CelestialBody::Sun => "Sun",
            CelestialBody::Moon => "Moon",
            CelestialBody::Venus => "Venus",
            CelestialBody::Mars => "Mars",
            CelestialBody::Jupiter => "Jupiter",
            CelestialBody::Saturn => "Saturn",
        }
    }

    pub fn is_planet(&self) -> bool {
        !matches!(self, CelestialBody::Sun | CelestialBody::Moon)
    }

    /// Marker fill color on the chart.
    pub fn color(&self) -> &'static str {
        match self {
            CelestialBody::Sun => "yellow",
            CelestialBody::Moon => "gray",
            CelestialBody::Venus => "magenta",
            CelestialBody::Mars => "red",
            CelestialBody::Jupiter => "orange",
            CelestialBody::Saturn => "gold",
        }
    }

    /// Marker radius in pixels. Sun and Moon are drawn larger than planets.
    pub fn marker_radius(&self) -> f64 {
        match self {
            CelestialBody::Sun => 10.0,
            CelestialBody::Moon => 9.0,
            _ => 5.0,
        }
    }
}

impl fmt::Display for CelestialBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CelestialBody {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sun" => Ok(CelestialBody::Sun),
            "moon" => Ok(CelestialBody::Moon),
            "venus" => Ok(CelestialBody::Venus),
            "mars" => Ok(CelestialBody::Mars),
            "jupiter" | "jupiter barycenter" => Ok(CelestialBody::Jupiter),
            "saturn" | "saturn barycenter" => Ok(CelestialBody::Saturn),
            _ => Err(Error::UnknownBody(s.to_string())),
        }
    }
}
