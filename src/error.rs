//! Error types for skychart

use thiserror::Error;

/// Result type for skychart operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while computing or rendering a sky map
#[derive(Error, Debug)]
pub enum Error {
    /// Latitude outside [-90, 90]
    #[error("invalid latitude {0}° (must be between -90° and +90°)")]
    InvalidLatitude(f64),

    /// Longitude outside [-180, 180]
    #[error("invalid longitude {0}° (must be between -180° and +180°)")]
    InvalidLongitude(f64),

    /// Elevation that is not a finite number of meters
    #[error("invalid elevation {0} m (must be a finite number)")]
    InvalidElevation(f64),

    /// Body name not known to the ephemeris
    #[error("unknown celestial body: {0}")]
    UnknownBody(String),

    /// Instant outside the range the ephemeris model supports
    #[error("instant {0} is outside the supported ephemeris range (years {1}..={2})")]
    InstantOutOfRange(String, i32, i32),

    /// Sampling step that does not tile a day
    #[error("invalid sampling step {0} min (must divide 1440)")]
    InvalidStep(u32),

    /// Calendar date that does not exist
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// Color string that is not `#rrggbb` or a plain name
    #[error("invalid color: {0}")]
    InvalidColor(String),

    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Ephemeris backend failure
    #[error("ephemeris error: {0}")]
    Ephemeris(String),

    /// JSON (de)serialization failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error (reading config, writing the chart)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
