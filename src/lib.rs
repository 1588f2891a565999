//! Polar sky maps: where the Sun, Moon and bright planets stand for an
//! observer, with the solstice and equinox sun paths of the same year.
//!
//! ```no_run
//! use skychart::{plot_sky_map, Config};
//!
//! let config = Config::default().with_output("turin.svg");
//! let chart = plot_sky_map(&config)?;
//! println!("{} tracks", chart.plotted_tracks().count());
//! # Ok::<(), skychart::Error>(())
//! ```

use std::sync::Once;

use log::{info, LevelFilter};

pub mod body;
pub mod chart;
pub mod config;
pub mod coords;
pub mod ephemeris;
pub mod error;
pub mod observer;
pub mod render;
pub mod report;
pub mod resolver;
pub mod sampler;

pub use body::CelestialBody;
pub use chart::{compute_chart, ChartRequest, PlottedBody, SkyChart};
pub use config::Config;
pub use coords::{altitude_from_radius, radius_from_altitude, HorizontalPosition};
pub use ephemeris::{Ephemeris, EquatorialPosition, PracticalAstronomy};
pub use error::{Error, Result};
pub use observer::Observer;
pub use render::{ChartStyle, Compass};
pub use report::SkyReport;
pub use resolver::Resolver;
pub use sampler::{sample_track, ReferenceDate, ReferenceTrack, TrackSample, Variant};

static INIT_LOGGER: Once = Once::new();

/// Installs `env_logger` once. `RUST_LOG` wins over `level` when set.
pub fn init_logger(level: LevelFilter) {
    INIT_LOGGER.call_once(|| {
        let _ = env_logger::Builder::new()
            .filter_level(level)
            .parse_default_env()
            .try_init();
    });
}

/// Computes the chart described by `config`, writes the SVG (and the JSON
/// report when requested) and returns the computed chart.
pub fn plot_sky_map(config: &Config) -> Result<SkyChart> {
    // track dates are only fully checkable once "now" is fixed
    let config = &config.clone().with_time(config.time());
    config.validate()?;
    let resolver = Resolver::practical_astronomy();
    let request = ChartRequest {
        observer: *config.observer(),
        timestamp: config.time(),
        variant: config.variant(),
        step_minutes: config.step_minutes(),
        bodies: config.bodies(),
        reference_dates: config.tracks(),
    };
    info!(
        "[plot_sky_map] {} at lat={}, lon={} ({:?}, step {} min)",
        request.timestamp,
        request.observer.latitude(),
        request.observer.longitude(),
        request.variant,
        request.step_minutes
    );

    let chart = compute_chart(&resolver, &request)?;
    render::save(&chart, &config.style(), config.output())?;
    if let Some(path) = config.json() {
        SkyReport::from_chart(&chart).write(path)?;
    }
    Ok(chart)
}
