use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use clap::{Parser, ValueEnum};
use log::{info, LevelFilter};

use skychart::{init_logger, plot_sky_map, Compass, Config, Observer, Variant};

/// Plot the Sun, Moon and bright planets on a polar sky map.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// JSON config file; flags below override its values.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Observer latitude in degrees, north positive.
    #[arg(long, allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Observer longitude in degrees, east positive.
    #[arg(long, allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Observer elevation in meters.
    #[arg(long, allow_negative_numbers = true)]
    elevation: Option<f64>,

    /// Observation time (RFC 3339, e.g. 2024-06-21T14:00:00+02:00). Defaults to now.
    #[arg(long, value_parser = parse_time)]
    time: Option<DateTime<FixedOffset>>,

    /// Which samples and bodies are drawn.
    #[arg(long, value_enum)]
    variant: Option<VariantArg>,

    /// Minutes between sun path samples; must divide 1440.
    #[arg(long)]
    step: Option<u32>,

    /// Azimuth labels around the plot.
    #[arg(long, value_enum)]
    compass: Option<CompassArg>,

    /// SVG output path.
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Also write computed positions as JSON.
    #[arg(long)]
    json: Option<PathBuf>,

    /// Log level (RUST_LOG takes precedence).
    #[arg(long, default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum VariantArg {
    /// Hide everything below the horizon.
    AboveHorizon,
    /// Keep the whole day, below-horizon samples drawn past the horizon ring.
    FullDay,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CompassArg {
    Cardinal,
    EightPoint,
}

fn parse_time(s: &str) -> std::result::Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s)
}

fn build_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };

    if cli.lat.is_some() || cli.lon.is_some() || cli.elevation.is_some() {
        let current = config.observer();
        let observer = Observer::new(
            cli.lat.unwrap_or(current.latitude()),
            cli.lon.unwrap_or(current.longitude()),
            cli.elevation.unwrap_or(current.elevation_m()),
        )?;
        config = config.with_observer(observer);
    }
    if let Some(time) = cli.time {
        config = config.with_time(time);
    }
    if let Some(variant) = cli.variant {
        config = config.with_variant(match variant {
            VariantArg::AboveHorizon => Variant::AboveHorizon,
            VariantArg::FullDay => Variant::FullDay,
        });
    }
    if let Some(step) = cli.step {
        config = config.with_step_minutes(step);
    }
    if let Some(compass) = cli.compass {
        config = config.with_compass(match compass {
            CompassArg::Cardinal => Compass::Cardinal,
            CompassArg::EightPoint => Compass::EightPoint,
        });
    }
    if let Some(output) = &cli.output {
        config = config.with_output(output);
    }
    if let Some(json) = &cli.json {
        config = config.with_json(json);
    }
    config.validate()?;
    Ok(config)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.log_level);

    let config = build_config(&cli)?;
    let chart = plot_sky_map(&config).context("failed to plot sky map")?;

    for plotted in chart.plotted_bodies() {
        info!(
            "{:<8} alt {:6.2}°  az {:6.2}°",
            plotted.body.name(),
            plotted.position.altitude,
            plotted.position.azimuth
        );
    }
    println!("Sky map written to {}", config.output().display());
    Ok(())
}
