use chrono::{DateTime, Datelike, FixedOffset, Utc};
use log::info;
use serde::Serialize;

use crate::body::CelestialBody;
use crate::coords::HorizontalPosition;
use crate::ephemeris::Ephemeris;
use crate::error::Result;
use crate::observer::Observer;
use crate::resolver::Resolver;
use crate::sampler::{self, ReferenceDate, ReferenceTrack, Variant};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlottedBody {
    pub body: CelestialBody,
    #[serde(flatten)]
    pub position: HorizontalPosition,
}

/// Everything the renderer needs: the observation and its computed data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkyChart {
    pub observer: Observer,
    pub timestamp: DateTime<FixedOffset>,
    pub variant: Variant,
    pub bodies: Vec<PlottedBody>,
    pub tracks: Vec<ReferenceTrack>,
}

impl SkyChart {
    /// Outer radius of the polar plot: the horizon, or the nadir when
    /// below-horizon samples are kept.
    pub fn radial_limit(&self) -> f64 {
        match self.variant {
            Variant::AboveHorizon => 90.0,
            Variant::FullDay => 180.0,
        }
    }

    pub fn plotted_bodies(&self) -> impl Iterator<Item = &PlottedBody> + '_ {
        self.bodies
            .iter()
            .filter(move |b| self.variant.keeps(&b.position))
    }

    pub fn plotted_tracks(&self) -> impl Iterator<Item = &ReferenceTrack> + '_ {
        self.tracks.iter().filter(|t| !t.is_empty())
    }

    pub fn title(&self) -> (String, String) {
        (
            format!("Sky Map ({})", self.timestamp.format("%Y-%m-%d %H:%M:%S")),
            format!(
                "Lat: {}, Lon: {}",
                self.observer.latitude(),
                self.observer.longitude()
            ),
        )
    }
}

/// What to compute for one chart.
#[derive(Debug, Clone)]
pub struct ChartRequest<'a> {
    pub observer: Observer,
    pub timestamp: DateTime<FixedOffset>,
    pub variant: Variant,
    pub step_minutes: u32,
    pub bodies: &'a [CelestialBody],
    pub reference_dates: &'a [ReferenceDate],
}

pub fn compute_chart<E: Ephemeris>(
    resolver: &Resolver<E>,
    request: &ChartRequest<'_>,
) -> Result<SkyChart> {
    let t = request.timestamp.with_timezone(&Utc);
    info!(
        "[compute_chart] {} bodies at {t} for lat={}, lon={}",
        request.bodies.len(),
        request.observer.latitude(),
        request.observer.longitude()
    );

    let bodies = resolver
        .resolve_all(request.bodies, &request.observer, t)?
        .into_iter()
        .map(|(body, position)| PlottedBody { body, position })
        .collect();

    let tracks = sampler::reference_tracks(
        resolver,
        &request.observer,
        request.timestamp.year(),
        request.reference_dates,
        request.step_minutes,
        request.variant,
    )?;

    Ok(SkyChart {
        observer: request.observer,
        timestamp: request.timestamp,
        variant: request.variant,
        bodies,
        tracks,
    })
}
