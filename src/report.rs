use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use chrono::Utc;
use log::info;
use serde::Serialize;

use crate::chart::SkyChart;
use crate::error::Result;
use crate::sampler::Variant;

// ---------- Output model ----------
#[derive(Debug, Serialize)]
pub struct SkyReport {
    time_local: String,  // as given, with offset
    time_utc: String,    // RFC 3339
    latitude: f64,
    longitude: f64,
    elevation_m: f64,
    variant: Variant,
    bodies: Vec<BodyEntry>,
    tracks: Vec<TrackEntry>,
}

#[derive(Debug, Serialize)]
struct BodyEntry {
    body: String,
    alt_deg: f64,
    az_deg: f64,
    plotted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    distance_km: Option<f64>,
}

#[derive(Debug, Serialize)]
struct TrackEntry {
    label: String,
    date: String,
    color: String,
    samples: Vec<SampleEntry>,
}

#[derive(Debug, Serialize)]
struct SampleEntry {
    time_utc: String, // HH:MM
    alt_deg: f64,
    az_deg: f64,
}

impl SkyReport {
    pub fn from_chart(chart: &SkyChart) -> Self {
        let bodies = chart
            .bodies
            .iter()
            .map(|b| BodyEntry {
                body: b.body.name().to_string(),
                alt_deg: b.position.altitude,
                az_deg: b.position.azimuth,
                plotted: chart.variant.keeps(&b.position),
                distance_km: b.position.distance_km,
            })
            .collect();

        let tracks = chart
            .tracks
            .iter()
            .map(|t| TrackEntry {
                label: t.label.clone(),
                date: t.date.format("%Y-%m-%d").to_string(),
                color: t.color.clone(),
                samples: t
                    .samples
                    .iter()
                    .map(|s| SampleEntry {
                        time_utc: format!("{:02}:{:02}", s.minute_of_day / 60, s.minute_of_day % 60),
                        alt_deg: s.position.altitude,
                        az_deg: s.position.azimuth,
                    })
                    .collect(),
            })
            .collect();

        Self {
            time_local: chart.timestamp.format("%Y-%m-%d %H:%M:%S%:z").to_string(),
            time_utc: chart.timestamp.with_timezone(&Utc).to_rfc3339(),
            latitude: chart.observer.latitude(),
            longitude: chart.observer.longitude(),
            elevation_m: chart.observer.elevation_m(),
            variant: chart.variant,
            bodies,
            tracks,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let writer = BufWriter::new(File::create(path.as_ref())?);
        serde_json::to_writer_pretty(writer, self)?;
        info!("[report] positions written to {}", path.as_ref().display());
        Ok(())
    }
}
