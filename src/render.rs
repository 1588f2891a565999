//! Polar sky map as an SVG document.
//!
//! Radius is `90 - altitude` (zenith at the center), azimuth runs clockwise
//! from North at the top.

use std::path::Path as FsPath;

use log::{debug, info};
use serde::{Deserialize, Serialize};
use svg::node::element::path::Data;
use svg::node::element::{Circle, Group, Line, Path, Rectangle, Text};
use svg::Document;

use crate::chart::SkyChart;
use crate::error::{Error, Result};
use crate::sampler::Variant;

const WIDTH: f64 = 820.0;
const HEIGHT: f64 = 680.0;
const CENTER_X: f64 = 330.0;
const CENTER_Y: f64 = 370.0;
const PLOT_RADIUS: f64 = 250.0;
const RING_STEP_DEG: f64 = 30.0;
const LEGEND_X: f64 = 630.0;
const LEGEND_Y: f64 = 120.0;
const LEGEND_ROW: f64 = 22.0;

/// Azimuth tick labels around the edge of the plot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Compass {
    /// N, E, S, W
    Cardinal,
    /// N, NE, E, SE, S, SW, W, NW
    EightPoint,
}

impl Compass {
    pub fn ticks(&self) -> Vec<(f64, &'static str)> {
        match self {
            Compass::Cardinal => vec![(0.0, "N"), (90.0, "E"), (180.0, "S"), (270.0, "W")],
            Compass::EightPoint => ["N", "NE", "E", "SE", "S", "SW", "W", "NW"]
                .into_iter()
                .enumerate()
                .map(|(i, label)| (i as f64 * 45.0, label))
                .collect(),
        }
    }

    pub fn default_for(variant: Variant) -> Self {
        match variant {
            Variant::AboveHorizon => Compass::Cardinal,
            Variant::FullDay => Compass::EightPoint,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartStyle {
    pub compass: Compass,
    pub dashed_tracks: bool,
}

impl ChartStyle {
    pub fn for_variant(variant: Variant) -> Self {
        Self {
            compass: Compass::default_for(variant),
            dashed_tracks: variant == Variant::FullDay,
        }
    }
}

/// Accepts `#rgb`, `#rrggbb` or an alphabetic SVG color name.
pub fn check_color(color: &str) -> Result<()> {
    let ok = match color.strip_prefix('#') {
        Some(hex) => (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()),
        None => !color.is_empty() && color.chars().all(|c| c.is_ascii_alphabetic()),
    };
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidColor(color.to_string()))
    }
}

/// Maps (azimuth, chart radius) to canvas pixels.
struct Projection {
    radial_limit: f64,
}

impl Projection {
    fn point(&self, azimuth: f64, radius: f64) -> (f64, f64) {
        let rr = radius / self.radial_limit * PLOT_RADIUS;
        let theta = azimuth.to_radians();
        (CENTER_X + rr * theta.sin(), CENTER_Y - rr * theta.cos())
    }

    fn ring(&self, radius: f64) -> f64 {
        radius / self.radial_limit * PLOT_RADIUS
    }
}

fn round(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

pub fn render(chart: &SkyChart, style: &ChartStyle) -> Document {
    let proj = Projection {
        radial_limit: chart.radial_limit(),
    };
    let (title, subtitle) = chart.title();

    let mut document = Document::new()
        .set("viewBox", (0, 0, WIDTH, HEIGHT))
        .set("width", WIDTH)
        .set("height", HEIGHT)
        .set("font-family", "sans-serif")
        .add(
            Rectangle::new()
                .set("width", WIDTH)
                .set("height", HEIGHT)
                .set("fill", "white"),
        )
        .add(
            Text::new(title)
                .set("x", CENTER_X)
                .set("y", 36)
                .set("text-anchor", "middle")
                .set("font-size", 18),
        )
        .add(
            Text::new(subtitle)
                .set("x", CENTER_X)
                .set("y", 60)
                .set("text-anchor", "middle")
                .set("font-size", 14),
        );

    document = document.add(grid(&proj, style));

    let mut legend: Vec<LegendEntry> = Vec::new();

    let mut tracks = Group::new().set("id", "tracks");
    for track in chart.plotted_tracks() {
        let mut points = track.samples.iter().map(|s| {
            let (x, y) = proj.point(s.position.azimuth, s.position.radius());
            (round(x) as f32, round(y) as f32)
        });
        let Some(first) = points.next() else {
            continue;
        };
        let data = points.fold(Data::new().move_to(first), |d, p| d.line_to(p));
        let mut path = Path::new()
            .set("d", data)
            .set("fill", "none")
            .set("stroke", track.color.as_str())
            .set("stroke-width", 2);
        if style.dashed_tracks {
            path = path.set("stroke-dasharray", "6 4");
        }
        tracks = tracks.add(path);
        legend.push(LegendEntry::Track {
            label: track.label.clone(),
            color: track.color.clone(),
            dashed: style.dashed_tracks,
        });
        debug!("[render] track {} with {} samples", track.label, track.samples.len());
    }
    document = document.add(tracks);

    let mut markers = Group::new().set("id", "bodies");
    for plotted in chart.plotted_bodies() {
        let (x, y) = proj.point(plotted.position.azimuth, plotted.position.radius());
        markers = markers.add(
            Circle::new()
                .set("cx", round(x))
                .set("cy", round(y))
                .set("r", plotted.body.marker_radius())
                .set("fill", plotted.body.color())
                .set("stroke", "black")
                .set("stroke-width", 0.5),
        );
        legend.push(LegendEntry::Body {
            label: plotted.body.name().to_string(),
            color: plotted.body.color().to_string(),
            radius: plotted.body.marker_radius(),
        });
    }
    document = document.add(markers);

    document.add(render_legend(&legend))
}

fn grid(proj: &Projection, style: &ChartStyle) -> Group {
    let mut group = Group::new().set("id", "grid");

    let mut radius = RING_STEP_DEG;
    while radius <= proj.radial_limit + 1e-9 {
        let horizon = (radius - 90.0).abs() < 1e-9;
        group = group
            .add(
                Circle::new()
                    .set("cx", CENTER_X)
                    .set("cy", CENTER_Y)
                    .set("r", proj.ring(radius))
                    .set("fill", "none")
                    .set("stroke", if horizon { "black" } else { "#bbbbbb" })
                    .set("stroke-width", if horizon { 1.5 } else { 0.8 }),
            )
            .add(
                Text::new(format!("{}°", 90.0 - radius))
                    .set("x", CENTER_X + 3.0)
                    .set("y", round(CENTER_Y - proj.ring(radius) + 12.0))
                    .set("font-size", 10)
                    .set("fill", "#777777"),
            );
        radius += RING_STEP_DEG;
    }

    for (azimuth, label) in style.compass.ticks() {
        let (x, y) = proj.point(azimuth, proj.radial_limit);
        let (lx, ly) = proj.point(azimuth, proj.radial_limit * 1.08);
        group = group
            .add(
                Line::new()
                    .set("x1", CENTER_X)
                    .set("y1", CENTER_Y)
                    .set("x2", round(x))
                    .set("y2", round(y))
                    .set("stroke", "#dddddd")
                    .set("stroke-width", 0.8),
            )
            .add(
                Text::new(label)
                    .set("x", round(lx))
                    .set("y", round(ly + 5.0))
                    .set("text-anchor", "middle")
                    .set("font-size", 14),
            );
    }
    group
}

enum LegendEntry {
    Track {
        label: String,
        color: String,
        dashed: bool,
    },
    Body {
        label: String,
        color: String,
        radius: f64,
    },
}

fn render_legend(entries: &[LegendEntry]) -> Group {
    let mut group = Group::new().set("id", "legend");
    for (i, entry) in entries.iter().enumerate() {
        let y = LEGEND_Y + i as f64 * LEGEND_ROW;
        let label = match entry {
            LegendEntry::Track {
                label,
                color,
                dashed,
            } => {
                let mut line = Line::new()
                    .set("x1", LEGEND_X)
                    .set("y1", y)
                    .set("x2", LEGEND_X + 24.0)
                    .set("y2", y)
                    .set("stroke", color.as_str())
                    .set("stroke-width", 2);
                if *dashed {
                    line = line.set("stroke-dasharray", "6 4");
                }
                group = group.add(line);
                label
            }
            LegendEntry::Body {
                label,
                color,
                radius,
            } => {
                group = group.add(
                    Circle::new()
                        .set("cx", LEGEND_X + 12.0)
                        .set("cy", y)
                        .set("r", radius.min(8.0))
                        .set("fill", color.as_str())
                        .set("stroke", "black")
                        .set("stroke-width", 0.5),
                );
                label
            }
        };
        group = group.add(
            Text::new(label.as_str())
                .set("x", LEGEND_X + 32.0)
                .set("y", y + 4.0)
                .set("font-size", 12),
        );
    }
    group
}

/// Renders `chart` and writes it to `path`.
pub fn save<P: AsRef<FsPath>>(chart: &SkyChart, style: &ChartStyle, path: P) -> Result<()> {
    let document = render(chart, style);
    svg::save(path.as_ref(), &document)?;
    info!("[render] sky map written to {}", path.as_ref().display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::CelestialBody;
    use crate::chart::PlottedBody;
    use crate::coords::HorizontalPosition;
    use crate::observer::Observer;
    use crate::sampler::{ReferenceTrack, TrackSample};
    use chrono::{DateTime, NaiveDate};

    fn pos(altitude: f64, azimuth: f64) -> HorizontalPosition {
        HorizontalPosition {
            altitude,
            azimuth,
            distance_km: None,
        }
    }

    fn chart(variant: Variant) -> SkyChart {
        SkyChart {
            observer: Observer::new(45.0703, 7.6869, 0.0).unwrap(),
            timestamp: DateTime::parse_from_rfc3339("2024-06-21T12:00:00Z").unwrap(),
            variant,
            bodies: vec![
                PlottedBody {
                    body: CelestialBody::Sun,
                    position: pos(68.0, 190.0),
                },
                PlottedBody {
                    body: CelestialBody::Moon,
                    position: pos(-20.0, 10.0),
                },
            ],
            tracks: vec![
                ReferenceTrack {
                    label: "Summer Solstice".to_string(),
                    date: NaiveDate::from_ymd_opt(2024, 6, 21).unwrap(),
                    color: "red".to_string(),
                    samples: vec![
                        TrackSample {
                            minute_of_day: 600,
                            position: pos(50.0, 120.0),
                        },
                        TrackSample {
                            minute_of_day: 660,
                            position: pos(62.0, 150.0),
                        },
                    ],
                },
                ReferenceTrack {
                    label: "Winter Solstice".to_string(),
                    date: NaiveDate::from_ymd_opt(2024, 12, 21).unwrap(),
                    color: "blue".to_string(),
                    samples: vec![],
                },
            ],
        }
    }

    /// Text node contents, whether or not the writer puts them on their own line.
    fn text_content(svg: &str) -> Vec<String> {
        svg.split("<text")
            .skip(1)
            .filter_map(|chunk| {
                let start = chunk.find('>')? + 1;
                let end = chunk.find("</text>")?;
                Some(chunk[start..end].trim().to_string())
            })
            .collect()
    }

    #[test]
    fn projection_puts_north_up_and_east_right() {
        let proj = Projection { radial_limit: 90.0 };
        let (x, y) = proj.point(0.0, 90.0);
        assert!((x - CENTER_X).abs() < 1e-9 && (y - (CENTER_Y - PLOT_RADIUS)).abs() < 1e-9);
        let (x, y) = proj.point(90.0, 90.0);
        assert!((x - (CENTER_X + PLOT_RADIUS)).abs() < 1e-9 && (y - CENTER_Y).abs() < 1e-9);
        assert_eq!(proj.point(123.0, 0.0), (CENTER_X, CENTER_Y));
    }

    #[test]
    fn above_horizon_chart_skips_hidden_bodies_and_empty_tracks() {
        let c = chart(Variant::AboveHorizon);
        let svg = render(&c, &ChartStyle::for_variant(c.variant)).to_string();
        let labels = text_content(&svg);
        assert!(labels.contains(&"Sky Map (2024-06-21 12:00:00)".to_string()));
        assert!(labels.contains(&"Lat: 45.0703, Lon: 7.6869".to_string()));
        assert!(labels.contains(&"Summer Solstice".to_string()));
        assert!(!labels.contains(&"Winter Solstice".to_string()));
        assert!(labels.contains(&"Sun".to_string()));
        assert!(!labels.contains(&"Moon".to_string()));
        assert!(!labels.contains(&"NE".to_string()));
        assert!(!svg.contains("stroke-dasharray"));
    }

    #[test]
    fn full_day_chart_keeps_hidden_bodies_with_dashed_tracks() {
        let c = chart(Variant::FullDay);
        let svg = render(&c, &ChartStyle::for_variant(c.variant)).to_string();
        let labels = text_content(&svg);
        assert!(labels.contains(&"Moon".to_string()));
        assert!(labels.contains(&"NW".to_string()));
        assert!(labels.contains(&"-90°".to_string()));
        assert!(svg.contains("stroke-dasharray"));
    }

    #[test]
    fn compass_presets() {
        assert_eq!(Compass::Cardinal.ticks().len(), 4);
        let eight = Compass::EightPoint.ticks();
        assert_eq!(eight.len(), 8);
        assert_eq!(eight[3], (135.0, "SE"));
    }

    #[test]
    fn color_validation() {
        assert!(check_color("red").is_ok());
        assert!(check_color("#ff8800").is_ok());
        assert!(check_color("#f80").is_ok());
        assert!(matches!(check_color("#ff88"), Err(Error::InvalidColor(_))));
        assert!(check_color("red; stroke").is_err());
        assert!(check_color("").is_err());
    }

    #[test]
    fn save_writes_svg_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("map.svg");
        let c = chart(Variant::AboveHorizon);
        save(&c, &ChartStyle::for_variant(c.variant), &path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<svg"));
        assert!(content.contains("Summer Solstice"));
    }

    #[test]
    fn save_to_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("map.svg");
        let c = chart(Variant::AboveHorizon);
        assert!(matches!(
            save(&c, &ChartStyle::for_variant(c.variant), &path),
            Err(Error::Io(_))
        ));
    }
}
