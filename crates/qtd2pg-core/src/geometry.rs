//! Point and line geometry built from extracted GPS samples.
//!
//! All geometries are WGS84 (SRID 4326) WKT. Coordinates are written with
//! Rust's shortest round-trip float formatting, so parsing a coordinate back
//! out of the WKT yields the same `f64` bit for bit.

use geo::{GeodesicLength, LineString};
use thiserror::Error;

use crate::types::{Altitude, CoordinateSample, GeometryMode};

/// Spatial reference of every stored geometry (WGS84).
pub const SRID: i32 = 4326;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum GeometryError {
    #[error("a line needs at least 2 samples, found {found}")]
    InsufficientSamples { found: usize },
}

/// One row of the point table.
#[derive(Debug, Clone, PartialEq)]
pub struct PointRow {
    pub video: String,
    pub longitude: f64,
    pub latitude: f64,
    pub altitude: Altitude,
    pub wkt: String,
}

/// The single line-table row for one video.
#[derive(Debug, Clone, PartialEq)]
pub struct LineRow {
    pub video: String,
    pub wkt: String,
    /// Length over the WGS84 spheroid, in kilometers.
    pub length_km: f64,
}

/// Geometry for one video, shaped by the geometry mode.
#[derive(Debug, Clone, PartialEq)]
pub enum VideoGeometry {
    Points(Vec<PointRow>),
    Line(LineRow),
    Both { points: Vec<PointRow>, line: LineRow },
}

impl VideoGeometry {
    #[must_use]
    pub fn mode(&self) -> GeometryMode {
        match self {
            VideoGeometry::Points(_) => GeometryMode::Point,
            VideoGeometry::Line(_) => GeometryMode::Line,
            VideoGeometry::Both { .. } => GeometryMode::Both,
        }
    }
}

#[must_use]
pub fn point_wkt(sample: &CoordinateSample) -> String {
    format!("POINT({} {})", sample.longitude, sample.latitude)
}

#[must_use]
pub fn line_wkt(samples: &[CoordinateSample]) -> String {
    let pairs: Vec<String> = samples
        .iter()
        .map(|s| format!("{} {}", s.longitude, s.latitude))
        .collect();
    format!("LINESTRING({})", pairs.join(", "))
}

/// Length of the polyline through `samples` over the WGS84 spheroid
/// (a = 6378137 m, 1/f = 298.257223563), in kilometers.
#[must_use]
pub fn spheroid_length_km(samples: &[CoordinateSample]) -> f64 {
    let line: LineString<f64> = samples
        .iter()
        .map(|s| (s.longitude, s.latitude))
        .collect::<Vec<_>>()
        .into();
    line.geodesic_length() / 1000.0
}

#[must_use]
pub fn build_points(identifier: &str, samples: &[CoordinateSample]) -> Vec<PointRow> {
    samples
        .iter()
        .map(|s| PointRow {
            video: identifier.to_string(),
            longitude: s.longitude,
            latitude: s.latitude,
            altitude: s.altitude,
            wkt: point_wkt(s),
        })
        .collect()
}

/// Build the capture-ordered line for one video.
///
/// # Errors
///
/// Returns [`GeometryError::InsufficientSamples`] for fewer than two samples.
pub fn build_line(identifier: &str, samples: &[CoordinateSample]) -> Result<LineRow, GeometryError> {
    if samples.len() < 2 {
        return Err(GeometryError::InsufficientSamples {
            found: samples.len(),
        });
    }

    Ok(LineRow {
        video: identifier.to_string(),
        wkt: line_wkt(samples),
        length_km: spheroid_length_km(samples),
    })
}

/// Build whatever `mode` asks for.
///
/// # Errors
///
/// Returns [`GeometryError::InsufficientSamples`] when a line is required and
/// fewer than two samples are available.
pub fn build_geometry(
    mode: GeometryMode,
    identifier: &str,
    samples: &[CoordinateSample],
) -> Result<VideoGeometry, GeometryError> {
    match mode {
        GeometryMode::Point => Ok(VideoGeometry::Points(build_points(identifier, samples))),
        GeometryMode::Line => Ok(VideoGeometry::Line(build_line(identifier, samples)?)),
        GeometryMode::Both => {
            // Validate the line first so a short track produces no rows at all.
            let line = build_line(identifier, samples)?;
            Ok(VideoGeometry::Both {
                points: build_points(identifier, samples),
                line,
            })
        }
    }
}

#[cfg(test)]
#[path = "geometry_test.rs"]
mod tests;
