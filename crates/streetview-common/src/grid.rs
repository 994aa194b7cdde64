//! One-dimensional sampling grids between two corners.
//!
//! A region is walked along whichever axis (latitude or longitude) spans the
//! larger coordinate delta. The other coordinate stays fixed at the start
//! corner's value.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Coordinate, GridError, GridResult};

/// A point produced by the grid generator.
pub type GridPoint = Coordinate;

/// Axis along which sampling points are distributed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MajorAxis {
    Latitude,
    Longitude,
}

impl fmt::Display for MajorAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MajorAxis::Latitude => write!(f, "latitude"),
            MajorAxis::Longitude => write!(f, "longitude"),
        }
    }
}

/// Step vector derived for one region.
///
/// Only the major-axis step is non-zero (both are zero when the two corners
/// coincide). Signs point from the start corner toward the end corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    pub major_axis: MajorAxis,
    pub lat_step: f64,
    pub lon_step: f64,
}

impl GridSpec {
    /// Position of raw index `index` when walking from `origin`.
    pub fn point_at(&self, origin: Coordinate, index: usize) -> GridPoint {
        let i = index as f64;
        Coordinate {
            lat: origin.lat + i * self.lat_step,
            lon: origin.lon + i * self.lon_step,
        }
    }
}

/// Pick the major axis and per-point step between two corners.
///
/// Ties between the latitude and longitude deltas resolve to latitude.
pub fn calculate_grid_steps(
    top_left: Coordinate,
    bottom_right: Coordinate,
    num_points_major: usize,
) -> GridResult<GridSpec> {
    if num_points_major < 2 {
        return Err(GridError::TooFewPoints(num_points_major));
    }
    for corner in [top_left, bottom_right] {
        if !corner.lat.is_finite() || !corner.lon.is_finite() {
            return Err(GridError::InvalidCoordinate(corner.to_string()));
        }
    }

    let lat_diff = (top_left.lat - bottom_right.lat).abs();
    let lon_diff = (top_left.lon - bottom_right.lon).abs();
    let intervals = (num_points_major - 1) as f64;

    let (major_axis, mut lat_step, mut lon_step) = if lat_diff >= lon_diff {
        (MajorAxis::Latitude, lat_diff / intervals, 0.0)
    } else {
        (MajorAxis::Longitude, 0.0, lon_diff / intervals)
    };

    if top_left.lat > bottom_right.lat {
        lat_step = -lat_step;
    }
    if top_left.lon > bottom_right.lon {
        lon_step = -lon_step;
    }

    Ok(GridSpec {
        major_axis,
        lat_step,
        lon_step,
    })
}

/// Walk `num_points_major * sample_interval` raw steps from `top_left` and
/// keep every `sample_interval`-th point.
///
/// A larger interval spreads the same number of points over a longer span.
/// Returns an empty sequence when either count is zero.
pub fn generate_grid(
    top_left: Coordinate,
    num_points_major: usize,
    spec: &GridSpec,
    sample_interval: usize,
) -> Vec<GridPoint> {
    if sample_interval == 0 {
        return Vec::new();
    }

    let total_steps = num_points_major.saturating_mul(sample_interval);
    (0..total_steps)
        .step_by(sample_interval)
        .take(num_points_major)
        .map(|i| spec.point_at(top_left, i))
        .collect()
}
