//! Search grid planning.
//!
//! Covers a circular area with a square lattice of query points. Each point
//! is searched with a radius larger than the lattice spacing so adjacent
//! query circles overlap.

use crate::error::{Result, ScanError};
use leadgrid_core::{GeoPoint, METERS_PER_DEGREE};

/// Query radius as a multiple of the grid step.
pub const DEFAULT_QUERY_RADIUS_FACTOR: f64 = 1.5;

/// Planned query points and the radius to search around each.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchGrid {
    /// Query centers, north offsets outer, east offsets inner
    pub points: Vec<GeoPoint>,
    /// Per-query radius in meters
    pub query_radius_m: u32,
}

impl SearchGrid {
    /// Number of query points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the grid has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Plan a grid with the default query radius factor.
pub fn plan(center: GeoPoint, radius_m: f64, step_m: f64) -> Result<SearchGrid> {
    plan_with_factor(center, radius_m, step_m, DEFAULT_QUERY_RADIUS_FACTOR)
}

/// Plan a grid covering `radius_m` around `center` with spacing `step_m`.
///
/// When the whole area fits inside one query circle the grid collapses to
/// the center, searched with `radius_m` itself.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn plan_with_factor(
    center: GeoPoint,
    radius_m: f64,
    step_m: f64,
    factor: f64,
) -> Result<SearchGrid> {
    if !step_m.is_finite() || step_m <= 0.0 {
        return Err(ScanError::InvalidRequest(format!(
            "grid step must be a positive number of meters, got {step_m}"
        )));
    }
    if !radius_m.is_finite() || radius_m < 0.0 {
        return Err(ScanError::InvalidRequest(format!(
            "radius must be a non-negative number of meters, got {radius_m}"
        )));
    }
    if !factor.is_finite() || factor <= 0.0 {
        return Err(ScanError::InvalidRequest(format!(
            "query radius factor must be positive, got {factor}"
        )));
    }

    let query_radius_m = (step_m * factor) as u32;
    if radius_m <= f64::from(query_radius_m) {
        return Ok(SearchGrid {
            points: vec![center],
            query_radius_m: radius_m as u32,
        });
    }

    let steps = (radius_m / step_m).ceil() as i64;
    let lat_step = step_m / METERS_PER_DEGREE;
    let mut points = Vec::new();

    for i in -steps..=steps {
        for j in -steps..=steps {
            let north = i as f64 * step_m;
            let east = j as f64 * step_m;
            if north.hypot(east) > radius_m {
                continue;
            }
            let lat = center.latitude() + i as f64 * lat_step;
            let lng_step = step_m / (METERS_PER_DEGREE * lat.to_radians().cos());
            let lng = center.longitude() + j as f64 * lng_step;
            points.push(GeoPoint::normalized(lat, lng));
        }
    }

    Ok(SearchGrid {
        points,
        query_radius_m,
    })
}
