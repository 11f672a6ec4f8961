//! # Coordinate Transforms
//!
//! Conversions between the rectified grid, the rover-local frame (x forward, y left, origin at
//! the rover), rover-local polar coordinates and world map cells.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use comms_if::eqpt::telem::RoverPose;
use nalgebra::{Point2, Rotation2};
use ndarray::Array2;
use ordered_float::OrderedFloat;
use serde::Serialize;

// -----------------------------------------------------------------------------------------------
// STRUCTS
// -----------------------------------------------------------------------------------------------

/// Parallel sequences of rover-local polar coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PolarSet {
    /// Distance from the rover. Units: rectified pixels
    pub dists: Vec<f64>,

    /// Angle from the rover's forward axis, positive left. Units: radians
    pub angles: Vec<f64>,
}

/// Polar view of the current tick's navigable terrain and samples. Recomputed every tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PolarObservation {
    pub nav: PolarSet,
    pub samples: PolarSet,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl PolarSet {
    pub fn len(&self) -> usize {
        self.angles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.angles.is_empty()
    }

    /// The `(distance, angle)` of the closest point, or `None` if the set is empty.
    pub fn nearest(&self) -> Option<(f64, f64)> {
        self.dists
            .iter()
            .zip(self.angles.iter())
            .min_by_key(|&(&d, _)| OrderedFloat(d))
            .map(|(&d, &a)| (d, a))
    }
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Rover-local coordinates of every set pixel in a rectified mask.
///
/// The rover sits at the bottom centre of the grid: `x = H - row`, `y = W/2 - col`.
pub fn rover_coords(mask: &Array2<bool>) -> Vec<Point2<f64>> {
    let (height, width) = mask.dim();
    let half_width = width as f64 / 2.0;

    mask.indexed_iter()
        .filter(|&(_, &set)| set)
        .map(|((row, col), _)| Point2::new(height as f64 - row as f64, half_width - col as f64))
        .collect()
}

/// Discard points at or beyond `radius` from the rover.
pub fn impose_range(points: Vec<Point2<f64>>, radius: f64) -> Vec<Point2<f64>> {
    points
        .into_iter()
        .filter(|p| p.coords.norm() < radius)
        .collect()
}

/// Convert rover-local points to polar coordinates.
pub fn to_polar(points: &[Point2<f64>]) -> PolarSet {
    let (dists, angles) = points
        .iter()
        .map(|p| (p.coords.norm(), p.y.atan2(p.x)))
        .unzip();

    PolarSet { dists, angles }
}

/// Rotate a rover-local point by the rover's yaw.
pub fn rotate(point: &Point2<f64>, yaw_deg: f64) -> Point2<f64> {
    Rotation2::new(yaw_deg.to_radians()) * point
}

/// Scale a rotated point into world units and offset it by the rover position.
pub fn translate(point: &Point2<f64>, pose: &RoverPose, scale: f64) -> Point2<f64> {
    Point2::new(point.x / scale + pose.x_m, point.y / scale + pose.y_m)
}

/// Map rover-local points into world map cells, clipped to the map bounds.
///
/// `scale` is the number of rectified pixels per world cell.
pub fn pix_to_world(
    points: &[Point2<f64>],
    pose: &RoverPose,
    map_size: usize,
    scale: f64,
) -> Vec<Point2<usize>> {
    let max_idx = map_size.saturating_sub(1) as f64;

    points
        .iter()
        .map(|p| {
            let world = translate(&rotate(p, pose.yaw_deg), pose, scale);
            Point2::new(
                clip_cell(world.x, max_idx),
                clip_cell(world.y, max_idx),
            )
        })
        .collect()
}

fn clip_cell(value: f64, max_idx: f64) -> usize {
    util::maths::clamp(value.round(), 0.0, max_idx) as usize
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
