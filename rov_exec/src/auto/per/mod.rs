//! # Perception
//!
//! Turns a single camera frame into rover-local observations of navigable terrain, obstacles
//! and rock samples.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

pub mod classify;
mod params;
pub mod rectify;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use nalgebra::Point2;
use image::RgbImage;
use serde::Serialize;

use crate::auto::coords::PolarObservation;
use util::{archive::ArchiveError, params::LoadError};

pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Range gated rover-local points for each terrain class.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LocalObservation {
    pub navigable: Vec<Point2<f64>>,
    pub obstacle: Vec<Point2<f64>>,
    pub sample: Vec<Point2<f64>>,
}

/// Everything perception extracts from one frame.
#[derive(Debug, Clone)]
pub struct Perception {
    pub local: LocalObservation,

    pub polar: PolarObservation,

    /// Display overlay: red obstacle, green sample, blue navigable.
    pub vision_image: RgbImage,
}

/// Status report for perception processing.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct PerStatusReport {
    /// Set pixels in each rectified mask, before range gating.
    pub num_nav_px: usize,
    pub num_obstacle_px: usize,
    pub num_sample_px: usize,

    /// Points surviving the range gate.
    pub num_nav_pts: usize,
    pub num_obstacle_pts: usize,
    pub num_sample_pts: usize,

    /// True if the rectifier had to be rebuilt for this frame's size.
    pub rectifier_rebuilt: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while processing a frame.
#[derive(Debug, thiserror::Error)]
pub enum PerError {
    #[error(
        "Frame of {width}x{height} px is smaller than the minimum {min_width}x{min_height} px"
    )]
    FrameTooSmall {
        width: u32,
        height: u32,
        min_width: u32,
        min_height: u32,
    },

    #[error("The rectification quadrilaterals do not define a valid perspective transform")]
    DegenerateQuad,

    #[error("Expected a {expected:?} px input but found {found:?} px")]
    DimensionMismatch {
        expected: (u32, u32),
        found: (u32, u32),
    },
}

/// Errors which can occur while initialising perception.
#[derive(Debug, thiserror::Error)]
pub enum PerInitError {
    #[error("Cannot load perception parameters: {0}")]
    ParamLoadError(LoadError),

    #[error("Cannot create the perception archive: {0}")]
    ArchiveError(ArchiveError),
}
