//! # Autonomy Module
//!
//! This module provides the rover's autonomy pipeline. Each tick a camera frame is turned into
//! local observations by [`per`], accumulated into the [`map::WorldMap`], and fed with the
//! rover telemetry into the [`nav`] decision engine to produce a drive command.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Coordinate transforms between the rectified grid, rover frame and world map
pub mod coords;

/// Map module - provides the persistent world map
pub mod map;

/// Navigation module - the drive decision engine
pub mod nav;

/// Perception module - converts camera frames into terrain observations
pub mod per;

/// Rover state and the tick pipeline
pub mod state;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use state::{decide, perceive, tick, RoverState};
