//! # Rover Telemetry
//!
//! Per-tick state of the rover as reported by the simulation driver.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::EqptMsgError;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Pose of the rover in the world frame.
///
/// Immutable within a tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RoverPose {
    /// Position along the world X axis.
    ///
    /// Units: meters (equal to one world map cell)
    pub x_m: f64,

    /// Position along the world Y axis.
    ///
    /// Units: meters (equal to one world map cell)
    pub y_m: f64,

    /// Heading, measured anticlockwise from the world X axis.
    ///
    /// Units: degrees, [0, 360)
    pub yaw_deg: f64,

    /// Units: degrees, [0, 360)
    pub pitch_deg: f64,

    /// Units: degrees, [0, 360)
    pub roll_deg: f64,
}

/// Telemetry received from the rover at the start of each tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RoverTelem {
    /// Current pose of the rover
    pub pose: RoverPose,

    /// Forward speed of the rover.
    ///
    /// Units: meters/second
    pub vel_ms: f64,

    /// Total elapsed mission time.
    ///
    /// Units: seconds
    pub total_time_s: f64,

    /// True if the rover is within pickup range of a sample.
    pub near_sample: bool,

    /// True while the pickup arm is collecting a sample. Set and cleared by the pickup
    /// subsystem.
    pub picking_up: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RoverTelem {
    /// Parse telemetry from a JSON string.
    pub fn from_json(json_str: &str) -> Result<Self, EqptMsgError> {
        serde_json::from_str(json_str).map_err(EqptMsgError::DeserializeError)
    }
}
