//! # Navigation Parameters

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the navigation decision engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavParams {
    /// Forward mode stops when fewer navigable points than this are visible.
    pub stop_forward: usize,

    /// Stop mode resumes driving once at least this many navigable points are visible.
    pub go_forward: usize,

    /// Throttle is cut above this speed.
    ///
    /// Units: meters/second
    pub max_vel_ms: f64,

    /// Nominal throttle demand.
    pub nominal_throttle: f64,

    /// Nominal brake demand.
    pub nominal_brake: f64,

    /// At or below this speed while driving forward the rover may be stalled.
    ///
    /// Units: meters/second
    pub stall_vel_ms: f64,

    /// Time since the last stall before a new stall can be declared.
    ///
    /// Units: seconds
    pub stall_time_s: f64,

    /// Duration of the recovery turn once stuck.
    ///
    /// Units: seconds
    pub stuck_recover_s: f64,

    /// Below this speed (inclusive) the rover is considered stopped.
    ///
    /// Units: meters/second
    pub stopped_vel_ms: f64,

    /// No wall hugging offset is applied until the mission has run this long.
    ///
    /// Units: seconds
    pub wall_hug_grace_s: f64,

    /// Wall hugging offset per radian of navigable angle standard deviation.
    pub wall_hug_gain: f64,

    /// Steering bias applied when leaving Stop mode.
    ///
    /// Units: degrees
    pub stop_exit_bias_deg: f64,

    /// A visible sample closer than this counts as within pickup range. Zero disables the check
    /// so only the near sample flag is used.
    ///
    /// Units: rectified pixels
    pub pickup_range_px: f64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for NavParams {
    fn default() -> Self {
        Self {
            stop_forward: 50,
            go_forward: 500,
            max_vel_ms: 2.0,
            nominal_throttle: 0.2,
            nominal_brake: 10.0,
            stall_vel_ms: 0.1,
            stall_time_s: 4.0,
            stuck_recover_s: 1.0,
            stopped_vel_ms: 0.2,
            wall_hug_grace_s: 10.0,
            wall_hug_gain: 0.8,
            stop_exit_bias_deg: 12.0,
            pickup_range_px: 0.0,
        }
    }
}
