//! # Rover Executable Parameters
//!
//! This module provide parameters for the rover executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Serialize, Deserialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RovExecParams {

    /// Perception parameter file, relative to the params directory
    pub per_params: String,

    /// World map parameter file, relative to the params directory
    pub map_params: String,

    /// Navigation parameter file, relative to the params directory
    pub nav_params: String,

    /// Save the vision overlay every this many cycles, or never if zero
    pub vision_save_period: u64,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for RovExecParams {
    fn default() -> Self {
        Self {
            per_params: String::from("per.toml"),
            map_params: String::from("map.toml"),
            nav_params: String::from("nav.toml"),
            vision_save_period: 0,
        }
    }
}
