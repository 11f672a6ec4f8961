//! # Map
//!
//! This module implements the [`WorldMap`], a persistent three layer grid recording where
//! obstacles, rock samples and navigable terrain have been seen during the mission.

// ------------------------------------------------------------------------------------------------
// MODS
// ------------------------------------------------------------------------------------------------

/// Implements the [`WorldMap`] type
mod world_map;

/// Parameters for map accumulation
mod params;

// ------------------------------------------------------------------------------------------------
// EXPORTS
// ------------------------------------------------------------------------------------------------

pub use params::{MapParams, NavOverride};
pub use world_map::{Coverage, WorldMap, WorldMapLayer};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors in the world map configuration.
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("The world map must have at least one cell per side")]
    ZeroSize,

    #[error("The map scale must be a positive number of pixels per cell, found {0}")]
    InvalidScale(f64),

    #[error("The level tolerance must be a non-negative angle, found {0}")]
    InvalidLevelTol(f64),
}
