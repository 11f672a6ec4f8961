//! # Rover library.
//!
//! This library allows other crates in the workspace to access items defined inside the rover 
//! crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Autonomy - perception, world map and navigation decisions
pub mod auto;

/// Global data store for the executable
pub mod data_store;

/// Parameters for the rover executable
pub mod params;

/// Replay of recorded runs - provides telemetry and frames from a log on disk
pub mod replay;
