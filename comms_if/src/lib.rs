//! # Communications interface crate.
//!
//! Provides the data interfaces exchanged between the rover core and the external simulation
//! driver which owns telemetry transport.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Telemetry and command definitions for rover equipment
pub mod eqpt;
