//! # Equipment Interface
//!
//! This module defines the interface structures which are exchanged with the rover equipment
//! (the simulated vehicle, its camera and its sample pickup arm).

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod drive;
pub mod telem;

// -----------------------------------------------------------------------------------------------
// ENUMS
// -----------------------------------------------------------------------------------------------

/// Errors that can occur while (de)serialising equipment messages.
#[derive(Debug, thiserror::Error)]
pub enum EqptMsgError {
    #[error("Could not serialise the message: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not deserialise the message: {0}")]
    DeserializeError(serde_json::Error),
}
