//! # Drive Commands
//!
//! Commands produced by the rover core each tick, to be actuated by the simulation driver.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::EqptMsgError;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Largest steering angle magnitude the rover accepts.
///
/// Units: degrees
pub const STEER_LIMIT_DEG: f64 = 15.0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A drive command. Created fresh each tick, no history is kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DriveCmd {
    /// Throttle demand, a non-negative fraction of maximum throttle.
    pub throttle: f64,

    /// Brake demand, non-negative.
    pub brake: f64,

    /// Steering angle, positive to the left.
    ///
    /// Units: degrees, within [-STEER_LIMIT_DEG, STEER_LIMIT_DEG]
    pub steer_deg: f64,

    /// Request the pickup subsystem to collect a sample. The driver clears this once consumed.
    pub send_pickup: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DriveCmd {
    /// Full stop, brakes applied with the given magnitude.
    pub fn brake(brake: f64) -> Self {
        Self {
            brake,
            ..Default::default()
        }
    }

    /// Serialise the command to a JSON string.
    pub fn to_json(&self) -> Result<String, EqptMsgError> {
        serde_json::to_string(self).map_err(EqptMsgError::SerializationError)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_to_json() {
        let cmd = DriveCmd {
            throttle: 0.2,
            brake: 0.0,
            steer_deg: -15.0,
            send_pickup: true,
        };

        let json = cmd.to_json().unwrap();
        assert!(json.contains("\"steer_deg\":-15.0"));
        assert!(json.contains("\"send_pickup\":true"));

        assert_eq!(DriveCmd::brake(10.0).brake, 10.0);
        assert_eq!(DriveCmd::brake(10.0).throttle, 0.0);
    }
}
