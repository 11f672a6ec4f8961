//! # Stop mode

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::drive::DriveCmd;

use super::{
    clip_steer, mean_angle, turn_in_place, NavInput, NavParams, StackAction, StepOutput,
};
use crate::auto::coords::PolarSet;

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Step the Stop mode.
///
/// Brakes until stopped, then turns in place until there is enough navigable terrain to pop
/// back to the previous mode.
pub(super) fn step(nav: &PolarSet, input: &NavInput, params: &NavParams) -> StepOutput {
    if input.vel_ms > params.stopped_vel_ms {
        return StepOutput::stay(DriveCmd::brake(params.nominal_brake));
    }

    if nav.len() < params.go_forward {
        return StepOutput::stay(turn_in_place());
    }

    StepOutput {
        action: StackAction::Pop,
        cmd: DriveCmd {
            throttle: params.nominal_throttle,
            brake: 0.0,
            steer_deg: clip_steer(mean_angle(nav).to_degrees() + params.stop_exit_bias_deg),
            send_pickup: false,
        },
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
