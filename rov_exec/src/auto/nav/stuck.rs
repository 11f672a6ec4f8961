//! # Stuck mode

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::drive::DriveCmd;
use log::info;

use super::{follow_steer, turn_in_place, NavInput, NavParams, NavState, StackAction, StepOutput};
use crate::auto::coords::PolarSet;

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Step the Stuck mode.
///
/// Holds a hard recovery turn until `stuck_recover_s` has passed since the stall, then pops
/// back to the interrupted mode.
pub(super) fn step(
    state: &NavState,
    nav: &PolarSet,
    input: &NavInput,
    params: &NavParams,
) -> StepOutput {
    if input.total_time_s - state.stuck_time_s <= params.stuck_recover_s {
        return StepOutput::stay(turn_in_place());
    }

    info!("Stall recovery complete");

    StepOutput {
        action: StackAction::Pop,
        cmd: DriveCmd {
            throttle: params.nominal_throttle,
            brake: 0.0,
            steer_deg: follow_steer(nav, input.total_time_s, params),
            send_pickup: false,
        },
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::auto::nav::{test::nav_set, NavMode, NavStack};

    #[test]
    fn test_recovery_window() {
        let params = NavParams::default();
        let state = NavState {
            stack: NavStack::from_modes(&[NavMode::Forward, NavMode::Stuck]),
            stuck_time_s: 12.0,
            total_time_s: 12.0,
        };
        let nav = nav_set(200, 0.3);
        let input = |t| NavInput {
            total_time_s: t,
            ..Default::default()
        };

        let out = step(&state, &nav, &input(13.0), &params);
        assert_eq!(out.action, StackAction::None);
        assert_eq!(out.cmd.steer_deg, -15.0);
        assert_eq!(out.cmd.brake, 0.0);

        let out = step(&state, &nav, &input(13.01), &params);
        assert_eq!(out.action, StackAction::Pop);
        assert_eq!(out.cmd.throttle, params.nominal_throttle);
        assert!(out.cmd.steer_deg.abs() <= 15.0);
    }
}
