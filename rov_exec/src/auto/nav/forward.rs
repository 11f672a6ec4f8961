//! # Forward mode

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::drive::DriveCmd;
use log::warn;

use super::{follow_steer, NavInput, NavMode, NavParams, NavState, StackAction, StepOutput};
use crate::auto::coords::PolarSet;

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Step the Forward mode.
///
/// Possible transitions:
/// - Push `Stuck` if stalled on good terrain
/// - Push `Stop` if the terrain ahead is too sparse
pub(super) fn step(
    state: &NavState,
    nav: &PolarSet,
    input: &NavInput,
    params: &NavParams,
) -> StepOutput {
    if nav.len() < params.stop_forward {
        return StepOutput {
            action: StackAction::Push(NavMode::Stop),
            cmd: DriveCmd::brake(params.nominal_brake),
        };
    }

    let stalled_for_s = input.total_time_s - state.stuck_time_s;
    if input.vel_ms <= params.stall_vel_ms && stalled_for_s > params.stall_time_s {
        warn!("Rover stalled at {:.2} m/s, attempting recovery", input.vel_ms);
        return StepOutput {
            action: StackAction::Push(NavMode::Stuck),
            cmd: DriveCmd::brake(params.nominal_brake),
        };
    }

    let throttle = if input.vel_ms < params.max_vel_ms {
        params.nominal_throttle
    } else {
        0.0
    };

    StepOutput::stay(DriveCmd {
        throttle,
        brake: 0.0,
        steer_deg: follow_steer(nav, input.total_time_s, params),
        send_pickup: false,
    })
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::auto::nav::{mean_angle, test::nav_set};

    fn input(vel_ms: f64, total_time_s: f64) -> NavInput<'static> {
        NavInput {
            vel_ms,
            total_time_s,
            ..Default::default()
        }
    }

    #[test]
    fn test_drive() {
        let params = NavParams::default();
        let mut nav = nav_set(100, 0.1);
        nav.angles.iter_mut().for_each(|a| *a += 0.1);

        let out = step(&NavState::default(), &nav, &input(1.0, 5.0), &params);
        assert_eq!(out.action, StackAction::None);
        assert_eq!(out.cmd.throttle, params.nominal_throttle);
        assert_eq!(out.cmd.brake, 0.0);

        // No wall hugging during the grace period
        assert!((out.cmd.steer_deg - mean_angle(&nav).to_degrees()).abs() < 1e-9);

        // At max velocity throttle is cut
        let out = step(&NavState::default(), &nav, &input(2.0, 5.0), &params);
        assert_eq!(out.cmd.throttle, 0.0);
    }

    #[test]
    fn test_wall_hug_after_grace() {
        let params = NavParams::default();
        let nav = nav_set(101, 0.2);

        let early = step(&NavState::default(), &nav, &input(1.0, 10.0), &params);
        let late = step(&NavState::default(), &nav, &input(1.0, 10.5), &params);

        let std = util::maths::std_dev(&nav.angles).unwrap();
        assert!(early.cmd.steer_deg.abs() < 1e-9);
        assert!((late.cmd.steer_deg - (0.8 * std).to_degrees()).abs() < 1e-9);
    }

    #[test]
    fn test_stop_threshold() {
        let params = NavParams::default();

        let out = step(&NavState::default(), &nav_set(49, 0.1), &input(1.0, 5.0), &params);
        assert_eq!(out.action, StackAction::Push(NavMode::Stop));

        let out = step(&NavState::default(), &nav_set(50, 0.1), &input(1.0, 5.0), &params);
        assert_eq!(out.action, StackAction::None);
    }
}
