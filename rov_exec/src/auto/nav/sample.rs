//! # Sample approach
//!
//! Whenever a rock sample is visible the rover drives towards the nearest one, ignoring the
//! mode stack for that tick.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::drive::DriveCmd;

use super::{clip_steer, NavInput, NavParams};

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Command for approaching the nearest visible sample, or `None` if there are no samples.
pub(super) fn step(input: &NavInput, params: &NavParams) -> Option<DriveCmd> {
    let (_, angle) = input.obs?.samples.nearest()?;
    let steer_deg = clip_steer(angle.to_degrees());

    if input.in_pickup_range(params) {
        return Some(DriveCmd {
            throttle: 0.0,
            brake: params.nominal_brake,
            steer_deg,
            send_pickup: !input.picking_up,
        });
    }

    // Creep up on the sample at half speed
    let throttle = if input.vel_ms < params.max_vel_ms / 2.0 {
        params.nominal_throttle / 2.0
    } else {
        0.0
    };

    Some(DriveCmd {
        throttle,
        brake: 0.0,
        steer_deg,
        send_pickup: false,
    })
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::auto::coords::{PolarObservation, PolarSet};

    fn obs(dists: Vec<f64>, angles: Vec<f64>) -> PolarObservation {
        PolarObservation {
            nav: PolarSet::default(),
            samples: PolarSet { dists, angles },
        }
    }

    #[test]
    fn test_no_samples() {
        let params = NavParams::default();
        assert_eq!(step(&NavInput::default(), &params), None);

        let o = obs(vec![], vec![]);
        let input = NavInput {
            obs: Some(&o),
            ..Default::default()
        };
        assert_eq!(step(&input, &params), None);
    }

    #[test]
    fn test_approach() {
        let params = NavParams::default();
        let o = obs(vec![25.0, 8.0], vec![0.9, -1.2]);

        // Slow, so creep forward, steering clipped towards the nearest
        let input = NavInput {
            obs: Some(&o),
            vel_ms: 0.4,
            ..Default::default()
        };
        let cmd = step(&input, &params).unwrap();
        assert_eq!(cmd.throttle, 0.1);
        assert_eq!(cmd.steer_deg, -15.0);
        assert_eq!(cmd.brake, 0.0);

        // Fast, so coast
        let input = NavInput {
            vel_ms: 1.0,
            ..input
        };
        assert_eq!(step(&input, &params).unwrap().throttle, 0.0);
    }

    #[test]
    fn test_in_range_brakes_and_requests_pickup() {
        let params = NavParams::default();
        let o = obs(vec![5.0], vec![0.1]);
        let input = NavInput {
            obs: Some(&o),
            vel_ms: 0.3,
            near_sample: true,
            ..Default::default()
        };

        let cmd = step(&input, &params).unwrap();
        assert_eq!(cmd.throttle, 0.0);
        assert_eq!(cmd.brake, params.nominal_brake);
        assert!(cmd.send_pickup);

        let input = NavInput {
            picking_up: true,
            ..input
        };
        assert!(!step(&input, &params).unwrap().send_pickup);
    }
}
