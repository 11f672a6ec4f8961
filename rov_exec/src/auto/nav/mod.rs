//! # Navigation
//!
//! Rule based decision engine turning the current polar observation and rover telemetry into a
//! drive command.
//!
//! Each tick is evaluated in priority order:
//! 1. Visible samples take over the command entirely, see [`sample`].
//! 2. With no navigable terrain at all the rover drives straight ahead.
//! 3. Otherwise the active mode on the [`NavStack`] is stepped:
//!    - `Forward` - follow the mean navigable heading, stopping on sparse terrain or pushing
//!      `Stuck` when stalled.
//!    - `Stop` - brake, then turn in place until there is enough terrain to resume.
//!    - `Stuck` - a timed hard turn, after which the interrupted mode resumes.
//! 4. A pickup is requested whenever a sample is within range and no pickup is in progress.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

mod forward;
mod params;
mod sample;
mod stack;
mod stop;
mod stuck;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::drive::{DriveCmd, STEER_LIMIT_DEG};
use log::{debug, info};
use serde::Serialize;

use crate::auto::coords::{PolarObservation, PolarSet};

pub use params::NavParams;
pub use stack::{NavMode, NavStack, StackAction};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Navigation state persisting between ticks.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavState {
    pub stack: NavStack,

    /// Mission time at which `Stuck` was last entered.
    ///
    /// Units: seconds
    pub stuck_time_s: f64,

    /// Mission time of the most recent decision.
    ///
    /// Units: seconds
    pub total_time_s: f64,
}

/// Inputs to a single decision.
#[derive(Debug, Clone, Copy, Default)]
pub struct NavInput<'a> {
    /// This tick's observation, or `None` if perception produced nothing.
    pub obs: Option<&'a PolarObservation>,

    /// Units: meters/second
    pub vel_ms: f64,

    /// Units: seconds
    pub total_time_s: f64,

    /// The driver reports the rover is within pickup range of a sample.
    pub near_sample: bool,

    /// The pickup subsystem is currently collecting a sample.
    pub picking_up: bool,
}

/// Output of a mode's step function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepOutput {
    /// Action to perform on the stack itself
    pub action: StackAction,

    pub cmd: DriveCmd,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for NavState {
    fn default() -> Self {
        Self {
            stack: NavStack::new(),
            stuck_time_s: 0.0,
            total_time_s: 0.0,
        }
    }
}

impl NavState {
    /// The active mode.
    pub fn mode(&self) -> NavMode {
        self.stack.top()
    }
}

impl StepOutput {
    pub fn stay(cmd: DriveCmd) -> Self {
        Self {
            action: StackAction::None,
            cmd,
        }
    }
}

impl<'a> NavInput<'a> {
    /// True if a sample is close enough to be collected.
    pub fn in_pickup_range(&self, params: &NavParams) -> bool {
        if self.near_sample {
            return true;
        }

        if params.pickup_range_px <= 0.0 {
            return false;
        }

        match self.obs.and_then(|o| o.samples.nearest()) {
            Some((dist, _)) => dist < params.pickup_range_px,
            None => false,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Decide this tick's drive command.
pub fn decide(mut state: NavState, input: &NavInput, params: &NavParams) -> (NavState, DriveCmd) {
    state.total_time_s = input.total_time_s;

    let nav = input.obs.map(|o| &o.nav).filter(|n| !n.is_empty());

    let mut cmd = if let Some(cmd) = sample::step(input, params) {
        cmd
    } else if let Some(nav) = nav {
        let output = match state.mode() {
            NavMode::Forward => forward::step(&state, nav, input, params),
            NavMode::Stop => stop::step(nav, input, params),
            NavMode::Stuck => stuck::step(&state, nav, input, params),
        };

        if let StackAction::Push(NavMode::Stuck) = output.action {
            state.stuck_time_s = input.total_time_s;
        }

        if state.stack.apply(output.action) {
            info!("Nav mode change to: {} (stack {})", state.mode(), state.stack);
        }

        output.cmd
    } else {
        debug!("No navigable terrain observed, driving straight");
        DriveCmd {
            throttle: params.nominal_throttle,
            ..Default::default()
        }
    };

    if input.in_pickup_range(params) && !input.picking_up {
        cmd.send_pickup = true;
    }

    (state, cmd)
}

/// Clip a steering demand to the rover's limits. NaN demands give zero.
pub(crate) fn clip_steer(steer_deg: f64) -> f64 {
    util::maths::clamp(steer_deg, -STEER_LIMIT_DEG, STEER_LIMIT_DEG)
}

/// Mean navigable angle, or zero if there are no angles.
///
/// Units: radians
pub(crate) fn mean_angle(nav: &PolarSet) -> f64 {
    util::maths::mean(&nav.angles).unwrap_or(0.0)
}

/// Offset biasing the rover towards one side of the navigable terrain.
///
/// Proportional to the spread of navigable angles, and zero during the grace period at mission
/// start.
///
/// Units: radians
pub(crate) fn wall_hug_offset(nav: &PolarSet, total_time_s: f64, params: &NavParams) -> f64 {
    if total_time_s <= params.wall_hug_grace_s {
        return 0.0;
    }

    params.wall_hug_gain * util::maths::std_dev(&nav.angles).unwrap_or(0.0)
}

/// Steering along the mean navigable heading plus the wall hugging offset.
pub(crate) fn follow_steer(nav: &PolarSet, total_time_s: f64, params: &NavParams) -> f64 {
    clip_steer((mean_angle(nav) + wall_hug_offset(nav, total_time_s, params)).to_degrees())
}

/// Hard turn in place, brakes released.
pub(crate) fn turn_in_place() -> DriveCmd {
    DriveCmd {
        steer_deg: -STEER_LIMIT_DEG,
        ..Default::default()
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    /// Navigable set with `n` points spread evenly over `[-spread, spread]` radians.
    pub(crate) fn nav_set(n: usize, spread: f64) -> PolarSet {
        let angles: Vec<f64> = (0..n)
            .map(|i| match n {
                1 => 0.0,
                _ => -spread + 2.0 * spread * i as f64 / (n - 1) as f64,
            })
            .collect();

        PolarSet {
            dists: vec![20.0; n],
            angles,
        }
    }

    fn obs(n: usize, spread: f64) -> PolarObservation {
        PolarObservation {
            nav: nav_set(n, spread),
            samples: PolarSet::default(),
        }
    }

    fn state(modes: &[NavMode]) -> NavState {
        NavState {
            stack: NavStack::from_modes(modes),
            ..Default::default()
        }
    }

    #[test]
    fn test_scenario_a_sparse_terrain_stops() {
        let params = NavParams::default();
        let o = obs(10, 0.3);
        let input = NavInput {
            obs: Some(&o),
            vel_ms: 1.0,
            total_time_s: 20.0,
            ..Default::default()
        };

        let (s, cmd) = decide(state(&[NavMode::Forward]), &input, &params);

        assert_eq!(s.stack.modes(), &[NavMode::Forward, NavMode::Stop]);
        assert_eq!(cmd.brake, params.nominal_brake);
        assert_eq!(cmd.throttle, 0.0);
        assert_eq!(cmd.steer_deg, 0.0);
    }

    #[test]
    fn test_scenario_b_stall_and_recover() {
        let params = NavParams::default();
        let o = obs(600, 0.2);
        let mut s = NavState::default();

        // Stalled but not for long enough yet
        let input = |t: f64| NavInput {
            obs: Some(&o),
            vel_ms: 0.05,
            total_time_s: t,
            ..Default::default()
        };
        let (next, cmd) = decide(s, &input(3.0), &params);
        s = next;
        assert_eq!(s.stack.modes(), &[NavMode::Forward]);
        assert_eq!(cmd.throttle, params.nominal_throttle);

        // More than 4 s since the timer was last reset
        let (next, cmd) = decide(s, &input(4.5), &params);
        s = next;
        assert_eq!(s.stack.modes(), &[NavMode::Forward, NavMode::Stuck]);
        assert_eq!(s.stuck_time_s, 4.5);
        assert_eq!(cmd.throttle, 0.0);
        assert_eq!(cmd.steer_deg, 0.0);
        assert_eq!(cmd.brake, params.nominal_brake);

        // Recovery turn within the first second
        let (next, cmd) = decide(s, &input(5.0), &params);
        s = next;
        assert_eq!(s.mode(), NavMode::Stuck);
        assert_eq!(cmd.steer_deg, -STEER_LIMIT_DEG);
        assert_eq!(cmd.brake, 0.0);

        // Then back to forward
        let (next, cmd) = decide(s, &input(5.6), &params);
        s = next;
        assert_eq!(s.stack.modes(), &[NavMode::Forward]);
        assert_eq!(cmd.throttle, params.nominal_throttle);
        assert_eq!(cmd.brake, 0.0);

        // Timer was reset when Stuck was entered, so no immediate re-stall
        let (next, _) = decide(s, &input(8.0), &params);
        assert_eq!(next.stack.modes(), &[NavMode::Forward]);
        let (next, _) = decide(next, &input(8.6), &params);
        assert_eq!(next.stack.modes(), &[NavMode::Forward, NavMode::Stuck]);
    }

    #[test]
    fn test_scenario_c_sample_overrides_stop() {
        let params = NavParams::default();
        let o = PolarObservation {
            nav: nav_set(10, 0.3),
            samples: PolarSet {
                dists: vec![30.0, 12.0, 40.0],
                angles: vec![-0.2, 0.1, 0.3],
            },
        };
        let input = NavInput {
            obs: Some(&o),
            vel_ms: 1.5,
            total_time_s: 30.0,
            ..Default::default()
        };

        let before = state(&[NavMode::Stop]);
        let (s, cmd) = decide(before.clone(), &input, &params);

        // Stop logic would have braked with zero steer
        assert_eq!(s.stack, before.stack);
        assert!((cmd.steer_deg - 0.1f64.to_degrees()).abs() < 1e-9);
        assert_eq!(cmd.brake, 0.0);
        assert_eq!(cmd.throttle, 0.0);
        assert!(!cmd.send_pickup);
    }

    #[test]
    fn test_scenario_d_stop_resumes() {
        let params = NavParams::default();
        let o = obs(600, 0.02);
        let input = NavInput {
            obs: Some(&o),
            vel_ms: 0.0,
            total_time_s: 30.0,
            ..Default::default()
        };

        let (s, cmd) = decide(state(&[NavMode::Forward, NavMode::Stop]), &input, &params);
        assert_eq!(s.stack.modes(), &[NavMode::Forward]);
        assert_eq!(cmd.brake, 0.0);
        assert_eq!(cmd.throttle, params.nominal_throttle);
        assert!((cmd.steer_deg - clip_steer(mean_angle(&o.nav).to_degrees() + 12.0)).abs() < 1e-9);

        // Single element stack pops to Forward
        let (s, _) = decide(state(&[NavMode::Stop]), &input, &params);
        assert_eq!(s.stack.modes(), &[NavMode::Forward]);
    }

    #[test]
    fn test_safe_default() {
        let params = NavParams::default();
        let empty = PolarObservation::default();

        for o in [None, Some(&empty)].iter() {
            let input = NavInput {
                obs: *o,
                vel_ms: 1.0,
                total_time_s: 15.0,
                ..Default::default()
            };
            let (s, cmd) = decide(state(&[NavMode::Forward, NavMode::Stop]), &input, &params);

            assert_eq!(s.stack.modes(), &[NavMode::Forward, NavMode::Stop]);
            assert_eq!(
                cmd,
                DriveCmd {
                    throttle: params.nominal_throttle,
                    ..Default::default()
                }
            );
        }
    }

    #[test]
    fn test_pickup_request() {
        let params = NavParams::default();
        let o = obs(600, 0.2);

        // Near a sample with none visible still requests a pickup
        let input = NavInput {
            obs: Some(&o),
            near_sample: true,
            total_time_s: 20.0,
            ..Default::default()
        };
        let (_, cmd) = decide(NavState::default(), &input, &params);
        assert!(cmd.send_pickup);

        // Already picking up
        let input = NavInput {
            picking_up: true,
            ..input
        };
        let (_, cmd) = decide(NavState::default(), &input, &params);
        assert!(!cmd.send_pickup);

        // Not near
        let input = NavInput {
            near_sample: false,
            picking_up: false,
            ..input
        };
        let (_, cmd) = decide(NavState::default(), &input, &params);
        assert!(!cmd.send_pickup);
    }

    #[test]
    fn test_pickup_range_from_observation() {
        let params = NavParams {
            pickup_range_px: 15.0,
            ..Default::default()
        };
        let o = PolarObservation {
            nav: nav_set(600, 0.2),
            samples: PolarSet {
                dists: vec![10.0],
                angles: vec![0.05],
            },
        };
        let input = NavInput {
            obs: Some(&o),
            vel_ms: 0.5,
            total_time_s: 20.0,
            ..Default::default()
        };

        assert!(input.in_pickup_range(&params));
        assert!(!input.in_pickup_range(&NavParams::default()));

        let (_, cmd) = decide(NavState::default(), &input, &params);
        assert!(cmd.send_pickup);
        assert_eq!(cmd.brake, params.nominal_brake);
    }

    #[test]
    fn test_steer_always_clipped() {
        let params = NavParams::default();

        // Empty, single element, and a range of generated spreads and offsets
        let mut sets = vec![PolarSet::default(), nav_set(1, 0.0)];
        for n in [1usize, 2, 7, 60, 600].iter() {
            for k in 0..12 {
                let centre = -3.0 + 0.5 * k as f64;
                let mut set = nav_set(*n, 0.1 * k as f64);
                set.angles.iter_mut().for_each(|a| *a += centre);
                sets.push(set);
            }
        }

        let modes = [
            vec![NavMode::Forward],
            vec![NavMode::Forward, NavMode::Stop],
            vec![NavMode::Forward, NavMode::Stuck],
        ];

        for set in sets.into_iter() {
            for samples in [PolarSet::default(), set.clone()].iter() {
                let o = PolarObservation {
                    nav: set.clone(),
                    samples: samples.clone(),
                };
                for m in modes.iter() {
                    for &(vel, t) in [(0.0, 0.0), (0.05, 20.0), (1.0, 20.0), (3.0, 50.0)].iter() {
                        let input = NavInput {
                            obs: Some(&o),
                            vel_ms: vel,
                            total_time_s: t,
                            ..Default::default()
                        };
                        let (_, cmd) = decide(state(m), &input, &params);
                        assert!(cmd.steer_deg.abs() <= STEER_LIMIT_DEG);
                        assert!(cmd.throttle >= 0.0);
                        assert!(cmd.brake >= 0.0);
                    }
                }
            }
        }

        assert_eq!(clip_steer(f64::NAN), 0.0);
    }
}
