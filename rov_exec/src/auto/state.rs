//! # Rover State
//!
//! The state carried from one tick to the next, and the pure functions advancing it.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::{drive::DriveCmd, telem::RoverTelem};
use image::RgbImage;
use log::trace;
use util::module::State;

use super::{
    map::{MapError, MapParams, WorldMap},
    nav::{self, NavInput, NavParams, NavState},
    per::{PerError, PerMgr, Perception},
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Complete state of the rover between ticks.
#[derive(Debug, Clone)]
pub struct RoverState {
    /// Telemetry for the current tick.
    pub telem: RoverTelem,

    pub world_map: WorldMap,

    /// Whether the world map accepted the latest observation.
    pub map_updated: bool,

    pub nav: NavState,

    /// Result of the most recent perception, `None` before the first frame.
    pub perception: Option<Perception>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl RoverState {
    /// Create the state at mission start with an empty map of the given size.
    pub fn new(map_size: usize) -> Result<Self, MapError> {
        Ok(Self {
            world_map: WorldMap::new(map_size)?,
            ..Default::default()
        })
    }
}

impl Default for RoverState {
    fn default() -> Self {
        Self {
            telem: RoverTelem::default(),
            world_map: WorldMap::default(),
            map_updated: false,
            nav: NavState::default(),
            perception: None,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Run perception on the frame and fold the result into the world map.
///
/// The map update is skipped when the rover isn't level, but the perception is still kept for
/// the decision.
pub fn perceive(
    mut state: RoverState,
    frame: &RgbImage,
    per_mgr: &mut PerMgr,
    map_params: &MapParams,
) -> Result<RoverState, PerError> {
    let (perception, _) = per_mgr.proc(frame)?;

    state.map_updated = state.world_map.update(&perception.local, &state.telem.pose, map_params);
    trace!("World map updated: {}", state.map_updated);

    state.perception = Some(perception);

    Ok(state)
}

/// Decide the drive command from the latest perception and telemetry.
pub fn decide(state: RoverState, params: &NavParams) -> (RoverState, DriveCmd) {
    let RoverState {
        telem,
        world_map,
        map_updated,
        nav,
        perception,
    } = state;

    let input = NavInput {
        obs: perception.as_ref().map(|p| &p.polar),
        vel_ms: telem.vel_ms,
        total_time_s: telem.total_time_s,
        near_sample: telem.near_sample,
        picking_up: telem.picking_up,
    };

    let (nav, cmd) = nav::decide(nav, &input, params);

    let state = RoverState {
        telem,
        world_map,
        map_updated,
        nav,
        perception,
    };

    (state, cmd)
}

/// Process one tick: adopt the new telemetry, perceive, then decide.
pub fn tick(
    mut state: RoverState,
    telem: RoverTelem,
    frame: &RgbImage,
    per_mgr: &mut PerMgr,
    map_params: &MapParams,
    nav_params: &NavParams,
) -> Result<(RoverState, DriveCmd), PerError> {
    state.telem = telem;
    let state = perceive(state, frame, per_mgr, map_params)?;
    Ok(decide(state, nav_params))
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::auto::{
        map::WorldMapLayer,
        nav::NavMode,
        per::PerParams,
    };
    use comms_if::eqpt::telem::RoverPose;
    use image::Rgb;

    /// Bright ground across the whole lower half of the frame.
    fn open_ground() -> RgbImage {
        RgbImage::from_fn(320, 160, |_, y| {
            if y >= 90 {
                Rgb([210, 200, 190])
            } else {
                Rgb([30, 30, 30])
            }
        })
    }

    fn telem(x_m: f64, y_m: f64, pitch_deg: f64) -> RoverTelem {
        RoverTelem {
            pose: RoverPose {
                x_m,
                y_m,
                pitch_deg,
                ..Default::default()
            },
            vel_ms: 1.0,
            total_time_s: 2.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_tick() {
        let mut per_mgr = PerMgr::new(PerParams::default());
        let map_params = MapParams::default();
        let nav_params = NavParams::default();

        let (state, cmd) = tick(
            RoverState::default(),
            telem(100.0, 100.0, 0.0),
            &open_ground(),
            &mut per_mgr,
            &map_params,
            &nav_params,
        )
        .unwrap();

        let coverage = state.world_map.coverage();
        assert!(state.map_updated);
        assert!(coverage.navigable > 0);
        assert!(state.perception.is_some());

        // Ground directly ahead of the rover is navigable
        assert_eq!(state.world_map.get(101, 100, WorldMapLayer::Navigable), Some(255));
        assert_eq!(state.world_map.get(101, 100, WorldMapLayer::Obstacle), Some(0));

        // Plenty of open terrain, so keep driving
        assert_eq!(state.nav.mode(), NavMode::Forward);
        assert_eq!(cmd.throttle, nav_params.nominal_throttle);
        assert!(cmd.steer_deg.abs() <= 15.0);
    }

    #[test]
    fn test_off_level_still_decides() {
        let mut per_mgr = PerMgr::new(PerParams::default());

        let state = RoverState {
            telem: telem(100.0, 100.0, 5.0),
            map_updated: true,
            ..Default::default()
        };
        let state = perceive(state, &open_ground(), &mut per_mgr, &MapParams::default()).unwrap();
        assert!(!state.map_updated);
        assert_eq!(state.world_map, WorldMap::default());

        let (state, cmd) = decide(state, &NavParams::default());
        assert_eq!(state.nav.total_time_s, 2.0);
        assert!(cmd.throttle > 0.0);
    }

    #[test]
    fn test_decide_without_perception() {
        let (state, cmd) = decide(RoverState::default(), &NavParams::default());

        assert_eq!(state.nav.mode(), NavMode::Forward);
        assert_eq!(cmd.throttle, NavParams::default().nominal_throttle);
        assert_eq!(cmd.steer_deg, 0.0);
    }

    #[test]
    fn test_new_rejects_empty_map() {
        assert!(matches!(RoverState::new(0), Err(MapError::ZeroSize)));
        assert_eq!(RoverState::new(30).unwrap().world_map.size(), 30);
    }

    #[test]
    fn test_bad_frame_is_fatal() {
        let mut per_mgr = PerMgr::new(PerParams::default());
        let r = tick(
            RoverState::default(),
            RoverTelem::default(),
            &RgbImage::new(10, 10),
            &mut per_mgr,
            &MapParams::default(),
            &NavParams::default(),
        );

        assert!(matches!(r, Err(PerError::FrameTooSmall { .. })));
    }
}
