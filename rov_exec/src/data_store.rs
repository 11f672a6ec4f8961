//! # Data Store

use comms_if::eqpt::{drive::DriveCmd, telem::RoverTelem};
use serde::Serialize;

use crate::auto::{map::MapError, per::PerStatusReport, RoverState};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    // Cycle management
    /// Number of cycles already executed
    pub num_cycles: u64,

    /// Session elapsed time at the start of this cycle
    pub exec_time_s: f64,

    // Rover
    /// State carried between ticks
    pub state: RoverState,

    /// Drive command produced this cycle
    pub drive_cmd: DriveCmd,

    // Perception
    pub per_status_rpt: PerStatusReport,
}

/// One row of the per-cycle archive.
///
/// Kept flat so it can be written as a single CSV record.
#[derive(Debug, Clone, Serialize)]
pub struct CycleRecord {
    pub cycle: u64,
    pub exec_time_s: f64,
    pub mission_time_s: f64,
    pub x_m: f64,
    pub y_m: f64,
    pub yaw_deg: f64,
    pub vel_ms: f64,
    pub mode: String,
    pub stack_depth: usize,
    pub num_nav_pts: usize,
    pub num_sample_pts: usize,
    pub map_updated: bool,
    pub throttle: f64,
    pub brake: f64,
    pub steer_deg: f64,
    pub send_pickup: bool,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Create a data store for a mission with a map of the given size.
    pub fn new(map_size: usize) -> Result<Self, MapError> {
        Ok(Self {
            state: RoverState::new(map_size)?,
            ..Default::default()
        })
    }

    /// Perform actions required at the start of a cycle.
    ///
    /// Clears the outputs of the previous cycle and stamps the cycle time.
    pub fn cycle_start(&mut self) {
        self.drive_cmd = DriveCmd::default();
        self.per_status_rpt = PerStatusReport::default();

        self.exec_time_s = util::session::get_elapsed_seconds();
    }

    /// Perform actions required at the end of a cycle.
    pub fn cycle_end(&mut self) {
        self.num_cycles += 1;
    }

    pub fn telem(&self) -> &RoverTelem {
        &self.state.telem
    }

    /// Summarise this cycle for archiving.
    pub fn cycle_record(&self) -> CycleRecord {
        let telem = self.telem();

        CycleRecord {
            cycle: self.num_cycles,
            exec_time_s: self.exec_time_s,
            mission_time_s: telem.total_time_s,
            x_m: telem.pose.x_m,
            y_m: telem.pose.y_m,
            yaw_deg: telem.pose.yaw_deg,
            vel_ms: telem.vel_ms,
            mode: self.state.nav.mode().to_string(),
            stack_depth: self.state.nav.stack.modes().len(),
            num_nav_pts: self.per_status_rpt.num_nav_pts,
            num_sample_pts: self.per_status_rpt.num_sample_pts,
            map_updated: self.state.map_updated,
            throttle: self.drive_cmd.throttle,
            brake: self.drive_cmd.brake,
            steer_deg: self.drive_cmd.steer_deg,
            send_pickup: self.drive_cmd.send_pickup,
        }
    }
}
