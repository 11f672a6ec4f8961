//! Main rover-side executable entry point.
//! 
//! # Architecture
//! 
//! The executable replays a recorded run through the autonomy pipeline:
//! 
//!     - Initialise all modules
//!     - Main loop, one cycle per recorded tick:
//!         - Telemetry and frame acquisition from the replay log
//!         - Autonomy processing:
//!             - Perception of the frame
//!             - World map accumulation
//!             - Navigation decision
//!         - Archiving of the cycle
//!     - Save the final world map, vision overlay and a run summary to the session
//! 
//! # Modules
//! 
//! All cyclic modules (e.g. `per`) shall meet the following requirements:
//!     1. Provide a public struct implementing the `util::module::State` trait.
//!     

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use rov_lib::{
    auto::{
        self,
        map::{Coverage, MapParams},
        nav::{NavMode, NavParams},
        per::PerMgr,
    },
    data_store::DataStore,
    params::RovExecParams,
    replay::ReplayLog,
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::path::PathBuf;
use color_eyre::{Report, eyre::WrapErr};
use comms_if::eqpt::telem::RoverPose;
use log::{debug, info, warn};
use serde::Serialize;
use structopt::StructOpt;

// Internal
use util::{
    archive::Archiver,
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Replay a recorded run through the rover autonomy.
#[derive(Debug, StructOpt)]
#[structopt(name = "rov_exec")]
struct Args {
    /// Path to the replay log CSV
    #[structopt(parse(from_os_str))]
    log: PathBuf,

    /// Stop after this many cycles
    #[structopt(long)]
    max_cycles: Option<u64>,

    /// Log at debug level
    #[structopt(short, long)]
    verbose: bool,
}

/// Summary of the run, saved at the end of the session.
#[derive(Debug, Serialize)]
struct RunSummary {
    num_cycles: u64,
    mission_time_s: f64,
    final_pose: RoverPose,
    final_mode: NavMode,
    map_coverage: Coverage,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    color_eyre::install()?;

    let args = Args::from_args();

    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new(
        "rov_exec", 
        "sessions"
    ).wrap_err("Failed to create the session")?;

    // Initialise logger
    let level = if args.verbose { LevelFilter::Debug } else { LevelFilter::Info };
    logger_init(level, &session)
        .wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Rover Autonomy Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: RovExecParams = util::params::load(
        "rov_exec.toml"
    ).wrap_err("Could not load exec params")?;
    let map_params: MapParams = util::params::load(&exec_params.map_params)
        .wrap_err("Could not load map params")?;
    let nav_params: NavParams = util::params::load(&exec_params.nav_params)
        .wrap_err("Could not load nav params")?;

    map_params.validate()
        .wrap_err("Invalid map params")?;

    info!("Exec parameters loaded");
    debug!("Map params: {:?}", map_params);
    debug!("Nav params: {:?}", nav_params);

    // ---- INITIALISE REPLAY ----

    info!("Loading replay log from {:?}", args.log);

    let replay = ReplayLog::new(&args.log)
        .wrap_err("Failed to load the replay log")?;

    info!(
        "Loaded log lasts {:.02} s and contains {} ticks\n",
        replay.duration_s(),
        replay.num_ticks()
    );

    // ---- INITIALISE DATASTORE ----

    info!("Initialising modules...");

    let mut ds = DataStore::new(map_params.map_size)
        .wrap_err("Failed to initialise the data store")?;

    // ---- INITIALISE MODULES ----

    let mut per_mgr = PerMgr::default();
    per_mgr.init(exec_params.per_params.clone(), &session)
        .wrap_err("Failed to initialise PerMgr")?;
    info!("PerMgr init complete");

    let mut arch_cycles = Archiver::from_path(&session, "rov_exec/cycles.csv")
        .wrap_err("Failed to create the cycle archive")?;

    info!("Module initialisation complete\n");

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    for tick in replay {
        if let Some(max) = args.max_cycles {
            if ds.num_cycles >= max {
                info!("Reached the cycle limit of {}, stopping", max);
                break;
            }
        }

        // Clear items that need wiping at the start of the cycle
        ds.cycle_start();

        // ---- DATA INPUT ----

        let (telem, frame) = tick
            .wrap_err_with(|| format!("Failed to read tick {} of the replay", ds.num_cycles))?;

        // ---- AUTONOMY PROCESSING ----

        let (state, cmd) = auto::tick(
            std::mem::take(&mut ds.state),
            telem,
            &frame,
            &mut per_mgr,
            &map_params,
            &nav_params,
        ).wrap_err("Perception failed, the frame cannot be processed")?;

        ds.state = state;
        ds.drive_cmd = cmd;
        ds.per_status_rpt = per_mgr.status_report();

        // ---- ARCHIVING ----

        if let Err(e) = arch_cycles.serialise(ds.cycle_record()) {
            warn!("Could not archive cycle {}: {}", ds.num_cycles, e);
        }

        if exec_params.vision_save_period > 0
            && ds.num_cycles % exec_params.vision_save_period == 0
        {
            if let Some(ref per) = ds.state.perception {
                let path = session.path(format!("vision/vision_{:06}.png", ds.num_cycles));
                if let Err(e) = save_image(&per.vision_image, path) {
                    warn!("Could not save vision overlay: {}", e);
                }
            }
        }

        ds.cycle_end();
    }

    // ---- SAVE OUTPUTS ----

    info!("End of replay reached after {} cycles", ds.num_cycles);

    let coverage = ds.state.world_map.coverage();
    info!(
        "Map coverage: {} obstacle, {} sample, {} navigable cells",
        coverage.obstacle, coverage.sample, coverage.navigable
    );

    save_image(&ds.state.world_map.to_image(), session.path("world_map.png"))
        .wrap_err("Failed to save the world map")?;

    if let Some(ref per) = ds.state.perception {
        save_image(&per.vision_image, session.path("vision.png"))
            .wrap_err("Failed to save the vision overlay")?;
    }

    let summary = RunSummary {
        num_cycles: ds.num_cycles,
        mission_time_s: ds.telem().total_time_s,
        final_pose: ds.telem().pose,
        final_mode: ds.state.nav.mode(),
        map_coverage: coverage,
    };
    session.save_json("summary.json", &summary)
        .wrap_err("Failed to save the run summary")?;

    info!("Outputs saved to {:?}", session.session_root);

    Ok(())
}

/// Save an image, creating the parent directory if needed.
fn save_image(img: &image::RgbImage, path: PathBuf) -> Result<(), Report> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .wrap_err_with(|| format!("Failed to create {:?}", parent))?;
    }

    img.save(&path)
        .wrap_err_with(|| format!("Failed to write {:?}", path))
}
