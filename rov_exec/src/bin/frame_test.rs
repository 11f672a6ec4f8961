//! # Single Frame Test
//!
//! Runs perception over one camera image at a given pose, saving the vision overlay and the
//! resulting single frame world map. Useful for checking the rectification calibration.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::path::PathBuf;

use color_eyre::{eyre::WrapErr, Result};
use comms_if::eqpt::telem::{RoverPose, RoverTelem};
use log::info;
use rov_lib::auto::{
    map::{MapParams, WorldMap},
    nav::{self, NavInput, NavParams, NavState},
    per::{PerMgr, PerParams},
};
use structopt::StructOpt;
use util::{
    logger::{logger_init_stdout, LevelFilter},
    module::State,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, StructOpt)]
#[structopt(name = "frame_test")]
struct Args {
    /// Camera image to process
    #[structopt(parse(from_os_str))]
    image: PathBuf,

    /// Rover world X position, in meters
    #[structopt(short, long, default_value = "100.0")]
    x: f64,

    /// Rover world Y position, in meters
    #[structopt(short, long, default_value = "100.0")]
    y: f64,

    /// Rover yaw, in degrees
    #[structopt(long, default_value = "0.0")]
    yaw: f64,

    /// Perception parameter file, if not given the defaults are used
    #[structopt(long, parse(from_os_str))]
    per_params: Option<PathBuf>,

    /// Directory to write the outputs into
    #[structopt(short, long, parse(from_os_str), default_value = ".")]
    out_dir: PathBuf,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::from_args();

    logger_init_stdout(LevelFilter::Debug)
        .wrap_err("Failed to initialise logging")?;

    let per_params: PerParams = match args.per_params {
        Some(ref p) => util::params::load_from_path(p)
            .wrap_err("Could not load perception params")?,
        None => PerParams::default(),
    };

    let frame = image::open(&args.image)
        .wrap_err_with(|| format!("Could not open {:?}", args.image))?
        .to_rgb8();
    info!("Loaded {}x{} px frame", frame.width(), frame.height());

    let mut per_mgr = PerMgr::new(per_params);
    let (per, report) = per_mgr.proc(&frame)
        .wrap_err("Perception failed")?;
    info!("Perception report: {:#?}", report);

    let pose = RoverPose {
        x_m: args.x,
        y_m: args.y,
        yaw_deg: args.yaw,
        ..Default::default()
    };

    let map_params = MapParams::default();
    let mut map = WorldMap::new(map_params.map_size)
        .wrap_err("Could not create the world map")?;
    map.update(&per.local, &pose, &map_params);
    info!("Map coverage: {:?}", map.coverage());

    // Decision as if this were the first frame of a mission with the rover at rest
    let telem = RoverTelem {
        pose,
        ..Default::default()
    };
    let input = NavInput {
        obs: Some(&per.polar),
        vel_ms: telem.vel_ms,
        total_time_s: telem.total_time_s,
        near_sample: telem.near_sample,
        picking_up: telem.picking_up,
    };
    let (state, cmd) = nav::decide(NavState::default(), &input, &NavParams::default());
    info!("Decision: {:?} in mode {}", cmd, state.mode());

    std::fs::create_dir_all(&args.out_dir)
        .wrap_err("Could not create the output directory")?;
    per.vision_image.save(args.out_dir.join("vision.png"))
        .wrap_err("Could not save the vision overlay")?;
    map.to_image().save(args.out_dir.join("world_map.png"))
        .wrap_err("Could not save the world map")?;

    info!("Outputs saved to {:?}", args.out_dir);

    Ok(())
}
