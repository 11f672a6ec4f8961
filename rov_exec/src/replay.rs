//! # Replay
//!
//! Provides telemetry and camera frames from a run recorded to disk, so the tick pipeline can be
//! exercised without the simulator.
//!
//! A log is a CSV file with the header
//!
//! ```text
//! time_s,image,x,y,yaw,pitch,roll,vel,near_sample,picking_up
//! ```
//!
//! where `image` is the path of the frame, relative to the directory containing the log. The
//! flags accept `1`/`0` or `true`/`false`.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::path::{Path, PathBuf};

use comms_if::eqpt::telem::{RoverPose, RoverTelem};
use image::RgbImage;
use log::debug;
use serde::{de, Deserialize, Deserializer};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A recorded run, iterated one tick at a time.
pub struct ReplayLog {
    /// Directory frame paths are relative to
    root: PathBuf,

    records: std::vec::IntoIter<LogRecord>,

    num_records: usize,

    duration_s: f64,
}

/// One row of the log.
#[derive(Debug, Clone, Deserialize)]
struct LogRecord {
    time_s: f64,
    image: PathBuf,
    x: f64,
    y: f64,
    yaw: f64,
    pitch: f64,
    roll: f64,
    vel: f64,
    #[serde(deserialize_with = "flag")]
    near_sample: bool,
    #[serde(deserialize_with = "flag")]
    picking_up: bool,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ReplayError {
    #[error("Replay log {0:?} does not exist")]
    LogNotFound(PathBuf),

    #[error("Could not read the replay log: {0}")]
    CsvError(csv::Error),

    #[error("Could not load frame {0:?}: {1}")]
    ImageLoadError(PathBuf, image::ImageError),

    #[error("Replay log {0:?} contains no ticks")]
    Empty(PathBuf),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ReplayLog {
    /// Load the log at the given path.
    ///
    /// All rows are parsed up front, frames are loaded lazily as the log is iterated.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ReplayError> {
        let path = path.as_ref();

        if !path.is_file() {
            return Err(ReplayError::LogNotFound(path.to_path_buf()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(ReplayError::CsvError)?;

        let records = reader
            .deserialize()
            .collect::<Result<Vec<LogRecord>, _>>()
            .map_err(ReplayError::CsvError)?;

        let (first, last) = match (records.first(), records.last()) {
            (Some(f), Some(l)) => (f.time_s, l.time_s),
            _ => return Err(ReplayError::Empty(path.to_path_buf())),
        };

        let root = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        debug!("Loaded {} ticks from {:?}", records.len(), path);

        Ok(Self {
            root,
            num_records: records.len(),
            duration_s: last - first,
            records: records.into_iter(),
        })
    }

    /// Total number of ticks in the log.
    pub fn num_ticks(&self) -> usize {
        self.num_records
    }

    /// Mission time between the first and last ticks.
    ///
    /// Units: seconds
    pub fn duration_s(&self) -> f64 {
        self.duration_s
    }
}

impl Iterator for ReplayLog {
    type Item = Result<(RoverTelem, RgbImage), ReplayError>;

    fn next(&mut self) -> Option<Self::Item> {
        let record = self.records.next()?;

        let image_path = self.root.join(&record.image);
        let frame = match image::open(&image_path) {
            Ok(i) => i.to_rgb8(),
            Err(e) => return Some(Err(ReplayError::ImageLoadError(image_path, e))),
        };

        Some(Ok((record.telem(), frame)))
    }
}

impl LogRecord {
    fn telem(&self) -> RoverTelem {
        RoverTelem {
            pose: RoverPose {
                x_m: self.x,
                y_m: self.y,
                yaw_deg: self.yaw,
                pitch_deg: self.pitch,
                roll_deg: self.roll,
            },
            vel_ms: self.vel,
            total_time_s: self.time_s,
            near_sample: self.near_sample,
            picking_up: self.picking_up,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Deserialise a boolean written either as a number or as a word.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>
{
    let s = String::deserialize(deserializer)?;

    match s.to_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" | "" => Ok(false),
        other => Err(de::Error::custom(format!("invalid flag value \"{}\"", other))),
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
