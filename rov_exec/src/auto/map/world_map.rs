//! # World Map

// ------------------------------------------------------------------------------------------------
// INCLUDES
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::telem::RoverPose;
use image::{Rgb, RgbImage};
use log::{debug, trace};
use nalgebra::Point2;
use ndarray::{s, Array3, Zip};
use serde::Serialize;

use super::{MapError, MapParams, NavOverride};
use crate::auto::{coords, per::LocalObservation};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Persistent mission map.
///
/// Cells are indexed `[y, x, layer]` and hold 255 once the layer has been seen there.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldMap {
    data: Array3<u8>,
}

/// Number of non-zero cells in each layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Coverage {
    pub obstacle: usize,
    pub sample: usize,
    pub navigable: usize,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Layers in a [`WorldMap`]
#[derive(PartialEq, Eq, Clone, Copy, Hash, Debug, Serialize)]
pub enum WorldMapLayer {
    Obstacle = 0,
    Sample = 1,
    Navigable = 2,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl WorldMap {
    /// Value written into a cell once a layer has been observed there.
    pub const SEEN: u8 = 255;

    /// Create an empty square map with `size` cells along each side.
    pub fn new(size: usize) -> Result<Self, MapError> {
        if size == 0 {
            return Err(MapError::ZeroSize);
        }

        Ok(Self {
            data: Array3::zeros((size, size, 3)),
        })
    }

    pub fn size(&self) -> usize {
        self.data.dim().0
    }

    /// Value of a layer at the given cell, or `None` if it's outside the map.
    pub fn get(&self, x: usize, y: usize, layer: WorldMapLayer) -> Option<u8> {
        self.data.get((y, x, layer as usize)).copied()
    }

    /// True if both pitch and roll are within `tol_deg` of level.
    ///
    /// Attitudes are reported in [0, 360) so values just below 360 are also level.
    pub fn is_level(pitch_deg: f64, roll_deg: f64, tol_deg: f64) -> bool {
        util::maths::ang_from_zero_deg(pitch_deg) < tol_deg
            && util::maths::ang_from_zero_deg(roll_deg) < tol_deg
    }

    /// Fold one tick's observation into the map.
    ///
    /// Skipped when the rover is not level, since the rectification assumes flat ground.
    /// Returns true if the map was updated.
    pub fn update(
        &mut self,
        obs: &LocalObservation,
        pose: &RoverPose,
        params: &MapParams,
    ) -> bool {
        if !Self::is_level(pose.pitch_deg, pose.roll_deg, params.level_tol_deg) {
            debug!(
                "Skipping map update, rover not level (pitch {:.2}, roll {:.2})",
                pose.pitch_deg, pose.roll_deg
            );
            return false;
        }

        let size = self.size();
        let cells = |points: &[Point2<f64>]| {
            coords::pix_to_world(points, pose, size, params.map_scale)
        };

        let obstacle = cells(&obs.obstacle);
        let sample = cells(&obs.sample);
        let navigable = cells(&obs.navigable);

        self.mark(&obstacle, WorldMapLayer::Obstacle);
        self.mark(&sample, WorldMapLayer::Sample);
        self.mark(&navigable, WorldMapLayer::Navigable);

        // Navigable terrain overrides obstacle memory at the same location
        match params.nav_override {
            NavOverride::Tick => {
                for c in navigable.iter() {
                    self.data[[c.y, c.x, WorldMapLayer::Obstacle as usize]] = 0;
                }
            }
            NavOverride::Cumulative => {
                let (mut obst, nav) = self.data.multi_slice_mut((
                    s![.., .., WorldMapLayer::Obstacle as usize],
                    s![.., .., WorldMapLayer::Navigable as usize],
                ));
                Zip::from(&mut obst).and(&nav).for_each(|o, &n| {
                    if n > 0 {
                        *o = 0;
                    }
                });
            }
        }

        trace!(
            "Map updated with {} obstacle, {} sample, {} navigable cells",
            obstacle.len(),
            sample.len(),
            navigable.len()
        );

        true
    }

    /// Count of non-zero cells in each layer.
    pub fn coverage(&self) -> Coverage {
        let count = |layer: WorldMapLayer| {
            self.data
                .slice(s![.., .., layer as usize])
                .iter()
                .filter(|&&v| v > 0)
                .count()
        };

        Coverage {
            obstacle: count(WorldMapLayer::Obstacle),
            sample: count(WorldMapLayer::Sample),
            navigable: count(WorldMapLayer::Navigable),
        }
    }

    /// Render the map as an RGB image, red obstacle, green sample, blue navigable.
    ///
    /// World y increases up the image, so the first image row is the highest y.
    pub fn to_image(&self) -> RgbImage {
        let size = self.size() as u32;

        RgbImage::from_fn(size, size, |x, row| {
            let y = (size - 1 - row) as usize;
            let x = x as usize;
            Rgb([
                self.data[[y, x, WorldMapLayer::Obstacle as usize]],
                self.data[[y, x, WorldMapLayer::Sample as usize]],
                self.data[[y, x, WorldMapLayer::Navigable as usize]],
            ])
        })
    }

    fn mark(&mut self, cells: &[Point2<usize>], layer: WorldMapLayer) {
        for c in cells {
            self.data[[c.y, c.x, layer as usize]] = Self::SEEN;
        }
    }
}

impl Default for WorldMap {
    fn default() -> Self {
        let size = MapParams::default().map_size;
        Self {
            data: Array3::zeros((size, size, 3)),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
