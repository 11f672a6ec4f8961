//! # Terrain Classifier
//!
//! Fixed threshold colour rules splitting a frame into navigable terrain, obstacles and rock
//! samples.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use image::RgbImage;
use ndarray::{Array2, Zip};
use serde::{Deserialize, Serialize};

// -----------------------------------------------------------------------------------------------
// STRUCTS
// -----------------------------------------------------------------------------------------------

/// HSV band identifying yellow rock samples. All bounds are inclusive.
///
/// Hue uses the 8-bit convention of 0 to 179, saturation and value 0 to 255.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleThresh {
    pub hue_min: u8,
    pub hue_max: u8,
    pub sat_min: u8,
    pub val_min: u8,
}

impl Default for SampleThresh {
    fn default() -> Self {
        Self {
            hue_min: 19,
            hue_max: 29,
            sat_min: 100,
            val_min: 100,
        }
    }
}

impl SampleThresh {
    /// True if the HSV triple lies in the band.
    pub fn contains(&self, hsv: [u8; 3]) -> bool {
        hsv[0] >= self.hue_min
            && hsv[0] <= self.hue_max
            && hsv[1] >= self.sat_min
            && hsv[2] >= self.val_min
    }
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Navigable terrain mask: true where every channel strictly exceeds its threshold.
pub fn navigable(img: &RgbImage, rgb_thresh: [u8; 3]) -> Array2<bool> {
    Array2::from_shape_fn((img.height() as usize, img.width() as usize), |(r, c)| {
        let px = img.get_pixel(c as u32, r as u32).0;
        px.iter().zip(rgb_thresh.iter()).all(|(p, t)| p > t)
    })
}

/// Obstacle mask: everything that is not navigable, restricted to pixels with real data.
pub fn obstacles(navigable: &Array2<bool>, validity: &Array2<bool>) -> Array2<bool> {
    Zip::from(navigable)
        .and(validity)
        .map_collect(|&nav, &valid| valid && !nav)
}

/// Sample mask on an unrectified frame, 255 for pixels in the sample band and 0 otherwise.
pub fn sample_mask(img: &RgbImage, thresh: &SampleThresh) -> Array2<u8> {
    Array2::from_shape_fn((img.height() as usize, img.width() as usize), |(r, c)| {
        if thresh.contains(rgb_to_hsv(img.get_pixel(c as u32, r as u32).0)) {
            255
        } else {
            0
        }
    })
}

/// Convert an 8-bit RGB triple into 8-bit HSV.
///
/// Hue is halved into 0 to 179 so it fits in a byte.
pub fn rgb_to_hsv(rgb: [u8; 3]) -> [u8; 3] {
    let r = rgb[0] as f64;
    let g = rgb[1] as f64;
    let b = rgb[2] as f64;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let delta = max - min;

    let sat = if max > 0.0 { 255.0 * delta / max } else { 0.0 };

    let mut hue_deg = if delta == 0.0 {
        0.0
    } else if max == r {
        60.0 * (g - b) / delta
    } else if max == g {
        120.0 + 60.0 * (b - r) / delta
    } else {
        240.0 + 60.0 * (r - g) / delta
    };
    if hue_deg < 0.0 {
        hue_deg += 360.0;
    }

    [
        ((hue_deg / 2.0).round() as u16 % 180) as u8,
        sat.round() as u8,
        max as u8,
    ]
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
