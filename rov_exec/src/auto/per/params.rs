//! # Perception Parameters

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

use super::{classify::SampleThresh, rectify::Quad};

// -----------------------------------------------------------------------------------------------
// STRUCTS
// -----------------------------------------------------------------------------------------------

/// Parameters for the perception manager.
///
/// Missing fields in a parameter file take their default values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerParams {
    /// Per-channel RGB values which navigable terrain must strictly exceed.
    pub nav_rgb_thresh: [u8; 3],

    /// HSV band identifying rock samples.
    pub sample_thresh: SampleThresh,

    /// Calibration quadrilateral in the camera frame, as `[x, y]` pixels.
    ///
    /// Ordered bottom-left, bottom-right, top-right, top-left.
    pub src_quad_px: Quad,

    /// Explicit destination quadrilateral in the rectified grid. If not given it is derived
    /// from `dst_half_size_px` and `bottom_offset_px`.
    pub dst_quad_px: Option<Quad>,

    /// Half the side of the destination square. The calibration square is one meter across, so
    /// this fixes the grid scale at `2 * dst_half_size_px` pixels per meter.
    ///
    /// Units: rectified pixels
    pub dst_half_size_px: f64,

    /// Distance between the bottom of the frame and the near edge of the destination square,
    /// since the frame's lower edge is ahead of the rover itself.
    ///
    /// Units: rectified pixels
    pub bottom_offset_px: f64,

    /// Points at or beyond this distance from the rover are discarded.
    ///
    /// Units: rectified pixels
    pub range_gate_px: f64,

    /// Also apply the range gate to sample points.
    pub gate_samples: bool,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl Default for PerParams {
    fn default() -> Self {
        Self {
            nav_rgb_thresh: [160, 160, 160],
            sample_thresh: SampleThresh::default(),
            src_quad_px: [[14.0, 140.0], [301.0, 140.0], [200.0, 96.0], [118.0, 96.0]],
            dst_quad_px: None,
            dst_half_size_px: 5.0,
            bottom_offset_px: 6.0,
            range_gate_px: 80.0,
            gate_samples: false,
        }
    }
}

impl PerParams {
    /// Destination quadrilateral for frames of the given size, matching the corner order of
    /// `src_quad_px`.
    pub fn dst_quad(&self, width: u32, height: u32) -> Quad {
        if let Some(q) = self.dst_quad_px {
            return q;
        }

        let cx = width as f64 / 2.0;
        let near = height as f64 - self.bottom_offset_px;
        let far = near - 2.0 * self.dst_half_size_px;
        let s = self.dst_half_size_px;

        [[cx - s, near], [cx + s, near], [cx + s, far], [cx - s, far]]
    }

    /// Smallest frame, as `(width, height)`, which contains the source quadrilateral.
    pub fn min_frame_size(&self) -> (u32, u32) {
        let max_x = self.src_quad_px.iter().map(|p| p[0]).fold(0.0, f64::max);
        let max_y = self.src_quad_px.iter().map(|p| p[1]).fold(0.0, f64::max);

        (max_x.floor() as u32 + 1, max_y.floor() as u32 + 1)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_dst_quad() {
        let params = PerParams::default();

        assert_eq!(
            params.dst_quad(320, 160),
            [[155.0, 154.0], [165.0, 154.0], [165.0, 144.0], [155.0, 144.0]]
        );

        let explicit = PerParams {
            dst_quad_px: Some([[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]]),
            ..Default::default()
        };
        assert_eq!(explicit.dst_quad(320, 160)[0], [0.0, 1.0]);
    }

    #[test]
    fn test_min_frame_size() {
        assert_eq!(PerParams::default().min_frame_size(), (302, 141));
    }

    #[test]
    fn test_partial_toml() {
        let params: PerParams = util::params::from_str(
            "nav_rgb_thresh = [170, 165, 150]\nrange_gate_px = 60.0\n\n[sample_thresh]\nhue_max = 31\n",
        )
        .unwrap();

        assert_eq!(params.nav_rgb_thresh, [170, 165, 150]);
        assert_eq!(params.range_gate_px, 60.0);
        assert_eq!(params.sample_thresh.hue_max, 31);
        assert_eq!(params.sample_thresh.hue_min, 19);
        assert_eq!(params.src_quad_px, PerParams::default().src_quad_px);
    }
}
