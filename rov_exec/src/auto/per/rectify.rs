//! # Perspective Rectifier
//!
//! Warps the forward camera frame into a top-down grid of fixed scale using the projective
//! transform defined by a calibrated source quadrilateral and its destination square.

// -----------------------------------------------------------------------------------------------
// IMPORTS
// -----------------------------------------------------------------------------------------------

use image::{Rgb, RgbImage};
use nalgebra::{DMatrix, DVector, Matrix3, Vector3};
use ndarray::Array2;

use super::PerError;

// -----------------------------------------------------------------------------------------------
// CONSTANTS
// -----------------------------------------------------------------------------------------------

/// Homogeneous coordinates with a smaller magnitude than this are treated as points at infinity.
const MIN_HOMOGENEOUS_W: f64 = 1e-12;

// -----------------------------------------------------------------------------------------------
// STRUCTS
// -----------------------------------------------------------------------------------------------

/// A quadrilateral of four `[x, y]` image points.
pub type Quad = [[f64; 2]; 4];

/// Bilinear sampling taps for one output pixel, as `(flat source index, weight)` pairs.
///
/// Taps falling outside the source frame carry zero weight.
type Taps = [(usize, f64); 4];

/// Perspective rectifier for frames of a fixed size.
///
/// The output grid has the same dimensions as the input frame.
#[derive(Debug, Clone)]
pub struct Rectifier {
    width: u32,
    height: u32,

    /// Sampling taps for each output pixel, in row-major order.
    lut: Vec<Taps>,

    /// Rectified validity mask, true where real image content was projected.
    validity: Array2<bool>,
}

// -----------------------------------------------------------------------------------------------
// IMPLS
// -----------------------------------------------------------------------------------------------

impl Rectifier {
    /// Build a rectifier mapping `src` onto `dst` for frames of `width` x `height` pixels.
    pub fn new(src: &Quad, dst: &Quad, width: u32, height: u32) -> Result<Self, PerError> {
        if width == 0 || height == 0 {
            return Err(PerError::FrameTooSmall {
                width,
                height,
                min_width: 1,
                min_height: 1,
            });
        }

        let transform = perspective_transform(src, dst)?;
        let inverse = transform.try_inverse().ok_or(PerError::DegenerateQuad)?;

        // Precompute where each output pixel samples the input
        let mut lut = Vec::with_capacity((width * height) as usize);
        for v in 0..height {
            for u in 0..width {
                lut.push(taps(&inverse, u as f64, v as f64, width, height));
            }
        }

        // The warp of an all-white mask is non-zero wherever any tap landed inside the frame
        let validity = Array2::from_shape_fn((height as usize, width as usize), |(r, c)| {
            let white: f64 = lut[r * width as usize + c]
                .iter()
                .filter(|t| t.1 > 0.0)
                .map(|&(_, w)| w * 255.0)
                .sum();
            to_u8(white) > 0
        });

        Ok(Self {
            width,
            height,
            lut,
            validity,
        })
    }

    /// Size of the frames this rectifier accepts, as `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Mask of rectified pixels which originate from real image content.
    pub fn validity(&self) -> &Array2<bool> {
        &self.validity
    }

    /// Rectify a colour frame.
    pub fn warp_rgb(&self, frame: &RgbImage) -> Result<RgbImage, PerError> {
        self.check_dims(frame.width(), frame.height())?;

        let raw = frame.as_raw();
        let mut out = RgbImage::new(self.width, self.height);

        for (i, taps) in self.lut.iter().enumerate() {
            let mut acc = [0f64; 3];
            for &(idx, w) in taps.iter().filter(|t| t.1 > 0.0) {
                for (ch, a) in acc.iter_mut().enumerate() {
                    *a += w * raw[idx * 3 + ch] as f64;
                }
            }

            let u = i as u32 % self.width;
            let v = i as u32 / self.width;
            out.put_pixel(u, v, Rgb([to_u8(acc[0]), to_u8(acc[1]), to_u8(acc[2])]));
        }

        Ok(out)
    }

    /// Rectify a single channel mask indexed `[row, col]`.
    pub fn warp_mask(&self, mask: &Array2<u8>) -> Result<Array2<u8>, PerError> {
        let (rows, cols) = mask.dim();
        self.check_dims(cols as u32, rows as u32)?;

        let width = self.width as usize;

        Ok(Array2::from_shape_fn(mask.dim(), |(r, c)| {
            let acc: f64 = self.lut[r * width + c]
                .iter()
                .filter(|t| t.1 > 0.0)
                .map(|&(idx, w)| w * mask[[idx / width, idx % width]] as f64)
                .sum();
            to_u8(acc)
        }))
    }

    fn check_dims(&self, width: u32, height: u32) -> Result<(), PerError> {
        if (width, height) != (self.width, self.height) {
            Err(PerError::DimensionMismatch {
                expected: (self.width, self.height),
                found: (width, height),
            })
        } else {
            Ok(())
        }
    }
}

// -----------------------------------------------------------------------------------------------
// FUNCTIONS
// -----------------------------------------------------------------------------------------------

/// Solve for the homography taking each `src` point onto the matching `dst` point.
///
/// The bottom-right element is fixed at 1, leaving an 8x8 linear system.
pub fn perspective_transform(src: &Quad, dst: &Quad) -> Result<Matrix3<f64>, PerError> {
    let mut a = DMatrix::<f64>::zeros(8, 8);
    let mut b = DVector::<f64>::zeros(8);

    for i in 0..4 {
        let [x, y] = src[i];
        let [u, v] = dst[i];

        // u * (h6 x + h7 y + 1) = h0 x + h1 y + h2
        a[(2 * i, 0)] = x;
        a[(2 * i, 1)] = y;
        a[(2 * i, 2)] = 1.0;
        a[(2 * i, 6)] = -x * u;
        a[(2 * i, 7)] = -y * u;
        b[2 * i] = u;

        // v * (h6 x + h7 y + 1) = h3 x + h4 y + h5
        a[(2 * i + 1, 3)] = x;
        a[(2 * i + 1, 4)] = y;
        a[(2 * i + 1, 5)] = 1.0;
        a[(2 * i + 1, 6)] = -x * v;
        a[(2 * i + 1, 7)] = -y * v;
        b[2 * i + 1] = v;
    }

    let h = a.lu().solve(&b).ok_or(PerError::DegenerateQuad)?;

    if h.iter().any(|e| !e.is_finite()) {
        return Err(PerError::DegenerateQuad);
    }

    Ok(Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0))
}

/// Project a point through a homography.
///
/// Returns `None` for points which map to infinity.
pub fn project(h: &Matrix3<f64>, x: f64, y: f64) -> Option<[f64; 2]> {
    let p = h * Vector3::new(x, y, 1.0);
    if p[2].abs() < MIN_HOMOGENEOUS_W {
        return None;
    }
    Some([p[0] / p[2], p[1] / p[2]])
}

/// Bilinear taps sampling the source at the inverse projection of output pixel `(u, v)`.
fn taps(inverse: &Matrix3<f64>, u: f64, v: f64, width: u32, height: u32) -> Taps {
    let mut out = [(0usize, 0f64); 4];

    let [x, y] = match project(inverse, u, v) {
        Some(p) if p[0].is_finite() && p[1].is_finite() => p,
        _ => return out,
    };

    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;

    let neighbours = [
        (x0, y0, (1.0 - fx) * (1.0 - fy)),
        (x0 + 1.0, y0, fx * (1.0 - fy)),
        (x0, y0 + 1.0, (1.0 - fx) * fy),
        (x0 + 1.0, y0 + 1.0, fx * fy),
    ];

    for (tap, &(nx, ny, w)) in out.iter_mut().zip(neighbours.iter()) {
        let inside = nx >= 0.0 && ny >= 0.0 && nx < width as f64 && ny < height as f64;
        if inside && w > 0.0 {
            *tap = (ny as usize * width as usize + nx as usize, w);
        }
    }

    out
}

fn to_u8(value: f64) -> u8 {
    value.round().max(0.0).min(255.0) as u8
}

// -----------------------------------------------------------------------------------------------
// TESTS
// -----------------------------------------------------------------------------------------------
