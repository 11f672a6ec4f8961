//! Implementations for the perception manager state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use image::{Rgb, RgbImage};
use log::{debug, error, warn};
use ndarray::Array2;

// Internal
use super::{
    classify, rectify::Rectifier, LocalObservation, PerError, PerInitError, PerParams,
    PerStatusReport, Perception,
};
use crate::auto::coords::{self, PolarObservation};
use util::{
    archive::{ArchiveError, Archiver},
    module::State,
    params,
    session::Session,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Perception manager.
///
/// Holds the parameters and the rectifier for the most recent frame size.
#[derive(Default)]
pub struct PerMgr {
    pub(crate) params: PerParams,

    rectifier: Option<Rectifier>,

    pub(crate) report: PerStatusReport,
    arch_report: Archiver,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl PerMgr {
    /// Create a manager from already loaded parameters, without archiving.
    pub fn new(params: PerParams) -> Self {
        Self {
            params,
            ..Default::default()
        }
    }

    pub fn params(&self) -> &PerParams {
        &self.params
    }

    /// Status report from the most recent frame.
    pub fn status_report(&self) -> PerStatusReport {
        self.report
    }

    /// Get the rectifier for frames of this size, building it if the size changed.
    ///
    /// Returns true in the flag if a new rectifier was built.
    fn rectifier_for(&mut self, width: u32, height: u32) -> Result<(&Rectifier, bool), PerError> {
        let rebuild = match self.rectifier {
            Some(ref r) => r.dimensions() != (width, height),
            None => true,
        };

        if rebuild {
            debug!("Building rectifier for {}x{} px frames", width, height);
            self.rectifier = Some(Rectifier::new(
                &self.params.src_quad_px,
                &self.params.dst_quad(width, height),
                width,
                height,
            )?);
        }

        match self.rectifier {
            Some(ref r) => Ok((r, rebuild)),
            None => Err(PerError::DegenerateQuad),
        }
    }

    /// Frames must be non-empty and contain the whole source quadrilateral.
    fn check_frame(&self, frame: &RgbImage) -> Result<(), PerError> {
        let (width, height) = frame.dimensions();
        let (min_width, min_height) = self.params.min_frame_size();

        if width == 0 || height == 0 || width < min_width || height < min_height {
            return Err(PerError::FrameTooSmall {
                width,
                height,
                min_width,
                min_height,
            });
        }

        Ok(())
    }
}

impl State for PerMgr {
    type InitData = String;
    type InitError = PerInitError;

    type InputData = RgbImage;
    type OutputData = Perception;
    type StatusReport = PerStatusReport;
    type ProcError = PerError;

    /// Initialise the perception manager.
    ///
    /// Expected init data is the path to the parameter file
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>
    {
        self.params = params::load(&init_data).map_err(PerInitError::ParamLoadError)?;

        self.arch_report = Archiver::from_path(session, "per/status_report.csv")
            .map_err(PerInitError::ArchiveError)?;

        // The rectifier depends on the frame size so is built on the first frame
        self.rectifier = None;

        Ok(())
    }

    /// Process a single camera frame.
    fn proc(&mut self, frame: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>
    {
        if let Err(e) = self.check_frame(frame) {
            error!("Rejecting camera frame: {}", e);
            return Err(e);
        }

        let nav_rgb_thresh = self.params.nav_rgb_thresh;
        let sample_thresh = self.params.sample_thresh;
        let range_gate = self.params.range_gate_px;
        let gate_samples = self.params.gate_samples;

        let (rectifier, rebuilt) = self.rectifier_for(frame.width(), frame.height())?;

        // Classify in the rectified grid, except samples which are found on the raw frame
        let warped = rectifier.warp_rgb(frame)?;
        let nav = classify::navigable(&warped, nav_rgb_thresh);
        let obs = classify::obstacles(&nav, rectifier.validity());
        let sample = rectifier
            .warp_mask(&classify::sample_mask(frame, &sample_thresh))?
            .mapv(|v| v > 0);

        let vision_image = vision_image(&obs, &sample, &nav);

        let navigable = coords::impose_range(coords::rover_coords(&nav), range_gate);
        let obstacle = coords::impose_range(coords::rover_coords(&obs), range_gate);
        let mut sample_pts = coords::rover_coords(&sample);
        if gate_samples {
            sample_pts = coords::impose_range(sample_pts, range_gate);
        }

        let polar = PolarObservation {
            nav: coords::to_polar(&navigable),
            samples: coords::to_polar(&sample_pts),
        };

        self.report = PerStatusReport {
            num_nav_px: count(&nav),
            num_obstacle_px: count(&obs),
            num_sample_px: count(&sample),
            num_nav_pts: navigable.len(),
            num_obstacle_pts: obstacle.len(),
            num_sample_pts: sample_pts.len(),
            rectifier_rebuilt: rebuilt,
        };

        debug!(
            "Perception: {} nav, {} obstacle, {} sample points",
            self.report.num_nav_pts, self.report.num_obstacle_pts, self.report.num_sample_pts
        );

        match self.arch_report.serialise(self.report) {
            Ok(()) | Err(ArchiveError::NotInitialised) => (),
            Err(e) => warn!("Could not archive perception status: {}", e),
        }

        let perception = Perception {
            local: LocalObservation {
                navigable,
                obstacle,
                sample: sample_pts,
            },
            polar,
            vision_image,
        };

        Ok((perception, self.report))
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn count(mask: &Array2<bool>) -> usize {
    mask.iter().filter(|&&v| v).count()
}

/// Three channel overlay of the rectified masks.
fn vision_image(obs: &Array2<bool>, sample: &Array2<bool>, nav: &Array2<bool>) -> RgbImage {
    let (rows, cols) = nav.dim();
    let on = |m: &Array2<bool>, x: u32, y: u32| {
        if m[[y as usize, x as usize]] { 255 } else { 0 }
    };

    RgbImage::from_fn(cols as u32, rows as u32, |x, y| {
        Rgb([on(obs, x, y), on(sample, x, y), on(nav, x, y)])
    })
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    /// A simulator-like frame: bright ground below row 100, dark sky above, and a yellow rock.
    fn test_frame() -> RgbImage {
        RgbImage::from_fn(320, 160, |x, y| {
            if (130..=190).contains(&x) && (120..=136).contains(&y) {
                Rgb([200, 160, 20])
            } else if y >= 100 {
                Rgb([200, 190, 180])
            } else {
                Rgb([40, 30, 20])
            }
        })
    }

    #[test]
    fn test_frame_too_small() {
        let mut mgr = PerMgr::new(PerParams::default());

        match mgr.proc(&RgbImage::new(0, 0)) {
            Err(PerError::FrameTooSmall { width: 0, height: 0, .. }) => (),
            r => panic!("Expected FrameTooSmall, got {:?}", r.map(|_| ())),
        }

        // Source quad reaches x = 301, y = 140
        match mgr.proc(&RgbImage::new(300, 160)) {
            Err(PerError::FrameTooSmall { min_width: 302, min_height: 141, .. }) => (),
            r => panic!("Expected FrameTooSmall, got {:?}", r.map(|_| ())),
        }
    }

    #[test]
    fn test_proc() {
        let mut mgr = PerMgr::new(PerParams::default());
        let (per, report) = mgr.proc(&test_frame()).unwrap();

        assert!(report.rectifier_rebuilt);
        assert!(report.num_nav_px > 0);
        assert!(!per.polar.nav.is_empty());
        assert!(!per.local.sample.is_empty());
        assert_eq!(per.polar.samples.len(), per.local.sample.len());
        assert_eq!(per.vision_image.dimensions(), (320, 160));

        // Everything in the local observation is inside the gate
        for p in per.local.navigable.iter().chain(per.local.obstacle.iter()) {
            assert!(p.coords.norm() < 80.0);
        }

        // Rock is roughly straight ahead
        for p in per.local.sample.iter() {
            assert!(p.y.abs() < p.x);
        }

        // Second frame of the same size reuses the rectifier
        let (_, report) = mgr.proc(&test_frame()).unwrap();
        assert!(!report.rectifier_rebuilt);
    }

    #[test]
    fn test_no_obstacle_outside_validity() {
        let mut mgr = PerMgr::new(PerParams::default());
        let (per, _) = mgr.proc(&RgbImage::new(320, 160)).unwrap();

        // All-black frame: no navigable terrain, so obstacles exactly fill the valid region
        let valid = mgr.rectifier.as_ref().unwrap().validity();
        for ((r, c), &v) in valid.indexed_iter() {
            let px = per.vision_image.get_pixel(c as u32, r as u32);
            assert_eq!(px[0] == 255, v);
            assert_eq!(px[2], 0);
        }
    }
}
