//! This crate projects lidar points into the image of a pinhole camera.
//!
//! A [`Projector`] combines the [`CameraIntrinsics`] of the camera with the [`ImageBounds`] of
//! its frames. Given a point in the lidar frame and a candidate [`ExtrinsicPose`], it moves the
//! point into the camera frame, normalizes it by its depth and applies the intrinsic matrix.
//! Points that land outside of the image are rejected.
//!
//! Pixel coordinates produced here are centered: `(0, 0)` is the middle of the image. Use
//! [`ImageBounds::sample_coordinates`] to turn them into row/column indices.
//!
//! Intrinsics are normally read from an OpenCV calibration file with
//! [`CameraIntrinsics::load`].

mod calibration;

pub use calibration::*;

use calib_core::nalgebra::{Matrix3, Point3, Vector3};
use calib_core::ExtrinsicPose;
use thiserror::Error;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Number of distortion coefficients kept from a calibration file.
pub const DISTORTION_COEFFICIENTS: usize = 5;

/// Reason a point has no pixel.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ProjectionError {
    #[error("point has zero or non-finite depth in the camera frame")]
    DegenerateProjection,
    #[error("pixel ({u}, {v}) is outside of the image")]
    OutOfBounds { u: f64, v: f64 },
}

/// Lens distortion coefficients in OpenCV order `k1, k2, p1, p2, k3`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct DistortionCoefficients(pub [f64; DISTORTION_COEFFICIENTS]);

impl DistortionCoefficients {
    /// Factor applied to both normalized coordinates.
    ///
    /// With `r = x² + y²` this is `(1 + k1·r + k2·r² + k3·r³) · atan(r) / r`, which tends to
    /// one as `r` goes to zero.
    pub fn radial_scale(&self, x: f64, y: f64) -> f64 {
        let [k1, k2, _, _, k3] = self.0;
        let r = x * x + y * y;
        let polynomial = 1.0 + k1 * r + k2 * r * r + k3 * r * r * r;
        if r == 0.0 {
            polynomial
        } else {
            polynomial * r.atan() / r
        }
    }
}

/// Intrinsic parameters of the camera: the projection matrix and the lens distortion.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct CameraIntrinsics {
    pub matrix: Matrix3<f64>,
    pub distortion: DistortionCoefficients,
}

impl CameraIntrinsics {
    /// Intrinsics with an identity matrix and no distortion.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix3::identity(),
            distortion: DistortionCoefficients::default(),
        }
    }

    pub fn new(matrix: Matrix3<f64>) -> Self {
        Self {
            matrix,
            distortion: DistortionCoefficients::default(),
        }
    }

    pub fn focals(self, fx: f64, fy: f64) -> Self {
        let mut matrix = self.matrix;
        matrix[(0, 0)] = fx;
        matrix[(1, 1)] = fy;
        Self { matrix, ..self }
    }

    pub fn principal_point(self, cx: f64, cy: f64) -> Self {
        let mut matrix = self.matrix;
        matrix[(0, 2)] = cx;
        matrix[(1, 2)] = cy;
        Self { matrix, ..self }
    }

    pub fn distortion(self, distortion: DistortionCoefficients) -> Self {
        Self { distortion, ..self }
    }
}

/// Size of the camera frames in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ImageBounds {
    pub width: u32,
    pub height: u32,
}

impl Default for ImageBounds {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

impl ImageBounds {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn half_width(&self) -> f64 {
        f64::from(self.width) / 2.0
    }

    pub fn half_height(&self) -> f64 {
        f64::from(self.height) / 2.0
    }

    /// Whether a centered pixel lies strictly inside of the image.
    pub fn contains(&self, u: f64, v: f64) -> bool {
        u.abs() < self.half_width() && v.abs() < self.half_height()
    }

    /// Column and row of the image sample under a centered pixel.
    ///
    /// The sample is taken at `floor(u + width/2 - 1)`, `floor(v + height/2 - 1)`. Pixels on
    /// the left or top edge map outside of the image and yield `None`.
    pub fn sample_coordinates(&self, pixel: &Pixel) -> Option<(u32, u32)> {
        let column = (pixel.u + self.half_width() - 1.0).floor();
        let row = (pixel.v + self.half_height() - 1.0).floor();
        if column < 0.0
            || row < 0.0
            || column >= f64::from(self.width)
            || row >= f64::from(self.height)
        {
            return None;
        }
        Some((column as u32, row as u32))
    }
}

/// A point that landed in the image.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct Pixel {
    /// Centered horizontal pixel coordinate.
    pub u: f64,
    /// Centered vertical pixel coordinate.
    pub v: f64,
    /// Distance from the camera center to the point in meters.
    pub distance: f64,
}

/// Projects lidar points into the image under a candidate extrinsic pose.
///
/// ```
/// use calib_core::{nalgebra::Point3, ExtrinsicPose};
/// use calib_pinhole::{CameraIntrinsics, Projector};
///
/// let projector = Projector::new(CameraIntrinsics::identity().focals(1000.0, 1000.0));
/// let pixel = projector
///     .project(&Point3::new(0.5, -0.25, 5.0), &ExtrinsicPose::identity())
///     .unwrap();
/// assert!((pixel.u - 100.0).abs() < 1e-9);
/// assert!((pixel.v + 50.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    pub intrinsics: CameraIntrinsics,
    pub bounds: ImageBounds,
    /// Apply [`DistortionCoefficients::radial_scale`] before the intrinsic matrix.
    pub distortion: bool,
}

impl Projector {
    pub fn new(intrinsics: CameraIntrinsics) -> Self {
        Self {
            intrinsics,
            bounds: ImageBounds::default(),
            distortion: false,
        }
    }

    pub fn bounds(self, bounds: ImageBounds) -> Self {
        Self { bounds, ..self }
    }

    pub fn with_distortion(self, distortion: bool) -> Self {
        Self { distortion, ..self }
    }

    /// Projects a point given in the lidar frame.
    pub fn try_project(
        &self,
        point: &Point3<f64>,
        pose: &ExtrinsicPose,
    ) -> Result<Pixel, ProjectionError> {
        self.try_project_camera_point(&pose.transform(*point))
    }

    /// Same as [`Projector::try_project`], but any failure is `None`.
    pub fn project(&self, point: &Point3<f64>, pose: &ExtrinsicPose) -> Option<Pixel> {
        self.try_project(point, pose).ok()
    }

    /// Projects a point that is already in the camera frame.
    pub fn try_project_camera_point(&self, point: &Point3<f64>) -> Result<Pixel, ProjectionError> {
        let depth = point.z;
        if depth == 0.0 || !depth.is_finite() {
            return Err(ProjectionError::DegenerateProjection);
        }
        let (mut x, mut y) = (point.x / depth, point.y / depth);
        if self.distortion {
            let scale = self.intrinsics.distortion.radial_scale(x, y);
            x *= scale;
            y *= scale;
        }
        let image = self.intrinsics.matrix * Vector3::new(x, y, 1.0);
        let (u, v) = (image.x, image.y);
        if !self.bounds.contains(u, v) {
            return Err(ProjectionError::OutOfBounds { u, v });
        }
        Ok(Pixel {
            u,
            v,
            distance: point.coords.norm(),
        })
    }
}
