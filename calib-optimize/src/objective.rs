use calib_core::{ExtrinsicPose, LidarPoint};
use calib_mi::{MiError, MutualInformation};
use calib_pinhole::{ImageBounds, Pixel, Projector};
use image::{DynamicImage, GrayImage};
use log::*;

/// A score to be maximized over extrinsic poses, evaluated on one frame of type `F`.
pub trait Objective<F> {
    type Error: std::fmt::Display;

    fn score(&self, pose: &ExtrinsicPose, frame: &F) -> Result<f64, Self::Error>;
}

/// The lidar points recorded at one timestamp and the camera image taken with them.
#[derive(Debug, Clone)]
pub struct TrainingFrame {
    pub timestamp: u32,
    pub points: Vec<LidarPoint>,
    pub image: GrayImage,
}

impl TrainingFrame {
    pub fn new(timestamp: u32, points: Vec<LidarPoint>, image: GrayImage) -> Self {
        Self {
            timestamp,
            points,
            image,
        }
    }

    /// Converts any decoded image to 8-bit luma.
    pub fn from_image(timestamp: u32, points: Vec<LidarPoint>, image: &DynamicImage) -> Self {
        Self::new(timestamp, points, image.to_luma8())
    }
}

/// The intensity of `image` under a centered pixel, if it lies within the image.
pub fn sample_intensity(image: &GrayImage, bounds: &ImageBounds, pixel: &Pixel) -> Option<u8> {
    let (column, row) = bounds.sample_coordinates(pixel)?;
    if column >= image.width() || row >= image.height() {
        return None;
    }
    Some(image.get_pixel(column, row).0[0])
}

/// Mutual information between the reflectivity of the projected points and the intensity of
/// the image under them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MutualInformationObjective {
    pub projector: Projector,
    pub scorer: MutualInformation,
}

impl MutualInformationObjective {
    pub fn new(projector: Projector) -> Self {
        Self {
            projector,
            scorer: MutualInformation::default(),
        }
    }

    pub fn scorer(self, scorer: MutualInformation) -> Self {
        Self { scorer, ..self }
    }

    /// Reflectivity and intensity of every point of `frame` that lands in its image.
    pub fn pairs(&self, pose: &ExtrinsicPose, frame: &TrainingFrame) -> (Vec<u8>, Vec<u8>) {
        let isometry = pose.isometry();
        let mut reflectivity = Vec::with_capacity(frame.points.len());
        let mut intensity = Vec::with_capacity(frame.points.len());
        for point in &frame.points {
            let camera = isometry * point.position;
            let sample = self
                .projector
                .try_project_camera_point(&camera)
                .ok()
                .and_then(|pixel| sample_intensity(&frame.image, &self.projector.bounds, &pixel));
            if let Some(sample) = sample {
                reflectivity.push(point.reflectivity);
                intensity.push(sample);
            }
        }
        trace!(
            "frame {}: {} of {} points in the image",
            frame.timestamp,
            reflectivity.len(),
            frame.points.len()
        );
        (reflectivity, intensity)
    }
}

impl Objective<TrainingFrame> for MutualInformationObjective {
    type Error = MiError;

    fn score(&self, pose: &ExtrinsicPose, frame: &TrainingFrame) -> Result<f64, MiError> {
        let (reflectivity, intensity) = self.pairs(pose, frame);
        self.scorer.score(&reflectivity, &intensity)
    }
}
