use calib_core::nalgebra::Point3;
use calib_core::{ExtrinsicPose, LidarPoint};
use calib_optimize::{
    sample_intensity, ExtrinsicOptimizer, MutualInformationObjective, Objective, OptimizerSettings,
    TrainingFrame,
};
use calib_pinhole::{CameraIntrinsics, ImageBounds, Pixel, Projector};
use image::{GrayImage, Luma};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

const WIDTH: u32 = 640;
const HEIGHT: u32 = 480;
const DEPTH: f64 = 5.0;
const FOCAL: f64 = 1000.0;

fn projector() -> Projector {
    Projector::new(CameraIntrinsics::identity().focals(FOCAL, FOCAL))
        .bounds(ImageBounds::new(WIDTH, HEIGHT))
}

/// An image made of 40 pixel squares of random gray levels.
fn checkerboard(seed: u8) -> GrayImage {
    let mut rng = Pcg64::from_seed([seed; 32]);
    let levels: Vec<u8> = (0..(WIDTH / 40) * (HEIGHT / 40)).map(|_| rng.gen()).collect();
    GrayImage::from_fn(WIDTH, HEIGHT, |x, y| {
        Luma([levels[((y / 40) * (WIDTH / 40) + x / 40) as usize]])
    })
}

/// Lidar points on a wall in front of the camera whose reflectivity copies the image under
/// them when seen through `pose`.
fn scene(pose: &ExtrinsicPose, image: &GrayImage) -> Vec<LidarPoint> {
    let bounds = ImageBounds::new(WIDTH, HEIGHT);
    let inverse = pose.isometry().inverse();
    let mut points = vec![];
    for row in (-230..230).step_by(5) {
        for column in (-310..310).step_by(5) {
            let (u, v) = (f64::from(column) + 0.5, f64::from(row) + 0.5);
            let pixel = Pixel {
                u,
                v,
                distance: DEPTH,
            };
            let reflectivity = match sample_intensity(image, &bounds, &pixel) {
                Some(intensity) => intensity,
                None => continue,
            };
            let camera = Point3::new(u / FOCAL * DEPTH, v / FOCAL * DEPTH, DEPTH);
            let position = inverse * camera;
            points.push(LidarPoint {
                position,
                range: position.coords.norm(),
                reflectivity,
                azimuth: 0.0,
                azimuth_bin: 0,
                laser: 0,
                timestamp: 1,
                source: 0,
            });
        }
    }
    points
}

#[test]
fn true_pose_scores_higher_than_a_shifted_one() {
    let _ = pretty_env_logger::try_init();
    let pose = ExtrinsicPose::new(0.02, -0.01, 0.03, 0.1, -0.05, 0.2);
    let image = checkerboard(11);
    let frame = TrainingFrame::new(1, scene(&pose, &image), image);
    let objective = MutualInformationObjective::new(projector());

    let (reflectivity, intensity) = objective.pairs(&pose, &frame);
    assert_eq!(reflectivity, intensity);
    assert_eq!(reflectivity.len(), frame.points.len());

    let aligned = objective.score(&pose, &frame).unwrap();
    let shifted = objective.score(&pose.perturbed(3, 0.3), &frame).unwrap();
    assert!(aligned > shifted, "{} <= {}", aligned, shifted);
}

#[test]
fn points_outside_the_image_are_not_paired() {
    let pose = ExtrinsicPose::identity();
    let image = checkerboard(3);
    let frame = TrainingFrame::new(1, scene(&pose, &image), image);
    let objective = MutualInformationObjective::new(projector());

    let total = frame.points.len();
    let (reflectivity, _) = objective.pairs(&pose.perturbed(3, 1.0), &frame);
    assert!(reflectivity.len() < total);
    assert!(!reflectivity.is_empty());
}

#[test]
fn empty_frame_is_skipped() {
    let _ = pretty_env_logger::try_init();
    let pose = ExtrinsicPose::identity();
    let image = checkerboard(5);
    let empty = TrainingFrame::new(0, vec![], image.clone());
    let frame = TrainingFrame::new(1, scene(&pose, &image), image);

    let optimizer = ExtrinsicOptimizer::new(
        MutualInformationObjective::new(projector()),
        OptimizerSettings::default(),
    );
    let result = optimizer.optimize(pose, &[empty, frame]).unwrap();
    assert_eq!(result.skipped_frames, 1);
    assert_eq!(result.accepted_steps, 0);
    assert_eq!(result.pose, pose);
    assert!(result.score > 0.0);
}

#[cfg(feature = "serde-serialize")]
#[test]
fn settings_fill_in_defaults() {
    let settings: OptimizerSettings = serde_json::from_str(r#"{ "frame_budget": 4 }"#).unwrap();
    assert_eq!(
        settings,
        OptimizerSettings {
            frame_budget: 4,
            ..OptimizerSettings::default()
        }
    );
}
