use approx::assert_relative_eq;
use calib_core::nalgebra::{Point3, Vector3};
use calib_core::ExtrinsicPose;
use calib_pinhole::{
    CalibrationError, CameraIntrinsics, DistortionCoefficients, ImageBounds, LoadStage,
    ProjectionError, Projector,
};
use proptest::prelude::*;
use std::f64::consts::FRAC_PI_2;
use std::io::Write;

fn projector() -> Projector {
    Projector::new(
        CameraIntrinsics::identity()
            .focals(1200.0, 1100.0)
            .principal_point(15.0, -8.0),
    )
}

#[test]
fn matches_pinhole_formula() {
    let pose = ExtrinsicPose::new(0.1, -0.05, 0.2, 0.3, -0.1, 0.5);
    let point = Point3::new(0.4, -0.2, 6.0);
    let camera = pose.rotation() * point.coords + Vector3::new(0.3, -0.1, 0.5);

    let pixel = projector().try_project(&point, &pose).unwrap();
    assert_relative_eq!(pixel.u, 1200.0 * camera.x / camera.z + 15.0, epsilon = 1e-9);
    assert_relative_eq!(pixel.v, 1100.0 * camera.y / camera.z - 8.0, epsilon = 1e-9);
    assert_relative_eq!(pixel.distance, camera.norm(), epsilon = 1e-12);
}

#[test]
fn rotations_compose_as_roll_pitch_yaw() {
    // A quarter turn of yaw takes the lidar x axis onto the camera y axis.
    let pose = ExtrinsicPose::new(0.0, 0.0, FRAC_PI_2, 0.0, 0.0, 4.0);
    let pixel = projector()
        .try_project(&Point3::new(0.5, 0.0, 0.0), &pose)
        .unwrap();
    assert_relative_eq!(pixel.u, 15.0, epsilon = 1e-9);
    assert_relative_eq!(pixel.v, 1100.0 * 0.5 / 4.0 - 8.0, epsilon = 1e-9);
}

#[test]
fn zero_depth_is_degenerate() {
    let result = projector().try_project(&Point3::new(1.0, 1.0, 0.0), &ExtrinsicPose::identity());
    assert_eq!(result, Err(ProjectionError::DegenerateProjection));
    let result = projector().try_project(
        &Point3::new(1.0, 1.0, f64::NAN),
        &ExtrinsicPose::identity(),
    );
    assert_eq!(result, Err(ProjectionError::DegenerateProjection));
}

#[test]
fn points_outside_of_the_image_are_rejected() {
    let projector = Projector::new(CameraIntrinsics::identity().focals(1000.0, 1000.0));
    let pose = ExtrinsicPose::identity();
    assert!(projector.project(&Point3::new(0.95, 0.0, 1.0), &pose).is_some());
    assert!(matches!(
        projector.try_project(&Point3::new(0.96, 0.0, 1.0), &pose),
        Err(ProjectionError::OutOfBounds { .. })
    ));
    assert!(projector.project(&Point3::new(0.0, -0.539, 1.0), &pose).is_some());
    assert!(projector.project(&Point3::new(0.0, -0.54, 1.0), &pose).is_none());

    let small = projector.bounds(ImageBounds::new(640, 480));
    assert!(small.project(&Point3::new(0.4, 0.0, 1.0), &pose).is_none());
}

#[test]
fn points_behind_the_camera_still_project() {
    // Only zero depth is degenerate, a negative depth flips the point through the center.
    let projector = Projector::new(CameraIntrinsics::identity().focals(1000.0, 1000.0));
    let pixel = projector
        .project(&Point3::new(0.1, 0.0, -1.0), &ExtrinsicPose::identity())
        .unwrap();
    assert_relative_eq!(pixel.u, -100.0, epsilon = 1e-9);
}

#[test]
fn distortion_is_applied_only_when_enabled() {
    let distortion = DistortionCoefficients([0.1, 0.01, 0.0, 0.0, 0.001]);
    let intrinsics = CameraIntrinsics::identity()
        .focals(500.0, 500.0)
        .distortion(distortion);
    let point = Point3::new(0.3, 0.2, 1.0);
    let pose = ExtrinsicPose::identity();

    let plain = Projector::new(intrinsics).project(&point, &pose).unwrap();
    assert_relative_eq!(plain.u, 150.0, epsilon = 1e-9);

    let distorted = Projector::new(intrinsics)
        .with_distortion(true)
        .project(&point, &pose)
        .unwrap();
    let scale = distortion.radial_scale(0.3, 0.2);
    assert_relative_eq!(distorted.u, 500.0 * 0.3 * scale, epsilon = 1e-9);
    assert_relative_eq!(distorted.v, 500.0 * 0.2 * scale, epsilon = 1e-9);
}

#[test]
fn accepted_pixels_are_inside_bounds() {
    let projector = projector();
    proptest!(|(x in -20.0..20.0f64, y in -20.0..20.0f64, z in 0.1..50.0f64, yaw in -3.0..3.0f64)| {
        let pose = ExtrinsicPose::new(0.0, 0.0, yaw, 0.0, 0.0, 0.0);
        if let Some(pixel) = projector.project(&Point3::new(x, y, z), &pose) {
            prop_assert!(pixel.u.abs() < 960.0);
            prop_assert!(pixel.v.abs() < 540.0);
            prop_assert!(pixel.distance > 0.0);
        }
    });
}

#[test]
fn loads_calibration_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        concat!(
            "%YAML:1.0\n---\n",
            "K: !!opencv-matrix\n   rows: 3\n   cols: 3\n   dt: d\n",
            "   data: [ 500., 0., 0., 0., 400., 0., 0., 0., 1. ]\n",
            "D: !!opencv-matrix\n   rows: 1\n   cols: 5\n   dt: d\n",
            "   data: [ 0., 0., 0., 0., 0. ]\n",
        )
    )
    .unwrap();
    let intrinsics = CameraIntrinsics::load(file.path()).unwrap();
    assert_eq!(intrinsics.matrix[(0, 0)], 1000.0);
    assert_eq!(intrinsics.matrix[(1, 1)], 800.0);
    assert_eq!(intrinsics.distortion, DistortionCoefficients::default());
}

#[test]
fn corrupt_calibration_file_reports_stage() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "K: [1, 2, 3]\n").unwrap();
    match CameraIntrinsics::load(file.path()) {
        Err(CalibrationError::CalibrationFileCorrupt { path, stage, .. }) => {
            assert_eq!(path, file.path());
            assert_eq!(stage, LoadStage::Parse);
        }
        other => panic!("unexpected result {:?}", other),
    }
}

#[test]
fn missing_calibration_file() {
    assert!(matches!(
        CameraIntrinsics::load("/nonexistent/cam_mono.yml"),
        Err(CalibrationError::CalibrationFileMissing { .. })
    ));
}
