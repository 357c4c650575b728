use derive_more::{AsRef, Deref, From, Into};
use nalgebra::{IsometryMatrix3, Point3, Rotation3, Translation3, Vector3, Vector6};

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Number of free parameters of an [`ExtrinsicPose`].
pub const POSE_PARAMETERS: usize = 6;

/// The rigid transform from the lidar frame into the camera frame.
///
/// The pose is stored as the 6-vector `[roll, pitch, yaw, tx, ty, tz]` where the angles are
/// in radians and the translation is in meters. The rotation is composed as
/// `Rx(roll) * (Ry(pitch) * Rz(yaw))`, so the yaw is applied to the point first.
///
/// This is a value type. Every operation that changes a parameter returns a new pose, which
/// allows finite difference schemes to perturb a pose without affecting the original.
#[derive(Debug, Clone, Copy, PartialEq, AsRef, Deref, From, Into)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct ExtrinsicPose(pub Vector6<f64>);

impl ExtrinsicPose {
    pub fn new(roll: f64, pitch: f64, yaw: f64, tx: f64, ty: f64, tz: f64) -> Self {
        Self(Vector6::new(roll, pitch, yaw, tx, ty, tz))
    }

    /// Creates the pose from its angles (roll, pitch, yaw) and translation.
    pub fn from_parts(angles: Vector3<f64>, translation: Vector3<f64>) -> Self {
        Self::new(
            angles.x,
            angles.y,
            angles.z,
            translation.x,
            translation.y,
            translation.z,
        )
    }

    /// A pose with no rotation or translation.
    pub fn identity() -> Self {
        Self(Vector6::zeros())
    }

    pub fn roll(&self) -> f64 {
        self.0[0]
    }

    pub fn pitch(&self) -> f64 {
        self.0[1]
    }

    pub fn yaw(&self) -> f64 {
        self.0[2]
    }

    /// Retrieve `[roll, pitch, yaw]`.
    pub fn angles(&self) -> Vector3<f64> {
        self.0.fixed_rows::<3>(0).into_owned()
    }

    /// Retrieve `[tx, ty, tz]`.
    pub fn translation(&self) -> Vector3<f64> {
        self.0.fixed_rows::<3>(3).into_owned()
    }

    /// The rotation `Rx(roll) * (Ry(pitch) * Rz(yaw))`.
    pub fn rotation(&self) -> Rotation3<f64> {
        let roll = Rotation3::from_axis_angle(&Vector3::x_axis(), self.roll());
        let pitch = Rotation3::from_axis_angle(&Vector3::y_axis(), self.pitch());
        let yaw = Rotation3::from_axis_angle(&Vector3::z_axis(), self.yaw());
        roll * (pitch * yaw)
    }

    /// Retrieve the pose as an isometry (rotation followed by translation).
    pub fn isometry(&self) -> IsometryMatrix3<f64> {
        IsometryMatrix3::from_parts(Translation3::from(self.translation()), self.rotation())
    }

    /// Moves a lidar-frame point into the camera frame.
    pub fn transform(&self, point: Point3<f64>) -> Point3<f64> {
        self.rotation() * point + self.translation()
    }

    /// Returns a copy of the pose with a single parameter offset by `delta`.
    ///
    /// # Panics
    ///
    /// Panics if `parameter >= POSE_PARAMETERS`.
    #[must_use]
    pub fn perturbed(&self, parameter: usize, delta: f64) -> Self {
        let mut parameters = self.0;
        parameters[parameter] += delta;
        Self(parameters)
    }

    /// Returns the pose moved along `direction` by `scale`.
    #[must_use]
    pub fn stepped(&self, direction: &Vector6<f64>, scale: f64) -> Self {
        Self(self.0 + direction * scale)
    }

    /// Euclidean distance between two poses in parameter space.
    pub fn distance(&self, other: &Self) -> f64 {
        (self.0 - other.0).norm()
    }
}
