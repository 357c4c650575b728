//! # Calibration Core
//!
//! Common types shared by every crate of the lidar/camera calibration workspace.
//! This includes the decoded lidar point, the six-parameter extrinsic pose relating the
//! lidar frame to the camera frame, and the index and window that accumulate decoded
//! points until they are paired with a camera frame.
//!
//! The crate is designed to be small. It re-exports [`nalgebra`] so that downstream
//! crates agree on a single version of the linear algebra types.
//!
//! ## Frames
//!
//! Two coordinate frames are involved:
//!
//! * The **lidar frame**, in which the sensor reports its points. Distances are in meters.
//!   The `y` axis points towards azimuth zero, the `x` axis towards azimuth 90 degrees and
//!   the `z` axis up along the spin axis.
//! * The **camera frame**, in which `z` is the depth along the optical axis.
//!
//! An [`ExtrinsicPose`] maps a point from the lidar frame into the camera frame:
//!
//! ```text
//!   camera = Rx(roll) * Ry(pitch) * Rz(yaw) * lidar + (tx, ty, tz)
//! ```

mod point;
mod pose;
mod store;
mod window;

pub use nalgebra;
pub use point::*;
pub use pose::*;
pub use store::*;
pub use window::*;
