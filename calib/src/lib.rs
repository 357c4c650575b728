//! # `calib`
//!
//! Batteries-included lidar-to-camera extrinsic calibration crate
//!
//! This crate gathers every crate of the workspace behind cargo features so that a script or
//! a tool can calibrate with a single dependency. Production code should depend on the
//! individual crates instead.
//!
//! The core types ([`LidarPoint`], [`ExtrinsicPose`], [`PointStore`], [`SyncWindow`]) are in
//! the root of the crate.
//!
//! ## Modules
//! * [`lidar`] - decoding of lidar packet captures
//! * [`camera`] - projection of points into camera images
//! * [`score`] - scoring how well points line up with an image
//! * [`optimize`] - searching the extrinsic pose
//! * [`image`] - image opening and conversion

pub use calib_core::*;

/// Lidar packet decoding
pub mod lidar {
    #[cfg(feature = "velodyne-packet")]
    pub use velodyne_packet as velodyne;
}

/// Camera models
pub mod camera {
    /// The pinhole camera model
    #[cfg(feature = "calib-pinhole")]
    pub use calib_pinhole as pinhole;
}

/// Alignment scores
pub mod score {
    #[cfg(feature = "calib-mi")]
    pub use calib_mi::*;
}

/// Extrinsic optimization
pub mod optimize {
    #[cfg(feature = "calib-optimize")]
    pub use calib_optimize::*;
}

/// Image opening and conversion
pub mod image {
    /// Re-export of [`image`] to open images
    #[cfg(feature = "image")]
    #[allow(clippy::module_inception)]
    pub mod image {
        pub use image::*;
    }
}
