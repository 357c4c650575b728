use nalgebra::Point3;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// One full rotation of the sensor head in azimuth units (hundredths of a degree).
pub const ROTATION_MAX_UNITS: u32 = 36000;

/// Key under which the [`PointStore`](crate::PointStore) deduplicates points.
///
/// Two returns of the same laser that fall in the same azimuth bin describe the same
/// direction, so only one of them is kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct PointKey {
    pub azimuth_bin: u32,
    pub laser: u8,
}

/// A single calibrated return from the spinning sensor.
///
/// Points are produced by the packet decoder from one channel return and are never
/// modified afterwards. The position is expressed in the lidar frame in meters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct LidarPoint {
    /// Cartesian position in the lidar frame (meters).
    pub position: Point3<f64>,
    /// Measured range (meters).
    pub range: f64,
    /// Calibrated reflectivity reported by the sensor.
    pub reflectivity: u8,
    /// Interpolated firing azimuth in hundredths of a degree, always in `[0, 36000)`.
    pub azimuth: f64,
    /// Quantized azimuth used for deduplication.
    pub azimuth_bin: u32,
    /// Laser (channel) index, `0..16`.
    pub laser: u8,
    /// Timestamp of the packet the point was decoded from.
    pub timestamp: u32,
    /// Index of the capture file the point was read from.
    pub source: usize,
}

impl LidarPoint {
    /// The key this point is deduplicated under.
    pub fn key(&self) -> PointKey {
        PointKey {
            azimuth_bin: self.azimuth_bin,
            laser: self.laser,
        }
    }
}
