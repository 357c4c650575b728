use crate::constants::*;
use crate::{ChannelReturn, PacketError, RawPacket};
use calib_core::nalgebra::Point3;
use calib_core::{LidarPoint, ROTATION_MAX_UNITS};

/// Turns packets into calibrated [`LidarPoint`]s.
///
/// The defaults describe a stock 16-beam head. [`PacketDecoder::azimuth_bin_size`] changes
/// how coarsely points are binned for deduplication.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PacketDecoder {
    /// Vertical angle of each laser in degrees.
    pub laser_angles: [f64; LASERS],
    /// Hundredths of a degree per azimuth bin.
    pub azimuth_bin_size: u32,
    /// Meters per raw range unit.
    pub distance_resolution: f64,
}

impl Default for PacketDecoder {
    fn default() -> Self {
        Self {
            laser_angles: VLP16_LASER_ANGLES_DEGREES,
            azimuth_bin_size: DEFAULT_AZIMUTH_BIN_SIZE,
            distance_resolution: DISTANCE_RESOLUTION,
        }
    }
}

impl PacketDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// # Panics
    ///
    /// Panics if `azimuth_bin_size` is zero.
    pub fn azimuth_bin_size(self, azimuth_bin_size: u32) -> Self {
        assert!(azimuth_bin_size > 0, "azimuth bin size must be positive");
        Self {
            azimuth_bin_size,
            ..self
        }
    }

    pub fn laser_angles(self, laser_angles: [f64; LASERS]) -> Self {
        Self {
            laser_angles,
            ..self
        }
    }

    /// Decodes one record of the capture stream.
    ///
    /// Every block is validated before any point is produced, so a packet either decodes
    /// completely or not at all. Points are emitted block by block, firing sequence by
    /// firing sequence, laser by laser.
    pub fn decode(&self, record: &[u8], source: usize) -> Result<Vec<LidarPoint>, PacketError> {
        let packet = RawPacket::parse(record)?;
        let blocks = packet.blocks()?;

        let mut points = Vec::with_capacity(POINTS_PER_PACKET);
        let mut step = 0.0;
        for (index, block) in blocks.iter().enumerate() {
            // The last block has nothing to look ahead to and keeps the previous step.
            if let Some(next) = blocks.get(index + 1) {
                step = azimuth_step(block.azimuth, next.azimuth);
            }
            for group in 0..FIRING_GROUPS {
                for laser in 0..LASERS {
                    let azimuth = interpolate_azimuth(block.azimuth, step, group, laser);
                    let channel = block.channel(group, laser);
                    points.push(self.point(channel, azimuth, laser, packet.timestamp, source));
                }
            }
        }
        Ok(points)
    }

    /// Converts a channel return into a point at the given interpolated azimuth.
    pub fn point(
        &self,
        channel: ChannelReturn,
        azimuth: f64,
        laser: usize,
        timestamp: u32,
        source: usize,
    ) -> LidarPoint {
        let range = f64::from(channel.distance) * self.distance_resolution;
        let omega = self.laser_angles[laser].to_radians();
        let alpha = (azimuth / 100.0).to_radians();
        let (sin_omega, cos_omega) = omega.sin_cos();
        let (sin_alpha, cos_alpha) = alpha.sin_cos();
        LidarPoint {
            position: Point3::new(
                range * cos_omega * sin_alpha,
                range * cos_omega * cos_alpha,
                range * sin_omega,
            ),
            range,
            reflectivity: channel.reflectivity,
            azimuth,
            azimuth_bin: (azimuth / f64::from(self.azimuth_bin_size)).round() as u32,
            laser: laser as u8,
            timestamp,
            source,
        }
    }
}

/// Azimuth travelled between the starts of two consecutive blocks, across the wrap.
pub fn azimuth_step(azimuth: u16, next_azimuth: u16) -> f64 {
    let (azimuth, next_azimuth) = (u32::from(azimuth), u32::from(next_azimuth));
    if next_azimuth < azimuth {
        f64::from(next_azimuth + ROTATION_MAX_UNITS - azimuth)
    } else {
        f64::from(next_azimuth - azimuth)
    }
}

/// Azimuth at which `laser` fired during firing sequence `group` of a block.
///
/// A block spans two firing sequences, so `step` covers `2 * FIRING_GROUP_DURATION_US`.
/// The result is in `[0, 36000)`.
pub fn interpolate_azimuth(block_azimuth: u16, step: f64, group: usize, laser: usize) -> f64 {
    let firing_offset =
        FIRING_GROUP_DURATION_US * group as f64 + LASER_FIRING_INTERVAL_US * laser as f64;
    let rotation = f64::from(ROTATION_MAX_UNITS);
    let azimuth =
        f64::from(block_azimuth) + step * firing_offset / (2.0 * FIRING_GROUP_DURATION_US);
    if azimuth >= rotation {
        azimuth - rotation
    } else {
        azimuth
    }
}
