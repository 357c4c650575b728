use crate::constants::*;
use crate::Malformation;

fn le_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn le_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// A validated view of one record of the capture stream.
///
/// Layout of the sensor payload (all fields little-endian):
///
/// ```text
/// | 12 x data block (100 bytes) | timestamp (4 bytes) | factory tag (2 bytes) |
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RawPacket<'a> {
    data: &'a [u8],
    /// Timestamp the sensor attached to the packet.
    pub timestamp: u32,
    /// Return mode and product id, see [`FACTORY_STRONGEST_VLP16`].
    pub factory: u16,
}

impl<'a> RawPacket<'a> {
    /// Checks the record length and factory tag.
    ///
    /// Data blocks are validated when they are accessed with [`RawPacket::block`].
    pub fn parse(record: &'a [u8]) -> Result<Self, Malformation> {
        if record.len() != RECORD_LEN {
            return Err(Malformation::Length {
                expected: RECORD_LEN,
                actual: record.len(),
            });
        }
        let payload = &record[PAYLOAD_OFFSET..];
        let timestamp = le_u32(payload, DATA_LEN);
        let factory = le_u16(payload, DATA_LEN + 4);
        if factory != FACTORY_STRONGEST_VLP16 {
            return Err(Malformation::FactoryTag(factory));
        }
        Ok(Self {
            data: &payload[..DATA_LEN],
            timestamp,
            factory,
        })
    }

    /// Retrieves the data block at `index`, checking its flag and azimuth.
    ///
    /// # Panics
    ///
    /// Panics if `index >= BLOCKS_PER_PACKET`.
    pub fn block(&self, index: usize) -> Result<DataBlock<'a>, Malformation> {
        let start = index * BLOCK_LEN;
        DataBlock::parse(&self.data[start..start + BLOCK_LEN], index)
    }

    /// Retrieves all data blocks, failing on the first invalid one.
    pub fn blocks(&self) -> Result<Vec<DataBlock<'a>>, Malformation> {
        (0..BLOCKS_PER_PACKET).map(|index| self.block(index)).collect()
    }
}

/// One data block: a flag, the azimuth of its first firing and 32 channel returns.
#[derive(Debug, Clone, Copy)]
pub struct DataBlock<'a> {
    /// Azimuth of the first firing in hundredths of a degree.
    pub azimuth: u16,
    returns: &'a [u8],
}

impl<'a> DataBlock<'a> {
    fn parse(bytes: &'a [u8], index: usize) -> Result<Self, Malformation> {
        let flag = le_u16(bytes, 0);
        if flag != BLOCK_FLAG {
            return Err(Malformation::BlockFlag { block: index, flag });
        }
        let azimuth = le_u16(bytes, 2);
        if u32::from(azimuth) >= calib_core::ROTATION_MAX_UNITS {
            return Err(Malformation::Azimuth {
                block: index,
                azimuth,
            });
        }
        Ok(Self {
            azimuth,
            returns: &bytes[4..],
        })
    }

    /// The return of `laser` during firing sequence `group`.
    ///
    /// # Panics
    ///
    /// Panics if `group >= FIRING_GROUPS` or `laser >= LASERS`.
    pub fn channel(&self, group: usize, laser: usize) -> ChannelReturn {
        assert!(group < FIRING_GROUPS && laser < LASERS);
        let offset = (group * LASERS + laser) * CHANNEL_RETURN_LEN;
        ChannelReturn {
            distance: le_u16(self.returns, offset),
            reflectivity: self.returns[offset + 2],
        }
    }
}

/// The raw measurement of one laser firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelReturn {
    /// Range in units of [`DISTANCE_RESOLUTION`].
    pub distance: u16,
    pub reflectivity: u8,
}
