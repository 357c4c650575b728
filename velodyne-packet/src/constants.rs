//! Constants describing the 16-beam packet format and its capture framing.

/// Bytes of the capture-file header preceding the first record.
pub const CAPTURE_FILE_HEADER_LEN: usize = 24;

/// Bytes of the per-record capture header (timestamps and lengths).
pub const RECORD_HEADER_LEN: usize = 16;

/// Bytes of the Ethernet, IPv4 and UDP headers preceding the sensor payload.
pub const NETWORK_HEADER_LEN: usize = 42;

/// Bytes of the sensor payload: data blocks, timestamp and factory tag.
pub const SENSOR_PAYLOAD_LEN: usize = 1206;

/// Bytes of one complete record in the capture stream.
pub const RECORD_LEN: usize = RECORD_HEADER_LEN + NETWORK_HEADER_LEN + SENSOR_PAYLOAD_LEN;

/// Offset of the sensor payload inside a record.
pub const PAYLOAD_OFFSET: usize = RECORD_HEADER_LEN + NETWORK_HEADER_LEN;

/// Number of data blocks in one packet.
pub const BLOCKS_PER_PACKET: usize = 12;

/// Bytes of one data block.
pub const BLOCK_LEN: usize = 100;

/// Bytes of the data section (all data blocks).
pub const DATA_LEN: usize = BLOCKS_PER_PACKET * BLOCK_LEN;

/// Bytes of one channel return: 2 bytes of range and 1 byte of reflectivity.
pub const CHANNEL_RETURN_LEN: usize = 3;

/// Number of lasers in the head.
pub const LASERS: usize = 16;

/// Number of firing sequences of all lasers in one data block.
pub const FIRING_GROUPS: usize = 2;

/// Upper bound of points decoded from one packet.
pub const POINTS_PER_PACKET: usize = BLOCKS_PER_PACKET * FIRING_GROUPS * LASERS;

/// Sentinel every data block starts with (`0xFFEE` on the wire).
pub const BLOCK_FLAG: u16 = 0xEEFF;

/// Factory tag of a 16-beam head (`0x22`) reporting the strongest return (`0x37`).
pub const FACTORY_STRONGEST_VLP16: u16 = 0x2237;

/// Time between two firing sequences in microseconds.
pub const FIRING_GROUP_DURATION_US: f64 = 55.296;

/// Time between two consecutive lasers of one firing sequence in microseconds.
pub const LASER_FIRING_INTERVAL_US: f64 = 2.304;

/// Meters per raw range unit.
pub const DISTANCE_RESOLUTION: f64 = 0.002;

/// Default azimuth quantization (hundredths of a degree per bin).
pub const DEFAULT_AZIMUTH_BIN_SIZE: u32 = 100;

/// Vertical angle of each laser in degrees, indexed by laser id.
pub const VLP16_LASER_ANGLES_DEGREES: [f64; LASERS] = [
    -15.0, 1.0, -13.0, 3.0, -11.0, 5.0, -9.0, 7.0, -7.0, 9.0, -5.0, 11.0, -3.0, 13.0, -1.0, 15.0,
];
