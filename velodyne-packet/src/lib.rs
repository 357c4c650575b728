//! Decoding of 16-beam spinning lidar packets into calibrated 3d points.
//!
//! A capture file is a sequence of fixed size records. Each record carries one sensor packet
//! made of twelve data blocks. Every block holds two firing sequences of the sixteen lasers,
//! so a packet decodes into at most [`POINTS_PER_PACKET`] points.
//!
//! ```
//! use velodyne_packet::{PacketDecoder, RECORD_LEN};
//!
//! // A record full of zeros has neither the block flags nor the factory tag.
//! let record = [0u8; RECORD_LEN];
//! assert!(PacketDecoder::default().decode(&record, 0).is_err());
//! ```

mod capture;
pub mod constants;
mod decoder;
mod packet;

pub use capture::*;
pub use constants::*;
pub use decoder::*;
pub use packet::*;

use std::path::PathBuf;
use thiserror::Error;

/// The structural problem that made a packet unusable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Malformation {
    #[error("record is {actual} bytes long, expected {expected}")]
    Length { expected: usize, actual: usize },
    #[error("factory tag {0:#06x} is not a 16-beam strongest-return head")]
    FactoryTag(u16),
    #[error("block {block} starts with flag {flag:#06x}")]
    BlockFlag { block: usize, flag: u16 },
    #[error("block {block} has azimuth {azimuth} outside of one rotation")]
    Azimuth { block: usize, azimuth: u16 },
}

#[derive(Debug, Error)]
pub enum PacketError {
    #[error("malformed packet: {0}")]
    MalformedPacket(#[from] Malformation),
    #[error("failed to read capture file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
