use crate::constants::*;
use crate::{PacketDecoder, PacketError};
use calib_core::LidarPoint;
use log::*;
use std::path::Path;

/// Where records start inside a capture file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureFraming {
    /// Bytes skipped at the start of the file before the first record.
    pub file_header_len: usize,
}

impl Default for CaptureFraming {
    fn default() -> Self {
        Self {
            file_header_len: CAPTURE_FILE_HEADER_LEN,
        }
    }
}

/// Bookkeeping of one pass over a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CaptureSummary {
    /// Complete records found.
    pub records: usize,
    /// Records that decoded into points.
    pub decoded: usize,
    /// Records rejected as malformed.
    pub skipped: usize,
    /// Bytes after the last complete record.
    pub trailing_bytes: usize,
}

/// Reads whole capture files and decodes every record with a [`PacketDecoder`].
///
/// Malformed packets are logged and skipped so that a few corrupt records do not spoil a
/// capture.
#[derive(Debug, Clone, Copy, Default)]
pub struct CaptureReader {
    pub decoder: PacketDecoder,
    pub framing: CaptureFraming,
}

impl CaptureReader {
    pub fn new(decoder: PacketDecoder) -> Self {
        Self {
            decoder,
            framing: CaptureFraming::default(),
        }
    }

    pub fn framing(self, framing: CaptureFraming) -> Self {
        Self { framing, ..self }
    }

    /// Decodes all records in an in-memory capture, tagging points with `source`.
    pub fn decode_bytes(&self, bytes: &[u8], source: usize) -> (Vec<LidarPoint>, CaptureSummary) {
        let body = bytes.get(self.framing.file_header_len..).unwrap_or(&[]);
        let records = body.chunks_exact(RECORD_LEN);
        let mut summary = CaptureSummary {
            trailing_bytes: records.remainder().len(),
            ..CaptureSummary::default()
        };
        let mut points = vec![];
        for (index, record) in records.enumerate() {
            summary.records += 1;
            match self.decoder.decode(record, source) {
                Ok(decoded) => {
                    summary.decoded += 1;
                    points.extend(decoded);
                }
                Err(e) => {
                    summary.skipped += 1;
                    warn!("skipping record {} of capture {}: {}", index, source, e);
                }
            }
        }
        if summary.trailing_bytes != 0 {
            debug!(
                "ignoring {} trailing bytes of capture {}",
                summary.trailing_bytes, source
            );
        }
        info!(
            "capture {}: {} records, {} decoded, {} skipped, {} points",
            source,
            summary.records,
            summary.decoded,
            summary.skipped,
            points.len()
        );
        (points, summary)
    }

    /// Reads the capture file at `path` once and decodes it.
    pub fn read_path(
        &self,
        path: impl AsRef<Path>,
        source: usize,
    ) -> Result<(Vec<LidarPoint>, CaptureSummary), PacketError> {
        let path = path.as_ref();
        info!("reading capture {} from {}", source, path.display());
        let bytes = std::fs::read(path).map_err(|source| PacketError::Io {
            path: path.to_owned(),
            source,
        })?;
        Ok(self.decode_bytes(&bytes, source))
    }
}
