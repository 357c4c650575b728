use calib::optimize::TrainingFrame;
use calib::{DedupPolicy, SyncWindow, TimestampIndex};
use log::*;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One entry of the pairing manifest.
#[derive(Deserialize, Debug, Clone)]
pub struct Pair {
    pub timestamp: u32,
    pub image: PathBuf,
}

/// Builds up to `budget` training frames from the pairs in manifest order.
///
/// Every pair advances the synchronization window, even when its image cannot be opened, so
/// the sweep of a later frame still contains the points of the skipped event. Relative image
/// paths are resolved against `base`.
///
/// Returns the frames and the number of pairs skipped because of their image.
pub fn training_frames(
    pairs: &[Pair],
    base: &Path,
    index: &TimestampIndex,
    policy: DedupPolicy,
    budget: usize,
) -> (Vec<TrainingFrame>, usize) {
    let mut window = SyncWindow::new(index, policy);
    let mut frames = vec![];
    let mut skipped = 0;
    for pair in pairs {
        if frames.len() >= budget {
            break;
        }
        window.advance(pair.timestamp);
        let path = base.join(&pair.image);
        match image::open(&path) {
            Ok(image) => {
                info!("loaded {} for timestamp {}", path.display(), pair.timestamp);
                frames.push(TrainingFrame::from_image(
                    pair.timestamp,
                    window.sweep(),
                    &image,
                ));
            }
            Err(e) => {
                warn!("skipping timestamp {}: {}: {}", pair.timestamp, path.display(), e);
                skipped += 1;
            }
        }
    }
    (frames, skipped)
}
