//! Searches the extrinsic pose between a lidar and a camera that maximizes an objective.
//!
//! The [`ExtrinsicOptimizer`] walks a sequence of training frames. The first frame that can
//! be scored fixes the starting score and gradient. Every following frame scores a step along
//! the gradient: improving steps are taken, failing ones make the optimizer recompute the
//! gradient on that frame. The calibration is the average of every pose that was taken,
//! including the seed.
//!
//! The objective is abstracted by the [`Objective`] trait. The objective used for calibration
//! is [`MutualInformationObjective`], which projects the lidar points of a [`TrainingFrame`]
//! into its image and scores reflectivity against intensity.

mod objective;
mod optimizer;
mod settings;

pub use objective::*;
pub use optimizer::*;
pub use settings::*;

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum OptimizeError {
    #[error("none of the {frames} training frames could be scored")]
    NoUsableFrames { frames: usize },
}
