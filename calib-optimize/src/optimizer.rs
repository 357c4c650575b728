use crate::{Objective, OptimizeError, OptimizerSettings};
use calib_core::nalgebra::Vector6;
use calib_core::{ExtrinsicPose, POSE_PARAMETERS};
use log::*;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// The outcome of a calibration run.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CalibrationResult {
    /// Average of the seed and every accepted pose.
    pub pose: ExtrinsicPose,
    /// Score of the last accepted pose.
    pub score: f64,
    pub accepted_steps: usize,
    /// Frames that could not be scored.
    pub skipped_frames: usize,
}

/// What a single frame did to the search.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// The proposal improved the score and was taken.
    Accepted,
    /// The proposal improved the score by less than the convergence threshold.
    Converged,
    /// The proposal did not improve the score and the gradient was recomputed.
    Rejected,
}

/// Mutable state of one calibration run.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OptimizerState {
    pub pose: ExtrinsicPose,
    pub score: f64,
    pub gradient: Vector6<f64>,
    /// Number of poses in `pose_sum`, the seed included.
    pub poses: usize,
    pub pose_sum: Vector6<f64>,
    pub skipped_frames: usize,
}

impl OptimizerState {
    fn new(seed: ExtrinsicPose, score: f64, gradient: Vector6<f64>) -> Self {
        Self {
            pose: seed,
            score,
            gradient,
            poses: 1,
            pose_sum: seed.0,
            skipped_frames: 0,
        }
    }

    pub fn average_pose(&self) -> ExtrinsicPose {
        ExtrinsicPose(self.pose_sum / self.poses as f64)
    }

    pub fn result(&self) -> CalibrationResult {
        CalibrationResult {
            pose: self.average_pose(),
            score: self.score,
            accepted_steps: self.poses - 1,
            skipped_frames: self.skipped_frames,
        }
    }
}

/// Gradient ascent over [`ExtrinsicPose`]s driven by an [`Objective`].
#[derive(Debug, Clone)]
pub struct ExtrinsicOptimizer<O> {
    objective: O,
    settings: OptimizerSettings,
}

impl<O> ExtrinsicOptimizer<O> {
    pub fn new(objective: O, settings: OptimizerSettings) -> Self {
        Self {
            objective,
            settings,
        }
    }

    pub fn objective(&self) -> &O {
        &self.objective
    }

    pub fn settings(&self) -> &OptimizerSettings {
        &self.settings
    }

    /// Centered finite difference of the objective at `pose` on `frame`.
    pub fn gradient<F>(&self, pose: &ExtrinsicPose, frame: &F) -> Result<Vector6<f64>, O::Error>
    where
        O: Objective<F>,
    {
        let h = self.settings.gradient_step;
        let mut gradient = Vector6::zeros();
        for parameter in 0..POSE_PARAMETERS {
            let up = self.objective.score(&pose.perturbed(parameter, h), frame)?;
            let down = self.objective.score(&pose.perturbed(parameter, -h), frame)?;
            gradient[parameter] = (up - down) / (2.0 * h);
        }
        Ok(gradient)
    }

    /// Scores `seed` and its gradient on the first frame.
    pub fn initialize<F>(&self, seed: ExtrinsicPose, frame: &F) -> Result<OptimizerState, O::Error>
    where
        O: Objective<F>,
    {
        let score = self.objective.score(&seed, frame)?;
        let gradient = self.gradient(&seed, frame)?;
        debug!("initial score {}, gradient {:?}", score, gradient.as_slice());
        Ok(OptimizerState::new(seed, score, gradient))
    }

    /// Advances `state` with one more frame.
    ///
    /// On error the state is left untouched.
    pub fn step<F>(&self, state: &mut OptimizerState, frame: &F) -> Result<StepOutcome, O::Error>
    where
        O: Objective<F>,
    {
        let proposal = state
            .pose
            .stepped(&state.gradient, self.settings.step_scale());
        let score = self.objective.score(&proposal, frame)?;
        if score > state.score {
            if score < state.score + self.settings.convergence_threshold {
                return Ok(StepOutcome::Converged);
            }
            state.pose = proposal;
            state.score = score;
            state.poses += 1;
            state.pose_sum += proposal.0;
            Ok(StepOutcome::Accepted)
        } else {
            state.gradient = self.gradient(&state.pose, frame)?;
            Ok(StepOutcome::Rejected)
        }
    }

    /// Runs the search from `seed` over at most `frame_budget` frames.
    pub fn optimize<'a, F, I>(
        &self,
        seed: ExtrinsicPose,
        frames: I,
    ) -> Result<CalibrationResult, OptimizeError>
    where
        O: Objective<F>,
        F: 'a,
        I: IntoIterator<Item = &'a F>,
    {
        let mut frames = frames.into_iter().take(self.settings.frame_budget).enumerate();
        let mut skipped = 0;
        let mut state = loop {
            let (index, frame) = frames
                .next()
                .ok_or(OptimizeError::NoUsableFrames { frames: skipped })?;
            match self.initialize(seed, frame) {
                Ok(state) => break state,
                Err(e) => {
                    warn!("skipping frame {} during initialization: {}", index, e);
                    skipped += 1;
                }
            }
        };
        state.skipped_frames = skipped;

        for (index, frame) in frames {
            match self.step(&mut state, frame) {
                Ok(outcome) => debug!(
                    "frame {}: {:?}, score {}, pose {:?}",
                    index,
                    outcome,
                    state.score,
                    state.pose.as_slice()
                ),
                Err(e) => {
                    warn!("skipping frame {}: {}", index, e);
                    state.skipped_frames += 1;
                }
            }
        }

        let result = state.result();
        info!(
            "calibrated after {} accepted steps ({} frames skipped): score {}, pose {:?}",
            result.accepted_steps,
            result.skipped_frames,
            result.score,
            result.pose.as_slice()
        );
        Ok(result)
    }
}
