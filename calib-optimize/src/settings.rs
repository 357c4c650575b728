#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// The settings for the extrinsic search.
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct OptimizerSettings {
    /// Offset applied to each pose parameter when differentiating
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_gradient_step"))]
    pub gradient_step: f64,
    /// How many gradient steps a proposal moves along the gradient
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_step_multiplier"))]
    pub step_multiplier: f64,
    /// Improvements smaller than this count as converged
    #[cfg_attr(
        feature = "serde-serialize",
        serde(default = "default_convergence_threshold")
    )]
    pub convergence_threshold: f64,
    /// The maximum number of training frames consumed, including the first one
    #[cfg_attr(feature = "serde-serialize", serde(default = "default_frame_budget"))]
    pub frame_budget: usize,
}

impl Default for OptimizerSettings {
    fn default() -> Self {
        Self {
            gradient_step: default_gradient_step(),
            step_multiplier: default_step_multiplier(),
            convergence_threshold: default_convergence_threshold(),
            frame_budget: default_frame_budget(),
        }
    }
}

impl OptimizerSettings {
    /// Distance travelled per unit of gradient by a proposal.
    pub fn step_scale(&self) -> f64 {
        self.gradient_step * self.step_multiplier
    }
}

fn default_gradient_step() -> f64 {
    0.01
}

fn default_step_multiplier() -> f64 {
    10.0
}

fn default_convergence_threshold() -> f64 {
    0.000001
}

fn default_frame_budget() -> usize {
    25
}
