//! Squared-loss mutual information between two 8-bit signals.
//!
//! The score compares the joint distribution of lidar reflectivity and image intensity against
//! the product of their marginals. The marginals are Gaussian kernel density estimates and the
//! joint distribution is a normalized histogram, both over the integer levels `0..255`. The
//! better the lidar points line up with the image, the more the two signals depend on each
//! other and the higher the score.
//!
//! ```
//! use calib_mi::MutualInformation;
//!
//! let reflectivity = [10u8, 10, 200, 200, 90, 90];
//! let intensity = [20u8, 20, 220, 220, 120, 120];
//! let score = MutualInformation::default().score(&reflectivity, &intensity).unwrap();
//! assert!(score > 0.0);
//! ```

use average::Variance;
use calib_core::nalgebra::{DMatrix, DVector};
use log::*;
use thiserror::Error;

#[cfg(feature = "serde-serialize")]
use serde::{Deserialize, Serialize};

/// Number of levels the densities are evaluated at.
pub const LEVELS: usize = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MiError {
    #[error("at least 2 samples are needed, found {found}")]
    InsufficientSamples { found: usize },
    #[error("{reflectivity} reflectivity samples but {intensity} intensity samples")]
    LengthMismatch {
        reflectivity: usize,
        intensity: usize,
    },
}

/// Rule that scales the sample standard deviation into the kernel bandwidth.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub enum Bandwidth {
    /// `n^(-1/5)`
    Scott,
    /// `(3n/4)^(-1/5)`
    Silverman,
    /// A constant factor.
    Factor(f64),
}

impl Default for Bandwidth {
    fn default() -> Self {
        Self::Scott
    }
}

impl Bandwidth {
    pub fn factor(&self, samples: usize) -> f64 {
        let n = samples as f64;
        match *self {
            Self::Scott => n.powf(-0.2),
            Self::Silverman => (n * 3.0 / 4.0).powf(-0.2),
            Self::Factor(factor) => factor,
        }
    }
}

/// Level a sample falls into, with the top level folded into the one below.
fn level(sample: u8) -> usize {
    usize::from(sample).min(LEVELS - 1)
}

/// Gaussian kernel density estimate of `samples` at the levels `0..LEVELS`.
///
/// Samples with no spread produce a unit mass at their level instead of a kernel.
pub fn kernel_density(samples: &[u8], bandwidth: Bandwidth) -> DVector<f64> {
    let mut counts = [0usize; 256];
    for &sample in samples {
        counts[usize::from(sample)] += 1;
    }
    let variance: Variance = samples.iter().map(|&s| f64::from(s)).collect();
    let deviation = variance.sample_variance().sqrt();

    let mut density = DVector::zeros(LEVELS);
    if samples.is_empty() {
        return density;
    }
    if deviation == 0.0 || !deviation.is_finite() {
        density[level(samples[0])] = 1.0;
        return density;
    }

    let h = deviation * bandwidth.factor(samples.len());
    let norm = 1.0 / (samples.len() as f64 * h * (2.0 * std::f64::consts::PI).sqrt());
    // Levels and samples are both integers, so the kernel only depends on their difference.
    let kernel: Vec<f64> = (0..512)
        .map(|d| {
            let z = (d as f64 - 255.0) / h;
            (-0.5 * z * z).exp()
        })
        .collect();
    for (x, value) in density.iter_mut().enumerate() {
        *value = norm
            * counts
                .iter()
                .enumerate()
                .filter(|&(_, &count)| count != 0)
                .map(|(c, &count)| count as f64 * kernel[x + 255 - c])
                .sum::<f64>();
    }
    density
}

/// Joint density of the two signals as a histogram with unit bins over `[0, 255]`.
pub fn joint_density(reflectivity: &[u8], intensity: &[u8]) -> DMatrix<f64> {
    let mut joint = DMatrix::zeros(LEVELS, LEVELS);
    for (&r, &i) in reflectivity.iter().zip(intensity) {
        joint[(level(r), level(i))] += 1.0;
    }
    let n = reflectivity.len().min(intensity.len());
    if n != 0 {
        joint /= n as f64;
    }
    joint
}

/// Scores how strongly reflectivity and intensity depend on each other.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde-serialize", derive(Serialize, Deserialize))]
pub struct MutualInformation {
    pub bandwidth: Bandwidth,
}

impl MutualInformation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bandwidth(self, bandwidth: Bandwidth) -> Self {
        Self { bandwidth }
    }

    /// Computes `Σ 0.5 · p(r)·p(i) · (p(r, i) / (p(r)·p(i)) - 1)²` over all level pairs.
    ///
    /// Cells where the product of the marginals is zero are skipped.
    pub fn score(&self, reflectivity: &[u8], intensity: &[u8]) -> Result<f64, MiError> {
        if reflectivity.len() != intensity.len() {
            return Err(MiError::LengthMismatch {
                reflectivity: reflectivity.len(),
                intensity: intensity.len(),
            });
        }
        if reflectivity.len() < 2 {
            return Err(MiError::InsufficientSamples {
                found: reflectivity.len(),
            });
        }

        let p = kernel_density(reflectivity, self.bandwidth);
        let q = kernel_density(intensity, self.bandwidth);
        let joint = joint_density(reflectivity, intensity);

        let mut score = 0.0;
        for (i, &pi) in p.iter().enumerate() {
            for (j, &qj) in q.iter().enumerate() {
                let product = pi * qj;
                if product == 0.0 {
                    continue;
                }
                let difference = joint[(i, j)] - product;
                score += 0.5 * difference * difference / product;
            }
        }
        trace!("mutual information of {} pairs: {}", reflectivity.len(), score);
        Ok(score)
    }
}
