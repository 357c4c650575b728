use crate::{CameraIntrinsics, DistortionCoefficients, DISTORTION_COEFFICIENTS};
use calib_core::nalgebra::Matrix3;
use derive_more::Display;
use log::*;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// The step of loading a calibration file that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum LoadStage {
    #[display(fmt = "parsing yaml")]
    Parse,
    #[display(fmt = "reading the camera matrix")]
    CameraMatrix,
    #[display(fmt = "reading the distortion coefficients")]
    Distortion,
}

#[derive(Debug, Error)]
pub enum CalibrationError {
    #[error("failed to read calibration file {path:?}: {source}")]
    CalibrationFileMissing {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("calibration file {path:?} is corrupt ({stage}): {reason}")]
    CalibrationFileCorrupt {
        path: PathBuf,
        stage: LoadStage,
        reason: String,
    },
}

/// A matrix node as OpenCV's `FileStorage` writes it.
#[derive(Debug, Deserialize)]
struct OpenCvMatrix {
    rows: usize,
    cols: usize,
    #[serde(default)]
    dt: Option<String>,
    data: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct CalibrationFile {
    #[serde(rename = "K")]
    camera_matrix: OpenCvMatrix,
    #[serde(rename = "D")]
    distortion: OpenCvMatrix,
}

/// OpenCV writes a `%YAML:1.0` directive and `!!opencv-matrix` tags, neither of which a
/// YAML 1.2 parser accepts.
fn strip_opencv_quirks(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with("%YAML"))
        .map(|line| line.replace("!!opencv-matrix", ""))
        .collect::<Vec<_>>()
        .join("\n")
}

impl CameraIntrinsics {
    /// Loads `K` and `D` from an OpenCV calibration file.
    ///
    /// The focal lengths stored in the file are doubled, matching the resolution of the
    /// frames the calibration is used with.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CalibrationError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| {
            CalibrationError::CalibrationFileMissing {
                path: path.to_owned(),
                source,
            }
        })?;
        let intrinsics = Self::from_opencv_yaml(&text).map_err(|(stage, reason)| {
            CalibrationError::CalibrationFileCorrupt {
                path: path.to_owned(),
                stage,
                reason,
            }
        })?;
        info!("loaded camera intrinsics from {}", path.display());
        debug!("camera matrix: {}", intrinsics.matrix);
        Ok(intrinsics)
    }

    fn from_opencv_yaml(text: &str) -> Result<Self, (LoadStage, String)> {
        let file: CalibrationFile = serde_yaml::from_str(&strip_opencv_quirks(text))
            .map_err(|e| (LoadStage::Parse, e.to_string()))?;

        let k = &file.camera_matrix;
        if k.rows != 3 || k.cols != 3 || k.data.len() != 9 {
            return Err((
                LoadStage::CameraMatrix,
                format!(
                    "expected a 3x3 matrix, found {}x{} with {} values",
                    k.rows,
                    k.cols,
                    k.data.len()
                ),
            ));
        }
        let mut matrix = Matrix3::from_row_slice(&k.data);
        matrix[(0, 0)] *= 2.0;
        matrix[(1, 1)] *= 2.0;

        let d = &file.distortion;
        if d.data.len() != d.rows * d.cols {
            return Err((
                LoadStage::Distortion,
                format!(
                    "{}x{} matrix holds {} values",
                    d.rows,
                    d.cols,
                    d.data.len()
                ),
            ));
        }
        if d.data.len() < DISTORTION_COEFFICIENTS {
            return Err((
                LoadStage::Distortion,
                format!(
                    "expected at least {} coefficients, found {}",
                    DISTORTION_COEFFICIENTS,
                    d.data.len()
                ),
            ));
        }
        let mut coefficients = [0.0; DISTORTION_COEFFICIENTS];
        coefficients.copy_from_slice(&d.data[..DISTORTION_COEFFICIENTS]);
        if d.data.len() > DISTORTION_COEFFICIENTS {
            debug!(
                "ignoring {} trailing distortion coefficients",
                d.data.len() - DISTORTION_COEFFICIENTS
            );
        }
        for node in [k, d] {
            if let Some(dt) = node.dt.as_deref().filter(|&dt| dt != "d" && dt != "f") {
                warn!("unexpected matrix element type {:?}, reading as floats", dt);
            }
        }

        Ok(Self {
            matrix,
            distortion: DistortionCoefficients(coefficients),
        })
    }
}
