#![warn(missing_docs)]

//! Top-surface roughness estimation for the rugo toolkit.
//!
//! Estimates geometric surface roughness (Sa/Sq/Sz) of a manufactured
//! part's top-facing surface directly from its triangulated mesh, without
//! requiring the mesh to be aligned to any coordinate axis:
//!
//! 1. Intrinsic orientation detection (PCA height axis)
//! 2. Two-pass top-surface vertex selection
//! 3. Least-squares reference-plane fit in a tangent frame
//! 4. Residual reduction to scalar roughness metrics
//!
//! # Example
//!
//! ```ignore
//! use rugo_core::{analyze, AnalyzeConfig};
//!
//! let report = analyze(&vertices, &normals, &AnalyzeConfig::default())?;
//! println!("Sa = {:.4}", report.roughness.sa);
//! ```
//!
//! All stages are pure functions over their arguments; independent
//! analyses can run concurrently without synchronization.

pub mod error;
pub mod metrics;
pub mod orientation;
pub mod plane;
pub mod surface;

pub use error::{Result, RoughnessError};
pub use metrics::{aggregate, RoughnessResult};
pub use orientation::{detect_orientation, OrientationResult, MIN_VERTICES};
pub use plane::{fit_reference_plane, PlaneFit, TangentFrame};
pub use surface::{
    select_surface, SelectionConfig, SurfaceSelection, MIN_MEASUREMENT, MIN_REFERENCE,
};

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Analysis parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AnalyzeConfig {
    /// Two-pass selection thresholds.
    pub selection: SelectionConfig,
    /// Multiplicative unit conversion applied to all metrics and
    /// residuals (e.g. 1e-3 to report a millimeter mesh in meters).
    pub unit_scale: f64,
}

impl Default for AnalyzeConfig {
    fn default() -> Self {
        Self {
            selection: SelectionConfig::default(),
            unit_scale: 1.0,
        }
    }
}

impl AnalyzeConfig {
    /// Validate parameters.
    pub fn validate(&self) -> Result<()> {
        self.selection.validate()?;
        if !self.unit_scale.is_finite() || self.unit_scale <= 0.0 {
            return Err(RoughnessError::InvalidConfig(format!(
                "unit_scale must be positive and finite, got {}",
                self.unit_scale
            )));
        }
        Ok(())
    }
}

/// A complete roughness analysis: orientation, selection, and metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoughnessReport {
    /// Detected intrinsic orientation.
    pub orientation: OrientationResult,
    /// Reference and measurement index sets.
    pub selection: SurfaceSelection,
    /// Residual field and Sa/Sq/Sz.
    pub roughness: RoughnessResult,
}

/// Run the full roughness pipeline on a vertex/normal cloud.
///
/// The four stages run strictly in sequence; any failure aborts the whole
/// analysis with no partial result.
///
/// # Errors
///
/// Propagates every stage's error unchanged (see [`RoughnessError`]), plus
/// [`RoughnessError::MismatchedNormals`] if the vertex and normal arrays
/// differ in length and [`RoughnessError::InvalidConfig`] for bad
/// parameters.
pub fn analyze(
    vertices: &[Point3<f64>],
    normals: &[Vector3<f64>],
    config: &AnalyzeConfig,
) -> Result<RoughnessReport> {
    config.validate()?;
    if vertices.len() != normals.len() {
        return Err(RoughnessError::MismatchedNormals {
            vertices: vertices.len(),
            normals: normals.len(),
        });
    }

    let orientation = detect_orientation(vertices)?;
    let selection = select_surface(vertices, normals, &orientation.height_axis, &config.selection)?;
    let (_, residuals) = fit_reference_plane(vertices, &selection, &orientation.height_axis)?;
    let roughness = aggregate(&residuals, config.unit_scale);

    Ok(RoughnessReport {
        orientation,
        selection,
        roughness,
    })
}
