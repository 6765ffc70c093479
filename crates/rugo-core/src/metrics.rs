//! Scalar roughness metrics over a residual field.

use serde::{Deserialize, Serialize};

/// Roughness metrics and the scaled residual field they were reduced from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoughnessResult {
    /// Signed deviations, one per measurement vertex, in
    /// measurement-index order, scaled by `unit_scale`.
    pub residuals: Vec<f64>,
    /// Arithmetic mean roughness: mean of `|r|`.
    pub sa: f64,
    /// Root-mean-square roughness: `sqrt(mean(r^2))`.
    pub sq: f64,
    /// Peak-to-valley range: `max(r) - min(r)`.
    pub sz: f64,
}

/// Reduce residuals to Sa/Sq/Sz.
///
/// `unit_scale` converts the mesh's native length unit (e.g. 1e-3 for a
/// millimeter mesh reported in meters). It multiplies Sa, Sq, Sz and
/// every residual; all four share the residual's units, so scaling any
/// subset of them would silently mix units.
///
/// Callers guarantee a non-empty residual field (the selection stage
/// enforces a minimum measurement count); an empty input yields all-zero
/// metrics.
#[allow(clippy::cast_precision_loss)]
pub fn aggregate(residuals: &[f64], unit_scale: f64) -> RoughnessResult {
    debug_assert!(!residuals.is_empty(), "empty residual field");
    if residuals.is_empty() {
        return RoughnessResult {
            residuals: Vec::new(),
            sa: 0.0,
            sq: 0.0,
            sz: 0.0,
        };
    }

    let count = residuals.len() as f64;
    let mut abs_sum = 0.0;
    let mut sq_sum = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for &r in residuals {
        abs_sum += r.abs();
        sq_sum += r * r;
        min = min.min(r);
        max = max.max(r);
    }

    RoughnessResult {
        residuals: residuals.iter().map(|r| r * unit_scale).collect(),
        sa: unit_scale * abs_sum / count,
        sq: unit_scale * (sq_sum / count).sqrt(),
        sz: unit_scale * (max - min),
    }
}
