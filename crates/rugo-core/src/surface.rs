//! Two-pass selection of top-surface vertices.
//!
//! A single relaxed threshold risks dragging near-vertical side-wall
//! vertices into the plane fit and biasing the reference plane; a single
//! strict threshold excludes too much of the genuinely rough surface from
//! measurement. The two passes decouple "flat and up-facing enough to
//! anchor the reference plane" (strict) from "part of the surface being
//! measured" (relaxed).

use nalgebra::{Point3, Vector3};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RoughnessError};

/// Minimum reference vertex count for a meaningful plane fit.
pub const MIN_REFERENCE: usize = 20;

/// Minimum measurement vertex count for meaningful roughness statistics.
pub const MIN_MEASUREMENT: usize = 50;

/// Selection thresholds.
///
/// These are policy, not algorithm: tune them per part family without
/// touching the selection code.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Height percentile above which a vertex qualifies for the
    /// reference (plane-fitting) pass.
    pub ref_height_pct: f64,
    /// Height percentile above which a vertex qualifies for the
    /// measurement pass.
    pub meas_height_pct: f64,
    /// Minimum `|normal . height_axis|` for the reference pass
    /// (1.0 = perfectly up-facing).
    pub ref_normal_thresh: f64,
    /// Minimum `|normal . height_axis|` for the measurement pass.
    pub meas_normal_thresh: f64,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            ref_height_pct: 85.0,
            meas_height_pct: 75.0,
            ref_normal_thresh: 0.9,
            meas_normal_thresh: 0.75,
        }
    }
}

impl SelectionConfig {
    /// Validate thresholds.
    pub fn validate(&self) -> Result<()> {
        for (name, pct) in [
            ("ref_height_pct", self.ref_height_pct),
            ("meas_height_pct", self.meas_height_pct),
        ] {
            if !(0.0..=100.0).contains(&pct) {
                return Err(RoughnessError::InvalidConfig(format!(
                    "{name} must be between 0 and 100, got {pct}"
                )));
            }
        }
        for (name, thresh) in [
            ("ref_normal_thresh", self.ref_normal_thresh),
            ("meas_normal_thresh", self.meas_normal_thresh),
        ] {
            if !(0.0..=1.0).contains(&thresh) {
                return Err(RoughnessError::InvalidConfig(format!(
                    "{name} must be between 0 and 1, got {thresh}"
                )));
            }
        }
        Ok(())
    }
}

/// Index sets produced by the two selection passes.
///
/// Both are ascending indices into the original vertex array. The sets
/// may overlap; neither is required to contain the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceSelection {
    /// Strict, high-confidence subset used only to anchor the fitted
    /// reference plane.
    pub reference_indices: Vec<usize>,
    /// Relaxed subset whose deviation from the fitted plane constitutes
    /// the roughness signal.
    pub measurement_indices: Vec<usize>,
}

/// Partition vertices into reference and measurement subsets.
///
/// Projects every vertex onto the height axis (`height`) and computes
/// `|normal . height_axis|` (`alignment`) once; both passes filter on the
/// same two arrays with their own percentile and alignment thresholds.
///
/// # Errors
///
/// * [`RoughnessError::InsufficientReference`] if the strict pass keeps
///   fewer than [`MIN_REFERENCE`] vertices.
/// * [`RoughnessError::InsufficientMeasurement`] if the relaxed pass
///   keeps fewer than [`MIN_MEASUREMENT`] vertices.
pub fn select_surface(
    vertices: &[Point3<f64>],
    normals: &[Vector3<f64>],
    height_axis: &Vector3<f64>,
    config: &SelectionConfig,
) -> Result<SurfaceSelection> {
    config.validate()?;

    if vertices.len() < MIN_MEASUREMENT {
        return Err(RoughnessError::InsufficientMeasurement {
            required: MIN_MEASUREMENT,
            actual: vertices.len(),
        });
    }
    if normals.len() != vertices.len() {
        return Err(RoughnessError::MismatchedNormals {
            vertices: vertices.len(),
            normals: normals.len(),
        });
    }

    let heights: Vec<f64> = vertices
        .par_iter()
        .map(|v| v.coords.dot(height_axis))
        .collect();
    let alignments: Vec<f64> = normals
        .par_iter()
        .map(|n| n.dot(height_axis).abs())
        .collect();

    let reference_indices = filter_pass(
        &heights,
        &alignments,
        percentile(&heights, config.ref_height_pct),
        config.ref_normal_thresh,
    );
    if reference_indices.len() < MIN_REFERENCE {
        return Err(RoughnessError::InsufficientReference {
            required: MIN_REFERENCE,
            actual: reference_indices.len(),
        });
    }

    let measurement_indices = filter_pass(
        &heights,
        &alignments,
        percentile(&heights, config.meas_height_pct),
        config.meas_normal_thresh,
    );
    if measurement_indices.len() < MIN_MEASUREMENT {
        return Err(RoughnessError::InsufficientMeasurement {
            required: MIN_MEASUREMENT,
            actual: measurement_indices.len(),
        });
    }

    Ok(SurfaceSelection {
        reference_indices,
        measurement_indices,
    })
}

fn filter_pass(
    heights: &[f64],
    alignments: &[f64],
    height_cut: f64,
    normal_thresh: f64,
) -> Vec<usize> {
    heights
        .iter()
        .zip(alignments)
        .enumerate()
        .filter(|(_, (&h, &a))| h >= height_cut && a >= normal_thresh)
        .map(|(i, _)| i)
        .collect()
}

/// Rank percentile with linear interpolation between order statistics.
fn percentile(values: &[f64], pct: f64) -> f64 {
    debug_assert!(!values.is_empty());
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let rank = pct / 100.0 * (sorted.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    let frac = rank - lo as f64;
    sorted[lo] * (1.0 - frac) + sorted[hi] * frac
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn stepped_mesh() -> (Vec<Point3<f64>>, Vec<Vector3<f64>>) {
        // 100 vertices: 75 on a low sheet (z = 0), 25 on a high sheet
        // (z = 5). All normals point up.
        let mut vertices = Vec::new();
        for i in 0..75 {
            vertices.push(Point3::new(i as f64 * 0.1, 0.0, 0.0));
        }
        for i in 0..25 {
            vertices.push(Point3::new(i as f64 * 0.1, 1.0, 5.0));
        }
        let normals = vec![Vector3::z(); vertices.len()];
        (vertices, normals)
    }

    #[test]
    fn percentile_matches_linear_interpolation() {
        let values = [1.0, 2.0, 3.0, 4.0];
        assert_relative_eq!(percentile(&values, 0.0), 1.0);
        assert_relative_eq!(percentile(&values, 100.0), 4.0);
        assert_relative_eq!(percentile(&values, 50.0), 2.5);
        assert_relative_eq!(percentile(&values, 75.0), 3.25);
    }

    #[test]
    fn percentile_order_independent() {
        let values = [4.0, 1.0, 3.0, 2.0];
        assert_relative_eq!(percentile(&values, 50.0), 2.5);
    }

    #[test]
    fn strict_pass_keeps_only_high_sheet() {
        let (vertices, normals) = stepped_mesh();
        // Measurement thresholds opened up so its minimum count is met.
        let config = SelectionConfig {
            ref_height_pct: 85.0,
            meas_height_pct: 0.0,
            ref_normal_thresh: 0.9,
            meas_normal_thresh: 0.75,
        };
        let sel = select_surface(&vertices, &normals, &Vector3::z(), &config).unwrap();

        // The 85th percentile of a 75/25 step sits above the low sheet.
        assert_eq!(sel.reference_indices, (75..100).collect::<Vec<_>>());
        assert_eq!(sel.measurement_indices.len(), 100);
    }

    #[test]
    fn indices_are_ascending_and_in_bounds() {
        let (vertices, normals) = stepped_mesh();
        let config = SelectionConfig {
            meas_height_pct: 0.0,
            ..Default::default()
        };
        let sel = select_surface(&vertices, &normals, &Vector3::z(), &config).unwrap();

        for set in [&sel.reference_indices, &sel.measurement_indices] {
            assert!(set.windows(2).all(|w| w[0] < w[1]));
            assert!(set.iter().all(|&i| i < vertices.len()));
        }
        assert!(sel.reference_indices.len() >= MIN_REFERENCE);
        assert!(sel.measurement_indices.len() >= MIN_MEASUREMENT);
    }

    #[test]
    fn tilted_normals_fail_strict_pass() {
        let (vertices, _) = stepped_mesh();
        // All normals tilted ~37 degrees: alignment = 0.8, below the
        // strict 0.9 but above the relaxed 0.75.
        let normals = vec![Vector3::new(0.6, 0.0, 0.8); vertices.len()];
        let config = SelectionConfig {
            ref_height_pct: 0.0,
            meas_height_pct: 0.0,
            ..Default::default()
        };
        let err = select_surface(&vertices, &normals, &Vector3::z(), &config).unwrap_err();
        assert!(matches!(
            err,
            RoughnessError::InsufficientReference { actual: 0, .. }
        ));
    }

    #[test]
    fn strict_measurement_threshold_fails_relaxed_pass() {
        let (vertices, _) = stepped_mesh();
        let normals = vec![Vector3::new(0.1, 0.0, 1.0).normalize(); vertices.len()];
        // Deliberately inverted policy: measurement stricter than reference.
        let config = SelectionConfig {
            ref_height_pct: 0.0,
            meas_height_pct: 0.0,
            ref_normal_thresh: 0.9,
            meas_normal_thresh: 0.9999,
        };
        let err = select_surface(&vertices, &normals, &Vector3::z(), &config).unwrap_err();
        assert!(matches!(
            err,
            RoughnessError::InsufficientMeasurement { actual: 0, .. }
        ));
    }

    #[test]
    fn config_bounds_checked() {
        let bad = SelectionConfig {
            ref_height_pct: 130.0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        let bad = SelectionConfig {
            meas_normal_thresh: -0.5,
            ..Default::default()
        };
        assert!(bad.validate().is_err());

        assert!(SelectionConfig::default().validate().is_ok());
    }
}
