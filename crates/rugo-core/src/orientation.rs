//! Intrinsic orientation detection via principal component analysis.
//!
//! A printed part arrives in an arbitrary coordinate frame. The height
//! axis is recovered from the geometry itself: it is the principal axis
//! of *smallest* variance, i.e. the thickness direction of a roughly
//! slab-like part, independent of however the mesh was exported.

use nalgebra::{Matrix3, Point3, SymmetricEigen, Vector3};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RoughnessError};

/// Minimum vertex count for a reliable orientation estimate.
pub const MIN_VERTICES: usize = 50;

/// Maximum ratio of smallest to largest eigenvalue before the height
/// axis is considered ambiguous (a cube or sphere has no thin axis).
pub const ISOTROPY_RATIO_LIMIT: f64 = 0.5;

/// Result of intrinsic orientation detection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrientationResult {
    /// Orthonormal principal axes, sorted by variance descending.
    /// `axes[0]` is the direction of maximum spatial extent.
    pub axes: [Vector3<f64>; 3],
    /// Variances (eigenvalues) along each axis, sorted descending.
    pub eigenvalues: [f64; 3],
    /// Unit-length height axis: `axes[2]` with its sign stabilized
    /// toward canonical up `(0, 0, 1)`.
    pub height_axis: Vector3<f64>,
    /// Min and max of centered vertex positions projected onto the
    /// height axis.
    pub height_range: (f64, f64),
}

/// Detect the intrinsic height axis of a vertex cloud.
///
/// Centers the vertices on their centroid, eigendecomposes the 3x3
/// covariance matrix, and takes the eigenvector of smallest eigenvalue
/// as the height axis.
///
/// A symmetric eigensolver may return either of two mirrored
/// eigenvectors; the axis is flipped toward `(0, 0, 1)` so that
/// near-identical inputs always produce the same sign.
///
/// # Errors
///
/// * [`RoughnessError::InsufficientGeometry`] if there are fewer than
///   [`MIN_VERTICES`] vertices.
/// * [`RoughnessError::AmbiguousOrientation`] if the smallest-to-largest
///   eigenvalue ratio exceeds [`ISOTROPY_RATIO_LIMIT`], or the cloud has
///   no spatial extent at all: the geometry has no clearly dominant thin
///   axis, and guessing would be worse than failing.
#[allow(clippy::cast_precision_loss)]
pub fn detect_orientation(vertices: &[Point3<f64>]) -> Result<OrientationResult> {
    if vertices.len() < MIN_VERTICES {
        return Err(RoughnessError::InsufficientGeometry {
            required: MIN_VERTICES,
            actual: vertices.len(),
        });
    }

    let count = vertices.len() as f64;
    let mut centroid = Vector3::zeros();
    for v in vertices {
        centroid += v.coords;
    }
    centroid /= count;

    let mut covariance = Matrix3::zeros();
    for v in vertices {
        let centered = v.coords - centroid;
        covariance += centered * centered.transpose();
    }
    covariance /= count;

    let eigen = SymmetricEigen::new(covariance);
    let eigenvalues = eigen.eigenvalues;
    let eigenvectors = eigen.eigenvectors;

    // Sort eigenvalue/eigenvector pairs by eigenvalue descending.
    let mut indices = [0usize, 1, 2];
    indices.sort_by(|&a, &b| {
        eigenvalues[b]
            .partial_cmp(&eigenvalues[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let axes = [
        eigenvectors.column(indices[0]).into_owned(),
        eigenvectors.column(indices[1]).into_owned(),
        eigenvectors.column(indices[2]).into_owned(),
    ];
    let sorted_eigenvalues = [
        eigenvalues[indices[0]],
        eigenvalues[indices[1]],
        eigenvalues[indices[2]],
    ];

    // An all-coincident cloud has no spatial extent at all: every axis
    // is equally (un)informative, the limiting case of isotropy.
    if sorted_eigenvalues[0] <= 0.0 {
        return Err(RoughnessError::AmbiguousOrientation {
            ratio: 1.0,
            limit: ISOTROPY_RATIO_LIMIT,
        });
    }
    let ratio = sorted_eigenvalues[2] / sorted_eigenvalues[0];
    if ratio > ISOTROPY_RATIO_LIMIT {
        return Err(RoughnessError::AmbiguousOrientation {
            ratio,
            limit: ISOTROPY_RATIO_LIMIT,
        });
    }

    // Smallest-variance axis, sign-stabilized toward canonical up.
    let mut height_axis = axes[2];
    if height_axis.dot(&Vector3::z()) < 0.0 {
        height_axis = -height_axis;
    }

    let mut h_min = f64::INFINITY;
    let mut h_max = f64::NEG_INFINITY;
    for v in vertices {
        let h = (v.coords - centroid).dot(&height_axis);
        h_min = h_min.min(h);
        h_max = h_max.max(h);
    }

    Ok(OrientationResult {
        axes,
        eigenvalues: sorted_eigenvalues,
        height_axis,
        height_range: (h_min, h_max),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Flat grid of `nx * ny` points spanning `sx * sy`, at z = 0.
    fn flat_grid(nx: usize, ny: usize, sx: f64, sy: f64) -> Vec<Point3<f64>> {
        let mut pts = Vec::with_capacity(nx * ny);
        for i in 0..nx {
            for j in 0..ny {
                let x = sx * i as f64 / (nx - 1) as f64;
                let y = sy * j as f64 / (ny - 1) as f64;
                pts.push(Point3::new(x, y, 0.0));
            }
        }
        pts
    }

    /// Deterministic sphere-like cloud (spherical spiral).
    fn sphere_cloud(n: usize, radius: f64) -> Vec<Point3<f64>> {
        let golden = std::f64::consts::PI * (3.0 - 5.0_f64.sqrt());
        (0..n)
            .map(|k| {
                let z = 1.0 - 2.0 * (k as f64 + 0.5) / n as f64;
                let r = (1.0 - z * z).sqrt();
                let theta = golden * k as f64;
                Point3::new(
                    radius * r * theta.cos(),
                    radius * r * theta.sin(),
                    radius * z,
                )
            })
            .collect()
    }

    #[test]
    fn height_axis_is_unit_and_eigenvalues_descend() {
        let pts = flat_grid(10, 10, 20.0, 10.0);
        let result = detect_orientation(&pts).unwrap();

        assert_relative_eq!(result.height_axis.norm(), 1.0, epsilon = 1e-9);
        assert!(result.eigenvalues[0] >= result.eigenvalues[1]);
        assert!(result.eigenvalues[1] >= result.eigenvalues[2]);
    }

    #[test]
    fn flat_grid_height_axis_is_z() {
        let pts = flat_grid(10, 10, 20.0, 10.0);
        let result = detect_orientation(&pts).unwrap();

        // Thinnest extent of a flat grid is its normal.
        assert_relative_eq!(result.height_axis.z.abs(), 1.0, epsilon = 1e-9);
        // Sign stabilization must have picked +Z.
        assert!(result.height_axis.z > 0.0);
    }

    #[test]
    fn tilted_slab_recovers_its_normal() {
        // Grid on the plane spanned by two orthonormal vectors whose
        // normal is (1, 1, 1)/sqrt(3).
        let n = Vector3::new(1.0, 1.0, 1.0).normalize();
        let t1 = Vector3::new(1.0, -1.0, 0.0).normalize();
        let t2 = n.cross(&t1);

        let mut pts = Vec::new();
        for i in 0..12 {
            for j in 0..12 {
                let u = i as f64 - 5.5;
                let v = (j as f64 - 5.5) * 0.6;
                pts.push(Point3::from(t1 * u + t2 * v));
            }
        }

        let result = detect_orientation(&pts).unwrap();
        assert_relative_eq!(result.height_axis.dot(&n).abs(), 1.0, epsilon = 1e-9);
        // Flipped toward canonical up: positive z component.
        assert!(result.height_axis.z > 0.0);
    }

    #[test]
    fn too_few_vertices_rejected() {
        let pts = flat_grid(5, 2, 4.0, 1.0); // 10 vertices
        let err = detect_orientation(&pts).unwrap_err();
        assert!(matches!(
            err,
            RoughnessError::InsufficientGeometry {
                required: MIN_VERTICES,
                actual: 10
            }
        ));
    }

    #[test]
    fn coincident_cloud_is_ambiguous() {
        // Zero variance in every direction: no axis is better than any
        // other, and the failure belongs to orientation detection, not
        // to a later stage.
        let pts = vec![Point3::new(1.0, 2.0, 3.0); 60];
        let err = detect_orientation(&pts).unwrap_err();
        assert!(matches!(err, RoughnessError::AmbiguousOrientation { .. }));
    }

    #[test]
    fn sphere_is_ambiguous() {
        let pts = sphere_cloud(200, 5.0);
        let err = detect_orientation(&pts).unwrap_err();
        assert!(matches!(err, RoughnessError::AmbiguousOrientation { .. }));
    }

    #[test]
    fn height_range_spans_centered_projections() {
        // Slab with known thickness: two flat sheets 2.0 apart.
        let mut pts = flat_grid(10, 10, 20.0, 10.0);
        pts.extend(
            flat_grid(10, 10, 20.0, 10.0)
                .into_iter()
                .map(|p| Point3::new(p.x, p.y, 2.0)),
        );

        let result = detect_orientation(&pts).unwrap();
        let (lo, hi) = result.height_range;
        assert_relative_eq!(hi - lo, 2.0, epsilon = 1e-9);
        assert_relative_eq!(lo, -1.0, epsilon = 1e-9);
    }
}
