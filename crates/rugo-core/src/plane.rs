//! Reference-plane fitting in a tangent frame.
//!
//! The reference subset anchors an ordinary least-squares plane in a
//! frame orthogonal to the height axis; the measurement subset's signed
//! deviations from that plane are the roughness signal.

use nalgebra::{Matrix3, Point3, Vector3};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, RoughnessError};
use crate::surface::SurfaceSelection;

/// Ratio of tangent-plane scatter eigenvalues below which the reference
/// set is treated as collinear.
const COLLINEARITY_LIMIT: f64 = 1e-9;

/// Orthonormal frame `(t1, t2, n)` with `n` the height axis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TangentFrame {
    /// First tangent direction.
    pub t1: Vector3<f64>,
    /// Second tangent direction.
    pub t2: Vector3<f64>,
    /// Height axis (frame normal).
    pub n: Vector3<f64>,
}

impl TangentFrame {
    /// Build an orthonormal frame around a height axis.
    ///
    /// The reference vector is canonical X unless the height axis is
    /// nearly parallel to it (`|X . n| > 0.9`), in which case canonical Y
    /// is used instead; this keeps the cross product well away from zero.
    pub fn from_height_axis(height_axis: &Vector3<f64>) -> Self {
        let n = height_axis.normalize();
        let reference = if n.dot(&Vector3::x()).abs() > 0.9 {
            Vector3::y()
        } else {
            Vector3::x()
        };
        let t1 = n.cross(&reference).normalize();
        let t2 = n.cross(&t1);
        Self { t1, t2, n }
    }

    /// Project a point into frame coordinates `(u, v, w)`.
    pub fn project(&self, p: &Point3<f64>) -> (f64, f64, f64) {
        (
            p.coords.dot(&self.t1),
            p.coords.dot(&self.t2),
            p.coords.dot(&self.n),
        )
    }
}

/// A fitted reference plane `w = a*u + b*v + c` in a tangent frame.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaneFit {
    /// The tangent frame the coefficients live in.
    pub frame: TangentFrame,
    /// Slope along `t1`.
    pub a: f64,
    /// Slope along `t2`.
    pub b: f64,
    /// Intercept.
    pub c: f64,
}

impl PlaneFit {
    /// Predicted height at tangent coordinates `(u, v)`.
    pub fn predict(&self, u: f64, v: f64) -> f64 {
        self.a * u + self.b * v + self.c
    }
}

/// Fit the reference plane and evaluate measurement residuals.
///
/// Fits `w = a*u + b*v + c` by least squares over the reference subset
/// (normal equations, 3x3 solve), then evaluates one signed residual per
/// measurement vertex, in measurement-index order. Positive residuals lie
/// above the plane along the height axis.
///
/// # Errors
///
/// [`RoughnessError::DegenerateReference`] if the reference subset is
/// (near-)collinear in the tangent plane, which would make the fit
/// unstable. Selection-size failures are caught upstream.
pub fn fit_reference_plane(
    vertices: &[Point3<f64>],
    selection: &SurfaceSelection,
    height_axis: &Vector3<f64>,
) -> Result<(PlaneFit, Vec<f64>)> {
    let frame = TangentFrame::from_height_axis(height_axis);

    let ref_uvw: Vec<(f64, f64, f64)> = selection
        .reference_indices
        .iter()
        .map(|&i| frame.project(&vertices[i]))
        .collect();

    check_tangent_spread(&ref_uvw)?;

    // Normal equations for [a, b, c].
    let count = ref_uvw.len() as f64;
    let (mut suu, mut suv, mut svv, mut su, mut sv) = (0.0, 0.0, 0.0, 0.0, 0.0);
    let (mut suw, mut svw, mut sw) = (0.0, 0.0, 0.0);
    for &(u, v, w) in &ref_uvw {
        suu += u * u;
        suv += u * v;
        svv += v * v;
        su += u;
        sv += v;
        suw += u * w;
        svw += v * w;
        sw += w;
    }
    let normal = Matrix3::new(suu, suv, su, suv, svv, sv, su, sv, count);
    let rhs = Vector3::new(suw, svw, sw);

    let solution = normal.lu().solve(&rhs).ok_or_else(|| {
        RoughnessError::DegenerateReference("singular normal equations".into())
    })?;

    let fit = PlaneFit {
        frame,
        a: solution.x,
        b: solution.y,
        c: solution.z,
    };

    let residuals: Vec<f64> = selection
        .measurement_indices
        .par_iter()
        .map(|&i| {
            let (u, v, w) = fit.frame.project(&vertices[i]);
            w - fit.predict(u, v)
        })
        .collect();

    Ok((fit, residuals))
}

/// Reject reference sets whose tangent coordinates are (near-)collinear.
///
/// Uses the eigenvalues of the 2x2 scatter of centered `(u, v)`: if the
/// smaller is vanishing relative to the larger, every reference point
/// lies on a line and the plane's cross-slope is unconstrained.
fn check_tangent_spread(uvw: &[(f64, f64, f64)]) -> Result<()> {
    let count = uvw.len() as f64;
    let mu = uvw.iter().map(|&(u, _, _)| u).sum::<f64>() / count;
    let mv = uvw.iter().map(|&(_, v, _)| v).sum::<f64>() / count;

    let (mut cuu, mut cuv, mut cvv) = (0.0, 0.0, 0.0);
    for &(u, v, _) in uvw {
        let (du, dv) = (u - mu, v - mv);
        cuu += du * du;
        cuv += du * dv;
        cvv += dv * dv;
    }

    // Closed-form eigenvalues of [[cuu, cuv], [cuv, cvv]].
    let half_trace = 0.5 * (cuu + cvv);
    let det = cuu * cvv - cuv * cuv;
    let disc = (half_trace * half_trace - det).max(0.0).sqrt();
    let (lambda_max, lambda_min) = (half_trace + disc, half_trace - disc);

    if lambda_max <= 0.0 || lambda_min / lambda_max < COLLINEARITY_LIMIT {
        return Err(RoughnessError::DegenerateReference(format!(
            "tangent-plane scatter ratio {:.3e} below {COLLINEARITY_LIMIT:.0e}",
            if lambda_max > 0.0 {
                lambda_min / lambda_max
            } else {
                0.0
            }
        )));
    }
    Ok(())
}
