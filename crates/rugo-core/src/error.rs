//! Error types for the roughness pipeline.

use thiserror::Error;

/// Errors that can occur during roughness analysis.
///
/// Every stage fails fast: there are no partial results and no fallback
/// heuristics (thresholds are never lowered silently). The caller decides
/// whether to retry with a different configuration.
#[derive(Error, Debug)]
pub enum RoughnessError {
    /// Too few vertices to estimate an orientation.
    #[error("insufficient geometry: need at least {required} vertices, got {actual}")]
    InsufficientGeometry {
        /// Minimum vertex count.
        required: usize,
        /// Actual vertex count.
        actual: usize,
    },

    /// Geometry is near-isotropic; the height axis would be arbitrary.
    #[error("ambiguous orientation: variance ratio {ratio:.3} exceeds limit {limit}")]
    AmbiguousOrientation {
        /// Ratio of smallest to largest eigenvalue.
        ratio: f64,
        /// Maximum ratio for a trustworthy height axis.
        limit: f64,
    },

    /// Strict selection pass produced too few reference vertices.
    #[error("insufficient reference surface: need at least {required} vertices, got {actual}")]
    InsufficientReference {
        /// Minimum reference vertex count.
        required: usize,
        /// Actual reference vertex count.
        actual: usize,
    },

    /// Relaxed selection pass produced too few measurement vertices.
    #[error("insufficient measurement surface: need at least {required} vertices, got {actual}")]
    InsufficientMeasurement {
        /// Minimum measurement vertex count.
        required: usize,
        /// Actual measurement vertex count.
        actual: usize,
    },

    /// Reference vertices are (near-)collinear in the tangent plane;
    /// the least-squares fit would be unstable.
    #[error("degenerate reference set: {0}")]
    DegenerateReference(String),

    /// Vertex and normal arrays are not parallel.
    #[error("mismatched inputs: {vertices} vertices but {normals} normals")]
    MismatchedNormals {
        /// Vertex count.
        vertices: usize,
        /// Normal count.
        normals: usize,
    },

    /// Invalid analysis configuration.
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

/// Result type for roughness operations.
pub type Result<T> = std::result::Result<T, RoughnessError>;
