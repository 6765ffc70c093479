//! Error types for mesh loading.

use thiserror::Error;

/// Errors that can occur while loading and normalizing a mesh file.
#[derive(Error, Debug)]
pub enum MeshError {
    /// I/O error reading a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed or unsupported glTF/GLB content.
    #[error("glTF error: {0}")]
    Gltf(#[from] gltf::Error),

    /// The scene contains no triangle geometry.
    #[error("scene contains no triangle geometry")]
    NoGeometry,

    /// The scene contains geometry, but only in primitive modes the
    /// loader does not consume (points, lines, strips, fans).
    #[error("unsupported primitive mode: {0}")]
    UnsupportedPrimitive(String),

    /// A face references a vertex outside the vertex array.
    #[error("face {face} references vertex {index}, but only {vertices} vertices exist")]
    InvalidFaceIndex {
        /// Offending face index.
        face: usize,
        /// Out-of-range vertex index.
        index: u32,
        /// Vertex count.
        vertices: usize,
    },

    /// Vertex and normal arrays are not parallel.
    #[error("mesh has {vertices} vertices but {normals} normals")]
    MismatchedNormals {
        /// Vertex count.
        vertices: usize,
        /// Normal count.
        normals: usize,
    },
}

/// Result type for mesh operations.
pub type Result<T> = std::result::Result<T, MeshError>;
