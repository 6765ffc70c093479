//! The normalized mesh representation handed to the analysis core.

use nalgebra::{Point3, Vector3};

use crate::error::{MeshError, Result};

/// A single coherent vertex/normal/face set.
///
/// This is the explicit boundary contract between mesh loading and the
/// roughness core: positions and normals are parallel arrays with 1:1
/// index correspondence, and faces index into them. It is validated once
/// at load time; the core never sees a mesh-library object.
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    /// Vertex positions.
    pub vertices: Vec<Point3<f64>>,
    /// Per-vertex unit normals, parallel to `vertices`.
    pub normals: Vec<Vector3<f64>>,
    /// Triangle faces as vertex-index triples. Passed through for
    /// display; the roughness metrics never consume them.
    pub faces: Vec<[u32; 3]>,
}

impl MeshData {
    /// Create an empty mesh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of vertices.
    pub fn num_vertices(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangle faces.
    pub fn num_faces(&self) -> usize {
        self.faces.len()
    }

    /// Axis-aligned bounds, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Point3<f64>, Point3<f64>)> {
        let first = self.vertices.first()?;
        let mut min = *first;
        let mut max = *first;
        for v in &self.vertices[1..] {
            for k in 0..3 {
                min[k] = min[k].min(v[k]);
                max[k] = max[k].max(v[k]);
            }
        }
        Some((min, max))
    }

    /// Append another mesh, re-basing its face indices.
    pub fn merge(&mut self, other: &MeshData) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.normals.extend_from_slice(&other.normals);
        self.faces.extend(
            other
                .faces
                .iter()
                .map(|f| [f[0] + offset, f[1] + offset, f[2] + offset]),
        );
    }

    /// Check the data contract invariants.
    ///
    /// # Errors
    ///
    /// * [`MeshError::MismatchedNormals`] if the normal array is not
    ///   parallel to the vertex array.
    /// * [`MeshError::InvalidFaceIndex`] if any face indexes past the
    ///   vertex array.
    pub fn validate(&self) -> Result<()> {
        if self.normals.len() != self.vertices.len() {
            return Err(MeshError::MismatchedNormals {
                vertices: self.vertices.len(),
                normals: self.normals.len(),
            });
        }
        let count = self.vertices.len();
        for (face, indices) in self.faces.iter().enumerate() {
            for &index in indices {
                if index as usize >= count {
                    return Err(MeshError::InvalidFaceIndex {
                        face,
                        index,
                        vertices: count,
                    });
                }
            }
        }
        Ok(())
    }
}

/// Synthesize per-vertex unit normals from face windings.
///
/// Accumulates the (area-weighted) cross product of each face's edge
/// vectors onto its three vertices and normalizes. Vertices touched by no
/// face, or whose incident faces cancel, default to `+Z`.
pub fn synthesize_normals(vertices: &[Point3<f64>], faces: &[[u32; 3]]) -> Vec<Vector3<f64>> {
    let mut normals = vec![Vector3::zeros(); vertices.len()];
    for face in faces {
        let [i0, i1, i2] = [face[0] as usize, face[1] as usize, face[2] as usize];
        let e1 = vertices[i1] - vertices[i0];
        let e2 = vertices[i2] - vertices[i0];
        let face_normal = e1.cross(&e2); // magnitude = 2x face area
        normals[i0] += face_normal;
        normals[i1] += face_normal;
        normals[i2] += face_normal;
    }
    for n in &mut normals {
        let len = n.norm();
        if len > 1e-12 {
            *n /= len;
        } else {
            *n = Vector3::z();
        }
    }
    normals
}
