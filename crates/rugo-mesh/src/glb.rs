//! GLB/glTF import: flattens a scene into one [`MeshData`].
//!
//! A GLB file may carry several meshes spread across a node tree with
//! per-node transforms. The analysis core wants a single coherent
//! vertex/normal/face set, so the loader walks the default scene,
//! applies node transforms, and concatenates every triangle primitive.

use std::path::Path;

use gltf::mesh::Mode;
use nalgebra::{Matrix3, Matrix4, Point3, Vector3, Vector4};

use crate::error::{MeshError, Result};
use crate::types::{synthesize_normals, MeshData};

/// Load a GLB (or .gltf) file into a single flattened mesh.
///
/// # Errors
///
/// * [`MeshError::Gltf`] for malformed files.
/// * [`MeshError::NoGeometry`] if the scene has no triangle primitives.
pub fn load_glb(path: impl AsRef<Path>) -> Result<MeshData> {
    let (document, buffers, _images) = gltf::import(path)?;
    flatten_document(&document, &buffers)
}

/// Load a GLB from an in-memory byte buffer (e.g. an uploaded file).
pub fn load_glb_from_slice(bytes: &[u8]) -> Result<MeshData> {
    let (document, buffers, _images) = gltf::import_slice(bytes)?;
    flatten_document(&document, &buffers)
}

fn flatten_document(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
) -> Result<MeshData> {
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(MeshError::NoGeometry)?;

    let mut mesh = MeshData::new();
    let mut all_normals_present = true;
    let mut skipped_mode = None;
    for node in scene.nodes() {
        visit_node(
            &node,
            &Matrix4::identity(),
            buffers,
            &mut mesh,
            &mut all_normals_present,
            &mut skipped_mode,
        );
    }

    if mesh.vertices.is_empty() {
        // A scene made entirely of points/lines is a different caller
        // mistake than an empty one; name the mode that was skipped.
        return Err(match skipped_mode {
            Some(mode) => MeshError::UnsupportedPrimitive(mode),
            None => MeshError::NoGeometry,
        });
    }

    // A mesh with any primitive missing normals gets a uniform
    // face-derived normal field; mixing authored and synthesized normals
    // would bias the selection passes between primitives.
    if !all_normals_present {
        mesh.normals = synthesize_normals(&mesh.vertices, &mesh.faces);
    }

    mesh.validate()?;
    Ok(mesh)
}

fn visit_node(
    node: &gltf::Node,
    parent: &Matrix4<f64>,
    buffers: &[gltf::buffer::Data],
    mesh: &mut MeshData,
    all_normals_present: &mut bool,
    skipped_mode: &mut Option<String>,
) {
    let local = Matrix4::from(node.transform().matrix()).cast::<f64>();
    let world = parent * local;

    if let Some(gltf_mesh) = node.mesh() {
        for primitive in gltf_mesh.primitives() {
            if primitive.mode() != Mode::Triangles {
                skipped_mode.get_or_insert_with(|| format!("{:?}", primitive.mode()));
                continue;
            }
            if let Some(part) = read_primitive(&primitive, buffers, &world) {
                if part.normals.is_empty() {
                    *all_normals_present = false;
                    // Keep arrays parallel until synthesis runs.
                    let mut part = part;
                    part.normals = vec![Vector3::zeros(); part.vertices.len()];
                    mesh.merge(&part);
                } else {
                    mesh.merge(&part);
                }
            }
        }
    }

    for child in node.children() {
        visit_node(&child, &world, buffers, mesh, all_normals_present, skipped_mode);
    }
}

fn read_primitive(
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
    world: &Matrix4<f64>,
) -> Option<MeshData> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &*data.0));

    let vertices: Vec<Point3<f64>> = reader
        .read_positions()?
        .map(|p| transform_point(world, p))
        .collect();

    let normals: Vec<Vector3<f64>> = reader
        .read_normals()
        .map(|iter| iter.map(|n| transform_normal(world, n)).collect())
        .unwrap_or_default();

    let faces: Vec<[u32; 3]> = match reader.read_indices() {
        Some(indices) => triples(indices.into_u32()),
        // Non-indexed primitive: every three positions form a triangle.
        None => triples(0..vertices.len() as u32),
    };

    Some(MeshData {
        vertices,
        normals,
        faces,
    })
}

fn triples(indices: impl Iterator<Item = u32>) -> Vec<[u32; 3]> {
    let flat: Vec<u32> = indices.collect();
    flat.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect()
}

fn transform_point(world: &Matrix4<f64>, p: [f32; 3]) -> Point3<f64> {
    let v = world * Vector4::new(f64::from(p[0]), f64::from(p[1]), f64::from(p[2]), 1.0);
    Point3::new(v.x, v.y, v.z)
}

/// Normals transform by the inverse transpose of the upper-left 3x3 so
/// non-uniform node scales do not shear them.
fn transform_normal(world: &Matrix4<f64>, n: [f32; 3]) -> Vector3<f64> {
    let n = Vector3::new(f64::from(n[0]), f64::from(n[1]), f64::from(n[2]));
    let m3: Matrix3<f64> = world.fixed_view::<3, 3>(0, 0).into_owned();
    let transformed = match m3.try_inverse() {
        Some(inv) => inv.transpose() * n,
        None => n,
    };
    let len = transformed.norm();
    if len > 1e-12 {
        transformed / len
    } else {
        Vector3::z()
    }
}
