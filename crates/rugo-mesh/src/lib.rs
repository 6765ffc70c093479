#![warn(missing_docs)]

//! Mesh loading for the rugo toolkit.
//!
//! Resolves a GLB file into the single normalized vertex/normal/face
//! representation ([`MeshData`]) consumed by `rugo-core`, collapsing
//! multi-geometry scenes and synthesizing normals when the file carries
//! none.

pub mod error;
pub mod glb;
pub mod types;

pub use error::{MeshError, Result};
pub use glb::{load_glb, load_glb_from_slice};
pub use types::{synthesize_normals, MeshData};
