//! Scene geometry model, GPU-agnostic.
//!
//! Meshes arrive as already-decoded flat numeric arrays and are validated
//! once at construction. After that they are immutable: no partial
//! updates, no deletion during a session.
//!
//! # Invariants
//! - Vertex data length is a whole multiple of the declared stride.
//! - Every index (triangle or line set) refers to a valid vertex.
//! - Instance meshes carry exactly one 2-component effect entry per vertex.

mod layout;
mod mesh;

pub use layout::{VertexAttribute, VertexLayout};
pub use mesh::{InstanceMesh, MeshError, SceneryMesh, quads_to_triangles, unit_cube};
