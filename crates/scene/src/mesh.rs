use crate::layout::VertexLayout;

/// Errors from mesh construction and layout declaration.
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("vertex data length {len} is not a multiple of stride {stride}")]
    RaggedVertexData { len: usize, stride: usize },
    #[error("attribute {{offset {offset}, components {components}}} spans past stride {stride}")]
    AttributeOutOfStride {
        offset: usize,
        components: usize,
        stride: usize,
    },
    #[error("attribute component count {components} outside 1..=4")]
    BadComponentCount { components: usize },
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },
    #[error("effect channel holds {len} floats, expected 2 per vertex for {vertex_count} vertices")]
    EffectChannelMismatch { len: usize, vertex_count: usize },
}

fn check_indices(indices: &[u32], vertex_count: usize) -> Result<(), MeshError> {
    for &index in indices {
        if index as usize >= vertex_count {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertex_count,
            });
        }
    }
    Ok(())
}

/// Static scenery geometry: one interleaved vertex array and a fixed
/// triangle index set. No per-instance uniforms, never deforms.
#[derive(Debug, Clone)]
pub struct SceneryMesh {
    vertices: Vec<f32>,
    indices: Vec<u32>,
    layout: VertexLayout,
}

impl SceneryMesh {
    pub fn new(
        vertices: Vec<f32>,
        indices: Vec<u32>,
        layout: VertexLayout,
    ) -> Result<Self, MeshError> {
        if vertices.len() % layout.stride() != 0 {
            return Err(MeshError::RaggedVertexData {
                len: vertices.len(),
                stride: layout.stride(),
            });
        }
        check_indices(&indices, vertices.len() / layout.stride())?;
        Ok(Self {
            vertices,
            indices,
            layout,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / self.layout.stride()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn layout(&self) -> &VertexLayout {
        &self.layout
    }
}

/// Simulation-style geometry: bare positions, a per-vertex 2-component
/// effect channel in its own array, a triangle ("fill") index set and an
/// alternate line-topology index set for wireframe display.
#[derive(Debug, Clone)]
pub struct InstanceMesh {
    vertices: Vec<f32>,
    effects: Vec<f32>,
    indices: Vec<u32>,
    line_indices: Vec<u32>,
    max_effect: f32,
}

impl InstanceMesh {
    pub fn new(
        vertices: Vec<f32>,
        effects: Vec<f32>,
        indices: Vec<u32>,
        line_indices: Vec<u32>,
    ) -> Result<Self, MeshError> {
        let layout = VertexLayout::position();
        if vertices.len() % layout.stride() != 0 {
            return Err(MeshError::RaggedVertexData {
                len: vertices.len(),
                stride: layout.stride(),
            });
        }
        let vertex_count = vertices.len() / layout.stride();
        if effects.len() != vertex_count * 2 {
            return Err(MeshError::EffectChannelMismatch {
                len: effects.len(),
                vertex_count,
            });
        }
        check_indices(&indices, vertex_count)?;
        check_indices(&line_indices, vertex_count)?;

        let max_effect = effects
            .chunks_exact(2)
            .map(|pair| pair[0].hypot(pair[1]))
            .fold(0.0_f32, f32::max);

        Ok(Self {
            vertices,
            effects,
            indices,
            line_indices,
            max_effect,
        })
    }

    /// Overrides the computed effect peak, for loaders that ship one.
    pub fn with_max_effect(mut self, max_effect: f32) -> Self {
        self.max_effect = max_effect;
        self
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    pub fn effects(&self) -> &[f32] {
        &self.effects
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn line_indices(&self) -> &[u32] {
        &self.line_indices
    }

    /// Peak effect magnitude, the normalization factor for display.
    pub fn max_effect(&self) -> f32 {
        self.max_effect
    }
}

/// Splits 4-node quad elements into triangle pairs. The GPU only draws
/// triangles; quads come from the mesh file format.
pub fn quads_to_triangles(quads: &[u32]) -> Vec<u32> {
    debug_assert!(quads.len() % 4 == 0);

    let mut indices = Vec::with_capacity(quads.len() / 4 * 6);
    for quad in quads.chunks_exact(4) {
        indices.extend_from_slice(&[quad[0], quad[1], quad[3]]);
        indices.extend_from_slice(&[quad[1], quad[2], quad[3]]);
    }
    indices
}

/// Unit cube centered on the origin: 8 vertices, 12 triangles, with
/// corner normals. Used by the demo scene and the frame-loop tests.
pub fn unit_cube() -> SceneryMesh {
    let n = 1.0 / 3.0_f32.sqrt();
    let mut vertices = Vec::with_capacity(8 * 6);
    for corner in 0..8u32 {
        let x: f32 = if corner & 1 != 0 { 0.5 } else { -0.5 };
        let y: f32 = if corner & 2 != 0 { 0.5 } else { -0.5 };
        let z: f32 = if corner & 4 != 0 { 0.5 } else { -0.5 };
        vertices.extend_from_slice(&[x, y, z, x.signum() * n, y.signum() * n, z.signum() * n]);
    }

    // corner bits: 1 = +x, 2 = +y, 4 = +z
    #[rustfmt::skip]
    let indices = vec![
        0, 1, 3,  3, 2, 0, // -z
        4, 6, 7,  7, 5, 4, // +z
        0, 4, 5,  5, 1, 0, // -y
        2, 3, 7,  7, 6, 2, // +y
        0, 2, 6,  6, 4, 0, // -x
        1, 5, 7,  7, 3, 1, // +x
    ];

    SceneryMesh::new(vertices, indices, VertexLayout::position_normal())
        .expect("unit cube is well-formed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenery_rejects_ragged_vertex_data() {
        let err = SceneryMesh::new(vec![0.0; 7], vec![], VertexLayout::position_normal());
        assert!(matches!(err, Err(MeshError::RaggedVertexData { len: 7, stride: 6 })));
    }

    #[test]
    fn scenery_rejects_out_of_range_index() {
        let err = SceneryMesh::new(vec![0.0; 12], vec![0, 1, 2], VertexLayout::position_normal());
        assert!(matches!(
            err,
            Err(MeshError::IndexOutOfRange { index: 2, vertex_count: 2 })
        ));
    }

    #[test]
    fn instance_rejects_short_effect_channel() {
        let err = InstanceMesh::new(vec![0.0; 9], vec![0.0; 4], vec![0, 1, 2], vec![]);
        assert!(matches!(
            err,
            Err(MeshError::EffectChannelMismatch { len: 4, vertex_count: 3 })
        ));
    }

    #[test]
    fn instance_validates_line_indices_too() {
        let err = InstanceMesh::new(vec![0.0; 9], vec![0.0; 6], vec![], vec![0, 3]);
        assert!(matches!(err, Err(MeshError::IndexOutOfRange { index: 3, .. })));
    }

    #[test]
    fn max_effect_is_peak_pair_magnitude() {
        let mesh = InstanceMesh::new(
            vec![0.0; 9],
            vec![0.0, 0.0, 3.0, 4.0, 1.0, 0.0],
            vec![0, 1, 2],
            vec![0, 1],
        )
        .unwrap();
        assert_eq!(mesh.max_effect(), 5.0);

        let overridden = mesh.with_max_effect(8.0);
        assert_eq!(overridden.max_effect(), 8.0);
    }

    #[test]
    fn quad_conversion_matches_element_winding() {
        assert_eq!(quads_to_triangles(&[0, 1, 2, 3]), vec![0, 1, 3, 1, 2, 3]);
        assert_eq!(quads_to_triangles(&[4, 5, 6, 7]).len(), 6);
    }

    #[test]
    fn unit_cube_shape() {
        let cube = unit_cube();
        assert_eq!(cube.vertex_count(), 8);
        assert_eq!(cube.index_count(), 36);
        // all indices refer to real vertices; constructor enforced it
        assert!(cube.indices().iter().all(|&i| i < 8));

        // every corner normal is unit length and points away from center
        for vertex in cube.vertices().chunks_exact(6) {
            let (p, n) = (&vertex[..3], &vertex[3..]);
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!((len - 1.0).abs() < 1e-6, "normal length {len}");
            let dot = p[0] * n[0] + p[1] * n[1] + p[2] * n[2];
            assert!(dot > 0.0, "normal points inward");
        }
    }
}
