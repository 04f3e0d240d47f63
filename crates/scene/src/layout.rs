use crate::mesh::MeshError;

/// One vertex attribute: where it starts inside a vertex and how many
/// float components it spans. Offsets are in floats, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub offset: usize,
    pub components: usize,
}

/// Per-vertex attribute layout, declared once at upload time and
/// immutable afterward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayout {
    stride: usize,
    attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    pub fn new(stride: usize, attributes: Vec<VertexAttribute>) -> Result<Self, MeshError> {
        for attr in &attributes {
            if attr.components == 0 || attr.components > 4 {
                return Err(MeshError::BadComponentCount {
                    components: attr.components,
                });
            }
            if attr.offset + attr.components > stride {
                return Err(MeshError::AttributeOutOfStride {
                    offset: attr.offset,
                    components: attr.components,
                    stride,
                });
            }
        }
        Ok(Self { stride, attributes })
    }

    /// Interleaved position + normal, the scenery layout.
    pub fn position_normal() -> Self {
        Self {
            stride: 6,
            attributes: vec![
                VertexAttribute { offset: 0, components: 3 },
                VertexAttribute { offset: 3, components: 3 },
            ],
        }
    }

    /// Bare positions, the instance coordinate channel.
    pub fn position() -> Self {
        Self {
            stride: 3,
            attributes: vec![VertexAttribute { offset: 0, components: 3 }],
        }
    }

    /// Stride in float components.
    pub fn stride(&self) -> usize {
        self.stride
    }

    pub fn attributes(&self) -> &[VertexAttribute] {
        &self.attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_normal_layout() {
        let layout = VertexLayout::position_normal();
        assert_eq!(layout.stride(), 6);
        assert_eq!(layout.attributes().len(), 2);
        assert_eq!(layout.attributes()[1].offset, 3);
    }

    #[test]
    fn attribute_past_stride_is_rejected() {
        let err = VertexLayout::new(4, vec![VertexAttribute { offset: 2, components: 3 }]);
        assert!(matches!(err, Err(MeshError::AttributeOutOfStride { .. })));
    }

    #[test]
    fn zero_component_attribute_is_rejected() {
        let err = VertexLayout::new(4, vec![VertexAttribute { offset: 0, components: 0 }]);
        assert!(matches!(err, Err(MeshError::BadComponentCount { .. })));
    }
}
