//! Vertex attribute layout
//!
//! Inspects a mesh's authored channels and derives the ordered schema of the
//! interleaved vertex buffer: position first, the packed skin slots when the
//! mesh is skinned, then one descriptor per channel instance in fixed
//! semantic order. Every submesh of a mesh shares one schema, and a vertex
//! blob can only be interpreted through it; there is no self-describing
//! header inside the buffer.

use crate::errors::{ExportError, Result};
use crate::provider::{ChannelKind, MeshId, SceneProvider};

/// Instance budget per repeated semantic (colors are exempt, see
/// [`ChannelKind::max_instances`]).
pub const MAX_CHANNEL_INSTANCES: usize = 8;

/// Hard per-vertex influence budget: two index slots and two weight slots
/// of four elements each.
pub const MAX_SKIN_INFLUENCES: usize = 8;

/// What a vertex attribute means, as a base semantic plus instance index
/// rather than offset arithmetic on a shared ordinal space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Semantic {
    Position,
    /// Packed joint indices, slot 0 or 1 (4 joints each).
    SkinIndices(u8),
    /// Packed joint weights, slot 0 or 1 (4 weights each).
    SkinWeights(u8),
    Normal(u8),
    Tangent(u8),
    Binormal(u8),
    Uv(u8),
    Color(u8),
}

impl Semantic {
    /// The Nth authored instance of a repeated channel kind.
    #[must_use]
    pub fn of(kind: ChannelKind, instance: u8) -> Self {
        match kind {
            ChannelKind::Normal => Self::Normal(instance),
            ChannelKind::Tangent => Self::Tangent(instance),
            ChannelKind::Binormal => Self::Binormal(instance),
            ChannelKind::Uv => Self::Uv(instance),
            ChannelKind::Color => Self::Color(instance),
        }
    }
}

/// Element storage types the provider vocabulary can request. The packer
/// only accepts the 4-byte types; see [`VertexSchema::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementType {
    Float32,
    Uint32,
    /// Channel source precision. Not packable; schemas carrying it are
    /// rejected with [`ExportError::UnsupportedElementType`].
    Float64,
}

/// One attribute descriptor: semantic, element arity (1–4) and storage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub semantic: Semantic,
    pub arity: u8,
    pub ty: ElementType,
}

impl VertexAttribute {
    #[must_use]
    pub fn new(semantic: Semantic, arity: u8, ty: ElementType) -> Self {
        Self { semantic, arity, ty }
    }

    /// Packed size of this attribute in bytes.
    fn byte_size(&self) -> Result<u32> {
        match self.ty {
            ElementType::Float32 | ElementType::Uint32 => Ok(4 * u32::from(self.arity)),
            ElementType::Float64 => Err(ExportError::UnsupportedElementType {
                semantic: self.semantic,
            }),
        }
    }
}

/// Ordered attribute descriptors plus the resulting byte stride.
///
/// Invariant: `stride` equals the sum of the descriptor sizes; a packed
/// vertex occupies exactly `stride` bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexSchema {
    pub attributes: Vec<VertexAttribute>,
    pub stride: u32,
}

impl VertexSchema {
    /// Validates the descriptors and computes the stride.
    pub fn new(attributes: Vec<VertexAttribute>) -> Result<Self> {
        let mut stride = 0;
        for attribute in &attributes {
            stride += attribute.byte_size()?;
        }
        Ok(Self { attributes, stride })
    }

    /// A schema with no attributes, used by placeholder meshes that
    /// contribute nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            attributes: Vec::new(),
            stride: 0,
        }
    }

    /// Derives the schema for one mesh from its authored channel counts.
    ///
    /// Position always comes first. A skinned mesh gets exactly two
    /// skin-index slots and two skin-weight slots right after, committing to
    /// the 8-influence budget regardless of how many joints actually
    /// influence a vertex. Repeated semantics follow in the order of
    /// [`ChannelKind::ALL`], one descriptor per authored instance up to the
    /// kind's instance cap.
    pub fn derive(provider: &impl SceneProvider, mesh: MeshId, skinned: bool) -> Result<Self> {
        let mut attributes = vec![VertexAttribute::new(
            Semantic::Position,
            3,
            ElementType::Float32,
        )];

        if skinned {
            attributes.push(VertexAttribute::new(
                Semantic::SkinIndices(0),
                4,
                ElementType::Uint32,
            ));
            attributes.push(VertexAttribute::new(
                Semantic::SkinIndices(1),
                4,
                ElementType::Uint32,
            ));
            attributes.push(VertexAttribute::new(
                Semantic::SkinWeights(0),
                4,
                ElementType::Float32,
            ));
            attributes.push(VertexAttribute::new(
                Semantic::SkinWeights(1),
                4,
                ElementType::Float32,
            ));
        }

        for kind in ChannelKind::ALL {
            let count = provider.channel_count(mesh, kind).min(kind.max_instances());
            for instance in 0..count {
                attributes.push(VertexAttribute::new(
                    Semantic::of(kind, instance as u8),
                    kind.arity(),
                    ElementType::Float32,
                ));
            }
        }

        Self::new(attributes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_is_four_times_total_arity() {
        let schema = VertexSchema::new(vec![
            VertexAttribute::new(Semantic::Position, 3, ElementType::Float32),
            VertexAttribute::new(Semantic::Uv(0), 2, ElementType::Float32),
            VertexAttribute::new(Semantic::SkinIndices(0), 4, ElementType::Uint32),
        ])
        .unwrap();
        assert_eq!(schema.stride, 4 * (3 + 2 + 4));
    }

    #[test]
    fn double_precision_storage_is_rejected() {
        let err = VertexSchema::new(vec![VertexAttribute::new(
            Semantic::Position,
            3,
            ElementType::Float64,
        )])
        .unwrap_err();
        assert!(matches!(
            err,
            ExportError::UnsupportedElementType {
                semantic: Semantic::Position
            }
        ));
    }

    #[test]
    fn empty_schema_has_zero_stride() {
        assert_eq!(VertexSchema::empty().stride, 0);
    }
}
