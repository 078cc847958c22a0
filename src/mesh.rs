//! Vertex deduplication & submesh partitioning
//!
//! The algorithmic core of the export. A mesh's polygons are walked once;
//! each polygon resolves its material (allocating a submesh the first time
//! a material name is seen), every polygon-vertex occurrence is sampled
//! against the derived schema into one packed byte vector, and identical
//! vertices are collapsed through a content hash. Polygons with more than
//! three corners are fanned into triangle-list indices on the fly.

use glam::DVec4;
use rustc_hash::FxHashMap;
use xxhash_rust::xxh3::xxh3_64;

use crate::errors::{ExportError, Result, warn};
use crate::layout::VertexSchema;
use crate::provider::{AttributeChannel, ChannelKind, MappingMode, MeshId, ReferenceMode, SceneProvider};
use crate::skin::SkinBinding;
use crate::traverse::SceneIndex;

/// One material's share of a mesh: a tightly packed, schema-conformant
/// vertex blob and a triangle-list index buffer referencing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubMesh {
    /// Index into the owning [`MultiMesh::material_names`] table.
    pub material_id: u32,
    /// Interleaved vertex bytes; interpret through the mesh's schema.
    pub vertex_data: Vec<u8>,
    /// Triangle list, 32-bit indices into this submesh's vertices.
    pub indices: Vec<u32>,
}

impl SubMesh {
    /// Number of packed vertices, given the owning schema's stride.
    #[must_use]
    pub fn vertex_count(&self, stride: u32) -> u32 {
        if stride == 0 {
            0
        } else {
            (self.vertex_data.len() / stride as usize) as u32
        }
    }
}

/// One mesh-bearing node's worth of output: shared schema, name tables and
/// one submesh per distinct material.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiMesh {
    pub name: String,
    pub schema: VertexSchema,
    /// Material names in first-seen order; submesh `material_id` indexes
    /// this table (and equals the submesh's own position in `submeshes`).
    pub material_names: Vec<String>,
    /// UV set names in declaration order.
    pub uv_set_names: Vec<String>,
    pub submeshes: Vec<SubMesh>,
    /// For skinned meshes: cluster ordinal → flat node index of the joint.
    pub joint_nodes: Vec<u32>,
}

impl MultiMesh {
    /// A mesh that contributes nothing, emitted in place of a mesh whose
    /// extraction aborted so that `FlatNode::mesh` indices stay aligned.
    #[must_use]
    pub fn placeholder(name: String) -> Self {
        Self {
            name,
            schema: VertexSchema::empty(),
            material_names: Vec::new(),
            uv_set_names: Vec::new(),
            submeshes: Vec::new(),
            joint_nodes: Vec::new(),
        }
    }
}

/// Reusable packed-vertex staging buffer, sized to the schema stride.
pub(crate) struct VertexScratch {
    bytes: Vec<u8>,
    cursor: usize,
}

impl VertexScratch {
    fn new(stride: u32) -> Self {
        Self {
            bytes: vec![0; stride as usize],
            cursor: 0,
        }
    }

    fn reset(&mut self) {
        self.cursor = 0;
    }

    pub(crate) fn put_f32(&mut self, value: f32) {
        self.bytes[self.cursor..self.cursor + 4].copy_from_slice(bytemuck::bytes_of(&value));
        self.cursor += 4;
    }

    pub(crate) fn put_u32(&mut self, value: u32) {
        self.bytes[self.cursor..self.cursor + 4].copy_from_slice(bytemuck::bytes_of(&value));
        self.cursor += 4;
    }

    fn put_components(&mut self, value: DVec4, arity: u8) {
        for k in 0..usize::from(arity) {
            self.put_f32(value[k] as f32);
        }
    }

    fn put_zeros(&mut self, arity: u8) {
        for _ in 0..arity {
            self.put_f32(0.0);
        }
    }

    /// The packed vertex. A full reset-to-bytes cycle must write exactly
    /// one stride.
    fn bytes(&self) -> &[u8] {
        debug_assert_eq!(self.cursor, self.bytes.len());
        &self.bytes
    }
}

/// In-flight submesh: output buffers plus the hash → vertex index map that
/// drives deduplication.
struct SubMeshBuilder {
    material_id: u32,
    vertex_data: Vec<u8>,
    indices: Vec<u32>,
    seen: FxHashMap<u64, u32>,
}

impl SubMeshBuilder {
    fn new(material_id: u32) -> Self {
        Self {
            material_id,
            vertex_data: Vec::new(),
            indices: Vec::new(),
            seen: FxHashMap::default(),
        }
    }

    /// Returns the index of an existing identical vertex or appends a new
    /// one. Dedup trusts the 64-bit content hash; collisions between
    /// bitwise-different vertices are not checked for.
    fn intern(&mut self, vertex: &[u8], stride: u32) -> u32 {
        let hash = xxh3_64(vertex);
        if let Some(&existing) = self.seen.get(&hash) {
            return existing;
        }
        let index = (self.vertex_data.len() / stride as usize) as u32;
        self.seen.insert(hash, index);
        self.vertex_data.extend_from_slice(vertex);
        index
    }

    fn finish(self) -> SubMesh {
        SubMesh {
            material_id: self.material_id,
            vertex_data: self.vertex_data,
            indices: self.indices,
        }
    }
}

/// Resolves one channel value for a polygon-vertex occurrence: mapping mode
/// picks the index, then an optional indirection maps it into the value
/// array. `None` means the channel maps to nothing and samples as zero.
fn sample_channel(
    channel: &AttributeChannel,
    control_point: usize,
    polygon: usize,
    global_vertex: usize,
) -> Result<Option<DVec4>> {
    let index = match channel.mapping {
        MappingMode::ByControlPoint => control_point,
        MappingMode::ByPolygonVertex => global_vertex,
        MappingMode::ByPolygon => polygon,
        MappingMode::None => return Ok(None),
        mode @ (MappingMode::ByEdge | MappingMode::AllSame) => {
            return Err(ExportError::UnsupportedMappingMode {
                channel: channel.name.clone(),
                mode,
            });
        }
    };

    let index = match channel.reference {
        ReferenceMode::Direct => index,
        ReferenceMode::IndexToDirect => channel
            .indices
            .get(index)
            .copied()
            .ok_or_else(|| ExportError::ChannelIndexOutOfBounds {
                channel: channel.name.clone(),
                index,
            })? as usize,
        mode @ ReferenceMode::Index => {
            return Err(ExportError::UnsupportedReferenceMode {
                channel: channel.name.clone(),
                mode,
            });
        }
    };

    channel
        .values
        .get(index)
        .map(Some)
        .ok_or_else(|| ExportError::ChannelIndexOutOfBounds {
            channel: channel.name.clone(),
            index,
        })
}

/// Converts one mesh into a [`MultiMesh`], partitioned by material.
///
/// Errors returned here are fatal for this mesh only; the caller converts
/// them into a placeholder plus a warning.
pub(crate) fn extract_mesh(
    provider: &impl SceneProvider,
    mesh: MeshId,
    index: &SceneIndex,
    warnings: &mut Vec<String>,
) -> Result<MultiMesh> {
    let name = provider.mesh_name(mesh);

    if provider.has_unsupported_channels(mesh) {
        warn(
            warnings,
            format!(
                "Mesh '{name}' carries unsupported per-vertex data \
                 (creases, holes, visibility or user data); it is ignored"
            ),
        );
    }

    let skin = SkinBinding::extract(provider, mesh, index, warnings);
    let schema = VertexSchema::derive(provider, mesh, skin.is_some())?;

    let uv_set_names: Vec<String> = (0..provider.channel_count(mesh, ChannelKind::Uv))
        .filter_map(|i| provider.channel(mesh, ChannelKind::Uv, i))
        .map(|channel| channel.name.clone())
        .collect();

    let channel_counts: Vec<(ChannelKind, usize)> = ChannelKind::ALL
        .iter()
        .map(|&kind| {
            (
                kind,
                provider.channel_count(mesh, kind).min(kind.max_instances()),
            )
        })
        .collect();

    let control_points = provider.control_points(mesh);
    let by_polygon_materials = provider.material_slot_count(mesh) > 0
        && provider.material_mapping(mesh) == MappingMode::ByPolygon;

    let mut material_names: Vec<String> = Vec::new();
    let mut material_lookup: FxHashMap<String, usize> = FxHashMap::default();
    let mut builders: Vec<SubMeshBuilder> = Vec::new();

    let mut scratch = VertexScratch::new(schema.stride);

    // Running polygon-vertex counter shared with the provider's
    // by-polygon-vertex indexing; degenerate polygons still advance it.
    let mut global_vertex: usize = 0;

    for polygon in 0..provider.polygon_count(mesh) {
        let corner_count = provider.polygon_size(mesh, polygon);
        if corner_count < 3 {
            // No surface area, nothing to emit, but the occurrence slots
            // must stay aligned.
            global_vertex += 2;
            continue;
        }

        let slot = if by_polygon_materials {
            provider.material_index(mesh, polygon)
        } else {
            0
        };
        let material = provider
            .material_name(mesh, slot)
            .unwrap_or_else(|| "default".to_string());

        let builder_index = match material_lookup.get(&material) {
            Some(&existing) => existing,
            None => {
                let allocated = builders.len();
                material_lookup.insert(material.clone(), allocated);
                material_names.push(material);
                builders.push(SubMeshBuilder::new(allocated as u32));
                allocated
            }
        };
        let builder = &mut builders[builder_index];

        // First and previous emitted index, for fanning quads and larger
        // convex polygons into triangles.
        let mut anchor = 0u32;
        let mut prev = 0u32;

        for corner in 0..corner_count {
            let control_point = provider.polygon_vertex(mesh, polygon, corner) as usize;
            let position = control_points.get(control_point).copied().ok_or_else(|| {
                ExportError::ChannelIndexOutOfBounds {
                    channel: "position".to_string(),
                    index: control_point,
                }
            })?;

            scratch.reset();
            scratch.put_f32(position.x as f32);
            scratch.put_f32(position.y as f32);
            scratch.put_f32(position.z as f32);

            if let Some(skin) = &skin {
                skin.pack_into(control_point, &mut scratch);
            }

            for &(kind, count) in &channel_counts {
                for instance in 0..count {
                    match provider.channel(mesh, kind, instance) {
                        Some(channel) => {
                            match sample_channel(channel, control_point, polygon, global_vertex)? {
                                Some(value) => scratch.put_components(value, kind.arity()),
                                None => scratch.put_zeros(kind.arity()),
                            }
                        }
                        None => scratch.put_zeros(kind.arity()),
                    }
                }
            }

            let vertex = builder.intern(scratch.bytes(), schema.stride);
            builder.indices.push(vertex);
            if corner > 2 {
                builder.indices.push(prev);
                builder.indices.push(anchor);
            }

            global_vertex += 1;
            prev = vertex;
            if corner == 0 {
                anchor = vertex;
            }
        }
    }

    Ok(MultiMesh {
        name,
        schema,
        material_names,
        uv_set_names,
        submeshes: builders.into_iter().map(SubMeshBuilder::finish).collect(),
        joint_nodes: skin.map(|s| s.joint_nodes).unwrap_or_default(),
    })
}
