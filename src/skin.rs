//! Skin weight extraction
//!
//! Reads a mesh's first skin deformer, accumulates (joint, weight) pairs per
//! control point, ranks them by weight and packs the strongest eight into
//! the fixed skin slots of the vertex layout. Joints are identified by
//! cluster ordinal inside the vertex data; the accompanying
//! [`SkinBinding::joint_nodes`] table maps those ordinals to flat node
//! indices.

use smallvec::SmallVec;

use crate::errors::warn;
use crate::layout::MAX_SKIN_INFLUENCES;
use crate::mesh::VertexScratch;
use crate::provider::{MeshId, SceneProvider};
use crate::traverse::SceneIndex;

/// Per-control-point influence list. Weights are almost always at or under
/// the packing budget, so the pairs live inline.
type InfluenceList = SmallVec<[(u32, f64); MAX_SKIN_INFLUENCES]>;

/// Ranked skin weights for one mesh, consumed during vertex sampling and
/// discarded afterwards.
#[derive(Debug, Clone)]
pub struct SkinBinding {
    /// Per control point, (cluster ordinal, weight) sorted descending by
    /// weight.
    influences: Vec<InfluenceList>,
    /// Cluster ordinal → flat node index of the linked joint.
    pub joint_nodes: Vec<u32>,
}

impl SkinBinding {
    /// Extracts the first skin deformer of `mesh`, or `None` when the mesh
    /// is not skinned. Additional deformers are ignored with a warning.
    ///
    /// Control-point indices beyond the mesh's current control-point count
    /// are skipped (the mesh may have been edited after skinning), as are
    /// zero-weight entries.
    pub fn extract(
        provider: &impl SceneProvider,
        mesh: MeshId,
        index: &SceneIndex,
        warnings: &mut Vec<String>,
    ) -> Option<Self> {
        let skin_count = provider.skin_count(mesh);
        if skin_count == 0 {
            return None;
        }
        if skin_count > 1 {
            warn(
                warnings,
                format!(
                    "Mesh '{}' has {skin_count} skin deformers; only the first is exported",
                    provider.mesh_name(mesh)
                ),
            );
        }

        let control_point_count = provider.control_points(mesh).len();
        let mut influences = vec![InfluenceList::new(); control_point_count];
        let mut joint_nodes = Vec::new();

        for cluster in 0..provider.cluster_count(mesh, 0) {
            let link = provider.cluster_link(mesh, 0, cluster);
            let joint_node = match index.flat_index_of(link) {
                Some(flat) => flat,
                None => {
                    warn(
                        warnings,
                        format!(
                            "Mesh '{}' cluster {cluster} links a node outside the scene \
                             hierarchy; joint mapped to the root",
                            provider.mesh_name(mesh)
                        ),
                    );
                    0
                }
            };
            joint_nodes.push(joint_node);

            let (points, weights) = provider.cluster_influences(mesh, 0, cluster);
            for (&point, &weight) in points.iter().zip(weights) {
                if point as usize >= control_point_count {
                    continue;
                }
                if weight == 0.0 {
                    continue;
                }
                // A cluster listing the same point twice keeps the last
                // weight, one slot per joint.
                let list = &mut influences[point as usize];
                match list.iter_mut().find(|(joint, _)| *joint == cluster as u32) {
                    Some(entry) => entry.1 = weight,
                    None => list.push((cluster as u32, weight)),
                }
            }
        }

        for pairs in &mut influences {
            pairs.sort_by(|a, b| b.1.total_cmp(&a.1));
        }

        Some(Self {
            influences,
            joint_nodes,
        })
    }

    /// Packs the top 8 influences of one control point into the scratch
    /// vertex: joint ordinals as two 4-element u32 groups, then weights as
    /// two 4-element f32 groups. Absent slots are (0, 0.0) and influences
    /// past the 8th strongest are dropped.
    pub(crate) fn pack_into(&self, control_point: usize, scratch: &mut VertexScratch) {
        let pairs = &self.influences[control_point];
        for slot in 0..MAX_SKIN_INFLUENCES {
            scratch.put_u32(pairs.get(slot).map_or(0, |&(joint, _)| joint));
        }
        for slot in 0..MAX_SKIN_INFLUENCES {
            scratch.put_f32(pairs.get(slot).map_or(0.0, |&(_, weight)| weight as f32));
        }
    }
}
