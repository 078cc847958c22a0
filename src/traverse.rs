//! Scene traversal
//!
//! Walks the provider's node tree breadth-first exactly once, assigning
//! every node a stable 0-based index and recording its parent's index. This
//! index space is the shared addressing scheme for the whole export: mesh
//! slots on nodes, joint tables on skinned meshes and animation channel
//! targets all point into it.

use glam::DVec3;
use rustc_hash::FxHashMap;

use crate::errors::warn;
use crate::provider::{NodeId, SceneProvider, TransformInheritance};
use crate::rotation::{self, RotationOrder};

/// Breadth-first linearization of the node tree.
///
/// Breadth-first order guarantees every node appears after its parent, so
/// `parents[i] < i` for every non-root entry and the root carries `-1`.
/// Cycles are not guarded against; providers hand over finite trees.
#[derive(Debug, Clone)]
pub struct SceneIndex {
    /// Provider node handles in traversal order.
    pub order: Vec<NodeId>,
    /// Parent's flat index per node, `-1` for the root.
    pub parents: Vec<i32>,
    lookup: FxHashMap<NodeId, u32>,
}

impl SceneIndex {
    /// Walks the tree once. Nodes with a transform-inheritance mode other
    /// than scale-compensated `RSrs` are still flattened but produce a
    /// warning, since the simple child × parent matrix chain may be wrong
    /// for them downstream.
    pub fn build(provider: &impl SceneProvider, warnings: &mut Vec<String>) -> Self {
        let mut order = vec![provider.root()];
        let mut parents = vec![-1];

        let mut cursor = 0;
        while cursor < order.len() {
            let node = order[cursor];
            if provider.inheritance(node) != TransformInheritance::RSrs {
                warn(
                    warnings,
                    format!(
                        "Node '{}' uses an unsupported transform inheritance mode; \
                         only scale-compensated RSrs flattens to child * parent",
                        provider.node_name(node)
                    ),
                );
            }
            for child in provider.children(node) {
                order.push(child);
                parents.push(cursor as i32);
            }
            cursor += 1;
        }

        let lookup = order
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, i as u32))
            .collect();

        Self {
            order,
            parents,
            lookup,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Flat index of a provider node, if it was reachable from the root.
    #[must_use]
    pub fn flat_index_of(&self, node: NodeId) -> Option<u32> {
        self.lookup.get(&node).copied()
    }
}

/// One flattened node: name, local pose and its place in the index space.
///
/// `rotation` is the XYZ-order Euler triple (degrees) of
/// `pre * Euler(order, local) * post`. The authored pre/post rotation
/// offsets are folded in at extraction so runtimes never reapply them.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatNode {
    pub name: String,
    pub translation: DVec3,
    /// XYZ-order Euler degrees with pre/post offsets folded in.
    pub rotation: DVec3,
    pub scale: DVec3,
    /// The order the node declared for its authoring-time rotation.
    pub rotation_order: RotationOrder,
    /// Parent's index in the flat array, `-1` for the root.
    pub parent: i32,
    /// Index into the `extract_meshes` output, `-1` when the node carries
    /// no mesh. Assigned consecutively in traversal order.
    pub mesh: i32,
}

/// Converts every traversed node into a [`FlatNode`].
pub(crate) fn flatten_nodes(provider: &impl SceneProvider, index: &SceneIndex) -> Vec<FlatNode> {
    let mut nodes = Vec::with_capacity(index.len());
    let mut mesh_counter = 0;

    for (flat, &node) in index.order.iter().enumerate() {
        let order = provider.rotation_order(node);
        let pre = rotation::matrix_from_euler(order, provider.pre_rotation(node));
        let post = rotation::matrix_from_euler(order, provider.post_rotation(node));
        let rotation = rotation::compose(&pre, order, provider.local_rotation(node), &post);

        let mesh = if provider.mesh_of(node).is_some() {
            let slot = mesh_counter;
            mesh_counter += 1;
            slot
        } else {
            -1
        };

        nodes.push(FlatNode {
            name: provider.node_name(node),
            translation: provider.local_translation(node),
            rotation,
            scale: provider.local_scaling(node),
            rotation_order: order,
            parent: index.parents[flat],
            mesh,
        });
    }

    nodes
}
