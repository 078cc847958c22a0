//! In-memory scene adapter
//!
//! A [`SceneProvider`] backed by plain vectors, used by the test suite and
//! handy as a template for real file-format adapters. Scenes are assembled
//! imperatively: add nodes under parents, attach meshes, register takes
//! with keyframe curves.

use glam::DVec3;
use rustc_hash::FxHashMap;

use crate::provider::{
    AttributeChannel, ChannelKind, MappingMode, MeshId, NodeId, ProviderStatus, SceneProvider,
    TakeId, TransformInheritance, TransformProperty,
};
use crate::rotation::RotationOrder;

/// Piecewise-linear vector keyframe curve. Times must be ascending.
#[derive(Debug, Clone, Default)]
pub struct Curve {
    times: Vec<f64>,
    values: Vec<DVec3>,
}

impl Curve {
    /// Builds a curve from matching time/value arrays.
    ///
    /// # Panics
    ///
    /// Panics if the arrays differ in length.
    #[must_use]
    pub fn new(times: Vec<f64>, values: Vec<DVec3>) -> Self {
        assert_eq!(times.len(), values.len(), "keyframe arrays must match");
        Self { times, values }
    }

    /// Samples the curve at `time`, clamping outside the keyed range and
    /// interpolating linearly between keys.
    #[must_use]
    pub fn sample(&self, time: f64) -> DVec3 {
        if self.times.is_empty() {
            return DVec3::ZERO;
        }
        let after = self.times.partition_point(|&t| t <= time);
        if after == 0 {
            return self.values[0];
        }
        if after == self.times.len() {
            return self.values[self.times.len() - 1];
        }
        let (t0, t1) = (self.times[after - 1], self.times[after]);
        let span = t1 - t0;
        if span <= 0.0 {
            return self.values[after - 1];
        }
        let alpha = (time - t0) / span;
        self.values[after - 1].lerp(self.values[after], alpha)
    }
}

/// One keyframed take: an optional authored span plus per-node, per-property
/// curves.
#[derive(Debug, Clone)]
pub struct MemoryTake {
    pub name: String,
    /// Authored span in seconds. `None` falls back to the scene default.
    pub span: Option<(f64, f64)>,
    curves: FxHashMap<(NodeId, TransformProperty), Curve>,
}

impl MemoryTake {
    #[must_use]
    pub fn new(name: &str, span: Option<(f64, f64)>) -> Self {
        Self {
            name: name.to_string(),
            span,
            curves: FxHashMap::default(),
        }
    }

    /// Keys `property` of `node` with a linear curve.
    pub fn set_curve(
        &mut self,
        node: NodeId,
        property: TransformProperty,
        times: Vec<f64>,
        values: Vec<DVec3>,
    ) {
        self.curves.insert((node, property), Curve::new(times, values));
    }
}

/// One joint cluster of a skin deformer.
#[derive(Debug, Clone)]
pub struct MemoryCluster {
    /// Node the cluster deforms with.
    pub link: NodeId,
    pub control_points: Vec<u32>,
    pub weights: Vec<f64>,
}

/// Mesh storage for [`MemoryScene`]. Fields are public so tests can author
/// exactly the channel layouts they need.
#[derive(Debug, Clone)]
pub struct MemoryMesh {
    pub name: String,
    pub control_points: Vec<DVec3>,
    /// Control-point indices per polygon, any size.
    pub polygons: Vec<Vec<u32>>,
    pub normals: Vec<AttributeChannel>,
    pub tangents: Vec<AttributeChannel>,
    pub binormals: Vec<AttributeChannel>,
    pub uvs: Vec<AttributeChannel>,
    pub colors: Vec<AttributeChannel>,
    pub material_names: Vec<String>,
    pub material_mapping: MappingMode,
    /// Material slot per polygon, read under by-polygon mapping.
    pub polygon_materials: Vec<u32>,
    /// Skin deformers, each a list of clusters.
    pub skins: Vec<Vec<MemoryCluster>>,
    pub unsupported_channels: bool,
}

impl MemoryMesh {
    #[must_use]
    pub fn new(name: &str, control_points: Vec<DVec3>, polygons: Vec<Vec<u32>>) -> Self {
        Self {
            name: name.to_string(),
            control_points,
            polygons,
            normals: Vec::new(),
            tangents: Vec::new(),
            binormals: Vec::new(),
            uvs: Vec::new(),
            colors: Vec::new(),
            material_names: Vec::new(),
            material_mapping: MappingMode::None,
            polygon_materials: Vec::new(),
            skins: Vec::new(),
            unsupported_channels: false,
        }
    }

    fn channels(&self, kind: ChannelKind) -> &[AttributeChannel] {
        match kind {
            ChannelKind::Normal => &self.normals,
            ChannelKind::Tangent => &self.tangents,
            ChannelKind::Binormal => &self.binormals,
            ChannelKind::Uv => &self.uvs,
            ChannelKind::Color => &self.colors,
        }
    }
}

#[derive(Debug, Clone)]
struct MemoryNode {
    name: String,
    children: Vec<NodeId>,
    translation: DVec3,
    rotation: DVec3,
    scaling: DVec3,
    rotation_order: RotationOrder,
    pre_rotation: DVec3,
    post_rotation: DVec3,
    inheritance: TransformInheritance,
    mesh: Option<MeshId>,
}

impl MemoryNode {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            children: Vec::new(),
            translation: DVec3::ZERO,
            rotation: DVec3::ZERO,
            scaling: DVec3::ONE,
            rotation_order: RotationOrder::Xyz,
            pre_rotation: DVec3::ZERO,
            post_rotation: DVec3::ZERO,
            inheritance: TransformInheritance::RSrs,
            mesh: None,
        }
    }
}

/// Vector-backed scene graph. Node 0 is always the root.
#[derive(Debug, Clone)]
pub struct MemoryScene {
    nodes: Vec<MemoryNode>,
    meshes: Vec<MemoryMesh>,
    takes: Vec<MemoryTake>,
    active_take: Option<TakeId>,
    default_span: (f64, f64),
    failure: Option<String>,
}

impl Default for MemoryScene {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryScene {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![MemoryNode::new("RootNode")],
            meshes: Vec::new(),
            takes: Vec::new(),
            active_take: None,
            default_span: (0.0, 0.0),
            failure: None,
        }
    }

    /// The root node's id, without going through the trait.
    #[must_use]
    pub fn root_id(&self) -> NodeId {
        0
    }

    /// Adds a node under `parent` and returns its id.
    ///
    /// # Panics
    ///
    /// Panics if `parent` does not exist.
    pub fn add_node(&mut self, parent: NodeId, name: &str) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(MemoryNode::new(name));
        self.nodes[parent].children.push(id);
        id
    }

    pub fn set_translation(&mut self, node: NodeId, value: DVec3) {
        self.nodes[node].translation = value;
    }

    pub fn set_rotation(&mut self, node: NodeId, value: DVec3) {
        self.nodes[node].rotation = value;
    }

    pub fn set_scaling(&mut self, node: NodeId, value: DVec3) {
        self.nodes[node].scaling = value;
    }

    pub fn set_rotation_order(&mut self, node: NodeId, order: RotationOrder) {
        self.nodes[node].rotation_order = order;
    }

    pub fn set_pre_rotation(&mut self, node: NodeId, value: DVec3) {
        self.nodes[node].pre_rotation = value;
    }

    pub fn set_post_rotation(&mut self, node: NodeId, value: DVec3) {
        self.nodes[node].post_rotation = value;
    }

    pub fn set_inheritance(&mut self, node: NodeId, mode: TransformInheritance) {
        self.nodes[node].inheritance = mode;
    }

    /// Attaches a mesh to `node` and returns its id.
    pub fn attach_mesh(&mut self, node: NodeId, mesh: MemoryMesh) -> MeshId {
        let id = self.meshes.len();
        self.meshes.push(mesh);
        self.nodes[node].mesh = Some(id);
        id
    }

    pub fn add_take(&mut self, take: MemoryTake) -> TakeId {
        let id = self.takes.len();
        self.takes.push(take);
        id
    }

    pub fn set_default_span(&mut self, start: f64, stop: f64) {
        self.default_span = (start, stop);
    }

    /// Marks the scene as failed; every subsequent extraction errors out.
    pub fn fail(&mut self, reason: &str) {
        self.failure = Some(reason.to_string());
    }

    fn active_curves(&self) -> Option<&FxHashMap<(NodeId, TransformProperty), Curve>> {
        self.active_take.map(|take| &self.takes[take].curves)
    }
}

impl SceneProvider for MemoryScene {
    fn status(&self) -> ProviderStatus {
        match &self.failure {
            Some(reason) => ProviderStatus::Failed(reason.clone()),
            None => ProviderStatus::Ready,
        }
    }

    fn root(&self) -> NodeId {
        0
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.nodes[node].children.clone()
    }

    fn node_name(&self, node: NodeId) -> String {
        self.nodes[node].name.clone()
    }

    fn local_translation(&self, node: NodeId) -> DVec3 {
        self.nodes[node].translation
    }

    fn local_rotation(&self, node: NodeId) -> DVec3 {
        self.nodes[node].rotation
    }

    fn local_scaling(&self, node: NodeId) -> DVec3 {
        self.nodes[node].scaling
    }

    fn rotation_order(&self, node: NodeId) -> RotationOrder {
        self.nodes[node].rotation_order
    }

    fn pre_rotation(&self, node: NodeId) -> DVec3 {
        self.nodes[node].pre_rotation
    }

    fn post_rotation(&self, node: NodeId) -> DVec3 {
        self.nodes[node].post_rotation
    }

    fn inheritance(&self, node: NodeId) -> TransformInheritance {
        self.nodes[node].inheritance
    }

    fn mesh_of(&self, node: NodeId) -> Option<MeshId> {
        self.nodes[node].mesh
    }

    fn mesh_name(&self, mesh: MeshId) -> String {
        self.meshes[mesh].name.clone()
    }

    fn polygon_count(&self, mesh: MeshId) -> usize {
        self.meshes[mesh].polygons.len()
    }

    fn polygon_size(&self, mesh: MeshId, polygon: usize) -> usize {
        self.meshes[mesh].polygons[polygon].len()
    }

    fn polygon_vertex(&self, mesh: MeshId, polygon: usize, corner: usize) -> u32 {
        self.meshes[mesh].polygons[polygon][corner]
    }

    fn control_points(&self, mesh: MeshId) -> &[DVec3] {
        &self.meshes[mesh].control_points
    }

    fn channel_count(&self, mesh: MeshId, kind: ChannelKind) -> usize {
        self.meshes[mesh].channels(kind).len()
    }

    fn channel(
        &self,
        mesh: MeshId,
        kind: ChannelKind,
        instance: usize,
    ) -> Option<&AttributeChannel> {
        self.meshes[mesh].channels(kind).get(instance)
    }

    fn has_unsupported_channels(&self, mesh: MeshId) -> bool {
        self.meshes[mesh].unsupported_channels
    }

    fn material_slot_count(&self, mesh: MeshId) -> usize {
        self.meshes[mesh].material_names.len()
    }

    fn material_mapping(&self, mesh: MeshId) -> MappingMode {
        self.meshes[mesh].material_mapping
    }

    fn material_index(&self, mesh: MeshId, polygon: usize) -> u32 {
        self.meshes[mesh]
            .polygon_materials
            .get(polygon)
            .copied()
            .unwrap_or(0)
    }

    fn material_name(&self, mesh: MeshId, slot: u32) -> Option<String> {
        self.meshes[mesh].material_names.get(slot as usize).cloned()
    }

    fn skin_count(&self, mesh: MeshId) -> usize {
        self.meshes[mesh].skins.len()
    }

    fn cluster_count(&self, mesh: MeshId, skin: usize) -> usize {
        self.meshes[mesh].skins[skin].len()
    }

    fn cluster_link(&self, mesh: MeshId, skin: usize, cluster: usize) -> NodeId {
        self.meshes[mesh].skins[skin][cluster].link
    }

    fn cluster_influences(&self, mesh: MeshId, skin: usize, cluster: usize) -> (&[u32], &[f64]) {
        let cluster = &self.meshes[mesh].skins[skin][cluster];
        (&cluster.control_points, &cluster.weights)
    }

    fn take_count(&self) -> usize {
        self.takes.len()
    }

    fn take_name(&self, take: TakeId) -> String {
        self.takes[take].name.clone()
    }

    fn take_local_span(&self, take: TakeId) -> Option<(f64, f64)> {
        self.takes[take].span
    }

    fn default_span(&self) -> (f64, f64) {
        self.default_span
    }

    fn select_take(&mut self, take: TakeId, _sample_period: f64) {
        self.active_take = Some(take);
    }

    fn property_animated(&self, node: NodeId, property: TransformProperty) -> bool {
        self.active_curves()
            .is_some_and(|curves| curves.contains_key(&(node, property)))
    }

    fn evaluate_local(&self, node: NodeId, property: TransformProperty, time: f64) -> DVec3 {
        if let Some(curve) = self.active_curves().and_then(|c| c.get(&(node, property))) {
            return curve.sample(time);
        }
        // Rest pose when the property carries no curve on the active take.
        match property {
            TransformProperty::Translation => self.nodes[node].translation,
            TransformProperty::Rotation => self.nodes[node].rotation,
            TransformProperty::Scaling => self.nodes[node].scaling,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_clamps_and_interpolates() {
        let curve = Curve::new(
            vec![0.0, 1.0],
            vec![DVec3::ZERO, DVec3::new(2.0, 4.0, 6.0)],
        );
        assert_eq!(curve.sample(-1.0), DVec3::ZERO);
        assert_eq!(curve.sample(0.5), DVec3::new(1.0, 2.0, 3.0));
        assert_eq!(curve.sample(9.0), DVec3::new(2.0, 4.0, 6.0));
    }

    #[test]
    fn empty_curve_samples_zero() {
        assert_eq!(Curve::default().sample(0.5), DVec3::ZERO);
    }
}
