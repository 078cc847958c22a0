//! Scene Provider interface
//!
//! The pipeline never touches an authored scene file directly. Everything it
//! needs (hierarchy walks, mesh channel queries, skin clusters, animation
//! evaluation) goes through the [`SceneProvider`] capability trait, with one
//! concrete adapter bound per scene-graph backend. [`memory::MemoryScene`]
//! is the reference adapter and the one the test suite runs against.
//!
//! The provider hands the pipeline *already normalized* content: triangulated
//! or at least convex polygons, axis/unit-converted transforms. Opening and
//! repairing files is the adapter's problem, not this crate's.

pub mod memory;

use glam::{DVec2, DVec3, DVec4};

use crate::rotation::RotationOrder;

/// Provider-side node handle. Only meaningful to the provider that issued it.
pub type NodeId = usize;
/// Provider-side mesh handle.
pub type MeshId = usize;
/// Provider-side animation take handle.
pub type TakeId = usize;

/// Health of a provider handle, checked before any extraction starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderStatus {
    /// The provider can answer queries.
    Ready,
    /// The provider failed earlier (import error, dead handle). Every
    /// extract call against it returns [`crate::ExportError::ProviderFailed`].
    Failed(String),
}

/// How a stored attribute value is picked for a polygon-vertex occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingMode {
    /// No data; sampling yields a zero value.
    None,
    /// One value per control point, shared by every occurrence of it.
    ByControlPoint,
    /// One value per polygon-vertex occurrence (seams, hard edges).
    ByPolygonVertex,
    /// One value per face.
    ByPolygon,
    /// Authored but unsupported; fatal for the mesh that carries it.
    ByEdge,
    /// Authored but unsupported; fatal for the mesh that carries it.
    AllSame,
}

/// Whether the mapping-mode-derived index addresses the value array directly
/// or goes through a secondary index array first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceMode {
    /// Index addresses the value array.
    Direct,
    /// Index addresses [`AttributeChannel::indices`], which addresses values.
    IndexToDirect,
    /// Authored but unsupported; fatal for the mesh that carries it.
    Index,
}

/// The five repeated per-vertex semantics a mesh can author, in the fixed
/// order they appear in a derived vertex schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelKind {
    Normal,
    Tangent,
    Binormal,
    Uv,
    Color,
}

impl ChannelKind {
    /// Schema emission order.
    pub const ALL: [Self; 5] = [
        Self::Normal,
        Self::Tangent,
        Self::Binormal,
        Self::Uv,
        Self::Color,
    ];

    /// Element count one packed value of this kind occupies.
    #[must_use]
    pub fn arity(self) -> u8 {
        match self {
            Self::Normal | Self::Tangent | Self::Binormal => 3,
            Self::Uv => 2,
            Self::Color => 4,
        }
    }

    /// How many authored channel instances the schema will accept. Colors
    /// are only bounded by the instance numbering budget.
    #[must_use]
    pub fn max_instances(self) -> usize {
        match self {
            Self::Color => usize::from(u8::MAX),
            _ => crate::layout::MAX_CHANNEL_INSTANCES,
        }
    }
}

/// Typed value storage of one attribute channel.
#[derive(Debug, Clone)]
pub enum ChannelValues {
    Vec2(Vec<DVec2>),
    Vec3(Vec<DVec3>),
    Vec4(Vec<DVec4>),
}

impl ChannelValues {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Vec2(v) => v.len(),
            Self::Vec3(v) => v.len(),
            Self::Vec4(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value at `index`, widened to four components with zero padding.
    /// The schema decides how many of them are actually packed.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<DVec4> {
        match self {
            Self::Vec2(v) => v.get(index).map(|p| DVec4::new(p.x, p.y, 0.0, 0.0)),
            Self::Vec3(v) => v.get(index).map(|p| DVec4::new(p.x, p.y, p.z, 0.0)),
            Self::Vec4(v) => v.get(index).copied(),
        }
    }
}

/// One authored attribute channel: mapping rule, optional indirection and
/// the value array itself.
#[derive(Debug, Clone)]
pub struct AttributeChannel {
    /// Channel name; UV set names are exported from this.
    pub name: String,
    pub mapping: MappingMode,
    pub reference: ReferenceMode,
    /// Secondary index array, consulted when `reference` is
    /// [`ReferenceMode::IndexToDirect`].
    pub indices: Vec<u32>,
    pub values: ChannelValues,
}

impl AttributeChannel {
    /// A directly-mapped channel with no indirection.
    #[must_use]
    pub fn direct(name: &str, mapping: MappingMode, values: ChannelValues) -> Self {
        Self {
            name: name.to_string(),
            mapping,
            reference: ReferenceMode::Direct,
            indices: Vec::new(),
            values,
        }
    }
}

/// The three independently-animatable transform properties of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransformProperty {
    Translation,
    Rotation,
    Scaling,
}

/// Transform inheritance modes a node can declare. Only the
/// scale-compensated `RSrs` mode flattens to a plain child × parent matrix
/// chain; anything else is surfaced as a warning during traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformInheritance {
    RrSs,
    RSrs,
    Rrs,
}

/// Read-only capability set the pipeline consumes. The single mutating
/// operation is [`SceneProvider::select_take`], which changes which
/// animation stack subsequent [`SceneProvider::evaluate_local`] calls see.
/// That is why take extraction needs `&mut` while node and mesh extraction
/// do not.
pub trait SceneProvider {
    /// Health check performed before any extraction.
    fn status(&self) -> ProviderStatus {
        ProviderStatus::Ready
    }

    // ------------------------------------------------------------------
    // Hierarchy
    // ------------------------------------------------------------------
    fn root(&self) -> NodeId;
    fn children(&self, node: NodeId) -> Vec<NodeId>;
    fn node_name(&self, node: NodeId) -> String;
    /// Local translation, axis/unit normalized by the provider.
    fn local_translation(&self, node: NodeId) -> DVec3;
    /// Local rotation as Euler degrees in the node's declared order.
    fn local_rotation(&self, node: NodeId) -> DVec3;
    fn local_scaling(&self, node: NodeId) -> DVec3;
    fn rotation_order(&self, node: NodeId) -> RotationOrder;
    /// Rotation offset applied before the local rotation, Euler degrees.
    fn pre_rotation(&self, node: NodeId) -> DVec3;
    /// Rotation offset applied after the local rotation, Euler degrees.
    fn post_rotation(&self, node: NodeId) -> DVec3;
    fn inheritance(&self, node: NodeId) -> TransformInheritance;
    /// The mesh attached to this node, if any.
    fn mesh_of(&self, node: NodeId) -> Option<MeshId>;

    // ------------------------------------------------------------------
    // Mesh geometry
    // ------------------------------------------------------------------
    fn mesh_name(&self, mesh: MeshId) -> String;
    fn polygon_count(&self, mesh: MeshId) -> usize;
    fn polygon_size(&self, mesh: MeshId, polygon: usize) -> usize;
    /// Control-point index of one polygon corner.
    fn polygon_vertex(&self, mesh: MeshId, polygon: usize, corner: usize) -> u32;
    fn control_points(&self, mesh: MeshId) -> &[DVec3];

    // ------------------------------------------------------------------
    // Attribute channels
    // ------------------------------------------------------------------
    fn channel_count(&self, mesh: MeshId, kind: ChannelKind) -> usize;
    fn channel(&self, mesh: MeshId, kind: ChannelKind, instance: usize)
    -> Option<&AttributeChannel>;
    /// True when the mesh carries per-vertex data the pipeline ignores
    /// (creases, holes, visibility, user data). Surfaced as a warning.
    fn has_unsupported_channels(&self, _mesh: MeshId) -> bool {
        false
    }

    // ------------------------------------------------------------------
    // Materials
    // ------------------------------------------------------------------
    fn material_slot_count(&self, mesh: MeshId) -> usize;
    /// Mapping mode of the material assignment; anything other than
    /// [`MappingMode::ByPolygon`] falls back to slot 0 for every face.
    fn material_mapping(&self, mesh: MeshId) -> MappingMode;
    /// Material slot assigned to a polygon (valid under by-polygon mapping).
    fn material_index(&self, mesh: MeshId, polygon: usize) -> u32;
    fn material_name(&self, mesh: MeshId, slot: u32) -> Option<String>;

    // ------------------------------------------------------------------
    // Skinning
    // ------------------------------------------------------------------
    /// Number of skin deformers on the mesh. Only the first is used.
    fn skin_count(&self, mesh: MeshId) -> usize;
    fn cluster_count(&self, mesh: MeshId, skin: usize) -> usize;
    /// The joint node a cluster is linked to.
    fn cluster_link(&self, mesh: MeshId, skin: usize, cluster: usize) -> NodeId;
    /// Influenced control-point indices and their weights, same length.
    fn cluster_influences(&self, mesh: MeshId, skin: usize, cluster: usize) -> (&[u32], &[f64]);

    // ------------------------------------------------------------------
    // Animation
    // ------------------------------------------------------------------
    fn take_count(&self) -> usize;
    fn take_name(&self, take: TakeId) -> String;
    /// Time span authored on the take itself, seconds. `None` falls back to
    /// the scene's default timeline span.
    fn take_local_span(&self, take: TakeId) -> Option<(f64, f64)>;
    /// The scene's default timeline span, seconds.
    fn default_span(&self) -> (f64, f64);
    /// Makes `take` the one [`Self::evaluate_local`] evaluates, collapsing
    /// its animation layers down to a single track at `sample_period`
    /// seconds. Layer blending is the provider's job, not the pipeline's.
    fn select_take(&mut self, take: TakeId, sample_period: f64);
    /// Whether `property` is animated on the currently selected take.
    fn property_animated(&self, node: NodeId, property: TransformProperty) -> bool;
    /// Evaluates `property` on the currently selected take at `time`
    /// seconds. Rotation values are Euler degrees in the node's order.
    fn evaluate_local(&self, node: NodeId, property: TransformProperty, time: f64) -> DVec3;
}
