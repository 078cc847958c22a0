#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! Scene-graph flattening and export pipeline.
//!
//! Takes an authored 3D scene behind a [`SceneProvider`] and turns it into
//! flat, GPU-friendly data: a breadth-first node list, deduplicated
//! per-material vertex/index buffers with a self-describing vertex schema,
//! and fixed-rate baked animation takes.

pub mod bake;
pub mod errors;
pub mod export;
pub mod layout;
pub mod mesh;
pub mod provider;
pub mod rotation;
pub mod skin;
pub mod traverse;

pub use bake::{AnimationChannel, ChannelTarget, Take};
pub use errors::{ExportError, Result};
pub use export::{Extraction, extract_meshes, extract_nodes, extract_takes};
pub use layout::{
    ElementType, MAX_CHANNEL_INSTANCES, MAX_SKIN_INFLUENCES, Semantic, VertexAttribute,
    VertexSchema,
};
pub use mesh::{MultiMesh, SubMesh};
pub use provider::{
    AttributeChannel, ChannelKind, ChannelValues, MappingMode, MeshId, NodeId, ProviderStatus,
    ReferenceMode, SceneProvider, TakeId, TransformInheritance, TransformProperty,
};
pub use rotation::RotationOrder;
pub use traverse::{FlatNode, SceneIndex};
