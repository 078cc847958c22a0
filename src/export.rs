//! Top-level export operations
//!
//! Three passes over a provider-backed scene, each independent: node
//! flattening, mesh extraction and animation baking. All three share the
//! same outcome shape, a value plus accumulated warnings, and the same
//! fatal-call conditions (provider failure, invalid arguments). A mesh
//! whose extraction fails is replaced by a placeholder so that node mesh
//! indices stay valid.

use crate::bake::{self, Take};
use crate::errors::{ExportError, Result, warn};
use crate::mesh::{self, MultiMesh};
use crate::provider::{ProviderStatus, SceneProvider};
use crate::traverse::{FlatNode, SceneIndex, flatten_nodes};

/// Result of one export operation: the extracted value and every warning
/// accumulated while producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction<T> {
    pub value: T,
    pub warnings: Vec<String>,
}

fn ensure_ready(provider: &impl SceneProvider) -> Result<()> {
    match provider.status() {
        ProviderStatus::Ready => Ok(()),
        ProviderStatus::Failed(reason) => Err(ExportError::ProviderFailed(reason)),
    }
}

/// Flattens the scene graph into breadth-first order.
///
/// Every node appears after its parent; `parent` and `mesh` fields index
/// into the returned list and the [`extract_meshes`] output respectively.
///
/// # Errors
///
/// Fails if the provider reports itself failed.
pub fn extract_nodes(provider: &impl SceneProvider) -> Result<Extraction<Vec<FlatNode>>> {
    ensure_ready(provider)?;

    let mut warnings = Vec::new();
    let index = SceneIndex::build(provider, &mut warnings);
    let nodes = flatten_nodes(provider, &index);

    Ok(Extraction {
        value: nodes,
        warnings,
    })
}

/// Extracts every mesh attached to a scene node, in traversal order.
///
/// The returned list lines up with the `mesh` indices produced by
/// [`extract_nodes`]: the node whose `mesh` field is `k` owns element `k`
/// here. A mesh that cannot be extracted contributes an empty placeholder
/// and a warning instead of failing the whole call.
///
/// # Errors
///
/// Fails if the provider reports itself failed.
pub fn extract_meshes(provider: &impl SceneProvider) -> Result<Extraction<Vec<MultiMesh>>> {
    ensure_ready(provider)?;

    let mut warnings = Vec::new();
    let index = SceneIndex::build(provider, &mut warnings);

    let mut meshes = Vec::new();
    for &node in &index.order {
        let Some(mesh) = provider.mesh_of(node) else {
            continue;
        };
        match mesh::extract_mesh(provider, mesh, &index, &mut warnings) {
            Ok(extracted) => meshes.push(extracted),
            Err(err) => {
                let name = provider.mesh_name(mesh);
                warn(
                    &mut warnings,
                    format!("Mesh '{name}' could not be extracted and was skipped: {err}"),
                );
                meshes.push(MultiMesh::placeholder(name));
            }
        }
    }

    Ok(Extraction {
        value: meshes,
        warnings,
    })
}

/// Bakes every animation take at `sample_rate` frames per second.
///
/// # Errors
///
/// Fails if the provider reports itself failed, or if `sample_rate` is not
/// a finite positive number.
pub fn extract_takes<P: SceneProvider>(
    provider: &mut P,
    sample_rate: f64,
) -> Result<Extraction<Vec<Take>>> {
    ensure_ready(&*provider)?;
    if !sample_rate.is_finite() || sample_rate <= 0.0 {
        return Err(ExportError::InvalidArgument(format!(
            "sample rate must be a finite positive number, got {sample_rate}"
        )));
    }

    let mut warnings = Vec::new();
    let index = SceneIndex::build(&*provider, &mut warnings);
    let takes = bake::bake_takes(provider, &index, sample_rate, &mut warnings);

    Ok(Extraction {
        value: takes,
        warnings,
    })
}
