//! Scene Traversal Tests
//!
//! Tests for:
//! - Breadth-first flattening order and parent indices
//! - Mesh slot assignment in traversal order
//! - Pre/post rotation folding into the exported pose
//! - Transform-inheritance warnings
//! - Failed-provider short-circuiting across all extract calls

use glam::{DMat3, DVec3};

use scenebake::provider::memory::{MemoryMesh, MemoryScene};
use scenebake::{ExportError, RotationOrder, TransformInheritance, extract_meshes, extract_nodes, extract_takes};

const EPSILON: f64 = 1e-9;

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn approx(a: DVec3, b: DVec3) -> bool {
    (a - b).length() < EPSILON
}

fn mat_approx(a: &DMat3, b: &DMat3) -> bool {
    (a.x_axis - b.x_axis).length() < EPSILON
        && (a.y_axis - b.y_axis).length() < EPSILON
        && (a.z_axis - b.z_axis).length() < EPSILON
}

/// Z applied first, then X, then Y (column-vector convention).
fn zxy_matrix(degrees: DVec3) -> DMat3 {
    DMat3::from_rotation_y(degrees.y.to_radians())
        * DMat3::from_rotation_x(degrees.x.to_radians())
        * DMat3::from_rotation_z(degrees.z.to_radians())
}

fn xyz_matrix(degrees: DVec3) -> DMat3 {
    DMat3::from_rotation_z(degrees.z.to_radians())
        * DMat3::from_rotation_y(degrees.y.to_radians())
        * DMat3::from_rotation_x(degrees.x.to_radians())
}

fn triangle() -> MemoryMesh {
    MemoryMesh::new(
        "tri",
        vec![DVec3::ZERO, DVec3::X, DVec3::Y],
        vec![vec![0, 1, 2]],
    )
}

// ============================================================================
// Breadth-First Order
// ============================================================================

#[test]
fn nodes_come_out_breadth_first() {
    let mut scene = MemoryScene::new();
    let root = scene.root_id();
    let a = scene.add_node(root, "a");
    let b = scene.add_node(root, "b");
    scene.add_node(a, "a_child");
    scene.add_node(b, "b_child");

    let nodes = extract_nodes(&scene).unwrap().value;
    let names: Vec<&str> = nodes.iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, ["RootNode", "a", "b", "a_child", "b_child"]);
}

#[test]
fn every_parent_index_precedes_its_node() {
    let mut scene = MemoryScene::new();
    let root = scene.root_id();
    let a = scene.add_node(root, "a");
    let b = scene.add_node(a, "b");
    scene.add_node(b, "c");
    scene.add_node(a, "d");

    let nodes = extract_nodes(&scene).unwrap().value;
    assert_eq!(nodes[0].parent, -1);
    for (i, node) in nodes.iter().enumerate().skip(1) {
        assert!(node.parent >= 0, "non-root node {i} has no parent");
        assert!((node.parent as usize) < i, "parent of {i} does not precede it");
    }
}

#[test]
fn single_root_scene_flattens_to_one_node() {
    let scene = MemoryScene::new();
    let nodes = extract_nodes(&scene).unwrap().value;
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].parent, -1);
    assert_eq!(nodes[0].mesh, -1);
}

// ============================================================================
// Mesh Slot Assignment
// ============================================================================

#[test]
fn mesh_slots_are_consecutive_in_traversal_order() {
    let mut scene = MemoryScene::new();
    let root = scene.root_id();
    let a = scene.add_node(root, "a");
    let b = scene.add_node(root, "b");
    let c = scene.add_node(a, "c");
    scene.attach_mesh(b, triangle());
    scene.attach_mesh(c, triangle());

    let nodes = extract_nodes(&scene).unwrap().value;
    let slots: Vec<i32> = nodes.iter().map(|n| n.mesh).collect();
    // b comes before c in breadth-first order, so it gets slot 0.
    assert_eq!(slots, [-1, -1, 0, 1]);

    let meshes = extract_meshes(&scene).unwrap().value;
    assert_eq!(meshes.len(), 2);
}

// ============================================================================
// Local Pose
// ============================================================================

#[test]
fn translation_and_scale_pass_through() {
    let mut scene = MemoryScene::new();
    let root = scene.root_id();
    let node = scene.add_node(root, "posed");
    scene.set_translation(node, DVec3::new(1.0, 2.0, 3.0));
    scene.set_scaling(node, DVec3::new(2.0, 2.0, 2.0));

    let nodes = extract_nodes(&scene).unwrap().value;
    assert!(approx(nodes[1].translation, DVec3::new(1.0, 2.0, 3.0)));
    assert!(approx(nodes[1].scale, DVec3::new(2.0, 2.0, 2.0)));
}

#[test]
fn pre_rotation_folds_into_exported_rotation() {
    let mut scene = MemoryScene::new();
    let root = scene.root_id();
    let node = scene.add_node(root, "jointed");
    scene.set_pre_rotation(node, DVec3::new(0.0, 0.0, 90.0));
    scene.set_rotation(node, DVec3::new(45.0, 0.0, 0.0));

    let nodes = extract_nodes(&scene).unwrap().value;
    assert!(
        approx(nodes[1].rotation, DVec3::new(45.0, 0.0, 90.0)),
        "got {}",
        nodes[1].rotation
    );
}

#[test]
fn rotation_offsets_compose_in_the_declared_order() {
    let mut scene = MemoryScene::new();
    let root = scene.root_id();
    let node = scene.add_node(root, "ordered_joint");
    scene.set_rotation_order(node, RotationOrder::Zxy);
    scene.set_pre_rotation(node, DVec3::new(30.0, 40.0, 50.0));
    scene.set_rotation(node, DVec3::new(10.0, 20.0, 30.0));

    let nodes = extract_nodes(&scene).unwrap().value;
    // The exported XYZ euler must rebuild pre * local, both composed Z-X-Y.
    let expected = zxy_matrix(DVec3::new(30.0, 40.0, 50.0)) * zxy_matrix(DVec3::new(10.0, 20.0, 30.0));
    let rebuilt = xyz_matrix(nodes[1].rotation);
    assert!(
        mat_approx(&expected, &rebuilt),
        "got {}",
        nodes[1].rotation
    );
}

#[test]
fn declared_rotation_order_is_preserved_alongside_xyz_pose() {
    let mut scene = MemoryScene::new();
    let root = scene.root_id();
    let node = scene.add_node(root, "ordered");
    scene.set_rotation_order(node, RotationOrder::Zxy);
    scene.set_rotation(node, DVec3::new(0.0, 0.0, 90.0));

    let nodes = extract_nodes(&scene).unwrap().value;
    assert_eq!(nodes[1].rotation_order, RotationOrder::Zxy);
    // A pure Z rotation reads the same in any order.
    assert!(approx(nodes[1].rotation, DVec3::new(0.0, 0.0, 90.0)));
}

// ============================================================================
// Warnings
// ============================================================================

#[test]
fn non_standard_inheritance_warns_but_still_flattens() {
    init_logs();
    let mut scene = MemoryScene::new();
    let root = scene.root_id();
    let node = scene.add_node(root, "legacy");
    scene.set_inheritance(node, TransformInheritance::RrSs);

    let extraction = extract_nodes(&scene).unwrap();
    assert_eq!(extraction.value.len(), 2);
    assert!(
        extraction.warnings.iter().any(|w| w.contains("legacy")),
        "warnings: {:?}",
        extraction.warnings
    );
}

// ============================================================================
// Failed Provider
// ============================================================================

#[test]
fn failed_provider_rejects_every_extraction() {
    let mut scene = MemoryScene::new();
    scene.fail("file not found");

    assert!(matches!(
        extract_nodes(&scene),
        Err(ExportError::ProviderFailed(reason)) if reason == "file not found"
    ));
    assert!(matches!(
        extract_meshes(&scene),
        Err(ExportError::ProviderFailed(_))
    ));
    assert!(matches!(
        extract_takes(&mut scene, 30.0),
        Err(ExportError::ProviderFailed(_))
    ));
}
