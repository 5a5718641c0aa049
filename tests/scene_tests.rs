//! Scene Tests
//!
//! Tests for:
//! - Node graph construction, attachment errors and validation
//! - Name lookup
//! - Attribute ownership
//! - Unit normalization
//! - Mesh triangulation
//! - PoseSettings parsing and scene preparation
//! - Scene JSON summary

use glam::{Mat4, Vec3};
use serde_json::json;

use slimfbx::animation::time::TICKS_PER_SECOND;
use slimfbx::animation::{AnimCurve, AnimCurve3, AnimLayer, AnimNode, AnimStack, TimeMode, TimeSpan};
use slimfbx::config::PoseSettings;
use slimfbx::errors::PoseError;
use slimfbx::scene::transform::{LocalTransform, RotationOrder};
use slimfbx::scene::{Attribute, AttributeKind, Mesh, Node, NodeGraph, Polygon, Scene, SystemUnit};
use slimfbx::skinning::{Cluster, Deformer, Skin};

const EPSILON: f32 = 1e-5;

fn vec3_approx(a: Vec3, b: Vec3) -> bool {
    a.abs_diff_eq(b, EPSILON)
}

fn named(name: &str, translation: Vec3) -> Node {
    Node::with_name(name).with_local(LocalTransform::from_trs(translation, Vec3::ZERO, Vec3::ONE))
}

// ============================================================================
// Node graph
// ============================================================================

#[test]
fn graph_links_parent_and_children() {
    let mut graph = NodeGraph::new(Node::with_name("Root"));
    let a = graph.add_child(graph.root(), Node::with_name("A")).unwrap();
    let b = graph.add_child(a, Node::with_name("B")).unwrap();

    assert_eq!(graph.len(), 3);
    assert_eq!(graph.node(b).unwrap().parent(), Some(a));
    assert_eq!(graph.node(a).unwrap().children(), &[b]);
    assert_eq!(graph.node(b).unwrap().index(), b);
    assert!(graph.validate().is_ok());
}

#[test]
fn attach_rejects_cycles_and_second_parent() {
    let mut graph = NodeGraph::new(Node::new());
    let a = graph.add_child(graph.root(), Node::new()).unwrap();
    let b = graph.add_child(a, Node::new()).unwrap();
    let loose = graph.add_node(Node::new());

    assert!(matches!(graph.attach(b, loose), Err(PoseError::InvalidHierarchy { node, .. }) if node == b));
    assert!(matches!(graph.attach(graph.root(), b), Err(PoseError::InvalidHierarchy { .. })));
    assert!(matches!(graph.attach(loose, loose), Err(PoseError::InvalidHierarchy { .. })));

    graph.attach(loose, b).unwrap();
    assert!(matches!(graph.attach(a, loose), Err(PoseError::InvalidHierarchy { .. })));
    assert!(matches!(graph.attach(loose, 99), Err(PoseError::NodeIndexOutOfBounds { index: 99, .. })));
}

#[test]
fn validate_reports_orphans() {
    let mut graph = NodeGraph::new(Node::new());
    graph.add_child(graph.root(), Node::new()).unwrap();
    let orphan = graph.add_node(Node::new());

    assert!(matches!(graph.validate(), Err(PoseError::InvalidHierarchy { node, .. }) if node == orphan));
    graph.attach(orphan, graph.root()).unwrap();
    assert!(graph.validate().is_ok());
}

#[test]
fn static_global_transforms() {
    let mut graph = NodeGraph::new(named("Root", Vec3::new(0.0, 0.0, 1.0)));
    let hip = graph.add_child(graph.root(), named("Hip", Vec3::new(0.0, 2.0, 0.0))).unwrap();
    let knee = graph.add_child(hip, named("Knee", Vec3::new(0.5, 0.0, 0.0))).unwrap();

    let globals = graph.global_transforms().unwrap();
    assert!(vec3_approx(globals[knee].w_axis.truncate(), Vec3::new(0.5, 2.0, 1.0)));
    assert_eq!(globals[graph.root()], graph.node(graph.root()).unwrap().local_matrix());
}

// ============================================================================
// Names
// ============================================================================

#[test]
fn find_by_name_walks_depth_first() {
    let mut graph = NodeGraph::new(Node::with_name("Root"));
    let arm = graph.add_child(graph.root(), Node::with_name("Arm")).unwrap();
    let hand = graph.add_child(arm, Node::with_name("Hand")).unwrap();
    graph.add_child(graph.root(), Node::with_name("Hand")).unwrap();

    assert_eq!(graph.find_by_name("Root"), Some(graph.root()));
    assert_eq!(graph.find_by_name("Hand"), Some(hand));
    assert_eq!(graph.find_by_name("Leg"), None);
}

#[test]
fn name_map_first_wins() {
    let mut graph = NodeGraph::new(Node::with_name("Root"));
    let first = graph.add_child(graph.root(), Node::with_name("Bone")).unwrap();
    graph.add_child(graph.root(), Node::with_name("Bone")).unwrap();
    graph.add_child(graph.root(), Node::new()).unwrap();

    let scene = Scene::new(graph);
    let map = scene.name_map();
    assert_eq!(map.len(), 2);
    assert_eq!(map["Bone"], first);
    assert_eq!(scene.find_node_by_name("Bone"), Some(first));
}

// ============================================================================
// Attributes
// ============================================================================

#[test]
fn attributes_link_both_ways() {
    let mut graph = NodeGraph::new(Node::new());
    let body = graph.add_child(graph.root(), Node::with_name("Body")).unwrap();
    let mut scene = Scene::new(graph);

    let mesh = scene
        .add_attribute(body, Attribute::new(Some("BodyMesh".into()), AttributeKind::Mesh(Mesh::new(vec![Vec3::ZERO]))))
        .unwrap();
    assert_eq!(scene.graph.node(body).unwrap().attributes, vec![mesh]);
    assert_eq!(scene.attributes[mesh].single_node().unwrap(), body);
    assert_eq!(scene.meshes().count(), 1);
    assert!(scene.mesh(mesh).is_some());

    assert!(matches!(
        scene.add_attribute(42, Attribute::new(None, AttributeKind::Mesh(Mesh::default()))),
        Err(PoseError::NodeIndexOutOfBounds { index: 42, .. })
    ));
}

#[test]
fn single_node_requires_exactly_one_user() {
    let unused = Attribute::new(Some("Shared".into()), AttributeKind::Mesh(Mesh::default()));
    assert!(matches!(unused.single_node(), Err(PoseError::AttributeNodeCount { count: 0, .. })));

    let mut shared = unused.clone();
    shared.nodes = vec![1, 2];
    assert!(matches!(shared.single_node(), Err(PoseError::AttributeNodeCount { count: 2, .. })));
}

// ============================================================================
// Units
// ============================================================================

fn centimetre_scene() -> Scene {
    let mut graph = NodeGraph::new(Node::with_name("Root"));
    let mut bone = named("Bone", Vec3::new(100.0, 0.0, -50.0));
    bone.local.rotation_pivot = Vec3::new(10.0, 0.0, 0.0);
    bone.local.scaling = Vec3::splat(2.0);
    let bone = graph.add_child(graph.root(), bone).unwrap();
    let body = graph.add_child(graph.root(), Node::with_name("Body")).unwrap();

    let mut cluster = Cluster::new(bone, vec![0], vec![1.0]);
    cluster.transform_link_matrix = Mat4::from_translation(Vec3::new(100.0, 0.0, -50.0));
    let mut mesh = Mesh::new(vec![Vec3::new(200.0, 0.0, 0.0)]);
    mesh.deformers.push(Deformer::Skin(Skin::new(vec![cluster])));

    let mut scene = Scene::new(graph);
    scene
        .add_attribute(body, Attribute::new(None, AttributeKind::Mesh(mesh)))
        .unwrap();

    let anim = AnimNode::new(
        bone,
        AnimCurve3::constant(Vec3::splat(2.0)),
        AnimCurve3::constant(Vec3::new(0.0, 90.0, 0.0)),
        AnimCurve3::new(
            AnimCurve::linear(&[(0, 100.0), (TICKS_PER_SECOND, 300.0)]).unwrap(),
            AnimCurve::constant(0.0),
            AnimCurve::constant(-50.0),
        ),
    );
    let mut stack = AnimStack::new(None, TimeSpan::new(0, TICKS_PER_SECOND));
    stack.layers.push(AnimLayer::new(None, vec![anim]));
    scene.anim_stacks.push(stack);
    scene
}

#[test]
fn centimetres_convert_to_metres() {
    let mut scene = centimetre_scene();
    scene.convert_to_meters().unwrap();
    assert_eq!(scene.system_unit, SystemUnit::M);

    let bone = scene.graph.node(1).unwrap();
    assert!(vec3_approx(bone.local.translation, Vec3::new(1.0, 0.0, -0.5)));
    assert!(vec3_approx(bone.local.rotation_pivot, Vec3::new(0.1, 0.0, 0.0)));
    assert_eq!(bone.local.scaling, Vec3::splat(2.0), "scaling is unitless");

    let mesh = scene.mesh(0).unwrap();
    assert!(vec3_approx(mesh.positions[0], Vec3::new(2.0, 0.0, 0.0)));
    let link = mesh.skin().unwrap().clusters[0].transform_link_matrix;
    assert!(vec3_approx(link.w_axis.truncate(), Vec3::new(1.0, 0.0, -0.5)));

    let anim = &scene.anim_stacks[0].layers[0].node_animations[0];
    assert!(vec3_approx(anim.translation.sample(TICKS_PER_SECOND), Vec3::new(3.0, 0.0, -0.5)));
    assert_eq!(anim.rotation.sample(0), Vec3::new(0.0, 90.0, 0.0), "angles are unitless");
    assert_eq!(anim.scaling.sample(0), Vec3::splat(2.0));
}

#[test]
fn metres_are_left_alone() {
    let mut scene = centimetre_scene();
    scene.system_unit = SystemUnit::M;
    scene.convert_to_meters().unwrap();
    assert_eq!(scene.graph.node(1).unwrap().local.translation, Vec3::new(100.0, 0.0, -50.0));
}

#[test]
fn other_units_are_rejected() {
    let mut scene = centimetre_scene();
    scene.system_unit = SystemUnit::DM;
    assert!(matches!(
        scene.convert_to_meters(),
        Err(PoseError::UnsupportedUnit { scale_factor, .. }) if scale_factor == 10.0
    ));
    assert_eq!(scene.system_unit, SystemUnit::DM);
}

// ============================================================================
// Triangulation
// ============================================================================

#[test]
fn triangulate_fans_polygons() {
    let mut mesh = Mesh::new(vec![Vec3::ZERO; 8]);
    mesh.indices = vec![0, 1, 2, 3, 4, 5, 6, 7, 0, 1, 2];
    mesh.polygons = Some(vec![
        Polygon { index: 0, size: 4 },
        Polygon { index: 4, size: 2 },
        Polygon { index: 6, size: 5 },
    ]);

    let tri = mesh.triangulate().unwrap();
    assert!(tri.is_triangle_mesh);
    assert_eq!(tri.indices, vec![0, 1, 2, 0, 2, 3, 6, 7, 0, 6, 0, 1, 6, 1, 2]);
    assert_eq!(tri.polygons.as_ref().unwrap().len(), 5);
    assert_eq!(tri.positions.len(), 8);
}

#[test]
fn triangulate_edge_cases() {
    let mut triangles = Mesh::new(vec![Vec3::ZERO; 3]);
    triangles.is_triangle_mesh = true;
    triangles.indices = vec![0, 1, 2];
    assert_eq!(triangles.triangulate().unwrap().indices, vec![0, 1, 2]);

    let no_polygons = Mesh::new(vec![Vec3::ZERO; 3]);
    assert!(no_polygons.triangulate().is_none());
}

// ============================================================================
// Settings
// ============================================================================

#[test]
fn settings_defaults_and_overrides() {
    let defaults = PoseSettings::from_json("{}").unwrap();
    assert_eq!(defaults, PoseSettings::default());
    assert_eq!(defaults.max_influences_per_vertex, 4);
    assert!(defaults.convert_units);

    let custom = PoseSettings::from_json(r#"{ "max_influences_per_vertex": 8, "time_mode_override": "frames60" }"#).unwrap();
    assert_eq!(custom.max_influences_per_vertex, 8);
    assert_eq!(custom.time_mode_override, Some(TimeMode::Frames60));

    let round_trip = PoseSettings::from_json(&custom.to_json().unwrap()).unwrap();
    assert_eq!(round_trip, custom);

    assert!(matches!(PoseSettings::from_json("{ not json"), Err(PoseError::Config(_))));
}

#[test]
fn settings_pick_time_mode_and_prepare_scene() {
    let mut scene = centimetre_scene();
    scene.time_mode = TimeMode::Frames24;

    let settings = PoseSettings::default();
    assert_eq!(settings.time_mode(&scene), TimeMode::Frames24);
    assert_eq!(settings.sample_times(&scene.anim_stacks[0], &scene).unwrap().len(), 25);

    let keep_units = PoseSettings {
        convert_units: false,
        ..PoseSettings::default()
    };
    scene.prepare(&keep_units).unwrap();
    assert_eq!(scene.system_unit, SystemUnit::CM);

    scene.prepare(&settings).unwrap();
    assert_eq!(scene.system_unit, SystemUnit::M);
}

#[test]
fn settings_vertex_bones_use_influence_limit() {
    let mut graph = NodeGraph::new(Node::new());
    let a = graph.add_child(graph.root(), Node::with_name("A")).unwrap();
    let b = graph.add_child(graph.root(), Node::with_name("B")).unwrap();
    let body = graph.add_child(graph.root(), Node::with_name("Body")).unwrap();

    let mut skinned = Mesh::new(vec![Vec3::ZERO, Vec3::X]);
    skinned.deformers.push(Deformer::Skin(Skin::new(vec![
        Cluster::new(a, vec![0, 1], vec![0.25, 1.0]),
        Cluster::new(b, vec![0], vec![0.75]),
    ])));
    let mut scene = Scene::new(graph);
    let skinned = scene
        .add_attribute(body, Attribute::new(Some("Skinned".into()), AttributeKind::Mesh(skinned)))
        .unwrap();
    let rigid = scene
        .add_attribute(body, Attribute::new(Some("Rigid".into()), AttributeKind::Mesh(Mesh::new(vec![Vec3::ZERO]))))
        .unwrap();

    let single = PoseSettings {
        max_influences_per_vertex: 1,
        ..PoseSettings::default()
    };
    let table = single.vertex_bones(&scene, skinned).unwrap();
    assert_eq!(table.len(), 2);
    assert!(table.iter().all(|slots| slots.len() == 1));
    assert_eq!(table[0][0].bone, 1);
    assert_eq!(table[0][0].weight, 1.0);

    let table = PoseSettings::default().vertex_bones(&scene, skinned).unwrap();
    assert!(table.iter().all(|slots| slots.len() == 4));
    assert_eq!(table[0][0].bone, 1);
    assert!((table[0][0].weight - 0.75).abs() < EPSILON);
    assert!((table[0][1].weight - 0.25).abs() < EPSILON);

    assert!(matches!(
        single.vertex_bones(&scene, rigid),
        Err(PoseError::MissingSkin { mesh: Some(name) }) if name == "Rigid"
    ));
    assert!(matches!(
        single.vertex_bones(&scene, 9),
        Err(PoseError::AttributeIndexOutOfBounds { index: 9, .. })
    ));
}

// ============================================================================
// JSON summary
// ============================================================================

#[test]
fn scene_json_writes_non_default_fields() {
    let mut scene = centimetre_scene();
    scene.name = Some("Walk".into());
    scene.time_mode = TimeMode::Frames24;
    let body = scene.find_node_by_name("Body").unwrap();
    let node = scene.graph.node_mut(body).unwrap();
    node.geometric_scaling = Vec3::splat(0.5);
    node.local.rotation_order = RotationOrder::Zyx;

    let json = scene.to_json().unwrap();
    assert_eq!(json["name"], "Walk");
    assert_eq!(json["systemUnit"], json!({ "scaleFactor": 1.0, "multiplier": 1.0 }));
    assert_eq!(json["timeMode"], "Frames24");

    let root = &json["rootNode"];
    assert_eq!(root["name"], "Root");
    assert!(root.get("translation").is_none());
    assert!(root.get("attributes").is_none());

    let bone = &root["children"][0];
    assert_eq!(bone["name"], "Bone");
    assert_eq!(bone["translation"], json!([100.0, 0.0, -50.0]));
    assert_eq!(bone["scaling"], json!([2.0, 2.0, 2.0]));
    assert_eq!(bone["rotationPivot"], json!([10.0, 0.0, 0.0]));
    assert!(bone.get("rotation").is_none());
    assert!(bone.get("rotationOrder").is_none());
    assert!(bone.get("children").is_none());

    let body = &root["children"][1];
    assert_eq!(body["geometricScaling"], json!([0.5, 0.5, 0.5]));
    assert_eq!(body["rotationOrder"], "Zyx");
    assert_eq!(body["attributes"], json!([{ "type": "Mesh", "name": null }]));
}

#[test]
fn scene_json_handles_deep_chains() {
    let depth = 500;
    let mut graph = NodeGraph::new(Node::with_name("Root"));
    let mut parent = graph.root();
    for i in 0..depth {
        parent = graph.add_child(parent, Node::with_name(format!("Joint{i}"))).unwrap();
    }
    let scene = Scene::new(graph);

    let json = scene.to_json().unwrap();
    assert!(json.get("name").is_none());
    let mut node = &json["rootNode"];
    for i in 0..depth {
        let children = node["children"].as_array().unwrap();
        assert_eq!(children.len(), 1);
        node = &children[0];
        assert_eq!(node["name"], format!("Joint{i}").as_str());
    }
    assert!(node.get("children").is_none());
}
