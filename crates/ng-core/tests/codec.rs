//! Snapshot documents on disk: repair, defaults, and round-trips.

use ng_core::snapshot::{self, ProjectMeta};
use ng_core::{
    CodecError, EdgeId, InteractionMode, NodeAttrs, NodeColor, NodeId, NodeSize, Point,
    Selection, ViewTransform, WorldState,
};
use pretty_assertions::assert_eq;
use time::macros::datetime;

const NEEDS_REPAIR: &str = include_str!("fixtures/needs-repair.json");

#[test]
fn load_repairs_and_defaults() {
    let project = snapshot::load_json(NEEDS_REPAIR).unwrap();
    let graph = &project.world.graph;

    // Duplicate node, reversed duplicate edge, self-loop, dangling edge.
    assert_eq!(project.repaired, 4);
    assert!(graph.is_consistent());

    let ids: Vec<_> = graph.nodes().iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, vec!["n_a", "n_b", "n_c"]);
    assert_eq!(graph.node(NodeId::intern("n_a")).unwrap().name, "A", "first wins");

    let b = graph.node(NodeId::intern("n_b")).unwrap();
    assert_eq!((b.color, b.size), (NodeColor::default(), NodeSize::default()));
    let c = graph.node(NodeId::intern("n_c")).unwrap();
    assert_eq!((c.color, c.size), (NodeColor::Amber, NodeSize::Small));
    assert_eq!(c.name, "");

    let edges: Vec<_> = graph.edges().iter().map(|e| e.id).collect();
    assert_eq!(edges, vec![EdgeId::intern("e_ab"), EdgeId::intern("e_bc")]);

    assert_eq!(project.world.transform, ViewTransform::new(10.0, 20.0, 2.0));
    assert_eq!(project.meta.updated_at, datetime!(2023-11-02 06:30 UTC));
}

#[test]
fn roundtrip_resets_transient_state() {
    let mut world = WorldState::new();
    let a = world.graph.add_node(Point::new(3.0, 4.0), NodeAttrs::named("a"));
    let b = world.graph.add_node(Point::new(-8.0, 0.5), NodeAttrs::named("b"));
    world.graph.add_edge(a, b);
    world.transform = ViewTransform::new(-15.0, 30.0, 0.75);
    world.mode = InteractionMode::DraggingNode {
        id: a,
        last: Point::ZERO,
        origin: Point::ZERO,
    };
    world.selection = Selection::Node(b);
    let meta = ProjectMeta::new("Roundtrip", datetime!(2024-01-01 00:00 UTC));

    let json = snapshot::to_json(&snapshot::serialize(&world, &meta)).unwrap();
    let loaded = snapshot::load_json(&json).unwrap();

    assert_eq!(loaded.meta, meta);
    assert_eq!(loaded.world.graph, world.graph);
    assert_eq!(loaded.world.transform, world.transform);
    assert_eq!(loaded.world.mode, InteractionMode::Idle);
    assert_eq!(loaded.world.selection, Selection::None);
    assert_eq!(loaded.repaired, 0);
}

#[test]
fn document_keys_are_camel_case() {
    let mut world = WorldState::new();
    let a = world.graph.add_node(Point::new(0.0, 0.0), NodeAttrs::default());
    let b = world.graph.add_node(Point::new(1.0, 0.0), NodeAttrs::default());
    world.graph.add_edge(a, b);
    let meta = ProjectMeta::new("Keys", datetime!(2024-01-01 00:00 UTC));
    let json = snapshot::to_json(&snapshot::serialize(&world, &meta)).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["version"], 1);
    assert_eq!(value["meta"]["createdAt"], "2024-01-01T00:00:00Z");
    assert_eq!(value["view"]["panX"], 0.0);
    assert_eq!(value["nodes"][0]["color"], "sky");
    assert_eq!(value["nodes"][0]["size"], "small");
    assert_eq!(value["edges"][0]["fromId"], a.as_str());
    assert_eq!(value["edges"][0]["toId"], b.as_str());
}

#[test]
fn other_versions_are_rejected_before_decoding() {
    for version in [0, 2, 99] {
        let json = format!(r#"{{"version": {version}, "graph": "unrecognized"}}"#);
        match snapshot::from_json(&json) {
            Err(CodecError::VersionMismatch { found, expected }) => {
                assert_eq!((found, expected), (version, 1));
            }
            other => panic!("version {version}: unexpected {other:?}"),
        }
    }
}
