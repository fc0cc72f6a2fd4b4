//! Versioned project snapshots: world state ⇄ JSON document.
//!
//! Only the view transform and the graph are persisted. Loading always
//! yields an idle world with nothing selected, and repairs the graph
//! instead of failing: edges with missing endpoints are dropped, and
//! missing or unknown optional node fields fall back to their defaults.

use crate::error::CodecError;
use crate::graph::Graph;
use crate::id::NodeId;
use crate::model::{Edge, Node, NodeColor, NodeSize, ViewTransform};
use crate::world::WorldState;
use serde::{Deserialize, Deserializer, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// The only document version this build reads and writes.
pub const SNAPSHOT_VERSION: i64 = 1;

/// Identity and timestamps of a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectMeta {
    pub id: String,
    pub name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl ProjectMeta {
    /// Metadata for a brand-new project with a random ID.
    pub fn new(name: impl Into<String>, now: OffsetDateTime) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A node as stored on disk. `color` and `size` may be absent in older or
/// foreign documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotNode {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_color")]
    pub color: Option<NodeColor>,
    #[serde(default, deserialize_with = "lenient_size")]
    pub size: Option<NodeSize>,
}

impl From<&Node> for SnapshotNode {
    fn from(n: &Node) -> Self {
        Self {
            id: n.id,
            x: n.x,
            y: n.y,
            name: n.name.clone(),
            color: Some(n.color),
            size: Some(n.size),
        }
    }
}

impl From<SnapshotNode> for Node {
    fn from(n: SnapshotNode) -> Self {
        Self {
            id: n.id,
            x: n.x,
            y: n.y,
            name: n.name,
            color: n.color.unwrap_or_default(),
            size: n.size.unwrap_or_default(),
        }
    }
}

/// The persisted unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: i64,
    pub meta: ProjectMeta,
    #[serde(default)]
    pub view: ViewTransform,
    #[serde(default)]
    pub nodes: Vec<SnapshotNode>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

/// Result of loading a snapshot.
#[derive(Debug, Clone)]
pub struct LoadedProject {
    pub meta: ProjectMeta,
    pub world: WorldState,
    /// Entries dropped while repairing the graph.
    pub repaired: usize,
}

/// Capture the persistent part of `world`.
pub fn serialize(world: &WorldState, meta: &ProjectMeta) -> Snapshot {
    Snapshot {
        version: SNAPSHOT_VERSION,
        meta: meta.clone(),
        view: world.transform,
        nodes: world.graph.nodes().iter().map(SnapshotNode::from).collect(),
        edges: world.graph.edges().to_vec(),
    }
}

/// Rebuild an idle world from a snapshot, repairing what can be repaired.
pub fn deserialize(snapshot: Snapshot) -> Result<LoadedProject, CodecError> {
    check_version(snapshot.version)?;
    let nodes = snapshot.nodes.into_iter().map(Node::from).collect();
    let (graph, repaired) = Graph::from_parts(nodes, snapshot.edges);
    if repaired > 0 {
        log::debug!(
            "repaired project {:?}: dropped {repaired} invalid entries",
            snapshot.meta.name
        );
    }
    Ok(LoadedProject {
        meta: snapshot.meta,
        world: WorldState::with_graph(graph, snapshot.view.sanitized()),
        repaired,
    })
}

/// Encode a snapshot as pretty-printed JSON.
pub fn to_json(snapshot: &Snapshot) -> Result<String, CodecError> {
    Ok(serde_json::to_string_pretty(snapshot)?)
}

/// Parse a JSON document into a snapshot.
///
/// The version is checked before the body is decoded, so a document from a
/// different format version is reported as such even if its shape differs.
pub fn from_json(json: &str) -> Result<Snapshot, CodecError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    let version = value
        .get("version")
        .ok_or_else(|| CodecError::Invalid("missing `version`".into()))?
        .as_i64()
        .ok_or_else(|| CodecError::Invalid("`version` is not an integer".into()))?;
    check_version(version)?;
    Ok(serde_json::from_value(value)?)
}

/// `from_json` followed by `deserialize`.
pub fn load_json(json: &str) -> Result<LoadedProject, CodecError> {
    deserialize(from_json(json)?)
}

fn check_version(found: i64) -> Result<(), CodecError> {
    if found == SNAPSHOT_VERSION {
        Ok(())
    } else {
        Err(CodecError::VersionMismatch {
            found,
            expected: SNAPSHOT_VERSION,
        })
    }
}

fn lenient_color<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NodeColor>, D::Error> {
    Ok(Option::<String>::deserialize(d)?.and_then(|s| NodeColor::from_name(&s)))
}

fn lenient_size<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NodeSize>, D::Error> {
    Ok(Option::<String>::deserialize(d)?.and_then(|s| NodeSize::from_name(&s)))
}
