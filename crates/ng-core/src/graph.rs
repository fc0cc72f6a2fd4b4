//! Graph store: ordered node and edge collections with referential integrity.
//!
//! Invariants held after every operation:
//! - every edge references two distinct nodes that exist,
//! - at most one edge joins any unordered pair of nodes,
//! - IDs are unique within their collection,
//! - untouched entries keep their insertion order.
//!
//! Rejected mutations (self-loops, duplicates, unknown IDs) are silent
//! no-ops reported through the return value, never errors.

use crate::id::{EdgeId, NodeId};
use crate::model::{Edge, Node, NodeAttrs, NodePatch};
use kurbo::Point;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from raw collections, dropping anything that would
    /// break an invariant: repeated node IDs (first wins), and edges that
    /// dangle, self-loop, or duplicate an existing pair.
    /// Returns the graph plus the number of dropped entries.
    pub fn from_parts(nodes: Vec<Node>, edges: Vec<Edge>) -> (Self, usize) {
        let mut graph = Graph::new();
        let mut dropped = 0;
        for node in nodes {
            if graph.contains_node(node.id) {
                log::debug!("dropping duplicate node {}", node.id);
                dropped += 1;
                continue;
            }
            graph.nodes.push(node);
        }
        for edge in edges {
            if graph.can_connect(edge.from_id, edge.to_id) && graph.edge(edge.id).is_none() {
                graph.edges.push(edge);
            } else {
                log::debug!(
                    "dropping edge {} ({} -> {})",
                    edge.id,
                    edge.from_id,
                    edge.to_id
                );
                dropped += 1;
            }
        }
        (graph, dropped)
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// The edge joining `a` and `b` in either direction, if any.
    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<&Edge> {
        self.edges.iter().find(|e| e.connects(a, b))
    }

    /// Edges with `id` as either endpoint, in insertion order.
    pub fn incident_edges(&self, id: NodeId) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(move |e| e.touches(id))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Whether a new edge between `from` and `to` would be accepted.
    pub fn can_connect(&self, from: NodeId, to: NodeId) -> bool {
        from != to
            && self.contains_node(from)
            && self.contains_node(to)
            && self.edge_between(from, to).is_none()
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Append a node with a freshly generated ID.
    pub fn add_node(&mut self, position: Point, attrs: NodeAttrs) -> NodeId {
        let id = NodeId::generate();
        self.insert_node(Node {
            id,
            x: position.x,
            y: position.y,
            name: attrs.name,
            color: attrs.color,
            size: attrs.size,
        });
        id
    }

    /// Append a fully-formed node. The ID must not already be present.
    pub fn insert_node(&mut self, node: Node) {
        debug_assert!(
            !self.contains_node(node.id),
            "duplicate node id {}",
            node.id
        );
        self.nodes.push(node);
    }

    /// Merge `patch` into the node. Returns `false` if the node is unknown.
    pub fn update_node(&mut self, id: NodeId, patch: &NodePatch) -> bool {
        match self.nodes.iter_mut().find(|n| n.id == id) {
            Some(node) => {
                node.merge(patch);
                true
            }
            None => false,
        }
    }

    /// Translate a node by a world-space delta.
    pub fn move_node(&mut self, id: NodeId, dx: f64, dy: f64) -> bool {
        match self.nodes.iter_mut().find(|n| n.id == id) {
            Some(node) => {
                node.x += dx;
                node.y += dy;
                true
            }
            None => false,
        }
    }

    /// Remove a node together with every edge touching it.
    pub fn delete_node(&mut self, id: NodeId) -> bool {
        let Some(pos) = self.nodes.iter().position(|n| n.id == id) else {
            return false;
        };
        self.nodes.remove(pos);
        self.edges.retain(|e| !e.touches(id));
        true
    }

    /// Connect two nodes. Returns `None` (graph unchanged) for self-loops,
    /// unknown endpoints, or a pair that is already connected either way.
    pub fn add_edge(&mut self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        if !self.can_connect(from, to) {
            return None;
        }
        let id = EdgeId::generate();
        self.edges.push(Edge {
            id,
            from_id: from,
            to_id: to,
        });
        Some(id)
    }

    pub fn delete_edge(&mut self, id: EdgeId) -> bool {
        let before = self.edges.len();
        self.edges.retain(|e| e.id != id);
        self.edges.len() != before
    }

    /// Check every invariant. Used by tests and debug assertions.
    pub fn is_consistent(&self) -> bool {
        let unique_nodes = self
            .nodes
            .iter()
            .enumerate()
            .all(|(i, n)| self.nodes[..i].iter().all(|m| m.id != n.id));
        let edges_ok = self.edges.iter().enumerate().all(|(i, e)| {
            e.from_id != e.to_id
                && self.contains_node(e.from_id)
                && self.contains_node(e.to_id)
                && self.edges[..i]
                    .iter()
                    .all(|f| f.id != e.id && !f.connects(e.from_id, e.to_id))
        });
        unique_nodes && edges_ok
    }
}
