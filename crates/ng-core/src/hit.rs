//! Hit testing: world point → node or edge lookup.
//!
//! Nodes are tested front-to-back (last inserted is drawn on top) before
//! edges, so a node always wins over an edge passing beneath it.

use crate::graph::Graph;
use crate::id::{EdgeId, NodeId};
use kurbo::{Circle, Line, ParamCurveNearest, Point, Shape};

/// What lies under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Node(NodeId),
    Edge(EdgeId),
}

/// Find the topmost node or edge at world position `p`.
///
/// `edge_tolerance` is the maximum distance, in world units, between `p`
/// and an edge's center line.
pub fn hit_test(graph: &Graph, p: Point, edge_tolerance: f64) -> Option<HitTarget> {
    hit_test_node(graph, p)
        .map(HitTarget::Node)
        .or_else(|| hit_test_edge(graph, p, edge_tolerance).map(HitTarget::Edge))
}

/// Topmost node whose circle contains `p`.
pub fn hit_test_node(graph: &Graph, p: Point) -> Option<NodeId> {
    graph
        .nodes()
        .iter()
        .rev()
        .find(|n| Circle::new(n.position(), n.radius()).contains(p))
        .map(|n| n.id)
}

/// Closest edge within `tolerance` of `p`, preferring the most recent on ties.
pub fn hit_test_edge(graph: &Graph, p: Point, tolerance: f64) -> Option<EdgeId> {
    let max_sq = tolerance * tolerance;
    let mut best: Option<(EdgeId, f64)> = None;
    for edge in graph.edges() {
        let (Some(from), Some(to)) = (graph.node(edge.from_id), graph.node(edge.to_id)) else {
            continue;
        };
        let dist_sq = Line::new(from.position(), to.position())
            .nearest(p, 1e-9)
            .distance_sq;
        if dist_sq <= max_sq && best.is_none_or(|(_, d)| dist_sq <= d) {
            best = Some((edge.id, dist_sq));
        }
    }
    best.map(|(id, _)| id)
}
