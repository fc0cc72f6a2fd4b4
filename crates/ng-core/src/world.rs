//! World state: the single source of truth for an open graph.
//!
//! Holds the view transform, the graph, the interaction mode (with any
//! in-progress gesture data), and the current selection. All graph edits
//! go through [`WorldState::apply`] as [`GraphMutation`] values.

use crate::graph::Graph;
use crate::id::{EdgeId, NodeId};
use crate::model::{NodeAttrs, NodePatch, ViewTransform};
use kurbo::Point;

// ─── Interaction mode ────────────────────────────────────────────────────

/// What the pointer currently does. Each variant carries only the gesture
/// data that mode needs.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InteractionMode {
    #[default]
    Idle,
    /// Every click on empty canvas places a node.
    PlacingNode,
    /// A node follows the pointer. `last` is the previous pointer position
    /// in screen space, `origin` the node's world position at drag start.
    DraggingNode {
        id: NodeId,
        last: Point,
        origin: Point,
    },
    /// Clicking two nodes in turn connects them.
    Connecting { source: Option<NodeId> },
    /// Background drag moving the view. `last` is in screen space.
    Panning { last: Point },
}

impl InteractionMode {
    pub fn name(&self) -> &'static str {
        match self {
            InteractionMode::Idle => "idle",
            InteractionMode::PlacingNode => "placing-node",
            InteractionMode::DraggingNode { .. } => "dragging-node",
            InteractionMode::Connecting { .. } => "connecting",
            InteractionMode::Panning { .. } => "panning",
        }
    }

    /// True while a pointer gesture holds exclusive capture.
    pub fn is_capturing(&self) -> bool {
        matches!(
            self,
            InteractionMode::DraggingNode { .. } | InteractionMode::Panning { .. }
        )
    }

    /// The same mode with transient gesture data dropped. Captured gestures
    /// fall back to `Idle`; connect mode forgets its source.
    pub fn without_gesture(self) -> Self {
        match self {
            InteractionMode::DraggingNode { .. } | InteractionMode::Panning { .. } => {
                InteractionMode::Idle
            }
            InteractionMode::Connecting { .. } => InteractionMode::Connecting { source: None },
            other => other,
        }
    }

    pub fn connect_source(&self) -> Option<NodeId> {
        match self {
            InteractionMode::Connecting { source } => *source,
            _ => None,
        }
    }
}

// ─── Selection ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Node(NodeId),
    Edge(EdgeId),
}

impl Selection {
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Selection::Node(id) => Some(*id),
            _ => None,
        }
    }

    pub fn edge(&self) -> Option<EdgeId> {
        match self {
            Selection::Edge(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Selection::None)
    }
}

// ─── Mutations ───────────────────────────────────────────────────────────

/// A single edit to the world. Produced by the interaction machine and
/// applied by the owner of the state.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphMutation {
    /// Place a node. `id` is chosen up front so callers can refer to it.
    AddNode {
        id: NodeId,
        position: Point,
        attrs: NodeAttrs,
    },
    UpdateNode { id: NodeId, patch: NodePatch },
    /// Translate by a world-space delta.
    MoveNode { id: NodeId, dx: f64, dy: f64 },
    DeleteNode { id: NodeId },
    AddEdge { from: NodeId, to: NodeId },
    DeleteEdge { id: EdgeId },
    SetTransform(ViewTransform),
}

// ─── World ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WorldState {
    pub transform: ViewTransform,
    pub graph: Graph,
    pub mode: InteractionMode,
    pub selection: Selection,
}

impl WorldState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A state showing `graph` through `transform`, idle with nothing selected.
    pub fn with_graph(graph: Graph, transform: ViewTransform) -> Self {
        Self {
            transform,
            graph,
            mode: InteractionMode::Idle,
            selection: Selection::None,
        }
    }

    /// Apply one mutation. Returns `true` if anything changed.
    ///
    /// Selection is kept valid: deleting the selected node or edge (or an
    /// edge removed by cascade) clears it.
    pub fn apply(&mut self, mutation: GraphMutation) -> bool {
        let changed = match mutation {
            GraphMutation::AddNode {
                id,
                position,
                attrs,
            } => {
                debug_assert!(!self.graph.contains_node(id), "duplicate node id {id}");
                if self.graph.contains_node(id) {
                    return false;
                }
                self.graph.insert_node(crate::model::Node {
                    id,
                    x: position.x,
                    y: position.y,
                    name: attrs.name,
                    color: attrs.color,
                    size: attrs.size,
                });
                true
            }
            GraphMutation::UpdateNode { id, patch } => {
                !patch.is_empty() && self.graph.update_node(id, &patch)
            }
            GraphMutation::MoveNode { id, dx, dy } => {
                (dx != 0.0 || dy != 0.0) && self.graph.move_node(id, dx, dy)
            }
            GraphMutation::DeleteNode { id } => self.graph.delete_node(id),
            GraphMutation::AddEdge { from, to } => self.graph.add_edge(from, to).is_some(),
            GraphMutation::DeleteEdge { id } => self.graph.delete_edge(id),
            GraphMutation::SetTransform(t) => {
                let t = t.sanitized();
                let changed = t != self.transform;
                self.transform = t;
                changed
            }
        };
        if changed {
            self.prune_selection();
        }
        changed
    }

    /// Apply a batch in order. Returns `true` if any mutation changed state.
    pub fn apply_all(&mut self, mutations: impl IntoIterator<Item = GraphMutation>) -> bool {
        mutations
            .into_iter()
            .fold(false, |changed, m| self.apply(m) || changed)
    }

    fn prune_selection(&mut self) {
        let stale = match self.selection {
            Selection::Node(id) => !self.graph.contains_node(id),
            Selection::Edge(id) => self.graph.edge(id).is_none(),
            Selection::None => false,
        };
        if stale {
            self.selection = Selection::None;
        }
        if let InteractionMode::Connecting { source: Some(id) } = self.mode
            && !self.graph.contains_node(id)
        {
            self.mode = InteractionMode::Connecting { source: None };
        }
    }

    /// Drop selection and gesture data, keeping the current tool mode.
    pub fn clear_transient(&mut self) {
        self.selection = Selection::None;
        self.mode = self.mode.without_gesture();
    }
}
