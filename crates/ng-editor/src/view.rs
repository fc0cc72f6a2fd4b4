//! Render projection.
//!
//! A flat, serializable picture of what the canvas should draw. Renderers
//! never look at the graph directly; they receive a [`SceneView`].

use crate::editor::Editor;
use ng_core::{NodeColor, NodeSize, ViewTransform};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeView {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub name: String,
    pub color: NodeColor,
    pub size: NodeSize,
    /// `#RRGGBB` fill.
    pub fill: &'static str,
    pub selected: bool,
    /// Pending source of a connection in connect mode.
    pub connect_source: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeView {
    pub id: String,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneView {
    pub transform: ViewTransform,
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
    pub mode: &'static str,
    pub snap_to_grid: bool,
    pub grid_step: f64,
    pub can_undo: bool,
    pub can_redo: bool,
    pub settings_node: Option<String>,
}

impl SceneView {
    pub fn build(editor: &Editor) -> Self {
        let world = editor.world();
        let graph = &world.graph;
        let selected_node = world.selection.node();
        let selected_edge = world.selection.edge();
        let source = world.mode.connect_source();

        let nodes = graph
            .nodes()
            .iter()
            .map(|n| NodeView {
                id: n.id.to_string(),
                x: n.x,
                y: n.y,
                radius: n.radius(),
                name: n.name.clone(),
                color: n.color,
                size: n.size,
                fill: n.color.to_hex(),
                selected: selected_node == Some(n.id),
                connect_source: source == Some(n.id),
            })
            .collect();

        // Edges are drawn center to center.
        let edges = graph
            .edges()
            .iter()
            .filter_map(|e| {
                let a = graph.node(e.from_id)?;
                let b = graph.node(e.to_id)?;
                Some(EdgeView {
                    id: e.id.to_string(),
                    x1: a.x,
                    y1: a.y,
                    x2: b.x,
                    y2: b.y,
                    selected: selected_edge == Some(e.id),
                })
            })
            .collect();

        Self {
            transform: world.transform,
            nodes,
            edges,
            mode: world.mode.name(),
            snap_to_grid: editor.snap_enabled(),
            grid_step: editor.config().grid_step,
            can_undo: editor.history().can_undo(),
            can_redo: editor.history().can_redo(),
            settings_node: editor.settings_node().map(|id| id.to_string()),
        }
    }
}
