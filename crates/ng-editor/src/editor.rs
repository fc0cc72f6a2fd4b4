//! The editor controller.
//!
//! Owns the world state, the undo history, the editor settings, and the
//! settings-form target. Every input is routed through [`Editor::handle_event`]
//! (pointer and wheel go to the interaction modes, keys go through the
//! shortcut map) so there is exactly one place where state changes.

use crate::commands::HistoryStack;
use crate::input::{InputEvent, Modifiers};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::tools::{self, HistoryOp, ToolContext, ToolEffect, Transition};
use crate::view::SceneView;
use ng_core::transform::zoom_at_step;
use ng_core::{
    EditorConfig, GraphMutation, InteractionMode, LoadedProject, NodeId, NodePatch, Point,
    Selection, ViewTransform, WorldState, ZoomDirection,
};
use serde::Serialize;

/// What a handled event did, for the host's redraw and save decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    /// Graph or view transform changed; the project needs saving.
    pub changed: bool,
    /// Anything visible changed; the canvas needs redrawing.
    pub redraw: bool,
    /// The settings form was just opened for this node.
    pub open_settings: Option<NodeId>,
}

impl Outcome {
    fn redraw() -> Self {
        Self {
            redraw: true,
            ..Self::default()
        }
    }

    fn changed(changed: bool) -> Self {
        Self {
            changed,
            redraw: changed,
            open_settings: None,
        }
    }
}

pub struct Editor {
    world: WorldState,
    history: HistoryStack,
    config: EditorConfig,
    snap_to_grid: bool,
    /// Node whose settings form is open.
    settings: Option<NodeId>,
    /// Bumped on every graph or transform change.
    revision: u64,
    viewport: (f64, f64),
}

impl Editor {
    pub fn new(config: EditorConfig) -> Self {
        let config = config.validated();
        Self {
            world: WorldState::new(),
            history: HistoryStack::new(config.history_limit),
            snap_to_grid: config.snap_to_grid,
            settings: None,
            revision: 0,
            viewport: (0.0, 0.0),
            config,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn world(&self) -> &WorldState {
        &self.world
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn history(&self) -> &HistoryStack {
        &self.history
    }

    pub fn snap_enabled(&self) -> bool {
        self.snap_to_grid
    }

    pub fn settings_node(&self) -> Option<NodeId> {
        self.settings
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn scene(&self) -> SceneView {
        SceneView::build(self)
    }

    /// Canvas size in screen pixels, used as the anchor for keyboard zoom.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport = (width.max(0.0), height.max(0.0));
    }

    fn tool_context(&self) -> ToolContext {
        ToolContext {
            snap_to_grid: self.snap_to_grid,
            ..ToolContext::from_config(&self.config)
        }
    }

    /// Replace the open graph. History is reset and nothing is selected.
    pub fn load(&mut self, project: LoadedProject) {
        self.world = project.world;
        self.history.clear();
        self.settings = None;
        log::debug!(
            "loaded '{}': {} nodes, {} edges",
            project.meta.name,
            self.world.graph.node_count(),
            self.world.graph.edge_count()
        );
    }

    // ─── Events ──────────────────────────────────────────────────────────

    pub fn handle_event(&mut self, event: &InputEvent) -> Outcome {
        match event {
            InputEvent::Key { key, modifiers } => self.handle_key(key, *modifiers),
            _ => {
                let transition = tools::interpret(&self.world, &self.tool_context(), event);
                self.apply_transition(transition)
            }
        }
    }

    pub fn handle_key(&mut self, key: &str, modifiers: Modifiers) -> Outcome {
        let Some(action) = ShortcutMap::resolve(key, modifiers) else {
            return Outcome::default();
        };
        // Keystrokes belong to the form while it is open.
        if self.settings.is_some() && action != ShortcutAction::Cancel {
            return Outcome::default();
        }
        self.dispatch(action)
    }

    pub fn dispatch(&mut self, action: ShortcutAction) -> Outcome {
        log::debug!("action {}", action.name());
        match action {
            ShortcutAction::ToggleAddNode => self.set_mode(tools::toggle_add_node(self.world.mode)),
            ShortcutAction::ToggleConnect => self.set_mode(tools::toggle_connect(self.world.mode)),
            ShortcutAction::ToggleSnap => {
                self.snap_to_grid = !self.snap_to_grid;
                Outcome::redraw()
            }
            ShortcutAction::Cancel => self.cancel(),
            ShortcutAction::Undo => self.undo(),
            ShortcutAction::Redo => self.redo(),
            ShortcutAction::Delete => self.delete_selection(),
            ShortcutAction::ZoomIn => self.zoom_about_centre(ZoomDirection::In),
            ShortcutAction::ZoomOut => self.zoom_about_centre(ZoomDirection::Out),
            ShortcutAction::ResetView => {
                self.apply_mutations(vec![GraphMutation::SetTransform(ViewTransform::IDENTITY)])
            }
        }
    }

    fn apply_transition(&mut self, t: Transition) -> Outcome {
        let before = (self.world.mode, self.world.selection);
        match t.history {
            HistoryOp::Commit => self.history.commit(&self.world),
            HistoryOp::BeginGesture => self.history.begin_gesture(&self.world),
            HistoryOp::None | HistoryOp::EndGesture => {}
        }
        let changed = self.world.apply_all(t.mutations);
        if let Some(mode) = t.mode {
            self.world.mode = mode;
        }
        if let Some(selection) = t.selection {
            self.world.selection = selection;
        }
        if t.history == HistoryOp::EndGesture {
            self.history.end_gesture(&self.world);
        }
        let open_settings = t.effect.map(|ToolEffect::OpenSettings(id)| id);
        if open_settings.is_some() {
            self.settings = open_settings;
        }
        if changed {
            self.revision += 1;
        }
        Outcome {
            changed,
            redraw: changed
                || open_settings.is_some()
                || before != (self.world.mode, self.world.selection),
            open_settings,
        }
    }

    fn apply_mutations(&mut self, mutations: Vec<GraphMutation>) -> Outcome {
        self.apply_transition(Transition {
            mutations,
            ..Transition::none()
        })
    }

    // ─── Actions ─────────────────────────────────────────────────────────

    fn set_mode(&mut self, mode: InteractionMode) -> Outcome {
        if self.world.mode.is_capturing() {
            return Outcome::default();
        }
        self.world.mode = mode;
        Outcome::redraw()
    }

    pub fn toggle_add_node(&mut self) -> Outcome {
        self.dispatch(ShortcutAction::ToggleAddNode)
    }

    pub fn toggle_connect(&mut self) -> Outcome {
        self.dispatch(ShortcutAction::ToggleConnect)
    }

    pub fn toggle_snap(&mut self) -> Outcome {
        self.dispatch(ShortcutAction::ToggleSnap)
    }

    /// Close the settings form if open. Otherwise drop the selection and
    /// return to `Idle`, rolling back an in-progress drag.
    pub fn cancel(&mut self) -> Outcome {
        if self.settings.take().is_some() {
            return Outcome::redraw();
        }
        let mut changed = false;
        if let Some(start) = self.history.cancel_gesture()
            && start.graph != self.world.graph
        {
            self.world.graph = start.graph.clone();
            changed = true;
        }
        if changed {
            self.revision += 1;
        }
        self.world.mode = InteractionMode::Idle;
        self.world.selection = Selection::None;
        Outcome {
            changed,
            redraw: true,
            open_settings: None,
        }
    }

    pub fn undo(&mut self) -> Outcome {
        if self.world.mode.is_capturing() {
            return Outcome::default();
        }
        let changed = self.history.undo(&mut self.world);
        self.after_history_step(changed)
    }

    pub fn redo(&mut self) -> Outcome {
        if self.world.mode.is_capturing() {
            return Outcome::default();
        }
        let changed = self.history.redo(&mut self.world);
        self.after_history_step(changed)
    }

    fn after_history_step(&mut self, changed: bool) -> Outcome {
        if changed {
            self.settings = None;
            self.revision += 1;
        }
        Outcome::changed(changed)
    }

    /// Delete the selected node (with its edges) or edge as one step.
    pub fn delete_selection(&mut self) -> Outcome {
        if self.world.mode.is_capturing() {
            return Outcome::default();
        }
        let mutation = match self.world.selection {
            Selection::Node(id) => GraphMutation::DeleteNode { id },
            Selection::Edge(id) => GraphMutation::DeleteEdge { id },
            Selection::None => return Outcome::default(),
        };
        self.apply_transition(Transition {
            mutations: vec![mutation],
            history: HistoryOp::Commit,
            ..Transition::none()
        })
    }

    fn zoom_about_centre(&mut self, direction: ZoomDirection) -> Outcome {
        let centre = Point::new(self.viewport.0 / 2.0, self.viewport.1 / 2.0);
        let next = zoom_at_step(centre, &self.world.transform, direction, self.config.zoom_step);
        self.apply_mutations(vec![GraphMutation::SetTransform(next)])
    }

    // ─── Settings form ───────────────────────────────────────────────────

    pub fn open_settings(&mut self, id: NodeId) -> bool {
        if !self.world.graph.contains_node(id) {
            return false;
        }
        self.settings = Some(id);
        true
    }

    pub fn close_settings(&mut self) -> Outcome {
        match self.settings.take() {
            Some(_) => Outcome::redraw(),
            None => Outcome::default(),
        }
    }

    /// Edit a node's name, color, or size as one committed step.
    /// A patch that changes nothing records no history, and edits are
    /// ignored while a drag or pan holds the pointer.
    pub fn update_node(&mut self, id: NodeId, patch: NodePatch) -> Outcome {
        if self.world.mode.is_capturing() {
            return Outcome::default();
        }
        let Some(node) = self.world.graph.node(id) else {
            return Outcome::default();
        };
        let mut next = node.clone();
        next.merge(&patch);
        if next == *node {
            return Outcome::default();
        }
        self.apply_transition(Transition {
            mutations: vec![GraphMutation::UpdateNode { id, patch }],
            history: HistoryOp::Commit,
            ..Transition::none()
        })
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ng_core::{NodeAttrs, NodeColor};
    use pretty_assertions::assert_eq;

    fn editor_with_nodes(points: &[(f64, f64)]) -> (Editor, Vec<NodeId>) {
        let mut editor = Editor::default();
        let ids = points
            .iter()
            .map(|&(x, y)| {
                editor
                    .world
                    .graph
                    .add_node(Point::new(x, y), NodeAttrs::default())
            })
            .collect();
        (editor, ids)
    }

    #[test]
    fn drag_is_one_undo_step() {
        let (mut editor, ids) = editor_with_nodes(&[(100.0, 100.0)]);
        editor.handle_event(&InputEvent::down(100.0, 100.0));
        for i in 1..=10 {
            editor.handle_event(&InputEvent::moved(100.0 + i as f64 * 5.0, 100.0));
        }
        let out = editor.handle_event(&InputEvent::up(150.0, 100.0));
        assert_eq!(editor.world().mode, InteractionMode::Idle);
        assert!(out.redraw);
        assert_eq!(editor.history().undo_depth(), 1);

        editor.undo();
        assert_eq!(
            editor.world().graph.node(ids[0]).unwrap().position(),
            Point::new(100.0, 100.0)
        );
    }

    #[test]
    fn click_without_move_records_nothing() {
        let (mut editor, _) = editor_with_nodes(&[(0.0, 0.0)]);
        editor.handle_event(&InputEvent::down(0.0, 0.0));
        editor.handle_event(&InputEvent::up(0.0, 0.0));
        assert!(!editor.history().can_undo());
    }

    #[test]
    fn escape_reverts_drag() {
        let (mut editor, ids) = editor_with_nodes(&[(0.0, 0.0)]);
        editor.handle_event(&InputEvent::down(0.0, 0.0));
        editor.handle_event(&InputEvent::moved(30.0, 0.0));
        let out = editor.handle_key("Escape", Modifiers::NONE);
        assert!(out.changed);
        assert_eq!(editor.world().mode, InteractionMode::Idle);
        assert_eq!(editor.world().selection, Selection::None);
        assert_eq!(editor.world().graph.node(ids[0]).unwrap().position(), Point::ZERO);
        assert!(!editor.history().can_undo());
    }

    #[test]
    fn escape_closes_form_first() {
        let mut editor = Editor::default();
        editor.toggle_add_node();
        let out = editor.handle_event(&InputEvent::down(10.0, 10.0));
        let id = out.open_settings.unwrap();
        assert_eq!(editor.settings_node(), Some(id));

        // Shortcuts are swallowed while the form is open.
        assert_eq!(editor.handle_key("g", Modifiers::NONE), Outcome::default());
        assert!(!editor.snap_enabled());

        editor.handle_key("Escape", Modifiers::NONE);
        assert_eq!(editor.settings_node(), None);
        assert_eq!(editor.world().mode, InteractionMode::PlacingNode);
        assert_eq!(editor.world().selection, Selection::Node(id));

        editor.handle_key("Escape", Modifiers::NONE);
        assert_eq!(editor.world().mode, InteractionMode::Idle);
        assert_eq!(editor.world().selection, Selection::None);
    }

    #[test]
    fn update_node_commits_only_real_changes() {
        let (mut editor, ids) = editor_with_nodes(&[(0.0, 0.0)]);
        let same = NodePatch {
            color: Some(NodeColor::default()),
            ..NodePatch::default()
        };
        assert!(!editor.update_node(ids[0], same).changed);
        assert!(!editor.history().can_undo());

        let rose = NodePatch {
            color: Some(NodeColor::Rose),
            ..NodePatch::default()
        };
        assert!(editor.update_node(ids[0], rose).changed);
        assert_eq!(editor.world().graph.node(ids[0]).unwrap().color, NodeColor::Rose);
        editor.undo();
        assert_eq!(editor.world().graph.node(ids[0]).unwrap().color, NodeColor::default());
    }

    #[test]
    fn delete_selected_edge() {
        let (mut editor, ids) = editor_with_nodes(&[(0.0, 0.0), (200.0, 0.0)]);
        let e = editor.world.graph.add_edge(ids[0], ids[1]).unwrap();
        editor.handle_event(&InputEvent::down(100.0, 0.0));
        assert_eq!(editor.world().selection, Selection::Edge(e));
        let out = editor.handle_key("Delete", Modifiers::NONE);
        assert!(out.changed);
        assert_eq!(editor.world().graph.edge_count(), 0);
        assert_eq!(editor.world().graph.node_count(), 2);
        assert_eq!(editor.world().selection, Selection::None);
    }

    #[test]
    fn delete_with_nothing_selected_is_no_op() {
        let (mut editor, _) = editor_with_nodes(&[(0.0, 0.0)]);
        assert_eq!(editor.handle_key("Backspace", Modifiers::NONE), Outcome::default());
        assert!(!editor.history().can_undo());
    }

    #[test]
    fn undo_ignored_while_dragging() {
        let (mut editor, ids) = editor_with_nodes(&[(0.0, 0.0)]);
        editor.update_node(
            ids[0],
            NodePatch {
                name: Some("a".into()),
                ..NodePatch::default()
            },
        );
        editor.handle_event(&InputEvent::down(0.0, 0.0));
        assert_eq!(editor.handle_key("z", Modifiers::CTRL), Outcome::default());
        assert_eq!(editor.world().graph.node(ids[0]).unwrap().name, "a");
    }

    #[test]
    fn form_edits_wait_for_drag_to_end() {
        let (mut editor, ids) = editor_with_nodes(&[(0.0, 0.0)]);
        let rename = NodePatch {
            name: Some("renamed".into()),
            ..NodePatch::default()
        };
        editor.handle_event(&InputEvent::down(0.0, 0.0));
        editor.handle_event(&InputEvent::moved(30.0, 0.0));
        assert_eq!(editor.update_node(ids[0], rename.clone()), Outcome::default());
        editor.handle_event(&InputEvent::up(30.0, 0.0));
        assert_eq!(editor.history().undo_depth(), 1);

        assert!(editor.update_node(ids[0], rename).changed);
        editor.undo();
        let node = editor.world().graph.node(ids[0]).unwrap();
        assert_eq!((node.position(), node.name.as_str()), (Point::new(30.0, 0.0), ""));
        editor.undo();
        let node = editor.world().graph.node(ids[0]).unwrap();
        assert_eq!((node.position(), node.name.as_str()), (Point::ZERO, ""));
        assert!(!editor.history().can_undo());
    }

    #[test]
    fn escape_after_blocked_edit_leaves_no_history() {
        let (mut editor, ids) = editor_with_nodes(&[(0.0, 0.0)]);
        editor.handle_event(&InputEvent::down(0.0, 0.0));
        editor.handle_event(&InputEvent::moved(30.0, 0.0));
        editor.update_node(
            ids[0],
            NodePatch {
                color: Some(NodeColor::Rose),
                ..NodePatch::default()
            },
        );
        editor.handle_key("Escape", Modifiers::NONE);
        let node = editor.world().graph.node(ids[0]).unwrap();
        assert_eq!((node.position(), node.color), (Point::ZERO, NodeColor::default()));
        assert!(!editor.history().can_undo());
    }

    #[test]
    fn keyboard_zoom_anchors_viewport_centre() {
        let mut editor = Editor::default();
        editor.resize(800.0, 600.0);
        editor.handle_key("=", Modifiers::CTRL);
        let t = editor.world().transform;
        let centre = Point::new(400.0, 300.0);
        let world = ng_core::screen_to_world(centre, &t);
        assert!((world.x - 400.0).abs() < 1e-6 && (world.y - 300.0).abs() < 1e-6);

        editor.handle_key("0", Modifiers::CTRL);
        assert_eq!(editor.world().transform, ViewTransform::IDENTITY);
    }

    #[test]
    fn revision_tracks_persistable_changes() {
        let (mut editor, _) = editor_with_nodes(&[(0.0, 0.0)]);
        let r0 = editor.revision();
        editor.handle_event(&InputEvent::down(0.0, 0.0));
        assert_eq!(editor.revision(), r0, "selection alone is not a change");
        editor.handle_event(&InputEvent::moved(5.0, 0.0));
        assert_eq!(editor.revision(), r0 + 1);
    }
}
