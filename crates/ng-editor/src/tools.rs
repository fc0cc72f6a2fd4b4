//! Interaction modes for canvas input.
//!
//! [`interpret`] is a pure function of the current world and one input
//! event. It never mutates anything; it returns a [`Transition`] describing
//! the next mode, selection, graph mutations, and history bookkeeping, which
//! the [`Editor`](crate::editor::Editor) then applies.
//!
//! | Mode          | Pointer down on node | on edge     | on empty canvas        |
//! |---------------|----------------------|-------------|------------------------|
//! | Idle          | start drag           | select edge | clear selection, pan   |
//! | Placing node  | select node          | select edge | place node, open form  |
//! | Connecting    | pick source / target | reset source| reset source           |
//!
//! Dragging and panning capture the pointer: further presses are ignored
//! until the gesture ends.

use crate::input::{InputEvent, PointerButton};
use ng_core::transform::{screen_to_world, snap_point, zoom_at_step};
use ng_core::{
    EditorConfig, GraphMutation, HitTarget, InteractionMode, NodeAttrs, NodeId, NodePatch, Point,
    Selection, ViewTransform, WorldState, ZoomDirection, hit_test,
};

/// Editor settings the interaction modes depend on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ToolContext {
    pub snap_to_grid: bool,
    pub grid_step: f64,
    pub zoom_step: f64,
    /// Edge pick distance in screen pixels.
    pub edge_hit_tolerance: f64,
}

impl ToolContext {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            snap_to_grid: config.snap_to_grid,
            grid_step: config.grid_step,
            zoom_step: config.zoom_step,
            edge_hit_tolerance: config.edge_hit_tolerance,
        }
    }

    fn place(&self, p: Point) -> Point {
        if self.snap_to_grid {
            snap_point(p, self.grid_step)
        } else {
            p
        }
    }
}

impl Default for ToolContext {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

/// What the history should do around a transition's mutations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryOp {
    #[default]
    None,
    /// Record the current state, then apply the mutations.
    Commit,
    /// Capture the current state as the start of a gesture.
    BeginGesture,
    /// Apply the mutations, then record the gesture if anything moved.
    EndGesture,
}

/// Side effects outside the world state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolEffect {
    /// Open the settings form for a freshly placed node.
    OpenSettings(NodeId),
}

/// The outcome of interpreting one input event.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Transition {
    /// Next mode; `None` keeps the current one.
    pub mode: Option<InteractionMode>,
    /// New selection; `None` keeps the current one.
    pub selection: Option<Selection>,
    pub mutations: Vec<GraphMutation>,
    pub history: HistoryOp,
    pub effect: Option<ToolEffect>,
}

impl Transition {
    pub fn none() -> Self {
        Self::default()
    }

    fn mode(mode: InteractionMode) -> Self {
        Self {
            mode: Some(mode),
            ..Self::default()
        }
    }

    fn select(selection: Selection) -> Self {
        Self {
            selection: Some(selection),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.mode.is_none()
            && self.selection.is_none()
            && self.mutations.is_empty()
            && self.history == HistoryOp::None
            && self.effect.is_none()
    }
}

/// Interpret a pointer or wheel event against the current world.
/// Key events yield an empty transition; they go through the shortcut map.
pub fn interpret(world: &WorldState, ctx: &ToolContext, event: &InputEvent) -> Transition {
    match event {
        InputEvent::PointerDown { x, y, button, .. } => {
            if *button != PointerButton::Primary || world.mode.is_capturing() {
                return Transition::none();
            }
            pointer_down(world, ctx, Point::new(*x, *y))
        }
        InputEvent::PointerMove { x, y, .. } => pointer_move(world, Point::new(*x, *y)),
        InputEvent::PointerUp { .. } => pointer_up(world, ctx, true),
        InputEvent::PointerCancel => pointer_up(world, ctx, false),
        InputEvent::Wheel {
            x,
            y,
            delta_y,
            modifiers,
        } => {
            // Plain scrolling never zooms.
            if !modifiers.command() {
                return Transition::none();
            }
            match ZoomDirection::from_wheel_delta(*delta_y) {
                Some(dir) => {
                    let next = zoom_at_step(Point::new(*x, *y), &world.transform, dir, ctx.zoom_step);
                    set_transform(next)
                }
                None => Transition::none(),
            }
        }
        InputEvent::Key { .. } => Transition::none(),
    }
}

/// Flip `Idle ⇄ PlacingNode`. Any other mode switches to placing.
pub fn toggle_add_node(mode: InteractionMode) -> InteractionMode {
    match mode {
        InteractionMode::PlacingNode => InteractionMode::Idle,
        _ => InteractionMode::PlacingNode,
    }
}

/// Flip `Idle ⇄ Connecting(none)`. Any other mode switches to connecting.
pub fn toggle_connect(mode: InteractionMode) -> InteractionMode {
    match mode {
        InteractionMode::Connecting { .. } => InteractionMode::Idle,
        _ => InteractionMode::Connecting { source: None },
    }
}

// ─── Pointer down ────────────────────────────────────────────────────────

fn pointer_down(world: &WorldState, ctx: &ToolContext, screen: Point) -> Transition {
    let point = screen_to_world(screen, &world.transform);
    let tolerance = ctx.edge_hit_tolerance / world.transform.zoom;
    let hit = hit_test(&world.graph, point, tolerance);

    match world.mode {
        InteractionMode::Idle => match hit {
            Some(HitTarget::Node(id)) => {
                let origin = world.graph.node(id).map_or(point, |n| n.position());
                log::debug!("drag start {id}");
                Transition {
                    mode: Some(InteractionMode::DraggingNode {
                        id,
                        last: screen,
                        origin,
                    }),
                    selection: Some(Selection::Node(id)),
                    history: HistoryOp::BeginGesture,
                    ..Transition::default()
                }
            }
            Some(HitTarget::Edge(id)) => Transition::select(Selection::Edge(id)),
            None => Transition {
                mode: Some(InteractionMode::Panning { last: screen }),
                selection: Some(Selection::None),
                ..Transition::default()
            },
        },
        InteractionMode::PlacingNode => match hit {
            Some(HitTarget::Node(id)) => Transition::select(Selection::Node(id)),
            Some(HitTarget::Edge(id)) => Transition::select(Selection::Edge(id)),
            None => place_node(world, ctx, point),
        },
        InteractionMode::Connecting { source } => match (hit, source) {
            (Some(HitTarget::Node(id)), None) => {
                Transition::mode(InteractionMode::Connecting { source: Some(id) })
            }
            (Some(HitTarget::Node(id)), Some(src)) if id == src => {
                Transition::mode(InteractionMode::Connecting { source: None })
            }
            (Some(HitTarget::Node(id)), Some(src)) => {
                let mut t = Transition::mode(InteractionMode::Connecting { source: None });
                if world.graph.can_connect(src, id) {
                    t.mutations.push(GraphMutation::AddEdge { from: src, to: id });
                    t.history = HistoryOp::Commit;
                }
                t
            }
            (_, Some(_)) => Transition::mode(InteractionMode::Connecting { source: None }),
            (_, None) => Transition::none(),
        },
        InteractionMode::DraggingNode { .. } | InteractionMode::Panning { .. } => {
            Transition::none()
        }
    }
}

fn place_node(world: &WorldState, ctx: &ToolContext, point: Point) -> Transition {
    let id = NodeId::generate();
    let attrs = NodeAttrs::named(format!("Node {}", world.graph.node_count() + 1));
    Transition {
        selection: Some(Selection::Node(id)),
        mutations: vec![GraphMutation::AddNode {
            id,
            position: ctx.place(point),
            attrs,
        }],
        history: HistoryOp::Commit,
        effect: Some(ToolEffect::OpenSettings(id)),
        ..Transition::default()
    }
}

// ─── Pointer move / up ───────────────────────────────────────────────────

fn pointer_move(world: &WorldState, screen: Point) -> Transition {
    match world.mode {
        InteractionMode::DraggingNode { id, last, origin } => {
            // Screen delta scaled to world units keeps the node under the pointer.
            let delta = (screen - last) / world.transform.zoom;
            log::trace!("drag {id} by ({}, {})", delta.x, delta.y);
            Transition {
                mode: Some(InteractionMode::DraggingNode {
                    id,
                    last: screen,
                    origin,
                }),
                mutations: vec![GraphMutation::MoveNode {
                    id,
                    dx: delta.x,
                    dy: delta.y,
                }],
                ..Transition::default()
            }
        }
        InteractionMode::Panning { last } => {
            let delta = screen - last;
            let t = world.transform;
            let mut transition = set_transform(ViewTransform {
                pan_x: t.pan_x + delta.x,
                pan_y: t.pan_y + delta.y,
                zoom: t.zoom,
            });
            transition.mode = Some(InteractionMode::Panning { last: screen });
            transition
        }
        _ => Transition::none(),
    }
}

fn pointer_up(world: &WorldState, ctx: &ToolContext, snap: bool) -> Transition {
    match world.mode {
        InteractionMode::DraggingNode { id, .. } => {
            let mut t = Transition {
                mode: Some(InteractionMode::Idle),
                history: HistoryOp::EndGesture,
                ..Transition::default()
            };
            if snap
                && ctx.snap_to_grid
                && let Some(node) = world.graph.node(id)
            {
                let snapped = ctx.place(node.position());
                if snapped != node.position() {
                    t.mutations.push(GraphMutation::UpdateNode {
                        id,
                        patch: NodePatch::position(snapped),
                    });
                }
            }
            log::debug!("drag end {id}");
            t
        }
        InteractionMode::Panning { .. } => Transition::mode(InteractionMode::Idle),
        _ => Transition::none(),
    }
}

fn set_transform(t: ViewTransform) -> Transition {
    Transition {
        mutations: vec![GraphMutation::SetTransform(t)],
        ..Transition::default()
    }
}
