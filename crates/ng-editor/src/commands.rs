//! Undo/Redo history.
//!
//! Snapshot-based: each entry is an independent copy of the graph and view
//! transform as they stood *before* an action. Interaction mode, gesture
//! data, and selection are never recorded.
//!
//! Drag gestures use **snapshot batching**: the state is captured when the
//! gesture starts and pushed once when it ends, so a whole drag undoes in a
//! single step regardless of how many pointer moves it took.

use ng_core::{Graph, ViewTransform, WorldState};
use std::collections::VecDeque;
use std::sync::Arc;

/// One recorded world state.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub transform: ViewTransform,
    pub graph: Graph,
}

impl HistoryEntry {
    pub fn capture(world: &WorldState) -> Arc<Self> {
        Arc::new(Self {
            transform: world.transform,
            graph: world.graph.clone(),
        })
    }

    /// Write this entry back into `world`, clearing selection and gesture data.
    pub fn restore(&self, world: &mut WorldState) {
        world.transform = self.transform;
        world.graph = self.graph.clone();
        world.clear_transient();
    }
}

/// Manages undo/redo stacks with batch grouping for drag gestures.
pub struct HistoryStack {
    undo_stack: VecDeque<Arc<HistoryEntry>>,
    redo_stack: Vec<Arc<HistoryEntry>>,
    /// Maximum undo depth.
    max_depth: usize,
    /// State captured at the start of an in-progress gesture.
    gesture: Option<Arc<HistoryEntry>>,
}

impl HistoryStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo_stack: VecDeque::with_capacity(max_depth.min(128)),
            redo_stack: Vec::new(),
            max_depth: max_depth.max(1),
            gesture: None,
        }
    }

    /// Record `world` as the state before a discrete action. Must be called
    /// immediately before the action is applied. Clears the redo stack.
    pub fn commit(&mut self, world: &WorldState) {
        self.push(HistoryEntry::capture(world));
    }

    fn push(&mut self, entry: Arc<HistoryEntry>) {
        self.undo_stack.push_back(entry);
        while self.undo_stack.len() > self.max_depth {
            self.undo_stack.pop_front();
        }
        // Clear redo stack on new action
        self.redo_stack.clear();
    }

    /// Start a gesture. Captures the current state; intermediate frames are
    /// applied live but not recorded.
    pub fn begin_gesture(&mut self, world: &WorldState) {
        if self.gesture.is_none() {
            self.gesture = Some(HistoryEntry::capture(world));
        }
    }

    /// End a gesture. Pushes the captured state only if the graph actually
    /// changed since the gesture began. Returns whether an entry was pushed.
    pub fn end_gesture(&mut self, world: &WorldState) -> bool {
        let Some(before) = self.gesture.take() else {
            return false;
        };
        if before.graph == world.graph {
            return false;
        }
        self.push(before);
        true
    }

    /// Abandon a gesture without recording it, returning the state captured
    /// at its start so the caller can roll back.
    pub fn cancel_gesture(&mut self) -> Option<Arc<HistoryEntry>> {
        self.gesture.take()
    }

    pub fn in_gesture(&self) -> bool {
        self.gesture.is_some()
    }

    /// Step back one entry. No-op (returns `false`) on an empty stack.
    pub fn undo(&mut self, world: &mut WorldState) -> bool {
        let Some(entry) = self.undo_stack.pop_back() else {
            return false;
        };
        self.gesture = None;
        self.redo_stack.push(HistoryEntry::capture(world));
        entry.restore(world);
        true
    }

    /// Re-apply the last undone entry. No-op on an empty redo stack.
    pub fn redo(&mut self, world: &mut WorldState) -> bool {
        let Some(entry) = self.redo_stack.pop() else {
            return false;
        };
        self.gesture = None;
        self.undo_stack.push_back(HistoryEntry::capture(world));
        entry.restore(world);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Forget everything (e.g. when another project is opened).
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.gesture = None;
    }
}
