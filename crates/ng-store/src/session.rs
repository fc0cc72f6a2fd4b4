//! An open project: the editor, its backing store, and the debounced save.
//!
//! Every call takes `now_ms`, milliseconds since the Unix epoch, supplied by
//! the host. It drives both the save debounce and the `updatedAt` stamps.

use crate::debounce::Debouncer;
use crate::error::Result;
use crate::kv::KeyValueStore;
use crate::project::{ProjectEntry, ProjectStore};
use ng_core::snapshot::{LoadedProject, ProjectMeta};
use ng_core::{EditorConfig, NodeId, NodePatch};
use ng_editor::{Editor, InputEvent, Outcome, ShortcutAction};
use time::OffsetDateTime;

/// Convert host milliseconds to a UTC timestamp.
pub fn timestamp(now_ms: u64) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(now_ms) * 1_000_000)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

pub struct Session<S> {
    editor: Editor,
    store: ProjectStore<S>,
    meta: ProjectMeta,
    debouncer: Debouncer,
    /// Editor revision last written to the store.
    saved_revision: u64,
}

impl<S: KeyValueStore> Session<S> {
    /// Open the last used project, or create the first-run default.
    pub fn open(kv: S, config: EditorConfig, now_ms: u64) -> Result<Self> {
        let debouncer = Debouncer::new(config.save_debounce_ms);
        let mut store = ProjectStore::new(kv);
        let project = store.open_or_create_default(timestamp(now_ms))?;
        let mut session = Self {
            editor: Editor::new(config),
            store,
            meta: project.meta.clone(),
            debouncer,
            saved_revision: 0,
        };
        session.install(project);
        Ok(session)
    }

    fn install(&mut self, project: LoadedProject) {
        self.meta = project.meta.clone();
        self.editor.load(project);
        self.debouncer.cancel();
        self.saved_revision = self.editor.revision();
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn meta(&self) -> &ProjectMeta {
        &self.meta
    }

    pub fn store(&self) -> &ProjectStore<S> {
        &self.store
    }

    pub fn is_dirty(&self) -> bool {
        self.editor.revision() != self.saved_revision
    }

    pub fn save_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    // ─── Editing ─────────────────────────────────────────────────────────

    /// Run an editor operation, scheduling a save if it changed anything.
    pub fn edit(&mut self, now_ms: u64, f: impl FnOnce(&mut Editor) -> Outcome) -> Outcome {
        let outcome = f(&mut self.editor);
        if outcome.changed {
            self.debouncer.schedule(now_ms);
        }
        outcome
    }

    pub fn handle_event(&mut self, event: &InputEvent, now_ms: u64) -> Outcome {
        self.edit(now_ms, |editor| editor.handle_event(event))
    }

    pub fn dispatch(&mut self, action: ShortcutAction, now_ms: u64) -> Outcome {
        self.edit(now_ms, |editor| editor.dispatch(action))
    }

    pub fn update_node(&mut self, id: NodeId, patch: NodePatch, now_ms: u64) -> Outcome {
        self.edit(now_ms, |editor| editor.update_node(id, patch))
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.editor.resize(width, height);
    }

    pub fn close_settings(&mut self) -> Outcome {
        self.editor.close_settings()
    }

    // ─── Saving ──────────────────────────────────────────────────────────

    /// Write the project if the debounce deadline has passed.
    /// Returns whether a save happened. A failed write is retried one
    /// debounce delay later.
    pub fn tick(&mut self, now_ms: u64) -> Result<bool> {
        if !self.debouncer.poll(now_ms) {
            return Ok(false);
        }
        if let Err(e) = self.save(now_ms) {
            self.debouncer.schedule(now_ms);
            return Err(e);
        }
        Ok(true)
    }

    /// Write any unsaved change immediately.
    pub fn flush(&mut self, now_ms: u64) -> Result<bool> {
        self.debouncer.cancel();
        if !self.is_dirty() {
            return Ok(false);
        }
        self.save(now_ms)?;
        Ok(true)
    }

    fn save(&mut self, now_ms: u64) -> Result<()> {
        self.store
            .save(self.editor.world(), &mut self.meta, timestamp(now_ms))?;
        self.saved_revision = self.editor.revision();
        Ok(())
    }

    // ─── Project management ──────────────────────────────────────────────

    pub fn projects(&self) -> Result<Vec<ProjectEntry>> {
        self.store.list()
    }

    /// Switch to another stored project, saving the current one first.
    pub fn switch_to(&mut self, name: &str, now_ms: u64) -> Result<()> {
        self.flush(now_ms)?;
        let project = self.store.load(name)?;
        self.install(project);
        Ok(())
    }

    pub fn create_project(&mut self, name: &str, now_ms: u64) -> Result<()> {
        self.flush(now_ms)?;
        let project = self.store.create(name, timestamp(now_ms))?;
        self.install(project);
        Ok(())
    }

    /// Rename the open project.
    pub fn rename(&mut self, to: &str, now_ms: u64) -> Result<()> {
        self.flush(now_ms)?;
        self.meta = self.store.rename(&self.meta.name, to, timestamp(now_ms))?;
        Ok(())
    }

    /// Delete a project. Deleting the open one moves to the next available
    /// project, or a fresh default.
    pub fn delete(&mut self, name: &str, now_ms: u64) -> Result<()> {
        if name != self.meta.name {
            return self.store.delete(name);
        }
        self.debouncer.cancel();
        self.store.delete(name)?;
        let project = self.store.open_or_create_default(timestamp(now_ms))?;
        self.install(project);
        Ok(())
    }

    /// Import a document and open it. A rejected document leaves the open
    /// project untouched.
    pub fn import(&mut self, json: &str, now_ms: u64) -> Result<()> {
        // Validate before flushing so a bad file has no side effects.
        ng_core::snapshot::from_json(json)?;
        self.flush(now_ms)?;
        let project = self.store.import(json, timestamp(now_ms))?;
        self.install(project);
        Ok(())
    }

    /// Export the open project as `(file name, JSON text)`.
    pub fn export(&mut self, now_ms: u64) -> Result<(String, String)> {
        self.flush(now_ms)?;
        if self.store.is_persistent() {
            return self.store.export(&self.meta.name);
        }
        let snapshot = ng_core::snapshot::serialize(self.editor.world(), &self.meta);
        Ok((
            crate::project::export_file_name(&self.meta.name),
            ng_core::snapshot::to_json(&snapshot)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::kv::MemoryStore;
    use ng_editor::Modifiers;
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Memory store whose writes fail while `failing` is set.
    struct FlakyStore {
        inner: MemoryStore,
        failing: Rc<Cell<bool>>,
    }

    impl KeyValueStore for FlakyStore {
        fn get(&self, key: &str) -> Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            if self.failing.get() {
                return Err(StoreError::Backend("quota exceeded".into()));
            }
            self.inner.set(key, value)
        }

        fn remove(&mut self, key: &str) -> Result<()> {
            self.inner.remove(key)
        }
    }

    fn session() -> Session<MemoryStore> {
        Session::open(MemoryStore::new(), EditorConfig::default(), 1_000).unwrap()
    }

    fn stored(session: &Session<MemoryStore>, name: &str) -> LoadedProject {
        let (_, json) = session.store().export(name).unwrap();
        ng_core::snapshot::load_json(&json).unwrap()
    }

    fn add_node(session: &mut Session<MemoryStore>, x: f64, now_ms: u64) {
        session.dispatch(ShortcutAction::ToggleAddNode, now_ms);
        session.handle_event(&InputEvent::down(x, 0.0), now_ms);
        session.handle_event(&InputEvent::up(x, 0.0), now_ms);
        session.close_settings();
        session.dispatch(ShortcutAction::ToggleAddNode, now_ms);
    }

    #[test]
    fn timestamp_from_millis() {
        assert_eq!(timestamp(0), OffsetDateTime::UNIX_EPOCH);
        assert_eq!(timestamp(1_500).millisecond(), 500);
    }

    #[test]
    fn saves_only_after_quiet_period() {
        let mut s = session();
        add_node(&mut s, 0.0, 2_000);
        add_node(&mut s, 200.0, 2_300);
        assert!(s.is_dirty());
        assert!(!s.tick(2_700).unwrap());
        assert!(s.tick(2_800).unwrap());
        assert!(!s.is_dirty());
        assert!(!s.tick(5_000).unwrap(), "one save per burst");

        let project = stored(&s, &s.meta().name);
        assert_eq!(project.world.graph.node_count(), 2);
    }

    #[test]
    fn failed_save_is_retried() {
        let failing = Rc::new(Cell::new(false));
        let kv = FlakyStore {
            inner: MemoryStore::new(),
            failing: Rc::clone(&failing),
        };
        let mut s = Session::open(kv, EditorConfig::default(), 1_000).unwrap();
        s.dispatch(ShortcutAction::ToggleAddNode, 2_000);
        s.handle_event(&InputEvent::down(0.0, 0.0), 2_000);

        failing.set(true);
        assert!(matches!(s.tick(2_500), Err(StoreError::Backend(_))));
        assert!(s.is_dirty());
        assert!(s.save_pending());

        failing.set(false);
        assert!(!s.tick(2_900).unwrap());
        assert!(s.tick(3_000).unwrap());
        assert!(!s.is_dirty());
        assert!(!s.save_pending());
    }

    #[test]
    fn non_mutating_events_do_not_schedule() {
        let mut s = session();
        s.handle_event(&InputEvent::key("g", Modifiers::NONE), 2_000);
        assert!(!s.save_pending());
    }

    #[test]
    fn switching_flushes_pending_save() {
        let mut s = session();
        let first = s.meta().name.clone();
        add_node(&mut s, 0.0, 2_000);
        s.create_project("Second", 2_100).unwrap();
        assert_eq!(s.meta().name, "Second");
        assert!(!s.save_pending());

        s.switch_to(&first, 2_200).unwrap();
        assert_eq!(s.editor().world().graph.node_count(), 1);
        assert!(!s.editor().history().can_undo(), "history is per session");
    }

    #[test]
    fn deleting_open_project_falls_back() {
        let mut s = session();
        s.create_project("Other", 2_000).unwrap();
        s.delete("Other", 3_000).unwrap();
        assert_eq!(s.meta().name, "Untitled graph");
        assert_eq!(s.projects().unwrap().len(), 1);
    }

    #[test]
    fn rename_keeps_graph() {
        let mut s = session();
        add_node(&mut s, 0.0, 2_000);
        s.rename("Renamed", 2_100).unwrap();
        assert_eq!(s.meta().name, "Renamed");
        let names: Vec<_> = s.projects().unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["Renamed"]);
        assert_eq!(stored(&s, "Renamed").world.graph.node_count(), 1);
    }
}

