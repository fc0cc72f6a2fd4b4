//! Named projects on top of a [`KeyValueStore`].
//!
//! Layout:
//! - `ng:project:<name>` holds one snapshot document per project,
//! - `ng:projects` holds the index (`[{name, id, updatedAt}]`),
//! - `ng:last-project` names the project to reopen on start.

use crate::error::{Result, StoreError};
use crate::kv::KeyValueStore;
use ng_core::snapshot::{self, LoadedProject, ProjectMeta};
use ng_core::WorldState;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

pub const PROJECT_PREFIX: &str = "ng:project:";
pub const INDEX_KEY: &str = "ng:projects";
pub const LAST_PROJECT_KEY: &str = "ng:last-project";
pub const DEFAULT_PROJECT_NAME: &str = "Untitled graph";

pub fn project_key(name: &str) -> String {
    format!("{PROJECT_PREFIX}{name}")
}

/// One row of the project index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectEntry {
    pub name: String,
    pub id: String,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<&ProjectMeta> for ProjectEntry {
    fn from(meta: &ProjectMeta) -> Self {
        Self {
            name: meta.name.clone(),
            id: meta.id.clone(),
            updated_at: meta.updated_at,
        }
    }
}

pub struct ProjectStore<S> {
    kv: S,
}

impl<S: KeyValueStore> ProjectStore<S> {
    pub fn new(kv: S) -> Self {
        if !kv.is_available() {
            log::warn!("storage unavailable; projects will not be saved");
        }
        Self { kv }
    }

    pub fn is_persistent(&self) -> bool {
        self.kv.is_available()
    }

    pub fn backend(&self) -> &S {
        &self.kv
    }

    // ─── Index ───────────────────────────────────────────────────────────

    fn read_index(&self) -> Result<Vec<ProjectEntry>> {
        let Some(raw) = self.kv.get(INDEX_KEY)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(index) => Ok(index),
            Err(e) => {
                log::warn!("discarding unreadable project index: {e}");
                Ok(Vec::new())
            }
        }
    }

    fn write_index(&mut self, index: &[ProjectEntry]) -> Result<()> {
        let raw = serde_json::to_string(index)?;
        self.kv.set(INDEX_KEY, &raw)
    }

    fn upsert_index(&mut self, entry: ProjectEntry) -> Result<()> {
        let mut index = self.read_index()?;
        index.retain(|e| e.name != entry.name);
        index.push(entry);
        self.write_index(&index)
    }

    /// All projects, most recently updated first.
    pub fn list(&self) -> Result<Vec<ProjectEntry>> {
        let mut index = self.read_index()?;
        index.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(index)
    }

    pub fn exists(&self, name: &str) -> Result<bool> {
        Ok(self.read_index()?.iter().any(|e| e.name == name))
    }

    /// `base` if free, else the first free `"base (n)"` for n = 2, 3, ...
    pub fn unique_name(&self, base: &str) -> Result<String> {
        let index = self.read_index()?;
        let taken = |name: &str| index.iter().any(|e| e.name == name);
        if !taken(base) {
            return Ok(base.to_string());
        }
        let mut n = 2usize;
        loop {
            let candidate = format!("{base} ({n})");
            if !taken(&candidate) {
                return Ok(candidate);
            }
            n += 1;
        }
    }

    pub fn last_opened(&self) -> Result<Option<String>> {
        self.kv.get(LAST_PROJECT_KEY)
    }

    fn set_last_opened(&mut self, name: &str) -> Result<()> {
        self.kv.set(LAST_PROJECT_KEY, name)
    }

    // ─── Projects ────────────────────────────────────────────────────────

    fn write_document(&mut self, world: &WorldState, meta: &ProjectMeta) -> Result<()> {
        let json = snapshot::to_json(&snapshot::serialize(world, meta))?;
        self.kv.set(&project_key(&meta.name), &json)?;
        self.upsert_index(ProjectEntry::from(meta))
    }

    /// Create an empty project and make it the last opened one.
    /// A blank name falls back to a unique default name.
    pub fn create(&mut self, name: &str, now: OffsetDateTime) -> Result<LoadedProject> {
        let name = match name.trim() {
            "" => self.unique_name(DEFAULT_PROJECT_NAME)?,
            trimmed if self.exists(trimmed)? => {
                return Err(StoreError::NameTaken(trimmed.to_string()));
            }
            trimmed => trimmed.to_string(),
        };
        let meta = ProjectMeta::new(name, now);
        let world = WorldState::new();
        self.write_document(&world, &meta)?;
        self.set_last_opened(&meta.name)?;
        log::debug!("created project {:?}", meta.name);
        Ok(LoadedProject {
            meta,
            world,
            repaired: 0,
        })
    }

    /// Load a project and make it the last opened one.
    pub fn load(&mut self, name: &str) -> Result<LoadedProject> {
        let json = self
            .kv
            .get(&project_key(name))?
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        let mut project = snapshot::load_json(&json)?;
        // The key is authoritative if the document disagrees.
        if project.meta.name != name {
            log::debug!("project {name:?} stored as {:?}", project.meta.name);
            project.meta.name = name.to_string();
        }
        self.set_last_opened(name)?;
        Ok(project)
    }

    /// Persist `world` under `meta.name`, stamping `updated_at`.
    pub fn save(
        &mut self,
        world: &WorldState,
        meta: &mut ProjectMeta,
        now: OffsetDateTime,
    ) -> Result<()> {
        meta.updated_at = now;
        self.write_document(world, meta)?;
        log::debug!(
            "saved {:?} ({} nodes, {} edges)",
            meta.name,
            world.graph.node_count(),
            world.graph.edge_count()
        );
        Ok(())
    }

    /// Rename a stored project. Returns its updated metadata.
    pub fn rename(&mut self, from: &str, to: &str, now: OffsetDateTime) -> Result<ProjectMeta> {
        let to = to.trim();
        if to == from {
            return Ok(self.load(from)?.meta);
        }
        if to.is_empty() || self.exists(to)? {
            return Err(StoreError::NameTaken(to.to_string()));
        }
        let LoadedProject {
            mut meta, world, ..
        } = self.load(from)?;
        meta.name = to.to_string();
        meta.updated_at = now;
        self.write_document(&world, &meta)?;
        self.remove_entry(from)?;
        self.set_last_opened(to)?;
        log::debug!("renamed project {from:?} to {to:?}");
        Ok(meta)
    }

    fn remove_entry(&mut self, name: &str) -> Result<()> {
        self.kv.remove(&project_key(name))?;
        let mut index = self.read_index()?;
        index.retain(|e| e.name != name);
        self.write_index(&index)
    }

    /// Delete a project. Clears the last-opened pointer if it named it.
    pub fn delete(&mut self, name: &str) -> Result<()> {
        if !self.exists(name)? && self.kv.get(&project_key(name))?.is_none() {
            return Err(StoreError::NotFound(name.to_string()));
        }
        self.remove_entry(name)?;
        if self.last_opened()?.as_deref() == Some(name) {
            self.kv.remove(LAST_PROJECT_KEY)?;
        }
        log::debug!("deleted project {name:?}");
        Ok(())
    }

    /// The stored document for `name` and a download file name for it.
    pub fn export(&self, name: &str) -> Result<(String, String)> {
        let json = self
            .kv
            .get(&project_key(name))?
            .ok_or_else(|| StoreError::NotFound(name.to_string()))?;
        Ok((export_file_name(name), json))
    }

    /// Import a snapshot document as a new project with a fresh id and a
    /// unique name. Invalid documents leave storage untouched.
    pub fn import(&mut self, json: &str, now: OffsetDateTime) -> Result<LoadedProject> {
        let mut project = snapshot::load_json(json).inspect_err(|e| {
            log::warn!("rejected import: {e}");
        })?;
        let base = match project.meta.name.trim() {
            "" => DEFAULT_PROJECT_NAME.to_string(),
            name => name.to_string(),
        };
        project.meta.name = self.unique_name(&base)?;
        project.meta.id = Uuid::new_v4().to_string();
        project.meta.updated_at = now;
        self.write_document(&project.world, &project.meta)?;
        self.set_last_opened(&project.meta.name)?;
        log::debug!("imported project as {:?}", project.meta.name);
        Ok(project)
    }

    /// The project to show on start: the last opened one, else the most
    /// recently updated loadable one, else a fresh default project.
    pub fn open_or_create_default(&mut self, now: OffsetDateTime) -> Result<LoadedProject> {
        if let Some(name) = self.last_opened()? {
            match self.load(&name) {
                Ok(project) => return Ok(project),
                Err(e) => log::warn!("cannot reopen {name:?}: {e}"),
            }
        }
        for entry in self.list()? {
            match self.load(&entry.name) {
                Ok(project) => return Ok(project),
                Err(e) => log::warn!("skipping {:?}: {e}", entry.name),
            }
        }
        self.create("", now)
    }
}

/// `<name>.json` with path separators and control characters replaced.
pub fn export_file_name(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    if stem.is_empty() {
        "graph.json".to_string()
    } else {
        format!("{stem}.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::{MemoryStore, UnavailableStore};
    use pretty_assertions::assert_eq;
    use time::macros::datetime;

    const T0: OffsetDateTime = datetime!(2024-05-01 12:00 UTC);
    const T1: OffsetDateTime = datetime!(2024-05-02 12:00 UTC);

    #[test]
    fn first_run_creates_default() {
        let mut store = ProjectStore::new(MemoryStore::new());
        let project = store.open_or_create_default(T0).unwrap();
        assert_eq!(project.meta.name, DEFAULT_PROJECT_NAME);
        assert_eq!(store.last_opened().unwrap().as_deref(), Some(DEFAULT_PROJECT_NAME));
        assert_eq!(store.list().unwrap().len(), 1);

        // Second start reopens it instead of creating another.
        let again = store.open_or_create_default(T1).unwrap();
        assert_eq!(again.meta.id, project.meta.id);
        assert_eq!(store.list().unwrap().len(), 1);
    }

    #[test]
    fn unique_names_are_suffixed() {
        let mut store = ProjectStore::new(MemoryStore::new());
        store.create("Plan", T0).unwrap();
        assert_eq!(store.unique_name("Plan").unwrap(), "Plan (2)");
        store.create("Plan (2)", T0).unwrap();
        assert_eq!(store.unique_name("Plan").unwrap(), "Plan (3)");
        assert!(matches!(
            store.create("Plan", T0),
            Err(StoreError::NameTaken(name)) if name == "Plan"
        ));
    }

    #[test]
    fn list_is_most_recent_first() {
        let mut store = ProjectStore::new(MemoryStore::new());
        let mut a = store.create("a", T0).unwrap();
        store.create("b", T0).unwrap();
        store.save(&a.world, &mut a.meta, T1).unwrap();
        let names: Vec<_> = store.list().unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn rename_moves_document_and_pointer() {
        let mut store = ProjectStore::new(MemoryStore::new());
        store.create("old", T0).unwrap();
        let meta = store.rename("old", "new", T1).unwrap();
        assert_eq!(meta.name, "new");
        assert!(!store.exists("old").unwrap());
        assert!(store.backend().get(&project_key("old")).unwrap().is_none());
        assert_eq!(store.load("new").unwrap().meta.id, meta.id);
        assert_eq!(store.last_opened().unwrap().as_deref(), Some("new"));
    }

    #[test]
    fn delete_clears_pointer() {
        let mut store = ProjectStore::new(MemoryStore::new());
        store.create("gone", T0).unwrap();
        store.delete("gone").unwrap();
        assert_eq!(store.last_opened().unwrap(), None);
        assert!(store.list().unwrap().is_empty());
        assert!(matches!(store.delete("gone"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn import_renames_on_collision() {
        let mut store = ProjectStore::new(MemoryStore::new());
        let original = store.create("Shared", T0).unwrap();
        let (file, json) = store.export("Shared").unwrap();
        assert_eq!(file, "Shared.json");

        let imported = store.import(&json, T1).unwrap();
        assert_eq!(imported.meta.name, "Shared (2)");
        assert_ne!(imported.meta.id, original.meta.id);
        assert_eq!(store.list().unwrap().len(), 2);
    }

    #[test]
    fn unavailable_store_still_opens() {
        let mut store = ProjectStore::new(UnavailableStore);
        assert!(!store.is_persistent());
        let mut project = store.open_or_create_default(T0).unwrap();
        store.save(&project.world, &mut project.meta, T1).unwrap();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn corrupt_index_is_discarded() {
        let mut kv = MemoryStore::new();
        kv.set(INDEX_KEY, "not json").unwrap();
        let store = ProjectStore::new(kv);
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn export_names_are_file_safe() {
        assert_eq!(export_file_name("a/b: c"), "a_b_ c.json");
        assert_eq!(export_file_name("   "), "graph.json");
    }
}
