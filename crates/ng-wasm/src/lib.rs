//! WASM bridge for the node-graph editor.
//!
//! Compiled via `wasm-pack build --target web`. The page owns the canvas and
//! the DOM; it forwards input here and draws whatever `scene_json` returns.
//! Handlers return JSON strings so the JS side needs no generated types.

mod storage;

use ng_core::{EditorConfig, NodeId, NodePatch};
use ng_editor::{InputEvent, Modifiers, Outcome, PointerButton, ShortcutAction};
use ng_store::{KeyValueStore, Session, UnavailableStore};
use serde_json::json;
use storage::LocalStorage;
use wasm_bindgen::prelude::*;

type Backend = Box<dyn KeyValueStore>;

/// The main WASM-facing canvas controller.
///
/// Holds the open project session. All interaction from the page goes
/// through this struct.
#[wasm_bindgen]
pub struct NgCanvas {
    session: Session<Backend>,
}

#[wasm_bindgen]
impl NgCanvas {
    /// Open the last used project (or a fresh one) from `localStorage`.
    /// `config_json` optionally overrides editor settings.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64, config_json: Option<String>) -> Result<NgCanvas, JsError> {
        init_logging();

        let config = match config_json.as_deref().map(EditorConfig::from_json) {
            Some(Ok(config)) => config,
            Some(Err(e)) => {
                log::warn!("ignoring editor config: {e}");
                EditorConfig::default()
            }
            None => EditorConfig::default(),
        };

        let now = now_ms();
        let backend: Backend = match LocalStorage::open() {
            Some(storage) => Box::new(storage),
            None => Box::new(UnavailableStore),
        };
        let mut session = match Session::open(backend, config.clone(), now) {
            Ok(session) => session,
            Err(e) => {
                log::warn!("storage failed ({e}); continuing without persistence");
                let fallback: Backend = Box::new(UnavailableStore);
                Session::open(fallback, config, now)?
            }
        };
        session.resize(width, height);
        Ok(Self { session })
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.session.resize(width, height);
    }

    /// Everything the renderer needs, as JSON.
    pub fn scene_json(&self) -> String {
        serde_json::to_string(&self.session.editor().scene()).unwrap_or_default()
    }

    // ─── Pointer & keyboard ──────────────────────────────────────────────

    #[allow(clippy::too_many_arguments)]
    pub fn handle_pointer_down(
        &mut self,
        x: f64,
        y: f64,
        button: i16,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        self.handle(InputEvent::PointerDown {
            x,
            y,
            button: PointerButton::from_code(button),
            modifiers: modifiers(shift, ctrl, alt, meta),
        })
    }

    pub fn handle_pointer_move(
        &mut self,
        x: f64,
        y: f64,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        self.handle(InputEvent::PointerMove {
            x,
            y,
            modifiers: modifiers(shift, ctrl, alt, meta),
        })
    }

    pub fn handle_pointer_up(
        &mut self,
        x: f64,
        y: f64,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        self.handle(InputEvent::PointerUp {
            x,
            y,
            modifiers: modifiers(shift, ctrl, alt, meta),
        })
    }

    /// Pointer capture was lost (blur, `pointercancel`).
    pub fn handle_pointer_cancel(&mut self) -> String {
        self.handle(InputEvent::PointerCancel)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn handle_wheel(
        &mut self,
        x: f64,
        y: f64,
        delta_y: f64,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        self.handle(InputEvent::Wheel {
            x,
            y,
            delta_y,
            modifiers: modifiers(shift, ctrl, alt, meta),
        })
    }

    /// `key` is `KeyboardEvent.key`.
    pub fn handle_key(
        &mut self,
        key: &str,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        self.handle(InputEvent::key(key, modifiers(shift, ctrl, alt, meta)))
    }

    fn handle(&mut self, event: InputEvent) -> String {
        outcome_json(self.session.handle_event(&event, now_ms()))
    }

    // ─── Toolbar ─────────────────────────────────────────────────────────

    pub fn toggle_add_node(&mut self) -> String {
        self.action(ShortcutAction::ToggleAddNode)
    }

    pub fn toggle_connect(&mut self) -> String {
        self.action(ShortcutAction::ToggleConnect)
    }

    pub fn toggle_snap(&mut self) -> String {
        self.action(ShortcutAction::ToggleSnap)
    }

    pub fn undo(&mut self) -> String {
        self.action(ShortcutAction::Undo)
    }

    pub fn redo(&mut self) -> String {
        self.action(ShortcutAction::Redo)
    }

    pub fn delete_selection(&mut self) -> String {
        self.action(ShortcutAction::Delete)
    }

    pub fn reset_view(&mut self) -> String {
        self.action(ShortcutAction::ResetView)
    }

    fn action(&mut self, action: ShortcutAction) -> String {
        outcome_json(self.session.dispatch(action, now_ms()))
    }

    // ─── Settings form ───────────────────────────────────────────────────

    /// Apply `{"name"?, "color"?, "size"?}` to a node.
    pub fn update_node(&mut self, id: &str, patch_json: &str) -> String {
        match parse_patch(patch_json) {
            Ok(patch) => {
                outcome_json(self.session.update_node(NodeId::intern(id), patch, now_ms()))
            }
            Err(e) => error_json(&e),
        }
    }

    pub fn close_settings(&mut self) -> String {
        outcome_json(self.session.close_settings())
    }

    // ─── Persistence ─────────────────────────────────────────────────────

    /// Drive the debounced save. Call from a timer or animation frame with
    /// `Date.now()`. Returns `true` if the project was written.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        match self.session.tick(now_ms.max(0.0) as u64) {
            Ok(saved) => saved,
            Err(e) => {
                log::warn!("save failed: {e}");
                false
            }
        }
    }

    /// Write pending changes now (e.g. on `beforeunload`).
    pub fn flush(&mut self) -> String {
        result_json(self.session.flush(now_ms()).map(|_| ()))
    }

    pub fn list_projects(&self) -> String {
        match self.session.projects() {
            Ok(projects) => serde_json::to_string(&projects).unwrap_or_default(),
            Err(e) => error_json(&e),
        }
    }

    pub fn current_project(&self) -> String {
        serde_json::to_string(self.session.meta()).unwrap_or_default()
    }

    pub fn is_persistent(&self) -> bool {
        self.session.store().is_persistent()
    }

    pub fn open_project(&mut self, name: &str) -> String {
        result_json(self.session.switch_to(name, now_ms()))
    }

    pub fn create_project(&mut self, name: &str) -> String {
        result_json(self.session.create_project(name, now_ms()))
    }

    pub fn rename_project(&mut self, to: &str) -> String {
        result_json(self.session.rename(to, now_ms()))
    }

    pub fn delete_project(&mut self, name: &str) -> String {
        result_json(self.session.delete(name, now_ms()))
    }

    /// Returns `{"ok":true,"fileName":...,"json":...}` for a download.
    pub fn export_project(&mut self) -> String {
        match self.session.export(now_ms()) {
            Ok((file_name, json)) => {
                json!({ "ok": true, "fileName": file_name, "json": json }).to_string()
            }
            Err(e) => error_json(&e),
        }
    }

    /// Import an uploaded document and open it. A rejected document leaves
    /// the open project untouched.
    pub fn import_project(&mut self, json: &str) -> String {
        result_json(self.session.import(json, now_ms()))
    }
}

/// Initialize logging and panic hooks for the WASM target.
fn init_logging() {
    let _ = console_log::init_with_level(log::Level::Debug);
    console_error_panic_hook::set_once();
}

fn now_ms() -> u64 {
    js_sys::Date::now().max(0.0) as u64
}

fn modifiers(shift: bool, ctrl: bool, alt: bool, meta: bool) -> Modifiers {
    Modifiers {
        shift,
        ctrl,
        alt,
        meta,
    }
}

fn parse_patch(json: &str) -> Result<NodePatch, serde_json::Error> {
    serde_json::from_str(json)
}

fn outcome_json(outcome: Outcome) -> String {
    serde_json::to_string(&outcome).unwrap_or_default()
}

fn result_json<E: std::fmt::Display>(result: Result<(), E>) -> String {
    match result {
        Ok(()) => json!({ "ok": true }).to_string(),
        Err(e) => error_json(&e),
    }
}

fn error_json(e: &dyn std::fmt::Display) -> String {
    json!({ "ok": false, "error": e.to_string() }).to_string()
}
