//! Keyboard shortcut mapping.
//!
//! Maps key + modifier combos to semantic `ShortcutAction`s.
//! The shortcut map lives in Rust so it's shared across WASM and native.

use crate::input::Modifiers;

/// Actions that keyboard shortcuts can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    // ── Modes ──
    ToggleAddNode,
    ToggleConnect,
    ToggleSnap,
    /// Close the settings form, or drop selection and return to idle.
    Cancel,

    // ── Edit ──
    Undo,
    Redo,
    Delete,

    // ── View ──
    ZoomIn,
    ZoomOut,
    ResetView,
}

impl ShortcutAction {
    pub fn name(self) -> &'static str {
        match self {
            ShortcutAction::ToggleAddNode => "toggleAddNode",
            ShortcutAction::ToggleConnect => "toggleConnect",
            ShortcutAction::ToggleSnap => "toggleSnap",
            ShortcutAction::Cancel => "cancel",
            ShortcutAction::Undo => "undo",
            ShortcutAction::Redo => "redo",
            ShortcutAction::Delete => "delete",
            ShortcutAction::ZoomIn => "zoomIn",
            ShortcutAction::ZoomOut => "zoomOut",
            ShortcutAction::ResetView => "resetView",
        }
    }
}

/// Resolves key events into shortcut actions.
///
/// Uses platform-aware modifier detection: on macOS `meta` is ⌘,
/// on other platforms `ctrl` serves the same role.
pub struct ShortcutMap;

impl ShortcutMap {
    /// Resolve a key event to an action.
    ///
    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `"Delete"`).
    /// Returns `None` if the key combo has no binding.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        let cmd = modifiers.command();

        // ── Modifier combos first (most specific) ──
        if cmd && modifiers.shift {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Redo),
                // `+` is shifted `=` on US layouts.
                "+" => Some(ShortcutAction::ZoomIn),
                _ => None,
            };
        }

        if cmd {
            return match key {
                "z" | "Z" => Some(ShortcutAction::Undo),
                "y" | "Y" => Some(ShortcutAction::Redo),
                "=" | "+" => Some(ShortcutAction::ZoomIn),
                "-" => Some(ShortcutAction::ZoomOut),
                "0" => Some(ShortcutAction::ResetView),
                _ => None,
            };
        }

        if modifiers.alt {
            return None;
        }

        // ── Single keys ──
        match key {
            "Escape" => Some(ShortcutAction::Cancel),
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "g" | "G" => Some(ShortcutAction::ToggleSnap),
            "n" | "N" => Some(ShortcutAction::ToggleAddNode),
            "c" | "C" => Some(ShortcutAction::ToggleConnect),
            _ => None,
        }
    }
}
