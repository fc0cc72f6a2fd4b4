pub mod commands;
pub mod editor;
pub mod input;
pub mod shortcuts;
pub mod tools;
pub mod view;

pub use commands::{HistoryEntry, HistoryStack};
pub use editor::{Editor, Outcome};
pub use input::{InputEvent, Modifiers, PointerButton};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use tools::{ToolContext, Transition};
pub use view::SceneView;
