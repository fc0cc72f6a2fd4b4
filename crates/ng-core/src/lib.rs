pub mod config;
pub mod error;
pub mod graph;
pub mod hit;
pub mod id;
pub mod model;
pub mod snapshot;
pub mod transform;
pub mod world;

pub use config::EditorConfig;
pub use error::CodecError;
pub use graph::Graph;
pub use hit::{HitTarget, hit_test};
pub use id::{EdgeId, NodeId};
pub use model::*;
pub use snapshot::{LoadedProject, ProjectMeta, SNAPSHOT_VERSION, Snapshot};
pub use transform::{ZoomDirection, screen_to_world, snap_to_grid, world_to_screen, zoom_at};
pub use world::{GraphMutation, InteractionMode, Selection, WorldState};

// Re-export geometry types so downstream crates don't need a direct dependency
pub use kurbo::Point;
