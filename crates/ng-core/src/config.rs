//! Editor configuration.

use crate::transform::{GRID_STEP, ZOOM_STEP};
use serde::{Deserialize, Serialize};

/// Tunables for the editor, history, and persistence.
///
/// Every field has a default, so a partial JSON object is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Grid spacing in world units. Default: **40**.
    pub grid_step: f64,

    /// Snap placed and dragged nodes to the grid. Default: **false**.
    pub snap_to_grid: bool,

    /// Zoom multiplier per wheel notch. Default: **1.1**.
    pub zoom_step: f64,

    /// Maximum undo depth; the oldest entry is evicted first. Default: **100**.
    pub history_limit: usize,

    /// Quiet period before a change is persisted. Default: **500 ms**.
    pub save_debounce_ms: u64,

    /// Edge pick distance in screen pixels. Default: **6**.
    pub edge_hit_tolerance: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_step: GRID_STEP,
            snap_to_grid: false,
            zoom_step: ZOOM_STEP,
            history_limit: 100,
            save_debounce_ms: 500,
            edge_hit_tolerance: 6.0,
        }
    }
}

impl EditorConfig {
    /// Parse a (possibly partial) JSON config, then [`validated`](Self::validated).
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Self>(json).map(Self::validated)
    }

    /// Replace out-of-range values with their defaults.
    pub fn validated(self) -> Self {
        let defaults = Self::default();
        Self {
            grid_step: if self.grid_step.is_finite() && self.grid_step > 0.0 {
                self.grid_step
            } else {
                defaults.grid_step
            },
            zoom_step: if self.zoom_step.is_finite() && self.zoom_step > 1.0 {
                self.zoom_step
            } else {
                defaults.zoom_step
            },
            history_limit: self.history_limit.max(1),
            edge_hit_tolerance: if self.edge_hit_tolerance.is_finite()
                && self.edge_hit_tolerance >= 0.0
            {
                self.edge_hit_tolerance
            } else {
                defaults.edge_hit_tolerance
            },
            ..self
        }
    }
}
