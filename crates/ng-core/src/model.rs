//! Core data model for node graphs.
//!
//! A graph is an ordered list of labeled circular nodes placed in world
//! space, plus an ordered list of undirected connections between them.
//! The view transform maps world space onto the screen.

use crate::id::{EdgeId, NodeId};
use kurbo::Point;
use serde::{Deserialize, Serialize};

// ─── Node attributes ─────────────────────────────────────────────────────

/// Node fill color, from a fixed palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeColor {
    #[default]
    Sky,
    Emerald,
    Amber,
    Rose,
    Violet,
}

impl NodeColor {
    pub const ALL: [NodeColor; 5] = [
        NodeColor::Sky,
        NodeColor::Emerald,
        NodeColor::Amber,
        NodeColor::Rose,
        NodeColor::Violet,
    ];

    /// Display color as `#RRGGBB`.
    pub fn to_hex(self) -> &'static str {
        match self {
            NodeColor::Sky => "#0EA5E9",
            NodeColor::Emerald => "#10B981",
            NodeColor::Amber => "#F59E0B",
            NodeColor::Rose => "#F43F5E",
            NodeColor::Violet => "#8B5CF6",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeColor::Sky => "sky",
            NodeColor::Emerald => "emerald",
            NodeColor::Amber => "amber",
            NodeColor::Rose => "rose",
            NodeColor::Violet => "violet",
        }
    }

    /// Parse a palette name (case-insensitive).
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(name))
    }
}

/// Node size class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeSize {
    #[default]
    Small,
    Medium,
    Large,
}

impl NodeSize {
    pub const ALL: [NodeSize; 3] = [NodeSize::Small, NodeSize::Medium, NodeSize::Large];

    /// Radius of the node circle in world units.
    pub fn radius(self) -> f64 {
        match self {
            NodeSize::Small => 20.0,
            NodeSize::Medium => 30.0,
            NodeSize::Large => 44.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            NodeSize::Small => "small",
            NodeSize::Medium => "medium",
            NodeSize::Large => "large",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(name))
    }
}

// ─── Nodes & Edges ───────────────────────────────────────────────────────

/// A node on the canvas. Position is its center in world space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub x: f64,
    pub y: f64,
    pub name: String,
    pub color: NodeColor,
    pub size: NodeSize,
}

impl Node {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn radius(&self) -> f64 {
        self.size.radius()
    }

    /// Apply every field set in `patch`.
    pub fn merge(&mut self, patch: &NodePatch) {
        if let Some(name) = &patch.name {
            self.name.clone_from(name);
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(size) = patch.size {
            self.size = size;
        }
        if let Some(pos) = patch.position {
            self.x = pos.x;
            self.y = pos.y;
        }
    }
}

/// Attributes for a freshly placed node.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodeAttrs {
    pub name: String,
    pub color: NodeColor,
    pub size: NodeSize,
}

impl NodeAttrs {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Partial update of a node; `None` fields are left untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NodePatch {
    pub name: Option<String>,
    pub color: Option<NodeColor>,
    pub size: Option<NodeSize>,
    #[serde(skip)]
    pub position: Option<Point>,
}

impl NodePatch {
    pub fn position(pos: Point) -> Self {
        Self {
            position: Some(pos),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none() && self.size.is_none() && self.position.is_none()
    }
}

/// An undirected connection between two distinct nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: EdgeId,
    pub from_id: NodeId,
    pub to_id: NodeId,
}

impl Edge {
    /// True if this edge joins `a` and `b`, in either direction.
    pub fn connects(&self, a: NodeId, b: NodeId) -> bool {
        (self.from_id == a && self.to_id == b) || (self.from_id == b && self.to_id == a)
    }

    pub fn touches(&self, id: NodeId) -> bool {
        self.from_id == id || self.to_id == id
    }
}

// ─── View transform ──────────────────────────────────────────────────────

pub const MIN_ZOOM: f64 = 0.25;
pub const MAX_ZOOM: f64 = 2.0;

/// Pan offset (screen pixels) and zoom factor of the canvas.
/// Screen = world * zoom + pan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewTransform {
    pub pan_x: f64,
    pub pan_y: f64,
    pub zoom: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ViewTransform {
    pub const IDENTITY: ViewTransform = ViewTransform {
        pan_x: 0.0,
        pan_y: 0.0,
        zoom: 1.0,
    };

    pub fn new(pan_x: f64, pan_y: f64, zoom: f64) -> Self {
        Self {
            pan_x,
            pan_y,
            zoom: clamp_zoom(zoom),
        }
    }

    /// Replace non-finite components and clamp zoom into range.
    pub fn sanitized(self) -> Self {
        let finite = |v: f64, fallback: f64| if v.is_finite() { v } else { fallback };
        Self {
            pan_x: finite(self.pan_x, 0.0),
            pan_y: finite(self.pan_y, 0.0),
            zoom: clamp_zoom(finite(self.zoom, 1.0)),
        }
    }
}

/// Clamp a zoom factor into `[MIN_ZOOM, MAX_ZOOM]`.
pub fn clamp_zoom(zoom: f64) -> f64 {
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_names_roundtrip() {
        for color in NodeColor::ALL {
            assert_eq!(NodeColor::from_name(color.as_str()), Some(color));
        }
        assert_eq!(NodeSize::from_name("LARGE"), Some(NodeSize::Large));
        assert_eq!(NodeColor::from_name("teal"), None);
    }

    #[test]
    fn attribute_serde_uses_lowercase() {
        assert_eq!(serde_json::to_string(&NodeColor::Emerald).unwrap(), "\"emerald\"");
        assert_eq!(serde_json::to_string(&NodeSize::Medium).unwrap(), "\"medium\"");
    }

    #[test]
    fn merge_applies_only_set_fields() {
        let mut node = Node {
            id: NodeId::intern("merge_me"),
            x: 1.0,
            y: 2.0,
            name: "A".into(),
            color: NodeColor::Sky,
            size: NodeSize::Small,
        };
        node.merge(&NodePatch {
            color: Some(NodeColor::Rose),
            ..NodePatch::default()
        });
        assert_eq!(node.name, "A");
        assert_eq!(node.color, NodeColor::Rose);
        assert_eq!((node.x, node.y), (1.0, 2.0));
    }

    #[test]
    fn edge_connects_either_direction() {
        let a = NodeId::intern("ea");
        let b = NodeId::intern("eb");
        let edge = Edge {
            id: EdgeId::intern("e_ab"),
            from_id: a,
            to_id: b,
        };
        assert!(edge.connects(a, b));
        assert!(edge.connects(b, a));
        assert!(!edge.connects(a, a));
    }

    #[test]
    fn sanitized_view_clamps_and_resets() {
        let v = ViewTransform {
            pan_x: f64::NAN,
            pan_y: 5.0,
            zoom: 10.0,
        }
        .sanitized();
        assert_eq!(v, ViewTransform { pan_x: 0.0, pan_y: 5.0, zoom: MAX_ZOOM });
    }
}
