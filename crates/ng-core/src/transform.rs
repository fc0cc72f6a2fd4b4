//! Screen ↔ world coordinate mapping.
//!
//! The canvas is rendered pan-then-scale with the origin at the top-left of
//! the viewport: `screen = world * zoom + pan`. Every function here is pure.

use crate::model::{ViewTransform, clamp_zoom};
use kurbo::Point;

/// Multiplicative zoom change per discrete wheel notch.
pub const ZOOM_STEP: f64 = 1.1;

/// Default grid spacing in world units.
pub const GRID_STEP: f64 = 40.0;

/// Which way a discrete zoom input goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomDirection {
    In,
    Out,
}

impl ZoomDirection {
    /// Wheel convention: scrolling up (negative delta) zooms in.
    pub fn from_wheel_delta(delta_y: f64) -> Option<Self> {
        if delta_y < 0.0 {
            Some(ZoomDirection::In)
        } else if delta_y > 0.0 {
            Some(ZoomDirection::Out)
        } else {
            None
        }
    }

    fn factor(self, step: f64) -> f64 {
        match self {
            ZoomDirection::In => step,
            ZoomDirection::Out => 1.0 / step,
        }
    }
}

/// Map a viewport pointer position to world coordinates.
pub fn screen_to_world(screen: Point, t: &ViewTransform) -> Point {
    Point::new((screen.x - t.pan_x) / t.zoom, (screen.y - t.pan_y) / t.zoom)
}

/// Map a world position to viewport coordinates. Inverse of [`screen_to_world`].
pub fn world_to_screen(world: Point, t: &ViewTransform) -> Point {
    Point::new(world.x * t.zoom + t.pan_x, world.y * t.zoom + t.pan_y)
}

/// Zoom one step in `direction`, keeping the world point under `cursor` fixed.
pub fn zoom_at(cursor: Point, t: &ViewTransform, direction: ZoomDirection) -> ViewTransform {
    zoom_at_step(cursor, t, direction, ZOOM_STEP)
}

/// Like [`zoom_at`] with a caller-chosen step factor (must be > 1).
pub fn zoom_at_step(
    cursor: Point,
    t: &ViewTransform,
    direction: ZoomDirection,
    step: f64,
) -> ViewTransform {
    zoom_to(cursor, t, t.zoom * direction.factor(step))
}

/// Set the zoom level (clamped), keeping the world point under `cursor` fixed.
pub fn zoom_to(cursor: Point, t: &ViewTransform, zoom: f64) -> ViewTransform {
    let anchor = screen_to_world(cursor, t);
    let zoom = clamp_zoom(zoom);
    ViewTransform {
        pan_x: cursor.x - anchor.x * zoom,
        pan_y: cursor.y - anchor.y * zoom,
        zoom,
    }
}

/// Round `value` to the nearest multiple of `step`. Non-positive steps
/// disable snapping.
pub fn snap_to_grid(value: f64, step: f64) -> f64 {
    if step <= 0.0 || !step.is_finite() {
        return value;
    }
    (value / step).round() * step
}

/// Snap both coordinates of a point.
pub fn snap_point(p: Point, step: f64) -> Point {
    Point::new(snap_to_grid(p.x, step), snap_to_grid(p.y, step))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MAX_ZOOM, MIN_ZOOM};

    const EPS: f64 = 1e-6;

    fn assert_close(a: Point, b: Point) {
        assert!(
            (a.x - b.x).abs() < EPS && (a.y - b.y).abs() < EPS,
            "expected {b:?}, got {a:?}"
        );
    }

    #[test]
    fn screen_to_world_at_unit_zoom_subtracts_pan() {
        let t = ViewTransform::new(30.0, -10.0, 1.0);
        assert_close(screen_to_world(Point::new(100.0, 100.0), &t), Point::new(70.0, 110.0));
    }

    #[test]
    fn world_to_screen_inverts_screen_to_world() {
        let t = ViewTransform::new(12.5, 40.0, 1.7);
        let s = Point::new(333.0, -21.0);
        assert_close(world_to_screen(screen_to_world(s, &t), &t), s);
    }

    #[test]
    fn zoom_at_keeps_cursor_anchor() {
        let transforms = [
            ViewTransform::IDENTITY,
            ViewTransform::new(-250.0, 80.0, 0.4),
            ViewTransform::new(13.0, 17.0, 1.9),
            ViewTransform::new(0.0, 0.0, MAX_ZOOM),
            ViewTransform::new(500.0, 500.0, MIN_ZOOM),
        ];
        let cursors = [Point::new(0.0, 0.0), Point::new(400.0, 300.0), Point::new(-35.5, 912.25)];
        for t in &transforms {
            for &cursor in &cursors {
                for dir in [ZoomDirection::In, ZoomDirection::Out] {
                    let before = screen_to_world(cursor, t);
                    let next = zoom_at(cursor, t, dir);
                    assert_close(screen_to_world(cursor, &next), before);
                }
            }
        }
    }

    #[test]
    fn zoom_at_applies_step_and_clamps() {
        let t = ViewTransform::IDENTITY;
        let zin = zoom_at(Point::ZERO, &t, ZoomDirection::In);
        assert!((zin.zoom - 1.1).abs() < EPS);
        let zout = zoom_at(Point::ZERO, &t, ZoomDirection::Out);
        assert!((zout.zoom - 1.0 / 1.1).abs() < EPS);

        let mut t = ViewTransform::IDENTITY;
        for _ in 0..50 {
            t = zoom_at(Point::new(10.0, 10.0), &t, ZoomDirection::In);
        }
        assert_eq!(t.zoom, MAX_ZOOM);
        for _ in 0..100 {
            t = zoom_at(Point::new(10.0, 10.0), &t, ZoomDirection::Out);
        }
        assert_eq!(t.zoom, MIN_ZOOM);
    }

    #[test]
    fn wheel_delta_direction() {
        assert_eq!(ZoomDirection::from_wheel_delta(-3.0), Some(ZoomDirection::In));
        assert_eq!(ZoomDirection::from_wheel_delta(3.0), Some(ZoomDirection::Out));
        assert_eq!(ZoomDirection::from_wheel_delta(0.0), None);
    }

    #[test]
    fn snap_rounds_to_nearest_multiple() {
        assert_eq!(snap_to_grid(59.0, 40.0), 40.0);
        assert_eq!(snap_to_grid(61.0, 40.0), 80.0);
        assert_eq!(snap_to_grid(-19.0, 40.0), 0.0);
        assert_eq!(snap_to_grid(-21.0, 40.0), -40.0);
        assert_eq!(snap_to_grid(17.3, 0.0), 17.3);
        assert_eq!(snap_point(Point::new(99.0, 101.0), GRID_STEP), Point::new(80.0, 120.0));
    }
}
