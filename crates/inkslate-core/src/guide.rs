//! The snap guide: a movable, rotatable set square.
//!
//! Local coordinates put the ruled edge on the x axis from 0 to
//! [`EDGE_LENGTH`], with the triangle hanging below it (positive y).

use kurbo::{Affine, Arc, BezPath, Circle, Point, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};

/// Length of the ruled edge in guide units.
pub const EDGE_LENGTH: f64 = 160.0;
/// Distance from the ruled edge below which points snap onto it.
pub const SNAP_TOLERANCE: f64 = 10.0;

/// Rotation pivot: the middle of the ruled edge.
const PIVOT: Point = Point::new(EDGE_LENGTH / 2.0, 0.0);
/// Right-angle apex of the triangle.
const APEX: Point = Point::new(EDGE_LENGTH / 2.0, EDGE_LENGTH / 2.0);
const PROTRACTOR_RADIUS: f64 = 60.0;
const MOVE_HANDLE: Circle = Circle {
    center: Point::new(EDGE_LENGTH / 2.0, 25.0),
    radius: 14.0,
};
const ROTATE_HANDLE: Circle = Circle {
    center: Point::new(EDGE_LENGTH / 2.0, 62.0),
    radius: 10.0,
};

/// Which grab region of the guide a point falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuideHandle {
    Move,
    Rotate,
}

/// A positioned, rotatable straightedge. At most one exists per canvas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Guide {
    /// World position of the pivot.
    pub center: Point,
    /// Rotation in radians.
    pub rotation: f64,
    enabled: bool,
}

impl Default for Guide {
    fn default() -> Self {
        Self {
            center: Point::ZERO,
            rotation: 0.0,
            enabled: false,
        }
    }
}

impl Guide {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Show the guide centered at a world point.
    pub fn enable_at(&mut self, center: Point) {
        self.enabled = true;
        self.center = center;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    /// Guide-to-world transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.center.to_vec2()) * Affine::rotate(self.rotation) * Affine::translate(-PIVOT.to_vec2())
    }

    /// Map a world point into guide space.
    pub fn to_local(&self, world: Point) -> Point {
        self.transform().inverse() * world
    }

    /// Grab region under a world point, if any. A disabled guide has none.
    pub fn handle_at(&self, world: Point) -> Option<GuideHandle> {
        if !self.enabled {
            return None;
        }
        let local = self.to_local(world);
        if MOVE_HANDLE.contains(local) {
            Some(GuideHandle::Move)
        } else if ROTATE_HANDLE.contains(local) {
            Some(GuideHandle::Rotate)
        } else {
            None
        }
    }

    pub fn in_move_handle(&self, world: Point) -> bool {
        self.handle_at(world) == Some(GuideHandle::Move)
    }

    pub fn in_rotate_handle(&self, world: Point) -> bool {
        self.handle_at(world) == Some(GuideHandle::Rotate)
    }

    /// Re-center the guide so the move handle sits under the pointer.
    /// The guide may leave the canvas bounds.
    pub fn move_to(&mut self, pointer: Point) {
        let handle_offset = Affine::rotate(self.rotation) * (MOVE_HANDLE.center - PIVOT).to_point();
        self.center = pointer - handle_offset.to_vec2();
    }

    /// Turn the guide so the rotate handle points from the pivot towards the pointer.
    pub fn rotate_towards(&mut self, pointer: Point) {
        let to_pointer = pointer - self.center;
        if to_pointer.hypot2() < f64::EPSILON {
            return;
        }
        let rest = ROTATE_HANDLE.center - PIVOT;
        self.rotation = to_pointer.atan2() - rest.atan2();
    }

    /// Snap a world point onto the ruled edge.
    ///
    /// Points whose local x lies within the edge and whose distance from it is
    /// below [`SNAP_TOLERANCE`] get their local y set to exactly 0. Anything
    /// else, and every point while the guide is disabled, is returned unchanged.
    pub fn snap(&self, world: Point) -> Point {
        if !self.enabled {
            return world;
        }
        let local = self.to_local(world);
        if !(0.0..=EDGE_LENGTH).contains(&local.x) || local.y.abs() >= SNAP_TOLERANCE {
            return world;
        }
        self.transform() * Point::new(local.x, 0.0)
    }

    /// Local outline: triangle plus protractor arc.
    pub fn local_outline() -> BezPath {
        let mut path = BezPath::new();
        path.move_to(Point::ZERO);
        path.line_to(Point::new(EDGE_LENGTH, 0.0));
        path.line_to(APEX);
        path.close_path();

        let arc = Arc::new(PIVOT, Vec2::new(PROTRACTOR_RADIUS, PROTRACTOR_RADIUS), 0.0, std::f64::consts::PI, 0.0);
        path.move_to(PIVOT + Vec2::new(PROTRACTOR_RADIUS, 0.0));
        path.extend(arc.append_iter(0.1));
        path
    }

    /// Outline in world coordinates, for rendering.
    pub fn outline(&self) -> BezPath {
        self.transform() * Self::local_outline()
    }
}
