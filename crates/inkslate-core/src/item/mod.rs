//! Vector path items: the single drawing primitive of the board.

mod paper;

pub use paper::{PaperKind, graph_paper, lined_paper};

use crate::error::CanvasError;
use crate::style::{Palette, StrokeStyle};
use kurbo::{Affine, BezPath, ParamCurveNearest, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for items.
pub type ItemId = Uuid;

/// Accuracy used for nearest-point queries on curve segments.
const NEAREST_ACCURACY: f64 = 1e-3;

/// What produced an item. Only affects copy support and hit testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    /// Drawn by one of the tool builders.
    Stroke,
    /// Mark left by a freehand tap.
    Point,
    /// Background paper with a square hit region.
    Paper(PaperKind),
    /// Constructed outside the engine and handed to `Canvas::import_item`.
    Imported { clonable: bool },
}

/// A vector stroke or shape with local geometry and a placement transform.
///
/// Geometry is always relative to the item's own origin; the world position
/// is `transform() * path`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathItem {
    pub(crate) id: ItemId,
    pub kind: ItemKind,
    /// Local geometry.
    pub(crate) path: BezPath,
    /// Stroke descriptor (shared style on copy).
    pub style: StrokeStyle,
    /// Translation of the local origin in world space.
    pub position: Vec2,
    /// Uniform scale around `origin`.
    pub scale: f64,
    /// Local pivot for scaling, kept at the geometry's center.
    pub origin: Point,
    pub selected: bool,
    /// Optional click region that differs from the visual geometry (local space).
    pub hit_boundary: Option<BezPath>,
}

impl PathItem {
    /// Create an item at the world origin with unit scale.
    pub fn new(kind: ItemKind, path: BezPath, style: StrokeStyle) -> Self {
        let mut item = Self {
            id: Uuid::new_v4(),
            kind,
            path: BezPath::new(),
            style,
            position: Vec2::ZERO,
            scale: 1.0,
            origin: Point::ZERO,
            selected: false,
            hit_boundary: None,
        };
        item.set_path(path);
        item
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Local geometry.
    pub fn path(&self) -> &BezPath {
        &self.path
    }

    /// Number of path elements (move-to, line-to, curve-to, close).
    pub fn element_count(&self) -> usize {
        self.path.elements().len()
    }

    /// Replace the local geometry and re-center the scale pivot.
    ///
    /// The position is compensated so that a scaled item does not jump.
    pub fn set_path(&mut self, path: BezPath) {
        self.path = path;
        let new_origin = if self.path.elements().is_empty() {
            self.origin
        } else {
            self.path.bounding_box().center()
        };
        let shift = self.origin - new_origin;
        self.position += shift * (1.0 - self.scale);
        self.origin = new_origin;
    }

    /// Local-to-world transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.position)
            * Affine::translate(self.origin.to_vec2())
            * Affine::scale(self.scale)
            * Affine::translate(-self.origin.to_vec2())
    }

    /// Map a local point into world space.
    pub fn map_to_world(&self, local: Point) -> Point {
        self.transform() * local
    }

    /// Geometry in world coordinates.
    pub fn world_path(&self) -> BezPath {
        self.transform() * self.path.clone()
    }

    /// World bounding box including half the pen width, or the custom hit boundary.
    pub fn bounds(&self) -> Option<Rect> {
        if let Some(boundary) = &self.hit_boundary {
            return Some(self.transform().transform_rect_bbox(boundary.bounding_box()));
        }
        if self.path.elements().is_empty() {
            return None;
        }
        let half = if self.style.pen.is_some() { self.style.width / 2.0 } else { 0.0 };
        let local = self.path.bounding_box().inflate(half, half);
        Some(self.transform().transform_rect_bbox(local))
    }

    /// Check if the item's bounding shape overlaps a world rectangle.
    pub fn intersects_rect(&self, rect: Rect) -> bool {
        self.bounds()
            .is_some_and(|b| b.x0 <= rect.x1 && rect.x0 <= b.x1 && b.y0 <= rect.y1 && rect.y0 <= b.y1)
    }

    /// Check if a world point hits the item.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        if let Some(boundary) = &self.hit_boundary {
            return (self.transform() * boundary.clone()).contains(point);
        }
        let world = self.world_path();
        if self.style.is_filled() && world.contains(point) {
            return true;
        }
        let reach = tolerance + self.style.width * self.scale / 2.0;
        world
            .segments()
            .any(|seg| seg.nearest(point, NEAREST_ACCURACY).distance_sq <= reach * reach)
            || single_point(&world).is_some_and(|p| p.distance(point) <= reach)
    }

    /// Deep copy with a fresh id. Geometry is copied, the style is shared by value.
    pub fn duplicate(&self) -> Result<PathItem, CanvasError> {
        if let ItemKind::Imported { clonable: false } = self.kind {
            return Err(CanvasError::NotClonable(self.id));
        }
        Ok(PathItem {
            id: Uuid::new_v4(),
            selected: false,
            ..self.clone()
        })
    }

    /// Re-resolve foreground-linked colors. Returns true if anything changed.
    pub fn apply_palette(&mut self, palette: &Palette) -> bool {
        self.style.apply_palette(palette)
    }
}

/// The lone point of a path consisting only of a move-to.
fn single_point(path: &BezPath) -> Option<Point> {
    match path.elements() {
        [kurbo::PathEl::MoveTo(p)] => Some(*p),
        _ => None,
    }
}
