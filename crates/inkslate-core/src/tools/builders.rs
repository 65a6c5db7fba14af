//! Per-tool geometry builders.

use super::ToolBuilder;
use kurbo::{BezPath, Point, Vec2};

/// Offset of the second point of a tap mark, so it still rasterizes as a dot.
pub const POINT_OFFSET: f64 = 1e-4;

/// Number of cubic segments approximating a full ellipse (15° each).
const ELLIPSE_SEGMENTS: usize = 24;

/// Head length of an arrow in pen widths.
const ARROW_HEAD_LENGTH: f64 = 5.0;

fn is_zero_extent(start: Point, current: Point) -> bool {
    let d = current - start;
    d.x.abs() < f64::EPSILON && d.y.abs() < f64::EPSILON
}

/// Force the end point horizontal or vertical relative to the start.
///
/// Horizontal when `|angle| <= 45°` or `|angle| >= 135°`, vertical otherwise.
fn snap_axis(start: Point, current: Point) -> Point {
    let delta = current - start;
    let angle = delta.y.atan2(delta.x).to_degrees();
    if angle.abs() <= 45.0 || angle.abs() >= 135.0 {
        Point::new(current.x, start.y)
    } else {
        Point::new(start.x, current.y)
    }
}

/// Ellipse around `center`, approximated by 24 cubic arcs of 15° each.
///
/// Starts at the rightmost point and runs counter-clockwise on screen.
pub fn ellipse_path(center: Point, rx: f64, ry: f64) -> BezPath {
    let step = std::f64::consts::TAU / ELLIPSE_SEGMENTS as f64;
    let handle = 4.0 / 3.0 * (step / 4.0).tan();
    let at = |x: f64, y: f64| Point::new(center.x + rx * x, center.y - ry * y);

    let mut path = BezPath::new();
    path.move_to(at(1.0, 0.0));
    for k in 0..ELLIPSE_SEGMENTS {
        let (a0, a1) = (k as f64 * step, (k + 1) as f64 * step);
        let (s0, c0) = a0.sin_cos();
        let (s1, c1) = a1.sin_cos();
        path.curve_to(
            at(c0 - handle * s0, s0 + handle * c0),
            at(c1 + handle * s1, s1 - handle * c1),
            at(c1, s1),
        );
    }
    path
}

/// Freehand: appends a segment per update, never recomputed from the start.
#[derive(Debug, Clone, Default)]
pub struct FreehandBuilder {
    start: Point,
    path: BezPath,
    moved: bool,
}

impl FreehandBuilder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ToolBuilder for FreehandBuilder {
    fn start(&mut self, point: Point) {
        self.start = point;
        self.path = BezPath::new();
        self.path.move_to(point);
        self.moved = false;
    }

    fn update(&mut self, point: Point) -> &BezPath {
        self.path.line_to(point);
        self.moved |= !is_zero_extent(self.start, point);
        &self.path
    }

    fn geometry(&self) -> &BezPath {
        &self.path
    }

    fn is_degenerate(&self) -> bool {
        !self.moved
    }
}

/// Straight line from the start point, optionally axis-snapped.
#[derive(Debug, Clone)]
pub struct LineBuilder {
    start: Point,
    end: Point,
    axis_snap: bool,
    path: BezPath,
}

impl LineBuilder {
    pub fn new(axis_snap: bool) -> Self {
        Self {
            start: Point::ZERO,
            end: Point::ZERO,
            axis_snap,
            path: BezPath::new(),
        }
    }
}

impl ToolBuilder for LineBuilder {
    fn start(&mut self, point: Point) {
        self.start = point;
        self.end = point;
        self.path = BezPath::new();
        self.path.move_to(point);
    }

    fn update(&mut self, point: Point) -> &BezPath {
        self.end = if self.axis_snap { snap_axis(self.start, point) } else { point };
        self.path = BezPath::new();
        self.path.move_to(self.start);
        self.path.line_to(self.end);
        &self.path
    }

    fn geometry(&self) -> &BezPath {
        &self.path
    }

    fn is_degenerate(&self) -> bool {
        is_zero_extent(self.start, self.end)
    }
}

/// Line plus a closed triangular head scaled by the pen width.
#[derive(Debug, Clone)]
pub struct ArrowBuilder {
    line: LineBuilder,
    pen_width: f64,
}

impl ArrowBuilder {
    pub fn new(pen_width: f64, axis_snap: bool) -> Self {
        Self {
            line: LineBuilder::new(axis_snap),
            pen_width,
        }
    }
}

impl ToolBuilder for ArrowBuilder {
    fn start(&mut self, point: Point) {
        self.line.start(point);
    }

    fn update(&mut self, point: Point) -> &BezPath {
        self.line.update(point);
        let (start, end) = (self.line.start, self.line.end);
        let shaft = end - start;
        let length = shaft.hypot();
        if length < f64::EPSILON {
            return &self.line.path;
        }
        let dir = shaft / length;
        let normal = Vec2::new(dir.y, -dir.x);
        let lw = self.pen_width;
        let path = &mut self.line.path;
        path.move_to(end);
        path.line_to(end - dir * (ARROW_HEAD_LENGTH * lw) + normal * lw);
        path.line_to(end - dir * (ARROW_HEAD_LENGTH * lw) - normal * lw);
        path.close_path();
        &self.line.path
    }

    fn geometry(&self) -> &BezPath {
        &self.line.path
    }

    fn is_degenerate(&self) -> bool {
        self.line.is_degenerate()
    }
}

/// Circle (radius = length of the delta) or ellipse (radii = absolute delta).
#[derive(Debug, Clone)]
pub struct EllipseBuilder {
    center: Point,
    radii: Vec2,
    circular: bool,
    path: BezPath,
}

impl EllipseBuilder {
    pub fn circle() -> Self {
        Self::new(true)
    }

    pub fn ellipse() -> Self {
        Self::new(false)
    }

    fn new(circular: bool) -> Self {
        Self {
            center: Point::ZERO,
            radii: Vec2::ZERO,
            circular,
            path: BezPath::new(),
        }
    }
}

impl ToolBuilder for EllipseBuilder {
    fn start(&mut self, point: Point) {
        self.center = point;
        self.radii = Vec2::ZERO;
        self.path = BezPath::new();
        self.path.move_to(point);
    }

    fn update(&mut self, point: Point) -> &BezPath {
        let delta = point - self.center;
        let (rx, ry) = (delta.x.abs(), delta.y.abs());
        self.radii = if self.circular {
            let r = rx.hypot(ry);
            Vec2::new(r, r)
        } else {
            Vec2::new(rx, ry)
        };
        self.path = ellipse_path(self.center, self.radii.x, self.radii.y);
        &self.path
    }

    fn geometry(&self) -> &BezPath {
        &self.path
    }

    fn is_degenerate(&self) -> bool {
        self.radii.x < f64::EPSILON && self.radii.y < f64::EPSILON
    }
}

/// Axis-aligned rectangle, or a square using the larger delta on both axes.
#[derive(Debug, Clone)]
pub struct RectangleBuilder {
    start: Point,
    corner: Point,
    square: bool,
    path: BezPath,
}

impl RectangleBuilder {
    pub fn square() -> Self {
        Self::new(true)
    }

    pub fn rectangle() -> Self {
        Self::new(false)
    }

    fn new(square: bool) -> Self {
        Self {
            start: Point::ZERO,
            corner: Point::ZERO,
            square,
            path: BezPath::new(),
        }
    }
}

impl ToolBuilder for RectangleBuilder {
    fn start(&mut self, point: Point) {
        self.start = point;
        self.corner = point;
        self.path = BezPath::new();
        self.path.move_to(point);
    }

    fn update(&mut self, point: Point) -> &BezPath {
        let delta = point - self.start;
        let (dx, dy) = if self.square {
            let d = delta.x.abs().max(delta.y.abs());
            (d.copysign(delta.x), d.copysign(delta.y))
        } else {
            (delta.x, delta.y)
        };
        let (x1, y1) = (self.start.x, self.start.y);
        let (x2, y2) = (x1 + dx, y1 + dy);
        self.corner = Point::new(x2, y2);

        self.path = BezPath::new();
        self.path.move_to(self.start);
        self.path.line_to(Point::new(x1, y2));
        self.path.line_to(Point::new(x2, y2));
        self.path.line_to(Point::new(x2, y1));
        self.path.close_path();
        &self.path
    }

    fn geometry(&self) -> &BezPath {
        &self.path
    }

    fn is_degenerate(&self) -> bool {
        is_zero_extent(self.start, self.corner)
    }
}

/// Two-point dot for taps.
#[derive(Debug, Clone, Default)]
pub struct PointBuilder {
    path: BezPath,
}

impl PointBuilder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ToolBuilder for PointBuilder {
    fn start(&mut self, point: Point) {
        self.path = BezPath::new();
        self.path.move_to(point);
        self.path.line_to(point + Vec2::new(POINT_OFFSET, POINT_OFFSET));
    }

    fn update(&mut self, _point: Point) -> &BezPath {
        &self.path
    }

    fn geometry(&self) -> &BezPath {
        &self.path
    }

    fn is_degenerate(&self) -> bool {
        false
    }
}
