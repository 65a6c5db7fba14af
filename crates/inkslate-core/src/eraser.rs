//! Eraser shape, path splitter and per-gesture erase bookkeeping.

use crate::history::{ChangePaths, Command, RemoveItem};
use crate::item::{ItemId, PathItem};
use crate::scene::Scene;
use kurbo::{BezPath, Circle, Line, ParamCurveNearest, PathEl, Point, Rect, Shape as KurboShape, Size};
use std::collections::HashMap;

/// Diameter of the normal eraser in pen widths.
const DIAMETER_PER_PEN_WIDTH: f64 = 10.0;
/// Palm-sized eraser used for very big contacts, in screen units.
const LARGE_ERASER: Size = Size::new(80.0, 120.0);

/// Hit region of the eraser in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Eraser {
    /// Round eraser following the pen size.
    Small(Circle),
    /// Rectangle for a resting palm.
    Large(Rect),
}

impl Eraser {
    /// Round eraser at `center`. Keeps its on-screen size at any zoom.
    pub fn small(center: Point, pen_width: f64, zoom: f64) -> Self {
        let radius = pen_width * DIAMETER_PER_PEN_WIDTH / zoom / 2.0;
        Eraser::Small(Circle::new(center, radius))
    }

    /// Palm eraser at `center`. Keeps its on-screen size at any zoom.
    pub fn large(center: Point, zoom: f64) -> Self {
        let size = Size::new(LARGE_ERASER.width / zoom, LARGE_ERASER.height / zoom);
        Eraser::Large(Rect::from_center_size(center, size))
    }

    pub fn center(&self) -> Point {
        match self {
            Eraser::Small(circle) => circle.center,
            Eraser::Large(rect) => rect.center(),
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        match self {
            Eraser::Small(circle) => circle.contains(point),
            Eraser::Large(rect) => rect.contains(point),
        }
    }

    pub fn bounding_box(&self) -> Rect {
        match self {
            Eraser::Small(circle) => circle.bounding_box(),
            Eraser::Large(rect) => *rect,
        }
    }

    /// Whether the eraser overlaps the region enclosed by `world`.
    pub fn touches_fill(&self, world: &BezPath) -> bool {
        if world.contains(self.center()) {
            return true;
        }
        match self {
            Eraser::Small(circle) => {
                let reach = circle.radius * circle.radius;
                world
                    .segments()
                    .any(|seg| seg.nearest(circle.center, 1e-6).distance_sq <= reach)
            }
            Eraser::Large(rect) => {
                let edges = [
                    Line::new((rect.x0, rect.y0), (rect.x1, rect.y0)),
                    Line::new((rect.x1, rect.y0), (rect.x1, rect.y1)),
                    Line::new((rect.x1, rect.y1), (rect.x0, rect.y1)),
                    Line::new((rect.x0, rect.y1), (rect.x0, rect.y0)),
                ];
                world
                    .elements()
                    .iter()
                    .filter_map(PathEl::end_point)
                    .any(|p| rect.contains(p))
                    || world
                        .segments()
                        .any(|seg| edges.iter().any(|edge| !seg.intersect_line(*edge).is_empty()))
            }
        }
    }

    /// Outline for rendering the eraser cursor.
    pub fn outline(&self) -> BezPath {
        match self {
            Eraser::Small(circle) => circle.to_path(0.1),
            Eraser::Large(rect) => rect.to_path(0.1),
        }
    }
}

/// Result of running the splitter over one item.
#[derive(Debug, Clone, PartialEq)]
pub enum SplitOutcome {
    /// No vertex lies inside the eraser.
    Unchanged,
    /// The surviving runs, in local coordinates.
    Changed(BezPath),
    /// Nothing worth keeping is left.
    Removed,
}

/// Cut every vertex of `item` that lies inside the eraser out of its path.
///
/// Only segment end points are tested, curve control points are ignored. A
/// curve whose interior crosses the eraser while both ends stay outside is
/// therefore left intact. Filled items are removed as a whole as soon as the
/// eraser overlaps their fill or outline.
pub fn split_path(item: &PathItem, eraser: &Eraser) -> SplitOutcome {
    if item.style.is_filled() {
        return if eraser.touches_fill(&item.world_path()) {
            SplitOutcome::Removed
        } else {
            SplitOutcome::Unchanged
        };
    }
    let transform = item.transform();
    let inside = |p: Point| eraser.contains(transform * p);

    let mut rebuilt = BezPath::new();
    let mut any_cut = false;
    let mut cutting = false;
    let mut subpath_cut = false;
    let mut subpath_start = Point::ZERO;

    for el in item.path().elements() {
        match *el {
            PathEl::MoveTo(p) => {
                subpath_start = p;
                subpath_cut = inside(p);
                cutting = subpath_cut;
                if cutting {
                    any_cut = true;
                } else {
                    rebuilt.move_to(p);
                }
            }
            PathEl::LineTo(p) | PathEl::QuadTo(_, p) | PathEl::CurveTo(_, _, p) => {
                if inside(p) {
                    any_cut = true;
                    cutting = true;
                    subpath_cut = true;
                } else if cutting {
                    rebuilt.move_to(p);
                    cutting = false;
                } else {
                    rebuilt.push(*el);
                }
            }
            PathEl::ClosePath => {
                if !subpath_cut {
                    rebuilt.close_path();
                } else if !cutting && !inside(subpath_start) {
                    rebuilt.line_to(subpath_start);
                }
                cutting = false;
            }
        }
    }

    if !any_cut {
        return SplitOutcome::Unchanged;
    }
    let rebuilt = tidy(rebuilt);
    if rebuilt.elements().len() < 2 {
        SplitOutcome::Removed
    } else {
        SplitOutcome::Changed(rebuilt)
    }
}

/// Drop move-tos that start nothing.
fn tidy(path: BezPath) -> BezPath {
    let mut elements: Vec<PathEl> = Vec::with_capacity(path.elements().len());
    for el in path.elements() {
        if matches!(el, PathEl::MoveTo(_)) && matches!(elements.last(), Some(PathEl::MoveTo(_))) {
            elements.pop();
        }
        elements.push(*el);
    }
    while matches!(elements.last(), Some(PathEl::MoveTo(_))) {
        elements.pop();
    }
    BezPath::from_vec(elements)
}

/// Bookkeeping for one erase gesture.
///
/// Items are modified in the scene while the gesture runs. Each item's
/// geometry is snapshot the first time it is touched, and [`finish`] turns
/// the whole gesture into a single undoable command.
///
/// [`finish`]: EraseSession::finish
#[derive(Debug, Default)]
pub struct EraseSession {
    /// Pre-erase geometry, in order of first contact.
    touched: Vec<(ItemId, BezPath)>,
    /// Items removed during the gesture with their former z-index.
    removed: HashMap<ItemId, (usize, PathItem)>,
}

impl EraseSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.touched.is_empty()
    }

    fn snapshot(&mut self, item: &PathItem) {
        if !self.touched.iter().any(|(id, _)| *id == item.id()) {
            self.touched.push((item.id(), item.path().clone()));
        }
    }

    /// Apply the eraser to every item it overlaps. Returns true if the scene changed.
    pub fn erase(&mut self, scene: &mut Scene, eraser: &Eraser) -> bool {
        let mut changed = false;
        for id in scene.items_intersecting(eraser.bounding_box()) {
            let Some(item) = scene.get(id) else { continue };
            let outcome = split_path(item, eraser);
            if outcome == SplitOutcome::Unchanged {
                continue;
            }
            self.snapshot(item);
            changed = true;
            match outcome {
                SplitOutcome::Changed(path) => {
                    if let Some(item) = scene.get_mut(id) {
                        item.set_path(path);
                    }
                }
                SplitOutcome::Removed => {
                    if let Some(entry) = scene.remove(id) {
                        self.removed.insert(id, entry);
                    }
                }
                SplitOutcome::Unchanged => {}
            }
        }
        changed
    }

    /// Build the command describing the whole gesture, already applied to the scene.
    ///
    /// One removed item yields a plain `RemoveItem`, changed survivors share
    /// one `ChangePaths`; several commands are grouped into a macro.
    pub fn finish(mut self, scene: &Scene) -> Option<Command> {
        let mut commands = Vec::new();
        let mut changes = Vec::new();
        for (id, before) in self.touched {
            if let Some((index, mut item)) = self.removed.remove(&id) {
                item.set_path(before);
                commands.push(Command::RemoveItem(RemoveItem::detached(index, item)));
            } else if let Some(item) = scene.get(id) {
                changes.push((id, item.path().clone(), before));
            }
        }
        if !changes.is_empty() {
            commands.push(Command::ChangePaths(ChangePaths::new(changes)));
        }
        match commands.len() {
            0 => None,
            1 => commands.pop(),
            _ => Some(Command::macro_of("Erase", commands)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::CommandStack;
    use crate::item::ItemKind;
    use crate::style::{Paint, SerializableColor, StrokeStyle};

    fn polyline(points: &[(f64, f64)]) -> PathItem {
        let mut path = BezPath::new();
        path.move_to(points[0]);
        for p in &points[1..] {
            path.line_to(*p);
        }
        PathItem::new(
            ItemKind::Stroke,
            path,
            StrokeStyle::outline(2.0, Paint::fixed(SerializableColor::black())),
        )
    }

    fn eraser_at(x: f64, y: f64, radius: f64) -> Eraser {
        Eraser::Small(Circle::new(Point::new(x, y), radius))
    }

    #[test]
    fn test_eraser_sizes_follow_zoom() {
        let small = Eraser::small(Point::ZERO, 3.0, 2.0);
        assert!((small.bounding_box().width() - 15.0).abs() < 1e-9);
        let large = Eraser::large(Point::ZERO, 2.0);
        assert!((large.bounding_box().width() - 40.0).abs() < 1e-9);
        assert!((large.bounding_box().height() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_split_in_the_middle() {
        let item = polyline(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0), (30.0, 0.0), (40.0, 0.0)]);
        let SplitOutcome::Changed(path) = split_path(&item, &eraser_at(20.0, 0.0, 3.0)) else {
            panic!("expected a split");
        };
        assert_eq!(
            path.elements(),
            &[
                PathEl::MoveTo(Point::new(0.0, 0.0)),
                PathEl::LineTo(Point::new(10.0, 0.0)),
                PathEl::MoveTo(Point::new(30.0, 0.0)),
                PathEl::LineTo(Point::new(40.0, 0.0)),
            ]
        );
    }

    #[test]
    fn test_split_without_contact() {
        let item = polyline(&[(0.0, 0.0), (10.0, 0.0)]);
        assert_eq!(split_path(&item, &eraser_at(5.0, 50.0, 3.0)), SplitOutcome::Unchanged);
    }

    #[test]
    fn test_all_vertices_inside_removes() {
        let item = polyline(&[(0.0, 0.0), (1.0, 0.0), (2.0, 1.0)]);
        assert_eq!(split_path(&item, &eraser_at(1.0, 0.0, 5.0)), SplitOutcome::Removed);
    }

    #[test]
    fn test_cut_at_the_end_leaves_no_trailing_move() {
        let item = polyline(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);
        let SplitOutcome::Changed(path) = split_path(&item, &eraser_at(20.0, 0.0, 3.0)) else {
            panic!("expected a split");
        };
        assert_eq!(path.elements().len(), 2);
        assert!(matches!(path.elements().last(), Some(PathEl::LineTo(_))));
    }

    #[test]
    fn test_single_surviving_vertex_removes() {
        let item = polyline(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0)]);
        assert_eq!(split_path(&item, &eraser_at(15.0, 0.0, 6.0)), SplitOutcome::Removed);
    }

    #[test]
    fn test_filled_items_are_removed_anywhere() {
        let mut triangle = BezPath::new();
        triangle.move_to((0.0, 0.0));
        triangle.line_to((100.0, 0.0));
        triangle.line_to((100.0, 100.0));
        triangle.close_path();
        let item = PathItem::new(
            ItemKind::Stroke,
            triangle,
            StrokeStyle::filled(Paint::fixed(SerializableColor::black())),
        );
        assert_eq!(split_path(&item, &eraser_at(99.0, 50.0, 0.5)), SplitOutcome::Removed);
        assert_eq!(split_path(&item, &eraser_at(100.0, 0.0, 0.5)), SplitOutcome::Removed);
        assert_eq!(split_path(&item, &eraser_at(10.0, 80.0, 0.5)), SplitOutcome::Unchanged);
    }

    #[test]
    fn test_filled_item_removed_when_eraser_overlaps_edge() {
        let mut square = BezPath::new();
        square.move_to((100.0, 100.0));
        square.line_to((300.0, 100.0));
        square.line_to((300.0, 300.0));
        square.line_to((100.0, 300.0));
        square.close_path();
        let item = PathItem::new(
            ItemKind::Stroke,
            square,
            StrokeStyle::filled(Paint::fixed(SerializableColor::black())),
        );
        // Center outside the fill, no corner inside the eraser.
        assert_eq!(split_path(&item, &eraser_at(310.0, 200.0, 15.0)), SplitOutcome::Removed);
        assert_eq!(split_path(&item, &eraser_at(320.0, 200.0, 15.0)), SplitOutcome::Unchanged);

        let palm = Eraser::Large(Rect::new(290.0, 150.0, 370.0, 270.0));
        assert_eq!(split_path(&item, &palm), SplitOutcome::Removed);
        let beside = Eraser::Large(Rect::new(310.0, 150.0, 390.0, 270.0));
        assert_eq!(split_path(&item, &beside), SplitOutcome::Unchanged);
    }

    #[test]
    fn test_curve_crossing_eraser_survives() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.curve_to((10.0, 20.0), (30.0, 20.0), (40.0, 0.0));
        let item = PathItem::new(
            ItemKind::Stroke,
            path,
            StrokeStyle::outline(2.0, Paint::fixed(SerializableColor::black())),
        );
        assert_eq!(split_path(&item, &eraser_at(20.0, 15.0, 4.0)), SplitOutcome::Unchanged);
    }

    #[test]
    fn test_closed_path_opened_by_cut() {
        let mut path = BezPath::new();
        path.move_to((0.0, 0.0));
        path.line_to((10.0, 0.0));
        path.line_to((10.0, 10.0));
        path.line_to((0.0, 10.0));
        path.close_path();
        let item = PathItem::new(
            ItemKind::Stroke,
            path,
            StrokeStyle::outline(1.0, Paint::fixed(SerializableColor::black())),
        );
        let SplitOutcome::Changed(rebuilt) = split_path(&item, &eraser_at(10.0, 10.0, 1.0)) else {
            panic!("expected a split");
        };
        assert_eq!(
            rebuilt.elements(),
            &[
                PathEl::MoveTo(Point::new(0.0, 0.0)),
                PathEl::LineTo(Point::new(10.0, 0.0)),
                PathEl::MoveTo(Point::new(0.0, 10.0)),
                PathEl::LineTo(Point::new(0.0, 0.0)),
            ]
        );
    }

    #[test]
    fn test_session_single_remove_entry() {
        let mut scene = Scene::new();
        let mut stack = CommandStack::new();
        let id = scene.insert(polyline(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0)]));

        let mut session = EraseSession::new();
        assert!(session.erase(&mut scene, &eraser_at(1.0, 0.5, 5.0)));
        assert!(scene.get(id).is_none());

        let command = session.finish(&scene).unwrap();
        assert!(matches!(command, Command::RemoveItem(_)));
        stack.push(&mut scene, command);
        assert_eq!(stack.len(), 1);

        stack.undo(&mut scene);
        assert_eq!(scene.get(id).map(PathItem::element_count), Some(3));
    }

    #[test]
    fn test_session_is_one_undo_step() {
        let mut scene = Scene::new();
        let mut stack = CommandStack::new();
        let long = polyline(&[(0.0, 0.0), (10.0, 0.0), (20.0, 0.0), (30.0, 0.0), (40.0, 0.0)]);
        let original = long.path().clone();
        let long_id = scene.insert(long);
        let short_id = scene.insert(polyline(&[(20.0, 5.0), (21.0, 5.0)]));

        let mut session = EraseSession::new();
        for x in [18.0, 19.0, 20.0, 21.0] {
            session.erase(&mut scene, &eraser_at(x, 2.0, 4.0));
        }
        let command = session.finish(&scene).unwrap();
        stack.push(&mut scene, command);
        assert_eq!(stack.len(), 1);
        assert!(scene.get(short_id).is_none());
        assert_eq!(scene.get(long_id).map(PathItem::element_count), Some(4));

        stack.undo(&mut scene);
        assert_eq!(scene.get(long_id).map(|i| i.path().clone()), Some(original));
        assert!(scene.get(short_id).is_some());

        stack.redo(&mut scene);
        assert!(scene.get(short_id).is_none());
        assert_eq!(scene.get(long_id).map(PathItem::element_count), Some(4));
    }
}
