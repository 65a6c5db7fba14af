//! Background papers (graph paper, lined paper).
//!
//! Their visual geometry is a grid of open lines, but they are clicked and
//! erased through their outer square.

use super::{ItemKind, PathItem};
use crate::style::{Paint, SerializableColor, StrokeStyle};
use kurbo::{BezPath, Point, Rect, Shape as KurboShape};
use serde::{Deserialize, Serialize};

const PAPER_COLOR: SerializableColor = SerializableColor::rgb(173, 216, 230);

/// Cell size of graph paper.
pub const GRAPH_CELL: f64 = 50.0;
/// Row height of lined paper.
pub const LINE_SPACING: f64 = 75.0;
/// Number of cells/rows per side.
pub const PAPER_CELLS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperKind {
    Graph,
    Lined,
}

/// Square graph paper with `PAPER_CELLS` cells per side.
pub fn graph_paper() -> PathItem {
    let length = GRAPH_CELL * PAPER_CELLS as f64;
    let mut path = BezPath::new();
    for n in 0..=PAPER_CELLS {
        let a = n as f64 * GRAPH_CELL;
        path.move_to(Point::new(0.0, a));
        path.line_to(Point::new(length, a));
        path.move_to(Point::new(a, 0.0));
        path.line_to(Point::new(a, length));
    }
    paper_item(PaperKind::Graph, path, length)
}

/// Lined paper with `PAPER_CELLS` horizontal rules.
pub fn lined_paper() -> PathItem {
    let length = LINE_SPACING * PAPER_CELLS as f64;
    let mut path = BezPath::new();
    for n in 0..=PAPER_CELLS {
        let a = n as f64 * LINE_SPACING;
        path.move_to(Point::new(0.0, a));
        path.line_to(Point::new(length, a));
    }
    paper_item(PaperKind::Lined, path, length)
}

fn paper_item(kind: PaperKind, path: BezPath, length: f64) -> PathItem {
    let mut item = PathItem::new(
        ItemKind::Paper(kind),
        path,
        StrokeStyle::outline(1.0, Paint::fixed(PAPER_COLOR)),
    );
    item.hit_boundary = Some(Rect::new(0.0, 0.0, length, length).to_path(0.1));
    item
}
