//! Tool system: status tags, per-tool styling and the builder registry.

mod builders;

pub use builders::{
    ArrowBuilder, EllipseBuilder, FreehandBuilder, LineBuilder, POINT_OFFSET, PointBuilder, RectangleBuilder,
    ellipse_path,
};

use crate::error::CanvasError;
use crate::style::{LineJoin, Paint, StrokeStyle};
use kurbo::{BezPath, Point};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Available status tags: every drawing tool plus the erase and edit modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Status {
    #[default]
    Freehand,
    Line,
    Arrow,
    /// Line forced horizontal or vertical.
    LineSnapped,
    /// Arrow forced horizontal or vertical.
    ArrowSnapped,
    Circle,
    Square,
    Ellipse,
    Rectangle,
    CircleFilled,
    SquareFilled,
    EllipseFilled,
    RectangleFilled,
    /// Selection, move and resize of whole items.
    Edit,
    Erase,
}

/// Top-level mode implied by a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Mode {
    Drawing,
    Erasing,
    Editing,
}

/// Geometry builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tool {
    Freehand,
    Line,
    Arrow,
    LineSnapped,
    ArrowSnapped,
    Circle,
    Ellipse,
    Square,
    Rectangle,
    /// Dot left behind by a freehand tap.
    Point,
}

impl Status {
    pub const ALL: [Status; 15] = [
        Status::Freehand,
        Status::Line,
        Status::Arrow,
        Status::LineSnapped,
        Status::ArrowSnapped,
        Status::Circle,
        Status::Square,
        Status::Ellipse,
        Status::Rectangle,
        Status::CircleFilled,
        Status::SquareFilled,
        Status::EllipseFilled,
        Status::RectangleFilled,
        Status::Edit,
        Status::Erase,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Status::Freehand => "freehand",
            Status::Line => "line",
            Status::Arrow => "arrow",
            Status::LineSnapped => "line-snapped",
            Status::ArrowSnapped => "arrow-snapped",
            Status::Circle => "circle",
            Status::Square => "square",
            Status::Ellipse => "ellipse",
            Status::Rectangle => "rectangle",
            Status::CircleFilled => "circle-filled",
            Status::SquareFilled => "square-filled",
            Status::EllipseFilled => "ellipse-filled",
            Status::RectangleFilled => "rectangle-filled",
            Status::Edit => "edit",
            Status::Erase => "erase",
        }
    }

    pub fn mode(self) -> Mode {
        match self {
            Status::Edit => Mode::Editing,
            Status::Erase => Mode::Erasing,
            _ => Mode::Drawing,
        }
    }

    /// Builder used for this status, `None` for erase and edit.
    pub fn tool(self) -> Option<Tool> {
        match self {
            Status::Freehand => Some(Tool::Freehand),
            Status::Line => Some(Tool::Line),
            Status::Arrow => Some(Tool::Arrow),
            Status::LineSnapped => Some(Tool::LineSnapped),
            Status::ArrowSnapped => Some(Tool::ArrowSnapped),
            Status::Circle | Status::CircleFilled => Some(Tool::Circle),
            Status::Ellipse | Status::EllipseFilled => Some(Tool::Ellipse),
            Status::Square | Status::SquareFilled => Some(Tool::Square),
            Status::Rectangle | Status::RectangleFilled => Some(Tool::Rectangle),
            Status::Edit | Status::Erase => None,
        }
    }

    pub fn is_filled(self) -> bool {
        matches!(
            self,
            Status::CircleFilled | Status::SquareFilled | Status::EllipseFilled | Status::RectangleFilled
        )
    }

    /// Pen and fill for items created under this status.
    ///
    /// Outline tools draw with the pen and no fill, filled shapes use no pen
    /// and the pen color as fill, arrows use a mitered pen plus a filled head.
    pub fn style(self, pen_width: f64, paint: Paint) -> StrokeStyle {
        match self {
            Status::Arrow | Status::ArrowSnapped => StrokeStyle {
                join: LineJoin::Miter,
                fill: Some(paint),
                ..StrokeStyle::outline(pen_width, paint)
            },
            s if s.is_filled() => StrokeStyle::filled(paint),
            _ => StrokeStyle::outline(pen_width, paint),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Status {
    type Err = CanvasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|status| status.name() == s)
            .ok_or_else(|| CanvasError::UnknownStatus(s.to_string()))
    }
}

/// Incremental geometry builder for one gesture.
pub trait ToolBuilder {
    /// Begin at the (already snapped) start point.
    fn start(&mut self, point: Point);

    /// Advance to the current point and return the item's new geometry.
    fn update(&mut self, point: Point) -> &BezPath;

    /// Geometry built so far.
    fn geometry(&self) -> &BezPath;

    /// Whether the gesture so far has produced nothing worth keeping.
    fn is_degenerate(&self) -> bool;
}

/// Constructor for a builder with the current pen width.
pub type BuilderFactory = fn(f64) -> Box<dyn ToolBuilder>;

/// Maps each tool to its builder.
pub struct ToolRegistry {
    factories: HashMap<Tool, BuilderFactory>,
}

impl ToolRegistry {
    /// An empty registry.
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    pub fn register(&mut self, tool: Tool, factory: BuilderFactory) {
        self.factories.insert(tool, factory);
    }

    /// Create a builder. A tool without a registered builder is a caller bug.
    pub fn create(&self, tool: Tool, pen_width: f64) -> Result<Box<dyn ToolBuilder>, CanvasError> {
        self.factories
            .get(&tool)
            .map(|factory| factory(pen_width))
            .ok_or_else(|| CanvasError::UnknownStatus(format!("{tool:?}")))
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(Tool::Freehand, |_| Box::new(FreehandBuilder::new()));
        registry.register(Tool::Line, |_| Box::new(LineBuilder::new(false)));
        registry.register(Tool::LineSnapped, |_| Box::new(LineBuilder::new(true)));
        registry.register(Tool::Arrow, |w| Box::new(ArrowBuilder::new(w, false)));
        registry.register(Tool::ArrowSnapped, |w| Box::new(ArrowBuilder::new(w, true)));
        registry.register(Tool::Circle, |_| Box::new(EllipseBuilder::circle()));
        registry.register(Tool::Ellipse, |_| Box::new(EllipseBuilder::ellipse()));
        registry.register(Tool::Square, |_| Box::new(RectangleBuilder::square()));
        registry.register(Tool::Rectangle, |_| Box::new(RectangleBuilder::rectangle()));
        registry.register(Tool::Point, |_| Box::new(PointBuilder::new()));
        registry
    }
}

impl fmt::Debug for ToolRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolRegistry")
            .field("tools", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::SerializableColor;

    #[test]
    fn test_status_names_roundtrip() {
        for status in Status::ALL {
            assert_eq!(status.name().parse::<Status>(), Ok(status));
        }
    }

    #[test]
    fn test_unknown_status_is_an_error() {
        assert_eq!(
            "spray-can".parse::<Status>(),
            Err(CanvasError::UnknownStatus("spray-can".to_string()))
        );
    }

    #[test]
    fn test_modes() {
        assert_eq!(Status::Edit.mode(), Mode::Editing);
        assert_eq!(Status::Erase.mode(), Mode::Erasing);
        assert_eq!(Status::CircleFilled.mode(), Mode::Drawing);
        assert_eq!(Status::Erase.tool(), None);
        assert_eq!(Status::SquareFilled.tool(), Some(Tool::Square));
    }

    #[test]
    fn test_styles_per_status() {
        let paint = Paint::fixed(SerializableColor::black());
        let outline = Status::Circle.style(3.0, paint);
        assert!(outline.pen.is_some() && outline.fill.is_none());

        let filled = Status::CircleFilled.style(3.0, paint);
        assert!(filled.pen.is_none() && filled.fill.is_some());

        let arrow = Status::Arrow.style(3.0, paint);
        assert!(arrow.pen.is_some() && arrow.fill.is_some());
        assert_eq!(arrow.join, LineJoin::Miter);
    }

    #[test]
    fn test_registry_has_every_tool() {
        let registry = ToolRegistry::default();
        for status in Status::ALL {
            if let Some(tool) = status.tool() {
                assert!(registry.create(tool, 3.0).is_ok(), "{status}");
            }
        }
        assert!(ToolRegistry::empty().create(Tool::Line, 3.0).is_err());
    }
}
