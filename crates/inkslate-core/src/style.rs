//! Colors, palettes and stroke descriptors.

use crate::error::CanvasError;
use peniko::Color;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    pub const fn black() -> Self {
        Self::rgb(0, 0, 0)
    }

    pub const fn white() -> Self {
        Self::rgb(255, 255, 255)
    }

    /// Parse `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().strip_prefix('#')?;
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            6 => Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?)),
            8 => Some(Self::new(channel(0)?, channel(2)?, channel(4)?, channel(6)?)),
            _ => None,
        }
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// Application color scheme. Items drawn in the foreground color follow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    /// Text/ink color of the scheme.
    pub foreground: SerializableColor,
    pub background: SerializableColor,
    /// Muted color used for the eraser outline and the guide.
    pub placeholder: SerializableColor,
}

impl Palette {
    pub const fn light() -> Self {
        Self {
            foreground: SerializableColor::black(),
            background: SerializableColor::white(),
            placeholder: SerializableColor::rgb(127, 127, 127),
        }
    }

    pub const fn dark() -> Self {
        Self {
            foreground: SerializableColor::rgb(235, 235, 235),
            background: SerializableColor::rgb(30, 30, 30),
            placeholder: SerializableColor::rgb(140, 140, 140),
        }
    }
}

impl Default for Palette {
    fn default() -> Self {
        Self::light()
    }
}

/// Pen color as chosen by the user: either linked to the palette foreground or fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PenColor {
    #[default]
    Foreground,
    Fixed(SerializableColor),
}

impl PenColor {
    /// Resolve against a palette into a paint that remembers the link.
    pub fn resolve(self, palette: &Palette) -> Paint {
        match self {
            PenColor::Foreground => Paint {
                color: palette.foreground,
                linked_to_foreground: true,
            },
            PenColor::Fixed(color) => Paint::fixed(color),
        }
    }
}

impl FromStr for PenColor {
    type Err = CanvasError;

    /// Accepts `foreground`, the toolbar color names, or a hex color.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let color = match s.trim() {
            "foreground" => return Ok(PenColor::Foreground),
            "royalblue" => SerializableColor::rgb(65, 105, 225),
            "red" => SerializableColor::rgb(255, 0, 0),
            "green" => SerializableColor::rgb(0, 128, 0),
            "black" => SerializableColor::black(),
            "white" => SerializableColor::white(),
            other => {
                SerializableColor::from_hex(other).ok_or_else(|| CanvasError::UnknownColor(s.to_string()))?
            }
        };
        Ok(PenColor::Fixed(color))
    }
}

/// A resolved color on an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paint {
    pub color: SerializableColor,
    /// Re-resolved whenever the palette changes.
    pub linked_to_foreground: bool,
}

impl Paint {
    pub fn fixed(color: SerializableColor) -> Self {
        Self {
            color,
            linked_to_foreground: false,
        }
    }
}

/// Line cap style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineCap {
    Butt,
    Square,
    #[default]
    Round,
}

/// Line join style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LineJoin {
    Bevel,
    Miter,
    #[default]
    Round,
}

/// Stroke descriptor of a path item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    /// Pen width in screen units.
    pub width: f64,
    /// Pen color, `None` draws no outline.
    pub pen: Option<Paint>,
    pub cap: LineCap,
    pub join: LineJoin,
    /// Fill color, `None` leaves the interior empty.
    pub fill: Option<Paint>,
}

impl StrokeStyle {
    /// Plain outline with round caps and joins.
    pub fn outline(width: f64, paint: Paint) -> Self {
        Self {
            width,
            pen: Some(paint),
            cap: LineCap::Round,
            join: LineJoin::Round,
            fill: None,
        }
    }

    /// Fill only, no outline.
    pub fn filled(paint: Paint) -> Self {
        Self {
            width: 0.0,
            pen: None,
            cap: LineCap::Round,
            join: LineJoin::Round,
            fill: Some(paint),
        }
    }

    /// Whether the item has a non-empty fill. Filled items are always erased as a whole.
    pub fn is_filled(&self) -> bool {
        self.fill.is_some()
    }

    /// Get the pen color as a peniko Color.
    pub fn stroke(&self) -> Option<Color> {
        self.pen.map(|p| p.color.into())
    }

    /// Get the fill color as a peniko Color.
    pub fn fill(&self) -> Option<Color> {
        self.fill.map(|p| p.color.into())
    }

    /// kurbo stroke parameters for outline rendering.
    pub fn to_kurbo(&self) -> kurbo::Stroke {
        let cap = match self.cap {
            LineCap::Butt => kurbo::Cap::Butt,
            LineCap::Square => kurbo::Cap::Square,
            LineCap::Round => kurbo::Cap::Round,
        };
        let join = match self.join {
            LineJoin::Bevel => kurbo::Join::Bevel,
            LineJoin::Miter => kurbo::Join::Miter,
            LineJoin::Round => kurbo::Join::Round,
        };
        kurbo::Stroke::new(self.width).with_caps(cap).with_join(join)
    }

    /// Swap every foreground-linked paint to the palette's foreground.
    /// Returns true if anything changed.
    pub fn apply_palette(&mut self, palette: &Palette) -> bool {
        let mut changed = false;
        for paint in [self.pen.as_mut(), self.fill.as_mut()].into_iter().flatten() {
            if paint.linked_to_foreground && paint.color != palette.foreground {
                paint.color = palette.foreground;
                changed = true;
            }
        }
        changed
    }

    /// Whether any paint follows the foreground color.
    pub fn is_foreground_linked(&self) -> bool {
        self.pen.is_some_and(|p| p.linked_to_foreground) || self.fill.is_some_and(|p| p.linked_to_foreground)
    }
}
