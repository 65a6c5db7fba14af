//! Unified pointer/touch input model.
//!
//! Mouse, pen and touch contacts all arrive as [`PointerSample`]s. Two-finger
//! pan and pinch are delivered separately as [`GestureEvent`]s.

use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Identifies one contact (mouse, pen, or a single finger).
pub type SourceId = u64;

/// One sample of a contact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub source: SourceId,
    /// Position in screen coordinates.
    pub position: Point,
    /// Reported contact ellipse, `None` for mouse and devices without one.
    pub contact: Option<Size>,
}

impl PointerSample {
    pub fn new(source: SourceId, position: Point) -> Self {
        Self {
            source,
            position,
            contact: None,
        }
    }

    pub fn with_contact(mut self, contact: Size) -> Self {
        self.contact = Some(contact);
        self
    }
}

/// Pointer event type for unified mouse/touch handling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down(PointerSample),
    Move(PointerSample),
    Up(PointerSample),
    /// The platform aborted the contact. The position may be unknown.
    Cancel {
        source: SourceId,
        position: Option<Point>,
    },
}

impl PointerEvent {
    pub fn source(&self) -> SourceId {
        match self {
            PointerEvent::Down(s) | PointerEvent::Move(s) | PointerEvent::Up(s) => s.source,
            PointerEvent::Cancel { source, .. } => *source,
        }
    }

    pub fn position(&self) -> Option<Point> {
        match self {
            PointerEvent::Down(s) | PointerEvent::Move(s) | PointerEvent::Up(s) => Some(s.position),
            PointerEvent::Cancel { position, .. } => *position,
        }
    }
}

/// Two-finger gestures.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GestureEvent {
    /// Pan by a screen delta.
    Pan { delta: Vec2 },
    /// Zoom by `scale` around a screen point.
    Pinch { scale: f64, center: Point },
}

/// Tracks active contacts and the primary drag.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Active contacts and their latest screen positions.
    contacts: HashMap<SourceId, Point>,
    /// Contact that started the current gesture.
    primary: Option<SourceId>,
    /// Start position of current drag operation.
    pub drag_start: Option<Point>,
    /// Current pointer position in screen coordinates.
    pub pointer_position: Point,
    /// Whether the primary contact moved since it went down.
    moved: bool,
}

impl InputState {
    /// Create a new input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a pointer event.
    pub fn handle_pointer_event(&mut self, event: &PointerEvent) {
        match *event {
            PointerEvent::Down(sample) => {
                self.contacts.insert(sample.source, sample.position);
                if self.primary.is_none() {
                    self.primary = Some(sample.source);
                    self.drag_start = Some(sample.position);
                    self.pointer_position = sample.position;
                    self.moved = false;
                }
            }
            PointerEvent::Move(sample) => {
                if let Some(position) = self.contacts.get_mut(&sample.source) {
                    *position = sample.position;
                }
                if self.is_primary(sample.source) {
                    self.pointer_position = sample.position;
                    self.moved |= self.drag_start != Some(sample.position);
                }
            }
            PointerEvent::Up(sample) => {
                self.contacts.remove(&sample.source);
                if self.is_primary(sample.source) {
                    self.pointer_position = sample.position;
                }
            }
            PointerEvent::Cancel { source, position } => {
                self.contacts.remove(&source);
                if let (true, Some(position)) = (self.is_primary(source), position) {
                    self.pointer_position = position;
                }
            }
        }
    }

    /// Forget the primary contact once its gesture is handled.
    pub fn end_gesture(&mut self) {
        self.primary = None;
        self.drag_start = None;
        self.moved = false;
    }

    /// Drop all state, e.g. after a lost end event.
    pub fn reset(&mut self) {
        self.contacts.clear();
        self.end_gesture();
    }

    pub fn is_primary(&self, source: SourceId) -> bool {
        self.primary == Some(source)
    }

    pub fn primary(&self) -> Option<SourceId> {
        self.primary
    }

    /// Number of contacts currently down.
    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_multi_touch(&self) -> bool {
        self.contacts.len() > 1
    }

    pub fn has_moved(&self) -> bool {
        self.moved
    }

    /// A release without motion at the start position.
    pub fn is_tap(&self, up: Point) -> bool {
        !self.moved && self.drag_start == Some(up)
    }
}
