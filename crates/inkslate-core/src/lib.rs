//! Inkslate Core Library
//!
//! Platform-agnostic interaction engine for the inkslate whiteboard: the
//! scene of path items, drawing tools, the snap guide, the eraser, undo
//! history and the view, driven by pointer events through [`Canvas`].

pub mod bounds;
pub mod camera;
pub mod canvas;
pub mod error;
pub mod eraser;
pub mod events;
pub mod guide;
pub mod history;
pub mod input;
pub mod item;
pub mod scene;
pub mod settings;
pub mod storage;
pub mod style;
pub mod tools;
pub mod touch;

pub use bounds::{CanvasBounds, Side};
pub use camera::Camera;
pub use canvas::{Canvas, InteractionMode};
pub use error::{CanvasError, StorageError, StorageResult};
pub use eraser::{EraseSession, Eraser};
pub use events::CanvasEvent;
pub use guide::{Guide, GuideHandle};
pub use history::{Command, CommandStack};
pub use input::{GestureEvent, InputState, PointerEvent, PointerSample, SourceId};
pub use item::{ItemId, ItemKind, PaperKind, PathItem};
pub use scene::Scene;
pub use settings::BoardSettings;
pub use storage::{FileSettings, MemorySettings, SettingsStore};
pub use style::{Palette, PenColor, SerializableColor, StrokeStyle};
pub use tools::{Mode, Status, Tool, ToolBuilder, ToolRegistry};
pub use touch::{ContactClass, TouchClassifier};
