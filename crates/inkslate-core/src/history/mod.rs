//! Command-based undo/redo.

mod command;

pub use command::{AddItem, ChangePaths, Command, Macro, MoveItems, RemoveItem, ScaleItems};

use crate::scene::Scene;

/// Ordered log of applied commands with a current position.
///
/// Entries before `index` are applied, entries from `index` on have been
/// undone and are dropped by the next push.
#[derive(Debug, Default)]
pub struct CommandStack {
    commands: Vec<Command>,
    index: usize,
    /// Open macros, innermost last.
    recording: Vec<(String, Vec<Command>)>,
}

impl CommandStack {
    /// Create a new empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a command and record it.
    ///
    /// Inside a macro the command joins the macro. Otherwise the top entry
    /// may absorb it, else it becomes a new entry.
    pub fn push(&mut self, scene: &mut Scene, mut command: Command) {
        log::debug!("Redo: {}", command.text());
        command.redo(scene);

        if let Some((_, commands)) = self.recording.last_mut() {
            commands.push(command);
            return;
        }

        self.commands.truncate(self.index);
        if self.commands.last_mut().is_some_and(|top| top.try_merge(&command)) {
            return;
        }
        self.commands.push(command);
        self.index = self.commands.len();
    }

    /// Undo the entry before the current position.
    /// Returns true if undo was performed, false if nothing to undo.
    pub fn undo(&mut self, scene: &mut Scene) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        let command = &mut self.commands[self.index];
        log::debug!("Undo: {}", command.text());
        command.undo(scene);
        true
    }

    /// Redo the entry at the current position.
    /// Returns true if redo was performed, false if nothing to redo.
    pub fn redo(&mut self, scene: &mut Scene) -> bool {
        let Some(command) = self.commands.get_mut(self.index) else {
            return false;
        };
        log::debug!("Redo: {}", command.text());
        command.redo(scene);
        self.index += 1;
        true
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        self.index > 0
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        self.index < self.commands.len()
    }

    /// Number of retained entries, applied or undone.
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Current position.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Start grouping pushes into one undo step. Macros nest.
    pub fn begin_macro(&mut self, text: impl Into<String>) {
        self.recording.push((text.into(), Vec::new()));
    }

    /// Close the innermost macro. An empty macro leaves no entry.
    pub fn end_macro(&mut self) {
        let Some((text, commands)) = self.recording.pop() else {
            log::warn!("end_macro without begin_macro");
            return;
        };
        if commands.is_empty() {
            return;
        }
        let grouped = Command::macro_of(text, commands);
        match self.recording.last_mut() {
            Some((_, outer)) => outer.push(grouped),
            None => {
                self.commands.truncate(self.index);
                self.commands.push(grouped);
                self.index = self.commands.len();
            }
        }
    }

    pub fn is_recording(&self) -> bool {
        !self.recording.is_empty()
    }

    /// End the current drag: the top entry stops absorbing moves.
    pub fn close_merge(&mut self) {
        if let Some(top) = self.index.checked_sub(1).and_then(|i| self.commands.get_mut(i)) {
            top.close_merge();
        }
    }

    /// Undo the top entry and forget it, leaving no redo.
    pub fn discard_top(&mut self, scene: &mut Scene) -> bool {
        if !self.undo(scene) {
            return false;
        }
        self.commands.truncate(self.index);
        true
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.commands.clear();
        self.recording.clear();
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{ItemId, ItemKind, PathItem};
    use crate::style::{Paint, SerializableColor, StrokeStyle};
    use kurbo::{BezPath, Point, Vec2};
    use std::collections::HashSet;

    fn stroke(x: f64) -> PathItem {
        let mut path = BezPath::new();
        path.move_to(Point::new(x, 0.0));
        path.line_to(Point::new(x + 10.0, 5.0));
        path.curve_to(Point::new(x + 12.0, 8.0), Point::new(x + 15.0, 8.0), Point::new(x + 20.0, 0.0));
        PathItem::new(
            ItemKind::Stroke,
            path,
            StrokeStyle::outline(3.0, Paint::fixed(SerializableColor::black())),
        )
    }

    fn ids(scene: &Scene) -> HashSet<ItemId> {
        scene.ids().into_iter().collect()
    }

    #[test]
    fn test_undo_all_adds_restores_scene() {
        let mut scene = Scene::new();
        let mut stack = CommandStack::new();
        let keep = scene.insert(stroke(-50.0));
        let before = ids(&scene);

        for k in 0..5 {
            stack.push(&mut scene, Command::AddItem(AddItem::new(stroke(f64::from(k) * 30.0))));
        }
        assert_eq!(scene.len(), 6);
        while stack.undo(&mut scene) {}
        assert_eq!(ids(&scene), before);
        assert!(scene.get(keep).is_some());
    }

    #[test]
    fn test_redo_reproduces_geometry() {
        let mut scene = Scene::new();
        let mut stack = CommandStack::new();
        let item = stroke(0.0);
        let id = item.id();
        let geometry = item.path().clone();
        stack.push(&mut scene, Command::AddItem(AddItem::new(item)));

        stack.undo(&mut scene);
        assert!(scene.get(id).is_none());
        stack.redo(&mut scene);
        assert_eq!(scene.get(id).map(|i| i.path().clone()), Some(geometry));
    }

    #[test]
    fn test_push_after_undo_discards_tail() {
        let mut scene = Scene::new();
        let mut stack = CommandStack::new();
        stack.push(&mut scene, Command::AddItem(AddItem::new(stroke(0.0))));
        stack.push(&mut scene, Command::AddItem(AddItem::new(stroke(1.0))));
        stack.undo(&mut scene);
        assert!(stack.can_redo());

        stack.push(&mut scene, Command::AddItem(AddItem::new(stroke(2.0))));
        assert_eq!(stack.len(), 2);
        assert!(!stack.can_redo());
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn test_drag_merges_until_closed() {
        let mut scene = Scene::new();
        let mut stack = CommandStack::new();
        let a = scene.insert(stroke(0.0));
        let b = scene.insert(stroke(100.0));

        // Drag A in three steps.
        for x in 1..=3 {
            let old = Vec2::new(f64::from(x - 1), 0.0);
            stack.push(&mut scene, Command::MoveItems(MoveItems::single(a, old, Vec2::new(f64::from(x), 0.0))));
        }
        assert_eq!(stack.len(), 1);
        stack.close_merge();

        // Drag B in two steps.
        for y in 1..=2 {
            let old = Vec2::new(0.0, f64::from(y - 1));
            stack.push(&mut scene, Command::MoveItems(MoveItems::single(b, old, Vec2::new(0.0, f64::from(y)))));
        }
        stack.close_merge();
        assert_eq!(stack.len(), 2);

        stack.undo(&mut scene);
        assert_eq!(scene.get(b).map(|i| i.position), Some(Vec2::ZERO));
        assert_eq!(scene.get(a).map(|i| i.position), Some(Vec2::new(3.0, 0.0)));

        stack.undo(&mut scene);
        assert_eq!(scene.get(a).map(|i| i.position), Some(Vec2::ZERO));
    }

    #[test]
    fn test_macro_is_one_step() {
        let mut scene = Scene::new();
        let mut stack = CommandStack::new();
        stack.begin_macro("Copy");
        stack.push(&mut scene, Command::AddItem(AddItem::new(stroke(0.0))));
        stack.push(&mut scene, Command::AddItem(AddItem::new(stroke(1.0))));
        assert!(stack.is_recording());
        stack.end_macro();

        assert_eq!(stack.len(), 1);
        assert_eq!(scene.len(), 2);
        stack.undo(&mut scene);
        assert!(scene.is_empty());
        stack.redo(&mut scene);
        assert_eq!(scene.len(), 2);
    }

    #[test]
    fn test_empty_macro_leaves_no_entry() {
        let mut stack = CommandStack::new();
        stack.begin_macro("Nothing");
        stack.end_macro();
        assert!(stack.is_empty());
        assert!(!stack.can_undo());
    }

    #[test]
    fn test_discard_top_leaves_no_redo() {
        let mut scene = Scene::new();
        let mut stack = CommandStack::new();
        stack.push(&mut scene, Command::AddItem(AddItem::new(stroke(0.0))));
        assert!(stack.discard_top(&mut scene));
        assert!(scene.is_empty());
        assert!(!stack.can_redo());
        assert!(!stack.discard_top(&mut scene));
    }
}
