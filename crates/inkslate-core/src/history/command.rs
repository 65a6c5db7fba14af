//! Undoable scene mutations.

use crate::item::{ItemId, PathItem};
use crate::scene::Scene;
use kurbo::{BezPath, Vec2};
use std::collections::HashMap;

/// A recorded mutation. `redo` applies it, `undo` reverts it.
///
/// Every variant is idempotent under `redo`: a command built from a change
/// that already happened can be pushed without disturbing the scene.
#[derive(Debug, Clone)]
pub enum Command {
    AddItem(AddItem),
    RemoveItem(RemoveItem),
    ChangePaths(ChangePaths),
    MoveItems(MoveItems),
    ScaleItems(ScaleItems),
    Macro(Macro),
}

/// Put an item into the scene.
#[derive(Debug, Clone)]
pub struct AddItem {
    pub id: ItemId,
    /// Z-index to insert at, `None` for the top.
    index: Option<usize>,
    /// Held while the item is not in the scene.
    item: Option<PathItem>,
}

impl AddItem {
    pub fn new(item: PathItem) -> Self {
        Self {
            id: item.id(),
            index: None,
            item: Some(item),
        }
    }

    /// Insert at a given z-index instead of on top.
    pub fn at(index: usize, item: PathItem) -> Self {
        Self {
            index: Some(index),
            ..Self::new(item)
        }
    }
}

/// Take an item out of the scene.
#[derive(Debug, Clone)]
pub struct RemoveItem {
    pub id: ItemId,
    index: usize,
    /// Held while the item is not in the scene.
    item: Option<PathItem>,
}

impl RemoveItem {
    pub fn new(id: ItemId) -> Self {
        Self { id, index: 0, item: None }
    }

    /// Record an item that was already taken out of the scene at `index`.
    pub fn detached(index: usize, item: PathItem) -> Self {
        Self {
            id: item.id(),
            index,
            item: Some(item),
        }
    }
}

/// Batch geometry change, one `(id, after, before)` triple per item.
#[derive(Debug, Clone)]
pub struct ChangePaths {
    changes: Vec<(ItemId, BezPath, BezPath)>,
}

impl ChangePaths {
    pub fn new(changes: Vec<(ItemId, BezPath, BezPath)>) -> Self {
        Self { changes }
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

/// Position changes of whole items, keyed by item.
///
/// Successive moves merge into one entry until the drag is closed. Each
/// item keeps the position it had before the first move of the drag.
#[derive(Debug, Clone, Default)]
pub struct MoveItems {
    moves: HashMap<ItemId, (Vec2, Vec2)>,
    closed: bool,
}

impl MoveItems {
    pub fn new() -> Self {
        Self::default()
    }

    /// Single move from `old` to `new`.
    pub fn single(id: ItemId, old: Vec2, new: Vec2) -> Self {
        let mut moves = Self::new();
        moves.insert(id, old, new);
        moves
    }

    pub fn insert(&mut self, id: ItemId, old: Vec2, new: Vec2) {
        self.moves
            .entry(id)
            .and_modify(|(_, to)| *to = new)
            .or_insert((old, new));
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.moves.contains_key(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Stop absorbing further moves.
    pub fn close(&mut self) {
        self.closed = true;
    }

    fn absorb(&mut self, next: &MoveItems) -> bool {
        if self.closed {
            return false;
        }
        for (id, (old, new)) in &next.moves {
            self.insert(*id, *old, *new);
        }
        true
    }
}

/// Scale changes, one `(id, old, new)` triple per item.
#[derive(Debug, Clone)]
pub struct ScaleItems {
    changes: Vec<(ItemId, f64, f64)>,
}

impl ScaleItems {
    pub fn new(changes: Vec<(ItemId, f64, f64)>) -> Self {
        Self { changes }
    }
}

/// Commands undone and redone as one step.
#[derive(Debug, Clone)]
pub struct Macro {
    pub text: String,
    pub commands: Vec<Command>,
}

impl Command {
    /// Group commands into one undo step.
    pub fn macro_of(text: impl Into<String>, commands: Vec<Command>) -> Self {
        Command::Macro(Macro {
            text: text.into(),
            commands,
        })
    }

    /// Short description for logs.
    pub fn text(&self) -> &str {
        match self {
            Command::AddItem(_) => "Add item",
            Command::RemoveItem(_) => "Remove item",
            Command::ChangePaths(_) => "Change paths",
            Command::MoveItems(_) => "Move items",
            Command::ScaleItems(_) => "Scale items",
            Command::Macro(m) => &m.text,
        }
    }

    pub fn redo(&mut self, scene: &mut Scene) {
        match self {
            Command::AddItem(cmd) => {
                if let Some(item) = cmd.item.take() {
                    match cmd.index {
                        Some(index) => {
                            scene.insert_at(index, item);
                        }
                        None => {
                            scene.insert(item);
                        }
                    }
                }
            }
            Command::RemoveItem(cmd) => {
                if let Some((index, item)) = scene.remove(cmd.id) {
                    cmd.index = index;
                    cmd.item = Some(item);
                }
            }
            Command::ChangePaths(cmd) => {
                for (id, after, _) in &cmd.changes {
                    if let Some(item) = scene.get_mut(*id) {
                        item.set_path(after.clone());
                    }
                }
            }
            Command::MoveItems(cmd) => {
                for (id, (_, new)) in &cmd.moves {
                    if let Some(item) = scene.get_mut(*id) {
                        item.position = *new;
                    }
                }
            }
            Command::ScaleItems(cmd) => {
                for (id, _, new) in &cmd.changes {
                    if let Some(item) = scene.get_mut(*id) {
                        item.scale = *new;
                    }
                }
            }
            Command::Macro(m) => {
                for command in &mut m.commands {
                    command.redo(scene);
                }
            }
        }
    }

    pub fn undo(&mut self, scene: &mut Scene) {
        match self {
            Command::AddItem(cmd) => {
                if let Some((index, item)) = scene.remove(cmd.id) {
                    cmd.index = Some(index);
                    cmd.item = Some(item);
                }
            }
            Command::RemoveItem(cmd) => {
                if let Some(item) = cmd.item.take() {
                    scene.insert_at(cmd.index, item);
                }
            }
            Command::ChangePaths(cmd) => {
                for (id, _, before) in cmd.changes.iter().rev() {
                    if let Some(item) = scene.get_mut(*id) {
                        item.set_path(before.clone());
                    }
                }
            }
            Command::MoveItems(cmd) => {
                for (id, (old, _)) in &cmd.moves {
                    if let Some(item) = scene.get_mut(*id) {
                        item.position = *old;
                    }
                }
            }
            Command::ScaleItems(cmd) => {
                for (id, old, _) in &cmd.changes {
                    if let Some(item) = scene.get_mut(*id) {
                        item.scale = *old;
                    }
                }
            }
            Command::Macro(m) => {
                for command in m.commands.iter_mut().rev() {
                    command.undo(scene);
                }
            }
        }
    }

    /// Offer `next` to this command. Returns true if it was absorbed.
    pub fn try_merge(&mut self, next: &Command) -> bool {
        match (self, next) {
            (Command::MoveItems(top), Command::MoveItems(next)) => top.absorb(next),
            _ => false,
        }
    }

    /// Mark a move command as finished so the next drag gets its own step.
    pub fn close_merge(&mut self) {
        if let Command::MoveItems(moves) = self {
            moves.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemKind;
    use crate::style::{Paint, SerializableColor, StrokeStyle};
    use kurbo::Point;

    fn dot() -> PathItem {
        let mut path = BezPath::new();
        path.move_to(Point::new(0.0, 0.0));
        path.line_to(Point::new(1.0, 1.0));
        PathItem::new(
            ItemKind::Stroke,
            path,
            StrokeStyle::outline(1.0, Paint::fixed(SerializableColor::black())),
        )
    }

    #[test]
    fn test_add_and_undo() {
        let mut scene = Scene::new();
        let mut cmd = Command::AddItem(AddItem::new(dot()));
        cmd.redo(&mut scene);
        assert_eq!(scene.len(), 1);
        cmd.undo(&mut scene);
        assert!(scene.is_empty());
        cmd.redo(&mut scene);
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_remove_restores_z_index() {
        let mut scene = Scene::new();
        let a = scene.insert(dot());
        let b = scene.insert(dot());
        let c = scene.insert(dot());
        let mut cmd = Command::RemoveItem(RemoveItem::new(b));
        cmd.redo(&mut scene);
        assert_eq!(scene.ids(), vec![a, c]);
        cmd.undo(&mut scene);
        assert_eq!(scene.ids(), vec![a, b, c]);
    }

    #[test]
    fn test_move_merge_keeps_first_origin() {
        let id = ItemId::new_v4();
        let mut top = Command::MoveItems(MoveItems::single(id, Vec2::ZERO, Vec2::new(1.0, 0.0)));
        let next = Command::MoveItems(MoveItems::single(id, Vec2::new(1.0, 0.0), Vec2::new(2.0, 0.0)));
        assert!(top.try_merge(&next));
        let Command::MoveItems(moves) = &top else { unreachable!() };
        assert_eq!(moves.moves.get(&id), Some(&(Vec2::ZERO, Vec2::new(2.0, 0.0))));

        top.close_merge();
        assert!(!top.try_merge(&next));
    }

    #[test]
    fn test_other_commands_never_merge() {
        let mut add = Command::AddItem(AddItem::new(dot()));
        assert!(!add.try_merge(&Command::AddItem(AddItem::new(dot()))));
    }
}
