//! Scene: the z-ordered item store.

use crate::item::{ItemId, PathItem};
use crate::style::Palette;
use kurbo::{Point, Rect};
use std::collections::HashMap;

/// All items on the board, keyed by id, plus their stacking order.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    items: HashMap<ItemId, PathItem>,
    /// Z-order of items (back to front).
    z_order: Vec<ItemId>,
    /// Items that follow the palette foreground.
    palette_observers: Vec<ItemId>,
}

impl Scene {
    /// Create a new empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item on top. Returns its id.
    pub fn insert(&mut self, item: PathItem) -> ItemId {
        let index = self.z_order.len();
        self.insert_at(index, item)
    }

    /// Add an item at a z-index, clamped to the top.
    pub fn insert_at(&mut self, index: usize, item: PathItem) -> ItemId {
        let id = item.id();
        if self.items.contains_key(&id) {
            self.z_order.retain(|&other| other != id);
        }
        self.z_order.insert(index.min(self.z_order.len()), id);
        if item.style.is_foreground_linked() && !self.palette_observers.contains(&id) {
            self.palette_observers.push(id);
        }
        self.items.insert(id, item);
        id
    }

    /// Take an item out. Returns its former z-index and the item.
    pub fn remove(&mut self, id: ItemId) -> Option<(usize, PathItem)> {
        let item = self.items.remove(&id)?;
        let index = self.z_order.iter().position(|&other| other == id).unwrap_or(self.z_order.len());
        self.z_order.retain(|&other| other != id);
        self.palette_observers.retain(|&other| other != id);
        Some((index, item))
    }

    /// Clear all items from the scene.
    pub fn clear(&mut self) {
        self.items.clear();
        self.z_order.clear();
        self.palette_observers.clear();
    }

    /// Get an item by ID.
    pub fn get(&self, id: ItemId) -> Option<&PathItem> {
        self.items.get(&id)
    }

    /// Get a mutable reference to an item by ID.
    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut PathItem> {
        self.items.get_mut(&id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    /// Z-index of an item.
    pub fn index_of(&self, id: ItemId) -> Option<usize> {
        self.z_order.iter().position(|&other| other == id)
    }

    /// Ids back to front.
    pub fn ids(&self) -> Vec<ItemId> {
        self.z_order.clone()
    }

    /// Get items in z-order (back to front).
    pub fn items_ordered(&self) -> impl Iterator<Item = &PathItem> {
        self.z_order.iter().filter_map(|id| self.items.get(id))
    }

    /// Check if the scene is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Get the bounding box of all items.
    pub fn bounds(&self) -> Option<Rect> {
        self.items
            .values()
            .filter_map(PathItem::bounds)
            .reduce(|acc, r| acc.union(r))
    }

    /// Topmost item hit by a world point.
    pub fn item_at(&self, point: Point, tolerance: f64) -> Option<ItemId> {
        self.z_order
            .iter()
            .rev()
            .copied()
            .find(|id| self.items.get(id).is_some_and(|item| item.hit_test(point, tolerance)))
    }

    /// Items whose bounding shape overlaps a world rectangle, front to back.
    pub fn items_intersecting(&self, rect: Rect) -> Vec<ItemId> {
        self.z_order
            .iter()
            .rev()
            .copied()
            .filter(|id| self.items.get(id).is_some_and(|item| item.intersects_rect(rect)))
            .collect()
    }

    /// Selected ids back to front.
    pub fn selected(&self) -> Vec<ItemId> {
        self.items_ordered().filter(|item| item.selected).map(PathItem::id).collect()
    }

    pub fn has_selection(&self) -> bool {
        self.items.values().any(|item| item.selected)
    }

    pub fn clear_selection(&mut self) {
        for item in self.items.values_mut() {
            item.selected = false;
        }
    }

    /// Select exactly the given item.
    pub fn select_only(&mut self, id: ItemId) {
        for (other, item) in self.items.iter_mut() {
            item.selected = *other == id;
        }
    }

    /// Select every item overlapping a world rectangle. Returns the count.
    pub fn select_in_rect(&mut self, rect: Rect) -> usize {
        let mut count = 0;
        for item in self.items.values_mut() {
            item.selected = item.intersects_rect(rect);
            count += usize::from(item.selected);
        }
        count
    }

    /// Notify foreground-linked items of a palette change.
    /// Returns the number of items whose color changed.
    pub fn apply_palette(&mut self, palette: &Palette) -> usize {
        let mut changed = 0;
        for id in &self.palette_observers {
            if self.items.get_mut(id).is_some_and(|item| item.apply_palette(palette)) {
                changed += 1;
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemKind;
    use crate::style::{Paint, PenColor, SerializableColor, StrokeStyle};
    use kurbo::BezPath;

    fn line(x: f64, paint: Paint) -> PathItem {
        let mut path = BezPath::new();
        path.move_to(Point::new(x, 0.0));
        path.line_to(Point::new(x + 10.0, 0.0));
        PathItem::new(ItemKind::Stroke, path, StrokeStyle::outline(2.0, paint))
    }

    fn black() -> Paint {
        Paint::fixed(SerializableColor::black())
    }

    #[test]
    fn test_insert_and_remove() {
        let mut scene = Scene::new();
        let a = scene.insert(line(0.0, black()));
        let b = scene.insert(line(20.0, black()));
        assert_eq!(scene.len(), 2);

        let (index, item) = scene.remove(a).unwrap();
        assert_eq!(index, 0);
        assert_eq!(item.id(), a);
        assert_eq!(scene.ids(), vec![b]);
        assert!(scene.remove(a).is_none());
    }

    #[test]
    fn test_insert_at_clamps() {
        let mut scene = Scene::new();
        let a = scene.insert(line(0.0, black()));
        let b = scene.insert_at(0, line(20.0, black()));
        let c = scene.insert_at(99, line(40.0, black()));
        assert_eq!(scene.ids(), vec![b, a, c]);
    }

    #[test]
    fn test_item_at_prefers_topmost() {
        let mut scene = Scene::new();
        let _below = scene.insert(line(0.0, black()));
        let above = scene.insert(line(0.0, black()));
        assert_eq!(scene.item_at(Point::new(5.0, 0.0), 1.0), Some(above));
        assert_eq!(scene.item_at(Point::new(5.0, 50.0), 1.0), None);
    }

    #[test]
    fn test_rubber_band_selection() {
        let mut scene = Scene::new();
        let a = scene.insert(line(0.0, black()));
        let _b = scene.insert(line(100.0, black()));
        assert_eq!(scene.select_in_rect(Rect::new(-5.0, -5.0, 20.0, 5.0)), 1);
        assert_eq!(scene.selected(), vec![a]);
        scene.clear_selection();
        assert!(!scene.has_selection());
    }

    #[test]
    fn test_palette_observers() {
        let mut scene = Scene::new();
        let light = Palette::light();
        let linked = scene.insert(line(0.0, PenColor::Foreground.resolve(&light)));
        let fixed = scene.insert(line(20.0, Paint::fixed(SerializableColor::rgb(255, 0, 0))));

        let dark = Palette::dark();
        assert_eq!(scene.apply_palette(&dark), 1);
        assert_eq!(scene.get(linked).and_then(|i| i.style.pen).map(|p| p.color), Some(dark.foreground));
        assert_eq!(
            scene.get(fixed).and_then(|i| i.style.pen).map(|p| p.color),
            Some(SerializableColor::rgb(255, 0, 0))
        );

        scene.remove(linked);
        assert_eq!(scene.apply_palette(&light), 0);
    }
}
