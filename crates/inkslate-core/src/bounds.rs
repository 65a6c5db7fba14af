//! Growth policy of the logical drawing surface.
//!
//! The board is conceptually infinite. The bounds only track how far the
//! content and the view have reached, and they never shrink on their own.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// Edge of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Top,
    Bottom,
    Left,
    Right,
}

/// The logical drawing-surface rectangle in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasBounds {
    rect: Rect,
}

impl CanvasBounds {
    /// Start from the initially visible area.
    pub fn new(initial: Rect) -> Self {
        Self { rect: initial.abs() }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Grow every side that `content` crosses by steps of half the view
    /// extent until it fits. Returns true if the bounds changed.
    pub fn include(&mut self, content: Rect, view: Rect) -> bool {
        let step_x = (view.width() / 2.0).max(1.0);
        let step_y = (view.height() / 2.0).max(1.0);
        let before = self.rect;
        let r = &mut self.rect;
        if content.x0 < r.x0 {
            r.x0 -= ((r.x0 - content.x0) / step_x).ceil() * step_x;
        }
        if content.x1 > r.x1 {
            r.x1 += ((content.x1 - r.x1) / step_x).ceil() * step_x;
        }
        if content.y0 < r.y0 {
            r.y0 -= ((r.y0 - content.y0) / step_y).ceil() * step_y;
        }
        if content.y1 > r.y1 {
            r.y1 += ((content.y1 - r.y1) / step_y).ceil() * step_y;
        }
        self.rect != before
    }

    /// Grow by exactly as much as a panned view sticks out.
    pub fn follow_view(&mut self, view: Rect) -> bool {
        let grown = self.rect.union(view);
        let changed = grown != self.rect;
        self.rect = grown;
        changed
    }

    /// Move the view half its extent towards a side, growing the bounds
    /// if the new view would leave them. Returns the new view center.
    pub fn extend(&mut self, side: Side, view: Rect) -> Point {
        let center = view.center();
        let (half_w, half_h) = (view.width() / 2.0, view.height() / 2.0);
        let target = match side {
            Side::Top => Point::new(center.x, center.y - half_h),
            Side::Bottom => Point::new(center.x, center.y + half_h),
            Side::Left => Point::new(center.x - half_w, center.y),
            Side::Right => Point::new(center.x + half_w, center.y),
        };
        let r = &mut self.rect;
        match side {
            Side::Top => r.y0 = r.y0.min(target.y - half_h),
            Side::Bottom => r.y1 = r.y1.max(target.y + half_h),
            Side::Left => r.x0 = r.x0.min(target.x - half_w),
            Side::Right => r.x1 = r.x1.max(target.x + half_w),
        }
        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn view() -> Rect {
        Rect::new(0.0, 0.0, 800.0, 600.0)
    }

    #[test]
    fn test_include_grows_by_half_view_steps() {
        let mut bounds = CanvasBounds::new(view());
        assert!(bounds.include(Rect::new(100.0, 100.0, 850.0, 200.0), view()));
        assert!((bounds.rect().x1 - 1200.0).abs() < 1e-9);
        assert!((bounds.rect().x0).abs() < 1e-9);

        assert!(!bounds.include(Rect::new(10.0, 10.0, 20.0, 20.0), view()));
    }

    #[test]
    fn test_follow_view_never_shrinks() {
        let mut bounds = CanvasBounds::new(view());
        assert!(bounds.follow_view(Rect::new(-30.0, 0.0, 770.0, 600.0)));
        assert!((bounds.rect().x0 + 30.0).abs() < 1e-9);
        assert!((bounds.rect().x1 - 800.0).abs() < 1e-9);
        assert!(!bounds.follow_view(Rect::new(100.0, 100.0, 200.0, 200.0)));
    }

    #[test]
    fn test_extend_bottom() {
        let mut bounds = CanvasBounds::new(view());
        let center = bounds.extend(Side::Bottom, view());
        assert_eq!(center, Point::new(400.0, 600.0));
        assert!((bounds.rect().y1 - 900.0).abs() < 1e-9);
        assert!((bounds.rect().y0).abs() < 1e-9);
    }

    #[test]
    fn test_extend_left_inside_bounds_keeps_them() {
        let mut bounds = CanvasBounds::new(Rect::new(-2000.0, 0.0, 800.0, 600.0));
        bounds.extend(Side::Left, view());
        assert!((bounds.rect().x0 + 2000.0).abs() < 1e-9);
    }
}
