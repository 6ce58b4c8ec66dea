use crate::{Matrix3x2, Vector2};

/// An axis-aligned rectangle in position + size form.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a rectangle from `[left, top, right, bottom]` edges.
    pub fn from_ltrb([left, top, right, bottom]: [f32; 4]) -> Self {
        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }

    /// Returns the `[left, top, right, bottom]` edges.
    pub fn to_ltrb(&self) -> [f32; 4] {
        [
            self.x,
            self.y,
            self.x + self.width,
            self.y + self.height,
        ]
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Smallest rectangle containing both. Empty rectangles are ignored.
    pub fn union(&self, other: &Rect) -> Rect {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }

        let [l1, t1, r1, b1] = self.to_ltrb();
        let [l2, t2, r2, b2] = other.to_ltrb();
        Rect::from_ltrb([l1.min(l2), t1.min(t2), r1.max(r2), b1.max(b2)])
    }

    /// Axis-aligned bounds of this rectangle after `transform`.
    pub fn transform_bounds(&self, transform: &Matrix3x2) -> Rect {
        let [left, top, right, bottom] = self.to_ltrb();
        let corners = [
            Vector2::new(left, top),
            Vector2::new(right, top),
            Vector2::new(left, bottom),
            Vector2::new(right, bottom),
        ]
        .map(|p| transform.transform_point(p));

        let (mut min_x, mut min_y) = (f32::INFINITY, f32::INFINITY);
        let (mut max_x, mut max_y) = (f32::NEG_INFINITY, f32::NEG_INFINITY);
        for p in corners {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        Rect::from_ltrb([min_x, min_y, max_x, max_y])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ltrb_conversion() {
        let rect = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(rect.to_ltrb(), [10.0, 20.0, 40.0, 60.0]);
        assert_eq!(Rect::from_ltrb(rect.to_ltrb()), rect);
    }

    #[test]
    fn union_skips_empty() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, -5.0, 10.0, 10.0);
        assert_eq!(a.union(&b), Rect::new(0.0, -5.0, 15.0, 15.0));
        assert_eq!(Rect::default().union(&a), a);
    }

    #[test]
    fn transformed_bounds() {
        let rect = Rect::new(0.0, 0.0, 10.0, 20.0);
        let moved = rect.transform_bounds(&Matrix3x2::translation(5.0, 5.0));
        assert_eq!(moved, Rect::new(5.0, 5.0, 10.0, 20.0));

        let flipped = rect.transform_bounds(&Matrix3x2::scale(-1.0, 2.0));
        assert_eq!(flipped, Rect::new(-10.0, 0.0, 10.0, 40.0));
    }
}
