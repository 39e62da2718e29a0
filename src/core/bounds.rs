use serde::{Deserialize, Serialize};

/// Half-open integer pixel rectangle: `left <= x < right`, `top <= y < bottom`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

/// Viewport rectangle in current-zoom pixel space, already offset by half the
/// world size (so the world's top-left corner is the origin).
pub type ViewportRect = PixelRect;

impl PixelRect {
    /// Creates new bounds from edge coordinates
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Creates bounds from an origin and a size
    pub const fn from_origin_size(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self::new(left, top, left + width, top + height)
    }

    /// Creates bounds of the given size centered on a point
    pub fn from_center_and_size(center_x: i32, center_y: i32, width: u32, height: u32) -> Self {
        let left = center_x - (width / 2) as i32;
        let top = center_y - (height / 2) as i32;
        Self::from_origin_size(left, top, width as i32, height as i32)
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.left <= x && x < self.right && self.top <= y && y < self.bottom
    }

    /// Moves the rectangle by the given offset
    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(
            self.left + dx,
            self.top + dy,
            self.right + dx,
            self.bottom + dy,
        )
    }

    /// Overlap of two rectangles; empty when they are disjoint.
    pub fn intersect(&self, other: &PixelRect) -> PixelRect {
        let rect = PixelRect::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        );
        if rect.is_empty() {
            PixelRect::new(rect.left, rect.top, rect.left, rect.top)
        } else {
            rect
        }
    }

    pub fn intersects(&self, other: &PixelRect) -> bool {
        !self.intersect(other).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_creation() {
        let rect = PixelRect::from_origin_size(10, 20, 30, 40);
        assert_eq!(rect.right, 40);
        assert_eq!(rect.bottom, 60);
        assert_eq!(rect.width(), 30);
        assert_eq!(rect.height(), 40);
    }

    #[test]
    fn test_centered_bounds() {
        let rect = PixelRect::from_center_and_size(0, 0, 512, 512);
        assert_eq!(rect, PixelRect::new(-256, -256, 256, 256));
    }

    #[test]
    fn test_half_open_contains() {
        let rect = PixelRect::new(0, 0, 256, 256);
        assert!(rect.contains(0, 0));
        assert!(rect.contains(255, 255));
        assert!(!rect.contains(256, 0));
        assert!(!rect.contains(0, 256));
    }

    #[test]
    fn test_intersection() {
        let a = PixelRect::new(0, 0, 100, 100);
        let b = PixelRect::new(50, 60, 150, 160);
        assert_eq!(a.intersect(&b), PixelRect::new(50, 60, 100, 100));
        assert!(a.intersects(&b));

        let c = PixelRect::new(100, 0, 200, 100);
        assert!(!a.intersects(&c));
        assert!(a.intersect(&c).is_empty());
    }
}
