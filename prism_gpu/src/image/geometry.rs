/// Integer rectangles used for image bounds and subsets

use glam::UVec2;

/// Integer rectangle, half-open on the right and bottom edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct IRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl IRect {
    pub const fn from_ltrb(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    pub const fn from_xywh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self::from_ltrb(x, y, x.saturating_add(width), y.saturating_add(height))
    }

    /// Rectangle at the origin covering `size`
    pub fn from_size(size: UVec2) -> Self {
        Self::from_ltrb(0, 0, size.x.min(i32::MAX as u32) as i32, size.y.min(i32::MAX as u32) as i32)
    }

    pub fn width(&self) -> i32 {
        self.right.saturating_sub(self.left)
    }

    pub fn height(&self) -> i32 {
        self.bottom.saturating_sub(self.top)
    }

    /// Width and height, zero when empty
    pub fn size(&self) -> UVec2 {
        if self.is_empty() {
            return UVec2::ZERO;
        }
        UVec2::new(self.width() as u32, self.height() as u32)
    }

    pub fn is_empty(&self) -> bool {
        self.left >= self.right || self.top >= self.bottom
    }

    /// True when `other` is non-empty and lies entirely inside `self`
    pub fn contains(&self, other: &IRect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.left <= other.left
            && self.top <= other.top
            && self.right >= other.right
            && self.bottom >= other.bottom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xywh_and_size() {
        let r = IRect::from_xywh(2, 3, 10, 4);
        assert_eq!(r, IRect::from_ltrb(2, 3, 12, 7));
        assert_eq!(r.size(), UVec2::new(10, 4));
        assert!(!r.is_empty());
    }

    #[test]
    fn test_empty_rects() {
        assert!(IRect::from_xywh(0, 0, 0, 5).is_empty());
        assert!(IRect::from_ltrb(5, 5, 1, 9).is_empty());
        assert_eq!(IRect::from_ltrb(5, 5, 1, 9).size(), UVec2::ZERO);
        // One empty axis empties the whole rectangle
        assert_eq!(IRect::from_xywh(0, 0, 0, 5).size(), UVec2::ZERO);
        assert_eq!(IRect::from_xywh(3, 3, 7, -2).size(), UVec2::ZERO);
    }

    #[test]
    fn test_contains() {
        let bounds = IRect::from_size(UVec2::new(16, 16));
        assert!(bounds.contains(&IRect::from_xywh(0, 0, 16, 16)));
        assert!(bounds.contains(&IRect::from_xywh(4, 4, 2, 2)));
        assert!(!bounds.contains(&IRect::from_xywh(15, 0, 2, 2)));
        assert!(!bounds.contains(&IRect::from_xywh(-1, 0, 2, 2)));
        assert!(!bounds.contains(&IRect::from_xywh(4, 4, 0, 0)));
    }
}
