//! Axis-aligned rectangles in frame pixel coordinates.

/// Rectangle given by its top-left corner and size, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size.
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle from `[x1, y1, x2, y2]` corners.
    pub fn from_corners(corners: [f32; 4]) -> Self {
        let [x1, y1, x2, y2] = corners;
        Self::new(x1, y1, x2 - x1, y2 - y1)
    }

    /// Returns the right edge.
    pub fn x2(&self) -> f32 {
        self.x + self.width
    }

    /// Returns the bottom edge.
    pub fn y2(&self) -> f32 {
        self.y + self.height
    }

    /// Returns `[x1, y1, x2, y2]`.
    pub fn to_corners(&self) -> [f32; 4] {
        [self.x, self.y, self.x2(), self.y2()]
    }

    /// Returns the area; degenerate rectangles have zero area.
    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Returns the area of the overlap with `other`.
    pub fn intersection_area(&self, other: &Rect) -> f32 {
        let x1 = self.x.max(other.x);
        let y1 = self.y.max(other.y);
        let x2 = self.x2().min(other.x2());
        let y2 = self.y2().min(other.y2());
        (x2 - x1).max(0.0) * (y2 - y1).max(0.0)
    }

    /// Intersection over union using raw floating-point edges.
    ///
    /// Returns 0 when the rectangles do not overlap or the union is empty.
    pub fn iou(&self, other: &Rect) -> f32 {
        let inter = self.intersection_area(other);
        if inter <= 0.0 {
            return 0.0;
        }
        let union = self.area() + other.area() - inter;
        if union > 0.0 {
            inter / union
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Rect;

    #[test]
    fn iou_of_identical_rects_is_one() {
        let r = Rect::new(3.0, 4.0, 10.0, 5.0);
        assert!((r.iou(&r) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn iou_matches_hand_computation() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(1.0, 1.0, 10.0, 10.0);
        let expected = 81.0 / (100.0 + 100.0 - 81.0);
        assert!((a.iou(&b) - expected).abs() < 1e-6);
        assert!((b.iou(&a) - expected).abs() < 1e-6);
    }

    #[test]
    fn touching_rects_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(10.0, 0.0, 10.0, 10.0);
        assert_eq!(a.intersection_area(&b), 0.0);
        assert_eq!(a.iou(&b), 0.0);
    }

    #[test]
    fn degenerate_rects_have_zero_iou() {
        let a = Rect::new(5.0, 5.0, 0.0, 0.0);
        assert_eq!(a.area(), 0.0);
        assert_eq!(a.iou(&a), 0.0);
    }

    #[test]
    fn corners_round_trip() {
        let r = Rect::from_corners([2.0, 3.0, 12.0, 8.0]);
        assert_eq!(r, Rect::new(2.0, 3.0, 10.0, 5.0));
        assert_eq!(r.to_corners(), [2.0, 3.0, 12.0, 8.0]);
    }
}
