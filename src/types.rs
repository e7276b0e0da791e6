#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub fn new(x: f64, y: f64) -> Self {
        Vector2D { x, y }
    }

    pub fn scale(&self, scalar: f64) -> Self {
        Vector2D::new(self.x * scalar, self.y * scalar)
    }

    pub fn add(&self, other: Vector2D) -> Self {
        Vector2D::new(self.x + other.x, self.y + other.y)
    }

    pub fn is_zero(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

/// Axis-aligned bounding box in playfield units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        Rect { x, y, w, h }
    }

    pub fn from_position(position: Vector2D, w: f64, h: f64) -> Self {
        Rect::new(position.x, position.y, w, h)
    }

    pub fn right(&self) -> f64 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.h
    }

    pub fn center(&self) -> Vector2D {
        Vector2D::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }
}

/// Strict AABB test: boxes that only share an edge do not overlap.
pub fn overlaps(a: &Rect, b: &Rect) -> bool {
    a.x < b.right() && a.right() > b.x && a.y < b.bottom() && a.bottom() > b.y
}

/// Clamps an entity's top-left corner so a `w` x `h` box stays inside `0..max_x` x `0..max_y`.
pub fn clamp_into(position: Vector2D, w: f64, h: f64, max_x: f64, max_y: f64) -> Vector2D {
    Vector2D::new(position.x.clamp(0.0, max_x - w), position.y.clamp(0.0, max_y - h))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Rgb { r, g, b }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlapping_boxes() {
        let a = Rect::new(0.0, 0.0, 50.0, 50.0);
        let b = Rect::new(25.0, 25.0, 50.0, 50.0);
        assert!(overlaps(&a, &b));
        assert!(overlaps(&b, &a));
    }

    #[test]
    fn test_edge_touching_is_not_overlap() {
        let a = Rect::new(0.0, 0.0, 50.0, 50.0);
        assert!(!overlaps(&a, &Rect::new(50.0, 0.0, 50.0, 50.0)));
        assert!(!overlaps(&a, &Rect::new(0.0, 50.0, 50.0, 50.0)));
        assert!(!overlaps(&a, &Rect::new(-50.0, 0.0, 50.0, 50.0)));
        assert!(!overlaps(&a, &Rect::new(0.0, -50.0, 50.0, 50.0)));
    }

    #[test]
    fn test_containment_overlaps() {
        let outer = Rect::new(0.0, 0.0, 100.0, 100.0);
        let inner = Rect::new(40.0, 40.0, 10.0, 10.0);
        assert!(overlaps(&outer, &inner));
        assert!(overlaps(&inner, &outer));
    }

    #[test]
    fn test_separated_on_one_axis() {
        let a = Rect::new(0.0, 0.0, 50.0, 50.0);
        // Overlaps horizontally but far below
        assert!(!overlaps(&a, &Rect::new(10.0, 200.0, 50.0, 50.0)));
    }

    #[test]
    fn test_clamp_into() {
        let p = clamp_into(Vector2D::new(-3.0, 590.0), 50.0, 50.0, 800.0, 600.0);
        assert_eq!(p, Vector2D::new(0.0, 550.0));
        let p = clamp_into(Vector2D::new(790.0, -1.0), 50.0, 50.0, 800.0, 600.0);
        assert_eq!(p, Vector2D::new(750.0, 0.0));
    }

    #[test]
    fn test_center() {
        let r = Rect::new(400.0, 550.0, 50.0, 50.0);
        assert_eq!(r.center(), Vector2D::new(425.0, 575.0));
    }
}
