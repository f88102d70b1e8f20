//! Axis-aligned rectangles and their computation from glyph paths.

use serde::{Deserialize, Serialize};

#[derive(Debug, PartialEq, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    x: f64,
    y: f64,
    w: f64,
    h: f64,
}
impl BoundingBox {
    /// Negative sizes are normalized by moving the origin, so `w` and `h`
    /// are never negative.
    pub fn new(x: f64, y: f64, w: f64, h: f64) -> Self {
        let (x, w) = match w < 0.0 {
            true => (x + w, -w),
            false => (x, w),
        };
        let (y, h) = match h < 0.0 {
            true => (y + h, -h),
            false => (y, h),
        };
        Self { x, y, w, h }
    }
    pub fn x(&self) -> f64 {
        self.x
    }
    pub fn y(&self) -> f64 {
        self.y
    }
    pub fn w(&self) -> f64 {
        self.w
    }
    pub fn h(&self) -> f64 {
        self.h
    }
    pub fn x2(&self) -> f64 {
        self.x + self.w
    }
    pub fn y2(&self) -> f64 {
        self.y + self.h
    }

    /// Grow to the smallest rectangle containing both boxes.
    ///
    /// # Example
    /// ```
    /// # use notation_layout::primitives::BoundingBox;
    /// let mut a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
    /// a.merge_with(&BoundingBox::new(5.0, -5.0, 10.0, 5.0));
    /// assert_eq!(a, BoundingBox::new(0.0, -5.0, 15.0, 15.0));
    /// ```
    pub fn merge_with(&mut self, other: &Self) -> &mut Self {
        let x1 = self.x.min(other.x);
        let y1 = self.y.min(other.y);
        let x2 = self.x2().max(other.x2());
        let y2 = self.y2().max(other.y2());
        self.x = x1;
        self.y = y1;
        self.w = x2 - x1;
        self.h = y2 - y1;
        self
    }
    pub fn merged(&self, other: &Self) -> Self {
        let mut merged = *self;
        merged.merge_with(other);
        merged
    }
    pub fn move_by(&mut self, dx: f64, dy: f64) -> &mut Self {
        self.x += dx;
        self.y += dy;
        self
    }
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.x2() && y >= self.y && y <= self.y2()
    }
    pub fn intersects(&self, other: &Self) -> bool {
        self.x < other.x2()
            && other.x < self.x2()
            && self.y < other.y2()
            && other.y < self.y2()
    }
}

/// Running extents of a path, fed point by point and curve by curve.
///
/// Holds no reference to the path. Curves contribute their endpoints and
/// every interior extremum found by solving the derivative for `t` in
/// `(0, 1)`.
#[derive(Debug, Clone, Default)]
pub struct BoundingBoxComputation {
    extents: Option<Extents>,
}

#[derive(Debug, Clone, Copy)]
struct Extents {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

impl BoundingBoxComputation {
    pub fn new() -> Self {
        Self::default()
    }
    /// Running minimum x, 0 while nothing was added.
    pub fn x1(&self) -> f64 {
        self.extents.map_or(0.0, |e| e.x1)
    }
    /// Running minimum y, 0 while nothing was added.
    pub fn y1(&self) -> f64 {
        self.extents.map_or(0.0, |e| e.y1)
    }
    pub fn x2(&self) -> f64 {
        self.extents.map_or(0.0, |e| e.x2)
    }
    pub fn y2(&self) -> f64 {
        self.extents.map_or(0.0, |e| e.y2)
    }
    pub fn width(&self) -> f64 {
        self.x2() - self.x1()
    }
    pub fn height(&self) -> f64 {
        self.y2() - self.y1()
    }
    pub fn is_empty(&self) -> bool {
        self.extents.is_none()
    }
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        self.extents
            .map(|e| BoundingBox::new(e.x1, e.y1, e.x2 - e.x1, e.y2 - e.y1))
    }

    pub fn add_point(&mut self, x: f64, y: f64) -> &mut Self {
        self.add_x(x);
        self.add_y(y)
    }
    fn add_x(&mut self, x: f64) -> &mut Self {
        match &mut self.extents {
            Some(e) => {
                e.x1 = e.x1.min(x);
                e.x2 = e.x2.max(x);
            }
            None => {
                self.extents = Some(Extents {
                    x1: x,
                    y1: f64::INFINITY,
                    x2: x,
                    y2: f64::NEG_INFINITY,
                })
            }
        }
        self
    }
    fn add_y(&mut self, y: f64) -> &mut Self {
        match &mut self.extents {
            Some(e) => {
                e.y1 = e.y1.min(y);
                e.y2 = e.y2.max(y);
            }
            None => {
                self.extents = Some(Extents {
                    x1: f64::INFINITY,
                    y1: y,
                    x2: f64::NEG_INFINITY,
                    y2: y,
                })
            }
        }
        self
    }

    /// Quadratic curve from `(x0, y0)` through control `(x1, y1)` to
    /// `(x2, y2)`.
    pub fn add_quadratic_curve(
        &mut self,
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
    ) -> &mut Self {
        self.add_point(x0, y0);
        self.add_point(x2, y2);
        if let Some(x) = quadratic_extremum(x0, x1, x2) {
            self.add_x(x);
        }
        if let Some(y) = quadratic_extremum(y0, y1, y2) {
            self.add_y(y);
        }
        self
    }

    /// Cubic curve from `(x0, y0)` with controls `(x1, y1)`, `(x2, y2)`
    /// to `(x3, y3)`.
    #[allow(clippy::too_many_arguments)]
    pub fn add_bezier_curve(
        &mut self,
        x0: f64,
        y0: f64,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        x3: f64,
        y3: f64,
    ) -> &mut Self {
        self.add_point(x0, y0);
        self.add_point(x3, y3);
        for x in cubic_extrema(x0, x1, x2, x3).into_iter().flatten() {
            self.add_x(x);
        }
        for y in cubic_extrema(y0, y1, y2, y3).into_iter().flatten() {
            self.add_y(y);
        }
        self
    }
}

fn in_open_unit(t: f64) -> bool {
    t > 0.0 && t < 1.0
}

/// Value of the quadratic at the root of its derivative, if inside the
/// curve.
fn quadratic_extremum(p0: f64, p1: f64, p2: f64) -> Option<f64> {
    let denom = p0 - 2.0 * p1 + p2;
    if denom == 0.0 {
        return None;
    }
    let t = (p0 - p1) / denom;
    if !in_open_unit(t) {
        return None;
    }
    let mt = 1.0 - t;
    Some(mt * mt * p0 + 2.0 * mt * t * p1 + t * t * p2)
}

/// Values of the cubic at the roots of its derivative
/// `a·t² + b·t + c`, if inside the curve.
fn cubic_extrema(p0: f64, p1: f64, p2: f64, p3: f64) -> [Option<f64>; 2] {
    let at = |t: f64| {
        let mt = 1.0 - t;
        mt * mt * mt * p0
            + 3.0 * mt * mt * t * p1
            + 3.0 * mt * t * t * p2
            + t * t * t * p3
    };
    let a = -3.0 * p0 + 9.0 * p1 - 9.0 * p2 + 3.0 * p3;
    let b = 6.0 * p0 - 12.0 * p1 + 6.0 * p2;
    let c = 3.0 * p1 - 3.0 * p0;

    if a == 0.0 {
        if b == 0.0 {
            return [None, None];
        }
        let t = -c / b;
        return [in_open_unit(t).then(|| at(t)), None];
    }
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return [None, None];
    }
    let root = discriminant.sqrt();
    let t1 = (-b + root) / (2.0 * a);
    let t2 = (-b - root) / (2.0 * a);
    [in_open_unit(t1).then(|| at(t1)), in_open_unit(t2).then(|| at(t2))]
}

#[cfg(test)]
mod tests {
    use super::{BoundingBox, BoundingBoxComputation};

    fn assert_box(bbox: BoundingBox, expected: (f64, f64, f64, f64)) {
        let tolerance = 0.01;
        assert!((bbox.x() - expected.0).abs() < tolerance, "{:?}", bbox);
        assert!((bbox.y() - expected.1).abs() < tolerance, "{:?}", bbox);
        assert!((bbox.w() - expected.2).abs() < tolerance, "{:?}", bbox);
        assert!((bbox.h() - expected.3).abs() < tolerance, "{:?}", bbox);
    }

    #[test]
    fn test_new_normalizes() {
        let bbox = BoundingBox::new(10.0, 10.0, -5.0, -2.0);
        assert_eq!(bbox, BoundingBox::new(5.0, 8.0, 5.0, 2.0));
    }

    #[test]
    fn test_merge() {
        let a = BoundingBox::new(0.0, 0.0, 1.0, 1.0);
        let b = BoundingBox::new(2.0, 3.0, 1.0, 1.0);
        assert_eq!(a.merged(&b), b.merged(&a));
        assert_eq!(a.merged(&b), BoundingBox::new(0.0, 0.0, 3.0, 4.0));
        assert!(a.merged(&b).contains(2.5, 0.5));
        assert!(!a.intersects(&b));
    }

    #[test]
    fn test_empty_computation() {
        let comp = BoundingBoxComputation::new();
        assert!(comp.is_empty());
        assert_eq!(comp.width(), 0.0);
        assert_eq!(comp.bounding_box(), None);
    }

    #[test]
    fn test_points() {
        let mut comp = BoundingBoxComputation::new();
        comp.add_point(3.0, -2.0).add_point(-1.0, 4.0);
        assert_eq!(comp.x1(), -1.0);
        assert_eq!(comp.y1(), -2.0);
        assert_eq!(comp.width(), 4.0);
        assert_eq!(comp.height(), 6.0);
    }

    #[test]
    fn test_quadratic_extremum_inside() {
        let mut comp = BoundingBoxComputation::new();
        comp.add_quadratic_curve(0.0, 0.0, 50.0, 100.0, 100.0, 0.0);
        // peak at t = 0.5: y = 0.5 * 100
        assert_box(comp.bounding_box().unwrap(), (0.0, 0.0, 100.0, 50.0));
    }

    #[test]
    fn test_bezier_extremum_inside() {
        let mut comp = BoundingBoxComputation::new();
        comp.add_bezier_curve(0.0, 0.0, 0.0, 100.0, 100.0, 100.0, 100.0, 0.0);
        // symmetric arch peaks at t = 0.5: y = 0.75 * 100
        assert_box(comp.bounding_box().unwrap(), (0.0, 0.0, 100.0, 75.0));
    }

    #[test]
    fn test_degenerate_curves() {
        let mut comp = BoundingBoxComputation::new();
        comp.add_quadratic_curve(0.0, 0.0, 5.0, 5.0, 10.0, 10.0);
        comp.add_bezier_curve(0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0);
        assert_box(comp.bounding_box().unwrap(), (0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_monotonic_bezier_keeps_endpoint_box() {
        // derivative 90t² - 60t + 30 has no real roots on either axis
        let mut comp = BoundingBoxComputation::new();
        comp.add_bezier_curve(0.0, 0.0, 10.0, -10.0, 10.0, -10.0, 30.0, -30.0);
        assert_box(comp.bounding_box().unwrap(), (0.0, -30.0, 30.0, 30.0));
    }
}
