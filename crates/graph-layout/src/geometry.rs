use std::ops::{Add, AddAssign, Sub, SubAssign};

/// 2D vector with f64 coordinates
///
/// Also used as the size of a vertex's bounding box (`x` is the width, `y`
/// the height).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    /// Create a new vector
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Create a zero vector
    pub fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    /// Return the component-wise maximum of two vectors
    pub fn max(self, other: Self) -> Self {
        Self {
            x: self.x.max(other.x),
            y: self.y.max(other.y),
        }
    }

    /// Euclidean length
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Multiply both components by `factor`
    pub fn scale(self, factor: f64) -> Self {
        Self::new(self.x * factor, self.y * factor)
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Whether this is usable as a vertex size: finite and strictly positive
    pub fn is_valid_size(self) -> bool {
        self.is_finite() && self.x > 0.0 && self.y > 0.0
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        *self = *self + rhs;
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        *self = *self - rhs;
    }
}

/// 2D point with f64 coordinates
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Euclidean distance to `other`
    pub fn distance(self, other: Self) -> f64 {
        (other - self).length()
    }

    /// Replace every non-finite component with the matching one of `fallback`
    pub fn sanitized(self, fallback: Self) -> Self {
        Self {
            x: if self.x.is_finite() { self.x } else { fallback.x },
            y: if self.y.is_finite() { self.y } else { fallback.y },
        }
    }
}

impl Add<Vec2> for Point {
    type Output = Point;

    fn add(self, rhs: Vec2) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub<Vec2> for Point {
    type Output = Point;

    fn sub(self, rhs: Vec2) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Sub for Point {
    type Output = Vec2;

    fn sub(self, rhs: Point) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Axis-aligned rectangle given by its minimum (top-left) and maximum
/// (bottom-right) corners
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub min: Point,
    pub max: Point,
}

impl Rect {
    pub fn new(min: Point, max: Point) -> Self {
        Self { min, max }
    }

    /// The box of the given size centered on `center`
    pub fn from_center(center: Point, size: Vec2) -> Self {
        let half = size.scale(0.5);
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// The smallest rectangle containing every point, `None` when empty
    pub fn bounding(points: &[Point]) -> Option<Self> {
        let (first, rest) = points.split_first()?;
        let init = Self::new(*first, *first);
        Some(rest.iter().fold(init, |rect, &p| rect.union(Self::new(p, p))))
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// The smallest rectangle containing both rectangles
    pub fn union(self, other: Self) -> Self {
        Self {
            min: Point::new(self.min.x.min(other.min.x), self.min.y.min(other.min.y)),
            max: Point::new(self.max.x.max(other.max.x), self.max.y.max(other.max.y)),
        }
    }

    /// Area shared by both rectangles; rectangles that only touch share 0
    pub fn intersection_area(&self, other: &Self) -> f64 {
        let dx = self.max.x.min(other.max.x) - self.min.x.max(other.min.x);
        let dy = self.max.y.min(other.max.y) - self.min.y.max(other.min.y);
        if dx > 0.0 && dy > 0.0 {
            dx * dy
        } else {
            0.0
        }
    }

    /// Whether the rectangles are separated by a gap on some axis
    pub fn is_disjoint(&self, other: &Self) -> bool {
        self.max.x < other.min.x
            || other.max.x < self.min.x
            || self.max.y < other.min.y
            || other.max.y < self.min.y
    }
}

/// Straight line segment between two points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// Whether two segments cross
    ///
    /// A crossing is either an intersection point interior to both segments,
    /// or a collinear overlap of positive length. Touching at an endpoint is
    /// not a crossing.
    pub fn crosses(&self, other: &Segment) -> bool {
        let (a, b, c, d) = (self.start, self.end, other.start, other.end);
        let o1 = orientation(a, b, c);
        let o2 = orientation(a, b, d);

        if o1 == 0.0 && o2 == 0.0 {
            return self.collinear_overlap(other);
        }

        let o3 = orientation(c, d, a);
        let o4 = orientation(c, d, b);
        o1 * o2 < 0.0 && o3 * o4 < 0.0
    }

    /// Length of the shared part of two collinear segments is positive
    fn collinear_overlap(&self, other: &Segment) -> bool {
        let direction = self.end - self.start;
        let project = |p: Point| {
            if direction.x.abs() >= direction.y.abs() {
                p.x
            } else {
                p.y
            }
        };

        let (a0, a1) = ordered(project(self.start), project(self.end));
        let (b0, b1) = ordered(project(other.start), project(other.end));
        a1.min(b1) - a0.max(b0) > 0.0
    }
}

/// Twice the signed area of the triangle (a, b, c); positive when c lies to
/// the left of a->b
fn orientation(a: Point, b: Point, c: Point) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (b.y - a.y) * (c.x - a.x)
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Consecutive segments of a polyline
pub fn polyline_segments(points: &[Point]) -> impl Iterator<Item = Segment> + '_ {
    points.windows(2).map(|w| Segment::new(w[0], w[1]))
}

/// Sum of the segment lengths of a polyline
pub fn polyline_length(points: &[Point]) -> f64 {
    polyline_segments(points).map(|s| s.length()).sum()
}
