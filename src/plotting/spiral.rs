//! Smooth spiral curve with arc-length sampling.
//!
//! The curve is a cardinal spline (tension 0) through the control points. Each
//! cubic segment is flattened into a polyline, and a cumulative length table over
//! that polyline answers "which point lies `d` units along the curve".

/// Bezier subdivisions per spline segment
const SEGMENT_STEPS: usize = 24;

/// Spline tension; 0 gives Catmull-Rom-like tangents
const TENSION: f64 = 0.0;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point at `radius` from the origin, `angle` radians clockwise from 12 o'clock
    pub fn from_polar(angle: f64, radius: f64) -> Self {
        Self {
            x: radius * angle.sin(),
            y: -radius * angle.cos(),
        }
    }

    fn distance(&self, other: &Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    fn lerp(&self, other: &Point, t: f64) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

/// Axis-aligned extent of a scene
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub fn around(point: Point, radius: f64) -> Self {
        Self {
            min_x: point.x - radius,
            min_y: point.y - radius,
            max_x: point.x + radius,
            max_y: point.y + radius,
        }
    }

    pub fn union(self, other: Bounds) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

#[derive(Clone, Debug)]
pub struct SpiralCurve {
    path: Vec<Point>,
    /// `cumulative[i]` is the length of `path[..=i]`
    cumulative: Vec<f64>,
}

impl SpiralCurve {
    /// Spline through points given as `(angle, radius)` pairs
    pub fn radial(polar: &[(f64, f64)]) -> Self {
        let points: Vec<Point> = polar
            .iter()
            .map(|&(angle, radius)| Point::from_polar(angle, radius))
            .collect();
        Self::through(&points)
    }

    /// Cardinal spline through `points` in order
    pub fn through(points: &[Point]) -> Self {
        let path = flatten_cardinal(points);

        let mut cumulative = Vec::with_capacity(path.len());
        let mut length = 0.0;
        for (i, point) in path.iter().enumerate() {
            if i > 0 {
                length += path[i - 1].distance(point);
            }
            cumulative.push(length);
        }

        Self { path, cumulative }
    }

    /// Flattened polyline, for renderers
    pub fn path(&self) -> &[Point] {
        &self.path
    }

    pub fn total_length(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Point `distance` units along the curve, clamped to its ends
    pub fn point_at_length(&self, distance: f64) -> Point {
        let (first, last) = match (self.path.first(), self.path.last()) {
            (Some(first), Some(last)) => (*first, *last),
            _ => return Point::default(),
        };

        if !(distance > 0.0) {
            return first;
        }
        if distance >= self.total_length() {
            return last;
        }

        let end = self.cumulative.partition_point(|&length| length < distance);
        let start = end - 1;
        let span = self.cumulative[end] - self.cumulative[start];
        if span <= 0.0 {
            return self.path[end];
        }
        let t = (distance - self.cumulative[start]) / span;
        self.path[start].lerp(&self.path[end], t)
    }

    pub fn bounds(&self) -> Option<Bounds> {
        self.path
            .iter()
            .map(|point| Bounds::around(*point, 0.0))
            .reduce(Bounds::union)
    }
}

/// Cardinal spline segments as cubic Beziers, flattened.
///
/// The first segment's leading control point and the last segment's trailing
/// control point coincide with their end points, so the curve starts and ends
/// without overshoot.
fn flatten_cardinal(points: &[Point]) -> Vec<Point> {
    if points.len() < 2 {
        return points.to_vec();
    }

    let k = (1.0 - TENSION) / 6.0;
    let last = points.len() - 1;
    let mut path = Vec::with_capacity(last * SEGMENT_STEPS + 1);
    path.push(points[0]);

    for i in 0..last {
        let p1 = points[i];
        let p2 = points[i + 1];
        let c1 = if i == 0 {
            p1
        } else {
            let p0 = points[i - 1];
            Point::new(p1.x + k * (p2.x - p0.x), p1.y + k * (p2.y - p0.y))
        };
        let c2 = if i + 1 == last {
            p2
        } else {
            let p3 = points[i + 2];
            Point::new(p2.x - k * (p3.x - p1.x), p2.y - k * (p3.y - p1.y))
        };

        for step in 1..=SEGMENT_STEPS {
            let t = step as f64 / SEGMENT_STEPS as f64;
            path.push(cubic_bezier(p1, c1, c2, p2, t));
        }
    }

    path
}

fn cubic_bezier(p0: Point, c1: Point, c2: Point, p1: Point, t: f64) -> Point {
    let u = 1.0 - t;
    let a = u * u * u;
    let b = 3.0 * u * u * t;
    let c = 3.0 * u * t * t;
    let d = t * t * t;
    Point::new(
        a * p0.x + b * c1.x + c * c2.x + d * p1.x,
        a * p0.y + b * c1.y + c * c2.y + d * p1.y,
    )
}
