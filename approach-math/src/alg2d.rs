//! Simple 2D coordinate geometry.

use bevy_math::Vec2;


/// Relative tolerance for treating two directions as parallel.
const PARALLEL_TOLERANCE: f32 = 1e-6;

/// Result of intersecting two lines or segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Intersection {
    /// The inputs cross at exactly one point.
    Point(Vec2),
    /// The inputs have the same direction but never meet.
    Parallel,
    /// The inputs are collinear and share at least one point.
    Overlapping,
    /// The inputs are not parallel, or are collinear, but do not share any point.
    Separated,
}

impl Intersection {
    /// Returns the crossing point, if any.
    #[must_use]
    pub fn point(self) -> Option<Vec2> {
        match self {
            Self::Point(point) => Some(point),
            _ => None,
        }
    }
}

fn is_parallel(d1: Vec2, d2: Vec2) -> bool {
    d1.perp_dot(d2).abs() <= PARALLEL_TOLERANCE * d1.length() * d2.length()
}

fn is_collinear(start: Vec2, dir: Vec2, point: Vec2) -> bool {
    let offset = point - start;
    offset.perp_dot(dir).abs() <= PARALLEL_TOLERANCE * offset.length() * dir.length()
}

/// Intersects the infinite lines `s1 + t * d1` and `s2 + u * d2`.
///
/// Never returns [`Intersection::Separated`].
#[must_use]
pub fn line_intersection(s1: Vec2, d1: Vec2, s2: Vec2, d2: Vec2) -> Intersection {
    if is_parallel(d1, d2) {
        return if is_collinear(s1, d1, s2) {
            Intersection::Overlapping
        } else {
            Intersection::Parallel
        };
    }

    let t = (s2 - s1).perp_dot(d2) / d1.perp_dot(d2);
    Intersection::Point(s1 + d1 * t)
}

/// Intersects the segments `a0..a1` and `b0..b1`, endpoints inclusive.
#[must_use]
pub fn segment_intersection(a0: Vec2, a1: Vec2, b0: Vec2, b1: Vec2) -> Intersection {
    let d1 = a1 - a0;
    let d2 = b1 - b0;

    if is_parallel(d1, d2) {
        if !is_collinear(a0, d1, b0) {
            return Intersection::Parallel;
        }

        // Project b onto the parametric range of a.
        let len_sq = d1.length_squared();
        let t0 = (b0 - a0).dot(d1) / len_sq;
        let t1 = (b1 - a0).dot(d1) / len_sq;
        return if t0.min(t1).max(0.) <= t0.max(t1).min(1.) {
            Intersection::Overlapping
        } else {
            Intersection::Separated
        };
    }

    let cross = d1.perp_dot(d2);
    let t = (b0 - a0).perp_dot(d2) / cross;
    let u = (b0 - a0).perp_dot(d1) / cross;
    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Intersection::Point(a0 + d1 * t)
    } else {
        Intersection::Separated
    }
}
