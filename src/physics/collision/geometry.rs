//! Segment and line queries shared by the contact generators.

use crate::math::{self as m, Unit, Vec2};

/// A line segment from `a` to `b`.
///
/// Also used as an infinite line through the two points where noted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub a: Vec2,
    pub b: Vec2,
}

impl Segment {
    #[inline]
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self { a, b }
    }

    /// Vector from `a` to `b`.
    #[inline]
    pub fn edge(&self) -> Vec2 {
        self.b - self.a
    }

    /// Vector from `b` to `a`.
    #[inline]
    pub fn inv_edge(&self) -> Vec2 {
        self.a - self.b
    }

    /// The point at parameter `u`, where 0 is `a` and 1 is `b`.
    #[inline]
    pub fn interpolate(&self, u: f64) -> Vec2 {
        self.a + self.edge() * u
    }

    /// The same segment moved by `offset`.
    #[inline]
    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            a: self.a + offset,
            b: self.b + offset,
        }
    }

    /// The line through `point` in direction `dir`, as a segment of length `|dir|`.
    #[inline]
    pub fn ray(point: Vec2, dir: Vec2) -> Self {
        Self {
            a: point,
            b: point + dir,
        }
    }
}

/// Which part of a segment a closest point landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SegmentFeature {
    Start,
    Interior,
    End,
}

/// Closest-point query between a point and a segment.
#[derive(Clone, Copy, Debug)]
pub struct SegmentDistance {
    pub point: Vec2,
    pub segment: Segment,
    /// Parameter of the closest point along the segment, clamped to [0, 1].
    pub u: f64,
    pub closest: Vec2,
    pub distance: f64,
    /// Direction from the closest point to the query point.
    /// Falls back to the segment's counterclockwise perpendicular
    /// when the point lies on the segment.
    pub normal: Unit<Vec2>,
    pub feature: SegmentFeature,
}

impl SegmentDistance {
    pub fn compute(point: Vec2, segment: Segment) -> Self {
        let edge = segment.edge();
        let len_sq = edge.mag_sq();
        let raw_u = if len_sq < m::EPSILON {
            0.0
        } else {
            (point - segment.a).dot(edge) / len_sq
        };

        let (u, feature) = if raw_u <= 0.0 {
            (0.0, SegmentFeature::Start)
        } else if raw_u >= 1.0 {
            (1.0, SegmentFeature::End)
        } else {
            (raw_u, SegmentFeature::Interior)
        };

        let closest = segment.interpolate(u);
        let to_point = point - closest;
        let distance = to_point.mag();
        let normal = if m::approx_zero(distance) {
            Unit::new_normalize(m::left_normal(edge))
        } else {
            Unit::new_unchecked(to_point / distance)
        };

        Self {
            point,
            segment,
            u,
            closest,
            distance,
            normal,
            feature,
        }
    }
}

/// Intersection of two infinite lines given as segments.
///
/// `u_a` and `u_b` are the parameters of the intersection point along each line.
/// Parallel lines produce non-finite parameters, which fail every range check.
#[derive(Clone, Copy, Debug)]
pub struct LineIntersection {
    pub u_a: f64,
    pub u_b: f64,
    pub point: Vec2,
}

impl LineIntersection {
    pub fn compute(line_a: Segment, line_b: Segment) -> Self {
        let Segment { a: p1, b: p2 } = line_a;
        let Segment { a: p3, b: p4 } = line_b;

        let denom = (p4.y - p3.y) * (p2.x - p1.x) - (p4.x - p3.x) * (p2.y - p1.y);
        let u_a = ((p4.x - p3.x) * (p1.y - p3.y) - (p4.y - p3.y) * (p1.x - p3.x)) / denom;
        let u_b = ((p2.x - p1.x) * (p1.y - p3.y) - (p2.y - p1.y) * (p1.x - p3.x)) / denom;

        Self {
            u_a,
            u_b,
            point: line_a.interpolate(u_a),
        }
    }

    /// Does the intersection lie within the first segment?
    #[inline]
    pub fn on_segment_a(&self) -> bool {
        (0.0..=1.0).contains(&self.u_a)
    }

    /// Does the intersection lie within the second segment?
    #[inline]
    pub fn on_segment_b(&self) -> bool {
        (0.0..=1.0).contains(&self.u_b)
    }
}
