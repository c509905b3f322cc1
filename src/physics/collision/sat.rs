//! Separating axis contact generators for every pair of primitive shapes.
//!
//! Every generator takes shapes A and B and returns the [`Manifold`] whose normal
//! points the way A has to move to get out of B. Generators assume their inputs'
//! bounding boxes already overlap; the narrow phase checks that before calling them.

use super::{
    geometry::Segment,
    manifold::{ContactPoints, PointPair},
    shape::PolygonCore,
};
use crate::math::{self as m, Unit, Vec2};

pub(crate) mod capsule;
pub(crate) mod circle;
pub(crate) mod polygon;

/// Extent of a shape projected onto an axis.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Interval {
    pub min: f64,
    pub max: f64,
}

impl Interval {
    pub fn of_points(points: &[Vec2], axis: Vec2) -> Self {
        points.iter().fold(
            Self {
                min: f64::INFINITY,
                max: f64::NEG_INFINITY,
            },
            |acc, p| {
                let proj = p.dot(axis);
                Self {
                    min: acc.min.min(proj),
                    max: acc.max.max(proj),
                }
            },
        )
    }

    /// Projection of a capsule: its spine endpoints pushed out by the radius.
    pub fn of_spine(spine: Segment, radius: f64, axis: Vec2) -> Self {
        let base = Self::of_points(&[spine.a, spine.b], axis);
        Self {
            min: base.min - radius,
            max: base.max + radius,
        }
    }

    /// How far A overlaps B along the axis and which way A should go to get out,
    /// or `None` if the axis separates them.
    ///
    /// A is sent in the negative direction when that is the shorter way out
    /// (ties included).
    pub fn overlap(a: Self, b: Self) -> Option<(f64, f64)> {
        if a.min > b.max || b.min > a.max {
            return None;
        }
        let a_below = a.max - b.min;
        let a_above = b.max - a.min;
        if a_below <= a_above {
            Some((a_below, -1.0))
        } else {
            Some((a_above, 1.0))
        }
    }
}

/// Running minimum over candidate separating axes.
/// The first axis with the smallest overlap wins.
#[derive(Clone, Copy, Debug)]
pub(crate) struct LeastOverlap {
    pub depth: f64,
    pub normal: Unit<Vec2>,
    pub index: Option<usize>,
}

impl Default for LeastOverlap {
    fn default() -> Self {
        Self {
            depth: f64::INFINITY,
            normal: Unit::unit_x(),
            index: None,
        }
    }
}

impl LeastOverlap {
    /// Test axis number `index`. Returns `false` if it separates the shapes.
    pub fn test(&mut self, index: usize, axis: Unit<Vec2>, a: Interval, b: Interval) -> bool {
        match Interval::overlap(a, b) {
            None => false,
            Some((depth, dir)) => {
                if depth < self.depth {
                    self.depth = depth;
                    self.normal = Unit::new_unchecked(*axis * dir);
                    self.index = Some(index);
                }
                true
            }
        }
    }
}

/// Push `axis` unless a parallel one is already in the list. Returns its index.
pub(crate) fn push_axis(axes: &mut Vec<Unit<Vec2>>, axis: Unit<Vec2>) -> Option<usize> {
    if axes.iter().any(|a| m::approx_zero(m::cross(**a, *axis))) {
        None
    } else {
        axes.push(axis);
        Some(axes.len() - 1)
    }
}

/// Pick the edge of a polygon that faces `dir` the most.
///
/// Finds the vertex furthest along `dir` and then, of the two edges meeting there,
/// the one whose direction (pointing into that vertex) projects less onto `dir`.
pub(crate) fn best_edge(poly: &PolygonCore, dir: Vec2) -> Segment {
    let mut best = 0;
    let mut max_proj = f64::NEG_INFINITY;
    for (i, v) in poly.vertices().iter().enumerate() {
        let proj = v.dot(dir);
        if proj > max_proj {
            max_proj = proj;
            best = i as isize;
        }
    }

    let curr = poly.vertex(best);
    let prev = poly.vertex(best - 1);
    let next = poly.vertex(best + 1);
    let from_prev = m::normalize(curr - prev);
    let from_next = m::normalize(curr - next);

    if from_prev.dot(dir) <= from_next.dot(dir) {
        Segment::new(prev, curr)
    } else {
        Segment::new(curr, next)
    }
}

/// A capsule spine moved by `radius` to the side facing `toward`.
pub(crate) fn offset_spine(spine: Segment, radius: f64, toward: Vec2) -> Segment {
    let mut side = m::normalize(m::left_normal(spine.edge()));
    if side.dot(toward) < 0.0 {
        side = -side;
    }
    spine.translated(side * radius)
}

/// Point on a capsule's surface at parameter `u` along its offset spine.
/// Past either end the point moves onto the end cap, `cap_offset` away from the spine endpoint.
pub(crate) fn spine_support(u: f64, spine: Segment, offset: Segment, cap_offset: Vec2) -> Vec2 {
    if u <= 0.0 {
        spine.a + cap_offset
    } else if u >= 1.0 {
        spine.b + cap_offset
    } else {
        offset.interpolate(u)
    }
}

/// The spine endpoint furthest in direction `dir`, used when the spine is parallel to
/// the contact normal and clipping can't give two points.
pub(crate) fn deepest_spine_end(spine: Segment, dir: Vec2) -> Vec2 {
    if spine.a.dot(dir) >= spine.b.dot(dir) {
        spine.a
    } else {
        spine.b
    }
}

/// Are both spine parameters past the same end of the spine?
pub(crate) fn clipped_past_one_end(u: [f64; 2]) -> bool {
    (m::approx_ge(u[0], 1.0) && m::approx_ge(u[1], 1.0))
        || (m::approx_le(u[0], 0.0) && m::approx_le(u[1], 0.0))
}

/// Turn two candidate pairs from clipping a capsule against a face into contact points.
///
/// `pairs[i].a` lies on the capsule and `pairs[i].b` on the face. A pair is kept if the
/// capsule point has gone past the face point along `into_face`. The deeper pair goes
/// first. With `single` set only the second candidate in that order is kept.
pub(crate) fn spine_face_contacts(pairs: [PointPair; 2], into_face: Vec2, single: bool) -> ContactPoints {
    let depths = pairs.map(|p| (p.b - p.a).dot(into_face));
    if depths[0] < 0.0 && depths[1] < 0.0 {
        return ContactPoints::Zero;
    }
    let dists = pairs.map(|p| (p.a - p.b).mag());
    let order = if dists[1] > dists[0] { [1, 0] } else { [0, 1] };

    let mut points = ContactPoints::Zero;
    if depths[order[0]] >= 0.0 && !single {
        points = points.push(pairs[order[0]]);
    }
    if depths[order[1]] >= 0.0 {
        points = points.push(pairs[order[1]]);
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collision::shape::Rect;

    #[test]
    fn overlap_picks_shorter_way_out() {
        let a = Interval { min: 0.0, max: 2.0 };
        let b = Interval { min: 1.5, max: 5.0 };
        assert_eq!(Interval::overlap(a, b), Some((0.5, -1.0)));
        assert_eq!(Interval::overlap(b, a), Some((0.5, 1.0)));
        let c = Interval { min: 2.1, max: 3.0 };
        assert_eq!(Interval::overlap(a, c), None);
    }

    #[test]
    fn least_overlap_keeps_first_tie() {
        let mut least = LeastOverlap::default();
        let a = Interval { min: 0.0, max: 1.0 };
        let b = Interval { min: 0.5, max: 2.0 };
        assert!(least.test(0, Unit::unit_x(), a, b));
        assert!(least.test(1, Unit::unit_y(), a, b));
        assert_eq!(least.index, Some(0));
        assert_eq!(*least.normal, -Vec2::unit_x());
        let far = Interval { min: 3.0, max: 4.0 };
        assert!(!least.test(2, Unit::unit_y(), a, far));
    }

    #[test]
    fn best_edge_faces_direction() {
        let rect = Rect::new(2.0, 1.0);
        let bottom = best_edge(rect.core(), -Vec2::unit_y());
        assert_eq!(bottom, Segment::new(Vec2::new(-1.0, -0.5), Vec2::new(1.0, -0.5)));
        let right = best_edge(rect.core(), Vec2::unit_x());
        assert_eq!(right, Segment::new(Vec2::new(1.0, -0.5), Vec2::new(1.0, 0.5)));
    }

    #[test]
    fn spine_contacts_deepest_first() {
        let shallow = PointPair::new(Vec2::new(0.0, 0.0), Vec2::new(0.0, 0.1));
        let deep = PointPair::new(Vec2::new(1.0, 0.0), Vec2::new(1.0, 0.3));
        let miss = PointPair::new(Vec2::new(1.0, 0.0), Vec2::new(1.0, -0.3));
        let up = Vec2::unit_y();

        assert_eq!(
            spine_face_contacts([shallow, deep], up, false),
            ContactPoints::Two(deep, shallow)
        );
        assert_eq!(
            spine_face_contacts([shallow, deep], up, true),
            ContactPoints::One(shallow)
        );
        assert_eq!(
            spine_face_contacts([shallow, miss], up, false),
            ContactPoints::One(shallow)
        );
        assert_eq!(spine_face_contacts([miss, miss], up, false), ContactPoints::Zero);
    }
}
