use super::{best_edge, push_axis, Interval, LeastOverlap};
use crate::math::{self as m, Unit, Vec2};
use crate::physics::collision::{
    geometry::{LineIntersection, Segment},
    manifold::{ContactPoints, Manifold, PointPair},
    shape::{Bar, Plane, PolygonCore, ShapeProps},
};

//
// POLYGON <-> POLYGON
//

pub(crate) fn polygon_polygon(a: &PolygonCore, b: &PolygonCore) -> Option<Manifold> {
    if a.len() < 3 || b.len() < 3 {
        return None;
    }

    let mut axes: Vec<Unit<Vec2>> = Vec::with_capacity(a.axes().len() + b.axes().len());
    for axis in a.axes().iter().chain(b.axes()) {
        push_axis(&mut axes, *axis);
    }

    let mut least = LeastOverlap::default();
    for (i, axis) in axes.iter().enumerate() {
        let proj_a = Interval::of_points(a.vertices(), **axis);
        let proj_b = Interval::of_points(b.vertices(), **axis);
        if !least.test(i, *axis, proj_a, proj_b) {
            return None;
        }
    }
    let normal = *least.normal;
    let depth = least.depth;

    let edge_a = best_edge(a, -normal);
    let edge_b = best_edge(b, normal);

    // the edge more perpendicular to the normal is the reference
    let (reference, mut incident, flip) =
        if edge_a.edge().dot(normal).abs() <= edge_b.edge().dot(normal).abs() {
            (edge_a, edge_b, false)
        } else {
            (edge_b, edge_a, true)
        };

    let mut remaining = 2;

    // side planes at both ends of the reference edge
    for (end, inward) in [
        (reference.a, m::normalize(reference.edge())),
        (reference.b, m::normalize(reference.inv_edge())),
    ] {
        let isc = LineIntersection::compute(Segment::ray(end, normal), incident);
        if isc.on_segment_b() {
            if (incident.a - end).dot(inward) <= 0.0 {
                incident.a = isc.point;
            } else if (incident.b - end).dot(inward) <= 0.0 {
                incident.b = isc.point;
            }
        }
    }

    // the reference face itself
    let isc = LineIntersection::compute(reference, incident);
    if isc.on_segment_b() {
        let into_reference = if flip { -normal } else { normal };
        let a_outside = (incident.a - reference.a).dot(into_reference) <= 0.0;
        let b_outside = (incident.b - reference.a).dot(into_reference) <= 0.0;
        if a_outside {
            incident.a = incident.b;
            remaining -= 1;
        }
        if b_outside {
            remaining -= 1;
        }
    }

    if remaining <= 0 {
        // edges touching without actually overlapping
        return None;
    }

    let orient = |inc: Vec2, refp: Vec2| {
        if flip {
            PointPair::new(inc, refp)
        } else {
            PointPair::new(refp, inc)
        }
    };

    let points = if remaining == 1 {
        let partner = incident.a + normal * (if flip { depth } else { -depth });
        ContactPoints::One(orient(incident.a, partner))
    } else {
        let ref_line = reference;
        let proj_a = LineIntersection::compute(Segment::ray(incident.a, normal), ref_line).point;
        let proj_b = LineIntersection::compute(Segment::ray(incident.b, normal), ref_line).point;
        let pair_a = orient(incident.a, proj_a);
        let pair_b = orient(incident.b, proj_b);
        if (incident.a - proj_a).mag_sq() < (incident.b - proj_b).mag_sq() {
            ContactPoints::Two(pair_b, pair_a)
        } else {
            ContactPoints::Two(pair_a, pair_b)
        }
    };

    Some(Manifold {
        normal: least.normal,
        depth,
        points,
    })
}

//
// POLYGON <-> HALF-PLANE
//

/// Contact between a polygon and the half-plane behind the line through `origin`
/// with outward normal `normal`. `depth` is already known by the caller.
fn polygon_face(a: &PolygonCore, origin: Vec2, normal: Unit<Vec2>, depth: f64) -> Option<Manifold> {
    let n = *normal;
    let mut edge = best_edge(a, -n);
    let inside = |p: Vec2| (p - origin).dot(n) <= 0.0;

    let mut count = 2;
    if !inside(edge.b) {
        count = 1;
    }
    if !inside(edge.a) {
        edge.a = edge.b;
        count = 1;
    }

    let tangent = m::left_normal(n);
    let onto_face = |p: Vec2| origin + tangent * tangent.dot(p - origin);

    let first = PointPair::new(edge.a, onto_face(edge.a));
    let points = if count == 1 {
        ContactPoints::One(first)
    } else {
        let second = PointPair::new(edge.b, onto_face(edge.b));
        if (second.a - second.b).mag_sq() < (first.a - first.b).mag_sq() {
            ContactPoints::Two(first, second)
        } else {
            ContactPoints::Two(second, first)
        }
    };

    Some(Manifold {
        normal,
        depth,
        points,
    })
}

//
// POLYGON <-> PLANE
//

pub(crate) fn polygon_plane(a: &PolygonCore, b: &Plane) -> Option<Manifold> {
    if a.is_empty() {
        return None;
    }
    let normal = b.normal();
    let lowest = Interval::of_points(a.vertices(), *normal).min - b.center().dot(*normal);
    if lowest > 0.0 {
        return None;
    }
    polygon_face(a, b.center(), normal, -lowest)
}

//
// POLYGON <-> BAR
//

pub(crate) fn polygon_bar(a: &PolygonCore, b: &Bar) -> Option<Manifold> {
    if a.is_empty() {
        return None;
    }
    let half_width = b.width() / 2.0;
    let across = *b.normal();
    let proj = Interval::of_points(a.vertices(), across);
    let (low, high) = (
        proj.min - b.center().dot(across),
        proj.max - b.center().dot(across),
    );
    if low > half_width || high < -half_width {
        return None;
    }

    let out_positive = half_width - low;
    let out_negative = high + half_width;
    let (normal, depth) = if out_positive <= out_negative {
        (b.normal(), out_positive)
    } else {
        (-b.normal(), out_negative)
    };
    polygon_face(a, b.center() + *normal * half_width, normal, depth)
}
