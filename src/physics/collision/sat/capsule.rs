use super::{
    best_edge, clipped_past_one_end, deepest_spine_end, offset_spine, push_axis, spine_face_contacts,
    spine_support, Interval, LeastOverlap,
};
use crate::math::{self as m, Unit, Vec2};
use crate::physics::collision::{
    geometry::{LineIntersection, Segment, SegmentDistance, SegmentFeature},
    manifold::{ContactPoints, Manifold, PointPair},
    shape::{Bar, Capsule, Plane, PolygonCore, ShapeProps},
};

/// Clip a capsule spine against a face of another shape.
///
/// `face_points` are the two candidate points on the face and `normal` points from the
/// face toward the capsule. Returns pairs of (capsule point, face point).
fn clip_spine_to_face(capsule: &Capsule, face_points: [Vec2; 2], normal: Vec2) -> ContactPoints {
    let spine = capsule.spine();
    let r = capsule.radius();
    let offset = offset_spine(spine, r, -normal);
    let cap_offset = -normal * r;

    let u = face_points
        .map(|p| LineIntersection::compute(offset, Segment::ray(p, normal)).u_a);

    let parallel = m::approx_zero(m::cross(spine.edge(), normal));
    let capsule_points = if parallel {
        let end = deepest_spine_end(spine, -normal) + cap_offset;
        [end, end]
    } else {
        u.map(|u| spine_support(u, spine, offset, cap_offset))
    };

    let single = parallel || clipped_past_one_end(u);
    spine_face_contacts(
        [
            PointPair::new(capsule_points[0], face_points[0]),
            PointPair::new(capsule_points[1], face_points[1]),
        ],
        normal,
        single,
    )
}

fn manifold_if_touching(normal: Unit<Vec2>, depth: f64, points: ContactPoints) -> Option<Manifold> {
    if points.is_empty() {
        None
    } else {
        Some(Manifold {
            normal,
            depth,
            points,
        })
    }
}

//
// CAPSULE <-> POLYGON
//

pub(crate) fn capsule_polygon(a: &Capsule, b: &PolygonCore) -> Option<Manifold> {
    if b.len() < 3 {
        return None;
    }
    let spine = a.spine();
    let r = a.radius();

    let mut axes: Vec<Unit<Vec2>> = Vec::with_capacity(b.axes().len() + 2);
    for axis in b.axes() {
        push_axis(&mut axes, *axis);
    }

    // nearest point on the polygon to either spine endpoint
    let mut nearest: Option<(SegmentDistance, Vec2)> = None;
    for edge in b.edges() {
        for end in [spine.a, spine.b] {
            let dist = SegmentDistance::compute(end, edge);
            if nearest.map_or(true, |(n, _)| dist.distance < n.distance) {
                nearest = Some((dist, end));
            }
        }
    }
    let (nearest, nearest_end) = nearest?;

    let spine_axis = push_axis(&mut axes, Unit::new_normalize(m::left_normal(spine.edge())));
    let point_axis = push_axis(&mut axes, nearest.normal);

    let mut least = LeastOverlap::default();
    for (i, axis) in axes.iter().enumerate() {
        let proj_a = Interval::of_spine(spine, r, **axis);
        let proj_b = Interval::of_points(b.vertices(), **axis);
        if !least.test(i, *axis, proj_a, proj_b) {
            return None;
        }
    }
    let index = least.index?;
    let normal = *least.normal;

    if Some(index) == point_axis {
        return manifold_if_touching(
            least.normal,
            least.depth,
            ContactPoints::One(PointPair::new(nearest_end - normal * r, nearest.closest)),
        );
    }

    let edge = best_edge(b, normal);

    if Some(index) == spine_axis {
        // the polygon corner that lands on the side of the spine
        // (falls back to the nearer corner if neither is beside the spine)
        let [d1, d2] = [edge.a, edge.b].map(|p| SegmentDistance::compute(p, spine));
        let beside = |d: &SegmentDistance| d.feature == SegmentFeature::Interior;
        let corner = match (beside(&d1), beside(&d2)) {
            (true, false) => d1,
            (false, true) => d2,
            _ if d2.distance < d1.distance => d2,
            _ => d1,
        };
        return manifold_if_touching(
            least.normal,
            least.depth,
            ContactPoints::One(PointPair::new(corner.closest - normal * r, corner.point)),
        );
    }

    // polygon edge: the part of the edge the spine covers along the normal
    let face_points = [spine.a, spine.b].map(|end| {
        let u = LineIntersection::compute(edge, Segment::ray(end, normal)).u_a;
        edge.interpolate(u.clamp(0.0, 1.0))
    });
    let points = clip_spine_to_face(a, face_points, normal);
    manifold_if_touching(least.normal, least.depth, points)
}

//
// CAPSULE <-> CAPSULE
//

pub(crate) fn capsule_capsule(a: &Capsule, b: &Capsule) -> Option<Manifold> {
    let spines = [a.spine(), b.spine()];
    let radii = [a.radius(), b.radius()];

    // closest approach between an endpoint of one spine and the other spine
    let mut nearest: Option<(SegmentDistance, usize)> = None;
    for i in 0..4 {
        let on = (i >> 1) & 1;
        let other = spines[1 - on];
        let end = if i & 1 == 0 { other.a } else { other.b };
        let dist = SegmentDistance::compute(end, spines[on]);
        if nearest.map_or(true, |(n, _)| dist.distance < n.distance) {
            nearest = Some((dist, on));
        }
    }
    let (nearest, ref_idx) = nearest?;
    if nearest.distance > radii[0] + radii[1] {
        return None;
    }

    let mut normal = *nearest.normal;
    let proj_a = Interval::of_spine(spines[0], radii[0], normal);
    let proj_b = Interval::of_spine(spines[1], radii[1], normal);
    let a_below = proj_a.max - proj_b.min;
    let mut depth = proj_b.max - proj_a.min;
    if a_below < depth {
        normal = -normal;
        depth = a_below;
    }
    let unit_normal = Unit::new_unchecked(normal);

    let inc_idx = 1 - ref_idx;
    // direction from the reference capsule toward the incident one
    let toward_inc = if ref_idx == 0 { -normal } else { normal };

    let points = if nearest.feature != SegmentFeature::Interior {
        let ref_point = nearest.closest + toward_inc * radii[ref_idx];
        let inc_point = nearest.point - toward_inc * radii[inc_idx];
        ContactPoints::One(PointPair::new(inc_point, ref_point))
    } else {
        // clip the incident spine against the reference capsule's surface
        let ref_spine = spines[ref_idx];
        let ref_face = offset_spine(ref_spine, radii[ref_idx], toward_inc);
        let inc = [a, b][inc_idx];
        let face_points = [inc.spine().a, inc.spine().b].map(|end| {
            let u = LineIntersection::compute(ref_face, Segment::ray(end, toward_inc)).u_a;
            ref_face.interpolate(u.clamp(0.0, 1.0))
        });
        clip_spine_to_face(inc, face_points, toward_inc)
    };

    // pairs come out as (incident, reference); put them in (a, b) order
    let points = if inc_idx == 0 {
        points
    } else {
        points.map(PointPair::swapped)
    };
    manifold_if_touching(unit_normal, depth, points)
}

//
// CAPSULE <-> HALF-PLANE
//

/// Contact between a capsule and the half-plane behind the line through `origin`
/// with outward normal `normal`, given a known penetration depth.
fn capsule_face(a: &Capsule, origin: Vec2, normal: Unit<Vec2>, depth: f64) -> Option<Manifold> {
    let n = *normal;
    let tangent = m::left_normal(n);
    let spine = a.spine();
    let face_points = [spine.a, spine.b].map(|p| origin + tangent * tangent.dot(p - origin));
    let points = clip_spine_to_face(a, face_points, n);
    manifold_if_touching(normal, depth, points)
}

//
// CAPSULE <-> PLANE
//

pub(crate) fn capsule_plane(a: &Capsule, b: &Plane) -> Option<Manifold> {
    let normal = b.normal();
    let spine = a.spine();
    let heights = [spine.a, spine.b].map(|p| (p - b.center()).dot(*normal));
    let lowest = heights[0].min(heights[1]);
    if lowest > a.radius() {
        return None;
    }
    capsule_face(a, b.center(), normal, a.radius() - lowest)
}

//
// CAPSULE <-> BAR
//

pub(crate) fn capsule_bar(a: &Capsule, b: &Bar) -> Option<Manifold> {
    let reach = a.radius() + b.width() / 2.0;
    let spine = a.spine();
    let heights = [spine.a, spine.b].map(|p| (p - b.center()).dot(*b.normal()));
    if heights.iter().all(|h| h.abs() > reach) && heights[0].signum() == heights[1].signum() {
        return None;
    }

    let out_positive = reach - heights[0].min(heights[1]);
    let out_negative = reach + heights[0].max(heights[1]);
    let (normal, depth) = if out_positive > out_negative {
        (-b.normal(), out_negative)
    } else {
        (b.normal(), out_positive)
    };
    capsule_face(a, b.center() + *normal * (b.width() / 2.0), normal, depth)
}
