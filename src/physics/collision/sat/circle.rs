use crate::math::{self as m, Unit, Vec2};
use crate::physics::collision::{
    geometry::{Segment, SegmentDistance},
    manifold::{ContactPoints, Manifold, PointPair},
    shape::{Bar, Capsule, Circle, Plane, PolygonCore, ShapeProps},
};

fn single_contact(normal: Unit<Vec2>, depth: f64, a: Vec2, b: Vec2) -> Option<Manifold> {
    Some(Manifold {
        normal,
        depth,
        points: ContactPoints::One(PointPair::new(a, b)),
    })
}

//
// CIRCLE <-> CIRCLE
//

pub(crate) fn circle_circle(a: &Circle, b: &Circle) -> Option<Manifold> {
    let (ca, cb) = (a.center(), b.center());
    let r_sum = a.radius() + b.radius();
    let dist_sq = (ca - cb).mag_sq();
    if dist_sq > r_sum * r_sum {
        return None;
    }

    // concentric circles get pushed apart along x
    let normal = Unit::new_normalize(ca - cb);
    single_contact(
        normal,
        r_sum - dist_sq.sqrt(),
        ca - *normal * a.radius(),
        cb + *normal * b.radius(),
    )
}

//
// CIRCLE <-> PLANE
//

pub(crate) fn circle_plane(a: &Circle, b: &Plane) -> Option<Manifold> {
    let normal = b.normal();
    let rel = a.center() - b.center();
    let dist = normal.dot(rel);
    if dist > a.radius() {
        return None;
    }

    let tangent = m::left_normal(*normal);
    single_contact(
        normal,
        a.radius() - dist,
        a.center() - *normal * a.radius(),
        b.center() + tangent * m::cross(*normal, rel),
    )
}

//
// CIRCLE <-> BAR
//

pub(crate) fn circle_bar(a: &Circle, b: &Bar) -> Option<Manifold> {
    let reach = a.radius() + b.width() / 2.0;
    let rel = a.center() - b.center();
    let dist = b.normal().dot(rel);
    if dist.abs() > reach {
        return None;
    }

    // push out of whichever side the center is on
    let normal = if dist < 0.0 { -b.normal() } else { b.normal() };
    let tangent = m::left_normal(*normal);
    single_contact(
        normal,
        reach - dist.abs(),
        a.center() - *normal * a.radius(),
        b.center() + tangent * m::cross(*normal, rel) + *normal * (b.width() / 2.0),
    )
}

//
// CIRCLE <-> CAPSULE
//

pub(crate) fn circle_capsule(a: &Circle, b: &Capsule) -> Option<Manifold> {
    let r_sum = a.radius() + b.radius();
    let dist = SegmentDistance::compute(a.center(), b.spine());
    if dist.distance > r_sum {
        return None;
    }

    // a center exactly on the spine falls back to the spine's perpendicular
    let normal = dist.normal;
    single_contact(
        normal,
        r_sum - dist.distance,
        a.center() - *normal * a.radius(),
        dist.closest + *normal * b.radius(),
    )
}

//
// CIRCLE <-> POLYGON
//

pub(crate) fn circle_polygon(a: &Circle, b: &PolygonCore) -> Option<Manifold> {
    if b.len() < 3 {
        return None;
    }
    let center = a.center();

    let mut nearest: Option<SegmentDistance> = None;
    for edge in b.edges() {
        let dist = SegmentDistance::compute(center, edge);
        if nearest.map_or(true, |n| dist.distance < n.distance) {
            nearest = Some(dist);
        }
    }
    let nearest = nearest?;
    let mut normal = *nearest.normal;
    if m::approx_zero(nearest.distance) {
        normal = m::normalize(m::right_normal(nearest.segment.edge()));
    }

    // the edge facing the normal tells which side of the boundary the center is on
    let facing: Segment = b
        .edges()
        .max_by(|e1, e2| {
            let d1 = m::normalize(m::right_normal(e1.edge())).dot(normal);
            let d2 = m::normalize(m::right_normal(e2.edge())).dot(normal);
            d1.total_cmp(&d2)
        })?;
    let outward = m::normalize(m::right_normal(facing.edge()));
    let side = if (center - facing.a).dot(outward) < 0.0 {
        -1.0
    } else {
        1.0
    };

    let depth = a.radius() - nearest.distance * side;
    if depth < 0.0 {
        return None;
    }
    let normal = Unit::new_unchecked(normal * side);
    single_contact(
        normal,
        depth,
        nearest.closest - *normal * depth,
        nearest.closest,
    )
}
