//! Routing a pair of shapes to the contact generator that handles them.

use super::{
    manifold::Manifold,
    sat::{capsule, circle, polygon},
    shape::{Bar, Capsule, Circle, Plane, Shape, ShapeProps},
};

/// Shapes grouped by which contact generators handle them.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PairClass {
    Circle,
    Polygonal,
    Capsule,
    Plane,
    Bar,
}

impl PairClass {
    /// Compounds have no class of their own, their children are checked instead.
    fn of(shape: &Shape) -> Option<Self> {
        match shape {
            Shape::Circle(_) => Some(Self::Circle),
            Shape::Rect(_) | Shape::RegularPolygon(_) | Shape::Polygon(_) => Some(Self::Polygonal),
            Shape::Capsule(_) => Some(Self::Capsule),
            Shape::Plane(_) => Some(Self::Plane),
            Shape::Bar(_) => Some(Self::Bar),
            Shape::Compound(_) => None,
        }
    }
}

type Generator = fn(&Shape, &Shape) -> Option<Manifold>;

/// A generator and whether it expects the shapes in the opposite order.
#[derive(Clone, Copy)]
struct Route {
    generator: Generator,
    swap: bool,
}

impl Route {
    fn run(&self, a: &Shape, b: &Shape) -> Option<Manifold> {
        if self.swap {
            (self.generator)(b, a).map(Manifold::invert)
        } else {
            (self.generator)(a, b)
        }
    }
}

fn route(a: PairClass, b: PairClass) -> Option<Route> {
    use PairClass::*;
    let fwd = |generator: Generator| Some(Route { generator, swap: false });
    let rev = |generator: Generator| Some(Route { generator, swap: true });

    match (a, b) {
        (Circle, Circle) => fwd(circle_circle),
        (Circle, Polygonal) => fwd(circle_polygon),
        (Circle, Capsule) => fwd(circle_capsule),
        (Circle, Plane) => fwd(circle_plane),
        (Circle, Bar) => fwd(circle_bar),

        (Polygonal, Circle) => rev(circle_polygon),
        (Polygonal, Polygonal) => fwd(polygon_polygon),
        (Polygonal, Capsule) => rev(capsule_polygon),
        (Polygonal, Plane) => fwd(polygon_plane),
        (Polygonal, Bar) => fwd(polygon_bar),

        (Capsule, Circle) => rev(circle_capsule),
        (Capsule, Polygonal) => fwd(capsule_polygon),
        (Capsule, Capsule) => fwd(capsule_capsule),
        (Capsule, Plane) => fwd(capsule_plane),
        (Capsule, Bar) => fwd(capsule_bar),

        (Plane, Circle) => rev(circle_plane),
        (Plane, Polygonal) => rev(polygon_plane),
        (Plane, Capsule) => rev(capsule_plane),

        (Bar, Circle) => rev(circle_bar),
        (Bar, Polygonal) => rev(polygon_bar),
        (Bar, Capsule) => rev(capsule_bar),

        // boundaries never move, so they never need to collide with each other
        (Plane | Bar, Plane | Bar) => None,
    }
}

//
// adapters from Shape to the concrete generator arguments
//

fn as_circle(s: &Shape) -> Option<&Circle> {
    match s {
        Shape::Circle(c) => Some(c),
        _ => None,
    }
}

fn as_capsule(s: &Shape) -> Option<&Capsule> {
    match s {
        Shape::Capsule(c) => Some(c),
        _ => None,
    }
}

fn as_plane(s: &Shape) -> Option<&Plane> {
    match s {
        Shape::Plane(p) => Some(p),
        _ => None,
    }
}

fn as_bar(s: &Shape) -> Option<&Bar> {
    match s {
        Shape::Bar(b) => Some(b),
        _ => None,
    }
}

fn circle_circle(a: &Shape, b: &Shape) -> Option<Manifold> {
    circle::circle_circle(as_circle(a)?, as_circle(b)?)
}
fn circle_polygon(a: &Shape, b: &Shape) -> Option<Manifold> {
    circle::circle_polygon(as_circle(a)?, b.polygon_core()?)
}
fn circle_capsule(a: &Shape, b: &Shape) -> Option<Manifold> {
    circle::circle_capsule(as_circle(a)?, as_capsule(b)?)
}
fn circle_plane(a: &Shape, b: &Shape) -> Option<Manifold> {
    circle::circle_plane(as_circle(a)?, as_plane(b)?)
}
fn circle_bar(a: &Shape, b: &Shape) -> Option<Manifold> {
    circle::circle_bar(as_circle(a)?, as_bar(b)?)
}
fn polygon_polygon(a: &Shape, b: &Shape) -> Option<Manifold> {
    polygon::polygon_polygon(a.polygon_core()?, b.polygon_core()?)
}
fn polygon_plane(a: &Shape, b: &Shape) -> Option<Manifold> {
    polygon::polygon_plane(a.polygon_core()?, as_plane(b)?)
}
fn polygon_bar(a: &Shape, b: &Shape) -> Option<Manifold> {
    polygon::polygon_bar(a.polygon_core()?, as_bar(b)?)
}
fn capsule_polygon(a: &Shape, b: &Shape) -> Option<Manifold> {
    capsule::capsule_polygon(as_capsule(a)?, b.polygon_core()?)
}
fn capsule_capsule(a: &Shape, b: &Shape) -> Option<Manifold> {
    capsule::capsule_capsule(as_capsule(a)?, as_capsule(b)?)
}
fn capsule_plane(a: &Shape, b: &Shape) -> Option<Manifold> {
    capsule::capsule_plane(as_capsule(a)?, as_plane(b)?)
}
fn capsule_bar(a: &Shape, b: &Shape) -> Option<Manifold> {
    capsule::capsule_bar(as_capsule(a)?, as_bar(b)?)
}

//

/// Check two shapes for intersection.
///
/// Returns one manifold per pair of touching primitives, so more than one
/// only when compound shapes are involved. Every manifold's normal points
/// the way `a` must move to separate from `b`.
pub fn intersection_check(a: &Shape, b: &Shape) -> Vec<Manifold> {
    let mut manifolds = Vec::new();
    collect_manifolds(a, b, &mut manifolds);
    log::trace!(
        "{:?} vs {:?}: {} manifold(s)",
        a.kind(),
        b.kind(),
        manifolds.len()
    );
    manifolds
}

fn collect_manifolds(a: &Shape, b: &Shape, out: &mut Vec<Manifold>) {
    if !a.aabb().overlaps(&b.aabb()) {
        return;
    }

    match (a, b) {
        (Shape::Compound(compound), _) => {
            for child in compound.children() {
                collect_manifolds(child, b, out);
            }
        }
        (_, Shape::Compound(compound)) => {
            for child in compound.children() {
                collect_manifolds(a, child, out);
            }
        }
        _ => {
            let found = PairClass::of(a)
                .zip(PairClass::of(b))
                .and_then(|(class_a, class_b)| route(class_a, class_b))
                .and_then(|route| route.run(a, b));
            out.extend(found);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{Pose, Rotor2, Vec2};
    use crate::physics::collision::shape::{Compound, Polygon, Rect, RegularPolygon};
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    fn bounded_shapes() -> Vec<Shape> {
        vec![
            Circle::new(0.5).into(),
            Rect::new(1.0, 0.8).into(),
            Capsule::new(1.0, 0.3).into(),
            RegularPolygon::new(0.6, 5).into(),
            Polygon::new(vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(0.2, 0.7),
            ])
            .into(),
            Compound::new(vec![
                Circle::new(0.3).with_offset(Vec2::new(-0.5, 0.0), 0.0).into(),
                Rect::new(0.5, 0.5).with_offset(Vec2::new(0.5, 0.0), 0.0).into(),
            ])
            .into(),
        ]
    }

    fn placed(mut shape: Shape, x: f64, y: f64, angle: f64) -> Shape {
        shape.set_body_pose(Pose::new(Vec2::new(x, y), Rotor2::from_angle(angle)));
        shape
    }

    #[test]
    fn far_apart_shapes_never_touch() {
        for a in bounded_shapes() {
            for b in bounded_shapes() {
                let a = placed(a.clone(), 0.0, 0.0, 0.3);
                let b = placed(b, 50.0, -20.0, 1.1);
                assert!(
                    intersection_check(&a, &b).is_empty(),
                    "{:?} vs {:?}",
                    a.kind(),
                    b.kind()
                );
            }
        }
    }

    #[test]
    fn swapped_order_gives_inverted_manifold() {
        let circle = placed(Circle::new(0.5).into(), 0.9, 0.2, 0.0);
        let rect = placed(Rect::new(1.0, 1.0).into(), 0.0, 0.0, 0.0);
        let ab = intersection_check(&circle, &rect);
        let ba = intersection_check(&rect, &circle);
        assert_eq!(ab.len(), 1);
        assert_eq!(ba.len(), 1);
        assert_eq!(ba[0], ab[0].invert());
        assert_abs_diff_eq!(ab[0].normal.x, 1.0, epsilon = 1e-12);

        let floor = Plane::new().with_offset(Vec2::new(0.0, -1.0), FRAC_PI_2);
        let capsule = placed(Capsule::new(1.0, 0.25).into(), 0.0, -0.9, 0.0);
        let plane = Shape::from(floor);
        let cp = intersection_check(&capsule, &plane);
        let pc = intersection_check(&plane, &capsule);
        assert_eq!(pc[0], cp[0].invert());
        assert!(pc[0].normal.y < 0.0);
    }

    #[test]
    fn boundaries_ignore_each_other() {
        let plane: Shape = Plane::new().into();
        let bar: Shape = Bar::new(1.0).into();
        assert!(intersection_check(&plane, &bar).is_empty());
        assert!(intersection_check(&bar, &bar).is_empty());
        assert!(intersection_check(&plane, &plane).is_empty());
    }

    #[test]
    fn compound_reports_each_touching_child() {
        let dumbbell = placed(
            Compound::new(vec![
                Circle::new(0.5).with_offset(Vec2::new(-1.0, 0.0), 0.0).into(),
                Circle::new(0.5).with_offset(Vec2::new(1.0, 0.0), 0.0).into(),
            ])
            .into(),
            0.0,
            0.4,
            0.0,
        );
        let floor: Shape = Plane::new().with_offset(Vec2::zero(), FRAC_PI_2).into();
        let manifolds = intersection_check(&dumbbell, &floor);
        assert_eq!(manifolds.len(), 2);
        for m in &manifolds {
            assert_abs_diff_eq!(m.depth, 0.1, epsilon = 1e-9);
            assert_abs_diff_eq!(m.normal.y, 1.0, epsilon = 1e-12);
        }

        // only one end over the box
        let block = placed(Rect::new(1.0, 1.0).into(), 1.0, -0.4, 0.0);
        let manifolds = intersection_check(&block, &dumbbell);
        assert_eq!(manifolds.len(), 1);
        assert!(manifolds[0].normal.y < 0.0);
    }
}
