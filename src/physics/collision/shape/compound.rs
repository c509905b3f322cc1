use super::{Derived, Shape, ShapeProps};
use crate::math::{Pose, Vec2};
use crate::physics::collision::AABB;

/// Several primitive shapes moving together as one rigid body.
///
/// Each child keeps its own offset relative to the body.
#[derive(Clone, Debug)]
pub struct Compound {
    children: Vec<Shape>,
    body_pose: Pose,
    derived: Derived,
}

impl Compound {
    /// Nested compounds are flattened into their children.
    pub fn new(children: Vec<Shape>) -> Self {
        let mut flat = Vec::with_capacity(children.len());
        for child in children {
            match child {
                Shape::Compound(inner) => flat.extend(inner.children),
                other => flat.push(other),
            }
        }
        let mut compound = Self {
            children: flat,
            body_pose: Pose::identity(),
            derived: Derived::unbounded(Vec2::zero()),
        };
        compound.set_body_pose(Pose::identity());
        compound
    }

    #[inline]
    pub fn children(&self) -> &[Shape] {
        &self.children
    }

    /// Move every child along with the body.
    pub fn set_body_pose(&mut self, body_pose: Pose) {
        self.body_pose = body_pose;
        for child in &mut self.children {
            child.set_body_pose(body_pose);
        }
        self.recompute();
    }

    fn recompute(&mut self) {
        if self.children.is_empty() {
            self.derived = Derived {
                area: 0.0,
                inertia_factor: 0.0,
                aabb: AABB::around_points([self.body_pose.translation]),
                center: self.body_pose.translation,
                center_of_mass: self.body_pose.translation,
            };
            return;
        }

        let to_body = self.body_pose.inversed();
        let mut area = 0.0;
        let mut inertia_factor = 0.0;
        let mut weighted_com = Vec2::zero();
        let mut center_sum = Vec2::zero();
        let mut aabb = self.children[0].aabb();

        for child in &self.children {
            let child_area = child.area();
            area += child_area;
            inertia_factor += if child.is_bounded() {
                // move the child's inertia from its own origin to the body origin
                let com = child.center_of_mass();
                let own_origin = child_frame_pose(child).inversed() * com;
                let body_origin = to_body * com;
                child.inertia_factor() - child_area * own_origin.mag_sq()
                    + child_area * body_origin.mag_sq()
            } else {
                f64::INFINITY
            };
            weighted_com += child.center_of_mass() * child_area;
            center_sum += child.center();
            aabb = aabb.union(&child.aabb());
        }

        let center = center_sum / self.children.len() as f64;
        self.derived = Derived {
            area,
            inertia_factor,
            aabb,
            center,
            center_of_mass: if area.is_finite() && area > 0.0 {
                weighted_com / area
            } else {
                center
            },
        };
    }
}

/// World pose of a (non-compound) child.
fn child_frame_pose(child: &Shape) -> Pose {
    match child {
        Shape::Circle(s) => s.frame().pose(),
        Shape::Rect(s) => s.frame().pose(),
        Shape::Capsule(s) => s.frame().pose(),
        Shape::RegularPolygon(s) => s.frame().pose(),
        Shape::Polygon(s) => s.frame().pose(),
        Shape::Bar(s) => s.frame().pose(),
        Shape::Plane(s) => s.frame().pose(),
        Shape::Compound(c) => c.body_pose,
    }
}

impl ShapeProps for Compound {
    #[inline]
    fn area(&self) -> f64 {
        self.derived.area
    }
    #[inline]
    fn inertia_factor(&self) -> f64 {
        self.derived.inertia_factor
    }
    #[inline]
    fn aabb(&self) -> AABB {
        self.derived.aabb
    }
    #[inline]
    fn center(&self) -> Vec2 {
        self.derived.center
    }
    #[inline]
    fn center_of_mass(&self) -> Vec2 {
        self.derived.center_of_mass
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Rotor2;
    use crate::physics::collision::shape::{Circle, Rect};
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    fn dumbbell() -> Compound {
        Compound::new(vec![
            Circle::new(1.0).with_offset(Vec2::new(-2.0, 0.0), 0.0).into(),
            Circle::new(1.0).with_offset(Vec2::new(2.0, 0.0), 0.0).into(),
        ])
    }

    #[test]
    fn sums_children_with_parallel_axis() {
        let c = dumbbell();
        assert_abs_diff_eq!(c.area(), 2.0 * PI);
        // each disc: pi/2 about its center + pi * 2^2 moved out
        assert_abs_diff_eq!(c.inertia_factor(), 2.0 * (PI / 2.0 + 4.0 * PI), epsilon = 1e-9);
        assert_abs_diff_eq!(c.aabb().min.x, -3.0);
        assert_abs_diff_eq!(c.aabb().max.x, 3.0);
        assert_abs_diff_eq!(c.center_of_mass().x, 0.0);
    }

    #[test]
    fn body_pose_reaches_children() {
        let mut c = dumbbell();
        c.set_body_pose(Pose::new(Vec2::new(0.0, 10.0), Rotor2::from_angle(PI / 2.0)));
        assert_abs_diff_eq!(c.aabb().min.y, 7.0, epsilon = 1e-9);
        assert_abs_diff_eq!(c.aabb().max.y, 13.0, epsilon = 1e-9);
        assert_abs_diff_eq!(c.center().y, 10.0, epsilon = 1e-9);
        // inertia about the body origin doesn't depend on where the body is
        assert_abs_diff_eq!(c.inertia_factor(), dumbbell().inertia_factor(), epsilon = 1e-9);
    }

    #[test]
    fn nested_compounds_flatten() {
        let c = Compound::new(vec![
            dumbbell().into(),
            Rect::new(1.0, 1.0).into(),
        ]);
        assert_eq!(c.children().len(), 3);
        assert!(c.children().iter().all(|s| !matches!(s, Shape::Compound(_))));
    }
}
