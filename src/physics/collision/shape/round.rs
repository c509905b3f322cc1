use super::{impl_primitive, Derived, Frame};
use crate::math::{Pose, Vec2};
use crate::physics::collision::{geometry::Segment, AABB};

use std::f64::consts::PI;

//
// CIRCLE
//

#[derive(Clone, Debug)]
pub struct Circle {
    frame: Frame,
    radius: f64,
    derived: Derived,
}
impl_primitive!(Circle);

impl Circle {
    pub fn new(radius: f64) -> Self {
        let mut circle = Self {
            frame: Frame::default(),
            radius,
            derived: Derived::unbounded(Vec2::zero()),
        };
        circle.recompute();
        circle
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.frame.update();
        let center = self.frame.position();
        let area = PI * self.radius * self.radius;
        self.derived = Derived {
            area,
            inertia_factor: area * self.radius * self.radius / 2.0,
            aabb: AABB {
                min: center - Vec2::broadcast(self.radius),
                max: center + Vec2::broadcast(self.radius),
            },
            center,
            center_of_mass: center,
        };
    }
}

//
// CAPSULE
//

/// A line segment ("spine") of the given length along the shape's local x axis,
/// thickened by `radius` in every direction.
#[derive(Clone, Debug)]
pub struct Capsule {
    frame: Frame,
    length: f64,
    radius: f64,
    spine: Segment,
    derived: Derived,
}
impl_primitive!(Capsule);

impl Capsule {
    pub fn new(length: f64, radius: f64) -> Self {
        let mut capsule = Self {
            frame: Frame::default(),
            length,
            radius,
            spine: Segment::new(Vec2::zero(), Vec2::zero()),
            derived: Derived::unbounded(Vec2::zero()),
        };
        capsule.recompute();
        capsule
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// The world-space spine, from the local -x end to the local +x end.
    #[inline]
    pub fn spine(&self) -> Segment {
        self.spine
    }

    pub fn set_length(&mut self, length: f64) {
        self.length = length;
        self.recompute();
    }

    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.frame.update();
        let center = self.frame.position();
        let half = *self.frame.direction() * (self.length / 2.0);
        self.spine = Segment::new(center - half, center + half);

        let r = self.radius;
        self.derived = Derived {
            area: PI * r * r + 2.0 * r * self.length,
            inertia_factor: capsule_second_moment(self.length, r),
            aabb: AABB::around_points([self.spine.a, self.spine.b]).padded(r),
            center,
            center_of_mass: center,
        };
    }
}

/// Second moment of area of a capsule about its center:
/// a `2r × length` rectangle plus two half-discs moved out with the parallel axis theorem.
fn capsule_second_moment(length: f64, r: f64) -> f64 {
    let (w, h) = (2.0 * r, length);
    let rect = w * h * (w * w + h * h) / 12.0;

    let half_disc_area = PI * r * r / 2.0;
    let about_flat_edge = PI * r.powi(4) / 4.0;
    let centroid_dist = 4.0 * r / (3.0 * PI);
    let about_centroid = about_flat_edge - half_disc_area * centroid_dist * centroid_dist;
    let moved_dist = centroid_dist + length / 2.0;
    let half_disc = about_centroid + half_disc_area * moved_dist * moved_dist;

    rect + 2.0 * half_disc
}
