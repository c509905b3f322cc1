//! Collision shapes and the geometry they cache.
//!
//! Every shape lives in a [`Frame`]: a local offset and rotation relative to the body
//! that owns it, composed with that body's pose. Changing any parameter or the body pose
//! goes through a setter that recomputes all cached values, so a shape can always be
//! queried without further preparation.

use crate::math::{self as m, Pose, Rotor2, Unit, Vec2};

use super::AABB;

mod boundary;
pub use boundary::{Bar, Plane};
mod compound;
pub use compound::Compound;
mod polygon;
pub use polygon::{Polygon, PolygonCore, Rect, RegularPolygon};
mod round;
pub use round::{Capsule, Circle};

/// Placement of a shape relative to its body and in the world.
#[derive(Clone, Copy, Debug)]
pub struct Frame {
    offset: Vec2,
    rotation_offset: f64,
    body_pose: Pose,
    pose: Pose,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            offset: Vec2::zero(),
            rotation_offset: 0.0,
            body_pose: Pose::identity(),
            pose: Pose::identity(),
        }
    }
}

impl Frame {
    fn update(&mut self) {
        self.pose = self.body_pose * Pose::new(self.offset, Rotor2::from_angle(self.rotation_offset));
    }

    /// Offset from the body's origin, in body space.
    #[inline]
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Rotation relative to the body, in radians.
    #[inline]
    pub fn rotation_offset(&self) -> f64 {
        self.rotation_offset
    }

    #[inline]
    pub fn body_pose(&self) -> Pose {
        self.body_pose
    }

    /// The combined world-space pose of the shape.
    #[inline]
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// The shape origin in world space.
    #[inline]
    pub fn position(&self) -> Vec2 {
        self.pose.translation
    }

    /// The shape's local x axis in world space.
    #[inline]
    pub fn direction(&self) -> Unit<Vec2> {
        m::pose_direction(&self.pose)
    }

    /// World rotation of the shape in radians.
    #[inline]
    pub fn global_rotation(&self) -> f64 {
        let dir = self.direction();
        dir.y.atan2(dir.x)
    }

    #[inline]
    pub fn to_world(&self, local: Vec2) -> Vec2 {
        self.pose * local
    }
}

/// Values every shape recomputes whenever its parameters or placement change.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Derived {
    pub area: f64,
    pub inertia_factor: f64,
    pub aabb: AABB,
    pub center: Vec2,
    pub center_of_mass: Vec2,
}

impl Derived {
    fn unbounded(center: Vec2) -> Self {
        Self {
            area: f64::INFINITY,
            inertia_factor: f64::INFINITY,
            aabb: AABB::infinite(),
            center,
            center_of_mass: center,
        }
    }
}

/// Geometric properties shared by every kind of shape.
pub trait ShapeProps {
    fn area(&self) -> f64;
    /// Second moment of area, i.e. moment of inertia per unit density.
    fn inertia_factor(&self) -> f64;
    /// World-space bounding box.
    fn aabb(&self) -> AABB;
    /// Geometric center in world space.
    fn center(&self) -> Vec2;
    fn center_of_mass(&self) -> Vec2;

    /// Infinite shapes like [`Bar`] and [`Plane`] can't have a finite mass.
    fn is_bounded(&self) -> bool {
        self.area().is_finite() && self.inertia_factor().is_finite()
    }

    fn compute_mass(&self, density: f64) -> f64 {
        self.area() * density
    }

    fn compute_inertia(&self, density: f64) -> f64 {
        self.inertia_factor() * density
    }

    fn density_from_mass(&self, mass: f64) -> f64 {
        mass / self.area()
    }

    fn density_from_inertia(&self, inertia: f64) -> f64 {
        inertia / self.inertia_factor()
    }
}

/// Implements [`ShapeProps`] and the placement setters for a primitive shape
/// with `frame` and `derived` fields and a `recompute` method.
macro_rules! impl_primitive {
    ($shape:ty) => {
        impl $shape {
            #[inline]
            pub fn frame(&self) -> &$crate::physics::collision::shape::Frame {
                &self.frame
            }

            /// Place the shape relative to its body.
            pub fn with_offset(mut self, offset: Vec2, rotation_offset: f64) -> Self {
                self.frame.offset = offset;
                self.frame.rotation_offset = rotation_offset;
                self.recompute();
                self
            }

            pub fn set_offset(&mut self, offset: Vec2) {
                self.frame.offset = offset;
                self.recompute();
            }

            pub fn set_rotation_offset(&mut self, rotation_offset: f64) {
                self.frame.rotation_offset = rotation_offset;
                self.recompute();
            }

            /// Move the shape along with its body.
            pub fn set_body_pose(&mut self, body_pose: Pose) {
                self.frame.body_pose = body_pose;
                self.recompute();
            }
        }

        impl $crate::physics::collision::shape::ShapeProps for $shape {
            #[inline]
            fn area(&self) -> f64 {
                self.derived.area
            }
            #[inline]
            fn inertia_factor(&self) -> f64 {
                self.derived.inertia_factor
            }
            #[inline]
            fn aabb(&self) -> $crate::physics::collision::AABB {
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
    };
}
pub(crate) use impl_primitive;

/// Tag for each kind of shape, without any of the data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Circle,
    Rect,
    Capsule,
    RegularPolygon,
    Polygon,
    Bar,
    Plane,
    Compound,
}

/// The shape of a body, used for collision detection and mass computation.
#[derive(Clone, Debug)]
pub enum Shape {
    Circle(Circle),
    Rect(Rect),
    Capsule(Capsule),
    RegularPolygon(RegularPolygon),
    Polygon(Polygon),
    Bar(Bar),
    Plane(Plane),
    Compound(Compound),
}

macro_rules! for_each_shape {
    ($self:expr, $s:ident => $body:expr) => {
        match $self {
            Shape::Circle($s) => $body,
            Shape::Rect($s) => $body,
            Shape::Capsule($s) => $body,
            Shape::RegularPolygon($s) => $body,
            Shape::Polygon($s) => $body,
            Shape::Bar($s) => $body,
            Shape::Plane($s) => $body,
            Shape::Compound($s) => $body,
        }
    };
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Circle(_) => ShapeKind::Circle,
            Shape::Rect(_) => ShapeKind::Rect,
            Shape::Capsule(_) => ShapeKind::Capsule,
            Shape::RegularPolygon(_) => ShapeKind::RegularPolygon,
            Shape::Polygon(_) => ShapeKind::Polygon,
            Shape::Bar(_) => ShapeKind::Bar,
            Shape::Plane(_) => ShapeKind::Plane,
            Shape::Compound(_) => ShapeKind::Compound,
        }
    }

    /// Snapshot the owning body's transform into the shape and recompute.
    pub fn set_body_pose(&mut self, body_pose: Pose) {
        for_each_shape!(self, s => s.set_body_pose(body_pose))
    }

    /// The vertex data of box, regular polygon and free polygon shapes.
    pub fn polygon_core(&self) -> Option<&PolygonCore> {
        match self {
            Shape::Rect(r) => Some(r.core()),
            Shape::RegularPolygon(p) => Some(p.core()),
            Shape::Polygon(p) => Some(p.core()),
            _ => None,
        }
    }

    #[inline]
    pub fn is_circle(&self) -> bool {
        matches!(self, Shape::Circle(_))
    }
}

impl ShapeProps for Shape {
    fn area(&self) -> f64 {
        for_each_shape!(self, s => s.area())
    }
    fn inertia_factor(&self) -> f64 {
        for_each_shape!(self, s => s.inertia_factor())
    }
    fn aabb(&self) -> AABB {
        for_each_shape!(self, s => s.aabb())
    }
    fn center(&self) -> Vec2 {
        for_each_shape!(self, s => s.center())
    }
    fn center_of_mass(&self) -> Vec2 {
        for_each_shape!(self, s => s.center_of_mass())
    }
}

macro_rules! impl_from_shape {
    ($($variant:ident($ty:ty)),*) => {
        $(impl From<$ty> for Shape {
            fn from(s: $ty) -> Self {
                Shape::$variant(s)
            }
        })*
    };
}
impl_from_shape!(
    Circle(Circle),
    Rect(Rect),
    Capsule(Capsule),
    RegularPolygon(RegularPolygon),
    Polygon(Polygon),
    Bar(Bar),
    Plane(Plane),
    Compound(Compound)
);
