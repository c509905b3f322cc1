//! Collision detection: shapes, contact generation and the pieces of geometry
//! they're built from.

pub mod aabb;
pub use aabb::AABB;

pub mod geometry;

pub mod manifold;
pub use manifold::{ContactIterator, ContactPoints, Manifold, PointPair};

pub mod narrowphase;
pub use narrowphase::intersection_check;

pub(crate) mod sat;

pub mod shape;
pub use shape::{
    Bar, Capsule, Circle, Compound, Frame, Plane, Polygon, Rect, RegularPolygon, Shape, ShapeKind,
    ShapeProps,
};
