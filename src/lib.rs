//! A 2D rigid body physics engine built on the separating axis theorem.
//!
//! Bodies own a [`Shape`][physics::collision::Shape] and live in a
//! [`PhysicsWorld`][physics::PhysicsWorld], which detects contacts between them,
//! resolves contacts and joint constraints with sequential impulses,
//! and moves everything forward one tick at a time.

// profiling span that compiles to nothing unless the `tracy` feature is enabled
macro_rules! tracy_span {
    ($name:literal, $fn_name:literal) => {
        tracy_client::Client::running()
            .map(|c| c.span_alloc(Some($name), $fn_name, file!(), line!(), 0))
    };
}

pub mod math;
pub use math::{uv, Angle, Pose, Rotor2, Unit, Vec2};

pub mod physics;
pub use physics::{
    collision::{self, intersection_check, Manifold, Shape, ShapeKind, ShapeProps, AABB},
    Anchor, Body, BodyKey, BodyParams, CollisionSet, Constraint, ConstraintBuilder,
    ConstraintKey, ConstraintKind, Mass, MassSpec, Material, Particle, ParticleSystem,
    PhysicsError, PhysicsParams, PhysicsWorld, Velocity,
};
