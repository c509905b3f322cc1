//! Rigid body simulation: bodies, contacts, joints and particles
//! advanced together one tick at a time.

use crate::math::{self as m, Vec2};

use itertools::Itertools;

//

pub mod body;
pub use body::{Body, BodyParams, Mass, MassSpec, Material};

pub mod body_set;
pub use body_set::{BodyKey, BodySet};

pub mod collision;
use collision::{intersection_check, ShapeKind};

pub mod constraint;
pub use constraint::{Anchor, Constraint, ConstraintBuilder, ConstraintKind};

pub mod constraint_set;
pub use constraint_set::{ConstraintKey, ConstraintSet};

pub mod contact;
pub use contact::CollisionSet;

pub mod params;
pub use params::{ContactParams, JointParams, ParticleParams, PhysicsParams};

pub mod particle;
pub use particle::{Particle, ParticleSystem};

//

/// Velocity of an object.
///
// Equivalent to a Vec3 but with names for the translational and rotational part.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Deserialize, serde::Serialize),
    serde(default)
)]
pub struct Velocity {
    /// Linear velocity in metres per second.
    pub linear: Vec2,
    /// Angular velocity in radians per second.
    pub angular: f64,
}

impl Velocity {
    /// Get the linear velocity of a point offset from the center of mass.
    pub fn point_velocity(&self, offset: Vec2) -> Vec2 {
        let tangent = m::left_normal(offset) * self.angular;
        self.linear + tangent
    }
}

impl std::ops::Add for Velocity {
    type Output = Self;
    fn add(self, other: Self) -> Self {
        Self {
            linear: self.linear + other.linear,
            angular: self.angular + other.angular,
        }
    }
}
impl std::ops::AddAssign for Velocity {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}
impl std::ops::Mul<f64> for Velocity {
    type Output = Velocity;

    fn mul(self, rhs: f64) -> Self::Output {
        Velocity {
            linear: self.linear * rhs,
            angular: self.angular * rhs,
        }
    }
}

/// Errors from setting up bodies and constraints.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq)]
pub enum PhysicsError {
    #[error("A {0:?} has no finite area, so it can't have a finite mass")]
    UnboundedShape(ShapeKind),
    #[error("Computing mass requires a shape")]
    MissingShape,
    #[error("Mass values must be finite and positive, got {0}")]
    InvalidMass(f64),
    #[error("The body doesn't exist in the physics world")]
    NoSuchBody,
}

/// The physics world, holding bodies, constraints and particles.
#[derive(Clone, Debug, Default)]
pub struct PhysicsWorld {
    pub params: PhysicsParams,
    bodies: BodySet,
    constraints: ConstraintSet,
    collision_sets: Vec<CollisionSet>,
    particle_systems: Vec<ParticleSystem>,
}

impl PhysicsWorld {
    pub fn new(params: PhysicsParams) -> Self {
        Self {
            params,
            bodies: BodySet::new(),
            constraints: ConstraintSet::new(),
            collision_sets: Vec::new(),
            particle_systems: Vec::new(),
        }
    }

    #[inline]
    pub fn add_body(&mut self, body: Body) -> BodyKey {
        self.bodies.insert(body)
    }

    /// Remove a body, returning it if it still existed.
    ///
    /// Constraints attached to the body are dropped at the start of the next tick.
    #[inline]
    pub fn remove_body(&mut self, key: BodyKey) -> Option<Body> {
        self.bodies.remove(key)
    }

    #[inline]
    pub fn bodies(&self) -> &BodySet {
        &self.bodies
    }

    #[inline]
    pub fn body(&self, key: BodyKey) -> Option<&Body> {
        self.bodies.get(key)
    }

    #[inline]
    pub fn body_mut(&mut self, key: BodyKey) -> Option<&mut Body> {
        self.bodies.get_mut(key)
    }

    /// Add a constraint. Every body it's attached to must exist.
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<ConstraintKey, PhysicsError> {
        if !constraint.bodies().all(|key| self.bodies.contains(key)) {
            return Err(PhysicsError::NoSuchBody);
        }
        Ok(self.constraints.insert(constraint))
    }

    #[inline]
    pub fn remove_constraint(&mut self, key: ConstraintKey) -> Option<Constraint> {
        self.constraints.remove(key)
    }

    #[inline]
    pub fn constraints(&self) -> &ConstraintSet {
        &self.constraints
    }

    #[inline]
    pub fn constraint(&self, key: ConstraintKey) -> Option<&Constraint> {
        self.constraints.get(key)
    }

    #[inline]
    pub fn constraint_mut(&mut self, key: ConstraintKey) -> Option<&mut Constraint> {
        self.constraints.get_mut(key)
    }

    /// Contacts found during the last tick, in the order they were resolved.
    #[inline]
    pub fn collision_sets(&self) -> &[CollisionSet] {
        &self.collision_sets
    }

    /// Add a particle system. Returns its index in [`particle_systems`][Self::particle_systems].
    pub fn add_particle_system(&mut self, system: ParticleSystem) -> usize {
        self.particle_systems.push(system);
        self.particle_systems.len() - 1
    }

    #[inline]
    pub fn particle_systems(&self) -> &[ParticleSystem] {
        &self.particle_systems
    }

    #[inline]
    pub fn particle_systems_mut(&mut self) -> &mut [ParticleSystem] {
        &mut self.particle_systems
    }

    /// Remove everything from the world. Parameters are kept.
    pub fn clear(&mut self) {
        self.bodies.clear();
        self.constraints.clear();
        self.collision_sets.clear();
        self.particle_systems.clear();
    }

    /// Detect collisions, resolve contacts and constraints, and move everything forward by `dt`.
    pub fn tick(&mut self, dt: f64) {
        let _span = tracy_span!("physics tick", "tick");

        for (_, body) in self.bodies.iter_mut() {
            body.prepare();
        }
        self.constraints.remove_orphans(&self.bodies);
        for constraint in self.constraints.enabled_mut() {
            constraint.prepare(&self.bodies, false);
        }

        self.detect_collisions();

        let gravity = self.params.gravity;
        self.collision_sets.sort_by(|s1, s2| {
            let (h1, h2) = (s1.center().dot(gravity), s2.center().dot(gravity));
            h2.total_cmp(&h1)
        });

        self.resolve_velocities(dt);
        self.correct_positions();

        {
            let _span = tracy_span!("particles", "tick");
            for system in &mut self.particle_systems {
                system.tick(&mut self.bodies, &self.params, dt);
            }
        }

        {
            let _span = tracy_span!("integrate", "tick");
            for (_, body) in self.bodies.iter_mut() {
                body.integrate(gravity, dt);
            }
        }

        log::debug!(
            "Physics tick: {} bodies, {} constraints, {} collision sets",
            self.bodies.len(),
            self.constraints.len(),
            self.collision_sets.len()
        );
    }

    /// Check every pair of bodies against each other.
    fn detect_collisions(&mut self) {
        let _span = tracy_span!("detect collisions", "detect_collisions");

        self.collision_sets.clear();
        let keys: Vec<BodyKey> = self.bodies.iter().map(|(key, _)| key).collect();
        for (&key_a, &key_b) in keys.iter().tuple_combinations() {
            let (Some(a), Some(b)) = (self.bodies.get(key_a), self.bodies.get(key_b)) else {
                continue;
            };
            if a.is_static() && b.is_static() {
                continue;
            }
            let (Some(shape_a), Some(shape_b)) = (a.shape(), b.shape()) else {
                continue;
            };
            if self
                .constraints
                .enabled()
                .any(|c| c.disables_collision_between(key_a, key_b))
            {
                continue;
            }

            let manifolds = intersection_check(shape_a, shape_b);
            if !manifolds.is_empty() {
                self.collision_sets.push(CollisionSet {
                    body_a: key_a,
                    body_b: key_b,
                    manifolds,
                });
            }
        }
    }

    fn resolve_velocities(&mut self, dt: f64) {
        let _span = tracy_span!("resolve velocities", "resolve_velocities");

        for iteration in 0..self.params.velocity_iterations {
            for set in &self.collision_sets {
                set.resolve(&mut self.bodies, &self.params);
            }
            // springs apply a force, so they only get one pass per tick
            for constraint in self
                .constraints
                .enabled()
                .filter(|c| iteration == 0 || !c.kind.is_spring())
            {
                constraint.resolve(&mut self.bodies, dt);
            }
        }
    }

    fn correct_positions(&mut self) {
        let _span = tracy_span!("correct positions", "correct_positions");

        for set in &self.collision_sets {
            set.correct(&mut self.bodies, &self.params);
        }
        for constraint in self.constraints.enabled_mut() {
            constraint.prepare(&self.bodies, true);
            constraint.correct(&mut self.bodies, &self.params.joint);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::collision::{Circle, Plane, Rect, Shape};
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    fn dynamic(shape: impl Into<Shape>, position: Vec2) -> Body {
        Body::new(
            BodyParams {
                position,
                ..Default::default()
            },
            Some(shape.into()),
        )
        .unwrap()
    }

    fn fixed(shape: impl Into<Shape>, position: Vec2) -> Body {
        Body::new(
            BodyParams {
                position,
                mass: MassSpec::Static,
                ..Default::default()
            },
            Some(shape.into()),
        )
        .unwrap()
    }

    fn floor_at(y: f64) -> Body {
        fixed(
            Plane::new().with_offset(Vec2::zero(), FRAC_PI_2),
            Vec2::new(0.0, y),
        )
    }

    fn weightless() -> PhysicsWorld {
        PhysicsWorld::new(PhysicsParams {
            gravity: Vec2::zero(),
            ..Default::default()
        })
    }

    fn drop_box(params: PhysicsParams) -> (PhysicsWorld, BodyKey) {
        let mut world = PhysicsWorld::new(params);
        world.add_body(floor_at(-5.0));
        let block = world.add_body(dynamic(Rect::new(1.0, 1.0), Vec2::new(0.0, -4.0)));

        let dt = 1.0 / 60.0;
        let mut last_y = world.body(block).unwrap().position.y;
        for tick in 0..300 {
            world.tick(dt);
            let y = world.body(block).unwrap().position.y;
            // never moves more than free fall from the drop height allows
            assert!((y - last_y).abs() < 0.1, "tick {}: {} -> {}", tick, last_y, y);
            if tick > 240 {
                assert!((y - last_y).abs() < 0.01, "tick {}: {} -> {}", tick, last_y, y);
            }
            last_y = y;
        }
        (world, block)
    }

    #[test]
    fn box_is_held_up_by_floor() {
        let (world, block) = drop_box(PhysicsParams::default());
        let block = world.body(block).unwrap();
        assert_abs_diff_eq!(block.position.y, -4.5, epsilon = 0.05);
        assert_abs_diff_eq!(block.position.x, 0.0, epsilon = 0.05);
        assert!(block.rotation.abs() < 0.05, "{}", block.rotation);
        assert_eq!(world.collision_sets().len(), 1);
    }

    #[test]
    fn extra_iterations_let_box_settle() {
        let dt = 1.0 / 60.0;
        let (world, block) = drop_box(PhysicsParams {
            velocity_iterations: 10,
            ..Default::default()
        });
        let block = world.body(block).unwrap();
        assert_abs_diff_eq!(block.position.y, -4.5, epsilon = 0.03);
        assert!(block.rotation.abs() < 0.05, "{}", block.rotation);
        // only this tick's gravity is left over
        assert!(block.velocity.linear.mag() < 1.5 * 9.81 * dt);
    }

    #[test]
    fn contacts_are_resolved_once_per_tick() {
        let cradle = |params: PhysicsParams| {
            let mut world = PhysicsWorld::new(params);
            let material = Material {
                restitution: 0.5,
                ..Default::default()
            };
            let keys: Vec<BodyKey> = [-0.95, 0.0, 0.95]
                .into_iter()
                .map(|x| {
                    let mut ball = dynamic(Circle::new(0.5), Vec2::new(x, 0.0));
                    ball.material = material;
                    world.add_body(ball)
                })
                .collect();
            world.body_mut(keys[0]).unwrap().velocity.linear = Vec2::new(1.0, 0.0);

            let dt = 1.0 / 60.0;
            world.tick(dt);
            let drag = (-material.linear_drag * dt).exp();
            let speeds: Vec<f64> = keys
                .iter()
                .map(|&key| world.body(key).unwrap().velocity.linear.x / drag)
                .collect();
            speeds
        };

        // one sequential pass: left hits middle, then middle hits right
        let speeds = cradle(PhysicsParams {
            gravity: Vec2::zero(),
            ..Default::default()
        });
        for (speed, expected) in speeds.iter().zip([0.25, 0.1875, 0.5625]) {
            assert_abs_diff_eq!(*speed, expected, epsilon = 1e-9);
        }

        // a second pass bounces left and middle off each other again
        let speeds = cradle(PhysicsParams {
            gravity: Vec2::zero(),
            velocity_iterations: 2,
            ..Default::default()
        });
        for (speed, expected) in speeds.iter().zip([0.203125, 0.234375, 0.5625]) {
            assert_abs_diff_eq!(*speed, expected, epsilon = 1e-9);
        }
    }

    #[test]
    fn spring_force_does_not_scale_with_iterations() {
        let stiffness = 0.05;
        let dt = 0.1;
        for velocity_iterations in [1, 10] {
            let mut world = PhysicsWorld::new(PhysicsParams {
                gravity: Vec2::zero(),
                velocity_iterations,
                ..Default::default()
            });
            let ball = world.add_body(dynamic(Circle::new(0.5), Vec2::new(2.5, 0.0)));
            world
                .add_constraint(Constraint::new(
                    Anchor::body(ball, Vec2::zero()),
                    Anchor::world(Vec2::zero()),
                    ConstraintKind::Spring {
                        min: 0.0,
                        max: 2.0,
                        stiffness,
                        damping: 0.0,
                    },
                ))
                .unwrap();

            world.tick(dt);
            let ball = world.body(ball).unwrap();
            let drag = (-ball.material.linear_drag * dt).exp();
            let expected = -stiffness * 0.5 * dt * ball.mass().inv() * drag;
            assert_abs_diff_eq!(ball.velocity.linear.x, expected, epsilon = 1e-12);
            assert_eq!(ball.velocity.angular, 0.0);
        }
    }

    #[test]
    fn constraint_between_immovable_ends_changes_nothing() {
        let mut world = PhysicsWorld::default();
        let wall = world.add_body(fixed(Rect::new(1.0, 1.0), Vec2::new(3.0, 0.0)));
        world
            .add_constraint(
                ConstraintBuilder::new(wall)
                    .with_origin(Vec2::new(0.5, 0.0))
                    .build_distance(0.0, 1.0),
            )
            .unwrap();
        world
            .add_constraint(Constraint::new(
                Anchor::world(Vec2::zero()),
                Anchor::world(Vec2::new(10.0, 0.0)),
                ConstraintKind::Axle,
            ))
            .unwrap();

        for _ in 0..10 {
            world.tick(1.0 / 60.0);
        }
        let wall = world.body(wall).unwrap();
        assert_eq!(wall.position, Vec2::new(3.0, 0.0));
        assert_eq!(wall.rotation, 0.0);
        assert_eq!(wall.velocity, Velocity::default());
    }

    #[test]
    fn constraints_need_existing_bodies() {
        let mut world = weightless();
        let a = world.add_body(dynamic(Circle::new(0.5), Vec2::zero()));
        let b = world.add_body(dynamic(Circle::new(0.5), Vec2::new(3.0, 0.0)));
        let link = world
            .add_constraint(ConstraintBuilder::new(a).with_target(b).build_axle())
            .unwrap();

        assert!(world.remove_body(b).is_some());
        assert_eq!(
            world
                .add_constraint(ConstraintBuilder::new(a).with_target(b).build_axle())
                .unwrap_err(),
            PhysicsError::NoSuchBody
        );

        // dropped at the next tick
        assert!(world.constraint(link).is_some());
        world.tick(1.0 / 60.0);
        assert!(world.constraint(link).is_none());
        assert!(world.constraints().is_empty());
    }

    #[test]
    fn linked_bodies_pass_through_each_other() {
        let mut world = weightless();
        let a = world.add_body(dynamic(Circle::new(0.5), Vec2::zero()));
        let b = world.add_body(dynamic(Circle::new(0.5), Vec2::new(0.8, 0.0)));
        let link = world
            .add_constraint(ConstraintBuilder::new(a).with_target(b).build_distance(0.0, 5.0))
            .unwrap();

        world.tick(1.0 / 60.0);
        assert!(world.collision_sets().is_empty());
        assert_eq!(world.body(a).unwrap().position, Vec2::zero());

        world.constraint_mut(link).unwrap().enabled = false;
        world.tick(1.0 / 60.0);
        assert_eq!(world.collision_sets().len(), 1);
        let set = &world.collision_sets()[0];
        assert_eq!((set.body_a, set.body_b), (a, b));
        // pushed apart by positional correction
        assert!(world.body(a).unwrap().position.x < 0.0);
        assert!(world.body(b).unwrap().position.x > 0.8);
    }

    #[test]
    fn lowest_contacts_are_resolved_first() {
        let mut world = PhysicsWorld::default();
        // added first so storage order disagrees with height order
        let shelf = world.add_body(fixed(Rect::new(1.0, 1.0), Vec2::new(0.0, 3.0)));
        world.add_body(dynamic(Circle::new(0.5), Vec2::new(0.0, 3.9)));
        let floor = world.add_body(floor_at(-5.0));
        world.add_body(dynamic(Circle::new(0.5), Vec2::new(5.0, -4.6)));

        world.tick(1.0 / 60.0);
        let sets = world.collision_sets();
        assert_eq!(sets.len(), 2);
        assert!(sets[0].center().y < sets[1].center().y);
        assert_eq!(sets[0].body_a, floor);
        assert_eq!(sets[1].body_a, shelf);
    }

    #[test]
    fn pendulum_swings_on_its_rope() {
        let mut world = PhysicsWorld::default();
        let bob = world.add_body(dynamic(Circle::new(0.25), Vec2::new(2.0, 0.0)));
        world
            .add_constraint(ConstraintBuilder::new(bob).build_distance(0.0, 2.0))
            .unwrap();

        let mut lowest = f64::INFINITY;
        let mut farthest: f64 = 0.0;
        for _ in 0..180 {
            world.tick(1.0 / 60.0);
            let p = world.body(bob).unwrap().position;
            lowest = lowest.min(p.y);
            farthest = farthest.max(p.mag());
        }
        assert!(lowest < -1.5, "{}", lowest);
        assert!(farthest < 2.1, "{}", farthest);
    }

    #[test]
    fn particles_fall_with_the_world() {
        let mut world = PhysicsWorld::default();
        let mut system = ParticleSystem::new();
        system.spawn(Particle::new(Vec2::zero(), Vec2::zero()));
        let idx = world.add_particle_system(system);

        world.tick(0.1);
        let particle = world.particle_systems()[idx].particles[0];
        assert_abs_diff_eq!(particle.velocity.y, -0.981, epsilon = 1e-12);
        assert_abs_diff_eq!(particle.position.y, -0.0981, epsilon = 1e-12);

        world.clear();
        assert!(world.particle_systems().is_empty());
        assert!(world.bodies().is_empty());
    }
}
