//! Sequential impulse resolution of contacts between two bodies.

use super::{body_set::BodySet, collision::Manifold, params::PhysicsParams, Body, BodyKey};
use crate::math::{self as m, Vec2};

/// Every contact found between two bodies during one tick.
///
/// These are rebuilt every tick and can be inspected afterwards
/// with [`PhysicsWorld::collision_sets`][super::PhysicsWorld::collision_sets].
#[derive(Clone, Debug)]
pub struct CollisionSet {
    pub body_a: BodyKey,
    pub body_b: BodyKey,
    /// Normals point the way `body_a` has to move to separate.
    pub manifolds: Vec<Manifold>,
}

impl CollisionSet {
    /// Mean of the manifolds' centers.
    pub fn center(&self) -> Vec2 {
        if self.manifolds.is_empty() {
            return Vec2::zero();
        }
        let sum: Vec2 = self.manifolds.iter().map(Manifold::center).sum();
        sum / self.manifolds.len() as f64
    }

    fn manifold_divisor(&self, params: &PhysicsParams) -> f64 {
        if params.split_by_manifold {
            self.manifolds.len().max(1) as f64
        } else {
            1.0
        }
    }

    /// Gather impulses that stop the bodies from moving into each other,
    /// plus restitution and friction.
    pub(crate) fn resolve(&self, bodies: &mut BodySet, params: &PhysicsParams) {
        let Some((a, b)) = bodies.pair_mut(self.body_a, self.body_b) else {
            return;
        };
        let manifold_count = self.manifold_divisor(params);
        let restitution = a.material.restitution.min(b.material.restitution);
        let static_friction = a.material.static_friction.hypot(b.material.static_friction);
        let dynamic_friction = a.material.dynamic_friction.hypot(b.material.dynamic_friction);

        for manifold in &self.manifolds {
            let n = *manifold.normal;
            let point_count = manifold.points.len() as f64;

            for pair in manifold.points.iter() {
                let ra = pair.a - a.position;
                let rb = pair.b - b.position;
                let k = effective_mass(a, b, ra, rb, n);
                if k <= 0.0 {
                    break;
                }

                // n points away from B, so positive vn means B is closing in on A
                let vn = relative_velocity(a, b, ra, rb, n).dot(n);
                if vn < 0.0 {
                    break;
                }
                let j = -(1.0 + restitution) * vn / k / point_count / manifold_count;
                a.apply_impulse(-n * j, ra, false);
                b.apply_impulse(n * j, rb, false);

                let rv = relative_velocity(a, b, ra, rb, n);
                let mut tangent = m::left_normal(n);
                if rv.dot(tangent) > 0.0 {
                    tangent = -tangent;
                }
                let vt = rv.dot(tangent);
                let jt = -vt / k / point_count / manifold_count;
                let friction = if jt.abs() < -j * static_friction {
                    tangent * jt
                } else {
                    tangent * (-j * dynamic_friction)
                };
                a.apply_impulse(-friction, ra, true);
                b.apply_impulse(friction, rb, true);
            }
        }
    }

    /// Gather position corrections that push overlapping bodies apart.
    pub(crate) fn correct(&self, bodies: &mut BodySet, params: &PhysicsParams) {
        let Some((a, b)) = bodies.pair_mut(self.body_a, self.body_b) else {
            return;
        };
        let manifold_count = self.manifold_divisor(params);
        let cp = &params.contact;

        for manifold in &self.manifolds {
            let n = *manifold.normal;
            let point_count = manifold.points.len() as f64;
            let c = (cp.baumgarte * (cp.allowed_slop - manifold.depth))
                .clamp(-cp.max_linear_correction, 0.0);

            for pair in manifold.points.iter() {
                let ra = pair.a - a.position;
                let rb = pair.b - b.position;
                let k = effective_mass(a, b, ra, rb, n);
                if k <= 0.0 {
                    break;
                }
                let lambda = -c / k / point_count / manifold_count;
                a.apply_correction(n * lambda, ra);
                b.apply_correction(-n * lambda, rb);
            }
        }
    }
}

/// Velocity of B's contact point relative to A's, including surface velocities.
fn relative_velocity(a: &Body, b: &Body, ra: Vec2, rb: Vec2, n: Vec2) -> Vec2 {
    m::snap_to_zero(
        b.surface_velocity(m::left_normal(n), rb) - a.surface_velocity(m::right_normal(n), ra),
    )
}

fn effective_mass(a: &Body, b: &Body, ra: Vec2, rb: Vec2, n: Vec2) -> f64 {
    let (ran, rbn) = (m::cross(ra, n), m::cross(rb, n));
    a.mass().inv()
        + b.mass().inv()
        + ran * ran * a.moment_of_inertia().inv()
        + rbn * rbn * b.moment_of_inertia().inv()
}
