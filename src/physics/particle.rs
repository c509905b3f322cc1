//! Point masses that collide with bodies but not with each other.

use super::{
    body_set::BodySet,
    collision::{intersection_check, Circle, Manifold, Shape, ShapeProps},
    params::PhysicsParams,
    Body, BodyKey,
};
use crate::math::{self as m, Pose, Rotor2, Vec2};

/// A small round point mass.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Deserialize, serde::Serialize),
    serde(default)
)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub radius: f64,
    pub mass: f64,
}

impl Default for Particle {
    fn default() -> Self {
        Self {
            position: Vec2::zero(),
            velocity: Vec2::zero(),
            radius: 0.08,
            mass: 0.006,
        }
    }
}

impl Particle {
    pub fn new(position: Vec2, velocity: Vec2) -> Self {
        Self {
            position,
            velocity,
            ..Default::default()
        }
    }

    #[inline]
    pub fn inv_mass(&self) -> f64 {
        if self.mass > 0.0 {
            1.0 / self.mass
        } else {
            0.0
        }
    }

    /// Circle standing in for the particle during collision detection.
    fn shape(&self) -> Shape {
        let mut circle = Circle::new(self.radius);
        circle.set_body_pose(Pose::new(self.position, Rotor2::identity()));
        circle.into()
    }
}

// the particle is shape A, so normals point from the body toward the particle
struct ParticleContact {
    particle: usize,
    body: BodyKey,
    manifold: Manifold,
}

/// A group of particles simulated together.
#[derive(Clone, Debug, Default)]
pub struct ParticleSystem {
    pub particles: Vec<Particle>,
}

impl ParticleSystem {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn spawn(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Particles whose centers are within `radius` of `center`.
    pub fn particles_in_area(&self, center: Vec2, radius: f64) -> impl Iterator<Item = &Particle> {
        self.particles
            .iter()
            .filter(move |p| (p.position - center).mag_sq() <= radius * radius)
    }

    /// Collide particles with bodies, then move them under gravity.
    pub(crate) fn tick(&mut self, bodies: &mut BodySet, params: &PhysicsParams, dt: f64) {
        for contact in self.find_contacts(bodies) {
            self.correct(&contact, bodies, params);
            self.resolve(&contact, bodies);
        }

        for particle in &mut self.particles {
            particle.velocity += params.gravity * dt;
            particle.position += particle.velocity * dt;
        }
    }

    fn find_contacts(&self, bodies: &BodySet) -> Vec<ParticleContact> {
        let mut contacts = Vec::new();
        for (idx, particle) in self.particles.iter().enumerate() {
            let shape = particle.shape();
            let aabb = shape.aabb();
            for (key, body) in bodies.iter() {
                let Some(body_shape) = body.shape() else {
                    continue;
                };
                if !aabb.overlaps(&body_shape.aabb()) {
                    continue;
                }
                contacts.extend(
                    intersection_check(&shape, body_shape)
                        .into_iter()
                        .map(|manifold| ParticleContact {
                            particle: idx,
                            body: key,
                            manifold,
                        }),
                );
            }
        }
        contacts
    }

    fn correct(&mut self, contact: &ParticleContact, bodies: &mut BodySet, params: &PhysicsParams) {
        let (Some(particle), Some(body)) = (
            self.particles.get_mut(contact.particle),
            bodies.get_mut(contact.body),
        ) else {
            return;
        };
        let inv_mp = particle.inv_mass();
        let inv_sum = body.mass().inv() + inv_mp;
        if inv_sum <= 0.0 {
            return;
        }
        let pp = &params.particle;
        let depth = (contact.manifold.depth - pp.slop).max(0.0);
        let correction = *contact.manifold.normal * (depth / inv_sum * pp.correction);
        body.apply_linear_correction(-correction);
        particle.position += correction * inv_mp;
    }

    fn resolve(&mut self, contact: &ParticleContact, bodies: &mut BodySet) {
        let (Some(particle), Some(body)) = (
            self.particles.get_mut(contact.particle),
            bodies.get_mut(contact.body),
        ) else {
            return;
        };
        let n = *contact.manifold.normal;
        let inv_mp = particle.inv_mass();
        let count = contact.manifold.points.len() as f64;
        let friction = body.material.particle_friction;

        for pair in contact.manifold.points.iter() {
            let r = pair.b - body.position;
            let rn = m::cross(r, n);
            let k = body.mass().inv() + inv_mp + rn * rn * body.moment_of_inertia().inv();
            if k <= 0.0 {
                break;
            }
            // n points from the body to the particle, so positive vn means moving apart
            let vn = relative_velocity(particle, body, n, r).dot(n);
            if vn > 0.0 {
                break;
            }
            let impulse = n * (-vn / k / count);
            body.apply_impulse(-impulse, r, false);
            particle.velocity += impulse * inv_mp;

            let rv = relative_velocity(particle, body, n, r);
            let mut tangent = m::left_normal(n);
            if rv.dot(tangent) > 0.0 {
                tangent = -tangent;
            }
            let vt = rv.dot(tangent);
            let impulse = tangent * (-vt * friction / k / count);
            body.apply_impulse(-impulse, r, true);
            particle.velocity += impulse * inv_mp;
        }
    }
}

/// Particle velocity relative to the body's surface at offset `r`.
fn relative_velocity(particle: &Particle, body: &Body, n: Vec2, r: Vec2) -> Vec2 {
    m::snap_to_zero(particle.velocity - body.surface_velocity(m::right_normal(n), r))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{body::MassSpec, collision::Plane, BodyParams};
    use approx::assert_abs_diff_eq;
    use std::f64::consts::FRAC_PI_2;

    fn floor(bodies: &mut BodySet) -> BodyKey {
        bodies.insert(
            Body::new(
                BodyParams {
                    position: Vec2::new(0.0, -5.0),
                    mass: MassSpec::Static,
                    ..Default::default()
                },
                Some(Plane::new().with_offset(Vec2::zero(), FRAC_PI_2).into()),
            )
            .unwrap(),
        )
    }

    #[test]
    fn particle_comes_to_rest_on_floor() {
        let mut bodies = BodySet::new();
        floor(&mut bodies);
        let mut system = ParticleSystem::new();
        system.spawn(Particle::new(Vec2::new(0.0, -4.5), Vec2::zero()));

        let params = PhysicsParams::default();
        let dt = 1.0 / 60.0;
        for _ in 0..240 {
            for (_, body) in bodies.iter_mut() {
                body.prepare();
            }
            system.tick(&mut bodies, &params, dt);
        }

        let p = system.particles[0];
        assert!(p.position.y < -5.0 + p.radius, "{:?}", p);
        assert!(p.position.y > -5.0, "{:?}", p);
        assert!(p.velocity.mag() <= 9.81 * dt + 1e-9, "{:?}", p);
        assert_abs_diff_eq!(p.position.x, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn particle_in_corner_is_stopped_by_both_walls() {
        let mut bodies = BodySet::new();
        for angle in [FRAC_PI_2, 0.0] {
            bodies.insert(
                Body::new(
                    BodyParams {
                        mass: MassSpec::Static,
                        ..Default::default()
                    },
                    Some(Plane::new().with_offset(Vec2::zero(), angle).into()),
                )
                .unwrap(),
            );
        }
        let mut system = ParticleSystem::new();
        system.spawn(Particle::new(Vec2::new(0.05, 0.05), Vec2::new(-1.0, -1.0)));

        let params = PhysicsParams {
            gravity: Vec2::zero(),
            ..Default::default()
        };
        system.tick(&mut bodies, &params, 1.0 / 60.0);

        let p = system.particles[0];
        // each wall takes its share of the penetration past the slop
        let push = (p.radius - 0.05 - params.particle.slop) * params.particle.correction;
        assert_abs_diff_eq!(p.position.x, 0.05 + push, epsilon = 1e-9);
        assert_abs_diff_eq!(p.position.y, 0.05 + push, epsilon = 1e-9);
        assert_abs_diff_eq!(p.velocity.x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.velocity.y, 0.0, epsilon = 1e-9);
    }

    #[test]
    fn particle_pushes_dynamic_body() {
        let mut bodies = BodySet::new();
        let ball = bodies.insert(
            Body::new(BodyParams::default(), Some(Circle::new(0.5).into())).unwrap(),
        );
        let mut system = ParticleSystem::new();
        system.spawn(Particle::new(Vec2::new(-0.55, 0.0), Vec2::new(10.0, 0.0)));

        let params = PhysicsParams {
            gravity: Vec2::zero(),
            ..Default::default()
        };
        system.tick(&mut bodies, &params, 1.0 / 60.0);

        let body = bodies.get(ball).unwrap();
        assert!(body.solver_velocity().linear.x > 0.0);
        assert!(body.corrected_pose().translation.x > 0.0);
        // a normal impulse never spins a circle
        assert_eq!(body.solver_velocity().angular, 0.0);
        assert!(system.particles[0].velocity.x < 10.0);
    }

    #[test]
    fn area_query_finds_nearby_particles() {
        let mut system = ParticleSystem::new();
        for x in 0..5 {
            system.spawn(Particle::new(Vec2::new(x as f64, 0.0), Vec2::zero()));
        }
        itertools::assert_equal(
            system
                .particles_in_area(Vec2::new(1.0, 0.0), 1.0)
                .map(|p| p.position.x),
            [0.0, 1.0, 2.0],
        );
        assert_eq!(system.len(), 5);
    }
}
