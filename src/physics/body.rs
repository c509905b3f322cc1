use super::{
    collision::{Shape, ShapeProps},
    PhysicsError, Velocity,
};
use crate::math::{self as m, Angle, Pose, Rotor2, Vec2};

/// Initial state and properties of a [`Body`].
#[derive(Clone, Copy, Debug, Default)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Deserialize, serde::Serialize),
    serde(default)
)]
pub struct BodyParams {
    pub position: Vec2,
    pub rotation: Angle,
    pub velocity: Velocity,
    pub material: Material,
    pub mass: MassSpec,
}

/// How to determine a body's mass and moment of inertia.
///
/// Every option except `Static` computes the rest of the values from
/// the body's shape, so those need a shape with a finite, nonzero area.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Deserialize, serde::Serialize)
)]
pub enum MassSpec {
    Density(f64),
    Mass(f64),
    InverseMass(f64),
    Inertia(f64),
    InverseInertia(f64),
    /// Infinite mass and inertia. Static bodies are not moved by contacts,
    /// constraints or gravity, but still move with whatever velocity they're given.
    Static,
}

impl Default for MassSpec {
    fn default() -> Self {
        MassSpec::Density(1.0)
    }
}

/// Surface and damping properties of a body.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Deserialize, serde::Serialize),
    serde(default)
)]
pub struct Material {
    /// Bounciness. The smaller value of two touching bodies is used.
    pub restitution: f64,
    /// Exponential damping rate of linear velocity, per second.
    pub linear_drag: f64,
    /// Exponential damping rate of angular velocity, per second.
    pub angular_drag: f64,
    pub static_friction: f64,
    pub dynamic_friction: f64,
    /// Friction against particles.
    pub particle_friction: f64,
    /// Speed at which the surface moves along itself, like a conveyor belt.
    pub surface_velocity: f64,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            restitution: 0.0,
            linear_drag: 0.01,
            angular_drag: 0.01,
            static_friction: 0.08,
            dynamic_friction: 0.08,
            particle_friction: 0.001,
            surface_velocity: 0.0,
        }
    }
}

/// A rigid body simulated by the physics world.
#[derive(Clone, Debug)]
pub struct Body {
    pub position: Vec2,
    /// Rotation in radians, counterclockwise.
    pub rotation: f64,
    pub velocity: Velocity,
    pub material: Material,
    mass: Mass,
    moment_of_inertia: Mass,
    density: f64,
    shape: Option<Shape>,
    // velocity changes and position changes gathered during a tick
    impulse: Velocity,
    correction: Velocity,
}

impl Body {
    /// Create a body. Fails if the mass spec can't be satisfied with the given shape.
    pub fn new(params: BodyParams, shape: Option<Shape>) -> Result<Self, PhysicsError> {
        let mut body = Self {
            position: params.position,
            rotation: params.rotation.rad(),
            velocity: params.velocity,
            material: params.material,
            mass: Mass::Infinite,
            moment_of_inertia: Mass::Infinite,
            density: f64::INFINITY,
            shape,
            impulse: Velocity::default(),
            correction: Velocity::default(),
        };
        body.prepare();
        body.set_mass_spec(params.mass)?;
        Ok(body)
    }

    /// Recompute mass, moment of inertia and density.
    ///
    /// On failure the previous mass properties are kept.
    pub fn set_mass_spec(&mut self, spec: MassSpec) -> Result<(), PhysicsError> {
        match self.mass_from_spec(spec) {
            Ok(()) => Ok(()),
            Err(err) => {
                log::warn!("Rejected mass spec {:?}: {}", spec, err);
                Err(err)
            }
        }
    }

    fn mass_from_spec(&mut self, spec: MassSpec) -> Result<(), PhysicsError> {
        let (value, density_from): (f64, fn(&Shape, f64) -> f64) = match spec {
            MassSpec::Static => {
                self.mass = Mass::Infinite;
                self.moment_of_inertia = Mass::Infinite;
                self.density = f64::INFINITY;
                return Ok(());
            }
            MassSpec::Density(d) => (d, |_: &Shape, d: f64| d),
            MassSpec::Mass(mass) => (mass, |s: &Shape, mass: f64| s.density_from_mass(mass)),
            MassSpec::InverseMass(inv) => {
                (inv, |s: &Shape, inv: f64| s.density_from_mass(1.0 / inv))
            }
            MassSpec::Inertia(inertia) => (inertia, |s: &Shape, i: f64| s.density_from_inertia(i)),
            MassSpec::InverseInertia(inv) => {
                (inv, |s: &Shape, inv: f64| s.density_from_inertia(1.0 / inv))
            }
        };
        if !(value.is_finite() && value > 0.0) {
            return Err(PhysicsError::InvalidMass(value));
        }

        let shape = self.shape.as_ref().ok_or(PhysicsError::MissingShape)?;
        let (area, inertia_factor) = (shape.area(), shape.inertia_factor());
        if !(area.is_finite() && area > 0.0 && inertia_factor.is_finite() && inertia_factor > 0.0)
        {
            return Err(PhysicsError::UnboundedShape(shape.kind()));
        }

        let density = density_from(shape, value);
        self.density = density;
        self.mass = Mass::from(shape.compute_mass(density));
        self.moment_of_inertia = Mass::from(shape.compute_inertia(density));
        Ok(())
    }

    #[inline]
    pub fn mass(&self) -> Mass {
        self.mass
    }

    #[inline]
    pub fn moment_of_inertia(&self) -> Mass {
        self.moment_of_inertia
    }

    #[inline]
    pub fn density(&self) -> f64 {
        self.density
    }

    /// Static bodies have infinite mass and inertia.
    #[inline]
    pub fn is_static(&self) -> bool {
        matches!(
            (self.mass, self.moment_of_inertia),
            (Mass::Infinite, Mass::Infinite)
        )
    }

    #[inline]
    pub fn shape(&self) -> Option<&Shape> {
        self.shape.as_ref()
    }

    /// Replace the shape. A dynamic body keeps its density and gets a new mass.
    pub fn set_shape(&mut self, shape: Option<Shape>) -> Result<(), PhysicsError> {
        self.shape = shape;
        self.prepare();
        if self.is_static() {
            Ok(())
        } else {
            self.set_mass_spec(MassSpec::Density(self.density))
        }
    }

    #[inline]
    pub fn pose(&self) -> Pose {
        Pose::new(self.position, Rotor2::from_angle(self.rotation))
    }

    /// The pose the body will have once the corrections gathered this tick are applied.
    pub fn corrected_pose(&self) -> Pose {
        Pose::new(
            self.position + self.correction.linear,
            Rotor2::from_angle(self.rotation + self.correction.angular),
        )
    }

    /// Move the shape to where the body is.
    pub(crate) fn prepare(&mut self) {
        let pose = self.pose();
        if let Some(shape) = &mut self.shape {
            shape.set_body_pose(pose);
        }
    }

    /// Store an impulse to be applied at the end of the tick.
    ///
    /// `offset` is the point of application relative to the body's position.
    /// Impulses that aren't `rotational` never spin circles.
    pub fn apply_impulse(&mut self, impulse: Vec2, offset: Vec2, rotational: bool) {
        self.impulse.linear += impulse * self.mass.inv();
        let spins = rotational || !self.shape.as_ref().map_or(false, Shape::is_circle);
        if spins {
            self.impulse.angular += self.moment_of_inertia.inv() * m::cross(offset, impulse);
        }
    }

    /// Store a positional correction to be applied at the end of the tick.
    /// Works like an impulse, but moves the body instead of changing its velocity.
    pub fn apply_correction(&mut self, impulse: Vec2, offset: Vec2) {
        self.correction.linear += impulse * self.mass.inv();
        self.correction.angular += self.moment_of_inertia.inv() * m::cross(offset, impulse);
    }

    /// Store a correction that only moves the body without rotating it.
    pub fn apply_linear_correction(&mut self, impulse: Vec2) {
        self.correction.linear += impulse * self.mass.inv();
    }

    /// Velocity including impulses gathered so far this tick.
    #[inline]
    pub fn solver_velocity(&self) -> Velocity {
        self.velocity + self.impulse
    }

    /// Velocity of a point on the surface, including the material's surface velocity
    /// along `tangent`.
    pub fn surface_velocity(&self, tangent: Vec2, offset: Vec2) -> Vec2 {
        self.solver_velocity().point_velocity(offset) + tangent * self.material.surface_velocity
    }

    /// Apply everything gathered during the tick, then external forces and drag,
    /// and move the body forward by `dt`.
    pub(crate) fn integrate(&mut self, gravity: Vec2, dt: f64) {
        self.velocity += self.impulse;
        self.position += self.correction.linear;
        self.rotation += self.correction.angular;
        self.impulse = Velocity::default();
        self.correction = Velocity::default();

        if !self.is_static() {
            self.velocity.linear += gravity * dt;
            self.velocity.linear *= (-self.material.linear_drag * dt).exp();
            self.velocity.angular *= (-self.material.angular_drag * dt).exp();
        }

        self.position += self.velocity.linear * dt;
        self.rotation += self.velocity.angular * dt;
    }
}

/// Mass or moment of inertia of a body, which can be infinite.
///
/// This stores both a mass value and its inverse, because calculating inverse mass
/// is expensive and needed a lot in physics calculations.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Mass {
    Finite { mass: f64, inverse: f64 },
    Infinite,
}

impl From<f64> for Mass {
    #[inline]
    fn from(mass: f64) -> Self {
        Mass::Finite {
            mass,
            inverse: 1.0 / mass,
        }
    }
}

impl Mass {
    /// Get the inverse of the mass, which is zero if the mass is infinite.
    #[inline]
    pub fn inv(&self) -> f64 {
        match self {
            Mass::Finite { inverse, .. } => *inverse,
            Mass::Infinite => 0.0,
        }
    }

    #[inline]
    pub fn value(&self) -> f64 {
        match self {
            Mass::Finite { mass, .. } => *mass,
            Mass::Infinite => f64::INFINITY,
        }
    }
}
