//! Tunable parameters of the physics world.

use crate::math::Vec2;

/// Parameters for the whole physics world.
///
/// All fields have sensible defaults, and with the `serde-types` feature
/// a config file only needs to list the fields it changes.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Deserialize, serde::Serialize),
    serde(default)
)]
pub struct PhysicsParams {
    /// Acceleration applied to every non-static body, in metres per second squared.
    pub gravity: Vec2,
    /// How many times contacts and rigid constraints are resolved per tick.
    /// Springs are applied once regardless. Extra iterations make stacks
    /// settle faster, but each pass applies restitution anew to contacts
    /// that are still approaching.
    pub velocity_iterations: usize,
    /// Divide impulses by the number of manifolds between a pair of bodies,
    /// so that compound shapes with many touching children don't get pushed too hard.
    pub split_by_manifold: bool,
    pub contact: ContactParams,
    pub joint: JointParams,
    pub particle: ParticleParams,
}

impl Default for PhysicsParams {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -9.81),
            velocity_iterations: 1,
            split_by_manifold: true,
            contact: ContactParams::default(),
            joint: JointParams::default(),
            particle: ParticleParams::default(),
        }
    }
}

/// Parameters for correcting penetration between bodies.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Deserialize, serde::Serialize),
    serde(default)
)]
pub struct ContactParams {
    /// Fraction of the penetration fixed per tick.
    pub baumgarte: f64,
    /// Upper limit for how far a single contact point can push bodies apart per tick.
    pub max_linear_correction: f64,
    /// Penetration that is left alone to keep resting contacts stable.
    pub allowed_slop: f64,
}

impl Default for ContactParams {
    fn default() -> Self {
        Self {
            baumgarte: 0.6,
            max_linear_correction: 0.5,
            allowed_slop: 0.001,
        }
    }
}

/// Parameters for positional correction of joint constraints.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Deserialize, serde::Serialize),
    serde(default)
)]
pub struct JointParams {
    /// Fraction of an axle's separation fixed per tick.
    pub axle_correction: f64,
    /// Fraction of a distance constraint's violation fixed per tick.
    pub distance_correction: f64,
}

impl Default for JointParams {
    fn default() -> Self {
        Self {
            axle_correction: 0.4,
            distance_correction: 0.2,
        }
    }
}

/// Parameters for contacts between particles and bodies.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Deserialize, serde::Serialize),
    serde(default)
)]
pub struct ParticleParams {
    /// Fraction of a particle's penetration fixed per tick.
    pub correction: f64,
    /// Penetration that is left alone.
    pub slop: f64,
}

impl Default for ParticleParams {
    fn default() -> Self {
        Self {
            correction: 0.2,
            slop: 0.01,
        }
    }
}

#[cfg(all(test, feature = "serde-types"))]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let params: PhysicsParams = ron::from_str(
            "(velocity_iterations: 4, contact: (baumgarte: 0.3), split_by_manifold: false)",
        )
        .expect("valid config");
        assert_eq!(params.velocity_iterations, 4);
        assert!(!params.split_by_manifold);
        assert_eq!(params.contact.baumgarte, 0.3);
        assert_eq!(params.contact.allowed_slop, 0.001);
        assert_eq!(params.joint, JointParams::default());
        assert_eq!(params.gravity, Vec2::new(0.0, -9.81));
    }

    #[test]
    fn empty_config_is_default() {
        let params: PhysicsParams = ron::from_str("()").expect("valid config");
        assert_eq!(params, PhysicsParams::default());
    }
}
