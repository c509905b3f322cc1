//! Types, aliases and helper operations for doing math with `ultraviolet`.
use std::f64::consts::PI;
pub use ultraviolet as uv;

/// A Pose has a rotation and a translation, no scaling.
///
/// Shapes and bodies are placed with Poses because the physics engine
/// does not support scaling transforms.
pub type Pose = uv::DIsometry2;
pub type Vec2 = uv::DVec2;
pub type Rotor2 = uv::DRotor2;

/// Tolerance used for every "is this basically zero" decision in the engine.
pub const EPSILON: f64 = 1e-7;

/// An angle in either degrees or radians.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(
    feature = "serde-types",
    derive(serde::Deserialize, serde::Serialize)
)]
pub enum Angle {
    Rad(f64),
    Deg(f64),
}
impl Angle {
    /// Get the angle as degrees.
    #[inline]
    pub fn deg(&self) -> f64 {
        match self {
            Angle::Rad(rad) => rad * 180.0 / PI,
            Angle::Deg(deg) => *deg,
        }
    }

    /// Get the angle as radians.
    #[inline]
    pub fn rad(&self) -> f64 {
        match self {
            Angle::Rad(rad) => *rad,
            Angle::Deg(deg) => deg * PI / 180.0,
        }
    }
}
impl Default for Angle {
    fn default() -> Self {
        Angle::Rad(0.0)
    }
}
impl From<Angle> for Rotor2 {
    #[inline]
    fn from(ang: Angle) -> Rotor2 {
        Rotor2::from_angle(ang.rad())
    }
}
impl From<Rotor2> for Angle {
    #[inline]
    fn from(rotor: Rotor2) -> Self {
        Angle::Rad(-rotor.bv.xy.atan2(rotor.s) * 2.0)
    }
}

/// A wrapper type to indicate a vector should always be normalized.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Unit<T>(T);

impl Unit<Vec2> {
    /// Normalize a vector. The zero vector becomes the x axis
    /// so that degenerate geometry still produces a usable direction.
    pub fn new_normalize(v: Vec2) -> Self {
        Unit(normalize(v))
    }

    pub const fn new_unchecked(v: Vec2) -> Self {
        Unit(v)
    }

    pub fn unit_x() -> Self {
        Unit(Vec2::unit_x())
    }

    pub fn unit_y() -> Self {
        Unit(Vec2::unit_y())
    }
}

impl std::ops::Mul<Unit<Vec2>> for Rotor2 {
    type Output = Unit<Vec2>;

    fn mul(self, rhs: Unit<Vec2>) -> Self::Output {
        Unit(self * rhs.0)
    }
}

impl<T> std::ops::Deref for Unit<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> std::ops::Neg for Unit<T>
where
    T: std::ops::Neg,
{
    type Output = Unit<<T as std::ops::Neg>::Output>;

    fn neg(self) -> Self::Output {
        Unit(-self.0)
    }
}

// Vec2 utils

/// Normalize `v`, returning the x axis for (nearly) zero vectors.
#[inline]
pub fn normalize(v: Vec2) -> Vec2 {
    let mag = v.mag();
    if mag < EPSILON {
        Vec2::unit_x()
    } else {
        v / mag
    }
}

/// Counterclockwise perpendicular `(-y, x)`.
#[inline]
pub fn left_normal(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}
/// Clockwise perpendicular `(y, -x)`.
#[inline]
pub fn right_normal(v: Vec2) -> Vec2 {
    Vec2::new(v.y, -v.x)
}

/// The scalar 2D cross product `a.x * b.y - a.y * b.x`.
#[inline]
pub fn cross(a: Vec2, b: Vec2) -> f64 {
    a.wedge(b).xy
}

/// Direction of the pose's local x axis in world space.
#[inline]
pub fn pose_direction(pose: &Pose) -> Unit<Vec2> {
    pose.rotation * Unit::unit_x()
}

// scalar utils

#[inline]
pub fn approx_zero(a: f64) -> bool {
    a.abs() < EPSILON
}

#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    approx_zero(a - b)
}

/// `a >= b` with a tolerance of [`EPSILON`].
#[inline]
pub fn approx_ge(a: f64, b: f64) -> bool {
    a - b > -EPSILON
}

/// `a <= b` with a tolerance of [`EPSILON`].
#[inline]
pub fn approx_le(a: f64, b: f64) -> bool {
    a - b < EPSILON
}

/// Snap components that are practically zero to exactly zero.
#[inline]
pub fn snap_to_zero(v: Vec2) -> Vec2 {
    let snap = |c: f64| if approx_zero(c) { 0.0 } else { c };
    Vec2::new(snap(v.x), snap(v.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn zero_vector_normalizes_to_x_axis() {
        assert_eq!(normalize(Vec2::zero()), Vec2::unit_x());
        assert_eq!(*Unit::new_normalize(Vec2::new(1e-9, 0.0)), Vec2::unit_x());
        let n = normalize(Vec2::new(3.0, 4.0));
        assert_abs_diff_eq!(n.x, 0.6, epsilon = 1e-12);
        assert_abs_diff_eq!(n.y, 0.8, epsilon = 1e-12);
    }

    #[test]
    fn perpendiculars_and_cross() {
        let v = Vec2::new(2.0, 1.0);
        assert_eq!(left_normal(v), Vec2::new(-1.0, 2.0));
        assert_eq!(right_normal(v), Vec2::new(1.0, -2.0));
        assert_abs_diff_eq!(cross(Vec2::unit_x(), Vec2::unit_y()), 1.0);
        assert_abs_diff_eq!(cross(v, left_normal(v)), v.mag_sq());
    }

    #[test]
    fn rotor_angle_conversion() {
        for deg in [0.0, 30.0, 90.0, 135.0, -60.0] {
            let rotor = Rotor2::from(Angle::Deg(deg));
            assert_abs_diff_eq!(Angle::from(rotor).deg(), deg, epsilon = 1e-9);
        }
        let dir = pose_direction(&Pose::new(Vec2::zero(), Angle::Deg(90.0).into()));
        assert_abs_diff_eq!(dir.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(dir.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn tolerant_comparisons() {
        assert!(approx_ge(1.0 - 1e-9, 1.0));
        assert!(!approx_ge(0.99, 1.0));
        assert!(approx_le(1e-9, 0.0));
        assert!(approx_eq(0.1 + 0.2, 0.3));
        assert_eq!(snap_to_zero(Vec2::new(1e-9, 2.0)), Vec2::new(0.0, 2.0));
    }
}
