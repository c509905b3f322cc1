//! Unbounded shapes for static level geometry.

use super::{impl_primitive, Derived, Frame};
use crate::math::{Pose, Unit, Vec2};

/// An infinite strip of the given width.
///
/// The strip runs perpendicular to its normal, which is the shape's local x axis.
#[derive(Clone, Debug)]
pub struct Bar {
    frame: Frame,
    width: f64,
    derived: Derived,
}
impl_primitive!(Bar);

impl Bar {
    pub fn new(width: f64) -> Self {
        let mut bar = Self {
            frame: Frame::default(),
            width,
            derived: Derived::unbounded(Vec2::zero()),
        };
        bar.recompute();
        bar
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn set_width(&mut self, width: f64) {
        self.width = width;
        self.recompute();
    }

    /// Unit vector across the strip.
    #[inline]
    pub fn normal(&self) -> Unit<Vec2> {
        self.frame.direction()
    }

    /// Points on either boundary line count as inside.
    pub fn contains_point(&self, point: Vec2) -> bool {
        (point - self.derived.center).dot(*self.normal()).abs() <= self.width / 2.0
    }

    fn recompute(&mut self) {
        self.frame.update();
        self.derived = Derived::unbounded(self.frame.position());
    }
}

/// An infinite half-plane. The normal points out of the solid side.
#[derive(Clone, Debug)]
pub struct Plane {
    frame: Frame,
    derived: Derived,
}
impl_primitive!(Plane);

impl Plane {
    pub fn new() -> Self {
        let mut plane = Self {
            frame: Frame::default(),
            derived: Derived::unbounded(Vec2::zero()),
        };
        plane.recompute();
        plane
    }

    /// Outward normal, the shape's local x axis.
    #[inline]
    pub fn normal(&self) -> Unit<Vec2> {
        self.frame.direction()
    }

    /// Points on the boundary line count as inside.
    pub fn contains_point(&self, point: Vec2) -> bool {
        (point - self.derived.center).dot(*self.normal()) <= 0.0
    }

    fn recompute(&mut self) {
        self.frame.update();
        self.derived = Derived::unbounded(self.frame.position());
    }
}

impl Default for Plane {
    fn default() -> Self {
        Self::new()
    }
}
