//! Joints that restrict the relative motion of two bodies,
//! or the motion of a single body in the world.

use super::{body_set::BodySet, params::JointParams, Body, BodyKey};
use crate::math::{self as m, Pose, Vec2};

/// One end of a constraint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Anchor {
    /// The body this end is attached to. `None` pins the end to the world.
    pub body: Option<BodyKey>,
    /// Point relative to the body's pose, or in world space if there's no body.
    pub point: Vec2,
}

impl Anchor {
    #[inline]
    pub fn body(key: BodyKey, local_point: Vec2) -> Self {
        Self {
            body: Some(key),
            point: local_point,
        }
    }

    #[inline]
    pub fn world(point: Vec2) -> Self {
        Self { body: None, point }
    }
}

/// Type-specific variables for constraints.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ConstraintKind {
    /// Keeps the two anchors in the same place.
    Axle,
    /// Keeps the distance between the anchors between `min` and `max`,
    /// like a rope when `min` is zero or a rod when they're equal.
    Distance { min: f64, max: f64 },
    /// Pulls the anchors back toward the range between `min` and `max`.
    Spring {
        min: f64,
        max: f64,
        stiffness: f64,
        damping: f64,
    },
}

impl ConstraintKind {
    /// A spring with the default stiffness and damping.
    pub fn spring(min: f64, max: f64) -> Self {
        ConstraintKind::Spring {
            min,
            max,
            stiffness: 0.05,
            damping: 0.01,
        }
    }

    #[inline]
    pub fn is_spring(&self) -> bool {
        matches!(self, ConstraintKind::Spring { .. })
    }
}

/// A constraint restricts the relative motion of two bodies,
/// or the motion of a single body in the world.
///
/// [`ConstraintBuilder`][self::ConstraintBuilder] is the preferred
/// way to create these, but the fields are public to allow in-place editing.
#[derive(Clone, Debug)]
pub struct Constraint {
    pub anchors: [Anchor; 2],
    pub kind: ConstraintKind,
    /// Disabled constraints are skipped entirely,
    /// and don't stop their bodies from colliding.
    pub enabled: bool,
    /// Skip contacts between the two bodies while this constraint is enabled.
    pub disable_collision: bool,
    state: LinkState,
}

/// Values recomputed from the bodies' poses before solving.
#[derive(Clone, Copy, Debug, Default)]
struct LinkState {
    world_anchors: [Vec2; 2],
    // anchors relative to the body positions, used as lever arms
    offsets: [Vec2; 2],
    normal: Vec2,
    distance: f64,
    depth: f64,
    active: bool,
}

impl Constraint {
    pub fn new(a: Anchor, b: Anchor, kind: ConstraintKind) -> Self {
        Self {
            anchors: [a, b],
            kind,
            enabled: true,
            disable_collision: true,
            state: LinkState::default(),
        }
    }

    /// World positions of both anchors as of the last tick.
    #[inline]
    pub fn world_anchors(&self) -> [Vec2; 2] {
        self.state.world_anchors
    }

    /// Distance between the anchors as of the last tick.
    #[inline]
    pub fn distance(&self) -> f64 {
        self.state.distance
    }

    /// Bodies this constraint is attached to.
    pub fn bodies(&self) -> impl Iterator<Item = BodyKey> + '_ {
        self.anchors.iter().filter_map(|a| a.body)
    }

    /// Whether this constraint stops contacts between bodies `a` and `b`, in either order.
    pub fn disables_collision_between(&self, a: BodyKey, b: BodyKey) -> bool {
        if !(self.enabled && self.disable_collision) {
            return false;
        }
        let [first, second] = [self.anchors[0].body, self.anchors[1].body];
        (first == Some(a) && second == Some(b)) || (first == Some(b) && second == Some(a))
    }

    /// A constraint between two immovable ends can't do anything.
    pub(crate) fn is_useless(&self, bodies: &BodySet) -> bool {
        if let [Some(a), Some(b)] = [self.anchors[0].body, self.anchors[1].body] {
            if a == b {
                return true;
            }
        }
        self.anchors.iter().all(|anchor| {
            anchor
                .body
                .and_then(|key| bodies.get(key))
                .map_or(true, Body::is_static)
        })
    }

    /// Recompute anchors and the constraint's state from body poses.
    ///
    /// With `corrected`, positional corrections gathered this tick are included.
    pub(crate) fn prepare(&mut self, bodies: &BodySet, corrected: bool) {
        let mut state = LinkState::default();
        for (i, anchor) in self.anchors.iter().enumerate() {
            let body = anchor.body.and_then(|key| bodies.get(key));
            let pose: Option<Pose> = body.map(|b| {
                if corrected {
                    b.corrected_pose()
                } else {
                    b.pose()
                }
            });
            match pose {
                Some(pose) => {
                    state.world_anchors[i] = pose * anchor.point;
                    state.offsets[i] = state.world_anchors[i] - pose.translation;
                }
                None => {
                    state.world_anchors[i] = anchor.point;
                    state.offsets[i] = anchor.point;
                }
            }
        }

        let [a, b] = state.world_anchors;
        state.distance = (b - a).mag();
        state.normal = m::normalize(b - a);

        match self.kind {
            ConstraintKind::Axle => {
                state.depth = state.distance;
                state.active = true;
            }
            ConstraintKind::Distance { min, max } | ConstraintKind::Spring { min, max, .. } => {
                if state.distance >= max {
                    state.depth = state.distance - max;
                    state.active = true;
                } else if state.distance <= min {
                    state.normal = -state.normal;
                    state.depth = min - state.distance;
                    state.active = true;
                }
            }
        }

        self.state = state;
    }

    /// Apply velocity impulses toward satisfying the constraint.
    pub(crate) fn resolve(&self, bodies: &mut BodySet, dt: f64) {
        if !self.state.active || self.is_useless(bodies) {
            return;
        }
        let (mut body_a, mut body_b) =
            bodies.optional_pair_mut(self.anchors[0].body, self.anchors[1].body);
        let [ra, rb] = self.state.offsets;
        let n = self.state.normal;

        let velocity_at = |body: &Option<&mut Body>, offset: Vec2| {
            body.as_ref()
                .map_or(Vec2::zero(), |b| b.solver_velocity().point_velocity(offset))
        };
        let rv = velocity_at(&body_b, rb) - velocity_at(&body_a, ra);
        let vn = rv.dot(n);

        let j = match self.kind {
            ConstraintKind::Axle | ConstraintKind::Distance { .. } => {
                if vn < 0.0 {
                    return;
                }
                let k = effective_mass(&body_a, &body_b, ra, rb, n);
                if k <= 0.0 {
                    return;
                }
                -vn / k
            }
            ConstraintKind::Spring {
                stiffness, damping, ..
            } => (stiffness * -self.state.depth - damping * vn) * dt,
        };

        let impulse = n * j;
        if let Some(a) = &mut body_a {
            a.apply_impulse(-impulse, ra, true);
        }
        if let Some(b) = &mut body_b {
            b.apply_impulse(impulse, rb, true);
        }
    }

    /// Move the bodies toward satisfying the constraint.
    pub(crate) fn correct(&self, bodies: &mut BodySet, params: &JointParams) {
        if !self.state.active || self.is_useless(bodies) {
            return;
        }
        let factor = match self.kind {
            ConstraintKind::Axle => params.axle_correction,
            ConstraintKind::Distance { .. } => params.distance_correction,
            ConstraintKind::Spring { .. } => return,
        };

        let (body_a, body_b) = bodies.optional_pair_mut(self.anchors[0].body, self.anchors[1].body);
        let inv_mass = |body: &Option<&mut Body>| body.as_ref().map_or(0.0, |b| b.mass().inv());
        let inv_sum = inv_mass(&body_a) + inv_mass(&body_b);
        if inv_sum <= 0.0 {
            return;
        }

        let correction = self.state.normal * (self.state.depth.max(0.0) / inv_sum * factor);
        if let Some(a) = body_a {
            a.apply_linear_correction(correction);
        }
        if let Some(b) = body_b {
            b.apply_linear_correction(-correction);
        }
    }
}

fn effective_mass(
    a: &Option<&mut Body>,
    b: &Option<&mut Body>,
    ra: Vec2,
    rb: Vec2,
    n: Vec2,
) -> f64 {
    let term = |body: &Option<&mut Body>, r: Vec2| {
        body.as_ref().map_or(0.0, |body| {
            let rn = m::cross(r, n);
            body.mass().inv() + rn * rn * body.moment_of_inertia().inv()
        })
    };
    term(a, ra) + term(b, rb)
}

/// A builder that allows ergonomic construction of different constraints.
#[derive(Clone, Copy, Debug)]
pub struct ConstraintBuilder {
    anchors: [Anchor; 2],
    disable_collision: bool,
}

impl ConstraintBuilder {
    /// Start building a constraint on the given body.
    ///
    /// If you don't connect the constraint to another body with
    /// `with_target`, it will be connected to the world origin.
    pub fn new(owner: BodyKey) -> Self {
        Self {
            anchors: [
                Anchor::body(owner, Vec2::zero()),
                Anchor::world(Vec2::zero()),
            ],
            disable_collision: true,
        }
    }

    /// Attach the constraint to another body.
    pub fn with_target(mut self, target: BodyKey) -> Self {
        self.anchors[1].body = Some(target);
        self
    }

    /// Set the anchor point on the owning body relative to its pose.
    pub fn with_origin(mut self, point: Vec2) -> Self {
        self.anchors[0].point = point;
        self
    }

    /// Set the anchor point on the target body relative to its pose,
    /// or in the world if there is no target.
    pub fn with_target_origin(mut self, point: Vec2) -> Self {
        self.anchors[1].point = point;
        self
    }

    /// Let the two bodies keep colliding with each other.
    pub fn with_collision(mut self) -> Self {
        self.disable_collision = false;
        self
    }

    /// Build an axle that pins the anchor points together.
    pub fn build_axle(self) -> Constraint {
        self.build(ConstraintKind::Axle)
    }

    pub fn build_distance(self, min: f64, max: f64) -> Constraint {
        self.build(ConstraintKind::Distance { min, max })
    }

    /// Build a spring with default stiffness and damping.
    pub fn build_spring(self, min: f64, max: f64) -> Constraint {
        self.build(ConstraintKind::spring(min, max))
    }

    fn build(self, kind: ConstraintKind) -> Constraint {
        let mut constraint = Constraint::new(self.anchors[0], self.anchors[1], kind);
        constraint.disable_collision = self.disable_collision;
        constraint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::{body::MassSpec, collision::Circle, BodyParams};
    use approx::assert_abs_diff_eq;

    fn ball(bodies: &mut BodySet, position: Vec2, spec: MassSpec) -> BodyKey {
        bodies.insert(
            Body::new(
                BodyParams {
                    position,
                    mass: spec,
                    ..Default::default()
                },
                Some(Circle::new(0.5).into()),
            )
            .unwrap(),
        )
    }

    fn tied_to_origin(bodies: &mut BodySet, x: f64, kind: ConstraintKind) -> (BodyKey, Constraint) {
        let key = ball(bodies, Vec2::new(x, 0.0), MassSpec::Density(1.0));
        let c = Constraint::new(Anchor::body(key, Vec2::zero()), Anchor::world(Vec2::zero()), kind);
        (key, c)
    }

    fn step(c: &mut Constraint, bodies: &mut BodySet) {
        c.prepare(bodies, false);
        c.resolve(bodies, 1.0);
        c.correct(bodies, &JointParams::default());
    }

    #[test]
    fn immovable_ends_do_nothing() {
        let mut bodies = BodySet::new();
        let wall = ball(&mut bodies, Vec2::new(3.0, 0.0), MassSpec::Static);
        bodies.get_mut(wall).unwrap().velocity.linear = Vec2::new(1.0, 0.0);
        let mut c = Constraint::new(
            Anchor::body(wall, Vec2::zero()),
            Anchor::world(Vec2::zero()),
            ConstraintKind::Axle,
        );
        assert!(c.is_useless(&bodies));
        step(&mut c, &mut bodies);
        let wall = bodies.get(wall).unwrap();
        assert_eq!(wall.solver_velocity().linear, Vec2::new(1.0, 0.0));
        assert_eq!(wall.corrected_pose().translation, Vec2::new(3.0, 0.0));

        let mut floating = Constraint::new(
            Anchor::world(Vec2::zero()),
            Anchor::world(Vec2::new(5.0, 0.0)),
            ConstraintKind::Distance { min: 0.0, max: 1.0 },
        );
        assert!(floating.is_useless(&bodies));
        step(&mut floating, &mut bodies);
    }

    #[test]
    fn rope_stops_only_separating_motion() {
        let mut bodies = BodySet::new();
        let kind = ConstraintKind::Distance { min: 0.0, max: 2.0 };
        let (key, mut rope) = tied_to_origin(&mut bodies, 2.0, kind);

        bodies.get_mut(key).unwrap().velocity.linear = Vec2::new(-3.0, 0.0);
        step(&mut rope, &mut bodies);
        assert_abs_diff_eq!(bodies.get(key).unwrap().solver_velocity().linear.x, -3.0);

        bodies.get_mut(key).unwrap().velocity.linear = Vec2::new(3.0, 1.0);
        step(&mut rope, &mut bodies);
        // the pending impulse from this step cancels the outward part
        let v = bodies.get(key).unwrap().solver_velocity().linear;
        assert_abs_diff_eq!(v.x, 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(v.y, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn slack_rope_is_inactive() {
        let mut bodies = BodySet::new();
        let kind = ConstraintKind::Distance { min: 0.5, max: 2.0 };
        let (key, mut rope) = tied_to_origin(&mut bodies, 1.0, kind);
        bodies.get_mut(key).unwrap().velocity.linear = Vec2::new(5.0, 0.0);
        step(&mut rope, &mut bodies);
        let body = bodies.get(key).unwrap();
        assert_eq!(body.solver_velocity().linear, Vec2::new(5.0, 0.0));
        assert_eq!(body.corrected_pose().translation, Vec2::new(1.0, 0.0));
    }

    #[test]
    fn rod_pushes_back_when_too_short() {
        let mut bodies = BodySet::new();
        let kind = ConstraintKind::Distance { min: 1.0, max: 3.0 };
        let (key, mut rod) = tied_to_origin(&mut bodies, 0.5, kind);
        bodies.get_mut(key).unwrap().velocity.linear = Vec2::new(-2.0, 0.0);
        step(&mut rod, &mut bodies);
        let body = bodies.get(key).unwrap();
        assert_abs_diff_eq!(body.solver_velocity().linear.x, 0.0, epsilon = 1e-9);
        // 20% of the 0.5 violation
        assert_abs_diff_eq!(body.corrected_pose().translation.x, 0.6, epsilon = 1e-9);
    }

    #[test]
    fn stretched_rope_is_pulled_in() {
        let mut bodies = BodySet::new();
        let kind = ConstraintKind::Distance { min: 0.0, max: 2.0 };
        let (key, mut rope) = tied_to_origin(&mut bodies, 2.5, kind);
        step(&mut rope, &mut bodies);
        assert_abs_diff_eq!(
            bodies.get(key).unwrap().corrected_pose().translation.x,
            2.4,
            epsilon = 1e-9
        );
    }

    #[test]
    fn spring_pulls_without_correcting() {
        let mut bodies = BodySet::new();
        let (key, mut spring) = tied_to_origin(&mut bodies, 2.5, ConstraintKind::spring(0.0, 2.0));
        step(&mut spring, &mut bodies);
        let body = bodies.get(key).unwrap();
        let expected = -0.05 * 0.5 * body.mass().inv();
        assert_abs_diff_eq!(body.solver_velocity().linear.x, expected, epsilon = 1e-12);
        assert_eq!(body.corrected_pose().translation, Vec2::new(2.5, 0.0));
    }

    #[test]
    fn axle_pulls_equal_bodies_together_evenly() {
        let mut bodies = BodySet::new();
        let a = ball(&mut bodies, Vec2::zero(), MassSpec::Density(1.0));
        let b = ball(&mut bodies, Vec2::new(1.5, 0.0), MassSpec::Density(1.0));
        let mut axle = ConstraintBuilder::new(a)
            .with_target(b)
            .with_origin(Vec2::new(0.5, 0.0))
            .with_target_origin(Vec2::new(-0.5, 0.0))
            .build_axle();
        step(&mut axle, &mut bodies);
        assert_abs_diff_eq!(axle.distance(), 0.5, epsilon = 1e-12);
        let [wa, wb] = axle.world_anchors();
        assert_abs_diff_eq!(wa.x, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(wb.x, 1.0, epsilon = 1e-12);
        let (pa, pb) = (
            bodies.get(a).unwrap().corrected_pose().translation,
            bodies.get(b).unwrap().corrected_pose().translation,
        );
        assert_abs_diff_eq!(pa.x, 0.1, epsilon = 1e-9);
        assert_abs_diff_eq!(pb.x, 1.4, epsilon = 1e-9);

        // corrected anchors are closer than before
        axle.prepare(&bodies, true);
        assert_abs_diff_eq!(axle.distance(), 0.3, epsilon = 1e-9);
    }

    #[test]
    fn collision_filter_works_in_either_order() {
        let mut bodies = BodySet::new();
        let a = ball(&mut bodies, Vec2::zero(), MassSpec::Density(1.0));
        let b = ball(&mut bodies, Vec2::new(1.0, 0.0), MassSpec::Density(1.0));
        let c = ball(&mut bodies, Vec2::new(2.0, 0.0), MassSpec::Density(1.0));

        let mut link = ConstraintBuilder::new(a).with_target(b).build_distance(0.0, 1.0);
        assert!(link.disables_collision_between(a, b));
        assert!(link.disables_collision_between(b, a));
        assert!(!link.disables_collision_between(a, c));

        link.enabled = false;
        assert!(!link.disables_collision_between(a, b));

        let colliding = ConstraintBuilder::new(a).with_target(b).with_collision().build_axle();
        assert!(!colliding.disables_collision_between(a, b));
        itertools::assert_equal(colliding.bodies(), [a, b]);
    }
}
