use crate::math::{Unit, Vec2};

/// Matching world-space points on the surfaces of two touching shapes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointPair {
    /// Point on the surface of shape A.
    pub a: Vec2,
    /// Point on the surface of shape B.
    pub b: Vec2,
}

impl PointPair {
    #[inline]
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self { a, b }
    }

    #[inline]
    pub fn swapped(self) -> Self {
        Self {
            a: self.b,
            b: self.a,
        }
    }
}

/// 0-2 points of contact can occur between two 2D objects.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ContactPoints {
    Zero,
    One(PointPair),
    Two(PointPair, PointPair),
}

impl ContactPoints {
    pub fn iter(&self) -> ContactIterator<'_> {
        ContactIterator { cp: self, idx: 0 }
    }

    /// Execute a function on every pair of points.
    pub fn map(self, f: impl Fn(PointPair) -> PointPair) -> Self {
        match self {
            ContactPoints::Zero => ContactPoints::Zero,
            ContactPoints::One(p) => ContactPoints::One(f(p)),
            ContactPoints::Two(p1, p2) => ContactPoints::Two(f(p1), f(p2)),
        }
    }

    /// Append a pair. A third pair is dropped.
    pub fn push(self, pair: PointPair) -> Self {
        match self {
            ContactPoints::Zero => ContactPoints::One(pair),
            ContactPoints::One(p) => ContactPoints::Two(p, pair),
            two @ ContactPoints::Two(..) => two,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ContactPoints::Zero => 0,
            ContactPoints::One(_) => 1,
            ContactPoints::Two(..) => 2,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, ContactPoints::Zero)
    }
}

/// An iterator over the point pairs in a [`ContactPoints`].
pub struct ContactIterator<'a> {
    cp: &'a ContactPoints,
    idx: u8,
}
impl<'a> Iterator for ContactIterator<'a> {
    type Item = &'a PointPair;

    fn next(&mut self) -> Option<Self::Item> {
        self.idx += 1;
        use ContactPoints::*;
        match (self.cp, self.idx - 1) {
            (Zero, _) => None,
            (One(p), 0) => Some(p),
            (One(_), _) => None,
            (Two(p1, _), 0) => Some(p1),
            (Two(_, p2), 1) => Some(p2),
            (Two(_, _), _) => None,
        }
    }
}

/// The contact between two overlapping shapes A and B.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Manifold {
    /// The direction A has to move in to separate from B.
    pub normal: Unit<Vec2>,
    /// How far A has to move along the normal to separate. Never negative.
    pub depth: f64,
    pub points: ContactPoints,
}

impl Manifold {
    /// The same contact seen from B's side.
    pub fn invert(self) -> Self {
        Self {
            normal: -self.normal,
            depth: self.depth,
            points: self.points.map(PointPair::swapped),
        }
    }

    pub fn points_a(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.points.iter().map(|p| p.a)
    }

    pub fn points_b(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.points.iter().map(|p| p.b)
    }

    /// Mean of every contact point on both shapes.
    pub fn center(&self) -> Vec2 {
        let count = self.points.len();
        if count == 0 {
            return Vec2::zero();
        }
        let sum: Vec2 = self.points.iter().map(|p| p.a + p.b).sum();
        sum / (2 * count) as f64
    }
}
