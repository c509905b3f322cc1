use super::Body;

use thunderdome as td;

/// Key type to look up a body stored in the physics world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BodyKey(pub(super) td::Index);

impl BodyKey {
    /// Get the underlying [`thunderdome::Index`][thunderdome::Index] of this key.
    /// Useful for creating your own mappings from bodies to other things.
    #[inline]
    pub fn index(&self) -> td::Index {
        self.0
    }
}

/// Storage for the bodies of a physics world.
#[derive(Clone, Debug, Default)]
pub struct BodySet {
    pub(super) bodies: td::Arena<Body>,
}

impl BodySet {
    #[inline]
    pub(super) fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn insert(&mut self, body: Body) -> BodyKey {
        BodyKey(self.bodies.insert(body))
    }

    /// Access a [`Body`][super::Body] in the physics world, if it still exists.
    #[inline]
    pub fn get(&self, key: BodyKey) -> Option<&Body> {
        self.bodies.get(key.0)
    }

    /// Mutably access a [`Body`][super::Body] in the physics world, if it still exists.
    #[inline]
    pub fn get_mut(&mut self, key: BodyKey) -> Option<&mut Body> {
        self.bodies.get_mut(key.0)
    }

    /// Remove a body, returning it if it still existed.
    ///
    /// Constraints attached to this body will be automatically removed
    /// at the next physics tick.
    #[inline]
    pub fn remove(&mut self, key: BodyKey) -> Option<Body> {
        self.bodies.remove(key.0)
    }

    #[inline]
    pub fn contains(&self, key: BodyKey) -> bool {
        self.bodies.contains(key.0)
    }

    /// Iterate over bodies in storage order.
    pub fn iter(&self) -> impl Iterator<Item = (BodyKey, &Body)> {
        self.bodies.iter().map(|(k, b)| (BodyKey(k), b))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (BodyKey, &mut Body)> {
        self.bodies.iter_mut().map(|(k, b)| (BodyKey(k), b))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Two different bodies at once. `None` if either is missing or they're the same body.
    pub(super) fn pair_mut(&mut self, a: BodyKey, b: BodyKey) -> Option<(&mut Body, &mut Body)> {
        if a == b {
            return None;
        }
        match self.bodies.get2_mut(a.0, b.0) {
            (Some(a), Some(b)) => Some((a, b)),
            _ => None,
        }
    }

    /// Like [`pair_mut`][Self::pair_mut], but either end can be absent.
    /// If both keys are the same body, only the first is returned.
    pub(super) fn optional_pair_mut(
        &mut self,
        a: Option<BodyKey>,
        b: Option<BodyKey>,
    ) -> (Option<&mut Body>, Option<&mut Body>) {
        match (a, b) {
            (Some(a), Some(b)) if a != b => self.bodies.get2_mut(a.0, b.0),
            (Some(a), _) => (self.bodies.get_mut(a.0), None),
            (None, Some(b)) => (None, self.bodies.get_mut(b.0)),
            (None, None) => (None, None),
        }
    }

    // not exposed to users, must use through PhysicsWorld::clear
    pub(super) fn clear(&mut self) {
        self.bodies.clear();
    }
}
