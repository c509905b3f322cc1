use super::{body_set::BodySet, Constraint};

use thunderdome as td;

/// Key type to look up a constraint stored in the physics world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConstraintKey(pub(super) td::Index);

/// Manager struct holding constraints inside of a physics world.
#[derive(Clone, Debug, Default)]
pub struct ConstraintSet {
    pub(super) constraints: td::Arena<Constraint>,
}

impl ConstraintSet {
    #[inline]
    pub(super) fn new() -> Self {
        Self::default()
    }

    /// Add a constraint to the set. Returns a key that can be used to remove it later.
    #[inline]
    pub(super) fn insert(&mut self, constraint: Constraint) -> ConstraintKey {
        ConstraintKey(self.constraints.insert(constraint))
    }

    /// Access a Constraint in the physics world, if it still exists.
    #[inline]
    pub fn get(&self, key: ConstraintKey) -> Option<&Constraint> {
        self.constraints.get(key.0)
    }

    /// Mutably access a Constraint in the physics world, if it still exists.
    #[inline]
    pub fn get_mut(&mut self, key: ConstraintKey) -> Option<&mut Constraint> {
        self.constraints.get_mut(key.0)
    }

    /// Remove a constraint from the physics world, returning it if it still existed.
    ///
    /// Constraints can also disappear on their own if the bodies they're attached to
    /// are removed, so it's not guaranteed the constraint will exist
    /// even if it hasn't been explicitly removed before.
    #[inline]
    pub fn remove(&mut self, key: ConstraintKey) -> Option<Constraint> {
        self.constraints.remove(key.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ConstraintKey, &Constraint)> {
        self.constraints.iter().map(|(k, c)| (ConstraintKey(k), c))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.constraints.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.constraints.is_empty()
    }

    pub(super) fn enabled_mut(&mut self) -> impl Iterator<Item = &mut Constraint> {
        self.constraints
            .iter_mut()
            .map(|(_, c)| c)
            .filter(|c| c.enabled)
    }

    pub(super) fn enabled(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().map(|(_, c)| c).filter(|c| c.enabled)
    }

    /// Drop constraints attached to bodies that no longer exist.
    pub(super) fn remove_orphans(&mut self, bodies: &BodySet) {
        self.constraints.retain(|key, constraint| {
            let alive = constraint.bodies().all(|body| bodies.contains(body));
            if !alive {
                log::warn!(
                    "Removed constraint {:?} because its body no longer exists",
                    key.slot()
                );
            }
            alive
        });
    }

    #[inline]
    pub(super) fn clear(&mut self) {
        self.constraints.clear();
    }
}
