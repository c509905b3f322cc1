use crate::math::Vec2;

/// Axis-aligned bounding box.
///
/// Unbounded shapes use infinite extents, which still compare correctly
/// in the overlap test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AABB {
    pub min: Vec2,
    pub max: Vec2,
}

impl AABB {
    pub fn zero() -> Self {
        Self {
            min: Vec2::zero(),
            max: Vec2::zero(),
        }
    }

    /// The box that covers the whole plane.
    pub fn infinite() -> Self {
        Self {
            min: Vec2::broadcast(f64::NEG_INFINITY),
            max: Vec2::broadcast(f64::INFINITY),
        }
    }

    /// The smallest box containing every given point.
    /// Returns a zero box at the origin for an empty iterator.
    pub fn around_points(points: impl IntoIterator<Item = Vec2>) -> Self {
        let mut points = points.into_iter();
        let first = match points.next() {
            Some(p) => p,
            None => return Self::zero(),
        };
        points.fold(
            Self {
                min: first,
                max: first,
            },
            |acc, p| Self {
                min: acc.min.min_by_component(p),
                max: acc.max.max_by_component(p),
            },
        )
    }

    /// Check whether two boxes overlap. Touching edges count as overlap.
    #[inline]
    pub fn overlaps(&self, other: &AABB) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// The region where two boxes overlap, if any.
    pub fn intersection(&self, other: &AABB) -> Option<AABB> {
        if !self.overlaps(other) {
            return None;
        }
        Some(AABB {
            min: self.min.max_by_component(other.min),
            max: self.max.min_by_component(other.max),
        })
    }

    /// The smallest box containing both boxes.
    pub fn union(&self, other: &AABB) -> AABB {
        AABB {
            min: self.min.min_by_component(other.min),
            max: self.max.max_by_component(other.max),
        }
    }

    /// Grow the box by `amount` in every direction.
    pub fn padded(&self, amount: f64) -> AABB {
        AABB {
            min: self.min - Vec2::broadcast(amount),
            max: self.max + Vec2::broadcast(amount),
        }
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }
}
