use super::{impl_primitive, Derived, Frame};
use crate::math::{self as m, Pose, Unit, Vec2};
use crate::physics::collision::{geometry::Segment, AABB};

use std::f64::consts::TAU;

/// Vertex data shared by every polygonal shape.
///
/// Local vertices are always stored in counterclockwise order.
/// World vertices and separating axis candidates are rebuilt together with them.
#[derive(Clone, Debug, Default)]
pub struct PolygonCore {
    local: Vec<Vec2>,
    global: Vec<Vec2>,
    axes: Vec<Unit<Vec2>>,
}

impl PolygonCore {
    /// Vertices in shape-local space, counterclockwise.
    #[inline]
    pub fn local_vertices(&self) -> &[Vec2] {
        &self.local
    }

    /// Vertices in world space, counterclockwise.
    #[inline]
    pub fn vertices(&self) -> &[Vec2] {
        &self.global
    }

    /// Unit normals of the edges with parallel duplicates removed.
    #[inline]
    pub fn axes(&self) -> &[Unit<Vec2>] {
        &self.axes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.global.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.global.is_empty()
    }

    /// World-space vertex `i`, wrapping around at both ends.
    #[inline]
    pub fn vertex(&self, i: isize) -> Vec2 {
        let n = self.global.len() as isize;
        self.global[i.rem_euclid(n) as usize]
    }

    /// The world-space edge from vertex `i` to vertex `i + 1`.
    #[inline]
    pub fn edge(&self, i: usize) -> Segment {
        Segment::new(self.vertex(i as isize), self.vertex(i as isize + 1))
    }

    /// Every world-space edge in order.
    pub fn edges(&self) -> impl Iterator<Item = Segment> + '_ {
        (0..self.global.len()).map(move |i| self.edge(i))
    }

    /// Replace the local vertices with `vertices`, reversing them if they are clockwise.
    fn set_local_normalized(&mut self, vertices: &[Vec2]) {
        self.local.clear();
        if is_clockwise(vertices) {
            self.local.extend(vertices.iter().rev());
        } else {
            self.local.extend_from_slice(vertices);
        }
    }

    /// Bring world vertices, axes and derived values up to date with `pose`.
    fn update(&mut self, pose: &Pose) -> Derived {
        self.global.clear();
        self.global.extend(self.local.iter().map(|v| *pose * *v));

        self.axes.clear();
        for i in 0..self.global.len() {
            let axis = Unit::new_normalize(m::left_normal(self.edge(i).edge()));
            if !self.axes.iter().any(|a| m::approx_zero(m::cross(**a, *axis))) {
                self.axes.push(axis);
            }
        }

        let center = if self.global.is_empty() {
            pose.translation
        } else {
            self.global.iter().copied().sum::<Vec2>() / self.global.len() as f64
        };

        let mut double_area = 0.0;
        let mut com_sum = Vec2::zero();
        for seg in self.edges() {
            let c = m::cross(seg.a, seg.b);
            double_area += c;
            com_sum += (seg.a + seg.b) * c;
        }
        let center_of_mass = if m::approx_zero(double_area) {
            center
        } else {
            com_sum / (3.0 * double_area)
        };

        Derived {
            area: (double_area / 2.0).abs(),
            inertia_factor: second_moment_of_area(&self.local),
            aabb: AABB::around_points(self.global.iter().copied()),
            center,
            center_of_mass,
        }
    }
}

/// Shoelace winding test. Collinear or empty input counts as counterclockwise.
fn is_clockwise(vertices: &[Vec2]) -> bool {
    let n = vertices.len();
    let sum: f64 = (0..n)
        .map(|i| {
            let (curr, next) = (vertices[i], vertices[(i + 1) % n]);
            (next.x - curr.x) * (next.y + curr.y)
        })
        .sum();
    sum > 0.0
}

/// Polar second moment of area about the local origin.
fn second_moment_of_area(local: &[Vec2]) -> f64 {
    let n = local.len();
    let (mut ix, mut iy) = (0.0, 0.0);
    for i in 0..n {
        let (curr, next) = (local[i], local[(i + 1) % n]);
        let a = m::cross(curr, next);
        ix += (curr.y * curr.y + curr.y * next.y + next.y * next.y) * a;
        iy += (curr.x * curr.x + curr.x * next.x + next.x * next.x) * a;
    }
    (ix + iy).abs() / 12.0
}

//
// RECT
//

/// An axis-aligned box in shape-local space.
#[derive(Clone, Debug)]
pub struct Rect {
    frame: Frame,
    width: f64,
    height: f64,
    core: PolygonCore,
    derived: Derived,
}
impl_primitive!(Rect);

impl Rect {
    pub fn new(width: f64, height: f64) -> Self {
        let mut rect = Self {
            frame: Frame::default(),
            width,
            height,
            core: PolygonCore::default(),
            derived: Derived::unbounded(Vec2::zero()),
        };
        rect.recompute();
        rect
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.recompute();
    }

    #[inline]
    pub fn core(&self) -> &PolygonCore {
        &self.core
    }

    fn recompute(&mut self) {
        self.frame.update();
        let (hw, hh) = (self.width / 2.0, self.height / 2.0);
        self.core.set_local_normalized(&[
            Vec2::new(-hw, -hh),
            Vec2::new(hw, -hh),
            Vec2::new(hw, hh),
            Vec2::new(-hw, hh),
        ]);
        self.derived = self.core.update(&self.frame.pose);
        self.derived.area = self.width * self.height;
        self.derived.center = self.frame.position();
    }
}

//
// REGULAR POLYGON
//

/// A polygon with `sides` equal sides and vertices at distance `radius` from its origin.
#[derive(Clone, Debug)]
pub struct RegularPolygon {
    frame: Frame,
    radius: f64,
    sides: usize,
    core: PolygonCore,
    derived: Derived,
}
impl_primitive!(RegularPolygon);

impl RegularPolygon {
    /// Anything below three sides is bumped up to a triangle.
    pub fn new(radius: f64, sides: usize) -> Self {
        let mut poly = Self {
            frame: Frame::default(),
            radius,
            sides: sides.max(3),
            core: PolygonCore::default(),
            derived: Derived::unbounded(Vec2::zero()),
        };
        poly.recompute();
        poly
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[inline]
    pub fn sides(&self) -> usize {
        self.sides
    }

    pub fn set_radius(&mut self, radius: f64) {
        self.radius = radius;
        self.recompute();
    }

    pub fn set_sides(&mut self, sides: usize) {
        self.sides = sides.max(3);
        self.recompute();
    }

    #[inline]
    pub fn core(&self) -> &PolygonCore {
        &self.core
    }

    fn recompute(&mut self) {
        self.frame.update();
        let n = self.sides as f64;
        let vertices: Vec<Vec2> = (0..self.sides)
            .map(|i| {
                let angle = i as f64 / n * TAU;
                Vec2::new(angle.cos(), angle.sin()) * self.radius
            })
            .collect();
        self.core.set_local_normalized(&vertices);
        self.derived = self.core.update(&self.frame.pose);
        self.derived.area = self.radius * self.radius * n * (TAU / n).sin() / 2.0;
        self.derived.center = self.frame.position();
        self.derived.center_of_mass = self.frame.position();
    }
}

//
// FREE POLYGON
//

/// A convex polygon made of arbitrary vertices.
///
/// Vertices can be given in either winding order. Editing operations index into
/// the vertex list as given; the stored counterclockwise copy is rebuilt after each edit.
#[derive(Clone, Debug)]
pub struct Polygon {
    frame: Frame,
    input: Vec<Vec2>,
    core: PolygonCore,
    derived: Derived,
}
impl_primitive!(Polygon);

impl Polygon {
    pub fn new(vertices: Vec<Vec2>) -> Self {
        let mut poly = Self {
            frame: Frame::default(),
            input: vertices,
            core: PolygonCore::default(),
            derived: Derived::unbounded(Vec2::zero()),
        };
        poly.recompute();
        poly
    }

    /// The vertices in the order they were given.
    #[inline]
    pub fn input_vertices(&self) -> &[Vec2] {
        &self.input
    }

    /// Vertex `i` in the order it was given.
    ///
    /// # Panics
    /// If `i` is out of bounds.
    #[inline]
    pub fn vertex(&self, i: usize) -> Vec2 {
        self.input[i]
    }

    pub fn push(&mut self, vertex: Vec2) {
        self.input.push(vertex);
        self.recompute();
    }

    /// # Panics
    /// If `index > len`.
    pub fn insert(&mut self, index: usize, vertex: Vec2) {
        self.input.insert(index, vertex);
        self.recompute();
    }

    /// # Panics
    /// If `index` is out of bounds.
    pub fn set(&mut self, index: usize, vertex: Vec2) {
        self.input[index] = vertex;
        self.recompute();
    }

    /// # Panics
    /// If `index` is out of bounds.
    pub fn remove(&mut self, index: usize) -> Vec2 {
        let removed = self.input.remove(index);
        self.recompute();
        removed
    }

    pub fn set_vertices(&mut self, vertices: Vec<Vec2>) {
        self.input = vertices;
        self.recompute();
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.recompute();
    }

    #[inline]
    pub fn core(&self) -> &PolygonCore {
        &self.core
    }

    fn recompute(&mut self) {
        self.frame.update();
        self.core.set_local_normalized(&self.input);
        self.derived = self.core.update(&self.frame.pose);
    }
}
