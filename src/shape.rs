use std::ops::Index;

use log::trace;

use crate::consts::{ EPSILON, GLASS_RI };
use crate::geometry::{ Bounds, TriangleInfo };
use crate::intersect::{ Intersection, Intersections };
use crate::light::Material;
use crate::matrix::{ Matrix4D, NotInvertibleError };
use crate::ray::Ray4D;
use crate::stats::Statistics;
use crate::tuple::Tuple4D;

/// A handle to a shape stored in a `ShapeArena`.
///
/// Ids are only meaningful for the arena that issued them.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ShapeId(usize);

#[derive(Clone, Debug, PartialEq)]
pub enum ShapeType {
    /// A unit sphere centered at the object-space origin.
    Sphere,

    /// The XZ plane, stretching indefinitely.
    Plane,

    /// An axis-aligned cube spanning -1 to 1 on every axis.
    Cube,

    /// A unit-radius cylinder around the Y axis. Minimum Y, maximum Y (both
    /// exclusive) and whether the ends are capped.
    Cylinder(f64, f64, bool),

    /// A double-napped cone around the Y axis, with its radius equal to `|y|`.
    /// Minimum Y, maximum Y and whether the ends are capped.
    Cone(f64, f64, bool),

    /// A flat triangle. See `TriangleInfo`.
    Triangle(TriangleInfo),

    /// A composite of other shapes, referenced by id. Groups have no surface
    /// of their own.
    Group(Vec<ShapeId>),
}

/// A shape: geometry, material and placement in its parent's space.
///
/// Shapes are built standalone, then handed to a `ShapeArena`. Once a shape is
/// in an arena, its transform and hierarchy are changed through the arena so
/// that cached group bounds stay correct.
#[derive(Clone, Debug)]
pub struct Shape {
    pub material: Material,

    /// Whether this shape can block light from reaching other surfaces.
    pub casts_shadow: bool,

    ty: ShapeType,
    transform: Matrix4D,
    inverse: Matrix4D,
    parent: Option<ShapeId>,
    bounds: Bounds,
}

impl Shape {
    fn new(ty: ShapeType) -> Shape {
        let bounds = Self::primitive_bounds(&ty);

        Shape {
            material: Material::default(),
            casts_shadow: true,
            ty,
            transform: Matrix4D::identity(),
            inverse: Matrix4D::identity(),
            parent: None,
            bounds,
        }
    }

    pub fn sphere() -> Shape {
        Shape::new(ShapeType::Sphere)
    }

    /// A sphere made of glass: fully transparent, refractive index 1.5.
    pub fn glass_sphere() -> Shape {
        let mut s = Shape::sphere();
        s.material.transparency = 1.0;
        s.material.refractive_index = GLASS_RI;

        s
    }

    pub fn plane() -> Shape {
        Shape::new(ShapeType::Plane)
    }

    pub fn cube() -> Shape {
        Shape::new(ShapeType::Cube)
    }

    /// An infinitely long, open cylinder.
    pub fn cylinder() -> Shape {
        Shape::bounded_cylinder(f64::NEG_INFINITY, f64::INFINITY)
    }

    /// An open cylinder truncated between two Y values, in either order.
    pub fn bounded_cylinder(minimum: f64, maximum: f64) -> Shape {
        let (minimum, maximum) = ordered(minimum, maximum);
        Shape::new(ShapeType::Cylinder(minimum, maximum, false))
    }

    /// A cylinder truncated between two Y values and closed at both ends.
    pub fn capped_cylinder(minimum: f64, maximum: f64) -> Shape {
        let (minimum, maximum) = ordered(minimum, maximum);
        Shape::new(ShapeType::Cylinder(minimum, maximum, true))
    }

    /// An infinite, open double cone.
    pub fn cone() -> Shape {
        Shape::bounded_cone(f64::NEG_INFINITY, f64::INFINITY)
    }

    pub fn bounded_cone(minimum: f64, maximum: f64) -> Shape {
        let (minimum, maximum) = ordered(minimum, maximum);
        Shape::new(ShapeType::Cone(minimum, maximum, false))
    }

    pub fn capped_cone(minimum: f64, maximum: f64) -> Shape {
        let (minimum, maximum) = ordered(minimum, maximum);
        Shape::new(ShapeType::Cone(minimum, maximum, true))
    }

    pub fn triangle(p1: Tuple4D, p2: Tuple4D, p3: Tuple4D) -> Shape {
        Shape::new(ShapeType::Triangle(TriangleInfo::new(p1, p2, p3)))
    }

    /// An empty group.
    pub fn group() -> Shape {
        Shape::new(ShapeType::Group(Vec::new()))
    }

    pub fn ty(&self) -> &ShapeType {
        &self.ty
    }

    pub fn is_group(&self) -> bool {
        matches!(self.ty, ShapeType::Group(_))
    }

    pub fn children(&self) -> Option<&[ShapeId]> {
        match self.ty {
            ShapeType::Group(ref children) => Some(children),
            _ => None,
        }
    }

    pub fn triangle_info(&self) -> Option<&TriangleInfo> {
        match self.ty {
            ShapeType::Triangle(ref ti) => Some(ti),
            _ => None,
        }
    }

    pub fn parent(&self) -> Option<ShapeId> {
        self.parent
    }

    pub fn transform(&self) -> &Matrix4D {
        &self.transform
    }

    pub fn inverse(&self) -> &Matrix4D {
        &self.inverse
    }

    /// Sets the object-to-parent transform, caching its inverse.
    ///
    /// Non-invertible transforms are rejected and leave the shape unchanged.
    /// For a shape already inside a group, use `ShapeArena::set_transform` so
    /// the group's bounds follow.
    pub fn set_transform(&mut self, transform: Matrix4D)
        -> Result<(), NotInvertibleError> {
        self.inverse = transform.inverse()?;
        self.transform = transform;

        Ok(())
    }

    pub fn with_transform(mut self, transform: Matrix4D)
        -> Result<Shape, NotInvertibleError> {
        self.set_transform(transform)?;
        Ok(self)
    }

    pub fn with_material(mut self, material: Material) -> Shape {
        self.material = material;
        self
    }

    /// The bounding box in object space.
    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    /// The bounding box in the space of this shape's parent.
    pub fn parent_space_bounds(&self) -> Bounds {
        self.bounds.transform(&self.transform)
    }

    fn primitive_bounds(ty: &ShapeType) -> Bounds {
        match *ty {
            ShapeType::Sphere | ShapeType::Cube => {
                Bounds::new(-1.0, -1.0, -1.0, 1.0, 1.0, 1.0)
            },
            ShapeType::Plane => {
                let inf = f64::INFINITY;
                Bounds::new(-inf, 0.0, -inf, inf, 0.0, inf)
            },
            ShapeType::Cylinder(min, max, _) => {
                Bounds::new(-1.0, min, -1.0, 1.0, max, 1.0)
            },
            ShapeType::Cone(min, max, _) => {
                let r = min.abs().max(max.abs());
                Bounds::new(-r, min, -r, r, max, r)
            },
            ShapeType::Triangle(ref ti) => {
                Bounds::from_points(vec![ti.p1, ti.p2, ti.p3])
            },
            ShapeType::Group(_) => Bounds::empty(),
        }
    }

    /// Intersects a ray, already in object space, with a primitive.
    ///
    /// Groups are resolved by the arena, since only it can reach children.
    fn local_intersect(&self, id: ShapeId, ray: &Ray4D) -> Intersections {
        match self.ty {
            ShapeType::Sphere => intersect_sphere(id, ray),
            ShapeType::Plane => intersect_plane(id, ray),
            ShapeType::Cube => intersect_cube(id, ray),
            ShapeType::Cylinder(min, max, closed) => {
                intersect_cylinder(id, ray, min, max, closed)
            },
            ShapeType::Cone(min, max, closed) => {
                intersect_cone(id, ray, min, max, closed)
            },
            ShapeType::Triangle(ref ti) => intersect_triangle(id, ray, ti),
            ShapeType::Group(_) => unreachable!(
                "group intersections are resolved by the shape arena"
            ),
        }
    }

    /// The surface normal at an object-space point.
    ///
    /// # Panics
    ///
    /// Panics on groups, which have no surface.
    pub fn local_normal_at(&self, at: &Tuple4D) -> Tuple4D {
        match self.ty {
            ShapeType::Sphere => Tuple4D::vector(at.x, at.y, at.z),
            ShapeType::Plane => Tuple4D::vector(0.0, 1.0, 0.0),
            ShapeType::Cube => normal_at_cube(at),
            ShapeType::Cylinder(min, max, closed) => {
                let cap = if closed {
                    cap_normal(at, min, max, 1.0)
                } else {
                    None
                };

                cap.unwrap_or_else(|| Tuple4D::vector(at.x, 0.0, at.z))
            },
            ShapeType::Cone(min, max, closed) => {
                let cap = if closed {
                    cap_normal(at, min, max, at.y.abs())
                } else {
                    None
                };

                cap.unwrap_or_else(|| {
                    let mut y = (at.x.powi(2) + at.z.powi(2)).sqrt();

                    // the apex has no slope; use the axis
                    if y < EPSILON && at.y.abs() < EPSILON {
                        return Tuple4D::vector(0.0, 1.0, 0.0);
                    }

                    if at.y > 0.0 {
                        y = -y;
                    }

                    Tuple4D::vector(at.x, y, at.z)
                })
            },
            ShapeType::Triangle(ref ti) => ti.normal,
            ShapeType::Group(_) => panic!(
                "local normals should never be computed on groups"
            ),
        }
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b { (a, b) } else { (b, a) }
}

fn intersect_sphere(id: ShapeId, ray: &Ray4D) -> Intersections {
    // the sphere is centered at the object-space origin
    let sphere_to_ray = ray.origin - Tuple4D::origin();

    let a = ray.direction.dot(&ray.direction);
    let b = 2.0 * ray.direction.dot(&sphere_to_ray);
    let c = sphere_to_ray.dot(&sphere_to_ray) - 1.0;

    let discriminant = b.powi(2) - 4.0 * a * c;
    if discriminant < 0.0 {
        return Intersections::new();
    }

    let t1 = (-b - discriminant.sqrt()) / (2.0 * a);
    let t2 = (-b + discriminant.sqrt()) / (2.0 * a);

    vec![Intersection::new(t1, id), Intersection::new(t2, id)].into()
}

fn intersect_plane(id: ShapeId, ray: &Ray4D) -> Intersections {
    // a ray parallel to the plane never reaches it
    if ray.direction.y.abs() < EPSILON {
        return Intersections::new();
    }

    let t = -ray.origin.y / ray.direction.y;
    vec![Intersection::new(t, id)].into()
}

fn intersect_cube(id: ShapeId, ray: &Ray4D) -> Intersections {
    let (xtmin, xtmax)
        = Bounds::check_axis(-1.0, 1.0, ray.origin.x, ray.direction.x);
    let (ytmin, ytmax)
        = Bounds::check_axis(-1.0, 1.0, ray.origin.y, ray.direction.y);
    let (ztmin, ztmax)
        = Bounds::check_axis(-1.0, 1.0, ray.origin.z, ray.direction.z);

    let tmin = xtmin.max(ytmin).max(ztmin);
    let tmax = xtmax.min(ytmax).min(ztmax);

    if tmin > tmax {
        return Intersections::new();
    }

    vec![Intersection::new(tmin, id), Intersection::new(tmax, id)].into()
}

fn normal_at_cube(p: &Tuple4D) -> Tuple4D {
    let xa = p.x.abs();
    let ya = p.y.abs();
    let za = p.z.abs();

    let max_component = xa.max(ya).max(za);
    if max_component == xa {
        Tuple4D::vector(p.x, 0.0, 0.0)
    } else if max_component == ya {
        Tuple4D::vector(0.0, p.y, 0.0)
    } else {
        Tuple4D::vector(0.0, 0.0, p.z)
    }
}

/// Solves `a*t^2 + b*t + c = 0` for a cylinder or cone body, keeping roots
/// whose Y lies strictly between `minimum` and `maximum`.
fn push_body_roots(id: ShapeId, ray: &Ray4D, (a, b, c): (f64, f64, f64),
    minimum: f64, maximum: f64, is: &mut Intersections) {
    let disc = b.powi(2) - 4.0 * a * c;
    if disc < 0.0 {
        return;
    }

    let mut t0 = (-b - disc.sqrt()) / (2.0 * a);
    let mut t1 = (-b + disc.sqrt()) / (2.0 * a);
    if t0 > t1 {
        std::mem::swap(&mut t0, &mut t1);
    }

    for t in [t0, t1] {
        push_if_within(id, ray, t, minimum, maximum, is);
    }
}

fn push_if_within(id: ShapeId, ray: &Ray4D, t: f64, minimum: f64,
    maximum: f64, is: &mut Intersections) {
    let y = ray.origin.y + t * ray.direction.y;
    if minimum < y && y < maximum {
        is.intersections.push(Intersection::new(t, id));
    }
}

/// Intersects the end caps of a closed cylinder or cone. `radius` gives the
/// cap radius at a given Y.
fn push_caps<F: Fn(f64) -> f64>(id: ShapeId, ray: &Ray4D, minimum: f64,
    maximum: f64, closed: bool, radius: F, is: &mut Intersections) {
    // open ends, or a ray that never changes height, can't hit a cap
    if !closed || ray.direction.y.abs() < EPSILON {
        return;
    }

    for y in [minimum, maximum] {
        let t = (y - ray.origin.y) / ray.direction.y;
        if t.is_finite() && check_cap(ray, t, radius(y)) {
            is.intersections.push(Intersection::new(t, id));
        }
    }
}

/// Checks that the ray at `t` is within `radius` of the Y axis. The rim
/// belongs to the cap.
fn check_cap(ray: &Ray4D, t: f64, radius: f64) -> bool {
    let x = ray.origin.x + t * ray.direction.x;
    let z = ray.origin.z + t * ray.direction.z;

    x.powi(2) + z.powi(2) <= radius.powi(2) + EPSILON
}

/// The normal of a cap, if `at` lies on one within `radius` of the Y axis.
fn cap_normal(at: &Tuple4D, minimum: f64, maximum: f64, radius: f64)
    -> Option<Tuple4D> {
    let dist = at.x.powi(2) + at.z.powi(2);
    if dist >= radius.powi(2) {
        return None;
    }

    if at.y >= maximum - EPSILON {
        Some(Tuple4D::vector(0.0, 1.0, 0.0))
    } else if at.y <= minimum + EPSILON {
        Some(Tuple4D::vector(0.0, -1.0, 0.0))
    } else {
        None
    }
}

fn intersect_cylinder(id: ShapeId, ray: &Ray4D, minimum: f64, maximum: f64,
    closed: bool) -> Intersections {
    let mut is = Intersections::new();
    let a = ray.direction.x.powi(2) + ray.direction.z.powi(2);

    // parallel to the Y axis, only the caps can be hit
    if a.abs() >= EPSILON {
        let b = 2.0 * ray.origin.x * ray.direction.x
              + 2.0 * ray.origin.z * ray.direction.z;
        let c = ray.origin.x.powi(2) + ray.origin.z.powi(2) - 1.0;

        push_body_roots(id, ray, (a, b, c), minimum, maximum, &mut is);
    }

    push_caps(id, ray, minimum, maximum, closed, |_| 1.0, &mut is);
    is
}

fn intersect_cone(id: ShapeId, ray: &Ray4D, minimum: f64, maximum: f64,
    closed: bool) -> Intersections {
    let mut is = Intersections::new();
    let (o, d) = (ray.origin, ray.direction);

    let a = d.x.powi(2) - d.y.powi(2) + d.z.powi(2);
    let b = 2.0 * o.x * d.x - 2.0 * o.y * d.y + 2.0 * o.z * d.z;
    let c = o.x.powi(2) - o.y.powi(2) + o.z.powi(2);

    if a.abs() >= EPSILON {
        push_body_roots(id, ray, (a, b, c), minimum, maximum, &mut is);
    } else if b.abs() >= EPSILON {
        // parallel to one half of the cone: a single body hit
        push_if_within(id, ray, -c / (2.0 * b), minimum, maximum, &mut is);
    }

    push_caps(id, ray, minimum, maximum, closed, f64::abs, &mut is);
    is
}

/// Möller–Trumbore intersection.
fn intersect_triangle(id: ShapeId, ray: &Ray4D, ti: &TriangleInfo)
    -> Intersections {
    let dir_cross_e2 = ray.direction.cross(&ti.e2);
    let determinant = ti.e1.dot(&dir_cross_e2);

    // parallel to the triangle's plane
    if determinant.abs() < EPSILON {
        return Intersections::new();
    }

    let f = 1.0 / determinant;
    let p1_to_origin = ray.origin - ti.p1;
    let u = f * p1_to_origin.dot(&dir_cross_e2);
    if !(0.0..=1.0).contains(&u) {
        return Intersections::new();
    }

    let origin_cross_e1 = p1_to_origin.cross(&ti.e1);
    let v = f * ray.direction.dot(&origin_cross_e1);
    if v < 0.0 || u + v > 1.0 {
        return Intersections::new();
    }

    let t = f * ti.e2.dot(&origin_cross_e1);
    vec![Intersection::new(t, id)].into()
}

/// Owner of every shape in a scene.
///
/// Groups refer to their children, and children to their parent, by
/// `ShapeId`. The arena keeps each group's cached bounds current as children
/// are attached, detached and re-transformed.
///
/// # Examples
///
/// ```
/// use whitted::matrix::Matrix4D;
/// use whitted::ray::Ray4D;
/// use whitted::shape::{ Shape, ShapeArena };
/// use whitted::tuple::Tuple4D;
///
/// let mut shapes = ShapeArena::new();
/// let group = shapes.add(Shape::group());
/// let sphere = shapes.add(Shape::sphere());
/// shapes.add_child(group, sphere);
/// shapes.set_transform(group, Matrix4D::translation(0.0, 0.0, 5.0)).unwrap();
///
/// let r = Ray4D::new(Tuple4D::origin(), Tuple4D::vector(0.0, 0.0, 1.0));
/// let xs = shapes.intersect(group, &r);
/// assert_eq!(xs.intersections.len(), 2);
/// assert_eq!(xs.intersections[0].what, sphere);
/// assert!(whitted::feq(xs.intersections[0].t, 4.0));
/// ```
#[derive(Debug, Default)]
pub struct ShapeArena {
    shapes: Vec<Shape>,
    stats: Statistics,
}

impl Index<ShapeId> for ShapeArena {
    type Output = Shape;

    fn index(&self, id: ShapeId) -> &Shape {
        &self.shapes[id.0]
    }
}

impl ShapeArena {
    pub fn new() -> ShapeArena {
        Default::default()
    }

    /// Takes ownership of a detached shape. Any parent it claims is ignored.
    pub fn add(&mut self, mut shape: Shape) -> ShapeId {
        let id = ShapeId(self.shapes.len());
        shape.parent = None;

        // groups enter empty; children are attached through `add_child`
        if let ShapeType::Group(ref mut children) = shape.ty {
            children.clear();
            shape.bounds = Bounds::empty();
        }

        self.shapes.push(shape);
        id
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(id.0)
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    pub fn material_mut(&mut self, id: ShapeId) -> &mut Material {
        &mut self.shapes[id.0].material
    }

    pub fn set_material(&mut self, id: ShapeId, material: Material) {
        self.shapes[id.0].material = material;
    }

    /// Sets whether a shape casts shadows. On a group the flag is applied to
    /// every current descendant, since shadow rays only report primitives.
    pub fn set_casts_shadow(&mut self, id: ShapeId, casts_shadow: bool) {
        let mut pending = vec![id];

        while let Some(next) = pending.pop() {
            let shape = &mut self.shapes[next.0];
            shape.casts_shadow = casts_shadow;

            if let Some(children) = shape.children() {
                pending.extend_from_slice(children);
            }
        }
    }

    /// Sets a shape's transform and refreshes the bounds of its ancestors.
    pub fn set_transform(&mut self, id: ShapeId, transform: Matrix4D)
        -> Result<(), NotInvertibleError> {
        self.shapes[id.0].set_transform(transform)?;

        if let Some(parent) = self[id].parent {
            self.refresh_bounds(parent);
        }

        Ok(())
    }

    /// Appends `child` to `group`, detaching it from any previous parent.
    ///
    /// # Panics
    ///
    /// Panics if `group` isn't a group, or if `child` is `group` itself or
    /// one of its ancestors.
    pub fn add_child(&mut self, group: ShapeId, child: ShapeId) {
        assert!(self[group].is_group(),
            "cannot add a child to non-group shape {:?}", group);
        assert!(!self.is_ancestor_or_self(child, group),
            "adding {:?} to {:?} would create a cycle", child, group);

        if let Some(old_parent) = self[child].parent {
            self.remove_child(old_parent, child);
        }

        if let ShapeType::Group(ref mut children) = self.shapes[group.0].ty {
            children.push(child);
        }
        self.shapes[child.0].parent = Some(group);
        trace!("attached {:?} to group {:?}", child, group);

        self.refresh_bounds(group);
    }

    /// Detaches `child` from `group`. Returns whether it was a child.
    pub fn remove_child(&mut self, group: ShapeId, child: ShapeId) -> bool {
        let removed = match self.shapes[group.0].ty {
            ShapeType::Group(ref mut children) => {
                let before = children.len();
                children.retain(|c| *c != child);
                children.len() != before
            },
            _ => false,
        };

        if removed {
            self.shapes[child.0].parent = None;
            self.refresh_bounds(group);
        }

        removed
    }

    /// Whether `ancestor` is `id` or any group above it.
    pub fn is_ancestor_or_self(&self, ancestor: ShapeId, id: ShapeId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self[c].parent;
        }

        false
    }

    /// Recomputes the cached bounds of `group` and every group above it.
    fn refresh_bounds(&mut self, group: ShapeId) {
        let mut current = Some(group);

        while let Some(g) = current {
            let mut bounds = Bounds::empty();
            for child in self[g].children().unwrap_or(&[]) {
                bounds.merge(&self[*child].parent_space_bounds());
            }

            self.shapes[g.0].bounds = bounds;
            current = self[g].parent;
        }
    }

    pub fn bounds(&self, id: ShapeId) -> Bounds {
        self[id].bounds()
    }

    pub fn parent_space_bounds(&self, id: ShapeId) -> Bounds {
        self[id].parent_space_bounds()
    }

    /// Intersects a ray given in the space of the shape's parent (world space
    /// for top-level shapes).
    pub fn intersect(&self, id: ShapeId, ray: &Ray4D) -> Intersections {
        let local_ray = ray.transform(self[id].inverse());
        self.local_intersect(id, &local_ray)
    }

    /// Intersects a ray already in the shape's object space.
    ///
    /// A group tests its bounding box first and, on a miss, returns without
    /// visiting any child.
    pub fn local_intersect(&self, id: ShapeId, ray: &Ray4D) -> Intersections {
        let shape = &self[id];

        let children = match shape.ty {
            ShapeType::Group(ref children) => children,
            _ => {
                self.stats.record_primitive_test();
                return shape.local_intersect(id, ray);
            },
        };

        if children.is_empty() {
            return Intersections::new();
        }

        self.stats.record_bounds_test();
        if !shape.bounds.intersects(ray) {
            self.stats.record_bounds_culled();
            return Intersections::new();
        }

        Intersections::aggregate(
            children.iter().map(|child| self.intersect(*child, ray))
        )
    }

    /// Converts a world-space point into the object space of `id`, passing
    /// through every ancestor group, outermost first.
    pub fn world_to_object(&self, id: ShapeId, point: Tuple4D) -> Tuple4D {
        let shape = &self[id];
        let point = match shape.parent {
            Some(parent) => self.world_to_object(parent, point),
            None => point,
        };

        *shape.inverse() * point
    }

    /// Converts an object-space normal of `id` into world space, passing
    /// through every ancestor group, innermost first.
    pub fn normal_to_world(&self, id: ShapeId, normal: Tuple4D) -> Tuple4D {
        let shape = &self[id];

        let mut normal = shape.inverse().transposition() * normal;
        normal.w = 0.0;
        let normal = normal.normalize();

        match shape.parent {
            Some(parent) => self.normal_to_world(parent, normal),
            None => normal,
        }
    }

    /// The world-space surface normal of `id` at a world-space point.
    ///
    /// # Panics
    ///
    /// Panics if `id` is a group.
    pub fn normal_at(&self, id: ShapeId, world_point: Tuple4D) -> Tuple4D {
        let local_point = self.world_to_object(id, world_point);
        let local_normal = self[id].local_normal_at(&local_point);

        self.normal_to_world(id, local_normal)
    }
}

#[cfg(test)]
fn ts(xs: &Intersections) -> Vec<f64> {
    xs.intersections.iter().map(|i| i.t).collect()
}

#[cfg(test)]
fn assert_ts(xs: &Intersections, expected: &[f64]) {
    let actual = ts(xs);
    assert_eq!(actual.len(), expected.len(), "got {:?}", actual);
    for (a, e) in actual.iter().zip(expected.iter()) {
        assert!(crate::feq(*a, *e), "got {:?}, expected {:?}", actual, expected);
    }
}

#[cfg(test)]
fn ray(origin: (f64, f64, f64), direction: (f64, f64, f64)) -> Ray4D {
    Ray4D::new(
        Tuple4D::point(origin.0, origin.1, origin.2),
        Tuple4D::vector(direction.0, direction.1, direction.2),
    )
}

#[test]
fn ray_intersects_sphere() {
    let mut shapes = ShapeArena::new();
    let s = shapes.add(Shape::sphere());

    assert_ts(&shapes.intersect(s, &ray((0.0, 0.0, -5.0), (0.0, 0.0, 1.0))),
        &[4.0, 6.0]);
    assert_ts(&shapes.intersect(s, &ray((0.0, 1.0, -5.0), (0.0, 0.0, 1.0))),
        &[5.0, 5.0]);
    assert_ts(&shapes.intersect(s, &ray((0.0, 2.0, -5.0), (0.0, 0.0, 1.0))),
        &[]);
    assert_ts(&shapes.intersect(s, &ray((0.0, 0.0, 0.0), (0.0, 0.0, 1.0))),
        &[-1.0, 1.0]);
    assert_ts(&shapes.intersect(s, &ray((0.0, 0.0, 5.0), (0.0, 0.0, 1.0))),
        &[-6.0, -4.0]);
}

#[test]
fn intersect_sets_the_object() {
    let mut shapes = ShapeArena::new();
    let s = shapes.add(Shape::sphere());
    let xs = shapes.intersect(s, &ray((0.0, 0.0, -5.0), (0.0, 0.0, 1.0)));

    assert!(xs.intersections.iter().all(|i| i.what == s));
}

#[test]
fn intersecting_transformed_spheres() {
    let mut shapes = ShapeArena::new();
    let scaled = shapes.add(
        Shape::sphere().with_transform(Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap()
    );
    let translated = shapes.add(
        Shape::sphere()
            .with_transform(Matrix4D::translation(5.0, 0.0, 0.0))
            .unwrap()
    );
    let r = ray((0.0, 0.0, -5.0), (0.0, 0.0, 1.0));

    assert_ts(&shapes.intersect(scaled, &r), &[3.0, 7.0]);
    assert_ts(&shapes.intersect(translated, &r), &[]);
}

#[test]
fn singular_shape_transform_is_rejected() {
    let mut s = Shape::sphere();

    assert_eq!(s.set_transform(Matrix4D::scaling(0.0, 0.0, 0.0)),
        Err(NotInvertibleError));
    assert_eq!(*s.transform(), Matrix4D::identity());
}

#[test]
fn normals_on_a_sphere() {
    let mut shapes = ShapeArena::new();
    let s = shapes.add(Shape::sphere());
    let k = 3.0f64.sqrt() / 3.0;

    assert_eq!(shapes.normal_at(s, Tuple4D::point(1.0, 0.0, 0.0)),
        Tuple4D::vector(1.0, 0.0, 0.0));
    assert_eq!(shapes.normal_at(s, Tuple4D::point(0.0, 1.0, 0.0)),
        Tuple4D::vector(0.0, 1.0, 0.0));

    let n = shapes.normal_at(s, Tuple4D::point(k, k, k));
    assert_eq!(n, Tuple4D::vector(k, k, k));
    assert_eq!(n, n.normalize());
}

#[test]
fn normals_on_transformed_spheres() {
    let mut shapes = ShapeArena::new();
    let translated = shapes.add(
        Shape::sphere()
            .with_transform(Matrix4D::translation(0.0, 1.0, 0.0))
            .unwrap()
    );
    let transformed = shapes.add(
        Shape::sphere()
            .with_transform(
                Matrix4D::scaling(1.0, 0.5, 1.0)
                    * Matrix4D::rotation_z(std::f64::consts::PI / 5.0)
            )
            .unwrap()
    );
    let h = 2.0f64.sqrt() / 2.0;

    assert_eq!(
        shapes.normal_at(translated, Tuple4D::point(0.0, 1.0 + h, -h)),
        Tuple4D::vector(0.0, h, -h)
    );

    let n = shapes.normal_at(transformed, Tuple4D::point(0.0, h, -h));
    assert!((n - Tuple4D::vector(0.0, 0.97014, -0.24254)).magnitude() < 1e-4);
}

#[test]
fn plane_normal_is_constant() {
    let p = Shape::plane();

    for at in [
        Tuple4D::point(0.0, 0.0, 0.0),
        Tuple4D::point(10.0, 0.0, -10.0),
        Tuple4D::point(-5.0, 0.0, 150.0),
    ] {
        assert_eq!(p.local_normal_at(&at), Tuple4D::vector(0.0, 1.0, 0.0));
    }
}

#[test]
fn intersecting_planes() {
    let mut shapes = ShapeArena::new();
    let p = shapes.add(Shape::plane());

    // parallel and coplanar rays miss
    assert_ts(&shapes.intersect(p, &ray((0.0, 10.0, 0.0), (0.0, 0.0, 1.0))),
        &[]);
    assert_ts(&shapes.intersect(p, &ray((0.0, 0.0, 0.0), (0.0, 0.0, 1.0))),
        &[]);

    assert_ts(&shapes.intersect(p, &ray((0.0, 1.0, 0.0), (0.0, -1.0, 0.0))),
        &[1.0]);
    assert_ts(&shapes.intersect(p, &ray((0.0, -1.0, 0.0), (0.0, 1.0, 0.0))),
        &[1.0]);
}

#[test]
fn rays_hit_cubes() {
    let mut shapes = ShapeArena::new();
    let c = shapes.add(Shape::cube());
    let cases = [
        ((5.0, 0.5, 0.0), (-1.0, 0.0, 0.0), 4.0, 6.0),
        ((-5.0, 0.5, 0.0), (1.0, 0.0, 0.0), 4.0, 6.0),
        ((0.5, 5.0, 0.0), (0.0, -1.0, 0.0), 4.0, 6.0),
        ((0.5, -5.0, 0.0), (0.0, 1.0, 0.0), 4.0, 6.0),
        ((0.5, 0.0, 5.0), (0.0, 0.0, -1.0), 4.0, 6.0),
        ((0.5, 0.0, -5.0), (0.0, 0.0, 1.0), 4.0, 6.0),
        ((0.0, 0.5, 0.0), (0.0, 0.0, 1.0), -1.0, 1.0),
    ];

    for (origin, direction, t1, t2) in cases.iter() {
        assert_ts(&shapes.intersect(c, &ray(*origin, *direction)), &[*t1, *t2]);
    }
}

#[test]
fn rays_miss_cubes() {
    let mut shapes = ShapeArena::new();
    let c = shapes.add(Shape::cube());
    let cases = [
        ((-2.0, 0.0, 0.0), (0.2673, 0.5345, 0.8018)),
        ((0.0, -2.0, 0.0), (0.8018, 0.2673, 0.5345)),
        ((0.0, 0.0, -2.0), (0.5345, 0.8018, 0.2673)),
        ((2.0, 0.0, 2.0), (0.0, 0.0, -1.0)),
        ((0.0, 2.0, 2.0), (0.0, -1.0, 0.0)),
        ((2.0, 2.0, 0.0), (-1.0, 0.0, 0.0)),
    ];

    for (origin, direction) in cases.iter() {
        assert_ts(&shapes.intersect(c, &ray(*origin, *direction)), &[]);
    }
}

#[test]
fn cube_normals() {
    let c = Shape::cube();
    let cases = [
        ((1.0, 0.5, -0.8), (1.0, 0.0, 0.0)),
        ((-1.0, -0.2, 0.9), (-1.0, 0.0, 0.0)),
        ((-0.4, 1.0, -0.1), (0.0, 1.0, 0.0)),
        ((0.3, -1.0, -0.7), (0.0, -1.0, 0.0)),
        ((-0.6, 0.3, 1.0), (0.0, 0.0, 1.0)),
        ((0.4, 0.4, -1.0), (0.0, 0.0, -1.0)),
        ((1.0, 1.0, 1.0), (1.0, 0.0, 0.0)),
        ((-1.0, -1.0, -1.0), (-1.0, 0.0, 0.0)),
    ];

    for (p, n) in cases.iter() {
        assert_eq!(c.local_normal_at(&Tuple4D::point(p.0, p.1, p.2)),
            Tuple4D::vector(n.0, n.1, n.2));
    }
}

#[test]
fn rays_miss_cylinders() {
    let mut shapes = ShapeArena::new();
    let cyl = shapes.add(Shape::cylinder());

    for (origin, direction) in [
        ((1.0, 0.0, 0.0), (0.0, 1.0, 0.0)),
        ((0.0, 0.0, 0.0), (0.0, 1.0, 0.0)),
        ((0.0, 0.0, -5.0), (1.0, 1.0, 1.0)),
    ] {
        let d = Tuple4D::vector(direction.0, direction.1, direction.2).normalize();
        let r = ray(origin, (d.x, d.y, d.z));
        assert_ts(&shapes.intersect(cyl, &r), &[]);
    }
}

#[test]
fn rays_hit_cylinders() {
    let mut shapes = ShapeArena::new();
    let cyl = shapes.add(Shape::cylinder());
    let cases = [
        ((1.0, 0.0, -5.0), (0.0, 0.0, 1.0), 5.0, 5.0),
        ((0.0, 0.0, -5.0), (0.0, 0.0, 1.0), 4.0, 6.0),
        ((0.5, 0.0, -5.0), (0.1, 1.0, 1.0), 6.80798, 7.08872),
    ];

    for (origin, direction, t0, t1) in cases.iter() {
        let d = Tuple4D::vector(direction.0, direction.1, direction.2).normalize();
        let r = ray(*origin, (d.x, d.y, d.z));
        assert_ts(&shapes.intersect(cyl, &r), &[*t0, *t1]);
    }
}

#[test]
fn cylinder_normals() {
    let cyl = Shape::cylinder();

    assert_eq!(cyl.local_normal_at(&Tuple4D::point(1.0, 0.0, 0.0)),
        Tuple4D::vector(1.0, 0.0, 0.0));
    assert_eq!(cyl.local_normal_at(&Tuple4D::point(0.0, 5.0, -1.0)),
        Tuple4D::vector(0.0, 0.0, -1.0));
    assert_eq!(cyl.local_normal_at(&Tuple4D::point(0.0, -2.0, 1.0)),
        Tuple4D::vector(0.0, 0.0, 1.0));
    assert_eq!(cyl.local_normal_at(&Tuple4D::point(-1.0, 1.0, 0.0)),
        Tuple4D::vector(-1.0, 0.0, 0.0));
}

#[test]
fn cylinder_bounds_are_ordered() {
    let cyl = Shape::bounded_cylinder(2.0, 1.0);

    assert_eq!(*cyl.ty(), ShapeType::Cylinder(1.0, 2.0, false));
    assert_eq!(*Shape::cylinder().ty(),
        ShapeType::Cylinder(f64::NEG_INFINITY, f64::INFINITY, false));
}

#[test]
fn intersecting_truncated_cylinders() {
    let mut shapes = ShapeArena::new();
    let cyl = shapes.add(Shape::bounded_cylinder(1.0, 2.0));
    let cases = [
        ((0.0, 1.5, 0.0), (0.1, 1.0, 0.0), 0),
        ((0.0, 3.0, -5.0), (0.0, 0.0, 1.0), 0),
        ((0.0, 0.0, -5.0), (0.0, 0.0, 1.0), 0),
        ((0.0, 2.0, -5.0), (0.0, 0.0, 1.0), 0),
        ((0.0, 1.0, -5.0), (0.0, 0.0, 1.0), 0),
        ((0.0, 1.5, -2.0), (0.0, 0.0, 1.0), 2),
    ];

    for (origin, direction, count) in cases.iter() {
        let d = Tuple4D::vector(direction.0, direction.1, direction.2).normalize();
        let xs = shapes.intersect(cyl, &ray(*origin, (d.x, d.y, d.z)));
        assert_eq!(xs.intersections.len(), *count);
    }
}

#[test]
fn intersecting_cylinder_caps() {
    let mut shapes = ShapeArena::new();
    let cyl = shapes.add(Shape::capped_cylinder(1.0, 2.0));
    let cases = [
        ((0.0, 3.0, 0.0), (0.0, -1.0, 0.0)),
        ((0.0, 3.0, -2.0), (0.0, -1.0, 2.0)),
        ((0.0, 4.0, -2.0), (0.0, -1.0, 1.0)),
        ((0.0, 0.0, -2.0), (0.0, 1.0, 2.0)),
        ((0.0, -1.0, -2.0), (0.0, 1.0, 1.0)),
    ];

    for (origin, direction) in cases.iter() {
        let d = Tuple4D::vector(direction.0, direction.1, direction.2).normalize();
        let xs = shapes.intersect(cyl, &ray(*origin, (d.x, d.y, d.z)));
        assert_eq!(xs.intersections.len(), 2, "ray from {:?}", origin);
    }
}

#[test]
fn cylinder_cap_normals() {
    let cyl = Shape::capped_cylinder(1.0, 2.0);
    let down = Tuple4D::vector(0.0, -1.0, 0.0);
    let up = Tuple4D::vector(0.0, 1.0, 0.0);

    assert_eq!(cyl.local_normal_at(&Tuple4D::point(0.0, 1.0, 0.0)), down);
    assert_eq!(cyl.local_normal_at(&Tuple4D::point(0.5, 1.0, 0.0)), down);
    assert_eq!(cyl.local_normal_at(&Tuple4D::point(0.0, 1.0, 0.5)), down);
    assert_eq!(cyl.local_normal_at(&Tuple4D::point(0.0, 2.0, 0.0)), up);
    assert_eq!(cyl.local_normal_at(&Tuple4D::point(0.5, 2.0, 0.0)), up);
    assert_eq!(cyl.local_normal_at(&Tuple4D::point(0.0, 2.0, 0.5)), up);
}

#[test]
fn open_cylinder_rim_uses_body_normal() {
    let cyl = Shape::bounded_cylinder(1.0, 2.0);

    assert_eq!(cyl.local_normal_at(&Tuple4D::point(0.9999999, 2.0, 0.0)),
        Tuple4D::vector(0.9999999, 0.0, 0.0));
    assert_eq!(cyl.local_normal_at(&Tuple4D::point(0.0, 1.0, -0.9999999)),
        Tuple4D::vector(0.0, 0.0, -0.9999999));
}

#[test]
fn open_cone_rim_uses_body_normal() {
    let cone = Shape::bounded_cone(-1.0, 2.0);
    let n = cone.local_normal_at(&Tuple4D::point(1.9999999, 2.0, 0.0));

    assert!(n.y < 0.0);
    assert!(n.x > 0.0);
}

#[test]
fn cone_apex_normal_is_finite_in_world_space() {
    let mut shapes = ShapeArena::new();
    let cone = shapes.add(Shape::cone());
    shapes.set_transform(cone, Matrix4D::scaling(2.0, 1.0, 2.0)).unwrap();

    let n = shapes.normal_at(cone, Tuple4D::point(0.0, 0.0, 0.0));
    assert!(n.x.is_finite() && n.y.is_finite() && n.z.is_finite());
    assert_eq!(n, Tuple4D::vector(0.0, 1.0, 0.0));
}

#[test]
fn rays_hit_cones() {
    let mut shapes = ShapeArena::new();
    let cone = shapes.add(Shape::cone());
    let cases = [
        ((0.0, 0.0, -5.0), (0.0, 0.0, 1.0), 5.0, 5.0),
        ((0.0, 0.0, -5.0), (1.0, 1.0, 1.0), 8.66025, 8.66025),
        ((1.0, 1.0, -5.0), (-0.5, -1.0, 1.0), 4.55006, 49.44994),
    ];

    for (origin, direction, t0, t1) in cases.iter() {
        let d = Tuple4D::vector(direction.0, direction.1, direction.2).normalize();
        let r = ray(*origin, (d.x, d.y, d.z));
        assert_ts(&shapes.intersect(cone, &r), &[*t0, *t1]);
    }
}

#[test]
fn ray_parallel_to_one_cone_half() {
    let mut shapes = ShapeArena::new();
    let cone = shapes.add(Shape::cone());
    let d = Tuple4D::vector(0.0, 1.0, 1.0).normalize();

    let xs = shapes.intersect(cone, &ray((0.0, 0.0, -1.0), (d.x, d.y, d.z)));
    assert_ts(&xs, &[0.35355]);
}

#[test]
fn intersecting_cone_caps() {
    let mut shapes = ShapeArena::new();
    let cone = shapes.add(Shape::capped_cone(-0.5, 0.5));
    let cases = [
        ((0.0, 0.0, -5.0), (0.0, 1.0, 0.0), 0),
        ((0.0, 0.0, -0.25), (0.0, 1.0, 1.0), 2),
        ((0.0, 0.0, -0.25), (0.0, 1.0, 0.0), 4),
    ];

    for (origin, direction, count) in cases.iter() {
        let d = Tuple4D::vector(direction.0, direction.1, direction.2).normalize();
        let xs = shapes.intersect(cone, &ray(*origin, (d.x, d.y, d.z)));
        assert_eq!(xs.intersections.len(), *count, "ray from {:?}", origin);
    }
}

#[test]
fn cone_normals() {
    let cone = Shape::cone();

    assert_eq!(cone.local_normal_at(&Tuple4D::point(0.0, 0.0, 0.0)),
        Tuple4D::vector(0.0, 1.0, 0.0));
    assert_eq!(cone.local_normal_at(&Tuple4D::point(1.0, 1.0, 1.0)),
        Tuple4D::vector(1.0, -(2.0f64.sqrt()), 1.0));
    assert_eq!(cone.local_normal_at(&Tuple4D::point(-1.0, -1.0, 0.0)),
        Tuple4D::vector(-1.0, 1.0, 0.0));

    let capped = Shape::capped_cone(-1.0, 2.0);
    assert_eq!(capped.local_normal_at(&Tuple4D::point(0.5, 2.0, 0.5)),
        Tuple4D::vector(0.0, 1.0, 0.0));
}

#[test]
fn triangle_normal_is_constant() {
    let t = Shape::triangle(
        Tuple4D::point(0.0, 1.0, 0.0),
        Tuple4D::point(-1.0, 0.0, 0.0),
        Tuple4D::point(1.0, 0.0, 0.0),
    );
    let normal = t.triangle_info().unwrap().normal;

    assert_eq!(t.local_normal_at(&Tuple4D::point(0.0, 0.5, 0.0)), normal);
    assert_eq!(t.local_normal_at(&Tuple4D::point(-0.5, 0.75, 0.0)), normal);
    assert_eq!(t.local_normal_at(&Tuple4D::point(0.5, 0.25, 0.0)), normal);
}

#[test]
fn intersecting_triangles() {
    let mut shapes = ShapeArena::new();
    let t = shapes.add(Shape::triangle(
        Tuple4D::point(0.0, 1.0, 0.0),
        Tuple4D::point(-1.0, 0.0, 0.0),
        Tuple4D::point(1.0, 0.0, 0.0),
    ));

    // parallel to the triangle
    assert_ts(&shapes.intersect(t, &ray((0.0, -1.0, -2.0), (0.0, 1.0, 0.0))),
        &[]);
    // past each of the three edges
    assert_ts(&shapes.intersect(t, &ray((1.0, 1.0, -2.0), (0.0, 0.0, 1.0))),
        &[]);
    assert_ts(&shapes.intersect(t, &ray((-1.0, 1.0, -2.0), (0.0, 0.0, 1.0))),
        &[]);
    assert_ts(&shapes.intersect(t, &ray((0.0, -1.0, -2.0), (0.0, 0.0, 1.0))),
        &[]);

    assert_ts(&shapes.intersect(t, &ray((0.0, 0.5, -2.0), (0.0, 0.0, 1.0))),
        &[2.0]);
}

#[test]
fn primitive_bounds() {
    let inf = f64::INFINITY;

    assert_eq!(Shape::sphere().bounds(),
        Bounds::new(-1.0, -1.0, -1.0, 1.0, 1.0, 1.0));
    assert_eq!(Shape::plane().bounds(),
        Bounds::new(-inf, 0.0, -inf, inf, 0.0, inf));
    assert_eq!(Shape::cube().bounds(),
        Bounds::new(-1.0, -1.0, -1.0, 1.0, 1.0, 1.0));
    assert_eq!(Shape::cylinder().bounds(),
        Bounds::new(-1.0, -inf, -1.0, 1.0, inf, 1.0));
    assert_eq!(Shape::bounded_cylinder(-5.0, 3.0).bounds(),
        Bounds::new(-1.0, -5.0, -1.0, 1.0, 3.0, 1.0));
    assert_eq!(Shape::cone().bounds(),
        Bounds::new(-inf, -inf, -inf, inf, inf, inf));
    assert_eq!(Shape::bounded_cone(-5.0, 3.0).bounds(),
        Bounds::new(-5.0, -5.0, -5.0, 5.0, 3.0, 5.0));

    let t = Shape::triangle(
        Tuple4D::point(-3.0, 7.0, 2.0),
        Tuple4D::point(6.0, 2.0, -4.0),
        Tuple4D::point(2.0, -1.0, -1.0),
    );
    assert_eq!(t.bounds(), Bounds::new(-3.0, -1.0, -4.0, 6.0, 7.0, 2.0));
}

#[test]
fn adding_children_to_a_group() {
    let mut shapes = ShapeArena::new();
    let g = shapes.add(Shape::group());
    let s = shapes.add(Shape::sphere());

    assert_eq!(shapes[g].children(), Some(&[][..]));
    assert_eq!(*shapes[g].transform(), Matrix4D::identity());

    shapes.add_child(g, s);
    assert_eq!(shapes[g].children(), Some(&[s][..]));
    assert_eq!(shapes[s].parent(), Some(g));
}

#[test]
fn re_parenting_moves_the_child() {
    let mut shapes = ShapeArena::new();
    let g1 = shapes.add(Shape::group());
    let g2 = shapes.add(Shape::group());
    let s = shapes.add(Shape::sphere());

    shapes.add_child(g1, s);
    shapes.add_child(g2, s);

    assert_eq!(shapes[g1].children(), Some(&[][..]));
    assert!(shapes.bounds(g1).is_empty());
    assert_eq!(shapes[g2].children(), Some(&[s][..]));
    assert_eq!(shapes[s].parent(), Some(g2));
}

#[test]
#[should_panic]
fn adding_a_child_to_a_primitive_panics() {
    let mut shapes = ShapeArena::new();
    let s1 = shapes.add(Shape::sphere());
    let s2 = shapes.add(Shape::sphere());

    shapes.add_child(s1, s2);
}

#[test]
#[should_panic]
fn group_cycles_panic() {
    let mut shapes = ShapeArena::new();
    let g1 = shapes.add(Shape::group());
    let g2 = shapes.add(Shape::group());

    shapes.add_child(g1, g2);
    shapes.add_child(g2, g1);
}

#[test]
#[should_panic]
fn normals_on_groups_panic() {
    let mut shapes = ShapeArena::new();
    let g = shapes.add(Shape::group());

    shapes.normal_at(g, Tuple4D::origin());
}

#[test]
fn intersecting_an_empty_group() {
    let mut shapes = ShapeArena::new();
    let g = shapes.add(Shape::group());

    assert_ts(&shapes.local_intersect(g, &ray((0.0, 0.0, 0.0), (0.0, 0.0, 1.0))),
        &[]);
}

#[test]
fn intersecting_a_nonempty_group() {
    let mut shapes = ShapeArena::new();
    let g = shapes.add(Shape::group());
    let s1 = shapes.add(Shape::sphere());
    let s2 = shapes.add(
        Shape::sphere()
            .with_transform(Matrix4D::translation(0.0, 0.0, -3.0))
            .unwrap()
    );
    let s3 = shapes.add(
        Shape::sphere()
            .with_transform(Matrix4D::translation(5.0, 0.0, 0.0))
            .unwrap()
    );
    for s in [s1, s2, s3] {
        shapes.add_child(g, s);
    }

    let xs = shapes.local_intersect(g, &ray((0.0, 0.0, -5.0), (0.0, 0.0, 1.0)));
    let whats: Vec<ShapeId> = xs.intersections.iter().map(|i| i.what).collect();

    assert_eq!(whats, vec![s2, s2, s1, s1]);
}

#[test]
fn intersecting_a_transformed_group() {
    let mut shapes = ShapeArena::new();
    let g = shapes.add(Shape::group());
    let s = shapes.add(
        Shape::sphere()
            .with_transform(Matrix4D::translation(5.0, 0.0, 0.0))
            .unwrap()
    );
    shapes.add_child(g, s);
    shapes.set_transform(g, Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap();

    let xs = shapes.intersect(g, &ray((10.0, 0.0, -10.0), (0.0, 0.0, 1.0)));
    assert_eq!(xs.intersections.len(), 2);
}

#[test]
fn group_bounds_contain_children() {
    let mut shapes = ShapeArena::new();
    let g = shapes.add(Shape::group());
    let s = shapes.add(
        Shape::sphere()
            .with_transform(Matrix4D::translation(2.0, 5.0, -3.0).scale(2.0, 2.0, 2.0))
            .unwrap()
    );
    let c = shapes.add(
        Shape::bounded_cylinder(-2.0, 2.0)
            .with_transform(Matrix4D::translation(-4.0, -1.0, 4.0).scale(0.5, 1.0, 0.5))
            .unwrap()
    );
    shapes.add_child(g, s);
    shapes.add_child(g, c);

    let b = shapes.bounds(g);
    assert_eq!(b, Bounds::new(-4.5, -3.0, -5.0, 4.0, 7.0, 4.5));
    assert!(b.contains_bounds(&shapes.parent_space_bounds(s)));
    assert!(b.contains_bounds(&shapes.parent_space_bounds(c)));
}

#[test]
fn transforming_a_child_refreshes_ancestor_bounds() {
    let mut shapes = ShapeArena::new();
    let outer = shapes.add(Shape::group());
    let inner = shapes.add(Shape::group());
    let s = shapes.add(Shape::sphere());
    shapes.add_child(outer, inner);
    shapes.add_child(inner, s);

    shapes.set_transform(s, Matrix4D::translation(10.0, 0.0, 0.0)).unwrap();

    assert_eq!(shapes.bounds(outer), Bounds::new(9.0, -1.0, -1.0, 11.0, 1.0, 1.0));
}

#[test]
fn missing_a_group_box_skips_its_children() {
    let mut shapes = ShapeArena::new();
    let g = shapes.add(Shape::group());
    let s = shapes.add(Shape::sphere());
    shapes.add_child(g, s);

    let miss = ray((0.0, 0.0, -5.0), (0.0, 1.0, 0.0));
    assert!(shapes.intersect(g, &miss).intersections.is_empty());
    assert_eq!(shapes.stats().bounds_tests(), 1);
    assert_eq!(shapes.stats().bounds_culled(), 1);
    assert_eq!(shapes.stats().primitive_tests(), 0);

    let hit = ray((0.0, 0.0, -5.0), (0.0, 0.0, 1.0));
    assert_eq!(shapes.intersect(g, &hit).intersections.len(), 2);
    assert_eq!(shapes.stats().primitive_tests(), 1);
}

#[test]
fn converting_a_point_from_world_to_object_space() {
    let mut shapes = ShapeArena::new();
    let g1 = shapes.add(Shape::group());
    let g2 = shapes.add(Shape::group());
    let s = shapes.add(Shape::sphere());
    shapes.add_child(g1, g2);
    shapes.add_child(g2, s);
    shapes.set_transform(g1, Matrix4D::rotation_y(std::f64::consts::FRAC_PI_2)).unwrap();
    shapes.set_transform(g2, Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap();
    shapes.set_transform(s, Matrix4D::translation(5.0, 0.0, 0.0)).unwrap();

    assert_eq!(shapes.world_to_object(s, Tuple4D::point(-2.0, 0.0, -10.0)),
        Tuple4D::point(0.0, 0.0, -1.0));
}

#[test]
fn normals_of_nested_children() {
    let mut shapes = ShapeArena::new();
    let g1 = shapes.add(Shape::group());
    let g2 = shapes.add(Shape::group());
    let s = shapes.add(Shape::sphere());
    shapes.add_child(g1, g2);
    shapes.add_child(g2, s);
    shapes.set_transform(g1, Matrix4D::rotation_y(std::f64::consts::FRAC_PI_2)).unwrap();
    shapes.set_transform(g2, Matrix4D::scaling(1.0, 2.0, 3.0)).unwrap();
    shapes.set_transform(s, Matrix4D::translation(5.0, 0.0, 0.0)).unwrap();

    let k = 3.0f64.sqrt() / 3.0;
    let expected = Tuple4D::vector(0.2857, 0.4286, -0.8571);

    let n = shapes.normal_to_world(s, Tuple4D::vector(k, k, k));
    assert!((n - expected).magnitude() < 2e-4);

    // the point is only given to four places
    let n = shapes.normal_at(s, Tuple4D::point(1.7321, 1.1547, -5.5774));
    assert!((n - expected).magnitude() < 1e-3);
}
