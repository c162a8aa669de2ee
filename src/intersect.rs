use std::cmp::Ordering;

use crate::consts::EPSILON;
use crate::ray::Ray4D;
use crate::shape::{ ShapeArena, ShapeId };
use crate::tuple::Tuple4D;

/// An intersection.
///
/// This structure assumes that some ray produced an intersection. Parameter `t`
/// is analogous to `t` for a ray (the offset from the ray origin).
///
/// The `what` parameter identifies the intersected shape within its
/// `ShapeArena`. Only primitives are ever intersected; groups forward to their
/// children.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Intersection {
    pub t: f64,
    pub what: ShapeId,
}

/// Intersections order by `t`, then by shape id.
impl PartialOrd for Intersection {
    fn partial_cmp(&self, other: &Intersection) -> Option<Ordering> {
        match self.t.partial_cmp(&other.t) {
            Some(Ordering::Equal) => Some(self.what.cmp(&other.what)),
            ord => ord,
        }
    }
}

impl Intersection {
    pub fn new(t: f64, what: ShapeId) -> Intersection {
        Intersection { t, what }
    }
}

/// A collection of intersections.
///
/// Mostly a wrapper for a vector of `Intersection` objects. See the
/// `Intersection` documentation for more information.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Intersections {
    pub intersections: Vec<Intersection>,
}

impl From<Vec<Intersection>> for Intersections {
    fn from(intersections: Vec<Intersection>) -> Intersections {
        Intersections { intersections }
    }
}

impl Intersections {
    /// Creates a new list of intersections.
    pub fn new() -> Intersections {
        Intersections { intersections: Vec::new() }
    }

    /// Concatenates several lists of intersections, sorted by `t`.
    pub fn aggregate<I: IntoIterator<Item = Intersections>>(lists: I)
        -> Intersections {
        let mut all = Intersections::new();
        for list in lists {
            all.intersections.extend(list.intersections);
        }

        all.sort();
        all
    }

    pub fn len(&self) -> usize {
        self.intersections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intersections.is_empty()
    }

    /// Finds the visible intersection, if any.
    ///
    /// A hit is the finite intersection with the lowest non-negative `t`. The
    /// list doesn't need to be sorted, and is left untouched.
    ///
    /// # Examples
    ///
    /// ```
    /// use whitted::intersect::{ Intersection, Intersections };
    /// use whitted::shape::{ Shape, ShapeArena };
    ///
    /// let mut shapes = ShapeArena::new();
    /// let s = shapes.add(Shape::sphere());
    ///
    /// let xs: Intersections = vec![
    ///     Intersection::new(5.0, s),
    ///     Intersection::new(-3.0, s),
    ///     Intersection::new(2.0, s),
    /// ].into();
    ///
    /// assert_eq!(xs.hit(), Some(Intersection::new(2.0, s)));
    /// ```
    pub fn hit(&self) -> Option<Intersection> {
        self.intersections.iter()
            .filter(|i| i.t.is_finite() && i.t >= 0.0)
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
            .copied()
    }

    /// Sorts the intersections by `t`, ignoring `f64` semantics.
    pub fn sort(&mut self) {
        self.intersections.sort_by(|a, b|
            a.partial_cmp(b).unwrap_or(Ordering::Equal)
        );
    }
}

/// A record for computations associated with an `Intersection`.
///
/// Mostly a superset of an `Intersection`.
#[derive(Clone, Debug)]
pub struct IntersectionComputation {
    /// The "time" of the ray intersection.
    pub t: f64,

    /// The object being intersected.
    pub obj: ShapeId,

    /// The point where the intersection occurs.
    pub point: Tuple4D,

    /// A point slightly above the intersected surface. Used to prevent an
    /// object from shadowing itself (this causes "acne").
    pub over_point: Tuple4D,

    /// A point slightly below the intersected surface. Used to prevent an
    /// object from refracting itself on its surface.
    pub under_point: Tuple4D,

    /// The eye vector for the intersection.
    pub eyev: Tuple4D,

    /// The normal vector of the object being intersected, facing the eye.
    pub normalv: Tuple4D,

    /// The intersection ray, reflected across the normal.
    pub reflectv: Tuple4D,

    /// Whether the intersection occurs within the object or not.
    pub inside: bool,

    /// The refractive index of the material being exited.
    pub n1: f64,

    /// The refractive index of the material being entered.
    pub n2: f64,

    /// The fraction of light reflected at the hit. See `schlick`.
    pub reflectance: f64,
}

impl IntersectionComputation {
    /// Creates a new intersection computation, given a ray and intersection.
    ///
    /// The `is` parameter is a collection of intersections along the same
    /// ray, in any order. If provided, refraction indices will be calculated;
    /// otherwise both are 1.0.
    pub fn new(shapes: &ShapeArena, r: &Ray4D, hit: &Intersection,
        is: Option<&Intersections>) -> IntersectionComputation {
        shapes.stats().record_precompute();

        let t = hit.t;
        let obj = hit.what;
        let point = r.position(t);
        let eyev = -r.direction;
        let mut normalv = shapes.normal_at(obj, point);

        let inside = if normalv.dot(&eyev) < 0.0 {
            normalv = -normalv;
            true
        } else {
            false
        };

        let over_point = point + normalv * EPSILON;
        let under_point = point - normalv * EPSILON;

        let reflectv = r.direction.reflect(&normalv);
        let (n1, n2) = match is {
            Some(xs) => Self::refraction_indices(shapes, hit, xs),
            None => (1.0, 1.0),
        };

        let mut comps = IntersectionComputation {
            t, obj,
            point, over_point, under_point,
            eyev, normalv, reflectv,
            inside,
            n1, n2,
            reflectance: 0.0,
        };
        comps.reflectance = comps.schlick();

        comps
    }

    fn refraction_indices(shapes: &ShapeArena, hit: &Intersection,
        is: &Intersections) -> (f64, f64) {
        let index_of = |containers: &[ShapeId]| containers.last()
            .map_or(1.0, |id| shapes[*id].material.refractive_index);

        let mut sorted = is.clone();
        sorted.sort();

        // Objects the ray has entered but not yet exited, innermost last.
        let mut containers: Vec<ShapeId> = Vec::new();

        for i in sorted.intersections.iter() {
            let n1 = index_of(&containers);

            match containers.iter().position(|x| *x == i.what) {
                Some(j) => { containers.remove(j); },
                None => containers.push(i.what),
            }

            if i == hit {
                return (n1, index_of(&containers));
            }
        }

        (1.0, 1.0)
    }

    /// Calculates the reflectance of a hit.
    ///
    /// The reflectance is a number between 0 and 1, representing what fraction
    /// of the light is reflected for the hit. Schlick's approximation of the
    /// Fresnel equations; total internal reflection gives 1.0.
    pub fn schlick(&self) -> f64 {
        let mut cos = self.eyev.dot(&self.normalv);

        // Total internal reflection can only occur if n1 > n2.
        if self.n1 > self.n2 {
            let n = self.n1 / self.n2;
            let sin2_t = n.powi(2) * (1.0 - cos.powi(2));
            if sin2_t > 1.0 {
                return 1.0;
            }

            // past the boundary, use the cosine of the transmitted angle
            cos = (1.0 - sin2_t).sqrt();
        }

        let r0 = ((self.n1 - self.n2) / (self.n1 + self.n2)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cos).powi(5)
    }
}

#[cfg(test)]
use crate::matrix::Matrix4D;
#[cfg(test)]
use crate::shape::Shape;

#[test]
fn hit_when_all_intersections_are_positive() {
    let mut shapes = ShapeArena::new();
    let s = shapes.add(Shape::sphere());
    let i1 = Intersection::new(1.0, s);
    let i2 = Intersection::new(2.0, s);
    let xs: Intersections = vec![i2, i1].into();

    assert_eq!(xs.hit(), Some(i1));
}

#[test]
fn hit_when_some_intersections_are_negative() {
    let mut shapes = ShapeArena::new();
    let s = shapes.add(Shape::sphere());
    let i1 = Intersection::new(-1.0, s);
    let i2 = Intersection::new(1.0, s);
    let xs: Intersections = vec![i2, i1].into();

    assert_eq!(xs.hit(), Some(i2));
}

#[test]
fn hit_when_all_intersections_are_negative() {
    let mut shapes = ShapeArena::new();
    let s = shapes.add(Shape::sphere());
    let xs: Intersections = vec![
        Intersection::new(-2.0, s),
        Intersection::new(-1.0, s),
    ].into();

    assert_eq!(xs.hit(), None);
}

#[test]
fn hit_is_lowest_nonnegative_intersection() {
    let mut shapes = ShapeArena::new();
    let s = shapes.add(Shape::sphere());
    let i4 = Intersection::new(2.0, s);
    let xs: Intersections = vec![
        Intersection::new(5.0, s),
        Intersection::new(7.0, s),
        Intersection::new(-3.0, s),
        i4,
        Intersection::new(f64::INFINITY, s),
    ].into();

    assert_eq!(xs.hit(), Some(i4));
    assert_eq!(xs.len(), 5);
}

#[test]
fn aggregate_sorts_by_t() {
    let mut shapes = ShapeArena::new();
    let a = shapes.add(Shape::sphere());
    let b = shapes.add(Shape::sphere());

    let xs = Intersections::aggregate(vec![
        vec![Intersection::new(3.0, a), Intersection::new(5.0, a)].into(),
        Intersections::new(),
        vec![Intersection::new(1.0, b), Intersection::new(4.0, b)].into(),
    ]);
    let ts: Vec<f64> = xs.intersections.iter().map(|i| i.t).collect();

    assert_eq!(ts, vec![1.0, 3.0, 4.0, 5.0]);
}

#[test]
fn precompute_an_outside_hit() {
    let mut shapes = ShapeArena::new();
    let s = shapes.add(Shape::sphere());
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let i = Intersection::new(4.0, s);
    let comps = IntersectionComputation::new(&shapes, &r, &i, None);

    assert_eq!(comps.t, 4.0);
    assert_eq!(comps.obj, s);
    assert_eq!(comps.point, Tuple4D::point(0.0, 0.0, -1.0));
    assert_eq!(comps.eyev, Tuple4D::vector(0.0, 0.0, -1.0));
    assert_eq!(comps.normalv, Tuple4D::vector(0.0, 0.0, -1.0));
    assert!(!comps.inside);
    assert_eq!(shapes.stats().precomputes(), 1);
}

#[test]
fn precompute_an_inside_hit() {
    let mut shapes = ShapeArena::new();
    let s = shapes.add(Shape::sphere());
    let r = Ray4D::new(Tuple4D::origin(), Tuple4D::vector(0.0, 0.0, 1.0));
    let i = Intersection::new(1.0, s);
    let comps = IntersectionComputation::new(&shapes, &r, &i, None);

    assert_eq!(comps.point, Tuple4D::point(0.0, 0.0, 1.0));
    assert_eq!(comps.eyev, Tuple4D::vector(0.0, 0.0, -1.0));
    assert!(comps.inside);
    // flipped to face the eye
    assert_eq!(comps.normalv, Tuple4D::vector(0.0, 0.0, -1.0));
}

#[test]
fn hit_offsets_the_point() {
    let mut shapes = ShapeArena::new();
    let s = shapes.add(
        Shape::glass_sphere()
            .with_transform(Matrix4D::translation(0.0, 0.0, 1.0))
            .unwrap()
    );
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let i = Intersection::new(5.0, s);
    let xs: Intersections = vec![i].into();
    let comps = IntersectionComputation::new(&shapes, &r, &i, Some(&xs));

    assert!(comps.over_point.z < -EPSILON / 2.0);
    assert!(comps.point.z > comps.over_point.z);
    assert!(comps.under_point.z > EPSILON / 2.0);
    assert!(comps.point.z < comps.under_point.z);
}

#[test]
fn precompute_the_reflection_vector() {
    let mut shapes = ShapeArena::new();
    let p = shapes.add(Shape::plane());
    let h = 2.0f64.sqrt() / 2.0;
    let r = Ray4D::new(
        Tuple4D::point(0.0, 1.0, -1.0),
        Tuple4D::vector(0.0, -h, h)
    );
    let i = Intersection::new(2.0f64.sqrt(), p);
    let comps = IntersectionComputation::new(&shapes, &r, &i, None);

    assert_eq!(comps.reflectv, Tuple4D::vector(0.0, h, h));
}

#[test]
fn refractive_indices_at_various_intersections() {
    let mut shapes = ShapeArena::new();

    let mut a = Shape::glass_sphere()
        .with_transform(Matrix4D::scaling(2.0, 2.0, 2.0))
        .unwrap();
    a.material.refractive_index = 1.5;
    let a = shapes.add(a);

    let mut b = Shape::glass_sphere()
        .with_transform(Matrix4D::translation(0.0, 0.0, -0.25))
        .unwrap();
    b.material.refractive_index = 2.0;
    let b = shapes.add(b);

    let mut c = Shape::glass_sphere()
        .with_transform(Matrix4D::translation(0.0, 0.0, 0.25))
        .unwrap();
    c.material.refractive_index = 2.5;
    let c = shapes.add(c);

    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -4.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    // deliberately out of order
    let xs: Intersections = vec![
        Intersection::new(6.0, a),
        Intersection::new(2.0, a),
        Intersection::new(2.75, b),
        Intersection::new(3.25, c),
        Intersection::new(4.75, b),
        Intersection::new(5.25, c),
    ].into();

    let expected = [
        (2.0, a, 1.0, 1.5),
        (2.75, b, 1.5, 2.0),
        (3.25, c, 2.0, 2.5),
        (4.75, b, 2.5, 2.5),
        (5.25, c, 2.5, 1.5),
        (6.0, a, 1.5, 1.0),
    ];

    for (t, what, n1, n2) in expected.iter() {
        let i = Intersection::new(*t, *what);
        let comps = IntersectionComputation::new(&shapes, &r, &i, Some(&xs));

        assert_eq!((comps.n1, comps.n2), (*n1, *n2), "at t = {}", t);
    }
}

#[test]
fn schlick_under_total_internal_reflection() {
    let mut shapes = ShapeArena::new();
    let s = shapes.add(Shape::glass_sphere());
    let h = 2.0f64.sqrt() / 2.0;
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, h), Tuple4D::vector(0.0, 1.0, 0.0));
    let xs: Intersections = vec![
        Intersection::new(-h, s),
        Intersection::new(h, s),
    ].into();
    let comps = IntersectionComputation::new(
        &shapes, &r, &xs.intersections[1], Some(&xs)
    );

    assert_eq!(comps.schlick(), 1.0);
    assert_eq!(comps.reflectance, 1.0);
}

#[test]
fn schlick_with_a_perpendicular_viewing_angle() {
    let mut shapes = ShapeArena::new();
    let s = shapes.add(Shape::glass_sphere());
    let r = Ray4D::new(Tuple4D::origin(), Tuple4D::vector(0.0, 1.0, 0.0));
    let xs: Intersections = vec![
        Intersection::new(-1.0, s),
        Intersection::new(1.0, s),
    ].into();
    let comps = IntersectionComputation::new(
        &shapes, &r, &xs.intersections[1], Some(&xs)
    );

    assert!(crate::feq(comps.reflectance, 0.04));
}

#[test]
fn schlick_with_a_small_angle_and_n2_above_n1() {
    let mut shapes = ShapeArena::new();
    let s = shapes.add(Shape::glass_sphere());
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.99, -2.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let xs: Intersections = vec![Intersection::new(1.8589, s)].into();
    let comps = IntersectionComputation::new(
        &shapes, &r, &xs.intersections[0], Some(&xs)
    );

    assert!((comps.reflectance - 0.48873).abs() < 1e-4);
}
