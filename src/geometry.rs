use crate::consts::EPSILON;
use crate::feq;
use crate::matrix::Matrix4D;
use crate::ray::Ray4D;
use crate::tuple::Tuple4D;

/// Precomputed data for a flat triangle.
///
/// The edges and normal are derived once at construction, since intersection
/// tests need them for every ray.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TriangleInfo {
    pub p1: Tuple4D,
    pub p2: Tuple4D,
    pub p3: Tuple4D,

    /// Edge from `p1` to `p2`.
    pub e1: Tuple4D,
    /// Edge from `p1` to `p3`.
    pub e2: Tuple4D,
    pub normal: Tuple4D,
}

impl TriangleInfo {
    pub fn new(p1: Tuple4D, p2: Tuple4D, p3: Tuple4D) -> TriangleInfo {
        let e1 = p2 - p1;
        let e2 = p3 - p1;
        let normal = e2.cross(&e1).normalize();

        TriangleInfo { p1, p2, p3, e1, e2, normal }
    }
}

/// An axis-aligned bounding box.
///
/// Boxes live in the object space of the shape they bound. The empty box has
/// its minimum at positive infinity and its maximum at negative infinity, so
/// that adding any point to it yields a box around just that point. Infinite
/// extents are allowed (planes, untruncated cylinders and cones).
#[derive(Copy, Clone, Debug)]
pub struct Bounds {
    pub minimum: Tuple4D,
    pub maximum: Tuple4D,
}

/// Approximate equality that also treats matching infinities as equal.
impl PartialEq for Bounds {
    fn eq(&self, other: &Bounds) -> bool {
        let same = |a: f64, b: f64| a == b || feq(a, b);
        let corner = |a: &Tuple4D, b: &Tuple4D|
            same(a.x, b.x) && same(a.y, b.y) && same(a.z, b.z);

        corner(&self.minimum, &other.minimum)
            && corner(&self.maximum, &other.maximum)
    }
}

impl Default for Bounds {
    fn default() -> Bounds {
        Bounds::empty()
    }
}

impl Bounds {
    pub fn new(min_x: f64, min_y: f64, min_z: f64,
        max_x: f64, max_y: f64, max_z: f64) -> Bounds {
        Bounds {
            minimum: Tuple4D::point(min_x, min_y, min_z),
            maximum: Tuple4D::point(max_x, max_y, max_z),
        }
    }

    pub fn empty() -> Bounds {
        let inf = f64::INFINITY;
        Bounds::new(inf, inf, inf, -inf, -inf, -inf)
    }

    /// The smallest box containing every point.
    pub fn from_points<I: IntoIterator<Item = Tuple4D>>(points: I) -> Bounds {
        let mut b = Bounds::empty();
        for p in points {
            b.add_point(p);
        }

        b
    }

    /// A box is empty if it does not span a point on every axis.
    pub fn is_empty(&self) -> bool {
        self.minimum.x > self.maximum.x
            || self.minimum.y > self.maximum.y
            || self.minimum.z > self.maximum.z
    }

    pub fn add_point(&mut self, p: Tuple4D) {
        self.minimum.x = self.minimum.x.min(p.x);
        self.minimum.y = self.minimum.y.min(p.y);
        self.minimum.z = self.minimum.z.min(p.z);
        self.maximum.x = self.maximum.x.max(p.x);
        self.maximum.y = self.maximum.y.max(p.y);
        self.maximum.z = self.maximum.z.max(p.z);
    }

    /// Grows this box to enclose `other`.
    pub fn merge(&mut self, other: &Bounds) {
        if other.is_empty() {
            return;
        }

        self.add_point(other.minimum);
        self.add_point(other.maximum);
    }

    pub fn contains_point(&self, p: &Tuple4D) -> bool {
        self.minimum.x <= p.x && p.x <= self.maximum.x
            && self.minimum.y <= p.y && p.y <= self.maximum.y
            && self.minimum.z <= p.z && p.z <= self.maximum.z
    }

    pub fn contains_bounds(&self, other: &Bounds) -> bool {
        other.is_empty()
            || (self.contains_point(&other.minimum)
                && self.contains_point(&other.maximum))
    }

    /// The eight corners of the box.
    pub fn corners(&self) -> [Tuple4D; 8] {
        let (lo, hi) = (self.minimum, self.maximum);

        [
            Tuple4D::point(lo.x, lo.y, lo.z),
            Tuple4D::point(lo.x, lo.y, hi.z),
            Tuple4D::point(lo.x, hi.y, lo.z),
            Tuple4D::point(lo.x, hi.y, hi.z),
            Tuple4D::point(hi.x, lo.y, lo.z),
            Tuple4D::point(hi.x, lo.y, hi.z),
            Tuple4D::point(hi.x, hi.y, lo.z),
            Tuple4D::point(hi.x, hi.y, hi.z),
        ]
    }

    /// Re-derives an axis-aligned box around this box's eight transformed
    /// corners.
    ///
    /// Zero matrix coefficients are skipped so that an infinite extent on one
    /// axis doesn't turn into NaN on an axis it never touches.
    pub fn transform(&self, m: &Matrix4D) -> Bounds {
        if self.is_empty() {
            return Bounds::empty();
        }

        Bounds::from_points(self.corners().iter().map(|c| transform_corner(m, c)))
    }

    /// Checks whether a ray passes through the box (slab method).
    pub fn intersects(&self, ray: &Ray4D) -> bool {
        if self.is_empty() {
            return false;
        }

        let (xtmin, xtmax) = Bounds::check_axis(
            self.minimum.x, self.maximum.x, ray.origin.x, ray.direction.x
        );
        let (ytmin, ytmax) = Bounds::check_axis(
            self.minimum.y, self.maximum.y, ray.origin.y, ray.direction.y
        );
        let (ztmin, ztmax) = Bounds::check_axis(
            self.minimum.z, self.maximum.z, ray.origin.z, ray.direction.z
        );

        let tmin = xtmin.max(ytmin).max(ztmin);
        let tmax = xtmax.min(ytmax).min(ztmax);

        tmin <= tmax
    }

    /// Distances at which a ray crosses the `minimum` and `maximum` planes of
    /// one axis, smaller first.
    ///
    /// A direction component within `EPSILON` of zero is treated as parallel
    /// to the planes, producing infinite distances.
    pub fn check_axis(minimum: f64, maximum: f64, origin: f64, direction: f64)
        -> (f64, f64) {
        let tmin_numerator = minimum - origin;
        let tmax_numerator = maximum - origin;

        let (tmin, tmax) = if direction.abs() >= EPSILON {
            (tmin_numerator / direction, tmax_numerator / direction)
        } else {
            (tmin_numerator * f64::INFINITY, tmax_numerator * f64::INFINITY)
        };

        if tmin > tmax {
            (tmax, tmin)
        } else {
            (tmin, tmax)
        }
    }
}

fn transform_corner(m: &Matrix4D, p: &Tuple4D) -> Tuple4D {
    let row = |r: usize| {
        [p.x, p.y, p.z, 1.0].iter()
            .enumerate()
            .filter(|(c, _)| m[(r, *c)] != 0.0)
            .map(|(c, v)| m[(r, c)] * v)
            .sum::<f64>()
    };

    Tuple4D::point(row(0), row(1), row(2))
}

#[test]
fn constructing_a_triangle() {
    let p1 = Tuple4D::point(0.0, 1.0, 0.0);
    let p2 = Tuple4D::point(-1.0, 0.0, 0.0);
    let p3 = Tuple4D::point(1.0, 0.0, 0.0);
    let ti = TriangleInfo::new(p1, p2, p3);

    assert_eq!(ti.e1, Tuple4D::vector(-1.0, -1.0, 0.0));
    assert_eq!(ti.e2, Tuple4D::vector(1.0, -1.0, 0.0));
    assert_eq!(ti.normal, Tuple4D::vector(0.0, 0.0, -1.0));
}

#[test]
fn empty_bounds() {
    let b = Bounds::empty();

    assert!(b.is_empty());
    assert!(!b.contains_point(&Tuple4D::origin()));
    assert_eq!(b.minimum.x, f64::INFINITY);
    assert_eq!(b.maximum.x, f64::NEG_INFINITY);
}

#[test]
fn adding_points_to_bounds() {
    let mut b = Bounds::empty();
    b.add_point(Tuple4D::point(-5.0, 2.0, 0.0));
    b.add_point(Tuple4D::point(7.0, 0.0, -3.0));

    assert_eq!(b, Bounds::new(-5.0, 0.0, -3.0, 7.0, 2.0, 0.0));
}

#[test]
fn merging_bounds() {
    let mut a = Bounds::new(-5.0, -2.0, 0.0, 7.0, 4.0, 4.0);
    let b = Bounds::new(8.0, -7.0, -2.0, 14.0, 2.0, 8.0);
    a.merge(&b);

    assert_eq!(a, Bounds::new(-5.0, -7.0, -2.0, 14.0, 4.0, 8.0));

    // merging an empty box changes nothing
    a.merge(&Bounds::empty());
    assert_eq!(a, Bounds::new(-5.0, -7.0, -2.0, 14.0, 4.0, 8.0));
}

#[test]
fn bounds_contain_points() {
    let b = Bounds::new(5.0, -2.0, 0.0, 11.0, 4.0, 7.0);

    assert!(b.contains_point(&Tuple4D::point(5.0, -2.0, 0.0)));
    assert!(b.contains_point(&Tuple4D::point(11.0, 4.0, 7.0)));
    assert!(b.contains_point(&Tuple4D::point(8.0, 1.0, 3.0)));
    assert!(!b.contains_point(&Tuple4D::point(3.0, 0.0, 3.0)));
    assert!(!b.contains_point(&Tuple4D::point(8.0, -4.0, 3.0)));
    assert!(!b.contains_point(&Tuple4D::point(8.0, 1.0, -1.0)));
    assert!(!b.contains_point(&Tuple4D::point(8.0, 1.0, 8.0)));
}

#[test]
fn bounds_contain_bounds() {
    let b = Bounds::new(5.0, -2.0, 0.0, 11.0, 4.0, 7.0);

    assert!(b.contains_bounds(&Bounds::new(5.0, -2.0, 0.0, 11.0, 4.0, 7.0)));
    assert!(b.contains_bounds(&Bounds::new(6.0, -1.0, 1.0, 10.0, 3.0, 6.0)));
    assert!(!b.contains_bounds(&Bounds::new(4.0, -3.0, -1.0, 10.0, 3.0, 6.0)));
    assert!(!b.contains_bounds(&Bounds::new(6.0, -1.0, 1.0, 12.0, 5.0, 8.0)));
}

#[test]
fn transforming_bounds() {
    let b = Bounds::new(-1.0, -1.0, -1.0, 1.0, 1.0, 1.0);
    let m = Matrix4D::rotation_x(std::f64::consts::FRAC_PI_4)
        .rotate_y(std::f64::consts::FRAC_PI_4);

    assert_eq!(b.transform(&m),
        Bounds::new(-1.41421, -1.70711, -1.70711, 1.41421, 1.70711, 1.70711));
}

#[test]
fn transforming_infinite_bounds() {
    let inf = f64::INFINITY;
    let plane = Bounds::new(-inf, 0.0, -inf, inf, 0.0, inf);
    let moved = plane.transform(&Matrix4D::translation(1.0, 2.0, 3.0));

    assert_eq!(moved, Bounds::new(-inf, 2.0, -inf, inf, 2.0, inf));
}

#[test]
fn intersecting_rays_with_bounds() {
    let b = Bounds::new(5.0, -2.0, 0.0, 11.0, 4.0, 7.0);
    let cases = [
        (Tuple4D::point(15.0, 1.0, 2.0), Tuple4D::vector(-1.0, 0.0, 0.0), true),
        (Tuple4D::point(-5.0, -1.0, 4.0), Tuple4D::vector(1.0, 0.0, 0.0), true),
        (Tuple4D::point(7.0, 6.0, 5.0), Tuple4D::vector(0.0, -1.0, 0.0), true),
        (Tuple4D::point(9.0, -5.0, 6.0), Tuple4D::vector(0.0, 1.0, 0.0), true),
        (Tuple4D::point(8.0, 2.0, 12.0), Tuple4D::vector(0.0, 0.0, -1.0), true),
        (Tuple4D::point(6.0, 0.0, -5.0), Tuple4D::vector(0.0, 0.0, 1.0), true),
        (Tuple4D::point(8.0, 1.0, 3.5), Tuple4D::vector(0.0, 0.0, 1.0), true),
        (Tuple4D::point(9.0, -1.0, -8.0), Tuple4D::vector(2.0, 4.0, 6.0), false),
        (Tuple4D::point(8.0, 3.0, -4.0), Tuple4D::vector(6.0, 2.0, 4.0), false),
        (Tuple4D::point(9.0, -1.0, -2.0), Tuple4D::vector(4.0, 6.0, 2.0), false),
        (Tuple4D::point(4.0, 0.0, 9.0), Tuple4D::vector(0.0, 0.0, -1.0), false),
        (Tuple4D::point(8.0, 6.0, -1.0), Tuple4D::vector(0.0, -1.0, 0.0), false),
        (Tuple4D::point(12.0, 5.0, 4.0), Tuple4D::vector(-1.0, 0.0, 0.0), false),
    ];

    for (origin, direction, expected) in cases.iter() {
        let r = Ray4D::new(*origin, direction.normalize());
        assert_eq!(b.intersects(&r), *expected, "ray from {}", origin);
    }
}

#[test]
fn empty_bounds_are_never_hit() {
    let r = Ray4D::new(Tuple4D::origin(), Tuple4D::vector(0.0, 0.0, 1.0));

    assert!(!Bounds::empty().intersects(&r));
}
