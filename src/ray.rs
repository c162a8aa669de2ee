use crate::tuple::Tuple4D;
use crate::matrix::Matrix4D;

/// A ray: an origin point travelling along a direction vector.
///
/// Directions are not normalized, so `t` values measured along a transformed
/// ray stay valid for the untransformed one.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Ray4D {
    pub origin: Tuple4D,
    pub direction: Tuple4D,
}

impl Ray4D {
    pub fn new(origin: Tuple4D, direction: Tuple4D) -> Ray4D {
        debug_assert!(origin.is_point(), "ray origin must be a point");
        debug_assert!(direction.is_vector(), "ray direction must be a vector");

        Ray4D { origin, direction }
    }

    /// The point at distance `t` along the ray.
    ///
    /// ```
    /// use whitted::ray::Ray4D;
    /// use whitted::tuple::Tuple4D;
    ///
    /// let r = Ray4D::new(Tuple4D::point(2.0, 3.0, 4.0), Tuple4D::vector(1.0, 0.0, 0.0));
    /// assert_eq!(r.position(2.5), Tuple4D::point(4.5, 3.0, 4.0));
    /// ```
    pub fn position(&self, t: f64) -> Tuple4D {
        self.origin + self.direction * t
    }

    pub fn transform(&self, m: &Matrix4D) -> Ray4D {
        Ray4D {
            origin: *m * self.origin,
            direction: *m * self.direction,
        }
    }
}

#[test]
fn ray_position() {
    let r = Ray4D::new(
        Tuple4D::point(2.0, 3.0, 4.0),
        Tuple4D::vector(1.0, 0.0, 0.0)
    );

    assert_eq!(r.position(0.0), Tuple4D::point(2.0, 3.0, 4.0));
    assert_eq!(r.position(1.0), Tuple4D::point(3.0, 3.0, 4.0));
    assert_eq!(r.position(-1.0), Tuple4D::point(1.0, 3.0, 4.0));
}

#[test]
fn ray_translation() {
    let r = Ray4D::new(
        Tuple4D::point(1.0, 2.0, 3.0),
        Tuple4D::vector(0.0, 1.0, 0.0)
    );
    let t = r.transform(&Matrix4D::translation(3.0, 4.0, 5.0));

    assert_eq!(t.origin, Tuple4D::point(4.0, 6.0, 8.0));
    assert_eq!(t.direction, Tuple4D::vector(0.0, 1.0, 0.0));
}

#[test]
fn ray_scaling() {
    let r = Ray4D::new(
        Tuple4D::point(1.0, 2.0, 3.0),
        Tuple4D::vector(0.0, 1.0, 0.0)
    );
    let t = r.transform(&Matrix4D::scaling(2.0, 3.0, 4.0));

    assert_eq!(t.origin, Tuple4D::point(2.0, 6.0, 12.0));
    assert_eq!(t.direction, Tuple4D::vector(0.0, 3.0, 0.0));

    // the original ray is untouched
    assert_eq!(r.origin, Tuple4D::point(1.0, 2.0, 3.0));
}
