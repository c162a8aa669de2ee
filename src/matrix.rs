use std::fmt;
use std::ops::{ Index, IndexMut, Mul };

use thiserror::Error;

use crate::feq;
use crate::tuple::Tuple4D;

/// Returned when inverting a matrix whose determinant is zero.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
#[error("matrix is not invertible (determinant is zero)")]
pub struct NotInvertibleError;

/// Defines a square, row-major matrix of a fixed degree.
///
/// Indexing is `(row, column)`; indices at or beyond the degree panic.
/// Equality is approximate, element-wise with `feq`.
macro_rules! square_matrix {
    ($(#[$meta:meta])* $name:ident, $n:expr) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug)]
        pub struct $name {
            data: [f64; $n * $n],
        }

        impl $name {
            pub const DEGREE: usize = $n;

            /// Creates a matrix with every element set to `0.0`.
            pub fn new() -> $name {
                $name { data: [0.0; $n * $n] }
            }

            pub fn identity() -> $name {
                let mut m = $name::new();
                for i in 0..$n {
                    m[(i, i)] = 1.0;
                }

                m
            }
        }

        impl Default for $name {
            fn default() -> $name {
                $name::new()
            }
        }

        impl From<[f64; $n * $n]> for $name {
            fn from(data: [f64; $n * $n]) -> $name {
                $name { data }
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &$name) -> bool {
                self.data.iter().zip(other.data.iter()).all(|(x, y)| feq(*x, *y))
            }
        }

        impl Index<(usize, usize)> for $name {
            type Output = f64;

            fn index(&self, (r, c): (usize, usize)) -> &f64 {
                assert!(r < $n && c < $n,
                    "index ({}, {}) out of range for a {}x{} matrix", r, c, $n, $n);
                &self.data[r * $n + c]
            }
        }

        impl IndexMut<(usize, usize)> for $name {
            fn index_mut(&mut self, (r, c): (usize, usize)) -> &mut f64 {
                assert!(r < $n && c < $n,
                    "index ({}, {}) out of range for a {}x{} matrix", r, c, $n, $n);
                &mut self.data[r * $n + c]
            }
        }
    };
}

/// Adds submatrix, minor, cofactor and determinant (cofactor expansion along
/// the first row) to a matrix whose submatrices are of type `$sub`.
macro_rules! cofactor_expansion {
    ($name:ident, $n:expr, $sub:ident) => {
        impl $name {
            /// Removes row `row` and column `col`, yielding a matrix one
            /// degree smaller.
            pub fn submatrix(&self, row: usize, col: usize) -> $sub {
                let mut sub = $sub::new();
                let mut count = 0;

                for r in (0..$n).filter(|r| *r != row) {
                    for c in (0..$n).filter(|c| *c != col) {
                        sub.data[count] = self[(r, c)];
                        count += 1;
                    }
                }

                sub
            }

            /// Determinant of the submatrix at `row` and `col`.
            pub fn minor(&self, row: usize, col: usize) -> f64 {
                self.submatrix(row, col).determinant()
            }

            /// The minor, negated when `row + col` is odd.
            pub fn cofactor(&self, row: usize, col: usize) -> f64 {
                let m = self.minor(row, col);
                if (row + col) % 2 == 0 { m } else { -m }
            }

            pub fn determinant(&self) -> f64 {
                (0..$n).map(|c| self[(0, c)] * self.cofactor(0, c)).sum()
            }
        }
    };
}

square_matrix!(
    /// A 2x2 matrix. Only used as the base case of cofactor expansion.
    Matrix2D, 2
);

square_matrix!(
    /// A 3x3 matrix. Only used as an intermediate of cofactor expansion.
    Matrix3D, 3
);

square_matrix!(
    /// A 4x4 matrix.
    ///
    /// These matrices encode every affine transformation in the tracer, acting
    /// on points (`w == 1.0`) and vectors (`w == 0.0`) alike.
    ///
    /// Transformations compose by multiplication, and the right-most matrix is
    /// applied first: for `(A * B) * p`, `B` transforms `p` before `A` does.
    /// The chaining builders (`translate`, `scale`, `rotate_x`, ...) follow
    /// the same rule: `m.translate(..)` is `m * Matrix4D::translation(..)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use whitted::matrix::Matrix4D;
    /// use whitted::tuple::Tuple4D;
    ///
    /// let m = Matrix4D::identity()
    ///     .translate(10.0, 5.0, 7.0)
    ///     .scale(5.0, 5.0, 5.0);
    ///
    /// // scaled first, then translated
    /// assert_eq!(m * Tuple4D::point(1.0, 0.0, 1.0), Tuple4D::point(15.0, 5.0, 12.0));
    /// ```
    Matrix4D, 4
);

cofactor_expansion!(Matrix3D, 3, Matrix2D);
cofactor_expansion!(Matrix4D, 4, Matrix3D);

impl Matrix2D {
    pub fn determinant(&self) -> f64 {
        self[(0, 0)] * self[(1, 1)] - self[(0, 1)] * self[(1, 0)]
    }
}

impl Matrix4D {
    /// Offsets points by `x`, `y` and `z`. Vectors are unaffected.
    pub fn translation(x: f64, y: f64, z: f64) -> Matrix4D {
        let mut m = Self::identity();
        m[(0, 3)] = x;
        m[(1, 3)] = y;
        m[(2, 3)] = z;

        m
    }

    pub fn scaling(x: f64, y: f64, z: f64) -> Matrix4D {
        let mut m = Self::identity();
        m[(0, 0)] = x;
        m[(1, 1)] = y;
        m[(2, 2)] = z;

        m
    }

    /// Rotation of `r` radians about the X axis.
    ///
    /// ```
    /// # use whitted::tuple::Tuple4D;
    /// # use whitted::matrix::Matrix4D;
    /// let m = Matrix4D::rotation_x(std::f64::consts::FRAC_PI_2);
    /// assert_eq!(m * Tuple4D::point(0.0, 1.0, 0.0), Tuple4D::point(0.0, 0.0, 1.0));
    /// ```
    pub fn rotation_x(r: f64) -> Matrix4D {
        let mut m = Self::identity();
        m[(1, 1)] =  r.cos();
        m[(1, 2)] = -r.sin();
        m[(2, 1)] =  r.sin();
        m[(2, 2)] =  r.cos();

        m
    }

    /// Rotation of `r` radians about the Y axis.
    pub fn rotation_y(r: f64) -> Matrix4D {
        let mut m = Self::identity();
        m[(0, 0)] =  r.cos();
        m[(0, 2)] =  r.sin();
        m[(2, 0)] = -r.sin();
        m[(2, 2)] =  r.cos();

        m
    }

    /// Rotation of `r` radians about the Z axis.
    pub fn rotation_z(r: f64) -> Matrix4D {
        let mut m = Self::identity();
        m[(0, 0)] =  r.cos();
        m[(0, 1)] = -r.sin();
        m[(1, 0)] =  r.sin();
        m[(1, 1)] =  r.cos();

        m
    }

    /// Shearing: each parameter moves one coordinate in proportion to
    /// another, e.g. `xy` moves `x` in proportion to `y`.
    ///
    /// ```
    /// # use whitted::tuple::Tuple4D;
    /// # use whitted::matrix::Matrix4D;
    /// let m = Matrix4D::shearing(1.0, 0.0, 0.0, 0.0, 0.0, 0.0);
    /// assert_eq!(m * Tuple4D::point(2.0, 3.0, 4.0), Tuple4D::point(5.0, 3.0, 4.0));
    /// ```
    pub fn shearing(xy: f64, xz: f64, yx: f64, yz: f64, zx: f64, zy: f64)
        -> Matrix4D {
        let mut m = Self::identity();
        m[(0, 1)] = xy;
        m[(0, 2)] = xz;
        m[(1, 0)] = yx;
        m[(1, 2)] = yz;
        m[(2, 0)] = zx;
        m[(2, 1)] = zy;

        m
    }

    /// Orients the world relative to an eye at `from` looking toward `to`.
    ///
    /// The view transform moves the *world*, not the eye. The default
    /// orientation (identity) looks down negative Z with `up` along positive Y.
    pub fn view_transform(from: Tuple4D, to: Tuple4D, up: Tuple4D) -> Matrix4D {
        let forward = (to - from).normalize();
        let left = forward.cross(&up.normalize());
        let true_up = left.cross(&forward);

        let orientation: Matrix4D = [
             left.x,     left.y,     left.z,    0.0,
             true_up.x,  true_up.y,  true_up.z, 0.0,
            -forward.x, -forward.y, -forward.z, 0.0,
             0.0,        0.0,        0.0,       1.0,
        ].into();

        orientation * Matrix4D::translation(-from.x, -from.y, -from.z)
    }

    pub fn translate(self, x: f64, y: f64, z: f64) -> Matrix4D {
        self * Matrix4D::translation(x, y, z)
    }

    pub fn scale(self, x: f64, y: f64, z: f64) -> Matrix4D {
        self * Matrix4D::scaling(x, y, z)
    }

    pub fn rotate_x(self, r: f64) -> Matrix4D {
        self * Matrix4D::rotation_x(r)
    }

    pub fn rotate_y(self, r: f64) -> Matrix4D {
        self * Matrix4D::rotation_y(r)
    }

    pub fn rotate_z(self, r: f64) -> Matrix4D {
        self * Matrix4D::rotation_z(r)
    }

    pub fn shear(self, xy: f64, xz: f64, yx: f64, yz: f64, zx: f64, zy: f64)
        -> Matrix4D {
        self * Matrix4D::shearing(xy, xz, yx, yz, zx, zy)
    }

    /// Transposes a matrix in-place.
    pub fn transpose(&mut self) {
        for r in 0..4 {
            for c in (r + 1)..4 {
                self.data.swap(r * 4 + c, c * 4 + r);
            }
        }
    }

    /// Returns the transpose of a matrix, leaving the original untouched.
    pub fn transposition(&self) -> Matrix4D {
        let mut t = *self;
        t.transpose();

        t
    }

    pub fn is_invertible(&self) -> bool {
        self.determinant() != 0.0
    }

    /// Calculates the inverse through the adjugate (transposed cofactors).
    ///
    /// Fails with `NotInvertibleError` when the determinant is zero.
    pub fn inverse(&self) -> Result<Matrix4D, NotInvertibleError> {
        let det = self.determinant();
        if det == 0.0 {
            return Err(NotInvertibleError);
        }

        let mut inv = Matrix4D::new();
        for r in 0..4 {
            for c in 0..4 {
                inv[(c, r)] = self.cofactor(r, c) / det;
            }
        }

        Ok(inv)
    }
}

/// Matrix product. Not commutative.
///
/// ```
/// # use whitted::matrix::Matrix4D;
/// let m1 = Matrix4D::scaling(2.0, 3.0, 4.0);
/// let m2 = Matrix4D::scaling(4.0, 3.0, 2.0);
/// assert_eq!(m1 * m2, Matrix4D::scaling(8.0, 9.0, 8.0));
/// ```
impl Mul<Matrix4D> for Matrix4D {
    type Output = Matrix4D;

    fn mul(self, other: Matrix4D) -> Matrix4D {
        let mut res = Matrix4D::new();

        for r in 0..4 {
            for c in 0..4 {
                res[(r, c)] = (0..4).map(|k| self[(r, k)] * other[(k, c)]).sum();
            }
        }

        res
    }
}

/// Transforms a tuple, treated as a column on the right.
impl Mul<Tuple4D> for Matrix4D {
    type Output = Tuple4D;

    fn mul(self, t: Tuple4D) -> Tuple4D {
        let row = |r: usize| {
            self[(r, 0)] * t.x
                + self[(r, 1)] * t.y
                + self[(r, 2)] * t.z
                + self[(r, 3)] * t.w
        };

        Tuple4D::tuple(row(0), row(1), row(2), row(3))
    }
}

impl fmt::Display for Matrix4D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for r in 0..4 {
            write!(f, "|")?;
            for c in 0..4 {
                write!(f, " {} |", self[(r, c)])?;
            }

            // no newline after the final row
            if r != 3 {
                writeln!(f)?;
            }
        }

        Ok(())
    }
}

#[test]
fn identity() {
    let i = Matrix4D::identity();
    let a: Matrix4D = [ 0.0, 1.0,  2.0,  4.0,
                        1.0, 2.0,  4.0,  8.0,
                        2.0, 4.0,  8.0, 16.0,
                        4.0, 8.0, 16.0, 32.0, ].into();

    assert_eq!(i * a, a);
    assert_eq!(a * i, a);
    assert_eq!(Matrix3D::identity().determinant(), 1.0);
}

#[test]
fn multiply_by_tuple() {
    let a: Matrix4D = [ 1.0, 2.0, 3.0, 4.0,
                        2.0, 4.0, 4.0, 2.0,
                        8.0, 6.0, 4.0, 1.0,
                        0.0, 0.0, 0.0, 1.0, ].into();

    assert_eq!(a * Tuple4D::tuple(1.0, 2.0, 3.0, 1.0),
        Tuple4D::tuple(18.0, 24.0, 33.0, 1.0));
}

#[test]
fn transpose() {
    let a: Matrix4D = [ 0.0, 9.0, 3.0, 0.0,
                        9.0, 8.0, 0.0, 8.0,
                        1.0, 8.0, 5.0, 3.0,
                        0.0, 0.0, 5.0, 8.0, ].into();

    let t: Matrix4D = [ 0.0, 9.0, 1.0, 0.0,
                        9.0, 8.0, 8.0, 0.0,
                        3.0, 0.0, 5.0, 5.0,
                        0.0, 8.0, 3.0, 8.0, ].into();

    assert_eq!(t, a.transposition());
    assert_eq!(t.transposition(), a);
    assert_eq!(Matrix4D::identity().transposition(), Matrix4D::identity());
}

#[test]
#[should_panic]
fn index_out_of_range() {
    let m = Matrix4D::identity();
    let _ = m[(0, 4)];
}

#[test]
fn mat2_determinant() {
    let a: Matrix2D = [ 1.0, 5.0,
                       -3.0, 2.0 ].into();

    assert_eq!(a.determinant(), 17.0);
}

#[test]
fn submatrices() {
    let a: Matrix3D = [  1.0, 5.0,  0.0,
                        -3.0, 2.0,  7.0,
                         0.0, 6.0, -3.0, ].into();
    let s: Matrix2D = [ -3.0, 2.0,
                         0.0, 6.0 ].into();
    assert_eq!(a.submatrix(0, 2), s);

    let b: Matrix4D = [ -6.0, 1.0,  1.0, 6.0,
                        -8.0, 5.0,  8.0, 6.0,
                        -1.0, 0.0,  8.0, 2.0,
                        -7.0, 1.0, -1.0, 1.0, ].into();
    let t: Matrix3D = [ -6.0,  1.0, 6.0,
                        -8.0,  8.0, 6.0,
                        -7.0, -1.0, 1.0, ].into();
    assert_eq!(b.submatrix(2, 1), t);
}

#[test]
fn mat3_minor_and_cofactor() {
    let a: Matrix3D = [ 3.0,  5.0,  0.0,
                        2.0, -1.0, -7.0,
                        6.0, -1.0,  5.0, ].into();

    assert_eq!(a.minor(0, 0), -12.0);
    assert_eq!(a.cofactor(0, 0), -12.0);
    assert_eq!(a.minor(1, 0), 25.0);
    assert_eq!(a.cofactor(1, 0), -25.0);
}

#[test]
fn mat3_determinant() {
    let a: Matrix3D = [  1.0, 2.0,  6.0,
                        -5.0, 8.0, -4.0,
                         2.0, 6.0,  4.0, ].into();

    assert_eq!(a.cofactor(0, 0), 56.0);
    assert_eq!(a.cofactor(0, 1), 12.0);
    assert_eq!(a.cofactor(0, 2), -46.0);
    assert_eq!(a.determinant(), -196.0);
}

#[test]
fn mat4_determinant() {
    let a: Matrix4D = [ -2.0, -8.0,  3.0,  5.0,
                        -3.0,  1.0,  7.0,  3.0,
                         1.0,  2.0, -9.0,  6.0,
                        -6.0,  7.0,  7.0, -9.0, ].into();

    assert_eq!(a.cofactor(0, 0), 690.0);
    assert_eq!(a.cofactor(0, 1), 447.0);
    assert_eq!(a.cofactor(0, 2), 210.0);
    assert_eq!(a.cofactor(0, 3), 51.0);
    assert_eq!(a.determinant(), -4071.0);
}

#[test]
fn singular_matrix_has_no_inverse() {
    let a: Matrix4D = [ -4.0,  2.0, -2.0, -3.0,
                         9.0,  6.0,  2.0,  6.0,
                         0.0, -5.0,  1.0, -5.0,
                         0.0,  0.0,  0.0,  0.0, ].into();

    assert!(!a.is_invertible());
    assert_eq!(a.inverse(), Err(NotInvertibleError));
    assert_eq!(Matrix4D::scaling(0.0, 1.0, 1.0).inverse(), Err(NotInvertibleError));
}

#[test]
fn mat4_inverse() {
    let a: Matrix4D = [  8.0, -5.0,  9.0,  2.0,
                         7.0,  5.0,  6.0,  1.0,
                        -6.0,  0.0,  9.0,  6.0,
                        -3.0,  0.0, -9.0, -4.0, ].into();

    let i: Matrix4D = [ -0.15385, -0.15385, -0.28205, -0.53846,
                        -0.07692,  0.12308,  0.02564,  0.03077,
                         0.35897,  0.35897,  0.43590,  0.92308,
                        -0.69231, -0.69231, -0.76923, -1.92308, ].into();

    assert_eq!(a.inverse().unwrap(), i);
}

#[test]
fn inverse_undoes_product() {
    let a: Matrix4D = [  3.0, -9.0,  7.0,  3.0,
                         3.0,  8.0,  2.0, -9.0,
                        -4.0,  4.0,  4.0,  1.0,
                        -6.0,  5.0, -1.0,  1.0, ].into();

    let b: Matrix4D = [ 8.0,  2.0, 2.0, 2.0,
                        3.0, -1.0, 7.0, 0.0,
                        7.0,  0.0, 5.0, 4.0,
                        6.0, -2.0, 0.0, 5.0  ].into();

    assert_eq!(a * b * b.inverse().unwrap(), a);

    let p = Tuple4D::point(1.5, -2.0, 7.25);
    assert_eq!(a.inverse().unwrap() * (a * p), p);
}

#[test]
fn translation() {
    let transform = Matrix4D::translation(5.0, -3.0, 2.0);
    let point = Tuple4D::point(-3.0, 4.0, 5.0);
    let vector = Tuple4D::vector(-3.0, 4.0, 5.0);

    assert_eq!(transform * point, Tuple4D::point(2.0, 1.0, 7.0));
    assert_eq!(transform.inverse().unwrap() * point, Tuple4D::point(-8.0, 7.0, 3.0));
    assert_eq!(transform * vector, vector);
}

#[test]
fn scaling() {
    let transform = Matrix4D::scaling(2.0, 3.0, 4.0);
    let vector = Tuple4D::vector(-4.0, 6.0, 8.0);

    assert_eq!(transform * vector, Tuple4D::vector(-8.0, 18.0, 32.0));
    assert_eq!(transform.inverse().unwrap() * vector, Tuple4D::vector(-2.0, 2.0, 2.0));
    assert_eq!(Matrix4D::scaling(-1.0, 1.0, 1.0) * Tuple4D::point(2.0, 3.0, 4.0),
        Tuple4D::point(-2.0, 3.0, 4.0));
}

#[test]
fn rotations() {
    use std::f64::consts::{ FRAC_PI_2, FRAC_PI_4 };
    let h = 2.0f64.sqrt() / 2.0;

    assert_eq!(Matrix4D::rotation_x(FRAC_PI_4) * Tuple4D::point(0.0, 1.0, 0.0),
        Tuple4D::point(0.0, h, h));
    assert_eq!(Matrix4D::rotation_y(FRAC_PI_2) * Tuple4D::point(0.0, 0.0, 1.0),
        Tuple4D::point(1.0, 0.0, 0.0));
    assert_eq!(Matrix4D::rotation_z(FRAC_PI_4) * Tuple4D::point(0.0, 1.0, 0.0),
        Tuple4D::point(-h, h, 0.0));
}

#[test]
fn shearing() {
    let p = Tuple4D::point(2.0, 3.0, 4.0);

    assert_eq!(Matrix4D::shearing(0.0, 1.0, 0.0, 0.0, 0.0, 0.0) * p,
        Tuple4D::point(6.0, 3.0, 4.0));
    assert_eq!(Matrix4D::shearing(0.0, 0.0, 1.0, 0.0, 0.0, 0.0) * p,
        Tuple4D::point(2.0, 5.0, 4.0));
    assert_eq!(Matrix4D::shearing(0.0, 0.0, 0.0, 1.0, 0.0, 0.0) * p,
        Tuple4D::point(2.0, 7.0, 4.0));
    assert_eq!(Matrix4D::shearing(0.0, 0.0, 0.0, 0.0, 1.0, 0.0) * p,
        Tuple4D::point(2.0, 3.0, 6.0));
    assert_eq!(Matrix4D::shearing(0.0, 0.0, 0.0, 0.0, 0.0, 1.0) * p,
        Tuple4D::point(2.0, 3.0, 7.0));
}

#[test]
fn chained_transforms() {
    let a = Matrix4D::rotation_x(std::f64::consts::FRAC_PI_2);
    let b = Matrix4D::scaling(5.0, 5.0, 5.0);
    let c = Matrix4D::translation(10.0, 5.0, 7.0);
    let p = Tuple4D::point(1.0, 0.0, 1.0);

    assert_eq!(c * b * a * p, Tuple4D::point(15.0, 0.0, 7.0));

    // builders chain in the same order as the explicit product
    let built = Matrix4D::identity()
        .translate(10.0, 5.0, 7.0)
        .scale(5.0, 5.0, 5.0)
        .rotate_x(std::f64::consts::FRAC_PI_2);
    assert_eq!(built, c * b * a);
}

#[test]
fn default_view() {
    let from = Tuple4D::point(0.0, 0.0, 0.0);
    let to = Tuple4D::point(0.0, 0.0, -1.0);
    let up = Tuple4D::vector(0.0, 1.0, 0.0);

    assert_eq!(Matrix4D::view_transform(from, to, up), Matrix4D::identity());
}

#[test]
fn positive_z_view() {
    let from = Tuple4D::point(0.0, 0.0, 0.0);
    let to = Tuple4D::point(0.0, 0.0, 1.0);
    let up = Tuple4D::vector(0.0, 1.0, 0.0);

    assert_eq!(Matrix4D::view_transform(from, to, up),
        Matrix4D::scaling(-1.0, 1.0, -1.0));
}

#[test]
fn view_moves_world() {
    let from = Tuple4D::point(0.0, 0.0, 8.0);
    let to = Tuple4D::point(0.0, 0.0, 0.0);
    let up = Tuple4D::vector(0.0, 1.0, 0.0);

    assert_eq!(Matrix4D::view_transform(from, to, up),
        Matrix4D::translation(0.0, 0.0, -8.0));
}

#[test]
fn arbitrary_view() {
    let from = Tuple4D::point(1.0, 3.0, 2.0);
    let to = Tuple4D::point(4.0, -2.0, 8.0);
    let up = Tuple4D::vector(1.0, 1.0, 0.0);

    let a: Matrix4D = [ -0.50709, 0.50709,  0.67612, -2.36643,
                         0.76772, 0.60609,  0.12122, -2.82843,
                        -0.35857, 0.59761, -0.71714,  0.00000,
                         0.00000, 0.00000,  0.00000,  1.00000, ].into();

    assert_eq!(Matrix4D::view_transform(from, to, up), a);
}
