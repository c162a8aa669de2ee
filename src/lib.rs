pub mod consts;
pub mod error;
pub mod stats;

pub mod tuple;
pub mod matrix;
pub mod ray;

pub mod color;
pub mod pattern;
pub mod light;

pub mod geometry;
pub mod shape;
pub mod intersect;
pub mod world;

pub mod camera;
pub mod canvas;

pub mod obj;
pub mod scene;

pub use error::{ Error, Result };

use consts::EPSILON;

/// Compares two floats within `EPSILON`.
///
/// ```
/// use whitted::feq;
///
/// assert!(feq(1.0, 1.000001));
/// assert!(!feq(1.0, 1.0001));
/// ```
pub fn feq(left: f64, right: f64) -> bool {
    (left - right).abs() < EPSILON
}
