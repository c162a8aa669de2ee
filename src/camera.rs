use log::{ debug, info };

use crate::canvas::Canvas;
use crate::matrix::{ Matrix4D, NotInvertibleError };
use crate::ray::Ray4D;
use crate::tuple::Tuple4D;
use crate::world::World;

/// A camera record for generating a canvas.
///
/// This record gives a "frame" of the world. Based on camera parameters,
/// different perspectives can be produced. The canvas sits one unit in front
/// of the eye; the camera transform orients the world relative to the eye.
#[derive(Clone, Debug, PartialEq)]
pub struct Camera {
    /// The horizontal size of the resultant canvas.
    pub hsize: usize,

    /// The vertical size of the resultant canvas.
    pub vsize: usize,

    half_width: f64,
    half_height: f64,
    pixel_size: f64,

    /// The angle describing "how much" the camera can see.
    field_of_view: f64,

    /// A matrix describing how the world should be oriented relative to the
    /// camera (typically a view transformation).
    transform: Matrix4D,
    inverse: Matrix4D,
}

impl Camera {
    pub fn new(hsize: usize, vsize: usize, field_of_view: f64) -> Camera {
        let half_view = (field_of_view / 2.0).tan();
        let aspect = (hsize as f64) / (vsize as f64);

        let (half_width, half_height) = if aspect >= 1.0 {
            (half_view, half_view / aspect)
        } else {
            (half_view * aspect, half_view)
        };

        let pixel_size = half_width * 2.0 / (hsize as f64);
        Camera {
            hsize,
            vsize,
            half_width,
            half_height,
            pixel_size,
            field_of_view,
            transform: Matrix4D::identity(),
            inverse: Matrix4D::identity(),
        }
    }

    pub fn field_of_view(&self) -> f64 {
        self.field_of_view
    }

    /// The width (and height) of a single pixel on the canvas, in world units.
    pub fn pixel_size(&self) -> f64 {
        self.pixel_size
    }

    pub fn transform(&self) -> &Matrix4D {
        &self.transform
    }

    /// Sets the view transform, caching its inverse.
    pub fn set_transform(&mut self, transform: Matrix4D)
        -> Result<(), NotInvertibleError> {
        self.inverse = transform.inverse()?;
        self.transform = transform;

        Ok(())
    }

    pub fn with_transform(mut self, transform: Matrix4D)
        -> Result<Camera, NotInvertibleError> {
        self.set_transform(transform)?;
        Ok(self)
    }

    /// Creates a ray from the camera through the center of pixel `(px, py)`.
    pub fn ray_for_pixel(&self, px: usize, py: usize) -> Ray4D {
        // Offsets from the edge of the canvas to the pixel's center
        let xoffset = (px as f64 + 0.5) * self.pixel_size;
        let yoffset = (py as f64 + 0.5) * self.pixel_size;

        // The untransformed coordinates of the pixel in world space. The
        // camera looks toward -Z, so +X is to the left.
        let world_x = self.half_width - xoffset;
        let world_y = self.half_height - yoffset;

        let pixel = self.inverse * Tuple4D::point(world_x, world_y, -1.0);
        let origin = self.inverse * Tuple4D::origin();
        let direction = (pixel - origin).normalize();

        Ray4D::new(origin, direction)
    }

    /// Renders a world, row by row, allowing `depth` reflection or refraction
    /// bounces per camera ray.
    pub fn render(&self, w: &World, depth: usize) -> Canvas {
        info!("rendering {}x{} image, recursion depth {}",
            self.hsize, self.vsize, depth);
        let mut image = Canvas::new(self.hsize, self.vsize);

        let step = (self.vsize / 10).max(1);
        for y in 0..self.vsize {
            for x in 0..self.hsize {
                let ray = self.ray_for_pixel(x, y);
                image.write_pixel(x, y, &w.color_at(&ray, depth));
            }

            if (y + 1) % step == 0 {
                debug!("rendered {}/{} rows", y + 1, self.vsize);
            }
        }

        info!("finished rendering");
        image
    }
}

#[cfg(test)]
use std::f64::consts::PI;

#[test]
fn pixel_size_for_horizontal_canvas() {
    let c = Camera::new(200, 125, PI / 2.0);
    assert!(crate::feq(c.pixel_size(), 0.01));
}

#[test]
fn pixel_size_for_vertical_canvas() {
    let c = Camera::new(125, 200, PI / 2.0);
    assert!(crate::feq(c.pixel_size(), 0.01));
}

#[test]
fn ray_through_center() {
    let c = Camera::new(201, 101, PI / 2.0);
    let r = c.ray_for_pixel(100, 50);

    assert_eq!(r.origin, Tuple4D::origin());
    assert_eq!(r.direction, Tuple4D::vector(0.0, 0.0, -1.0));
}

#[test]
fn ray_through_corner() {
    let c = Camera::new(201, 101, PI / 2.0);
    let r = c.ray_for_pixel(0, 0);

    assert_eq!(r.origin, Tuple4D::origin());
    assert!((r.direction - Tuple4D::vector(0.66519, 0.33259, -0.66851))
        .magnitude() < 1e-4);
}

#[test]
fn ray_when_camera_transformed() {
    let c = Camera::new(201, 101, PI / 2.0)
        .with_transform(
            Matrix4D::rotation_y(PI / 4.0) * Matrix4D::translation(0.0, -2.0, 5.0)
        )
        .unwrap();
    let r = c.ray_for_pixel(100, 50);
    let h = 2.0f64.sqrt() / 2.0;

    assert_eq!(r.origin, Tuple4D::point(0.0, 2.0, -5.0));
    assert_eq!(r.direction, Tuple4D::vector(h, 0.0, -h));
}

#[test]
fn singular_camera_transform_is_rejected() {
    let mut c = Camera::new(10, 10, PI / 2.0);

    assert!(c.set_transform(Matrix4D::new()).is_err());
    assert_eq!(*c.transform(), Matrix4D::identity());
}

#[test]
fn render_world_with_camera() {
    let w = World::default();
    let from = Tuple4D::point(0.0, 0.0, -5.0);
    let to = Tuple4D::origin();
    let up = Tuple4D::vector(0.0, 1.0, 0.0);

    let c = Camera::new(11, 11, PI / 2.0)
        .with_transform(Matrix4D::view_transform(from, to, up))
        .unwrap();
    let image = c.render(&w, crate::consts::MAX_DEPTH);
    let pixel = image.read_pixel(5, 5).unwrap();

    assert!((pixel.r - 0.38066).abs() < 1e-4);
    assert!((pixel.g - 0.47583).abs() < 1e-4);
    assert!((pixel.b - 0.2855).abs() < 1e-4);
}
