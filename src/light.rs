use crate::color::Color;
use crate::pattern::Pattern;
use crate::shape::{ ShapeArena, ShapeId };
use crate::tuple::Tuple4D;

/// A point light.
///
/// A very simple light source. Provides a color and a position where light is
/// produced from.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PointLight {
    pub intensity: Color,
    pub position: Tuple4D,
}

impl PointLight {
    /// Creates a point light.
    ///
    /// If `position` isn't a point, it is converted to a point automatically.
    pub fn new(intensity: Color, mut position: Tuple4D) -> PointLight {
        if !position.is_point() {
            position.w = 1.0;
        }

        PointLight { intensity, position }
    }
}

/// A material record.
///
/// Materials use attributes from the Phong reflection model; ambient, diffuse,
/// specular and shininess. Reflection and refraction are handled by the world
/// during shading, using `reflective`, `transparency` and `refractive_index`.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    /// Surface color, used when there is no pattern.
    pub color: Color,
    pub pattern: Option<Pattern>,

    pub ambient: f64,
    pub diffuse: f64,
    pub specular: f64,
    pub shininess: f64,

    pub reflective: f64,
    pub refractive_index: f64,
    pub transparency: f64,
}

impl Default for Material {
    fn default() -> Material {
        Material {
            color: Color::white(),
            pattern: None,

            ambient: 0.1,
            diffuse: 0.9,
            specular: 0.9,
            shininess: 200.0,

            reflective: 0.0,
            refractive_index: 1.0,
            transparency: 0.0,
        }
    }
}

impl Material {
    /// The unlit surface color at a world-space point on shape `obj`.
    pub fn color_at(&self, shapes: &ShapeArena, obj: ShapeId, point: Tuple4D)
        -> Color {
        match self.pattern {
            Some(ref pat) => pat.pattern_at_shape(shapes, obj, point),
            None => self.color,
        }
    }
}

/// Calculate the lighting of a pixel in an environment.
///
/// Effectively, this function takes the material of shape `obj`, a single
/// light, a point, the eye vector and the normal vector, and calculates how
/// the light looks from the eye. Position is irrelevant, bar the angle around
/// `point`.
///
/// If this point is in a shadow (parameter `in_shadow`), only ambient light is
/// used.
///
/// # Examples
///
/// ```
/// use whitted::color::Color;
/// use whitted::light::{ lighting, PointLight };
/// use whitted::shape::{ Shape, ShapeArena };
/// use whitted::tuple::Tuple4D;
///
/// let mut shapes = ShapeArena::new();
/// let s = shapes.add(Shape::sphere());
/// let light = PointLight::new(Color::white(), Tuple4D::point(0.0, 0.0, -10.0));
/// let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
/// let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
///
/// let lit = lighting(&shapes, s, &light, Tuple4D::origin(), eyev, normalv, false);
/// assert_eq!(lit, Color::rgb(1.9, 1.9, 1.9));
///
/// let shadowed = lighting(&shapes, s, &light, Tuple4D::origin(), eyev, normalv, true);
/// assert_eq!(shadowed, Color::rgb(0.1, 0.1, 0.1));
/// ```
pub fn lighting(shapes: &ShapeArena, obj: ShapeId, light: &PointLight,
    point: Tuple4D, eyev: Tuple4D, normalv: Tuple4D, in_shadow: bool) -> Color {
    let m = &shapes[obj].material;

    // Combine surface color with light's color
    let effective_color = m.color_at(shapes, obj, point) * light.intensity;
    let ambient = effective_color * m.ambient;

    // If the point is in a shadow, only calculate ambient light
    if in_shadow {
        return ambient;
    }

    // For the side of the surface with no light, use only ambient light
    let lightv = (light.position - point).normalize();
    let light_dot_normal = lightv.dot(&normalv);
    if light_dot_normal < 0.0 {
        return ambient;
    }

    let diffuse = effective_color * m.diffuse * light_dot_normal;

    let reflectv = (-lightv).reflect(&normalv);
    let reflect_dot_eye = reflectv.dot(&eyev);
    let specular = if reflect_dot_eye <= 0.0 {
        Color::black()
    } else {
        let factor = reflect_dot_eye.powf(m.shininess);
        light.intensity * m.specular * factor
    };

    ambient + diffuse + specular
}

#[cfg(test)]
use crate::shape::Shape;

/// A sphere with the default material, and a normal facing -Z at the origin.
#[cfg(test)]
fn lit_sphere() -> (ShapeArena, ShapeId, Tuple4D) {
    let mut shapes = ShapeArena::new();
    let s = shapes.add(Shape::sphere());

    (shapes, s, Tuple4D::vector(0.0, 0.0, -1.0))
}

#[cfg(test)]
fn assert_gray(c: Color, v: f64) {
    let near = |x: f64| (x - v).abs() < 1e-4;
    assert!(near(c.r) && near(c.g) && near(c.b), "{:?} is not gray {}", c, v);
}

#[test]
fn eye_between_light_and_surface() {
    let (shapes, s, normalv) = lit_sphere();
    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = PointLight::new(Color::white(), Tuple4D::point(0.0, 0.0, -10.0));

    let res = lighting(&shapes, s, &light, Tuple4D::origin(), eyev, normalv, false);
    assert_eq!(res, Color::rgb(1.9, 1.9, 1.9));
}

#[test]
fn eye_between_light_and_surface_offset_45() {
    let (shapes, s, normalv) = lit_sphere();
    let h = 2.0f64.sqrt() / 2.0;
    let eyev = Tuple4D::vector(0.0, h, -h);
    let light = PointLight::new(Color::white(), Tuple4D::point(0.0, 0.0, -10.0));

    let res = lighting(&shapes, s, &light, Tuple4D::origin(), eyev, normalv, false);
    assert_eq!(res, Color::white());
}

#[test]
fn eye_opposite_from_surface_offset_45() {
    let (shapes, s, normalv) = lit_sphere();
    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = PointLight::new(Color::white(), Tuple4D::point(0.0, 10.0, -10.0));

    let res = lighting(&shapes, s, &light, Tuple4D::origin(), eyev, normalv, false);
    assert_gray(res, 0.7364);
}

#[test]
fn eye_opposite_from_surface_in_reflection() {
    let (shapes, s, normalv) = lit_sphere();
    let h = 2.0f64.sqrt() / 2.0;
    let eyev = Tuple4D::vector(0.0, -h, -h);
    let light = PointLight::new(Color::white(), Tuple4D::point(0.0, 10.0, -10.0));

    let res = lighting(&shapes, s, &light, Tuple4D::origin(), eyev, normalv, false);
    assert_gray(res, 1.6364);
}

#[test]
fn eye_across_surface_from_light() {
    let (shapes, s, normalv) = lit_sphere();
    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = PointLight::new(Color::white(), Tuple4D::point(0.0, 0.0, 10.0));

    let res = lighting(&shapes, s, &light, Tuple4D::origin(), eyev, normalv, false);
    assert_eq!(res, Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn surface_in_shadow_keeps_ambient() {
    let (shapes, s, normalv) = lit_sphere();
    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = PointLight::new(Color::white(), Tuple4D::point(0.0, 0.0, -10.0));

    let res = lighting(&shapes, s, &light, Tuple4D::origin(), eyev, normalv, true);
    assert_eq!(res, Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn lighting_with_stripe_pattern() {
    let mut shapes = ShapeArena::new();
    let s = shapes.add(Shape::sphere().with_material(Material {
        color: Color::rgb(0.5, 0.5, 0.5),
        pattern: Some(Pattern::stripe(Color::white(), Color::black())),

        // only ambient light, so the pattern color comes through unchanged
        ambient: 1.0,
        diffuse: 0.0,
        specular: 0.0,

        ..Default::default()
    }));

    let eyev = Tuple4D::vector(0.0, 0.0, -1.0);
    let normalv = Tuple4D::vector(0.0, 0.0, -1.0);
    let light = PointLight::new(Color::white(), Tuple4D::point(0.0, 0.0, -10.0));

    assert_eq!(
        lighting(&shapes, s, &light, Tuple4D::point(0.9, 0.0, 0.0),
            eyev, normalv, false),
        Color::white()
    );
    assert_eq!(
        lighting(&shapes, s, &light, Tuple4D::point(1.1, 0.0, 0.0),
            eyev, normalv, false),
        Color::black()
    );
}

#[test]
fn light_positions_become_points() {
    let light = PointLight::new(Color::white(), Tuple4D::vector(1.0, 2.0, 3.0));

    assert_eq!(light.position, Tuple4D::point(1.0, 2.0, 3.0));
}
