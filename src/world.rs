use log::{ debug, trace };

use crate::color::Color;
use crate::intersect::{ Intersections, IntersectionComputation };
use crate::light::{ PointLight, Material, lighting };
use crate::matrix::Matrix4D;
use crate::ray::Ray4D;
use crate::shape::{ Shape, ShapeArena, ShapeId };
use crate::tuple::Tuple4D;

/// A world with objects and lights.
///
/// Every shape lives in `shapes`. Only the top-level shapes listed in
/// `objects` are intersected directly; shapes inside groups are reached
/// through their group.
///
/// Worlds collect all objects as well as light for rendering. Most logic is
/// performed within worlds for the ray tracer.
#[derive(Debug)]
pub struct World {
    pub shapes: ShapeArena,
    pub objects: Vec<ShapeId>,
    pub lights: Vec<PointLight>,
}

/// The default world: two concentric spheres lit from the upper left.
impl Default for World {
    fn default() -> World {
        let mut w = World::empty();
        w.add_light(PointLight::new(
            Color::white(),
            Tuple4D::point(-10.0, 10.0, -10.0)
        ));

        w.add_object(Shape::sphere().with_material(Material {
            color: Color::rgb(0.8, 1.0, 0.6),
            diffuse: 0.7,
            specular: 0.2,
            ..Default::default()
        }));

        let mut inner = Shape::sphere();
        inner.set_transform(Matrix4D::scaling(0.5, 0.5, 0.5))
            .expect("uniform scaling is invertible");
        w.add_object(inner);

        w
    }
}

impl World {
    /// Creates a default world with two spheres.
    pub fn new() -> World {
        Default::default()
    }

    /// Creates an empty world with no objects and no lights.
    pub fn empty() -> World {
        World {
            shapes: ShapeArena::new(),
            objects: Vec::new(),
            lights: Vec::new(),
        }
    }

    /// Adds a shape to the arena and registers it as a top-level object.
    pub fn add_object(&mut self, shape: Shape) -> ShapeId {
        let id = self.shapes.add(shape);
        self.register_object(id);

        id
    }

    /// Registers a shape already in the arena (usually a group) as a
    /// top-level object.
    pub fn register_object(&mut self, id: ShapeId) {
        debug_assert!(self.shapes[id].parent().is_none(),
            "only root shapes can be top-level objects");

        debug!("registered top-level object {:?}", id);
        self.objects.push(id);
    }

    pub fn add_light(&mut self, light: PointLight) {
        debug!("added light at {}", light.position);
        self.lights.push(light);
    }

    /// Intersects a ray against all objects in a world, sorted by `t`.
    pub fn intersect(&self, r: &Ray4D) -> Intersections {
        Intersections::aggregate(
            self.objects.iter().map(|id| self.shapes.intersect(*id, r))
        )
    }

    /// Determines whether a point is shadowed from the first light.
    ///
    /// A world without lights shadows nothing.
    pub fn is_shadowed(&self, p: Tuple4D) -> bool {
        match self.lights.first() {
            Some(light) => self.is_shadowed_from(light, p),
            None => false,
        }
    }

    /// Determines whether a shadow-casting object lies between a point and a
    /// light.
    pub fn is_shadowed_from(&self, light: &PointLight, p: Tuple4D) -> bool {
        self.shapes.stats().record_shadow_ray();

        let v = light.position - p;
        let distance = v.magnitude();
        let r = Ray4D::new(p, v.normalize());

        // intersections come back sorted, so the first blocker is the nearest
        self.intersect(&r).intersections.iter()
            .filter(|i| i.t.is_finite() && i.t >= 0.0)
            .find(|i| self.shapes[i.what].casts_shadow)
            .map_or(false, |i| i.t < distance)
    }

    /// Calculates the color for a hit, based on shadows, light, reflection and
    /// refraction.
    ///
    /// Each light contributes its own Phong term with its own shadow test.
    /// Reflection and refraction are added once per hit. On a surface that is
    /// both reflective and transparent, the two are weighted by the Fresnel
    /// reflectance.
    pub fn shade_hit(&self, comps: &IntersectionComputation, remaining: usize)
        -> Color {
        let surface: Color = self.lights.iter()
            .map(|light| lighting(
                &self.shapes, comps.obj, light,
                comps.over_point, comps.eyev, comps.normalv,
                self.is_shadowed_from(light, comps.over_point)
            ))
            .sum();

        let reflected = self.reflected_color(comps, remaining);
        let refracted = self.refracted_color(comps, remaining);

        let m = &self.shapes[comps.obj].material;
        if m.reflective > 0.0 && m.transparency > 0.0 {
            surface
                + reflected * comps.reflectance
                + refracted * (1.0 - comps.reflectance)
        } else {
            surface + reflected + refracted
        }
    }

    /// Calculates the color seen along the reflection of a hit.
    pub fn reflected_color(&self, comps: &IntersectionComputation,
        remaining: usize) -> Color {
        let reflective = self.shapes[comps.obj].material.reflective;
        if reflective == 0.0 {
            return Color::black();
        }

        if remaining == 0 {
            trace!("reflection stopped at recursion floor");
            return Color::black();
        }

        let reflect_ray = Ray4D::new(comps.over_point, comps.reflectv);
        self.color_at(&reflect_ray, remaining - 1) * reflective
    }

    /// Calculates the color seen through a transparent hit.
    pub fn refracted_color(&self, comps: &IntersectionComputation,
        remaining: usize) -> Color {
        let transparency = self.shapes[comps.obj].material.transparency;
        if transparency == 0.0 {
            return Color::black();
        }

        if remaining == 0 {
            trace!("refraction stopped at recursion floor");
            return Color::black();
        }

        // Snell's law, with the angle of incidence from the eye vector
        let n_ratio = comps.n1 / comps.n2;
        let cos_i = comps.eyev.dot(&comps.normalv);
        let sin2_t = n_ratio.powi(2) * (1.0 - cos_i.powi(2));
        if sin2_t > 1.0 {
            trace!("total internal reflection at {}", comps.point);
            return Color::black();
        }

        let cos_t = (1.0 - sin2_t).sqrt();
        let direction = comps.normalv * (n_ratio * cos_i - cos_t)
            - comps.eyev * n_ratio;

        let refract_ray = Ray4D::new(comps.under_point, direction);
        self.color_at(&refract_ray, remaining - 1) * transparency
    }

    /// Determines a color based on the intersection of a ray and the objects.
    ///
    /// `remaining` bounds how many more reflection or refraction bounces may
    /// follow. Misses are black.
    pub fn color_at(&self, r: &Ray4D, remaining: usize) -> Color {
        self.shapes.stats().record_ray();

        let is = self.intersect(r);
        match is.hit() {
            None => Color::black(),
            Some(i) => {
                let comps = IntersectionComputation::new(
                    &self.shapes, r, &i, Some(&is)
                );
                self.shade_hit(&comps, remaining)
            },
        }
    }
}

#[cfg(test)]
use crate::consts::MAX_DEPTH;
#[cfg(test)]
use crate::intersect::Intersection;

#[cfg(test)]
fn assert_color_near(actual: Color, expected: Color) {
    let near = |a: f64, b: f64| (a - b).abs() < 5e-4;
    assert!(
        near(actual.r, expected.r)
            && near(actual.g, expected.g)
            && near(actual.b, expected.b),
        "{:?} is not near {:?}", actual, expected
    );
}

/// A ray looking down at 45 degrees, from above the origin towards +Z.
#[cfg(test)]
fn downward_ray() -> Ray4D {
    let h = 2.0f64.sqrt() / 2.0;
    Ray4D::new(Tuple4D::point(0.0, 0.0, -3.0), Tuple4D::vector(0.0, -h, h))
}

#[test]
fn default_world() {
    let w = World::default();

    assert_eq!(w.objects.len(), 2);
    assert_eq!(w.lights,
        vec![PointLight::new(Color::white(), Tuple4D::point(-10.0, 10.0, -10.0))]);
    assert_eq!(w.shapes[w.objects[0]].material.color, Color::rgb(0.8, 1.0, 0.6));
    assert_eq!(*w.shapes[w.objects[1]].transform(),
        Matrix4D::scaling(0.5, 0.5, 0.5));
}

#[test]
fn intersect_default_world_with_ray() {
    let w = World::default();
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0),
    );

    let ts: Vec<f64> = w.intersect(&r).intersections.iter().map(|i| i.t).collect();
    assert_eq!(ts.len(), 4);
    for (t, expected) in ts.iter().zip([4.0, 4.5, 5.5, 6.0].iter()) {
        assert!(crate::feq(*t, *expected));
    }
}

#[test]
fn shade_intersection_from_outside() {
    let w = World::default();
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let i = Intersection::new(4.0, w.objects[0]);

    let comps = IntersectionComputation::new(&w.shapes, &r, &i, None);
    assert_color_near(w.shade_hit(&comps, MAX_DEPTH),
        Color::rgb(0.38066, 0.47583, 0.2855));
}

#[test]
fn shade_intersection_from_inside() {
    let mut w = World::default();
    w.lights = vec![
        PointLight::new(Color::white(), Tuple4D::point(0.0, 0.25, 0.0))
    ];
    let r = Ray4D::new(Tuple4D::origin(), Tuple4D::vector(0.0, 0.0, 1.0));
    let i = Intersection::new(0.5, w.objects[1]);

    let comps = IntersectionComputation::new(&w.shapes, &r, &i, None);
    assert_color_near(w.shade_hit(&comps, MAX_DEPTH),
        Color::rgb(0.90498, 0.90498, 0.90498));
}

#[test]
fn every_light_contributes() {
    let mut w = World::default();
    let light = w.lights[0];
    w.add_light(light);
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );

    assert_color_near(w.color_at(&r, MAX_DEPTH),
        Color::rgb(0.38066, 0.47583, 0.2855) * 2.0);
}

#[test]
fn shade_hit_given_intersection_in_shadow() {
    let mut w = World::empty();
    w.add_light(PointLight::new(Color::white(), Tuple4D::point(0.0, 0.0, -10.0)));
    w.add_object(Shape::sphere());
    let s2 = w.add_object(
        Shape::sphere()
            .with_transform(Matrix4D::translation(0.0, 0.0, 10.0))
            .unwrap()
    );

    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let i = Intersection::new(4.0, s2);
    let comps = IntersectionComputation::new(&w.shapes, &r, &i, None);

    assert_eq!(w.shade_hit(&comps, MAX_DEPTH), Color::rgb(0.1, 0.1, 0.1));
}

#[test]
fn color_when_ray_misses() {
    let w = World::default();
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 1.0, 0.0)
    );

    assert_eq!(w.color_at(&r, MAX_DEPTH), Color::black());
}

#[test]
fn color_when_ray_hits() {
    let w = World::default();
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );

    assert_color_near(w.color_at(&r, MAX_DEPTH),
        Color::rgb(0.38066, 0.47583, 0.2855));
    assert_eq!(w.shapes.stats().rays(), 1);
}

#[test]
fn color_with_intersection_behind_ray() {
    let mut w = World::default();
    let (outer, inner) = (w.objects[0], w.objects[1]);
    w.shapes.material_mut(outer).ambient = 1.0;
    w.shapes.material_mut(inner).ambient = 1.0;

    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, 0.75),
        Tuple4D::vector(0.0, 0.0, -1.0)
    );

    assert_eq!(w.color_at(&r, MAX_DEPTH), w.shapes[inner].material.color);
}

#[test]
fn shadows_in_the_default_world() {
    let w = World::default();

    // nothing collinear with point and light
    assert!(!w.is_shadowed(Tuple4D::point(0.0, 10.0, 0.0)));
    // object between point and light
    assert!(w.is_shadowed(Tuple4D::point(10.0, -10.0, 10.0)));
    // object behind the light
    assert!(!w.is_shadowed(Tuple4D::point(-20.0, 20.0, -20.0)));
    // object behind the point
    assert!(!w.is_shadowed(Tuple4D::point(-2.0, 2.0, -2.0)));

    assert_eq!(w.shapes.stats().shadow_rays(), 4);
}

#[test]
fn no_lights_means_no_shadows() {
    let mut w = World::default();
    w.lights.clear();

    assert!(!w.is_shadowed(Tuple4D::point(10.0, -10.0, 10.0)));
}

#[test]
fn shapes_can_opt_out_of_casting_shadows() {
    let mut w = World::empty();
    w.add_light(PointLight::new(Color::white(), Tuple4D::point(0.0, 0.0, -10.0)));
    let s = w.add_object(Shape::sphere());
    let behind = Tuple4D::point(0.0, 0.0, 10.0);

    assert!(w.is_shadowed(behind));

    w.shapes.set_casts_shadow(s, false);
    assert!(!w.is_shadowed(behind));
}

#[test]
fn groups_can_opt_out_of_casting_shadows() {
    let mut w = World::empty();
    w.add_light(PointLight::new(Color::white(), Tuple4D::point(0.0, 0.0, -10.0)));
    let g = w.shapes.add(Shape::group());
    let s = w.shapes.add(Shape::sphere());
    w.shapes.add_child(g, s);
    w.register_object(g);
    let behind = Tuple4D::point(0.0, 0.0, 10.0);

    assert!(w.is_shadowed(behind));

    w.shapes.set_casts_shadow(g, false);
    assert!(!w.shapes[s].casts_shadow);
    assert!(!w.is_shadowed(behind));
}

#[test]
fn reflected_color_for_nonreflective_material() {
    let mut w = World::default();
    let inner = w.objects[1];
    w.shapes.material_mut(inner).ambient = 1.0;

    let r = Ray4D::new(Tuple4D::origin(), Tuple4D::vector(0.0, 0.0, 1.0));
    let i = Intersection::new(1.0, inner);
    let comps = IntersectionComputation::new(&w.shapes, &r, &i, None);

    assert_eq!(w.reflected_color(&comps, MAX_DEPTH), Color::black());
}

#[cfg(test)]
fn world_with_reflective_floor() -> (World, ShapeId) {
    let mut w = World::default();
    let mut plane = Shape::plane()
        .with_transform(Matrix4D::translation(0.0, -1.0, 0.0))
        .unwrap();
    plane.material.reflective = 0.5;
    let p = w.add_object(plane);

    (w, p)
}

#[test]
fn reflected_color_for_reflective_material() {
    let (w, p) = world_with_reflective_floor();
    let r = downward_ray();
    let i = Intersection::new(2.0f64.sqrt(), p);
    let comps = IntersectionComputation::new(&w.shapes, &r, &i, None);

    assert_color_near(w.reflected_color(&comps, MAX_DEPTH),
        Color::rgb(0.19032, 0.2379, 0.14274));
}

#[test]
fn shade_hit_with_reflective_material() {
    let (w, p) = world_with_reflective_floor();
    let r = downward_ray();
    let i = Intersection::new(2.0f64.sqrt(), p);
    let comps = IntersectionComputation::new(&w.shapes, &r, &i, None);

    assert_color_near(w.shade_hit(&comps, MAX_DEPTH),
        Color::rgb(0.87677, 0.92436, 0.82918));
}

#[test]
fn reflected_color_at_recursion_floor() {
    let (w, p) = world_with_reflective_floor();
    let r = downward_ray();
    let i = Intersection::new(2.0f64.sqrt(), p);
    let comps = IntersectionComputation::new(&w.shapes, &r, &i, None);

    assert_eq!(w.reflected_color(&comps, 0), Color::black());
}

#[test]
fn mutually_reflective_surfaces_terminate() {
    let mut w = World::empty();
    w.add_light(PointLight::new(Color::white(), Tuple4D::origin()));

    for y in [-1.0, 1.0] {
        let mut plane = Shape::plane()
            .with_transform(Matrix4D::translation(0.0, y, 0.0))
            .unwrap();
        plane.material.reflective = 1.0;
        w.add_object(plane);
    }

    let r = Ray4D::new(Tuple4D::origin(), Tuple4D::vector(0.0, 1.0, 0.0));
    let c = w.color_at(&r, MAX_DEPTH);

    assert!(c.r.is_finite() && c.g.is_finite() && c.b.is_finite());
    assert_eq!(w.shapes.stats().rays() as usize, MAX_DEPTH + 1);
}

#[test]
fn refracted_color_with_opaque_surface() {
    let w = World::default();
    let s = w.objects[0];
    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let xs: Intersections = vec![
        Intersection::new(4.0, s),
        Intersection::new(6.0, s),
    ].into();
    let comps = IntersectionComputation::new(
        &w.shapes, &r, &xs.intersections[0], Some(&xs)
    );

    assert_eq!(w.refracted_color(&comps, MAX_DEPTH), Color::black());
}

#[test]
fn refracted_color_at_recursion_floor() {
    let mut w = World::default();
    let s = w.objects[0];
    w.shapes.material_mut(s).transparency = 1.0;
    w.shapes.material_mut(s).refractive_index = 1.5;

    let r = Ray4D::new(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::vector(0.0, 0.0, 1.0)
    );
    let xs: Intersections = vec![
        Intersection::new(4.0, s),
        Intersection::new(6.0, s),
    ].into();
    let comps = IntersectionComputation::new(
        &w.shapes, &r, &xs.intersections[0], Some(&xs)
    );

    assert_eq!(w.refracted_color(&comps, 0), Color::black());
}

#[test]
fn refracted_color_under_total_internal_reflection() {
    let mut w = World::default();
    let s = w.objects[0];
    w.shapes.material_mut(s).transparency = 1.0;
    w.shapes.material_mut(s).refractive_index = 1.5;

    let h = 2.0f64.sqrt() / 2.0;
    let r = Ray4D::new(Tuple4D::point(0.0, 0.0, h), Tuple4D::vector(0.0, 1.0, 0.0));
    let xs: Intersections = vec![
        Intersection::new(-h, s),
        Intersection::new(h, s),
    ].into();
    // inside the sphere, so look at the second intersection
    let comps = IntersectionComputation::new(
        &w.shapes, &r, &xs.intersections[1], Some(&xs)
    );

    assert_eq!(w.refracted_color(&comps, MAX_DEPTH), Color::black());
}

#[cfg(test)]
fn world_with_glass_floor(reflective: f64) -> (World, ShapeId) {
    let mut w = World::default();

    let mut floor = Shape::plane()
        .with_transform(Matrix4D::translation(0.0, -1.0, 0.0))
        .unwrap();
    floor.material.transparency = 0.5;
    floor.material.refractive_index = 1.5;
    floor.material.reflective = reflective;
    let floor = w.add_object(floor);

    let mut ball = Shape::sphere()
        .with_transform(Matrix4D::translation(0.0, -3.5, -0.5))
        .unwrap();
    ball.material.color = Color::red();
    ball.material.ambient = 0.5;
    w.add_object(ball);

    (w, floor)
}

#[test]
fn shade_hit_with_transparent_material() {
    let (w, floor) = world_with_glass_floor(0.0);
    let r = downward_ray();
    let xs: Intersections = vec![Intersection::new(2.0f64.sqrt(), floor)].into();
    let comps = IntersectionComputation::new(
        &w.shapes, &r, &xs.intersections[0], Some(&xs)
    );

    assert_color_near(w.shade_hit(&comps, MAX_DEPTH),
        Color::rgb(0.93642, 0.68642, 0.68642));
}

#[test]
fn shade_hit_with_reflective_transparent_material() {
    let (w, floor) = world_with_glass_floor(0.5);
    let r = downward_ray();
    let xs: Intersections = vec![Intersection::new(2.0f64.sqrt(), floor)].into();
    let comps = IntersectionComputation::new(
        &w.shapes, &r, &xs.intersections[0], Some(&xs)
    );

    assert_color_near(w.shade_hit(&comps, MAX_DEPTH),
        Color::rgb(0.93391, 0.69643, 0.69243));
}
