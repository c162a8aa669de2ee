use crate::color::Color;
use crate::matrix::{ Matrix4D, NotInvertibleError };
use crate::shape::{ ShapeArena, ShapeId };
use crate::tuple::Tuple4D;

#[derive(Clone, Debug, PartialEq)]
pub enum PatternType {
    /// A single color everywhere.
    Constant(Color),

    /// Alternates between two colors with each unit of X.
    Stripe(Color, Color),

    /// Concentric rings in the XZ plane, alternating with each unit of radius.
    Ring(Color, Color),

    /// Fades from the first to the second color across each unit of X.
    Gradient(Color, Color),

    /// Fades from the first to the second color across each unit of distance
    /// from the Y axis.
    RadialGradient(Color, Color),

    /// A 3D checkerboard of unit cubes.
    Checker(Color, Color),

    /// Mixes two patterns, weighting the second by the given fraction.
    Blend(Box<Pattern>, Box<Pattern>, f64),
}

/// A procedural color function with its own transform.
///
/// Patterns are evaluated in *pattern space*: a world point is first moved
/// into the object space of the shape being shaded, then through the inverse
/// of the pattern transform.
///
/// # Examples
///
/// ```
/// use whitted::color::Color;
/// use whitted::matrix::Matrix4D;
/// use whitted::pattern::Pattern;
/// use whitted::tuple::Tuple4D;
///
/// let stripes = Pattern::stripe(Color::white(), Color::black())
///     .with_transform(Matrix4D::scaling(2.0, 2.0, 2.0))
///     .unwrap();
///
/// assert_eq!(stripes.pattern_at(Tuple4D::point(1.5, 0.0, 0.0)), Color::white());
/// assert_eq!(stripes.pattern_at(Tuple4D::point(2.5, 0.0, 0.0)), Color::black());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Pattern {
    pub ty: PatternType,

    transform: Matrix4D,
    inverse: Matrix4D,
}

impl Pattern {
    fn new(ty: PatternType) -> Pattern {
        Pattern {
            ty,
            transform: Matrix4D::identity(),
            inverse: Matrix4D::identity(),
        }
    }

    pub fn constant(c: Color) -> Pattern {
        Pattern::new(PatternType::Constant(c))
    }

    pub fn stripe(a: Color, b: Color) -> Pattern {
        Pattern::new(PatternType::Stripe(a, b))
    }

    pub fn ring(a: Color, b: Color) -> Pattern {
        Pattern::new(PatternType::Ring(a, b))
    }

    pub fn gradient(a: Color, b: Color) -> Pattern {
        Pattern::new(PatternType::Gradient(a, b))
    }

    pub fn radial_gradient(a: Color, b: Color) -> Pattern {
        Pattern::new(PatternType::RadialGradient(a, b))
    }

    pub fn checker(a: Color, b: Color) -> Pattern {
        Pattern::new(PatternType::Checker(a, b))
    }

    /// `blend == 0.0` is entirely `a`, `blend == 1.0` entirely `b`.
    pub fn blend(a: Pattern, b: Pattern, blend: f64) -> Pattern {
        Pattern::new(PatternType::Blend(Box::new(a), Box::new(b), blend))
    }

    pub fn transform(&self) -> &Matrix4D {
        &self.transform
    }

    /// Sets the pattern transform, caching its inverse.
    pub fn set_transform(&mut self, transform: Matrix4D)
        -> Result<(), NotInvertibleError> {
        self.inverse = transform.inverse()?;
        self.transform = transform;

        Ok(())
    }

    pub fn with_transform(mut self, transform: Matrix4D)
        -> Result<Pattern, NotInvertibleError> {
        self.set_transform(transform)?;
        Ok(self)
    }

    /// Color at a point in the object space of the shape being shaded.
    pub fn pattern_at(&self, object_point: Tuple4D) -> Color {
        self.local_pattern_at(self.inverse * object_point)
    }

    /// Color at a world-space point on shape `id`, honoring every transform
    /// between the world and the pattern.
    pub fn pattern_at_shape(&self, shapes: &ShapeArena, id: ShapeId,
        world_point: Tuple4D) -> Color {
        self.pattern_at(shapes.world_to_object(id, world_point))
    }

    fn local_pattern_at(&self, p: Tuple4D) -> Color {
        match self.ty {
            PatternType::Constant(c) => c,
            PatternType::Stripe(a, b) => alternate(a, b, p.x.floor()),
            PatternType::Ring(a, b) => {
                alternate(a, b, p.x.hypot(p.z).floor())
            },
            PatternType::Gradient(a, b) => {
                Color::lerp(&a, &b, p.x - p.x.floor())
            },
            PatternType::RadialGradient(a, b) => {
                let distance = p.x.hypot(p.z);
                Color::lerp(&a, &b, distance - distance.floor())
            },
            PatternType::Checker(a, b) => {
                alternate(a, b, p.x.floor() + p.y.floor() + p.z.floor())
            },
            PatternType::Blend(ref first, ref second, blend) => {
                Color::lerp(&first.pattern_at(p), &second.pattern_at(p), blend)
            },
        }
    }
}

/// `a` when `n` (an integral float) is even, `b` when it is odd.
fn alternate(a: Color, b: Color, n: f64) -> Color {
    if n.rem_euclid(2.0) == 0.0 { a } else { b }
}

#[test]
fn stripe_pattern_is_constant_along_y_and_z() {
    let pattern = Pattern::stripe(Color::white(), Color::black());

    for p in [
        Tuple4D::point(0.0, 1.0, 0.0),
        Tuple4D::point(0.0, 2.0, 0.0),
        Tuple4D::point(0.0, 0.0, 1.0),
        Tuple4D::point(0.0, 0.0, 2.0),
    ] {
        assert_eq!(pattern.pattern_at(p), Color::white());
    }
}

#[test]
fn stripe_pattern_alternates_along_x() {
    let pattern = Pattern::stripe(Color::white(), Color::black());

    assert_eq!(pattern.pattern_at(Tuple4D::point( 0.0, 0.0, 0.0)),
        Color::white());
    assert_eq!(pattern.pattern_at(Tuple4D::point( 0.9, 0.0, 0.0)),
        Color::white());
    assert_eq!(pattern.pattern_at(Tuple4D::point( 1.0, 0.0, 0.0)),
        Color::black());
    assert_eq!(pattern.pattern_at(Tuple4D::point(-0.1, 0.0, 0.0)),
        Color::black());
    assert_eq!(pattern.pattern_at(Tuple4D::point(-1.0, 0.0, 0.0)),
        Color::black());
    assert_eq!(pattern.pattern_at(Tuple4D::point(-1.1, 0.0, 0.0)),
        Color::white());
}

#[test]
fn gradient_interpolates_between_colors() {
    let pattern = Pattern::gradient(Color::white(), Color::black());

    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.0, 0.0)),
        Color::white());
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.25, 0.0, 0.0)),
        Color::rgb(0.75, 0.75, 0.75));
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.5, 0.0, 0.0)),
        Color::rgb(0.5, 0.5, 0.5));
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.75, 0.0, 0.0)),
        Color::rgb(0.25, 0.25, 0.25));
}

#[test]
fn ring_extends_in_x_and_z() {
    let pattern = Pattern::ring(Color::white(), Color::black());

    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.0, 0.0)),
        Color::white());
    assert_eq!(pattern.pattern_at(Tuple4D::point(1.0, 0.0, 0.0)),
        Color::black());
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.0, 1.0)),
        Color::black());
    // 0.708 is just slightly more than sqrt(2)/2
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.708, 0.0, 0.708)),
        Color::black());
}

#[test]
fn radial_gradient_fades_with_distance() {
    let pattern = Pattern::radial_gradient(Color::white(), Color::black());

    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.0, 0.0)),
        Color::white());
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.0, 0.5)),
        Color::rgb(0.5, 0.5, 0.5));
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.0, 1.0)),
        Color::white());
    assert_eq!(pattern.pattern_at(Tuple4D::point(-1.25, 0.0, 0.0)),
        Color::rgb(0.75, 0.75, 0.75));
}

#[test]
fn checkers_repeat_in_every_dimension() {
    let pattern = Pattern::checker(Color::white(), Color::black());

    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.0, 0.0)),
        Color::white());
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.99, 0.0, 0.0)),
        Color::white());
    assert_eq!(pattern.pattern_at(Tuple4D::point(1.01, 0.0, 0.0)),
        Color::black());
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 1.01, 0.0)),
        Color::black());
    assert_eq!(pattern.pattern_at(Tuple4D::point(0.0, 0.0, 1.01)),
        Color::black());
    assert_eq!(pattern.pattern_at(Tuple4D::point(-0.5, 0.0, -0.5)),
        Color::white());
}

#[test]
fn blended_patterns_mix_colors() {
    let a = Pattern::constant(Color::red());
    let b = Pattern::stripe(Color::white(), Color::blue());
    let pattern = Pattern::blend(a, b, 0.25);

    assert_eq!(pattern.pattern_at(Tuple4D::point(0.5, 0.0, 0.0)),
        Color::rgb(1.0, 0.25, 0.25));
    assert_eq!(pattern.pattern_at(Tuple4D::point(1.5, 0.0, 0.0)),
        Color::rgb(0.75, 0.0, 0.25));
}

#[test]
fn pattern_with_object_transformation() {
    let mut shapes = ShapeArena::new();
    let mut sphere = crate::shape::Shape::sphere();
    sphere.set_transform(Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap();
    let s = shapes.add(sphere);

    let pattern = Pattern::stripe(Color::white(), Color::black());
    let c = pattern.pattern_at_shape(&shapes, s, Tuple4D::point(1.5, 0.0, 0.0));

    assert_eq!(c, Color::white());
}

#[test]
fn pattern_with_object_and_pattern_transformation() {
    let mut shapes = ShapeArena::new();
    let mut sphere = crate::shape::Shape::sphere();
    sphere.set_transform(Matrix4D::scaling(2.0, 2.0, 2.0)).unwrap();
    let s = shapes.add(sphere);

    let pattern = Pattern::stripe(Color::white(), Color::black())
        .with_transform(Matrix4D::translation(0.5, 0.0, 0.0))
        .unwrap();
    let c = pattern.pattern_at_shape(&shapes, s, Tuple4D::point(2.5, 0.0, 0.0));

    assert_eq!(c, Color::white());
}

#[test]
fn singular_pattern_transform_is_rejected() {
    let mut pattern = Pattern::ring(Color::white(), Color::black());

    assert!(pattern.set_transform(Matrix4D::scaling(1.0, 0.0, 1.0)).is_err());
    assert_eq!(*pattern.transform(), Matrix4D::identity());
}
