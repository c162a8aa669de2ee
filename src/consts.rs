// Floating point comparisons. Used for tuple/matrix/color equality and for
// the over/under point offsets.
pub const EPSILON: f64 = 0.00001;

// Maximum number of reflection/refraction bounces per camera ray
pub const MAX_DEPTH: usize = 5;

// Demo render parameters
pub const CANVAS_WIDTH: usize = 200;
pub const CANVAS_HEIGHT: usize = 100;
pub const OUT_FILE: &str = "./out.ppm";

// Refractive index of glass spheres
pub const GLASS_RI: f64 = 1.5;
