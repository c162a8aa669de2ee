use std::convert::TryFrom;
use std::fs;
use std::path::Path;

use log::{ debug, warn };
use serde::{ Serialize, Deserialize };

use crate::camera::Camera;
use crate::color::Color;
use crate::error::{ Error, Result };
use crate::light::{ Material, PointLight };
use crate::matrix::Matrix4D;
use crate::obj::ObjParser;
use crate::pattern::Pattern;
use crate::shape::{ Shape, ShapeId };
use crate::tuple::Tuple4D;
use crate::world::World;

/// A world together with the camera that looks at it.
#[derive(Debug)]
pub struct Scene {
    pub world: World,
    pub camera: Camera,
}

impl Scene {
    /// Builds a scene from JSON text. OBJ paths are relative to the working
    /// directory.
    ///
    /// # Examples
    ///
    /// ```
    /// use whitted::scene::Scene;
    ///
    /// let scene = Scene::from_json_str(r#"{
    ///     "canvas_width": 100,
    ///     "canvas_height": 50,
    ///     "field_of_view": 1.0471975512,
    ///     "camera_from": [0, 1.5, -5],
    ///     "camera_to": [0, 1, 0],
    ///     "camera_up": [0, 1, 0],
    ///     "lights": [{ "intensity": [1, 1, 1], "position": [-10, 10, -10] }],
    ///     "shapes": [
    ///         { "ty": "plane" },
    ///         { "ty": "sphere", "transform": [{ "ty": "translate", "x": 0, "y": 1, "z": 0 }] }
    ///     ]
    /// }"#).unwrap();
    ///
    /// assert_eq!(scene.camera.hsize, 100);
    /// assert_eq!(scene.world.objects.len(), 2);
    /// ```
    pub fn from_json_str(json: &str) -> Result<Scene> {
        let scene_json: SceneJson = serde_json::from_str(json)?;
        scene_json.build(Path::new("."))
    }

    /// Reads a scene file. OBJ paths are relative to the scene file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Scene> {
        let path = path.as_ref();
        debug!("loading scene {}", path.display());

        let scene_json: SceneJson = serde_json::from_str(
            &fs::read_to_string(path)?
        )?;
        scene_json.build(path.parent().unwrap_or_else(|| Path::new(".")))
    }
}

impl TryFrom<SceneJson> for Scene {
    type Error = Error;

    fn try_from(scene_json: SceneJson) -> Result<Scene> {
        scene_json.build(Path::new("."))
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SceneJson {
    pub canvas_width: usize,
    pub canvas_height: usize,
    pub field_of_view: f64,

    pub camera_from: Vec<f64>,
    pub camera_to: Vec<f64>,
    pub camera_up: Vec<f64>,

    #[serde(default)]
    pub lights: Vec<LightJson>,
    #[serde(default)]
    pub shapes: Vec<ShapeJson>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LightJson {
    pub intensity: Vec<f64>,
    pub position: Vec<f64>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ShapeJson {
    pub ty: String,

    /// Applied in the listed order: the first entry moves the shape first.
    #[serde(default)]
    pub transform: Vec<TransformJson>,
    pub material: Option<MaterialJson>,
    pub casts_shadow: Option<bool>,

    /// Cylinders and cones.
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    #[serde(default)]
    pub closed: bool,

    /// Triangle vertices.
    pub points: Option<Vec<Vec<f64>>>,

    /// OBJ model path.
    pub file: Option<String>,

    #[serde(default)]
    pub children: Vec<ShapeJson>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "ty", rename_all = "snake_case")]
pub enum TransformJson {
    Translate { x: f64, y: f64, z: f64 },
    Scale { x: f64, y: f64, z: f64 },
    RotateX { radians: f64 },
    RotateY { radians: f64 },
    RotateZ { radians: f64 },
    Shear { xy: f64, xz: f64, yx: f64, yz: f64, zx: f64, zy: f64 },
}

/// Every field is optional and falls back to `Material::default()`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct MaterialJson {
    pub color: Option<Vec<f64>>,
    pub pattern: Option<PatternJson>,

    pub ambient: Option<f64>,
    pub diffuse: Option<f64>,
    pub specular: Option<f64>,
    pub shininess: Option<f64>,

    pub reflective: Option<f64>,
    pub refractive_index: Option<f64>,
    pub transparency: Option<f64>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "ty", rename_all = "snake_case")]
pub enum PatternJson {
    Constant {
        color: Vec<f64>,
        #[serde(default)]
        transform: Vec<TransformJson>,
    },
    Stripe {
        a: Vec<f64>,
        b: Vec<f64>,
        #[serde(default)]
        transform: Vec<TransformJson>,
    },
    Ring {
        a: Vec<f64>,
        b: Vec<f64>,
        #[serde(default)]
        transform: Vec<TransformJson>,
    },
    Gradient {
        a: Vec<f64>,
        b: Vec<f64>,
        #[serde(default)]
        transform: Vec<TransformJson>,
    },
    RadialGradient {
        a: Vec<f64>,
        b: Vec<f64>,
        #[serde(default)]
        transform: Vec<TransformJson>,
    },
    Checker {
        a: Vec<f64>,
        b: Vec<f64>,
        #[serde(default)]
        transform: Vec<TransformJson>,
    },
    Blend {
        a: Box<PatternJson>,
        b: Box<PatternJson>,
        blend: f64,
        #[serde(default)]
        transform: Vec<TransformJson>,
    },
}

fn triple(v: &[f64], what: &str) -> Result<(f64, f64, f64)> {
    match *v {
        [x, y, z] => Ok((x, y, z)),
        _ => Err(Error::Scene(
            format!("{} needs 3 components, got {}", what, v.len())
        )),
    }
}

fn point(v: &[f64], what: &str) -> Result<Tuple4D> {
    let (x, y, z) = triple(v, what)?;
    Ok(Tuple4D::point(x, y, z))
}

fn vector(v: &[f64], what: &str) -> Result<Tuple4D> {
    let (x, y, z) = triple(v, what)?;
    Ok(Tuple4D::vector(x, y, z))
}

fn color(v: &[f64], what: &str) -> Result<Color> {
    let (r, g, b) = triple(v, what)?;
    Ok(Color::rgb(r, g, b))
}

impl TransformJson {
    pub fn to_matrix(&self) -> Matrix4D {
        match *self {
            TransformJson::Translate { x, y, z } => Matrix4D::translation(x, y, z),
            TransformJson::Scale { x, y, z } => Matrix4D::scaling(x, y, z),
            TransformJson::RotateX { radians } => Matrix4D::rotation_x(radians),
            TransformJson::RotateY { radians } => Matrix4D::rotation_y(radians),
            TransformJson::RotateZ { radians } => Matrix4D::rotation_z(radians),
            TransformJson::Shear { xy, xz, yx, yz, zx, zy } => {
                Matrix4D::shearing(xy, xz, yx, yz, zx, zy)
            },
        }
    }

    /// Composes a list of transforms so the first one is applied first.
    pub fn compose(list: &[TransformJson]) -> Matrix4D {
        list.iter().fold(Matrix4D::identity(), |m, t| t.to_matrix() * m)
    }
}

impl PatternJson {
    pub fn to_pattern(&self) -> Result<Pattern> {
        let (pattern, transform) = match self {
            PatternJson::Constant { color: c, transform } => {
                (Pattern::constant(color(c, "pattern color")?), transform)
            },
            PatternJson::Stripe { a, b, transform } => {
                (Pattern::stripe(color(a, "pattern color")?,
                    color(b, "pattern color")?), transform)
            },
            PatternJson::Ring { a, b, transform } => {
                (Pattern::ring(color(a, "pattern color")?,
                    color(b, "pattern color")?), transform)
            },
            PatternJson::Gradient { a, b, transform } => {
                (Pattern::gradient(color(a, "pattern color")?,
                    color(b, "pattern color")?), transform)
            },
            PatternJson::RadialGradient { a, b, transform } => {
                (Pattern::radial_gradient(color(a, "pattern color")?,
                    color(b, "pattern color")?), transform)
            },
            PatternJson::Checker { a, b, transform } => {
                (Pattern::checker(color(a, "pattern color")?,
                    color(b, "pattern color")?), transform)
            },
            PatternJson::Blend { a, b, blend, transform } => {
                (Pattern::blend(a.to_pattern()?, b.to_pattern()?, *blend),
                    transform)
            },
        };

        Ok(pattern.with_transform(TransformJson::compose(transform))?)
    }
}

impl MaterialJson {
    /// Overrides the given fields of `base`, usually the material the shape
    /// was constructed with.
    pub fn to_material(&self, base: &Material) -> Result<Material> {
        Ok(Material {
            color: match self.color {
                Some(ref c) => color(c, "material color")?,
                None => base.color,
            },
            pattern: match self.pattern {
                Some(ref p) => Some(p.to_pattern()?),
                None => base.pattern.clone(),
            },

            ambient: self.ambient.unwrap_or(base.ambient),
            diffuse: self.diffuse.unwrap_or(base.diffuse),
            specular: self.specular.unwrap_or(base.specular),
            shininess: self.shininess.unwrap_or(base.shininess),

            reflective: self.reflective.unwrap_or(base.reflective),
            refractive_index: self.refractive_index.unwrap_or(base.refractive_index),
            transparency: self.transparency.unwrap_or(base.transparency),
        })
    }
}

impl ShapeJson {
    /// Builds this shape (and any children) into the world's arena. The
    /// returned shape is not registered as a top-level object.
    pub fn build(&self, world: &mut World, base_dir: &Path) -> Result<ShapeId> {
        let minimum = self.minimum.unwrap_or(f64::NEG_INFINITY);
        let maximum = self.maximum.unwrap_or(f64::INFINITY);

        let id = match self.ty.as_str() {
            "sphere" => world.shapes.add(Shape::sphere()),
            "glass_sphere" => world.shapes.add(Shape::glass_sphere()),
            "plane" => world.shapes.add(Shape::plane()),
            "cube" => world.shapes.add(Shape::cube()),
            "cylinder" if self.closed => {
                world.shapes.add(Shape::capped_cylinder(minimum, maximum))
            },
            "cylinder" => {
                world.shapes.add(Shape::bounded_cylinder(minimum, maximum))
            },
            "cone" if self.closed => {
                world.shapes.add(Shape::capped_cone(minimum, maximum))
            },
            "cone" => world.shapes.add(Shape::bounded_cone(minimum, maximum)),
            "triangle" => {
                let points = self.points.as_ref().ok_or_else(||
                    Error::Scene("triangle needs \"points\"".into())
                )?;
                if points.len() != 3 {
                    return Err(Error::Scene(format!(
                        "triangle needs 3 points, got {}", points.len()
                    )));
                }

                world.shapes.add(Shape::triangle(
                    point(&points[0], "triangle point")?,
                    point(&points[1], "triangle point")?,
                    point(&points[2], "triangle point")?,
                ))
            },
            "group" => {
                let group = world.shapes.add(Shape::group());
                for child in self.children.iter() {
                    let child = child.build(world, base_dir)?;
                    world.shapes.add_child(group, child);
                }

                group
            },
            "obj" => {
                let file = self.file.as_ref().ok_or_else(||
                    Error::Scene("obj shape needs \"file\"".into())
                )?;

                ObjParser::parse_file(&mut world.shapes, base_dir.join(file))?
                    .into_group(&mut world.shapes)
            },
            other => {
                return Err(Error::Scene(format!("unknown shape type {:?}", other)));
            },
        };

        if let Some(ref m) = self.material {
            if world.shapes[id].is_group() {
                warn!("material on {} shape applies to the group only, not \
                    its children", self.ty);
            }
            let material = m.to_material(&world.shapes[id].material)?;
            world.shapes.set_material(id, material);
        }

        if let Some(casts_shadow) = self.casts_shadow {
            world.shapes.set_casts_shadow(id, casts_shadow);
        }

        world.shapes.set_transform(id, TransformJson::compose(&self.transform))?;
        Ok(id)
    }
}

impl SceneJson {
    /// Builds the world and camera. OBJ paths resolve against `base_dir`.
    pub fn build(&self, base_dir: &Path) -> Result<Scene> {
        let view = Matrix4D::view_transform(
            point(&self.camera_from, "camera_from")?,
            point(&self.camera_to, "camera_to")?,
            vector(&self.camera_up, "camera_up")?,
        );
        let camera = Camera::new(
            self.canvas_width, self.canvas_height, self.field_of_view
        ).with_transform(view)?;

        let mut world = World::empty();
        for light in self.lights.iter() {
            world.add_light(PointLight::new(
                color(&light.intensity, "light intensity")?,
                point(&light.position, "light position")?,
            ));
        }

        if world.lights.is_empty() {
            warn!("scene has no lights; only black will be rendered");
        }

        for shape in self.shapes.iter() {
            let id = shape.build(&mut world, base_dir)?;
            world.register_object(id);
        }

        debug!("built scene with {} shapes ({} top-level), {} lights",
            world.shapes.len(), world.objects.len(), world.lights.len());
        Ok(Scene { world, camera })
    }
}

#[cfg(test)]
fn scene_with_shapes(shapes: &str) -> String {
    format!(r#"{{
        "canvas_width": 20,
        "canvas_height": 10,
        "field_of_view": 1.5707963267948966,
        "camera_from": [0, 0, -5],
        "camera_to": [0, 0, 0],
        "camera_up": [0, 1, 0],
        "lights": [{{ "intensity": [1, 1, 1], "position": [-10, 10, -10] }}],
        "shapes": {}
    }}"#, shapes)
}

#[test]
fn scene_camera_and_lights() {
    let scene = Scene::from_json_str(&scene_with_shapes("[]")).unwrap();

    assert_eq!((scene.camera.hsize, scene.camera.vsize), (20, 10));
    assert_eq!(*scene.camera.transform(), Matrix4D::view_transform(
        Tuple4D::point(0.0, 0.0, -5.0),
        Tuple4D::origin(),
        Tuple4D::vector(0.0, 1.0, 0.0),
    ));
    assert_eq!(scene.world.lights, vec![
        PointLight::new(Color::white(), Tuple4D::point(-10.0, 10.0, -10.0))
    ]);
}

#[test]
fn transforms_apply_in_listed_order() {
    let scene = Scene::from_json_str(&scene_with_shapes(r#"[{
        "ty": "sphere",
        "transform": [
            { "ty": "scale", "x": 2, "y": 2, "z": 2 },
            { "ty": "translate", "x": 1, "y": 0, "z": 0 }
        ]
    }]"#)).unwrap();

    let s = scene.world.objects[0];
    assert_eq!(*scene.world.shapes[s].transform() * Tuple4D::point(1.0, 0.0, 0.0),
        Tuple4D::point(3.0, 0.0, 0.0));
}

#[test]
fn shapes_with_materials_and_patterns() {
    let scene = Scene::from_json_str(&scene_with_shapes(r#"[
        {
            "ty": "plane",
            "casts_shadow": false,
            "material": {
                "reflective": 0.5,
                "pattern": {
                    "ty": "checker", "a": [1, 1, 1], "b": [0, 0, 0],
                    "transform": [{ "ty": "scale", "x": 0.5, "y": 0.5, "z": 0.5 }]
                }
            }
        },
        {
            "ty": "cylinder", "minimum": 0, "maximum": 2, "closed": true,
            "material": { "color": [1, 0, 0], "transparency": 0.5 }
        }
    ]"#)).unwrap();

    let shapes = &scene.world.shapes;
    let (plane, cyl) = (scene.world.objects[0], scene.world.objects[1]);

    assert!(!shapes[plane].casts_shadow);
    assert_eq!(shapes[plane].material.reflective, 0.5);
    assert_eq!(shapes[plane].material.pattern.as_ref().unwrap().transform(),
        &Matrix4D::scaling(0.5, 0.5, 0.5));

    assert_eq!(*shapes[cyl].ty(),
        crate::shape::ShapeType::Cylinder(0.0, 2.0, true));
    assert_eq!(shapes[cyl].material.color, Color::red());
    assert_eq!(shapes[cyl].material.transparency, 0.5);
    assert_eq!(shapes[cyl].material.ambient, Material::default().ambient);
}

#[test]
fn materials_extend_the_shape_defaults() {
    let scene = Scene::from_json_str(&scene_with_shapes(r#"[{
        "ty": "glass_sphere",
        "material": { "color": [1, 0, 0], "reflective": 0.9 }
    }]"#)).unwrap();

    let m = &scene.world.shapes[scene.world.objects[0]].material;
    assert_eq!(m.color, Color::red());
    assert_eq!(m.reflective, 0.9);
    assert_eq!(m.transparency, 1.0);
    assert_eq!(m.refractive_index, 1.5);
}

#[test]
fn groups_can_opt_out_of_casting_shadows() {
    let scene = Scene::from_json_str(&scene_with_shapes(r#"[{
        "ty": "group",
        "casts_shadow": false,
        "children": [
            { "ty": "sphere" },
            { "ty": "group", "children": [{ "ty": "cube" }] }
        ]
    }]"#)).unwrap();

    let shapes = &scene.world.shapes;
    let group = scene.world.objects[0];
    let children = shapes[group].children().unwrap();
    let inner = shapes[children[1]].children().unwrap();

    assert!(!shapes[group].casts_shadow);
    assert!(!shapes[children[0]].casts_shadow);
    assert!(!shapes[inner[0]].casts_shadow);
}

#[test]
fn groups_own_their_children() {
    let scene = Scene::from_json_str(&scene_with_shapes(r#"[{
        "ty": "group",
        "transform": [{ "ty": "translate", "x": 0, "y": 0, "z": 5 }],
        "children": [
            { "ty": "sphere" },
            { "ty": "triangle", "points": [[0, 1, 0], [-1, 0, 0], [1, 0, 0]] }
        ]
    }]"#)).unwrap();

    let world = &scene.world;
    assert_eq!(world.objects.len(), 1);

    let group = world.objects[0];
    let children = world.shapes[group].children().unwrap();
    assert_eq!(children.len(), 2);
    assert_eq!(world.shapes[children[0]].parent(), Some(group));
    assert!(world.shapes[children[1]].triangle_info().is_some());
}

#[test]
fn obj_models_load_as_groups() {
    let scene = Scene::from_json_str(&scene_with_shapes(r#"[{
        "ty": "obj", "file": "models/two-triangles.obj"
    }]"#)).unwrap();

    let root = scene.world.objects[0];
    assert!(scene.world.shapes[root].is_group());
    // the "Square" group hangs under the model's default group
    assert_eq!(scene.world.shapes[root].children().unwrap().len(), 1);
}

#[test]
fn scene_files_load() {
    let scene = Scene::from_file("scenes/glass-and-checkers.json").unwrap();

    assert!(!scene.world.objects.is_empty());
    assert!(!scene.world.lights.is_empty());
}

#[test]
fn unknown_shape_types_are_errors() {
    let json = scene_with_shapes(r#"[{ "ty": "teapot" }]"#);

    assert!(matches!(Scene::from_json_str(&json), Err(Error::Scene(_))));
}

#[test]
fn malformed_vectors_are_errors() {
    let json = scene_with_shapes(
        r#"[{ "ty": "sphere", "material": { "color": [1, 0] } }]"#
    );

    assert!(matches!(Scene::from_json_str(&json), Err(Error::Scene(_))));
}

#[test]
fn singular_transforms_are_errors() {
    let json = scene_with_shapes(r#"[{
        "ty": "sphere",
        "transform": [{ "ty": "scale", "x": 0, "y": 1, "z": 1 }]
    }]"#);

    assert!(matches!(Scene::from_json_str(&json), Err(Error::NotInvertible(_))));
}

#[test]
fn invalid_json_is_an_error() {
    assert!(matches!(Scene::from_json_str("{ not json"), Err(Error::Json(_))));
}
