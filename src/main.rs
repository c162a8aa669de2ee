use std::f64::consts::PI;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use log::info;

use whitted::camera::Camera;
use whitted::color::Color;
use whitted::consts::{ CANVAS_HEIGHT, CANVAS_WIDTH, GLASS_RI, MAX_DEPTH, OUT_FILE };
use whitted::light::{ Material, PointLight };
use whitted::matrix::Matrix4D;
use whitted::pattern::Pattern;
use whitted::scene::Scene;
use whitted::shape::Shape;
use whitted::tuple::Tuple4D;
use whitted::world::World;

/// Renders a scene to a PPM image.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// JSON scene description. Renders a built-in demo scene when omitted.
    #[clap(parse(from_os_str))]
    scene: Option<PathBuf>,

    /// Where to write the image.
    #[clap(short, long, parse(from_os_str), default_value = OUT_FILE)]
    output: PathBuf,

    /// Maximum number of reflection/refraction bounces per camera ray.
    #[clap(short, long, default_value_t = MAX_DEPTH)]
    depth: usize,

    /// Overrides the image width from the scene.
    #[clap(long)]
    width: Option<usize>,

    /// Overrides the image height from the scene.
    #[clap(long)]
    height: Option<usize>,
}

/// A checkered, reflective floor with a glass sphere, a capped cone and a
/// cube resting on it.
fn demo_scene() -> whitted::Result<Scene> {
    let mut world = World::empty();
    world.add_light(PointLight::new(
        Color::white(),
        Tuple4D::point(-10.0, 10.0, -10.0),
    ));

    let checkers = Pattern::checker(Color::white(), Color::black())
        .with_transform(Matrix4D::scaling(0.5, 0.5, 0.5))?;
    world.add_object(Shape::plane().with_material(Material {
        color: Color::rgb(0.5, 0.5, 0.5),
        pattern: Some(checkers),
        specular: 0.0,
        reflective: 0.5,
        ..Default::default()
    }));

    let mut middle = Shape::glass_sphere()
        .with_transform(Matrix4D::translation(-0.5, 1.0, 2.0))?;
    middle.material.color = Color::rgb(1.0, 0.4666, 0.2666);
    middle.material.diffuse = 0.7;
    middle.material.specular = 0.3;
    middle.material.transparency = 0.5;
    middle.material.reflective = 0.5;
    middle.material.refractive_index = GLASS_RI;
    world.add_object(middle);

    world.add_object(
        Shape::capped_cone(0.0, 3.0)
            .with_transform(
                Matrix4D::translation(1.5, 0.0, -0.5)
                    .scale(0.25, 0.25, 0.25)
                    .rotate_y(PI / 8.0)
            )?
            .with_material(Material {
                color: Color::rgb(1.0, 0.6666, 0.2666),
                diffuse: 0.7,
                specular: 0.3,
                reflective: 0.3,
                ..Default::default()
            })
    );

    world.add_object(
        Shape::cube()
            .with_transform(
                Matrix4D::translation(-1.5, 0.33, -0.75)
                    .scale(0.33, 0.33, 0.33)
                    .rotate_y(PI / 4.0)
            )?
            .with_material(Material {
                color: Color::rgb(0.8666, 0.2, 0.2),
                diffuse: 0.7,
                specular: 0.3,
                ..Default::default()
            })
    );

    let camera = Camera::new(CANVAS_WIDTH, CANVAS_HEIGHT, PI / 3.0)
        .with_transform(Matrix4D::view_transform(
            Tuple4D::point(0.0, 1.5, -5.0),
            Tuple4D::point(0.0, 1.0, 0.0),
            Tuple4D::vector(0.0, 1.0, 0.0),
        ))?;

    Ok(Scene { world, camera })
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();

    let mut scene = match args.scene {
        Some(ref path) => Scene::from_file(path)
            .with_context(|| format!("failed to load scene {}", path.display()))?,
        None => {
            info!("no scene given, rendering the demo scene");
            demo_scene().context("failed to build the demo scene")?
        },
    };

    if args.width.is_some() || args.height.is_some() {
        let width = args.width.unwrap_or(scene.camera.hsize);
        let height = args.height.unwrap_or(scene.camera.vsize);

        scene.camera = Camera::new(width, height, scene.camera.field_of_view())
            .with_transform(*scene.camera.transform())?;
    }

    let canvas = scene.camera.render(&scene.world, args.depth);
    canvas.save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    info!("wrote {}", args.output.display());
    info!("{}", scene.world.shapes.stats());

    Ok(())
}
