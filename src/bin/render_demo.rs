//! Minimal runnable demo: builds a literal Cornell-box-style scene, renders
//! it with a simple pinhole camera, and writes the result to a PNG.
//!
//! Standing in for the collaborator contracts the core doesn't implement
//! (mesh/texture loading, a full trackball camera, BMP export): scene
//! construction here is hand-written data rather than loaded from a file.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use nalgebra::{Point3, Vector2, Vector3};
use tracing_subscriber::EnvFilter;
use whitted_raytracer::camera::Camera;
use whitted_raytracer::geometry::Ray;
use whitted_raytracer::lights::{Light, PointLight};
use whitted_raytracer::material::Material;
use whitted_raytracer::renderer::{render, RenderSettings, Screen};
use whitted_raytracer::scene::{Mesh, Scene, Sphere, Vertex};
use whitted_raytracer::Bvh;

#[derive(Parser, Debug)]
#[command(about = "Renders a small demo scene with the whitted-raytracer core")]
struct Args {
    #[arg(long, default_value_t = 512)]
    width: u32,

    #[arg(long, default_value_t = 512)]
    height: u32,

    #[arg(long, default_value_t = 4)]
    threads: u32,

    #[arg(long)]
    motion_blur: bool,

    /// Pixel coordinates ("x,y") to re-shade with ray recording enabled.
    #[arg(long, value_parser = parse_pixel)]
    debug_pixel: Option<(u32, u32)>,

    #[arg(long, default_value = "render.png")]
    out: PathBuf,
}

fn parse_pixel(s: &str) -> Result<(u32, u32), String> {
    let (x, y) = s.split_once(',').ok_or_else(|| format!("expected \"x,y\", got {s:?}"))?;
    let x = x.trim().parse().map_err(|_| format!("invalid x coordinate in {s:?}"))?;
    let y = y.trim().parse().map_err(|_| format!("invalid y coordinate in {s:?}"))?;
    Ok((x, y))
}

struct PinholeCamera {
    position: Point3<f32>,
    forward: Vector3<f32>,
    right: Vector3<f32>,
    up: Vector3<f32>,
}

impl PinholeCamera {
    fn looking_at(position: Point3<f32>, target: Point3<f32>) -> PinholeCamera {
        let forward = (target - position).normalize();
        let right = forward.cross(&Vector3::new(0.0, 1.0, 0.0)).normalize();
        let up = right.cross(&forward).normalize();
        PinholeCamera { position, forward, right, up }
    }
}

impl Camera for PinholeCamera {
    fn generate_ray(&self, ndc: Vector2<f32>) -> Ray {
        let direction = (self.forward + self.right * ndc.x + self.up * ndc.y).normalize();
        Ray::new(self.position, direction)
    }
}

fn quad(v0: Point3<f32>, v1: Point3<f32>, v2: Point3<f32>, v3: Point3<f32>, material: Material) -> Mesh {
    let normal = (v1 - v0).cross(&(v2 - v0)).normalize();
    let vertex = |p: Point3<f32>| Vertex {
        position: p,
        normal,
        tex_coord: Vector2::zeros(),
    };
    let vertices = vec![vertex(v0), vertex(v1), vertex(v2), vertex(v3)];
    Mesh::new(vertices, vec![[0, 1, 2], [0, 2, 3]], material)
}

fn demo_scene() -> Scene {
    let white = Material::new(Vector3::new(0.75, 0.75, 0.75), Vector3::zeros(), 1.0, 0.0).unwrap();
    let red = Material::new(Vector3::new(0.75, 0.1, 0.1), Vector3::zeros(), 1.0, 0.0).unwrap();
    let green = Material::new(Vector3::new(0.1, 0.75, 0.1), Vector3::zeros(), 1.0, 0.0).unwrap();
    let mirror = Material::new(Vector3::zeros(), Vector3::new(1.0, 1.0, 1.0), 1.0, 0.0).unwrap();

    let floor = quad(
        Point3::new(-3.0, -2.0, -5.0),
        Point3::new(3.0, -2.0, -5.0),
        Point3::new(3.0, -2.0, 1.0),
        Point3::new(-3.0, -2.0, 1.0),
        white.clone(),
    );
    let back_wall = quad(
        Point3::new(-3.0, -2.0, -5.0),
        Point3::new(3.0, -2.0, -5.0),
        Point3::new(3.0, 3.0, -5.0),
        Point3::new(-3.0, 3.0, -5.0),
        white,
    );
    let left_wall = quad(
        Point3::new(-3.0, -2.0, -5.0),
        Point3::new(-3.0, -2.0, 1.0),
        Point3::new(-3.0, 3.0, 1.0),
        Point3::new(-3.0, 3.0, -5.0),
        red,
    );
    let right_wall = quad(
        Point3::new(3.0, -2.0, -5.0),
        Point3::new(3.0, -2.0, 1.0),
        Point3::new(3.0, 3.0, 1.0),
        Point3::new(3.0, 3.0, -5.0),
        green,
    );

    let sphere = Sphere {
        center: Point3::new(0.8, -1.0, -3.0),
        radius: 1.0,
        material: mirror,
    };

    Scene::new()
        .with_mesh(floor)
        .with_mesh(back_wall)
        .with_mesh(left_wall)
        .with_mesh(right_wall)
        .with_sphere(sphere)
        .with_light(Light::Point(PointLight {
            position: Point3::new(0.0, 2.5, -2.0),
            color: Vector3::new(8.0, 8.0, 8.0),
        }))
}

fn main() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let args = Args::parse();

    let scene = Arc::new(demo_scene());
    let bvh = Arc::new(Bvh::build(&scene));
    let camera: Arc<dyn Camera + Send + Sync> = Arc::new(PinholeCamera::looking_at(Point3::new(0.0, 0.0, 4.0), Point3::origin()));

    let mut screen = Screen::new(args.width, args.height);
    let settings = RenderSettings {
        thread_count: args.threads,
        motion_blur: args.motion_blur,
        debug_pixel: args.debug_pixel,
        ..Default::default()
    };

    render(scene, bvh, camera, &mut screen, settings);

    let mut image_buffer = image::RgbImage::new(screen.width(), screen.height());
    for y in 0..screen.height() {
        for x in 0..screen.width() {
            let color = screen.get_pixel(x, screen.height() - 1 - y);
            let to_u8 = |c: f32| (c.clamp(0.0, 1.0) * 255.0) as u8;
            image_buffer.put_pixel(x, y, image::Rgb([to_u8(color.x), to_u8(color.y), to_u8(color.z)]));
        }
    }

    image_buffer.save(&args.out).expect("failed to write output image");
    tracing::info!(path = %args.out.display(), "render written");
}
