//! Framebuffer and the data-parallel tiled render scheduler.
//!
//! A `Mutex`-guarded work queue of tiles is handed out to a fixed pool of
//! `std::thread` workers, each pulling the next tile until the queue drains.
//! Tiles are popped in a fixed order rather than a random one — nothing here
//! needs `rand` and per-pixel results must be reproducible. NDC generation
//! and the bottom-to-top `y` scan follow
//! `original_source/src/main.cpp::renderRayTracing`.

use std::sync::{Arc, Mutex};
use std::thread;

use nalgebra::Vector3;
use tracing::info;

use crate::bvh::Bvh;
use crate::camera::Camera;
use crate::debug;
use crate::scene::Scene;
use crate::shading::shade;

/// A contiguous row-major framebuffer of linear RGB radiance.
#[derive(Debug, Clone)]
pub struct Screen {
    width: u32,
    height: u32,
    pixels: Vec<Vector3<f32>>,
}

impl Screen {
    pub fn new(width: u32, height: u32) -> Screen {
        Screen {
            width,
            height,
            pixels: vec![Vector3::zeros(); (width as usize) * (height as usize)],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, color: Vector3<f32>) {
        let color = if color.iter().all(|c| c.is_finite()) { color } else { Vector3::zeros() };
        self.pixels[(y as usize) * (self.width as usize) + (x as usize)] = color;
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> Vector3<f32> {
        self.pixels[(y as usize) * (self.width as usize) + (x as usize)]
    }

    pub fn pixels(&self) -> &[Vector3<f32>] {
        &self.pixels
    }
}

#[derive(Debug, Copy, Clone)]
pub struct RenderSettings {
    pub thread_count: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    pub max_recursion: u32,
    pub motion_blur: bool,
    /// When set, the single named pixel is re-shaded on the calling thread
    /// after the parallel pass completes, with ray recording enabled; the
    /// recorded rays are logged for an external debug overlay to consume.
    pub debug_pixel: Option<(u32, u32)>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            thread_count: 4,
            tile_width: 32,
            tile_height: 32,
            max_recursion: 5,
            motion_blur: false,
            debug_pixel: None,
        }
    }
}

#[derive(Debug, Copy, Clone)]
struct Tile {
    x: u32,
    y: u32,
}

struct WorkQueue {
    tiles: Vec<Tile>,
}

impl WorkQueue {
    fn new(width: u32, height: u32, settings: &RenderSettings) -> WorkQueue {
        let mut tiles = Vec::new();
        let tiles_x = (width as f32 / settings.tile_width as f32).ceil() as u32;
        let tiles_y = (height as f32 / settings.tile_height as f32).ceil() as u32;

        for ty in 0..tiles_y {
            for tx in 0..tiles_x {
                tiles.push(Tile {
                    x: tx * settings.tile_width,
                    y: ty * settings.tile_height,
                });
            }
        }

        WorkQueue { tiles }
    }

    fn next(&mut self) -> Option<Tile> {
        self.tiles.pop()
    }
}

/// Converts a pixel coordinate into the normalized device coordinates the
/// camera expects, with `y` increasing upward (row 0 is the bottom row).
fn ndc(x: u32, y: u32, width: u32, height: u32) -> nalgebra::Vector2<f32> {
    nalgebra::Vector2::new(
        (x as f32) / (width as f32) * 2.0 - 1.0,
        (y as f32) / (height as f32) * 2.0 - 1.0,
    )
}

/// Averages 10 samples of the primary ray, each nudged by a cumulative
/// `(0.004, 0.004, 0)` origin offset, matching `motionBlur` in the
/// reference. The direction is left untouched; only the origin drifts.
fn motion_blur_sample(camera_ray: crate::geometry::Ray, scene: &Scene, bvh: &Bvh, max_recursion: u32) -> Vector3<f32> {
    let mut origin = camera_ray.origin;
    let mut total = Vector3::zeros();

    for _ in 0..10 {
        origin += Vector3::new(0.004, 0.004, 0.0);
        let mut ray = crate::geometry::Ray::new(origin, camera_ray.direction);
        total += shade(&mut ray, scene, bvh, max_recursion);
    }

    total / 10.0
}

/// Renders `scene` through `camera` into `screen`, splitting the image
/// into tiles processed by `settings.thread_count` worker threads.
pub fn render(scene: Arc<Scene>, bvh: Arc<Bvh>, camera: Arc<dyn Camera + Send + Sync>, screen: &mut Screen, settings: RenderSettings) {
    let width = screen.width();
    let height = screen.height();

    info!(width, height, threads = settings.thread_count, "starting render");

    let work_queue = Arc::new(Mutex::new(WorkQueue::new(width, height, &settings)));
    let results: Arc<Mutex<Vec<(u32, u32, Vector3<f32>)>>> = Arc::new(Mutex::new(Vec::new()));

    thread::scope(|scope| {
        for _ in 0..settings.thread_count.max(1) {
            let work_queue = Arc::clone(&work_queue);
            let results = Arc::clone(&results);
            let scene = Arc::clone(&scene);
            let bvh = Arc::clone(&bvh);
            let camera = Arc::clone(&camera);

            scope.spawn(move || loop {
                let tile = {
                    let mut queue = work_queue.lock().unwrap();
                    queue.next()
                };
                let Some(tile) = tile else { break };

                let x_end = (tile.x + settings.tile_width).min(width);
                let y_end = (tile.y + settings.tile_height).min(height);

                let mut tile_results = Vec::new();
                for y in tile.y..y_end {
                    for x in tile.x..x_end {
                        let point = ndc(x, y, width, height);
                        let camera_ray = camera.generate_ray(point);

                        let color = if settings.motion_blur {
                            motion_blur_sample(camera_ray, &scene, &bvh, settings.max_recursion)
                        } else {
                            let mut ray = camera_ray;
                            shade(&mut ray, &scene, &bvh, settings.max_recursion)
                        };

                        tile_results.push((x, y, color));
                    }
                }

                results.lock().unwrap().extend(tile_results);
            });
        }
    });

    for (x, y, color) in Arc::try_unwrap(results).unwrap().into_inner().unwrap() {
        screen.set_pixel(x, y, color);
    }

    if let Some((x, y)) = settings.debug_pixel {
        let point = ndc(x, y, width, height);
        let mut ray = camera.generate_ray(point);
        let (color, rays) = debug::record(|| shade(&mut ray, &scene, &bvh, settings.max_recursion));
        info!(x, y, ray_count = rays.len(), ?color, "debug pixel recorded");
        for r in &rays {
            tracing::debug!(origin = ?r.origin, direction = ?r.direction, length = r.length, color = ?r.color, "debug ray");
        }
    }
}
