//! Single-pixel interactive debug-ray recording.
//!
//! The interactive viewer (a collaborator, not part of this crate) wants to
//! replay every ray cast while shading one selected pixel — primary,
//! shadow, and reflection rays alike — to draw them as an overlay. Grounded
//! on `original_source/src/draw.h`'s `drawRay` free function, which the
//! original calls unconditionally from deep inside the shading and
//! traversal code. A thread-local sink reproduces that "just call it from
//! anywhere" ergonomics without a global `Mutex` serializing the tiled
//! renderer's worker threads, and without a `lazy_static` global.

use std::cell::RefCell;

use nalgebra::{Point3, Vector3};

/// One recorded ray, with the color it was tagged with when drawn.
#[derive(Debug, Clone, Copy)]
pub struct DebugRay {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
    pub length: f32,
    pub color: Vector3<f32>,
}

thread_local! {
    static SINK: RefCell<Option<Vec<DebugRay>>> = RefCell::new(None);
}

/// Enables recording on the calling thread for the duration of `f`, then
/// returns whatever was recorded. Intended for single-pixel, single-threaded
/// debug renders; worker threads in the tiled scheduler never enable this.
pub fn record<R>(f: impl FnOnce() -> R) -> (R, Vec<DebugRay>) {
    SINK.with(|cell| *cell.borrow_mut() = Some(Vec::new()));
    let result = f();
    let rays = SINK.with(|cell| cell.borrow_mut().take().unwrap_or_default());
    (result, rays)
}

/// Records a ray if the calling thread currently has recording enabled;
/// otherwise a no-op. Safe to call unconditionally from shading code.
pub fn draw_ray(origin: Point3<f32>, direction: Vector3<f32>, length: f32, color: Vector3<f32>) {
    SINK.with(|cell| {
        if let Some(rays) = cell.borrow_mut().as_mut() {
            rays.push(DebugRay { origin, direction, length, color });
        }
    });
}
