//! Camera contract.
//!
//! Building an actual trackball/pinhole camera (position, target, fov,
//! basis vectors) is a collaborator's job; the renderer here only needs
//! something that turns a normalized device coordinate into a primary ray.

use nalgebra::Vector2;

use crate::geometry::Ray;

/// `(-1, -1)` is the bottom-left corner of the image, `(1, 1)` the top
/// right, matching `original_source/src/main.cpp`'s `normalizedPixelPos`
/// convention.
pub trait Camera {
    fn generate_ray(&self, ndc: Vector2<f32>) -> Ray;
}
