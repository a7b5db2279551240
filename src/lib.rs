//! Whitted-style ray tracer core: BVH acceleration over triangle meshes and
//! spheres, Phong local shading with hard shadows, recursive mirror
//! reflection, and point/segment/parallelogram area lights sampled by
//! deterministic stratification.
//!
//! Camera implementations, mesh/texture file loading, image export and
//! interactive visualization are left to callers; this crate owns scene
//! representation, acceleration, and shading only.

pub mod bvh;
pub mod camera;
pub mod debug;
pub mod error;
pub mod geometry;
pub mod lights;
pub mod material;
pub mod renderer;
pub mod scene;
pub mod shading;

pub use bvh::Bvh;
pub use error::RayTracerError;
pub use geometry::{HitInfo, Ray};
pub use material::Material;
pub use renderer::{render, RenderSettings, Screen};
pub use scene::Scene;
