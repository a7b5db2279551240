//! Light sources and their deterministic virtual-point-light sampling.
//!
//! `Light` is a plain enum with match dispatch rather than a trait object —
//! the per-light inner loop in the shading core is hot and the set of
//! light shapes is closed. There is no stochastic sampling anywhere here:
//! every area light stratifies into a fixed, position-derived grid of
//! point-light instances, so two renders of the same scene always shade
//! identically.

pub mod parallelogram;
pub mod point;
pub mod segment;

use nalgebra::{Point3, Vector3};

pub use parallelogram::ParallelogramLight;
pub use point::PointLight;
pub use segment::SegmentLight;

#[derive(Debug, Clone)]
pub enum Light {
    Point(PointLight),
    Segment(SegmentLight),
    Parallelogram(ParallelogramLight),
}

impl Light {
    /// Expands this light into the point-light instances a shader should
    /// sum contributions over. A `PointLight` yields exactly one instance
    /// at full intensity; area lights yield a stratified grid whose
    /// intensities already sum to the light's total emitted color.
    pub fn sample_instances(&self) -> Vec<(Point3<f32>, Vector3<f32>)> {
        match self {
            Light::Point(light) => vec![(light.position, light.color)],
            Light::Segment(light) => light.sample_instances(),
            Light::Parallelogram(light) => light.sample_instances(),
        }
    }
}
