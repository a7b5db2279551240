use nalgebra::{Point3, Vector3};

/// A delta (zero-area) light: one position, one color, no sampling needed.
#[derive(Debug, Clone, Copy)]
pub struct PointLight {
    pub position: Point3<f32>,
    pub color: Vector3<f32>,
}
