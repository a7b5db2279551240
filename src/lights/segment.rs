use nalgebra::{Point3, Vector3};

/// A linear area light interpolating between two endpoint colors.
///
/// Sampling density is fixed at 10 instances per unit of segment length
/// (`original_source/src/main.cpp`, the `SegmentLight` branch of the light
/// loop): a 1-unit-long segment gets 11 point lights (`numLights + 1`,
/// inclusive of both endpoints). `numLights` is floored at 1 so a
/// zero-length or sub-tenth-unit segment still yields its two endpoints
/// instead of dividing by zero.
#[derive(Debug, Clone, Copy)]
pub struct SegmentLight {
    pub endpoint0: Point3<f32>,
    pub endpoint1: Point3<f32>,
    pub color0: Vector3<f32>,
    pub color1: Vector3<f32>,
}

impl SegmentLight {
    pub fn sample_instances(&self) -> Vec<(Point3<f32>, Vector3<f32>)> {
        let segment_vector = self.endpoint1 - self.endpoint0;
        let length = segment_vector.norm();
        if length < f32::EPSILON {
            return vec![(self.endpoint0, (self.color0 + self.color1) * 0.5)];
        }

        let direction = segment_vector / length;
        let num_lights = ((length * 10.0).floor() as u32).max(1);

        (0..=num_lights)
            .map(|i| {
                let current_pos = self.endpoint0 + direction * (length / num_lights as f32) * i as f32;

                let length_alpha = (current_pos - self.endpoint0).norm();
                let length_beta = length - length_alpha;
                let color = (self.color1 * (length_alpha / length) + self.color0 * (length_beta / length)) / 10.0;

                (current_pos, color)
            })
            .collect()
    }
}
