use nalgebra::{Point3, Vector3};

/// A planar area light with one color per corner, interpolated bilinearly.
///
/// Corners are `v0`, `v0 + edge01`, `v0 + edge02` and `v0 + edge01 + edge02`,
/// carrying `color0`..`color3` respectively (matching the corner/color
/// pairing drawn in `original_source/src/main.cpp`'s scene preview).
/// Sampling density is fixed at 20 instances per unit of edge length along
/// each edge, so a 1x1 light gets a 21x21 grid; each axis floors its count
/// at 1 to avoid degenerate (zero-area) lights dividing by zero.
///
/// The reference computes the interpolated color from sub-parallelogram
/// areas around a point whose third corner is built as
/// `edge01 + edge01 + v0` — an evident transcription slip (it should be
/// `edge01 + edge02 + v0`) that would skew colors off-axis. This
/// implementation uses standard bilinear interpolation over the correct
/// quad instead of reproducing that slip.
#[derive(Debug, Clone, Copy)]
pub struct ParallelogramLight {
    pub v0: Point3<f32>,
    pub edge01: Vector3<f32>,
    pub edge02: Vector3<f32>,
    pub color0: Vector3<f32>,
    pub color1: Vector3<f32>,
    pub color2: Vector3<f32>,
    pub color3: Vector3<f32>,
}

impl ParallelogramLight {
    pub fn sample_instances(&self) -> Vec<(Point3<f32>, Vector3<f32>)> {
        let edge01_length = self.edge01.norm();
        let edge02_length = self.edge02.norm();

        let num_u = ((edge01_length * 20.0).floor() as u32).max(1);
        let num_v = ((edge02_length * 20.0).floor() as u32).max(1);

        let mut samples = Vec::with_capacity(((num_u + 1) * (num_v + 1)) as usize);
        for i in 0..=num_u {
            let u = i as f32 / num_u as f32;
            for j in 0..=num_v {
                let v = j as f32 / num_v as f32;

                let position = self.v0 + self.edge01 * u + self.edge02 * v;
                let color = (self.color0 * (1.0 - u) * (1.0 - v)
                    + self.color1 * u * (1.0 - v)
                    + self.color2 * (1.0 - u) * v
                    + self.color3 * u * v)
                    / 400.0;

                samples.push((position, color));
            }
        }

        samples
    }
}
