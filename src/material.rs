//! Surface appearance.
//!
//! A Whitted renderer only ever needs one fixed bundle of Phong
//! coefficients per surface (diffuse, specular, shininess, transparency),
//! so this is a single plain struct that `shading.rs` branches on directly,
//! rather than a trait object dispatching over several unrelated BSDFs.
//! There is no separate mirror weight: `ks` itself drives both the
//! specular highlight and the recursive reflection contribution.

use std::sync::Arc;

use nalgebra::Vector3;

use crate::error::RayTracerError;

/// A single-mip, nearest-neighbor-sampled RGB texture. Mesh loading and
/// mipmap generation are collaborator concerns; this only stores and samples
/// texels that have already been decoded.
#[derive(Debug, Clone)]
pub struct Image {
    width: u32,
    height: u32,
    texels: Vec<Vector3<f32>>,
}

impl Image {
    pub fn new(width: u32, height: u32, texels: Vec<Vector3<f32>>) -> Image {
        assert_eq!(texels.len(), (width as usize) * (height as usize));
        Image { width, height, texels }
    }

    /// Nearest-neighbor lookup at UV coordinates, wrapped into `[0, 1)`.
    pub fn texel(&self, uv: nalgebra::Vector2<f32>) -> Vector3<f32> {
        let u = uv.x.rem_euclid(1.0);
        let v = uv.y.rem_euclid(1.0);

        let x = ((u * self.width as f32) as u32).min(self.width - 1);
        let y = ((v * self.height as f32) as u32).min(self.height - 1);

        self.texels[(y * self.width + x) as usize]
    }
}

/// Phong coefficients. `diffuse_texture`, when present, replaces `kd` with a
/// texel lookup at BVH leaf time rather than being sampled inside the
/// shading loop itself. Reflectivity has no dedicated field: a non-zero
/// `ks` is itself the weight `shading.rs` uses for the recursive mirror
/// bounce, matching `calculatePhongShading`'s `reflectivity = material.ks`.
#[derive(Debug, Clone)]
pub struct Material {
    pub kd: Vector3<f32>,
    pub ks: Vector3<f32>,
    pub shininess: f32,
    /// 0 = opaque, 1 = fully see-through. Only used to decide whether a
    /// shadow ray is blocked; the core does not refract or blend colors.
    pub transparency: f32,
    pub diffuse_texture: Option<Arc<Image>>,
}

impl Default for Material {
    fn default() -> Self {
        Material {
            kd: Vector3::new(0.8, 0.8, 0.8),
            ks: Vector3::zeros(),
            shininess: 1.0,
            transparency: 0.0,
            diffuse_texture: None,
        }
    }
}

impl Material {
    pub fn new(kd: Vector3<f32>, ks: Vector3<f32>, shininess: f32, transparency: f32) -> Result<Material, RayTracerError> {
        if shininess < 0.0 || !shininess.is_finite() {
            return Err(RayTracerError::InvalidMaterial {
                reason: format!("shininess must be finite and non-negative, got {shininess}"),
            });
        }
        if !(0.0..=1.0).contains(&transparency) {
            return Err(RayTracerError::InvalidMaterial {
                reason: format!("transparency must be in [0, 1], got {transparency}"),
            });
        }

        Ok(Material {
            kd,
            ks,
            shininess,
            transparency,
            diffuse_texture: None,
        })
    }

    pub fn with_diffuse_texture(mut self, image: Arc<Image>) -> Material {
        self.diffuse_texture = Some(image);
        self
    }

    /// Resolves `kd` against the diffuse texture at the given UV, if any.
    pub fn resolved_kd(&self, uv: nalgebra::Vector2<f32>) -> Vector3<f32> {
        match &self.diffuse_texture {
            Some(image) => image.texel(uv),
            None => self.kd,
        }
    }
}
