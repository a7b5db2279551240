//! Whitted shading core: Phong local illumination, hard shadows and
//! recursive mirror reflection.
//!
//! Grounded on `original_source/src/main.cpp`'s `calculatePhongShading` and
//! `getFinalColor`. Each light contributes its own shadow test and, when
//! the surface is a mirror, its own recursive reflection bounce — the
//! reference adds the reflected radiance once per light rather than once
//! per ray, and this keeps that shape rather than hoisting reflection out
//! of the per-light loop.

use nalgebra::{Point3, Vector3};

use crate::bvh::Bvh;
use crate::debug;
use crate::geometry::{HitInfo, Ray};
use crate::scene::Scene;

/// Offset applied along the outgoing direction before casting a shadow or
/// reflection ray, to avoid a ray re-intersecting the surface it left.
const SELF_INTERSECTION_EPSILON: f32 = 1e-4;

/// Traces `ray` through `scene` via `bvh` and returns the shaded radiance.
/// `recursion_left` starts at the caller's max-recursion setting (5 by
/// convention) and is decremented on every mirror bounce; it reaching zero
/// is a normal terminating condition, not an error.
pub fn shade(ray: &mut Ray, scene: &Scene, bvh: &Bvh, recursion_left: u32) -> Vector3<f32> {
    let mut hit = HitInfo::default();
    if !bvh.intersect(ray, &mut hit, scene) {
        debug::draw_ray(ray.origin, ray.direction, 1.0, Vector3::new(1.0, 0.0, 0.0));
        return Vector3::zeros();
    }

    let vertex_pos = ray.point_at(ray.t);
    let mut color = Vector3::zeros();

    for light in &scene.lights {
        for (light_pos, light_color) in light.sample_instances() {
            color += shade_one_light(ray, vertex_pos, &hit, light_pos, light_color, scene, bvh, recursion_left);
        }
    }

    debug::draw_ray(ray.origin, ray.direction, ray.t, color);
    color
}

#[allow(clippy::too_many_arguments)]
fn shade_one_light(
    ray: &Ray,
    vertex_pos: Point3<f32>,
    hit: &HitInfo,
    light_pos: Point3<f32>,
    light_color: Vector3<f32>,
    scene: &Scene,
    bvh: &Bvh,
    recursion_left: u32,
) -> Vector3<f32> {
    let light_vector = (light_pos - vertex_pos).normalize();
    let normal = if light_vector.dot(&hit.normal) < 0.0 { -hit.normal } else { hit.normal };

    let diffuse = light_color.component_mul(&hit.material.kd) * light_vector.dot(&normal).max(0.0);

    let view_vector = (ray.origin - vertex_pos).normalize();
    let reflection_vector = (normal * 2.0 * normal.dot(&light_vector) - light_vector).normalize();
    let specular = light_color.component_mul(&hit.material.ks) * reflection_vector.dot(&view_vector).max(0.0).powf(hit.material.shininess);

    let mut phong = if view_vector.dot(&normal) < 0.0 && light_vector.dot(&normal) > 0.0 {
        Vector3::zeros()
    } else {
        diffuse + specular
    };

    if in_shadow(vertex_pos, light_pos, scene, bvh) {
        phong = Vector3::zeros();
    }

    if hit.material.ks != Vector3::zeros() && recursion_left > 0 {
        let reflection = normal * 2.0 * normal.dot(&view_vector) - view_vector;
        let mut reflected_ray = Ray::new(vertex_pos + reflection * SELF_INTERSECTION_EPSILON, reflection);
        phong += hit.material.ks.component_mul(&shade(&mut reflected_ray, scene, bvh, recursion_left - 1));
    }

    phong
}

fn in_shadow(vertex_pos: Point3<f32>, light_pos: Point3<f32>, scene: &Scene, bvh: &Bvh) -> bool {
    let direction = (light_pos - vertex_pos).normalize();
    let mut shadow_ray = Ray::new(vertex_pos + direction * SELF_INTERSECTION_EPSILON, direction);

    let mut shadow_hit = HitInfo::default();
    if !bvh.intersect(&mut shadow_ray, &mut shadow_hit, scene) {
        return false;
    }

    let distance_to_light = (light_pos - vertex_pos).norm();
    shadow_ray.t < distance_to_light
}
