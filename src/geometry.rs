//! Pure ray/primitive intersection kernels.
//!
//! None of these functions hold state or allocate. Each tightens `ray.t` only
//! when it finds a strictly closer, strictly positive-`t` hit; a `false`
//! return leaves `ray.t` exactly as it was. Grounded on
//! `original_source/src/ray_tracing.cpp` (`intersectRayWithPlane`,
//! `intersectRayWithTriangle`, `intersectRayWithShape`), expressed in a
//! nalgebra-based kernel style.

use nalgebra::{Point3, Vector3};

use crate::material::Material;

/// A ray in world space. `direction` is not required to be unit length on
/// input; every kernel here assumes it is, matching the reference.
#[derive(Debug, Copy, Clone)]
pub struct Ray {
    pub origin: Point3<f32>,
    pub direction: Vector3<f32>,
    /// Running nearest-hit parameter, initialized to `+inf`.
    pub t: f32,
}

impl Ray {
    pub fn new(origin: Point3<f32>, direction: Vector3<f32>) -> Self {
        Ray {
            origin,
            direction,
            t: f32::INFINITY,
        }
    }

    pub fn point_at(&self, t: f32) -> Point3<f32> {
        self.origin + self.direction * t
    }
}

/// Output of a successful intersection. Holds enough to shade the hit
/// without re-walking the scene: a unit shading normal, a fully-resolved
/// material (textures already sampled into `kd` where the mesh has one),
/// and — for triangle hits — the three world-space vertex positions, used
/// by the debug overlay and by tests that want to recompute barycentrics.
#[derive(Debug, Clone)]
pub struct HitInfo {
    pub normal: Vector3<f32>,
    pub material: Material,
    pub triangle_vertices: Option<[Point3<f32>; 3]>,
}

impl Default for HitInfo {
    fn default() -> Self {
        HitInfo {
            normal: Vector3::zeros(),
            material: Material::default(),
            triangle_vertices: None,
        }
    }
}

/// An infinite plane `{ p : dot(normal, p) = d }`.
#[derive(Debug, Copy, Clone)]
pub struct Plane {
    pub normal: Vector3<f32>,
    pub d: f32,
}

impl Plane {
    pub fn through_points(v0: Point3<f32>, v1: Point3<f32>, v2: Point3<f32>) -> Plane {
        let normal = (v0 - v2).cross(&(v1 - v2)).normalize();
        let d = normal.dot(&v0.coords);
        Plane { normal, d }
    }
}

/// Ray/plane intersection. Accepts iff `dot(normal, direction) != 0` and the
/// hit lies strictly between the ray origin and the current closest hit.
pub fn intersect_plane(ray: &mut Ray, plane: &Plane) -> bool {
    let denom = plane.normal.dot(&ray.direction);
    if denom == 0.0 {
        return false;
    }

    let t = (plane.d - plane.normal.dot(&ray.origin.coords)) / denom;
    if t > 0.0 && t < ray.t {
        ray.t = t;
        true
    } else {
        false
    }
}

/// Two-barycentric sign test: accepts points with `alpha, beta >= 0` and
/// `alpha + beta <= 1`. Assumes `p` is already known to lie in the triangle's
/// plane (the caller is expected to have derived `p` from a successful
/// ray/plane intersection against that same plane).
fn point_in_triangle(v0: Point3<f32>, v1: Point3<f32>, v2: Point3<f32>, n: Vector3<f32>, p: Point3<f32>) -> bool {
    let n_len_sq = n.dot(&n);
    let alpha = n.dot(&(v2 - v1).cross(&(p - v1))) / n_len_sq;
    let beta = n.dot(&(v0 - v2).cross(&(p - v2))) / n_len_sq;

    !(alpha < 0.0 || beta < 0.0 || alpha + beta > 1.0)
}

/// Ray/triangle intersection. On success, `hit.normal` is set to the
/// triangle's (unnormalized-then-normalized) geometric plane normal; BVH
/// traversal overwrites it with the interpolated shading normal afterwards.
pub fn intersect_triangle(ray: &mut Ray, hit: &mut HitInfo, v0: Point3<f32>, v1: Point3<f32>, v2: Point3<f32>) -> bool {
    let plane = Plane::through_points(v0, v1, v2);
    let original_t = ray.t;

    if !intersect_plane(ray, &plane) {
        return false;
    }

    let p = ray.point_at(ray.t);
    let unnormalized_normal = (v0 - v2).cross(&(v1 - v2));
    if point_in_triangle(v0, v1, v2, unnormalized_normal, p) {
        hit.normal = plane.normal;
        true
    } else {
        ray.t = original_t;
        false
    }
}

/// Ray/sphere intersection via the quadratic `A t^2 + B t + C = 0`. Picks the
/// smallest strictly-positive root closer than `ray.t`.
pub fn intersect_sphere(ray: &mut Ray, hit: &mut HitInfo, center: Point3<f32>, radius: f32, material: &Material) -> bool {
    let to_origin = ray.origin - center;
    let a = ray.direction.dot(&ray.direction);
    let b = to_origin.dot(&ray.direction);
    let c = to_origin.dot(&to_origin) - radius * radius;

    let discriminant = b * b - a * c;
    if discriminant < 0.0 {
        return false;
    }

    let sqrt_disc = discriminant.sqrt();
    let near = (-b - sqrt_disc) / a;
    let far = (-b + sqrt_disc) / a;

    let chosen = if near > 0.0 && near < ray.t {
        Some(near)
    } else if far > 0.0 && far < ray.t {
        Some(far)
    } else {
        None
    };

    match chosen {
        Some(t) => {
            ray.t = t;
            let p = ray.point_at(t);
            hit.normal = (p - center).normalize();
            hit.material = material.clone();
            hit.triangle_vertices = None;
            true
        }
        None => false,
    }
}

/// Axis-aligned bounding box, `[lower, upper]` inclusive on both ends.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub lower: Point3<f32>,
    pub upper: Point3<f32>,
}

impl Aabb {
    pub fn empty() -> Aabb {
        Aabb {
            lower: Point3::new(f32::INFINITY, f32::INFINITY, f32::INFINITY),
            upper: Point3::new(f32::NEG_INFINITY, f32::NEG_INFINITY, f32::NEG_INFINITY),
        }
    }

    pub fn engulf(&mut self, p: Point3<f32>) {
        self.lower = Point3::new(self.lower.x.min(p.x), self.lower.y.min(p.y), self.lower.z.min(p.z));
        self.upper = Point3::new(self.upper.x.max(p.x), self.upper.y.max(p.y), self.upper.z.max(p.z));
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        let mut out = *self;
        out.engulf(other.lower);
        out.engulf(other.upper);
        out
    }

    /// Slab-method ray/box test. Boolean-only for traversal ranking, but
    /// tightens `ray.t` to the entry distance so callers can order children
    /// by which box the ray reaches first.
    pub fn intersect(&self, ray: &mut Ray) -> bool {
        let mut t_min = f32::NEG_INFINITY;
        let mut t_max = ray.t;

        for axis in 0..3 {
            let origin = ray.origin[axis];
            let dir = ray.direction[axis];
            let lower = self.lower[axis];
            let upper = self.upper[axis];

            if dir == 0.0 {
                if origin < lower || origin > upper {
                    return false;
                }
                continue;
            }

            let inv_dir = 1.0 / dir;
            let mut t1 = (lower - origin) * inv_dir;
            let mut t2 = (upper - origin) * inv_dir;
            if inv_dir < 0.0 {
                std::mem::swap(&mut t1, &mut t2);
            }

            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
            if t_min > t_max {
                return false;
            }
        }

        if t_max < 0.0 {
            return false;
        }

        ray.t = t_min.max(0.0);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn triangle_straight_on_hit() {
        let v0 = Point3::new(-1.0, -1.0, -2.0);
        let v1 = Point3::new(1.0, -1.0, -2.0);
        let v2 = Point3::new(0.0, 1.0, -2.0);

        let mut ray = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -1.0));
        let mut hit = HitInfo::default();

        assert!(intersect_triangle(&mut ray, &mut hit, v0, v1, v2));
        assert_relative_eq!(ray.t, 2.0, epsilon = 1e-5);
        assert_relative_eq!(hit.normal, Vector3::new(0.0, 0.0, 1.0), epsilon = 1e-5);
    }

    #[test]
    fn triangle_miss_behind_ray() {
        let v0 = Point3::new(-1.0, -1.0, -2.0);
        let v1 = Point3::new(1.0, -1.0, -2.0);
        let v2 = Point3::new(0.0, 1.0, -2.0);

        let mut ray = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, 1.0));
        let mut hit = HitInfo::default();

        assert!(!intersect_triangle(&mut ray, &mut hit, v0, v1, v2));
        assert_eq!(ray.t, f32::INFINITY);
    }

    #[test]
    fn sphere_from_outside_picks_near_root() {
        let material = Material::default();
        let mut ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        let mut hit = HitInfo::default();

        assert!(intersect_sphere(&mut ray, &mut hit, Point3::origin(), 1.0, &material));
        assert_relative_eq!(ray.t, 4.0, epsilon = 1e-5);
        assert_relative_eq!(hit.normal, Vector3::new(0.0, 0.0, -1.0), epsilon = 1e-5);
    }

    #[test]
    fn sphere_from_center_hits_one_positive_root() {
        let material = Material::default();
        let direction = Vector3::new(1.0, 2.0, 3.0).normalize();
        let mut ray = Ray::new(Point3::origin(), direction);
        let mut hit = HitInfo::default();

        assert!(intersect_sphere(&mut ray, &mut hit, Point3::origin(), 1.0, &material));
        assert_relative_eq!(ray.t, 1.0, epsilon = 1e-5);
        assert_relative_eq!(hit.normal, direction, epsilon = 1e-5);
    }

    #[test]
    fn aabb_slab_hits_enclosing_box() {
        let aabb = Aabb {
            lower: Point3::new(-1.0, -1.0, -1.0),
            upper: Point3::new(1.0, 1.0, 1.0),
        };
        let mut ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(aabb.intersect(&mut ray));
        assert_relative_eq!(ray.t, 4.0, epsilon = 1e-5);
    }

    #[test]
    fn aabb_slab_misses_box_to_the_side() {
        let aabb = Aabb {
            lower: Point3::new(-1.0, -1.0, -1.0),
            upper: Point3::new(1.0, 1.0, 1.0),
        };
        let mut ray = Ray::new(Point3::new(10.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        assert!(!aabb.intersect(&mut ray));
    }
}
