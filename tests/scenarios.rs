//! Integration scenarios exercising the public API end to end: scene
//! construction, BVH build, and shading together.

use nalgebra::{Point3, Vector2, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use whitted_raytracer::geometry::{intersect_sphere, intersect_triangle, HitInfo, Ray};
use whitted_raytracer::lights::{Light, PointLight};
use whitted_raytracer::material::Material;
use whitted_raytracer::scene::{Mesh, Scene, Vertex};
use whitted_raytracer::shading::shade;
use whitted_raytracer::Bvh;

fn vertex(p: Point3<f32>) -> Vertex {
    Vertex {
        position: p,
        normal: Vector3::new(0.0, 0.0, 1.0),
        tex_coord: Vector2::zeros(),
    }
}

fn s1_scene() -> Scene {
    let vertices = vec![
        vertex(Point3::new(-1.0, -1.0, -2.0)),
        vertex(Point3::new(1.0, -1.0, -2.0)),
        vertex(Point3::new(0.0, 1.0, -2.0)),
    ];
    let material = Material::new(Vector3::new(1.0, 1.0, 1.0), Vector3::zeros(), 1.0, 0.0).unwrap();
    let mesh = Mesh::new(vertices, vec![[0, 1, 2]], material);

    Scene::new().with_mesh(mesh).with_light(Light::Point(PointLight {
        position: Point3::new(-1.0, 1.0, -1.0),
        color: Vector3::new(1.0, 1.0, 1.0),
    }))
}

#[test]
fn s1_single_triangle_straight_on_hit() {
    let scene = s1_scene();
    let bvh = Bvh::build(&scene);

    let mut ray = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, -1.0));
    let color = shade(&mut ray, &scene, &bvh, 5);

    assert!((ray.t - 2.0).abs() < 1e-4);
    assert!(color.norm() > 0.0);
    assert!(color.x <= 1.0001 && color.y <= 1.0001 && color.z <= 1.0001);
}

#[test]
fn s2_ray_misses_all_geometry() {
    let scene = s1_scene();
    let bvh = Bvh::build(&scene);

    let mut ray = Ray::new(Point3::origin(), Vector3::new(0.0, 0.0, 1.0));
    let color = shade(&mut ray, &scene, &bvh, 5);

    assert_eq!(color, Vector3::zeros());
}

#[test]
fn s3_hard_shadow_from_coplanar_occluder() {
    let far_material = Material::new(Vector3::new(1.0, 1.0, 1.0), Vector3::zeros(), 1.0, 0.0).unwrap();
    let far = Mesh::new(
        vec![
            vertex(Point3::new(-5.0, -5.0, -10.0)),
            vertex(Point3::new(5.0, -5.0, -10.0)),
            vertex(Point3::new(0.0, 5.0, -10.0)),
        ],
        vec![[0, 1, 2]],
        far_material,
    );

    let near_material = Material::new(Vector3::new(1.0, 1.0, 1.0), Vector3::zeros(), 1.0, 0.0).unwrap();
    let near = Mesh::new(
        vec![
            vertex(Point3::new(-2.0, -2.0, -5.0)),
            vertex(Point3::new(2.0, -2.0, -5.0)),
            vertex(Point3::new(0.0, 2.0, -5.0)),
        ],
        vec![[0, 1, 2]],
        near_material,
    );

    let scene = Scene::new().with_mesh(far).with_mesh(near).with_light(Light::Point(PointLight {
        position: Point3::new(0.0, 0.0, 0.0),
        color: Vector3::new(1.0, 1.0, 1.0),
    }));
    let bvh = Bvh::build(&scene);

    let mut ray = Ray::new(Point3::new(0.0, 0.0, 10.0), Vector3::new(0.0, 0.0, -1.0));
    let color = shade(&mut ray, &scene, &bvh, 5);

    assert_eq!(color, Vector3::zeros());
}

#[test]
fn s4_sphere_ray_from_center_hits_single_positive_root() {
    let material = Material::default();
    let direction = Vector3::new(0.3, 0.6, 0.74).normalize();
    let mut ray = Ray::new(Point3::origin(), direction);
    let mut hit = HitInfo::default();

    assert!(intersect_sphere(&mut ray, &mut hit, Point3::origin(), 2.0, &material));
    assert!((ray.t - 2.0).abs() < 1e-4);
    assert!((hit.normal - direction).norm() < 1e-4);
}

#[test]
fn s4_sphere_ray_from_outside_hits_nearest_root_facing_origin() {
    let material = Material::default();
    let mut ray = Ray::new(Point3::new(0.0, 0.0, -10.0), Vector3::new(0.0, 0.0, 1.0));
    let mut hit = HitInfo::default();

    assert!(intersect_sphere(&mut ray, &mut hit, Point3::origin(), 1.0, &material));
    assert!((ray.t - 9.0).abs() < 1e-4);
    assert!((hit.normal - Vector3::new(0.0, 0.0, -1.0)).norm() < 1e-4);
}

fn random_triangle(rng: &mut StdRng) -> [Point3<f32>; 3] {
    let mut rand_point = || Point3::new(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0));
    loop {
        let tri = [rand_point(), rand_point(), rand_point()];
        let area = (tri[1] - tri[0]).cross(&(tri[2] - tri[0])).norm();
        if area > 1e-3 {
            return tri;
        }
    }
}

#[test]
fn s5_bvh_matches_brute_force_on_random_scene() {
    let mut rng = StdRng::seed_from_u64(7);

    let mut vertices = Vec::new();
    let mut triangles = Vec::new();
    for _ in 0..500 {
        let tri = random_triangle(&mut rng);
        let base = vertices.len() as u32;
        vertices.push(vertex(tri[0]));
        vertices.push(vertex(tri[1]));
        vertices.push(vertex(tri[2]));
        triangles.push([base, base + 1, base + 2]);
    }
    let mesh = Mesh::new(vertices, triangles, Material::default());
    let scene = Scene::new().with_mesh(mesh);
    let bvh = Bvh::build(&scene);

    for _ in 0..1000 {
        let origin = Point3::new(rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0));
        let direction = Vector3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0)).normalize();

        let mut bvh_ray = Ray::new(origin, direction);
        let mut bvh_hit = HitInfo::default();
        let bvh_hit_found = bvh.intersect(&mut bvh_ray, &mut bvh_hit, &scene);

        let mut brute_ray = Ray::new(origin, direction);
        let mut brute_hit = HitInfo::default();
        let mut brute_hit_found = false;
        for m in &scene.meshes {
            for tri_idx in &m.triangles {
                let v0 = m.vertices[tri_idx[0] as usize].position;
                let v1 = m.vertices[tri_idx[1] as usize].position;
                let v2 = m.vertices[tri_idx[2] as usize].position;
                if intersect_triangle(&mut brute_ray, &mut brute_hit, v0, v1, v2) {
                    brute_hit_found = true;
                }
            }
        }

        assert_eq!(bvh_hit_found, brute_hit_found);
        if bvh_hit_found {
            assert!((bvh_ray.t - brute_ray.t).abs() < 1e-3);
        }
    }
}

#[test]
fn s6_mirror_reflection_converges_and_terminates() {
    let mirror_material = Material::new(Vector3::zeros(), Vector3::new(1.0, 1.0, 1.0), 1.0, 0.0).unwrap();

    let mirror_a = Mesh::new(
        vec![
            vertex(Point3::new(-5.0, -5.0, -5.0)),
            vertex(Point3::new(-5.0, -5.0, 5.0)),
            vertex(Point3::new(-5.0, 5.0, 5.0)),
        ],
        vec![[0, 1, 2]],
        mirror_material.clone(),
    );
    let mirror_b = Mesh::new(
        vec![
            vertex(Point3::new(-5.0, -5.0, -5.0)),
            vertex(Point3::new(5.0, -5.0, -5.0)),
            vertex(Point3::new(5.0, 5.0, -5.0)),
        ],
        vec![[0, 1, 2]],
        mirror_material,
    );

    let wall_material = Material::new(Vector3::new(0.8, 0.8, 0.8), Vector3::zeros(), 1.0, 0.0).unwrap();
    let wall = Mesh::new(
        vec![
            vertex(Point3::new(-10.0, -10.0, -10.0)),
            vertex(Point3::new(10.0, -10.0, -10.0)),
            vertex(Point3::new(10.0, 10.0, -10.0)),
        ],
        vec![[0, 1, 2]],
        wall_material,
    );

    let scene = Scene::new().with_mesh(mirror_a).with_mesh(mirror_b).with_mesh(wall).with_light(Light::Point(PointLight {
        position: Point3::new(0.0, 0.0, 0.0),
        color: Vector3::new(1.0, 1.0, 1.0),
    }));
    let bvh = Bvh::build(&scene);

    let mut ray_deep = Ray::new(Point3::new(-1.0, -1.0, 3.0), Vector3::new(-0.1, -0.1, -1.0).normalize());
    let color_deep = shade(&mut ray_deep, &scene, &bvh, 5);
    assert!(color_deep.iter().all(|c| c.is_finite()));

    let mut ray_zero = Ray::new(Point3::new(-1.0, -1.0, 3.0), Vector3::new(-0.1, -0.1, -1.0).normalize());
    let color_zero = shade(&mut ray_zero, &scene, &bvh, 0);
    assert!(color_zero.iter().all(|c| c.is_finite()));
}
