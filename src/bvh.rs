//! Bounding volume hierarchy: top-down median-split construction and
//! traversal.
//!
//! Grounded on `original_source/src/bounding_volume_hierarchy.cpp`
//! (`fillNodeVector`, `doSplitting`, the free `intersect` function) with
//! node storage as a flat arena of indices rather than the reference's
//! pointer-laden `Node` tree. Nodes are appended in post-order (children
//! before parents), so a child is always stored at a lower array index than
//! its parent and the root is always the last element — no lifetimes, no
//! `Box`.

use std::collections::HashSet;

use nalgebra::Point3;

use crate::geometry::{intersect_sphere, intersect_triangle, Aabb, HitInfo, Ray};
use crate::scene::{Scene, TriangleRef};

/// Fixed tree depth, matching the reference's `numLevels()` constant.
pub const MAX_DEPTH: u32 = 4;

#[derive(Debug, Clone)]
enum NodeContent {
    Leaf(Vec<TriangleRef>),
    Internal([u32; 2]),
}

#[derive(Debug, Clone)]
struct Node {
    aabb: Aabb,
    content: NodeContent,
}

#[derive(Debug, Clone)]
pub struct Bvh {
    nodes: Vec<Node>,
}

impl Bvh {
    /// Builds the tree over every triangle in `scene`. Spheres are not
    /// inserted; they are brute-forced separately in [`Bvh::intersect`].
    pub fn build(scene: &Scene) -> Bvh {
        let triangles = scene.triangle_table();
        let mut nodes = Vec::new();

        if triangles.is_empty() {
            nodes.push(Node {
                aabb: Aabb::empty(),
                content: NodeContent::Leaf(Vec::new()),
            });
            return Bvh { nodes };
        }

        build_recursive(scene, triangles, 0, 0, &mut nodes);
        Bvh { nodes }
    }

    pub fn num_levels(&self) -> u32 {
        MAX_DEPTH
    }

    fn root_index(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Collects the AABBs of every node at `level` (root = level 0), for an
    /// external debug overlay to draw.
    pub fn nodes_at_level(&self, level: u32) -> Vec<Aabb> {
        let mut out = Vec::new();
        self.collect_level(self.root_index(), 0, level, &mut out);
        out
    }

    fn collect_level(&self, index: usize, current: u32, target: u32, out: &mut Vec<Aabb>) {
        if current == target {
            out.push(self.nodes[index].aabb);
            return;
        }
        if let NodeContent::Internal([left, right]) = &self.nodes[index].content {
            self.collect_level(*left as usize, current + 1, target, out);
            self.collect_level(*right as usize, current + 1, target, out);
        }
    }

    /// Finds the nearest hit along `ray`, among both the tree's triangles
    /// and the scene's spheres. Tightens `ray.t` and fills `hit` only when
    /// it returns `true`.
    pub fn intersect(&self, ray: &mut Ray, hit: &mut HitInfo, scene: &Scene) -> bool {
        let mut hit_any = false;
        for sphere in &scene.spheres {
            hit_any |= intersect_sphere(ray, hit, sphere.center, sphere.radius, &sphere.material);
        }

        let mut probe = *ray;
        if !self.nodes[self.root_index()].aabb.intersect(&mut probe) {
            return hit_any;
        }

        hit_any |= self.intersect_node(self.root_index(), ray, hit, scene);
        hit_any
    }

    fn intersect_node(&self, index: usize, ray: &mut Ray, hit: &mut HitInfo, scene: &Scene) -> bool {
        match &self.nodes[index].content {
            NodeContent::Leaf(triangles) => {
                let mut hit_any = false;
                for &tri in triangles {
                    let [v0, v1, v2] = scene.triangle_vertices(tri);
                    if intersect_triangle(ray, hit, v0.position, v1.position, v2.position) {
                        hit_any = true;

                        let p = ray.point_at(ray.t);
                        let area_total = (v1.position - v0.position).cross(&(v2.position - v0.position)).norm();
                        let area0 = (v1.position - p).cross(&(v2.position - p)).norm();
                        let area1 = (v2.position - p).cross(&(v0.position - p)).norm();
                        let area2 = (v0.position - p).cross(&(v1.position - p)).norm();
                        let w0 = area0 / area_total;
                        let w1 = area1 / area_total;
                        let w2 = area2 / area_total;

                        hit.normal = (v0.normal * w0 + v1.normal * w1 + v2.normal * w2).normalize();
                        let uv = v0.tex_coord * w0 + v1.tex_coord * w1 + v2.tex_coord * w2;

                        let mesh = &scene.meshes[tri.mesh_index as usize];
                        let mut material = mesh.material.clone();
                        material.kd = material.resolved_kd(uv);
                        hit.material = material;
                        hit.triangle_vertices = Some([v0.position, v1.position, v2.position]);
                    }
                }
                hit_any
            }
            NodeContent::Internal([left, right]) => {
                let original_t = ray.t;

                let mut probe_left = *ray;
                let hit_left_box = self.nodes[*left as usize].aabb.intersect(&mut probe_left);
                ray.t = original_t;

                let mut probe_right = *ray;
                let hit_right_box = self.nodes[*right as usize].aabb.intersect(&mut probe_right);
                ray.t = original_t;

                match (hit_left_box, hit_right_box) {
                    (true, true) => {
                        let a = self.intersect_node(*left as usize, ray, hit, scene);
                        let b = self.intersect_node(*right as usize, ray, hit, scene);
                        a || b
                    }
                    (true, false) => self.intersect_node(*left as usize, ray, hit, scene),
                    (false, true) => self.intersect_node(*right as usize, ray, hit, scene),
                    (false, false) => false,
                }
            }
        }
    }
}

fn centroid(scene: &Scene, tri: TriangleRef, axis: usize) -> f32 {
    let [v0, v1, v2] = scene.triangle_vertices(tri);
    (v0.position[axis] + v1.position[axis] + v2.position[axis]) / 3.0
}

fn triangle_aabb(scene: &Scene, tri: TriangleRef) -> Aabb {
    let [v0, v1, v2] = scene.triangle_vertices(tri);
    let mut aabb = Aabb::empty();
    aabb.engulf(v0.position);
    aabb.engulf(v1.position);
    aabb.engulf(v2.position);
    aabb
}

fn bounds_of(scene: &Scene, triangles: &[TriangleRef]) -> Aabb {
    triangles.iter().fold(Aabb::empty(), |acc, &tri| acc.union(&triangle_aabb(scene, tri)))
}

/// Replicates the reference's cascading tie-break exactly: the vertex with
/// a strict max-x over both others wins; on a tie, the third vertex wins by
/// default rather than either of the tied ones.
fn split_vertex_x(corners: [Point3<f32>; 3]) -> f32 {
    if corners[0].x > corners[1].x && corners[0].x > corners[2].x {
        corners[0].x
    } else if corners[1].x > corners[0].x && corners[1].x > corners[2].x {
        corners[1].x
    } else {
        corners[2].x
    }
}

fn split_vertex_y(corners: [Point3<f32>; 3]) -> f32 {
    if corners[0].y < corners[1].y && corners[0].y < corners[2].y {
        corners[0].y
    } else if corners[1].y < corners[0].y && corners[1].y < corners[2].y {
        corners[1].y
    } else {
        corners[2].y
    }
}

fn split_vertex_z(corners: [Point3<f32>; 3]) -> f32 {
    if corners[0].z < corners[1].z && corners[0].z < corners[2].z {
        corners[0].z
    } else if corners[1].z < corners[0].z && corners[1].z < corners[2].z {
        corners[1].z
    } else {
        corners[2].z
    }
}

/// Splits `triangles` into (first, second) groups by the median-triangle
/// vertex predicate. `axis_mod` cycles 0 (x), 1 (y), 2 (z). The x axis uses
/// a max-vertex, `<=` membership test; y and z use a min-vertex, `>=` test —
/// this asymmetry is the reference's own and is kept intentionally rather
/// than symmetrized.
fn split(scene: &Scene, mut triangles: Vec<TriangleRef>, axis_mod: usize) -> (Vec<TriangleRef>, Vec<TriangleRef>) {
    triangles.sort_by(|&a, &b| centroid(scene, a, axis_mod).partial_cmp(&centroid(scene, b, axis_mod)).unwrap());

    let median = triangles[triangles.len() / 2];
    let [mv0, mv1, mv2] = scene.triangle_vertices(median);
    let corners = [mv0.position, mv1.position, mv2.position];

    let split_value = match axis_mod {
        0 => split_vertex_x(corners),
        1 => split_vertex_y(corners),
        _ => split_vertex_z(corners),
    };

    let first: Vec<TriangleRef> = triangles
        .iter()
        .copied()
        .filter(|&tri| {
            let [v0, v1, v2] = scene.triangle_vertices(tri);
            let coords = [v0.position[axis_mod], v1.position[axis_mod], v2.position[axis_mod]];
            if axis_mod == 0 {
                coords.iter().all(|&c| c <= split_value)
            } else {
                coords.iter().all(|&c| c >= split_value)
            }
        })
        .collect();

    let first_set: HashSet<TriangleRef> = first.iter().copied().collect();
    let second: Vec<TriangleRef> = triangles.into_iter().filter(|tri| !first_set.contains(tri)).collect();

    (first, second)
}

fn build_recursive(scene: &Scene, triangles: Vec<TriangleRef>, level: u32, axis: u32, nodes: &mut Vec<Node>) -> u32 {
    let aabb = bounds_of(scene, &triangles);

    if level == MAX_DEPTH - 1 || triangles.len() <= 1 {
        nodes.push(Node {
            aabb,
            content: NodeContent::Leaf(triangles),
        });
        return (nodes.len() - 1) as u32;
    }

    let (first, second) = split(scene, triangles, (axis % 3) as usize);

    let left = build_recursive(scene, first, level + 1, axis + 1, nodes);
    let right = build_recursive(scene, second, level + 1, axis + 1, nodes);

    nodes.push(Node {
        aabb,
        content: NodeContent::Internal([left, right]),
    });
    (nodes.len() - 1) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::material::Material;
    use crate::scene::{Mesh, Vertex};

    fn vertex(p: Point3<f32>) -> Vertex {
        Vertex {
            position: p,
            normal: Vector3::new(0.0, 0.0, 1.0),
            tex_coord: nalgebra::Vector2::zeros(),
        }
    }

    fn single_triangle_scene() -> Scene {
        let vertices = vec![
            vertex(Point3::new(-1.0, -1.0, 0.0)),
            vertex(Point3::new(1.0, -1.0, 0.0)),
            vertex(Point3::new(0.0, 1.0, 0.0)),
        ];
        let mesh = Mesh::new(vertices, vec![[0, 1, 2]], Material::default());
        Scene::new().with_mesh(mesh)
    }

    #[test]
    fn single_triangle_hit() {
        let scene = single_triangle_scene();
        let bvh = Bvh::build(&scene);

        let mut ray = Ray::new(Point3::new(0.0, 0.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        let mut hit = HitInfo::default();
        assert!(bvh.intersect(&mut ray, &mut hit, &scene));
        assert!((ray.t - 5.0).abs() < 1e-4);
    }

    #[test]
    fn miss_returns_false_and_leaves_ray_unchanged() {
        let scene = single_triangle_scene();
        let bvh = Bvh::build(&scene);

        let mut ray = Ray::new(Point3::new(10.0, 10.0, -5.0), Vector3::new(0.0, 0.0, 1.0));
        let mut hit = HitInfo::default();
        assert!(!bvh.intersect(&mut ray, &mut hit, &scene));
        assert_eq!(ray.t, f32::INFINITY);
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

    /// BVH traversal must agree with brute-force iteration over every
    /// triangle: same hit/miss verdict and the same nearest `t`.
    #[test]
    fn matches_brute_force_on_random_scene() {
        let mut rng = StdRng::seed_from_u64(42);

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
            let bvh_result = bvh.intersect(&mut bvh_ray, &mut bvh_hit, &scene);

            let mut brute_ray = Ray::new(origin, direction);
            let mut brute_hit = HitInfo::default();
            let mut brute_result = false;
            for mesh in &scene.meshes {
                for tri_idx in 0..mesh.triangles.len() {
                    let idx = mesh.triangles[tri_idx];
                    let v0 = mesh.vertices[idx[0] as usize].position;
                    let v1 = mesh.vertices[idx[1] as usize].position;
                    let v2 = mesh.vertices[idx[2] as usize].position;
                    if intersect_triangle(&mut brute_ray, &mut brute_hit, v0, v1, v2) {
                        brute_result = true;
                    }
                }
            }

            assert_eq!(bvh_result, brute_result);
            if bvh_result {
                assert!((bvh_ray.t - brute_ray.t).abs() < 1e-3, "bvh t={} brute t={}", bvh_ray.t, brute_ray.t);
            }
        }
    }
}
