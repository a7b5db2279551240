//! Scene data model: meshes, spheres and the flattened triangle table the
//! BVH builds over.
//!
//! Grounded on `original_source/src/scene.h` (`Mesh`/`Sphere`/`Scene`) and
//! `framework/include/framework/mesh.h` (`Vertex`).

use nalgebra::{Point3, Vector2, Vector3};
use tracing::warn;

use crate::lights::Light;
use crate::material::Material;

/// One mesh vertex: position plus the shading data needed to interpolate a
/// smooth normal and a texture coordinate across a hit triangle.
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
    pub tex_coord: Vector2<f32>,
}

/// A triangle mesh: shared vertex pool, index triples, one material for the
/// whole mesh (matching the reference, which keys material per-mesh rather
/// than per-triangle).
#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<[u32; 3]>,
    pub material: Material,
}

impl Mesh {
    /// Builds a mesh, dropping any triangle that indexes out of bounds or is
    /// degenerate (zero geometric area). Degenerate faces are logged and
    /// skipped rather than rejected outright, since a handful of bad faces
    /// in an otherwise-good mesh shouldn't abort the whole scene load.
    pub fn new(vertices: Vec<Vertex>, triangles: Vec<[u32; 3]>, material: Material) -> Mesh {
        let kept: Vec<[u32; 3]> = triangles
            .into_iter()
            .enumerate()
            .filter_map(|(i, tri)| {
                let in_bounds = tri.iter().all(|&idx| (idx as usize) < vertices.len());
                if !in_bounds {
                    warn!(triangle_id = i, "triangle references out-of-range vertex index, discarding");
                    return None;
                }

                let v0 = vertices[tri[0] as usize].position;
                let v1 = vertices[tri[1] as usize].position;
                let v2 = vertices[tri[2] as usize].position;
                let area_vector = (v1 - v0).cross(&(v2 - v0));
                if area_vector.norm_squared() < f32::EPSILON {
                    warn!(triangle_id = i, "triangle is degenerate (zero area), discarding");
                    return None;
                }

                Some(tri)
            })
            .collect();

        Mesh {
            vertices,
            triangles: kept,
            material,
        }
    }
}

/// A sphere primitive, intersected by brute-force iteration outside the BVH
/// (the reference never puts spheres in the tree; see `main.cpp`'s
/// `getFinalColor`, which walks `scene.spheres` directly).
#[derive(Debug, Clone)]
pub struct Sphere {
    pub center: Point3<f32>,
    pub radius: f32,
    pub material: Material,
}

/// Identifies one triangle by mesh index and local triangle index. The BVH
/// is built over a flat `Vec<TriangleRef>` rather than over `Mesh` directly,
/// so its leaves stay small integer indices instead of owning geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TriangleRef {
    pub mesh_index: u32,
    pub triangle_index: u32,
}

/// The full scene: meshes, spheres, lights. Owns everything the renderer
/// needs to trace a frame; camera and file loading are collaborator
/// concerns kept out of this type.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub meshes: Vec<Mesh>,
    pub spheres: Vec<Sphere>,
    pub lights: Vec<Light>,
}

impl Scene {
    pub fn new() -> Scene {
        Scene::default()
    }

    pub fn with_mesh(mut self, mesh: Mesh) -> Scene {
        self.meshes.push(mesh);
        self
    }

    pub fn with_sphere(mut self, sphere: Sphere) -> Scene {
        self.spheres.push(sphere);
        self
    }

    pub fn with_light(mut self, light: Light) -> Scene {
        self.lights.push(light);
        self
    }

    /// Flattens every mesh's triangles into the table the BVH is built
    /// over. A scene with no triangles at all (sphere-only scenes are
    /// common) yields an empty table; the BVH treats that as an empty root
    /// leaf rather than an error.
    pub fn triangle_table(&self) -> Vec<TriangleRef> {
        let mut table = Vec::new();
        for (mesh_index, mesh) in self.meshes.iter().enumerate() {
            for triangle_index in 0..mesh.triangles.len() {
                table.push(TriangleRef {
                    mesh_index: mesh_index as u32,
                    triangle_index: triangle_index as u32,
                });
            }
        }
        table
    }

    pub fn triangle_vertices(&self, tri: TriangleRef) -> [Vertex; 3] {
        let mesh = &self.meshes[tri.mesh_index as usize];
        let indices = mesh.triangles[tri.triangle_index as usize];
        [
            mesh.vertices[indices[0] as usize],
            mesh.vertices[indices[1] as usize],
            mesh.vertices[indices[2] as usize],
        ]
    }
}
