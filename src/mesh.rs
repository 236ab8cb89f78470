//! Vertex and face buffers as handed over by the geometry collaborator.
//!
//! File readers live outside this crate. The procedural shapes below cover the
//! meshes the game uses (link cylinders, target spheres, the objective block)
//! so sessions and tests can run without assets.

use glam::Vec3;
use std::f32::consts::PI;

/// Opaque reference to a mesh owned by the geometry/rendering side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MeshHandle(pub usize);

#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vec3>,
    pub faces: Vec<[u32; 3]>,
}

impl MeshData {
    pub fn new(vertices: Vec<Vec3>, faces: Vec<[u32; 3]>) -> Self {
        Self { vertices, faces }
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn triangle(&self, face: usize) -> [Vec3; 3] {
        let [a, b, c] = self.faces[face];
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ]
    }

    pub fn uv_sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let mut vertices = Vec::new();
        let mut faces = Vec::new();

        for ring in 0..=rings {
            let phi = PI * ring as f32 / rings as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();

            for seg in 0..=segments {
                let theta = 2.0 * PI * seg as f32 / segments as f32;
                let (sin_theta, cos_theta) = theta.sin_cos();
                let normal = Vec3::new(sin_phi * cos_theta, cos_phi, sin_phi * sin_theta);
                vertices.push(normal * radius);
            }
        }

        for ring in 0..rings {
            for seg in 0..segments {
                let curr_ring = ring * (segments + 1);
                let next_ring = (ring + 1) * (segments + 1);

                faces.push([curr_ring + seg, next_ring + seg, next_ring + seg + 1]);
                faces.push([curr_ring + seg, next_ring + seg + 1, curr_ring + seg + 1]);
            }
        }

        Self { vertices, faces }
    }

    /// Capped cylinder centred on the origin, axis along `+Y`.
    pub fn cylinder(radius: f32, height: f32, segments: u32) -> Self {
        let mut vertices = Vec::new();
        let mut faces = Vec::new();
        let half_height = height / 2.0;

        for i in 0..=segments {
            let theta = 2.0 * PI * i as f32 / segments as f32;
            let (z, x) = theta.sin_cos();
            vertices.push(Vec3::new(x * radius, -half_height, z * radius));
            vertices.push(Vec3::new(x * radius, half_height, z * radius));
        }

        for i in 0..segments {
            let base = i * 2;
            faces.push([base, base + 1, base + 3]);
            faces.push([base, base + 3, base + 2]);
        }

        let bottom_center = vertices.len() as u32;
        vertices.push(Vec3::new(0.0, -half_height, 0.0));
        let top_center = vertices.len() as u32;
        vertices.push(Vec3::new(0.0, half_height, 0.0));

        for i in 0..segments {
            let (b0, b1) = (i * 2, (i + 1) * 2);
            faces.push([bottom_center, b1, b0]);
            faces.push([top_center, b0 + 1, b1 + 1]);
        }

        Self { vertices, faces }
    }

    /// Axis-aligned box centred on the origin.
    pub fn cuboid(half_extents: Vec3) -> Self {
        let h = half_extents;
        let vertices = vec![
            Vec3::new(-h.x, -h.y, -h.z),
            Vec3::new(h.x, -h.y, -h.z),
            Vec3::new(h.x, h.y, -h.z),
            Vec3::new(-h.x, h.y, -h.z),
            Vec3::new(-h.x, -h.y, h.z),
            Vec3::new(h.x, -h.y, h.z),
            Vec3::new(h.x, h.y, h.z),
            Vec3::new(-h.x, h.y, h.z),
        ];
        let faces = vec![
            [0, 2, 1],
            [0, 3, 2],
            [4, 5, 6],
            [4, 6, 7],
            [0, 1, 5],
            [0, 5, 4],
            [3, 7, 6],
            [3, 6, 2],
            [0, 4, 7],
            [0, 7, 3],
            [1, 2, 6],
            [1, 6, 5],
        ];
        Self { vertices, faces }
    }
}
