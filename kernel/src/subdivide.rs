//! Loop subdivision with (semi-)sharp creases
//!
//! Each pass splits every triangle into four and smooths with the Loop
//! stencils. Creased, boundary and non-manifold edges switch to the crease
//! stencils; a crease of sharpness `s` in `(0, 1)` blends the two, and child
//! edges inherit `s - 1`.

use glam::Vec3;
use hashbrown::HashMap;

use crate::modifiers::MeshModifier;
use crate::topology::{edge_faces, vertex_neighbors};
use crate::types::{EdgeKey, Mesh, edge_key};

/// Loop subdivision modifier
///
/// # Example
/// ```
/// use pumpkin_kernel::*;
///
/// let mut mesh = generate_sphere(1.0, 8, 6).unwrap();
/// let before = mesh.triangle_count();
/// mesh.apply(Subdivide { iterations: 1 });
/// assert_eq!(mesh.triangle_count(), before * 4);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Subdivide {
    /// Number of subdivision passes
    pub iterations: u32,
}

impl Default for Subdivide {
    fn default() -> Self {
        Self { iterations: 1 }
    }
}

impl MeshModifier for Subdivide {
    fn apply(&self, mesh: &mut Mesh) {
        for _ in 0..self.iterations {
            *mesh = subdivide_once(mesh);
        }
    }
}

fn subdivide_once(mesh: &Mesh) -> Mesh {
    let vertex_count = mesh.vertex_count();
    let faces_of_edge = edge_faces(mesh);
    let neighbors = vertex_neighbors(mesh);

    let sharpness = |a: u32, b: u32| -> f32 {
        let key = edge_key(a, b);
        match faces_of_edge.get(&key) {
            Some(faces) if faces.len() == 2 => mesh.creases.get(&key).copied().unwrap_or(0.0),
            _ => f32::INFINITY,
        }
    };

    let mut result = Mesh::new();

    // Even (existing) vertices
    for v in 0..vertex_count as u32 {
        let p = mesh.position(v);
        let ring = &neighbors[v as usize];
        if ring.is_empty() {
            result.add_vertex(p);
            continue;
        }

        let n = ring.len() as f32;
        let beta = if ring.len() == 3 { 3.0 / 16.0 } else { 3.0 / (8.0 * n) };
        let ring_sum: Vec3 = ring.iter().map(|&u| mesh.position(u)).sum();
        let smooth = p * (1.0 - n * beta) + ring_sum * beta;

        let creased: Vec<(u32, f32)> = ring
            .iter()
            .map(|&u| (u, sharpness(v, u)))
            .filter(|&(_, s)| s > 0.0)
            .collect();

        let position = match creased.len() {
            0 | 1 => smooth,
            count => {
                let sharp = if count == 2 {
                    p * 0.75 + (mesh.position(creased[0].0) + mesh.position(creased[1].0)) * 0.125
                } else {
                    p
                };
                let weight = creased.iter().map(|&(_, s)| s.min(1.0)).sum::<f32>() / count as f32;
                smooth.lerp(sharp, weight)
            }
        };
        result.add_vertex(position);
    }

    // Odd (edge) vertices, numbered in first-seen order for determinism
    let mut midpoints: HashMap<EdgeKey, u32> = HashMap::with_capacity(faces_of_edge.len());
    for tri in mesh.indices.chunks_exact(3) {
        for k in 0..3 {
            let (a, b) = (tri[k], tri[(k + 1) % 3]);
            let key = edge_key(a, b);
            if midpoints.contains_key(&key) {
                continue;
            }
            let (pa, pb) = (mesh.position(a), mesh.position(b));
            let sharp = (pa + pb) * 0.5;
            let s = sharpness(a, b);

            let position = if s >= 1.0 {
                sharp
            } else {
                let opposite: Vec3 = faces_of_edge[&key]
                    .iter()
                    .map(|&t| {
                        let base = t * 3;
                        let corners = &mesh.indices[base..base + 3];
                        let other = corners
                            .iter()
                            .copied()
                            .find(|&c| c != a && c != b)
                            .unwrap_or(a);
                        mesh.position(other)
                    })
                    .sum();
                let smooth = (pa + pb) * 0.375 + opposite * 0.125;
                smooth.lerp(sharp, s)
            };
            midpoints.insert(key, result.add_vertex(position));
        }
    }

    for tri in mesh.indices.chunks_exact(3) {
        let (a, b, c) = (tri[0], tri[1], tri[2]);
        let ab = midpoints[&edge_key(a, b)];
        let bc = midpoints[&edge_key(b, c)];
        let ca = midpoints[&edge_key(c, a)];
        result.add_triangle(a, ab, ca);
        result.add_triangle(b, bc, ab);
        result.add_triangle(c, ca, bc);
        result.add_triangle(ab, bc, ca);
    }

    for (&(a, b), &s) in &mesh.creases {
        let child = s - 1.0;
        if child <= 0.0 {
            continue;
        }
        if let Some(&m) = midpoints.get(&(a, b)) {
            result.creases.insert(edge_key(a, m), child);
            result.creases.insert(edge_key(m, b), child);
        }
    }

    result.recompute_normals();
    result
}
