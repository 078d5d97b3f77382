//! Mesh types
//!
//! Shared types for the geometry kernel.

use glam::Vec3;
use hashbrown::HashMap;

/// Undirected edge: sorted pair of vertex indices
pub type EdgeKey = (u32, u32);

/// Build the sorted key for the edge between `a` and `b`
#[inline]
pub fn edge_key(a: u32, b: u32) -> EdgeKey {
    if a < b { (a, b) } else { (b, a) }
}

/// Indexed triangle mesh (f32 positions, u32 indices)
///
/// Vertices are welded: a position shared by several triangles is stored
/// once, so topology-aware operations (loop insertion, subdivision, geodesic
/// falloff, extrusion) can walk edges. Triangles wind counter-clockwise when
/// seen from outside the solid.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    /// Vertex positions as [x, y, z]
    pub positions: Vec<[f32; 3]>,
    /// Vertex normals as [x, y, z] (same length as `positions`)
    pub normals: Vec<[f32; 3]>,
    /// Triangle indices
    pub indices: Vec<u32>,
    /// Crease sharpness per edge; edges not present are smooth
    pub creases: HashMap<EdgeKey, f32>,
}

impl Mesh {
    /// Create an empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex and return its index. The normal is filled in by
    /// [`Mesh::recompute_normals`].
    pub fn add_vertex(&mut self, position: Vec3) -> u32 {
        let index = self.positions.len() as u32;
        self.positions.push(position.to_array());
        self.normals.push([0.0, 0.0, 0.0]);
        index
    }

    /// Add a triangle using three vertex indices
    pub fn add_triangle(&mut self, i0: u32, i1: u32, i2: u32) {
        self.indices.extend_from_slice(&[i0, i1, i2]);
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Get triangle count
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// True when the mesh has no triangles
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Position of vertex `i`
    #[inline]
    pub fn position(&self, i: u32) -> Vec3 {
        Vec3::from(self.positions[i as usize])
    }

    /// Overwrite the position of vertex `i`
    #[inline]
    pub fn set_position(&mut self, i: u32, position: Vec3) {
        self.positions[i as usize] = position.to_array();
    }

    /// Iterate over triangles as index triples
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices.chunks_exact(3).map(|c| [c[0], c[1], c[2]])
    }

    /// Corner positions of triangle `t`
    pub fn triangle_positions(&self, t: usize) -> [Vec3; 3] {
        let base = t * 3;
        [
            self.position(self.indices[base]),
            self.position(self.indices[base + 1]),
            self.position(self.indices[base + 2]),
        ]
    }

    /// Axis-aligned bounds of the referenced vertices
    pub fn bounds(&self) -> Aabb {
        let mut aabb = Aabb::EMPTY;
        for &i in &self.indices {
            aabb.include(self.position(i));
        }
        aabb
    }

    /// Signed enclosed volume (divergence theorem over all triangles)
    ///
    /// Positive for a closed mesh with outward winding. A hollow shell
    /// contributes the volume of its wall only.
    pub fn volume(&self) -> f32 {
        let mut six_v = 0.0f64;
        for t in 0..self.triangle_count() {
            let [a, b, c] = self.triangle_positions(t);
            six_v += a.as_dvec3().dot(b.as_dvec3().cross(c.as_dvec3()));
        }
        (six_v / 6.0) as f32
    }

    /// Recompute area-weighted smooth normals over welded vertices
    pub fn recompute_normals(&mut self) {
        let mut accum = vec![Vec3::ZERO; self.positions.len()];
        for t in 0..self.triangle_count() {
            let [a, b, c] = self.triangle_positions(t);
            // Cross product length is twice the area, which weights the sum
            let face = (b - a).cross(c - a);
            let base = t * 3;
            for k in 0..3 {
                accum[self.indices[base + k] as usize] += face;
            }
        }
        self.normals = accum
            .into_iter()
            .map(|n| n.normalize_or_zero().to_array())
            .collect();
    }

    /// Set the crease sharpness of every edge in `edges`
    pub fn set_creases(&mut self, edges: &[EdgeKey], sharpness: f32) {
        for &edge in edges {
            if sharpness > 0.0 {
                self.creases.insert(edge, sharpness);
            } else {
                self.creases.remove(&edge);
            }
        }
    }

    /// Crease sharpness of the edge between `a` and `b` (0.0 when smooth)
    pub fn crease(&self, a: u32, b: u32) -> f32 {
        self.creases.get(&edge_key(a, b)).copied().unwrap_or(0.0)
    }
}

/// Axis-aligned bounding box
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Box that contains nothing; `include` grows it
    pub const EMPTY: Aabb = Aabb {
        min: Vec3::splat(f32::INFINITY),
        max: Vec3::splat(f32::NEG_INFINITY),
    };

    /// Bounds of a set of points
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Self {
        let mut aabb = Self::EMPTY;
        for p in points {
            aabb.include(p);
        }
        aabb
    }

    /// Grow to contain `p`
    pub fn include(&mut self, p: Vec3) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// True when nothing was included
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Center of the bottom (minimum Y) face
    pub fn bottom_center(&self) -> Vec3 {
        let c = self.center();
        Vec3::new(c.x, self.min.y, c.z)
    }

    /// Box grown by `margin` on every side
    pub fn expanded(&self, margin: f32) -> Self {
        Self {
            min: self.min - Vec3::splat(margin),
            max: self.max + Vec3::splat(margin),
        }
    }

    /// Box moved by `offset`
    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }

    /// True when the two boxes overlap (touching counts)
    pub fn intersects(&self, other: &Aabb) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.min.cmple(other.max).all()
            && other.min.cmple(self.max).all()
    }
}

impl Default for Aabb {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_tetrahedron() -> Mesh {
        let mut mesh = Mesh::new();
        let a = mesh.add_vertex(Vec3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Vec3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Vec3::new(0.0, 1.0, 0.0));
        let d = mesh.add_vertex(Vec3::new(0.0, 0.0, 1.0));
        mesh.add_triangle(a, c, b);
        mesh.add_triangle(a, b, d);
        mesh.add_triangle(a, d, c);
        mesh.add_triangle(b, c, d);
        mesh
    }

    #[test]
    fn test_tetrahedron_volume() {
        let mesh = unit_tetrahedron();
        assert!((mesh.volume() - 1.0 / 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_recompute_normals_unit_length() {
        let mut mesh = unit_tetrahedron();
        mesh.recompute_normals();
        for n in &mesh.normals {
            assert!((Vec3::from(*n).length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_aabb_bottom_center() {
        let aabb = Aabb::from_points([Vec3::new(-1.0, 2.0, 0.0), Vec3::new(3.0, 5.0, 4.0)]);
        assert_eq!(aabb.bottom_center(), Vec3::new(1.0, 2.0, 2.0));
        assert_eq!(aabb.center(), Vec3::new(1.0, 3.5, 2.0));
    }

    #[test]
    fn test_aabb_intersects() {
        let a = Aabb::from_points([Vec3::ZERO, Vec3::ONE]);
        let b = a.translated(Vec3::new(0.5, 0.5, 0.5));
        let c = a.translated(Vec3::new(2.0, 0.0, 0.0));
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
        assert!(!Aabb::EMPTY.intersects(&a));
    }

    #[test]
    fn test_creases_round_trip_edge_order() {
        let mut mesh = unit_tetrahedron();
        mesh.set_creases(&[edge_key(2, 1)], 3.0);
        assert_eq!(mesh.crease(1, 2), 3.0);
        assert_eq!(mesh.crease(0, 1), 0.0);
    }
}
