//! Topology edits: edge-loop insertion, face extrusion, crease selection

use glam::Vec3;
use hashbrown::{HashMap, HashSet};
use tracing::trace;

use crate::error::KernelError;
use crate::topology::edge_faces;
use crate::types::{EdgeKey, Mesh, edge_key};

/// Insert an edge loop along the meridian at `angle_degrees` around the Y axis
///
/// Every edge crossing the half-plane that contains the Y axis and the
/// direction `(cos a, 0, sin a)` is split where it crosses, and the touched
/// triangles are re-triangulated. Creased edges pass their sharpness on to
/// both halves. Returns the indices of the inserted vertices.
pub fn insert_meridian_loop(mesh: &mut Mesh, angle_degrees: f32) -> Vec<u32> {
    let (sin_a, cos_a) = angle_degrees.to_radians().sin_cos();
    let direction = Vec3::new(cos_a, 0.0, sin_a);
    let normal = Vec3::new(-sin_a, 0.0, cos_a);

    let side: Vec<f32> = mesh
        .positions
        .iter()
        .map(|p| normal.dot(Vec3::from(*p)))
        .collect();

    let mut splits: HashMap<EdgeKey, u32> = HashMap::new();
    let mut inserted = Vec::new();
    let old_indices = std::mem::take(&mut mesh.indices);
    let mut indices = Vec::with_capacity(old_indices.len() + old_indices.len() / 2);

    for tri in old_indices.chunks_exact(3) {
        let corners = [tri[0], tri[1], tri[2]];
        let mut mids = [None; 3];
        for k in 0..3 {
            let (u, v) = (corners[k], corners[(k + 1) % 3]);
            let (du, dv) = (side[u as usize], side[v as usize]);
            if du * dv >= 0.0 {
                continue;
            }
            let key = edge_key(u, v);
            if let Some(&m) = splits.get(&key) {
                mids[k] = Some(m);
                continue;
            }
            let t = du / (du - dv);
            let q = mesh.position(u).lerp(mesh.position(v), t);
            if q.dot(direction) <= 0.0 {
                continue;
            }
            let m = mesh.add_vertex(q);
            if let Some(s) = mesh.creases.remove(&key) {
                mesh.creases.insert(edge_key(u, m), s);
                mesh.creases.insert(edge_key(m, v), s);
            }
            splits.insert(key, m);
            inserted.push(m);
            mids[k] = Some(m);
        }
        split_triangle(&mut indices, corners, mids);
    }

    mesh.indices = indices;
    trace!(angle_degrees, inserted = inserted.len(), "insert_meridian_loop");
    inserted
}

/// Emit the sub-triangles of `corners` given optional split points per edge
/// (edge k runs from corner k to corner k+1)
fn split_triangle(out: &mut Vec<u32>, corners: [u32; 3], mids: [Option<u32>; 3]) {
    let count = mids.iter().filter(|m| m.is_some()).count();
    match count {
        1 => {
            let Some(k) = mids.iter().position(Option::is_some) else {
                return;
            };
            let (a, b, c) = (corners[k], corners[(k + 1) % 3], corners[(k + 2) % 3]);
            let Some(m) = mids[k] else { return };
            out.extend_from_slice(&[a, m, c, m, b, c]);
        }
        2 => {
            // Rotate so the unsplit edge is (c, a)
            let Some(k) = mids.iter().position(Option::is_none) else {
                return;
            };
            let k = (k + 1) % 3;
            let (a, b, c) = (corners[k], corners[(k + 1) % 3], corners[(k + 2) % 3]);
            let (Some(m_ab), Some(m_bc)) = (mids[k], mids[(k + 1) % 3]) else {
                return;
            };
            out.extend_from_slice(&[b, m_bc, m_ab, a, m_ab, m_bc, a, m_bc, c]);
        }
        _ => out.extend_from_slice(&corners),
    }
}

/// Extrude a set of triangles by `offset`
///
/// Vertices on the region boundary are duplicated and walls are stitched
/// between the old and the new boundary; interior vertices simply move.
/// Returns the vertices of the moved region (duplicates and interior).
pub fn extrude_faces(mesh: &mut Mesh, faces: &[usize], offset: Vec3) -> Result<Vec<u32>, KernelError> {
    if faces.is_empty() {
        return Err(KernelError::EmptySelection("extrude_faces needs at least one face"));
    }
    let selected: HashSet<usize> = faces.iter().copied().collect();
    // Walk faces in the given order so vertex numbering is reproducible
    let mut seen = HashSet::with_capacity(faces.len());
    let ordered: Vec<usize> = faces.iter().copied().filter(|t| seen.insert(*t)).collect();

    // Directed boundary edges of the region, in region winding
    let adjacency = edge_faces(mesh);
    let mut boundary = Vec::new();
    for &t in &ordered {
        let base = t * 3;
        for k in 0..3 {
            let (u, v) = (mesh.indices[base + k], mesh.indices[base + (k + 1) % 3]);
            let inside = adjacency
                .get(&edge_key(u, v))
                .map(|adj| adj.iter().filter(|f| selected.contains(*f)).count())
                .unwrap_or(0);
            if inside == 1 {
                boundary.push((u, v));
            }
        }
    }
    let mut duplicate: HashMap<u32, u32> = HashMap::new();
    for v in boundary.iter().flat_map(|&(u, v)| [u, v]) {
        if !duplicate.contains_key(&v) {
            let p = mesh.position(v) + offset;
            duplicate.insert(v, mesh.add_vertex(p));
        }
    }

    let mut moved: HashSet<u32> = HashSet::new();
    for &t in &ordered {
        let base = t * 3;
        for k in 0..3 {
            let v = mesh.indices[base + k];
            if let Some(&d) = duplicate.get(&v) {
                mesh.indices[base + k] = d;
                moved.insert(d);
            } else if moved.insert(v) {
                let p = mesh.position(v) + offset;
                mesh.set_position(v, p);
            }
        }
    }

    for (a, b) in boundary {
        let (a2, b2) = (duplicate[&a], duplicate[&b]);
        mesh.add_triangle(a, b, b2);
        mesh.add_triangle(a, b2, a2);
    }

    let mut result: Vec<u32> = moved.into_iter().collect();
    result.sort_unstable();
    Ok(result)
}

/// Triangles whose three corners all lie in `vertices`
pub fn faces_within(mesh: &Mesh, vertices: &[u32]) -> Vec<usize> {
    let set: HashSet<u32> = vertices.iter().copied().collect();
    mesh.triangles()
        .enumerate()
        .filter(|(_, tri)| tri.iter().all(|v| set.contains(v)))
        .map(|(t, _)| t)
        .collect()
}

/// Mesh edges whose two endpoints both lie in `vertices`
pub fn edges_within(mesh: &Mesh, vertices: &[u32]) -> Vec<EdgeKey> {
    let set: HashSet<u32> = vertices.iter().copied().collect();
    let mut edges: Vec<EdgeKey> = mesh
        .triangles()
        .flat_map(|[a, b, c]| [edge_key(a, b), edge_key(b, c), edge_key(c, a)])
        .filter(|(u, v)| set.contains(u) && set.contains(v))
        .collect();
    edges.sort_unstable();
    edges.dedup();
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{generate_cylinder, generate_sphere};
    use crate::topology::is_closed;

    #[test]
    fn test_meridian_loop_on_sphere() {
        let mut sphere = generate_sphere(1.0, 11, 11).unwrap();
        let volume = sphere.volume();
        let inserted = insert_meridian_loop(&mut sphere, 5.0);

        assert!(!inserted.is_empty());
        assert!(is_closed(&sphere));
        // Splitting edges does not change the solid
        assert!((sphere.volume() - volume).abs() < 1e-5);
        for &v in &inserted {
            let p = sphere.position(v);
            let angle = p.z.atan2(p.x).to_degrees();
            assert!((angle - 5.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_meridian_loop_only_splits_one_side() {
        let mut sphere = generate_sphere(1.0, 11, 11).unwrap();
        let inserted = insert_meridian_loop(&mut sphere, 5.0);
        for &v in &inserted {
            assert!(sphere.position(v).x > 0.0);
        }
    }

    #[test]
    fn test_extrude_cylinder_top() {
        let mut cylinder = generate_cylinder(1.0, 2.0, 10, 2).unwrap();
        let top_center = (cylinder.vertex_count() - 1) as u32;
        let top_ring: Vec<u32> = (20..30).chain([top_center]).collect();
        let cap = faces_within(&cylinder, &top_ring);
        assert_eq!(cap.len(), 10);

        let volume = cylinder.volume();
        let moved = extrude_faces(&mut cylinder, &cap, Vec3::new(0.0, 0.5, 0.0)).unwrap();

        assert_eq!(moved.len(), 11);
        assert!(is_closed(&cylinder));
        assert!(cylinder.volume() > volume);
        assert!((cylinder.bounds().max.y - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_extrude_rejects_empty() {
        let mut cylinder = generate_cylinder(1.0, 2.0, 10, 2).unwrap();
        assert!(extrude_faces(&mut cylinder, &[], Vec3::Y).is_err());
    }

    #[test]
    fn test_edges_within_ring() {
        let cylinder = generate_cylinder(1.0, 2.0, 10, 2).unwrap();
        let bottom: Vec<u32> = (0..10).collect();
        assert_eq!(edges_within(&cylinder, &bottom).len(), 10);
    }
}
