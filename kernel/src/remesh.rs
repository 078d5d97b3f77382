//! Edge-length remeshing

use hashbrown::HashMap;
use tracing::debug;

use crate::error::{KernelError, check_positive};
use crate::types::{EdgeKey, Mesh, edge_key};

/// Upper bound on refinement passes; each pass at least halves every long edge
const MAX_PASSES: u32 = 12;

/// Split edges until none is longer than `max_edge_length`
///
/// Each pass bisects every over-long edge and re-triangulates the touched
/// triangles (one, two or three split edges). Positions of existing vertices
/// never move, so the shape is preserved exactly.
pub fn remesh(mesh: &mut Mesh, max_edge_length: f32) -> Result<(), KernelError> {
    let max_edge_length = check_positive("max edge length", max_edge_length)?;
    let limit_sq = max_edge_length * max_edge_length;
    let start = mesh.triangle_count();

    for pass in 0..MAX_PASSES {
        let mut splits: HashMap<EdgeKey, u32> = HashMap::new();
        for tri in mesh.indices.chunks_exact(3) {
            for k in 0..3 {
                let key = edge_key(tri[k], tri[(k + 1) % 3]);
                if splits.contains_key(&key) {
                    continue;
                }
                if mesh.position(key.0).distance_squared(mesh.position(key.1)) > limit_sq {
                    splits.insert(key, u32::MAX);
                }
            }
        }
        if splits.is_empty() {
            debug!(passes = pass, from = start, to = mesh.triangle_count(), "remesh");
            mesh.recompute_normals();
            return Ok(());
        }

        let mut keys: Vec<EdgeKey> = splits.keys().copied().collect();
        keys.sort_unstable();
        for key in keys {
            let mid = mesh.position(key.0).lerp(mesh.position(key.1), 0.5);
            let m = mesh.add_vertex(mid);
            splits.insert(key, m);
            if let Some(s) = mesh.creases.remove(&key) {
                mesh.creases.insert(edge_key(key.0, m), s);
                mesh.creases.insert(edge_key(m, key.1), s);
            }
        }

        let old = std::mem::take(&mut mesh.indices);
        let mut indices = Vec::with_capacity(old.len() * 3);
        for tri in old.chunks_exact(3) {
            let corners = [tri[0], tri[1], tri[2]];
            let mids: [Option<u32>; 3] = std::array::from_fn(|k| {
                splits
                    .get(&edge_key(corners[k], corners[(k + 1) % 3]))
                    .copied()
            });
            refine_triangle(mesh, &mut indices, corners, mids);
        }
        mesh.indices = indices;
    }

    debug!(passes = MAX_PASSES, from = start, to = mesh.triangle_count(), "remesh stopped at pass cap");
    mesh.recompute_normals();
    Ok(())
}

fn refine_triangle(mesh: &Mesh, out: &mut Vec<u32>, corners: [u32; 3], mids: [Option<u32>; 3]) {
    match mids {
        [Some(ab), Some(bc), Some(ca)] => {
            let [a, b, c] = corners;
            out.extend_from_slice(&[a, ab, ca, b, bc, ab, c, ca, bc, ab, bc, ca]);
        }
        _ => {
            let count = mids.iter().filter(|m| m.is_some()).count();
            if count == 0 {
                out.extend_from_slice(&corners);
                return;
            }
            if count == 1 {
                let k = mids.iter().position(Option::is_some).unwrap_or(0);
                let (a, b, c) = (corners[k], corners[(k + 1) % 3], corners[(k + 2) % 3]);
                let m = mids[k].unwrap_or(a);
                out.extend_from_slice(&[a, m, c, m, b, c]);
                return;
            }
            // Two splits: rotate so (c, a) is the unsplit edge
            let k = (mids.iter().position(Option::is_none).unwrap_or(0) + 1) % 3;
            let (a, b, c) = (corners[k], corners[(k + 1) % 3], corners[(k + 2) % 3]);
            let (m_ab, m_bc) = (mids[k].unwrap_or(a), mids[(k + 1) % 3].unwrap_or(b));
            out.extend_from_slice(&[b, m_bc, m_ab]);
            // Quad (a, m_ab, m_bc, c): cut along the shorter diagonal
            let d1 = mesh.position(a).distance_squared(mesh.position(m_bc));
            let d2 = mesh.position(m_ab).distance_squared(mesh.position(c));
            if d1 <= d2 {
                out.extend_from_slice(&[a, m_ab, m_bc, a, m_bc, c]);
            } else {
                out.extend_from_slice(&[a, m_ab, c, m_ab, m_bc, c]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{generate_cuboid, generate_sphere};
    use crate::topology::is_closed;

    fn longest_edge(mesh: &Mesh) -> f32 {
        mesh.triangles()
            .flat_map(|[a, b, c]| [(a, b), (b, c), (c, a)])
            .map(|(u, v)| mesh.position(u).distance(mesh.position(v)))
            .fold(0.0, f32::max)
    }

    #[test]
    fn test_remesh_bounds_edge_length() {
        let mut mesh = generate_sphere(1.0, 11, 11).unwrap();
        remesh(&mut mesh, 0.25).unwrap();
        assert!(longest_edge(&mesh) <= 0.25 + 1e-6);
        assert!(is_closed(&mesh));
    }

    #[test]
    fn test_remesh_preserves_volume() {
        let mut cube = generate_cuboid(1.0, 1.0, 1.0).unwrap();
        remesh(&mut cube, 0.3).unwrap();
        assert!((cube.volume() - 1.0).abs() < 1e-4);
        assert!(cube.triangle_count() > 12);
    }

    #[test]
    fn test_remesh_noop_when_fine() {
        let mut cube = generate_cuboid(0.1, 0.1, 0.1).unwrap();
        remesh(&mut cube, 1.0).unwrap();
        assert_eq!(cube.triangle_count(), 12);
    }

    #[test]
    fn test_remesh_rejects_zero_length() {
        let mut cube = generate_cuboid(1.0, 1.0, 1.0).unwrap();
        assert!(remesh(&mut cube, 0.0).is_err());
    }
}
