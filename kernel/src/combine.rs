//! Mesh combining utilities
//!
//! Functions for merging multiple meshes into a single mesh.

use crate::types::{Mesh, edge_key};

/// Combine multiple meshes into one
///
/// Merges multiple meshes by concatenating their vertex and index data.
/// Index offsets and crease edges are adjusted automatically. The parts are
/// not booleaned together; overlapping parts stay overlapping.
///
/// # Example
/// ```
/// use pumpkin_kernel::*;
///
/// let body = generate_sphere(1.0, 11, 11).unwrap();
/// let stem = generate_cylinder(0.12, 0.24, 10, 2).unwrap();
///
/// let combined = combine(&[&body, &stem]);
/// assert_eq!(combined.vertex_count(), body.vertex_count() + stem.vertex_count());
/// ```
pub fn combine(meshes: &[&Mesh]) -> Mesh {
    let mut result = Mesh::new();

    let total_vertices: usize = meshes.iter().map(|m| m.positions.len()).sum();
    let total_indices: usize = meshes.iter().map(|m| m.indices.len()).sum();

    result.positions.reserve(total_vertices);
    result.normals.reserve(total_vertices);
    result.indices.reserve(total_indices);

    for mesh in meshes {
        if mesh.positions.is_empty() {
            continue;
        }

        let vertex_offset = result.positions.len() as u32;

        result.positions.extend_from_slice(&mesh.positions);
        if mesh.normals.len() == mesh.positions.len() {
            result.normals.extend_from_slice(&mesh.normals);
        } else {
            result.normals.resize(result.positions.len(), [0.0; 3]);
        }

        for &idx in &mesh.indices {
            result.indices.push(vertex_offset + idx);
        }

        for (&(a, b), &s) in &mesh.creases {
            result
                .creases
                .insert(edge_key(a + vertex_offset, b + vertex_offset), s);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::generate_cuboid;

    #[test]
    fn test_combine_empty() {
        let result = combine(&[]);
        assert_eq!(result.positions.len(), 0);
        assert_eq!(result.indices.len(), 0);
    }

    #[test]
    fn test_combine_index_offset() {
        let mesh1 = generate_cuboid(1.0, 1.0, 1.0).unwrap();
        let mesh2 = generate_cuboid(0.5, 0.5, 0.5).unwrap();

        let combined = combine(&[&mesh1, &mesh2]);

        assert_eq!(
            combined.positions.len(),
            mesh1.positions.len() + mesh2.positions.len()
        );
        for &idx in &combined.indices {
            assert!((idx as usize) < combined.positions.len());
        }
    }

    #[test]
    fn test_combine_offsets_creases() {
        let plain = generate_cuboid(1.0, 1.0, 1.0).unwrap();
        let mut creased = generate_cuboid(1.0, 1.0, 1.0).unwrap();
        creased.set_creases(&[edge_key(0, 1)], 4.0);

        let combined = combine(&[&plain, &creased]);
        assert_eq!(combined.crease(8, 9), 4.0);
        assert_eq!(combined.crease(0, 1), 0.0);
    }
}
