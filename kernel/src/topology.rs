//! Adjacency queries and clean-up passes

use glam::Vec3;
use hashbrown::{HashMap, HashSet};

use crate::types::{EdgeKey, Mesh, edge_key};

/// Sorted, de-duplicated neighbour list per vertex
pub fn vertex_neighbors(mesh: &Mesh) -> Vec<Vec<u32>> {
    let mut neighbors = vec![Vec::new(); mesh.vertex_count()];
    for [a, b, c] in mesh.triangles() {
        for (u, v) in [(a, b), (b, c), (c, a)] {
            neighbors[u as usize].push(v);
            neighbors[v as usize].push(u);
        }
    }
    for list in &mut neighbors {
        list.sort_unstable();
        list.dedup();
    }
    neighbors
}

/// Triangles adjacent to each edge
pub fn edge_faces(mesh: &Mesh) -> HashMap<EdgeKey, Vec<usize>> {
    let mut map: HashMap<EdgeKey, Vec<usize>> = HashMap::with_capacity(mesh.indices.len());
    for (t, [a, b, c]) in mesh.triangles().enumerate() {
        for (u, v) in [(a, b), (b, c), (c, a)] {
            map.entry(edge_key(u, v)).or_default().push(t);
        }
    }
    map
}

/// Edges not shared by exactly two triangles
pub fn open_edge_count(mesh: &Mesh) -> usize {
    edge_faces(mesh).values().filter(|faces| faces.len() != 2).count()
}

/// True when every edge is shared by exactly two triangles
pub fn is_closed(mesh: &Mesh) -> bool {
    !mesh.is_empty() && open_edge_count(mesh) == 0
}

type Cell = (i64, i64, i64);

fn neighbor_cells((x, y, z): Cell) -> impl Iterator<Item = Cell> {
    (-1..=1).flat_map(move |dx| {
        (-1..=1).flat_map(move |dy| (-1..=1).map(move |dz| (x + dx, y + dy, z + dz)))
    })
}

/// Merge vertices closer than `tolerance`, drop triangles that collapse and
/// vertices nothing references. Creases follow their endpoints.
///
/// A vertex joins the first kept vertex within `tolerance` of it. Lookups go
/// through a grid of cell size `tolerance`, searching the 27 cells around
/// each point so neighbours across a cell boundary are still found.
pub fn weld(mesh: &mut Mesh, tolerance: f32) {
    let tolerance = tolerance.max(f32::EPSILON);
    let inv = 1.0 / tolerance;
    let mut cells: HashMap<Cell, Vec<u32>> = HashMap::with_capacity(mesh.vertex_count());
    let mut remap = Vec::with_capacity(mesh.vertex_count());
    let mut positions: Vec<[f32; 3]> = Vec::with_capacity(mesh.vertex_count());

    for p in &mesh.positions {
        let here = Vec3::from_array(*p);
        let cell = (
            (p[0] * inv).floor() as i64,
            (p[1] * inv).floor() as i64,
            (p[2] * inv).floor() as i64,
        );
        let found = neighbor_cells(cell).find_map(|key| {
            cells.get(&key)?.iter().copied().find(|&i| {
                Vec3::from_array(positions[i as usize]).distance(here) <= tolerance
            })
        });
        let index = match found {
            Some(index) => index,
            None => {
                positions.push(*p);
                let index = (positions.len() - 1) as u32;
                cells.entry(cell).or_default().push(index);
                index
            }
        };
        remap.push(index);
    }

    let creases = std::mem::take(&mut mesh.creases);
    mesh.positions = positions;
    for i in &mut mesh.indices {
        *i = remap[*i as usize];
    }
    for ((a, b), s) in creases {
        let (a, b) = (remap[a as usize], remap[b as usize]);
        if a != b {
            mesh.creases.insert(edge_key(a, b), s);
        }
    }
    mesh.normals = vec![[0.0; 3]; mesh.positions.len()];

    remove_degenerate(mesh, 0.0);
    compact(mesh);
    mesh.recompute_normals();
}

/// Split triangles whose open edge has another vertex lying on it
///
/// Boolean clipping leaves vertices in the middle of a neighbour's edge. Each
/// such edge is fanned from the opposite corner through the stray vertices so
/// both sides share the same edges again. Returns the number of triangles
/// split; meshes without open edges are left untouched.
pub fn close_t_junctions(mesh: &mut Mesh, tolerance: f32) -> usize {
    const MAX_PASSES: usize = 8;

    let mut total = 0;
    for _ in 0..MAX_PASSES {
        let splits = split_open_edges(mesh, tolerance);
        if splits == 0 {
            break;
        }
        total += splits;
    }
    if total > 0 {
        remove_degenerate(mesh, 0.0);
        compact(mesh);
        mesh.recompute_normals();
    }
    total
}

fn split_open_edges(mesh: &mut Mesh, tolerance: f32) -> usize {
    let directed: HashSet<(u32, u32)> = mesh
        .triangles()
        .flat_map(|[a, b, c]| [(a, b), (b, c), (c, a)])
        .collect();
    let open: HashSet<(u32, u32)> = directed
        .iter()
        .filter(|(a, b)| !directed.contains(&(*b, *a)))
        .copied()
        .collect();
    if open.is_empty() {
        return 0;
    }

    let mut candidates: Vec<u32> = open.iter().flat_map(|&(a, b)| [a, b]).collect();
    candidates.sort_unstable();
    candidates.dedup();

    let mut indices = Vec::with_capacity(mesh.indices.len());
    let mut splits = 0;
    for corners in mesh.triangles() {
        let split = (0..3).find_map(|k| {
            let (u, v, w) = (corners[k], corners[(k + 1) % 3], corners[(k + 2) % 3]);
            if !open.contains(&(u, v)) {
                return None;
            }
            let inner = vertices_on_edge(mesh, u, v, &candidates, tolerance);
            (!inner.is_empty()).then_some((u, v, w, inner))
        });
        match split {
            Some((u, v, w, inner)) => {
                let mut prev = u;
                for next in inner.into_iter().chain([v]) {
                    indices.extend_from_slice(&[prev, next, w]);
                    prev = next;
                }
                splits += 1;
            }
            None => indices.extend_from_slice(&corners),
        }
    }
    mesh.indices = indices;
    splits
}

/// Candidates strictly inside segment `a`-`b`, ordered from `a`
fn vertices_on_edge(mesh: &Mesh, a: u32, b: u32, candidates: &[u32], tolerance: f32) -> Vec<u32> {
    let (pa, pb) = (mesh.position(a), mesh.position(b));
    let edge = pb - pa;
    let length = edge.length();
    if length <= tolerance {
        return Vec::new();
    }
    let margin = tolerance / length;

    let mut inner: Vec<(f32, u32)> = candidates
        .iter()
        .filter(|&&m| m != a && m != b)
        .filter_map(|&m| {
            let p = mesh.position(m);
            let t = (p - pa).dot(edge) / (length * length);
            let on_line = (pa + edge * t).distance(p) <= tolerance;
            (on_line && t > margin && t < 1.0 - margin).then_some((t, m))
        })
        .collect();
    inner.sort_by(|x, y| x.0.total_cmp(&y.0));
    inner.into_iter().map(|(_, m)| m).collect()
}

/// Drop triangles with repeated corners or an area at or below `min_area`
pub fn remove_degenerate(mesh: &mut Mesh, min_area: f32) {
    let mut kept = Vec::with_capacity(mesh.indices.len());
    for (t, [a, b, c]) in mesh.triangles().enumerate() {
        if a == b || b == c || c == a {
            continue;
        }
        let [pa, pb, pc] = mesh.triangle_positions(t);
        if triangle_area(pa, pb, pc) <= min_area {
            continue;
        }
        kept.extend_from_slice(&[a, b, c]);
    }
    mesh.indices = kept;
}

/// Remove unreferenced vertices and renumber the rest
pub fn compact(mesh: &mut Mesh) {
    let mut remap = vec![u32::MAX; mesh.vertex_count()];
    let mut positions = Vec::with_capacity(mesh.vertex_count());
    let mut normals = Vec::with_capacity(mesh.vertex_count());

    for i in &mut mesh.indices {
        let old = *i as usize;
        if remap[old] == u32::MAX {
            remap[old] = positions.len() as u32;
            positions.push(mesh.positions[old]);
            normals.push(mesh.normals.get(old).copied().unwrap_or([0.0; 3]));
        }
        *i = remap[old];
    }

    let creases = std::mem::take(&mut mesh.creases);
    for ((a, b), s) in creases {
        let (a, b) = (remap[a as usize], remap[b as usize]);
        if a != u32::MAX && b != u32::MAX {
            mesh.creases.insert(edge_key(a, b), s);
        }
    }
    mesh.positions = positions;
    mesh.normals = normals;
}

pub(crate) fn triangle_area(a: Vec3, b: Vec3, c: Vec3) -> f32 {
    (b - a).cross(c - a).length() * 0.5
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{generate_cuboid, generate_sphere};

    #[test]
    fn test_primitives_are_closed() {
        assert!(is_closed(&generate_sphere(1.0, 11, 11).unwrap()));
        assert!(is_closed(&generate_cuboid(1.0, 2.0, 3.0).unwrap()));
    }

    #[test]
    fn test_neighbors_of_pole() {
        let sphere = generate_sphere(1.0, 11, 11).unwrap();
        let neighbors = vertex_neighbors(&sphere);
        assert_eq!(neighbors[0].len(), 11);
        // Ring vertex: two ring neighbours, pole, two below
        assert_eq!(neighbors[1].len(), 5);
        // Band vertex away from the poles is regular
        assert_eq!(neighbors[1 + 11 * 4].len(), 6);
    }

    #[test]
    fn test_weld_merges_split_vertices() {
        let cube = generate_cuboid(1.0, 1.0, 1.0).unwrap();
        // Unweld: give every triangle corner its own vertex
        let mut soup = Mesh::new();
        for t in 0..cube.triangle_count() {
            let [a, b, c] = cube.triangle_positions(t);
            let ia = soup.add_vertex(a);
            let ib = soup.add_vertex(b);
            let ic = soup.add_vertex(c);
            soup.add_triangle(ia, ib, ic);
        }
        assert_eq!(soup.vertex_count(), 36);

        weld(&mut soup, 1e-4);
        assert_eq!(soup.vertex_count(), 8);
        assert_eq!(soup.triangle_count(), 12);
        assert!(is_closed(&soup));
    }

    #[test]
    fn test_weld_across_cell_boundary() {
        let mut mesh = Mesh::new();
        let a = mesh.add_vertex(Vec3::new(0.999_999e-4, 0.0, 0.0));
        let b = mesh.add_vertex(Vec3::new(1.000_001e-4, 0.0, 0.0));
        let c = mesh.add_vertex(Vec3::Y);
        let d = mesh.add_vertex(Vec3::Z);
        mesh.add_triangle(a, c, d);
        mesh.add_triangle(b, d, c);

        weld(&mut mesh, 1e-4);
        assert_eq!(mesh.vertex_count(), 3);
    }

    #[test]
    fn test_close_t_junction_on_split_square() {
        // Left half is one triangle, right half is split at the midpoint of
        // the shared diagonal
        let mut mesh = Mesh::new();
        let a = mesh.add_vertex(Vec3::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Vec3::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Vec3::new(1.0, 1.0, 0.0));
        let d = mesh.add_vertex(Vec3::new(0.0, 1.0, 0.0));
        let m = mesh.add_vertex(Vec3::new(0.5, 0.5, 0.0));
        mesh.add_triangle(a, c, d);
        mesh.add_triangle(a, b, m);
        mesh.add_triangle(m, b, c);

        let before = open_edge_count(&mesh);
        assert_eq!(close_t_junctions(&mut mesh, 1e-5), 1);
        assert_eq!(mesh.triangle_count(), 4);
        // only the square's outline stays open
        assert_eq!(open_edge_count(&mesh), 4);
        assert!(before > 4);
    }

    #[test]
    fn test_close_t_junctions_leaves_closed_mesh() {
        let mut sphere = generate_sphere(1.0, 11, 11).unwrap();
        let indices = sphere.indices.clone();
        assert_eq!(close_t_junctions(&mut sphere, 1e-5), 0);
        assert_eq!(sphere.indices, indices);
    }

    #[test]
    fn test_compact_drops_unused() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(Vec3::new(9.0, 9.0, 9.0));
        let a = mesh.add_vertex(Vec3::ZERO);
        let b = mesh.add_vertex(Vec3::X);
        let c = mesh.add_vertex(Vec3::Y);
        mesh.add_triangle(a, b, c);
        mesh.creases.insert(edge_key(a, b), 2.0);

        compact(&mut mesh);
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.crease(0, 1), 2.0);
    }

    #[test]
    fn test_remove_degenerate() {
        let mut mesh = Mesh::new();
        let a = mesh.add_vertex(Vec3::ZERO);
        let b = mesh.add_vertex(Vec3::X);
        let c = mesh.add_vertex(Vec3::X * 2.0);
        let d = mesh.add_vertex(Vec3::Y);
        mesh.add_triangle(a, b, c); // collinear
        mesh.add_triangle(a, a, d); // repeated corner
        mesh.add_triangle(a, b, d);
        remove_degenerate(&mut mesh, 1e-9);
        assert_eq!(mesh.triangle_count(), 1);
    }
}
