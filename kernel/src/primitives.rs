//! Closed primitive solids
//!
//! Every primitive is welded (shared vertices), closed and wound
//! counter-clockwise when seen from outside, so it can be deformed,
//! subdivided and used as a boolean operand directly.

use glam::Vec3;
use std::f32::consts::{PI, TAU};
use tracing::trace;

use crate::error::{KernelError, check_positive, check_resolution};
use crate::types::Mesh;

/// Generate a UV sphere centred on the origin
///
/// Vertex layout: index 0 is the north pole (+Y), followed by `rings - 1`
/// latitude rows of `segments` vertices each (north to south), then the
/// south pole last.
///
/// # Arguments
/// * `radius` - Sphere radius (> 0.0)
/// * `segments` - Longitude divisions (3..=256)
/// * `rings` - Latitude bands between the poles (2..=256)
///
/// # Example
/// ```
/// use pumpkin_kernel::generate_sphere;
///
/// let sphere = generate_sphere(1.0, 11, 11).unwrap();
/// assert_eq!(sphere.vertex_count(), 112);
/// ```
pub fn generate_sphere(radius: f32, segments: u32, rings: u32) -> Result<Mesh, KernelError> {
    let radius = check_positive("sphere radius", radius)?;
    let segments = check_resolution("sphere segments", segments, 3, 256)?;
    let rings = check_resolution("sphere rings", rings, 2, 256)?;

    let mut mesh = Mesh::new();
    let north = mesh.add_vertex(Vec3::new(0.0, radius, 0.0));

    for row in 1..rings {
        let phi = PI * row as f32 / rings as f32;
        let (sin_phi, cos_phi) = phi.sin_cos();
        for s in 0..segments {
            let theta = TAU * s as f32 / segments as f32;
            let (sin_theta, cos_theta) = theta.sin_cos();
            mesh.add_vertex(Vec3::new(
                radius * sin_phi * cos_theta,
                radius * cos_phi,
                radius * sin_phi * sin_theta,
            ));
        }
    }

    let south = mesh.add_vertex(Vec3::new(0.0, -radius, 0.0));
    let row_start = |row: u32| 1 + (row - 1) * segments;

    // North cap
    for s in 0..segments {
        let next = (s + 1) % segments;
        mesh.add_triangle(north, row_start(1) + next, row_start(1) + s);
    }

    // Bands between rows
    for row in 1..rings - 1 {
        let upper = row_start(row);
        let lower = row_start(row + 1);
        for s in 0..segments {
            let next = (s + 1) % segments;
            mesh.add_triangle(upper + s, upper + next, lower + next);
            mesh.add_triangle(upper + s, lower + next, lower + s);
        }
    }

    // South cap
    let last = row_start(rings - 1);
    for s in 0..segments {
        let next = (s + 1) % segments;
        mesh.add_triangle(last + s, last + next, south);
    }

    mesh.recompute_normals();
    trace!(
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "generate_sphere"
    );
    Ok(mesh)
}

/// Generate a capped cylinder along +Y, centred on the origin
///
/// Vertex layout: `height_segments + 1` rings of `segments` vertices from
/// bottom to top, then the bottom cap centre, then the top cap centre.
///
/// # Arguments
/// * `radius` - Cylinder radius (> 0.0)
/// * `height` - Total height (> 0.0)
/// * `segments` - Radial divisions (3..=256)
/// * `height_segments` - Divisions along the axis (1..=64)
pub fn generate_cylinder(
    radius: f32,
    height: f32,
    segments: u32,
    height_segments: u32,
) -> Result<Mesh, KernelError> {
    let radius = check_positive("cylinder radius", radius)?;
    let height = check_positive("cylinder height", height)?;
    let segments = check_resolution("cylinder segments", segments, 3, 256)?;
    let height_segments = check_resolution("cylinder height segments", height_segments, 1, 64)?;

    let mut mesh = Mesh::new();
    let half_height = height * 0.5;

    for ring in 0..=height_segments {
        let y = -half_height + height * ring as f32 / height_segments as f32;
        for s in 0..segments {
            let theta = TAU * s as f32 / segments as f32;
            let (sin_theta, cos_theta) = theta.sin_cos();
            mesh.add_vertex(Vec3::new(radius * cos_theta, y, radius * sin_theta));
        }
    }

    let bottom_center = mesh.add_vertex(Vec3::new(0.0, -half_height, 0.0));
    let top_center = mesh.add_vertex(Vec3::new(0.0, half_height, 0.0));

    for ring in 0..height_segments {
        let lower = ring * segments;
        let upper = (ring + 1) * segments;
        for s in 0..segments {
            let next = (s + 1) % segments;
            mesh.add_triangle(upper + s, upper + next, lower + next);
            mesh.add_triangle(upper + s, lower + next, lower + s);
        }
    }

    let top = height_segments * segments;
    for s in 0..segments {
        let next = (s + 1) % segments;
        mesh.add_triangle(bottom_center, s, next);
        mesh.add_triangle(top_center, top + next, top + s);
    }

    mesh.recompute_normals();
    Ok(mesh)
}

/// Generate a triangular prism along +Y with an equilateral cross-section
///
/// # Arguments
/// * `side` - Edge length of the triangular cross-section (> 0.0)
/// * `length` - Prism length along Y (> 0.0)
pub fn generate_prism(side: f32, length: f32) -> Result<Mesh, KernelError> {
    let side = check_positive("prism side", side)?;
    // Circumradius of an equilateral triangle
    generate_cylinder(side / 3.0f32.sqrt(), length, 3, 1)
}

/// Generate an axis-aligned box centred on the origin
///
/// # Arguments
/// * `width` - Extent along X (> 0.0)
/// * `height` - Extent along Y (> 0.0)
/// * `depth` - Extent along Z (> 0.0)
pub fn generate_cuboid(width: f32, height: f32, depth: f32) -> Result<Mesh, KernelError> {
    let hx = check_positive("cuboid width", width)? * 0.5;
    let hy = check_positive("cuboid height", height)? * 0.5;
    let hz = check_positive("cuboid depth", depth)? * 0.5;

    let mut mesh = Mesh::new();
    for &(x, y, z) in &[
        (-hx, -hy, -hz),
        (hx, -hy, -hz),
        (hx, hy, -hz),
        (-hx, hy, -hz),
        (-hx, -hy, hz),
        (hx, -hy, hz),
        (hx, hy, hz),
        (-hx, hy, hz),
    ] {
        mesh.add_vertex(Vec3::new(x, y, z));
    }

    // Quads as (a, b, c, d), counter-clockwise from outside
    const FACES: [[u32; 4]; 6] = [
        [4, 5, 6, 7], // +Z
        [1, 0, 3, 2], // -Z
        [5, 1, 2, 6], // +X
        [0, 4, 7, 3], // -X
        [7, 6, 2, 3], // +Y
        [0, 1, 5, 4], // -Y
    ];
    for [a, b, c, d] in FACES {
        mesh.add_triangle(a, b, c);
        mesh.add_triangle(a, c, d);
    }

    mesh.recompute_normals();
    Ok(mesh)
}
