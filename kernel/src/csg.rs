//! Boolean subtraction
//!
//! Clipping runs on the BSP trees of the `csgrs` crate. Carving many small
//! cutters out of one large closed body only involves the body triangles near
//! each cutter, so a cutter is applied in three steps:
//!
//! - the body triangles whose bounds touch the cutter are clipped against the
//!   cutter's tree, the rest of the body passes through untouched;
//! - the cutter surface is split by the tree of that local patch and every
//!   fragment is classified against the whole body with ray casting, so
//!   hollow and non-convex bodies carve correctly even though the patch is
//!   open;
//! - the pieces are welded and the T-junctions clipping leaves along the
//!   seams are split so the result is closed again.
//!
//! Cutters are applied one after another.

use csgrs::bsp::Node;
use csgrs::polygon::Polygon;
use csgrs::vertex::Vertex;
use glam::{DVec3, Vec3};
use nalgebra::{Point3, Vector3};
use tracing::{debug, trace};

use crate::topology::{close_t_junctions, weld};
use crate::types::{Aabb, Mesh};

/// Margin added around a cutter when picking the body patch
const REGION_MARGIN: f32 = 1e-4;

/// Distance at which vertices are merged after each cutter
const WELD_TOLERANCE: f32 = 1e-5;

/// Fragments smaller than this are dropped
const MIN_FRAGMENT_AREA: f64 = 1e-12;

type Face = Polygon<()>;

/// Outcome of a subtraction
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SubtractReport {
    /// Cutters that changed the body
    pub applied: usize,
    /// Cutters that did not touch the body
    pub missed: usize,
}

fn to_point(p: Vec3) -> Point3<f64> {
    Point3::new(p.x as f64, p.y as f64, p.z as f64)
}

fn to_dvec(p: &Point3<f64>) -> DVec3 {
    DVec3::new(p.x, p.y, p.z)
}

/// Triangle as a clipping polygon; `None` when it has no area
fn face(a: Vec3, b: Vec3, c: Vec3) -> Option<Face> {
    let normal = (b - a).cross(c - a);
    if normal.length_squared() <= f32::EPSILON * f32::EPSILON {
        return None;
    }
    let n = normal.normalize().as_dvec3();
    let n = Vector3::new(n.x, n.y, n.z);
    let vertices = [a, b, c]
        .into_iter()
        .map(|p| Vertex::new(to_point(p), n))
        .collect();
    Some(Polygon::new(vertices, None))
}

fn mesh_faces(mesh: &Mesh) -> Vec<Face> {
    (0..mesh.triangle_count())
        .filter_map(|t| {
            let [a, b, c] = mesh.triangle_positions(t);
            face(a, b, c)
        })
        .collect()
}

fn area(polygon: &Face) -> f64 {
    let points: Vec<DVec3> = polygon.vertices.iter().map(|v| to_dvec(&v.pos)).collect();
    let origin = points[0];
    points
        .windows(2)
        .skip(1)
        .map(|w| (w[0] - origin).cross(w[1] - origin).length() * 0.5)
        .sum()
}

fn centroid(polygon: &Face) -> DVec3 {
    polygon.vertices.iter().map(|v| to_dvec(&v.pos)).sum::<DVec3>() / polygon.vertices.len() as f64
}

/// Closed triangle soup used for inside/outside queries
struct Solid {
    triangles: Vec<[DVec3; 3]>,
}

impl Solid {
    /// Ray directions, slightly skewed off the axes so rays rarely graze
    /// the axis-aligned edges procedural meshes are full of
    const RAYS: [DVec3; 3] = [
        DVec3::new(1.0, 0.003_141_59, 0.002_718_28),
        DVec3::new(0.001_414_21, 1.0, 0.001_732_05),
        DVec3::new(0.002_236_07, 0.001_618_03, 1.0),
    ];

    fn new(mesh: &Mesh) -> Self {
        let triangles = (0..mesh.triangle_count())
            .map(|t| mesh.triangle_positions(t).map(|p| p.as_dvec3()))
            .collect();
        Self { triangles }
    }

    /// Majority vote over three ray-parity tests
    fn contains(&self, point: DVec3) -> bool {
        let inside = Self::RAYS
            .iter()
            .filter(|dir| self.crossings(point, **dir) % 2 == 1)
            .count();
        inside >= 2
    }

    fn crossings(&self, origin: DVec3, direction: DVec3) -> usize {
        self.triangles
            .iter()
            .filter(|[v0, v1, v2]| ray_triangle_intersect(origin, direction, *v0, *v1, *v2).is_some())
            .count()
    }
}

/// Möller-Trumbore ray/triangle intersection, returns the ray parameter
fn ray_triangle_intersect(origin: DVec3, direction: DVec3, v0: DVec3, v1: DVec3, v2: DVec3) -> Option<f64> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = direction.cross(edge2);
    let a = edge1.dot(h);
    if a.abs() < 1e-12 {
        return None;
    }

    let f = 1.0 / a;
    let s = origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    (t > 1e-9).then_some(t)
}

/// Subtract every cutter from `body`, in order
///
/// An empty cutter list returns the body unchanged. The body should be
/// closed with outward winding; cutters likewise.
pub fn subtract(body: &Mesh, cutters: &[Mesh]) -> (Mesh, SubtractReport) {
    let mut result = body.clone();
    let mut report = SubtractReport::default();

    for (i, cutter) in cutters.iter().enumerate() {
        match subtract_one(&result, cutter) {
            Some(carved) => {
                result = carved;
                report.applied += 1;
            }
            None => {
                trace!(cutter = i, "cutter does not touch the body");
                report.missed += 1;
            }
        }
    }

    debug!(
        applied = report.applied,
        missed = report.missed,
        triangles = result.triangle_count(),
        "subtract"
    );
    (result, report)
}

/// Carve one cutter; `None` when it leaves the body untouched
fn subtract_one(body: &Mesh, cutter: &Mesh) -> Option<Mesh> {
    let region = cutter.bounds();
    if region.is_empty() || !region.intersects(&body.bounds()) {
        return None;
    }
    let region = region.expanded(REGION_MARGIN);

    let cutter_faces = mesh_faces(cutter);
    if cutter_faces.is_empty() {
        return None;
    }

    // Partition the body into the patch near the cutter and the rest
    let mut near = Vec::new();
    let mut far = Vec::new();
    for t in 0..body.triangle_count() {
        let corners = body.triangle_positions(t);
        if Aabb::from_points(corners).intersects(&region) {
            near.push(corners);
        } else {
            far.push(corners);
        }
    }
    let near_faces: Vec<Face> = near.iter().filter_map(|&[a, b, c]| face(a, b, c)).collect();

    // Body surface outside the cutter
    let kept = Node::new(&cutter_faces).clip_polygons(&near_faces);
    let clipped_area =
        near_faces.iter().map(area).sum::<f64>() - kept.iter().map(area).sum::<f64>();

    // Cutter surface split along the patch, both sides of every plane
    let patch = Node::new(&near_faces);
    let mut inverse = patch.clone();
    inverse.invert();
    let mut fragments = patch.clip_polygons(&cutter_faces);
    fragments.extend(inverse.clip_polygons(&cutter_faces));

    // Fragments inside the body become the wall of the hole
    let solid = Solid::new(body);
    let mut walls: Vec<Face> = fragments
        .into_iter()
        .filter(|p| area(p) > MIN_FRAGMENT_AREA && solid.contains(centroid(p)))
        .collect();
    for wall in &mut walls {
        wall.flip();
    }

    if walls.is_empty() && clipped_area.abs() < MIN_FRAGMENT_AREA {
        return None;
    }

    let mut out = Mesh::new();
    for [a, b, c] in far {
        let (ia, ib, ic) = (out.add_vertex(a), out.add_vertex(b), out.add_vertex(c));
        out.add_triangle(ia, ib, ic);
    }
    for polygon in kept.iter().chain(walls.iter()) {
        push_polygon(&mut out, polygon);
    }
    weld(&mut out, WELD_TOLERANCE);
    let repaired = close_t_junctions(&mut out, WELD_TOLERANCE);
    trace!(
        near = near_faces.len(),
        walls = walls.len(),
        repaired,
        "cutter applied"
    );
    Some(out)
}

/// Fan-triangulate a convex polygon into `mesh`
fn push_polygon(mesh: &mut Mesh, polygon: &Face) {
    let indices: Vec<u32> = polygon
        .vertices
        .iter()
        .map(|v| mesh.add_vertex(to_dvec(&v.pos).as_vec3()))
        .collect();
    for k in 1..indices.len().saturating_sub(1) {
        mesh.add_triangle(indices[0], indices[k], indices[k + 1]);
    }
}
