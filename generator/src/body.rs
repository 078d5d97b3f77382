//! Pumpkin body: a squashed, dimpled and ridged sphere with a thin wall

use glam::{Mat4, Vec3};
use pumpkin_kernel::{GeometryKernel, Mesh, Pivot, SoftMove};
use tracing::debug;

use crate::error::Result;
use crate::style::BodyStyle;

/// Vertices closer than this to the Y axis count as poles
const AXIS_EPSILON: f32 = 1e-4;
/// Angular tolerance for matching a meridian, in degrees
const MERIDIAN_TOLERANCE: f32 = 1e-3;

/// Builds the hollow body solid
#[derive(Clone, Copy)]
pub struct BodyDeformer<'a> {
    kernel: &'a dyn GeometryKernel,
    style: &'a BodyStyle,
}

impl<'a> BodyDeformer<'a> {
    pub fn new(kernel: &'a dyn GeometryKernel, style: &'a BodyStyle) -> Self {
        Self { kernel, style }
    }

    /// Run every body step and return the closed shell
    pub fn build(&self) -> Result<Mesh> {
        let mut mesh = self.spheroid()?;
        self.flatten_poles(&mut mesh);
        self.dimple(&mut mesh);
        self.ridges(&mut mesh);
        self.kernel.smooth(&mut mesh, self.style.smooth_levels);
        let shell = self.kernel.thicken(&mesh, self.style.wall_thickness)?;
        debug!(
            vertices = shell.vertex_count(),
            triangles = shell.triangle_count(),
            "body built"
        );
        Ok(shell)
    }

    /// Sphere squashed along Y
    pub fn spheroid(&self) -> Result<Mesh> {
        let s = self.style;
        let mut mesh = self.kernel.sphere(s.radius, s.segments, s.rings)?;
        self.kernel
            .transform(&mut mesh, Mat4::from_scale(Vec3::new(1.0, s.aspect_y, 1.0)));
        Ok(mesh)
    }

    /// Squash the top and bottom caps (pole plus `pole_rings` rows) toward the equator
    pub fn flatten_poles(&self, mesh: &mut Mesh) {
        let s = self.style;
        let polar = std::f32::consts::PI * s.pole_rings as f32 / s.rings as f32;
        let threshold = s.radius * s.aspect_y * polar.cos() - AXIS_EPSILON;
        let squash = Mat4::from_scale(Vec3::new(1.0, s.pole_flatten, 1.0));

        let top = self.kernel.select_vertices(mesh, &|p| p.y >= threshold);
        let bottom = self.kernel.select_vertices(mesh, &|p| p.y <= -threshold);
        self.kernel
            .transform_vertices(mesh, &top, squash, Pivot::Point(Vec3::ZERO));
        self.kernel
            .transform_vertices(mesh, &bottom, squash, Pivot::Point(Vec3::ZERO));
    }

    /// Pull the poles inward with a soft falloff
    pub fn dimple(&self, mesh: &mut Mesh) {
        let s = self.style;
        let (Some(top), Some(bottom)) = (extreme_vertex(mesh, 1.0), extreme_vertex(mesh, -1.0))
        else {
            return;
        };
        for (anchor, dy) in [(top, s.top_dimple), (bottom, s.bottom_dimple)] {
            self.kernel.soft_move(
                mesh,
                SoftMove {
                    anchor,
                    offset: Vec3::new(0.0, dy, 0.0),
                    radius: s.falloff_radius,
                    curve: s.falloff_curve,
                    mode: s.falloff_mode,
                },
            );
        }
    }

    /// Grooves between the lobes
    ///
    /// Two loops are inserted either side of every meridian, then each
    /// original meridian is pulled in toward its own centroid.
    pub fn ridges(&self, mesh: &mut Mesh) {
        let s = self.style;
        let step = 360.0 / s.segments as f32;
        let offset = s.ridge_offset * step;

        if offset > 0.0 {
            for k in 0..s.segments {
                let theta = k as f32 * step;
                self.kernel.insert_meridian_loop(mesh, theta - offset);
                self.kernel.insert_meridian_loop(mesh, theta + offset);
            }
        }

        let pinch = Mat4::from_scale(Vec3::splat(s.ridge_scale));
        for k in 0..s.segments {
            let theta = k as f32 * step;
            let meridian = self.kernel.select_vertices(mesh, &|p| on_meridian(p, theta));
            self.kernel
                .transform_vertices(mesh, &meridian, pinch, Pivot::Centroid);
        }
    }
}

/// Vertex with the largest `sign * y`
fn extreme_vertex(mesh: &Mesh, sign: f32) -> Option<u32> {
    (0..mesh.vertex_count() as u32).max_by(|&a, &b| {
        let ya = sign * mesh.position(a).y;
        let yb = sign * mesh.position(b).y;
        ya.total_cmp(&yb)
    })
}

/// True for off-axis points whose longitude is `theta` degrees
fn on_meridian(p: Vec3, theta: f32) -> bool {
    if p.x.hypot(p.z) <= AXIS_EPSILON {
        return false;
    }
    let angle = p.z.atan2(p.x).to_degrees();
    let diff = (angle - theta + 540.0).rem_euclid(360.0) - 180.0;
    diff.abs() < MERIDIAN_TOLERANCE
}
