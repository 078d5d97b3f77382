//! Stem and base cap

use glam::{Mat4, Vec3};
use pumpkin_kernel::{GeometryKernel, Mesh, Pivot};
use tracing::debug;

use crate::error::Result;
use crate::params::StemParameters;
use crate::style::StemStyle;

/// Height tolerance when picking an edge ring
const RING_EPSILON: f32 = 1e-4;

/// Builds the stem and the small cap under the body
#[derive(Clone, Copy)]
pub struct StemBuilder<'a> {
    kernel: &'a dyn GeometryKernel,
    style: &'a StemStyle,
}

impl<'a> StemBuilder<'a> {
    pub fn new(kernel: &'a dyn GeometryKernel, style: &'a StemStyle) -> Self {
        Self { kernel, style }
    }

    /// Stem and base cap for one pumpkin
    pub fn build(&self, params: &StemParameters) -> Result<(Mesh, Mesh)> {
        let stem = self.stem(params)?;
        let cap = self.cap()?;
        debug!(
            stem_triangles = stem.triangle_count(),
            cap_triangles = cap.triangle_count(),
            "stem built"
        );
        Ok((stem, cap))
    }

    pub fn stem(&self, params: &StemParameters) -> Result<Mesh> {
        let s = self.style;
        let k = self.kernel;

        let mut mesh = k.cylinder(s.radius, s.height, s.segments, s.height_segments)?;
        k.transform(
            &mut mesh,
            Mat4::from_translation(Vec3::new(0.0, s.y, 0.0)) * Mat4::from_scale(Vec3::splat(s.scale)),
        );

        let half = 0.5 * s.height * s.scale;
        let (bottom_y, top_y) = (s.y - half, s.y + half);

        // Selections are taken before anything moves
        let bottom_ring = k.select_vertices(&mesh, &|p| {
            (p.y - bottom_y).abs() < RING_EPSILON && off_axis(p)
        });
        let top_cap = k.select_vertices(&mesh, &|p| (p.y - top_y).abs() < RING_EPSILON);
        let top_ring: Vec<u32> = top_cap
            .iter()
            .copied()
            .filter(|&i| off_axis(mesh.position(i)))
            .collect();
        let middle = k.select_vertices(&mesh, &|p| {
            p.y > bottom_y + RING_EPSILON && p.y < top_y - RING_EPSILON
        });

        k.transform_vertices(
            &mut mesh,
            &middle,
            Mat4::from_translation(Vec3::new(0.0, -s.middle_nudge, 0.0)),
            Pivot::Centroid,
        );

        k.transform_vertices(
            &mut mesh,
            &bottom_ring,
            Mat4::from_scale(Vec3::new(params.flare_x, s.flare_y, params.flare_z)),
            Pivot::Centroid,
        );

        k.transform_vertices(
            &mut mesh,
            &top_cap,
            Mat4::from_rotation_x(params.tilt_degrees.to_radians()),
            Pivot::Centroid,
        );

        let cap_faces = k.faces_within(&mesh, &top_cap);
        k.extrude(&mut mesh, &cap_faces, Vec3::from_array(params.extrude))?;

        k.crease(&mut mesh, &bottom_ring, s.bottom_crease);
        k.crease(&mut mesh, &top_ring, s.top_crease);
        k.smooth(&mut mesh, s.smooth_levels);
        Ok(mesh)
    }

    /// Flattened sphere plugging the bottom dimple
    pub fn cap(&self) -> Result<Mesh> {
        let s = self.style;
        let mut cap = self.kernel.sphere(s.cap_radius, s.cap_segments, s.cap_rings)?;
        self.kernel.transform(
            &mut cap,
            Mat4::from_translation(Vec3::new(0.0, s.cap_y, 0.0))
                * Mat4::from_scale(Vec3::new(1.0, s.cap_flatten, 1.0)),
        );
        Ok(cap)
    }
}

fn off_axis(p: Vec3) -> bool {
    p.x.hypot(p.z) > RING_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;
    use pumpkin_kernel::MeshKernel;

    fn params(tilt_degrees: f32) -> StemParameters {
        StemParameters {
            flare_x: 2.1,
            flare_z: 2.0,
            tilt_degrees,
            extrude: [0.02, 0.15, 0.02],
        }
    }

    #[test]
    fn test_stem_grows_upward() {
        let style = StemStyle::default();
        let stem = StemBuilder::new(&MeshKernel, &style).stem(&params(0.0)).unwrap();
        let bounds = stem.bounds();
        // the creased base keeps its height through smoothing
        assert!((bounds.min.y - 0.55).abs() < 1e-3);
        assert!(bounds.max.y > 0.79);
        assert!(bounds.max.y < 0.79 + 0.15 + 1e-3);
    }

    #[test]
    fn test_flare_widens_base() {
        let style = StemStyle::default();
        let stem = StemBuilder::new(&MeshKernel, &style).stem(&params(0.0)).unwrap();
        assert!(stem.bounds().size().x > 2.0 * 0.12 * 1.5);
    }

    #[test]
    fn test_stem_is_closed() {
        let style = StemStyle::default();
        let stem = StemBuilder::new(&MeshKernel, &style).stem(&params(30.0)).unwrap();
        assert!(pumpkin_kernel::topology::is_closed(&stem));
        assert!(stem.volume() > 0.0);
    }

    #[test]
    fn test_cap_sits_below_body_centre() {
        let style = StemStyle::default();
        let cap = StemBuilder::new(&MeshKernel, &style).cap().unwrap();
        let bounds = cap.bounds();
        assert!((bounds.center().y + 0.51).abs() < 1e-5);
        assert!((bounds.size().y - 0.08).abs() < 1e-5);
        assert!((bounds.size().x - 0.2).abs() < 0.01);
    }
}
