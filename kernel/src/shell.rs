//! Wall thickening
//!
//! Turns a closed surface into a hollow solid: the outer wall is the surface
//! pushed out along its vertex normals, the inner wall is the original
//! surface with reversed winding.

use glam::Vec3;

use crate::error::{KernelError, check_positive};
use crate::modifiers::{FlipWinding, MeshModifier};
use crate::types::Mesh;

/// Give a closed surface a wall of the given thickness
#[derive(Clone, Copy, Debug)]
pub struct Thicken {
    /// Outward offset of the outer wall
    pub thickness: f32,
}

impl Thicken {
    /// Build the shell. The input must have outward winding.
    pub fn build(&self, surface: &Mesh) -> Result<Mesh, KernelError> {
        let thickness = check_positive("wall thickness", self.thickness)?;
        if surface.is_empty() {
            return Err(KernelError::EmptySelection("thicken needs a non-empty surface"));
        }

        let mut outer = surface.clone();
        outer.recompute_normals();
        for (pos, n) in outer.positions.iter_mut().zip(&outer.normals) {
            *pos = (Vec3::from(*pos) + Vec3::from(*n) * thickness).to_array();
        }
        outer.recompute_normals();

        let mut inner = surface.clone();
        FlipWinding.apply(&mut inner);
        inner.recompute_normals();

        Ok(crate::combine::combine(&[&outer, &inner]))
    }
}

impl MeshModifier for Thicken {
    fn apply(&self, mesh: &mut Mesh) {
        match self.build(mesh) {
            Ok(shell) => *mesh = shell,
            Err(err) => tracing::warn!("Thicken skipped: {err}"),
        }
    }
}
