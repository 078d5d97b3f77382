//! Soft (falloff-weighted) vertex moves

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::modifiers::MeshModifier;
use crate::topology::vertex_neighbors;
use crate::types::Mesh;

/// Falloff curve shape for soft moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FalloffCurve {
    /// Linear falloff: strength = 1 - distance/radius
    Linear,
    /// Smooth falloff: hermite interpolation
    #[default]
    Smooth,
    /// Sharp falloff: quadratic decay
    Sharp,
    /// Constant: full strength within radius
    Constant,
    /// Sphere: spherical falloff (sqrt-based)
    Sphere,
}

impl FalloffCurve {
    /// Calculate falloff strength at a given normalized distance (0.0 = center, 1.0 = edge).
    pub fn evaluate(&self, normalized_distance: f32) -> f32 {
        let d = normalized_distance.clamp(0.0, 1.0);
        match self {
            FalloffCurve::Linear => 1.0 - d,
            FalloffCurve::Smooth => {
                let t = 1.0 - d;
                t * t * (3.0 - 2.0 * t)
            }
            FalloffCurve::Sharp => {
                let t = 1.0 - d;
                t * t
            }
            FalloffCurve::Constant => 1.0,
            FalloffCurve::Sphere => (1.0 - d * d).max(0.0).sqrt(),
        }
    }
}

/// How distance from the anchor is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FalloffMode {
    /// Straight-line distance
    Volume,
    /// Shortest path along mesh edges
    #[default]
    Surface,
}

/// Move an anchor vertex and drag its neighbourhood along with a falloff
///
/// Every vertex within `radius` of the anchor is displaced by
/// `offset * curve(distance / radius)`; the anchor itself moves by the full
/// offset.
#[derive(Clone, Copy, Debug)]
pub struct SoftMove {
    pub anchor: u32,
    pub offset: Vec3,
    pub radius: f32,
    pub curve: FalloffCurve,
    pub mode: FalloffMode,
}

impl SoftMove {
    /// Per-vertex weights in [0, 1] (0 outside the radius)
    pub fn weights(&self, mesh: &Mesh) -> Vec<f32> {
        let distances = match self.mode {
            FalloffMode::Volume => {
                let origin = mesh.position(self.anchor);
                (0..mesh.vertex_count() as u32)
                    .map(|i| mesh.position(i).distance(origin))
                    .collect()
            }
            FalloffMode::Surface => geodesic_distances(mesh, self.anchor, self.radius),
        };

        distances
            .into_iter()
            .map(|d| {
                if d < self.radius {
                    self.curve.evaluate(d / self.radius)
                } else {
                    0.0
                }
            })
            .collect()
    }
}

impl MeshModifier for SoftMove {
    fn apply(&self, mesh: &mut Mesh) {
        if self.anchor as usize >= mesh.vertex_count() || self.radius <= 0.0 {
            return;
        }
        let weights = self.weights(mesh);
        for (i, w) in weights.into_iter().enumerate() {
            if w > 0.0 {
                let p = mesh.position(i as u32) + self.offset * w;
                mesh.set_position(i as u32, p);
            }
        }
    }
}

#[derive(Clone, Copy, PartialEq)]
struct Frontier {
    distance: f32,
    vertex: u32,
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        // Min-heap on distance
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| self.vertex.cmp(&other.vertex))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Edge-path distance from `source` to every vertex, cut off at `limit`
/// (vertices further away report `f32::INFINITY`)
pub fn geodesic_distances(mesh: &Mesh, source: u32, limit: f32) -> Vec<f32> {
    let neighbors = vertex_neighbors(mesh);
    let mut dist = vec![f32::INFINITY; mesh.vertex_count()];
    let mut heap = BinaryHeap::new();

    dist[source as usize] = 0.0;
    heap.push(Frontier {
        distance: 0.0,
        vertex: source,
    });

    while let Some(Frontier { distance, vertex }) = heap.pop() {
        if distance > dist[vertex as usize] {
            continue;
        }
        let p = mesh.position(vertex);
        for &n in &neighbors[vertex as usize] {
            let candidate = distance + p.distance(mesh.position(n));
            if candidate < dist[n as usize] && candidate <= limit {
                dist[n as usize] = candidate;
                heap.push(Frontier {
                    distance: candidate,
                    vertex: n,
                });
            }
        }
    }
    dist
}
