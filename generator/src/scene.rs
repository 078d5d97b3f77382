//! Scene namespaces and the per-build context

use std::sync::{Arc, Mutex, MutexGuard};

use hashbrown::HashSet;
use pumpkin_kernel::GeometryKernel;
use tracing::{debug, warn};

use crate::error::{PumpkinError, Result};
use crate::random::RandomizationEngine;
use crate::style::StyleConfig;

/// Names reserved for one pumpkin build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    /// Name of the finished pumpkin object
    pub pumpkin: String,
    /// Name of its working cut group
    pub cuts: String,
}

impl Namespace {
    pub fn for_index(index: u32) -> Self {
        let pumpkin = format!("pumpkin{index}");
        let cuts = format!("{pumpkin}_cuts");
        Self { pumpkin, cuts }
    }
}

/// Cut-group names held by running builds
///
/// Shared between the scene and every build of a batch; a build releases its
/// group name as soon as the subtraction has consumed the group.
#[derive(Debug, Clone, Default)]
pub struct WorkingNames(Arc<Mutex<HashSet<String>>>);

impl WorkingNames {
    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.0.lock().unwrap_or_else(|e| {
            warn!("working name registry poisoned; continuing");
            e.into_inner()
        })
    }

    pub(crate) fn insert(&self, name: &str) -> bool {
        self.lock().insert(name.to_string())
    }

    /// Release `name`; false when it was not held
    pub fn release(&self, name: &str) -> bool {
        self.lock().remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.lock().contains(name)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn clear(&self) {
        self.lock().clear();
    }
}

/// Object names known to the scene
///
/// Pumpkin names persist for the lifetime of the scene, so every batch
/// continues the numbering where the previous one stopped. Cut-group names
/// are working state held in [`WorkingNames`].
#[derive(Debug, Default)]
pub struct Scene {
    objects: HashSet<String>,
    working: WorkingNames,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// First `pumpkin<n>` namespace whose names are all free
    pub fn next_namespace(&self) -> Namespace {
        let mut serial = self.objects.len() as u32 + 1;
        loop {
            let namespace = Namespace::for_index(serial);
            if !self.contains(&namespace.pumpkin) && !self.contains(&namespace.cuts) {
                return namespace;
            }
            serial += 1;
        }
    }

    /// Reserve the names of `namespace`
    pub fn allocate(&mut self, namespace: Namespace) -> Result<Namespace> {
        if self.objects.contains(&namespace.pumpkin) {
            return Err(PumpkinError::NamingCollision(namespace.pumpkin));
        }
        if self.objects.contains(&namespace.cuts) || !self.working.insert(&namespace.cuts) {
            return Err(PumpkinError::NamingCollision(namespace.cuts));
        }
        self.objects.insert(namespace.pumpkin.clone());
        debug!(name = %namespace.pumpkin, "allocated namespace");
        Ok(namespace)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.objects.contains(name) || self.working.contains(name)
    }

    /// Handle builds use to release their cut-group names
    pub fn working_names(&self) -> WorkingNames {
        self.working.clone()
    }

    /// Number of working names still held
    pub fn working_len(&self) -> usize {
        self.working.len()
    }

    /// Release every cut-group name left by builds that stopped early
    pub fn clear_working_state(&mut self) {
        debug!(count = self.working.len(), "clearing working state");
        self.working.clear();
    }
}

/// Everything one pumpkin build needs
///
/// Passed explicitly through the pipeline; builds share nothing else.
pub struct BuildContext<'a> {
    pub kernel: &'a dyn GeometryKernel,
    pub style: &'a StyleConfig,
    pub engine: RandomizationEngine,
    pub namespace: Namespace,
    pub index: u32,
    pub add_point_light: bool,
    /// Registry the cut-group name is released from once carved
    pub working: Option<WorkingNames>,
}

impl<'a> BuildContext<'a> {
    pub fn new(
        kernel: &'a dyn GeometryKernel,
        style: &'a StyleConfig,
        batch_seed: u64,
        namespace: Namespace,
        index: u32,
    ) -> Self {
        Self {
            kernel,
            style,
            engine: RandomizationEngine::for_pumpkin(batch_seed, index),
            namespace,
            index,
            add_point_light: false,
            working: None,
        }
    }

    pub fn with_point_light(mut self, enabled: bool) -> Self {
        self.add_point_light = enabled;
        self
    }

    pub fn with_working_names(mut self, working: WorkingNames) -> Self {
        self.working = Some(working);
        self
    }

    /// Give the cut-group name back once the group has been consumed
    pub fn release_cuts(&self) {
        if let Some(working) = &self.working {
            if working.release(&self.namespace.cuts) {
                debug!(group = %self.namespace.cuts, "released cut group");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pumpkin_kernel::MeshKernel;

    #[test]
    fn test_namespace_names() {
        let ns = Namespace::for_index(3);
        assert_eq!(ns.pumpkin, "pumpkin3");
        assert_eq!(ns.cuts, "pumpkin3_cuts");
    }

    #[test]
    fn test_duplicate_allocation_collides() {
        let mut scene = Scene::new();
        scene.allocate(Namespace::for_index(1)).unwrap();
        match scene.allocate(Namespace::for_index(1)) {
            Err(PumpkinError::NamingCollision(name)) => assert_eq!(name, "pumpkin1"),
            other => panic!("expected collision, got {other:?}"),
        }
    }

    #[test]
    fn test_next_namespace_continues_numbering() {
        let mut scene = Scene::new();
        for _ in 0..3 {
            let ns = scene.next_namespace();
            scene.allocate(ns).unwrap();
        }
        scene.clear_working_state();
        assert_eq!(scene.next_namespace(), Namespace::for_index(4));

        let ns = scene.next_namespace();
        scene.allocate(ns).unwrap();
        assert!(scene.contains("pumpkin4"));
        assert!(scene.contains("pumpkin4_cuts"));
    }

    #[test]
    fn test_clear_keeps_pumpkins() {
        let mut scene = Scene::new();
        scene.allocate(Namespace::for_index(1)).unwrap();
        scene.allocate(Namespace::for_index(2)).unwrap();
        assert_eq!(scene.working_len(), 2);

        scene.clear_working_state();
        assert_eq!(scene.working_len(), 0);
        assert!(scene.contains("pumpkin2"));
        assert!(!scene.contains("pumpkin2_cuts"));
        assert!(scene.allocate(Namespace::for_index(2)).is_err());
    }

    #[test]
    fn test_release_cuts_frees_only_own_group() {
        let mut scene = Scene::new();
        let first = scene.allocate(Namespace::for_index(1)).unwrap();
        scene.allocate(Namespace::for_index(2)).unwrap();

        let style = StyleConfig::default();
        let ctx = BuildContext::new(&MeshKernel, &style, 1, first, 1)
            .with_working_names(scene.working_names());
        ctx.release_cuts();

        assert!(!scene.contains("pumpkin1_cuts"));
        assert!(scene.contains("pumpkin2_cuts"));
        assert!(scene.contains("pumpkin1"));
        assert_eq!(scene.working_len(), 1);
    }
}
