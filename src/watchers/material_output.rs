//! Material output watcher
//!
//! Scans materials in creation order for a node tree whose MToon output
//! marker group is linked straight into the material output, and rewires
//! all such materials in one call.

use smallvec::SmallVec;

use crate::scene::{Material, MaterialKey, Object};
use crate::utils::interner::{self, Symbol};
use crate::watchers::{RunState, SceneWatch, WatcherContext, take_step};

const PERF_MATERIAL_COUNT: usize = 5000;

#[derive(Debug)]
pub struct MaterialOutputWatcher {
    material_index: usize,
    marker: Symbol,
    step_budget: usize,
    last_steps: usize,
}

impl MaterialOutputWatcher {
    #[must_use]
    pub fn new(step_budget: usize) -> Self {
        Self {
            material_index: 0,
            marker: interner::intern(interner::MTOON_OUTPUT_GROUP),
            step_budget: step_budget.max(1),
            last_steps: 0,
        }
    }

    #[must_use]
    pub fn last_step_count(&self) -> usize {
        self.last_steps
    }
}

impl SceneWatch for MaterialOutputWatcher {
    fn run(&mut self, ctx: &mut WatcherContext<'_>) -> RunState {
        let mut budget = Some(self.step_budget);
        let mut steps = 0;
        let mut pending: SmallVec<[MaterialKey; 4]> = SmallVec::new();

        let scene = &*ctx.scene;
        if self.material_index >= scene.material_order.len() {
            self.material_index = 0;
        }

        while let Some(&key) = scene.material_order.get(self.material_index) {
            if !take_step(&mut budget, &mut steps) {
                self.last_steps = steps;
                return RunState::Preempt;
            }

            if let Some(material) = scene.material(key)
                && material.node_tree.has_marker_linked_to_sink(self.marker)
            {
                pending.push(key);
                budget = None;
            }
            self.material_index += 1;
        }
        self.last_steps = steps;

        if !pending.is_empty() {
            log::debug!("{} material output(s) need rewiring", pending.len());
            if let Err(err) = ctx.effects.rewire_material_outputs(ctx.scene, &pending) {
                log::warn!("Material output rewiring failed: {err}");
            }
        }
        RunState::Finish
    }

    fn create_fast_path_performance_test_objects(&self, ctx: &mut WatcherContext<'_>) {
        let mut object = Object::mesh("PerfMaterialOutputObject");
        for i in 0..PERF_MATERIAL_COUNT {
            let key = ctx
                .scene
                .add_material(Material::new(&format!("PerfMaterialOutput{i}")));
            object.material_slots.push(Some(key));
        }
        ctx.scene.add_object(object);
        log::trace!("Created {PERF_MATERIAL_COUNT} materials for the material output fast path");
    }

    fn reset_run_progress(&mut self) {
        self.material_index = 0;
    }
}
