//! Outline watcher
//!
//! Detects changes to the outline parameters reachable from every mesh
//! object's material slots and regenerates outline geometry for the objects
//! affected.
//!
//! The scan is nested (objects, then material slots) and differential: each
//! slot's outline parameters are compared against the value observed on the
//! previous pass, stored per [`ObjectId`] so that objects sharing a name keep
//! separate histories.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::scene::{Material, MaterialKey, Object, ObjectId, ObjectKind, OutlineWidthMode, Scene};
use crate::watchers::{RunState, SceneWatch, WatcherContext, take_step};

const PERF_OBJECT_COUNT: usize = 100;
const PERF_SLOTS_PER_OBJECT: usize = 50;
const PERF_MATERIAL_COUNT: usize = 8;

/// Outline parameters of one slot, reduced to what geometry depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SlotOutline {
    material: MaterialKey,
    width_mode: OutlineWidthMode,
    width_bits: u32,
}

#[derive(Debug, Default)]
struct ObjectOutlineSnapshot {
    slots: SmallVec<[Option<SlotOutline>; 4]>,
    /// Pass in which the object was last visited.
    pass: u32,
}

/// Watches material-slot outline settings of mesh objects.
#[derive(Debug)]
pub struct OutlineWatcher {
    object_index: usize,
    slot_index: usize,
    /// The object at `object_index` has been charged its visit step.
    object_entered: bool,
    pass: u32,
    snapshot: FxHashMap<ObjectId, ObjectOutlineSnapshot>,
    step_budget: usize,
    last_steps: usize,
}

impl OutlineWatcher {
    #[must_use]
    pub fn new(step_budget: usize) -> Self {
        Self {
            object_index: 0,
            slot_index: 0,
            object_entered: false,
            pass: 0,
            snapshot: FxHashMap::default(),
            step_budget: step_budget.max(1),
            last_steps: 0,
        }
    }

    #[must_use]
    pub fn last_step_count(&self) -> usize {
        self.last_steps
    }

    fn rewind(&mut self) {
        self.object_index = 0;
        self.slot_index = 0;
        self.object_entered = false;
        self.pass = self.pass.wrapping_add(1);
    }

    fn slot_outline(scene: &Scene, object: &Object, slot: usize) -> Option<SlotOutline> {
        if object.kind != ObjectKind::Mesh {
            return None;
        }
        let key = (*object.material_slots.get(slot)?)?;
        let outline = scene.material(key)?.outline;
        outline.is_visible().then_some(SlotOutline {
            material: key,
            width_mode: outline.width_mode,
            width_bits: outline.width.to_bits(),
        })
    }
}

impl SceneWatch for OutlineWatcher {
    fn run(&mut self, ctx: &mut WatcherContext<'_>) -> RunState {
        let mut budget = Some(self.step_budget);
        let mut steps = 0;
        let mut changed: SmallVec<[ObjectId; 8]> = SmallVec::new();

        let scene = &*ctx.scene;
        if self.object_index >= scene.objects.len() {
            self.rewind();
        }

        while let Some(object) = scene.objects.get(self.object_index) {
            let id = object.id();
            let slot_count = object.material_slots.len();
            if self.slot_index > slot_count {
                self.slot_index = 0;
            }

            if !self.object_entered {
                if !take_step(&mut budget, &mut steps) {
                    self.last_steps = steps;
                    return RunState::Preempt;
                }
                self.object_entered = true;
            }

            let row = self.snapshot.entry(id).or_default();
            row.pass = self.pass;

            while self.slot_index < slot_count {
                if !take_step(&mut budget, &mut steps) {
                    self.last_steps = steps;
                    return RunState::Preempt;
                }

                let current = Self::slot_outline(scene, object, self.slot_index);
                let previous = row.slots.get(self.slot_index).copied().flatten();
                if current != previous {
                    if row.slots.len() <= self.slot_index {
                        row.slots.resize(self.slot_index + 1, None);
                    }
                    row.slots[self.slot_index] = current;
                    if changed.last() != Some(&id) {
                        changed.push(id);
                    }
                    budget = None;
                }
                self.slot_index += 1;
            }

            // Slots removed since the last pass.
            if row.slots.len() > slot_count {
                let removed_outline = row.slots[slot_count..].iter().any(Option::is_some);
                row.slots.truncate(slot_count);
                if removed_outline && changed.last() != Some(&id) {
                    changed.push(id);
                    budget = None;
                }
            }

            self.object_index += 1;
            self.slot_index = 0;
            self.object_entered = false;
        }

        let pass = self.pass;
        self.snapshot.retain(|_, row| row.pass == pass);
        self.last_steps = steps;

        if !changed.is_empty() {
            log::debug!("Outline change detected on {} object(s)", changed.len());
            if let Err(err) = ctx.effects.regenerate_outlines(ctx.scene, &changed) {
                log::warn!("Outline regeneration failed: {err}");
            }
        }
        RunState::Finish
    }

    fn create_fast_path_performance_test_objects(&self, ctx: &mut WatcherContext<'_>) {
        let materials: Vec<MaterialKey> = (0..PERF_MATERIAL_COUNT)
            .map(|i| {
                ctx.scene
                    .add_material(Material::with_outline(&format!("PerfOutline{i}"), 0.005))
            })
            .collect();

        for i in 0..PERF_OBJECT_COUNT {
            let mut object = Object::mesh(&format!("PerfOutlineObject{i}"));
            object.material_slots = (0..PERF_SLOTS_PER_OBJECT)
                .map(|slot| Some(materials[(i + slot) % materials.len()]))
                .collect();
            ctx.scene.add_object(object);
        }
        log::trace!(
            "Created {PERF_OBJECT_COUNT} objects x {PERF_SLOTS_PER_OBJECT} slots for the outline fast path"
        );
    }

    fn reset_run_progress(&mut self) {
        self.rewind();
    }
}
