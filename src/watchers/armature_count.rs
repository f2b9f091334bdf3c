use crate::scene::{Armature, Object, ObjectKind};
use crate::watchers::{RunState, SceneWatch, WatcherContext, take_step};

const PERF_OBJECT_COUNT: usize = 5000;

/// Counts armature objects and resynchronizes bone shapes when the count
/// differs from the one seen at the end of the previous pass.
#[derive(Debug)]
pub struct ArmatureCountWatcher {
    object_index: usize,
    partial_count: usize,
    /// Object count when the current pass started. A pass that sees a
    /// different length restarts, since `partial_count` may cover objects
    /// that have since moved or gone.
    pass_len: usize,
    last_count: usize,
    step_budget: usize,
    last_steps: usize,
}

impl ArmatureCountWatcher {
    #[must_use]
    pub fn new(step_budget: usize) -> Self {
        Self {
            object_index: 0,
            partial_count: 0,
            pass_len: 0,
            last_count: 0,
            step_budget: step_budget.max(1),
            last_steps: 0,
        }
    }

    #[must_use]
    pub fn last_step_count(&self) -> usize {
        self.last_steps
    }
}

impl SceneWatch for ArmatureCountWatcher {
    fn run(&mut self, ctx: &mut WatcherContext<'_>) -> RunState {
        let mut budget = Some(self.step_budget);
        let mut steps = 0;

        let objects = &ctx.scene.objects;
        if self.object_index == 0 || objects.len() != self.pass_len {
            self.reset_run_progress();
            self.pass_len = objects.len();
        }

        while let Some(object) = objects.get(self.object_index) {
            if !take_step(&mut budget, &mut steps) {
                self.last_steps = steps;
                return RunState::Preempt;
            }
            if object.kind == ObjectKind::Armature {
                self.partial_count += 1;
            }
            self.object_index += 1;
        }
        self.last_steps = steps;

        let count = self.partial_count;
        self.reset_run_progress();
        if count != self.last_count {
            log::debug!("Armature count changed: {} -> {count}", self.last_count);
            self.last_count = count;
            if let Err(err) = ctx.effects.sync_armatures(ctx.scene, count) {
                log::warn!("Armature sync failed: {err}");
            }
        }
        RunState::Finish
    }

    fn create_fast_path_performance_test_objects(&self, ctx: &mut WatcherContext<'_>) {
        for i in 0..PERF_OBJECT_COUNT {
            let object = if i % 50 == 0 {
                Object::armature(&format!("PerfArmature{i}"), Armature::chain("bone", 4, 0.1))
            } else {
                Object::empty(&format!("PerfArmatureEmpty{i}"))
            };
            ctx.scene.add_object(object);
        }
    }

    fn reset_run_progress(&mut self) {
        self.object_index = 0;
        self.partial_count = 0;
    }
}
